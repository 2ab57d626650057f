use super::AppState;
use crate::error::Result;
use crate::services::{rank_trending, sort_posts, SortMode};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
}

/// List posts in the requested order. Trending listings carry a `score`.
///
/// The store orders the whole collection before applying `limit`; the page is
/// then re-sorted here with the in-process comparators so ties and float
/// rounding resolve the same way for every store. `count` is the collection size.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let mode = match query.sort_by.as_deref() {
        Some(value) => value.parse::<SortMode>()?,
        None => SortMode::default(),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let posts = state.store.list_rankable_posts(mode, limit).await?;
    let count = state.store.count_posts().await?;

    let response = match mode {
        SortMode::Trending => HttpResponse::Ok().json(serde_json::json!({
            "data": rank_trending(posts),
            "count": count,
        })),
        other => HttpResponse::Ok().json(serde_json::json!({
            "data": sort_posts(posts, other),
            "count": count,
        })),
    };

    Ok(response)
}

/// Hand out the next post number for a post about to be created
pub async fn reserve_post_number(state: web::Data<AppState>) -> Result<HttpResponse> {
    let post_number = state.store.allocate_post_number().await?;
    tracing::info!(post_number, "Reserved post number");

    Ok(HttpResponse::Created().json(serde_json::json!({ "post_number": post_number })))
}
