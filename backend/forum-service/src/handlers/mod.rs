/// HTTP handlers for the moderation and ranking pipeline
///
/// - Content: moderate raw post/comment text before the CRUD layer stores it
/// - Posts: trending and ordered listings, post number reservation
pub mod content;
pub mod posts;

use crate::db::PostStore;
use crate::services::{ContentTransformer, PostingCooldown, ProfanityFilter};
use actix_web::{web, HttpResponse};
use std::sync::Arc;

pub use content::transform_content;
pub use posts::{list_posts, reserve_post_number};

/// Shared state handed to every handler
pub struct AppState {
    pub transformer: Arc<ContentTransformer>,
    pub store: Arc<dyn PostStore>,
    pub profanity: Arc<ProfanityFilter>,
    pub cooldown: Arc<PostingCooldown>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { HttpResponse::Ok().body("OK") }))
        .route("/ready", web::get().to(|| async { HttpResponse::Ok().body("READY") }))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(
            web::scope("/api/v1")
                .route("/content/transform", web::post().to(transform_content))
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(list_posts))
                        .route("/numbers", web::post().to(reserve_post_number)),
                ),
        );
}
