use crate::error::{ForumError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-user posting cooldown: one submission per window.
pub struct PostingCooldown {
    window: Duration,
    last_submission: DashMap<Uuid, Instant>,
}

impl PostingCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_submission: DashMap::new(),
        }
    }

    /// Records a submission for `user_id`, or fails if the previous one is
    /// still inside the window.
    pub fn try_acquire(&self, user_id: Uuid) -> Result<()> {
        self.try_acquire_at(user_id, Instant::now())
    }

    fn try_acquire_at(&self, user_id: Uuid, now: Instant) -> Result<()> {
        match self.last_submission.entry(user_id) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < self.window {
                    let wait = self.window - elapsed;
                    return Err(ForumError::RateLimited(format!(
                        "You are posting too frequently. Please try again in {}s.",
                        wait.as_secs().max(1)
                    )));
                }
                entry.insert(now);
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
            }
        }
        Ok(())
    }

    /// Drops users whose window has passed
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.last_submission
            .retain(|_, last| now.saturating_duration_since(*last) < self.window);
    }

    pub fn tracked_users(&self) -> usize {
        self.last_submission.len()
    }
}
