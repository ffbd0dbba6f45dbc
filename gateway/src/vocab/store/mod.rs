use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;

use super::{MissedWord, NewMissedWord};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait MissedWordStore: Send + Sync {
  async fn insert(&self, word: NewMissedWord, timestamp: DateTime<Utc>) -> AppResult<String>;

  async fn find_by_language(&self, language: &str, limit: i64) -> AppResult<Vec<MissedWord>>;

  async fn get(&self, id: &str) -> AppResult<Option<MissedWord>>;

  /// Adds one to `correct_guesses` in a single step and returns the new
  /// value, or `None` if the record is gone.
  async fn increment(&self, id: &str) -> AppResult<Option<i32>>;

  async fn delete_if_mastered(&self, id: &str, threshold: i32) -> AppResult<bool>;
}
