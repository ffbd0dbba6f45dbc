use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
  error::AppResult,
  vocab::{MissedWord, NewMissedWord},
};

use super::MissedWordStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
  next_id: u64,
  records: BTreeMap<u64, MissedWord>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub async fn len(&self) -> usize {
    self.inner.lock().await.records.len()
  }
}

fn parse_id(id: &str) -> Option<u64> {
  id.parse().ok()
}

#[async_trait]
impl MissedWordStore for MemoryStore {
  async fn insert(&self, word: NewMissedWord, timestamp: DateTime<Utc>) -> AppResult<String> {
    let mut inner = self.inner.lock().await;
    inner.next_id += 1;
    let id = inner.next_id;
    inner.records.insert(
      id,
      MissedWord {
        id: id.to_string(),
        language: word.language,
        image_path: word.image_path,
        english_word: word.english_word,
        translation: word.translation,
        correct_guesses: 0,
        timestamp,
      },
    );
    Ok(id.to_string())
  }

  async fn find_by_language(&self, language: &str, limit: i64) -> AppResult<Vec<MissedWord>> {
    let inner = self.inner.lock().await;
    let mut words: Vec<MissedWord> = inner
      .records
      .values()
      .filter(|word| word.language == language)
      .cloned()
      .collect();
    // stable sort keeps id order for equal timestamps
    words.sort_by_key(|word| word.timestamp);
    words.truncate(limit.max(0) as usize);
    Ok(words)
  }

  async fn get(&self, id: &str) -> AppResult<Option<MissedWord>> {
    let Some(id) = parse_id(id) else {
      return Ok(None);
    };
    Ok(self.inner.lock().await.records.get(&id).cloned())
  }

  async fn increment(&self, id: &str) -> AppResult<Option<i32>> {
    let Some(id) = parse_id(id) else {
      return Ok(None);
    };
    let mut inner = self.inner.lock().await;
    Ok(inner.records.get_mut(&id).map(|word| {
      word.correct_guesses += 1;
      word.correct_guesses
    }))
  }

  async fn delete_if_mastered(&self, id: &str, threshold: i32) -> AppResult<bool> {
    let Some(id) = parse_id(id) else {
      return Ok(false);
    };
    let mut inner = self.inner.lock().await;
    let mastered = inner
      .records
      .get(&id)
      .map_or(false, |word| word.correct_guesses >= threshold);
    if mastered {
      inner.records.remove(&id);
    }
    Ok(mastered)
  }
}
