use std::sync::Arc;

use chrono::Utc;
use metrics::increment_counter;

use crate::error::AppResult;

use super::{
  store::MissedWordStore, GuessProgress, MissedWord, NewMissedWord, MASTERY_THRESHOLD,
};

#[derive(Clone)]
pub struct MissedWords {
  store: Arc<dyn MissedWordStore>,
}

impl MissedWords {
  pub fn new(store: Arc<dyn MissedWordStore>) -> Self {
    Self { store }
  }

  pub async fn add_missed_word(
    &self,
    language: &str,
    image_path: &str,
    english_word: &str,
    translation: &str,
  ) -> AppResult<Option<String>> {
    tracing::debug!(
      language,
      image_path,
      english_word,
      translation,
      "adding missed word"
    );
    if image_path.is_empty() {
      tracing::error!(english_word, "image path is empty, skipping missed word");
      return Ok(None);
    }

    let id = self
      .store
      .insert(
        NewMissedWord {
          language: language.to_owned(),
          image_path: image_path.to_owned(),
          english_word: english_word.to_owned(),
          translation: translation.to_owned(),
        },
        Utc::now(),
      )
      .await?;
    increment_counter!("snaplingo_missed_words_added_total");
    tracing::debug!(id = %id, "missed word added");
    Ok(Some(id))
  }

  pub async fn get_missed_words(&self, language: &str, limit: i64) -> AppResult<Vec<MissedWord>> {
    self.store.find_by_language(language, limit).await
  }

  pub async fn get(&self, id: &str) -> AppResult<Option<MissedWord>> {
    self.store.get(id).await
  }

  pub async fn increment_correct_guess(&self, id: &str) -> AppResult<GuessProgress> {
    let Some(correct_guesses) = self.store.increment(id).await? else {
      return Ok(GuessProgress::Missing);
    };

    if correct_guesses >= MASTERY_THRESHOLD {
      self.store.delete_if_mastered(id, MASTERY_THRESHOLD).await?;
      increment_counter!("snaplingo_words_mastered_total");
      tracing::info!(id, "missed word mastered");
      return Ok(GuessProgress::Mastered);
    }

    Ok(GuessProgress::Progressed(correct_guesses))
  }
}
