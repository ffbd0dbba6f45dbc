use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Correct re-guesses after which a missed word is considered learned and
/// removed.
pub const MASTERY_THRESHOLD: i32 = 5;

pub const REVIEW_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissedWord {
  pub id: String,
  pub language: String,
  pub image_path: String,
  pub english_word: String,
  pub translation: String,
  pub correct_guesses: i32,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMissedWord {
  pub language: String,
  pub image_path: String,
  pub english_word: String,
  pub translation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessProgress {
  Missing,
  Progressed(i32),
  Mastered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
  Correct,
  Incorrect { translation: String },
  Ungraded { reason: String },
}

impl GuessOutcome {
  pub fn label(&self) -> &'static str {
    match self {
      GuessOutcome::Correct => "correct",
      GuessOutcome::Incorrect { .. } => "incorrect",
      GuessOutcome::Ungraded { .. } => "error",
    }
  }
}

impl fmt::Display for GuessOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GuessOutcome::Correct => write!(f, "Correct"),
      GuessOutcome::Incorrect { translation } => write!(f, "Incorrect - Correct: {translation}"),
      GuessOutcome::Ungraded { reason } => write!(f, "Error - {reason}"),
    }
  }
}

pub fn is_correct_guess(guess: &str, translation: &str) -> bool {
  guess.to_lowercase() == translation.to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessResult {
  pub word: String,
  pub guess: String,
  pub result: String,
}

impl GuessResult {
  pub fn new(word: &str, guess: &str, outcome: &GuessOutcome) -> Self {
    Self {
      word: word.to_owned(),
      guess: guess.to_owned(),
      result: outcome.to_string(),
    }
  }
}
