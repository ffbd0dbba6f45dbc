use metrics::increment_counter;

use crate::{
  error::AppResult,
  translate::{TranslateError, Translator},
};

use super::{db::MissedWords, is_correct_guess, GuessOutcome, GuessResult};

fn record_outcome(outcome: &GuessOutcome) {
  increment_counter!("snaplingo_guesses_total", "result" => outcome.label());
}

pub async fn check_translations(
  translator: &dyn Translator,
  words: &MissedWords,
  language: &str,
  attempts: &[(&str, &str, &str)],
) -> AppResult<Vec<GuessResult>> {
  let mut results = vec![];

  for &(word, guess, image_path) in attempts {
    let outcome = match translator.translate(word, language).await {
      Ok(translation) if is_correct_guess(guess, &translation) => GuessOutcome::Correct,
      Ok(translation) => {
        words
          .add_missed_word(language, image_path, word, &translation)
          .await?;
        GuessOutcome::Incorrect { translation }
      }
      Err(err @ TranslateError::InvalidResponse) => {
        tracing::error!(word, error = %err, "translation error");
        GuessOutcome::Ungraded {
          reason: err.to_string(),
        }
      }
      Err(err) => return Err(err.into()),
    };

    record_outcome(&outcome);
    results.push(GuessResult::new(word, guess, &outcome));
  }

  Ok(results)
}

pub async fn review_guesses(
  words: &MissedWords,
  attempts: &[(&str, &str)],
) -> AppResult<Vec<GuessResult>> {
  let mut results = vec![];

  for &(id, guess) in attempts {
    let Some(missed) = words.get(id).await? else {
      tracing::debug!(id, "missed word not found, skipping");
      continue;
    };

    let outcome = if is_correct_guess(guess, &missed.translation) {
      let progress = words.increment_correct_guess(id).await?;
      tracing::debug!(id, ?progress, "review guess correct");
      GuessOutcome::Correct
    } else {
      GuessOutcome::Incorrect {
        translation: missed.translation.clone(),
      }
    };

    record_outcome(&outcome);
    results.push(GuessResult::new(&missed.english_word, guess, &outcome));
  }

  Ok(results)
}
