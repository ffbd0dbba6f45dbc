use axum::{
  body::Bytes,
  extract::State,
  response::{Html, IntoResponse, Redirect, Response},
  routing::post,
  Json, Router,
};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::{
  error::{AppError, AppJsonResult, AppResult},
  views, AppState, TranslatorClient,
};

use super::{
  db::MissedWords,
  form::{wants_json, ListForm},
  guess, upload, GuessResult, MissedWord, REVIEW_LIMIT,
};

pub fn router() -> Router<AppState> {
  Router::new()
    .merge(upload::router())
    .route("/check_translations", post(check_translations))
    .route("/review_missed_words", post(review_missed_words))
    .route("/review_guess", post(review_guess))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
struct CheckTranslationsRequest {
  words: Option<Vec<String>>,
  guesses: Option<Vec<String>>,
  image_paths: Option<Vec<String>>,
  language: Option<String>,
}

async fn check_translations(
  State(translator): State<TranslatorClient>,
  State(missed_words): State<MissedWords>,
  payload: Option<Json<CheckTranslationsRequest>>,
) -> AppJsonResult<Vec<GuessResult>> {
  let Some(Json(payload)) = payload else {
    tracing::error!("no JSON data received");
    return Err(AppError::MissingData);
  };
  tracing::debug!(?payload, "received check request");

  let (Some(words), Some(guesses), Some(image_paths), Some(language)) = (
    payload.words.filter(|v| !v.is_empty()),
    payload.guesses.filter(|v| !v.is_empty()),
    payload.image_paths.filter(|v| !v.is_empty()),
    payload.language.filter(|v| !v.is_empty()),
  ) else {
    tracing::error!("missing data in the request");
    return Err(AppError::MissingData);
  };

  let attempts = words
    .iter()
    .zip(&guesses)
    .zip(&image_paths)
    .map(|((word, guess), image_path)| (word.as_str(), guess.as_str(), image_path.as_str()))
    .collect::<Vec<_>>();

  let results =
    guess::check_translations(translator.as_ref(), &missed_words, &language, &attempts).await?;
  Ok(Json(results))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewWord {
  pub id: String,
  pub english_word: String,
  pub translation: String,
  pub image_path: String,
  pub correct_guesses: i32,
}

impl From<MissedWord> for ReviewWord {
  fn from(word: MissedWord) -> Self {
    Self {
      id: word.id,
      english_word: word.english_word,
      translation: word.translation,
      image_path: word.image_path,
      correct_guesses: word.correct_guesses,
    }
  }
}

fn missing_input(json: bool) -> AppResult<Response> {
  if json {
    Err(AppError::MissingData)
  } else {
    Ok(Redirect::to("/").into_response())
  }
}

async fn review_missed_words(
  State(words): State<MissedWords>,
  headers: HeaderMap,
  body: Bytes,
) -> AppResult<Response> {
  let json = wants_json(&headers);
  let form = ListForm::parse(&headers, &body)?;
  let Some(language) = form.first("language") else {
    return missing_input(json);
  };

  let missed_words = words.get_missed_words(language, REVIEW_LIMIT).await?;
  tracing::debug!(language, count = missed_words.len(), "missed words retrieved");

  if json {
    let missed_words: Vec<ReviewWord> = missed_words.into_iter().map(ReviewWord::from).collect();
    Ok(Json(missed_words).into_response())
  } else {
    Ok(Html(views::review_missed_words(&missed_words)).into_response())
  }
}

async fn review_guess(
  State(words): State<MissedWords>,
  headers: HeaderMap,
  body: Bytes,
) -> AppResult<Response> {
  let json = wants_json(&headers);
  let form = ListForm::parse(&headers, &body)?;
  let entity_keys = form.list("entity_keys");
  let guesses = form.list("guesses");
  if entity_keys.is_empty() {
    return missing_input(json);
  }

  let attempts = entity_keys
    .iter()
    .zip(guesses)
    .map(|(id, guess)| (id.as_str(), guess.as_str()))
    .collect::<Vec<_>>();
  let results = guess::review_guesses(&words, &attempts).await?;

  if json {
    Ok(Json(results).into_response())
  } else {
    Ok(Html(views::review_results(&results)).into_response())
  }
}
