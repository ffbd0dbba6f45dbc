use std::fmt;

use axum::{
  extract::multipart::MultipartError,
  response::{IntoResponse, Response},
  Json,
};
use hyper::StatusCode;
use image::ImageError;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;

use crate::{translate::TranslateError, vision::VisionError};

pub type AppResult<T> = Result<T, AppError>;
pub type AppJsonResult<T> = AppResult<Json<T>>;

#[derive(Debug, Error)]
pub enum AppError {
  MongoError(mongodb::error::Error),
  ReqwestError(reqwest::Error),
  TokioJoinError(JoinError),
  ImageError(ImageError),
  IoError(std::io::Error),
  MultipartError(MultipartError),
  SerdeJSONError(serde_json::Error),

  VisionError(VisionError),
  TranslateError(TranslateError),

  MissingData,
  BadRequest(String),
}

impl From<mongodb::error::Error> for AppError {
  fn from(error: mongodb::error::Error) -> Self {
    AppError::MongoError(error)
  }
}

impl From<reqwest::Error> for AppError {
  fn from(error: reqwest::Error) -> Self {
    AppError::ReqwestError(error)
  }
}

impl From<JoinError> for AppError {
  fn from(error: tokio::task::JoinError) -> Self {
    AppError::TokioJoinError(error)
  }
}

impl From<ImageError> for AppError {
  fn from(error: ImageError) -> Self {
    AppError::ImageError(error)
  }
}

impl From<std::io::Error> for AppError {
  fn from(error: std::io::Error) -> Self {
    AppError::IoError(error)
  }
}

impl From<MultipartError> for AppError {
  fn from(error: MultipartError) -> Self {
    AppError::MultipartError(error)
  }
}

impl From<serde_json::Error> for AppError {
  fn from(error: serde_json::Error) -> Self {
    AppError::SerdeJSONError(error)
  }
}

impl From<VisionError> for AppError {
  fn from(error: VisionError) -> Self {
    AppError::VisionError(error)
  }
}

impl From<TranslateError> for AppError {
  fn from(error: TranslateError) -> Self {
    AppError::TranslateError(error)
  }
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{self:?}")
  }
}

// Every handler error funnels through here: log it under a fresh id and only
// hand the id back to the client.
impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = match self {
      AppError::MongoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::ReqwestError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::TokioJoinError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::ImageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::MultipartError(_) => StatusCode::BAD_REQUEST,
      AppError::SerdeJSONError(_) => StatusCode::INTERNAL_SERVER_ERROR,

      AppError::VisionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::TranslateError(_) => StatusCode::INTERNAL_SERVER_ERROR,

      AppError::MissingData => StatusCode::BAD_REQUEST,
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
    };

    match self {
      AppError::MissingData => (status, Json(json!({ "error": "Missing data" }))).into_response(),
      AppError::BadRequest(message) => (status, Json(json!({ "error": message }))).into_response(),
      error => {
        let id = cuid::cuid2();
        tracing::error!(id = %id, error = %format!("{error:#?}"), "request failed");
        (status, Json(json!({ "error_id": id }))).into_response()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_codes() {
    assert_eq!(
      AppError::MissingData.into_response().status(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      AppError::BadRequest("bad".to_string()).into_response().status(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      AppError::from(TranslateError::InvalidResponse)
        .into_response()
        .status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
