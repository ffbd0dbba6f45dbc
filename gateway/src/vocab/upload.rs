use std::path::Path;

use axum::{
  body::Bytes,
  extract::{DefaultBodyLimit, Multipart, State},
  response::{IntoResponse, Redirect, Response},
  routing::post,
  Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;

use crate::{
  error::AppResult,
  images,
  session::Session,
  vision::{unique_objects, NormalizedVertex},
  AppState, Detector, SharedConfig,
};

pub const MAX_UPLOAD_SIZE: usize = 16 * 1024 * 1024;

pub fn router() -> Router<AppState> {
  Router::new()
    .route("/upload", post(upload_post))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadRequest {
  file: Bytes,
  filename: String,
  language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedObject {
  pub name: String,
  pub image_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
  pub objects: Vec<UploadedObject>,
}

async fn upload_post(
  State(config): State<SharedConfig>,
  State(detector): State<Detector>,
  session: Session,
  multipart: Multipart,
) -> AppResult<Response> {
  let Some(payload) = upload_parse_multipart(multipart).await? else {
    return Ok((session, Redirect::to("/")).into_response());
  };

  tracing::debug!(session = %session.id(), language = %payload.language, "updating session language");
  session.set_language(&payload.language);

  let response = upload_create(config, detector, payload).await?;
  Ok((session, Json(response)).into_response())
}

async fn upload_parse_multipart(mut multipart: Multipart) -> AppResult<Option<UploadRequest>> {
  let mut file = None;
  let mut filename = None;
  let mut language = None;

  while let Some(field) = multipart.next_field().await? {
    let Some(name) = field.name() else {
      continue;
    };
    match name {
      "file" => {
        filename = field.file_name().map(str::to_owned);
        file = Some(field.bytes().await?);
      }
      "language" => {
        language = Some(field.text().await?);
      }
      _ => {}
    }
  }

  let (Some(file), Some(filename), Some(language)) = (file, filename, language) else {
    tracing::error!("upload is missing the file or language field");
    return Ok(None);
  };
  if filename.is_empty() || file.is_empty() || language.is_empty() {
    tracing::error!("no file selected");
    return Ok(None);
  }

  Ok(Some(UploadRequest {
    file,
    filename,
    language,
  }))
}

fn sanitize_filename(filename: &str) -> String {
  let name = Path::new(filename)
    .file_name()
    .and_then(|name| name.to_str())
    .unwrap_or_default();
  let name: String = name
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect();
  if name.trim_matches('.').is_empty() {
    "upload".to_owned()
  } else {
    name
  }
}

async fn upload_create(
  config: SharedConfig,
  detector: Detector,
  payload: UploadRequest,
) -> AppResult<UploadResponse> {
  tracing::info!(
    file_len = %bytefmt::format(payload.file.len() as u64),
    filename = %payload.filename,
    language = %payload.language,
    "received upload request"
  );

  let upload_path = config.upload_dir.join(sanitize_filename(&payload.filename));
  tracing::info!(path = %upload_path.display(), "saving upload");
  tokio::fs::write(&upload_path, &payload.file).await?;

  let detected = detector.detect(payload.file.clone()).await?;
  let objects = unique_objects(detected, config.max_objects);

  let file = payload.file;
  let extracted_dir = config.extracted_dir.clone();
  let polygons: Vec<Vec<NormalizedVertex>> = objects
    .iter()
    .map(|object| object.bounding_poly.normalized_vertices.clone())
    .collect();
  let filenames = spawn_blocking(move || {
    let image = images::load_bytes_guessed(&file)?;
    tracing::debug!(
      width = image.width(),
      height = image.height(),
      "decoded image"
    );
    images::extract_objects(&image, polygons.iter().map(Vec::as_slice), &extracted_dir)
  })
  .await??;

  counter!("snaplingo_objects_extracted_total", filenames.len() as u64);

  Ok(UploadResponse {
    objects: objects
      .into_iter()
      .zip(filenames)
      .map(|(object, image_path)| UploadedObject {
        name: object.name,
        image_path,
      })
      .collect(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("cat.jpg"), "cat.jpg");
    assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
    assert_eq!(sanitize_filename(".."), "upload");
    assert_eq!(sanitize_filename(""), "upload");
  }
}
