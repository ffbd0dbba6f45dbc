use std::collections::HashSet;

use async_trait::async_trait;
use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::HttpClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVertex {
  #[serde(default)]
  pub x: f32,
  #[serde(default)]
  pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
  #[serde(default, rename = "normalizedVertices")]
  pub normalized_vertices: Vec<NormalizedVertex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
  pub name: String,
  #[serde(default)]
  pub score: f32,
  #[serde(default, rename = "boundingPoly")]
  pub bounding_poly: BoundingPoly,
}

#[derive(Debug, Clone, Error)]
pub enum VisionError {
  #[error("vision api error {code}: {message}")]
  Api { code: i32, message: String },
  #[error("vision api returned no response")]
  EmptyResponse,
}

#[async_trait]
pub trait ObjectDetector: Send + Sync {
  async fn detect(&self, image: Bytes) -> crate::error::AppResult<Vec<DetectedObject>>;
}

pub fn unique_objects(objects: Vec<DetectedObject>, cap: usize) -> Vec<DetectedObject> {
  let mut seen = HashSet::new();
  let mut unique = Vec::new();
  for object in objects {
    if unique.len() >= cap {
      break;
    }
    if seen.insert(object.name.clone()) {
      unique.push(object);
    }
  }
  unique
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
  #[serde(default)]
  responses: Vec<AnnotateImageResponse>,
  error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
  #[serde(default, rename = "localizedObjectAnnotations")]
  localized_object_annotations: Vec<DetectedObject>,
  error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
  #[serde(default)]
  code: i32,
  #[serde(default)]
  message: String,
}

pub fn parse_annotate_response(body: &str) -> crate::error::AppResult<Vec<DetectedObject>> {
  let res: AnnotateResponse = serde_json::from_str(body)?;
  if let Some(status) = res.error {
    return Err(
      VisionError::Api {
        code: status.code,
        message: status.message,
      }
      .into(),
    );
  }
  let res = res
    .responses
    .into_iter()
    .next()
    .ok_or(VisionError::EmptyResponse)?;
  if let Some(status) = res.error {
    return Err(
      VisionError::Api {
        code: status.code,
        message: status.message,
      }
      .into(),
    );
  }
  Ok(res.localized_object_annotations)
}

#[derive(Debug)]
pub struct VisionClient {
  client: HttpClient,
  base: String,
  api_key: String,
}

impl VisionClient {
  pub fn new(client: HttpClient, base: String, api_key: String) -> Self {
    Self {
      client,
      base,
      api_key,
    }
  }
}

#[async_trait]
impl ObjectDetector for VisionClient {
  async fn detect(&self, image: Bytes) -> crate::error::AppResult<Vec<DetectedObject>> {
    let body = json!({
      "requests": [{
        "image": { "content": STANDARD.encode(&image) },
        "features": [{ "type": "OBJECT_LOCALIZATION" }],
      }]
    });

    let res = self
      .client
      .post(&format!("{}/v1/images:annotate", self.base))
      .query(&[("key", &self.api_key)])
      .json(&body)
      .send()
      .await?;

    let text = res.text().await?;
    let objects = parse_annotate_response(&text)?;
    tracing::debug!(
      objects = ?objects.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
      "detected objects"
    );
    Ok(objects)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::AppError;

  fn object(name: &str) -> DetectedObject {
    DetectedObject {
      name: name.to_string(),
      score: 0.9,
      bounding_poly: BoundingPoly::default(),
    }
  }

  fn names(objects: &[DetectedObject]) -> Vec<&str> {
    objects.iter().map(|o| o.name.as_str()).collect()
  }

  #[test]
  fn test_unique_objects_first_wins() {
    let objects = vec![object("A"), object("B"), object("A"), object("C")];
    assert_eq!(names(&unique_objects(objects, 5)), ["A", "B", "C"]);
  }

  #[test]
  fn test_unique_objects_cap() {
    let objects = ["A", "B", "B", "C", "D", "E", "F", "G"]
      .into_iter()
      .map(object)
      .collect();
    assert_eq!(
      names(&unique_objects(objects, 5)),
      ["A", "B", "C", "D", "E"]
    );
  }

  #[test]
  fn test_parse_annotate_response() {
    let body = r#"{
      "responses": [{
        "localizedObjectAnnotations": [{
          "mid": "/m/01yrx",
          "name": "Cat",
          "score": 0.93,
          "boundingPoly": {
            "normalizedVertices": [
              {"y": 0.1},
              {"x": 0.5, "y": 0.1},
              {"x": 0.5, "y": 0.9},
              {"y": 0.9}
            ]
          }
        }]
      }]
    }"#;

    let objects = parse_annotate_response(body).unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name, "Cat");
    let vertices = &objects[0].bounding_poly.normalized_vertices;
    assert_eq!(vertices.len(), 4);
    assert_eq!(vertices[0], NormalizedVertex { x: 0.0, y: 0.1 });
  }

  #[test]
  fn test_parse_annotate_empty_image() {
    let objects = parse_annotate_response(r#"{"responses":[{}]}"#).unwrap();
    assert!(objects.is_empty());
  }

  #[test]
  fn test_parse_annotate_error() {
    let body = r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#;
    assert!(matches!(
      parse_annotate_response(body),
      Err(AppError::VisionError(VisionError::Api { code: 3, .. }))
    ));
  }

  #[test]
  fn test_parse_annotate_request_error() {
    let body = r#"{"error":{"code":403,"message":"API key not valid.","status":"PERMISSION_DENIED"}}"#;
    match parse_annotate_response(body) {
      Err(AppError::VisionError(VisionError::Api { code, message })) => {
        assert_eq!(code, 403);
        assert_eq!(message, "API key not valid.");
      }
      other => panic!("unexpected result: {other:?}"),
    }
  }
}
