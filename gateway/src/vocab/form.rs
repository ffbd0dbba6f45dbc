use std::collections::HashMap;

use axum::body::Bytes;
use http::{header, HeaderMap};

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListForm(HashMap<String, Vec<String>>);

impl ListForm {
  pub fn parse(headers: &HeaderMap, body: &Bytes) -> AppResult<Self> {
    if is_json(headers) {
      Self::from_json(body)
    } else {
      Ok(Self::from_urlencoded(body))
    }
  }

  pub fn from_urlencoded(body: &[u8]) -> Self {
    let mut fields = HashMap::<String, Vec<String>>::new();
    for (key, value) in url::form_urlencoded::parse(body) {
      fields
        .entry(normalize_key(&key))
        .or_default()
        .push(value.into_owned());
    }
    Self(fields)
  }

  pub fn from_json(body: &[u8]) -> AppResult<Self> {
    let value: serde_json::Value = serde_json::from_slice(body)
      .map_err(|_| AppError::BadRequest("Request body is not valid JSON".to_string()))?;
    let object = value
      .as_object()
      .ok_or_else(|| AppError::BadRequest("Request body must be a JSON object".to_string()))?;

    let mut fields = HashMap::new();
    for (key, value) in object {
      let values = match value {
        serde_json::Value::Array(items) => items.iter().filter_map(json_scalar).collect(),
        other => json_scalar(other).into_iter().collect(),
      };
      fields.insert(normalize_key(key), values);
    }
    Ok(Self(fields))
  }

  pub fn list(&self, name: &str) -> &[String] {
    self.0.get(name).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn first(&self, name: &str) -> Option<&str> {
    self
      .list(name)
      .first()
      .map(String::as_str)
      .filter(|value| !value.is_empty())
  }
}

fn normalize_key(key: &str) -> String {
  key.strip_suffix("[]").unwrap_or(key).to_owned()
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
  match value {
    serde_json::Value::String(s) => Some(s.clone()),
    serde_json::Value::Number(n) => Some(n.to_string()),
    serde_json::Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

pub fn is_json(headers: &HeaderMap) -> bool {
  headers
    .get(header::CONTENT_TYPE)
    .and_then(|value| value.to_str().ok())
    .map(|value| value.starts_with("application/json"))
    .unwrap_or(false)
}

pub fn wants_json(headers: &HeaderMap) -> bool {
  headers
    .get(header::ACCEPT)
    .and_then(|value| value.to_str().ok())
    .map(|value| value.contains("application/json"))
    .unwrap_or(false)
}
