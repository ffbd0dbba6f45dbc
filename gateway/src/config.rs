use std::{env, path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};

pub const DEFAULT_DEEPL_API_BASE: &str = "https://api-free.deepl.com";
pub const DEFAULT_VISION_API_BASE: &str = "https://vision.googleapis.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
  MongoDB,
  Memory,
}

impl FromStr for StoreKind {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "mongodb" => Ok(StoreKind::MongoDB),
      "memory" => Ok(StoreKind::Memory),
      _ => bail!("STORE must be either mongodb or memory, got {s}"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,

  pub deepl_api_key: String,
  pub deepl_api_base: String,
  pub vision_api_key: String,
  pub vision_api_base: String,

  pub store: StoreKind,
  pub mongodb_uri: Option<String>,
  pub mongodb_database: String,

  pub upload_dir: PathBuf,
  pub extracted_dir: PathBuf,
  pub max_objects: usize,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |key: &str| {
      lookup(key)
        .filter(|value| !value.is_empty())
        .with_context(|| format!("missing required environment variable {key}"))
    };
    let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

    let port = match lookup("PORT") {
      Some(port) => port.parse().context("PORT must be a valid port number")?,
      None => 8080,
    };

    let max_objects = match lookup("MAX_OBJECTS") {
      Some(max) => max
        .parse()
        .context("MAX_OBJECTS must be a positive integer")?,
      None => 5,
    };
    if max_objects == 0 {
      bail!("MAX_OBJECTS must be a positive integer");
    }

    let store = match lookup("STORE") {
      Some(store) => store.parse()?,
      None => StoreKind::MongoDB,
    };
    let mongodb_uri = match store {
      StoreKind::MongoDB => Some(required("MONGODB_URI")?),
      StoreKind::Memory => lookup("MONGODB_URI"),
    };

    Ok(Self {
      port,
      deepl_api_key: required("DEEPL_API_KEY")?,
      deepl_api_base: or_default("DEEPL_API_BASE", DEFAULT_DEEPL_API_BASE),
      vision_api_key: required("VISION_API_KEY")?,
      vision_api_base: or_default("VISION_API_BASE", DEFAULT_VISION_API_BASE),
      store,
      mongodb_uri,
      mongodb_database: or_default("MONGODB_DATABASE", "snaplingo"),
      upload_dir: PathBuf::from(or_default("UPLOAD_DIR", "uploads")),
      extracted_dir: PathBuf::from(or_default("EXTRACTED_DIR", "extracted")),
      max_objects,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key: &str| map.get(key).cloned()
  }

  #[test]
  fn test_defaults() {
    let config = Config::from_lookup(lookup(&[
      ("DEEPL_API_KEY", "deepl"),
      ("VISION_API_KEY", "vision"),
      ("MONGODB_URI", "mongodb://localhost:27017"),
    ]))
    .unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.store, StoreKind::MongoDB);
    assert_eq!(config.mongodb_database, "snaplingo");
    assert_eq!(config.max_objects, 5);
    assert_eq!(config.extracted_dir, PathBuf::from("extracted"));
    assert_eq!(config.deepl_api_base, DEFAULT_DEEPL_API_BASE);
  }

  #[test]
  fn test_missing_keys_are_fatal() {
    assert!(Config::from_lookup(lookup(&[("VISION_API_KEY", "vision")])).is_err());
    assert!(Config::from_lookup(lookup(&[
      ("DEEPL_API_KEY", "deepl"),
      ("VISION_API_KEY", "vision"),
    ]))
    .is_err());
  }

  #[test]
  fn test_memory_store_needs_no_uri() {
    let config = Config::from_lookup(lookup(&[
      ("DEEPL_API_KEY", "deepl"),
      ("VISION_API_KEY", "vision"),
      ("STORE", "memory"),
      ("MAX_OBJECTS", "3"),
    ]))
    .unwrap();

    assert_eq!(config.store, StoreKind::Memory);
    assert_eq!(config.mongodb_uri, None);
    assert_eq!(config.max_objects, 3);
  }

  #[test]
  fn test_invalid_numbers() {
    let base = [
      ("DEEPL_API_KEY", "deepl"),
      ("VISION_API_KEY", "vision"),
      ("STORE", "memory"),
    ];
    let mut with_port = base.to_vec();
    with_port.push(("PORT", "http"));
    assert!(Config::from_lookup(lookup(&with_port)).is_err());

    let mut with_cap = base.to_vec();
    with_cap.push(("MAX_OBJECTS", "0"));
    assert!(Config::from_lookup(lookup(&with_cap)).is_err());
  }
}
