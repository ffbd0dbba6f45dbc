use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::HttpClient;

pub static LANGUAGES: &[(&str, &str)] = &[
  ("English", "EN"),
  ("Bulgarian", "BG"),
  ("Japanese", "JA"),
  ("Spanish", "ES"),
  ("French", "FR"),
  ("Chinese (Simplified)", "ZH"),
  ("Danish", "DA"),
  ("Dutch", "NL"),
  ("German", "DE"),
  ("Greek", "EL"),
  ("Hungarian", "HU"),
  ("Italian", "IT"),
  ("Polish", "PL"),
  ("Portuguese", "PT"),
  ("Romanian", "RO"),
  ("Russian", "RU"),
  ("Slovak", "SK"),
  ("Slovenian", "SL"),
  ("Swedish", "SV"),
];

pub const SOURCE_LANGUAGE: &str = "EN";

pub fn language_code(label: &str) -> &str {
  if label == "JP" {
    return "JA";
  }
  LANGUAGES
    .iter()
    .find(|(name, _)| *name == label)
    .map(|(_, code)| *code)
    .unwrap_or(label)
}

#[derive(Debug, Error)]
pub enum TranslateError {
  #[error("Translation response is invalid")]
  InvalidResponse,
  #[error("translation request failed: {0}")]
  Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait Translator: Send + Sync {
  async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError>;
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
  translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
  text: String,
}

pub fn parse_deepl_response(body: &str) -> Result<String, TranslateError> {
  let res: DeepLResponse = serde_json::from_str(body).map_err(|err| {
    tracing::error!(error = %err, "error extracting translation");
    TranslateError::InvalidResponse
  })?;
  res
    .translations
    .into_iter()
    .next()
    .map(|translation| translation.text)
    .ok_or(TranslateError::InvalidResponse)
}

#[derive(Debug)]
pub struct DeepLClient {
  client: HttpClient,
  base: String,
  auth_key: String,
}

impl DeepLClient {
  pub fn new(client: HttpClient, base: String, auth_key: String) -> Self {
    Self {
      client,
      base,
      auth_key,
    }
  }
}

#[async_trait]
impl Translator for DeepLClient {
  async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
    let target_lang = language_code(target_language);

    let res = self
      .client
      .post(&format!("{}/v2/translate", self.base))
      .header(
        http::header::AUTHORIZATION,
        format!("DeepL-Auth-Key {}", self.auth_key),
      )
      .form(&[
        ("text", text),
        ("source_lang", SOURCE_LANGUAGE),
        ("target_lang", target_lang),
      ])
      .send()
      .await?;

    let body = res.text().await?;
    tracing::debug!(body = %body, "deepl api response");

    parse_deepl_response(&body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_language_code() {
    assert_eq!(language_code("Spanish"), "ES");
    assert_eq!(language_code("Chinese (Simplified)"), "ZH");
    assert_eq!(language_code("JP"), "JA");
    assert_eq!(language_code("ES"), "ES");
    assert_eq!(language_code("Klingon"), "Klingon");
  }

  #[test]
  fn test_parse_response() {
    let body = r#"{"translations":[{"detected_source_language":"EN","text":"gato"}]}"#;
    assert_eq!(parse_deepl_response(body).unwrap(), "gato");
  }

  #[test]
  fn test_parse_invalid_response() {
    for body in [
      r#"{"message":"Wrong endpoint"}"#,
      r#"{"translations":[]}"#,
      "<html>Forbidden</html>",
    ] {
      assert!(matches!(
        parse_deepl_response(body),
        Err(TranslateError::InvalidResponse)
      ));
    }
  }
}
