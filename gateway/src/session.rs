use std::{convert::Infallible, sync::Arc};

use axum::{
  async_trait,
  extract::{FromRef, FromRequestParts},
  headers::{Cookie, HeaderMapExt},
  response::{IntoResponseParts, ResponseParts},
};
use dashmap::DashMap;
use http::{header, request::Parts, HeaderValue};

pub const SESSION_COOKIE: &str = "snaplingo_session";
pub const DEFAULT_LANGUAGE: &str = "BG";

#[derive(Debug, Clone, Default)]
pub struct SessionData {
  pub language: Option<String>,
}

#[derive(Debug, Default)]
pub struct SessionsInner {
  sessions: DashMap<String, SessionData>,
}

impl SessionsInner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.sessions.len()
  }
}

pub type Sessions = Arc<SessionsInner>;

#[derive(Debug, Clone)]
pub struct Session {
  id: String,
  fresh: bool,
  store: Sessions,
}

impl Session {
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn language(&self) -> String {
    self
      .store
      .sessions
      .get(&self.id)
      .and_then(|data| data.language.clone())
      .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned())
  }

  pub fn set_language(&self, language: &str) {
    self
      .store
      .sessions
      .entry(self.id.clone())
      .or_default()
      .language = Some(language.to_owned());
  }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
  Sessions: FromRef<S>,
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let store = Sessions::from_ref(state);

    let existing = parts
      .headers
      .typed_get::<Cookie>()
      .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_owned))
      .filter(|id| store.sessions.contains_key(id));

    // entries are only created by set_language
    let (id, fresh) = match existing {
      Some(id) => (id, false),
      None => (cuid::cuid2(), true),
    };

    Ok(Session { id, fresh, store })
  }
}

impl IntoResponseParts for Session {
  type Error = Infallible;

  fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
    if self.fresh {
      let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        self.id
      );
      if let Ok(value) = HeaderValue::from_str(&cookie) {
        res.headers_mut().append(header::SET_COOKIE, value);
      }
    }
    Ok(res)
  }
}

#[cfg(test)]
mod tests {
  use http::Request;

  use super::*;

  async fn extract(sessions: &Sessions, cookie: Option<&str>) -> Session {
    let mut req = Request::builder().uri("/");
    if let Some(cookie) = cookie {
      req = req.header(header::COOKIE, cookie);
    }
    let (mut parts, _) = req.body(()).unwrap().into_parts();
    Session::from_request_parts(&mut parts, sessions)
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn test_default_language() {
    let sessions = Sessions::default();
    let session = extract(&sessions, None).await;
    assert!(session.fresh);
    assert_eq!(session.language(), DEFAULT_LANGUAGE);
  }

  #[tokio::test]
  async fn test_language_sticks_to_cookie() {
    let sessions = Sessions::default();
    let session = extract(&sessions, None).await;
    session.set_language("ES");

    let cookie = format!("other=1; {SESSION_COOKIE}={}", session.id());
    let again = extract(&sessions, Some(&cookie)).await;
    assert!(!again.fresh);
    assert_eq!(again.language(), "ES");

    let stranger = extract(&sessions, None).await;
    assert_eq!(stranger.language(), DEFAULT_LANGUAGE);
    assert_eq!(sessions.len(), 1);
  }

  #[tokio::test]
  async fn test_reads_do_not_grow_sessions() {
    let sessions = Sessions::default();
    for i in 0..100 {
      let session = extract(&sessions, None).await;
      assert_eq!(session.language(), DEFAULT_LANGUAGE);

      let cookie = format!("{SESSION_COOKIE}=forged{i}");
      let forged = extract(&sessions, Some(&cookie)).await;
      assert!(forged.fresh);
      assert_ne!(forged.id(), format!("forged{i}"));
      assert_eq!(forged.language(), DEFAULT_LANGUAGE);
    }
    assert_eq!(sessions.len(), 0);
  }
}
