use std::path::Path;

use axum::{
  extract::State,
  response::{Html, IntoResponse},
  routing::get,
  Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tower_http::services::ServeDir;

use crate::{
  config::StoreKind,
  session::{Session, Sessions},
  views, vocab, AppState, SharedConfig,
};

pub fn router(metric_handle: PrometheusHandle, extracted_dir: &Path) -> Router<AppState> {
  Router::new()
    .route("/", get(root))
    .route("/status/v1", get(status_v1))
    .route("/metrics", get(|| async move { metric_handle.render() }))
    .nest_service("/extracted", ServeDir::new(extracted_dir))
    .merge(vocab::router())
}

async fn root(session: Session) -> impl IntoResponse {
  let language = session.language();
  (session, Html(views::index(&language)))
}

async fn status_v1(
  State(config): State<SharedConfig>,
  State(sessions): State<Sessions>,
) -> Json<serde_json::Value> {
  Json(json!({
    "version": env!("CARGO_PKG_VERSION"),
    "sessions": sessions.len(),
    "store": match config.store {
      StoreKind::MongoDB => "mongodb",
      StoreKind::Memory => "memory",
    },
    "max_objects": config.max_objects,
  }))
}
