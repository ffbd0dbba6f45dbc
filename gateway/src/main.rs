use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use http::{request, HeaderValue, Method, Request};
use hyper::Body;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::{
  compression::CompressionLayer,
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};
use tracing_subscriber::prelude::*;

use crate::{
  config::{Config, StoreKind},
  session::{Sessions, SessionsInner},
  translate::{DeepLClient, Translator},
  vision::{ObjectDetector, VisionClient},
  vocab::{
    db::MissedWords,
    store::{MemoryStore, MissedWordStore, MongoStore},
  },
};

mod config;
mod error;
mod images;
mod routes;
mod session;
mod translate;
mod views;
mod vision;
mod vocab;

pub type HttpClient = reqwest::Client;
pub type SharedConfig = Arc<Config>;
pub type Detector = Arc<dyn ObjectDetector>;
pub type TranslatorClient = Arc<dyn Translator>;

#[derive(Clone, FromRef)]
pub struct AppState {
  config: SharedConfig,
  detector: Detector,
  translator: TranslatorClient,
  missed_words: MissedWords,
  sessions: Sessions,
}

#[tokio::main]
async fn main() -> Result<()> {
  // initialize tracing
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "snaplingo_gateway=debug,tower_http=debug".into()),
    ))
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::debug!("starting snaplingo gateway");

  let config = Config::from_env()?;
  tokio::fs::create_dir_all(&config.upload_dir)
    .await
    .with_context(|| format!("creating {}", config.upload_dir.display()))?;
  tokio::fs::create_dir_all(&config.extracted_dir)
    .await
    .with_context(|| format!("creating {}", config.extracted_dir.display()))?;

  // metrics
  let metric_handle = PrometheusBuilder::new().install_recorder()?;
  // http client
  let http = reqwest::Client::new();
  // external services
  let detector: Detector = Arc::new(VisionClient::new(
    http.clone(),
    config.vision_api_base.clone(),
    config.vision_api_key.clone(),
  ));
  let translator: TranslatorClient = Arc::new(DeepLClient::new(
    http.clone(),
    config.deepl_api_base.clone(),
    config.deepl_api_key.clone(),
  ));
  // missed word store
  let store: Arc<dyn MissedWordStore> = match config.store {
    StoreKind::MongoDB => {
      let uri = config
        .mongodb_uri
        .as_deref()
        .context("MONGODB_URI is required for the mongodb store")?;
      tracing::debug!(database = %config.mongodb_database, "connecting to mongodb");
      Arc::new(MongoStore::connect(uri, &config.mongodb_database).await?)
    }
    StoreKind::Memory => {
      tracing::warn!("using the in-memory store, missed words are lost on restart");
      Arc::new(MemoryStore::new())
    }
  };

  let port = config.port;
  let extracted_dir = config.extracted_dir.clone();
  let state = AppState {
    config: Arc::new(config),
    detector,
    translator,
    missed_words: MissedWords::new(store),
    sessions: Arc::new(SessionsInner::new()),
  };

  let router = Router::new()
    .merge(routes::router(metric_handle, &extracted_dir))
    .with_state(state)
    .layer(
      CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(AllowOrigin::predicate(
          |origin: &HeaderValue, _request_parts: &request::Parts| {
            let origin = origin.as_bytes();
            origin == b"http://localhost"
              || origin == b"https://localhost"
              || origin.starts_with(b"http://localhost:")
              || origin.starts_with(b"https://localhost:")
          },
        ))
        .allow_credentials(true)
        .max_age(Duration::from_secs(60) * 5),
    )
    .layer(
      TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::debug_span!(
          "request",
          id = %cuid::cuid2(),
          method = %request.method(),
          uri = %request.uri(),
          version = ?request.version()
        )
      }),
    )
    .layer(CompressionLayer::new());

  let addr = SocketAddr::from(([0, 0, 0, 0], port));
  tracing::info!("listening on http://localhost:{}", port);
  axum::Server::bind(&addr)
    .serve(router.into_make_service())
    .await?;

  Ok(())
}
