//! JSON REST API for the Dojo academy backend.
//!
//! Exposes an axum [`Router`] backed by any [`AcademyStore`]. Every request
//! goes through one dispatcher: public routes are invoked directly; all others
//! must present a valid bearer token before the route table is consulted.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod routes;
pub mod token;

pub use config::ServerConfig;
pub use error::Error;

use std::sync::Arc;

use axum::Router;
use dojo_core::store::AcademyStore;
use tower_http::trace::TraceLayer;

use token::TokenIssuer;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the dispatcher.
pub struct AppState<S: AcademyStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenIssuer>,
  pub config: Arc<ServerConfig>,
}

impl<S: AcademyStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tokens: Arc::clone(&self.tokens),
      config: Arc::clone(&self.config),
    }
  }
}

impl<S: AcademyStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:  Arc::new(store),
      tokens: Arc::new(TokenIssuer::from_config(&config.auth)),
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AcademyStore + 'static,
{
  Router::new()
    .fallback(dispatch::dispatch::<S>)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
