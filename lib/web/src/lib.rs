//! Web shell for SPARQL Analytics.
//!
//! One axum application: the query form and result views live under
//! `/app`, with per-session state keyed by a cookie. All heavy lifting is
//! delegated to the client, viz, regression and export crates.

use axum::response::Redirect;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::str::FromStr;
use tower_http::trace::TraceLayer;

mod app;
mod config;
mod error;
mod negotiate;
mod session;
mod state;

use crate::app::create_app_routes;
pub use config::ServerConfig;
pub use error::ServerError;
pub use session::{QueryPhase, SessionState};
pub use state::AppState;

/// Builds the application router; separated from [`serve`] so tests can
/// drive it without binding a socket.
pub fn create_app(config: &ServerConfig) -> Router {
    let state = AppState::new(config.page_size);
    let router = Router::new()
        .route("/", get(|| async { Redirect::permanent("/app") }))
        .nest("/app", create_app_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors {
        router.layer(tower_http::cors::CorsLayer::permissive())
    } else {
        router
    }
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from_str(&config.bind)
        .or_else(|_| resolve_bind(&config.bind))?;
    let app = create_app(&config);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    Ok(axum::serve(listener, app).await?)
}

/// Accepts `host:port` strings like `localhost:7878` that are not literal
/// socket addresses.
fn resolve_bind(bind: &str) -> anyhow::Result<SocketAddr> {
    use std::net::ToSocketAddrs;
    bind.to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("could not resolve bind address {bind}"))
}
