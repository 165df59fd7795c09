use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

mod handlers;
mod logic;
mod sessions;
mod state;

use crate::handlers::{health_handler, root_handler, session_handler, ws_handler};
use crate::state::{AppState, Limits, DEFAULT_MAX_IMAGE_BYTES};

#[derive(Parser)]
#[command(author, version, about = "Relay server for inkroom whiteboard sessions")]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    #[arg(long, env = "INKROOM_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,
    #[arg(long, env = "INKROOM_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,
    /// Largest accepted canvas frame, in bytes of data URL.
    #[arg(long, env = "INKROOM_MAX_IMAGE_BYTES", default_value_t = DEFAULT_MAX_IMAGE_BYTES)]
    max_image_bytes: usize,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server crashed: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkroom_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));
    let index_file = public_dir.join("index.html");
    let state = AppState::new(
        Limits {
            max_image_bytes: args.max_image_bytes,
        },
        index_file,
    );

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/s/:session_id", get(session_handler))
        .route("/ws/:session_id", get(ws_handler))
        .fallback_service(ServeDir::new(&public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(public_dir = %public_dir.display(), "Whiteboard running at http://{addr}");

    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
