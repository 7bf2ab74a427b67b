mod pages;
mod routes;
mod session;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clap::{Parser, ValueEnum};
use cottage_inspector::{Inspector, InspectorBuilder};
use cottage_protocol::ClassLabel;
use cottage_session::{
    CookieSigner, FileSessionStore, InMemorySessionStore, SessionStore, spawn_sweeper,
};
use cottage_vision::{ClassifierPort, OnnxClassifier, PreprocessConfig, StaticClassifier};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Parser)]
#[command(name = "cottage-web")]
#[command(about = "Cottage exterior inspection web app")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1:5001")]
    listen: SocketAddr,
    /// ONNX export of the condition classifier.
    #[arg(long, default_value = "model.onnx")]
    model: PathBuf,
    /// Skip the model and classify every image as this label (demos, smoke tests).
    #[arg(long)]
    fixed_label: Option<ClassLabel>,
    /// Persist sessions as JSON files here instead of in memory.
    #[arg(long)]
    session_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 3600)]
    session_ttl_secs: u64,
    #[arg(long, env = "COTTAGE_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,
    #[arg(long, default_value_t = 16 * 1024 * 1024)]
    max_upload_bytes: usize,
    /// Enables `/debug/session`.
    #[arg(long)]
    debug: bool,
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[derive(Clone)]
struct AppState {
    inspector: Inspector,
    signer: CookieSigner,
    debug: bool,
    max_upload_bytes: usize,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let preprocess = PreprocessConfig::default();
    let classifier = load_classifier(&cli, &preprocess)?;
    let store = session_store(&cli);
    let sweeper = spawn_sweeper(Arc::clone(&store), SWEEP_INTERVAL);

    let inspector = InspectorBuilder::new(classifier)
        .preprocess(preprocess)
        .session_store(store)
        .build();

    let signer = match cli.secret_key.as_deref() {
        Some(key) => CookieSigner::new(key.as_bytes()).context("invalid --secret-key")?,
        None => {
            warn!("no secret key configured, sessions will not survive a restart");
            CookieSigner::random()?
        }
    };

    let state = AppState {
        inspector,
        signer,
        debug: cli.debug,
        max_upload_bytes: cli.max_upload_bytes,
    };
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed binding {}", cli.listen))?;
    info!(listen = %cli.listen, debug = cli.debug, "cottage-web listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

fn load_classifier(cli: &Cli, preprocess: &PreprocessConfig) -> Result<Arc<dyn ClassifierPort>> {
    if let Some(label) = cli.fixed_label {
        warn!(label = %label, "no model loaded, every image will be classified as the fixed label");
        return Ok(Arc::new(StaticClassifier::for_label(label)));
    }

    let classifier = OnnxClassifier::load(&cli.model, preprocess)
        .with_context(|| format!("failed loading classifier from {:?}", cli.model))?;
    Ok(Arc::new(classifier))
}

fn session_store(cli: &Cli) -> Arc<dyn SessionStore> {
    let ttl = Duration::from_secs(cli.session_ttl_secs);
    match &cli.session_dir {
        Some(dir) => {
            info!(dir = %dir.display(), ttl_secs = cli.session_ttl_secs, "file-backed sessions");
            Arc::new(FileSessionStore::new(dir, ttl))
        }
        None => Arc::new(InMemorySessionStore::new(ttl)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    {
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(error) => {
                    tracing::error!(%error, "failed to install SIGTERM handler");
                }
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use cottage_protocol::ClassLabel;

    use super::{Cli, LogFormat};

    #[test]
    fn defaults_match_the_documented_configuration() {
        let cli = Cli::try_parse_from(["cottage-web"]).unwrap();
        assert_eq!(cli.listen.to_string(), "127.0.0.1:5001");
        assert_eq!(cli.session_ttl_secs, 3600);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(!cli.debug);
        assert!(cli.fixed_label.is_none());
    }

    #[test]
    fn fixed_label_accepts_human_names() {
        let cli = Cli::try_parse_from(["cottage-web", "--fixed-label", "Major Crack"]).unwrap();
        assert_eq!(cli.fixed_label, Some(ClassLabel::MajorCrack));
        assert!(Cli::try_parse_from(["cottage-web", "--fixed-label", "Mould"]).is_err());
    }
}
