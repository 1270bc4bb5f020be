//! Trivia bot binary entrypoint wiring configuration, persistence, and the webhook router.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_bot::{
    config::{AppConfig, ExecutionMode, QuestionSourceSettings, StorageSettings},
    dao::state_store::{FileStateStore, MemoryStateStore, StateStore},
    routes,
    services::{
        notifier::{ConsoleNotifier, GroupMeNotifier, Notifier},
        question_source::{CorpusSource, QuestionSource, RemoteSource},
    },
    state::{AppState, SharedState, round::SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().context("loading configuration")?;
    info!(mode = ?config.mode, "configuration loaded");

    let store = build_store(&config.game.storage).await?;
    let source = build_source(&config.game.question_source)?;
    let notifier = build_notifier(&config)?;
    let app_state = AppState::new(config, store, source, notifier, Arc::new(SystemClock));

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the configured state store.
async fn build_store(settings: &StorageSettings) -> anyhow::Result<Arc<dyn StateStore>> {
    let store: Arc<dyn StateStore> = match settings {
        StorageSettings::File { dir } => {
            info!(dir = %dir.display(), "persisting state to files");
            Arc::new(FileStateStore::new(dir.clone()))
        }
        StorageSettings::Memory {} => {
            info!("persisting state in memory only");
            Arc::new(MemoryStateStore::new())
        }
        #[cfg(feature = "couch-store")]
        StorageSettings::Couch {} => {
            use trivia_bot::dao::state_store::couchdb::{CouchConfig, CouchStateStore};

            let couch = CouchConfig::from_env().context("reading CouchDB settings")?;
            info!(base_url = %couch.base_url, database = %couch.database, "persisting state to CouchDB");
            Arc::new(
                CouchStateStore::connect(couch)
                    .await
                    .context("connecting to CouchDB")?,
            )
        }
        #[cfg(not(feature = "couch-store"))]
        StorageSettings::Couch {} => {
            anyhow::bail!("CouchDB storage requested but the `couch-store` feature is disabled")
        }
    };
    Ok(store)
}

/// Build the configured question source.
fn build_source(settings: &QuestionSourceSettings) -> anyhow::Result<Arc<dyn QuestionSource>> {
    let source: Arc<dyn QuestionSource> = match settings {
        QuestionSourceSettings::Corpus(corpus) => Arc::new(
            CorpusSource::from_file(&corpus.path, corpus.on_exhausted)
                .context("loading question corpus")?,
        ),
        QuestionSourceSettings::Remote(remote) => {
            info!(endpoint = %remote.endpoint, "fetching questions from remote provider");
            Arc::new(
                RemoteSource::new(
                    remote.endpoint.clone(),
                    remote.request_timeout(),
                    remote.retry_policy(),
                )
                .context("building question provider client")?,
            )
        }
    };
    Ok(source)
}

/// Post to the chat in production, print to the console otherwise.
fn build_notifier(config: &AppConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match config.mode {
        ExecutionMode::Production => Arc::new(
            GroupMeNotifier::new(
                config.chat.api_url.clone(),
                config.chat.access_token.clone(),
                config.chat.bot_id.clone(),
                config.game.chat_timeout(),
            )
            .context("building chat API client")?,
        ),
        ExecutionMode::Development => Arc::new(ConsoleNotifier),
    };
    Ok(notifier)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state).layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
