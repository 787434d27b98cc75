// crates/edge/src/cli.rs

use crate::error::{Error, Result};
use crate::router::{build_router, AppState};
use crate::watch::{watch_content, ContentWatcher};
use adapt::cache::InMemoryCache;
use adapt::media::MediaLibrary;
use adapt::store::FsContentStore;
use anyhow::Context;
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::setting::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use std::{path::PathBuf, process::ExitCode};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Trellis CLI
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start(start) => do_start(start).await,
    };

    result.map_or_else(
        |e| {
            error!("Trellis stopped with an error: {:#}", e);
            ExitCode::FAILURE
        },
        |_| {
            info!("Trellis shut down cleanly");
            ExitCode::SUCCESS
        },
    )
}

#[tracing::instrument(skip_all)]
async fn do_start(start: StartCmd) -> anyhow::Result<()> {
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings_file(start)
        .context("loading settings")?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.load_content().context("loading content")?;
    info!(
        "Content loaded in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.start_server().await.context("starting server")?;
    info!(
        "Server started in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    process.is_running().await?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "trellis", version, about = "Headless content API over a directory of JSON")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the site in the specified directory
    Start(StartCmd),
}

#[derive(Parser, Debug)]
pub struct StartCmd {
    /// Site directory holding settings.toml (or set TRELLIS_DIR)
    #[arg(
        value_name = "DIR",
        env = "TRELLIS_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    command: StartCmd,
    settings: Settings,
}

struct ContentLoaded {
    settings: Arc<Settings>,
    state: AppState,
}

struct ServerStarted {
    addr: SocketAddr,
    server: tokio::task::JoinHandle<std::io::Result<()>>,
    shutdown_tx: oneshot::Sender<()>,
    watcher: ContentWatcher,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for ContentLoaded {}
impl ProcessState for ServerStarted {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    /// Load settings from `<dir>/settings.toml`.
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(command: StartCmd) -> Result<StartProcess<SettingsLoaded>> {
        let path = command.dir.join("settings.toml");
        if !path.exists() {
            return Err(Error::Config(format!(
                "settings.toml not found at {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|err| Error::Config(format!("Failed reading {}: {}", path.display(), err)))?;

        let settings: Settings = toml::from_str(&text).map_err(|err| {
            Error::Config(format!(
                "Invalid settings.toml at {}: {}",
                path.display(),
                err
            ))
        })?;

        Ok(StartProcess {
            state: SettingsLoaded { command, settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    /// Scan the content directory and wire up the request collaborators.
    #[tracing::instrument(skip_all)]
    fn load_content(self) -> Result<StartProcess<ContentLoaded>> {
        let dir = &self.state.command.dir;
        let settings = Arc::new(self.state.settings);

        let store = FsContentStore::from_settings(dir, &settings)?;
        let languages: Vec<&str> = settings.languages.iter().map(|l| l.code.as_str()).collect();
        info!(
            "content root {} with languages [{}] (default {})",
            store.root().display(),
            languages.join(", "),
            settings.default_language().map_or("none", |l| l.code.as_str())
        );
        let media = MediaLibrary::new(
            settings.server.base_url.clone(),
            dir.join(&settings.media.dir),
            settings.media.placeholder_size,
        );

        let state = AppState {
            store: Arc::new(store),
            media: Arc::new(media),
            cache: Arc::new(InMemoryCache::new()),
            settings: Arc::clone(&settings),
        };
        Ok(StartProcess {
            state: ContentLoaded { settings, state },
        })
    }
}

impl StartProcess<ContentLoaded> {
    #[tracing::instrument(skip_all)]
    async fn start_server(self) -> Result<StartProcess<ServerStarted>> {
        let server_settings = &self.state.settings.server;
        let listener = TcpListener::bind((server_settings.ip, server_settings.port)).await?;
        let addr = listener.local_addr()?;

        let state = self.state.state;
        let watcher = watch_content(
            Arc::clone(&state.store),
            Arc::clone(&state.media),
            Arc::clone(&state.cache),
        )?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = build_router(state);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("listening on http://{}", addr);
        Ok(StartProcess {
            state: ServerStarted {
                addr,
                server,
                shutdown_tx,
                watcher,
            },
        })
    }
}

impl StartProcess<ServerStarted> {
    /// Serve until interrupted, then drain and stop.
    #[tracing::instrument(skip_all, fields(addr = %self.state.addr))]
    async fn is_running(self) -> Result<()> {
        let ServerStarted {
            mut server,
            shutdown_tx,
            watcher,
            ..
        } = self.state;

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("interrupt received, shutting down");
                let _ = shutdown_tx.send(());
                watcher.stop().await;
                server.await??;
            }
            res = &mut server => {
                watcher.stop().await;
                res??;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn dir_must_exist_rejects_files_and_missing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("settings.toml");
        fs::write(&file, "").unwrap();

        assert!(dir_must_exist(dir.path().to_str().unwrap()).is_ok());
        assert!(dir_must_exist(file.to_str().unwrap())
            .unwrap_err()
            .starts_with("Not a directory"));
        assert!(dir_must_exist("/definitely/not/here")
            .unwrap_err()
            .starts_with("Not found"));
    }

    #[test]
    fn settings_and_content_load() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.toml"),
            r#"
prefix_default_locale = false
fallback_frontend_url = "https://fallback.test"

[server]
ip = "127.0.0.1"
port = 0
base_url = "http://127.0.0.1:8080"

[[languages]]
code = "en"
name = "English"
default = true
"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("content/1_home")).unwrap();
        fs::write(dir.path().join("content/1_home/home.json"), "{}").unwrap();

        let command = StartCmd {
            dir: dir.path().to_path_buf(),
        };
        let process = StartProcess::<CommandIssued>::parse_settings_file(command).unwrap();
        assert_eq!(process.state.settings.fallback_frontend_url, "https://fallback.test");
        assert_eq!(process.state.settings.panel_path, "/panel");

        let process = process.load_content().unwrap();
        let tree = process.state.state.store.snapshot();
        use serve::tree::ContentTree;
        assert!(tree.page("home").is_some());
        assert_eq!(tree.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn missing_or_invalid_settings_are_config_errors() {
        let dir = tempdir().unwrap();
        let command = StartCmd {
            dir: dir.path().to_path_buf(),
        };
        assert!(matches!(
            StartProcess::<CommandIssued>::parse_settings_file(command),
            Err(Error::Config(_))
        ));

        fs::write(dir.path().join("settings.toml"), "[server]\nport = \"x\"").unwrap();
        let command = StartCmd {
            dir: dir.path().to_path_buf(),
        };
        assert!(matches!(
            StartProcess::<CommandIssued>::parse_settings_file(command),
            Err(Error::Config(_))
        ));
    }
}
