//! Command-line entry point for the theme scheduler.

mod config_override;

use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use autotheme_core::SystemClock;
use autotheme_core::ThemeScheduler;
use autotheme_core::config::Config;
use autotheme_core::config::ConfigOverrides;
use autotheme_host_client::HostRpcClient;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use config_override::CliConfigOverrides;

const DEFAULT_LOG_FILTER: &str = "autotheme_core=info,autotheme_host_client=info,autotheme_cli=info";
const LOG_FILE_NAME: &str = "autotheme.log";

/// Switch the terminal color preset between day and night.
///
/// With no subcommand the scheduler connects to the host bridge and keeps
/// applying the preset for the current hour until interrupted.
#[derive(Debug, Parser)]
#[command(name = "autotheme", version)]
pub struct Cli {
    #[clap(flatten)]
    pub config_overrides: CliConfigOverrides,

    /// Unix socket of the terminal host bridge.
    #[arg(long, value_name = "PATH", global = true)]
    pub socket: Option<PathBuf>,

    /// Append logs to `autotheme.log` in this directory as well as stderr.
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Apply the current theme once and exit instead of polling.
    #[arg(long, default_value_t = false)]
    pub once: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, clap::Subcommand)]
pub enum Command {
    /// Verify the host bridge and preset catalog without applying anything.
    Check,

    /// Print the theme for the current hour without contacting the host.
    Now,
}

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let _log_guard = init_logging(cli.log_dir.as_deref())?;

    let cli_kv_overrides = cli
        .config_overrides
        .parse_overrides()
        .map_err(anyhow::Error::msg)?;
    let overrides = ConfigOverrides {
        socket_path: cli.socket.clone(),
    };
    let config = Config::load_with_cli_overrides(cli_kv_overrides, overrides)
        .context("failed to load configuration")?;

    match cli.command {
        Some(Command::Now) => {
            let theme = config.schedule.window.current_theme(&SystemClock);
            println!("{theme} ({})", config.schedule.preset_for(theme));
            Ok(())
        }
        Some(Command::Check) => {
            let running = connect(&config).await?.initialize().await?;
            let theme = running.current_theme();
            println!(
                "ok: application {}, presets {} and {} available; current theme {theme} ({})",
                running.app().id,
                config.schedule.day_preset,
                config.schedule.night_preset,
                config.schedule.preset_for(theme),
            );
            Ok(())
        }
        None => {
            let running = connect(&config).await?.initialize().await?;
            if cli.once {
                let report = running.run_cycle().await?;
                println!(
                    "{} ({}): applied to {} session(s), {} failed",
                    report.theme,
                    report.preset,
                    report.applied,
                    report.failed.len()
                );
                if report.applied == 0 && !report.failed.is_empty() {
                    anyhow::bail!(
                        "{} could not be applied to any of {} session(s)",
                        report.preset,
                        report.failed.len()
                    );
                }
                return Ok(());
            }

            tokio::select! {
                result = running.run() => {
                    result.context("theme scheduler stopped")?;
                    Ok(())
                }
                result = tokio::signal::ctrl_c() => {
                    result.context("failed to listen for ctrl-c")?;
                    info!("interrupted, exiting");
                    Ok(())
                }
            }
        }
    }
}

async fn connect(config: &Config) -> anyhow::Result<ThemeScheduler<HostRpcClient>> {
    let client = HostRpcClient::connect(&config.socket_path)
        .await
        .with_context(|| {
            format!(
                "failed to connect to terminal host at {}",
                config.socket_path.display()
            )
        })?;
    Ok(ThemeScheduler::with_system_clock(
        client,
        config.schedule.clone(),
    ))
}

/// Install the stderr subscriber and, when `log_dir` is given, a second
/// layer appending to `autotheme.log`. The returned guard flushes the file
/// writer on drop.
fn init_logging(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    // Use the RUST_LOG env var when it is set and valid.
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let Some(log_dir) = log_dir else {
        let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Ensure the file is only readable and writable by the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join(LOG_FILE_NAME))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_filter(env_filter());

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    Ok(Some(guard))
}
