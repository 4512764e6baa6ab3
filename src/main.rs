use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use missionboard::api::{format_api_error, ApiMode, ResourceClient};
use missionboard::config::{Config, ConfigLayer};
use missionboard::health::{ApiStatus, HealthMonitor};
use missionboard::resource::ResourceKind;
use missionboard::store::{DataStore, StoreSnapshot};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Mission orchestration board for Kubernetes
#[derive(Parser, Debug)]
#[command(name = "missionboard", version, about, long_about = None)]
struct Args {
    /// API base URL (gateway or Kubernetes API server)
    #[arg(long)]
    api_base: Option<String>,

    /// API shape served at the base URL
    #[arg(long, value_enum)]
    mode: Option<ApiMode>,

    /// Namespace for mission resources and events
    #[arg(short, long)]
    namespace: Option<String>,

    /// Auth token sent with every request
    #[arg(long)]
    token: Option<String>,

    /// Refresh interval in milliseconds (0 disables polling)
    #[arg(long)]
    interval: Option<u64>,

    /// Run in read-only mode
    #[arg(long)]
    readonly: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Refresh once, print the snapshot as JSON and exit
    #[arg(long)]
    once: bool,

    /// Only print this resource with --once (missions, stages, flighttasks, weapons, nodes, events)
    #[arg(long, requires = "once")]
    resource: Option<String>,

    /// Persist the effective configuration
    #[arg(long)]
    save: bool,
}

impl Args {
    fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            api_base: self.api_base.clone(),
            api_mode: self.mode,
            namespace: self.namespace.clone(),
            auth_token: self.token.clone(),
            refresh_interval: self.interval,
            read_only: self.readonly.then_some(true),
            ..ConfigLayer::default()
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("missionboard {} started with log level: {:?}", missionboard::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("missionboard").join("missionboard.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".missionboard").join("missionboard.log");
    }
    PathBuf::from("missionboard.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let resource = args
        .resource
        .as_deref()
        .map(|key| {
            ResourceKind::from_key(key)
                .filter(|kind| StoreSnapshot::KINDS.contains(kind))
                .with_context(|| format!("Unknown resource: {}", key))
        })
        .transpose()?;

    // CLI > saved config > environment > defaults
    let config = Config::load().merge(args.config_layer());
    if args.save {
        config.save()?;
    }

    let client = ResourceClient::new(config.api_config())
        .map_err(|e| anyhow::anyhow!(format_api_error(&e)))?;
    let mut health = HealthMonitor::new(&config);
    let mut store = DataStore::new(client, config.refresh_duration());

    let status = health.check(store.client()).await;
    if status != ApiStatus::Ok {
        eprintln!("API {}: {}", status, health.message);
    }

    store.refresh_all().await;

    if args.once {
        let snapshot = store.snapshot().await;
        let output = match resource {
            Some(kind) => snapshot.resource_json(kind).unwrap_or_default(),
            None => serde_json::to_value(&snapshot)?,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "missionboard {} | {} mode | {} | refresh {} | last checked {}",
        missionboard::VERSION,
        config.api_mode,
        health.mode_label(),
        health.refresh_label(),
        health.last_checked_label()
    );
    print_summary(&store.snapshot().await);

    let mut cycles = store.subscribe();
    if !store.start_polling() {
        return Ok(());
    }

    loop {
        tokio::select! {
            changed = cycles.changed() => {
                if changed.is_err() {
                    break;
                }
                print_summary(&store.snapshot().await);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    store.stop_polling();
    Ok(())
}

/// One line per resource: count, plus the error when the last refresh failed
fn print_summary(snapshot: &StoreSnapshot) {
    let updated = snapshot
        .last_updated
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string());
    println!("[{}]", updated);

    for kind in StoreSnapshot::KINDS {
        let Some((count, error)) = snapshot.summary(kind) else {
            continue;
        };
        match error {
            Some(error) => println!("  {:<12} {:>4}  ! {}", kind.display_name(), count, error),
            None => println!("  {:<12} {:>4}", kind.display_name(), count),
        }
    }
}
