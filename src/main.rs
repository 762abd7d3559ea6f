mod config;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use outpost_action::{Dispatcher, DispatcherConfig, TracingNotifier};
use outpost_config::DestinationConfig;
use outpost_destinations::Registry;
use outpost_request::{HttpClient, MockClient, SharedClient};
use outpost_subscription::Subscription;

use crate::config::load_config;

/// Outpost - routes analytics events to destination actions
#[derive(Parser)]
#[command(name = "outpost")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.outpost)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Emit logs as JSON
  #[arg(long, global = true)]
  json_logs: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

/// Selects the destination config a command works on.
#[derive(clap::Args)]
struct Target {
  /// Path to a destination config file (JSON)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Destination slug; its config is read from <data-dir>/destinations/<slug>.json
  #[arg(long)]
  destination: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
  /// List registered destinations, or describe one
  Destinations {
    /// Slug of a destination to describe
    slug: Option<String>,
  },

  /// Validate settings and test a destination's credentials
  Auth {
    #[command(flatten)]
    target: Target,
  },

  /// Dispatch an event read from stdin
  Dispatch {
    #[command(flatten)]
    target: Target,

    /// Record requests instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Abort the dispatch after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.json_logs);

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".outpost"),
  };

  let registry = Registry::standard();

  match cli.command {
    Some(Commands::Destinations { slug }) => list_destinations(&registry, slug.as_deref())?,
    Some(Commands::Auth { target }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async { run_auth(&registry, target, &data_dir).await })?;
    }
    Some(Commands::Dispatch {
      target,
      dry_run,
      timeout_ms,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async {
        run_dispatch(&registry, target, &data_dir, dry_run, timeout_ms).await
      })?;
    }
    None => {
      println!("outpost - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_env("OUTPOST_LOG")
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("outpost=info"));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

fn list_destinations(registry: &Registry, slug: Option<&str>) -> Result<()> {
  let output = match slug {
    Some(slug) => serde_json::to_value(registry.manifest(slug)?)?,
    None => serde_json::to_value(registry.manifests().collect::<Vec<_>>())?,
  };
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

async fn load_target(target: Target, data_dir: &Path) -> Result<DestinationConfig> {
  load_config(
    target.config.as_deref(),
    target.destination.as_deref(),
    data_dir,
  )
  .await
}

async fn run_auth(registry: &Registry, target: Target, data_dir: &Path) -> Result<()> {
  let config = load_target(target, data_dir).await?;
  let destination = registry.cloud(&config.destination)?;

  let settings = destination
    .validate_settings(&config.settings)
    .context("invalid settings")?;

  let client = destination.request_client(Arc::new(HttpClient::new()), &settings);
  destination
    .test_authentication(&client, &settings)
    .await
    .context("authentication failed")?;

  eprintln!("Authenticated: {}", destination.name);
  Ok(())
}

async fn run_dispatch(
  registry: &Registry,
  target: Target,
  data_dir: &Path,
  dry_run: bool,
  timeout_ms: Option<u64>,
) -> Result<()> {
  let config = load_target(target, data_dir).await?;
  let destination = registry.cloud(&config.destination)?;

  let settings = destination
    .validate_settings(&config.settings)
    .context("invalid settings")?;

  let definitions = if config.subscriptions.is_empty() {
    info!(destination = %destination.slug, "no subscriptions configured, using defaults");
    destination.default_subscriptions()
  } else {
    config.subscriptions
  };
  let subscriptions = definitions
    .into_iter()
    .map(|def| {
      let name = def.name.clone();
      Subscription::compile(def).with_context(|| format!("invalid subscription '{name}'"))
    })
    .collect::<Result<Vec<_>>>()?;

  if subscriptions.is_empty() {
    bail!("destination '{}' has no subscriptions", destination.slug);
  }

  // Read event from stdin
  let event = read_event_from_stdin()?;

  let mock = dry_run.then(|| Arc::new(MockClient::new()));
  let base: SharedClient = match &mock {
    Some(mock) => mock.clone() as SharedClient,
    None => Arc::new(HttpClient::new()),
  };
  let client = destination.request_client(base, &settings);

  let dispatcher = Dispatcher::with_notifier(destination, TracingNotifier).with_config(
    DispatcherConfig {
      timeout: timeout_ms.map(Duration::from_millis),
    },
  );

  let cancel = CancellationToken::new();
  let on_interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupted, cancelling dispatch");
      on_interrupt.cancel();
    }
  });

  let result = dispatcher
    .dispatch(&event, &subscriptions, &settings, &client, cancel)
    .await
    .context("dispatch failed")?;

  eprintln!(
    "Dispatch {}: {} matched, {} succeeded, {} failed",
    result.dispatch_id,
    result.results.len(),
    result.succeeded(),
    result.failed()
  );

  let mut output = result.to_json();
  if let Some(mock) = mock {
    output["requests"] = serde_json::to_value(mock.requests())?;
  }
  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

fn read_event_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    bail!("expected an event on stdin");
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read event from stdin")?;

  let event: serde_json::Value =
    serde_json::from_str(&input).context("failed to parse event JSON from stdin")?;
  if !event.is_object() {
    bail!("event must be a JSON object");
  }
  Ok(event)
}
