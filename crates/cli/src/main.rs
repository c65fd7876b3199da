//! Command Line Interface for the signal sniper.
mod feed;
mod operator;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use feed::LineFeed;
use sniper_data::{JsonSettingsRepository, SettingsStore};
use sniper_domain::SettingKey;
use sniper_execution::prelude::*;
use sniper_protocols::prelude::*;
use sniper_protocols::jupiter::JUPITER_API_URL;
use sniper_protocols::rpc::MAINNET_RPC_URL;
use sniper_signal::{AssetPattern, SignalExtractor};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "sniper-cli")]
#[command(about = "Signal-driven Solana token sniper", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, env = "SNIPER_SETTINGS_PATH", default_value = "config.json", global = true)]
    settings_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read signals and operator commands from stdin and trade on them
    Run(RunArgs),
    /// Inspect or edit the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print the asset a message would trigger
    Extract {
        /// Message text
        text: String,

        /// Identifier format to look for
        #[arg(long, value_enum, default_value_t = PatternKind::Solana)]
        pattern: PatternKind,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Solana RPC endpoint
    #[arg(long, env = "SOLANA_RPC_URL", default_value = MAINNET_RPC_URL)]
    rpc_url: String,

    /// Jupiter swap API base URL
    #[arg(long, env = "JUPITER_API_URL", default_value = JUPITER_API_URL)]
    jupiter_url: String,

    /// Timeout for each quote, sign, balance or send call
    #[arg(long, default_value_t = 30)]
    call_timeout_secs: u64,

    /// How long finished executions stay visible to /status
    #[arg(long, default_value_t = 600)]
    record_retention_secs: u64,

    /// How often the settings file is checked for external edits
    #[arg(long, default_value_t = 5)]
    reload_interval_secs: u64,

    /// Print every trade event as a JSON line
    #[arg(long)]
    events_json: bool,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show all settings
    Show,
    /// Show one setting
    Get { key: String },
    /// Change one setting
    Set { key: String, value: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum PatternKind {
    Solana,
    EvmHex,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(&cli.settings_path, args).await,
        Commands::Settings { action } => {
            println!("{}", edit_settings(&cli.settings_path, action).await?);
            Ok(())
        }
        Commands::Extract { text, pattern } => {
            let pattern = match pattern {
                PatternKind::Solana => AssetPattern::solana(),
                PatternKind::EvmHex => AssetPattern::evm_hex(),
            };
            match SignalExtractor::new(pattern).extract(&text) {
                Some(asset) => println!("{asset}"),
                None => println!("no asset found"),
            }
            Ok(())
        }
    }
}

async fn open_store(path: &Path) -> Result<SettingsStore> {
    SettingsStore::open(Arc::new(JsonSettingsRepository::new(path)))
        .await
        .with_context(|| format!("failed to open settings at {}", path.display()))
}

async fn edit_settings(path: &Path, action: SettingsAction) -> Result<String> {
    let store = open_store(path).await?;
    let reply = match action {
        SettingsAction::Show => store
            .get()
            .entries()
            .into_iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect::<Vec<_>>()
            .join("\n"),
        SettingsAction::Get { key } => {
            let key: SettingKey = key.parse()?;
            format!("{key} = {}", store.get_value(key))
        }
        SettingsAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let updated = store.set_key(key, &value).await?;
            format!("{key} = {}", updated.value_of(key))
        }
    };
    Ok(reply)
}

async fn run(settings_path: &Path, args: RunArgs) -> Result<()> {
    let store = Arc::new(open_store(settings_path).await?);
    info!(settings = ?store.get(), path = %settings_path.display(), "Settings loaded");

    let secret = Zeroizing::new(
        env::var("WALLET_PRIVATE_KEY")
            .context("WALLET_PRIVATE_KEY must be set in .env or environment")?,
    );
    let signer = Arc::new(KeypairSigner::from_secret(&secret).context("invalid WALLET_PRIVATE_KEY")?);
    drop(secret);
    let wallet = signer.pubkey();

    let call_timeout = Duration::from_secs(args.call_timeout_secs);
    let provider = Arc::new(RpcProvider::new(args.rpc_url.clone(), call_timeout));
    let venue = JupiterClient::new(
        JupiterConfig {
            base_url: args.jupiter_url.clone(),
            timeout: call_timeout,
            ..JupiterConfig::default()
        },
        wallet,
    )?;

    let coordinator = ExecutionCoordinator::new(
        store.clone(),
        Capabilities {
            venue: Arc::new(venue),
            signer,
            broadcaster: Arc::new(RpcBroadcaster::new(provider.clone())),
            holdings: Arc::new(RpcHoldings::new(provider, wallet)),
        },
        CoordinatorConfig {
            call_timeout,
            record_retention: Duration::from_secs(args.record_retention_secs),
            ..CoordinatorConfig::default()
        },
    );

    let cancel = CancellationToken::new();
    let mut background = vec![
        store.clone().spawn_reload_watcher(
            Duration::from_secs(args.reload_interval_secs.max(1)),
            cancel.clone(),
        ),
        coordinator.spawn_pruner(Duration::from_secs(60), cancel.clone()),
    ];
    if args.events_json {
        background.push(spawn_event_printer(coordinator.subscribe(), cancel.clone()));
    }

    let router = SignalRouter::new(SignalExtractor::default(), coordinator.clone());
    let control = ControlSurface::new(coordinator.clone());
    let mut feed = LineFeed::stdin();

    info!(wallet = %wallet, rpc = %args.rpc_url, "Sniper running, paste signals or type /help");

    loop {
        let message = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            message = feed.next_message() => message,
        };
        let Some(message) = message else {
            info!("Input closed, shutting down");
            break;
        };

        match operator::parse(&message.text) {
            Ok(Some(command)) => {
                let control = control.clone();
                tokio::spawn(async move {
                    println!("{}", operator::execute(command, &control).await);
                });
            }
            Ok(None) => {
                router.handle_message(&message);
            }
            Err(e) => println!("{e}"),
        }
    }

    let pending = coordinator.exits().cancel_all();
    if pending > 0 {
        warn!(pending, "Pending auto-sells dropped on shutdown");
    }
    let running = coordinator.in_flight();
    if !running.is_empty() {
        warn!(running = running.len(), "Executions still in flight at shutdown");
    }
    cancel.cancel();
    for handle in background {
        let _ = handle.await;
    }
    Ok(())
}

fn spawn_event_printer(
    mut events: broadcast::Receiver<TradeEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => event,
            };
            match event {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Unserializable trade event"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
