// Console simulator: runs one event through the dispatcher against an
// in-memory host and prints the host calls it produced as JSON.

use alleria_notify::config;
use alleria_notify::dispatcher::{Dispatcher, NotificationClick};
use alleria_notify::host::{settle, RecordingHost};
use alleria_notify::types::{ClientWindow, SubscriptionDescriptor};
use alleria_notify::Dispatch;
use clap::{Parser, Subcommand};
use futures::executor::block_on;
use serde_json::{json, Value};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "alleria-notify", about = "Simulate notification events for the Alleria queue")]
struct Cli {
    /// Dispatcher config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// URL of a page already open in the host (repeatable)
    #[arg(long = "page", global = true)]
    pages: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Install then activate a new version
    Lifecycle,
    /// Deliver a push message
    Push {
        /// Raw payload text; omit for a push without payload
        payload: Option<String>,
        /// Read the payload bytes from a file instead
        #[arg(long, conflicts_with = "payload")]
        file: Option<PathBuf>,
    },
    /// Click a shown notification
    Click {
        /// Action button (view, dismiss); omit for a click on the body
        #[arg(long)]
        action: Option<String>,
        /// Target carried in the notification data
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Post a message from a page
    Message {
        /// JSON message, e.g. {"type":"GET_SUBSCRIPTION"}
        json: String,
        /// Subscription descriptor file the host reports as current
        #[arg(long)]
        subscription: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    config::init(config::load_or_default(cli.config.as_deref())?)?;
    let dispatcher = Dispatcher::from_global();

    let pages = cli
        .pages
        .iter()
        .enumerate()
        .map(|(i, url)| ClientWindow::new(format!("page-{}", i + 1), url.clone()))
        .collect();
    let mut host = RecordingHost::new().with_clients(pages);

    let dispatches: Vec<Dispatch> = match cli.command {
        Command::Lifecycle => vec![dispatcher.on_install(), dispatcher.on_activate()],
        Command::Push { payload, file } => {
            let raw = match file {
                Some(path) => Some(fs::read(path)?),
                None => payload.map(String::into_bytes),
            };
            vec![dispatcher.on_push(raw.as_deref())]
        }
        Command::Click { action, url, tag } => {
            let data = url.map_or(Value::Null, |url| json!({ "url": url }));
            let click = NotificationClick { action, tag, data };
            vec![dispatcher.on_notification_click(&click)]
        }
        Command::Message { json, subscription } => {
            if let Some(path) = subscription {
                let descriptor: SubscriptionDescriptor = serde_json::from_slice(&fs::read(path)?)?;
                host = host.with_subscription(descriptor);
            }
            vec![dispatcher.on_message(json.as_bytes())]
        }
    };

    let mut replies = Vec::new();
    let mut failures = 0;
    for dispatch in dispatches {
        let settled = block_on(settle(&host, dispatch));
        failures += settled.failures;
        replies.extend(settled.reply);
    }
    info!("[Main] Simulation finished with {} host failure(s)", failures);

    let report = json!({
        "calls": host.calls(),
        "replies": replies,
        "failures": failures,
        "pages": host.clients(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
