//! remotectl
//!
//! Sends remote-control commands to a remote host over its WebSocket channel.

use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use remote_control::{Client, ClientBuilder, Command, CommandEncoder};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How long one-shot mode waits for the channel before giving up.
const WAIT_LIMIT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "remotectl")]
#[command(about = "Send remote-control commands to a remote host")]
#[command(version)]
struct Cli {
    /// Remote host as host[:port]; connects to ws://<host>/cmds
    #[arg(long, conflicts_with = "url", required_unless_present = "url")]
    host: Option<String>,

    /// Full WebSocket URL of the command socket
    #[arg(long)]
    url: Option<String>,

    /// Delay between failed connection attempts, in milliseconds
    #[arg(long, default_value_t = 5000)]
    retry_delay_ms: u64,

    /// Send PING at this period while connected
    #[arg(long)]
    heartbeat_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Commands in wire form, e.g. "NAV left" "VOL down 3".
    /// Reads commands from stdin when omitted.
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    // Reject typos before touching the network.
    let commands = cli
        .commands
        .iter()
        .map(|line| {
            line.parse::<Command>()
                .with_context(|| format!("invalid command '{line}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let client = build(&cli)?.spawn().context("failed to start client")?;
    info!(endpoint = %client.endpoint(), "Client started");

    let result = if commands.is_empty() {
        run_interactive(client.clone()).await
    } else {
        run_once(client.clone(), &commands).await
    };

    client.shutdown();
    client.closed().await;
    result
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let fallback = if debug {
        "remote_control=debug"
    } else {
        "remote_control=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build(cli: &Cli) -> anyhow::Result<ClientBuilder> {
    let mut builder = Client::builder().retry_delay(Duration::from_millis(cli.retry_delay_ms));

    builder = match (&cli.host, &cli.url) {
        (Some(host), None) => builder.host(host),
        (None, Some(url)) => builder.url(url),
        _ => bail!("exactly one of --host or --url is required"),
    };

    if let Some(secs) = cli.heartbeat_secs {
        builder = builder.heartbeat(Duration::from_secs(secs));
    }

    Ok(builder)
}

async fn run_once(mut client: Client, commands: &[Command]) -> anyhow::Result<()> {
    client
        .wait_usable(WAIT_LIMIT)
        .await
        .with_context(|| format!("remote host unreachable at {}", client.endpoint()))?;

    for command in commands {
        client.dispatch(command);
    }

    Ok(())
}

async fn run_interactive(mut client: Client) -> anyhow::Result<()> {
    let mut usable = client.subscribe();
    let status = tokio::spawn(async move {
        loop {
            if *usable.borrow_and_update() {
                eprintln!("connected");
            } else {
                eprintln!("waiting for remote host...");
            }
            if usable.changed().await.is_err() {
                break;
            }
        }
    });

    let mut messages = client.messages();
    let echo = tokio::spawn(async move {
        while let Some(text) = next_message(&mut messages).await {
            println!("< {text}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = match classify(&line) {
            Input::Skip => continue,
            Input::Quit => break,
            Input::Command(line) => line,
        };

        match line.parse::<Command>() {
            Ok(command) => client.dispatch(&command),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    status.abort();
    echo.abort();
    Ok(())
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Quit,
    /// Wire-form command, whitespace preserved for `TYPE` payloads.
    Command(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "quit" | "exit" => Input::Quit,
        _ => Input::Command(line.trim_end_matches(['\r', '\n'])),
    }
}

/// Next text frame from the host. Skips over frames lost to lag.
async fn next_message(messages: &mut broadcast::Receiver<String>) -> Option<String> {
    loop {
        match messages.recv().await {
            Ok(text) => return Some(text),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Dropped messages from remote host"),
            Err(RecvError::Closed) => return None,
        }
    }
}
