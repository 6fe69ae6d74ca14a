use std::fs;

use anyhow::{anyhow, Context};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use stationhook::config::Config;
use stationhook::{list_triggers, metrics, AppError, Dispatcher, NowPlayingSnapshot, Station};

mod log;
mod signal;

#[derive(Parser)]
#[command(version)]
struct Args {
    /// Set config file path
    #[arg(short, long)]
    config: Option<String>,
    /// Station definition (JSON), its now-playing updates are read from stdin
    #[arg(short, long)]
    station: Option<String>,
    /// Print the selectable triggers and exit
    #[arg(long)]
    list_triggers: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.list_triggers {
        println!("{}", serde_json::to_string_pretty(&list_triggers())?);
        return Ok(());
    }

    let cfg = Config::parse(args.config)?;
    log::set(&cfg.log.level);
    warn!("set log level : {}", cfg.log.level);
    debug!("config : {:?}", cfg);
    metrics::metrics_register()?;

    let station_path = args.station.context("--station is required")?;
    let station: Station = serde_json::from_str(
        &fs::read_to_string(&station_path).with_context(|| format!("read {station_path}"))?,
    )
    .context("station parse error")?;
    info!(
        station = station.id,
        webhooks = station.webhooks.len(),
        "station loaded"
    );

    let dispatcher = Dispatcher::from_config(&cfg).map_err(|e| anyhow!("{e}"))?;

    let mut local = dispatcher.registry().local().subscribe();
    tokio::spawn(async move {
        loop {
            match local.recv().await {
                Ok(event) => info!(
                    station = event.station,
                    song = event.snapshot.song_id,
                    listeners = event.snapshot.listeners,
                    live = event.snapshot.is_live,
                    "now playing"
                ),
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "local receiver lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match signal::wait_for_stop_signal().await {
                Ok(str) => debug!("Received signal: {}", str),
                Err(err) => error!(?err, "signal handler error"),
            }
            shutdown.cancel();
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut previous: Option<NowPlayingSnapshot> = None;
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let snapshot = match parse_snapshot(&line) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(%err, "skipping now playing update");
                continue;
            }
        };

        let Some(old) = previous.replace(snapshot.clone()) else {
            debug!(station = snapshot.station_id, "initial snapshot");
            continue;
        };

        match dispatcher
            .dispatch_with_cancel(&station, &old, &snapshot, shutdown.child_token())
            .await
        {
            Ok(report) => println!("{}", serde_json::to_string(&report)?),
            Err(err) => error!(%err, "dispatch rejected"),
        }
    }

    debug!("metrics : {}", metrics::gather()?);
    info!("Server shutdown");
    Ok(())
}

fn parse_snapshot(line: &str) -> Result<NowPlayingSnapshot, AppError> {
    let np: api::now_playing::NowPlaying = serde_json::from_str(line)?;
    NowPlayingSnapshot::try_from(np)
}
