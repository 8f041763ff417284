mod commands;
mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use grid_core::{DocumentGrid, DocumentRouter, FetchOutcome, GridEvent, HttpDocumentsBackend};
use shared::domain::{DocumentId, UserId};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "GRID_SERVER_URL")]
    server_url: Option<String>,
    #[arg(long, env = "GRID_USER_ID")]
    user_id: Option<i64>,
    #[arg(long, default_value = "grid.toml")]
    config: PathBuf,
    /// Print the first page and exit.
    #[arg(long)]
    once: bool,
}

struct TerminalRouter;

impl DocumentRouter for TerminalRouter {
    fn open_document(&self, document_id: DocumentId) {
        println!("-> /documents/{document_id}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let file = config::load_file_config(&args.config)?;

    let server_url = args
        .server_url
        .or(file.server_url.clone())
        .context("no server url: pass --server-url or set GRID_SERVER_URL")?;
    let user_id = args
        .user_id
        .or(file.user_id)
        .context("no viewer: pass --user-id or set GRID_USER_ID")?;

    let backend = HttpDocumentsBackend::new(server_url, UserId(user_id), file.request_timeout())?;
    let grid = Arc::new(DocumentGrid::new(
        Arc::new(backend),
        Arc::new(TerminalRouter),
    ));

    if args.once {
        let outcome = grid.mount().await.wait().await;
        print!("{}", grid.view().await.to_text());
        return match outcome {
            FetchOutcome::Failed(err) => Err(err.into()),
            _ => Ok(()),
        };
    }

    let printer = tokio::spawn(print_events(Arc::clone(&grid)));
    grid.mount().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match command {
            Command::Sort(column) => {
                grid.activate_header(column).await;
            }
            Command::Page(page) => match grid.go_to_page(page).await {
                Ok(Some(_)) => {}
                Ok(None) => println!("already on page {page}"),
                Err(err) => println!("{err}"),
            },
            Command::Open(row) => {
                if let Err(err) = grid.activate_document_name(row - 1).await {
                    println!("{err}");
                }
            }
            Command::Refresh => {
                grid.refresh().await;
            }
            Command::Show => print!("{}", grid.view().await.to_text()),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    printer.abort();
    Ok(())
}

/// Prints the grid whenever a fetch settles it, plus a line per lifecycle event.
async fn print_events(grid: Arc<DocumentGrid>) {
    let mut events = grid.subscribe();
    loop {
        match events.recv().await {
            Ok(GridEvent::FetchStarted { seq, request }) => {
                println!("#{seq} {} ...", request.path_and_query());
            }
            Ok(GridEvent::PageLoaded { seq, page, .. }) => {
                println!("#{seq} loaded {} rows", page.rows.len());
                print!("{}", grid.view().await.to_text());
            }
            Ok(GridEvent::FetchFailed { seq, message, .. }) => {
                println!("#{seq} failed");
                print!("{}", grid.view().await.to_text());
                debug!(seq, %message, "fetch failure printed");
            }
            Ok(GridEvent::StaleResponseDiscarded { seq, latest_seq }) => {
                println!("#{seq} discarded, #{latest_seq} is newer");
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "grid events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
