mod cli;
mod command;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use herodote_search::{
    config, Backend, Facet, OrchestratorConfig, QueryStringLocation, SearchHandle,
    SearchOrchestrator,
};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use command::{Command, HELP};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config_dir {
        Some(dir) => config::read_config(dir),
        None => config::load(),
    }
    .context("Failed to read configuration")?;

    let facets = settings.search.facets.clone();
    let backend = Backend::from_settings(&settings);
    info!(backend = backend.name(), "Starting herodote");

    let location = QueryStringLocation::new(cli.location);
    let handle = SearchOrchestrator::new(
        backend.into_shared(),
        location.clone(),
        OrchestratorConfig::from(&settings.search),
    )
    .spawn();

    if !handle.is_available() {
        println!("Search is unavailable, queries are only recorded.");
    }

    let printer = tokio::spawn(print_sessions(handle.clone()));
    let result = prompt(&handle, &facets).await;

    printer.abort();
    println!("location: {}", location.search());
    result
}

/// Print every settled session until the orchestrator stops.
async fn print_sessions(handle: SearchHandle) {
    let mut updates = handle.subscribe();

    while updates.changed().await.is_ok() {
        let session = updates.borrow_and_update().clone();
        let today = OffsetDateTime::now_utc().date();

        if let Some(lines) = render::session(&session, today) {
            println!();
            for line in lines {
                println!("{line}");
            }
        }
    }
}

async fn prompt(handle: &SearchHandle, facets: &[Facet]) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::More => {
                handle.load_more();
            }
            Command::Facets => match handle.load_facets(facets).await {
                Ok(values) => {
                    for line in render::facets(&values) {
                        println!("{line}");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to load filters"),
            },
            edit => {
                let current = handle.session().raw_query;
                if let Some(query) = edit.edit_query(&current) {
                    println!("> {query}");
                    handle.set_query(query);
                }
            }
        }
    }

    Ok(())
}
