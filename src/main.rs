use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use crate::client::HttpAnalysisClient;
use crate::composer::{AssetEntry, Composer, ViewState};
use crate::config::Config;
use crate::report::parse_asset_arg;
use crate::tui::App;

use clap::{arg, Command};
use tracing_subscriber::EnvFilter;

mod catalog;
mod client;
mod composer;
mod config;
mod error;
mod format;
mod model;
mod pie;
mod report;
mod tui;

const DEFAULT_LOG_FILE: &str = "portpuls.log";

fn cli() -> Command {
    Command::new("portpuls")
        .about("Compose a stock portfolio and visualize its analysis")
        .arg_required_else_help(true)
        .arg(arg!(--endpoint <URL> "Analysis service endpoint (overrides the config file)").global(true))
        .subcommand(Command::new("config").about("Print the path to the config file"))
        .subcommand(Command::new("symbols").about("List the symbols that can be analyzed"))
        .subcommand(Command::new("tui").about("Compose the portfolio interactively"))
        .subcommand(
            Command::new("analyze")
                .about("Analyze a portfolio given on the command line")
                .arg(
                    arg!(<ASSET> ... "Assets as SYMBOL=QUANTITY, e.g. AAPL=10")
                        .value_parser(parse_asset_arg),
                ),
        )
}

// The TUI owns the terminal, so its logs go to a file.
fn init_tracing(log_file: Option<&str>) -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,portpuls=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn analyze_once(
    entries: Vec<AssetEntry>,
    client: &HttpAnalysisClient,
    cfg: &Config,
) -> bool {
    let mut composer = Composer::with_entries(entries);
    composer.analyze(client).await;

    match composer.view() {
        ViewState::Ready(result) => {
            report::print_result(result, &cfg.catalog(), &cfg.palette());
            true
        }
        ViewState::Error(message) => {
            report::print_error(message);
            false
        }
        ViewState::Idle => false,
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let matches = cli().get_matches();
    let mut cfg = Config::load()?;

    if let Some(endpoint) = matches.get_one::<String>("endpoint") {
        cfg.endpoint.clone_from(endpoint);
    }

    let log_file = match matches.subcommand_name() {
        Some("tui") => Some(cfg.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE)),
        _ => cfg.log_file.as_deref(),
    };
    init_tracing(log_file)?;

    match matches.subcommand() {
        Some(("config", _)) => {
            println!(
                "Your config file is located here: \n{}",
                Config::path()?.display()
            );
        }
        Some(("symbols", _)) => {
            for ticker in cfg.catalog().tickers() {
                println!("{: <6} {}", ticker.symbol, ticker.name);
            }
        }
        Some(("analyze", sub)) => {
            let entries: Vec<AssetEntry> = sub
                .get_many::<AssetEntry>("ASSET")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let client = HttpAnalysisClient::new(cfg.endpoint.clone(), cfg.request_timeout())?;
            if !analyze_once(entries, &client, &cfg).await {
                std::process::exit(1);
            }
        }
        Some(("tui", _)) => {
            let client = HttpAnalysisClient::new(cfg.endpoint.clone(), cfg.request_timeout())?;
            let app = App::new(
                Arc::new(client),
                cfg.catalog(),
                cfg.palette(),
                cfg.endpoint.clone(),
            );
            tui::run_tui(app).await?;
        }
        _ => (),
    }
    Ok(())
}
