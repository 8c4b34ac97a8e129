use std::sync::mpsc;

use clap::Parser;

use termexam::cli::Cli;
use termexam::config::Config;
use termexam::error::Result;
use termexam::persist::{token_fingerprint, FileTokenStore, TokenStore};
use termexam::session::Controller;
use termexam::state::AppState;
use termexam::transport::HttpTransport;
use termexam::{logging, tui};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let mut store = FileTokenStore::new(&config.token_file);

    // Handle --logout
    if cli.logout {
        store.clear()?;
        eprintln!("Logged out.");
        return Ok(());
    }

    // Handle --status
    if cli.status {
        println!("Server: {}", config.base_url);
        match store.load()? {
            Some(token) => println!(
                "Logged in (token {}, stored at {})",
                token_fingerprint(&token),
                store.path().display()
            ),
            None => println!("Not logged in"),
        }
        return Ok(());
    }

    let _log_guard = logging::init(&config)?;
    tracing::info!(base_url = %config.base_url, "starting");

    let (reply_tx, reply_rx) = mpsc::channel();
    let (timer_tx, timer_rx) = mpsc::channel();
    let transport = HttpTransport::new(&config.base_url, config.request_timeout, reply_tx)?;
    let controller = Controller::new(transport, store, Some(timer_tx));
    let state = AppState::new(controller, config.base_url.clone());

    tui::run_tui(state, timer_rx, reply_rx)
}
