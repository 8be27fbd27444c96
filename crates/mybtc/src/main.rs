use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use rand_core::OsRng;

use mybtc::cli::MybtcCli;
use mybtc::commands::{self, Env};
use mybtc::ledger::LazyEsploraLedger;
use mybtc::logging::{self, DEFAULT_LOG_FILTER};

fn main() -> Result<()> {
    let cli = MybtcCli::parse();
    logging::init_logging(DEFAULT_LOG_FILTER, cli.log_format);

    let ledger = LazyEsploraLedger::new(cli.esplora_url());
    tracing::debug!(network = %cli.network, esplora_url = %ledger.base_url(), "starting");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdin = stdin.lock();
    let mut stdout = stdout.lock();
    let mut rng = OsRng;

    let mut env = Env {
        stdin: &mut stdin,
        stdout: &mut stdout,
        rng: &mut rng,
        ledger: &ledger,
    };
    commands::run(cli.command, cli.network, &mut env).context("command failed")?;
    Ok(())
}
