//! Subcommand implementations.
//!
//! Commands read and write through an [`Env`] instead of the process
//! streams, so tests can drive them with in-memory buffers, a seeded RNG
//! and a fake ledger.

use std::io::{BufRead, Read, Write};

use chain_btc::address::{address_to_pubkey_hash, derive_address};
use chain_btc::ledger::{spendable_outputs, AddressLedger};
use chain_btc::{
    generate_signed_transaction, BtcError, BtcNetwork, LedgerError, PrivateKey, WifError,
};
use rand_core::CryptoRngCore;
use thiserror::Error;

use crate::cli::{Commands, TxCommand, UtxoCommand, WifCommand};

/// Command failures.
#[derive(Debug, Error)]
pub enum CommandError {
    /// `wif address` hit an undecodable line (1-based).
    #[error("couldn't extract an address from line {line}: {source}")]
    AddressLine {
        line: usize,
        #[source]
        source: WifError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Btc(#[from] BtcError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("couldn't serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a command touches outside its arguments.
pub struct Env<'a> {
    pub stdin: &'a mut dyn BufRead,
    pub stdout: &'a mut dyn Write,
    pub rng: &'a mut dyn CryptoRngCore,
    pub ledger: &'a dyn AddressLedger,
}

/// Dispatch a parsed subcommand.
pub fn run(
    command: Commands,
    network: BtcNetwork,
    env: &mut Env<'_>,
) -> Result<(), CommandError> {
    match command {
        Commands::Wif(WifCommand::Generate(args)) => {
            wif_generate(&mut *env.rng, &mut *env.stdout, args.compressed, network)
        }
        Commands::Wif(WifCommand::Address) => {
            wif_address(&mut *env.stdin, &mut *env.stdout, network)
        }
        Commands::Tx(TxCommand::Generate) => {
            tx_generate(&mut *env.stdin, &mut *env.stdout, network)
        }
        Commands::Utxo(UtxoCommand::Summary(args)) => {
            utxo_summary(env.ledger, &mut *env.stdout, &args.address, network)
        }
    }
}

/// Print one freshly generated WIF.
pub fn wif_generate(
    rng: &mut dyn CryptoRngCore,
    stdout: &mut dyn Write,
    compressed: bool,
    network: BtcNetwork,
) -> Result<(), CommandError> {
    let key = PrivateKey::generate(rng)?;
    writeln!(stdout, "{}", key.to_wif(compressed, network))?;
    tracing::info!(
        address = %derive_address(&key, compressed, network),
        compressed,
        "generated key"
    );
    Ok(())
}

/// Derive the address of every WIF on stdin.
///
/// Blank lines are skipped. Each address is written as soon as it is
/// derived; on a bad line the addresses already written stay written.
pub fn wif_address(
    stdin: &mut dyn BufRead,
    stdout: &mut dyn Write,
    network: BtcNetwork,
) -> Result<(), CommandError> {
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        if stdin.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let address_line = |source| CommandError::AddressLine {
            line: line_no,
            source,
        };
        let line = std::str::from_utf8(&buf)
            .map_err(|e| address_line(WifError::InvalidBase58(format!("not UTF-8: {e}"))))?;
        let wif = line.trim();
        if wif.is_empty() {
            continue;
        }

        let (key, compressed) = PrivateKey::from_wif(wif, network).map_err(address_line)?;
        writeln!(stdout, "{}", derive_address(&key, compressed, network))?;
        stdout.flush()?;
    }
    Ok(())
}

/// Sign the JSON request on stdin and print the transaction hex.
pub fn tx_generate(
    stdin: &mut dyn BufRead,
    stdout: &mut dyn Write,
    network: BtcNetwork,
) -> Result<(), CommandError> {
    let mut request = Vec::new();
    stdin.read_to_end(&mut request)?;

    let signed = generate_signed_transaction(&request, network)?;
    writeln!(stdout, "{}", hex::encode(signed))?;
    Ok(())
}

/// Print the spendable outputs of `address` as a JSON array.
pub fn utxo_summary(
    ledger: &dyn AddressLedger,
    stdout: &mut dyn Write,
    address: &str,
    network: BtcNetwork,
) -> Result<(), CommandError> {
    address_to_pubkey_hash(address, network)?;

    let outputs = spendable_outputs(ledger, address)?;
    tracing::info!(address, count = outputs.len(), "resolved spendable outputs");
    writeln!(stdout, "{}", serde_json::to_string(&outputs)?)?;
    Ok(())
}
