//! Command-line interface definition (`clap` derive).

use chain_btc::BtcNetwork;
use clap::{Args, Parser, Subcommand};

use crate::logging::LogFormat;

/// Legacy Bitcoin P2PKH toolkit: WIF keys, addresses, signed transactions.
#[derive(Parser, Debug)]
#[command(name = "mybtc", version, propagate_version = true)]
pub struct MybtcCli {
    /// Network whose version bytes are used: testnet, signet or mainnet.
    #[arg(long, global = true, env = "MYBTC_NETWORK", default_value_t = BtcNetwork::Testnet)]
    pub network: BtcNetwork,

    /// Esplora API base URL. Defaults to a public endpoint for the network.
    #[arg(long, global = true, env = "MYBTC_ESPLORA_URL")]
    pub esplora_url: Option<String>,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, env = "MYBTC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl MybtcCli {
    /// The configured Esplora URL, or the network default.
    pub fn esplora_url(&self) -> String {
        self.esplora_url
            .clone()
            .unwrap_or_else(|| self.network.default_esplora_url().to_string())
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Generate WIFs and derive their addresses.
    #[command(subcommand)]
    Wif(WifCommand),
    /// Build and sign transactions.
    #[command(subcommand)]
    Tx(TxCommand),
    /// Query unspent outputs from the block explorer.
    #[command(subcommand)]
    Utxo(UtxoCommand),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum WifCommand {
    /// Generate a new private key and print it as a WIF.
    Generate(WifGenerateArgs),
    /// Read WIFs from stdin, one per line, and print their addresses.
    Address,
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct WifGenerateArgs {
    /// Mark the key as using the compressed public key form.
    #[arg(long)]
    pub compressed: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum TxCommand {
    /// Read a JSON signing request from stdin and print the signed
    /// transaction as hex.
    Generate,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum UtxoCommand {
    /// Print the spendable outputs of an address as JSON, ready for the
    /// `in` array of `tx generate`.
    Summary(UtxoSummaryArgs),
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct UtxoSummaryArgs {
    /// P2PKH address to look up.
    pub address: String,
}
