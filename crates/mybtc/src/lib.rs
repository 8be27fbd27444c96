//! `mybtc`: generate WIF keys, derive P2PKH addresses, sign legacy
//! transactions and look up spendable outputs through Esplora.

pub mod cli;
pub mod commands;
pub mod ledger;
pub mod logging;
