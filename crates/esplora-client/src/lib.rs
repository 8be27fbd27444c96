//! Blocking client for Esplora-compatible block explorer APIs
//! (blockstream.info, mempool.space).
//!
//! Implements [`chain_btc::AddressLedger`] over `GET /address/{addr}/utxo`
//! and `GET /tx/{txid}`.

pub mod client;

pub use client::EsploraClient;
