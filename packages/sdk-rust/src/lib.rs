//! HookSwap Rust SDK
//!
//! Client for trading Token-2022 mints that carry a transfer-hook extension.
//! Issue a hooked mint, scaffold pool accounts, quote constant-product swaps
//! and push transfers through the hook, from any Rust program.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hookswap_sdk::{
//!     Config, CreateTokenParams, FixedReserves, HookSwapClient, SwapDirection, SwapParams,
//! };
//! use solana_sdk::signature::Keypair;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // HOOKSWAP_TRANSFER_HOOK_PROGRAM_ID must be set for token issuance.
//!     let client = HookSwapClient::new(Config::default_devnet().apply_env());
//!     let payer  = Keypair::new(); // use a funded devnet keypair
//!
//!     // 1. Issue a hooked mint with 1 000 000 whole tokens
//!     let token = client.create_token(&payer, CreateTokenParams {
//!         name:           "Hooked".into(),
//!         symbol:         "HOOK".into(),
//!         decimals:       6,
//!         initial_supply: 1_000_000,
//!     }).await?;
//!     println!("Mint: {}", token.mint);
//!
//!     // 2. Quote and run a hook-exercising swap
//!     let res = client.swap(&payer, &FixedReserves::mock(), SwapParams {
//!         mint_in:      token.mint,
//!         amount_in:    10.0,
//!         slippage_pct: 1.0,
//!         direction:    SwapDirection::AToB,
//!     }).await?;
//!     println!("Estimated out: {:.6}  tx: {}", res.quote.amount_out, res.transfer.signature);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`HookSwapClient::create_token`] | Token-2022 mint with transfer hook, optional initial supply |
//! | [`HookSwapClient::create_pool`] | Placeholder pool account plus two vaults |
//! | [`HookSwapClient::add_liquidity`] | Bounded transfer into vault A |
//! | [`HookSwapClient::quote`] | Constant-product quote over any [`ReserveSource`] |
//! | [`HookSwapClient::swap`] | Quote, then a bounded self-transfer through the hook |
//! | [`HookSwapClient::mint_info`] | Decimals, authorities, hook program |
//! | [`HookSwapClient::token_balance`] | Associated-account balance |
//! | [`HookSwapClient::request_airdrop`] | Devnet faucet |
//! | [`StatsTicker`] | Simulated protocol statistics |

pub mod client;
pub mod config;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod math;
pub mod reserves;
pub mod state;
pub mod stats;
pub mod tokens;
pub mod types;

pub use client::{HookSwapClient, DEFAULT_AIRDROP_LAMPORTS};
pub use config::Config;
pub use error::{Action, Error, FailureKind, Result};
pub use ledger::{Ledger, RpcLedger};
pub use reserves::{AmmPoolReserves, FixedReserves, ReserveSource, Reserves};
pub use stats::{StatsSnapshot, StatsTicker};
pub use tokens::{display_name, resolve_mint};
pub use types::*;
