//! Parameter and result types for [`crate::HookSwapClient`] operations.

use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::math::atomic_to_ui;

// ─── Token issuance ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CreateTokenParams {
    /// Display name; not written on-chain.
    pub name:           String,
    /// Ticker, at most 10 characters; upper-cased. Not written on-chain.
    pub symbol:         String,
    pub decimals:       u8,
    /// Whole tokens to mint to the creator; 0 skips the second transaction.
    pub initial_supply: u64,
}

#[derive(Debug, Clone)]
pub struct CreateTokenResult {
    pub mint:              Pubkey,
    pub signature:         Signature,
    pub name:              String,
    pub symbol:            String,
    pub decimals:          u8,
    pub transfer_hook:     Pubkey,
    /// Creator's associated account, present when an initial supply was minted.
    pub token_account:     Option<Pubkey>,
    pub mint_to_signature: Option<Signature>,
    /// Atomic units minted.
    pub minted:            u64,
}

// ─── Pool scaffolding ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CreatePoolParams {
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
}

/// A placeholder pool: a raw account plus two vaults it owns.
///
/// No program enforces any layout on `pool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRecord {
    pub pool:            Pubkey,
    pub mint_a:          Pubkey,
    pub mint_b:          Pubkey,
    pub vault_a:         Pubkey,
    pub vault_b:         Pubkey,
    pub token_program_a: Pubkey,
    pub token_program_b: Pubkey,
}

#[derive(Debug, Clone)]
pub struct CreatePoolResult {
    pub record:    PoolRecord,
    pub signature: Signature,
}

#[derive(Debug, Clone)]
pub struct AddLiquidityParams {
    pub pool:   Pubkey,
    pub mint_a: Pubkey,
    /// UI amount of token A.
    pub amount: f64,
}

// ─── Swap ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapDirection {
    #[default]
    AToB,
    BToA,
}

#[derive(Debug, Clone, Copy)]
pub struct QuoteParams {
    pub amount_in:    f64,
    pub slippage_pct: f64,
    pub direction:    SwapDirection,
}

/// Display-only quote; all amounts in UI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapQuote {
    pub amount_in:        f64,
    pub amount_out:       f64,
    /// reserve_out / reserve_in
    pub rate:             f64,
    pub price_impact_pct: f64,
    pub fee:              f64,
    pub minimum_received: f64,
}

#[derive(Debug, Clone)]
pub struct SwapParams {
    pub mint_in:      Pubkey,
    /// UI amount of `mint_in`.
    pub amount_in:    f64,
    pub slippage_pct: f64,
    pub direction:    SwapDirection,
}

/// A submitted `transfer_checked`.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub signature:    Signature,
    pub mint:         Pubkey,
    pub source:       Pubkey,
    pub destination:  Pubkey,
    /// Atomic units actually moved (after the demo cap).
    pub amount:       u64,
    pub decimals:     u8,
    /// Hook program invoked by the transfer, if the mint carries one.
    pub hook_program: Option<Pubkey>,
}

impl TransferResult {
    pub fn ui_amount(&self) -> f64 {
        atomic_to_ui(self.amount, self.decimals)
    }
}

#[derive(Debug, Clone)]
pub struct SwapResult {
    pub quote:    SwapQuote,
    pub transfer: TransferResult,
}

// ─── Reads ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintInfo {
    pub address:               Pubkey,
    pub token_program:         Pubkey,
    pub decimals:              u8,
    pub supply:                u64,
    pub mint_authority:        Option<Pubkey>,
    pub freeze_authority:      Option<Pubkey>,
    pub transfer_hook_program: Option<Pubkey>,
}

impl MintInfo {
    pub fn is_token_2022(&self) -> bool {
        self.token_program == spl_token_2022::id()
    }
}

#[derive(Debug, Clone)]
pub struct TokenBalance {
    pub owner:    Pubkey,
    pub mint:     Pubkey,
    pub account:  Pubkey,
    pub amount:   u64,
    pub decimals: u8,
}

impl TokenBalance {
    pub fn ui_amount(&self) -> f64 {
        atomic_to_ui(self.amount, self.decimals)
    }
}
