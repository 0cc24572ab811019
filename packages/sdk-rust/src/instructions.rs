//! Instruction builders.
//!
//! Token-2022 and associated-account instructions come from the SPL crates;
//! the AMM builders at the bottom encode the Anchor interface by hand.
//! Account order mirrors the AMM's `#[derive(Accounts)]` structs exactly.
//!
//! Anchor instruction discriminators: `sha256("global:{name}")[..8]`.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::{create_associated_token_account, create_associated_token_account_idempotent},
};
use spl_token_2022::{
    extension::{transfer_hook, ExtensionType},
    instruction as token_ix,
    state::Mint,
};

use crate::{error::Result, types::PoolRecord};

// ─── Well-known program IDs ───────────────────────────────────────────────────

pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0; 32]);

/// System `CreateAccount` instruction tag.
const CREATE_ACCOUNT_TAG: u32 = 0;

pub fn token_2022_program_id() -> Pubkey {
    spl_token_2022::id()
}

pub fn legacy_token_program_id() -> Pubkey {
    spl_token::id()
}

/// Wrapped SOL mint.
pub fn native_mint() -> Pubkey {
    spl_token::native_mint::id()
}

// ─── PDA seeds ────────────────────────────────────────────────────────────────

pub const EXTRA_ACCOUNT_METAS_SEED: &[u8] = b"extra-account-metas";
pub const AMM_POOL_SEED:            &[u8] = b"pool";

// ─── Derivation helpers ───────────────────────────────────────────────────────

/// Derive the Associated Token Account for a wallet + mint under `token_program`.
pub fn derive_ata(wallet: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(wallet, mint, token_program)
}

/// Derive the hook's validation account for `mint`.
pub fn derive_extra_account_metas(mint: &Pubkey, hook_program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[EXTRA_ACCOUNT_METAS_SEED, mint.as_ref()], hook_program)
}

/// Derive the AMM pool PDA for an ordered mint pair.
pub fn derive_amm_pool(mint_a: &Pubkey, mint_b: &Pubkey, amm_program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[AMM_POOL_SEED, mint_a.as_ref(), mint_b.as_ref()], amm_program)
}

/// Token program that owns a pool vault for `mint`.
///
/// Wrapped SOL lives under the legacy program; everything else is Token-2022.
pub fn vault_token_program(mint: &Pubkey) -> Pubkey {
    if *mint == native_mint() {
        legacy_token_program_id()
    } else {
        token_2022_program_id()
    }
}

// ─── Token issuance ───────────────────────────────────────────────────────────

/// Bytes needed for a Token-2022 mint carrying only the TransferHook extension.
pub fn hooked_mint_len() -> Result<usize> {
    Ok(ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::TransferHook])?)
}

/// System `CreateAccount`: `[u32 tag][u64 lamports][u64 space][owner]`.
/// Both `payer` and `new_account` sign.
pub fn create_account_ix(
    payer:       &Pubkey,
    new_account: &Pubkey,
    lamports:    u64,
    space:       u64,
    owner:       &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&CREATE_ACCOUNT_TAG.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_ref());

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer,       true),
            AccountMeta::new(*new_account, true),
        ],
        data,
    }
}

/// Create, hook and initialise a Token-2022 mint.
///
/// `payer` becomes mint authority, freeze authority and hook authority.
/// Both `payer` and `mint` must sign.
pub fn create_hooked_mint_ixs(
    payer:        &Pubkey,
    mint:         &Pubkey,
    hook_program: &Pubkey,
    decimals:     u8,
    lamports:     u64,
) -> Result<Vec<Instruction>> {
    let program = token_2022_program_id();
    let space   = hooked_mint_len()?;

    Ok(vec![
        create_account_ix(payer, mint, lamports, space as u64, &program),
        transfer_hook::instruction::initialize(&program, mint, Some(*payer), Some(*hook_program))?,
        token_ix::initialize_mint(&program, mint, payer, Some(payer), decimals)?,
    ])
}

/// Create `owner`'s associated account if absent and mint `amount` atomic units into it.
///
/// Returns the associated account alongside the instructions.
pub fn mint_initial_supply_ixs(
    payer:  &Pubkey,
    mint:   &Pubkey,
    amount: u64,
) -> Result<(Pubkey, Vec<Instruction>)> {
    let program = token_2022_program_id();
    let ata     = derive_ata(payer, mint, &program);

    let ixs = vec![
        create_associated_token_account_idempotent(payer, payer, mint, &program),
        token_ix::mint_to(&program, mint, &ata, payer, &[], amount)?,
    ];
    Ok((ata, ixs))
}

// ─── Pool scaffolding ─────────────────────────────────────────────────────────

/// Allocate an inert System-owned pool account and one vault per mint owned by it.
///
/// Vault creation is not idempotent: an existing vault fails the transaction.
pub fn create_pool_ixs(
    payer:    &Pubkey,
    pool:     &Pubkey,
    mint_a:   &Pubkey,
    mint_b:   &Pubkey,
    space:    u64,
    lamports: u64,
) -> (PoolRecord, Vec<Instruction>) {
    let token_program_a = token_2022_program_id();
    let token_program_b = vault_token_program(mint_b);
    let record = PoolRecord {
        pool:    *pool,
        mint_a:  *mint_a,
        mint_b:  *mint_b,
        vault_a: derive_ata(pool, mint_a, &token_program_a),
        vault_b: derive_ata(pool, mint_b, &token_program_b),
        token_program_a,
        token_program_b,
    };

    let ixs = vec![
        create_account_ix(payer, pool, lamports, space, &SYSTEM_PROGRAM_ID),
        create_associated_token_account(payer, pool, mint_a, &token_program_a),
        create_associated_token_account(payer, pool, mint_b, &token_program_b),
    ];
    (record, ixs)
}

// ─── Transfers ────────────────────────────────────────────────────────────────

/// `transfer_checked` that carries what Token-2022 needs to invoke a transfer hook.
///
/// With `hook_program` set, the hook's validation account and the hook program
/// itself are appended read-only.
#[allow(clippy::too_many_arguments)]
pub fn hooked_transfer_ix(
    token_program: &Pubkey,
    source:        &Pubkey,
    mint:          &Pubkey,
    destination:   &Pubkey,
    authority:     &Pubkey,
    amount:        u64,
    decimals:      u8,
    hook_program:  Option<&Pubkey>,
) -> Result<Instruction> {
    let mut ix = token_ix::transfer_checked(
        token_program, source, mint, destination, authority, &[], amount, decimals,
    )?;
    if let Some(hook) = hook_program {
        let (validation, _) = derive_extra_account_metas(mint, hook);
        ix.accounts.push(AccountMeta::new_readonly(validation, false));
        ix.accounts.push(AccountMeta::new_readonly(*hook,      false));
    }
    Ok(ix)
}

// ─── AMM interface ────────────────────────────────────────────────────────────

fn disc(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let h = solana_sdk::hash::hash(preimage.as_bytes());
    let mut d = [0u8; 8];
    d.copy_from_slice(&h.to_bytes()[..8]);
    d
}

/// Accounts shared by `add_liquidity` and `swap`.
#[derive(Debug, Clone)]
pub struct AmmAccounts {
    pub user:            Pubkey,
    pub pool:            Pubkey,
    pub mint_a:          Pubkey,
    pub mint_b:          Pubkey,
    pub vault_a:         Pubkey,
    pub vault_b:         Pubkey,
    pub user_vault_a:    Pubkey,
    pub user_vault_b:    Pubkey,
    pub token_program_a: Pubkey,
    pub token_program_b: Pubkey,
}

impl AmmAccounts {
    /// Accounts for `user` trading against the pool PDA of `(mint_a, mint_b)`.
    ///
    /// Vaults are the pool's associated accounts.
    pub fn derive(amm_program: &Pubkey, user: &Pubkey, mint_a: &Pubkey, mint_b: &Pubkey) -> Self {
        let (pool, _) = derive_amm_pool(mint_a, mint_b, amm_program);
        let token_program_a = token_2022_program_id();
        let token_program_b = vault_token_program(mint_b);
        Self {
            user:         *user,
            pool,
            mint_a:       *mint_a,
            mint_b:       *mint_b,
            vault_a:      derive_ata(&pool, mint_a, &token_program_a),
            vault_b:      derive_ata(&pool, mint_b, &token_program_b),
            user_vault_a: derive_ata(user, mint_a, &token_program_a),
            user_vault_b: derive_ata(user, mint_b, &token_program_b),
            token_program_a,
            token_program_b,
        }
    }

    fn metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.user,                true),   // mut + signer
            AccountMeta::new(self.pool,                false),  // mut
            AccountMeta::new_readonly(self.mint_a,     false),
            AccountMeta::new_readonly(self.mint_b,     false),
            AccountMeta::new(self.vault_a,             false),  // mut
            AccountMeta::new(self.vault_b,             false),  // mut
            AccountMeta::new(self.user_vault_a,        false),  // mut
            AccountMeta::new(self.user_vault_b,        false),  // mut
            AccountMeta::new_readonly(self.token_program_a, false),
            AccountMeta::new_readonly(self.token_program_b, false),
        ]
    }
}

/// Build the AMM `initialize_pool` instruction.
///
/// The pool is the PDA of `(mint_a, mint_b)`; vaults must already exist.
/// `fee_rate` is in basis points.
#[allow(clippy::too_many_arguments)]
pub fn initialize_pool_ix(
    amm_program:     &Pubkey,
    authority:       &Pubkey,
    mint_a:          &Pubkey,
    mint_b:          &Pubkey,
    vault_a:         &Pubkey,
    vault_b:         &Pubkey,
    token_program_a: &Pubkey,
    token_program_b: &Pubkey,
    fee_rate:        u64,
) -> Instruction {
    let (pool, _) = derive_amm_pool(mint_a, mint_b, amm_program);

    let mut data = disc("initialize_pool").to_vec();
    data.extend_from_slice(&fee_rate.to_le_bytes());

    Instruction {
        program_id: *amm_program,
        accounts: vec![
            AccountMeta::new(*authority,              true),   // mut + signer
            AccountMeta::new(pool,                    false),  // mut PDA (init)
            AccountMeta::new_readonly(*mint_a,        false),
            AccountMeta::new_readonly(*mint_b,        false),
            AccountMeta::new(*vault_a,                false),  // mut
            AccountMeta::new(*vault_b,                false),  // mut
            AccountMeta::new_readonly(*token_program_a, false),
            AccountMeta::new_readonly(*token_program_b, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data,
    }
}

/// Build the AMM `add_liquidity` instruction.
pub fn add_liquidity_ix(
    amm_program: &Pubkey,
    accounts:    &AmmAccounts,
    amount_a:    u64,
    amount_b:    u64,
) -> Instruction {
    let mut data = disc("add_liquidity").to_vec();
    data.extend_from_slice(&amount_a.to_le_bytes());
    data.extend_from_slice(&amount_b.to_le_bytes());

    Instruction { program_id: *amm_program, accounts: accounts.metas(), data }
}

/// Build the AMM `swap` instruction.
///
/// Pass both vaults regardless of direction; the program reads `a_to_b`.
pub fn swap_ix(
    amm_program:    &Pubkey,
    accounts:       &AmmAccounts,
    amount_in:      u64,
    min_amount_out: u64,
    a_to_b:         bool,
) -> Instruction {
    let mut data = disc("swap").to_vec();
    data.extend_from_slice(&amount_in.to_le_bytes());
    data.extend_from_slice(&min_amount_out.to_le_bytes());
    data.push(a_to_b as u8);

    Instruction { program_id: *amm_program, accounts: accounts.metas(), data }
}
