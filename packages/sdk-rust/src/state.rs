//! On-chain account deserialization.
//!
//! Token and mint accounts go through `spl-token-2022`'s extension-aware
//! unpacking, which also accepts legacy SPL Token layouts. The AMM `Pool`
//! account is parsed by offset from the interface description.

use solana_sdk::{hash::hash, pubkey::Pubkey};
use spl_token_2022::{
    extension::{transfer_hook::TransferHook, BaseStateWithExtensions, StateWithExtensions},
    solana_program::program_option::COption,
    state::{Account as TokenAccount, Mint},
};

use crate::error::{Error, Result};

// ─── Token accounts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint:   Pubkey,
    pub owner:  Pubkey,
    pub amount: u64,
}

/// Deserialize a token account (Token-2022 or legacy).
pub fn parse_token_account(data: &[u8]) -> Result<TokenAccountState> {
    let state = StateWithExtensions::<TokenAccount>::unpack(data)?;
    Ok(TokenAccountState {
        mint:   state.base.mint,
        owner:  state.base.owner,
        amount: state.base.amount,
    })
}

// ─── Mints ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintState {
    pub decimals:              u8,
    pub supply:                u64,
    pub mint_authority:        Option<Pubkey>,
    pub freeze_authority:      Option<Pubkey>,
    /// Program named by the TransferHook extension, if present and set.
    pub transfer_hook_program: Option<Pubkey>,
}

/// Deserialize a mint, including its TransferHook extension when present.
pub fn parse_mint(data: &[u8]) -> Result<MintState> {
    let state = StateWithExtensions::<Mint>::unpack(data)?;
    let transfer_hook_program = state
        .get_extension::<TransferHook>()
        .ok()
        .and_then(|hook| Option::<Pubkey>::from(hook.program_id));

    Ok(MintState {
        decimals:         state.base.decimals,
        supply:           state.base.supply,
        mint_authority:   coption(state.base.mint_authority),
        freeze_authority: coption(state.base.freeze_authority),
        transfer_hook_program,
    })
}

fn coption(value: COption<Pubkey>) -> Option<Pubkey> {
    match value {
        COption::Some(key) => Some(key),
        COption::None      => None,
    }
}

// ─── AMM pool ─────────────────────────────────────────────────────────────────

/// Deserialized AMM `Pool` account.
///
/// Layout (after 8-byte Anchor discriminator):
/// ```text
/// authority(32)  mint_a(32)  mint_b(32)  vault_a(32)  vault_b(32)
/// fee_rate(8)  reserve_a(8)  reserve_b(8)  bump(1)  = 193 bytes
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmPoolState {
    pub authority: Pubkey,
    pub mint_a:    Pubkey,
    pub mint_b:    Pubkey,
    pub vault_a:   Pubkey,
    pub vault_b:   Pubkey,
    /// Basis points charged on input.
    pub fee_rate:  u64,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub bump:      u8,
}

impl AmmPoolState {
    pub const LEN: usize = 193;

    pub fn fee_rate_fraction(&self) -> f64 {
        self.fee_rate as f64 / 10_000.0
    }
}

/// Deserialize an AMM `Pool` account from raw bytes.
pub fn parse_amm_pool(data: &[u8]) -> Result<AmmPoolState> {
    if data.len() < AmmPoolState::LEN {
        return Err(Error::ParseError {
            offset: 0,
            reason: format!("Pool account is {} bytes; expected {}", data.len(), AmmPoolState::LEN),
        });
    }
    if data[..8] != account_disc("Pool") {
        return Err(Error::ParseError {
            offset: 0,
            reason: "discriminator does not match account:Pool".into(),
        });
    }
    Ok(AmmPoolState {
        authority: read_pubkey(data, 8)?,
        mint_a:    read_pubkey(data, 40)?,
        mint_b:    read_pubkey(data, 72)?,
        vault_a:   read_pubkey(data, 104)?,
        vault_b:   read_pubkey(data, 136)?,
        fee_rate:  read_u64(data, 168)?,
        reserve_a: read_u64(data, 176)?,
        reserve_b: read_u64(data, 184)?,
        bump:      data[192],
    })
}

/// Anchor account discriminator: `sha256("account:{TypeName}")[..8]`.
pub fn account_disc(type_name: &str) -> [u8; 8] {
    let h = hash(format!("account:{type_name}").as_bytes());
    let mut d = [0u8; 8];
    d.copy_from_slice(&h.to_bytes()[..8]);
    d
}

#[cfg(test)]
pub(crate) fn amm_pool_bytes(pool: &AmmPoolState) -> Vec<u8> {
    let mut data = account_disc("Pool").to_vec();
    for key in [pool.authority, pool.mint_a, pool.mint_b, pool.vault_a, pool.vault_b] {
        data.extend_from_slice(key.as_ref());
    }
    for n in [pool.fee_rate, pool.reserve_a, pool.reserve_b] {
        data.extend_from_slice(&n.to_le_bytes());
    }
    data.push(pool.bump);
    data
}

// ─── Byte-slice primitives ────────────────────────────────────────────────────

fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    let b: [u8; 32] = data
        .get(offset..offset + 32)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::ParseError {
            offset,
            reason: "slice too short for Pubkey (32 bytes)".into(),
        })?;
    Ok(Pubkey::from(b))
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let b: [u8; 8] = data
        .get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::ParseError { offset, reason: "slice too short for u64".into() })?;
    Ok(u64::from_le_bytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::{hooked_mint_account, mint_account, token_account};

    #[test]
    fn token_account_round_trips_through_spl_layout() {
        let (mint, owner) = (Pubkey::new_unique(), Pubkey::new_unique());
        let acct = token_account(&mint, &owner, 42_000_000, spl_token_2022::id());
        assert_eq!(
            parse_token_account(&acct.data).unwrap(),
            TokenAccountState { mint, owner, amount: 42_000_000 }
        );
    }

    #[test]
    fn plain_mint_has_no_hook() {
        let acct = mint_account(6, None);
        let mint = parse_mint(&acct.data).unwrap();
        assert_eq!(mint.decimals, 6);
        assert_eq!(mint.transfer_hook_program, None);
    }

    #[test]
    fn hooked_mint_exposes_hook_program() {
        let hook = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let acct = hooked_mint_account(9, &authority, &hook);
        let mint = parse_mint(&acct.data).unwrap();
        assert_eq!(mint.decimals, 9);
        assert_eq!(mint.mint_authority, Some(authority));
        assert_eq!(mint.transfer_hook_program, Some(hook));
    }

    #[test]
    fn garbage_is_not_a_mint() {
        assert!(parse_mint(&[0u8; 10]).is_err());
    }

    #[test]
    fn amm_pool_layout() {
        let pool = AmmPoolState {
            authority: Pubkey::new_unique(),
            mint_a:    Pubkey::new_unique(),
            mint_b:    Pubkey::new_unique(),
            vault_a:   Pubkey::new_unique(),
            vault_b:   Pubkey::new_unique(),
            fee_rate:  100,
            reserve_a: 7,
            reserve_b: 9,
            bump:      253,
        };
        let bytes = amm_pool_bytes(&pool);
        assert_eq!(bytes.len(), AmmPoolState::LEN);
        assert_eq!(parse_amm_pool(&bytes).unwrap(), pool);
        assert_eq!(pool.fee_rate_fraction(), 0.01);
    }

    #[test]
    fn amm_pool_rejects_short_and_foreign_data() {
        assert!(matches!(parse_amm_pool(&[0u8; 40]), Err(Error::ParseError { .. })));
        let mut other = vec![1u8; AmmPoolState::LEN];
        other[..8].copy_from_slice(&account_disc("Position"));
        assert!(parse_amm_pool(&other).is_err());
    }
}
