//! Where quotes get their reserves from.

use solana_sdk::pubkey::Pubkey;

use crate::{
    error::{Error, Result},
    types::SwapDirection,
    ledger::Ledger,
    math::{atomic_to_ui, DEFAULT_FEE_RATE, MOCK_RESERVE_A, MOCK_RESERVE_B},
    state::{parse_amm_pool, parse_mint},
};

/// Pool depth in UI units plus the fee fraction charged on input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reserves {
    pub reserve_a: f64,
    pub reserve_b: f64,
    /// Fraction in `[0, 1)`, e.g. `0.01` for 1 %.
    pub fee_rate:  f64,
    /// `(mint_a, mint_b)` when the source is a real pool.
    pub mints:     Option<(Pubkey, Pubkey)>,
}

impl Reserves {
    /// Mint spent in `direction`, if the pool's mints are known.
    pub fn input_mint(&self, direction: SwapDirection) -> Option<Pubkey> {
        self.mints.map(|(a, b)| match direction {
            SwapDirection::AToB => a,
            SwapDirection::BToA => b,
        })
    }
}

/// Anything that can report pool reserves before a quote.
#[allow(async_fn_in_trait)]
pub trait ReserveSource {
    async fn reserves(&self) -> Result<Reserves>;
}

/// Static reserves, for demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedReserves(pub Reserves);

impl FixedReserves {
    /// 100 000 A / 100 B at 1 %.
    pub fn mock() -> Self {
        Self(Reserves {
            reserve_a: MOCK_RESERVE_A,
            reserve_b: MOCK_RESERVE_B,
            fee_rate:  DEFAULT_FEE_RATE,
            mints:     None,
        })
    }
}

impl ReserveSource for FixedReserves {
    async fn reserves(&self) -> Result<Reserves> {
        Ok(self.0)
    }
}

/// Reserves read from an AMM `Pool` account owned by `amm_program`.
pub struct AmmPoolReserves<'a, L> {
    ledger:      &'a L,
    pool:        Pubkey,
    amm_program: Pubkey,
}

impl<'a, L: Ledger> AmmPoolReserves<'a, L> {
    pub fn new(ledger: &'a L, pool: Pubkey, amm_program: Pubkey) -> Self {
        Self { ledger, pool, amm_program }
    }

    async fn mint_decimals(&self, mint: &Pubkey) -> Result<u8> {
        let account = self
            .ledger
            .account(mint)
            .await?
            .ok_or(Error::AccountNotFound(*mint))?;
        Ok(parse_mint(&account.data)?.decimals)
    }
}

impl<L: Ledger> ReserveSource for AmmPoolReserves<'_, L> {
    async fn reserves(&self) -> Result<Reserves> {
        let account = self
            .ledger
            .account(&self.pool)
            .await?
            .ok_or(Error::AccountNotFound(self.pool))?;
        if account.owner != self.amm_program {
            return Err(Error::InvalidArgument(format!(
                "{} is owned by {}, not the AMM program {}",
                self.pool, account.owner, self.amm_program
            )));
        }
        let pool = parse_amm_pool(&account.data)?;

        let decimals_a = self.mint_decimals(&pool.mint_a).await?;
        let decimals_b = self.mint_decimals(&pool.mint_b).await?;
        log::debug!(
            "pool {}: reserve_a={} reserve_b={} fee_rate={}bps",
            self.pool, pool.reserve_a, pool.reserve_b, pool.fee_rate
        );

        Ok(Reserves {
            reserve_a: atomic_to_ui(pool.reserve_a, decimals_a),
            reserve_b: atomic_to_ui(pool.reserve_b, decimals_b),
            fee_rate:  pool.fee_rate_fraction(),
            mints:     Some((pool.mint_a, pool.mint_b)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::{mint_account, MemoryLedger};
    use crate::state::{amm_pool_bytes, AmmPoolState};
    use solana_sdk::account::Account;

    fn pool_state(mint_a: Pubkey, mint_b: Pubkey) -> AmmPoolState {
        AmmPoolState {
            authority: Pubkey::new_unique(),
            mint_a,
            mint_b,
            vault_a:   Pubkey::new_unique(),
            vault_b:   Pubkey::new_unique(),
            fee_rate:  30,
            reserve_a: 5_000_000_000,
            reserve_b: 2_000_000_000,
            bump:      254,
        }
    }

    #[tokio::test]
    async fn fixed_reserves_are_the_mock_constants() {
        let r = FixedReserves::mock().reserves().await.unwrap();
        assert_eq!(r, Reserves { reserve_a: 100_000.0, reserve_b: 100.0, fee_rate: 0.01, mints: None });
    }

    #[tokio::test]
    async fn pool_reserves_scale_by_mint_decimals() {
        let ledger = MemoryLedger::new();
        let amm = Pubkey::new_unique();
        let (mint_a, mint_b, pool) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        ledger.insert(mint_a, mint_account(6, None));
        ledger.insert(mint_b, mint_account(9, None));
        ledger.insert(pool, Account {
            lamports:   1,
            data:       amm_pool_bytes(&pool_state(mint_a, mint_b)),
            owner:      amm,
            executable: false,
            rent_epoch: 0,
        });

        let r = AmmPoolReserves::new(&ledger, pool, amm).reserves().await.unwrap();
        assert_eq!(r.reserve_a, 5_000.0);
        assert_eq!(r.reserve_b, 2.0);
        assert!((r.fee_rate - 0.003).abs() < 1e-12);
        assert_eq!(r.input_mint(SwapDirection::AToB), Some(mint_a));
        assert_eq!(r.input_mint(SwapDirection::BToA), Some(mint_b));
    }

    #[tokio::test]
    async fn pool_owned_by_another_program_is_rejected() {
        let ledger = MemoryLedger::new();
        let pool = Pubkey::new_unique();
        ledger.insert(pool, Account {
            lamports:   1,
            data:       amm_pool_bytes(&pool_state(Pubkey::new_unique(), Pubkey::new_unique())),
            owner:      Pubkey::new_unique(),
            executable: false,
            rent_epoch: 0,
        });
        let err = AmmPoolReserves::new(&ledger, pool, Pubkey::new_unique()).reserves().await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn missing_pool_is_account_not_found() {
        let ledger = MemoryLedger::new();
        let pool = Pubkey::new_unique();
        let err = AmmPoolReserves::new(&ledger, pool, Pubkey::new_unique()).reserves().await.unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(k) if k == pool));
    }
}
