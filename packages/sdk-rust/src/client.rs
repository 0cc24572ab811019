//! [`HookSwapClient`] — the main entry point.

use std::sync::atomic::{AtomicBool, Ordering};

use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

use crate::{
    config::Config,
    error::{Action, Error, Result},
    instructions::{
        create_hooked_mint_ixs, create_pool_ixs, derive_ata, hooked_mint_len, hooked_transfer_ix,
        legacy_token_program_id, mint_initial_supply_ixs, token_2022_program_id,
    },
    ledger::{Ledger, RpcLedger},
    math::{self, scale_whole, ui_to_atomic},
    reserves::{AmmPoolReserves, ReserveSource},
    state::{parse_mint, parse_token_account},
    types::{
        AddLiquidityParams, CreatePoolParams, CreatePoolResult, CreateTokenParams,
        CreateTokenResult, MintInfo, QuoteParams, SwapParams, SwapQuote, SwapResult, TokenBalance,
        TransferResult,
    },
};

pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_DECIMALS:   u8    = 9;
/// 2 SOL.
pub const DEFAULT_AIRDROP_LAMPORTS: u64 = 2_000_000_000;

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HookSwap client.
///
/// Owns one ledger connection and the resolved configuration. The signer is
/// passed to each write operation. At most one call per [`Action`] runs at a
/// time; a second concurrent call fails with [`Error::Busy`].
///
/// ```rust,no_run
/// # use hookswap_sdk::{Config, FixedReserves, HookSwapClient, QuoteParams, SwapDirection};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HookSwapClient::new(Config::default_devnet().apply_env());
/// let quote = client.quote(&FixedReserves::mock(), QuoteParams {
///     amount_in: 1000.0, slippage_pct: 1.0, direction: SwapDirection::AToB,
/// }).await?;
/// println!("Estimated out: {:.4}", quote.amount_out);
/// # Ok(())
/// # }
/// ```
pub struct HookSwapClient<L = RpcLedger> {
    ledger:    L,
    config:    Config,
    in_flight: [AtomicBool; Action::ALL.len()],
}

impl HookSwapClient<RpcLedger> {
    /// Client talking to `config.rpc_url`.
    pub fn new(config: Config) -> Self {
        Self::with_ledger(RpcLedger::new(config.rpc_url.clone()), config)
    }

    /// Pre-configured client for Solana devnet, with `HOOKSWAP_*` overrides applied.
    pub fn devnet() -> Self {
        Self::new(Config::default_devnet().apply_env())
    }
}

impl<L: Ledger> HookSwapClient<L> {
    pub fn with_ledger(ledger: L, config: Config) -> Self {
        Self {
            ledger,
            config,
            in_flight: Action::ALL.map(|_| AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    // ── Write operations ──────────────────────────────────────────────────────

    /// Issue a Token-2022 mint carrying the configured transfer hook.
    ///
    /// The payer becomes mint, freeze and hook authority. A non-zero
    /// `initial_supply` (whole tokens) is minted to the payer's associated
    /// account in a second transaction.
    pub async fn create_token(
        &self,
        payer:  &dyn Signer,
        params: CreateTokenParams,
    ) -> Result<CreateTokenResult> {
        let _guard = self.begin(Action::CreateToken)?;

        let name   = params.name.trim().to_string();
        let symbol = params.symbol.trim().to_uppercase();
        if name.is_empty() || symbol.is_empty() {
            return Err(Error::InvalidArgument("token name and symbol are required".into()));
        }
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(Error::InvalidArgument(format!(
                "symbol '{symbol}' is longer than {MAX_SYMBOL_LEN} characters"
            )));
        }
        if params.decimals > MAX_DECIMALS {
            return Err(Error::InvalidArgument(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                params.decimals
            )));
        }

        let hook = self.config.transfer_hook_program_id()?;
        let minted = scale_whole(params.initial_supply, params.decimals)?;
        let payer_key = payer.try_pubkey().map_err(Error::from_signer)?;

        let mint = Keypair::new();
        let lamports = self
            .ledger
            .minimum_balance_for_rent_exemption(hooked_mint_len()?)
            .await?;
        let ixs = create_hooked_mint_ixs(&payer_key, &mint.pubkey(), &hook, params.decimals, lamports)?;

        log::info!("creating {symbol} mint {} with transfer hook {hook}", mint.pubkey());
        let signature = self.sign_and_send(&ixs, payer, &[&mint as &dyn Signer]).await?;

        let (token_account, mint_to_signature) = if minted > 0 {
            let (ata, ixs) = mint_initial_supply_ixs(&payer_key, &mint.pubkey(), minted)?;
            log::info!("minting {minted} atomic units of {} to {ata}", mint.pubkey());
            let sig = self.sign_and_send(&ixs, payer, &[]).await?;
            (Some(ata), Some(sig))
        } else {
            (None, None)
        };

        Ok(CreateTokenResult {
            mint: mint.pubkey(),
            signature,
            name,
            symbol,
            decimals: params.decimals,
            transfer_hook: hook,
            token_account,
            mint_to_signature,
            minted,
        })
    }

    /// Allocate a placeholder pool account and its two vaults.
    ///
    /// The pool is a System-owned byte buffer; no program interprets it.
    pub async fn create_pool(
        &self,
        payer:  &dyn Signer,
        params: CreatePoolParams,
    ) -> Result<CreatePoolResult> {
        let _guard = self.begin(Action::CreatePool)?;

        if params.mint_a == params.mint_b {
            return Err(Error::InvalidArgument("pool mints must differ".into()));
        }
        let payer_key = payer.try_pubkey().map_err(Error::from_signer)?;

        let pool  = Keypair::new();
        let space = self.config.pool_account_space;
        let lamports = self
            .ledger
            .minimum_balance_for_rent_exemption(space as usize)
            .await?;
        let (record, ixs) =
            create_pool_ixs(&payer_key, &pool.pubkey(), &params.mint_a, &params.mint_b, space, lamports);

        log::info!(
            "creating pool {} (vault A {}, vault B {})",
            record.pool, record.vault_a, record.vault_b
        );
        let signature = self.sign_and_send(&ixs, payer, &[&pool as &dyn Signer]).await?;

        Ok(CreatePoolResult { record, signature })
    }

    /// Move a bounded amount of `mint_a` from the payer into the pool's vault A.
    pub async fn add_liquidity(
        &self,
        payer:  &dyn Signer,
        params: AddLiquidityParams,
    ) -> Result<TransferResult> {
        let _guard = self.begin(Action::AddLiquidity)?;

        let payer_key = payer.try_pubkey().map_err(Error::from_signer)?;
        let holding = self.holding(&payer_key, &params.mint_a, params.amount).await?;

        let vault_a = derive_ata(&params.pool, &params.mint_a, &holding.token_program);
        if self.ledger.account(&vault_a).await?.is_none() {
            return Err(Error::AccountNotFound(vault_a));
        }

        self.transfer(payer, &payer_key, &holding, &vault_a, Action::AddLiquidity).await
    }

    /// Quote `params.amount_in` against `reserves`. Submits nothing.
    pub async fn quote<R: ReserveSource>(&self, reserves: &R, params: QuoteParams) -> Result<SwapQuote> {
        let reserves = reserves.reserves().await?;
        math::quote(params.amount_in, &reserves, params.direction, params.slippage_pct)
    }

    /// Quote against a pool and mint that must agree on the input side.
    async fn quote_for_mint<R: ReserveSource>(
        &self,
        reserves: &R,
        mint_in:  &Pubkey,
        params:   QuoteParams,
    ) -> Result<SwapQuote> {
        let reserves = reserves.reserves().await?;
        if let Some(expected) = reserves.input_mint(params.direction) {
            if expected != *mint_in {
                return Err(Error::InvalidArgument(format!(
                    "{mint_in} is not the input mint of this pool for {:?} (expected {expected})",
                    params.direction
                )));
            }
        }
        math::quote(params.amount_in, &reserves, params.direction, params.slippage_pct)
    }

    /// Quote, then exercise the transfer hook with a bounded self-transfer of `mint_in`.
    ///
    /// Nothing is exchanged: the payer's holding account is both source and
    /// destination.
    pub async fn swap<R: ReserveSource>(
        &self,
        payer:    &dyn Signer,
        reserves: &R,
        params:   SwapParams,
    ) -> Result<SwapResult> {
        let _guard = self.begin(Action::Swap)?;

        let quote = self
            .quote_for_mint(reserves, &params.mint_in, QuoteParams {
                amount_in:    params.amount_in,
                slippage_pct: params.slippage_pct,
                direction:    params.direction,
            })
            .await?;

        let payer_key = payer.try_pubkey().map_err(Error::from_signer)?;
        let holding = self.holding(&payer_key, &params.mint_in, params.amount_in).await?;
        let transfer = self
            .transfer(payer, &payer_key, &holding, &holding.account, Action::Swap)
            .await?;

        Ok(SwapResult { quote, transfer })
    }

    /// Ask the faucet for `lamports` (devnet/testnet only).
    pub async fn request_airdrop(&self, owner: &Pubkey, lamports: u64) -> Result<Signature> {
        let _guard = self.begin(Action::Airdrop)?;
        log::info!("requesting {lamports} lamports for {owner}");
        self.ledger.request_airdrop(owner, lamports).await
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// Reserves of an AMM pool owned by the configured AMM program.
    pub fn pool_reserves(&self, pool: Pubkey) -> Result<AmmPoolReserves<'_, L>> {
        Ok(AmmPoolReserves::new(&self.ledger, pool, self.config.amm_program_id()?))
    }

    /// Decode a mint under either token program.
    pub async fn mint_info(&self, mint: &Pubkey) -> Result<MintInfo> {
        let account = self
            .ledger
            .account(mint)
            .await?
            .ok_or(Error::AccountNotFound(*mint))?;
        if account.owner != token_2022_program_id() && account.owner != legacy_token_program_id() {
            return Err(Error::InvalidAddress {
                input:  mint.to_string(),
                reason: format!("owned by {}, not a token program", account.owner),
            });
        }
        let state = parse_mint(&account.data)?;
        Ok(MintInfo {
            address:               *mint,
            token_program:         account.owner,
            decimals:              state.decimals,
            supply:                state.supply,
            mint_authority:        state.mint_authority,
            freeze_authority:      state.freeze_authority,
            transfer_hook_program: state.transfer_hook_program,
        })
    }

    /// `false` for missing accounts and anything not owned by Token-2022.
    pub async fn is_token_2022_mint(&self, mint: &Pubkey) -> Result<bool> {
        Ok(self
            .ledger
            .account(mint)
            .await?
            .is_some_and(|a| a.owner == token_2022_program_id()))
    }

    /// Balance of `owner`'s associated account for `mint`; zero if it does not exist.
    pub async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<TokenBalance> {
        let info = self.mint_info(mint).await?;
        let account = derive_ata(owner, mint, &info.token_program);
        let amount = match self.ledger.account(&account).await? {
            Some(acc) => parse_token_account(&acc.data)?.amount,
            None      => 0,
        };
        Ok(TokenBalance { owner: *owner, mint: *mint, account, amount, decimals: info.decimals })
    }

    /// Lamports held by `owner`.
    pub async fn sol_balance(&self, owner: &Pubkey) -> Result<u64> {
        self.ledger.balance(owner).await
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn begin(&self, action: Action) -> Result<InFlight<'_>> {
        let flag = &self.in_flight[action.index()];
        if flag.swap(true, Ordering::AcqRel) {
            log::debug!("{action} rejected: already in progress");
            return Err(Error::Busy(action));
        }
        Ok(InFlight(flag))
    }

    /// Locate and check the payer's holding of `mint` against a UI amount.
    async fn holding(&self, owner: &Pubkey, mint: &Pubkey, ui_amount: f64) -> Result<Holding> {
        let info = self.mint_info(mint).await?;
        let requested = ui_to_atomic(ui_amount, info.decimals)?;
        if requested == 0 {
            return Err(Error::InvalidArgument("amount must be greater than zero".into()));
        }

        let account = derive_ata(owner, mint, &info.token_program);
        let data = self
            .ledger
            .account(&account)
            .await?
            .ok_or(Error::AccountNotFound(account))?;
        let available = parse_token_account(&data.data)?.amount;
        if requested > available {
            return Err(Error::InsufficientBalance { required: requested, available, decimals: info.decimals });
        }

        let amount = requested.min(self.config.demo_transfer_cap);
        log::debug!("{account} holds {available}; requested {requested}, moving {amount}");
        Ok(Holding {
            account,
            mint:          *mint,
            token_program: info.token_program,
            decimals:      info.decimals,
            hook_program:  info.transfer_hook_program,
            amount,
        })
    }

    async fn transfer(
        &self,
        payer:       &dyn Signer,
        payer_key:   &Pubkey,
        holding:     &Holding,
        destination: &Pubkey,
        action:      Action,
    ) -> Result<TransferResult> {
        let ix = hooked_transfer_ix(
            &holding.token_program,
            &holding.account,
            &holding.mint,
            destination,
            payer_key,
            holding.amount,
            holding.decimals,
            holding.hook_program.as_ref(),
        )?;

        log::info!("{action}: transferring {} of {} to {destination}", holding.amount, holding.mint);
        let signature = self.sign_and_send(&[ix], payer, &[]).await?;

        Ok(TransferResult {
            signature,
            mint:         holding.mint,
            source:       holding.account,
            destination:  *destination,
            amount:       holding.amount,
            decimals:     holding.decimals,
            hook_program: holding.hook_program,
        })
    }

    async fn sign_and_send(
        &self,
        instructions: &[Instruction],
        payer:        &dyn Signer,
        extra:        &[&dyn Signer],
    ) -> Result<Signature> {
        let payer_key = payer.try_pubkey().map_err(Error::from_signer)?;
        let blockhash = self.ledger.latest_blockhash().await?;
        let mut signers: Vec<&dyn Signer> = vec![payer];
        signers.extend_from_slice(extra);
        let mut tx = Transaction::new_with_payer(instructions, Some(&payer_key));
        tx.try_sign(&signers, blockhash).map_err(Error::from_signer)?;
        self.ledger.send_and_confirm(&tx).await
    }
}

/// Clears its action's in-flight flag on drop.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A checked holding account and the amount about to leave it.
struct Holding {
    account:       Pubkey,
    mint:          Pubkey,
    token_program: Pubkey,
    decimals:      u8,
    hook_program:  Option<Pubkey>,
    amount:        u64,
}
