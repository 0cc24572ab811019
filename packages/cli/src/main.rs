use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use hookswap_sdk::{
    math::{atomic_to_ui, ui_to_atomic},
    tokens::{display_name, parse_pubkey, resolve_mint, KNOWN_TOKENS},
    Action, AddLiquidityParams, Config, CreatePoolParams, CreateTokenParams, FixedReserves,
    HookSwapClient, QuoteParams, ReserveSource, StatsSnapshot, StatsTicker, SwapDirection,
    SwapParams,
};
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature, Signer},
    signer::SignerError,
};

const DEFAULT_CONFIG_PATH: &str = "~/.config/hookswap/config.toml";
const LAMPORTS_PER_SOL_DECIMALS: u8 = 9;

// ─── Keypairs ─────────────────────────────────────────────────────────────────

/// Expand `~/` to `$HOME/` in user-supplied paths.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => PathBuf::from(std::env::var("HOME").unwrap_or_default()).join(rest),
        None       => PathBuf::from(path),
    }
}

fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded = expand_home(path);
    read_keypair_file(&expanded).map_err(|e| {
        anyhow!(
            "Cannot load keypair from '{}': {}\n  \
             Set HOOKSWAP_KEYPAIR or pass --keypair to specify a different path.",
            expanded.display(),
            e
        )
    })
}

/// Keypair that asks before every signature, reading answers from stdin.
///
/// Declining surfaces as `SignerError::UserCancel`.
struct ConfirmingSigner {
    keypair:      Keypair,
    auto_approve: bool,
    answers:      Mutex<Box<dyn BufRead + Send>>,
}

impl ConfirmingSigner {
    fn new(keypair: Keypair, auto_approve: bool) -> Self {
        Self::with_answers(keypair, auto_approve, Box::new(BufReader::new(std::io::stdin())))
    }

    fn with_answers(keypair: Keypair, auto_approve: bool, answers: Box<dyn BufRead + Send>) -> Self {
        Self { keypair, auto_approve, answers: Mutex::new(answers) }
    }

    fn confirm(&self) -> std::result::Result<(), SignerError> {
        if self.auto_approve {
            return Ok(());
        }
        let mut stderr = std::io::stderr();
        write!(stderr, "  Sign transaction as {}? [y/N] ", self.keypair.pubkey())
            .and_then(|_| stderr.flush())
            .map_err(|e| SignerError::Custom(e.to_string()))?;

        let mut answer = String::new();
        self.answers
            .lock()
            .map_err(|_| SignerError::Custom("prompt input unavailable".into()))?
            .read_line(&mut answer)
            .map_err(|e| SignerError::Custom(e.to_string()))?;
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(()),
            _ => Err(SignerError::UserCancel("declined at prompt".into())),
        }
    }
}

impl Signer for ConfirmingSigner {
    fn try_pubkey(&self) -> std::result::Result<Pubkey, SignerError> {
        Ok(self.keypair.pubkey())
    }

    fn try_sign_message(&self, message: &[u8]) -> std::result::Result<Signature, SignerError> {
        self.confirm()?;
        self.keypair.try_sign_message(message)
    }

    fn is_interactive(&self) -> bool {
        !self.auto_approve
    }
}

// ─── Version banner ───────────────────────────────────────────────────────────

/// Print the HookSwap banner to stdout.
fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  HookSwap  v{ver}  ·  Token-2022 transfer-hook AMM front end");
    println!("  {}", "─".repeat(62));
    println!("  Network   Solana devnet (override with --rpc-url)");
    println!("  Tokens    {}", KNOWN_TOKENS.iter().map(|(s, _)| *s).collect::<Vec<_>>().join(", "));
    println!("  Config    {DEFAULT_CONFIG_PATH}");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// HookSwap: issue and trade Token-2022 mints with transfer hooks on Solana.
///
/// Every command supports --json for machine-readable output.
#[derive(Parser)]
#[command(
    name    = "hookswap",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Issue Token-2022 mints with transfer hooks, scaffold pools and exercise hooks through swaps.",
    after_help = "\
ENVIRONMENT:
  HOOKSWAP_RPC_URL                    Solana JSON-RPC endpoint  [default: https://api.devnet.solana.com]
  HOOKSWAP_KEYPAIR                    Path to Ed25519 keypair JSON  [default: ~/.config/solana/id.json]
  HOOKSWAP_CONFIG                     Config file  [default: ~/.config/hookswap/config.toml]
  HOOKSWAP_TRANSFER_HOOK_PROGRAM_ID   Hook program attached to new mints
  HOOKSWAP_AMM_PROGRAM_ID             AMM program for --pool reserve reads
  RUST_LOG                            Log filter  [default: warn]

QUICK START:
  hookswap init-config
  hookswap airdrop
  hookswap create-token --name \"Real Estate\" --symbol RWA
  hookswap create-pool  --token-a <MINT> --token-b SOL
  hookswap swap         --token <MINT> --amount 10"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(long, global = true, value_name = "URL", env = "HOOKSWAP_RPC_URL")]
    rpc_url: Option<String>,

    /// Path to the signer's Ed25519 keypair JSON file
    #[arg(
        long,
        global        = true,
        value_name    = "PATH",
        default_value = "~/.config/solana/id.json",
        env           = "HOOKSWAP_KEYPAIR"
    )]
    keypair: String,

    /// TOML config file; missing default path falls back to devnet defaults
    #[arg(long, global = true, value_name = "PATH", env = "HOOKSWAP_CONFIG")]
    config: Option<String>,

    /// Transfer-hook program attached to new mints
    #[arg(long, global = true, value_name = "PROGRAM_ID")]
    transfer_hook_program: Option<String>,

    /// AMM program owning pools read with --pool
    #[arg(long, global = true, value_name = "PROGRAM_ID")]
    amm_program: Option<String>,

    /// Sign without asking for confirmation
    #[arg(long, short = 'y', global = true, default_value_t = false)]
    yes: bool,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a Token-2022 mint with a transfer hook
    ///
    /// The signer becomes mint, freeze and hook authority. A non-zero
    /// --supply is minted to the signer's associated token account in a
    /// second transaction.
    #[command(
        after_help = "\
EXAMPLES:
  hookswap create-token --name \"Real Estate\" --symbol RWA
  hookswap create-token --name Gold --symbol GLD --decimals 9 --supply 0
  hookswap create-token --name Gold --symbol GLD --transfer-hook-program <PROGRAM_ID> --json

NOTES:
  Name and symbol are shown locally only; no metadata is written on-chain.
  Symbol: at most 10 characters. Decimals: 0–9."
    )]
    CreateToken {
        /// Display name
        #[arg(long)]
        name: String,

        /// Ticker, at most 10 characters
        #[arg(long)]
        symbol: String,

        #[arg(long, default_value_t = 6)]
        decimals: u8,

        /// Whole tokens minted to the signer; 0 skips minting
        #[arg(long, value_name = "WHOLE_TOKENS", default_value_t = 1_000_000)]
        supply: u64,
    },

    /// Allocate a placeholder pool account and its two vaults
    ///
    /// The pool account is an inert byte buffer owned by the System program.
    /// Vault A is a Token-2022 account; vault B uses the legacy Token program
    /// when token B is SOL.
    #[command(
        after_help = "\
EXAMPLES:
  hookswap create-pool --token-a <MINT>
  hookswap create-pool --token-a <MINT> --token-b USDC --json"
    )]
    CreatePool {
        /// Token A (symbol or base-58 mint address)
        #[arg(long, value_name = "TOKEN")]
        token_a: String,

        /// Token B (symbol or base-58 mint address)
        #[arg(long, value_name = "TOKEN", default_value = "SOL")]
        token_b: String,
    },

    /// Transfer token A into a pool's vault A
    ///
    /// At most the configured demo_transfer_cap atomic units move.
    #[command(
        after_help = "\
EXAMPLES:
  hookswap add-liquidity --pool <POOL> --token-a <MINT> --amount 1000"
    )]
    AddLiquidity {
        /// Pool account returned by create-pool
        #[arg(long, value_name = "ADDRESS")]
        pool: String,

        /// Token A (symbol or base-58 mint address)
        #[arg(long, value_name = "TOKEN")]
        token_a: String,

        /// Amount of token A in whole-token units, e.g. 12.5
        #[arg(long)]
        amount: f64,
    },

    /// Quote a constant-product swap without sending anything
    ///
    /// Uses mock reserves (100 000 A / 100 B, 1 % fee) unless --pool names an
    /// AMM pool account.
    #[command(
        after_help = "\
EXAMPLES:
  hookswap quote --amount 1000
  hookswap quote --amount 1 --reverse --slippage 0.5
  hookswap quote --amount 1000 --pool <POOL> --amm-program <PROGRAM_ID> --json

OUTPUT FIELDS:
  amount_out        (in·(1−fee)·reserve_out) / (reserve_in + in·(1−fee))
  rate              reserve_out / reserve_in
  price_impact_pct  in / reserve_in · 100, capped at 10
  minimum_received  amount_out · (1 − slippage/100)"
    )]
    Quote {
        /// Input amount in whole-token units
        #[arg(long)]
        amount: f64,

        /// Slippage tolerance in percent
        #[arg(long, value_name = "PCT", default_value_t = 1.0)]
        slippage: f64,

        /// Quote B → A instead of A → B
        #[arg(long, default_value_t = false)]
        reverse: bool,

        /// Read reserves from this AMM pool account
        #[arg(long, value_name = "ADDRESS")]
        pool: Option<String>,
    },

    /// Quote, then push a bounded self-transfer through the transfer hook
    ///
    /// No tokens are exchanged: the signer's token account is both source and
    /// destination, so the only effect is that the hook runs.
    #[command(
        after_help = "\
EXAMPLES:
  hookswap swap --token <MINT> --amount 10
  hookswap swap --token <MINT> --amount 10 --slippage 0.5 --yes --json"
    )]
    Swap {
        /// Token to send (symbol or base-58 mint address)
        #[arg(long, value_name = "TOKEN")]
        token: String,

        /// Amount in whole-token units
        #[arg(long)]
        amount: f64,

        #[arg(long, value_name = "PCT", default_value_t = 1.0)]
        slippage: f64,

        #[arg(long, default_value_t = false)]
        reverse: bool,

        /// Read reserves from this AMM pool account instead of the mock
        #[arg(long, value_name = "ADDRESS")]
        pool: Option<String>,
    },

    /// Show simulated protocol statistics
    ///
    /// With --ticks N, prints N further snapshots, one per refresh period.
    #[command(
        after_help = "\
EXAMPLES:
  hookswap stats
  hookswap stats --ticks 5 --json"
    )]
    Stats {
        #[arg(long, default_value_t = 0)]
        ticks: u32,
    },

    /// Decode a mint: decimals, supply, authorities and transfer hook
    #[command(after_help = "\
EXAMPLES:
  hookswap mint-info --mint <MINT>
  hookswap mint-info --mint USDC --json")]
    MintInfo {
        #[arg(long, value_name = "TOKEN")]
        mint: String,
    },

    /// Show SOL balance, or a token balance with --mint
    #[command(after_help = "\
EXAMPLES:
  hookswap balance
  hookswap balance --mint <MINT> --owner <WALLET>")]
    Balance {
        #[arg(long, value_name = "TOKEN")]
        mint: Option<String>,

        /// Wallet to inspect; defaults to the keypair's public key
        #[arg(long, value_name = "ADDRESS")]
        owner: Option<String>,
    },

    /// Request devnet SOL from the faucet
    #[command(after_help = "\
EXAMPLES:
  hookswap airdrop
  hookswap airdrop --sol 1 --owner <WALLET>")]
    Airdrop {
        #[arg(long, default_value_t = 2.0)]
        sol: f64,

        #[arg(long, value_name = "ADDRESS")]
        owner: Option<String>,
    },

    /// Write a default config file
    InitConfig {
        #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
        path: String,

        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::CreateToken { .. }  => "create-token",
            Commands::CreatePool { .. }   => "create-pool",
            Commands::AddLiquidity { .. } => "add-liquidity",
            Commands::Quote { .. }        => "quote",
            Commands::Swap { .. }         => "swap",
            Commands::Stats { .. }        => "stats",
            Commands::MintInfo { .. }     => "mint-info",
            Commands::Balance { .. }      => "balance",
            Commands::Airdrop { .. }      => "airdrop",
            Commands::InitConfig { .. }   => "init-config",
        }
    }

    fn action(&self) -> Option<Action> {
        match self {
            Commands::CreateToken { .. }  => Some(Action::CreateToken),
            Commands::CreatePool { .. }   => Some(Action::CreatePool),
            Commands::AddLiquidity { .. } => Some(Action::AddLiquidity),
            Commands::Swap { .. }         => Some(Action::Swap),
            Commands::Airdrop { .. }      => Some(Action::Airdrop),
            _                             => None,
        }
    }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return;
    }

    let cli = Cli::parse();
    if let Err(err) = run(&cli).await {
        report_failure(&cli, &err);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    if let Commands::InitConfig { path, force } = &cli.command {
        return cmd_init_config(path, *force, cli.json);
    }

    let config = load_config(cli)?;
    let client = HookSwapClient::new(config);

    match &cli.command {
        Commands::CreateToken { name, symbol, decimals, supply } => {
            cmd_create_token(cli, &client, name, symbol, *decimals, *supply).await
        }
        Commands::CreatePool { token_a, token_b } => cmd_create_pool(cli, &client, token_a, token_b).await,
        Commands::AddLiquidity { pool, token_a, amount } => {
            cmd_add_liquidity(cli, &client, pool, token_a, *amount).await
        }
        Commands::Quote { amount, slippage, reverse, pool } => {
            let params = QuoteParams { amount_in: *amount, slippage_pct: *slippage, direction: direction(*reverse) };
            match pool {
                Some(pool) => {
                    let reserves = client.pool_reserves(parse_pubkey(pool)?)?;
                    cmd_quote(cli, &client, &reserves, params).await
                }
                None => cmd_quote(cli, &client, &FixedReserves::mock(), params).await,
            }
        }
        Commands::Swap { token, amount, slippage, reverse, pool } => {
            let params = SwapParams {
                mint_in:      resolve_mint(token)?,
                amount_in:    *amount,
                slippage_pct: *slippage,
                direction:    direction(*reverse),
            };
            match pool {
                Some(pool) => {
                    let reserves = client.pool_reserves(parse_pubkey(pool)?)?;
                    cmd_swap(cli, &client, &reserves, params).await
                }
                None => cmd_swap(cli, &client, &FixedReserves::mock(), params).await,
            }
        }
        Commands::Stats { ticks } => cmd_stats(cli, client.config(), *ticks).await,
        Commands::MintInfo { mint } => cmd_mint_info(cli, &client, mint).await,
        Commands::Balance { mint, owner } => cmd_balance(cli, &client, mint.as_deref(), owner.as_deref()).await,
        Commands::Airdrop { sol, owner } => cmd_airdrop(cli, &client, *sol, owner.as_deref()).await,
        Commands::InitConfig { path, force } => cmd_init_config(path, *force, cli.json),
    }
}

/// `(kind, message)` shown for a failed command.
fn describe_failure(command: &Commands, err: &anyhow::Error) -> (&'static str, String) {
    let sdk = err.downcast_ref::<hookswap_sdk::Error>();
    let kind = sdk.map_or("unknown", |e| e.kind().as_str());
    let message = match (sdk, command.action()) {
        (Some(e), Some(action)) => e.user_message(action),
        _ => format!("{err:#}"),
    };
    (kind, message)
}

fn failure_json(command: &Commands, err: &anyhow::Error) -> serde_json::Value {
    let (kind, message) = describe_failure(command, err);
    json!({
        "status":  "error",
        "command": command.name(),
        "kind":    kind,
        "message": message,
    })
}

/// Print the failure for the user; the raw error goes to the debug log.
fn report_failure(cli: &Cli, err: &anyhow::Error) {
    log::debug!("{} failed: {err:#}", cli.command.name());

    if cli.json {
        println!("{}", failure_json(&cli.command, err));
    } else {
        eprintln!("Error: {}", describe_failure(&cli.command, err).1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(expand_home(path))?,
        None => {
            let default = expand_home(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Config::load(default)?
            } else {
                log::debug!("no config at {}, using devnet defaults", default.display());
                Config::default_devnet()
            }
        }
    }
    .apply_env();

    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(id) = &cli.transfer_hook_program {
        config.transfer_hook_program_id = Some(id.clone());
    }
    if let Some(id) = &cli.amm_program {
        config.amm_program_id = Some(id.clone());
    }
    Ok(config)
}

fn signer(cli: &Cli) -> Result<ConfirmingSigner> {
    Ok(ConfirmingSigner::new(load_keypair(&cli.keypair)?, cli.yes))
}

/// `--owner`, or the keypair's public key.
fn owner_or_keypair(cli: &Cli, owner: Option<&str>) -> Result<Pubkey> {
    match owner {
        Some(owner) => Ok(parse_pubkey(owner)?),
        None        => Ok(load_keypair(&cli.keypair)?.pubkey()),
    }
}

fn direction(reverse: bool) -> SwapDirection {
    if reverse { SwapDirection::BToA } else { SwapDirection::AToB }
}

// ─── create-token ────────────────────────────────────────────────────────────

async fn cmd_create_token(
    cli:      &Cli,
    client:   &HookSwapClient,
    name:     &str,
    symbol:   &str,
    decimals: u8,
    supply:   u64,
) -> Result<()> {
    let payer = signer(cli)?;
    let res = client
        .create_token(&payer, CreateTokenParams {
            name:           name.to_string(),
            symbol:         symbol.to_string(),
            decimals,
            initial_supply: supply,
        })
        .await?;

    if cli.json {
        println!("{}", json!({
            "status":         "ok",
            "command":        "create-token",
            "mint":           res.mint.to_string(),
            "name":           res.name,
            "symbol":         res.symbol,
            "decimals":       res.decimals,
            "transfer_hook":  res.transfer_hook.to_string(),
            "token_account":  res.token_account.map(|a| a.to_string()),
            "minted":         res.minted,
            "tx":             res.signature.to_string(),
            "mint_to_tx":     res.mint_to_signature.map(|s| s.to_string()),
        }));
    } else {
        println!("─── Token Created ────────────────────────────────────────────────");
        println!("  Name             {}  ({})", res.name, res.symbol);
        println!("  Mint             {}", res.mint);
        println!("  Decimals         {}", res.decimals);
        println!("  Transfer hook    {}", res.transfer_hook);
        println!("  Transaction      {}", res.signature);
        if let (Some(ata), Some(sig)) = (res.token_account, res.mint_to_signature) {
            println!("  Minted           {}  →  {ata}", atomic_to_ui(res.minted, res.decimals));
            println!("  Mint tx          {sig}");
        }
        println!();
        println!("  Next: hookswap create-pool --token-a {}", res.mint);
    }
    Ok(())
}

// ─── create-pool ─────────────────────────────────────────────────────────────

async fn cmd_create_pool(cli: &Cli, client: &HookSwapClient, token_a: &str, token_b: &str) -> Result<()> {
    let mint_a = resolve_mint(token_a)?;
    let mint_b = resolve_mint(token_b)?;
    let payer = signer(cli)?;
    let res = client.create_pool(&payer, CreatePoolParams { mint_a, mint_b }).await?;
    let rec = &res.record;

    if cli.json {
        println!("{}", json!({
            "status":          "ok",
            "command":         "create-pool",
            "pool":            rec.pool.to_string(),
            "token_a_mint":    rec.mint_a.to_string(),
            "token_b_mint":    rec.mint_b.to_string(),
            "vault_a":         rec.vault_a.to_string(),
            "vault_b":         rec.vault_b.to_string(),
            "token_program_a": rec.token_program_a.to_string(),
            "token_program_b": rec.token_program_b.to_string(),
            "tx":              res.signature.to_string(),
        }));
    } else {
        println!("─── Pool Created ─────────────────────────────────────────────────");
        println!("  Pool             {}", rec.pool);
        println!("  Token A          {}  ({})", display_name(&rec.mint_a), rec.mint_a);
        println!("  Token B          {}  ({})", display_name(&rec.mint_b), rec.mint_b);
        println!("  Vault A          {}", rec.vault_a);
        println!("  Vault B          {}", rec.vault_b);
        println!("  Transaction      {}", res.signature);
        println!();
        println!("  Seed vault A next:");
        println!("    hookswap add-liquidity --pool {} --token-a {} --amount <AMOUNT>", rec.pool, rec.mint_a);
    }
    Ok(())
}

// ─── add-liquidity ───────────────────────────────────────────────────────────

async fn cmd_add_liquidity(
    cli:     &Cli,
    client:  &HookSwapClient,
    pool:    &str,
    token_a: &str,
    amount:  f64,
) -> Result<()> {
    let params = AddLiquidityParams { pool: parse_pubkey(pool)?, mint_a: resolve_mint(token_a)?, amount };
    let payer = signer(cli)?;
    let res = client.add_liquidity(&payer, params).await?;

    if cli.json {
        println!("{}", json!({
            "status":      "ok",
            "command":     "add-liquidity",
            "pool":        pool,
            "mint":        res.mint.to_string(),
            "source":      res.source.to_string(),
            "vault":       res.destination.to_string(),
            "amount":      res.amount,
            "ui_amount":   res.ui_amount(),
            "tx":          res.signature.to_string(),
        }));
    } else {
        println!("─── Liquidity Added ──────────────────────────────────────────────");
        println!("  Token            {}", display_name(&res.mint));
        println!("  Amount           {}", res.ui_amount());
        println!("  Vault            {}", res.destination);
        println!("  Transaction      {}", res.signature);
    }
    Ok(())
}

// ─── quote ───────────────────────────────────────────────────────────────────

async fn cmd_quote<R: ReserveSource>(
    cli:      &Cli,
    client:   &HookSwapClient,
    reserves: &R,
    params:   QuoteParams,
) -> Result<()> {
    let q = client.quote(reserves, params).await?;

    if cli.json {
        println!("{}", json!({
            "status":           "ok",
            "command":          "quote",
            "direction":        format!("{:?}", params.direction),
            "amount_in":        q.amount_in,
            "amount_out":       q.amount_out,
            "rate":             q.rate,
            "price_impact_pct": q.price_impact_pct,
            "fee":              q.fee,
            "minimum_received": q.minimum_received,
            "slippage_pct":     params.slippage_pct,
        }));
    } else {
        println!("─── Quote ────────────────────────────────────────────────────────");
        println!("  Direction        {:?}", params.direction);
        println!("  Amount in        {}", q.amount_in);
        println!("  Estimated out    {:.6}", q.amount_out);
        println!("  Rate             {:.6}", q.rate);
        println!("  Price impact     {:.2}%", q.price_impact_pct);
        println!("  Fee              {:.6}", q.fee);
        println!("  Minimum received {:.6}  ({}% slippage)", q.minimum_received, params.slippage_pct);
    }
    Ok(())
}

// ─── swap ────────────────────────────────────────────────────────────────────

async fn cmd_swap<R: ReserveSource>(
    cli:      &Cli,
    client:   &HookSwapClient,
    reserves: &R,
    params:   SwapParams,
) -> Result<()> {
    let payer = signer(cli)?;
    let res = client.swap(&payer, reserves, params).await?;
    let (q, t) = (&res.quote, &res.transfer);

    if cli.json {
        println!("{}", json!({
            "status":           "ok",
            "command":          "swap",
            "mint":             t.mint.to_string(),
            "amount_in":        q.amount_in,
            "estimated_out":    q.amount_out,
            "price_impact_pct": q.price_impact_pct,
            "minimum_received": q.minimum_received,
            "transferred":      t.amount,
            "hook_program":     t.hook_program.map(|h| h.to_string()),
            "tx":               t.signature.to_string(),
        }));
    } else {
        println!("─── Swap Executed ────────────────────────────────────────────────");
        println!("  Token            {}", display_name(&t.mint));
        println!("  Amount in        {}", q.amount_in);
        println!("  Estimated out    {:.6}", q.amount_out);
        println!("  Transferred      {}  (self-transfer)", t.ui_amount());
        match t.hook_program {
            Some(hook) => println!("  Transfer hook    {hook}  validated"),
            None       => println!("  Transfer hook    none on this mint"),
        }
        println!("  Transaction      {}", t.signature);
    }
    Ok(())
}

// ─── stats ───────────────────────────────────────────────────────────────────

fn print_stats(cli: &Cli, snap: &StatsSnapshot) {
    if cli.json {
        println!("{}", json!({ "status": "ok", "command": "stats", "stats": snap }));
    } else {
        println!("─── Protocol Stats ───────────────────────────────────────────────");
        println!("  TVL              ${}", snap.total_value_locked);
        println!("  24h volume       ${}", snap.volume_24h);
        println!("  Transactions     {}", snap.total_transactions);
        println!("  Active users     {}", snap.active_users);
        println!("  Pools            {}", snap.total_pools);
        println!("  Hook validations {}", snap.hook_validations);
    }
}

async fn cmd_stats(cli: &Cli, config: &Config, ticks: u32) -> Result<()> {
    print_stats(cli, &StatsSnapshot::seed());
    if ticks == 0 {
        return Ok(());
    }

    let ticker = StatsTicker::spawn(StatsSnapshot::seed(), Duration::from_secs(config.stats_interval_secs));
    let mut rx = ticker.subscribe();
    for _ in 0..ticks {
        rx.changed().await.context("stats ticker ended early")?;
        let snap = *rx.borrow_and_update();
        print_stats(cli, &snap);
    }
    ticker.stop().await;
    Ok(())
}

// ─── mint-info ───────────────────────────────────────────────────────────────

async fn cmd_mint_info(cli: &Cli, client: &HookSwapClient, mint: &str) -> Result<()> {
    let info = client.mint_info(&resolve_mint(mint)?).await?;
    let opt = |k: Option<Pubkey>| k.map(|k| k.to_string());

    if cli.json {
        println!("{}", json!({
            "status":           "ok",
            "command":          "mint-info",
            "mint":             info.address.to_string(),
            "token_program":    info.token_program.to_string(),
            "token_2022":       info.is_token_2022(),
            "decimals":         info.decimals,
            "supply":           info.supply,
            "mint_authority":   opt(info.mint_authority),
            "freeze_authority": opt(info.freeze_authority),
            "transfer_hook":    opt(info.transfer_hook_program),
        }));
    } else {
        let none = || "none".to_string();
        println!("─── Mint ─────────────────────────────────────────────────────────");
        println!("  Mint             {}  ({})", info.address, display_name(&info.address));
        println!("  Program          {}{}", info.token_program, if info.is_token_2022() { "  (Token-2022)" } else { "" });
        println!("  Decimals         {}", info.decimals);
        println!("  Supply           {}", atomic_to_ui(info.supply, info.decimals));
        println!("  Mint authority   {}", opt(info.mint_authority).unwrap_or_else(none));
        println!("  Freeze authority {}", opt(info.freeze_authority).unwrap_or_else(none));
        println!("  Transfer hook    {}", opt(info.transfer_hook_program).unwrap_or_else(none));
    }
    Ok(())
}

// ─── balance ─────────────────────────────────────────────────────────────────

async fn cmd_balance(cli: &Cli, client: &HookSwapClient, mint: Option<&str>, owner: Option<&str>) -> Result<()> {
    let owner = owner_or_keypair(cli, owner)?;

    let Some(mint) = mint else {
        let lamports = client.sol_balance(&owner).await?;
        let sol = atomic_to_ui(lamports, LAMPORTS_PER_SOL_DECIMALS);
        if cli.json {
            println!("{}", json!({
                "status": "ok", "command": "balance", "owner": owner.to_string(),
                "lamports": lamports, "sol": sol,
            }));
        } else {
            println!("  {owner}  {sol} SOL");
        }
        return Ok(());
    };

    let bal = client.token_balance(&owner, &resolve_mint(mint)?).await?;
    if cli.json {
        println!("{}", json!({
            "status":    "ok",
            "command":   "balance",
            "owner":     owner.to_string(),
            "mint":      bal.mint.to_string(),
            "account":   bal.account.to_string(),
            "amount":    bal.amount,
            "ui_amount": bal.ui_amount(),
        }));
    } else {
        println!("  {owner}  {} {}", bal.ui_amount(), display_name(&bal.mint));
    }
    Ok(())
}

// ─── airdrop ─────────────────────────────────────────────────────────────────

async fn cmd_airdrop(cli: &Cli, client: &HookSwapClient, sol: f64, owner: Option<&str>) -> Result<()> {
    let owner = owner_or_keypair(cli, owner)?;
    let lamports = ui_to_atomic(sol, LAMPORTS_PER_SOL_DECIMALS)?;
    let sig = client.request_airdrop(&owner, lamports).await?;

    if cli.json {
        println!("{}", json!({
            "status": "ok", "command": "airdrop", "owner": owner.to_string(),
            "lamports": lamports, "tx": sig.to_string(),
        }));
    } else {
        println!("  Airdropped {sol} SOL to {owner}");
        println!("  Transaction      {sig}");
    }
    Ok(())
}

// ─── init-config ─────────────────────────────────────────────────────────────

fn cmd_init_config(path: &str, force: bool, json_output: bool) -> Result<()> {
    let path = expand_home(path);
    if path.exists() && !force {
        return Err(anyhow!("{} already exists; pass --force to overwrite", path.display()));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Config::write_default(&path)?;

    if json_output {
        println!("{}", json!({ "status": "ok", "command": "init-config", "path": path.display().to_string() }));
    } else {
        println!("  Wrote {}", path.display());
        println!("  Set transfer_hook_program_id before running create-token.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn write_commands_map_to_actions() {
        let cli = Cli::parse_from(["hookswap", "swap", "--token", "SOL", "--amount", "1"]);
        assert_eq!(cli.command.action(), Some(Action::Swap));
        assert_eq!(cli.command.name(), "swap");

        let cli = Cli::parse_from(["hookswap", "quote", "--amount", "1000", "--json"]);
        assert_eq!(cli.command.action(), None);
        assert!(cli.json);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "hookswap", "--config", "/nonexistent/hookswap.toml", "stats",
        ]);
        assert!(load_config(&cli).is_err());

        let hook = Pubkey::new_unique().to_string();
        let cli = Cli::parse_from([
            "hookswap", "--rpc-url", "http://localhost:8899",
            "--transfer-hook-program", hook.as_str(), "stats",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.transfer_hook_program_id.as_deref(), Some(hook.as_str()));
    }

    #[test]
    fn home_is_expanded() {
        std::env::set_var("HOME", "/home/tester");
        assert_eq!(expand_home("~/id.json"), PathBuf::from("/home/tester/id.json"));
        assert_eq!(expand_home("/abs/id.json"), PathBuf::from("/abs/id.json"));
    }

    fn answering(answer: &'static str) -> ConfirmingSigner {
        ConfirmingSigner::with_answers(Keypair::new(), false, Box::new(std::io::Cursor::new(answer)))
    }

    #[test]
    fn auto_approved_signer_signs() {
        let signer = ConfirmingSigner::with_answers(Keypair::new(), true, Box::new(std::io::empty()));
        let sig = signer.try_sign_message(b"msg").unwrap();
        assert!(sig.verify(signer.keypair.pubkey().as_ref(), b"msg"));
        assert!(!signer.is_interactive());
    }

    #[test]
    fn declining_the_prompt_cancels() {
        for answer in ["n\n", "\n", "nope\n", ""] {
            let signer = answering(answer);
            assert!(signer.is_interactive());
            assert!(matches!(signer.try_sign_message(b"msg"), Err(SignerError::UserCancel(_))));
        }
    }

    #[test]
    fn accepting_the_prompt_signs() {
        for answer in ["y\n", "YES\n"] {
            let signer = answering(answer);
            let sig = signer.try_sign_message(b"msg").unwrap();
            assert!(sig.verify(signer.keypair.pubkey().as_ref(), b"msg"));
        }
    }

    #[test]
    fn declined_signature_reports_user_rejected() {
        let cli = Cli::parse_from(["hookswap", "--json", "swap", "--token", "SOL", "--amount", "1"]);
        let err = anyhow::Error::from(hookswap_sdk::Error::UserRejected("declined at prompt".into()));
        let out = failure_json(&cli.command, &err);
        assert_eq!(out["status"], "error");
        assert_eq!(out["command"], "swap");
        assert_eq!(out["kind"], "user_rejected");
        assert_eq!(out["message"], "Transaction was rejected");
    }

    #[test]
    fn non_sdk_failures_keep_their_text() {
        let cli = Cli::parse_from(["hookswap", "init-config", "--path", "/tmp/x.toml"]);
        let err = anyhow!("/tmp/x.toml already exists; pass --force to overwrite");
        let (kind, message) = describe_failure(&cli.command, &err);
        assert_eq!(kind, "unknown");
        assert!(message.contains("already exists"));
    }
}
