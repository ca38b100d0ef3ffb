use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::RootProvider;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

use lending_desk::config::{self, env_string, DeskConfig};
use lending_desk::core::account_analysis::analyze_account;
use lending_desk::core::collateral::enable_as_collateral;
use lending_desk::core::supply_workflow::SupplyWorkflow;
use lending_desk::core::token_balances::collect_token_balances;
use lending_desk::execution::aave_client::HttpProvider;
use lending_desk::execution::alchemy_client::AlchemyClient;
use lending_desk::execution::history_client::HistoryClient;
use lending_desk::execution::ledger::{ChainLedger, ChainReader, Ledger};
use lending_desk::execution::tx_submitter::TxSubmitter;
use lending_desk::logging;

const USAGE: &str = "usage: lending-desk <command>

commands:
  analyze <user>              health report for an Aave account
  supply <amount> [token]     supply collateral (wrapped native when no token)
  enable-collateral <token>   flag a supplied reserve as collateral
  balances <wallet>           native + configured token balances over RPC
  portfolio <wallet>          every token held, via Alchemy
  history <wallet> [page]     transaction history, via Unmarshal";

enum Command {
    Analyze { user: Address },
    Supply { amount: String, token: Option<Address> },
    EnableCollateral { token: Address },
    Balances { wallet: Address },
    Portfolio { wallet: Address },
    History { wallet: Address, page: u32 },
}

fn parse_address(arg: Option<&String>, what: &str) -> Result<Address> {
    let raw = arg.with_context(|| format!("missing <{what}>\n\n{USAGE}"))?;
    raw.parse()
        .with_context(|| format!("invalid {what} address: {raw}"))
}

fn parse_command(args: &[String]) -> Result<Command> {
    let Some(name) = args.first() else {
        bail!("{USAGE}");
    };
    let rest = &args[1..];

    let command = match name.as_str() {
        "analyze" => Command::Analyze {
            user: parse_address(rest.first(), "user")?,
        },
        "supply" => Command::Supply {
            amount: rest
                .first()
                .with_context(|| format!("missing <amount>\n\n{USAGE}"))?
                .clone(),
            token: rest
                .get(1)
                .map(|t| {
                    t.parse::<Address>()
                        .with_context(|| format!("invalid token address: {t}"))
                })
                .transpose()?,
        },
        "enable-collateral" => Command::EnableCollateral {
            token: parse_address(rest.first(), "token")?,
        },
        "balances" => Command::Balances {
            wallet: parse_address(rest.first(), "wallet")?,
        },
        "portfolio" => Command::Portfolio {
            wallet: parse_address(rest.first(), "wallet")?,
        },
        "history" => Command::History {
            wallet: parse_address(rest.first(), "wallet")?,
            page: rest
                .get(1)
                .map(|p| p.parse().with_context(|| format!("invalid page: {p}")))
                .transpose()?
                .unwrap_or(1),
        },
        other => bail!("unknown command: {other}\n\n{USAGE}"),
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    // Config directory defaults to `./config`.
    let config_dir = std::env::var("DESK_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let config = config::load_config(&config_dir)?;

    // Initialize tracing; hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        chain_id = config.chain.chain_id,
        chain_name = %config.chain.chain_name,
        "lending desk starting"
    );

    match command {
        Command::Analyze { user } => {
            let reader = ChainReader::new(connect(&config)?);
            let analysis = analyze_account(&reader, config.chain.pool_address()?, user).await?;
            print_json(&analysis)?;
        }
        Command::Supply { amount, token } => {
            let ledger = signing_ledger(&config)?;
            let workflow = SupplyWorkflow::new(ledger, config.chain.wrapped_native_address()?);
            let outcome = workflow
                .supply_collateral(
                    token,
                    &amount,
                    config.chain.pool_address()?,
                    config.chain.data_provider_address()?,
                )
                .await;
            print_json(&outcome)?;
            if !outcome.success {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::EnableCollateral { token } => {
            let data_provider = config
                .chain
                .data_provider_address()?
                .context("enable-collateral needs AAVE_V3_UI_POOL_DATA_PROVIDER")?;
            let ledger = signing_ledger(&config)?;
            let toggle = enable_as_collateral(
                ledger.as_ref(),
                config.chain.pool_address()?,
                data_provider,
                token,
            )
            .await?;
            print_json(&toggle)?;
        }
        Command::Balances { wallet } => {
            let reader = ChainReader::new(connect(&config)?);
            let balances = collect_token_balances(
                &reader,
                wallet,
                &config.chain.native_symbol,
                &config.chain.tokens,
            )
            .await?;
            print_json(&balances)?;
        }
        Command::Portfolio { wallet } => {
            let api_key = require_secret("ALCHEMY_API_KEY")?;
            let client = AlchemyClient::new(&config.indexers, &api_key)?;
            print_json(&client.token_portfolio(wallet).await?)?;
        }
        Command::History { wallet, page } => {
            let api_key = require_secret("UNMARSHAL_API_KEY")?;
            let client = HistoryClient::new(&config.indexers, api_key)?;
            print_json(&client.transactions(wallet, page).await?)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Initialization helpers
// ---------------------------------------------------------------------------

fn connect(config: &DeskConfig) -> Result<HttpProvider> {
    let rpc_url: Url = config
        .chain
        .rpc
        .http_url
        .parse()
        .context("failed to parse RPC URL")?;
    Ok(RootProvider::new_http(rpc_url))
}

fn require_secret(key: &str) -> Result<String> {
    env_string(key).with_context(|| format!("{key} is not set"))
}

/// Ledger signing with the key in `PRIVATE_KEY`.
fn signing_ledger(config: &DeskConfig) -> Result<Arc<dyn Ledger>> {
    let key = require_secret("PRIVATE_KEY")?;
    let signer = key
        .strip_prefix("0x")
        .unwrap_or(&key)
        .parse::<PrivateKeySigner>()
        .context("failed to parse PRIVATE_KEY")?;

    let provider = connect(config)?;
    let submitter = TxSubmitter::new(
        provider.clone(),
        signer,
        &config.transaction,
        config.chain.chain_id,
    );
    info!(depositor = %submitter.signer_address(), "signer initialized");

    Ok(Arc::new(ChainLedger::new(
        ChainReader::new(provider),
        submitter,
        &config.transaction,
    )))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
