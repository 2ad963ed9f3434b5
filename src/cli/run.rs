//! Handler for the `run` command.

use std::sync::Arc;

use rust_decimal_macros::dec;
use tracing::info;

use crate::adapter::memory::{InMemoryLedger, PlainSealer};
use crate::app::Bootstrap;
use crate::cli::{output, Cli, RunArgs};
use crate::config::{Config, GatewayMode};
use crate::error::{ConfigError, Error, Result};
use crate::port::{LedgerGateway, TransactionSealer};

/// Execute the run command.
pub async fn execute(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    if let Some(policy) = args.policy {
        config.bootstrap.policy = policy.into();
    }

    config.init_logging();

    let plan = config.plan(!args.no_jitter);
    let (gateway, sealer) = build_gateway(&config)?;

    info!(
        gateway = gateway.gateway_name(),
        asset = %plan.counter_asset(),
        policy = ?plan.policy,
        "bookmaker starting"
    );

    let report = Bootstrap::new(gateway, sealer, plan).run().await?;
    output::print_report(&report);

    match (&report.buyer.error, &report.seller.error) {
        (None, None) => Ok(()),
        (Some(err), _) | (None, Some(err)) => Err(Error::Bootstrap(err.clone())),
    }
}

/// Build the gateway and sealer the configured mode calls for.
fn build_gateway(
    config: &Config,
) -> Result<(Arc<dyn LedgerGateway>, Arc<dyn TransactionSealer>)> {
    match config.gateway.mode {
        GatewayMode::Memory => {
            let ledger = InMemoryLedger::new();
            // Paper mode: every configured account exists with a native
            // balance large enough for the illustrative offers.
            for id in [
                &config.accounts.issuer,
                &config.accounts.buyer,
                &config.accounts.seller,
            ] {
                ledger.seed_account(id.as_str(), dec!(10000));
            }
            let gateway: Arc<dyn LedgerGateway> = Arc::new(ledger);
            let sealer: Arc<dyn TransactionSealer> = Arc::new(PlainSealer);
            Ok((gateway, sealer))
        }
        // Submission needs a transaction sealer, and signing lives outside
        // this binary; the horizon gateway is available to library callers
        // that inject one.
        GatewayMode::Horizon => Err(Error::Config(ConfigError::InvalidValue {
            field: "gateway.mode",
            reason: "horizon submission requires an external transaction sealer; \
                     use memory mode or drive the library with your own sealer"
                .into(),
        })),
    }
}
