//! Handlers for the `check` subcommands.

use std::time::Instant;

use owo_colors::OwoColorize;

use crate::adapter::horizon::HorizonGateway;
use crate::cli::Cli;
use crate::config::{Config, GatewayMode};
use crate::error::Result;

/// Validate the configuration file and print a summary.
pub fn config(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    println!("{} {}", "ok".green().bold(), cli.config.display());
    println!("  gateway:  {:?}", config.gateway.mode);
    println!(
        "  accounts: issuer={} buyer={} seller={}",
        config.accounts.issuer, config.accounts.buyer, config.accounts.seller
    );
    println!(
        "  asset:    {} (funding {}, trust limit {})",
        config.asset.code, config.asset.funding_amount, config.asset.trust_limit
    );
    println!(
        "  offers:   buy {} @ {}, sell {} @ {} (jitter {} x {})",
        config.offers.buy.amount,
        config.offers.buy.price,
        config.offers.sell.amount,
        config.offers.sell.price,
        config.offers.jitter_ticks,
        config.offers.tick,
    );
    println!("  policy:   {:?}", config.bootstrap.policy);
    Ok(())
}

/// Check that the configured gateway endpoint answers.
pub async fn connection(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    match config.gateway.mode {
        GatewayMode::Memory => {
            println!(
                "{} memory gateway is in-process; nothing to reach",
                "ok".green().bold()
            );
            Ok(())
        }
        GatewayMode::Horizon => {
            let Some(url) = config.gateway.horizon_url.as_deref() else {
                return Err(crate::error::ConfigError::MissingField {
                    field: "gateway.horizon_url",
                }
                .into());
            };
            let gateway = HorizonGateway::new(url, config.deadline())?;
            let started = Instant::now();
            match gateway.ping().await {
                Ok(()) => {
                    println!(
                        "{} {} answered in {:?}",
                        "ok".green().bold(),
                        url,
                        started.elapsed()
                    );
                    Ok(())
                }
                Err(err) => {
                    println!("{} {}: {err}", "failed".red().bold(), url);
                    Err(err.into())
                }
            }
        }
    }
}
