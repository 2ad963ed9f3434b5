//! Configuration loading from TOML files.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::{BootstrapPlan, FailurePolicy, OfferPlan, RetryPolicy};
use crate::domain::{AccountId, Amount, Price};
use crate::error::{ConfigError, Error, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub accounts: AccountsConfig,
    pub asset: AssetConfig,
    pub offers: OffersConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which [`LedgerGateway`](crate::port::LedgerGateway) implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// In-process simulated ledger; fully self-contained.
    Memory,
    /// Horizon-style REST endpoint.
    Horizon,
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_mode")]
    pub mode: GatewayMode,
    #[serde(default)]
    pub horizon_url: Option<String>,
    /// Deadline for each individual ledger call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct AccountsConfig {
    pub issuer: String,
    pub buyer: String,
    pub seller: String,
}

#[derive(Debug, Deserialize)]
pub struct AssetConfig {
    /// Code of the issued asset, e.g. "USD".
    pub code: String,
    #[serde(default = "default_trust_limit")]
    pub trust_limit: Amount,
    /// Paid from the issuer to each of buyer and seller.
    pub funding_amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct OfferConfig {
    /// Counter units per base unit.
    pub price: Price,
    /// Base units.
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct OffersConfig {
    pub buy: OfferConfig,
    pub sell: OfferConfig,
    /// Price increment used for jitter.
    #[serde(default = "default_tick")]
    pub tick: Price,
    /// Maximum number of ticks of jitter; buy jitters up, sell jitters
    /// down, so the two quotes never collapse onto each other across runs.
    #[serde(default = "default_jitter_ticks")]
    pub jitter_ticks: u32,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub policy: FailurePolicy,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::default(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

fn default_mode() -> GatewayMode {
    GatewayMode::Memory
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_trust_limit() -> Amount {
    Decimal::from(1_000_000)
}

fn default_tick() -> Price {
    Decimal::new(1, 4) // 0.0001
}

fn default_jitter_ticks() -> u32 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let accounts = [
            &self.accounts.issuer,
            &self.accounts.buyer,
            &self.accounts.seller,
        ];
        if accounts.iter().any(|id| id.is_empty()) {
            return Err(invalid("accounts", "account ids cannot be empty"));
        }
        if accounts[0] == accounts[1] || accounts[0] == accounts[2] || accounts[1] == accounts[2] {
            return Err(invalid("accounts", "issuer, buyer, and seller must differ"));
        }
        if self.asset.code.is_empty() || self.asset.code.len() > 12 {
            return Err(invalid("asset.code", "must be 1-12 characters"));
        }
        if self.asset.funding_amount <= Decimal::ZERO {
            return Err(invalid("asset.funding_amount", "must be positive"));
        }
        if self.asset.trust_limit <= Decimal::ZERO {
            return Err(invalid("asset.trust_limit", "must be positive"));
        }
        for (field, offer) in [
            ("offers.buy", &self.offers.buy),
            ("offers.sell", &self.offers.sell),
        ] {
            if offer.price <= Decimal::ZERO || offer.amount <= Decimal::ZERO {
                return Err(invalid(field, "price and amount must be positive"));
            }
        }
        let max_jitter = self.offers.tick * Decimal::from(self.offers.jitter_ticks);
        if self.offers.sell.price <= max_jitter {
            return Err(invalid(
                "offers.jitter_ticks",
                "downward jitter would push the sell price to zero",
            ));
        }
        if self.gateway.mode == GatewayMode::Horizon && self.gateway.horizon_url.is_none() {
            return Err(Error::Config(ConfigError::MissingField {
                field: "gateway.horizon_url",
            }));
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }

    /// The deadline applied to each individual gateway call.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_millis(self.gateway.timeout_ms)
    }

    /// Build the bootstrap plan, optionally applying tick jitter to the two
    /// offer prices.
    #[must_use]
    pub fn plan(&self, with_jitter: bool) -> BootstrapPlan {
        let (buy_price, sell_price) = if with_jitter {
            (
                jittered(self.offers.buy.price, self.offers.tick, self.offers.jitter_ticks, true),
                jittered(
                    self.offers.sell.price,
                    self.offers.tick,
                    self.offers.jitter_ticks,
                    false,
                ),
            )
        } else {
            (self.offers.buy.price, self.offers.sell.price)
        };

        BootstrapPlan {
            issuer: AccountId::new(self.accounts.issuer.clone()),
            buyer: AccountId::new(self.accounts.buyer.clone()),
            seller: AccountId::new(self.accounts.seller.clone()),
            asset_code: self.asset.code.clone(),
            trust_limit: self.asset.trust_limit,
            funding_amount: self.asset.funding_amount,
            buy: OfferPlan {
                price: buy_price,
                amount: self.offers.buy.amount,
            },
            sell: OfferPlan {
                price: sell_price,
                amount: self.offers.sell.amount,
            },
            policy: self.bootstrap.policy,
            deadline: self.deadline(),
            retry: RetryPolicy {
                attempts: self.bootstrap.retry_attempts,
                ..RetryPolicy::default()
            },
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> Error {
    Error::Config(ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    })
}

/// Nudge a price by a whole number of ticks, staying in `Decimal` the whole
/// way so no float ever reaches the plan.
fn jittered(base: Price, tick: Price, max_ticks: u32, upward: bool) -> Price {
    if max_ticks == 0 {
        return base;
    }
    let ticks = rand::thread_rng().gen_range(0..=max_ticks);
    let nudge = tick * Decimal::from(ticks);
    if upward {
        base + nudge
    } else {
        base - nudge
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const SAMPLE: &str = r#"
        [gateway]
        mode = "memory"

        [accounts]
        issuer = "GISSUER"
        buyer = "GBUYER"
        seller = "GSELLER"

        [asset]
        code = "USD"
        funding_amount = "25"

        [offers.buy]
        price = "0.0023"
        amount = "5000"

        [offers.sell]
        price = "0.0025"
        amount = "4000"
    "#;

    fn parse(toml_text: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn sample_config_parses_with_defaults() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.gateway.mode, GatewayMode::Memory);
        assert_eq!(config.gateway.timeout_ms, 10_000);
        assert_eq!(config.asset.trust_limit, dec!(1000000));
        assert_eq!(config.offers.tick, dec!(0.0001));
        assert_eq!(config.bootstrap.policy, FailurePolicy::AbortOnFailure);
    }

    #[test]
    fn duplicate_accounts_are_rejected() {
        let text = SAMPLE.replace("GBUYER", "GISSUER");
        assert!(parse(&text).is_err());
    }

    #[test]
    fn horizon_mode_requires_a_url() {
        let text = SAMPLE.replace("mode = \"memory\"", "mode = \"horizon\"");
        assert!(parse(&text).is_err());
    }

    #[test]
    fn jitter_stays_inside_the_documented_ranges() {
        let config = parse(SAMPLE).unwrap();
        for _ in 0..50 {
            let plan = config.plan(true);
            assert!(plan.buy.price >= dec!(0.0023) && plan.buy.price <= dec!(0.0033));
            assert!(plan.sell.price >= dec!(0.0015) && plan.sell.price <= dec!(0.0025));
        }
    }

    #[test]
    fn plan_without_jitter_uses_configured_prices() {
        let config = parse(SAMPLE).unwrap();
        let plan = config.plan(false);
        assert_eq!(plan.buy.price, dec!(0.0023));
        assert_eq!(plan.sell.price, dec!(0.0025));
    }

    #[test]
    fn excessive_jitter_is_rejected() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.offers.jitter_ticks = 100;
        assert!(config.validate().is_err());
    }
}
