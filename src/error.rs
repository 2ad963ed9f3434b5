use thiserror::Error;

use crate::domain::{AccountId, DomainError};
use crate::port::GatewayError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures surfaced by the bootstrap components.
///
/// `Precondition` is caller misuse and is raised before any network call.
/// `Rejected` is a deterministic ledger rejection: fatal for the account's
/// remaining phases, never retried verbatim. `Network` is the transient
/// transport class, including timeouts. `Partial` is a batch that completed
/// some items before failing; no compensation is attempted.
#[derive(Error, Debug, Clone)]
pub enum BootstrapError {
    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("{account}: rejected by the ledger: {code}")]
    Rejected { account: AccountId, code: String },

    #[error("{account}: network failure: {reason}")]
    Network { account: AccountId, reason: String },

    #[error("{account}: cleared {cleared} offers, then cancellation {failed_at} failed")]
    Partial {
        account: AccountId,
        cleared: usize,
        failed_at: usize,
        #[source]
        source: Box<BootstrapError>,
    },
}

impl BootstrapError {
    /// Fold a gateway failure into the bootstrap taxonomy for one account.
    ///
    /// `NotFound` folds into the deterministic class: an account missing
    /// from the ledger will stay missing on an identical retry.
    #[must_use]
    pub fn from_gateway(account: &AccountId, err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { code } => Self::Rejected {
                account: account.clone(),
                code,
            },
            GatewayError::NotFound { account } => Self::Rejected {
                account,
                code: "account_not_found".into(),
            },
            GatewayError::Network(reason) => Self::Network {
                account: account.clone(),
                reason,
            },
            GatewayError::Timeout { elapsed_ms } => Self::Network {
                account: account.clone(),
                reason: format!("timed out after {elapsed_ms}ms"),
            },
        }
    }

    /// The account this failure belongs to, when it names one.
    #[must_use]
    pub const fn account(&self) -> Option<&AccountId> {
        match self {
            Self::Precondition(_) => None,
            Self::Rejected { account, .. }
            | Self::Network { account, .. }
            | Self::Partial { account, .. } => Some(account),
        }
    }
}

impl From<DomainError> for BootstrapError {
    fn from(err: DomainError) -> Self {
        Self::Precondition(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_timeout_folds_into_the_transient_class() {
        let account = AccountId::new("GBUYER");
        let err =
            BootstrapError::from_gateway(&account, GatewayError::Timeout { elapsed_ms: 5000 });
        assert!(matches!(err, BootstrapError::Network { .. }));
    }

    #[test]
    fn gateway_rejection_folds_into_the_deterministic_class() {
        let account = AccountId::new("GBUYER");
        let err = BootstrapError::from_gateway(
            &account,
            GatewayError::Rejected {
                code: "tx_bad_seq".into(),
            },
        );
        assert!(matches!(err, BootstrapError::Rejected { .. }));
    }

    #[test]
    fn domain_errors_are_preconditions() {
        let err: BootstrapError = DomainError::TrustOfNativeAsset.into();
        assert!(matches!(err, BootstrapError::Precondition(_)));
    }
}
