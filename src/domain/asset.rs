//! Asset identification.
//!
//! A ledger asset is either the network's native asset or a credit asset
//! issued by a specific account. Equality is structural: two credit assets
//! are the same asset exactly when both the code and the issuer match.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::account::AccountId;

/// An asset on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The network's native asset.
    Native,
    /// A credit asset issued by an account.
    Credit {
        /// Asset code, e.g. "USD".
        code: String,
        /// The issuing account.
        issuer: AccountId,
    },
}

impl Asset {
    /// Create a credit asset from a code and issuing account.
    pub fn credit(code: impl Into<String>, issuer: AccountId) -> Self {
        Self::Credit {
            code: code.into(),
            issuer,
        }
    }

    /// Whether this is the native asset.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// The asset code, or the conventional native code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Native => "XLM",
            Self::Credit { code, .. } => code,
        }
    }

    /// The issuing account, if this is a credit asset.
    #[must_use]
    pub const fn issuer(&self) -> Option<&AccountId> {
        match self {
            Self::Native => None,
            Self::Credit { issuer, .. } => Some(issuer),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Credit { code, issuer } => write!(f, "{code}:{issuer}"),
        }
    }
}
