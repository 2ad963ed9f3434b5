//! Wire types for the Horizon-style REST gateway.
//!
//! Kept separate from the domain: DTOs mirror the JSON the endpoint speaks
//! (string-encoded decimals, flattened asset fields) and convert into domain
//! types in one place.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{
    AccountId, AccountSnapshot, Amount, Asset, Balance, BookLevel, Offer, OfferId,
    OrderBookSnapshot, PriceRatio,
};
use crate::port::GatewayError;

fn malformed(what: &str, detail: impl std::fmt::Display) -> GatewayError {
    GatewayError::Network(format!("malformed {what} in response: {detail}"))
}

fn parse_amount(raw: &str, what: &str) -> Result<Amount, GatewayError> {
    raw.parse::<Decimal>().map_err(|err| malformed(what, err))
}

/// Flattened asset fields as they appear throughout the API.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetDto {
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
}

impl AssetDto {
    pub fn into_asset(self) -> Result<Asset, GatewayError> {
        if self.asset_type == "native" {
            return Ok(Asset::Native);
        }
        match (self.asset_code, self.asset_issuer) {
            (Some(code), Some(issuer)) => Ok(Asset::credit(code, AccountId::new(issuer))),
            _ => Err(malformed("asset", "credit asset missing code or issuer")),
        }
    }
}

/// One balance entry on an account resource.
#[derive(Debug, Deserialize)]
pub struct BalanceDto {
    #[serde(flatten)]
    pub asset: AssetDto,
    pub balance: String,
    #[serde(default)]
    pub limit: Option<String>,
}

impl BalanceDto {
    pub fn into_balance(self) -> Result<Balance, GatewayError> {
        let limit = self
            .limit
            .map(|raw| parse_amount(&raw, "balance limit"))
            .transpose()?;
        Ok(Balance {
            asset: self.asset.into_asset()?,
            amount: parse_amount(&self.balance, "balance")?,
            limit,
        })
    }
}

/// The account resource.
#[derive(Debug, Deserialize)]
pub struct AccountDto {
    pub id: String,
    /// String-encoded to survive JSON number precision limits.
    pub sequence: String,
    pub balances: Vec<BalanceDto>,
}

impl AccountDto {
    pub fn into_snapshot(self, offers: Vec<Offer>) -> Result<AccountSnapshot, GatewayError> {
        let sequence = self
            .sequence
            .parse::<i64>()
            .map_err(|err| malformed("sequence", err))?;
        let balances = self
            .balances
            .into_iter()
            .map(BalanceDto::into_balance)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AccountSnapshot {
            id: AccountId::new(self.id),
            sequence,
            balances,
            offers,
        })
    }
}

/// Exact rational price on the wire.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PriceRatioDto {
    pub n: u64,
    pub d: u64,
}

impl PriceRatioDto {
    pub fn into_ratio(self) -> Result<PriceRatio, GatewayError> {
        PriceRatio::from_parts(self.n, self.d).map_err(|err| malformed("price ratio", err))
    }
}

/// An offer resource.
#[derive(Debug, Deserialize)]
pub struct OfferDto {
    pub id: u64,
    pub seller: String,
    pub selling: AssetDto,
    pub buying: AssetDto,
    pub price_r: PriceRatioDto,
    pub amount: String,
}

impl OfferDto {
    pub fn into_offer(self) -> Result<Offer, GatewayError> {
        Ok(Offer {
            owner: AccountId::new(self.seller),
            id: OfferId::new(self.id),
            selling: self.selling.into_asset()?,
            buying: self.buying.into_asset()?,
            price: self.price_r.into_ratio()?,
            amount: parse_amount(&self.amount, "offer amount")?,
        })
    }
}

/// Paged offers listing.
#[derive(Debug, Deserialize)]
pub struct OffersPageDto {
    pub records: Vec<OfferDto>,
}

/// One book level as the order-book endpoint reports it.
#[derive(Debug, Deserialize)]
pub struct BookLevelDto {
    pub seller: String,
    pub offer_id: u64,
    pub price: String,
    pub amount: String,
}

impl BookLevelDto {
    pub fn into_level(self) -> Result<BookLevel, GatewayError> {
        Ok(BookLevel {
            owner: AccountId::new(self.seller),
            offer_id: OfferId::new(self.offer_id),
            price: parse_amount(&self.price, "book price")?,
            amount: parse_amount(&self.amount, "book amount")?,
        })
    }
}

/// The order-book endpoint's response.
#[derive(Debug, Deserialize)]
pub struct OrderBookDto {
    pub bids: Vec<BookLevelDto>,
    pub asks: Vec<BookLevelDto>,
}

impl OrderBookDto {
    pub fn into_snapshot(self) -> Result<OrderBookSnapshot, GatewayError> {
        let bids = self
            .bids
            .into_iter()
            .map(BookLevelDto::into_level)
            .collect::<Result<Vec<_>, _>>()?;
        let asks = self
            .asks
            .into_iter()
            .map(BookLevelDto::into_level)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OrderBookSnapshot::new(bids, asks))
    }
}

/// A successful submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResultDto {
    pub result_code: String,
    #[serde(default)]
    pub created_offer_ids: Vec<u64>,
}

/// A structured rejection body.
#[derive(Debug, Deserialize)]
pub struct RejectionDto {
    #[serde(default)]
    pub result_code: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl RejectionDto {
    pub fn code(self) -> String {
        self.result_code
            .or(self.detail)
            .unwrap_or_else(|| "tx_failed".into())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn account_dto_converts_with_string_sequence() {
        let dto: AccountDto = serde_json::from_str(
            r#"{
                "id": "GBUYER",
                "sequence": "1234567890123456789",
                "balances": [
                    {"asset_type": "native", "balance": "100.5"},
                    {
                        "asset_type": "credit_alphanum4",
                        "asset_code": "USD",
                        "asset_issuer": "GISSUER",
                        "balance": "25",
                        "limit": "1000"
                    }
                ]
            }"#,
        )
        .unwrap();

        let snapshot = dto.into_snapshot(vec![]).unwrap();
        assert_eq!(snapshot.sequence, 1_234_567_890_123_456_789);
        assert_eq!(snapshot.balances.len(), 2);
        assert_eq!(snapshot.balances[0].asset, Asset::Native);
        assert_eq!(snapshot.balances[1].amount, dec!(25));
        assert_eq!(snapshot.balances[1].limit, Some(dec!(1000)));
    }

    #[test]
    fn offer_dto_converts_exact_ratio() {
        let dto: OfferDto = serde_json::from_str(
            r#"{
                "id": 42,
                "seller": "GSELLER",
                "selling": {"asset_type": "native"},
                "buying": {
                    "asset_type": "credit_alphanum4",
                    "asset_code": "USD",
                    "asset_issuer": "GISSUER"
                },
                "price_r": {"n": 23, "d": 10000},
                "amount": "4000"
            }"#,
        )
        .unwrap();

        let offer = dto.into_offer().unwrap();
        assert_eq!(offer.id, OfferId::new(42));
        assert_eq!(offer.price.to_price(), dec!(0.0023));
        assert_eq!(offer.amount, dec!(4000));
    }

    #[test]
    fn credit_asset_without_issuer_is_malformed() {
        let dto = AssetDto {
            asset_type: "credit_alphanum4".into(),
            asset_code: Some("USD".into()),
            asset_issuer: None,
        };
        assert!(matches!(dto.into_asset(), Err(GatewayError::Network(_))));
    }

    #[test]
    fn rejection_prefers_the_result_code() {
        let dto = RejectionDto {
            result_code: Some("tx_bad_seq".into()),
            detail: Some("sequence mismatch".into()),
        };
        assert_eq!(dto.code(), "tx_bad_seq");

        let bare = RejectionDto {
            result_code: None,
            detail: None,
        };
        assert_eq!(bare.code(), "tx_failed");
    }
}
