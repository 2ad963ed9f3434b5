//! Horizon-style REST gateway client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use super::dto::{AccountDto, OffersPageDto, OrderBookDto, RejectionDto, SubmitResultDto};
use crate::domain::{AccountId, AccountSnapshot, Asset, Offer, OfferId, OrderBookSnapshot};
use crate::error::{ConfigError, Error, Result};
use crate::port::{GatewayError, LedgerGateway, SignedEnvelope, TxOutcome};

/// REST implementation of [`LedgerGateway`].
///
/// Speaks the ledger's Horizon-style JSON API: account and offer resources,
/// an order-book query, and form-encoded envelope submission. Signing
/// happens upstream; this client only ships sealed envelopes.
pub struct HorizonGateway {
    http: reqwest::Client,
    base: Url,
}

impl HorizonGateway {
    /// Create a client for the given base URL.
    ///
    /// The per-request timeout is a transport-level bound; callers still
    /// wrap calls in their own deadline.
    ///
    /// # Errors
    ///
    /// Configuration errors for an unusable URL or HTTP client.
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base).map_err(|err| {
            Error::Config(ConfigError::InvalidValue {
                field: "gateway.horizon_url",
                reason: err.to_string(),
            })
        })?;
        // Url::join treats a missing trailing slash as a file component.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;
        Ok(Self { http, base })
    }

    /// Check that the endpoint answers at all.
    ///
    /// # Errors
    ///
    /// The folded transport or status failure.
    pub async fn ping(&self) -> std::result::Result<(), GatewayError> {
        let url = self.base.clone();
        let response = self.http.get(url).send().await.map_err(transport)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::Network(format!(
                "endpoint answered with status {}",
                response.status()
            )))
        }
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|err| GatewayError::Network(format!("bad endpoint {path}: {err}")))
    }

    async fn fetch_offers(&self, id: &AccountId) -> std::result::Result<Vec<Offer>, GatewayError> {
        let url = self.endpoint(&format!("accounts/{id}/offers"))?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        let page: OffersPageDto = decode(Some(id), response).await?;
        page.records
            .into_iter()
            .map(super::dto::OfferDto::into_offer)
            .collect()
    }
}

/// Map a transport-level failure into the transient class.
fn transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout { elapsed_ms: 0 }
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// Decode a response, folding error statuses into the gateway taxonomy.
///
/// A 404 is `NotFound` when the request was about an account, a plain
/// transport failure otherwise.
async fn decode<T: serde::de::DeserializeOwned>(
    account: Option<&AccountId>,
    response: reqwest::Response,
) -> std::result::Result<T, GatewayError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(match account {
            Some(account) => GatewayError::NotFound {
                account: account.clone(),
            },
            None => GatewayError::Network("endpoint not found".into()),
        });
    }
    if status.is_client_error() {
        let rejection: RejectionDto = response.json().await.unwrap_or(RejectionDto {
            result_code: None,
            detail: None,
        });
        return Err(GatewayError::Rejected {
            code: rejection.code(),
        });
    }
    if !status.is_success() {
        return Err(GatewayError::Network(format!(
            "endpoint answered with status {status}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| GatewayError::Network(format!("malformed response: {err}")))
}

#[async_trait]
impl LedgerGateway for HorizonGateway {
    async fn load_account(
        &self,
        id: &AccountId,
    ) -> std::result::Result<AccountSnapshot, GatewayError> {
        let url = self.endpoint(&format!("accounts/{id}"))?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        let account: AccountDto = decode(Some(id), response).await?;
        let offers = self.fetch_offers(id).await?;
        account.into_snapshot(offers)
    }

    async fn submit(
        &self,
        envelope: &SignedEnvelope,
    ) -> std::result::Result<TxOutcome, GatewayError> {
        let url = self.endpoint("transactions")?;
        let response = self
            .http
            .post(url)
            .form(&[("tx", envelope.encoded.as_str())])
            .send()
            .await
            .map_err(transport)?;
        let result: SubmitResultDto =
            decode(Some(&envelope.transaction.source), response).await?;
        Ok(TxOutcome {
            result_code: result.result_code,
            created_offers: result
                .created_offer_ids
                .into_iter()
                .map(OfferId::new)
                .collect(),
        })
    }

    async fn order_book(
        &self,
        base: &Asset,
        counter: &Asset,
    ) -> std::result::Result<OrderBookSnapshot, GatewayError> {
        let mut url = self.endpoint("order_book")?;
        {
            let mut query = url.query_pairs_mut();
            append_asset_params(&mut query, "base", base);
            append_asset_params(&mut query, "counter", counter);
        }
        let response = self.http.get(url).send().await.map_err(transport)?;
        let book: OrderBookDto = decode(None, response).await?;
        book.into_snapshot()
    }

    async fn offers_for(&self, id: &AccountId) -> std::result::Result<Vec<Offer>, GatewayError> {
        self.fetch_offers(id).await
    }

    fn gateway_name(&self) -> &'static str {
        "horizon"
    }
}

fn append_asset_params(
    query: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>,
    prefix: &str,
    asset: &Asset,
) {
    match asset {
        Asset::Native => {
            query.append_pair(&format!("{prefix}_asset_type"), "native");
        }
        Asset::Credit { code, issuer } => {
            let asset_type = if code.len() <= 4 {
                "credit_alphanum4"
            } else {
                "credit_alphanum12"
            };
            query.append_pair(&format!("{prefix}_asset_type"), asset_type);
            query.append_pair(&format!("{prefix}_asset_code"), code);
            query.append_pair(&format!("{prefix}_asset_issuer"), issuer.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let gateway = HorizonGateway::new("https://ledger.example.org/api", Duration::from_secs(5))
            .unwrap();
        let url = gateway.endpoint("accounts/GBUYER").unwrap();
        assert_eq!(url.as_str(), "https://ledger.example.org/api/accounts/GBUYER");
    }

    #[test]
    fn order_book_query_flattens_both_assets() {
        let gateway =
            HorizonGateway::new("https://ledger.example.org", Duration::from_secs(5)).unwrap();
        let mut url = gateway.endpoint("order_book").unwrap();
        {
            let mut query = url.query_pairs_mut();
            append_asset_params(&mut query, "base", &Asset::Native);
            append_asset_params(
                &mut query,
                "counter",
                &Asset::credit("USD", AccountId::new("GISSUER")),
            );
        }
        let query = url.query().unwrap();
        assert!(query.contains("base_asset_type=native"));
        assert!(query.contains("counter_asset_type=credit_alphanum4"));
        assert!(query.contains("counter_asset_code=USD"));
        assert!(query.contains("counter_asset_issuer=GISSUER"));
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let result = HorizonGateway::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
