//! HTTP rate endpoint.

use async_trait::async_trait;
use fxnorm_common::Currency;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::snapshot::RateSnapshot;

/// Placeholder substituted with the base currency code.
pub const BASE_PLACEHOLDER: &str = "{base}";

/// Body shape shared by the supported endpoints. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, serde_json::Value>,
}

/// One remote endpoint, addressed by a URL template such as
/// `https://open.er-api.com/v6/latest/{base}`.
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    template: String,
    client: reqwest::Client,
}

impl HttpRateProvider {
    /// Create a provider with its own client and per-request timeout.
    pub fn new(template: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FxError::InvalidConfig(format!("HTTP client: {}", e)))?;
        Self::with_client(template, client)
    }

    /// Create a provider sharing an existing client.
    pub fn with_client(template: impl Into<String>, client: reqwest::Client) -> FxResult<Self> {
        let template = template.into();
        if !template.contains(BASE_PLACEHOLDER) {
            return Err(FxError::InvalidConfig(format!(
                "Endpoint template '{}' has no {} placeholder",
                template, BASE_PLACEHOLDER
            )));
        }
        Ok(Self { template, client })
    }

    /// The request URL for `base`.
    pub fn url_for(&self, base: &Currency) -> String {
        self.template.replace(BASE_PLACEHOLDER, base.code())
    }

    fn failure(&self, reason: impl Into<String>) -> FxError {
        FxError::Endpoint {
            endpoint: self.template.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        &self.template
    }

    async fn fetch_rate_table(&self, base: &Currency) -> FxResult<RateSnapshot> {
        let url = self.url_for(base);
        debug!(url = %url, "GET rate table");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.failure("request timed out")
                } else {
                    self.failure(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("HTTP {}", status)));
        }

        let body: RatesResponse = response
            .json()
            .await
            .map_err(|e| self.failure(format!("malformed body: {}", e)))?;

        let snapshot = RateSnapshot::from_raw(base.clone(), body.rates, self.template.clone());
        if !snapshot.has_foreign_rates() {
            return Err(self.failure("response contained no usable rates"));
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_substitution() {
        let provider = HttpRateProvider::new(
            "https://api.exchangerate.host/latest?base={base}",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            provider.url_for(&Currency::new("eur")),
            "https://api.exchangerate.host/latest?base=EUR"
        );
        assert_eq!(provider.name(), "https://api.exchangerate.host/latest?base={base}");
    }

    #[test]
    fn test_template_requires_placeholder() {
        let result = HttpRateProvider::new("https://example.test/latest", Duration::from_secs(5));
        assert!(matches!(result, Err(FxError::InvalidConfig(_))));
    }

    #[test]
    fn test_response_shape() {
        let body = r#"{"result":"success","base_code":"USD","rates":{"USD":1,"EUR":0.92}}"#;
        let parsed: RatesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.rates.len(), 2);

        assert!(serde_json::from_str::<RatesResponse>(r#"{"success":false}"#).is_err());
    }
}
