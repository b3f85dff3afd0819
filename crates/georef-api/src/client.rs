// Reference-data HTTP client
//
// Wraps `reqwest::Client` with URL construction for the three listing
// endpoints and body decoding. Every method returns the flat ordered
// listing exactly as the service sent it.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::RawNode;
use crate::transport::TransportConfig;

/// Raw HTTP client for the reference-data service.
///
/// Endpoints are resolved relative to `base_url`, so a service mounted
/// under a path prefix (`https://ref.example.com/geo/v1`) works unchanged.
#[derive(Debug, Clone)]
pub struct ReferenceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ReferenceClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET {base}/countries`
    pub async fn fetch_countries(&self) -> Result<Vec<RawNode>, Error> {
        let url = self.endpoint(&["countries"])?;
        self.get(url).await
    }

    /// `GET {base}/countries/{country}/states`
    pub async fn fetch_states(&self, country: &str) -> Result<Vec<RawNode>, Error> {
        let url = self.endpoint(&["countries", country, "states"])?;
        self.get(url).await
    }

    /// `GET {base}/countries/{country}/states/{state}/cities`
    pub async fn fetch_cities(&self, country: &str, state: &str) -> Result<Vec<RawNode>, Error> {
        let url = self.endpoint(&["countries", country, "states", state, "cities"])?;
        self.get(url).await
    }

    // ── Transport mechanics ──────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!(url = %url, "GET");
        let resp = self.http.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        trace!(bytes = body.len(), "response body received");
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ReferenceClient {
        ReferenceClient::with_client(reqwest::Client::new(), Url::parse(base).expect("valid url"))
    }

    #[test]
    fn endpoint_appends_to_prefix() {
        let c = client("https://ref.example.com/geo/v1/");
        let url = c.endpoint(&["countries", "IN", "states"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://ref.example.com/geo/v1/countries/IN/states");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let c = client("https://ref.example.com");
        let url = c
            .endpoint(&["countries", "US", "states", "NY/NJ", "cities"])
            .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "https://ref.example.com/countries/US/states/NY%2FNJ/cities"
        );
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        let c = client("mailto:geo@example.com");
        assert!(matches!(c.endpoint(&["countries"]), Err(Error::BaseUrl(_))));
    }
}
