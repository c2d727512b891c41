//! reqwest-backed DNS-over-HTTPS lookup.

use super::wire::{find_answer, DohResponse};
use super::{Looking, LookupTarget};
use crate::base::{Afi, FormError};
use crate::config::ResolverConfig;
use reqwest::header::ACCEPT;
use url::Url;

/// Looks up targets against a configured dns-json endpoint.
///
/// Issues `GET {endpoint}?name={target}&type={A|AAAA}` with
/// `accept: application/dns-json`. One request per lookup, no retries;
/// the caller bounds each lookup with its own timeout and treats any
/// failure as "no answer".
#[derive(Debug, Clone)]
pub struct DohResolver {
    client: reqwest::Client,
    endpoint: Url,
}

impl DohResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
        }
    }

    async fn query(&self, name: &str, family: Afi) -> Result<Option<String>, FormError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", family.record_type());

        tracing::debug!(name = %name, family = %family, "issuing DoH lookup");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/dns-json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| FormError::lookup_transport(name, err))?;

        let body: DohResponse = response
            .json()
            .await
            .map_err(|err| FormError::lookup_decode(name, err))?;

        let answer = find_answer(&body).map(str::to_owned);
        tracing::debug!(
            name = %name,
            family = %family,
            answered = answer.is_some(),
            "DoH lookup complete"
        );
        Ok(answer)
    }
}

impl LookupTarget for DohResolver {
    fn lookup(&self, name: &str, family: Afi) -> Looking {
        let resolver = self.clone();
        let name = name.to_owned();
        Box::pin(async move { resolver.query(&name, family).await })
    }
}
