use std::time::Duration;

use tracing::debug;
use veranda_types::ProviderReading;

/// Default per-provider lookup timeout.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// One IP-geolocation endpoint: a plain GET returning a JSON document.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    /// Key under which this provider's reading (or failure) is recorded.
    pub name: String,
    pub url: String,
    pub timeout: Duration,
    /// Disables TLS certificate verification for this provider's endpoint
    /// only. Off for both built-ins; enable only for a provider whose
    /// certificate chain is known to be broken.
    pub accept_invalid_certs: bool,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The two lookup services the client ships with.
    pub fn builtin() -> Vec<ProviderSpec> {
        vec![
            ProviderSpec::new("ipapi.co", "https://ipapi.co/json/"),
            ProviderSpec::new("ip-api.com", "http://ip-api.com/json/"),
        ]
    }
}

/// Query a single provider.
///
/// Every failure mode (client construction, transport, timeout, non-2xx
/// status, empty body, unparseable JSON) comes back as a
/// `ProviderReading::Failed`; this function never errors and never panics.
pub async fn lookup(spec: &ProviderSpec) -> ProviderReading {
    let client = match reqwest::Client::builder()
        .timeout(spec.timeout)
        .danger_accept_invalid_certs(spec.accept_invalid_certs)
        .build()
    {
        Ok(client) => client,
        Err(e) => return ProviderReading::failed(None, format!("client setup: {e}")),
    };

    let resp = match client.get(&spec.url).send().await {
        Ok(resp) => resp,
        Err(e) if e.is_timeout() => return ProviderReading::failed(None, "timeout"),
        Err(e) => return ProviderReading::failed(None, e.to_string()),
    };

    let status = resp.status();
    let body = match resp.text().await {
        Ok(body) => body,
        Err(e) => return ProviderReading::failed(Some(status.as_u16()), e.to_string()),
    };

    if !status.is_success() {
        return ProviderReading::failed(
            Some(status.as_u16()),
            format!("unexpected status: {}", truncate(&body)),
        );
    }
    if body.trim().is_empty() {
        return ProviderReading::failed(Some(status.as_u16()), "empty response body");
    }

    match serde_json::from_str(&body) {
        Ok(value) => {
            debug!(provider = %spec.name, "IP lookup ok");
            ProviderReading::Payload(value)
        }
        Err(e) => ProviderReading::failed(Some(status.as_u16()), format!("invalid JSON: {e}")),
    }
}

/// First 200 chars of a response body, for error messages.
fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_providers_never_relax_tls() {
        for spec in ProviderSpec::builtin() {
            assert!(!spec.accept_invalid_certs, "{} relaxes TLS", spec.name);
        }
    }

    #[test]
    fn builtin_provider_names_are_distinct() {
        let specs = ProviderSpec::builtin();
        assert_eq!(specs.len(), 2);
        assert_ne!(specs[0].name, specs[1].name);
    }
}
