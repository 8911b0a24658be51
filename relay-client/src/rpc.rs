//! # Inbound data client
//!
//! Read-only access to the protocol node endpoints the adapter depends on: the per chain
//! inbound routes and the mimir halt switches. Every call is a fresh fetch, nothing is cached
//! and nothing is retried here.
use std::{
    collections::HashMap,
    str::FromStr,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use relay_common::models::{
    route::{InboundRoute, MimirFlags},
    Chain, NetworkParams,
};
use reqwest::{header, Client, ClientBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::config::HttpClientOptions;

#[derive(Error, Debug)]
pub enum RPCError {
    /// The configured node url failed to parse.
    #[error("Failed to parse URL: {0}. Error: {1}")]
    UrlParsing(String, String),

    /// The request data is not correctly formed.
    #[error("Failed to format request: {0}")]
    FormatRequest(String),

    /// Errors forwarded from the HTTP protocol.
    #[error("Unexpected HTTP client error: {0}")]
    HttpClient(String, #[source] reqwest::Error),

    /// The response from the server could not be parsed correctly.
    #[error("Failed to parse response: {0}")]
    ParseResponse(String),

    /// Other fatal errors.
    #[error("Fatal error: {0}")]
    Fatal(String),

    #[error("Rate limited until {0:?}")]
    RateLimited(Option<SystemTime>),

    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InboundDataClient: Send + Sync {
    /// Retrieves the inbound routes of every chain the deployment supports.
    async fn get_inbound_routes(
        &self,
        params: &NetworkParams,
    ) -> Result<Vec<InboundRoute>, RPCError>;

    /// Retrieves the protocol wide halt switches.
    async fn get_mimir_flags(&self, params: &NetworkParams) -> Result<MimirFlags, RPCError>;
}

/// Wire format of an `inbound_addresses` entry.
///
/// Kept apart from [`InboundRoute`] so entries of chains this crate does not know about can
/// be skipped instead of failing the whole response.
#[derive(Debug, Deserialize)]
struct InboundAddressEntry {
    chain: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    router: Option<String>,
    #[serde(default)]
    gas_rate: String,
    #[serde(default)]
    halted: bool,
}

impl InboundAddressEntry {
    fn into_route(self) -> Option<InboundRoute> {
        let chain = Chain::from_str(&self.chain).ok()?;
        Some(InboundRoute {
            chain,
            address: self.address,
            router: self.router,
            gas_rate: self.gas_rate,
            halted: self.halted,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpInboundClient {
    http_client: Client,
    options: HttpClientOptions,
}

impl HttpInboundClient {
    pub fn new(options: HttpClientOptions) -> Result<Self, RPCError> {
        // Fail early on malformed overrides instead of on the first request
        for url in options.endpoints.values() {
            url.parse::<Url>()
                .map_err(|e| RPCError::UrlParsing(url.to_string(), e.to_string()))?;
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let user_agent = format!("relay-client-{version}", version = env!("CARGO_PKG_VERSION"));
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&user_agent)
                .map_err(|e| RPCError::FormatRequest(format!("Invalid user agent format: {e}")))?,
        );

        if let Some(key) = options.auth_key.as_deref() {
            let mut auth_value = header::HeaderValue::from_str(key).map_err(|e| {
                RPCError::FormatRequest(format!("Invalid client id format: {e}"))
            })?;
            auth_value.set_sensitive(true);
            headers.insert("x-client-id", auth_value);
        }

        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| RPCError::HttpClient(e.to_string(), e))?;
        Ok(Self { http_client: client, options })
    }

    fn uri(&self, params: &NetworkParams, endpoint: &str) -> Result<String, RPCError> {
        let base = self.options.endpoint(params);
        let url = base
            .parse::<Url>()
            .map_err(|e| RPCError::UrlParsing(base.to_string(), e.to_string()))?;
        Ok(format!(
            "{}/{}/{}",
            url.to_string()
                .trim_end_matches('/'),
            params.protocol.api_prefix(),
            endpoint
        ))
    }

    /// Converts an error response to a Result.
    ///
    /// 429 becomes `RateLimited` (honouring a retry-after header given in seconds), 502, 503
    /// and 504 become `ServerUnreachable`, any other non success status is fatal.
    async fn error_for_response(&self, response: Response) -> Result<Response, RPCError> {
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|h| h.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(|secs| SystemTime::now() + Duration::from_secs(secs));
                Err(RPCError::RateLimited(retry_after))
            }
            StatusCode::BAD_GATEWAY |
            StatusCode::SERVICE_UNAVAILABLE |
            StatusCode::GATEWAY_TIMEOUT => Err(RPCError::ServerUnreachable(
                response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Server Unreachable".to_string()),
            )),
            status if !status.is_success() => Err(RPCError::Fatal(format!(
                "Unexpected status {status}: {}",
                response
                    .text()
                    .await
                    .unwrap_or_default()
            ))),
            _ => Ok(response),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, uri: &str) -> Result<T, RPCError> {
        debug!(%uri, "Sending request to protocol node");
        let response = self
            .http_client
            .get(uri)
            .send()
            .await
            .map_err(|e| RPCError::HttpClient(e.to_string(), e))?;
        let response = self
            .error_for_response(response)
            .await?;
        trace!(?response, "Received response from protocol node");

        let body = response
            .text()
            .await
            .map_err(|e| RPCError::ParseResponse(e.to_string()))?;
        serde_json::from_str::<T>(&body)
            .map_err(|err| RPCError::ParseResponse(format!("Error: {err}, Body: {body}")))
    }
}

#[async_trait]
impl InboundDataClient for HttpInboundClient {
    #[instrument(skip(self))]
    async fn get_inbound_routes(
        &self,
        params: &NetworkParams,
    ) -> Result<Vec<InboundRoute>, RPCError> {
        let uri = self.uri(params, "inbound_addresses")?;
        let entries = self
            .get_json::<Vec<InboundAddressEntry>>(&uri)
            .await?;

        let routes = entries
            .into_iter()
            .filter_map(|entry| {
                let chain = entry.chain.clone();
                let route = entry.into_route();
                if route.is_none() {
                    trace!(%chain, "Skipping inbound route of unsupported chain");
                }
                route
            })
            .collect::<Vec<_>>();
        trace!(?routes, "Received inbound routes");

        Ok(routes)
    }

    #[instrument(skip(self))]
    async fn get_mimir_flags(&self, params: &NetworkParams) -> Result<MimirFlags, RPCError> {
        let uri = self.uri(params, "mimir")?;
        let mimir = self
            .get_json::<HashMap<String, i64>>(&uri)
            .await?;

        let flags = MimirFlags::from_mimir(params.protocol, &mimir);
        trace!(?flags, "Received mimir halt flags");

        Ok(flags)
    }
}
