use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use tgbot_core::{errors::Error, Result};

/// Raw HTTP response: status plus the unparsed body.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Port for the single HTTP interaction the bot needs: POST a JSON body.
///
/// Implementations must not retry and must not inspect the body. Failures to
/// reach the server or read the response map to [`Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: Url, body: Vec<u8>) -> Result<RawResponse>;
}

/// reqwest-backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport. `timeout` of `None` keeps reqwest's default (no timeout).
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Transport(format!("http client build failed: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an existing client (shared pools, custom TLS, proxies).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: Url, body: Vec<u8>) -> Result<RawResponse> {
        // Errors carry the request URL, which contains the token. Strip it.
        let resp = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.without_url().to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.without_url().to_string()))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
