use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use eyre::{Result, WrapErr};
use http_body_util::{BodyExt, Empty};
use hyper::{Request, StatusCode, Uri, Version, header};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use serde_json::Value;
use tokio::time::timeout;

use crate::{
    config::UpstreamConfig,
    core::columns::columns_to_selector,
    ports::adapter::{AdapterError, AdapterMode, ExplorerAdapter, HeaderQuery, HistoryRange},
};

/// Explorer backend that relays every query to a node-side explorer endpoint
/// over HTTP/1.1.
///
/// A call to `route` with arguments `args` becomes
/// `GET {base}/{route}?{args}&mode={mode}` and the JSON reply is the document.
pub struct UpstreamAdapter {
    client: Client<HttpConnector, Empty<Bytes>>,
    base: String,
    timeout_secs: u64,
}

impl UpstreamAdapter {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let base = config.url.trim_end_matches('/').to_string();
        base.parse::<Uri>()
            .wrap_err_with(|| format!("Invalid upstream URL: {}", config.url))?;

        let client = Client::builder(TokioExecutor::new()).build_http::<Empty<Bytes>>();

        tracing::info!(upstream = %base, timeout_secs = config.timeout_secs, "created upstream adapter");
        Ok(Self {
            client,
            base,
            timeout_secs: config.timeout_secs,
        })
    }

    fn build_uri(&self, route: &str, args: &[(&str, String)], mode: AdapterMode) -> String {
        let mut uri = format!("{}/{route}?", self.base);
        for (key, value) in args {
            uri.push_str(key);
            uri.push('=');
            uri.push_str(value);
            uri.push('&');
        }
        uri.push_str("mode=");
        uri.push_str(mode.as_str());
        uri
    }

    async fn fetch(
        &self,
        route: &str,
        args: &[(&str, String)],
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        let uri = self.build_uri(route, args, mode);
        let request = Request::builder()
            .method("GET")
            .uri(&uri)
            .version(Version::HTTP_11)
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| AdapterError::Unavailable(format!("cannot build request {uri}: {e}")))?;

        tracing::debug!(%uri, "querying upstream");

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| AdapterError::Unavailable(format!("request to {uri} failed: {e}")))?;

            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| AdapterError::Unavailable(format!("reading {uri} failed: {e}")))?
                .to_bytes();
            Ok::<_, AdapterError>((status, body))
        };

        let (status, body) = timeout(Duration::from_secs(self.timeout_secs), exchange)
            .await
            .map_err(|_| AdapterError::Timeout(self.timeout_secs))??;

        if status == StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(route.to_string()));
        }
        if !status.is_success() {
            return Err(AdapterError::Unavailable(format!(
                "upstream answered {status} for {route}"
            )));
        }

        serde_json::from_slice(&body).map_err(|e| AdapterError::InvalidResponse(e.to_string()))
    }
}

fn range_args(range: HistoryRange, limit_name: &'static str) -> [(&'static str, String); 3] {
    [
        ("hMin", range.h_min.to_string()),
        ("hMax", range.h_max.to_string()),
        (limit_name, range.n_max.to_string()),
    ]
}

#[async_trait]
impl ExplorerAdapter for UpstreamAdapter {
    async fn status(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.fetch("status", &[], mode).await
    }

    async fn block(&self, height: u64, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.fetch("block", &[("height", height.to_string())], mode)
            .await
    }

    async fn block_by_kernel(
        &self,
        kernel: &[u8; 32],
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        self.fetch("block", &[("kernel", hex::encode(kernel))], mode)
            .await
    }

    async fn blocks(&self, start: u64, n: u64, mode: AdapterMode) -> Result<Value, AdapterError> {
        let args = [("height", start.to_string()), ("n", n.to_string())];
        self.fetch("blocks", &args, mode).await
    }

    async fn headers(
        &self,
        query: &HeaderQuery,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        let args = [
            ("hMax", query.h_max.to_string()),
            ("nMax", query.n_max.to_string()),
            ("dh", query.dh.to_string()),
            ("cols", columns_to_selector(&query.columns)),
        ];
        self.fetch("hdrs", &args, mode).await
    }

    async fn peers(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.fetch("peers", &[], mode).await
    }

    async fn swap_offers(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.fetch("swap_offers", &[], mode).await
    }

    async fn swap_totals(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.fetch("swap_totals", &[], mode).await
    }

    async fn contracts(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.fetch("contracts", &[], mode).await
    }

    async fn contract_details(
        &self,
        id: &[u8; 32],
        range: HistoryRange,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        let mut args = vec![("id", hex::encode(id))];
        args.extend(range_args(range, "nMaxTxs"));
        self.fetch("contract", &args, mode).await
    }

    async fn asset_details(
        &self,
        aid: u32,
        range: HistoryRange,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        let mut args = vec![("id", aid.to_string())];
        args.extend(range_args(range, "nMaxOps"));
        self.fetch("asset", &args, mode).await
    }

    async fn assets_at(&self, height: u64, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.fetch("assets", &[("height", height.to_string())], mode)
            .await
    }
}
