use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::{columns::HeaderColumn, render::RenderMode};

/// Error type for backend queries
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AdapterError {
    /// The requested object does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend could not be reached or refused the query
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// The backend answered with something that is not a document
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
    #[error("backend timed out after {0}s")]
    Timeout(u64),
}

/// How the backend should shape the document it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterMode {
    /// Tagged nodes suitable for the HTML renderer.
    AutoHtml,
    /// Tagged nodes, with amounts left for the caller to expand.
    ExplicitType,
    /// Plain values without type tags.
    Legacy,
}

impl AdapterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AdapterMode::AutoHtml => "auto_html",
            AdapterMode::ExplicitType => "explicit_type",
            AdapterMode::Legacy => "legacy",
        }
    }
}

impl From<RenderMode> for AdapterMode {
    fn from(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Html => AdapterMode::AutoHtml,
            RenderMode::ExpandedJson => AdapterMode::ExplicitType,
            RenderMode::Json => AdapterMode::Legacy,
        }
    }
}

/// Parameters of a header-range query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderQuery {
    pub h_max: u64,
    pub n_max: u32,
    pub dh: u64,
    pub columns: Vec<HeaderColumn>,
}

/// Range parameters shared by the contract and asset history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRange {
    pub h_min: u64,
    pub h_max: u64,
    pub n_max: u32,
}

/// ExplorerAdapter defines the port (interface) to the node's indexed state
///
/// Each call produces a fresh document owned by the caller.
#[async_trait]
pub trait ExplorerAdapter: Send + Sync + 'static {
    async fn status(&self, mode: AdapterMode) -> Result<Value, AdapterError>;

    async fn block(&self, height: u64, mode: AdapterMode) -> Result<Value, AdapterError>;

    async fn block_by_kernel(
        &self,
        kernel: &[u8; 32],
        mode: AdapterMode,
    ) -> Result<Value, AdapterError>;

    async fn blocks(&self, start: u64, n: u64, mode: AdapterMode) -> Result<Value, AdapterError>;

    async fn headers(&self, query: &HeaderQuery, mode: AdapterMode)
    -> Result<Value, AdapterError>;

    async fn peers(&self, mode: AdapterMode) -> Result<Value, AdapterError>;

    async fn swap_offers(&self, mode: AdapterMode) -> Result<Value, AdapterError>;

    async fn swap_totals(&self, mode: AdapterMode) -> Result<Value, AdapterError>;

    async fn contracts(&self, mode: AdapterMode) -> Result<Value, AdapterError>;

    async fn contract_details(
        &self,
        id: &[u8; 32],
        range: HistoryRange,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError>;

    async fn asset_details(
        &self,
        aid: u32,
        range: HistoryRange,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError>;

    async fn assets_at(&self, height: u64, mode: AdapterMode) -> Result<Value, AdapterError>;
}
