//! In-memory adapter used by unit tests.
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::adapter::{AdapterError, AdapterMode, ExplorerAdapter, HeaderQuery, HistoryRange};
use crate::core::columns::columns_to_selector;

/// Records every call as a readable line and answers with a canned document.
pub(crate) struct RecordingAdapter {
    calls: Mutex<Vec<String>>,
    reply: Option<Value>,
}

impl RecordingAdapter {
    /// Answers each call with `{"call": <recorded line>}`.
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: None,
        }
    }

    /// Answers each call with `reply`.
    pub(crate) fn replying(reply: Value) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Some(reply),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<Value, AdapterError> {
        self.calls.lock().unwrap().push(call.clone());
        Ok(self.reply.clone().unwrap_or_else(|| json!({ "call": call })))
    }
}

#[async_trait]
impl ExplorerAdapter for RecordingAdapter {
    async fn status(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("status {}", mode.as_str()))
    }

    async fn block(&self, height: u64, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("block {height} {}", mode.as_str()))
    }

    async fn block_by_kernel(
        &self,
        kernel: &[u8; 32],
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        self.record(format!("kernel {} {}", hex::encode(kernel), mode.as_str()))
    }

    async fn blocks(&self, start: u64, n: u64, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("blocks {start} {n} {}", mode.as_str()))
    }

    async fn headers(
        &self,
        query: &HeaderQuery,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        self.record(format!(
            "hdrs {} {} {} {} {}",
            query.h_max,
            query.n_max,
            query.dh,
            columns_to_selector(&query.columns),
            mode.as_str()
        ))
    }

    async fn peers(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("peers {}", mode.as_str()))
    }

    async fn swap_offers(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("swap_offers {}", mode.as_str()))
    }

    async fn swap_totals(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("swap_totals {}", mode.as_str()))
    }

    async fn contracts(&self, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("contracts {}", mode.as_str()))
    }

    async fn contract_details(
        &self,
        id: &[u8; 32],
        range: HistoryRange,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        self.record(format!(
            "contract {} {} {} {} {}",
            hex::encode(id),
            range.h_min,
            range.h_max,
            range.n_max,
            mode.as_str()
        ))
    }

    async fn asset_details(
        &self,
        aid: u32,
        range: HistoryRange,
        mode: AdapterMode,
    ) -> Result<Value, AdapterError> {
        self.record(format!(
            "asset {aid} {} {} {} {}",
            range.h_min,
            range.h_max,
            range.n_max,
            mode.as_str()
        ))
    }

    async fn assets_at(&self, height: u64, mode: AdapterMode) -> Result<Value, AdapterError> {
        self.record(format!("assets {height} {}", mode.as_str()))
    }
}
