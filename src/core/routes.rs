//! Explorer endpoints and their argument handling.
//!
//! Each handler turns the typed query arguments of one route into a single
//! backend call. Unsigned parameters are read as signed integers and cast,
//! so `-1` selects the maximum.
use std::{collections::HashMap, future::Future, pin::Pin};

use serde_json::Value;

use crate::{
    core::{
        columns::parse_columns,
        error::RequestError,
        url::{ParsedUrl, Route},
    },
    ports::adapter::{AdapterMode, ExplorerAdapter, HeaderQuery, HistoryRange},
};

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, RequestError>> + Send + 'a>>;

pub type Handler =
    for<'a> fn(&'a dyn ExplorerAdapter, &'a ParsedUrl, AdapterMode) -> HandlerFuture<'a>;

static ROUTES: [(Route, Handler); 11] = [
    (Route::Status, status),
    (Route::Block, block),
    (Route::Blocks, blocks),
    (Route::Headers, headers),
    (Route::Peers, peers),
    (Route::SwapOffers, swap_offers),
    (Route::SwapTotals, swap_totals),
    (Route::Contracts, contracts),
    (Route::Contract, contract),
    (Route::Asset, asset),
    (Route::Assets, assets),
];

/// Route to handler lookup, fixed after construction.
#[derive(Clone)]
pub struct DispatchTable {
    routes: Vec<Route>,
    handlers: HashMap<Route, Handler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            routes: ROUTES.iter().map(|(route, _)| *route).collect(),
            handlers: ROUTES.iter().copied().collect(),
        }
    }

    /// Routes the table can serve, for URL parsing.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, route: Route) -> Option<Handler> {
        self.handlers.get(&route).copied()
    }

    /// Run the handler registered for `url.route`.
    pub async fn dispatch(
        &self,
        backend: &dyn ExplorerAdapter,
        url: &ParsedUrl,
        mode: AdapterMode,
    ) -> Result<Value, RequestError> {
        let handler = self.get(url.route).ok_or_else(|| {
            RequestError::invalid(format!("no handler for route {}", url.route))
        })?;
        handler(backend, url, mode).await
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

fn status<'a>(
    backend: &'a dyn ExplorerAdapter,
    _url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move { Ok(backend.status(mode).await?) })
}

fn block<'a>(
    backend: &'a dyn ExplorerAdapter,
    url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        if let Some(kernel) = url.hex_arg::<32>("kernel") {
            return Ok(backend.block_by_kernel(&kernel, mode).await?);
        }
        let height = url.int_arg("height", 0) as u64;
        Ok(backend.block(height, mode).await?)
    })
}

fn blocks<'a>(
    backend: &'a dyn ExplorerAdapter,
    url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let start = url.int_arg("height", 0);
        let n = url.int_arg("n", 0);
        if start <= 0 || n < 0 {
            return Err(RequestError::invalid(format!(
                "invalid block range: height={start} n={n}"
            )));
        }
        Ok(backend.blocks(start as u64, n as u64, mode).await?)
    })
}

fn headers<'a>(
    backend: &'a dyn ExplorerAdapter,
    url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let query = HeaderQuery {
            h_max: url.int_arg("hMax", i64::MAX) as u64,
            n_max: url.int_arg("nMax", i64::from(u32::MAX)) as u32,
            dh: url.int_arg("dh", 1) as u64,
            columns: parse_columns(url.arg("cols")),
        };
        Ok(backend.headers(&query, mode).await?)
    })
}

fn peers<'a>(
    backend: &'a dyn ExplorerAdapter,
    _url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move { Ok(backend.peers(mode).await?) })
}

fn swap_offers<'a>(
    backend: &'a dyn ExplorerAdapter,
    _url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move { Ok(backend.swap_offers(mode).await?) })
}

fn swap_totals<'a>(
    backend: &'a dyn ExplorerAdapter,
    _url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move { Ok(backend.swap_totals(mode).await?) })
}

fn contracts<'a>(
    backend: &'a dyn ExplorerAdapter,
    _url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move { Ok(backend.contracts(mode).await?) })
}

fn history_range(url: &ParsedUrl, limit_arg: &str) -> HistoryRange {
    HistoryRange {
        h_min: url.int_arg("hMin", 0) as u64,
        h_max: url.int_arg("hMax", -1) as u64,
        n_max: url.int_arg(limit_arg, i64::from(u32::MAX)) as u32,
    }
}

fn contract<'a>(
    backend: &'a dyn ExplorerAdapter,
    url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let id = url
            .hex_arg::<32>("id")
            .ok_or_else(|| RequestError::invalid("id missing"))?;
        let range = history_range(url, "nMaxTxs");
        Ok(backend.contract_details(&id, range, mode).await?)
    })
}

fn asset<'a>(
    backend: &'a dyn ExplorerAdapter,
    url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let aid = url.int_arg("id", 0) as u32;
        let range = history_range(url, "nMaxOps");
        Ok(backend.asset_details(aid, range, mode).await?)
    })
}

fn assets<'a>(
    backend: &'a dyn ExplorerAdapter,
    url: &'a ParsedUrl,
    mode: AdapterMode,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let height = url.int_arg("height", -1) as u64;
        Ok(backend.assets_at(height, mode).await?)
    })
}
