//! Request path parsing and query-argument helpers.
use std::{collections::HashMap, fmt, str::FromStr};

use thiserror::Error;

/// The fixed set of explorer endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Status,
    Block,
    Blocks,
    Headers,
    Peers,
    SwapOffers,
    SwapTotals,
    Contracts,
    Contract,
    Asset,
    Assets,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Status,
        Route::Block,
        Route::Blocks,
        Route::Headers,
        Route::Peers,
        Route::SwapOffers,
        Route::SwapTotals,
        Route::Contracts,
        Route::Contract,
        Route::Asset,
        Route::Assets,
    ];

    /// Path segment under which the route is served.
    pub fn name(self) -> &'static str {
        match self {
            Route::Status => "status",
            Route::Block => "block",
            Route::Blocks => "blocks",
            Route::Headers => "hdrs",
            Route::Peers => "peers",
            Route::SwapOffers => "swap_offers",
            Route::SwapTotals => "swap_totals",
            Route::Contracts => "contracts",
            Route::Contract => "contract",
            Route::Asset => "asset",
            Route::Assets => "assets",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown route '{0}'")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|route| route.name() == s)
            .ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

/// A request target resolved to a route plus its raw query arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub route: Route,
    args: HashMap<String, String>,
}

impl ParsedUrl {
    /// Parse a request target such as `/block?height=10&htm=1`.
    ///
    /// Returns `None` when the leading segment is not one of `known`.
    pub fn parse(target: &str, known: &[Route]) -> Option<Self> {
        let (dir, query) = match target.split_once('?') {
            Some((dir, query)) => (dir, Some(query)),
            None => (target, None),
        };

        let dir = dir.trim_start_matches('/').trim_end_matches('/');
        let route = dir.parse::<Route>().ok()?;
        if !known.contains(&route) {
            return None;
        }

        let mut args = HashMap::new();
        for pair in query.into_iter().flat_map(|q| q.split(['&', '?'])) {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            args.insert(key.to_string(), value.to_string());
        }

        Some(Self { route, args })
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Integer argument, or `default` when absent or unparsable.
    pub fn int_arg(&self, name: &str, default: i64) -> i64 {
        self.arg(name)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default)
    }

    /// Hex argument of exactly `N` bytes (`2 * N` hex digits).
    pub fn hex_arg<const N: usize>(&self, name: &str) -> Option<[u8; N]> {
        let text = self.arg(name)?;
        if text.len() != N * 2 {
            return None;
        }
        let mut out = [0u8; N];
        hex::decode_to_slice(text, &mut out).ok()?;
        Some(out)
    }
}

/// Replace every `key=...` argument of `url` with `key=value`, or append the
/// pair when the key is not present.
pub fn substitute_arg(url: &str, key: &str, value: &str) -> String {
    let pair = format!("{key}={value}");
    let prefix = format!("{key}=");

    let Some((path, query)) = url.split_once('?') else {
        return format!("{url}?{pair}");
    };

    let mut found = false;
    let segments: Vec<&str> = query
        .split('&')
        .map(|segment| {
            if segment.starts_with(&prefix) {
                found = true;
                pair.as_str()
            } else {
                segment
            }
        })
        .collect();

    if found {
        return format!("{path}?{}", segments.join("&"));
    }

    if query.is_empty() || query.ends_with('&') {
        format!("{url}{pair}")
    } else {
        format!("{url}&{pair}")
    }
}
