//! Rendering of backend documents into response bodies.
//!
//! Three output modes share one document tree:
//! * [`RenderMode::Json`] serialises it untouched
//! * [`RenderMode::ExpandedJson`] rewrites `amount` nodes into decimal strings
//! * [`RenderMode::Html`] builds a browsable page (see [`html`])
//!
//! Both tree walks stop at [`MAX_DEPTH`] nested nodes; going deeper fails the
//! request instead of truncating output.
pub mod expand;
pub mod html;

use serde_json::Value;
use thiserror::Error;

use crate::core::url::ParsedUrl;

/// Deepest node level either tree walk will visit.
pub const MAX_DEPTH: u32 = 128;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("recursion too deep")]
    RecursionTooDeep,

    #[error("couldn't serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output format requested through the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Json,
    ExpandedJson,
    Html,
}

impl RenderMode {
    /// `htm` wins over `exp_am`; neither means plain JSON.
    pub fn from_url(url: &ParsedUrl) -> Self {
        if url.has_arg("htm") {
            RenderMode::Html
        } else if url.has_arg("exp_am") {
            RenderMode::ExpandedJson
        } else {
            RenderMode::Json
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            RenderMode::Html => CONTENT_TYPE_HTML,
            RenderMode::Json | RenderMode::ExpandedJson => CONTENT_TYPE_JSON,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Json => "json",
            RenderMode::ExpandedJson => "expanded_json",
            RenderMode::Html => "html",
        }
    }
}

/// Asset-system conventions the renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub decimal_places: u32,
    pub native_asset_id: u64,
    pub native_asset_label: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            decimal_places: 8,
            native_asset_id: 0,
            native_asset_label: "Beam".to_string(),
        }
    }
}

/// A rendered body and its content type.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

/// Stateless renderer configured once per server.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render `doc` in `mode`. `request_target` is the path and query of the
    /// current request; HTML pagination links are built from it.
    pub fn render(
        &self,
        mut doc: Value,
        mode: RenderMode,
        request_target: &str,
    ) -> Result<Rendered, RenderError> {
        let body = match mode {
            RenderMode::Json => serde_json::to_vec(&doc)?,
            RenderMode::ExpandedJson => {
                expand::expand_amounts(&mut doc, self.options.decimal_places)?;
                serde_json::to_vec(&doc)?
            }
            RenderMode::Html => html::HtmlWriter::new(request_target, &self.options)
                .write_document(&doc)?
                .into_bytes(),
        };

        Ok(Rendered {
            body,
            content_type: mode.content_type(),
        })
    }
}
