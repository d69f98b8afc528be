//! HTML page generation.
//!
//! Objects become bullet lists, arrays inline `[a, b]` lists, and tagged
//! nodes get dedicated markup: asset and contract links, coloured amounts,
//! headings, and tables (optionally with a "More..." pagination link that
//! points back at the current request with substituted arguments).
use std::fmt::Write as _;

use serde_json::{Map, Value};

use super::{MAX_DEPTH, RenderError, RenderOptions};
use crate::core::{
    amount::{BigAmount, Sign},
    document::{Tagged, classify},
    url::substitute_arg,
};

const DOCUMENT_HEAD: &str = "<!DOCTYPE html>
<html>
<head>
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
<style>
table, th, td {
  border: 1px solid black;
  border-collapse: collapse;
}
td {
  text-align: right;
}
</style>
</head>
<body>
";

const DOCUMENT_TAIL: &str = "</body>
</html>
";

const SHORT_ID_CHARS: usize = 13;
const ELLIPSIS: &str = "...";
const GROUP_SEPARATOR: &str = "<tr></tr><tr></tr><tr></tr>";

/// Escape the characters that would break out of text or attribute context.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&#60;"),
            '>' => out.push_str("&#62;"),
            '&' => out.push_str("&#38;"),
            _ => out.push(ch),
        }
    }
    out
}

/// First [`SHORT_ID_CHARS`] characters plus an ellipsis, unless the text is
/// already short enough to show whole.
pub fn short_form(text: &str) -> String {
    if text.chars().count() <= SHORT_ID_CHARS + ELLIPSIS.len() {
        return text.to_string();
    }
    let mut short: String = text.chars().take(SHORT_ID_CHARS).collect();
    short.push_str(ELLIPSIS);
    short
}

/// Single-use writer for one HTML document.
pub struct HtmlWriter<'a> {
    out: String,
    depth: u32,
    table_depth: u32,
    request_target: &'a str,
    options: &'a RenderOptions,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(request_target: &'a str, options: &'a RenderOptions) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            table_depth: 0,
            request_target,
            options,
        }
    }

    /// Render `doc` inside the page shell.
    pub fn write_document(mut self, doc: &Value) -> Result<String, RenderError> {
        self.out.push_str(DOCUMENT_HEAD);
        self.write_value(doc)?;
        self.out.push_str(DOCUMENT_TAIL);
        Ok(self.out)
    }

    fn write_value(&mut self, value: &Value) -> Result<(), RenderError> {
        let depth = self.depth + 1;
        if depth > MAX_DEPTH {
            return Err(RenderError::RecursionTooDeep);
        }

        let outer = std::mem::replace(&mut self.depth, depth);
        let result = self.write_node(value);
        self.depth = outer;
        result
    }

    fn write_node(&mut self, value: &Value) -> Result<(), RenderError> {
        match value {
            Value::Object(map) => {
                if self.write_tagged(map)? {
                    return Ok(());
                }

                self.out.push_str("<ul>");
                for (key, child) in map {
                    let _ = write!(self.out, "<li>{}: ", escape(key));
                    self.write_value(child)?;
                    self.out.push_str("</li>");
                }
                self.out.push_str("</ul>");
            }
            Value::Array(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_value(item)?;
                }
                self.out.push(']');
            }
            Value::String(s) => self.out.push_str(&escape(s)),
            Value::Number(n) => {
                let _ = write!(self.out, "{n}");
            }
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Null => {}
        }
        Ok(())
    }

    /// Returns `false` when `map` is not a well-formed tagged node.
    fn write_tagged(&mut self, map: &Map<String, Value>) -> Result<bool, RenderError> {
        let Some(tagged) = classify(map, self.options.decimal_places) else {
            return Ok(false);
        };

        match tagged {
            Tagged::AssetId(aid) => {
                if aid == self.options.native_asset_id {
                    self.out.push_str(&escape(&self.options.native_asset_label));
                } else {
                    let _ = write!(
                        self.out,
                        "<a href = \"asset?htm=1&id={aid}\">Asset-{aid}</a>"
                    );
                }
            }
            Tagged::Amount(amount) => self.write_amount(&amount),
            Tagged::ContractId(cid) => {
                let cid = escape(cid);
                let _ = write!(
                    self.out,
                    "<a href = \"contract?htm=1&id={cid}\">cid-{}</a>",
                    short_form(&cid)
                );
            }
            Tagged::Heading(text) => {
                let _ = write!(self.out, "<h3 align=center>{}</h3>", escape(text));
            }
            Tagged::Group(rows) => {
                self.out.push_str(GROUP_SEPARATOR);
                self.write_rows(rows)?;
                self.out.push_str(GROUP_SEPARATOR);
            }
            Tagged::Table { rows, more } => {
                self.table_depth += 1;
                let result = self.write_table(rows);
                self.table_depth -= 1;
                result?;

                if let Some(more) = more {
                    self.write_more_link(more);
                }
            }
        }

        Ok(true)
    }

    fn write_amount(&mut self, amount: &BigAmount) {
        let color = match amount.sign {
            Some(Sign::Minus) => "red",
            Some(Sign::Plus) => "green",
            None => "blue",
        };
        let _ = write!(
            self.out,
            "<p2 style=\"color:{color}\">{}</p2>",
            amount.to_decimal_string(self.options.decimal_places)
        );
    }

    fn write_table(&mut self, rows: &[Value]) -> Result<(), RenderError> {
        self.out.push_str("<table style=\"width:100%\">\n");
        self.write_rows(rows)?;
        self.out.push_str("</table>\n");
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Value]) -> Result<(), RenderError> {
        for row in rows {
            let Value::Array(cells) = row else {
                self.write_value(row)?;
                continue;
            };

            self.out.push_str("<tr>");
            for (j, cell) in cells.iter().enumerate() {
                self.out.push_str("<td");
                if self.table_depth > 1 && j + 1 < cells.len() {
                    let _ = write!(self.out, " style = \"width:{}%\"", 100 / cells.len());
                }
                self.out.push('>');
                self.write_value(cell)?;
                self.out.push_str("</td>");
            }
            self.out.push_str("</tr>\n");
        }
        Ok(())
    }

    fn write_more_link(&mut self, more: &Map<String, Value>) {
        let mut target = self.request_target.to_string();
        for (key, value) in more {
            let arg = match value {
                Value::String(s) => escape(s),
                Value::Number(n) => n.as_u64().map(|v| v.to_string()).unwrap_or_default(),
                _ => String::new(),
            };
            target = substitute_arg(&target, key, &arg);
        }
        let _ = write!(self.out, "<a href = \"{target}\">More...</a>");
    }
}
