//! Classification of tagged document nodes.
//!
//! Backends mark sub-objects that need special rendering with a `type` and a
//! `value` key. Classification only looks at shape: a node whose `value` does
//! not fit its declared tag is not tagged and renders like any other object.
use serde_json::{Map, Value};

use crate::core::amount::BigAmount;

pub const TYPE_KEY: &str = "type";
pub const VALUE_KEY: &str = "value";
pub const MORE_KEY: &str = "more";

/// A recognised tagged node, borrowed from the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Tagged<'a> {
    /// `aid`: asset id.
    AssetId(u64),
    /// `amount`: signed big decimal.
    Amount(BigAmount),
    /// `cid`: contract id as hex text.
    ContractId(&'a str),
    /// `th`: section header.
    Heading(&'a str),
    /// `group`: rows spliced into the enclosing table.
    Group(&'a [Value]),
    /// `table`: nested table with an optional pagination argument set.
    Table {
        rows: &'a [Value],
        more: Option<&'a Map<String, Value>>,
    },
}

/// Return the `type` tag and `value` of an object, if both are present and
/// the tag is a string.
pub fn tag_of(obj: &Map<String, Value>) -> Option<(&str, &Value)> {
    let tag = obj.get(TYPE_KEY)?.as_str()?;
    let value = obj.get(VALUE_KEY)?;
    Some((tag, value))
}

/// Classify an object node. `None` means "render generically".
pub fn classify(obj: &Map<String, Value>, decimal_places: u32) -> Option<Tagged<'_>> {
    let (tag, value) = tag_of(obj)?;

    match tag {
        "aid" => value.as_u64().map(Tagged::AssetId),
        "amount" => BigAmount::from_json(value, decimal_places)
            .ok()
            .map(Tagged::Amount),
        "cid" => value.as_str().map(Tagged::ContractId),
        "th" => value.as_str().map(Tagged::Heading),
        "group" => value.as_array().map(|rows| Tagged::Group(rows)),
        "table" => value.as_array().map(|rows| Tagged::Table {
            rows,
            more: obj.get(MORE_KEY).and_then(Value::as_object),
        }),
        _ => None,
    }
}
