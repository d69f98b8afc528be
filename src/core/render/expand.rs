//! Amount expansion for the `exp_am` JSON mode.
use serde_json::Value;

use super::{MAX_DEPTH, RenderError};
use crate::core::{
    amount::BigAmount,
    document::{VALUE_KEY, tag_of},
};

/// Replace the `value` of every well-formed `amount` node with its decimal
/// string. Malformed amount nodes are left as they are.
pub fn expand_amounts(doc: &mut Value, decimal_places: u32) -> Result<(), RenderError> {
    expand_node(doc, 0, decimal_places)
}

fn expand_node(node: &mut Value, depth: u32, decimal_places: u32) -> Result<(), RenderError> {
    let depth = depth + 1;
    if depth > MAX_DEPTH {
        return Err(RenderError::RecursionTooDeep);
    }

    match node {
        Value::Array(items) => {
            for item in items {
                expand_node(item, depth, decimal_places)?;
            }
        }
        Value::Object(map) => {
            for child in map.values_mut() {
                expand_node(child, depth, decimal_places)?;
            }

            let expanded = match tag_of(map) {
                Some(("amount", value)) => BigAmount::from_json(value, decimal_places)
                    .ok()
                    .map(|amount| amount.to_decimal_string(decimal_places)),
                _ => None,
            };

            if let Some(text) = expanded {
                map.insert(VALUE_KEY.to_string(), Value::String(text));
            }
        }
        _ => {}
    }

    Ok(())
}
