use serde_json::Value;

use super::JsonFormatter;
use crate::error::FormatResult;

/// Re-serializes any JSON document with two-space indentation, keeping
/// object keys in their original order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeJsonFormatter;

impl JsonFormatter for SerdeJsonFormatter {
    fn format(&self, content: &str) -> FormatResult<String> {
        let content = content.trim_start_matches('\u{feff}').trim();
        let value: Value = serde_json::from_str(content)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
