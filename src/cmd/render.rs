/*!
`render.rs` - terminal presentation of invocation results.

Content blocks are emitted in their given order, no reordering and no
deduplication. A text payload that parses as JSON is pretty-printed,
anything else passes through verbatim. Non-text blocks (images, resources)
are emitted as their JSON serialization. Rendering never mutates content.
*/

use std::io::Write;

use anyhow::Result;
use rmcp::model::Content;

/// Emit content blocks, in order, to `out`.
pub fn render_blocks(blocks: &[Content], out: &mut impl Write) -> Result<()> {
    for block in blocks {
        match block.raw.as_text() {
            Some(text) => writeln!(out, "{}", render_text(&text.text))?,
            None => writeln!(out, "{}", serde_json::to_string_pretty(block)?)?,
        }
    }
    Ok(())
}

/// Pretty-print when the payload is itself JSON text, else pass through.
fn render_text(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}
