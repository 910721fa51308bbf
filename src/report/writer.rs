//! Appends labeled measurement blocks to the report file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::FootprintError;

/// Appends one self-contained block to the report file, creating the file on
/// first use: a `## <key>` header line, a fenced body containing `content`,
/// and a `---` separator line.
///
/// The file handle lives only for this call, so it is closed on every path,
/// including a write that fails partway. Each block is independently
/// parseable; nothing in a block refers to its neighbors.
pub fn append_block(path: &Path, key: &str, content: &str) -> Result<(), FootprintError> {
    let mut block = format!("## {key}\n```\n");
    block.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("```\n---\n");

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(block.as_bytes())?;
    log::debug!("recorded block '{key}' ({} bytes)", block.len());
    Ok(())
}
