//! Multi-document file splitting.
//!
//! Splits a file's raw text into documents on separator lines, with no
//! awareness of the content's structure beyond line-exact matching. The
//! header/body protocol (at most two documents) is enforced by the caller.

/// Split raw text into trimmed, non-empty documents.
///
/// A separator is any line whose trimmed content is exactly `---`.
/// Whitespace-only chunks are dropped, so leading or trailing separators do
/// not produce empty documents.
#[must_use]
pub fn documents(data: &str) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in data.lines() {
        if line.trim() == "---" {
            push_chunk(&mut docs, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }

    push_chunk(&mut docs, &current);

    docs
}

fn push_chunk(docs: &mut Vec<String>, lines: &[&str]) {
    let chunk = lines.join("\n");
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}
