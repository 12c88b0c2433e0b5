//! # methodlink: Java call-graph resolution
//!
//! Given a method identity such as `demo.Shop#checkout(java.lang.String)`,
//! resolves every call in its body, recursively, into a graph of
//! classified edges plus the overriding declarations found in subtypes.
//!
//! ## Library usage
//!
//! The binary is a thin CLI over this crate. Build a [`source::JavaIndex`],
//! wrap it in a [`graph::MethodGraph`], and call `resolve_method`.

pub mod error;
pub mod graph;
pub mod source;

pub use error::GraphError;
pub use graph::{CallingType, GraphConfig, GraphView, MethodGraph, MethodId, MethodInfo, SubtypeStrategy};
pub use source::{IndexBuilder, IndexOptions, JavaIndex, SourceIndex};

// ─── Path helpers ────────────────────────────────────────────────────

/// Strip the `\\?\` extended-length path prefix that Windows canonicalize adds.
#[must_use]
pub fn clean_path(p: &str) -> String {
    p.strip_prefix(r"\\?\").unwrap_or(p).to_string()
}

/// Read a file as a String, using lossy UTF-8 conversion for non-UTF8 files.
/// Returns `(content, was_lossy)`; Java sources saved as Windows-1252 still parse.
pub fn read_file_lossy(path: &std::path::Path) -> std::io::Result<(String, bool)> {
    let raw = std::fs::read(path)?;
    match String::from_utf8(raw) {
        Ok(s) => Ok((s, false)),
        Err(e) => Ok((String::from_utf8_lossy(e.as_bytes()).into_owned(), true)),
    }
}
