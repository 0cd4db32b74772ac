//! Chapter front-matter loading and book manifest validation.
//!
//! Chapter files carry a YAML front-matter block. This crate discovers those
//! files, parses each block into a [`ChapterDocument`], checks the cross-file
//! invariants, and assembles a [`BookManifest`] or the full list of
//! [`ValidationError`]s.

use sha2::{Digest, Sha256};

mod chapter;
mod discover;
mod error;
mod frontmatter;
mod load;
mod manifest;
mod model;
mod read_time;
mod render;

pub use chapter::{load_chapter, parse_chapter};
pub use discover::{discover_chapters, DiscoverOptions};
pub use error::{DiscoverError, ErrorKind, ErrorRecord, ParseError, ParseErrorKind, ValidationError};
pub use frontmatter::{extract_frontmatter, FrontMatterError};
pub use load::{default_jobs, load_chapters};
pub use manifest::{build_manifest, build_manifest_with_options, BuildOptions, PlaceholderPolicy};
pub use model::*;
pub use read_time::{compute_read_time, format_minutes, ReadTimeReport};
pub use render::render_toc;

fn normalize_lf(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    format!("{:x}", hasher.finalize())
}

/// sha256 of the compact JSON encoding. `serde_json` maps keep keys sorted,
/// so equal values always hash equally.
pub(crate) fn canonical_fingerprint(value: &serde_json::Value) -> String {
    let encoded = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    sha256_hex(normalize_lf(&encoded).as_bytes())
}
