//! Bulk import of a URL list at startup.
//!
//! The file holds one URL per line. Lines are trimmed of spaces and blank
//! lines are skipped; everything else is encoded and inserted directly,
//! bypassing the admission queue and its length filter.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::index::{codec, SharedIndex};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Insert every URL in `text` into `index`. Returns how many were inserted.
pub fn import_lines(text: &str, index: &SharedIndex) -> usize {
    index.write(|trie| {
        let mut imported = 0;
        for line in text.lines().map(|line| line.trim_matches(' ')) {
            if line.is_empty() {
                continue;
            }
            trie.insert(&codec::encode(line));
            imported += 1;
        }
        imported
    })
}

/// Read `path` and import its URLs into `index`.
pub fn import_file(path: &Path, index: &SharedIndex) -> Result<usize, SeedError> {
    let text = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let imported = import_lines(&text, index);
    tracing::info!(path = %path.display(), imported, "Seed file imported");
    Ok(imported)
}
