//! Snapshot persistence for the index.
//!
//! # Data Flow
//! ```text
//! dump:  read lock → serialize arena (JSON) → unlock
//!        → write <path>.tmp → fsync → rename over <path>
//! load:  read <path> → parse → validate graph → Trie
//! ```
//!
//! A dump sees the generation that was current when it took the read lock.
//! Inserts queued behind that lock, or landing after it is released, are not
//! part of the file; snapshots are not transactional with ingestion.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::index::shared::SharedIndex;
use crate::index::trie::{GraphError, Node, Trie};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Errors raised while writing or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {} is malformed: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported snapshot version {found} (expected {})", FORMAT_VERSION)]
    Version { found: u32 },

    #[error("snapshot header says {expected_keys} keys / {expected_hits} hits, graph holds {keys} / {hits}")]
    Header {
        expected_keys: usize,
        expected_hits: u64,
        keys: usize,
        hits: u64,
    },

    #[error("corrupt snapshot graph: {0}")]
    Corrupt(#[from] GraphError),
}

/// Summary of a written snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DumpSummary {
    pub keys: usize,
    pub hits: u64,
    pub bytes: usize,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    len: usize,
    hits: u64,
    nodes: &'a [Node],
}

#[derive(Deserialize)]
struct SnapshotFile {
    version: u32,
    len: usize,
    hits: u64,
    nodes: Vec<Node>,
}

/// Serialize a trie into the snapshot format.
pub fn serialize(trie: &Trie) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&SnapshotRef {
        version: FORMAT_VERSION,
        len: trie.len(),
        hits: trie.hits(),
        nodes: trie.nodes(),
    })
}

/// Rebuild a trie from snapshot bytes. `path` is only used in errors.
pub fn deserialize(bytes: &[u8], path: &Path) -> Result<Trie, SnapshotError> {
    let file: SnapshotFile = serde_json::from_slice(bytes).map_err(|source| SnapshotError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    if file.version != FORMAT_VERSION {
        return Err(SnapshotError::Version { found: file.version });
    }

    let trie = Trie::from_nodes(file.nodes)?;
    if trie.len() != file.len || trie.hits() != file.hits {
        return Err(SnapshotError::Header {
            expected_keys: file.len,
            expected_hits: file.hits,
            keys: trie.len(),
            hits: trie.hits(),
        });
    }

    Ok(trie)
}

/// Write the current index to `path`, replacing any previous snapshot
/// only once the new one is fully on disk.
pub fn dump(index: &SharedIndex, path: &Path) -> Result<DumpSummary, SnapshotError> {
    let (bytes, keys, hits) = index.read(|trie| {
        serialize(trie).map(|bytes| (bytes, trie.len(), trie.hits()))
    }).map_err(|source| SnapshotError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = temp_path(path);
    let written = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::Io {
            path: tmp,
            source: e,
        });
    }

    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::info!(path = %path.display(), keys, hits, bytes = bytes.len(), "Snapshot written");

    Ok(DumpSummary {
        keys,
        hits,
        bytes: bytes.len(),
    })
}

/// Read a snapshot from `path` into a new trie.
pub fn load(path: &Path) -> Result<Trie, SnapshotError> {
    let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let trie = deserialize(&bytes, path)?;

    tracing::info!(path = %path.display(), keys = trie.len(), hits = trie.hits(), "Snapshot loaded");
    Ok(trie)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
