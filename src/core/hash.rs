//! Content fingerprinting
//!
//! Streams a file in fixed-size chunks, hashing the entire content with
//! SHA-256 while retaining only a byte-capped prefix in memory. The hash is
//! the file's identity for provenance: it must match the full file even
//! when the retained text is truncated.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read chunk size in bytes
const CHUNK_SIZE: usize = 64 * 1024;

/// Result of streaming a file: the full-content hash and the capped prefix.
#[derive(Debug, Clone)]
pub struct FileDigest {
    /// SHA-256 over the complete file, hex encoded
    pub sha256: String,
    /// The first `cap` bytes (or everything when no cap is set)
    pub prefix: Vec<u8>,
}

/// Stream `path`, hashing every byte while keeping at most `cap` bytes.
pub fn digest_file(path: &Path, cap: Option<usize>) -> std::io::Result<FileDigest> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut prefix: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        let data = &chunk[..n];
        hasher.update(data);
        match cap {
            None => prefix.extend_from_slice(data),
            Some(limit) if prefix.len() < limit => {
                let remaining = limit - prefix.len();
                prefix.extend_from_slice(&data[..remaining.min(data.len())]);
            }
            Some(_) => {}
        }
    }
    Ok(FileDigest {
        sha256: hex::encode(hasher.finalize()),
        prefix,
    })
}

/// SHA-256 of an in-memory buffer, hex encoded. Used for placeholder
/// candidates whose content never touches the filesystem reader.
pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
