//! Content digests used to skip files that have already been seen.

use crate::error::{ErrorKind, Result};
use std::fs::File;
use std::path::Path;

/// BLAKE3 digest of an in-memory buffer, hex encoded.
pub fn digest(bytes: impl AsRef<[u8]>) -> String {
    blake3::hash(bytes.as_ref()).to_hex().to_string()
}

/// BLAKE3 digest of a file's contents, hex encoded. The file is streamed
/// rather than read into memory; imaging payloads get large.
pub fn digest_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ErrorKind::io(e, path))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(file).map_err(|e| ErrorKind::io(e, path))?;
    Ok(hasher.finalize().to_hex().to_string())
}
