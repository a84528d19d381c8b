//! SHA-256 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing SHA-256 digests
//! of file contents. Files are fed through the digest in fixed-size chunks
//! using one buffer that the hasher owns and reuses, so memory use does not
//! depend on file size.
//!
//! # Example
//!
//! ```no_run
//! use dupgroups::scanner::Hasher;
//! use std::path::Path;
//!
//! let mut hasher = Hasher::new();
//! let digest = hasher.hash_file(Path::new("a.txt")).unwrap();
//! println!("{}", digest.to_hex());
//! ```

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest as _, Sha256};

use super::HashError;

/// Length in bytes of a report digest.
pub const DIGEST_LEN: usize = 32;

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Content digest of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, `2 * DIGEST_LEN` characters long.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex string produced by [`Digest::to_hex`].
    ///
    /// Returns `None` for strings of the wrong length or with non-hex
    /// characters. Uppercase digits are accepted.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Digest algorithm used for grouping.
///
/// Only SHA-256 is available; the enum exists so a configured name can be
/// validated before any file is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// SHA-256 (FIPS 180-4)
    #[default]
    Sha256,
}

impl HashAlgorithm {
    /// Resolve an algorithm by name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::UnknownAlgorithm`] for any name other than
    /// `sha-256` or `sha256`.
    pub fn from_name(name: &str) -> Result<Self, HashError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sha-256" | "sha256" => Ok(Self::Sha256),
            _ => Err(HashError::UnknownAlgorithm(name.to_string())),
        }
    }

    /// Canonical name of the algorithm.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha-256",
        }
    }

    /// Digest length in bytes.
    #[must_use]
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => DIGEST_LEN,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Streaming file hasher.
///
/// Owns one read buffer that is reused for every file, which is why the
/// hashing methods take `&mut self`.
#[derive(Debug)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    buffer: Vec<u8>,
    bytes_hashed: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a SHA-256 hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer_size(HashAlgorithm::Sha256, DEFAULT_BUFFER_SIZE)
    }

    /// Create a hasher with an explicit buffer size.
    ///
    /// A zero size is bumped to one byte so reads always make progress.
    #[must_use]
    pub fn with_buffer_size(algorithm: HashAlgorithm, buffer_size: usize) -> Self {
        Self {
            algorithm,
            buffer: vec![0u8; buffer_size.max(1)],
            bytes_hashed: 0,
        }
    }

    /// Algorithm this hasher computes.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Size of the reusable read buffer.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes fed through this hasher so far.
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    /// Hash the contents of the file at `path`.
    ///
    /// The file is opened here and closed before returning, on success and
    /// on failure.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `PermissionDenied` or `Io` if the file cannot be
    /// opened or fully read.
    pub fn hash_file(&mut self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let digest = self
            .hash_reader(&mut file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("Hashed {} -> {}", path.display(), digest);
        Ok(digest)
    }

    /// Hash everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates the first read error other than `Interrupted`.
    pub fn hash_reader<R: Read>(&mut self, reader: &mut R) -> std::io::Result<Digest> {
        let mut state = match self.algorithm {
            HashAlgorithm::Sha256 => Sha256::new(),
        };

        loop {
            let n = match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&self.buffer[..n]);
            self.bytes_hashed += n as u64;
        }

        Ok(Digest(state.finalize().into()))
    }

    /// Hash an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> Digest {
        match self.algorithm {
            HashAlgorithm::Sha256 => Digest(Sha256::digest(data).into()),
        }
    }
}
