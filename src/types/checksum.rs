use anyhow::{bail, Result};
use sha2::{Digest, Sha256, Sha512};
use std::fmt::Display;

/// Hash algorithms a pacscript `hash=` field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    Sha256,
    Sha512,
}

impl ChecksumKind {
    /// Infer the algorithm from an existing hex digest.
    pub fn from_hex_str(s: &str) -> Result<Self> {
        if hex::decode(s).is_err() {
            bail!("Malformed hash string: not hexadecimal");
        }
        match s.len() {
            64 => Ok(ChecksumKind::Sha256),
            128 => Ok(ChecksumKind::Sha512),
            n => bail!("Malformed hash string: bad length {}", n),
        }
    }

    pub fn hasher(&self) -> ChecksumHasher {
        match self {
            ChecksumKind::Sha256 => ChecksumHasher::Sha256(Sha256::new()),
            ChecksumKind::Sha512 => ChecksumHasher::Sha512(Sha512::new()),
        }
    }
}

impl Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumKind::Sha256 => f.write_str("sha256"),
            ChecksumKind::Sha512 => f.write_str("sha512"),
        }
    }
}

/// Streaming digest over downloaded chunks. The result is bit-identical to
/// hashing the whole artifact in one buffer.
pub enum ChecksumHasher {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl ChecksumHasher {
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        match self {
            ChecksumHasher::Sha256(h) => h.update(data),
            ChecksumHasher::Sha512(h) => h.update(data),
        }
    }

    pub fn finish(self) -> String {
        match self {
            ChecksumHasher::Sha256(h) => hex::encode(h.finalize()),
            ChecksumHasher::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}
