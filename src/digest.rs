use std::fmt;

use clap::ValueEnum;
use serde::{Serialize, Serializer};

use crate::sha256::Sha256;

/// A 256-bit SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; Digest::LEN]);

impl Digest {
    pub const LEN: usize = 32;

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase, 64-character hexadecimal rendering.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Incremental digest computation shared by every backend.
///
/// `finish` does not reset the engine; call `reset` (or use `digest_of`)
/// before hashing the next input.
pub trait DigestEngine: Send {
    fn reset(&mut self);

    fn absorb(&mut self, bytes: &[u8]);

    fn finish(&mut self) -> Digest;

    fn digest_of(&mut self, bytes: &[u8]) -> Digest {
        self.reset();
        self.absorb(bytes);
        self.finish()
    }
}

/// SHA-256 backed by the `sha2` crate.
#[derive(Clone, Default)]
pub struct AcceleratedSha256 {
    inner: sha2::Sha256,
}

impl AcceleratedSha256 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigestEngine for AcceleratedSha256 {
    fn reset(&mut self) {
        self.inner = sha2::Sha256::default();
    }

    fn absorb(&mut self, bytes: &[u8]) {
        sha2::Digest::update(&mut self.inner, bytes);
    }

    fn finish(&mut self) -> Digest {
        let output = sha2::Digest::finalize(self.inner.clone());
        let mut bytes = [0u8; Digest::LEN];
        bytes.copy_from_slice(&output);
        Digest::from_bytes(bytes)
    }
}

/// Which [`DigestEngine`] implementation the hash workers use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Portable in-crate SHA-256.
    #[default]
    Scalar,
    /// `sha2` crate, using SHA extensions when the CPU has them.
    Accelerated,
}

impl Backend {
    /// Creates a fresh engine owned by the caller.
    pub fn engine(self) -> Box<dyn DigestEngine> {
        match self {
            Backend::Scalar => Box::new(Sha256::new()),
            Backend::Accelerated => Box::new(AcceleratedSha256::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Accelerated => "accelerated",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
