//! Symbol encoding subsystem.
//!
//! # Data Flow
//! ```text
//! (Symbology, text, EncodeOptions)
//!     → SymbolEncoder::encode
//!     → code39.rs / code128.rs / ean.rs / pdf417.rs
//!     → BarModel (model.rs)
//!     → BarModel::scale (requested pixel size)
//! ```
//!
//! # Design Decisions
//! - Symbologies are a closed enum; adding one is a compile-time change
//! - Encoders are pure functions of their input
//! - Encoding failures are caller input errors, never server faults

pub mod code128;
pub mod code39;
pub mod ean;
pub mod model;
pub mod pdf417;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use model::{BarModel, Layout, ScaleError};

/// Supported symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Code39,
    Code128,
    Ean,
    Pdf417,
}

impl Symbology {
    pub const ALL: [Symbology; 4] = [
        Symbology::Code39,
        Symbology::Code128,
        Symbology::Ean,
        Symbology::Pdf417,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Code39 => "code39",
            Symbology::Code128 => "code128",
            Symbology::Ean => "ean",
            Symbology::Pdf417 => "pdf417",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbology {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbology::ALL
            .into_iter()
            .find(|symbology| symbology.as_str() == s)
            .ok_or_else(|| EncodeError::UnknownSymbology(s.to_string()))
    }
}

/// Symbology-specific knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// PDF417 error correction level. Ignored by other symbologies.
    pub security_level: i64,
}

/// Errors raised while turning text into a bar model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown symbology: {0}")]
    UnknownSymbology(String),

    #[error("no content to encode")]
    Empty,

    #[error("invalid {symbology} character {character:?}")]
    InvalidCharacter {
        symbology: &'static str,
        character: char,
    },

    #[error("invalid {symbology} content length {length}")]
    InvalidLength {
        symbology: &'static str,
        length: usize,
    },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid security level {0}, expected 0-8")]
    InvalidSecurityLevel(i64),

    #[error("{0}")]
    Symbol(String),
}

/// Capability that turns text into a bar model.
pub trait SymbolEncoder: Send + Sync {
    fn encode(
        &self,
        symbology: Symbology,
        text: &str,
        options: &EncodeOptions,
    ) -> Result<BarModel, EncodeError>;
}

/// Encoder backed by the symbologies in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEncoder;

impl SymbolEncoder for BuiltinEncoder {
    fn encode(
        &self,
        symbology: Symbology,
        text: &str,
        options: &EncodeOptions,
    ) -> Result<BarModel, EncodeError> {
        if text.is_empty() {
            return Err(EncodeError::Empty);
        }
        match symbology {
            Symbology::Code39 => code39::encode(text),
            Symbology::Code128 => code128::encode(text),
            Symbology::Ean => ean::encode(text),
            Symbology::Pdf417 => pdf417::encode(text, options.security_level),
        }
    }
}
