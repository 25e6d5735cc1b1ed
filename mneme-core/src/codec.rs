//! Decoders for raw stored values
//!
//! The store only knows bytes. A [`Decoder`] names the conversion applied at
//! read time; the set is closed so callers can pick one by name (the CLI does)
//! and the result type stays checkable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors produced while decoding a raw value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// There was no value to decode
    #[error("no value to decode")]
    NoValue,

    /// The raw bytes are not valid UTF-8
    #[error("value is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The text cannot be parsed as the requested kind
    #[error("cannot parse {value:?} as {kind}")]
    Format { kind: Decoder, value: String },

    /// Unknown decoder name
    #[error("unknown decoder '{0}' (expected raw, text, integer or float)")]
    UnknownDecoder(String),
}

/// Named decode strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoder {
    /// Passthrough, returns the stored bytes
    #[default]
    Raw,
    /// UTF-8 text
    Text,
    /// Signed 64-bit integer in decimal form
    Integer,
    /// 64-bit float
    Float,
}

/// A decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Raw(Vec<u8>),
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Decoder {
    /// Decode `raw` into the requested kind.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NoValue`] when `raw` is absent, [`DecodeError::Utf8`]
    /// for non-UTF-8 input to a textual decoder and [`DecodeError::Format`]
    /// when the text is not a number of the requested kind.
    pub fn decode(self, raw: Option<&[u8]>) -> Result<Decoded, DecodeError> {
        let raw = raw.ok_or(DecodeError::NoValue)?;

        match self {
            Decoder::Raw => Ok(Decoded::Raw(raw.to_vec())),
            Decoder::Text => Ok(Decoded::Text(String::from_utf8(raw.to_vec())?)),
            Decoder::Integer => {
                let text = String::from_utf8(raw.to_vec())?;
                text.trim()
                    .parse::<i64>()
                    .map(Decoded::Integer)
                    .map_err(|_| DecodeError::Format { kind: self, value: text })
            }
            Decoder::Float => {
                let text = String::from_utf8(raw.to_vec())?;
                text.trim()
                    .parse::<f64>()
                    .map(Decoded::Float)
                    .map_err(|_| DecodeError::Format { kind: self, value: text })
            }
        }
    }

    /// Decoder name as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Decoder::Raw => "raw",
            Decoder::Text => "text",
            Decoder::Integer => "integer",
            Decoder::Float => "float",
        }
    }
}

impl fmt::Display for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Decoder {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "bytes" => Ok(Decoder::Raw),
            "text" | "str" | "string" => Ok(Decoder::Text),
            "integer" | "int" => Ok(Decoder::Integer),
            "float" => Ok(Decoder::Float),
            other => Err(DecodeError::UnknownDecoder(other.to_string())),
        }
    }
}

impl Decoded {
    /// Text content, if this is a text value
    pub fn into_text(self) -> Option<String> {
        match self {
            Decoded::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Decoded::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Float content, if this is a float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Decoded::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Raw bytes, if this is an undecoded value
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Decoded::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Raw(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Decoded::Text(text) => f.write_str(text),
            Decoded::Integer(n) => write!(f, "{}", n),
            Decoded::Float(x) => write!(f, "{}", x),
        }
    }
}
