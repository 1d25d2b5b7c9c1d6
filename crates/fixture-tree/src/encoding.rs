// encoding.rs — Named text encodings for single-file reads and writes.
//
// An Encoding is only a byte serialization for a string: `encode` turns the
// caller's text into the bytes written to disk, `decode` turns file bytes
// back into text. `hex` and `base64` treat the text as a textual rendering of
// the bytes, so encoding "01d8" with `hex` writes two bytes.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// A recognized text encoding. Names are matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    /// `utf8`, `utf-8`
    #[default]
    Utf8,
    /// `utf16le`, `utf-16le`, `ucs2`, `ucs-2`
    Utf16Le,
    /// `latin1`, `binary`
    Latin1,
    /// `ascii`
    Ascii,
    /// `hex`
    Hex,
    /// `base64`
    Base64,
}

impl Encoding {
    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Le => "utf16le",
            Encoding::Latin1 => "latin1",
            Encoding::Ascii => "ascii",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }

    /// Serialize `text` to the bytes stored on disk.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, TreeError> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Utf16Le => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()),
            // Only the low byte of each UTF-16 code unit survives.
            Encoding::Latin1 | Encoding::Ascii => {
                Ok(text.encode_utf16().map(|unit| (unit & 0xff) as u8).collect())
            }
            Encoding::Hex => decode_hex(text),
            Encoding::Base64 => BASE64.decode(text).map_err(|e| TreeError::Decode {
                encoding: "base64",
                reason: e.to_string(),
            }),
        }
    }

    /// Turn file bytes back into text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, TreeError> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| TreeError::Decode {
                encoding: "utf8",
                reason: e.to_string(),
            }),
            Encoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(TreeError::Decode {
                        encoding: "utf16le",
                        reason: format!("odd byte length {}", bytes.len()),
                    });
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).map_err(|e| TreeError::Decode {
                    encoding: "utf16le",
                    reason: e.to_string(),
                })
            }
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Encoding::Ascii => Ok(bytes.iter().map(|&b| (b & 0x7f) as char).collect()),
            Encoding::Hex => Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect()),
            Encoding::Base64 => Ok(BASE64.encode(bytes)),
        }
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>, TreeError> {
    let invalid = |reason: String| TreeError::Decode {
        encoding: "hex",
        reason,
    };
    if text.len() % 2 != 0 {
        return Err(invalid(format!("odd digit count {}", text.len())));
    }
    text.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| invalid(format!("bad hex digits '{}'", String::from_utf8_lossy(pair))))
        })
        .collect()
}

impl FromStr for Encoding {
    type Err = TreeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Encoding::Utf16Le),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            "ascii" => Ok(Encoding::Ascii),
            "hex" => Ok(Encoding::Hex),
            "base64" => Ok(Encoding::Base64),
            _ => Err(TreeError::UnknownEncoding(name.to_string())),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = TreeError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Encoding> for String {
    fn from(encoding: Encoding) -> Self {
        encoding.name().to_string()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
