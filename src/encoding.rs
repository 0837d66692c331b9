/*!
 * Text encodings for subtitle documents.
 *
 * Unicode encodings are recognised from their byte-order mark. Single-byte
 * encodings have no BOM and must be named explicitly by the caller. Decoding
 * never falls back to another encoding: invalid input is an error.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

/// Newline of the host platform, used when a document gives no hint
pub const NATIVE_EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
const BOM_UTF32_LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const BOM_UTF32_BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

// Windows-1252 code points for 0x80..=0x9F; `None` marks unassigned bytes.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Supported text encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8", alias = "utf_8")]
    Utf8,
    #[serde(rename = "utf-16le", alias = "utf_16_le")]
    Utf16Le,
    #[serde(rename = "utf-16be", alias = "utf_16_be")]
    Utf16Be,
    #[serde(rename = "utf-32le", alias = "utf_32_le")]
    Utf32Le,
    #[serde(rename = "utf-32be", alias = "utf_32_be")]
    Utf32Be,
    #[serde(rename = "latin-1", alias = "iso-8859-1", alias = "latin1")]
    Latin1,
    #[serde(rename = "windows-1252", alias = "cp1252")]
    Windows1252,
    #[serde(rename = "ascii", alias = "us-ascii")]
    Ascii,
}

impl Encoding {
    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Utf32Le => "utf-32le",
            Self::Utf32Be => "utf-32be",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "windows-1252",
            Self::Ascii => "ascii",
        }
    }

    /// Byte-order mark for this encoding (empty for single-byte encodings)
    pub fn bom(&self) -> &'static [u8] {
        match self {
            Self::Utf8 => BOM_UTF8,
            Self::Utf16Le => BOM_UTF16_LE,
            Self::Utf16Be => BOM_UTF16_BE,
            Self::Utf32Le => BOM_UTF32_LE,
            Self::Utf32Be => BOM_UTF32_BE,
            Self::Latin1 | Self::Windows1252 | Self::Ascii => &[],
        }
    }

    /// Detect a leading byte-order mark, returning the encoding and BOM length
    pub fn sniff_bom(bytes: &[u8]) -> Option<(Encoding, usize)> {
        // UTF-32LE must be tested before UTF-16LE, they share a prefix.
        [
            Self::Utf32Le,
            Self::Utf32Be,
            Self::Utf8,
            Self::Utf16Le,
            Self::Utf16Be,
        ]
        .into_iter()
        .find(|encoding| bytes.starts_with(encoding.bom()))
        .map(|encoding| (encoding, encoding.bom().len()))
    }

    /// Decode bytes that carry no BOM
    pub fn decode(&self, bytes: &[u8]) -> Result<String, SubtitleError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| self.decode_error(e)),
            Self::Utf16Le | Self::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(self.decode_error("odd number of bytes"));
                }
                let units = bytes.chunks_exact(2).map(|pair| {
                    let pair = [pair[0], pair[1]];
                    if *self == Self::Utf16Le {
                        u16::from_le_bytes(pair)
                    } else {
                        u16::from_be_bytes(pair)
                    }
                });
                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .map_err(|e| self.decode_error(e))
            }
            Self::Utf32Le | Self::Utf32Be => {
                if bytes.len() % 4 != 0 {
                    return Err(self.decode_error("length is not a multiple of 4"));
                }
                bytes
                    .chunks_exact(4)
                    .map(|quad| {
                        let quad = [quad[0], quad[1], quad[2], quad[3]];
                        let value = if *self == Self::Utf32Le {
                            u32::from_le_bytes(quad)
                        } else {
                            u32::from_be_bytes(quad)
                        };
                        char::from_u32(value).ok_or_else(|| {
                            self.decode_error(format!("invalid code point {value:#x}"))
                        })
                    })
                    .collect()
            }
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Windows1252 => bytes
                .iter()
                .enumerate()
                .map(|(pos, &b)| match b {
                    0x80..=0x9F => WINDOWS_1252_HIGH[(b - 0x80) as usize].ok_or_else(|| {
                        self.decode_error(format!("undefined byte {b:#04x} at offset {pos}"))
                    }),
                    _ => Ok(char::from(b)),
                })
                .collect(),
            Self::Ascii => bytes
                .iter()
                .enumerate()
                .map(|(pos, &b)| {
                    if b.is_ascii() {
                        Ok(char::from(b))
                    } else {
                        Err(self.decode_error(format!("non-ascii byte {b:#04x} at offset {pos}")))
                    }
                })
                .collect(),
        }
    }

    /// Encode text, optionally prefixed with the BOM
    pub fn encode(&self, text: &str, with_bom: bool) -> Result<Vec<u8>, SubtitleError> {
        let mut out = Vec::with_capacity(text.len() + 4);
        if with_bom {
            out.extend_from_slice(self.bom());
        }

        match self {
            Self::Utf8 => out.extend_from_slice(text.as_bytes()),
            Self::Utf16Le => text.encode_utf16().for_each(|u| out.extend(u.to_le_bytes())),
            Self::Utf16Be => text.encode_utf16().for_each(|u| out.extend(u.to_be_bytes())),
            Self::Utf32Le => text.chars().for_each(|c| out.extend((c as u32).to_le_bytes())),
            Self::Utf32Be => text.chars().for_each(|c| out.extend((c as u32).to_be_bytes())),
            Self::Latin1 | Self::Ascii => {
                let limit = if *self == Self::Ascii { 0x7F } else { 0xFF };
                for c in text.chars() {
                    match u8::try_from(c as u32) {
                        Ok(b) if u32::from(b) <= limit => out.push(b),
                        _ => return Err(self.encode_error(c)),
                    }
                }
            }
            Self::Windows1252 => {
                for c in text.chars() {
                    let byte = match c as u32 {
                        0x00..=0x7F | 0xA0..=0xFF => Some(c as u8),
                        _ => WINDOWS_1252_HIGH
                            .iter()
                            .position(|mapped| *mapped == Some(c))
                            .map(|offset| 0x80 + offset as u8),
                    };
                    out.push(byte.ok_or_else(|| self.encode_error(c))?);
                }
            }
        }
        Ok(out)
    }

    fn decode_error(&self, reason: impl fmt::Display) -> SubtitleError {
        SubtitleError::Decode {
            encoding: self.name().to_string(),
            reason: reason.to_string(),
        }
    }

    fn encode_error(&self, c: char) -> SubtitleError {
        SubtitleError::Encode {
            encoding: self.name().to_string(),
            reason: format!("character {c:?} (U+{:04X}) is not representable", c as u32),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" | "utf-8-sig" => Ok(Self::Utf8),
            "utf-16le" | "utf-16-le" => Ok(Self::Utf16Le),
            "utf-16be" | "utf-16-be" => Ok(Self::Utf16Be),
            "utf-32le" | "utf-32-le" => Ok(Self::Utf32Le),
            "utf-32be" | "utf-32-be" => Ok(Self::Utf32Be),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Self::Latin1),
            "windows-1252" | "cp1252" => Ok(Self::Windows1252),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => Err(SubtitleError::UnknownEncoding(s.to_string())),
        }
    }
}

/// Decode raw document bytes.
///
/// A byte-order mark always wins and is stripped. Without one the caller's
/// encoding (or UTF-8) is used. Returns the text and the encoding applied.
pub fn decode_document(
    bytes: &[u8],
    fallback: Option<Encoding>,
) -> Result<(String, Encoding), SubtitleError> {
    match Encoding::sniff_bom(bytes) {
        Some((encoding, bom_len)) => Ok((encoding.decode(&bytes[bom_len..])?, encoding)),
        None => {
            let encoding = fallback.unwrap_or_default();
            Ok((encoding.decode(bytes)?, encoding))
        }
    }
}

/// Find the dominant newline sequence of a document, if it has any
pub fn detect_eol(text: &str) -> Option<&'static str> {
    let crlf = text.matches("\r\n").count();
    let lf = text.matches('\n').count() - crlf;

    match (crlf, lf) {
        (0, 0) => None,
        (crlf, lf) if crlf >= lf => Some("\r\n"),
        _ => Some("\n"),
    }
}
