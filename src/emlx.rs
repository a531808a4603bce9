//! Decoder for Apple Mail `.emlx` message files.
//!
//! An `.emlx` file is a decimal byte count on its own line, followed by
//! exactly that many bytes of RFC 5322 message text, followed directly by a
//! property list holding the message metadata (notably its `flags`).

use mailparse::{MailAddrList, MailHeader, MailParseError};
use plist::{Dictionary, Value};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::FormatError;

/// One header line, kept undecoded until asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: String,
    raw_value: Vec<u8>,
}

impl HeaderField {
    pub fn new(name: impl Into<String>, raw_value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_value(&self) -> &[u8] {
        &self.raw_value
    }

    /// Unfolded value with RFC 2047 encoded words decoded.
    pub fn value(&self) -> String {
        self.with_mail_header(|header| header.get_value())
            .unwrap_or_else(|_| String::from_utf8_lossy(&self.raw_value).into_owned())
    }

    /// Parses the value as an address list, decoding encoded display names.
    pub fn addresses(&self) -> Result<MailAddrList, MailParseError> {
        self.with_mail_header(mailparse::addrparse_header)?
    }

    fn with_mail_header<T>(
        &self,
        f: impl FnOnce(&MailHeader<'_>) -> T,
    ) -> Result<T, MailParseError> {
        let line = [
            self.name.as_bytes(),
            b": ".as_slice(),
            self.raw_value.as_slice(),
        ]
        .concat();
        let (header, _) = mailparse::parse_header(&line)?;
        Ok(f(&header))
    }
}

impl From<&MailHeader<'_>> for HeaderField {
    fn from(header: &MailHeader<'_>) -> Self {
        Self::new(header.get_key(), header.get_value_raw())
    }
}

/// Named message flags. A flag that is absent reads as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    values: BTreeMap<String, u64>,
}

// Apple Mail flag bitfield layout
const FLAG_BITS: &[(&str, u32)] = &[
    ("read", 0),
    ("deleted", 1),
    ("answered", 2),
    ("encrypted", 3),
    ("flagged", 4),
    ("recent", 5),
    ("draft", 6),
    ("initial", 7),
    ("forwarded", 8),
    ("redirected", 9),
    ("signed", 23),
    ("is_junk", 24),
    ("is_not_junk", 25),
    ("junk_mail_level_recorded", 29),
    ("highlight_text_in_toc", 30),
];

// (name, shift, mask)
const FLAG_FIELDS: &[(&str, u32, u64)] = &[
    ("attachment_count", 10, 0x3f),
    ("priority", 16, 0x7f),
    ("font_size_delta", 26, 0x7),
];

impl Flags {
    /// Decodes the integer form Apple Mail writes.
    pub fn from_bits(bits: u64) -> Self {
        let mut values = BTreeMap::new();
        for &(name, bit) in FLAG_BITS {
            if bits & (1 << bit) != 0 {
                values.insert(name.to_string(), 1);
            }
        }
        for &(name, shift, mask) in FLAG_FIELDS {
            let value = (bits >> shift) & mask;
            if value != 0 {
                values.insert(name.to_string(), value);
            }
        }
        Self { values }
    }

    /// Reads a dictionary of named flags. Booleans and integers are kept,
    /// other value kinds are ignored.
    pub fn from_dictionary(dict: &Dictionary) -> Self {
        let values = dict
            .iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    Value::Boolean(b) => u64::from(*b),
                    // negative integers only matter for truthiness
                    Value::Integer(i) => i.as_unsigned().unwrap_or(1),
                    _ => return None,
                };
                Some((name.clone(), value))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v != 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, u64)> for Flags {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default = "no_flags")]
    flags: Value,
}

fn no_flags() -> Value {
    Value::Dictionary(Dictionary::new())
}

impl Metadata {
    fn into_flags(self) -> Flags {
        match self.flags {
            Value::Integer(i) => i
                .as_unsigned()
                .or_else(|| i.as_signed().map(|s| s as u64))
                .map(Flags::from_bits)
                .unwrap_or_default(),
            Value::Dictionary(dict) => Flags::from_dictionary(&dict),
            _ => Flags::default(),
        }
    }
}

/// Headers and flags of one message file.
#[derive(Debug, Clone, Default)]
pub struct ParsedMessage {
    headers: Vec<HeaderField>,
    flags: Flags,
}

impl ParsedMessage {
    pub fn new(headers: Vec<HeaderField>, flags: Flags) -> Self {
        Self { headers, flags }
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&HeaderField> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
    }

    pub fn headers(&self) -> &[HeaderField] {
        &self.headers
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn is_deleted(&self) -> bool {
        self.flags.is_set("deleted")
    }
}

/// Reads and decodes the message file at `path`.
pub fn parse(path: &Path) -> Result<ParsedMessage, FormatError> {
    let data = fs::read(path)?;
    parse_bytes(&data)
}

pub fn parse_bytes(data: &[u8]) -> Result<ParsedMessage, FormatError> {
    let (message, metadata) = split(data)?;

    let (headers, _body_offset) = mailparse::parse_headers(message)?;
    let headers = headers.iter().map(HeaderField::from).collect();

    let metadata: Metadata = plist::from_bytes(metadata)?;

    Ok(ParsedMessage::new(headers, metadata.into_flags()))
}

/// Splits a file into message text and metadata using the declared length.
fn split(data: &[u8]) -> Result<(&[u8], &[u8]), FormatError> {
    let newline = data
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(FormatError::MissingLength)?;

    let line = String::from_utf8_lossy(&data[..newline]);
    let line = line.trim();
    let declared: usize = line
        .parse()
        .map_err(|_| FormatError::InvalidLength(line.to_string()))?;

    let rest = &data[newline + 1..];
    if rest.len() < declared {
        return Err(FormatError::Truncated {
            declared,
            available: rest.len(),
        });
    }

    Ok(rest.split_at(declared))
}
