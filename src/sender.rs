use mailparse::MailAddr;
use thiserror::Error;

use crate::emlx::{HeaderField, ParsedMessage};

/// Sender of one counted message.
///
/// `address` is empty when the `From` header held nothing usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderRecord {
    pub address: String,
    pub display_name: String,
}

impl SenderRecord {
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized sender address: {0:?}")]
pub struct AddressParseError(pub String);

/// Sender of a message, or `None` when it has no `From` header or is flagged deleted.
pub fn extract(message: &ParsedMessage) -> Option<SenderRecord> {
    let from = message.header("From")?;
    if message.is_deleted() {
        return None;
    }

    Some(parse_sender(from).unwrap_or_default())
}

/// Reads the first mailbox of a `From` header as (address, display name).
///
/// Also accepts two legacy shapes: a name given as a trailing comment
/// (`bob@example.org (Bob Ferris)`) and an angle address missing its `>`.
pub fn parse_sender(from: &HeaderField) -> Result<SenderRecord, AddressParseError> {
    let value = from.value();
    let invalid = || AddressParseError(value.clone());

    let addresses = match from.addresses() {
        Ok(addresses) => addresses,
        Err(_) => close_angle_bracket(from)
            .and_then(|fixed| fixed.addresses().ok())
            .ok_or_else(invalid)?,
    };
    let info = addresses
        .iter()
        .find_map(|addr| match addr {
            MailAddr::Single(info) => Some(info),
            MailAddr::Group(group) => group.addrs.first(),
        })
        .ok_or_else(invalid)?;

    let address = info.addr.trim();
    if !address.contains('@') {
        return Err(invalid());
    }

    let mut display_name = info.display_name.as_deref().unwrap_or_default().trim();
    if display_name.is_empty() {
        display_name = trailing_comment(&value).unwrap_or_default();
    }
    Ok(SenderRecord::new(address, display_name))
}

/// Copy of the header with `>` appended when its last `<` is never closed.
fn close_angle_bracket(from: &HeaderField) -> Option<HeaderField> {
    let raw = from.raw_value().trim_ascii_end();
    let open = raw.iter().rposition(|&b| b == b'<')?;
    if raw[open..].contains(&b'>') {
        return None;
    }
    Some(HeaderField::new(from.name(), [raw, b">".as_slice()].concat()))
}

/// Text of a `( ... )` comment closing the value, if any.
fn trailing_comment(value: &str) -> Option<&str> {
    let inner = value.trim_end().strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let comment = inner[open + 1..].trim();
    (!comment.is_empty()).then_some(comment)
}
