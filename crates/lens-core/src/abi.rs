//! # Positional Config Codec
//!
//! Module configuration and follow data travel as opaque bytes. The layout is a
//! fixed positional tuple of 32-byte words, compatible with the Ethereum ABI
//! tuple encoding:
//!
//! ```text
//! static fields:   [ word ]                      address | uint | bool
//! dynamic fields:  [ offset ] ... [ len ][ elem ]*   address[]
//! ```
//!
//! Decoding is strict: every field must be present, values must be in
//! canonical form, dynamic tails must sit exactly where an encoder puts them
//! and nothing may follow the last consumed word.

use crate::types::Address;
use thiserror::Error;

/// Size of one ABI word
pub const WORD: usize = 32;

/// Field types understood by the codec
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbiType {
    Address,
    /// Unsigned integer; values must fit in 128 bits
    Uint,
    Bool,
    AddressArray,
}

impl AbiType {
    fn is_dynamic(&self) -> bool {
        matches!(self, Self::AddressArray)
    }
}

/// A decoded field value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(u128),
    Bool(bool),
    AddressArray(Vec<Address>),
}

impl AbiValue {
    fn is_dynamic(&self) -> bool {
        matches!(self, Self::AddressArray(_))
    }
}

/// Codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("data too short: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("{0} trailing bytes after the last field")]
    TrailingBytes(usize),

    #[error("field {0}: address word has non-zero padding")]
    DirtyAddress(usize),

    #[error("field {0}: integer does not fit in 128 bits")]
    UintOverflow(usize),

    #[error("field {0}: boolean word is neither 0 nor 1")]
    InvalidBool(usize),

    #[error("field {field}: dynamic offset {found} does not match expected {expected}")]
    NonCanonicalOffset {
        field: usize,
        expected: usize,
        found: u128,
    },

    #[error("field {0}: array length exceeds the remaining data")]
    ArrayTooLong(usize),
}

/// Encode a tuple of values
pub fn encode(values: &[AbiValue]) -> Vec<u8> {
    let head_len = values.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for value in values {
        match value {
            AbiValue::Address(a) => head.extend_from_slice(&address_word(a)),
            AbiValue::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            AbiValue::Bool(b) => head.extend_from_slice(&uint_word(*b as u128)),
            AbiValue::AddressArray(items) => {
                let offset = head_len + tail.len();
                head.extend_from_slice(&uint_word(offset as u128));
                tail.extend_from_slice(&uint_word(items.len() as u128));
                for item in items {
                    tail.extend_from_slice(&address_word(item));
                }
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Decode a tuple with the given field types
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let head_len = types.len() * WORD;
    if data.len() < head_len {
        return Err(AbiError::Truncated {
            offset: 0,
            needed: head_len,
            available: data.len(),
        });
    }

    let mut values = Vec::with_capacity(types.len());
    // Where the next dynamic tail must begin
    let mut cursor = head_len;

    for (field, ty) in types.iter().enumerate() {
        let word = read_word(data, field * WORD)?;
        let value = match ty {
            AbiType::Address => AbiValue::Address(word_address(field, word)?),
            AbiType::Uint => AbiValue::Uint(word_uint(field, word)?),
            AbiType::Bool => match word_uint(field, word)? {
                0 => AbiValue::Bool(false),
                1 => AbiValue::Bool(true),
                _ => return Err(AbiError::InvalidBool(field)),
            },
            AbiType::AddressArray => {
                let offset = word_uint(field, word)?;
                if offset != cursor as u128 {
                    return Err(AbiError::NonCanonicalOffset {
                        field,
                        expected: cursor,
                        found: offset,
                    });
                }
                let len = word_uint(field, read_word(data, cursor)?)?;
                let remaining = (data.len() - cursor - WORD) / WORD;
                if len > remaining as u128 {
                    return Err(AbiError::ArrayTooLong(field));
                }
                cursor += WORD;
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    items.push(word_address(field, read_word(data, cursor)?)?);
                    cursor += WORD;
                }
                AbiValue::AddressArray(items)
            }
        };
        debug_assert_eq!(ty.is_dynamic(), value.is_dynamic());
        values.push(value);
    }

    if cursor != data.len() {
        return Err(AbiError::TrailingBytes(data.len() - cursor));
    }

    Ok(values)
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    data.get(offset..offset + WORD).ok_or(AbiError::Truncated {
        offset,
        needed: WORD,
        available: data.len().saturating_sub(offset),
    })
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_address(field: usize, word: &[u8]) -> Result<Address, AbiError> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(AbiError::DirtyAddress(field));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address::new(bytes))
}

fn word_uint(field: usize, word: &[u8]) -> Result<u128, AbiError> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::UintOverflow(field));
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(bytes))
}
