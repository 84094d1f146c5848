//! Big-endian cursor helpers for the record layout.
//!
//! Readers take `(bytes, &mut i)` and check the remaining length before slicing or
//! allocating, so a forged length prefix can only ever produce `Truncated`.

use alloy_primitives::{Address, B256, U256};

use crate::{
    errors::{DecodeError, EncodeError},
    primitives::{decode_address, decode_amount, encode_amount, ADDRESS_LEN, WORD_LEN},
};

const OPTION_NONE: u8 = 0x00;
const OPTION_SOME: u8 = 0x01;

fn take<'a>(bytes: &'a [u8], i: &mut usize, len: usize) -> Result<&'a [u8], DecodeError> {
    let end = i.checked_add(len).ok_or(DecodeError::Truncated)?;
    if bytes.len() < end {
        return Err(DecodeError::Truncated);
    }
    let out = &bytes[*i..end];
    *i = end;
    Ok(out)
}

pub fn read_u8(bytes: &[u8], i: &mut usize) -> Result<u8, DecodeError> {
    Ok(take(bytes, i, 1)?[0])
}

pub fn read_u16_be(bytes: &[u8], i: &mut usize) -> Result<u16, DecodeError> {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(take(bytes, i, 2)?);
    Ok(u16::from_be_bytes(buf))
}

pub fn read_u32_be(bytes: &[u8], i: &mut usize) -> Result<u32, DecodeError> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(take(bytes, i, 4)?);
    Ok(u32::from_be_bytes(buf))
}

pub fn read_vec(bytes: &[u8], i: &mut usize, len: usize) -> Result<Vec<u8>, DecodeError> {
    Ok(take(bytes, i, len)?.to_vec())
}

/// `u32` length prefix followed by that many bytes.
pub fn read_blob(bytes: &[u8], i: &mut usize) -> Result<Vec<u8>, DecodeError> {
    let len = read_u32_be(bytes, i)? as usize;
    read_vec(bytes, i, len)
}

/// `u16` length prefix followed by UTF-8.
pub fn read_string(bytes: &[u8], i: &mut usize, field: &'static str) -> Result<String, DecodeError> {
    let len = read_u16_be(bytes, i)? as usize;
    let raw = take(bytes, i, len)?;
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8(field))
}

pub fn read_address(bytes: &[u8], i: &mut usize) -> Result<Address, DecodeError> {
    decode_address(take(bytes, i, ADDRESS_LEN)?)
}

pub fn read_b32(bytes: &[u8], i: &mut usize) -> Result<B256, DecodeError> {
    Ok(B256::from_slice(take(bytes, i, WORD_LEN)?))
}

/// `u8` length prefix followed by a canonical minimal amount.
pub fn read_amount(bytes: &[u8], i: &mut usize) -> Result<U256, DecodeError> {
    let len = read_u8(bytes, i)? as usize;
    decode_amount(take(bytes, i, len)?)
}

/// `0x00` for absent, `0x01` followed by the value when present.
pub fn read_option<T>(
    bytes: &[u8],
    i: &mut usize,
    read: impl FnOnce(&[u8], &mut usize) -> Result<T, DecodeError>,
) -> Result<Option<T>, DecodeError> {
    match read_u8(bytes, i)? {
        OPTION_NONE => Ok(None),
        OPTION_SOME => read(bytes, i).map(Some),
        other => Err(DecodeError::InvalidOptionFlag(other)),
    }
}

/// Reject anything left over once a record has been fully parsed.
pub fn expect_end(bytes: &[u8], i: usize) -> Result<(), DecodeError> {
    if i != bytes.len() {
        return Err(DecodeError::TrailingBytes(bytes.len() - i));
    }
    Ok(())
}

pub fn write_blob(buf: &mut Vec<u8>, data: &[u8]) -> Result<(), EncodeError> {
    let len = u32::try_from(data.len()).map_err(|_| EncodeError::FieldTooLarge {
        len: data.len(),
        max: u32::MAX as usize,
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(data);
    Ok(())
}

pub fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<(), EncodeError> {
    let len = u16::try_from(s.len()).map_err(|_| EncodeError::FieldTooLarge {
        len: s.len(),
        max: u16::MAX as usize,
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

pub fn write_amount(buf: &mut Vec<u8>, value: &U256) {
    let amount = encode_amount(value);
    // At most 32 bytes, so the length always fits the u8 prefix.
    buf.push(amount.len() as u8);
    buf.extend_from_slice(&amount);
}

pub fn write_option_address(buf: &mut Vec<u8>, address: Option<&Address>) {
    match address {
        Some(address) => {
            buf.push(OPTION_SOME);
            buf.extend_from_slice(address.as_slice());
        }
        None => buf.push(OPTION_NONE),
    }
}

pub fn write_option_flag(buf: &mut Vec<u8>, present: bool) {
    buf.push(if present { OPTION_SOME } else { OPTION_NONE });
}
