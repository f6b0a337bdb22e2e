//! Host-boundary parsing.
//!
//! Hosts hand the verifier hex strings and loosely typed numbers; this
//! adapter normalizes them into the byte arrays and integers the core
//! operates on. Hex is case-insensitive, the `0x` prefix is optional,
//! and odd-length strings are left-padded with a single zero nibble.
//! Malformed input is always an explicit error, never a silent zero.

use crate::error::Error;
use crate::shared::H256;

use ethereum_types::U256;

fn strip_prefix(s: &str) -> &str {
	if s.len() >= 2 && (s.starts_with("0x") || s.starts_with("0X")) {
		&s[2..]
	} else {
		s
	}
}

/// Decode a hex string into bytes.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
	let digits = strip_prefix(s);
	let padded;
	let digits = if digits.len() % 2 == 1 {
		padded = format!("0{}", digits);
		&padded
	} else {
		digits
	};
	hex::decode(digits).map_err(|_| Error::BadHex(s.to_string()))
}

pub fn encode_hex(bytes: &[u8]) -> String {
	hex::encode(bytes)
}

/// Decode a 32-byte hash, e.g. a header hash or claimed mix hash.
pub fn decode_hash32(field: &'static str, s: &str) -> Result<H256, Error> {
	let bytes = decode_hex(s)?;
	if bytes.len() != 32 {
		return Err(Error::BadLength { field, expected: 32, got: bytes.len() });
	}
	let mut hash = [0u8; 32];
	hash.copy_from_slice(&bytes);
	Ok(hash)
}

/// A nonce as hosts supply it: a native integer, or a string for
/// runtimes whose numbers cannot hold 64 bits losslessly.
pub enum NonceInput<'a> {
	Number(u64),
	Text(&'a str),
}

/// Parse a nonce. `0x`-prefixed strings are hex, bare strings are
/// decimal; values that do not fit 64 bits are rejected rather than
/// rounded.
pub fn decode_nonce(input: &NonceInput) -> Result<u64, Error> {
	match *input {
		NonceInput::Number(n) => Ok(n),
		NonceInput::Text(s) => {
			if s.starts_with("0x") || s.starts_with("0X") {
				u64::from_str_radix(&s[2..], 16).map_err(|_| Error::BadHex(s.to_string()))
			} else {
				s.parse::<u64>().map_err(|_| Error::BadHex(s.to_string()))
			}
		}
	}
}

/// Parse a difficulty given as a decimal or `0x`-prefixed hex string.
pub fn decode_difficulty(s: &str) -> Result<U256, Error> {
	if s.starts_with("0x") || s.starts_with("0X") {
		U256::from_str_radix(&s[2..], 16).map_err(|_| Error::BadHex(s.to_string()))
	} else {
		U256::from_dec_str(s).map_err(|_| Error::BadHex(s.to_string()))
	}
}

/// Decode a variable-width unsigned quantity (block number,
/// difficulty, prime-terminus number) into its big-endian bytes.
pub fn decode_quantity(s: &str) -> Result<Vec<u8>, Error> {
	decode_hex(s)
}

/// Interpret big-endian quantity bytes as a u64, rejecting values that
/// overflow it.
pub fn quantity_to_u64(field: &'static str, bytes: &[u8]) -> Result<u64, Error> {
	let trimmed: &[u8] = {
		let mut rest = bytes;
		while let Some((&0, tail)) = rest.split_first() {
			rest = tail;
		}
		rest
	};
	if trimmed.len() > 8 {
		return Err(Error::BadLength { field, expected: 8, got: trimmed.len() });
	}
	let mut out = [0u8; 8];
	out[8 - trimmed.len()..].copy_from_slice(trimmed);
	Ok(u64::from_be_bytes(out))
}
