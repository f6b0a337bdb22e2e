//! Canonical work-object header encoding and the Blake3-256 seal hash.
//!
//! The seal hash commits to every header field except `mixHash` and
//! `nonce`, which the seal is mined over. Fields are serialized in
//! protobuf wire format (varint tags, length-delimited values) with
//! fixed field numbers; the two excluded fields keep their numbers
//! reserved so the remaining tags never shift.

use crate::error::Error;
use crate::shared::H256;

/// Largest accepted length for the variable-width integer fields
/// (`number`, `difficulty`, `primeTerminusNumber`).
const MAX_QUANTITY_BYTES: usize = 32;

/// A work-object header as supplied by the host. Every field is
/// optional on the input side; `lock` and `time` default to zero and
/// are always committed to.
#[derive(Clone, Default)]
pub struct WorkObjectHeader {
	pub header_hash: Option<H256>,
	pub parent_hash: Option<H256>,
	/// Big-endian unsigned block number.
	pub number: Option<Vec<u8>>,
	/// Big-endian unsigned difficulty.
	pub difficulty: Option<Vec<u8>>,
	pub tx_hash: Option<H256>,
	/// Big-endian unsigned prime-terminus number.
	pub prime_terminus_number: Option<Vec<u8>>,
	pub location: Option<Vec<u8>>,
	pub lock: u32,
	pub primary_coinbase: Option<Vec<u8>>,
	pub time: u64,
	pub data: Option<Vec<u8>>,
	/// Excluded from the seal; checked by `verify_full`.
	pub mix_hash: Option<H256>,
	/// Excluded from the seal; used by `verify_full`.
	pub nonce: Option<u64>,
}

/// Result of the seal-hash operation. The encoded bytes are exposed so
/// callers can reproduce the digest externally.
pub struct SealHash {
	pub hash: H256,
	pub encoded: Vec<u8>,
}

impl SealHash {
	pub fn encoded_size(&self) -> usize {
		self.encoded.len()
	}

	pub fn encoded_hex(&self) -> String {
		hex::encode(&self.encoded)
	}
}

// Field numbers of the seal encoding. 8 and 9 belong to the excluded
// mixHash/nonce pair and must stay unused.
const FIELD_HEADER_HASH: u32 = 1;
const FIELD_PARENT_HASH: u32 = 2;
const FIELD_NUMBER: u32 = 3;
const FIELD_DIFFICULTY: u32 = 4;
const FIELD_TX_HASH: u32 = 5;
const FIELD_PRIME_TERMINUS_NUMBER: u32 = 6;
const FIELD_LOCATION: u32 = 7;
const FIELD_LOCK: u32 = 10;
const FIELD_PRIMARY_COINBASE: u32 = 11;
const FIELD_TIME: u32 = 12;
const FIELD_DATA: u32 = 13;

const WIRE_VARINT: u32 = 0;
const WIRE_LEN: u32 = 2;

fn put_uvarint(buf: &mut Vec<u8>, mut value: u64) {
	while value >= 0x80 {
		buf.push((value as u8) | 0x80);
		value >>= 7;
	}
	buf.push(value as u8);
}

fn put_tag(buf: &mut Vec<u8>, field: u32, wire: u32) {
	put_uvarint(buf, u64::from(field << 3 | wire));
}

fn put_bytes_field(buf: &mut Vec<u8>, field: u32, value: &[u8]) {
	put_tag(buf, field, WIRE_LEN);
	put_uvarint(buf, value.len() as u64);
	buf.extend_from_slice(value);
}

fn put_varint_field(buf: &mut Vec<u8>, field: u32, value: u64) {
	put_tag(buf, field, WIRE_VARINT);
	put_uvarint(buf, value);
}

/// A nested single-`bytes`-field message (hash, address, location).
/// The inner field is omitted when the value is empty, so an absent
/// value encodes as an empty message.
fn put_wrapped_bytes_field(buf: &mut Vec<u8>, field: u32, value: Option<&[u8]>) {
	let mut inner = Vec::new();
	if let Some(bytes) = value {
		if !bytes.is_empty() {
			put_bytes_field(&mut inner, 1, bytes);
		}
	}
	put_bytes_field(buf, field, &inner);
}

fn check_quantity(name: &'static str, value: &Option<Vec<u8>>) -> Result<(), Error> {
	match value {
		Some(bytes) if bytes.len() > MAX_QUANTITY_BYTES => {
			Err(Error::BadHeader(name))
		}
		_ => Ok(()),
	}
}

/// Serialize the header for sealing, leaving out `mixHash` and `nonce`.
pub fn seal_encode(header: &WorkObjectHeader) -> Result<Vec<u8>, Error> {
	check_quantity("number", &header.number)?;
	check_quantity("difficulty", &header.difficulty)?;
	check_quantity("primeTerminusNumber", &header.prime_terminus_number)?;

	let mut buf = Vec::with_capacity(192);
	put_wrapped_bytes_field(
		&mut buf,
		FIELD_HEADER_HASH,
		header.header_hash.as_ref().map(|h| &h[..]),
	);
	put_wrapped_bytes_field(
		&mut buf,
		FIELD_PARENT_HASH,
		header.parent_hash.as_ref().map(|h| &h[..]),
	);
	if let Some(number) = &header.number {
		put_bytes_field(&mut buf, FIELD_NUMBER, number);
	}
	if let Some(difficulty) = &header.difficulty {
		put_bytes_field(&mut buf, FIELD_DIFFICULTY, difficulty);
	}
	put_wrapped_bytes_field(
		&mut buf,
		FIELD_TX_HASH,
		header.tx_hash.as_ref().map(|h| &h[..]),
	);
	if let Some(prime_terminus) = &header.prime_terminus_number {
		put_bytes_field(&mut buf, FIELD_PRIME_TERMINUS_NUMBER, prime_terminus);
	}
	if let Some(location) = &header.location {
		put_wrapped_bytes_field(&mut buf, FIELD_LOCATION, Some(&location[..]));
	}
	put_varint_field(&mut buf, FIELD_LOCK, u64::from(header.lock));
	put_wrapped_bytes_field(
		&mut buf,
		FIELD_PRIMARY_COINBASE,
		Some(header.primary_coinbase.as_deref().unwrap_or(&[])),
	);
	put_varint_field(&mut buf, FIELD_TIME, header.time);
	if let Some(data) = &header.data {
		put_bytes_field(&mut buf, FIELD_DATA, data);
	}
	Ok(buf)
}

/// Blake3-256 over the canonical seal encoding.
pub fn seal_hash(header: &WorkObjectHeader) -> Result<SealHash, Error> {
	let encoded = seal_encode(header)?;
	let hash: H256 = *blake3::hash(&encoded).as_bytes();
	Ok(SealHash { hash, encoded })
}
