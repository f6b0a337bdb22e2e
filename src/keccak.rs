//! Keccak-256 and Keccak-512 with the pre-SHA3 0x01 padding used by
//! Ethereum-family chains.

pub type H256 = [u8; 32];
pub type H512 = [u8; 64];

pub mod keccak_512 {
	use tiny_keccak::{Hasher, Keccak};

	pub fn write(input: &[u8], output: &mut [u8]) {
		let mut keccak = Keccak::v512();
		keccak.update(input);
		keccak.finalize(output);
	}

	pub fn inplace(data: &mut [u8]) {
		let mut out = [0u8; 64];
		write(data, &mut out);
		data.copy_from_slice(&out);
	}

	pub fn digest(input: &[u8]) -> super::H512 {
		let mut out = [0u8; 64];
		write(input, &mut out);
		out
	}
}

pub mod keccak_256 {
	use tiny_keccak::{Hasher, Keccak};

	pub fn write(input: &[u8], output: &mut [u8]) {
		let mut keccak = Keccak::v256();
		keccak.update(input);
		keccak.finalize(output);
	}

	pub fn inplace(data: &mut [u8]) {
		let mut out = [0u8; 32];
		write(data, &mut out);
		data.copy_from_slice(&out);
	}

	pub fn digest(input: &[u8]) -> super::H256 {
		let mut out = [0u8; 32];
		write(input, &mut out);
		out
	}
}
