//! Constants and shared data types for the verifier.

use primal::is_prime;

/// Blocks per epoch. The cache, cDAG and seed are all keyed by epoch.
pub const EPOCH_LENGTH: u64 = 388_800;

/// Length of a cache/DAG item in bytes.
pub const NODE_BYTES: usize = 64;
/// Number of 32-bit words in a cache/DAG item.
pub const NODE_WORDS: usize = NODE_BYTES / 4;

/// Width of the dataset sieve unit in bytes.
pub const MIX_BYTES: u64 = 128;

/// Number of parents mixed into each DAG item.
pub const DATASET_PARENTS: u32 = 256;
/// RandMemoHash rounds applied to the cache.
pub const CACHE_ROUNDS: usize = 3;

pub const CACHE_BYTES_INIT: u64 = 1 << 24;
pub const CACHE_BYTES_GROWTH: u64 = 1 << 17;
pub const DATASET_BYTES_INIT: u64 = 1 << 30;
pub const DATASET_BYTES_GROWTH: u64 = 1 << 23;

pub const PROGPOW_PERIOD: u64 = 10;
pub const PROGPOW_LANES: usize = 16;
pub const PROGPOW_REGS: usize = 32;
pub const PROGPOW_CACHE_BYTES: usize = 16 * 1024;
pub const PROGPOW_CACHE_WORDS: usize = PROGPOW_CACHE_BYTES / 4;
pub const PROGPOW_CNT_DAG: u32 = 64;
pub const PROGPOW_CNT_CACHE: usize = 11;
pub const PROGPOW_CNT_MATH: usize = 18;
pub const PROGPOW_DAG_LOADS: usize = 4;

pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
pub const FNV_PRIME: u32 = 0x0100_0193;

pub type H256 = [u8; 32];

/// The cDAG read by the main loop's cache ops.
pub type CDag = Vec<u32>;

/// A 64-byte cache or DAG item. All word views are little-endian.
#[derive(Clone)]
pub struct Node {
	pub bytes: [u8; NODE_BYTES],
}

impl Default for Node {
	fn default() -> Self {
		Node { bytes: [0u8; NODE_BYTES] }
	}
}

impl Node {
	pub fn from_bytes(bytes: [u8; NODE_BYTES]) -> Self {
		Node { bytes }
	}

	pub fn word(&self, i: usize) -> u32 {
		let off = i * 4;
		u32::from_le_bytes([
			self.bytes[off],
			self.bytes[off + 1],
			self.bytes[off + 2],
			self.bytes[off + 3],
		])
	}

	pub fn set_word(&mut self, i: usize, w: u32) {
		let off = i * 4;
		self.bytes[off..off + 4].copy_from_slice(&w.to_le_bytes());
	}

	pub fn as_words(&self) -> [u32; NODE_WORDS] {
		let mut words = [0u32; NODE_WORDS];
		for (i, w) in words.iter_mut().enumerate() {
			*w = self.word(i);
		}
		words
	}
}

/// Pack 16 little-endian words back into item bytes.
pub fn words_to_bytes(words: &[u32; NODE_WORDS]) -> [u8; NODE_BYTES] {
	let mut bytes = [0u8; NODE_BYTES];
	for (i, w) in words.iter().enumerate() {
		bytes[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
	}
	bytes
}

pub fn epoch(block_number: u64) -> u64 {
	block_number / EPOCH_LENGTH
}

/// First block of an epoch as fed to the size schedule. The schedule is
/// evaluated at `epoch * EPOCH_LENGTH + 1`, mirroring how the epoch is
/// re-derived from the prime-terminus number.
pub fn epoch_base_block(epoch: u64) -> u64 {
	epoch * EPOCH_LENGTH + 1
}

/// Size of the light cache for the epoch of `block_number`, in bytes.
/// Linear growth with the largest step-down that keeps `size / 64` prime.
pub fn cache_size(block_number: u64) -> u64 {
	let node_bytes = NODE_BYTES as u64;
	let mut size =
		CACHE_BYTES_INIT + CACHE_BYTES_GROWTH * epoch(block_number) - node_bytes;
	while !is_prime(size / node_bytes) {
		size -= 2 * node_bytes;
	}
	size
}

/// Size of the full dataset for the epoch of `block_number`, in bytes.
/// Never materialized by this verifier; it only bounds the item indices
/// of the main loop's DAG loads.
pub fn dataset_size(block_number: u64) -> u64 {
	let mut size =
		DATASET_BYTES_INIT + DATASET_BYTES_GROWTH * epoch(block_number) - MIX_BYTES;
	while !is_prime(size / MIX_BYTES) {
		size -= 2 * MIX_BYTES;
	}
	size
}
