//! The verifier facade: recompute the mix hash and PoW hash for a
//! sealed header and check them against the claimed values and the
//! difficulty target.

use crate::cache::{CacheBuilder, EpochCache};
use crate::error::Error;
use crate::input::quantity_to_u64;
use crate::progpow::progpow_light;
use crate::seal::{self, SealHash, WorkObjectHeader};
use crate::shared::{
	self, H256, PROGPOW_CACHE_BYTES, PROGPOW_DAG_LOADS, PROGPOW_LANES, PROGPOW_REGS,
};

use ethereum_types::{U256, U512};

use std::sync::Arc;

/// Output of `compute`: the recomputed hashes plus the epoch schedule
/// values they were derived under.
#[derive(Clone)]
pub struct Computed {
	pub mix_hash: H256,
	pub pow_hash: H256,
	pub epoch: u64,
	pub cache_size: u64,
	pub dataset_size: u64,
}

/// Output of `verify`. `valid` is the conjunction of the two
/// sub-checks; a `false` here is a successful call, not an error.
#[derive(Clone)]
pub struct Verified {
	pub valid: bool,
	pub mix_hash_valid: bool,
	pub pow_valid: bool,
	pub computed_mix_hash: H256,
	pub pow_hash: H256,
	pub target: U512,
	pub difficulty: U256,
}

/// Output of `verify_full`: the seal hash the verdict was computed
/// against, alongside the verdict itself.
pub struct SealedVerdict {
	pub seal: SealHash,
	pub verdict: Verified,
}

/// Static description of the algorithm, for host introspection.
pub struct AlgorithmInfo {
	pub algorithm: &'static str,
	pub epoch_length: u64,
	pub cache_bytes: usize,
	pub lanes: usize,
	pub regs: usize,
	pub dag_loads: usize,
}

pub fn algorithm_info() -> AlgorithmInfo {
	AlgorithmInfo {
		algorithm: "ProgPoW",
		epoch_length: shared::EPOCH_LENGTH,
		cache_bytes: PROGPOW_CACHE_BYTES,
		lanes: PROGPOW_LANES,
		regs: PROGPOW_REGS,
		dag_loads: PROGPOW_DAG_LOADS,
	}
}

/// `floor(2^256 / difficulty)`. Needs 512-bit headroom: at difficulty
/// one the target is `2^256` itself, one bit past `U256`.
pub fn difficulty_to_target(difficulty: U256) -> Result<U512, Error> {
	if difficulty.is_zero() {
		return Err(Error::BadDifficulty);
	}
	Ok((U512::one() << 256) / U512::from(difficulty))
}

/// Stateful verifier. Holds the epoch store; everything else is pure.
/// Cheap to share behind an `Arc` across threads.
pub struct Progpow {
	builder: CacheBuilder,
}

impl Default for Progpow {
	fn default() -> Self {
		Progpow::new()
	}
}

impl Progpow {
	pub fn new() -> Self {
		Progpow { builder: CacheBuilder::new() }
	}

	/// Pre-build (or fetch) the cache and cDAG for an epoch so that
	/// later `verify` calls on that epoch do not block on generation.
	pub fn build_cache(&self, epoch: u64) -> Arc<EpochCache> {
		self.builder.get(epoch)
	}

	/// Recompute the mix hash and PoW hash for a sealed header.
	///
	/// The prime-terminus number keys the epoch schedule *and* acts as
	/// the block number inside the loop; `block_number` is accepted
	/// for interface parity but does not influence the result.
	pub fn compute(
		&self,
		header_hash: &H256,
		nonce: u64,
		_block_number: u64,
		prime_terminus_number: u64,
	) -> Result<Computed, Error> {
		let epoch = shared::epoch(prime_terminus_number);
		let cache = self.builder.get(epoch);
		let (mix_hash, pow_hash) =
			progpow_light(&cache, header_hash, nonce, prime_terminus_number);
		Ok(Computed {
			mix_hash,
			pow_hash,
			epoch,
			cache_size: cache.cache_size(),
			dataset_size: cache.dataset_size(),
		})
	}

	/// Full verification: recompute both hashes, compare the mix hash
	/// with the claimed one and the PoW hash with the target.
	pub fn verify(
		&self,
		header_hash: &H256,
		nonce: u64,
		block_number: u64,
		prime_terminus_number: u64,
		mix_hash: &H256,
		difficulty: U256,
	) -> Result<Verified, Error> {
		let target = difficulty_to_target(difficulty)?;
		let computed =
			self.compute(header_hash, nonce, block_number, prime_terminus_number)?;

		let mix_hash_valid = computed.mix_hash == *mix_hash;
		let pow_value = U512::from(U256::from_big_endian(&computed.pow_hash));
		let pow_valid = pow_value <= target;

		Ok(Verified {
			valid: mix_hash_valid && pow_valid,
			mix_hash_valid,
			pow_valid,
			computed_mix_hash: computed.mix_hash,
			pow_hash: computed.pow_hash,
			target,
			difficulty,
		})
	}

	/// Seal-hash a work-object header and verify it against its own
	/// nonce, numbers, mix hash and difficulty.
	pub fn verify_full(&self, header: &WorkObjectHeader) -> Result<SealedVerdict, Error> {
		let sealed = seal::seal_hash(header)?;

		let mix_hash = header.mix_hash.ok_or(Error::BadLength {
			field: "mix_hash",
			expected: 32,
			got: 0,
		})?;
		let difficulty = match &header.difficulty {
			Some(bytes) => U256::from_big_endian(bytes),
			None => return Err(Error::BadDifficulty),
		};
		let nonce = header.nonce.unwrap_or(0);
		let block_number = match &header.number {
			Some(bytes) => quantity_to_u64("number", bytes)?,
			None => 0,
		};
		let prime_terminus_number = match &header.prime_terminus_number {
			Some(bytes) => quantity_to_u64("primeTerminusNumber", bytes)?,
			None => 0,
		};

		let verdict = self.verify(
			&sealed.hash,
			nonce,
			block_number,
			prime_terminus_number,
			&mix_hash,
			difficulty,
		)?;
		Ok(SealedVerdict { seal: sealed, verdict })
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_target_of_difficulty_one_is_two_pow_256() {
		let target = difficulty_to_target(U256::one()).unwrap();
		assert_eq!(target, U512::one() << 256);
	}

	#[test]
	fn test_target_halves_with_doubled_difficulty() {
		let target = difficulty_to_target(U256::from(2u64)).unwrap();
		assert_eq!(target, U512::one() << 255);
		let hard = difficulty_to_target(U256::MAX).unwrap();
		assert_eq!(hard, U512::one());
	}

	#[test]
	fn test_target_is_monotonic() {
		let easy = difficulty_to_target(U256::from(1000u64)).unwrap();
		let hard = difficulty_to_target(U256::from(2000u64)).unwrap();
		assert!(hard < easy);
	}

	#[test]
	fn test_zero_difficulty_is_an_error() {
		assert_eq!(difficulty_to_target(U256::zero()), Err(Error::BadDifficulty));
	}

	#[test]
	fn test_algorithm_info() {
		let info = algorithm_info();
		assert_eq!(info.algorithm, "ProgPoW");
		assert_eq!(info.lanes, 16);
		assert_eq!(info.regs, 32);
		assert_eq!(info.cache_bytes, 16 * 1024);
		assert_eq!(info.epoch_length, 388_800);
	}
}
