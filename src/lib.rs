//! Light-client ProgPoW verifier for the Quai network.
//!
//! Given a mined work-object header, this crate recomputes the ProgPoW
//! mix hash and final PoW hash from the epoch's light cache, checks the
//! mix hash against the value claimed in the header, and checks the PoW
//! hash against the difficulty target `2^256 / difficulty`.
//!
//! The epoch schedule is keyed by the header's prime-terminus number,
//! not its block number, and the seal hash is the Blake3-256 digest of
//! the canonical header encoding with `mixHash` and `nonce` left out.
//! Both choices are consensus behavior and must not be "fixed".
//!
//! ```no_run
//! use quai_progpow::Progpow;
//!
//! let pow = Progpow::new();
//! let header_hash = [0u8; 32];
//! let computed = pow.compute(&header_hash, 0x1234, 1_000, 900).unwrap();
//! println!("mix hash: {}", hex::encode(computed.mix_hash));
//! ```

pub mod cache;
pub mod compute;
pub mod error;
pub mod input;
pub mod keccak;
pub mod progpow;
pub mod seal;
pub mod seed_compute;
pub mod shared;
pub mod verify;

pub use crate::error::Error;
pub use crate::input::NonceInput;
pub use crate::seal::{seal_hash, SealHash, WorkObjectHeader};
pub use crate::shared::H256;
pub use crate::verify::{
	algorithm_info, difficulty_to_target, AlgorithmInfo, Computed, Progpow, SealedVerdict,
	Verified,
};

#[cfg(test)]
mod test {
	use crate::input::{decode_difficulty, decode_hash32, decode_nonce, NonceInput};
	use crate::seal::WorkObjectHeader;
	use crate::verify::Progpow;

	use ethereum_types::U256;

	// A block-shaped record in the form hosts deliver: hex strings with
	// assorted prefixes and cases. The prime-terminus number keeps the
	// record in epoch 0 so the whole module works from one light cache.
	const BLOCK_FIXTURE: &str = r#"{
		"headerHash": "0x4f9c1d2e61e0a4b8cc0d5a8f5e3b7a90122334455667788990aabbccddeeff00",
		"nonce": "0x2d63003c55733665",
		"number": "0x3e8",
		"primeTerminusNumber": "0x64",
		"difficulty": "0x1"
	}"#;

	fn fixture() -> (crate::H256, u64, u64, u64, U256) {
		let record: serde_json::Value = serde_json::from_str(BLOCK_FIXTURE).unwrap();
		let header_hash =
			decode_hash32("header_hash", record["headerHash"].as_str().unwrap()).unwrap();
		let nonce =
			decode_nonce(&NonceInput::Text(record["nonce"].as_str().unwrap())).unwrap();
		let number = u64::from_str_radix(
			record["number"].as_str().unwrap().trim_start_matches("0x"),
			16,
		)
		.unwrap();
		let prime_terminus = u64::from_str_radix(
			record["primeTerminusNumber"].as_str().unwrap().trim_start_matches("0x"),
			16,
		)
		.unwrap();
		let difficulty =
			decode_difficulty(record["difficulty"].as_str().unwrap()).unwrap();
		(header_hash, nonce, number, prime_terminus, difficulty)
	}

	#[test]
	fn test_compute_and_verify_end_to_end() {
		let (header_hash, nonce, number, prime_terminus, difficulty) = fixture();
		let pow = Progpow::new();

		// Deterministic across repeated calls.
		let computed = pow.compute(&header_hash, nonce, number, prime_terminus).unwrap();
		let again = pow.compute(&header_hash, nonce, number, prime_terminus).unwrap();
		assert_eq!(computed.mix_hash, again.mix_hash);
		assert_eq!(computed.pow_hash, again.pow_hash);

		// Schedule values for epoch 0.
		assert_eq!(computed.epoch, 0);
		assert_eq!(computed.cache_size, 16776896);
		assert_eq!(computed.dataset_size, 1073739904);

		// The block number plays no role; the prime terminus does.
		let other_number =
			pow.compute(&header_hash, nonce, number + 7, prime_terminus).unwrap();
		assert_eq!(other_number.mix_hash, computed.mix_hash);
		let other_terminus =
			pow.compute(&header_hash, nonce, number, prime_terminus + 100).unwrap();
		assert_ne!(other_terminus.mix_hash, computed.mix_hash);

		// Hex form does not matter, only the value does.
		let shouty = format!("0X{}", hex::encode_upper(header_hash));
		let reparsed = decode_hash32("header_hash", &shouty).unwrap();
		assert_eq!(reparsed, header_hash);

		// Nonce forms agree.
		assert_eq!(
			decode_nonce(&NonceInput::Number(nonce)).unwrap(),
			decode_nonce(&NonceInput::Text(&format!("{}", nonce))).unwrap(),
		);

		// Verifying the computed mix hash at difficulty one succeeds on
		// both sub-checks.
		let verdict = pow
			.verify(&header_hash, nonce, number, prime_terminus, &computed.mix_hash, difficulty)
			.unwrap();
		assert!(verdict.valid);
		assert!(verdict.mix_hash_valid);
		assert!(verdict.pow_valid);
		assert_eq!(verdict.computed_mix_hash, computed.mix_hash);
		assert_eq!(verdict.pow_hash, computed.pow_hash);

		// Tampered nonce: the recomputed mix no longer matches.
		let verdict = pow
			.verify(&header_hash, nonce ^ 1, number, prime_terminus, &computed.mix_hash, difficulty)
			.unwrap();
		assert!(!verdict.valid);
		assert!(!verdict.mix_hash_valid);

		// Tampered header hash.
		let mut tampered_header = header_hash;
		tampered_header[0] ^= 0x80;
		let verdict = pow
			.verify(&tampered_header, nonce, number, prime_terminus, &computed.mix_hash, difficulty)
			.unwrap();
		assert!(!verdict.valid);

		// Tampered claimed mix hash.
		let mut tampered_mix = computed.mix_hash;
		tampered_mix[31] ^= 0x01;
		let verdict = pow
			.verify(&header_hash, nonce, number, prime_terminus, &tampered_mix, difficulty)
			.unwrap();
		assert!(!verdict.valid);
		assert!(!verdict.mix_hash_valid);
		assert!(verdict.pow_valid);

		// An absurd difficulty fails the target check without touching
		// the mix comparison.
		let verdict = pow
			.verify(&header_hash, nonce, number, prime_terminus, &computed.mix_hash, U256::MAX)
			.unwrap();
		assert!(!verdict.valid);
		assert!(verdict.mix_hash_valid);
		assert!(!verdict.pow_valid);

		// Difficulty zero is an input error, not an invalid block.
		assert!(pow
			.verify(&header_hash, nonce, number, prime_terminus, &computed.mix_hash, U256::zero())
			.is_err());
	}

	#[test]
	fn test_verify_full_seal_round_trip() {
		let pow = Progpow::new();

		let mut header = WorkObjectHeader {
			header_hash: Some([0x11u8; 32]),
			parent_hash: Some([0x22u8; 32]),
			number: Some(vec![0x03, 0xe8]),
			difficulty: Some(vec![0x01]),
			tx_hash: Some([0x33u8; 32]),
			prime_terminus_number: Some(vec![0x64]),
			location: Some(vec![0x00, 0x00]),
			lock: 0,
			primary_coinbase: Some(vec![0x44; 20]),
			time: 1_700_000_000,
			data: None,
			mix_hash: None,
			nonce: Some(0x0123_4567_89ab_cdef),
		};

		// Missing mix hash is a length error, not a zero-filled pass.
		assert!(pow.verify_full(&header).is_err());

		// Seal the header, then adopt the recomputed mix hash, which
		// must verify at difficulty one.
		let sealed = crate::seal::seal_hash(&header).unwrap();
		let computed = pow
			.compute(&sealed.hash, header.nonce.unwrap(), 1000, 100)
			.unwrap();
		header.mix_hash = Some(computed.mix_hash);

		let outcome = pow.verify_full(&header).unwrap();
		assert_eq!(outcome.seal.hash, sealed.hash);
		assert_eq!(outcome.seal.encoded, sealed.encoded);
		assert!(outcome.verdict.valid);
		assert!(outcome.verdict.mix_hash_valid);
		assert!(outcome.verdict.pow_valid);

		// Re-hashing the returned encoding reproduces the seal hash.
		assert_eq!(*blake3::hash(&sealed.encoded).as_bytes(), sealed.hash);

		// Any header field that feeds the seal changes the verdict.
		let mut tampered = header.clone();
		tampered.time += 1;
		let outcome = pow.verify_full(&tampered).unwrap();
		assert!(!outcome.verdict.valid);
	}
}
