//! The ProgPoW main loop.
//!
//! Each hash runs a deterministic pseudo-random program over a mix
//! state of 16 lanes x 32 registers. The program is a pure function of
//! `(period, iteration)` where `period = block_number / PROGPOW_PERIOD`,
//! so every nonce inside a ten-block window executes the same
//! instruction stream.

use crate::cache::EpochCache;
use crate::compute::{calculate_dag_item, fnv1a};
use crate::keccak::{keccak_256, H256};
use crate::shared::{
	FNV_OFFSET_BASIS, NODE_WORDS, PROGPOW_CACHE_WORDS, PROGPOW_CNT_CACHE, PROGPOW_CNT_DAG,
	PROGPOW_CNT_MATH, PROGPOW_DAG_LOADS, PROGPOW_LANES, PROGPOW_PERIOD, PROGPOW_REGS,
};

use std::convert::TryInto;

/// Marsaglia KISS99. Supplies every random-program index and the
/// initial register values.
struct Kiss99 {
	z: u32,
	w: u32,
	jsr: u32,
	jcong: u32,
}

impl Kiss99 {
	fn next(&mut self) -> u32 {
		self.z = 36969u32.wrapping_mul(self.z & 65535).wrapping_add(self.z >> 16);
		self.w = 18000u32.wrapping_mul(self.w & 65535).wrapping_add(self.w >> 16);
		let mwc = (self.z << 16).wrapping_add(self.w);
		self.jsr ^= self.jsr << 17;
		self.jsr ^= self.jsr >> 13;
		self.jsr ^= self.jsr << 5;
		self.jcong = self.jcong.wrapping_mul(69069).wrapping_add(1234567);
		(mwc ^ self.jcong).wrapping_add(self.jsr)
	}

	/// Seed a generator by chaining FNV1a over the halves of `seed`.
	fn from_seed(seed: u64) -> Self {
		let lo = seed as u32;
		let hi = (seed >> 32) as u32;
		let z = fnv1a(FNV_OFFSET_BASIS, lo);
		let w = fnv1a(z, hi);
		let jsr = fnv1a(w, lo);
		let jcong = fnv1a(jsr, hi);
		Kiss99 { z, w, jsr, jcong }
	}
}

/// Merge `b` into `a`. The operators are chosen to keep entropy in `a`
/// even when `b` is low-entropy.
fn merge(a: u32, b: u32, sel: u32) -> u32 {
	match sel % 4 {
		0 => a.wrapping_mul(33).wrapping_add(b),
		1 => (a ^ b).wrapping_mul(33),
		2 => a.rotate_left(((sel >> 16) % 31) + 1) ^ b,
		_ => a.rotate_right(((sel >> 16) % 31) + 1) ^ b,
	}
}

fn math(a: u32, b: u32, sel: u32) -> u32 {
	match sel % 11 {
		0 => a.wrapping_add(b),
		1 => a.wrapping_mul(b),
		2 => ((u64::from(a) * u64::from(b)) >> 32) as u32,
		3 => a.min(b),
		4 => a.rotate_left(b % 32),
		5 => a.rotate_right(b % 32),
		6 => a & b,
		7 => a | b,
		8 => a ^ b,
		9 => a.leading_zeros() + b.leading_zeros(),
		_ => a.count_ones() + b.count_ones(),
	}
}

/// Seed one lane's 32 registers from the per-hash seed head.
fn fill_mix(seed_head: u64, lane_id: u32) -> [u32; PROGPOW_REGS] {
	let z = fnv1a(FNV_OFFSET_BASIS, seed_head as u32);
	let w = fnv1a(z, (seed_head >> 32) as u32);
	let jsr = fnv1a(w, lane_id);
	let jcong = fnv1a(jsr, lane_id);
	let mut rng = Kiss99 { z, w, jsr, jcong };

	let mut mix = [0u32; PROGPOW_REGS];
	for reg in mix.iter_mut() {
		*reg = rng.next();
	}
	mix
}

enum Instr {
	CacheLoad { src: usize, dst: usize, sel: u32 },
	Math { src1: usize, src2: usize, dst: usize, sel_math: u32, sel_merge: u32 },
}

/// One outer iteration's instruction stream, identical for all lanes.
struct Program {
	body: Vec<Instr>,
	dag_merges: [(usize, u32); PROGPOW_DAG_LOADS],
}

/// Expand `seed` into an instruction stream.
///
/// Destination and cache-source registers come from Fisher-Yates
/// shuffled sequences so that every register is merged exactly once
/// per iteration and no cache read repeats. The draw order (shuffles,
/// then interleaved cache/math selectors, then the DAG merge
/// selectors) is load-bearing: it fixes the program bit-for-bit.
fn generate_program(seed: u64) -> Program {
	let mut rng = Kiss99::from_seed(seed);

	let mut dst_seq = [0usize; PROGPOW_REGS];
	let mut cache_seq = [0usize; PROGPOW_REGS];
	for i in 0..PROGPOW_REGS {
		dst_seq[i] = i;
		cache_seq[i] = i;
	}
	for i in (1..PROGPOW_REGS).rev() {
		let j = rng.next() as usize % (i + 1);
		dst_seq.swap(i, j);
		let j = rng.next() as usize % (i + 1);
		cache_seq.swap(i, j);
	}

	let mut dst_cnt = 0;
	let mut cache_cnt = 0;
	let mut body = Vec::with_capacity(PROGPOW_CNT_CACHE + PROGPOW_CNT_MATH);

	for k in 0..PROGPOW_CNT_CACHE.max(PROGPOW_CNT_MATH) {
		if k < PROGPOW_CNT_CACHE {
			let src = cache_seq[cache_cnt % PROGPOW_REGS];
			cache_cnt += 1;
			let dst = dst_seq[dst_cnt % PROGPOW_REGS];
			dst_cnt += 1;
			let sel = rng.next();
			body.push(Instr::CacheLoad { src, dst, sel });
		}
		if k < PROGPOW_CNT_MATH {
			let src_rnd = rng.next() as usize % ((PROGPOW_REGS - 1) * PROGPOW_REGS);
			let src1 = src_rnd % PROGPOW_REGS;
			let mut src2 = src_rnd / PROGPOW_REGS;
			if src2 >= src1 {
				src2 += 1;
			}
			let sel_math = rng.next();
			let dst = dst_seq[dst_cnt % PROGPOW_REGS];
			dst_cnt += 1;
			let sel_merge = rng.next();
			body.push(Instr::Math { src1, src2, dst, sel_math, sel_merge });
		}
	}

	// The first DAG word always lands in register 0; the rest follow
	// the destination sequence.
	let mut dag_merges = [(0usize, 0u32); PROGPOW_DAG_LOADS];
	dag_merges[0] = (0, rng.next());
	for entry in dag_merges.iter_mut().skip(1) {
		let dst = dst_seq[dst_cnt % PROGPOW_REGS];
		dst_cnt += 1;
		*entry = (dst, rng.next());
	}

	Program { body, dag_merges }
}

impl Program {
	fn apply(&self, regs: &mut [u32; PROGPOW_REGS], c_dag: &[u32], entry: &[u32; NODE_WORDS]) {
		for instr in &self.body {
			match *instr {
				Instr::CacheLoad { src, dst, sel } => {
					let data = c_dag[regs[src] as usize % PROGPOW_CACHE_WORDS];
					regs[dst] = merge(regs[dst], data, sel);
				}
				Instr::Math { src1, src2, dst, sel_math, sel_merge } => {
					let data = math(regs[src1], regs[src2], sel_math);
					regs[dst] = merge(regs[dst], data, sel_merge);
				}
			}
		}
		for (i, &(dst, sel)) in self.dag_merges.iter().enumerate() {
			regs[dst] = merge(regs[dst], entry[i], sel);
		}
	}
}

/// Run ProgPoW for one `(header_hash, nonce)` pair and return the
/// 32-byte mix hash and the final PoW hash.
///
/// `lookup` resolves a 64-byte DAG item index to its 16 words;
/// `dataset_items` is the number of such items in the full dataset.
pub fn progpow<F>(
	header_hash: &H256,
	nonce: u64,
	block_number: u64,
	dataset_items: u32,
	c_dag: &[u32],
	lookup: F,
) -> (H256, H256)
where
	F: Fn(u32) -> [u32; NODE_WORDS],
{
	let mut seed_input = [0u8; 40];
	seed_input[..32].copy_from_slice(header_hash);
	seed_input[32..].copy_from_slice(&nonce.to_le_bytes());
	let seed_hash = keccak_256::digest(&seed_input);
	let seed_head = u64::from_le_bytes(seed_hash[..8].try_into().expect("8-byte prefix"));

	let mut mix = [[0u32; PROGPOW_REGS]; PROGPOW_LANES];
	for (lane, regs) in mix.iter_mut().enumerate() {
		*regs = fill_mix(seed_head, lane as u32);
	}

	let period = block_number / PROGPOW_PERIOD;
	let window = dataset_items / PROGPOW_LANES as u32;
	for i in 0..PROGPOW_CNT_DAG {
		let program = generate_program((u64::from(i) << 32) | period);

		// One lane picks the shared base item; each lane then loads
		// its own 64-byte item from the 16-item window.
		let item_base = (mix[i as usize % PROGPOW_LANES][0] % window) * PROGPOW_LANES as u32;
		let mut entries = [[0u32; NODE_WORDS]; PROGPOW_LANES];
		for (lane, entry) in entries.iter_mut().enumerate() {
			*entry = lookup(item_base + (lane as u32 ^ i) % PROGPOW_LANES as u32);
		}

		for lane in 0..PROGPOW_LANES {
			program.apply(&mut mix[lane], c_dag, &entries[lane]);
		}
	}

	// Reduce each lane to one word, then the lanes to eight.
	let mut digest = [FNV_OFFSET_BASIS; 8];
	for (lane, regs) in mix.iter().enumerate() {
		let mut lane_hash = FNV_OFFSET_BASIS;
		for reg in regs.iter() {
			lane_hash = fnv1a(lane_hash, *reg);
		}
		digest[lane % 8] = fnv1a(digest[lane % 8], lane_hash);
	}

	let mut mix_hash = [0u8; 32];
	for (i, word) in digest.iter().enumerate() {
		mix_hash[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
	}

	let mut pow_input = [0u8; 72];
	pow_input[..40].copy_from_slice(&seed_input);
	pow_input[40..].copy_from_slice(&mix_hash);
	let pow_hash = keccak_256::digest(&pow_input);

	(mix_hash, pow_hash)
}

/// Light verification path: every DAG item is generated on demand from
/// the epoch's cache.
pub fn progpow_light(
	epoch_cache: &EpochCache,
	header_hash: &H256,
	nonce: u64,
	block_number: u64,
) -> (H256, H256) {
	let nodes = epoch_cache.nodes();
	progpow(
		header_hash,
		nonce,
		block_number,
		epoch_cache.dataset_items(),
		epoch_cache.c_dag(),
		|index| calculate_dag_item(index, nodes).as_words(),
	)
}
