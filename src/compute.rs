//! On-demand DAG item generation and the cDAG derived from it.
//!
//! The verifier never materializes the dataset: every 64-byte item the
//! main loop touches is recomputed here from the light cache.

use crate::keccak::keccak_512;
use crate::shared::{
	words_to_bytes, CDag, Node, DATASET_PARENTS, FNV_PRIME, NODE_WORDS, PROGPOW_CACHE_WORDS,
};

use crunchy::unroll;

#[inline(always)]
pub fn fnv1(u: u32, v: u32) -> u32 {
	u.wrapping_mul(FNV_PRIME) ^ v
}

#[inline(always)]
pub fn fnv1a(h: u32, d: u32) -> u32 {
	(h ^ d).wrapping_mul(FNV_PRIME)
}

/// Generate the DAG item at `index` from the light cache.
///
/// Seeds a 16-word mix from `cache[index % n]` with the index folded
/// into word 0, hashes it, FNV-mixes 256 pseudo-randomly selected
/// parent items into it, and hashes once more.
pub fn calculate_dag_item(index: u32, cache: &[Node]) -> Node {
	let num_parent_nodes = cache.len();

	let init = &cache[index as usize % num_parent_nodes];
	let mut mix = init.clone();
	mix.set_word(0, mix.word(0) ^ index);
	keccak_512::inplace(&mut mix.bytes);

	let mut words = mix.as_words();
	for parent in 0..DATASET_PARENTS {
		let parent_index = fnv1(index ^ parent, words[parent as usize % NODE_WORDS])
			as usize % num_parent_nodes;
		let parent_words = cache[parent_index].as_words();
		unroll! {
			for w in 0..16 {
				words[w] = fnv1(words[w], parent_words[w]);
			}
		}
	}

	let mut out = Node::from_bytes(words_to_bytes(&words));
	keccak_512::inplace(&mut out.bytes);
	out
}

/// Derive the 16 KiB cDAG read by the main loop's cache ops: the first
/// `PROGPOW_CACHE_WORDS / 16` DAG items laid out word by word.
pub fn generate_cdag(cache: &[Node]) -> CDag {
	let mut c_dag = vec![0u32; PROGPOW_CACHE_WORDS];
	for i in 0..PROGPOW_CACHE_WORDS / NODE_WORDS {
		let item = calculate_dag_item(i as u32, cache);
		for j in 0..NODE_WORDS {
			c_dag[i * NODE_WORDS + j] = item.word(j);
		}
	}
	c_dag
}
