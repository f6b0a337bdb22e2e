//! Epoch light-cache generation and the process-wide epoch store.

use crate::compute::generate_cdag;
use crate::keccak::{keccak_512, H256};
use crate::seed_compute::SeedHashCompute;
use crate::shared::{self, CDag, Node, CACHE_ROUNDS, NODE_BYTES};

use log::{debug, info};
use parking_lot::Mutex;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Epochs kept in the store before the oldest is evicted.
const MAX_CACHED_EPOCHS: usize = 3;

/// Everything the verifier needs for one epoch: the light cache, the
/// cDAG derived from it, and the size schedule values. Immutable once
/// built; shared read-only between concurrent verifications.
pub struct EpochCache {
	epoch: u64,
	cache: Vec<Node>,
	c_dag: CDag,
	cache_size: u64,
	dataset_size: u64,
}

impl EpochCache {
	pub fn build(epoch: u64, seed: H256) -> Self {
		let base_block = shared::epoch_base_block(epoch);
		let cache_size = shared::cache_size(base_block);
		let dataset_size = shared::dataset_size(base_block);

		let start = Instant::now();
		let cache = generate_cache(cache_size as usize, &seed);
		info!(
			"generated light cache: epoch={} size={} elapsed={:?}",
			epoch,
			cache_size,
			start.elapsed()
		);

		let start = Instant::now();
		let c_dag = generate_cdag(&cache);
		debug!("generated cdag: epoch={} elapsed={:?}", epoch, start.elapsed());

		EpochCache { epoch, cache, c_dag, cache_size, dataset_size }
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub fn nodes(&self) -> &[Node] {
		&self.cache
	}

	pub fn c_dag(&self) -> &[u32] {
		&self.c_dag
	}

	pub fn cache_size(&self) -> u64 {
		self.cache_size
	}

	pub fn dataset_size(&self) -> u64 {
		self.dataset_size
	}

	/// Number of 64-byte items in the full dataset for this epoch.
	pub fn dataset_items(&self) -> u32 {
		(self.dataset_size / NODE_BYTES as u64) as u32
	}
}

/// Generate the light cache for a seed: a Keccak-512 chain over the
/// items followed by three RandMemoHash rounds.
fn generate_cache(cache_size: usize, seed: &H256) -> Vec<Node> {
	debug_assert!(cache_size % NODE_BYTES == 0);
	let num_nodes = cache_size / NODE_BYTES;
	let mut nodes: Vec<Node> = Vec::with_capacity(num_nodes);

	let mut first = Node::default();
	keccak_512::write(&seed[..], &mut first.bytes);
	nodes.push(first);
	for i in 1..num_nodes {
		let mut next = Node::default();
		keccak_512::write(&nodes[i - 1].bytes, &mut next.bytes);
		nodes.push(next);
	}

	for _ in 0..CACHE_ROUNDS {
		for i in 0..num_nodes {
			let data_idx = nodes[i].word(0) as usize % num_nodes;
			let prev_idx = (i + num_nodes - 1) % num_nodes;
			let mut src = [0u8; NODE_BYTES];
			for b in 0..NODE_BYTES {
				src[b] = nodes[prev_idx].bytes[b] ^ nodes[data_idx].bytes[b];
			}
			keccak_512::write(&src, &mut nodes[i].bytes);
		}
	}

	nodes
}

/// Lazily builds and memoizes `EpochCache`s. Holds a bounded number of
/// epochs and evicts the lowest one first; hosts wanting a different
/// policy can pre-build and hold their own `Arc`s.
pub struct CacheBuilder {
	seedhash: Mutex<SeedHashCompute>,
	caches: Mutex<HashMap<u64, Arc<EpochCache>>>,
}

impl Default for CacheBuilder {
	fn default() -> Self {
		CacheBuilder::new()
	}
}

impl CacheBuilder {
	pub fn new() -> Self {
		CacheBuilder {
			seedhash: Mutex::new(SeedHashCompute::default()),
			caches: Mutex::new(HashMap::new()),
		}
	}

	pub fn get(&self, epoch: u64) -> Arc<EpochCache> {
		if let Some(cache) = self.caches.lock().get(&epoch) {
			return cache.clone();
		}

		let seed = self.seedhash.lock().hash_epoch(epoch);
		let built = Arc::new(EpochCache::build(epoch, seed));

		let mut caches = self.caches.lock();
		// Another thread may have built the same epoch meanwhile.
		let cache = caches.entry(epoch).or_insert_with(|| built).clone();
		while caches.len() > MAX_CACHED_EPOCHS {
			let oldest = *caches.keys().min().expect("map is non-empty");
			caches.remove(&oldest);
		}
		cache
	}
}
