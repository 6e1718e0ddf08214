//! The table itself: lookup/delete engine, insertion engine with random-walk
//! eviction, and the rehash/grow/shrink controller.

use rand_core::{RngCore, SeedableRng};
use rand_pcg::Lcg128Xsl64 as Pcg;

use crate::bucket::Bucket;
use crate::config::{
    BLEN, BMASK, BSHIFT, DEFAULT_LOG_SIZE, MAX_LOG_SIZE, MIN_LOG_SIZE, NHASH, NHASH_MASK,
    NHASH_SHIFT, REHASH_THRESHOLD, SHRINK_FACTOR, WALK_COEFFICIENT,
};
use crate::hash::{self, HashFn};

/// Mixer used to derive candidate buckets; [`hash::murmur3_32`] and
/// [`hash::mem_32`] are drop-in alternates.
const DEFAULT_HASH: HashFn = hash::xx_32;

/// Resize activity counters, kept for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub grows: u32,
    pub shrinks: u32,
    pub rehashes: u32,
}

/// Outcome of a single bounded insertion attempt.
pub(crate) enum Attempt<V> {
    /// The key was already present; carries the replaced value.
    Updated(V),
    /// Placed in a free slot, directly or by the eviction walk.
    Added,
    /// All candidates full and the walk budget ran out; the pair left in
    /// hand is parked in `suspended` for the resize controller.
    Exhausted,
}

/// A space-efficient `u32 -> V` map built on d-ary bucketized cuckoo
/// hashing, also known as splash tables.
///
/// Every key is mapped by `NHASH` seeded hash functions to `NHASH`
/// candidate buckets of `BLEN` slots each; collisions are resolved by a
/// bounded random-walk eviction, and persistent failures reseed the table
/// in place or grow it. There is no per-entry overhead: occupancy is
/// encoded in-band by reserving key 0 as the empty-slot sentinel, while the
/// single user entry with key 0 lives in a dedicated side cell.
///
/// Not thread-safe; wrap it in a lock for parallel use, like the standard
/// library maps.
pub struct CuckooMap<V> {
    buckets: Vec<Bucket<V>>,
    log_size: u32,
    seeds: [u32; NHASH],
    nentries: usize,
    /// The at-most-one entry whose key is 0, held out of band so that key 0
    /// inside `buckets` always means "slot empty".
    zero_cell: Option<V>,
    /// Pair left in hand by a failed eviction walk; always consumed by the
    /// resize controller before a public mutation returns.
    suspended: Option<(u32, V)>,
    stats: Stats,
    rng: Pcg,
}

impl<V: Copy + Default> CuckooMap<V> {
    /// Creates a table with `2^log_size` buckets and entropy-derived seeds.
    ///
    /// # Panics
    ///
    /// Panics if `log_size` exceeds [`MAX_LOG_SIZE`].
    pub fn new(log_size: u32) -> Self {
        Self::with_rng(log_size, Pcg::from_entropy())
    }

    /// Creates a table whose seed and eviction randomness derive from
    /// `seed`, for reproducible tests and benchmarks.
    ///
    /// # Panics
    ///
    /// Panics if `log_size` exceeds [`MAX_LOG_SIZE`].
    pub fn with_seed(log_size: u32, seed: u64) -> Self {
        Self::with_rng(log_size, Pcg::seed_from_u64(seed))
    }

    fn with_rng(log_size: u32, rng: Pcg) -> Self {
        assert!(
            log_size <= MAX_LOG_SIZE,
            "cuckoo-hashmap: log_size {log_size} exceeds the 2^{MAX_LOG_SIZE} bucket limit for u32 keys",
        );
        let mut map = Self {
            buckets: vec![Bucket::empty(); 1usize << log_size],
            log_size,
            seeds: [0; NHASH],
            nentries: 0,
            zero_cell: None,
            suspended: None,
            stats: Stats::default(),
            rng,
        };
        map.reseed();
        map
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.nentries
    }

    pub fn is_empty(&self) -> bool {
        self.nentries == 0
    }

    /// Total number of slots, i.e. `buckets * BLEN`.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * BLEN
    }

    /// Ratio of used slots to allocated slots.
    pub fn load_factor(&self) -> f64 {
        self.nentries as f64 / self.capacity() as f64
    }

    /// Grow/shrink/rehash counters accumulated over the table's lifetime.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Returns the value stored for `key`, or `None` if absent.
    ///
    /// Probing is bounded: at most `NHASH * BLEN` key comparisons.
    pub fn get(&self, key: u32) -> Option<V> {
        if key == 0 {
            return self.zero_cell;
        }
        for hash in self.candidates(key) {
            let b = &self.buckets[hash as usize];
            if let Some(slot) = b.find(key) {
                return Some(b.vals[slot]);
            }
        }
        None
    }

    pub fn contains_key(&self, key: u32) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `key -> value`, replacing and returning any previous value.
    ///
    /// Never fails for a reachable input: a failed placement attempt runs
    /// the resize controller (reseed, then grow by doubling) and retries.
    ///
    /// # Panics
    ///
    /// Panics if the table would have to grow past `2^MAX_LOG_SIZE`
    /// buckets, i.e. the caller has fed it more unique keys than the u32
    /// key space can disambiguate.
    pub fn insert(&mut self, key: u32, value: V) -> Option<V> {
        // An attempt can only exhaust its walk budget for a key that is not
        // yet present, so an update seen on a later pass means the failed
        // walk parked the pair in a bucket; the caller still sees a fresh
        // insertion.
        let mut first_attempt = true;
        loop {
            match self.try_insert(key, value) {
                Attempt::Updated(old) => return first_attempt.then_some(old),
                Attempt::Added => return None,
                Attempt::Exhausted => {
                    first_attempt = false;
                    self.rebuild();
                }
            }
        }
    }

    /// Removes `key`, returning its value; a no-op on absent keys.
    pub fn remove(&mut self, key: u32) -> Option<V> {
        let removed = if key == 0 {
            self.zero_cell.take()
        } else {
            let mut taken = None;
            for hash in self.candidates(key) {
                let b = &mut self.buckets[hash as usize];
                if let Some(slot) = b.find(key) {
                    taken = Some(b.vals[slot]);
                    b.keys[slot] = 0;
                    break;
                }
            }
            taken
        };
        if removed.is_some() {
            self.nentries -= 1;
            self.maybe_shrink();
        }
        removed
    }

    fn reseed(&mut self) {
        for seed in &mut self.seeds {
            *seed = self.rng.next_u32();
        }
    }

    /// The `NHASH` candidate bucket indices for `key`. A tuple, not a set:
    /// duplicate indices are legal and probed like any other candidate.
    fn candidates(&self, key: u32) -> [u32; NHASH] {
        let mask = (1u32 << self.log_size) - 1;
        let mut h = [0u32; NHASH];
        for (hash, seed) in h.iter_mut().zip(self.seeds) {
            *hash = DEFAULT_HASH(key, seed) & mask;
        }
        h
    }

    /// One bounded placement attempt: update in place, take a free slot, or
    /// run the eviction walk. Does not resize.
    pub(crate) fn try_insert(&mut self, key: u32, value: V) -> Attempt<V> {
        if key == 0 {
            return match self.zero_cell.replace(value) {
                Some(old) => Attempt::Updated(old),
                None => {
                    self.nentries += 1;
                    Attempt::Added
                }
            };
        }

        let mut h = self.candidates(key);
        match self.try_update(key, value, &h) {
            Ok(old) => return Attempt::Updated(old),
            Err(Some((hash, slot))) => {
                let b = &mut self.buckets[hash as usize];
                b.keys[slot] = key;
                b.vals[slot] = value;
                self.nentries += 1;
                return Attempt::Added;
            }
            Err(None) => {}
        }

        if self.try_greedy_add(key, value, &mut h) {
            self.nentries += 1;
            Attempt::Added
        } else {
            Attempt::Exhausted
        }
    }

    /// Single pass over all candidate buckets: `Ok(old)` if the key was
    /// present and its value replaced, otherwise `Err` carrying the first
    /// free slot observed, if any.
    fn try_update(&mut self, key: u32, value: V, h: &[u32; NHASH]) -> Result<V, Option<(u32, usize)>> {
        let mut free = None;
        for &hash in h {
            let b = &mut self.buckets[hash as usize];
            for (slot, &k) in b.keys.iter().enumerate() {
                if k == key {
                    let old = b.vals[slot];
                    b.vals[slot] = value;
                    return Ok(old);
                }
                if free.is_none() && k == 0 {
                    free = Some((hash, slot));
                }
            }
        }
        Err(free)
    }

    /// Update-free placement that also refuses the `except` bucket, so an
    /// evicted entry cannot bounce straight back where it came from.
    fn try_add(&mut self, key: u32, value: V, h: &[u32; NHASH], except: Option<u32>) -> bool {
        for &hash in h {
            if except == Some(hash) {
                continue;
            }
            let b = &mut self.buckets[hash as usize];
            if let Some(slot) = b.free_slot() {
                b.keys[slot] = key;
                b.vals[slot] = value;
                return true;
            }
        }
        false
    }

    /// Random-walk eviction, bounded by `(1 + log_size) * WALK_COEFFICIENT`
    /// displacements. On failure the pair still in hand is parked in
    /// `suspended` and false is returned.
    fn try_greedy_add(&mut self, mut key: u32, mut value: V, h: &mut [u32; NHASH]) -> bool {
        let max_steps = (1 + self.log_size as usize) * WALK_COEFFICIENT;

        for _ in 0..max_steps {
            // One draw covers the whole step; see the bit-budget assertion
            // in `config`.
            let mut r = self.rng.next_u64();
            shuffle(h, r);
            r >>= NHASH as u32 * NHASH_SHIFT;
            let slot = (r & BMASK) as usize;
            let d = ((r >> BSHIFT) & NHASH_MASK) as usize;
            let origin = h[d];

            let b = &mut self.buckets[origin as usize];
            let evicted_key = b.keys[slot];
            let evicted_val = b.vals[slot];
            b.keys[slot] = key;
            b.vals[slot] = value;

            let next = self.candidates(evicted_key);
            if self.try_add(evicted_key, evicted_val, &next, Some(origin)) {
                return true;
            }

            // Back where we started, holding a different pair.
            key = evicted_key;
            value = evicted_val;
            *h = next;
        }

        self.suspended = Some((key, value));
        false
    }

    /// Reseed-or-grow loop entered when an attempt exhausts its walk
    /// budget. Under light load a fresh seed tuple usually suffices; above
    /// `REHASH_THRESHOLD` the table goes straight to doubling, escalating
    /// the exponent until a rebuild sticks.
    fn rebuild(&mut self) {
        let mut delta = if self.load_factor() < REHASH_THRESHOLD { 0 } else { 1 };
        while !self.try_resize(delta) {
            delta += 1;
        }
    }

    /// Rebuilds the table with `2^(log_size + delta)` buckets and fresh
    /// seeds, migrating every live entry. Returns false (leaving `self`
    /// untouched) when some entry cannot be placed, or when a shrink would
    /// cross the `MIN_LOG_SIZE` floor.
    ///
    /// # Panics
    ///
    /// Panics when asked to grow past `MAX_LOG_SIZE`.
    pub(crate) fn try_resize(&mut self, delta: i32) -> bool {
        let new_log = self.log_size as i32 + delta;
        if delta < 0 && new_log < MIN_LOG_SIZE as i32 {
            return false;
        }
        assert!(
            new_log <= MAX_LOG_SIZE as i32,
            "cuckoo-hashmap: cannot grow past 2^{MAX_LOG_SIZE} buckets; the u32 key space is exhausted",
        );
        let new_log = new_log as u32;

        let mut stats = self.stats;
        if delta > 0 {
            stats.grows += 1;
        } else if delta < 0 {
            stats.shrinks += 1;
        } else {
            stats.rehashes += 1;
        }

        let mut next = Self {
            buckets: vec![Bucket::empty(); 1usize << new_log],
            log_size: new_log,
            seeds: [0; NHASH],
            nentries: self.nentries,
            zero_cell: self.zero_cell,
            suspended: self.suspended,
            stats,
            rng: Pcg::seed_from_u64(self.rng.next_u64()),
        };
        next.reseed();

        // Re-add every live entry under the fresh seeds. Rehashing the lot
        // buys better load factors at the price of CPU time.
        for bi in 0..self.buckets.len() {
            for slot in 0..BLEN {
                let key = self.buckets[bi].keys[slot];
                if key == 0 {
                    continue;
                }
                let value = self.buckets[bi].vals[slot];
                let mut h = next.candidates(key);
                if next.try_add(key, value, &h, None) {
                    continue;
                }
                if !next.try_greedy_add(key, value, &mut h) {
                    return false;
                }
            }
        }

        // The pair a failed walk left in hand goes in last; dropping it
        // would break the uniqueness and size invariants.
        if let Some((skey, svalue)) = next.suspended.take() {
            if matches!(next.try_insert(skey, svalue), Attempt::Exhausted) {
                return false;
            }
        }

        *self = next;
        true
    }

    fn maybe_shrink(&mut self) {
        if SHRINK_FACTOR == 0 || self.nentries >= self.capacity() >> SHRINK_FACTOR {
            return;
        }
        // Most aggressive delta first; settle for less when it fails.
        for delta in (1..=SHRINK_FACTOR as i32).rev() {
            if self.try_resize(-delta) {
                break;
            }
        }
    }
}

impl<V: Copy + Default> Default for CuckooMap<V> {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_SIZE)
    }
}

/// Fisher-Yates over the candidate tuple, consuming `NHASH_SHIFT` bits of
/// `r` per swap, so probing order is uniform across the `NHASH` buckets.
fn shuffle(h: &mut [u32; NHASH], mut r: u64) {
    for j in (1..NHASH).rev() {
        let i = (r & NHASH_MASK) as usize % (j + 1);
        h.swap(i, j);
        r >>= NHASH_SHIFT;
    }
}
