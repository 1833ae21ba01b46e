//! Greedy variant allocation cache.
//!
//! Several independent uniqueness rules each demand "every unit of evidence
//! supports exactly one call": a given evidence record, a given read pair,
//! and a given read segment may each back only the best-scoring event seen
//! for it. Identity strings are fingerprinted to 128 bits before use as map
//! keys, bounding memory while keeping the collision probability negligible
//! for any realistic run.

use rustc_hash::FxHashMap;

use crate::evidence::DirectedEvidence;

/// Seeds for the two deterministic hash states backing [`Hash128bit`].
const SEED_HIGH: u64 = 0x9e37_79b9_7f4a_7c15;
const SEED_LOW: u64 = 0xc2b2_ae3d_27d4_eb4f;

fn hash_with_seed(key: &str, seed: u64) -> u64 {
    use std::hash::{BuildHasher, Hasher};
    let state = ahash::RandomState::with_seeds(seed, !seed, seed, !seed);
    let mut hasher = state.build_hasher();
    hasher.write(key.as_bytes());
    hasher.finish()
}

/// Deterministic 64-bit hash of an identity string, shared with the
/// annotator's breakend allocation split.
pub fn identity_hash(key: &str) -> u64 {
    hash_with_seed(key, SEED_LOW)
}

/// Collision-resistant digest of a string identity key. Equal source
/// strings always hash identically; the value is an opaque equality key and
/// is never decoded back. The 128-bit width is a collision-probability
/// choice, not a cryptographic one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash128bit {
    high: u64,
    low: u64,
}

impl Hash128bit {
    pub fn of(key: &str) -> Self {
        Hash128bit {
            high: hash_with_seed(key, SEED_HIGH),
            low: hash_with_seed(key, SEED_LOW),
        }
    }
}

/// Best association known for one key.
#[derive(Debug, Clone, Copy)]
struct Node {
    association: Option<Hash128bit>,
    event: Hash128bit,
    score: f32,
}

/// Keeps, per identity key, the single highest-scoring
/// (association, event, score) triple ever inserted. Ties go to the first
/// writer.
#[derive(Debug, Default)]
pub struct GreedyAllocationCache {
    nodes: FxHashMap<Hash128bit, Node>,
}

impl GreedyAllocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn put(
        &mut self,
        key: Hash128bit,
        association: Option<Hash128bit>,
        event: Hash128bit,
        score: f32,
    ) {
        match self.nodes.get_mut(&key) {
            Some(node) => {
                if score > node.score {
                    *node = Node {
                        association,
                        event,
                        score,
                    };
                }
            }
            None => {
                self.nodes.insert(
                    key,
                    Node {
                        association,
                        event,
                        score,
                    },
                );
            }
        }
    }

    /// Is the given event the best recorded for this key? Keys never
    /// inserted have no best event.
    pub fn is_best_event(&self, key: Hash128bit, event: Hash128bit) -> bool {
        self.nodes.get(&key).is_some_and(|n| n.event == event)
    }

    /// Is the given association the best recorded for this key?
    pub fn is_best_association(&self, key: Hash128bit, association: Hash128bit) -> bool {
        self.nodes
            .get(&key)
            .is_some_and(|n| n.association == Some(association))
    }
}

/// The three-constraint specialization over directed evidence. Each
/// constraint is independently toggleable; an inactive constraint always
/// passes. Uniqueness guarantees hold only within one processing instance:
/// the cache must not be shared across independently processed regions.
#[derive(Debug)]
pub struct VariantAllocationCache {
    /// read pair -> best (event, pair alignment). Only the best placement
    /// of a read pair may contribute evidence.
    best_read_pair_alignment: Option<GreedyAllocationCache>,
    /// read segment -> best (event, read alignment). Evidence from two
    /// separate alignments of one read is mutually exclusive.
    best_read_alignment: Option<GreedyAllocationCache>,
    /// evidence ID -> best event. Each evidence record supports one call.
    best_event_for_evidence: Option<GreedyAllocationCache>,
}

impl VariantAllocationCache {
    pub fn new(
        unique_read_pair_alignment: bool,
        unique_read_alignment: bool,
        unique_evidence_allocation: bool,
    ) -> Self {
        VariantAllocationCache {
            best_read_pair_alignment: unique_read_pair_alignment
                .then(GreedyAllocationCache::new),
            best_read_alignment: unique_read_alignment.then(GreedyAllocationCache::new),
            best_event_for_evidence: unique_evidence_allocation.then(GreedyAllocationCache::new),
        }
    }

    /// Record one (event, score) observation for one evidence instance
    /// against every constraint it participates in.
    pub fn add_breakpoint(&mut self, event_id: &str, score: f32, evidence: &DirectedEvidence) {
        let event = Hash128bit::of(event_id);
        if let Some(cache) = &mut self.best_event_for_evidence {
            cache.put(Hash128bit::of(&evidence.evidence_id()), None, event, score);
        }
        match evidence {
            DirectedEvidence::ReadPair(dp) => {
                if let Some(cache) = &mut self.best_read_pair_alignment {
                    let key = Hash128bit::of(&dp.local().name);
                    let alignment = Hash128bit::of(&dp.local().pair_alignment_locus());
                    cache.put(key, Some(alignment), event, score);
                }
            }
            DirectedEvidence::VariantCall(_) => {
                // no underlying read; only the per-evidence constraint applies
            }
            single_read => {
                if let (Some(cache), Some(record)) = (
                    &mut self.best_read_alignment,
                    single_read.underlying_record(),
                ) {
                    let key =
                        Hash128bit::of(&format!("{}#{}", record.name, record.segment_index()));
                    let alignment = Hash128bit::of(&record.alignment_locus());
                    cache.put(key, Some(alignment), event, score);
                }
            }
        }
    }

    /// True only when the event holds the best score under every active
    /// constraint for this evidence's keys.
    pub fn is_best_breakpoint(&self, event_id: &str, evidence: &DirectedEvidence) -> bool {
        let event = Hash128bit::of(event_id);
        if let Some(cache) = &self.best_event_for_evidence {
            if !cache.is_best_event(Hash128bit::of(&evidence.evidence_id()), event) {
                // another breakpoint claimed this evidence
                return false;
            }
        }
        match evidence {
            DirectedEvidence::ReadPair(dp) => match &self.best_read_pair_alignment {
                Some(cache) => {
                    let key = Hash128bit::of(&dp.local().name);
                    let alignment = Hash128bit::of(&dp.local().pair_alignment_locus());
                    cache.is_best_association(key, alignment)
                }
                None => true,
            },
            DirectedEvidence::VariantCall(_) => true,
            single_read => match (&self.best_read_alignment, single_read.underlying_record()) {
                (Some(cache), Some(record)) => {
                    let key =
                        Hash128bit::of(&format!("{}#{}", record.name, record.segment_index()));
                    let alignment = Hash128bit::of(&record.alignment_locus());
                    cache.is_best_association(key, alignment)
                }
                _ => true,
            },
        }
    }
}
