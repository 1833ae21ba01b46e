//! Directed evidence model.
//!
//! Every low-level rearrangement signal (a soft clip, a discordant pair, a
//! realigned clip seen from either side, a call reused as evidence) is one
//! variant of a closed tagged union exposing a small fixed capability set:
//! a stable identity string, a breakend location, the breakend-supporting
//! sub-sequence, and alignment-quality metrics. The allocation cache and
//! the annotator dispatch on the tag, keeping the variant set exhaustively
//! checked.

mod breakend;
mod read;
mod read_pair;
mod soft_clip;
mod variant;

pub use breakend::{BreakendDirection, BreakendSummary, BreakpointSummary, CallPosition};
pub use read::{CigarOp, ReadRecord};
pub use read_pair::{NonReferenceReadPair, PairOrientation};
pub use soft_clip::{
    RealignedSoftClipEvidence, SoftClipEvidence, aligned_percent_identity,
    meets_soft_clip_criteria, soft_clip_length,
};
pub use variant::VariantCallEvidence;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::correct::CorrectionTarget;
use crate::error::Error;
use crate::params::Parameters;

/// The realigned-soft-clip breakpoint seen from its remote side. Shares
/// the physical record with the local view; its identity is derived from
/// the local view so the two can be told apart yet never treated as
/// independent signals.
#[derive(Debug, Clone)]
pub struct RemoteEvidence {
    inner: RealignedSoftClipEvidence,
}

impl RemoteEvidence {
    pub fn new(inner: RealignedSoftClipEvidence) -> Self {
        RemoteEvidence { inner }
    }

    pub fn as_local(&self) -> &RealignedSoftClipEvidence {
        &self.inner
    }

    pub fn evidence_id(&self) -> String {
        format!("{}R", self.inner.evidence_id())
    }

    pub fn position(&self) -> CallPosition {
        CallPosition::Breakpoint(self.inner.breakpoint().flipped())
    }
}

/// One unit of directed evidence.
#[derive(Debug, Clone)]
pub enum DirectedEvidence {
    SoftClip(SoftClipEvidence),
    RealignedSoftClip(RealignedSoftClipEvidence),
    ReadPair(NonReferenceReadPair),
    Remote(RemoteEvidence),
    VariantCall(VariantCallEvidence),
}

impl DirectedEvidence {
    /// Stable identity string, unique per evidence unit.
    pub fn evidence_id(&self) -> String {
        match self {
            DirectedEvidence::SoftClip(sc) => sc.evidence_id(),
            DirectedEvidence::RealignedSoftClip(re) => re.evidence_id(),
            DirectedEvidence::ReadPair(dp) => dp.evidence_id(),
            DirectedEvidence::Remote(rm) => rm.evidence_id(),
            DirectedEvidence::VariantCall(vc) => vc.evidence_id(),
        }
    }

    /// Breakend or breakpoint location of the supported junction.
    pub fn position(&self) -> CallPosition {
        match self {
            DirectedEvidence::SoftClip(sc) => CallPosition::Breakend(*sc.location()),
            DirectedEvidence::RealignedSoftClip(re) => re.position(),
            DirectedEvidence::ReadPair(dp) => CallPosition::Breakend(*dp.location()),
            DirectedEvidence::Remote(rm) => rm.position(),
            DirectedEvidence::VariantCall(vc) => vc.position,
        }
    }

    /// The locally anchored breakend.
    pub fn breakend(&self) -> BreakendSummary {
        *self.position().local()
    }

    /// Bases supporting the breakend: clipped bases for clip-derived
    /// evidence, the mate sequence for read pairs.
    pub fn breakend_sequence(&self) -> Option<Vec<u8>> {
        match self {
            DirectedEvidence::SoftClip(sc) => Some(sc.breakend_sequence().to_vec()),
            DirectedEvidence::RealignedSoftClip(re) => {
                Some(re.clip().breakend_sequence().to_vec())
            }
            DirectedEvidence::Remote(rm) => Some(rm.as_local().clip().breakend_sequence().to_vec()),
            DirectedEvidence::ReadPair(dp) => Some(dp.mate().bases.clone()),
            DirectedEvidence::VariantCall(vc) => vc.breakend_sequence.clone(),
        }
    }

    pub fn breakend_quality(&self) -> Option<Vec<u8>> {
        match self {
            DirectedEvidence::SoftClip(sc) => Some(sc.breakend_quality().to_vec()),
            DirectedEvidence::RealignedSoftClip(re) => Some(re.clip().breakend_quality().to_vec()),
            DirectedEvidence::Remote(rm) => Some(rm.as_local().clip().breakend_quality().to_vec()),
            DirectedEvidence::ReadPair(dp) => Some(dp.mate().quals.clone()),
            DirectedEvidence::VariantCall(vc) => vc.breakend_quality.clone(),
        }
    }

    /// Mapping quality of the locally anchored alignment.
    pub fn local_mapq(&self) -> u8 {
        match self {
            DirectedEvidence::SoftClip(sc) => sc.mapping_quality(),
            DirectedEvidence::RealignedSoftClip(re) => re.clip().mapping_quality(),
            DirectedEvidence::ReadPair(dp) => dp.local_mapq(),
            DirectedEvidence::Remote(rm) => rm.as_local().remote_mapq(),
            DirectedEvidence::VariantCall(_) => 0,
        }
    }

    /// Contribution of this evidence to a call's support quality.
    pub fn support_score(&self) -> f32 {
        match self {
            DirectedEvidence::ReadPair(dp) => {
                (dp.local_mapq() as f32).min(dp.mate().mapq as f32)
            }
            DirectedEvidence::VariantCall(vc) => vc.qual,
            other => other.local_mapq() as f32,
        }
    }

    /// The underlying locally mapped record, where one exists.
    pub fn underlying_record(&self) -> Option<&Arc<ReadRecord>> {
        match self {
            DirectedEvidence::SoftClip(sc) => Some(sc.record()),
            DirectedEvidence::RealignedSoftClip(re) => Some(re.clip().record()),
            DirectedEvidence::ReadPair(dp) => Some(dp.local()),
            DirectedEvidence::Remote(rm) => Some(rm.as_local().clip().record()),
            DirectedEvidence::VariantCall(_) => None,
        }
    }
}

/// A validated candidate evidence site over a read arena, recorded before
/// error correction so corrected bases flow into the evidence actually
/// constructed.
#[derive(Debug, Clone, Copy)]
pub enum EvidenceSeed {
    SoftClip {
        read: usize,
        direction: BreakendDirection,
    },
    ReadPair {
        local: usize,
        mate: usize,
    },
}

/// Build the deduplicated error-correction work list for the reads backing
/// the given evidence seeds. Each arena record is corrected at most once
/// even when it backs several seeds; read-pair mates are scheduled
/// reverse-complemented when the evidence direction and mate strand
/// disagree. A record claimed both as a local read and as an
/// rc-facing mate is corrected once, in local orientation.
pub fn correction_targets<'a>(
    reads: &'a mut [ReadRecord],
    seeds: &[EvidenceSeed],
) -> Vec<CorrectionTarget<'a>> {
    let mut orientation: FxHashMap<usize, bool> = FxHashMap::default();
    for seed in seeds {
        match *seed {
            EvidenceSeed::SoftClip { read, .. } => {
                orientation.insert(read, false);
            }
            EvidenceSeed::ReadPair { local, mate } => {
                orientation.insert(local, false);
                let forward = !reads[local].is_reverse;
                let rc = forward ^ reads[mate].is_reverse;
                orientation.entry(mate).or_insert(rc);
            }
        }
    }
    reads
        .iter_mut()
        .enumerate()
        .filter_map(|(i, r)| {
            orientation.get(&i).map(|&rc| CorrectionTarget {
                bases: &mut r.bases,
                reverse_complement: rc,
            })
        })
        .collect()
}

/// Construct directed evidence from seeds over the (corrected) read arena.
pub fn build_evidence(
    reads: Vec<ReadRecord>,
    seeds: &[EvidenceSeed],
    params: &Parameters,
) -> Result<Vec<DirectedEvidence>, Error> {
    let arena: Vec<Arc<ReadRecord>> = reads.into_iter().map(Arc::new).collect();
    let mut evidence = Vec::with_capacity(seeds.len());
    for seed in seeds {
        match *seed {
            EvidenceSeed::SoftClip { read, direction } => {
                let sc = SoftClipEvidence::new(arena[read].clone(), direction)?;
                evidence.push(DirectedEvidence::SoftClip(sc));
            }
            EvidenceSeed::ReadPair { local, mate } => {
                let dp = NonReferenceReadPair::new(
                    arena[local].clone(),
                    arena[mate].clone(),
                    params.max_fragment_size,
                )?;
                evidence.push(DirectedEvidence::ReadPair(dp));
            }
        }
    }
    Ok(evidence)
}
