//! Discordant read-pair evidence.

use std::sync::Arc;

use crate::error::Error;
use crate::evidence::breakend::{BreakendDirection, BreakendSummary};
use crate::evidence::read::ReadRecord;

/// Expected relative orientation of a mapped read pair.
///
/// Only the Illumina FR layout is supported by the dovetail and adapter
/// predicates; the others exist so configuration can name them and fail
/// loudly instead of silently computing nonsense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOrientation {
    Fr,
    Rf,
    Tandem,
}

impl std::str::FromStr for PairOrientation {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FR" => Ok(Self::Fr),
            "RF" => Ok(Self::Rf),
            "TANDEM" => Ok(Self::Tandem),
            _ => Err(format!(
                "unknown pair orientation '{s}'; expected FR, RF or TANDEM"
            )),
        }
    }
}

impl std::fmt::Display for PairOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fr => write!(f, "FR"),
            Self::Rf => write!(f, "RF"),
            Self::Tandem => write!(f, "TANDEM"),
        }
    }
}

/// A read pair whose mapping is inconsistent with the reference: the mate
/// is unmapped or maps somewhere a concordant fragment could not reach.
/// The locally mapped read anchors a breakend directed away from its 3'
/// end; the breakend interval spans the positions the unsequenced part of
/// the fragment could occupy.
#[derive(Debug, Clone)]
pub struct NonReferenceReadPair {
    local: Arc<ReadRecord>,
    mate: Arc<ReadRecord>,
    location: BreakendSummary,
}

impl NonReferenceReadPair {
    pub fn new(
        local: Arc<ReadRecord>,
        mate: Arc<ReadRecord>,
        max_fragment_size: u64,
    ) -> Result<Self, Error> {
        let Some(ref_index) = local.ref_index.filter(|_| !local.is_unmapped) else {
            return Err(Error::InvalidEvidence(format!(
                "local read {} of pair is unmapped",
                local.name
            )));
        };
        if !local.is_paired {
            return Err(Error::InvalidEvidence(format!(
                "read {} is not paired",
                local.name
            )));
        }
        let location = if !local.is_reverse {
            let lo = local.alignment_end();
            let hi = (local.start + max_fragment_size.saturating_sub(1)).max(lo);
            BreakendSummary::new(ref_index, BreakendDirection::Forward, lo, hi)
        } else {
            let hi = local.start;
            let lo = local
                .alignment_end()
                .saturating_sub(max_fragment_size.saturating_sub(1))
                .clamp(1, hi);
            BreakendSummary::new(ref_index, BreakendDirection::Backward, lo, hi)
        };
        Ok(NonReferenceReadPair {
            local,
            mate,
            location,
        })
    }

    pub fn local(&self) -> &Arc<ReadRecord> {
        &self.local
    }

    /// The non-reference read: the mate whose placement (or absence of one)
    /// is the actual signal.
    pub fn mate(&self) -> &Arc<ReadRecord> {
        &self.mate
    }

    pub fn location(&self) -> &BreakendSummary {
        &self.location
    }

    pub fn evidence_id(&self) -> String {
        format!("dp{}{}", self.local.name, self.local.segment_suffix())
    }

    pub fn local_mapq(&self) -> u8 {
        self.local.mapq
    }

    /// Whether the mate must be reverse-complemented before contributing
    /// k-mers, so all sequences around the breakend face one strand.
    pub fn mate_requires_rc(&self) -> bool {
        (self.location.direction == BreakendDirection::Forward) ^ self.mate.is_reverse
    }

    pub fn meets_evidence_criteria(&self, min_mapq: u8) -> bool {
        self.local.mapq >= min_mapq
    }
}
