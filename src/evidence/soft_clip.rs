//! Soft-clip evidence.
//!
//! A soft-clipped alignment suggests the read continues across a breakpoint
//! at the clipped side. Construction validates the record up front; the
//! acceptance predicate is the single gate deciding whether a clip is strong
//! enough to drive realignment and assembly.

use std::sync::Arc;

use crate::error::Error;
use crate::evidence::breakend::{
    BreakendDirection, BreakendSummary, BreakpointSummary, CallPosition,
};
use crate::evidence::read_pair::PairOrientation;
use crate::evidence::read::ReadRecord;
use crate::params::Parameters;

/// Positional slack when deciding whether a pair dovetails.
const DOVETAIL_ERROR_MARGIN: u64 = 2;

/// Soft-clip evidence for one side of one mapped read.
#[derive(Debug, Clone)]
pub struct SoftClipEvidence {
    record: Arc<ReadRecord>,
    location: BreakendSummary,
}

impl SoftClipEvidence {
    /// Requires a mapped record with sequence and a nonzero clip on the
    /// requested side; anything else is a construction error, not a
    /// data-quality condition.
    pub fn new(record: Arc<ReadRecord>, direction: BreakendDirection) -> Result<Self, Error> {
        let Some(ref_index) = record.ref_index.filter(|_| !record.is_unmapped) else {
            return Err(Error::InvalidEvidence(format!(
                "record {} is unmapped",
                record.name
            )));
        };
        if record.bases.is_empty() {
            return Err(Error::InvalidEvidence(format!(
                "record {} missing sequence information",
                record.name
            )));
        }
        if soft_clip_length(&record, direction) == 0 {
            return Err(Error::InvalidEvidence(format!(
                "record {} is not soft clipped {}",
                record.name,
                direction.prefix()
            )));
        }
        let pos = match direction {
            BreakendDirection::Forward => record.alignment_end(),
            BreakendDirection::Backward => record.start,
        };
        let location = BreakendSummary::new(ref_index, direction, pos, pos);
        Ok(SoftClipEvidence { record, location })
    }

    pub fn record(&self) -> &Arc<ReadRecord> {
        &self.record
    }

    pub fn location(&self) -> &BreakendSummary {
        &self.location
    }

    pub fn direction(&self) -> BreakendDirection {
        self.location.direction
    }

    pub fn soft_clip_length(&self) -> usize {
        soft_clip_length(&self.record, self.location.direction)
    }

    /// Direction prefix + read name + segment suffix.
    pub fn evidence_id(&self) -> String {
        format!(
            "{}{}{}",
            self.location.direction.prefix(),
            self.record.name,
            self.record.segment_suffix()
        )
    }

    /// The clipped bases, read in reference orientation.
    pub fn breakend_sequence(&self) -> &[u8] {
        match self.location.direction {
            BreakendDirection::Forward => self.record.end_clip_bases(),
            BreakendDirection::Backward => self.record.start_clip_bases(),
        }
    }

    pub fn breakend_quality(&self) -> &[u8] {
        match self.location.direction {
            BreakendDirection::Forward => self.record.end_clip_quals(),
            BreakendDirection::Backward => self.record.start_clip_quals(),
        }
    }

    pub fn mapping_quality(&self) -> u8 {
        self.record.mapq
    }

    /// 0-100 scaled identity of the locally aligned bases.
    pub fn aligned_percent_identity(&self) -> Result<f32, Error> {
        aligned_percent_identity(&self.record)
    }

    /// Arithmetic mean of the clipped base qualities.
    pub fn average_clip_quality(&self) -> f32 {
        let qual = self.breakend_quality();
        if qual.is_empty() {
            return 0.0;
        }
        qual.iter().map(|&q| q as f32).sum::<f32>() / qual.len() as f32
    }

    /// The single gate deciding whether this clip is promoted to drive
    /// realignment and assembly.
    pub fn meets_evidence_criteria(&self, params: &Parameters) -> Result<bool, Error> {
        meets_soft_clip_criteria(&self.record, self.location.direction, params)
    }

    /// True when the clip is explained by fragment length shorter than read
    /// length rather than a rearrangement.
    pub fn is_dovetailing(&self, orientation: PairOrientation) -> Result<bool, Error> {
        is_dovetailing(&self.record, self.location.direction, orientation)
    }

    /// True when the clip is explained by read-through into adapter
    /// sequence.
    pub fn is_adapter_soft_clip(&self, params: &Parameters) -> Result<bool, Error> {
        is_adapter_soft_clip(&self.record, self.location.direction, params)
    }
}

/// Soft clip length on the given side of a record.
pub fn soft_clip_length(record: &ReadRecord, direction: BreakendDirection) -> usize {
    match direction {
        BreakendDirection::Forward => record.end_clip_len(),
        BreakendDirection::Backward => record.start_clip_len(),
    }
}

/// Identity of the locally aligned bases from the NM tag. Records carrying
/// only an MD string are an unsupported input: computing identity from MD
/// alone is deliberately not implemented, and silently guessing would be
/// worse than refusing.
pub fn aligned_percent_identity(record: &ReadRecord) -> Result<f32, Error> {
    if let Some(nm) = record.edit_distance {
        let ref_bases = record.aligned_base_count() as i64;
        if ref_bases == 0 {
            return Ok(0.0);
        }
        let matches =
            ref_bases - nm as i64 + record.inserted_bases() as i64 + record.deleted_bases() as i64;
        return Ok(100.0 * matches as f32 / ref_bases as f32);
    }
    if record.mismatch_positions.is_some() {
        return Err(Error::NotImplemented(format!(
            "identity calculation from MD tag without NM tag (read {})",
            record.name
        )));
    }
    Err(Error::InvalidEvidence(format!(
        "read {} missing NM tag",
        record.name
    )))
}

/// Acceptance predicate over a record/side pair, usable before full
/// evidence construction.
pub fn meets_soft_clip_criteria(
    record: &ReadRecord,
    direction: BreakendDirection,
    params: &Parameters,
) -> Result<bool, Error> {
    Ok(record.mapq >= params.min_mapq
        && soft_clip_length(record, direction) >= params.min_soft_clip_length as usize
        && aligned_percent_identity(record)? >= params.min_anchor_identity
        && !is_dovetailing(record, direction, params.pair_orientation)?
        && !is_adapter_soft_clip(record, direction, params)?)
}

/// Dovetail check. Dovetailing pairs overlap past each other's 3' ends:
///
/// ```text
///     =======>
///  <=======
/// ```
///
/// Only the Illumina FR orientation is supported; other orientations fail
/// loudly rather than returning a wrong answer.
pub fn is_dovetailing(
    record: &ReadRecord,
    direction: BreakendDirection,
    orientation: PairOrientation,
) -> Result<bool, Error> {
    if !record.is_paired || record.mate_unmapped {
        return Ok(false);
    }
    if orientation != PairOrientation::Fr {
        return Err(Error::NotImplemented(
            "dovetail detection for pair orientations other than FR".to_string(),
        ));
    }
    Ok(record.mate_ref_index == record.ref_index
        && record.start.abs_diff(record.mate_start) <= DOVETAIL_ERROR_MARGIN
        // dovetails sit on the 3' end of the read for FR
        && ((direction == BreakendDirection::Forward && !record.is_reverse)
            || (direction == BreakendDirection::Backward && record.is_reverse)))
}

/// Adapter read-through check for FR pairs. A clip on the 5' end of the
/// read cannot be adapter; on the 3' end the clipped bases are matched
/// against each configured adapter, allowing up to
/// `max_adapter_mapped_bases` aligned bases to have been absorbed into the
/// adapter match.
pub fn is_adapter_soft_clip(
    record: &ReadRecord,
    direction: BreakendDirection,
    params: &Parameters,
) -> Result<bool, Error> {
    if params.adapter_sequences.is_empty() {
        return Ok(false);
    }
    if params.pair_orientation != PairOrientation::Fr {
        return Err(Error::NotImplemented(
            "adapter detection for pair orientations other than FR".to_string(),
        ));
    }
    if direction == BreakendDirection::Forward && record.is_reverse {
        return Ok(false);
    }
    if direction == BreakendDirection::Backward && !record.is_reverse {
        return Ok(false);
    }
    for adapter in &params.adapter_sequences {
        if matches_adapter_fr(
            adapter.as_bytes(),
            record,
            direction,
            params.max_adapter_mapped_bases,
        ) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matches_adapter_fr(
    adapter: &[u8],
    record: &ReadRecord,
    direction: BreakendDirection,
    max_mapped_bases: usize,
) -> bool {
    let clip_len = soft_clip_length(record, direction);
    match direction {
        BreakendDirection::Forward => {
            for i in 0..=max_mapped_bases {
                let start = record.read_length() as isize - clip_len as isize - i as isize;
                if matches_adapter_sequence(adapter, &record.bases, start, 1, false) {
                    return true;
                }
            }
        }
        BreakendDirection::Backward => {
            for i in 0..=max_mapped_bases {
                let start = clip_len as isize + i as isize - 1;
                if matches_adapter_sequence(adapter, &record.bases, start, -1, true) {
                    return true;
                }
            }
        }
    }
    false
}

/// Walk the read from `start` in `step` direction, comparing against the
/// adapter (complemented when reading backwards). Non-ACGT read bases match
/// anything.
fn matches_adapter_sequence(
    adapter: &[u8],
    read: &[u8],
    start: isize,
    step: isize,
    complement_adapter: bool,
) -> bool {
    let mut i = 0isize;
    while (i as usize) < adapter.len() {
        let idx = start + i * step;
        if idx < 0 || idx as usize >= read.len() {
            break;
        }
        let read_base = read[idx as usize];
        let mut adapter_base = adapter[i as usize];
        if complement_adapter {
            adapter_base = crate::kmer::complement(adapter_base);
        }
        if matches!(read_base, b'A' | b'C' | b'G' | b'T') && read_base != adapter_base {
            return false;
        }
        i += 1;
    }
    true
}

/// A soft clip whose clipped bases have been realigned elsewhere, turning
/// the lone breakend into a full breakpoint.
#[derive(Debug, Clone)]
pub struct RealignedSoftClipEvidence {
    clip: SoftClipEvidence,
    realigned: Arc<ReadRecord>,
    breakpoint: BreakpointSummary,
}

impl RealignedSoftClipEvidence {
    pub fn new(clip: SoftClipEvidence, realigned: Arc<ReadRecord>) -> Result<Self, Error> {
        let Some(ref_index) = realigned.ref_index.filter(|_| !realigned.is_unmapped) else {
            return Err(Error::InvalidEvidence(format!(
                "realignment of {} is unmapped",
                clip.evidence_id()
            )));
        };
        let remote = remote_breakend(clip.direction(), &realigned, ref_index);
        let breakpoint = BreakpointSummary::new(*clip.location(), remote);
        Ok(RealignedSoftClipEvidence {
            clip,
            realigned,
            breakpoint,
        })
    }

    pub fn clip(&self) -> &SoftClipEvidence {
        &self.clip
    }

    pub fn realigned_record(&self) -> &Arc<ReadRecord> {
        &self.realigned
    }

    pub fn breakpoint(&self) -> &BreakpointSummary {
        &self.breakpoint
    }

    pub fn position(&self) -> CallPosition {
        CallPosition::Breakpoint(self.breakpoint)
    }

    pub fn evidence_id(&self) -> String {
        self.clip.evidence_id()
    }

    pub fn remote_mapq(&self) -> u8 {
        self.realigned.mapq
    }
}

/// Remote breakend implied by where the clipped bases realigned.
///
/// For a Forward clip the clipped sequence continues rightward off the
/// local anchor, so a forward-strand realignment joins at its start facing
/// Backward, and a reverse-strand realignment joins at its end facing
/// Forward. A Backward clip mirrors this.
fn remote_breakend(
    clip_direction: BreakendDirection,
    realigned: &ReadRecord,
    ref_index: usize,
) -> BreakendSummary {
    let same_strand = !realigned.is_reverse;
    let joins_at_start = match clip_direction {
        BreakendDirection::Forward => same_strand,
        BreakendDirection::Backward => !same_strand,
    };
    if joins_at_start {
        BreakendSummary::new(
            ref_index,
            BreakendDirection::Backward,
            realigned.start,
            realigned.start,
        )
    } else {
        let end = realigned.alignment_end();
        BreakendSummary::new(ref_index, BreakendDirection::Forward, end, end)
    }
}
