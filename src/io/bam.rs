//! BAM input adapter.
//!
//! Decodes a coordinate-sorted BAM with noodles, converts records into the
//! crate's plain [`ReadRecord`] form, derives the linear genome from the
//! header, and identifies the evidence seeds (acceptable soft clips,
//! non-reference read pairs) that the pipeline will correct and construct
//! evidence from.

use std::path::Path;

use noodles::bam;
use noodles::sam;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::RecordBuf;
use noodles::sam::alignment::record_buf::data::field::Value;
use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::evidence::{
    BreakendDirection, CigarOp, EvidenceSeed, ReadRecord, meets_soft_clip_criteria,
    soft_clip_length,
};
use crate::genome::LinearGenome;
use crate::params::Parameters;

/// Everything the pipeline needs from one BAM pass.
pub struct BamEvidenceInput {
    pub genome: LinearGenome,
    pub reads: Vec<ReadRecord>,
    pub seeds: Vec<EvidenceSeed>,
}

/// Single forward pass: decode, convert, seed.
pub fn read_bam_evidence(path: &Path, params: &Parameters) -> Result<BamEvidenceInput, Error> {
    let mut reader = bam::io::reader::Builder::default()
        .build_from_path(path)
        .map_err(|e| Error::io(e, path))?;
    let header = reader.read_header().map_err(|e| Error::io(e, path))?;
    let genome = genome_from_header(&header, 2 * (params.max_call_range + 1));

    let mut reads = Vec::new();
    for result in reader.record_bufs(&header) {
        let record = result.map_err(|e| Error::io(e, path))?;
        let flags = record.flags();
        if flags.is_secondary() || flags.is_supplementary() || flags.is_duplicate() {
            continue;
        }
        reads.push(convert_record(&record)?);
    }
    log::info!("Read {} records from {}", reads.len(), path.display());

    let seeds = extract_seeds(&reads, params)?;
    log::info!("Identified {} evidence seeds", seeds.len());
    Ok(BamEvidenceInput {
        genome,
        reads,
        seeds,
    })
}

fn genome_from_header(header: &sam::Header, padding: u64) -> LinearGenome {
    let contigs = header
        .reference_sequences()
        .iter()
        .map(|(name, map)| (name.to_string(), usize::from(map.length()) as u64))
        .collect();
    LinearGenome::with_padding(contigs, padding)
}

fn convert_cigar(record: &RecordBuf) -> Result<Vec<CigarOp>, Error> {
    record
        .cigar()
        .as_ref()
        .iter()
        .map(|op| {
            let len = op.len() as u32;
            Ok(match op.kind() {
                Kind::Match => CigarOp::Match(len),
                Kind::Insertion => CigarOp::Ins(len),
                Kind::Deletion => CigarOp::Del(len),
                Kind::Skip => CigarOp::RefSkip(len),
                Kind::SoftClip => CigarOp::SoftClip(len),
                Kind::HardClip => CigarOp::HardClip(len),
                Kind::Pad => CigarOp::Pad(len),
                Kind::SequenceMatch => CigarOp::Equal(len),
                Kind::SequenceMismatch => CigarOp::Diff(len),
            })
        })
        .collect()
}

fn convert_record(record: &RecordBuf) -> Result<ReadRecord, Error> {
    let flags = record.flags();
    let name = record
        .name()
        .map(|n| n.to_string())
        .ok_or_else(|| Error::Bam("record missing read name".to_string()))?;

    let edit_distance = match record.data().get(&Tag::EDIT_DISTANCE) {
        Some(value) => Some(
            value
                .as_int()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| Error::Bam(format!("read {name} has a malformed NM tag")))?,
        ),
        None => None,
    };
    let mismatch_positions = match record.data().get(&Tag::MISMATCHED_POSITIONS) {
        Some(Value::String(s)) => Some(s.to_string()),
        _ => None,
    };

    Ok(ReadRecord {
        ref_index: record.reference_sequence_id(),
        start: record
            .alignment_start()
            .map(|p| usize::from(p) as u64)
            .unwrap_or(0),
        mapq: record.mapping_quality().map(u8::from).unwrap_or(0),
        cigar: convert_cigar(record)?,
        bases: record.sequence().as_ref().to_vec(),
        quals: record.quality_scores().as_ref().to_vec(),
        is_paired: flags.is_segmented(),
        is_reverse: flags.is_reverse_complemented(),
        is_unmapped: flags.is_unmapped(),
        is_first_of_pair: flags.is_first_segment(),
        mate_unmapped: flags.is_mate_unmapped(),
        mate_ref_index: record.mate_reference_sequence_id(),
        mate_start: record
            .mate_alignment_start()
            .map(|p| usize::from(p) as u64)
            .unwrap_or(0),
        mate_reverse: flags.is_mate_reverse_complemented(),
        edit_distance,
        mismatch_positions,
        name,
    })
}

/// A pair is non-reference when its mapped configuration is inconsistent
/// with a concordant fragment: unmapped mate, different contig, or a span
/// beyond the fragment size ceiling.
fn is_non_reference_pair(record: &ReadRecord, params: &Parameters) -> bool {
    if record.mate_unmapped {
        return true;
    }
    if record.mate_ref_index != record.ref_index {
        return true;
    }
    record.start.abs_diff(record.mate_start) > params.max_fragment_size
}

fn extract_seeds(reads: &[ReadRecord], params: &Parameters) -> Result<Vec<EvidenceSeed>, Error> {
    let mut by_segment: FxHashMap<(&str, usize), usize> = FxHashMap::default();
    for (i, r) in reads.iter().enumerate() {
        by_segment.insert((r.name.as_str(), r.segment_index()), i);
    }

    let mut seeds = Vec::new();
    for (i, r) in reads.iter().enumerate() {
        if r.is_unmapped || r.bases.is_empty() {
            continue;
        }
        for direction in [BreakendDirection::Forward, BreakendDirection::Backward] {
            if soft_clip_length(r, direction) == 0 {
                continue;
            }
            if meets_soft_clip_criteria(r, direction, params)? {
                seeds.push(EvidenceSeed::SoftClip { read: i, direction });
            }
        }
        if r.is_paired && r.mapq >= params.min_mapq && is_non_reference_pair(r, params) {
            let mate_segment = 1 - r.segment_index();
            if let Some(&mate) = by_segment.get(&(r.name.as_str(), mate_segment)) {
                seeds.push(EvidenceSeed::ReadPair { local: i, mate });
            }
        }
    }
    Ok(seeds)
}
