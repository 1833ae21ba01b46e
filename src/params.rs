use std::path::PathBuf;

use clap::Parser;

use crate::evidence::PairOrientation;

// ---------------------------------------------------------------------------
// Parameters struct
// ---------------------------------------------------------------------------

/// ruSV command-line parameters.
///
/// Annotates a sorted table of candidate breakpoint calls with the directed
/// evidence extracted from a coordinate-sorted BAM, error-correcting the
/// participating reads first.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ruSV",
    about = "Evidence-based structural variant breakpoint annotator",
    version
)]
pub struct Parameters {
    // ── Inputs and outputs ──────────────────────────────────────────────
    /// Coordinate-sorted BAM containing reads supporting putative
    /// structural variants
    #[arg(long = "input")]
    pub input: Option<PathBuf>,

    /// Candidate breakpoint call table, sorted by linear coordinate
    /// (.gz accepted)
    #[arg(long = "variantCalls")]
    pub variant_calls: Option<PathBuf>,

    /// Annotated call table output
    #[arg(long = "output")]
    pub output: Option<PathBuf>,

    /// Optional TSV dump of every evidence record and its assigned call
    #[arg(long = "evidenceDump")]
    pub evidence_dump: Option<PathBuf>,

    // ── Error correction ────────────────────────────────────────────────
    /// K-mer size for error correction (at most 31)
    #[arg(long = "kmerSize", default_value_t = 21)]
    pub kmer_size: usize,

    /// Frequency imbalance required before a k-mer is collapsed onto a
    /// neighbour; higher values demand stronger imbalance
    #[arg(long = "errorCorrectionMultiple", default_value_t = 8.0)]
    pub error_correction_multiple: f32,

    // ── Annotation windows ──────────────────────────────────────────────
    /// Maximum span of any candidate call's position interval
    #[arg(long = "maxCallRange", default_value_t = 1000)]
    pub max_call_range: u64,

    /// Slack added around evidence intervals before overlap testing
    #[arg(long = "breakendMargin", default_value_t = 10)]
    pub breakend_margin: u64,

    /// Attribute evidence to the single best overlapping call rather than
    /// every overlapping call
    #[arg(
        long = "assignEvidenceToSingleBreakpoint",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub assign_evidence_to_single_breakpoint: bool,

    /// Detect and account for leftover unassigned evidence at end of
    /// stream
    #[arg(long = "sanityCheck")]
    pub sanity_check: bool,

    // ── Evidence acceptance ─────────────────────────────────────────────
    /// Minimum alignment mapq
    #[arg(long = "minMapq", default_value_t = 5)]
    pub min_mapq: u8,

    /// Length threshold of long soft clips
    #[arg(long = "minSoftClipLength", default_value_t = 25)]
    pub min_soft_clip_length: u32,

    /// Minimum percent identity of the locally aligned bases
    #[arg(long = "minAnchorIdentity", default_value_t = 95.0)]
    pub min_anchor_identity: f32,

    /// Fragment size ceiling used to window read-pair breakends
    #[arg(long = "maxFragmentSize", default_value_t = 1000)]
    pub max_fragment_size: u64,

    /// Expected read pair orientation (only FR is fully supported)
    #[arg(long = "pairOrientation", default_value = "FR")]
    pub pair_orientation: PairOrientation,

    /// Adapter sequences checked against soft clips
    #[arg(
        long = "adapterSequences",
        num_args = 0..,
        default_values_t = vec!["AGATCGGAAGAGC".to_string()]
    )]
    pub adapter_sequences: Vec<String>,

    /// Mapped bases allowed to be absorbed into an adapter match
    #[arg(long = "maxAdapterMappedBases", default_value_t = 6)]
    pub max_adapter_mapped_bases: usize,
}

impl Parameters {
    /// Validate parameter combinations that clap alone cannot enforce.
    pub fn validate(&self) -> Result<(), crate::error::Error> {
        use crate::error::Error;

        if self.input.is_none() {
            return Err(Error::Parameter("--input is required".into()));
        }
        if self.variant_calls.is_none() {
            return Err(Error::Parameter("--variantCalls is required".into()));
        }
        if self.output.is_none() {
            return Err(Error::Parameter("--output is required".into()));
        }
        if self.kmer_size < 2 || self.kmer_size > crate::kmer::MAX_K {
            return Err(Error::Parameter(format!(
                "--kmerSize must be between 2 and {}",
                crate::kmer::MAX_K
            )));
        }
        if self.error_correction_multiple <= 1.0 {
            return Err(Error::Parameter(
                "--errorCorrectionMultiple must exceed 1".into(),
            ));
        }
        if self.max_fragment_size == 0 {
            return Err(Error::Parameter("--maxFragmentSize must be >= 1".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn with_io() -> Parameters {
        Parameters::parse_from([
            "ruSV",
            "--input",
            "in.bam",
            "--variantCalls",
            "calls.tsv",
            "--output",
            "out.tsv",
        ])
    }

    #[test]
    fn test_defaults() {
        let p = Parameters::parse_from(["ruSV"]);
        assert_eq!(p.kmer_size, 21);
        assert_eq!(p.error_correction_multiple, 8.0);
        assert_eq!(p.max_call_range, 1000);
        assert_eq!(p.breakend_margin, 10);
        assert!(p.assign_evidence_to_single_breakpoint);
        assert_eq!(p.pair_orientation, PairOrientation::Fr);
        assert_eq!(p.adapter_sequences.len(), 1);
    }

    #[test]
    fn test_validate_requires_io_paths() {
        let p = Parameters::parse_from(["ruSV"]);
        assert!(p.validate().is_err());
        assert!(with_io().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_k() {
        let mut p = with_io();
        p.kmer_size = 32;
        assert!(p.validate().is_err());
        p.kmer_size = 31;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_weak_collapse_multiple() {
        let mut p = with_io();
        p.error_correction_multiple = 1.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_single_best_switch_parses() {
        let p = Parameters::parse_from(["ruSV", "--assignEvidenceToSingleBreakpoint", "false"]);
        assert!(!p.assign_evidence_to_single_breakpoint);
    }

    #[test]
    fn test_pair_orientation_parses() {
        let p = Parameters::parse_from(["ruSV", "--pairOrientation", "RF"]);
        assert_eq!(p.pair_orientation, PairOrientation::Rf);
    }
}
