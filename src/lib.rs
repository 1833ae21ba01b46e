#![allow(non_snake_case)]

pub mod error;
pub mod params;

pub mod allocate;
pub mod annotate;
pub mod correct;
pub mod evidence;
pub mod genome;
pub mod io;
pub mod kmer;
pub mod stats;

use std::path::PathBuf;

use log::info;

use crate::annotate::{AnnotatedCall, AnnotatorConfig, EvidenceSink, SequentialEvidenceAnnotator};
use crate::error::Error;
use crate::params::Parameters;

fn required<'a>(path: &'a Option<PathBuf>, flag: &str) -> Result<&'a PathBuf, Error> {
    path.as_ref()
        .ok_or_else(|| Error::Parameter(format!("{flag} is required")))
}

/// Top-level pipeline. Called from `main()` after CLI parsing.
pub fn run(params: &Parameters) -> anyhow::Result<()> {
    params.validate()?;

    let input = required(&params.input, "--input")?;
    let calls_path = required(&params.variant_calls, "--variantCalls")?;
    let output = required(&params.output, "--output")?;

    info!("ruSV v{}", env!("CARGO_PKG_VERSION"));
    info!("input: {}", input.display());
    info!("variantCalls: {}", calls_path.display());
    info!("output: {}", output.display());

    let bam = io::bam::read_bam_evidence(input, params)?;
    let mut reads = bam.reads;

    info!(
        "Error correcting with k={} multiple={}",
        params.kmer_size, params.error_correction_multiple
    );
    let targets = evidence::correction_targets(&mut reads, &bam.seeds);
    let correction_stats =
        correct::error_correct_reads(params.kmer_size, params.error_correction_multiple, targets)?;
    correction_stats.print_summary();

    let mut evidence_stream = evidence::build_evidence(reads, &bam.seeds, params)?;
    evidence_stream.sort_by_key(|e| e.breakend().start_linear(&bam.genome));

    let calls = io::calls::read_calls(calls_path, &bam.genome)?;

    let dump: Option<Box<dyn EvidenceSink>> = match &params.evidence_dump {
        Some(path) => Some(Box::new(io::dump::EvidenceTsvDump::create(
            path,
            bam.genome.contig_names(),
        )?)),
        None => None,
    };

    let config = AnnotatorConfig {
        max_call_range: params.max_call_range,
        breakend_margin: params.breakend_margin,
        assign_to_single_best: params.assign_evidence_to_single_breakpoint,
        sanity_check: params.sanity_check,
    };
    let mut annotator = SequentialEvidenceAnnotator::new(
        &bam.genome,
        calls.into_iter(),
        evidence_stream.into_iter(),
        config,
        dump,
    );

    let mut annotated: Vec<AnnotatedCall> = Vec::new();
    for call in annotator.by_ref() {
        annotated.push(call);
    }
    annotator.stats().print_summary();

    io::calls::write_annotated_calls(output, &annotated, &bam.genome)?;

    info!("Annotation complete");
    Ok(())
}
