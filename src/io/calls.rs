//! Breakpoint call table reader and writer.
//!
//! Tab-separated, one call per line, sorted by linear coordinate of the
//! local breakend. Columns:
//!
//! 1. call id (`.` = none)
//! 2. mate call id (`.` = none)
//! 3. event id (`.` = none)
//! 4. phred-scaled quality
//! 5. contig
//! 6. direction (`f` or `b`)
//! 7. interval start (1-based inclusive)
//! 8. interval end
//! 9-12. remote contig/direction/start/end, or `.` in all four for a lone
//!    breakend
//!
//! Lines starting with `#` are comments. Gzipped input is decompressed
//! transparently based on the `.gz` extension.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::annotate::{AnnotatedCall, CandidateCall};
use crate::error::Error;
use crate::evidence::{BreakendDirection, BreakendSummary, BreakpointSummary, CallPosition};
use crate::genome::LinearGenome;

fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path).map_err(|e| Error::io(e, path))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        let decoder: Box<dyn Read> = Box::new(GzDecoder::new(file));
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read candidate calls. The sorted-input contract is the caller's to
/// uphold; this reader only parses.
pub fn read_calls(path: &Path, genome: &LinearGenome) -> Result<Vec<CandidateCall>, Error> {
    let reader = open_maybe_gz(path)?;
    let mut calls = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(e, path))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        calls.push(
            parse_call_line(line, genome)
                .map_err(|e| Error::CallTable(format!("line {}: {}", line_num + 1, e)))?,
        );
    }
    log::info!("Read {} candidate calls from {}", calls.len(), path.display());
    Ok(calls)
}

fn optional(field: &str) -> Option<String> {
    if field == "." || field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

fn parse_call_line(line: &str, genome: &LinearGenome) -> Result<CandidateCall, Error> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 12 {
        return Err(Error::CallTable(format!(
            "expected 12 fields, found {}",
            fields.len()
        )));
    }

    let qual: f32 = fields[3]
        .parse()
        .map_err(|e| Error::CallTable(format!("invalid quality '{}': {e}", fields[3])))?;
    let local = parse_breakend(&fields[4..8], genome)?;
    let position = if fields[8] == "." {
        CallPosition::Breakend(local)
    } else {
        let remote = parse_breakend(&fields[8..12], genome)?;
        CallPosition::Breakpoint(BreakpointSummary::new(local, remote))
    };

    CandidateCall::new(
        optional(fields[0]),
        optional(fields[1]),
        optional(fields[2]),
        qual,
        position,
    )
}

fn parse_breakend(fields: &[&str], genome: &LinearGenome) -> Result<BreakendSummary, Error> {
    let ref_index = genome.index_of(fields[0])?;
    let direction: BreakendDirection = fields[1]
        .parse()
        .map_err(|e: String| Error::CallTable(e))?;
    let start: u64 = fields[2]
        .parse()
        .map_err(|e| Error::CallTable(format!("invalid start '{}': {e}", fields[2])))?;
    let end: u64 = fields[3]
        .parse()
        .map_err(|e| Error::CallTable(format!("invalid end '{}': {e}", fields[3])))?;
    if start == 0 || end < start {
        return Err(Error::CallTable(format!(
            "invalid interval [{start},{end}]"
        )));
    }
    Ok(BreakendSummary::new(ref_index, direction, start, end))
}

fn format_breakend(b: &BreakendSummary, genome: &LinearGenome) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        genome.name(b.ref_index),
        b.direction.prefix(),
        b.start,
        b.end
    )
}

/// Write annotated calls: the input columns plus per-kind support counts,
/// accumulated support quality, and the attributed evidence ids.
pub fn write_annotated_calls(
    path: &Path,
    calls: &[AnnotatedCall],
    genome: &LinearGenome,
) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| Error::io(e, path))?;
    let mut writer = BufWriter::new(file);
    writeln!(
        writer,
        "#id\tmate_id\tevent_id\tqual\tcontig\tdirection\tstart\tend\t\
         remote_contig\tremote_direction\tremote_start\tremote_end\t\
         sc\trsc\tdp\trem\tcmp\tsupport_qual\tevidence"
    )
    .map_err(|e| Error::io(e, path))?;

    for annotated in calls {
        let call = &annotated.call;
        let (local, remote) = match &call.position {
            CallPosition::Breakend(b) => (format_breakend(b, genome), ".\t.\t.\t.".to_string()),
            CallPosition::Breakpoint(bp) => (
                format_breakend(&bp.local, genome),
                format_breakend(&bp.remote, genome),
            ),
        };
        let evidence = if annotated.evidence_ids.is_empty() {
            ".".to_string()
        } else {
            annotated.evidence_ids.join(",")
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{}",
            call.id.as_deref().unwrap_or("."),
            call.mate_id.as_deref().unwrap_or("."),
            call.event_id.as_deref().unwrap_or("."),
            call.qual,
            local,
            remote,
            annotated.support.soft_clip,
            annotated.support.realigned_soft_clip,
            annotated.support.read_pair,
            annotated.support.remote,
            annotated.support.compound,
            annotated.support.support_qual,
            evidence
        )
        .map_err(|e| Error::io(e, path))?;
    }
    writer.flush().map_err(|e| Error::io(e, path))?;
    log::info!("Wrote {} annotated calls to {}", calls.len(), path.display());
    Ok(())
}
