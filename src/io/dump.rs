//! Evidence dump sink: one TSV row per (evidence, call-or-none) pair.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::annotate::{CandidateCall, EvidenceSink};
use crate::error::Error;
use crate::evidence::DirectedEvidence;

/// TSV implementation of the diagnostics sink. The underlying writer is
/// flushed when the sink is dropped.
pub struct EvidenceTsvDump {
    writer: BufWriter<File>,
    contig_names: Vec<String>,
}

impl EvidenceTsvDump {
    pub fn create(path: &Path, contig_names: Vec<String>) -> Result<Self, Error> {
        let file = File::create(path).map_err(|e| Error::io(e, path))?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "#evidence_id\tkind\tcontig\tdirection\tstart\tend\tcall_id"
        )
        .map_err(|e| Error::io(e, path))?;
        Ok(EvidenceTsvDump {
            writer,
            contig_names,
        })
    }

    fn kind(evidence: &DirectedEvidence) -> &'static str {
        match evidence {
            DirectedEvidence::SoftClip(_) => "softclip",
            DirectedEvidence::RealignedSoftClip(_) => "realigned",
            DirectedEvidence::ReadPair(_) => "readpair",
            DirectedEvidence::Remote(_) => "remote",
            DirectedEvidence::VariantCall(_) => "compound",
        }
    }
}

impl EvidenceSink for EvidenceTsvDump {
    fn write_evidence(&mut self, evidence: &DirectedEvidence, call: Option<&CandidateCall>) {
        let breakend = evidence.breakend();
        let contig = self
            .contig_names
            .get(breakend.ref_index)
            .map(String::as_str)
            .unwrap_or(".");
        let call_id = call
            .and_then(|c| c.id.as_deref())
            .unwrap_or(".");
        if let Err(e) = writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            evidence.evidence_id(),
            Self::kind(evidence),
            contig,
            breakend.direction.prefix(),
            breakend.start,
            breakend.end,
            call_id
        ) {
            log::warn!("evidence dump write failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{BreakendDirection, CigarOp, ReadRecord, SoftClipEvidence};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn soft_clip() -> DirectedEvidence {
        let record = Arc::new(ReadRecord {
            name: "r1".to_string(),
            ref_index: Some(0),
            start: 1000,
            mapq: 60,
            cigar: vec![CigarOp::Match(30), CigarOp::SoftClip(20)],
            bases: vec![b'A'; 50],
            quals: vec![30; 50],
            edit_distance: Some(0),
            ..Default::default()
        });
        DirectedEvidence::SoftClip(
            SoftClipEvidence::new(record, BreakendDirection::Forward).unwrap(),
        )
    }

    #[test]
    fn test_dump_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.tsv");
        {
            let mut sink =
                EvidenceTsvDump::create(&path, vec!["chr1".to_string()]).unwrap();
            sink.write_evidence(&soft_clip(), None);
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with('#'));
        let row = lines.next().unwrap();
        assert_eq!(row, "fr1\tsoftclip\tchr1\tf\t1029\t1029\t.");
    }
}
