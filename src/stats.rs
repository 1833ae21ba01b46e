/// Run statistics tracking and reporting
use log::info;

/// Tracks error-correction activity for one correction pass
#[derive(Default, Debug)]
pub struct CorrectionStats {
    /// Reads examined by the corrector
    pub reads_seen: u64,
    /// Reads with at least one base rewritten
    pub reads_corrected: u64,
    /// Total bases rewritten
    pub bases_corrected: u64,
}

impl CorrectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the correction count for one read
    pub fn record(&mut self, changes: usize) {
        self.reads_seen += 1;
        if changes > 0 {
            self.reads_corrected += 1;
            self.bases_corrected += changes as u64;
        }
    }

    /// Print summary statistics to log
    pub fn print_summary(&self) {
        if self.reads_seen == 0 {
            info!("No reads error-corrected");
            return;
        }
        info!("=== Error Correction Summary ===");
        info!("Reads examined: {}", self.reads_seen);
        info!(
            "Reads corrected: {} ({:.2}%)",
            self.reads_corrected,
            100.0 * self.reads_corrected as f64 / self.reads_seen as f64
        );
        info!("Bases corrected: {}", self.bases_corrected);
    }
}

/// Tracks evidence assignment over one annotation run
#[derive(Default, Debug)]
pub struct AnnotationStats {
    /// Calls emitted
    pub calls_annotated: u64,
    /// Calls that attracted at least one piece of evidence
    pub calls_supported: u64,
    /// Evidence records attributed to a call
    pub evidence_assigned: u64,
    /// Evidence records overlapping no buffered call
    pub evidence_unsupported: u64,
}

impl AnnotationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&mut self, evidence_count: usize) {
        self.calls_annotated += 1;
        if evidence_count > 0 {
            self.calls_supported += 1;
        }
        self.evidence_assigned += evidence_count as u64;
    }

    pub fn record_unsupported(&mut self) {
        self.evidence_unsupported += 1;
    }

    /// Print summary statistics to log
    pub fn print_summary(&self) {
        info!("=== Annotation Summary ===");
        info!("Calls annotated: {}", self.calls_annotated);
        if self.calls_annotated > 0 {
            info!(
                "Calls with evidence support: {} ({:.2}%)",
                self.calls_supported,
                100.0 * self.calls_supported as f64 / self.calls_annotated as f64
            );
        }
        info!("Evidence records assigned: {}", self.evidence_assigned);
        info!(
            "Evidence records without a supported call: {}",
            self.evidence_unsupported
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_stats_record() {
        let mut stats = CorrectionStats::new();
        stats.record(0);
        stats.record(2);
        stats.record(1);
        assert_eq!(stats.reads_seen, 3);
        assert_eq!(stats.reads_corrected, 2);
        assert_eq!(stats.bases_corrected, 3);
    }

    #[test]
    fn test_annotation_stats_record() {
        let mut stats = AnnotationStats::new();
        stats.record_call(0);
        stats.record_call(3);
        stats.record_unsupported();
        assert_eq!(stats.calls_annotated, 2);
        assert_eq!(stats.calls_supported, 1);
        assert_eq!(stats.evidence_assigned, 3);
        assert_eq!(stats.evidence_unsupported, 1);
    }

    #[test]
    fn test_empty_stats() {
        let stats = CorrectionStats::new();
        assert_eq!(stats.reads_seen, 0);
        stats.print_summary();
    }
}
