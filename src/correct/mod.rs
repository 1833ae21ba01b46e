//! K-mer frequency based sequencing-error correction.
//!
//! Reads destined for assembly graphs are cleaned first: k-mers observed
//! rarely relative to a hamming-distance-1 neighbour are presumed to be
//! sequencing errors of that neighbour, and the read bases are rewritten
//! accordingly. The corrector is a two-phase object: a mutable counting
//! builder frozen into an immutable collapse lookup before any read is
//! touched.

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::kmer::{
    MAX_K, PackedSequence, bases_different, bases_matching, neighbour_xor_patterns,
    reverse_complement_in_place,
};
use crate::stats::CorrectionStats;

/// Cap on corrections applied to any single read, bounding the risk of
/// over-correction walking a read away from its true sequence.
pub const MAX_BASE_CORRECTIONS: usize = 2;

/// One read scheduled for correction, with the strand its k-mers should be
/// counted on.
pub struct CorrectionTarget<'a> {
    pub bases: &'a mut Vec<u8>,
    pub reverse_complement: bool,
}

/// Counting-phase builder: accumulates k-mer frequencies across all reads.
pub struct ReadErrorCorrector {
    k: usize,
    collapse_multiple: f32,
    counts: FxHashMap<u64, u32>,
    max_count: u32,
    neighbour_xor: Vec<u64>,
}

impl ReadErrorCorrector {
    pub fn new(k: usize, collapse_multiple: f32) -> Result<Self, Error> {
        if k < 2 || k > MAX_K {
            return Err(Error::Parameter(format!(
                "k-mer size must be between 2 and {MAX_K}, got {k}"
            )));
        }
        if collapse_multiple <= 1.0 {
            return Err(Error::Parameter(format!(
                "collapse multiple must exceed 1, got {collapse_multiple}"
            )));
        }
        Ok(ReadErrorCorrector {
            k,
            collapse_multiple,
            counts: FxHashMap::default(),
            max_count: 0,
            neighbour_xor: neighbour_xor_patterns(k),
        })
    }

    /// Slide a k-mer window across the read and count every k-mer.
    pub fn count_kmers(&mut self, bases: &[u8], reverse_complement: bool) {
        if bases.len() < self.k {
            return;
        }
        let ps = PackedSequence::new(bases, reverse_complement);
        for i in 0..=ps.len() - self.k {
            let count = self.counts.entry(ps.kmer(i, self.k)).or_insert(0);
            *count += 1;
            if *count > self.max_count {
                self.max_count = *count;
            }
        }
    }

    /// Hamming-distance-1 neighbour with the highest count. Returns the
    /// input k-mer when every neighbour is unobserved.
    fn best_neighbour(&self, kmer: u64) -> u64 {
        let mut best_kmer = kmer;
        let mut best_count = 0;
        for xor in &self.neighbour_xor {
            let neighbour = kmer ^ xor;
            let count = self.counts.get(&neighbour).copied().unwrap_or(0);
            if count > best_count {
                best_kmer = neighbour;
                best_count = count;
            }
        }
        best_kmer
    }

    /// Freeze the counts into the collapse lookup. A k-mer collapses onto
    /// its best neighbour only when the frequency imbalance is at least the
    /// configured multiple; k-mers too frequent to ever collapse are
    /// skipped without a neighbour scan.
    pub fn build_lookup(&self) -> CollapseLookup {
        let mut lookup = FxHashMap::default();
        let max_collapse_count = (self.max_count as f32 / self.collapse_multiple).floor() as u32;
        for (&kmer, &count) in &self.counts {
            if count <= max_collapse_count {
                let best = self.best_neighbour(kmer);
                let best_count = self.counts.get(&best).copied().unwrap_or(0);
                if count as f32 * self.collapse_multiple <= best_count as f32 {
                    lookup.insert(kmer, best);
                }
            }
        }
        log::debug!(
            "collapsed {} of {} kmers",
            lookup.len(),
            self.counts.len()
        );
        CollapseLookup {
            k: self.k,
            lookup,
        }
    }
}

/// Frozen collapse map: weak k-mer -> strong neighbour.
pub struct CollapseLookup {
    k: usize,
    lookup: FxHashMap<u64, u64>,
}

impl CollapseLookup {
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Correct a read in place. Rules fire in priority order — interior,
    /// then start, then end — until none fires or the per-read cap is hit.
    /// Reads shorter than k are left untouched. Returns the number of
    /// corrections applied.
    pub fn error_correct(&self, bases: &mut [u8], reverse_complement: bool) -> usize {
        if bases.len() < self.k {
            return 0;
        }
        let mut ps = PackedSequence::new(bases, reverse_complement);
        let mut changes = 0;
        while self.correct_interior(&mut ps)
            || self.correct_start(&mut ps)
            || self.correct_end(&mut ps)
        {
            changes += 1;
            if changes >= MAX_BASE_CORRECTIONS {
                break;
            }
        }
        if changes > 0 {
            let mut out = ps.to_bytes();
            if reverse_complement {
                reverse_complement_in_place(&mut out);
            }
            bases.copy_from_slice(&out);
        }
        changes
    }

    /// Interior rule: adjacent k-mer windows that both collapse and agree
    /// on the same substitution over their k-2 shared bases.
    fn correct_interior(&self, ps: &mut PackedSequence) -> bool {
        let k = self.k;
        if ps.len() < k + 2 {
            return false;
        }
        for i in 1..ps.len() - k {
            let left = ps.kmer(i - 1, k);
            if let Some(&left_transform) = self.lookup.get(&left) {
                let right = ps.kmer(i + 1, k);
                if let Some(&right_transform) = self.lookup.get(&right) {
                    // the windows overlap on k-2 bases; both transforms must
                    // agree there for the substitution to be trusted
                    if bases_matching(k - 2, left_transform, right_transform >> 4) == k - 2 {
                        ps.set_kmer(left_transform, i - 1, k);
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Start rule: the first k-mer collapses and the difference is confined
    /// to its two leading bases.
    fn correct_start(&self, ps: &mut PackedSequence) -> bool {
        let k = self.k;
        let kmer = ps.kmer(0, k);
        if let Some(&transform) = self.lookup.get(&kmer) {
            if bases_different(k - 2, kmer, transform) == 0 {
                ps.set_kmer(transform, 0, k);
                return true;
            }
        }
        false
    }

    /// End rule: the last k-mer collapses and the differing base is within
    /// its two trailing bases.
    fn correct_end(&self, ps: &mut PackedSequence) -> bool {
        let k = self.k;
        let pos = ps.len() - k;
        let kmer = ps.kmer(pos, k);
        if let Some(&transform) = self.lookup.get(&kmer) {
            if (kmer ^ transform) & 0xF != 0 {
                ps.set_kmer(transform, pos, k);
                return true;
            }
        }
        false
    }
}

/// Count, freeze, correct: the full pass over a deduplicated target list.
pub fn error_correct_reads(
    k: usize,
    collapse_multiple: f32,
    mut targets: Vec<CorrectionTarget<'_>>,
) -> Result<CorrectionStats, Error> {
    let mut corrector = ReadErrorCorrector::new(k, collapse_multiple)?;
    for target in &targets {
        corrector.count_kmers(&target.bases[..], target.reverse_complement);
    }
    let lookup = corrector.build_lookup();
    let mut stats = CorrectionStats::default();
    for target in &mut targets {
        let changes = lookup.error_correct(&mut target.bases[..], target.reverse_complement);
        stats.record(changes);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct_all(k: usize, multiple: f32, reads: &mut [Vec<u8>]) -> Vec<usize> {
        let mut corrector = ReadErrorCorrector::new(k, multiple).unwrap();
        for read in reads.iter() {
            corrector.count_kmers(read, false);
        }
        let lookup = corrector.build_lookup();
        reads
            .iter_mut()
            .map(|r| lookup.error_correct(r, false))
            .collect()
    }

    #[test]
    fn test_k_out_of_range_rejected() {
        assert!(matches!(
            ReadErrorCorrector::new(32, 8.0),
            Err(Error::Parameter(_))
        ));
        assert!(matches!(
            ReadErrorCorrector::new(1, 8.0),
            Err(Error::Parameter(_))
        ));
        assert!(ReadErrorCorrector::new(31, 8.0).is_ok());
    }

    #[test]
    fn test_collapse_multiple_must_exceed_one() {
        assert!(matches!(
            ReadErrorCorrector::new(4, 1.0),
            Err(Error::Parameter(_))
        ));
    }

    #[test]
    fn test_single_error_corrected() {
        // ten clean copies dominate the one divergent read
        let mut reads: Vec<Vec<u8>> = (0..10).map(|_| b"AAAAAAAAA".to_vec()).collect();
        reads.push(b"AAAATAAAA".to_vec());
        let changes = correct_all(4, 2.0, &mut reads);
        assert_eq!(reads[10], b"AAAAAAAAA".to_vec());
        assert_eq!(changes[10], 1);
        assert!(changes[..10].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_idempotent_once_converged() {
        let mut reads: Vec<Vec<u8>> = (0..10).map(|_| b"AAAAAAAAA".to_vec()).collect();
        reads.push(b"AAAATAAAA".to_vec());
        correct_all(4, 2.0, &mut reads);
        let corrected = reads.clone();
        let rerun = correct_all(4, 2.0, &mut reads);
        assert_eq!(reads, corrected);
        assert!(rerun.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_corrections_capped_per_read() {
        // two separated errors in one read against a strong background
        let clean = b"ACGTACGTACGTACGTACGTACGT".to_vec();
        let mut noisy = clean.clone();
        noisy[5] = b'A';
        noisy[18] = b'C';
        let mut reads: Vec<Vec<u8>> = (0..20).map(|_| clean.clone()).collect();
        reads.push(noisy);
        let changes = correct_all(4, 2.0, &mut reads);
        assert!(changes[20] <= MAX_BASE_CORRECTIONS);
    }

    #[test]
    fn test_short_read_untouched() {
        let mut reads: Vec<Vec<u8>> = (0..10).map(|_| b"AAAAAAAAA".to_vec()).collect();
        reads.push(b"ACG".to_vec());
        let changes = correct_all(4, 2.0, &mut reads);
        assert_eq!(reads[10], b"ACG".to_vec());
        assert_eq!(changes[10], 0);
    }

    #[test]
    fn test_end_error_corrected() {
        let mut reads: Vec<Vec<u8>> = (0..10).map(|_| b"AAAAAAAAA".to_vec()).collect();
        reads.push(b"AAAAAAAAT".to_vec());
        let changes = correct_all(4, 2.0, &mut reads);
        assert_eq!(reads[10], b"AAAAAAAAA".to_vec());
        assert_eq!(changes[10], 1);
    }

    #[test]
    fn test_start_error_corrected() {
        let mut reads: Vec<Vec<u8>> = (0..10).map(|_| b"AAAAAAAAA".to_vec()).collect();
        reads.push(b"TAAAAAAAA".to_vec());
        let changes = correct_all(4, 2.0, &mut reads);
        assert_eq!(reads[10], b"AAAAAAAAA".to_vec());
        assert_eq!(changes[10], 1);
    }

    #[test]
    fn test_no_collapse_without_frequency_imbalance() {
        // two reads at equal depth: neither k-mer set dominates
        let mut reads = vec![b"ACGTACGTA".to_vec(), b"ACGTTCGTA".to_vec()];
        let changes = correct_all(4, 2.0, &mut reads);
        assert_eq!(changes, vec![0, 0]);
    }

    #[test]
    fn test_reverse_complement_counting_and_correction() {
        // the divergent read is presented rc; correction must land on the
        // original strand's bases
        let mut corrector = ReadErrorCorrector::new(4, 2.0).unwrap();
        for _ in 0..10 {
            corrector.count_kmers(b"AAAAAAAAA", false);
        }
        // rc of TTTTATTTT is AAAATAAAA
        let mut noisy = b"TTTTATTTT".to_vec();
        corrector.count_kmers(&noisy, true);
        let lookup = corrector.build_lookup();
        let changes = lookup.error_correct(&mut noisy, true);
        assert_eq!(changes, 1);
        assert_eq!(noisy, b"TTTTTTTTT".to_vec());
    }

    #[test]
    fn test_driver_stats() {
        let mut clean: Vec<Vec<u8>> = (0..10).map(|_| b"AAAAAAAAA".to_vec()).collect();
        let mut noisy = b"AAAATAAAA".to_vec();
        let mut targets: Vec<CorrectionTarget<'_>> = clean
            .iter_mut()
            .map(|r| CorrectionTarget {
                bases: r,
                reverse_complement: false,
            })
            .collect();
        targets.push(CorrectionTarget {
            bases: &mut noisy,
            reverse_complement: false,
        });
        let stats = error_correct_reads(4, 2.0, targets).unwrap();
        assert_eq!(stats.reads_seen, 11);
        assert_eq!(stats.reads_corrected, 1);
        assert_eq!(stats.bases_corrected, 1);
    }
}
