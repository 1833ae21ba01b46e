//! Linear genome coordinates.
//!
//! All windowing and comparison in the annotator happens on a single
//! total-ordered integer axis obtained by concatenating per-contig
//! coordinate spaces. A configurable inter-contig padding keeps position
//! windows on one contig from bleeding into the next.

use rustc_hash::FxHashMap;

use crate::error::Error;

/// Contig name/length table with precomputed linear offsets.
#[derive(Debug, Clone)]
pub struct LinearGenome {
    names: Vec<String>,
    lengths: Vec<u64>,
    starts: Vec<u64>,
    index: FxHashMap<String, usize>,
}

impl LinearGenome {
    /// Build with no inter-contig padding.
    pub fn new(contigs: Vec<(String, u64)>) -> Self {
        Self::with_padding(contigs, 0)
    }

    /// Build with `padding` unmapped positions between consecutive contigs.
    ///
    /// Callers that window over linear coordinates should pass at least the
    /// window width so a window anchored near a contig end cannot reach
    /// coordinates of the following contig.
    pub fn with_padding(contigs: Vec<(String, u64)>, padding: u64) -> Self {
        let mut names = Vec::with_capacity(contigs.len());
        let mut lengths = Vec::with_capacity(contigs.len());
        let mut starts = Vec::with_capacity(contigs.len());
        let mut index = FxHashMap::default();

        let mut offset = 1u64;
        for (i, (name, length)) in contigs.into_iter().enumerate() {
            starts.push(offset);
            offset += length + padding;
            index.insert(name.clone(), i);
            names.push(name);
            lengths.push(length);
        }

        LinearGenome {
            names,
            lengths,
            starts,
            index,
        }
    }

    /// Linear coordinate of a 1-based position on a contig.
    #[inline]
    pub fn linear(&self, ref_index: usize, pos: u64) -> u64 {
        self.starts[ref_index] + pos
    }

    pub fn contig_count(&self) -> usize {
        self.names.len()
    }

    pub fn name(&self, ref_index: usize) -> &str {
        &self.names[ref_index]
    }

    pub fn length(&self, ref_index: usize) -> u64 {
        self.lengths[ref_index]
    }

    /// Contig index by name, or a call-table error naming the contig.
    pub fn index_of(&self, name: &str) -> Result<usize, Error> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::CallTable(format!("unknown contig '{name}'")))
    }

    /// Contig names in index order, for writers that only need labels.
    pub fn contig_names(&self) -> Vec<String> {
        self.names.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome() -> LinearGenome {
        LinearGenome::with_padding(
            vec![("chr1".to_string(), 1000), ("chr2".to_string(), 500)],
            100,
        )
    }

    #[test]
    fn test_linear_is_total_order_across_contigs() {
        let g = genome();
        let last_chr1 = g.linear(0, 1000);
        let first_chr2 = g.linear(1, 1);
        assert!(last_chr1 < first_chr2);
        // padding separates the contigs by more than the window
        assert!(first_chr2 - last_chr1 > 100);
    }

    #[test]
    fn test_linear_monotonic_within_contig() {
        let g = genome();
        assert_eq!(g.linear(0, 11) - g.linear(0, 10), 1);
    }

    #[test]
    fn test_index_of() {
        let g = genome();
        assert_eq!(g.index_of("chr2").unwrap(), 1);
        assert!(g.index_of("chrMT").is_err());
    }

    #[test]
    fn test_accessors() {
        let g = genome();
        assert_eq!(g.contig_count(), 2);
        assert_eq!(g.name(0), "chr1");
        assert_eq!(g.length(1), 500);
    }
}
