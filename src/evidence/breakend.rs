//! Breakend and breakpoint location types.

use std::cmp::Ordering;

use crate::genome::LinearGenome;

/// Which side of the reference is retained at a breakend.
///
/// `Forward` anchors to a read's aligned end (sequence continues past the
/// 3' side of the anchor); `Backward` anchors to the aligned start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakendDirection {
    Forward,
    Backward,
}

impl BreakendDirection {
    /// Single-character prefix used in evidence identifiers.
    pub fn prefix(&self) -> char {
        match self {
            BreakendDirection::Forward => 'f',
            BreakendDirection::Backward => 'b',
        }
    }

    pub fn flip(&self) -> BreakendDirection {
        match self {
            BreakendDirection::Forward => BreakendDirection::Backward,
            BreakendDirection::Backward => BreakendDirection::Forward,
        }
    }
}

impl std::str::FromStr for BreakendDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" | "+" | "Forward" => Ok(Self::Forward),
            "b" | "-" | "Backward" => Ok(Self::Backward),
            _ => Err(format!("unknown breakend direction '{s}'")),
        }
    }
}

/// One side of a structural event: a directed position interval on a contig.
///
/// `start <= end` always holds; both bounds are 1-based inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakendSummary {
    pub ref_index: usize,
    pub direction: BreakendDirection,
    pub start: u64,
    pub end: u64,
}

impl BreakendSummary {
    pub fn new(ref_index: usize, direction: BreakendDirection, start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        BreakendSummary {
            ref_index,
            direction,
            start,
            end,
        }
    }

    /// Two breakends overlap when they sit on the same contig, face the
    /// same direction, and their intervals intersect.
    pub fn overlaps(&self, other: &BreakendSummary) -> bool {
        self.ref_index == other.ref_index
            && self.direction == other.direction
            && self.start <= other.end
            && other.start <= self.end
    }

    /// Interval expanded by `margin` on both sides (lower bound clamped
    /// at position 1).
    pub fn with_margin(&self, margin: u64) -> BreakendSummary {
        BreakendSummary {
            start: self.start.saturating_sub(margin).max(1),
            end: self.end + margin,
            ..*self
        }
    }

    /// Positional order: contig, then interval start, then interval end.
    pub fn cmp_by_start_end(&self, other: &BreakendSummary) -> Ordering {
        self.ref_index
            .cmp(&other.ref_index)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }

    pub fn start_linear(&self, genome: &LinearGenome) -> u64 {
        genome.linear(self.ref_index, self.start)
    }

    pub fn end_linear(&self, genome: &LinearGenome) -> u64 {
        genome.linear(self.ref_index, self.end)
    }
}

/// A pair of mated breakends describing one rearrangement junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakpointSummary {
    pub local: BreakendSummary,
    pub remote: BreakendSummary,
}

impl BreakpointSummary {
    pub fn new(local: BreakendSummary, remote: BreakendSummary) -> Self {
        BreakpointSummary { local, remote }
    }

    /// The two ends in canonical (low, high) order, so both mates of one
    /// event see the same ordered pair.
    pub fn low_high(&self) -> (&BreakendSummary, &BreakendSummary) {
        if self.local.cmp_by_start_end(&self.remote) != Ordering::Greater {
            (&self.local, &self.remote)
        } else {
            (&self.remote, &self.local)
        }
    }

    /// Canonical positional order comparing low ends, then high ends.
    /// Returns the same result regardless of which mate of each event is
    /// held locally.
    pub fn cmp_by_low_high(&self, other: &BreakpointSummary) -> Ordering {
        let (self_low, self_high) = self.low_high();
        let (other_low, other_high) = other.low_high();
        self_low
            .cmp_by_start_end(other_low)
            .then(self_high.cmp_by_start_end(other_high))
    }

    /// Breakpoints overlap only when both ends overlap.
    pub fn overlaps(&self, other: &BreakpointSummary) -> bool {
        self.local.overlaps(&other.local) && self.remote.overlaps(&other.remote)
    }

    pub fn with_margin(&self, margin: u64) -> BreakpointSummary {
        BreakpointSummary {
            local: self.local.with_margin(margin),
            remote: self.remote.with_margin(margin),
        }
    }

    /// The same junction viewed from the other side.
    pub fn flipped(&self) -> BreakpointSummary {
        BreakpointSummary {
            local: self.remote,
            remote: self.local,
        }
    }
}

/// Location of a call or a piece of evidence: a lone breakend, or a full
/// breakpoint when the remote side is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPosition {
    Breakend(BreakendSummary),
    Breakpoint(BreakpointSummary),
}

impl CallPosition {
    /// The locally-anchored end.
    pub fn local(&self) -> &BreakendSummary {
        match self {
            CallPosition::Breakend(b) => b,
            CallPosition::Breakpoint(bp) => &bp.local,
        }
    }

    /// Overlap test: two breakpoints must overlap at both ends; any other
    /// combination compares local ends only.
    pub fn overlaps(&self, other: &CallPosition) -> bool {
        match (self, other) {
            (CallPosition::Breakpoint(a), CallPosition::Breakpoint(b)) => a.overlaps(b),
            _ => self.local().overlaps(other.local()),
        }
    }

    pub fn with_margin(&self, margin: u64) -> CallPosition {
        match self {
            CallPosition::Breakend(b) => CallPosition::Breakend(b.with_margin(margin)),
            CallPosition::Breakpoint(bp) => CallPosition::Breakpoint(bp.with_margin(margin)),
        }
    }

    pub fn start_linear(&self, genome: &LinearGenome) -> u64 {
        self.local().start_linear(genome)
    }

    pub fn end_linear(&self, genome: &LinearGenome) -> u64 {
        self.local().end_linear(genome)
    }

    /// Positional order used for tie-breaking between competing calls:
    /// canonical low/high order for breakpoint pairs, plain start/end order
    /// otherwise.
    pub fn cmp_positional(&self, other: &CallPosition) -> Ordering {
        match (self, other) {
            (CallPosition::Breakpoint(a), CallPosition::Breakpoint(b)) => a.cmp_by_low_high(b),
            _ => self.local().cmp_by_start_end(other.local()),
        }
    }
}
