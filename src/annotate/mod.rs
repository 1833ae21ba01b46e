//! Sequential evidence annotation.
//!
//! Merges a sorted stream of candidate breakpoint calls with a sorted
//! stream of directed evidence. Calls near the head of the stream are held
//! in a bounded position-windowed buffer; each evidence record is assigned
//! to the overlapping buffered call(s) as it arrives, and calls are
//! finalized and emitted once no later evidence can overlap them. Output
//! order equals input call order.
//!
//! Both inputs must be non-decreasing in linear start coordinate. That is
//! a precondition on the collaborators producing them, not something this
//! module defends against.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::iter::Peekable;

use crate::allocate::identity_hash;
use crate::error::Error;
use crate::evidence::{CallPosition, DirectedEvidence};
use crate::genome::LinearGenome;
use crate::stats::AnnotationStats;

/// A breakpoint call awaiting evidence attribution.
#[derive(Debug, Clone)]
pub struct CandidateCall {
    pub id: Option<String>,
    pub mate_id: Option<String>,
    pub event_id: Option<String>,
    pub qual: f32,
    pub position: CallPosition,
}

impl CandidateCall {
    /// Quality must be a finite phred-scaled score >= 0.
    pub fn new(
        id: Option<String>,
        mate_id: Option<String>,
        event_id: Option<String>,
        qual: f32,
        position: CallPosition,
    ) -> Result<Self, Error> {
        if !qual.is_finite() || qual < 0.0 {
            return Err(Error::InvalidEvidence(format!(
                "call {} has invalid quality {qual}",
                id.as_deref().unwrap_or("<unnamed>")
            )));
        }
        Ok(CandidateCall {
            id,
            mate_id,
            event_id,
            qual,
            position,
        })
    }

    pub fn start_linear(&self, genome: &LinearGenome) -> u64 {
        self.position.start_linear(genome)
    }
}

/// Per-kind evidence tallies accumulated onto one call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SupportCounts {
    pub soft_clip: u32,
    pub realigned_soft_clip: u32,
    pub read_pair: u32,
    pub remote: u32,
    pub compound: u32,
    pub support_qual: f64,
}

impl SupportCounts {
    pub fn record(&mut self, evidence: &DirectedEvidence) {
        match evidence {
            DirectedEvidence::SoftClip(_) => self.soft_clip += 1,
            DirectedEvidence::RealignedSoftClip(_) => self.realigned_soft_clip += 1,
            DirectedEvidence::ReadPair(_) => self.read_pair += 1,
            DirectedEvidence::Remote(_) => self.remote += 1,
            DirectedEvidence::VariantCall(_) => self.compound += 1,
        }
        self.support_qual += evidence.support_score() as f64;
    }

    pub fn total(&self) -> u32 {
        self.soft_clip + self.realigned_soft_clip + self.read_pair + self.remote + self.compound
    }
}

/// A finalized call with its attributed evidence.
#[derive(Debug, Clone)]
pub struct AnnotatedCall {
    pub call: CandidateCall,
    pub support: SupportCounts,
    pub evidence_ids: Vec<String>,
}

/// Diagnostics collaborator receiving (evidence, call-or-none) pairs.
pub trait EvidenceSink {
    fn write_evidence(&mut self, evidence: &DirectedEvidence, call: Option<&CandidateCall>);
}

/// Annotator configuration.
#[derive(Debug, Clone, Copy)]
pub struct AnnotatorConfig {
    /// Maximum span of any call's position interval in the input stream.
    pub max_call_range: u64,
    /// Slack added around evidence intervals before overlap testing.
    pub breakend_margin: u64,
    /// Attribute each evidence record to the single best overlapping call
    /// instead of every overlapping call.
    pub assign_to_single_best: bool,
    /// Drain and account for leftover evidence at end of stream.
    pub sanity_check: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        AnnotatorConfig {
            max_call_range: 1000,
            breakend_margin: 10,
            assign_to_single_best: true,
            sanity_check: false,
        }
    }
}

struct ActiveVariant {
    call: CandidateCall,
    start_linear: u64,
    support: SupportCounts,
    evidence_ids: Vec<String>,
    /// Attributed evidence retained for the dump collaborator, which wants
    /// each pair written with the finalized call.
    dump_pending: Vec<DirectedEvidence>,
}

impl ActiveVariant {
    fn new(call: CandidateCall, genome: &LinearGenome) -> Self {
        let start_linear = call.start_linear(genome);
        ActiveVariant {
            call,
            start_linear,
            support: SupportCounts::default(),
            evidence_ids: Vec::new(),
            dump_pending: Vec::new(),
        }
    }

    fn attribute(&mut self, evidence: DirectedEvidence, keep_for_dump: bool) {
        self.evidence_ids.push(evidence.evidence_id());
        self.support.record(&evidence);
        if keep_for_dump {
            self.dump_pending.push(evidence);
        }
    }
}

/// Orders competing calls for single-best assignment: higher score wins;
/// positional ties use the canonical low/high order (reversed, so the
/// earlier position wins) to keep both mates of one event consistent;
/// remaining ties fall through to event id then call id.
fn cmp_by_score_then_position(a: &ActiveVariant, b: &ActiveVariant) -> Ordering {
    a.call
        .qual
        .partial_cmp(&b.call.qual)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.call.position.cmp_positional(&a.call.position))
        .then_with(|| a.call.event_id.cmp(&b.call.event_id))
        .then_with(|| a.call.id.cmp(&b.call.id))
}

/// Lazy, resumable annotator: one output call per `next()`.
pub struct SequentialEvidenceAnnotator<'g, C, E>
where
    C: Iterator<Item = CandidateCall>,
    E: Iterator<Item = DirectedEvidence>,
{
    genome: &'g LinearGenome,
    calls: C,
    evidence: Peekable<E>,
    config: AnnotatorConfig,
    buffer: VecDeque<ActiveVariant>,
    /// call id -> sequence number of the buffered call carrying it
    buffered_ids: rustc_hash::FxHashMap<String, u64>,
    next_seq: u64,
    dump: Option<Box<dyn EvidenceSink + 'g>>,
    stats: AnnotationStats,
    done: bool,
}

impl<'g, C, E> SequentialEvidenceAnnotator<'g, C, E>
where
    C: Iterator<Item = CandidateCall>,
    E: Iterator<Item = DirectedEvidence>,
{
    pub fn new(
        genome: &'g LinearGenome,
        calls: C,
        evidence: E,
        config: AnnotatorConfig,
        dump: Option<Box<dyn EvidenceSink + 'g>>,
    ) -> Self {
        SequentialEvidenceAnnotator {
            genome,
            calls,
            evidence: evidence.peekable(),
            config,
            buffer: VecDeque::new(),
            buffered_ids: rustc_hash::FxHashMap::default(),
            next_seq: 0,
            dump,
            stats: AnnotationStats::new(),
            done: false,
        }
    }

    pub fn stats(&self) -> &AnnotationStats {
        &self.stats
    }

    /// Sequence number of the call at the head of the buffer.
    fn head_seq(&self) -> u64 {
        self.next_seq - self.buffer.len() as u64
    }

    fn buffer_call(&mut self, call: CandidateCall) {
        let av = ActiveVariant::new(call, self.genome);
        if let Some(id) = &av.call.id {
            if !id.is_empty() {
                self.buffered_ids.insert(id.clone(), self.next_seq);
            }
        }
        self.next_seq += 1;
        self.buffer.push_back(av);
    }

    /// Pull calls until one past the given bound is buffered, guaranteeing
    /// any evidence overlapping the head call has its candidate mates in
    /// the buffer.
    fn buffer_calls_before(&mut self, position: u64) {
        while self
            .buffer
            .back()
            .is_none_or(|v| v.start_linear <= position)
        {
            match self.calls.next() {
                Some(call) => self.buffer_call(call),
                None => break,
            }
        }
    }

    /// Pull and assign every evidence record starting at or before the
    /// given bound (margin-adjusted).
    fn process_evidence_before(&mut self, position: u64) {
        let genome = self.genome;
        let margin = self.config.breakend_margin;
        while let Some(e) = self.evidence.next_if(|e| {
            e.breakend().start_linear(genome).saturating_sub(margin) <= position
        }) {
            self.assign_evidence(e);
        }
    }

    /// Assign one evidence record to the overlapping buffered call(s), or
    /// report it as unsupported.
    fn assign_evidence(&mut self, evidence: DirectedEvidence) {
        let position = evidence.position().with_margin(self.config.breakend_margin);
        let end_linear = position.local().end_linear(self.genome);
        let keep_for_dump = self.dump.is_some();
        let mut assigned = false;

        if self.config.assign_to_single_best {
            let mut best: Option<usize> = None;
            for (i, v) in self.buffer.iter().enumerate() {
                if v.start_linear > end_linear {
                    break;
                }
                if v.call.position.overlaps(&position) {
                    let better = match best {
                        None => true,
                        Some(b) => {
                            cmp_by_score_then_position(v, &self.buffer[b]) == Ordering::Greater
                        }
                    };
                    if better {
                        best = Some(i);
                    }
                }
            }
            if let Some(best_index) = best {
                let target = self.resolve_mate_handoff(best_index, &position, &evidence);
                self.buffer[target].attribute(evidence.clone(), keep_for_dump);
                assigned = true;
            }
        } else {
            for v in self.buffer.iter_mut() {
                if v.start_linear > end_linear {
                    break;
                }
                if v.call.position.overlaps(&position) {
                    v.attribute(evidence.clone(), keep_for_dump);
                    assigned = true;
                }
            }
        }

        if !assigned {
            self.stats.record_unsupported();
            if let Some(dump) = &mut self.dump {
                // the evidence supports no call; record it before dropping
                dump.write_evidence(&evidence, None);
            }
        }
    }

    /// When the chosen call's mate is also buffered and also overlaps the
    /// evidence, a deterministic split decides which side keeps it.
    fn resolve_mate_handoff(
        &self,
        best_index: usize,
        position: &CallPosition,
        evidence: &DirectedEvidence,
    ) -> usize {
        let best = &self.buffer[best_index];
        let mate_index = best
            .call
            .mate_id
            .as_ref()
            .and_then(|mid| self.buffered_ids.get(mid))
            .map(|&seq| (seq - self.head_seq()) as usize);
        match mate_index {
            Some(mi)
                if mi != best_index
                    && self.buffer[mi].call.position.overlaps(position)
                    && assign_to_mate_breakend(evidence) =>
            {
                mi
            }
            _ => best_index,
        }
    }

    fn finalize(&mut self, v: ActiveVariant) -> AnnotatedCall {
        self.stats.record_call(v.evidence_ids.len());
        let annotated = AnnotatedCall {
            call: v.call,
            support: v.support,
            evidence_ids: v.evidence_ids,
        };
        if let Some(dump) = &mut self.dump {
            for evidence in &v.dump_pending {
                dump.write_evidence(evidence, Some(&annotated.call));
            }
        }
        annotated
    }
}

impl<'g, C, E> Iterator for SequentialEvidenceAnnotator<'g, C, E>
where
    C: Iterator<Item = CandidateCall>,
    E: Iterator<Item = DirectedEvidence>,
{
    type Item = AnnotatedCall;

    fn next(&mut self) -> Option<AnnotatedCall> {
        if self.done {
            return None;
        }
        if self.buffer.is_empty() {
            match self.calls.next() {
                Some(call) => self.buffer_call(call),
                None => {
                    if self.config.sanity_check {
                        // no further calls can be made; account for the
                        // remaining evidence as a diagnostic
                        while let Some(e) = self.evidence.next() {
                            self.assign_evidence(e);
                        }
                    }
                    self.done = true;
                    return None;
                }
            }
        }
        let head_start = self.buffer.front()?.start_linear;
        self.buffer_calls_before(head_start + 2 * (self.config.max_call_range + 1));
        self.process_evidence_before(head_start + self.config.max_call_range + 1);
        let v = self.buffer.pop_front()?;
        if let Some(id) = &v.call.id {
            self.buffered_ids.remove(id);
        }
        Some(self.finalize(v))
    }
}

/// Decides whether evidence overlapping both mates of one event attaches
/// to the mate ("high") call instead of the chosen one. The split must be
/// even-handed and deterministic, and the local and remote observations of
/// the same physical evidence must land on opposite sides, so the decision
/// is a parity function of a per-evidence-family common identifier, with a
/// flip bit separating the paired views.
pub fn assign_to_mate_breakend(evidence: &DirectedEvidence) -> bool {
    let (common_identifier, flip) = match evidence {
        DirectedEvidence::ReadPair(dp) => {
            // read name is shared by both sides of a discordant pair
            (dp.local().name.clone(), dp.local().segment_index() == 1)
        }
        DirectedEvidence::Remote(rm) => (rm.as_local().evidence_id(), true),
        DirectedEvidence::VariantCall(vc) => (vc.common_identifier(), false),
        other => (other.evidence_id(), false),
    };
    let mut allocate_mate = identity_hash(&common_identifier).count_ones() & 1 == 1;
    allocate_mate ^= flip;
    allocate_mate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{
        BreakendDirection, BreakendSummary, BreakpointSummary, CigarOp, ReadRecord,
        SoftClipEvidence, VariantCallEvidence,
    };
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn genome() -> LinearGenome {
        LinearGenome::with_padding(
            vec![("chr1".to_string(), 100_000), ("chr2".to_string(), 100_000)],
            10_000,
        )
    }

    fn be(ref_index: usize, start: u64, end: u64) -> BreakendSummary {
        BreakendSummary::new(ref_index, BreakendDirection::Forward, start, end)
    }

    fn call(id: &str, mate: Option<&str>, event: Option<&str>, qual: f32, pos: CallPosition) -> CandidateCall {
        CandidateCall::new(
            Some(id.to_string()),
            mate.map(str::to_string),
            event.map(str::to_string),
            qual,
            pos,
        )
        .unwrap()
    }

    fn breakend_call(id: &str, qual: f32, start: u64, end: u64) -> CandidateCall {
        call(id, None, None, qual, CallPosition::Breakend(be(0, start, end)))
    }

    fn soft_clip_at(name: &str, clip_pos: u64) -> DirectedEvidence {
        // 30M anchors ending exactly at clip_pos
        let record = Arc::new(ReadRecord {
            name: name.to_string(),
            ref_index: Some(0),
            start: clip_pos - 29,
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

    #[derive(Default)]
    struct RecordingSink {
        rows: Rc<RefCell<Vec<(String, Option<String>)>>>,
    }

    impl EvidenceSink for RecordingSink {
        fn write_evidence(&mut self, evidence: &DirectedEvidence, call: Option<&CandidateCall>) {
            self.rows.borrow_mut().push((
                evidence.evidence_id(),
                call.and_then(|c| c.id.clone()),
            ));
        }
    }

    fn annotate(
        genome: &LinearGenome,
        calls: Vec<CandidateCall>,
        evidence: Vec<DirectedEvidence>,
        config: AnnotatorConfig,
    ) -> Vec<AnnotatedCall> {
        SequentialEvidenceAnnotator::new(
            genome,
            calls.into_iter(),
            evidence.into_iter(),
            config,
            None,
        )
        .collect()
    }

    #[test]
    fn test_output_preserves_input_call_order() {
        let g = genome();
        let calls = vec![
            breakend_call("a", 50.0, 100, 110),
            breakend_call("b", 10.0, 150, 160),
            breakend_call("c", 90.0, 5000, 5010),
            breakend_call("d", 30.0, 5000, 5010),
        ];
        let out = annotate(&g, calls, Vec::new(), AnnotatorConfig::default());
        let ids: Vec<_> = out.iter().map(|c| c.call.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_overlapping_evidence_assigned() {
        let g = genome();
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        let evidence = vec![soft_clip_at("r1", 1005)];
        let out = annotate(&g, calls, evidence, AnnotatorConfig::default());
        assert_eq!(out[0].evidence_ids, vec!["fr1"]);
        assert_eq!(out[0].support.soft_clip, 1);
    }

    #[test]
    fn test_margin_rescues_near_miss() {
        let g = genome();
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        // clip 5 positions past the call end; margin 10 bridges it
        let evidence = vec![soft_clip_at("r1", 1015)];
        let config = AnnotatorConfig {
            breakend_margin: 10,
            ..Default::default()
        };
        let out = annotate(&g, calls, evidence, config);
        assert_eq!(out[0].support.soft_clip, 1);
        // and margin 0 does not
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        let evidence = vec![soft_clip_at("r1", 1015)];
        let config = AnnotatorConfig {
            breakend_margin: 0,
            ..Default::default()
        };
        let out = annotate(&g, calls, evidence, config);
        assert_eq!(out[0].support.soft_clip, 0);
    }

    #[test]
    fn test_evidence_outside_window_never_attributed() {
        let g = genome();
        let config = AnnotatorConfig {
            max_call_range: 100,
            breakend_margin: 10,
            ..Default::default()
        };
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        let evidence = vec![soft_clip_at("far", 9000)];
        let out = annotate(&g, calls, evidence, config);
        assert_eq!(out[0].support.total(), 0);
    }

    #[test]
    fn test_assign_to_single_best_prefers_higher_score() {
        let g = genome();
        let calls = vec![
            breakend_call("low", 10.0, 1000, 1010),
            breakend_call("high", 90.0, 1002, 1012),
        ];
        let evidence = vec![soft_clip_at("r1", 1005)];
        let out = annotate(&g, calls, evidence, AnnotatorConfig::default());
        let low = &out[0];
        let high = &out[1];
        assert_eq!(low.support.total(), 0);
        assert_eq!(high.support.total(), 1);
    }

    #[test]
    fn test_assign_to_all_attributes_every_overlap() {
        let g = genome();
        let calls = vec![
            breakend_call("low", 10.0, 1000, 1010),
            breakend_call("high", 90.0, 1002, 1012),
        ];
        let evidence = vec![soft_clip_at("r1", 1005)];
        let config = AnnotatorConfig {
            assign_to_single_best: false,
            ..Default::default()
        };
        let out = annotate(&g, calls, evidence, config);
        assert_eq!(out[0].support.total(), 1);
        assert_eq!(out[1].support.total(), 1);
    }

    #[test]
    fn test_mate_handoff_deterministic_single_side() {
        // an inversion-style event: both breakends face Forward, at 100 and
        // 104, equal score. A soft clip spanning both (via its margin) must
        // land on exactly one side, and reruns must agree.
        let g = genome();
        let bp_low = CallPosition::Breakpoint(BreakpointSummary::new(
            be(0, 100, 100),
            be(0, 104, 104),
        ));
        let bp_high = CallPosition::Breakpoint(BreakpointSummary::new(
            be(0, 104, 104),
            be(0, 100, 100),
        ));
        let make_inputs = || {
            let calls = vec![
                call("e1o", Some("e1h"), Some("E1"), 30.0, bp_low),
                call("e1h", Some("e1o"), Some("E1"), 30.0, bp_high),
            ];
            let evidence = vec![soft_clip_at("r1", 102)];
            (calls, evidence)
        };

        let (calls, evidence) = make_inputs();
        let first = annotate(&g, calls, evidence, AnnotatorConfig::default());
        let supported: Vec<bool> = first.iter().map(|c| c.support.total() > 0).collect();
        assert_eq!(
            supported.iter().filter(|&&s| s).count(),
            1,
            "evidence must attach to exactly one mate"
        );

        let (calls, evidence) = make_inputs();
        let second = annotate(&g, calls, evidence, AnnotatorConfig::default());
        let rerun: Vec<bool> = second.iter().map(|c| c.support.total() > 0).collect();
        assert_eq!(supported, rerun);
    }

    #[test]
    fn test_mate_handoff_splits_compound_evidence_by_event() {
        // call-derived evidence hashes its event id, so both observations
        // of one compound event make the same low/high choice
        let e = DirectedEvidence::VariantCall(VariantCallEvidence {
            id: "cA".to_string(),
            event_id: Some("E9".to_string()),
            position: CallPosition::Breakend(be(0, 100, 100)),
            qual: 25.0,
            breakend_sequence: None,
            breakend_quality: None,
        });
        let mate = DirectedEvidence::VariantCall(VariantCallEvidence {
            id: "cB".to_string(),
            event_id: Some("E9".to_string()),
            position: CallPosition::Breakend(be(0, 104, 104)),
            qual: 25.0,
            breakend_sequence: None,
            breakend_quality: None,
        });
        assert_eq!(assign_to_mate_breakend(&e), assign_to_mate_breakend(&mate));
    }

    #[test]
    fn test_unsupported_evidence_dumped_once_with_no_call() {
        let g = genome();
        let rows = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink { rows: rows.clone() };
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        // inside the processing window, but overlapping nothing
        let evidence = vec![soft_clip_at("orphan", 1050)];
        let config = AnnotatorConfig {
            max_call_range: 100,
            ..Default::default()
        };
        let out: Vec<AnnotatedCall> = SequentialEvidenceAnnotator::new(
            &g,
            calls.into_iter(),
            evidence.into_iter(),
            config,
            Some(Box::new(sink)),
        )
        .collect();
        assert!(out[0].evidence_ids.is_empty());
        let rows = rows.borrow();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], ("forphan".to_string(), None));
    }

    #[test]
    fn test_assigned_evidence_dumped_with_final_call() {
        let g = genome();
        let rows = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink { rows: rows.clone() };
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        let evidence = vec![soft_clip_at("r1", 1005)];
        let _: Vec<AnnotatedCall> = SequentialEvidenceAnnotator::new(
            &g,
            calls.into_iter(),
            evidence.into_iter(),
            AnnotatorConfig::default(),
            Some(Box::new(sink)),
        )
        .collect();
        let rows = rows.borrow();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], ("fr1".to_string(), Some("a".to_string())));
    }

    #[test]
    fn test_sanity_check_drains_trailing_evidence() {
        let g = genome();
        let rows = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink { rows: rows.clone() };
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        // far beyond the last call; only pulled in sanity-check mode
        let evidence = vec![soft_clip_at("late", 90_000)];
        let config = AnnotatorConfig {
            sanity_check: true,
            ..Default::default()
        };
        let mut annotator = SequentialEvidenceAnnotator::new(
            &g,
            calls.into_iter(),
            evidence.into_iter(),
            config,
            Some(Box::new(sink)),
        );
        assert!(annotator.next().is_some());
        assert!(annotator.next().is_none());
        assert_eq!(annotator.stats().evidence_unsupported, 1);
        assert_eq!(rows.borrow().len(), 1);
    }

    #[test]
    fn test_stats_track_assignment() {
        let g = genome();
        let calls = vec![breakend_call("a", 50.0, 1000, 1010)];
        let evidence = vec![soft_clip_at("r1", 1005)];
        let mut annotator = SequentialEvidenceAnnotator::new(
            &g,
            calls.into_iter(),
            evidence.into_iter(),
            AnnotatorConfig::default(),
            None,
        );
        while annotator.next().is_some() {}
        assert_eq!(annotator.stats().calls_annotated, 1);
        assert_eq!(annotator.stats().calls_supported, 1);
        assert_eq!(annotator.stats().evidence_assigned, 1);
    }

    #[test]
    fn test_parity_split_is_stable_per_identifier() {
        let e1 = soft_clip_at("readA", 1005);
        let e2 = soft_clip_at("readA", 1005);
        assert_eq!(assign_to_mate_breakend(&e1), assign_to_mate_breakend(&e2));
    }

    #[test]
    fn test_remote_view_flips_allocation_side() {
        let local = Arc::new(ReadRecord {
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
        let clip = SoftClipEvidence::new(local, BreakendDirection::Forward).unwrap();
        let realigned = Arc::new(ReadRecord {
            name: "r1".to_string(),
            ref_index: Some(1),
            start: 5000,
            mapq: 40,
            cigar: vec![CigarOp::Match(20)],
            bases: vec![b'A'; 20],
            quals: vec![30; 20],
            ..Default::default()
        });
        let re = crate::evidence::RealignedSoftClipEvidence::new(clip, realigned).unwrap();
        let local_view = DirectedEvidence::RealignedSoftClip(re.clone());
        let remote_view =
            DirectedEvidence::Remote(crate::evidence::RemoteEvidence::new(re));
        assert_ne!(
            assign_to_mate_breakend(&local_view),
            assign_to_mate_breakend(&remote_view),
            "the two views of one physical record must take opposite sides"
        );
    }
}
