//! Police intelligence aggregation and arrest decisions.
//!
//! The police keep every report they receive in a [`ReportBuffer`] and
//! judge each gang by the reports stored for it. Reports are dropped when
//! the gang is arrested, when a scan finds them inconclusive, and by a
//! periodic full sweep.

use std::collections::BTreeMap;

use rand::Rng;
use syndicate_types::{CrimeType, GangId, IntelligenceReport};

use crate::chance::between;
use crate::config::PoliceRules;
use crate::error::PoliceError;

/// Starting capacity of the report buffer.
pub const INITIAL_REPORT_CAPACITY: usize = 100;

/// Average suspicion at which a gang is arrested even without a reliable
/// report, given enough reports.
pub const OVERWHELMING_SUSPICION: u32 = 95;

/// Report count needed for [`OVERWHELMING_SUSPICION`] to apply.
pub const OVERWHELMING_REPORT_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Report buffer
// ---------------------------------------------------------------------------

/// Append-only store of received reports.
///
/// Capacity starts at [`INITIAL_REPORT_CAPACITY`] and doubles whenever a
/// push finds it full. Growth never reorders or drops stored reports.
#[derive(Debug, Clone)]
pub struct ReportBuffer {
    reports: Vec<IntelligenceReport>,
    capacity: usize,
    growths: u32,
}

impl Default for ReportBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuffer {
    /// Create an empty buffer with the initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_REPORT_CAPACITY)
    }

    /// Create an empty buffer with a custom starting capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            reports: Vec::with_capacity(capacity),
            capacity,
            growths: 0,
        }
    }

    /// Store a report, doubling capacity first if the buffer is full.
    pub fn push(&mut self, report: IntelligenceReport) -> Result<(), PoliceError> {
        if self.reports.len() >= self.capacity {
            let grown = self
                .capacity
                .checked_mul(2)
                .ok_or(PoliceError::BufferGrowth {
                    capacity: self.capacity,
                })?;
            let additional = grown.saturating_sub(self.reports.len());
            self.reports
                .try_reserve_exact(additional)
                .map_err(|_source| PoliceError::BufferGrowth {
                    capacity: self.capacity,
                })?;
            self.capacity = grown;
            self.growths = self.growths.saturating_add(1);
        }
        self.reports.push(report);
        Ok(())
    }

    /// Number of stored reports.
    pub const fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether no reports are stored.
    pub const fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Current logical capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times the buffer has doubled.
    pub const fn growths(&self) -> u32 {
        self.growths
    }

    /// Stored reports in arrival order.
    pub fn reports(&self) -> &[IntelligenceReport] {
        &self.reports
    }

    /// Stored reports about one gang, in arrival order.
    pub fn for_gang(&self, gang: GangId) -> impl Iterator<Item = &IntelligenceReport> {
        self.reports.iter().filter(move |r| r.gang_id == gang)
    }

    /// Drop every report about `gang`. Returns how many were removed.
    pub fn purge_gang(&mut self, gang: GangId) -> usize {
        let before = self.reports.len();
        self.reports.retain(|r| r.gang_id != gang);
        before.saturating_sub(self.reports.len())
    }

    /// Drop every report. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.reports.len();
        self.reports.clear();
        removed
    }

    /// The gang with the most stored reports and its report count.
    ///
    /// On a tie the gang that reached the count first in arrival order wins.
    pub fn most_reported_gang(&self) -> Option<(GangId, usize)> {
        let mut counts: BTreeMap<GangId, usize> = BTreeMap::new();
        let mut best: Option<(GangId, usize)> = None;
        for report in &self.reports {
            let count = counts.entry(report.gang_id).or_insert(0);
            *count = count.saturating_add(1);
            if best.is_none_or(|(_, max)| *count > max) {
                best = Some((report.gang_id, *count));
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Aggregated view of the reports about one gang.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    /// Gang being assessed.
    pub gang_id: GangId,
    /// Reports stored for the gang.
    pub report_count: usize,
    /// How many of those came from reliable sources.
    pub reliable_count: usize,
    /// Integer mean of the suspicion levels, zero with no reports.
    pub average_suspicion: u32,
    /// Most frequently named target, first seen wins ties.
    pub likely_target: Option<CrimeType>,
    /// Whether the police should arrest the gang.
    pub act: bool,
}

/// Aggregate the stored reports about `gang` and decide whether to act.
///
/// Act when the average suspicion reaches the action threshold and at
/// least one report is reliable, or when the average reaches
/// [`OVERWHELMING_SUSPICION`] across at least
/// [`OVERWHELMING_REPORT_COUNT`] reports.
pub fn assess(buffer: &ReportBuffer, gang: GangId, rules: &PoliceRules) -> Assessment {
    let mut report_count = 0_usize;
    let mut reliable_count = 0_usize;
    let mut total: u64 = 0;
    let mut targets: Vec<(CrimeType, usize)> = Vec::new();

    for report in buffer.for_gang(gang) {
        report_count = report_count.saturating_add(1);
        total = total.saturating_add(u64::from(report.suspicion_level));
        if report.reliable {
            reliable_count = reliable_count.saturating_add(1);
        }
        if let Some(entry) = targets.iter_mut().find(|(t, _)| *t == report.suspected_target) {
            entry.1 = entry.1.saturating_add(1);
        } else {
            targets.push((report.suspected_target, 1));
        }
    }

    let average_suspicion = u64::try_from(report_count)
        .ok()
        .and_then(|n| total.checked_div(n))
        .and_then(|avg| u32::try_from(avg).ok())
        .unwrap_or(0);

    let likely_target = targets
        .iter()
        .fold(None::<(CrimeType, usize)>, |best, &(target, n)| match best {
            Some((_, max)) if max >= n => best,
            _ => Some((target, n)),
        })
        .map(|(target, _)| target);

    let act = report_count > 0
        && ((average_suspicion >= rules.action_threshold && reliable_count > 0)
            || (average_suspicion >= OVERWHELMING_SUSPICION
                && report_count >= OVERWHELMING_REPORT_COUNT));

    Assessment {
        gang_id: gang,
        report_count,
        reliable_count,
        average_suspicion,
        likely_target,
        act,
    }
}

/// Whether the police should arrest `gang` based on stored reports.
pub fn decide_on_action(buffer: &ReportBuffer, gang: GangId, rules: &PoliceRules) -> bool {
    assess(buffer, gang, rules).act
}

/// Draw a prison sentence from the configured range.
pub fn sentence<R: Rng + ?Sized>(rules: &PoliceRules, rng: &mut R) -> u32 {
    between(rng, rules.prison_time_min, rules.prison_time_max)
}

/// Whether a report should be escalated in the police log.
pub fn is_alarming(report: &IntelligenceReport, rules: &PoliceRules) -> bool {
    report.reliable
        && report.suspicion_level > rules.suspicion_threshold
        && report.suspected_target.is_high_risk()
}

// ---------------------------------------------------------------------------
// Police state
// ---------------------------------------------------------------------------

/// What a background scan decided about the most-reported gang.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    /// Nothing stood out.
    Idle,
    /// The gang should be arrested.
    Arrest(Assessment),
    /// Evidence was inconclusive and the gang's reports were discarded.
    PurgedStale {
        /// Gang whose reports were dropped.
        gang_id: GangId,
        /// Number of reports dropped.
        removed: usize,
    },
}

/// Result of one background scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Decision about the most-reported gang.
    pub action: ScanAction,
    /// Reports cleared by the periodic full sweep, if it ran this cycle.
    pub swept: Option<usize>,
}

/// Everything the police know.
#[derive(Debug, Clone, Default)]
pub struct PoliceState {
    /// Stored intelligence.
    pub buffer: ReportBuffer,
    /// Arrests made over the simulation.
    pub thwarted: u32,
    /// Agents lost to gang investigations, mirrored from the blackboard.
    pub lost_agents: u32,
    scan_cycles: u32,
}

impl PoliceState {
    /// Fresh state with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an incoming report.
    pub fn ingest(&mut self, report: IntelligenceReport) -> Result<(), PoliceError> {
        self.buffer.push(report)
    }

    /// Record an arrest of `gang` and drop its reports.
    ///
    /// Returns how many reports were dropped.
    pub fn record_arrest(&mut self, gang: GangId) -> usize {
        self.thwarted = self.thwarted.saturating_add(1);
        self.buffer.purge_gang(gang)
    }

    /// Re-examine the buffer without a fresh report.
    ///
    /// Judges the most-reported gang once it has at least
    /// `scan_min_reports` reports. If it does not warrant an arrest and has
    /// at least `stale_report_count` reports, those reports are dropped.
    /// Every `cleanup_every` scans the whole buffer is cleared if it holds
    /// more than `cleanup_min_reports` reports.
    ///
    /// An [`ScanAction::Arrest`] is only a recommendation; the caller
    /// performs the arrest and then calls [`record_arrest`](Self::record_arrest).
    pub fn scan(&mut self, rules: &PoliceRules) -> ScanOutcome {
        let action = match self.buffer.most_reported_gang() {
            Some((gang_id, count)) if count >= rules.scan_min_reports => {
                let assessment = assess(&self.buffer, gang_id, rules);
                if assessment.act {
                    ScanAction::Arrest(assessment)
                } else if count >= rules.stale_report_count {
                    ScanAction::PurgedStale {
                        gang_id,
                        removed: self.buffer.purge_gang(gang_id),
                    }
                } else {
                    ScanAction::Idle
                }
            }
            _ => ScanAction::Idle,
        };

        self.scan_cycles = self.scan_cycles.saturating_add(1);
        let mut swept = None;
        if self.scan_cycles >= rules.cleanup_every {
            self.scan_cycles = 0;
            if self.buffer.len() > rules.cleanup_min_reports {
                swept = Some(self.buffer.clear());
            }
        }

        ScanOutcome { action, swept }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use syndicate_types::MemberId;

    use super::*;

    fn report(gang: u32, suspicion: u32, reliable: bool) -> IntelligenceReport {
        IntelligenceReport {
            gang_id: GangId::new(gang),
            agent_id: MemberId::new(0),
            suspected_target: CrimeType::DrugTrafficking,
            suspicion_level: suspicion,
            reliable,
        }
    }

    fn buffer_with(reports: &[IntelligenceReport]) -> ReportBuffer {
        let mut buffer = ReportBuffer::new();
        for r in reports {
            buffer.push(*r).unwrap();
        }
        buffer
    }

    #[test]
    fn reliable_high_suspicion_triggers_action() {
        let buffer = buffer_with(&[report(5, 85, true), report(5, 90, false)]);
        let rules = PoliceRules {
            action_threshold: 80,
            ..PoliceRules::default()
        };
        let assessment = assess(&buffer, GangId::new(5), &rules);
        assert_eq!(assessment.average_suspicion, 87);
        assert_eq!(assessment.reliable_count, 1);
        assert!(assessment.act);
    }

    #[test]
    fn overwhelming_suspicion_needs_no_reliable_source() {
        let buffer = buffer_with(&[report(7, 96, false); 4]);
        assert!(decide_on_action(&buffer, GangId::new(7), &PoliceRules::default()));
    }

    #[test]
    fn unreliable_reports_below_overwhelming_never_act() {
        let rules = PoliceRules::default();
        for count in 1..50 {
            let reports: Vec<IntelligenceReport> = (0..count).map(|_| report(1, 94, false)).collect();
            let buffer = buffer_with(&reports);
            assert!(!decide_on_action(&buffer, GangId::new(1), &rules));
        }
    }

    #[test]
    fn two_overwhelming_reports_are_not_enough() {
        let buffer = buffer_with(&[report(2, 99, false), report(2, 99, false)]);
        assert!(!decide_on_action(&buffer, GangId::new(2), &PoliceRules::default()));
    }

    #[test]
    fn no_reports_no_action() {
        let buffer = ReportBuffer::new();
        assert!(!decide_on_action(&buffer, GangId::new(0), &PoliceRules::default()));
    }

    #[test]
    fn growth_preserves_order() {
        let mut buffer = ReportBuffer::new();
        let n = 450_u32;
        for i in 0..n {
            buffer.push(report(i, i % 101, false)).unwrap();
        }
        // 100 -> 200 -> 400 -> 800
        assert_eq!(buffer.growths(), 3);
        assert_eq!(buffer.capacity(), 800);
        let ids: Vec<u32> = buffer.reports().iter().map(|r| r.gang_id.into_inner()).collect();
        assert_eq!(ids, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn exact_capacity_does_not_grow() {
        let mut buffer = ReportBuffer::new();
        for _ in 0..INITIAL_REPORT_CAPACITY {
            buffer.push(report(0, 50, false)).unwrap();
        }
        assert_eq!(buffer.growths(), 0);
        buffer.push(report(0, 50, false)).unwrap();
        assert_eq!(buffer.growths(), 1);
    }

    #[test]
    fn most_reported_gang_prefers_first_on_tie() {
        let buffer = buffer_with(&[report(3, 10, false), report(1, 10, false), report(1, 10, false), report(3, 10, false)]);
        assert_eq!(buffer.most_reported_gang(), Some((GangId::new(1), 2)));
    }

    #[test]
    fn likely_target_is_most_named() {
        let mut reports = vec![report(0, 50, false); 3];
        reports[1].suspected_target = CrimeType::Kidnapping;
        reports[2].suspected_target = CrimeType::Kidnapping;
        let buffer = buffer_with(&reports);
        let assessment = assess(&buffer, GangId::new(0), &PoliceRules::default());
        assert_eq!(assessment.likely_target, Some(CrimeType::Kidnapping));
    }

    #[test]
    fn record_arrest_purges_gang_reports() {
        let mut police = PoliceState::new();
        for r in [report(0, 90, true), report(1, 10, false), report(0, 95, true)] {
            police.ingest(r).unwrap();
        }
        assert_eq!(police.record_arrest(GangId::new(0)), 2);
        assert_eq!(police.thwarted, 1);
        assert_eq!(police.buffer.len(), 1);
    }

    #[test]
    fn scan_recommends_arrest() {
        let mut police = PoliceState::new();
        for _ in 0..3 {
            police.ingest(report(4, 90, true)).unwrap();
        }
        let outcome = police.scan(&PoliceRules::default());
        assert!(matches!(outcome.action, ScanAction::Arrest(a) if a.gang_id == GangId::new(4)));
        // Recommendation only; reports stay until the arrest is recorded.
        assert_eq!(police.buffer.len(), 3);
    }

    #[test]
    fn scan_purges_inconclusive_reports() {
        let mut police = PoliceState::new();
        for _ in 0..5 {
            police.ingest(report(2, 40, false)).unwrap();
        }
        police.ingest(report(3, 40, false)).unwrap();
        let outcome = police.scan(&PoliceRules::default());
        assert_eq!(
            outcome.action,
            ScanAction::PurgedStale {
                gang_id: GangId::new(2),
                removed: 5
            }
        );
        assert_eq!(police.buffer.len(), 1);
    }

    #[test]
    fn scan_leaves_few_inconclusive_reports() {
        let mut police = PoliceState::new();
        for _ in 0..4 {
            police.ingest(report(2, 40, false)).unwrap();
        }
        let outcome = police.scan(&PoliceRules::default());
        assert_eq!(outcome.action, ScanAction::Idle);
        assert_eq!(police.buffer.len(), 4);
    }

    #[test]
    fn periodic_sweep_clears_large_buffers() {
        let rules = PoliceRules::default();
        let mut police = PoliceState::new();
        // One report per gang keeps each gang below the scan minimum.
        for gang in 0..11 {
            police.ingest(report(gang, 40, false)).unwrap();
        }
        for _ in 1..rules.cleanup_every {
            assert_eq!(police.scan(&rules).swept, None);
        }
        assert_eq!(police.scan(&rules).swept, Some(11));
        assert!(police.buffer.is_empty());
    }

    #[test]
    fn alarming_reports() {
        let rules = PoliceRules::default();
        let mut r = report(0, 80, true);
        r.suspected_target = CrimeType::BankRobbery;
        assert!(is_alarming(&r, &rules));
        r.reliable = false;
        assert!(!is_alarming(&r, &rules));
        r.reliable = true;
        r.suspected_target = CrimeType::Blackmailing;
        assert!(!is_alarming(&r, &rules));
    }

    #[test]
    fn sentence_within_range() {
        let rules = PoliceRules::default();
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..100 {
            assert!((5..=15).contains(&sentence(&rules, &mut rng)));
        }
    }
}
