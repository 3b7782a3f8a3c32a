//! Police task.
//!
//! The police drain the report mailbox on a short interval and judge the
//! reported gang as each report arrives. A slower background scan looks at
//! the whole buffer to catch gangs that no fresh report points at, discards
//! inconclusive evidence, and periodically sweeps the buffer clean.
//! Arrests are written to the blackboard; the police never learn when a
//! gang is released.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use syndicate_agents::police::{self, Assessment, is_alarming, sentence};
use syndicate_agents::{PoliceRules, PoliceState, ScanAction, ScanOutcome};
use syndicate_core::{Blackboard, ReportInbox, StopSignal, TerminationLimits};
use syndicate_types::{GangId, IntelligenceReport};
use tracing::{debug, info, warn};

/// Most reports taken from the mailbox per poll.
pub const MAX_REPORTS_PER_POLL: usize = 64;

/// The police agent and its private state.
#[derive(Debug)]
pub struct PoliceAgent {
    state: PoliceState,
    inbox: ReportInbox,
    blackboard: Arc<Blackboard>,
    rules: PoliceRules,
    rng: StdRng,
}

impl PoliceAgent {
    /// Create the police agent.
    pub fn new(inbox: ReportInbox, blackboard: Arc<Blackboard>, rules: PoliceRules, rng: StdRng) -> Self {
        Self {
            state: PoliceState::new(),
            inbox,
            blackboard,
            rules,
            rng,
        }
    }

    /// Read-only view of what the police know.
    pub const fn state(&self) -> &PoliceState {
        &self.state
    }

    /// Drain waiting reports and act on each reported gang.
    ///
    /// Returns the gangs arrested during this poll.
    pub async fn process_inbox(&mut self) -> Vec<GangId> {
        let mut arrested = Vec::new();
        for report in self.inbox.drain(MAX_REPORTS_PER_POLL) {
            if let Some(gang_id) = self.process_report(report).await {
                arrested.push(gang_id);
            }
        }
        arrested
    }

    async fn process_report(&mut self, report: IntelligenceReport) -> Option<GangId> {
        if let Err(e) = self.state.ingest(report) {
            warn!(gang_id = %report.gang_id, error = %e, "Report discarded");
            return None;
        }
        debug!(
            gang_id = %report.gang_id,
            agent_id = %report.agent_id,
            suspicion = report.suspicion_level,
            reliable = report.reliable,
            target = %report.suspected_target,
            "Report received"
        );
        if is_alarming(&report, &self.rules) {
            warn!(
                gang_id = %report.gang_id,
                target = %report.suspected_target,
                suspicion = report.suspicion_level,
                "High-risk crime reported by reliable source"
            );
        }

        let assessment = police::assess(&self.state.buffer, report.gang_id, &self.rules);
        if assessment.act && self.arrest(assessment).await {
            Some(report.gang_id)
        } else {
            None
        }
    }

    /// Run one background scan over the stored reports.
    pub async fn scan_once(&mut self) -> ScanOutcome {
        self.state.lost_agents = self.blackboard.counters().await.executed;
        let outcome = self.state.scan(&self.rules);

        match outcome.action {
            ScanAction::Arrest(assessment) => {
                info!(
                    gang_id = %assessment.gang_id,
                    reports = assessment.report_count,
                    "Police acting on accumulated reports"
                );
                let _ = self.arrest(assessment).await;
            }
            ScanAction::PurgedStale { gang_id, removed } => {
                info!(gang_id = %gang_id, removed, "Stale reports discarded, evidence insufficient");
            }
            ScanAction::Idle => {}
        }
        if let Some(swept) = outcome.swept {
            info!(swept, "Periodic report sweep");
        }
        outcome
    }

    /// Write an arrest to the blackboard and update police records.
    ///
    /// A failed write is logged and left for the next cycle, which will
    /// re-evaluate the same reports.
    async fn arrest(&mut self, assessment: Assessment) -> bool {
        let gang_id = assessment.gang_id;
        let prison_time = sentence(&self.rules, &mut self.rng);
        if let Err(e) = self.blackboard.arrest(gang_id, prison_time).await {
            warn!(gang_id = %gang_id, error = %e, "Arrest not recorded, will retry");
            return false;
        }
        let purged = self.state.record_arrest(gang_id);
        self.blackboard.record_thwarted(1).await;
        info!(
            gang_id = %gang_id,
            prison_time,
            average_suspicion = assessment.average_suspicion,
            reliable_reports = assessment.reliable_count,
            likely_target = ?assessment.likely_target,
            purged,
            "Gang arrested"
        );
        true
    }

    /// Run until a stop is requested or a termination limit is reached.
    pub async fn run(
        mut self,
        poll: Duration,
        scan: Duration,
        limits: TerminationLimits,
        stop: Arc<StopSignal>,
    ) {
        let mut poll_interval = tokio::time::interval(poll);
        let mut scan_interval = tokio::time::interval(scan);
        // The first scan waits a full interval.
        scan_interval.reset();
        info!("Police task started");
        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    let _ = self.process_inbox().await;
                }
                _ = scan_interval.tick() => {
                    let _ = self.scan_once().await;
                }
                () = stop.stopped() => break,
            }
            if let Some(reason) = self.blackboard.termination(&limits).await {
                info!(reason = %reason, "Police observed termination limit");
                stop.request_stop();
                break;
            }
        }
        info!(
            thwarted = self.state.thwarted,
            lost_agents = self.state.lost_agents,
            pending_reports = self.state.buffer.len(),
            "Police task stopped"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use syndicate_core::mailbox::report_mailbox;
    use syndicate_types::{CrimeType, MemberId};

    use super::*;

    fn report(gang: u32, suspicion: u32, reliable: bool) -> IntelligenceReport {
        IntelligenceReport {
            gang_id: GangId::new(gang),
            agent_id: MemberId::new(3),
            suspected_target: CrimeType::ArmTrafficking,
            suspicion_level: suspicion,
            reliable,
        }
    }

    #[tokio::test]
    async fn reliable_report_leads_to_arrest() {
        let board = Arc::new(Blackboard::new(8));
        let (tx, inbox) = report_mailbox(16);
        let mut police = PoliceAgent::new(inbox, Arc::clone(&board), PoliceRules::default(), StdRng::seed_from_u64(1));

        tx.try_deliver(report(5, 85, true)).unwrap();
        tx.try_deliver(report(5, 90, false)).unwrap();
        let arrested = police.process_inbox().await;

        // The first report alone already clears the threshold with a reliable source.
        assert_eq!(arrested.first(), Some(&GangId::new(5)));
        let entry = board.arrest_entry(GangId::new(5)).await.unwrap();
        assert!(entry.arrested);
        assert!(!entry.notification_seen);
        assert!((5..=15).contains(&entry.prison_time_remaining));
        assert!(board.counters().await.thwarted >= 1);
    }

    #[tokio::test]
    async fn weak_reports_do_not_trigger_arrest() {
        let board = Arc::new(Blackboard::new(8));
        let (tx, inbox) = report_mailbox(16);
        let mut police = PoliceAgent::new(inbox, Arc::clone(&board), PoliceRules::default(), StdRng::seed_from_u64(1));
        for _ in 0..4 {
            tx.try_deliver(report(2, 60, false)).unwrap();
        }
        assert!(police.process_inbox().await.is_empty());
        assert_eq!(police.state().buffer.len(), 4);
        assert!(!board.arrest_entry(GangId::new(2)).await.unwrap().arrested);
    }

    #[tokio::test]
    async fn scan_arrests_overwhelming_evidence() {
        let board = Arc::new(Blackboard::new(8));
        let (_tx, inbox) = report_mailbox(1);
        let mut police = PoliceAgent::new(inbox, Arc::clone(&board), PoliceRules::default(), StdRng::seed_from_u64(1));
        for _ in 0..4 {
            police.state.ingest(report(7, 96, false)).unwrap();
        }
        let outcome = police.scan_once().await;
        assert!(matches!(outcome.action, ScanAction::Arrest(_)));
        assert!(board.arrest_entry(GangId::new(7)).await.unwrap().arrested);
        assert!(police.state().buffer.is_empty());
        assert_eq!(police.state().thwarted, 1);
    }

    #[tokio::test]
    async fn unknown_gang_arrest_is_not_recorded() {
        let board = Arc::new(Blackboard::new(2));
        let (_tx, inbox) = report_mailbox(1);
        let mut police = PoliceAgent::new(inbox, Arc::clone(&board), PoliceRules::default(), StdRng::seed_from_u64(1));
        for _ in 0..4 {
            police.state.ingest(report(9, 99, true)).unwrap();
        }
        let _ = police.scan_once().await;
        assert_eq!(police.state().thwarted, 0);
        // Reports stay so the next cycle can retry.
        assert_eq!(police.state().buffer.len(), 4);
        assert_eq!(board.counters().await.thwarted, 0);
    }

    #[tokio::test]
    async fn lost_agents_mirror_blackboard() {
        let board = Arc::new(Blackboard::new(2));
        let (_tx, inbox) = report_mailbox(1);
        let mut police = PoliceAgent::new(inbox, Arc::clone(&board), PoliceRules::default(), StdRng::seed_from_u64(1));
        board.record_executed(3).await;
        let _ = police.scan_once().await;
        assert_eq!(police.state().lost_agents, 3);
    }
}
