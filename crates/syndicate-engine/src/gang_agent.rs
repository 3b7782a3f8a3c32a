//! Gang control loop and member workers.
//!
//! Each gang runs as one control task plus one worker task per member.
//! They share the [`Gang`] behind a private mutex and a [`PrisonGate`]
//! that parks the workers while the gang is imprisoned. The gang's only
//! contact with the rest of the simulation is the blackboard, the report
//! mailbox (through its members), and its own status and progress feeds.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use syndicate_agents::investigation::{self, MemberRecord, SweepSummary};
use syndicate_agents::knowledge::member_tick;
use syndicate_agents::{Gang, GangPhase, GangRules, InvestigationError, MissionOutcome};
use syndicate_core::mailbox::ProgressSender;
use syndicate_core::{Blackboard, PrisonGate, ReportSender, StopSignal, TerminationLimits};
use syndicate_types::{CrimeType, GangId, GangSnapshot, PrepProgress};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// What happened during one control-loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GangTick {
    /// Still in prison with this many ticks left.
    Serving {
        /// Ticks left after this one.
        remaining: u32,
    },
    /// Sentence served, arrest cleared. The gang plans next tick.
    Released,
    /// A new mission was planned.
    Planned {
        /// Chosen target.
        target: CrimeType,
        /// Preparation ticks allowed.
        budget: u32,
    },
    /// Members kept preparing.
    Preparing {
        /// Preparation ticks so far.
        elapsed: u32,
    },
    /// The mission was carried out.
    Executed(MissionOutcome),
    /// An internal investigation ran.
    Investigated(SweepSummary),
    /// The investigation was abandoned this cycle.
    InvestigationAborted,
}

/// Control loop for one gang.
#[derive(Debug)]
pub struct GangAgent {
    id: GangId,
    gang: Arc<Mutex<Gang>>,
    gate: Arc<PrisonGate>,
    blackboard: Arc<Blackboard>,
    rules: GangRules,
    progress: ProgressSender,
    status: watch::Sender<GangSnapshot>,
    rng: StdRng,
}

impl GangAgent {
    /// Wrap a gang for concurrent execution.
    ///
    /// Returns the agent and the receiving end of its status feed.
    pub fn new(
        gang: Gang,
        blackboard: Arc<Blackboard>,
        rules: GangRules,
        progress: ProgressSender,
        rng: StdRng,
    ) -> (Self, watch::Receiver<GangSnapshot>) {
        let (status, status_rx) = watch::channel(gang.snapshot(true));
        let agent = Self {
            id: gang.id,
            gang: Arc::new(Mutex::new(gang)),
            gate: Arc::new(PrisonGate::new()),
            blackboard,
            rules,
            progress,
            status,
            rng,
        };
        (agent, status_rx)
    }

    /// Gang identifier.
    pub const fn id(&self) -> GangId {
        self.id
    }

    /// Shared handle to the gang state, for member workers.
    pub fn gang(&self) -> Arc<Mutex<Gang>> {
        Arc::clone(&self.gang)
    }

    /// Shared handle to the prison gate, for member workers.
    pub fn gate(&self) -> Arc<PrisonGate> {
        Arc::clone(&self.gate)
    }

    /// Run one control-loop tick.
    ///
    /// The arrest entry is polled first. A newly observed arrest moves the
    /// gang to prison and the same tick already counts toward the sentence.
    pub async fn tick_once(&mut self) -> GangTick {
        self.check_arrest().await;

        let outcome = {
            let mut gang = self.gang.lock().await;
            let phase = gang.phase;
            match phase {
                GangPhase::Imprisoned { remaining } => {
                    let remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        gang.phase = GangPhase::Planning;
                        drop(gang);
                        self.release().await;
                        GangTick::Released
                    } else {
                        gang.phase = GangPhase::Imprisoned { remaining };
                        drop(gang);
                        GangTick::Serving { remaining }
                    }
                }
                GangPhase::Planning => {
                    gang.plan_mission(&self.rules, &mut self.rng);
                    info!(
                        gang_id = %self.id,
                        target = %gang.target,
                        budget = gang.prep_budget,
                        required_level = gang.required_level,
                        "Mission planned"
                    );
                    GangTick::Planned {
                        target: gang.target,
                        budget: gang.prep_budget,
                    }
                }
                GangPhase::Preparing { .. } => {
                    let elapsed = gang.advance_preparation().unwrap_or(0);
                    if elapsed.checked_rem(2) == Some(0) {
                        self.publish_progress(&gang);
                    }
                    GangTick::Preparing { elapsed }
                }
                GangPhase::Executing => {
                    let outcome = gang.execute_mission(&self.rules, &mut self.rng);
                    let target = gang.target;
                    drop(gang);
                    self.record_outcome(outcome, target).await;
                    GangTick::Executed(outcome)
                }
                GangPhase::Investigating => {
                    let snapshot = investigation::snapshot(&gang);
                    drop(gang);
                    self.investigate(snapshot).await
                }
            }
        };

        self.publish_status(true).await;
        outcome
    }

    /// Run the control loop until a stop is requested or a termination
    /// limit is reached.
    pub async fn run(mut self, tick: Duration, limits: TerminationLimits, stop: Arc<StopSignal>) {
        let mut interval = tokio::time::interval(tick);
        info!(gang_id = %self.id, "Gang control loop started");
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                () = stop.stopped() => break,
            }
            if let Some(reason) = self.blackboard.termination(&limits).await {
                info!(gang_id = %self.id, reason = %reason, "Gang observed termination limit");
                stop.request_stop();
                break;
            }
            let outcome = self.tick_once().await;
            debug!(gang_id = %self.id, ?outcome, "Gang tick");
        }
        self.gate.open();
        self.publish_status(false).await;
        info!(gang_id = %self.id, "Gang control loop stopped");
    }

    // -----------------------------------------------------------------------
    // Arrest handshake
    // -----------------------------------------------------------------------

    async fn check_arrest(&self) {
        let sentence = match self.blackboard.poll_arrest(self.id).await {
            Ok(Some(sentence)) => sentence,
            Ok(None) => return,
            Err(e) => {
                warn!(gang_id = %self.id, error = %e, "Arrest poll failed");
                return;
            }
        };
        self.gate.close();
        let mut gang = self.gang.lock().await;
        gang.phase = GangPhase::Imprisoned {
            remaining: sentence,
        };
        info!(gang_id = %self.id, prison_time = sentence, "Gang arrested");
    }

    async fn release(&self) {
        match self.blackboard.release(self.id).await {
            Ok(true) => {}
            Ok(false) => info!(gang_id = %self.id, "New arrest pending at release"),
            Err(e) => warn!(gang_id = %self.id, error = %e, "Failed to clear arrest entry"),
        }
        self.gate.open();
        info!(gang_id = %self.id, "Gang released from prison");
    }

    // -----------------------------------------------------------------------
    // Missions
    // -----------------------------------------------------------------------

    async fn record_outcome(&self, outcome: MissionOutcome, target: CrimeType) {
        match outcome {
            MissionOutcome::Success { deaths } => {
                self.blackboard.record_successful(1).await;
                info!(gang_id = %self.id, target = %target, deaths, "Mission succeeded");
            }
            MissionOutcome::Failure { investigate } => {
                self.blackboard.record_thwarted(1).await;
                info!(gang_id = %self.id, target = %target, investigate, "Mission failed");
            }
        }
    }

    async fn investigate(
        &mut self,
        snapshot: Result<Vec<MemberRecord>, InvestigationError>,
    ) -> GangTick {
        let records = match snapshot {
            Ok(records) => records,
            Err(e) => {
                warn!(gang_id = %self.id, error = %e, "Investigation aborted");
                self.gang.lock().await.phase = GangPhase::Planning;
                return GangTick::InvestigationAborted;
            }
        };

        let (required_level, num_ranks) = {
            let gang = self.gang.lock().await;
            (gang.required_level, self.rules.num_ranks)
        };
        let suspects = investigation::rank_suspects(&records, required_level, num_ranks);
        let verdicts = investigation::interrogate(&suspects, &mut self.rng);

        let summary = {
            let mut gang = self.gang.lock().await;
            let summary = investigation::apply(&mut gang, &verdicts, &self.rules, &mut self.rng);
            gang.phase = GangPhase::Planning;
            summary
        };

        if summary.executed > 0 {
            self.blackboard.record_executed(summary.executed).await;
        }
        info!(
            gang_id = %self.id,
            suspects = suspects.len(),
            executed = summary.executed,
            penalized = summary.penalized,
            "Internal investigation finished"
        );
        if summary.executed == 0 && summary.agents_remaining > 0 {
            info!(gang_id = %self.id, "No informants found, paranoia increasing");
        }
        GangTick::Investigated(summary)
    }

    // -----------------------------------------------------------------------
    // Feeds
    // -----------------------------------------------------------------------

    fn publish_progress(&self, gang: &Gang) {
        let progress = PrepProgress {
            gang_id: self.id,
            preparation_pct: gang.preparation_pct(),
            target: gang.target,
            member_count: gang.member_count(),
            mission: gang.missions_planned,
        };
        debug!(
            gang_id = %self.id,
            preparation_pct = progress.preparation_pct,
            "Preparation progress"
        );
        if let Err(e) = self.progress.try_publish(progress) {
            debug!(gang_id = %self.id, error = %e, "Progress update dropped");
        }
    }

    async fn publish_status(&self, active: bool) {
        let snapshot = self.gang.lock().await.snapshot(active);
        self.status.send_replace(snapshot);
    }
}

/// Everything a member worker needs.
#[derive(Debug)]
pub struct MemberWorker {
    /// Position in the gang's member list.
    pub index: usize,
    /// Shared gang state.
    pub gang: Arc<Mutex<Gang>>,
    /// Pause point while imprisoned.
    pub gate: Arc<PrisonGate>,
    /// Gang and member rules.
    pub rules: GangRules,
    /// Mailbox to the police.
    pub reports: ReportSender,
    /// Worker-local generator.
    pub rng: StdRng,
}

impl MemberWorker {
    /// Run one worker tick: prepare, exchange information, maybe report.
    ///
    /// Returns `true` if a report was sent, `false` if there was nothing
    /// to send or the mailbox dropped it.
    pub async fn tick_once(&mut self) -> bool {
        let report = {
            let mut gang = self.gang.lock().await;
            member_tick(&mut gang, self.index, &self.rules, &mut self.rng)
        };
        let Some(report) = report else {
            return false;
        };
        match self.reports.try_deliver(report) {
            Ok(()) => {
                debug!(
                    gang_id = %report.gang_id,
                    agent_id = %report.agent_id,
                    suspicion = report.suspicion_level,
                    "Intelligence report sent"
                );
                true
            }
            Err(e) => {
                warn!(gang_id = %report.gang_id, agent_id = %report.agent_id, error = %e, "Intelligence report dropped");
                false
            }
        }
    }

    /// Run the worker until a stop is requested.
    ///
    /// Parks on the prison gate whenever the gang is imprisoned.
    pub async fn run(mut self, tick: Duration, stop: Arc<StopSignal>) {
        loop {
            if stop.is_stopped() || !self.gate.wait_until_open(&stop).await {
                break;
            }
            let _ = self.tick_once().await;
            tokio::select! {
                () = tokio::time::sleep(tick) => {}
                () = stop.stopped() => break,
            }
        }
    }
}
