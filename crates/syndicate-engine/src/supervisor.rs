//! Simulation startup, monitoring, and shutdown.
//!
//! [`Simulation::launch`] builds the shared substrate, spawns every gang,
//! member, and police task into one [`JoinSet`], and hands back a handle.
//! [`Simulation::run`] refreshes the dashboard on a fixed interval, checks
//! the termination limits, and once anything requests a stop waits for
//! every task to finish before reporting the result.

use std::sync::Arc;

use syndicate_core::config::MAX_GANG_CAPACITY;
use syndicate_core::mailbox::{progress_channel, report_mailbox};
use syndicate_core::{Blackboard, SimulationConfig, StopSignal};
use syndicate_types::{SimulationCounters, SimulationSnapshot, TerminationReason};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::dashboard::{self, GangFeed, SnapshotBoard};
use crate::error::EngineError;
use crate::gang_agent::{GangAgent, MemberWorker};
use crate::police_agent::PoliceAgent;
use crate::spawner::{self, POLICE_STREAM};

/// Final outcome of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Why the run ended.
    pub end_reason: TerminationReason,
    /// Counters at shutdown.
    pub counters: SimulationCounters,
    /// Last snapshot assembled after every task stopped.
    pub final_snapshot: SimulationSnapshot,
    /// Tasks that panicked or were cancelled.
    pub failed_tasks: usize,
}

/// A running simulation.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    blackboard: Arc<Blackboard>,
    stop: Arc<StopSignal>,
    tasks: JoinSet<()>,
    feeds: Vec<GangFeed>,
    board: SnapshotBoard,
}

impl Simulation {
    /// Spawn every agent and return a handle to the running simulation.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn launch(config: SimulationConfig, stop: Arc<StopSignal>) -> Result<Self, EngineError> {
        let capacity = usize::try_from(MAX_GANG_CAPACITY).unwrap_or(usize::MAX);
        let blackboard = Arc::new(Blackboard::new(capacity));
        let gangs = spawner::spawn_gangs(&config, capacity)?;
        let (reports, inbox) = report_mailbox(config.mailbox_capacity);
        let mut tasks = JoinSet::new();
        let mut feeds = Vec::with_capacity(gangs.len());

        for gang in gangs {
            let gang_id = gang.id;
            let member_count = gang.members.len();
            let (progress_tx, progress_rx) = progress_channel();
            let (agent, status_rx) = GangAgent::new(
                gang,
                Arc::clone(&blackboard),
                config.gang.clone(),
                progress_tx,
                spawner::task_rng(config.seed, spawner::gang_stream(gang_id)),
            );

            for index in 0..member_count {
                let worker = MemberWorker {
                    index,
                    gang: agent.gang(),
                    gate: agent.gate(),
                    rules: config.gang.clone(),
                    reports: reports.clone(),
                    rng: spawner::task_rng(config.seed, spawner::member_stream(gang_id, index)),
                };
                tasks.spawn(worker.run(config.member_tick(), Arc::clone(&stop)));
            }
            tasks.spawn(agent.run(config.gang_tick(), config.limits, Arc::clone(&stop)));
            feeds.push(GangFeed {
                gang_id,
                status: status_rx,
                progress: progress_rx,
            });
        }

        let police = PoliceAgent::new(
            inbox,
            Arc::clone(&blackboard),
            config.police.clone(),
            spawner::task_rng(config.seed, POLICE_STREAM),
        );
        tasks.spawn(police.run(
            config.police_tick(),
            config.police_scan_interval(),
            config.limits,
            Arc::clone(&stop),
        ));

        info!(gangs = feeds.len(), tasks = tasks.len(), "Simulation launched");

        Ok(Self {
            config,
            blackboard,
            stop,
            tasks,
            feeds,
            board: SnapshotBoard::new(),
        })
    }

    /// Shared snapshot board for external readers.
    pub fn snapshots(&self) -> SnapshotBoard {
        self.board.clone()
    }

    /// Monitor the simulation until it stops, then wait for every task.
    pub async fn run(mut self) -> SimulationResult {
        let mut interval = tokio::time::interval(self.config.refresh_interval());
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                () = self.stop.stopped() => break,
            }
            self.refresh().await;
            if let Some(reason) = self.blackboard.termination(&self.config.limits).await {
                info!(reason = %reason, "Termination limit reached");
                self.stop.request_stop();
                break;
            }
        }

        let mut failed_tasks = 0_usize;
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Simulation task failed");
                failed_tasks = failed_tasks.saturating_add(1);
            }
        }

        let counters = self.blackboard.counters().await;
        let end_reason = syndicate_core::blackboard::check_limits(&counters, &self.config.limits)
            .unwrap_or(TerminationReason::Signal);
        let final_snapshot = self.refresh().await;

        SimulationResult {
            end_reason,
            counters,
            final_snapshot,
            failed_tasks,
        }
    }

    async fn refresh(&mut self) -> SimulationSnapshot {
        let counters = self.blackboard.counters().await;
        let snapshot = dashboard::collect(&mut self.feeds, counters);
        info!("\n{}", dashboard::render_text(&snapshot));
        if !self.board.publish(snapshot.clone()) {
            warn!("Dashboard busy, snapshot skipped");
        }
        snapshot
    }
}

/// Log the end of a run, including the final snapshot as JSON.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = %result.end_reason,
        successful = result.counters.successful,
        thwarted = result.counters.thwarted,
        executed = result.counters.executed,
        failed_tasks = result.failed_tasks,
        "Simulation ended"
    );
    match serde_json::to_string(&result.final_snapshot) {
        Ok(json) => info!(snapshot = %json, "Final snapshot"),
        Err(e) => warn!(error = %e, "Could not serialize final snapshot"),
    }
}
