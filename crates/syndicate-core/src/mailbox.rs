//! Lossy channels between agents.
//!
//! Two channels cross agent boundaries: the report mailbox from secret
//! agents to the police, and one progress channel per gang to the
//! dashboard. Both are bounded and never block the sender. When a channel
//! is full the new message is dropped and the sender gets an error it is
//! expected to log and forget.

use syndicate_types::{IntelligenceReport, PrepProgress};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Errors returned when a message cannot be enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MailboxError {
    /// The channel is at capacity. The message was dropped.
    #[error("mailbox full, message dropped")]
    Full,
    /// The receiving side is gone.
    #[error("mailbox closed")]
    Closed,
}

impl<T> From<TrySendError<T>> for MailboxError {
    fn from(err: TrySendError<T>) -> Self {
        match err {
            TrySendError::Full(_) => Self::Full,
            TrySendError::Closed(_) => Self::Closed,
        }
    }
}

// ---------------------------------------------------------------------------
// Report mailbox
// ---------------------------------------------------------------------------

/// Create the report mailbox with room for `capacity` reports.
pub fn report_mailbox(capacity: usize) -> (ReportSender, ReportInbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ReportSender { tx }, ReportInbox { rx })
}

/// Sending half of the report mailbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReportSender {
    tx: mpsc::Sender<IntelligenceReport>,
}

impl ReportSender {
    /// Enqueue a report without waiting.
    pub fn try_deliver(&self, report: IntelligenceReport) -> Result<(), MailboxError> {
        self.tx.try_send(report).map_err(MailboxError::from)
    }
}

/// Receiving half of the report mailbox, owned by the police.
#[derive(Debug)]
pub struct ReportInbox {
    rx: mpsc::Receiver<IntelligenceReport>,
}

impl ReportInbox {
    /// Take the next report if one is waiting.
    pub fn try_next(&mut self) -> Option<IntelligenceReport> {
        self.rx.try_recv().ok()
    }

    /// Take every waiting report, up to `max`.
    pub fn drain(&mut self, max: usize) -> Vec<IntelligenceReport> {
        let mut reports = Vec::new();
        while reports.len() < max {
            let Some(report) = self.try_next() else {
                break;
            };
            reports.push(report);
        }
        reports
    }
}

// ---------------------------------------------------------------------------
// Progress channel
// ---------------------------------------------------------------------------

/// Messages a progress channel holds before dropping new ones.
pub const PROGRESS_CAPACITY: usize = 4;

/// Create one gang's progress channel.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(PROGRESS_CAPACITY);
    (ProgressSender { tx }, ProgressReceiver { rx, latest: None })
}

/// Sending half of a progress channel, owned by the gang.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<PrepProgress>,
}

impl ProgressSender {
    /// Publish progress without waiting.
    pub fn try_publish(&self, progress: PrepProgress) -> Result<(), MailboxError> {
        self.tx.try_send(progress).map_err(MailboxError::from)
    }
}

/// Receiving half of a progress channel, owned by the dashboard.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<PrepProgress>,
    latest: Option<PrepProgress>,
}

impl ProgressReceiver {
    /// Drain the channel and return the most recent progress seen so far.
    pub fn latest(&mut self) -> Option<PrepProgress> {
        while let Ok(progress) = self.rx.try_recv() {
            self.latest = Some(progress);
        }
        self.latest
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use syndicate_types::{CrimeType, GangId, MemberId};

    use super::*;

    fn report(level: u32) -> IntelligenceReport {
        IntelligenceReport {
            gang_id: GangId::new(0),
            agent_id: MemberId::new(1),
            suspected_target: CrimeType::Blackmailing,
            suspicion_level: level,
            reliable: false,
        }
    }

    #[tokio::test]
    async fn full_mailbox_drops_new_reports() {
        let (tx, mut inbox) = report_mailbox(2);
        tx.try_deliver(report(1)).unwrap();
        tx.try_deliver(report(2)).unwrap();
        assert_eq!(tx.try_deliver(report(3)), Err(MailboxError::Full));

        let levels: Vec<u32> = inbox.drain(10).iter().map(|r| r.suspicion_level).collect();
        assert_eq!(levels, vec![1, 2]);
        assert!(inbox.try_next().is_none());
    }

    #[tokio::test]
    async fn closed_mailbox_is_reported() {
        let (tx, inbox) = report_mailbox(1);
        drop(inbox);
        assert_eq!(tx.try_deliver(report(1)), Err(MailboxError::Closed));
    }

    #[tokio::test]
    async fn drain_respects_limit() {
        let (tx, mut inbox) = report_mailbox(8);
        for level in 0..5 {
            tx.try_deliver(report(level)).unwrap();
        }
        assert_eq!(inbox.drain(3).len(), 3);
        assert_eq!(inbox.drain(3).len(), 2);
    }

    #[tokio::test]
    async fn progress_keeps_latest_value() {
        let (tx, mut rx) = progress_channel();
        assert_eq!(rx.latest(), None);
        for pct in [10, 20, 30] {
            tx.try_publish(PrepProgress {
                gang_id: GangId::new(1),
                preparation_pct: pct,
                target: CrimeType::Kidnapping,
                member_count: 5,
                mission: 1,
            })
            .unwrap();
        }
        assert_eq!(rx.latest().map(|p| p.preparation_pct), Some(30));
        // Nothing new: the last value is kept.
        assert_eq!(rx.latest().map(|p| p.preparation_pct), Some(30));
    }
}
