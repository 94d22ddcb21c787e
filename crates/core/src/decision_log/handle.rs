use tokio::sync::mpsc;

use crate::metrics;

use super::DecisionBatch;

/// Handle for forwarding decision records to the log
///
/// This is cheaply cloneable and can be shared across tasks.
/// Batches are sent through a bounded channel to be written by the
/// DecisionLogWriter.
#[derive(Clone)]
pub struct DecisionLogHandle {
    tx: mpsc::Sender<DecisionBatch>,
}

impl DecisionLogHandle {
    /// Create a new handle from a channel sender
    pub fn new(tx: mpsc::Sender<DecisionBatch>) -> Self {
        Self { tx }
    }

    /// Send a batch, waiting for channel capacity
    ///
    /// If the channel is closed, the error is logged but the caller is not failed.
    pub async fn emit(&self, batch: DecisionBatch) {
        if let Err(e) = self.tx.send(batch).await {
            metrics::DECISION_LOG_DROPPED.inc();
            tracing::error!("Failed to forward decision records: {}", e);
        }
    }

    /// Try to send a batch without waiting
    ///
    /// Returns true if the batch was queued, false if the channel was full
    /// or closed.
    pub fn try_emit(&self, batch: DecisionBatch) -> bool {
        let ticket_id = batch.ticket_id.clone();
        match self.tx.try_send(batch) {
            Ok(()) => true,
            Err(e) => {
                metrics::DECISION_LOG_DROPPED.inc();
                tracing::error!(ticket_id = %ticket_id, "Failed to forward decision records: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for DecisionLogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionLogHandle")
            .field("capacity", &self.tx.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentKind, DecisionRecord};
    use chrono::Utc;

    fn batch(ticket_id: &str) -> DecisionBatch {
        DecisionBatch {
            ticket_id: ticket_id.to_string(),
            records: vec![DecisionRecord {
                agent: AgentKind::Classifier,
                decision: "General - low priority".to_string(),
                confidence: 0.5,
                explanation: "x".to_string(),
                timestamp: Utc::now(),
            }],
        }
    }

    #[tokio::test]
    async fn test_emit_batch() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = DecisionLogHandle::new(tx);

        handle.emit(batch("t-1")).await;

        let received = rx.recv().await.expect("Should receive batch");
        assert_eq!(received.ticket_id, "t-1");
        assert_eq!(received.records.len(), 1);
    }

    #[test]
    fn test_try_emit() {
        let (tx, mut rx) = mpsc::channel(10);
        let handle = DecisionLogHandle::new(tx);

        assert!(handle.try_emit(batch("t-1")));
        let received = rx.try_recv().expect("Should receive batch");
        assert_eq!(received.ticket_id, "t-1");
    }

    #[test]
    fn test_try_emit_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = DecisionLogHandle::new(tx);

        assert!(handle.try_emit(batch("t-1")));
        assert!(!handle.try_emit(batch("t-2")));
    }

    #[tokio::test]
    async fn test_emit_closed_channel() {
        let (tx, rx) = mpsc::channel::<DecisionBatch>(10);
        let handle = DecisionLogHandle::new(tx);
        drop(rx);

        // Must not panic
        handle.emit(batch("t-1")).await;
        assert!(!handle.try_emit(batch("t-2")));
    }
}
