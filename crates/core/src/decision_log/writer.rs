use std::sync::Arc;

use tokio::sync::mpsc;

use crate::health::CollaboratorHealth;
use crate::metrics;

use super::{DecisionBatch, DecisionLogEntry, DecisionLogHandle, DecisionLogStore};

/// Background task that receives decision batches and writes them to storage
pub struct DecisionLogWriter {
    rx: mpsc::Receiver<DecisionBatch>,
    store: Arc<dyn DecisionLogStore>,
}

impl DecisionLogWriter {
    pub fn new(rx: mpsc::Receiver<DecisionBatch>, store: Arc<dyn DecisionLogStore>) -> Self {
        Self { rx, store }
    }

    /// Run the writer, consuming batches until every handle is dropped
    ///
    /// This should be spawned as a background task. Insert failures are
    /// logged and counted; the writer keeps going.
    pub async fn run(mut self) {
        tracing::info!("Decision log writer started");

        while let Some(batch) = self.rx.recv().await {
            self.write_batch(&batch);
        }

        tracing::info!("Decision log writer shutting down");
    }

    fn write_batch(&self, batch: &DecisionBatch) {
        if self.store.health() == CollaboratorHealth::Disconnected {
            metrics::DECISION_LOG_WRITE_FAILURES.inc_by(batch.records.len() as u64);
            tracing::error!(
                ticket_id = %batch.ticket_id,
                records = batch.records.len(),
                "Decision log store disconnected, dropping records"
            );
            return;
        }

        for record in &batch.records {
            let entry = DecisionLogEntry::from_record(&batch.ticket_id, record);
            if let Err(e) = self.store.insert(&entry) {
                metrics::DECISION_LOG_WRITE_FAILURES.inc();
                tracing::error!(
                    ticket_id = %batch.ticket_id,
                    agent = %record.agent,
                    "Failed to write decision record: {}",
                    e
                );
            }
        }
    }
}

/// Create a complete decision log system
///
/// Returns:
/// - `DecisionLogHandle` - for forwarding records (clone this to share across tasks)
/// - `DecisionLogWriter` - spawn this as a background task with `tokio::spawn(writer.run())`
pub fn create_decision_log_system(
    store: Arc<dyn DecisionLogStore>,
    buffer_size: usize,
) -> (DecisionLogHandle, DecisionLogWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = DecisionLogHandle::new(tx);
    let writer = DecisionLogWriter::new(rx, store);
    (handle, writer)
}
