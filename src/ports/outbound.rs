//! Outbound ports. Application calls into the backend API.
//!
//! Implemented by adapters (HTTP client, mock backend).

use crate::domain::{
    AnomalyReport, BatchRecord, CapaRecord, ChatMessage, ComplaintRecord, Conversation,
    DomainError, DriftReport, EquipmentAnalysisSnapshot, OverviewSnapshot,
    PeriodComparisonSnapshot, PeriodRange, SummaryEvent, SupplierPerformanceSnapshot, TrendSeries,
    UploadRecord, UploadResult, YearlySummarySnapshot,
};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Analytics endpoints. One method per metric resource; the aggregator
/// fans out over the first five concurrently.
#[async_trait::async_trait]
pub trait AnalyticsGateway: Send + Sync {
    async fn overview(&self) -> Result<OverviewSnapshot, DomainError>;

    async fn yearly_summary(&self) -> Result<YearlySummarySnapshot, DomainError>;

    async fn supplier_performance(&self) -> Result<SupplierPerformanceSnapshot, DomainError>;

    async fn equipment_analysis(&self) -> Result<EquipmentAnalysisSnapshot, DomainError>;

    /// `None` lets the backend choose its default period boundaries
    /// (current year vs previous year).
    async fn period_comparison(
        &self,
        range: Option<&PeriodRange>,
    ) -> Result<PeriodComparisonSnapshot, DomainError>;

    async fn drift_detection(&self, window_days: u32) -> Result<DriftReport, DomainError>;

    async fn anomalies(&self, days: u32) -> Result<AnomalyReport, DomainError>;
}

/// Chat endpoints: conversation CRUD, message round trips, and the
/// server-push summary channel.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// Conversations ordered most-recent-first by the backend.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, DomainError>;

    async fn create_conversation(&self) -> Result<Conversation, DomainError>;

    async fn delete_conversation(&self, id: i64) -> Result<(), DomainError>;

    /// One user turn. Returns the assistant's reply text.
    async fn send_message(&self, conversation_id: i64, message: &str)
    -> Result<String, DomainError>;

    async fn history(&self, conversation_id: i64) -> Result<Vec<ChatMessage>, DomainError>;

    /// Open the long-lived summary channel. Events arrive until `Done`,
    /// `Error`, or caller-side `close()`.
    async fn open_summary_stream(&self) -> Result<SummaryStream, DomainError>;

    async fn report(&self) -> Result<String, DomainError>;
}

/// Raw data endpoints (tables, trend series, CSV uploads).
#[async_trait::async_trait]
pub trait DataGateway: Send + Sync {
    /// Dashboard summary payload, passed through as-is.
    async fn dashboard(&self) -> Result<serde_json::Value, DomainError>;

    async fn batches(&self, limit: u32) -> Result<Vec<BatchRecord>, DomainError>;

    async fn trends(&self, parameter: &str, days: u32) -> Result<TrendSeries, DomainError>;

    async fn complaints(&self, status: Option<&str>) -> Result<Vec<ComplaintRecord>, DomainError>;

    async fn capas(&self, status: Option<&str>) -> Result<Vec<CapaRecord>, DomainError>;

    async fn upload(
        &self,
        data_type: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, DomainError>;

    async fn uploads(&self) -> Result<Vec<UploadRecord>, DomainError>;
}

/// Consumer handle for the summary channel.
///
/// Lifecycle: Open until a `Done`/`Error` event, a transport fault (the
/// producer side hangs up), or caller-side [`close`](Self::close). Once
/// closed, `next_event` yields nothing — no events are delivered after
/// either party terminates the channel.
pub struct SummaryStream {
    rx: mpsc::Receiver<SummaryEvent>,
    abort: Option<AbortHandle>,
    closed: bool,
}

impl SummaryStream {
    /// Wrap a receiver fed by a producer task. `abort` stops that task on
    /// close; mocks that feed the channel inline pass `None`.
    pub fn new(rx: mpsc::Receiver<SummaryEvent>, abort: Option<AbortHandle>) -> Self {
        Self {
            rx,
            abort,
            closed: false,
        }
    }

    /// Next event, or `None` once the channel is closed by either side.
    /// `Done` and `Error` are terminal: the stream closes itself right
    /// after yielding them.
    pub async fn next_event(&mut self) -> Option<SummaryEvent> {
        if self.closed {
            return None;
        }
        match self.rx.recv().await {
            Some(event) => {
                if matches!(event, SummaryEvent::Done | SummaryEvent::Error(_)) {
                    self.close();
                }
                Some(event)
            }
            None => {
                self.close();
                None
            }
        }
    }

    /// Caller-side cancellation (e.g. the consuming view goes away before
    /// the server signals completion). Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
        self.rx.close();
        if let Some(handle) = self.abort.take() {
            handle.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for SummaryStream {
    fn drop(&mut self) {
        if let Some(handle) = self.abort.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_with_events(events: Vec<SummaryEvent>) -> SummaryStream {
        let (tx, rx) = mpsc::channel(16);
        for event in events {
            tx.try_send(event).expect("channel capacity");
        }
        SummaryStream::new(rx, None)
    }

    #[tokio::test]
    async fn done_closes_the_stream() {
        let mut stream = stream_with_events(vec![
            SummaryEvent::Text("a".into()),
            SummaryEvent::Done,
            SummaryEvent::Text("after".into()),
        ]);

        assert_eq!(
            stream.next_event().await,
            Some(SummaryEvent::Text("a".into()))
        );
        assert_eq!(stream.next_event().await, Some(SummaryEvent::Done));
        // Terminal event closed the channel; the trailing text is dropped.
        assert!(stream.is_closed());
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn error_closes_the_stream() {
        let mut stream = stream_with_events(vec![SummaryEvent::Error("boom".into())]);

        assert_eq!(
            stream.next_event().await,
            Some(SummaryEvent::Error("boom".into()))
        );
        assert!(stream.is_closed());
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn explicit_close_stops_delivery() {
        let mut stream = stream_with_events(vec![SummaryEvent::Text("pending".into())]);
        stream.close();
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn producer_hangup_yields_none() {
        let (tx, rx) = mpsc::channel::<SummaryEvent>(1);
        drop(tx);
        let mut stream = SummaryStream::new(rx, None);
        assert_eq!(stream.next_event().await, None);
        assert!(stream.is_closed());
    }
}
