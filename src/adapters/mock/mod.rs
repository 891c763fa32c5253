//! In-process mock backend for testing and for running the console without
//! a live API (demo mode).
//!
//! Returns canned snapshots and a scripted chat. Simulates network latency
//! with a configurable delay; individual endpoints can be made to fail
//! with a simulated transport error.

use crate::domain::{
    AnomalyReport, BatchRecord, CalibrationStats, CapaRecord, ChatMessage, ComplaintRecord,
    Conversation, DomainError, DriftReport, EquipmentAnalysisSnapshot, EquipmentRecord,
    OverviewSnapshot, PeriodChanges, PeriodComparisonSnapshot, PeriodRange, PeriodStats,
    ProductionStats, QualityStats, SummaryEvent, SupplierPerformanceSnapshot, SupplierRecord,
    TrendPoint, TrendSeries, UploadRecord, UploadResult, YearSummary, YearlySummarySnapshot,
};
use crate::ports::{AnalyticsGateway, ChatGateway, DataGateway, SummaryStream};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Mock backend implementing all three outbound gateways.
pub struct MockBackend {
    /// Simulated network latency per call.
    delay: Duration,
    /// Endpoint names that return a simulated transport error.
    failures: Mutex<HashSet<String>>,
    send_count: AtomicUsize,
    next_id: AtomicI64,
    conversations: Mutex<Vec<Conversation>>,
    histories: Mutex<HashMap<i64, Vec<ChatMessage>>>,
    summary_events: Mutex<Vec<SummaryEvent>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(10),
            failures: Mutex::new(HashSet::new()),
            send_count: AtomicUsize::new(0),
            next_id: AtomicI64::new(1),
            conversations: Mutex::new(Vec::new()),
            histories: Mutex::new(HashMap::new()),
            summary_events: Mutex::new(vec![
                SummaryEvent::Text("Production held steady across the review period. ".into()),
                SummaryEvent::Text("No systemic quality drift was observed.".into()),
                SummaryEvent::Done,
            ]),
        }
    }

    /// Mock with the given endpoints failing from the start.
    pub fn failing(endpoints: &[&str]) -> Self {
        let mock = Self::new();
        for endpoint in endpoints {
            mock.fail_endpoint(endpoint);
        }
        mock
    }

    /// Mock pre-seeded with conversations, given most-recent-first.
    pub fn with_conversations(titles: &[&str]) -> Self {
        let mock = Self::new();
        {
            let mut conversations = mock.conversations.lock().expect("mock state lock");
            for title in titles {
                let id = mock.next_id.fetch_add(1, Ordering::SeqCst);
                conversations.push(Conversation {
                    id,
                    title: (*title).to_string(),
                    created_at: None,
                });
            }
        }
        mock
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Script the summary channel. Without a terminal `Done`/`Error` the
    /// channel behaves like a transport hangup after the last event.
    pub fn with_summary_events(self, events: Vec<SummaryEvent>) -> Self {
        *self.summary_events.lock().expect("mock state lock") = events;
        self
    }

    /// Make `endpoint` fail from now on.
    pub fn fail_endpoint(&self, endpoint: &str) {
        self.failures
            .lock()
            .expect("mock state lock")
            .insert(endpoint.to_string());
    }

    /// Number of message round trips actually issued.
    pub fn send_calls(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    fn check(&self, endpoint: &str) -> Result<(), DomainError> {
        if self.failures.lock().expect("mock state lock").contains(endpoint) {
            return Err(DomainError::Transport(format!(
                "simulated connection failure: {endpoint}"
            )));
        }
        Ok(())
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AnalyticsGateway for MockBackend {
    async fn overview(&self) -> Result<OverviewSnapshot, DomainError> {
        self.check("overview")?;
        self.simulate_latency().await;
        Ok(OverviewSnapshot {
            has_data: true,
            production: Some(ProductionStats {
                total_batches: 1860,
                recent_batches: 42,
                avg_yield: 97.8,
                recent_yield: 98.1,
            }),
            quality: Some(QualityStats {
                total_tests: 1860,
                pass_rate: 99.2,
                quality_score: 91.4,
            }),
            equipment: Some(CalibrationStats {
                total_calibrations: 420,
                failed_calibrations: 6,
                calibration_pass_rate: 98.6,
            }),
            ..Default::default()
        })
    }

    async fn yearly_summary(&self) -> Result<YearlySummarySnapshot, DomainError> {
        self.check("yearly_summary")?;
        self.simulate_latency().await;
        Ok(YearlySummarySnapshot {
            years: vec![
                YearSummary {
                    year: 2021,
                    batches: 590,
                    avg_yield: 97.2,
                    avg_hardness: 11.8,
                    complaints: 31,
                },
                YearSummary {
                    year: 2022,
                    batches: 624,
                    avg_yield: 97.9,
                    avg_hardness: 11.9,
                    complaints: 24,
                },
                YearSummary {
                    year: 2023,
                    batches: 646,
                    avg_yield: 98.1,
                    avg_hardness: 12.0,
                    complaints: 19,
                },
            ],
        })
    }

    async fn supplier_performance(&self) -> Result<SupplierPerformanceSnapshot, DomainError> {
        self.check("supplier_performance")?;
        self.simulate_latency().await;
        let suppliers = vec![
            ("SUP-001", "Lactopharm GmbH", 210, 99.1, "good"),
            ("SUP-002", "Celluchem SA", 184, 98.4, "good"),
            ("SUP-003", "MagStearate Ltd", 96, 96.9, "warning"),
            ("SUP-004", "Povidex Inc", 88, 95.2, "warning"),
            ("SUP-005", "API Sources BV", 75, 93.7, "critical"),
            ("SUP-006", "Coatings & Films", 31, 99.5, "good"),
        ]
        .into_iter()
        .map(
            |(id, name, deliveries, rate, status)| SupplierRecord {
                supplier_id: id.to_string(),
                supplier_name: name.to_string(),
                total_deliveries: deliveries,
                approved: deliveries,
                rejected: 0,
                pending: 0,
                approval_rate: rate,
                status: status.to_string(),
            },
        )
        .collect::<Vec<_>>();
        Ok(SupplierPerformanceSnapshot {
            total_suppliers: suppliers.len() as u64,
            at_risk: 1,
            suppliers,
        })
    }

    async fn equipment_analysis(&self) -> Result<EquipmentAnalysisSnapshot, DomainError> {
        self.check("equipment_analysis")?;
        self.simulate_latency().await;
        Ok(EquipmentAnalysisSnapshot {
            equipment: vec![
                EquipmentRecord {
                    equipment_id: "PRESS-01".to_string(),
                    kind: "Tablet Press".to_string(),
                    batches: 640,
                    avg_yield: 97.4,
                    avg_hardness: 11.8,
                    hardness_variability: 0.42,
                },
                EquipmentRecord {
                    equipment_id: "PRESS-02".to_string(),
                    kind: "Tablet Press".to_string(),
                    batches: 612,
                    avg_yield: 98.0,
                    avg_hardness: 12.1,
                    hardness_variability: 0.31,
                },
                EquipmentRecord {
                    equipment_id: "PRESS-03".to_string(),
                    kind: "Tablet Press".to_string(),
                    batches: 608,
                    avg_yield: 98.2,
                    avg_hardness: 11.9,
                    hardness_variability: 0.55,
                },
            ],
        })
    }

    async fn period_comparison(
        &self,
        _range: Option<&PeriodRange>,
    ) -> Result<PeriodComparisonSnapshot, DomainError> {
        self.check("period_comparison")?;
        self.simulate_latency().await;
        Ok(PeriodComparisonSnapshot {
            period1: PeriodStats {
                start: "2023-01-01".to_string(),
                end: "2023-12-31".to_string(),
                label: "Current period".to_string(),
                batches: 646,
                avg_yield: 98.1,
                avg_hardness: 12.0,
                complaints: 19,
            },
            period2: PeriodStats {
                start: "2022-01-01".to_string(),
                end: "2022-12-31".to_string(),
                label: "Previous period".to_string(),
                batches: 624,
                avg_yield: 97.9,
                avg_hardness: 11.9,
                complaints: 24,
            },
            changes: PeriodChanges {
                batches_pct: 3.5,
                yield_pct: 0.2,
                hardness_pct: 0.8,
                complaints_pct: -20.8,
            },
        })
    }

    async fn drift_detection(&self, window_days: u32) -> Result<DriftReport, DomainError> {
        self.check("drift_detection")?;
        self.simulate_latency().await;
        Ok(DriftReport {
            period: format!("Last {window_days} days vs previous {window_days} days"),
            drifts: Vec::new(),
            total_alerts: 0,
        })
    }

    async fn anomalies(&self, days: u32) -> Result<AnomalyReport, DomainError> {
        self.check("anomalies")?;
        self.simulate_latency().await;
        Ok(AnomalyReport {
            period: format!("Last {days} days"),
            ..Default::default()
        })
    }
}

#[async_trait::async_trait]
impl ChatGateway for MockBackend {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, DomainError> {
        self.check("list_conversations")?;
        self.simulate_latency().await;
        Ok(self.conversations.lock().expect("mock state lock").clone())
    }

    async fn create_conversation(&self) -> Result<Conversation, DomainError> {
        self.check("create_conversation")?;
        self.simulate_latency().await;
        let conversation = Conversation {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: "New conversation".to_string(),
            created_at: None,
        };
        self.conversations
            .lock()
            .expect("mock state lock")
            .insert(0, conversation.clone());
        Ok(conversation)
    }

    async fn delete_conversation(&self, id: i64) -> Result<(), DomainError> {
        self.check("delete_conversation")?;
        self.simulate_latency().await;
        self.conversations
            .lock()
            .expect("mock state lock")
            .retain(|c| c.id != id);
        self.histories.lock().expect("mock state lock").remove(&id);
        Ok(())
    }

    async fn send_message(
        &self,
        conversation_id: i64,
        message: &str,
    ) -> Result<String, DomainError> {
        self.check("send_message")?;
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let reply = format!(
            "[MOCK] Based on the imported APR data, here is what I can say about \"{message}\": \
             yields are stable and no critical quality signal is open."
        );

        // The real backend auto-titles a fresh conversation from the first
        // user turn.
        {
            let mut conversations = self.conversations.lock().expect("mock state lock");
            if let Some(conversation) = conversations.iter_mut().find(|c| c.id == conversation_id)
            {
                if conversation.title == "New conversation" {
                    conversation.title = message.chars().take(50).collect();
                }
            }
        }
        let mut histories = self.histories.lock().expect("mock state lock");
        let log = histories.entry(conversation_id).or_default();
        log.push(ChatMessage::user(message));
        log.push(ChatMessage::assistant(reply.clone()));

        Ok(reply)
    }

    async fn history(&self, conversation_id: i64) -> Result<Vec<ChatMessage>, DomainError> {
        self.check("history")?;
        self.simulate_latency().await;
        Ok(self
            .histories
            .lock()
            .expect("mock state lock")
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn open_summary_stream(&self) -> Result<SummaryStream, DomainError> {
        self.check("summary_stream")?;
        self.simulate_latency().await;
        let events = self.summary_events.lock().expect("mock state lock").clone();
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity matches the script; try_send cannot fail here.
            let _ = tx.try_send(event);
        }
        info!("[MOCK] summary stream opened");
        Ok(SummaryStream::new(rx, None))
    }

    async fn report(&self) -> Result<String, DomainError> {
        self.check("report")?;
        self.simulate_latency().await;
        Ok("[MOCK] Annual Product Review: production and quality metrics \
            within specification for the review period."
            .to_string())
    }
}

#[async_trait::async_trait]
impl DataGateway for MockBackend {
    async fn dashboard(&self) -> Result<serde_json::Value, DomainError> {
        self.check("dashboard")?;
        self.simulate_latency().await;
        Ok(serde_json::json!({
            "total_batches": 1860,
            "open_complaints": 4,
            "open_capas": 11,
            "avg_yield": 97.8,
        }))
    }

    async fn batches(&self, limit: u32) -> Result<Vec<BatchRecord>, DomainError> {
        self.check("batches")?;
        self.simulate_latency().await;
        let batches = (0..limit.min(5))
            .map(|i| BatchRecord {
                batch_id: format!("B23-{:04}", 1000 + i),
                manufacturing_date: Some(format!("2023-11-{:02}", i + 1)),
                tablet_press_id: Some("PRESS-01".to_string()),
                hardness: Some(11.9),
                weight: Some(250.3),
                compression_force: Some(14.2),
                yield_percent: Some(98.0),
            })
            .collect();
        Ok(batches)
    }

    async fn trends(&self, parameter: &str, days: u32) -> Result<TrendSeries, DomainError> {
        self.check("trends")?;
        self.simulate_latency().await;
        Ok(TrendSeries {
            parameter: parameter.to_string(),
            points: (0..days.min(7))
                .map(|i| TrendPoint {
                    date: format!("2023-12-{:02}", i + 1),
                    value: 97.5 + (i as f64) * 0.1,
                })
                .collect(),
        })
    }

    async fn complaints(&self, status: Option<&str>) -> Result<Vec<ComplaintRecord>, DomainError> {
        self.check("complaints")?;
        self.simulate_latency().await;
        let all = vec![
            ComplaintRecord {
                complaint_id: "C-2023-081".to_string(),
                complaint_date: Some("2023-10-12".to_string()),
                category: Some("Packaging".to_string()),
                severity: Some("minor".to_string()),
                status: Some("open".to_string()),
                ..Default::default()
            },
            ComplaintRecord {
                complaint_id: "C-2023-064".to_string(),
                complaint_date: Some("2023-08-02".to_string()),
                category: Some("Appearance".to_string()),
                severity: Some("minor".to_string()),
                status: Some("closed".to_string()),
                ..Default::default()
            },
        ];
        Ok(match status {
            Some(wanted) => all
                .into_iter()
                .filter(|c| c.status.as_deref() == Some(wanted))
                .collect(),
            None => all,
        })
    }

    async fn capas(&self, status: Option<&str>) -> Result<Vec<CapaRecord>, DomainError> {
        self.check("capas")?;
        self.simulate_latency().await;
        let all = vec![CapaRecord {
            capa_id: "CAPA-2023-017".to_string(),
            open_date: Some("2023-06-20".to_string()),
            capa_type: Some("Corrective".to_string()),
            problem_category: Some("Equipment".to_string()),
            status: Some("open".to_string()),
            capa_owner: Some("QA".to_string()),
        }];
        Ok(match status {
            Some(wanted) => all
                .into_iter()
                .filter(|c| c.status.as_deref() == Some(wanted))
                .collect(),
            None => all,
        })
    }

    async fn upload(
        &self,
        data_type: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, DomainError> {
        self.check("upload")?;
        self.simulate_latency().await;
        info!(data_type, filename, size = bytes.len(), "[MOCK] upload accepted");
        Ok(UploadResult {
            status: Some("ok".to_string()),
            data_type: Some(data_type.to_string()),
            rows_imported: Some(bytes.iter().filter(|b| **b == b'\n').count() as u64),
            message: None,
        })
    }

    async fn uploads(&self) -> Result<Vec<UploadRecord>, DomainError> {
        self.check("uploads")?;
        self.simulate_latency().await;
        Ok(vec![UploadRecord {
            filename: "batch_release_2023.csv".to_string(),
            data_type: Some("batches".to_string()),
            uploaded_at: Some("2023-12-01T09:30:00".to_string()),
            rows: Some(646),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failure_injection_only_hits_named_endpoint() {
        let mock = MockBackend::failing(&["overview"]);
        assert!(mock.overview().await.is_err());
        assert!(mock.yearly_summary().await.is_ok());
    }

    #[tokio::test]
    async fn dashboard_summary_is_a_json_object() {
        let mock = MockBackend::new().with_delay(Duration::ZERO);
        let summary = mock.dashboard().await.expect("dashboard");
        assert!(summary.is_object());
        assert!(summary.get("total_batches").is_some());
    }

    #[tokio::test]
    async fn send_retitles_fresh_conversation_and_records_history() {
        let mock = MockBackend::new().with_delay(Duration::ZERO);
        let conversation = mock.create_conversation().await.expect("create");
        mock.send_message(conversation.id, "Why did yield dip in March?")
            .await
            .expect("send");

        let conversations = mock.list_conversations().await.expect("list");
        assert_eq!(conversations[0].title, "Why did yield dip in March?");
        let history = mock.history(conversation.id).await.expect("history");
        assert_eq!(history.len(), 2);
    }
}
