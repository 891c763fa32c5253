//! Domain entities. Backend snapshots, derived view-models, chat session types.
//!
//! No HTTP/IO types here — these are mapped from adapters.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────
// Analytics snapshots (immutable per-load payloads from the backend)
// ─────────────────────────────────────────────────────────────────────────

/// GET /analytics/overview. All sections are optional: an empty database
/// returns only `has_data=false` plus a message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewSnapshot {
    #[serde(default)]
    pub has_data: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub period: Option<PeriodInfo>,
    #[serde(default)]
    pub production: Option<ProductionStats>,
    #[serde(default)]
    pub quality: Option<QualityStats>,
    #[serde(default)]
    pub compliance: Option<ComplianceStats>,
    #[serde(default)]
    pub equipment: Option<CalibrationStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodInfo {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub years: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductionStats {
    #[serde(default)]
    pub total_batches: u64,
    #[serde(default)]
    pub recent_batches: u64,
    #[serde(default)]
    pub avg_yield: f64,
    #[serde(default)]
    pub recent_yield: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QualityStats {
    #[serde(default)]
    pub total_tests: u64,
    #[serde(default)]
    pub pass_rate: f64,
    #[serde(default)]
    pub quality_score: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplianceStats {
    #[serde(default)]
    pub total_complaints: u64,
    #[serde(default)]
    pub open_complaints: u64,
    #[serde(default)]
    pub critical_complaints: u64,
    #[serde(default)]
    pub total_capas: u64,
    #[serde(default)]
    pub open_capas: u64,
    #[serde(default)]
    pub overdue_capas: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalibrationStats {
    #[serde(default)]
    pub total_calibrations: u64,
    #[serde(default)]
    pub failed_calibrations: u64,
    #[serde(default)]
    pub calibration_pass_rate: f64,
}

/// GET /analytics/yearly-summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearlySummarySnapshot {
    #[serde(default)]
    pub years: Vec<YearSummary>,
}

/// One year of production/quality aggregates. Also the per-point shape of
/// the derived yearly series (the backend shape is already chart-ready).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct YearSummary {
    pub year: i32,
    #[serde(default)]
    pub batches: u64,
    #[serde(default)]
    pub avg_yield: f64,
    #[serde(default)]
    pub avg_hardness: f64,
    #[serde(default)]
    pub complaints: u64,
}

/// GET /analytics/supplier-performance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierPerformanceSnapshot {
    #[serde(default)]
    pub total_suppliers: u64,
    #[serde(default)]
    pub suppliers: Vec<SupplierRecord>,
    #[serde(default)]
    pub at_risk: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierRecord {
    #[serde(default)]
    pub supplier_id: String,
    #[serde(default)]
    pub supplier_name: String,
    #[serde(default)]
    pub total_deliveries: u64,
    #[serde(default)]
    pub approved: u64,
    #[serde(default)]
    pub rejected: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub approval_rate: f64,
    #[serde(default)]
    pub status: String,
}

/// GET /analytics/equipment-analysis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentAnalysisSnapshot {
    #[serde(default)]
    pub equipment: Vec<EquipmentRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentRecord {
    #[serde(default)]
    pub equipment_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub batches: u64,
    #[serde(default)]
    pub avg_yield: f64,
    #[serde(default)]
    pub avg_hardness: f64,
    #[serde(default)]
    pub hardness_variability: f64,
}

/// GET /analytics/period-comparison.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodComparisonSnapshot {
    #[serde(default)]
    pub period1: PeriodStats,
    #[serde(default)]
    pub period2: PeriodStats,
    #[serde(default)]
    pub changes: PeriodChanges,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodStats {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub batches: u64,
    #[serde(default)]
    pub avg_yield: f64,
    #[serde(default)]
    pub avg_hardness: f64,
    #[serde(default)]
    pub complaints: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PeriodChanges {
    #[serde(default)]
    pub batches_pct: f64,
    #[serde(default)]
    pub yield_pct: f64,
    #[serde(default)]
    pub hardness_pct: f64,
    #[serde(default)]
    pub complaints_pct: f64,
}

/// Explicit period boundaries for the comparison endpoint.
/// The backend requires all four or none; `None` lets it pick
/// current-year-vs-previous-year defaults.
#[derive(Debug, Clone)]
pub struct PeriodRange {
    pub period1_start: String,
    pub period1_end: String,
    pub period2_start: String,
    pub period2_end: String,
}

/// GET /analytics/drift-detection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriftReport {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub drifts: Vec<Drift>,
    #[serde(default)]
    pub total_alerts: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Drift {
    #[serde(default)]
    pub parameter: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub current_avg: f64,
    #[serde(default)]
    pub previous_avg: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_pct: f64,
    #[serde(default)]
    pub alert: bool,
    #[serde(default)]
    pub equipment_drifts: Vec<EquipmentDrift>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentDrift {
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub current_avg: f64,
    #[serde(default)]
    pub previous_avg: f64,
    #[serde(default)]
    pub change: f64,
}

/// GET /analytics/anomalies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnomalyReport {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub critical: u64,
    #[serde(default)]
    pub warning: u64,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub equipment_id: Option<String>,
    #[serde(default)]
    pub equipment_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────
// Raw data records (GET /data/*)
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRecord {
    #[serde(default)]
    pub batch_id: String,
    #[serde(default)]
    pub manufacturing_date: Option<String>,
    #[serde(default)]
    pub tablet_press_id: Option<String>,
    #[serde(default)]
    pub hardness: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub compression_force: Option<f64>,
    #[serde(default)]
    pub yield_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendPoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendSeries {
    #[serde(default)]
    pub parameter: String,
    #[serde(default)]
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplaintRecord {
    #[serde(default)]
    pub complaint_id: String,
    #[serde(default)]
    pub complaint_date: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapaRecord {
    #[serde(default)]
    pub capa_id: String,
    #[serde(default)]
    pub open_date: Option<String>,
    #[serde(default)]
    pub capa_type: Option<String>,
    #[serde(default)]
    pub problem_category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub capa_owner: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub rows_imported: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRecord {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub rows: Option<u64>,
}

// ─────────────────────────────────────────────────────────────────────────
// Dashboard view-model (derived, presentation-ready)
// ─────────────────────────────────────────────────────────────────────────

/// Scale shared by every radar axis.
pub const RADAR_FULL_SCALE: f64 = 100.0;

/// One axis of the performance radar. `value` is always finite and within
/// [0, RADAR_FULL_SCALE]; absent source fields come through as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarEntry {
    pub metric: &'static str,
    pub value: f64,
    pub full_scale: f64,
}

/// Pie slice for the supplier distribution: top suppliers in backend order.
#[derive(Debug, Clone)]
pub struct SupplierSlice {
    pub name: String,
    /// Total deliveries (slice weight).
    pub value: u64,
    /// Approval rate in percent.
    pub rate: f64,
    pub status: SupplierStatus,
}

/// Presentation label for the backend `status` field. Three buckets with a
/// catch-all: any value the backend invents later lands in `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierStatus {
    Compliant,
    Watch,
    Critical,
}

impl SupplierStatus {
    pub fn from_backend(status: &str) -> Self {
        match status {
            "good" => SupplierStatus::Compliant,
            "warning" => SupplierStatus::Watch,
            _ => SupplierStatus::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SupplierStatus::Compliant => "Compliant",
            SupplierStatus::Watch => "Watch",
            SupplierStatus::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Semantic color class for a period-over-period delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTone {
    Favorable,
    Unfavorable,
    Neutral,
}

/// Metrics compared across the two periods. Each carries its own polarity:
/// more batches/yield is favorable, fewer complaints is favorable, and
/// hardness is directionless (it has a target band, not a "better" side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMetric {
    Batches,
    Yield,
    Hardness,
    Complaints,
}

impl ComparisonMetric {
    pub fn tone_for(&self, pct: f64) -> DeltaTone {
        match self {
            ComparisonMetric::Batches | ComparisonMetric::Yield => {
                if pct >= 0.0 {
                    DeltaTone::Favorable
                } else {
                    DeltaTone::Unfavorable
                }
            }
            ComparisonMetric::Hardness => DeltaTone::Neutral,
            ComparisonMetric::Complaints => {
                if pct <= 0.0 {
                    DeltaTone::Favorable
                } else {
                    DeltaTone::Unfavorable
                }
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComparisonMetric::Batches => "Batches",
            ComparisonMetric::Yield => "Avg Yield",
            ComparisonMetric::Hardness => "Avg Hardness",
            ComparisonMetric::Complaints => "Complaints",
        }
    }
}

/// One signed percentage delta plus its presentation tone.
#[derive(Debug, Clone, Copy)]
pub struct MetricDelta {
    pub metric: ComparisonMetric,
    pub pct: f64,
    pub tone: DeltaTone,
}

impl MetricDelta {
    pub fn new(metric: ComparisonMetric, pct: f64) -> Self {
        Self {
            metric,
            pct,
            tone: metric.tone_for(pct),
        }
    }
}

/// Two period snapshots and the four classified deltas.
#[derive(Debug, Clone)]
pub struct ComparisonView {
    pub period1: PeriodStats,
    pub period2: PeriodStats,
    pub batches: MetricDelta,
    pub avg_yield: MetricDelta,
    pub hardness: MetricDelta,
    pub complaints: MetricDelta,
}

impl ComparisonView {
    pub fn deltas(&self) -> [MetricDelta; 4] {
        [self.batches, self.avg_yield, self.hardness, self.complaints]
    }
}

/// Everything the dashboard tabs render, rebuilt in full on every load.
#[derive(Debug, Clone)]
pub struct DashboardViewModel {
    pub radar: Vec<RadarEntry>,
    pub yearly: Vec<YearSummary>,
    pub suppliers: Vec<SupplierSlice>,
    pub equipment: Vec<EquipmentRecord>,
    pub comparison: ComparisonView,
}

// ─────────────────────────────────────────────────────────────────────────
// Chat session
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Session state owned by the chat service. `active_id`, when set, is
/// always a member of `conversations`; `pending` blocks overlapping sends.
#[derive(Debug, Clone, Default)]
pub struct ChatSessionState {
    /// Most-recent-first, client-maintained.
    pub conversations: Vec<Conversation>,
    pub active_id: Option<i64>,
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
}

// ─────────────────────────────────────────────────────────────────────────
// Summary stream events
// ─────────────────────────────────────────────────────────────────────────

/// Payload of one server-push event on /chat/summary/stream. The three
/// shapes are mutually exclusive; `Done` and `Error` terminate the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryEvent {
    Text(String),
    Done,
    Error(String),
}

#[derive(Deserialize)]
struct RawSummaryEvent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

impl SummaryEvent {
    /// Decode one `data:` payload. Returns None for unparseable or empty
    /// events (the stream skips them rather than failing).
    pub fn decode(data: &str) -> Option<SummaryEvent> {
        let raw: RawSummaryEvent = serde_json::from_str(data).ok()?;
        if raw.done == Some(true) {
            return Some(SummaryEvent::Done);
        }
        if let Some(message) = raw.error {
            return Some(SummaryEvent::Error(message));
        }
        raw.text.map(SummaryEvent::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_status_known_buckets() {
        assert_eq!(
            SupplierStatus::from_backend("good"),
            SupplierStatus::Compliant
        );
        assert_eq!(
            SupplierStatus::from_backend("warning"),
            SupplierStatus::Watch
        );
        assert_eq!(
            SupplierStatus::from_backend("critical"),
            SupplierStatus::Critical
        );
    }

    #[test]
    fn supplier_status_unknown_falls_into_critical() {
        assert_eq!(SupplierStatus::from_backend(""), SupplierStatus::Critical);
        assert_eq!(
            SupplierStatus::from_backend("excellent"),
            SupplierStatus::Critical
        );
    }

    #[test]
    fn polarity_table_all_negative_five() {
        // Identical -5% deltas classify differently per metric: complaints
        // alone inverts, hardness stays neutral.
        assert_eq!(
            ComparisonMetric::Batches.tone_for(-5.0),
            DeltaTone::Unfavorable
        );
        assert_eq!(
            ComparisonMetric::Yield.tone_for(-5.0),
            DeltaTone::Unfavorable
        );
        assert_eq!(
            ComparisonMetric::Hardness.tone_for(-5.0),
            DeltaTone::Neutral
        );
        assert_eq!(
            ComparisonMetric::Complaints.tone_for(-5.0),
            DeltaTone::Favorable
        );
    }

    #[test]
    fn polarity_table_positive() {
        assert_eq!(
            ComparisonMetric::Batches.tone_for(3.2),
            DeltaTone::Favorable
        );
        assert_eq!(
            ComparisonMetric::Hardness.tone_for(3.2),
            DeltaTone::Neutral
        );
        assert_eq!(
            ComparisonMetric::Complaints.tone_for(3.2),
            DeltaTone::Unfavorable
        );
    }

    #[test]
    fn summary_event_decode_variants() {
        assert_eq!(
            SummaryEvent::decode(r#"{"text":"chunk"}"#),
            Some(SummaryEvent::Text("chunk".to_string()))
        );
        assert_eq!(
            SummaryEvent::decode(r#"{"done":true}"#),
            Some(SummaryEvent::Done)
        );
        assert_eq!(
            SummaryEvent::decode(r#"{"error":"quota exceeded"}"#),
            Some(SummaryEvent::Error("quota exceeded".to_string()))
        );
    }

    #[test]
    fn summary_event_decode_garbage_is_none() {
        assert_eq!(SummaryEvent::decode("not json"), None);
        assert_eq!(SummaryEvent::decode("{}"), None);
        assert_eq!(SummaryEvent::decode(r#"{"done":false}"#), None);
    }

    #[test]
    fn overview_snapshot_tolerates_missing_sections() {
        let snap: OverviewSnapshot =
            serde_json::from_str(r#"{"has_data":false,"message":"No data available"}"#)
                .expect("minimal overview");
        assert!(!snap.has_data);
        assert!(snap.production.is_none());
        assert!(snap.quality.is_none());
    }
}
