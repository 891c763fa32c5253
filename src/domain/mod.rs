//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    Anomaly, AnomalyReport, BatchRecord, CalibrationStats, CapaRecord, ChatMessage, ChatRole,
    ChatSessionState, ComparisonMetric, ComparisonView, ComplaintRecord, ComplianceStats,
    Conversation, DashboardViewModel, DeltaTone, Drift, DriftReport, EquipmentAnalysisSnapshot,
    EquipmentDrift, EquipmentRecord, MetricDelta, OverviewSnapshot, PeriodChanges,
    PeriodComparisonSnapshot, PeriodInfo, PeriodRange, PeriodStats, ProductionStats, QualityStats,
    RADAR_FULL_SCALE, RadarEntry, SummaryEvent, SupplierPerformanceSnapshot, SupplierRecord,
    SupplierSlice, SupplierStatus, TrendPoint, TrendSeries, UploadRecord, UploadResult,
    YearSummary, YearlySummarySnapshot,
};
pub use errors::DomainError;
