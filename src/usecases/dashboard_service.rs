//! Dashboard aggregation. Fans out over the five metric resources and
//! derives the chart-ready view-model.
//!
//! Stateless: every load re-fetches and re-derives from scratch. No cache,
//! no staleness tracking — overlapping loads each produce their own result
//! and the caller decides which one to render.

use crate::domain::{
    AnomalyReport, ComparisonMetric, ComparisonView, DashboardViewModel, DomainError, DriftReport,
    MetricDelta, OverviewSnapshot, PeriodComparisonSnapshot, RADAR_FULL_SCALE, RadarEntry,
    SupplierPerformanceSnapshot, SupplierSlice, SupplierStatus, YearSummary,
    YearlySummarySnapshot,
};
use crate::ports::AnalyticsGateway;
use std::sync::Arc;
use tracing::info;

/// The supplier pie shows at most this many slices.
const SUPPLIER_SLICE_LIMIT: usize = 5;

/// Service for the analytics dashboard.
///
/// `load_overview` is the aggregate entry point; drift and anomaly reports
/// are independent single-resource loads.
pub struct DashboardService {
    analytics: Arc<dyn AnalyticsGateway>,
}

impl DashboardService {
    pub fn new(analytics: Arc<dyn AnalyticsGateway>) -> Self {
        Self { analytics }
    }

    /// Load the full dashboard view-model.
    ///
    /// The five sub-fetches are issued concurrently and joined; the result
    /// is all-or-nothing. The first failure aborts the whole load and
    /// partial results are discarded — a dashboard with silently missing
    /// sections is worse than an explicit empty state.
    pub async fn load_overview(&self) -> Result<DashboardViewModel, DomainError> {
        let (overview, yearly, suppliers, equipment, comparison) = tokio::try_join!(
            self.analytics.overview(),
            self.analytics.yearly_summary(),
            self.analytics.supplier_performance(),
            self.analytics.equipment_analysis(),
            self.analytics.period_comparison(None),
        )?;

        info!(
            years = yearly.years.len(),
            suppliers = suppliers.suppliers.len(),
            equipment = equipment.equipment.len(),
            has_data = overview.has_data,
            "dashboard snapshots loaded"
        );

        Ok(DashboardViewModel {
            radar: radar_vector(&overview),
            yearly: yearly_series(yearly),
            suppliers: supplier_distribution(&suppliers),
            equipment: equipment.equipment,
            comparison: comparison_view(comparison),
        })
    }

    /// Drift trends over the given window vs the window before it.
    pub async fn drift_report(&self, window_days: u32) -> Result<DriftReport, DomainError> {
        self.analytics.drift_detection(window_days).await
    }

    /// Recent out-of-spec batches, QC failures, and calibration failures.
    pub async fn anomaly_report(&self, days: u32) -> Result<AnomalyReport, DomainError> {
        self.analytics.anomalies(days).await
    }
}

/// Four fixed axes pulled from fixed paths in the overview snapshot.
/// Always exactly 4 entries; absent or non-finite source values become 0,
/// never NaN and never a dropped entry.
fn radar_vector(overview: &OverviewSnapshot) -> Vec<RadarEntry> {
    let production = overview.production.as_ref();
    let quality = overview.quality.as_ref();
    let equipment = overview.equipment.as_ref();

    let axes = [
        ("Yield", production.map(|p| p.avg_yield)),
        ("QC Pass Rate", quality.map(|q| q.pass_rate)),
        ("Calibration", equipment.map(|e| e.calibration_pass_rate)),
        ("Quality Score", quality.map(|q| q.quality_score)),
    ];

    axes.into_iter()
        .map(|(metric, value)| RadarEntry {
            metric,
            value: scale_or_zero(value),
            full_scale: RADAR_FULL_SCALE,
        })
        .collect()
}

fn scale_or_zero(value: Option<f64>) -> f64 {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, RADAR_FULL_SCALE))
        .unwrap_or(0.0)
}

/// Ascending-year series. Empty input is valid (the dependent chart is
/// simply suppressed).
fn yearly_series(snapshot: YearlySummarySnapshot) -> Vec<YearSummary> {
    let mut years = snapshot.years;
    years.sort_by_key(|y| y.year);
    years
}

/// First min(5, n) suppliers in backend order — no client-side re-sort,
/// never padded.
fn supplier_distribution(snapshot: &SupplierPerformanceSnapshot) -> Vec<SupplierSlice> {
    snapshot
        .suppliers
        .iter()
        .take(SUPPLIER_SLICE_LIMIT)
        .map(|s| SupplierSlice {
            name: s.supplier_name.clone(),
            value: s.total_deliveries,
            rate: s.approval_rate,
            status: SupplierStatus::from_backend(&s.status),
        })
        .collect()
}

fn comparison_view(snapshot: PeriodComparisonSnapshot) -> ComparisonView {
    let changes = snapshot.changes;
    ComparisonView {
        period1: snapshot.period1,
        period2: snapshot.period2,
        batches: MetricDelta::new(ComparisonMetric::Batches, changes.batches_pct),
        avg_yield: MetricDelta::new(ComparisonMetric::Yield, changes.yield_pct),
        hardness: MetricDelta::new(ComparisonMetric::Hardness, changes.hardness_pct),
        complaints: MetricDelta::new(ComparisonMetric::Complaints, changes.complaints_pct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockBackend;
    use crate::domain::{DeltaTone, PeriodChanges, ProductionStats, QualityStats, SupplierRecord};

    fn overview_with(avg_yield: f64, pass_rate: f64, quality_score: f64) -> OverviewSnapshot {
        OverviewSnapshot {
            has_data: true,
            production: Some(ProductionStats {
                avg_yield,
                ..Default::default()
            }),
            quality: Some(QualityStats {
                pass_rate,
                quality_score,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn supplier(name: &str, deliveries: u64, rate: f64, status: &str) -> SupplierRecord {
        SupplierRecord {
            supplier_name: name.to_string(),
            total_deliveries: deliveries,
            approval_rate: rate,
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn radar_always_has_four_entries() {
        let radar = radar_vector(&overview_with(97.5, 99.1, 88.0));
        assert_eq!(radar.len(), 4);
        assert_eq!(radar[0].metric, "Yield");
        assert_eq!(radar[0].value, 97.5);
        assert_eq!(radar[1].value, 99.1);
        // No calibration section in the snapshot: axis present, value 0.
        assert_eq!(radar[2].value, 0.0);
        assert_eq!(radar[3].value, 88.0);
        assert!(radar.iter().all(|e| e.full_scale == RADAR_FULL_SCALE));
    }

    #[test]
    fn radar_defaults_to_zero_on_empty_overview() {
        let radar = radar_vector(&OverviewSnapshot::default());
        assert_eq!(radar.len(), 4);
        assert!(radar.iter().all(|e| e.value == 0.0));
    }

    #[test]
    fn radar_clamps_out_of_range_values() {
        let radar = radar_vector(&overview_with(132.0, -3.0, f64::NAN));
        assert_eq!(radar[0].value, 100.0);
        assert_eq!(radar[1].value, 0.0);
        assert_eq!(radar[3].value, 0.0);
        assert!(radar.iter().all(|e| (0.0..=100.0).contains(&e.value)));
    }

    #[test]
    fn supplier_distribution_takes_top_five_in_backend_order() {
        let snapshot = SupplierPerformanceSnapshot {
            suppliers: (0..7)
                .map(|i| supplier(&format!("S{i}"), 100 - i, 90.0 + i as f64, "good"))
                .collect(),
            ..Default::default()
        };
        let slices = supplier_distribution(&snapshot);
        assert_eq!(slices.len(), 5);
        let names: Vec<&str> = slices.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["S0", "S1", "S2", "S3", "S4"]);
    }

    #[test]
    fn supplier_distribution_never_pads() {
        let snapshot = SupplierPerformanceSnapshot {
            suppliers: vec![
                supplier("Acme", 40, 99.0, "good"),
                supplier("Zenith", 12, 94.2, "unknown-status"),
            ],
            ..Default::default()
        };
        let slices = supplier_distribution(&snapshot);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].status, SupplierStatus::Compliant);
        assert_eq!(slices[1].status, SupplierStatus::Critical);
    }

    #[test]
    fn comparison_polarity_complaints_alone_inverts() {
        let snapshot = PeriodComparisonSnapshot {
            changes: PeriodChanges {
                batches_pct: -5.0,
                yield_pct: -5.0,
                hardness_pct: -5.0,
                complaints_pct: -5.0,
            },
            ..Default::default()
        };
        let view = comparison_view(snapshot);
        assert_eq!(view.batches.tone, DeltaTone::Unfavorable);
        assert_eq!(view.avg_yield.tone, DeltaTone::Unfavorable);
        assert_eq!(view.hardness.tone, DeltaTone::Neutral);
        assert_eq!(view.complaints.tone, DeltaTone::Favorable);
    }

    #[test]
    fn yearly_series_sorted_ascending() {
        let snapshot = YearlySummarySnapshot {
            years: vec![
                YearSummary {
                    year: 2023,
                    ..Default::default()
                },
                YearSummary {
                    year: 2021,
                    ..Default::default()
                },
                YearSummary {
                    year: 2022,
                    ..Default::default()
                },
            ],
        };
        let years: Vec<i32> = yearly_series(snapshot).iter().map(|y| y.year).collect();
        assert_eq!(years, [2021, 2022, 2023]);
    }

    #[tokio::test]
    async fn load_overview_builds_full_view_model() {
        let backend = Arc::new(MockBackend::new());
        let service = DashboardService::new(backend);

        let vm = service.load_overview().await.expect("mock load");
        assert_eq!(vm.radar.len(), 4);
        assert!(!vm.yearly.is_empty());
        assert!(vm.suppliers.len() <= 5);
        assert!(!vm.equipment.is_empty());
    }

    #[tokio::test]
    async fn one_failing_fetch_aborts_the_whole_load() {
        for endpoint in [
            "overview",
            "yearly_summary",
            "supplier_performance",
            "equipment_analysis",
            "period_comparison",
        ] {
            let backend = Arc::new(MockBackend::failing(&[endpoint]));
            let service = DashboardService::new(backend);
            assert!(
                service.load_overview().await.is_err(),
                "load should fail when {endpoint} rejects"
            );
        }
    }
}
