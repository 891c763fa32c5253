//! AnalyticsGateway over HTTP.

use super::client::ApiClient;
use crate::domain::{
    AnomalyReport, DomainError, DriftReport, EquipmentAnalysisSnapshot, OverviewSnapshot,
    PeriodComparisonSnapshot, PeriodRange, SupplierPerformanceSnapshot, YearlySummarySnapshot,
};
use crate::ports::AnalyticsGateway;
use tracing::debug;

#[async_trait::async_trait]
impl AnalyticsGateway for ApiClient {
    async fn overview(&self) -> Result<OverviewSnapshot, DomainError> {
        self.get_json("/analytics/overview", &[]).await
    }

    async fn yearly_summary(&self) -> Result<YearlySummarySnapshot, DomainError> {
        self.get_json("/analytics/yearly-summary", &[]).await
    }

    async fn supplier_performance(&self) -> Result<SupplierPerformanceSnapshot, DomainError> {
        self.get_json("/analytics/supplier-performance", &[]).await
    }

    async fn equipment_analysis(&self) -> Result<EquipmentAnalysisSnapshot, DomainError> {
        self.get_json("/analytics/equipment-analysis", &[]).await
    }

    async fn period_comparison(
        &self,
        range: Option<&PeriodRange>,
    ) -> Result<PeriodComparisonSnapshot, DomainError> {
        // The backend wants all four boundaries or none.
        let query = match range {
            Some(r) => vec![
                ("period1_start", r.period1_start.clone()),
                ("period1_end", r.period1_end.clone()),
                ("period2_start", r.period2_start.clone()),
                ("period2_end", r.period2_end.clone()),
            ],
            None => Vec::new(),
        };
        debug!(explicit_range = range.is_some(), "fetching period comparison");
        self.get_json("/analytics/period-comparison", &query).await
    }

    async fn drift_detection(&self, window_days: u32) -> Result<DriftReport, DomainError> {
        self.get_json(
            "/analytics/drift-detection",
            &[("window_days", window_days.to_string())],
        )
        .await
    }

    async fn anomalies(&self, days: u32) -> Result<AnomalyReport, DomainError> {
        self.get_json("/analytics/anomalies", &[("days", days.to_string())])
            .await
    }
}
