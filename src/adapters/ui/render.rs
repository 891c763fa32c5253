//! Plain-text rendering of view-models. Charts become aligned tables;
//! delta tones map to terminal colors.

use crate::domain::{
    Anomaly, AnomalyReport, BatchRecord, CapaRecord, ChatMessage, ChatRole, ComplaintRecord,
    DashboardViewModel, DeltaTone, DriftReport, MetricDelta, SupplierStatus, TrendSeries,
    UploadRecord,
};
use crossterm::style::Stylize;

pub fn print_dashboard(vm: &DashboardViewModel) {
    println!("\n{}", "Performance Radar".bold());
    for entry in &vm.radar {
        println!(
            "  {:<14} {:>6.1} / {:.0}  {}",
            entry.metric,
            entry.value,
            entry.full_scale,
            bar(entry.value, entry.full_scale)
        );
    }

    if vm.yearly.is_empty() {
        println!("\n{}", "Yearly Summary: no data".dim());
    } else {
        println!("\n{}", "Yearly Summary".bold());
        println!(
            "  {:<6} {:>8} {:>10} {:>12} {:>11}",
            "Year", "Batches", "Avg Yield", "Avg Hardness", "Complaints"
        );
        for y in &vm.yearly {
            println!(
                "  {:<6} {:>8} {:>9.1}% {:>12.1} {:>11}",
                y.year, y.batches, y.avg_yield, y.avg_hardness, y.complaints
            );
        }
    }

    if vm.suppliers.is_empty() {
        println!("\n{}", "Supplier Distribution: no data".dim());
    } else {
        println!("\n{}", "Top Suppliers".bold());
        for s in &vm.suppliers {
            let status = match s.status {
                SupplierStatus::Compliant => s.status.label().green(),
                SupplierStatus::Watch => s.status.label().yellow(),
                SupplierStatus::Critical => s.status.label().red(),
            };
            println!(
                "  {:<24} {:>5} deliveries  {:>5.1}% approved  [{status}]",
                s.name, s.value, s.rate
            );
        }
    }

    if !vm.equipment.is_empty() {
        println!("\n{}", "Equipment".bold());
        println!(
            "  {:<10} {:<14} {:>8} {:>10} {:>13} {:>12}",
            "ID", "Type", "Batches", "Avg Yield", "Avg Hardness", "Variability"
        );
        for e in &vm.equipment {
            println!(
                "  {:<10} {:<14} {:>8} {:>9.1}% {:>13.1} {:>12.2}",
                e.equipment_id, e.kind, e.batches, e.avg_yield, e.avg_hardness,
                e.hardness_variability
            );
        }
    }

    let cmp = &vm.comparison;
    println!(
        "\n{} ({} vs {})",
        "Period Comparison".bold(),
        cmp.period1.label,
        cmp.period2.label
    );
    for delta in cmp.deltas() {
        println!("  {:<14} {}", delta.metric.label(), format_delta(&delta));
    }
}

/// Signed percentage colored by tone. Neutral stays uncolored.
pub fn format_delta(delta: &MetricDelta) -> String {
    let text = format!("{:+.1}%", delta.pct);
    match delta.tone {
        DeltaTone::Favorable => text.green().to_string(),
        DeltaTone::Unfavorable => text.red().to_string(),
        DeltaTone::Neutral => text,
    }
}

pub fn print_drift(report: &DriftReport) {
    println!("\n{} ({})", "Drift Detection".bold(), report.period);
    if report.drifts.is_empty() {
        println!("  No drift data for this window.");
        return;
    }
    for drift in &report.drifts {
        let marker = if drift.alert {
            "ALERT".red().to_string()
        } else {
            "ok".green().to_string()
        };
        println!(
            "  {:<22} {:>8.2} -> {:>8.2}  ({:+.1}%)  [{marker}]",
            drift.label, drift.previous_avg, drift.current_avg, drift.change_pct
        );
        for eq in &drift.equipment_drifts {
            println!(
                "      {:<18} {:>8.2} -> {:>8.2}  ({:+.2})",
                eq.equipment, eq.previous_avg, eq.current_avg, eq.change
            );
        }
    }
    println!("  Total alerts: {}", report.total_alerts);
}

pub fn print_anomalies(report: &AnomalyReport) {
    println!("\n{} ({})", "Anomalies".bold(), report.period);
    println!(
        "  total: {}  critical: {}  warning: {}",
        report.total,
        report.critical.to_string().red(),
        report.warning.to_string().yellow()
    );
    for anomaly in &report.anomalies {
        print_anomaly(anomaly);
    }
}

fn print_anomaly(anomaly: &Anomaly) {
    let severity = match anomaly.severity.as_str() {
        "critical" => anomaly.severity.as_str().red().to_string(),
        "warning" => anomaly.severity.as_str().yellow().to_string(),
        other => other.to_string(),
    };
    let subject = anomaly
        .batch_id
        .as_deref()
        .or(anomaly.equipment_name.as_deref())
        .or(anomaly.equipment_id.as_deref())
        .unwrap_or("-");
    println!(
        "  [{severity}] {:<12} {:<14} {}",
        anomaly.kind, subject, anomaly.message
    );
    if let Some(details) = &anomaly.details {
        println!("      {}", details.clone().dim());
    }
}

pub fn print_batches(batches: &[BatchRecord]) {
    println!("\n{}", "Recent Batches".bold());
    if batches.is_empty() {
        println!("  No batches recorded.");
        return;
    }
    println!(
        "  {:<12} {:<12} {:<10} {:>9} {:>8} {:>8}",
        "Batch", "Date", "Press", "Hardness", "Weight", "Yield"
    );
    for b in batches {
        println!(
            "  {:<12} {:<12} {:<10} {:>9} {:>8} {:>8}",
            b.batch_id,
            b.manufacturing_date.as_deref().unwrap_or("-"),
            b.tablet_press_id.as_deref().unwrap_or("-"),
            opt_f64(b.hardness, 1),
            opt_f64(b.weight, 1),
            opt_f64(b.yield_percent, 1),
        );
    }
}

pub fn print_trend(series: &TrendSeries) {
    println!("\n{} ({})", "Trend".bold(), series.parameter);
    if series.points.is_empty() {
        println!("  No data points in this window.");
        return;
    }
    let max = series
        .points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);
    for p in &series.points {
        println!("  {:<12} {:>9.2}  {}", p.date, p.value, bar(p.value, max));
    }
}

pub fn print_complaints(complaints: &[ComplaintRecord]) {
    println!("\n{}", "Complaints".bold());
    if complaints.is_empty() {
        println!("  No complaints match.");
        return;
    }
    for c in complaints {
        let severity = match c.severity.as_deref() {
            Some("critical") => "critical".red().to_string(),
            Some("major") => "major".yellow().to_string(),
            Some(other) => other.to_string(),
            None => "-".to_string(),
        };
        println!(
            "  {:<14} {:<12} {:<14} {:<8} [{severity}]",
            c.complaint_id,
            c.complaint_date.as_deref().unwrap_or("-"),
            c.category.as_deref().unwrap_or("-"),
            c.status.as_deref().unwrap_or("-"),
        );
    }
}

pub fn print_capas(capas: &[CapaRecord]) {
    println!("\n{}", "CAPAs".bold());
    if capas.is_empty() {
        println!("  No CAPAs match.");
        return;
    }
    for c in capas {
        println!(
            "  {:<16} {:<12} {:<12} {:<14} {:<8} {}",
            c.capa_id,
            c.open_date.as_deref().unwrap_or("-"),
            c.capa_type.as_deref().unwrap_or("-"),
            c.problem_category.as_deref().unwrap_or("-"),
            c.status.as_deref().unwrap_or("-"),
            c.capa_owner.as_deref().unwrap_or("-"),
        );
    }
}

pub fn print_uploads(uploads: &[UploadRecord]) {
    println!("\n{}", "Upload History".bold());
    if uploads.is_empty() {
        println!("  No uploads yet.");
        return;
    }
    for u in uploads {
        println!(
            "  {:<28} {:<12} {:<20} {} rows",
            u.filename,
            u.data_type.as_deref().unwrap_or("-"),
            u.uploaded_at.as_deref().unwrap_or("-"),
            u.rows.map_or("-".to_string(), |r| r.to_string()),
        );
    }
}

pub fn print_chat_log(messages: &[ChatMessage]) {
    for message in messages {
        match message.role {
            ChatRole::User => println!("{} {}", "you:".cyan().bold(), message.content),
            ChatRole::Assistant => println!("{} {}", "apr:".green().bold(), message.content),
        }
    }
}

fn opt_f64(value: Option<f64>, decimals: usize) -> String {
    value.map_or("-".to_string(), |v| format!("{v:.decimals$}"))
}

/// Small proportional bar, 20 cells wide.
fn bar(value: f64, full_scale: f64) -> String {
    const WIDTH: usize = 20;
    let filled = if full_scale > 0.0 {
        ((value / full_scale) * WIDTH as f64).round() as usize
    } else {
        0
    };
    let filled = filled.min(WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ComparisonMetric;

    #[test]
    fn bar_is_fixed_width() {
        assert_eq!(bar(0.0, 100.0).len(), 20);
        assert_eq!(bar(100.0, 100.0), "#".repeat(20));
        assert_eq!(bar(50.0, 100.0).chars().filter(|&c| c == '#').count(), 10);
        // Degenerate scale still renders an empty bar.
        assert_eq!(bar(5.0, 0.0), ".".repeat(20));
    }

    #[test]
    fn neutral_delta_is_uncolored() {
        let delta = MetricDelta::new(ComparisonMetric::Hardness, 2.5);
        assert_eq!(format_delta(&delta), "+2.5%");
    }

    #[test]
    fn favorable_delta_keeps_the_signed_number() {
        let delta = MetricDelta::new(ComparisonMetric::Yield, 1.25);
        assert!(format_delta(&delta).contains("+1.2%"));
    }
}
