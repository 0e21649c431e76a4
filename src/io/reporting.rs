// src/io/reporting.rs

use crate::error::SimResult;
use crate::simulation::comparison::ComparisonRow;
use crate::simulation::engine::{DayRecord, ReplicationResult};
use log::info;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::path::Path;

/// Serializes `rows` as CSV with a header line into any writer.
pub fn write_csv<W: io::Write, T: Serialize>(writer: W, rows: &[T]) -> SimResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_csv_file<T: Serialize>(file_path: &Path, rows: &[T]) -> SimResult<()> {
    write_csv(File::create(file_path)?, rows)
}

/// Writes the daily history of one replication to a CSV file.
///
/// # Arguments
/// * `file_path` - Where to save the file (e.g. "results/policy_a.csv").
/// * `result` - The replication to export.
pub fn write_daily_log<P: AsRef<Path>>(file_path: P, result: &ReplicationResult) -> SimResult<()> {
    let file_path = file_path.as_ref();
    write_csv_file(file_path, &result.days)?;
    info!(
        "exported {} daily rows to '{}'",
        result.days.len(),
        file_path.display()
    );
    Ok(())
}

/// Writes a policy comparison table to a CSV file.
pub fn write_comparison<P: AsRef<Path>>(file_path: P, rows: &[ComparisonRow]) -> SimResult<()> {
    let file_path = file_path.as_ref();
    write_csv_file(file_path, rows)?;
    info!("exported {} policies to '{}'", rows.len(), file_path.display());
    Ok(())
}

/// Fixed-width text rendering of a comparison, one policy per line.
pub fn format_comparison_table(rows: &[ComparisonRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.policy.len())
        .max()
        .unwrap_or(0)
        .max("Policy".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>4}  {:>3}  {:>12}  {:>10}  {:>11}  {:>9}  {:>9}",
        "Policy",
        "M",
        "N",
        "Total cost",
        "Std dev",
        "Cost/cycle",
        "Service",
        "Stockout",
        width = width
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:>4}  {:>3}  {:>12.2}  {:>10.2}  {:>11.2}  {:>8.2}%  {:>8.2}%",
            row.policy,
            row.order_up_to,
            row.review_interval,
            row.mean_total_cost,
            row.std_dev_total_cost,
            row.mean_cost_per_cycle,
            row.service_level * 100.0,
            row.stockout_day_frequency * 100.0,
            width = width
        );
    }
    out
}

/// Fixed-width text rendering of a daily log.
pub fn format_daily_table(days: &[DayRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:>5}  {:>6}  {:>5}  {:>6}  {:>5}  {:>5}  {:>7}  {:>5}  {:>4}  {:>10}",
        "Day", "Cycle", "Start", "In", "Demand", "Short", "End", "OnOrder", "Order", "Lead", "Cost"
    );
    for d in days {
        let lead = d.lead_time.map(|l| l.to_string()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>4}  {:>5}  {:>6}  {:>5}  {:>6}  {:>5}  {:>5}  {:>7}  {:>5}  {:>4}  {:>10.2}",
            d.day,
            d.cycle,
            d.on_hand_start,
            d.received,
            d.demand,
            d.units_short,
            d.on_hand_end,
            d.on_order,
            d.order_quantity,
            lead,
            d.total_cost
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::PolicyParameters;
    use crate::simulation::engine::ReplicationSimulator;

    #[test]
    fn daily_csv_has_header_and_one_row_per_day() {
        let params = PolicyParameters::default();
        let result = ReplicationSimulator::new(&params).unwrap().run(3).unwrap();

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &result.days).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + 50);
        assert!(lines[0].starts_with("day,cycle,on_hand_start,received,demand"));
        assert!(lines[1].starts_with("1,1,3,0,"));
    }

    #[test]
    fn comparison_table_lists_every_policy() {
        let row = ComparisonRow {
            policy: "Policy A (M=11, N=5)".to_string(),
            order_up_to: 11,
            review_interval: 5,
            horizon_days: 50,
            mean_total_cost: 1234.5,
            std_dev_total_cost: 10.0,
            mean_cost_per_cycle: 123.45,
            mean_daily_cost: 24.69,
            holding_cost: 1.0,
            shortage_cost: 2.0,
            ordering_cost: 3.0,
            purchasing_cost: 4.0,
            service_level: 0.9,
            stockout_day_frequency: 0.1,
            mean_orders: 9.0,
            mean_ending_inventory: 4.0,
        };
        let table = format_comparison_table(&[row]);
        assert_eq!(table.lines().count(), 2);
        assert!(table.contains("Policy A (M=11, N=5)"));
        assert!(table.contains("1234.50"));
        assert!(table.contains("90.00%"));
    }
}
