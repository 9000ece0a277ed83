//! CSV output formatter

use anyhow::Result;
use serde::Serialize;
use storehealth_core::MetricSet;

/// Serialize rows with a header taken from the first row's field names
pub fn format_rows<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Serialize)]
struct MetricRow<'a> {
    metric: &'a str,
    value: String,
}

/// One `metric,value` row per metric
pub fn format_metrics(metrics: &MetricSet) -> Result<String> {
    let rows: Vec<MetricRow> = metrics
        .entries()
        .into_iter()
        .map(|(metric, value)| MetricRow {
            metric,
            value: value.to_string(),
        })
        .collect();
    format_rows(&rows)
}
