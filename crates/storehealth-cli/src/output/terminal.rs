//! Terminal output formatter

use std::io::{self, Write};
use storehealth_core::scanner::{display_metrics, BreakdownEntry, MetricStatus};
use storehealth_core::{Recommendation, RecommendationKind, ScanResult, ScoreColor};
use termcolor::{Color, ColorSpec, WriteColor};

fn score_color(color: ScoreColor) -> Color {
    match color {
        ScoreColor::Green => Color::Green,
        ScoreColor::Yellow => Color::Yellow,
        ScoreColor::Orange => Color::Ansi256(208),
        ScoreColor::Red => Color::Red,
    }
}

fn status_color(status: MetricStatus) -> Color {
    match status {
        MetricStatus::Excellent => Color::Green,
        MetricStatus::Good => Color::Cyan,
        MetricStatus::Warning => Color::Yellow,
        MetricStatus::Critical => Color::Red,
    }
}

fn kind_color(kind: RecommendationKind) -> Color {
    match kind {
        RecommendationKind::Info => Color::Blue,
        RecommendationKind::Warning => Color::Yellow,
        RecommendationKind::Critical => Color::Red,
    }
}

fn write_colored<W: WriteColor>(out: &mut W, color: Color, bold: bool, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
    write!(out, "{}", text)?;
    out.reset()
}

/// Headline score, e.g. "Health score: 83/100 (Excellent)"
pub fn write_score<W: WriteColor>(out: &mut W, scan: &ScanResult) -> io::Result<()> {
    write!(out, "Health score: ")?;
    write_colored(
        out,
        score_color(scan.score_color),
        true,
        &format!("{}/100 ({})", scan.health_score, scan.score_label),
    )?;
    writeln!(out)
}

pub fn write_breakdown<W: WriteColor>(out: &mut W, scan: &ScanResult) -> io::Result<()> {
    writeln!(out, "Breakdown:")?;
    for (category, entry) in &scan.breakdown {
        write!(out, "  {:<20} {:>3}  ", category.as_str(), entry.score)?;
        write_colored(out, status_color(entry.status), false, &format!("{:<9}", entry.status.as_str()))?;
        writeln!(out, "  {}", describe(entry))?;
    }
    Ok(())
}

fn describe(entry: &BreakdownEntry) -> String {
    let mut text = entry
        .display
        .clone()
        .unwrap_or_else(|| entry.value.to_string());
    if let Some(expired) = entry.expired {
        text.push_str(&format!(" ({} expired)", expired));
    }
    text
}

pub fn write_recommendations<W: WriteColor>(
    out: &mut W,
    recommendations: &[Recommendation],
) -> io::Result<()> {
    if recommendations.is_empty() {
        return writeln!(out, "No recommendations. The store looks healthy.");
    }

    writeln!(out, "Recommendations:")?;
    for rec in recommendations {
        write!(out, "  ")?;
        write_colored(out, kind_color(rec.kind), true, &format!("[{}]", rec.kind.as_str()))?;
        writeln!(out, " {}", rec.message)?;
        writeln!(out, "      {}", rec.action)?;
    }
    Ok(())
}

/// Full scan report
pub fn write_scan<W: WriteColor>(out: &mut W, scan: &ScanResult) -> io::Result<()> {
    write_score(out, scan)?;
    writeln!(out)?;
    write_breakdown(out, scan)?;
    writeln!(out)?;
    write_recommendations(out, &scan.recommendations)
}

/// Headline metrics of a stored scan
pub fn write_metrics<W: WriteColor>(out: &mut W, scan: &ScanResult) -> io::Result<()> {
    for metric in display_metrics(scan) {
        match metric.sub {
            Some(sub) => writeln!(out, "  {:<16} {} ({})", metric.label, metric.value, sub)?,
            None => writeln!(out, "  {:<16} {}", metric.label, metric.value)?,
        }
    }
    Ok(())
}
