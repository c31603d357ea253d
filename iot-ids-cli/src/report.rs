//! Dashboard rendering
//!
//! Renders each tick as either a text dashboard (metrics, detection feed,
//! traffic distribution, alert ratio) or one JSON object per line.

use anyhow::{Context, Result};
use clap::ValueEnum;
use iot_ids_core::{Category, Snapshot, Tick};
use std::fmt::{self, Write};

const BAR_WIDTH: usize = 30;
const RULE: &str = "═══════════════════════════════════════════════";
const SECTION_RULE: &str = "───────────────────────────────────────────────";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render one tick in the requested format
pub fn render(tick: &Tick, format: OutputFormat, feed_rows: usize) -> Result<String> {
    match format {
        OutputFormat::Text => render_text(tick, feed_rows).context("Failed to render dashboard"),
        OutputFormat::Json => serde_json::to_string(tick).context("Failed to serialize tick"),
    }
}

/// Full text dashboard; the feed shows at most `feed_rows` newest entries
pub fn render_text(tick: &Tick, feed_rows: usize) -> Result<String, fmt::Error> {
    let snapshot = &tick.snapshot;
    let mut out = String::new();

    writeln!(out, "{}", RULE)?;
    writeln!(out, "  Smart IDS Dashboard for IoT Devices")?;
    writeln!(out, "{}\n", RULE)?;

    writeln!(
        out,
        "Total Processed: {}  |  Total Attacks Detected: {}  |  Threshold: >= {:.2}\n",
        snapshot.total_processed, snapshot.total_attacks, tick.threshold
    )?;

    render_feed(&mut out, snapshot, feed_rows)?;
    render_distribution(&mut out, snapshot)?;
    render_alert_ratio(&mut out, snapshot)?;

    writeln!(out, "Prototype IDS Dashboard - IoT Security")?;
    Ok(out)
}

fn render_feed(out: &mut impl Write, snapshot: &Snapshot, rows: usize) -> fmt::Result {
    writeln!(out, "Real-Time Detection Feed")?;
    writeln!(out, "{}", SECTION_RULE)?;
    writeln!(out, "{:<10}{:<12}{:<12}{}", "Time", "Prediction", "Confidence", "Alert")?;

    for event in snapshot.entries.iter().take(rows) {
        writeln!(
            out,
            "{:<10}{:<12}{:<12.2}{}",
            event.time_label(),
            event.category.label(),
            event.confidence,
            event.is_alert
        )?;
    }

    if snapshot.entries.len() > rows {
        writeln!(out, "... {} older entries", snapshot.entries.len() - rows)?;
    }
    writeln!(out)
}

fn render_distribution(out: &mut impl Write, snapshot: &Snapshot) -> fmt::Result {
    writeln!(out, "Traffic Type Distribution")?;
    writeln!(out, "{}", SECTION_RULE)?;

    let max = snapshot.counts.values().copied().max().unwrap_or(0);
    for category in Category::ALL {
        let count = snapshot.count(category);
        writeln!(out, "{:<12}{} {}", category.label(), bar(count, max), count)?;
    }
    writeln!(out)
}

fn render_alert_ratio(out: &mut impl Write, snapshot: &Snapshot) -> fmt::Result {
    let window = snapshot.window_alerts + snapshot.window_normal;
    writeln!(out, "Alert Ratio (last {} events)", window)?;
    writeln!(out, "{}", SECTION_RULE)?;

    match snapshot.window_alert_percent() {
        Some(alerts) => writeln!(out, "Normal: {:.1}%  |  Alerts: {:.1}%\n", 100.0 - alerts, alerts),
        None => writeln!(out, "No events yet\n"),
    }
}

/// Horizontal bar scaled so `max` fills `BAR_WIDTH`
fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len)
}
