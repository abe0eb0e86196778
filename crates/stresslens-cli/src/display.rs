//! Plain-text cards for prediction results, pipeline summaries and history.

use std::io::{self, Write};

use stresslens_ai::PipelineSummary;
use stresslens_core::{Prediction, PredictionSet};

use crate::history::SessionHistory;

const BAR_WIDTH: usize = 20;

/// Print the per-model breakdown for one analysis.
pub fn write_results(out: &mut impl Write, results: &PredictionSet) -> io::Result<()> {
    writeln!(out, "=== Results ===")?;
    writeln!(
        out,
        "{}/{} models predict stress",
        results.stressed_votes(),
        results.len()
    )?;
    writeln!(out)?;

    for (name, prediction) in results.iter() {
        writeln!(out, "{name}")?;
        write_prediction(out, prediction)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_prediction(out: &mut impl Write, p: &Prediction) -> io::Result<()> {
    let marker = if p.label.is_stressed() { "[!]" } else { "[ok]" };
    writeln!(out, "  {:<26} {} {}", "Prediction", marker, p.label)?;
    if let Some(confidence) = p.confidence {
        writeln!(out, "  {:<26} {confidence:.1}%", "Confidence")?;
    }
    if let Some(probability) = p.probability {
        writeln!(
            out,
            "  {:<26} {:.1}% {}",
            "Stress probability",
            probability * 100.0,
            bar(probability)
        )?;
    }
    Ok(())
}

/// Fixed-width progress bar for a value in [0, 1].
fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Print the shape of the loaded artifacts.
pub fn write_summary(out: &mut impl Write, summary: &PipelineSummary) -> io::Result<()> {
    writeln!(out, "=== Artifacts ===")?;
    writeln!(out, "  {:<26} {}", "Vocabulary size", summary.vocabulary_size)?;
    writeln!(
        out,
        "  {:<26} {} ({})",
        "Numeric columns",
        summary.numeric_columns.len(),
        summary.numeric_columns.join(", ")
    )?;
    writeln!(out, "  {:<26} {}", "Feature count", summary.feature_count)?;
    writeln!(out)?;

    writeln!(out, "Models")?;
    for m in &summary.models {
        let output = if m.reports_probability {
            "label + probability"
        } else {
            "label only"
        };
        writeln!(out, "  {:<26} {:<20} {}", m.name, m.kind, output)?;
    }
    Ok(())
}

/// Print the most recent analyses of the session, newest first.
pub fn write_history(out: &mut impl Write, history: &SessionHistory) -> io::Result<()> {
    if history.is_empty() {
        writeln!(out, "No analysis history yet. Start by analyzing some text!")?;
        return Ok(());
    }

    writeln!(out, "Total analyses: {}", history.len())?;
    for entry in history.recent() {
        writeln!(out)?;
        writeln!(
            out,
            "Analysis #{} ({})",
            entry.number,
            entry.at.format("%H:%M:%S")
        )?;
        writeln!(out, "  Input: {}", entry.preview)?;
        for (name, p) in entry.results.iter() {
            match p.confidence {
                Some(c) => writeln!(out, "  {:<26} {:<14} {c:.1}%", name, p.label.as_str())?,
                None => writeln!(out, "  {:<26} {}", name, p.label)?,
            }
        }
    }
    Ok(())
}
