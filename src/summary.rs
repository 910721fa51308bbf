//! Delta aggregation and the summary table.
//!
//! For every configuration label and every metric, the summary row carries
//! the raw values in round order, the successive differences between
//! consecutive rounds, and the arithmetic mean of those differences. The
//! mean delta is the headline number of the benchmark: it is the approximate
//! footprint cost of adding one more runtime instance.

use crate::error::FootprintError;
use crate::report::{Metric, Round};

/// Successive differences between consecutive values.
fn deltas(values: &[u64]) -> Vec<i64> {
    values
        .windows(2)
        .map(|pair| pair[1] as i64 - pair[0] as i64)
        .collect()
}

/// Renders the summary section: heading, source note, and one table row per
/// (label, metric) pair.
///
/// `labels` fixes the row order, which follows the benchmark matrix rather
/// than file order. A label with fewer than two rounds has no deltas to
/// average and is a [`FootprintError::NotEnoughRounds`] error; a metric
/// missing from some round of a label yields no row for that pair, since a
/// row with shifted columns would be worse than no row.
pub fn summarize(rounds: &[Round], labels: &[String]) -> Result<String, FootprintError> {
    let widest = labels
        .iter()
        .map(|label| rounds.iter().filter(|round| &round.vm == label).count())
        .max()
        .unwrap_or(0);

    let mut table = String::from("# Summary \n\n");
    table.push_str("Collect from */proc/[pid]/status*\n\n");
    push_table_header(&mut table, widest);

    for label in labels {
        let label_rounds: Vec<&Round> = rounds.iter().filter(|round| &round.vm == label).collect();
        if label_rounds.len() < 2 {
            return Err(FootprintError::NotEnoughRounds {
                label: label.clone(),
                rounds: label_rounds.len(),
            });
        }
        for metric in Metric::ALL {
            let values: Option<Vec<u64>> = label_rounds
                .iter()
                .map(|round| round.metrics.get(&metric).copied())
                .collect();
            let Some(values) = values else { continue };
            push_row(&mut table, label, metric, &values);
        }
    }

    Ok(table)
}

/// Header and alignment rows, sized for the label with the most rounds.
fn push_table_header(table: &mut String, widest: usize) {
    table.push_str("| wasm vm | metric |");
    for n in 1..=widest {
        let plural = if n == 1 { "" } else { "s" };
        table.push_str(&format!(" {n} vm{plural} |"));
    }
    for n in 1..widest {
        table.push_str(&format!(" delta_{n} |"));
    }
    table.push_str(" delta_avg |\n");

    let columns = 2 + widest + widest.saturating_sub(1) + 1;
    for _ in 0..columns {
        table.push_str("| -- ");
    }
    table.push_str("|\n");
}

fn push_row(table: &mut String, label: &str, metric: Metric, values: &[u64]) {
    let deltas = deltas(values);
    let mean = deltas.iter().sum::<i64>() as f64 / deltas.len() as f64;

    table.push_str(&format!("|{label}|{metric}|"));
    for value in values {
        table.push_str(&format!("{value}|"));
    }
    for delta in &deltas {
        table.push_str(&format!("{delta}|"));
    }
    table.push_str(&format!("{mean}|\n"));
}
