//! Before/after table of snapshot values.

use alloy_primitives::U256;
use colored::Colorize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::snapshot::Snapshot;

#[derive(Tabled)]
struct CompareRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
    #[tabled(rename = "Diff")]
    diff: String,
}

/// Signed difference `after - before`, without colour.
pub fn format_delta(before: U256, after: U256) -> String {
    if after > before {
        format!("+{}", after - before)
    } else if after < before {
        format!("-{}", before - after)
    } else {
        "0".to_string()
    }
}

fn color_delta(before: U256, after: U256) -> String {
    let delta = format_delta(before, after);
    if after > before {
        delta.green().to_string()
    } else if after < before {
        delta.red().to_string()
    } else {
        delta
    }
}

fn format_value(value: Option<U256>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Render every key of either snapshot with its change.
pub fn format_compare(before: &Snapshot, after: &Snapshot) -> String {
    let mut keys: Vec<&str> = before.iter().map(|(k, _)| k).collect();
    keys.extend(after.iter().map(|(k, _)| k));
    keys.sort_unstable();
    keys.dedup();

    if keys.is_empty() {
        return "No values captured.".to_string();
    }

    let rows: Vec<CompareRow> = keys
        .into_iter()
        .map(|key| {
            let b = before.get(key).ok();
            let a = after.get(key).ok();
            CompareRow {
                key: key.to_string(),
                before: format_value(b),
                after: format_value(a),
                diff: match (b, a) {
                    (Some(b), Some(a)) => color_delta(b, a),
                    _ => "-".to_string(),
                },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()));

    format!(
        "block {} -> {}\n{}",
        before.block(),
        after.block(),
        table
    )
}
