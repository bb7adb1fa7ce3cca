use std::collections::BTreeMap;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use crate::types::{DailyUsage, ModelBreakdown, UserUsage};

fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn format_usd(cost: f64) -> String {
    format!("${:.2}", cost)
}

// JPY has no minor unit.
fn format_jpy(cost: f64) -> String {
    format!("¥{:.0}", cost)
}

/// Breakdown entries ordered by descending cost, for the Models column and
/// the `--breakdown` rows.
fn models_by_cost(breakdown: &BTreeMap<String, ModelBreakdown>) -> Vec<(&str, &ModelBreakdown)> {
    let mut entries: Vec<(&str, &ModelBreakdown)> = breakdown
        .iter()
        .map(|(name, b)| (name.as_str(), b))
        .collect();
    entries.sort_by(|a, b| {
        b.1.cost
            .partial_cmp(&a.1.cost)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}

fn column_header(col: &str) -> &str {
    match col {
        "user" => "User",
        "input" => "Input",
        "output" => "Output",
        "cost" => "Cost (USD)",
        "jpy" => "Cost (JPY)",
        "models" => "Models",
        other => other,
    }
}

fn user_cell(col: &str, usage: &UserUsage) -> Cell {
    match col {
        "user" => Cell::new(&usage.user),
        "input" => Cell::new(format_tokens(usage.input_tokens())),
        "output" => Cell::new(format_tokens(usage.output_tokens())),
        "cost" => Cell::new(format_usd(usage.total_cost_usd)),
        "jpy" => Cell::new(format_jpy(usage.total_cost_jpy)),
        "models" => Cell::new(
            models_by_cost(&usage.model_breakdown)
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => Cell::new(""),
    }
}

fn breakdown_cell(col: &str, model: &str, detail: &ModelBreakdown) -> Cell {
    match col {
        "user" | "period" => Cell::new(format!("  {}", model)),
        "input" => Cell::new(format_tokens(detail.input_tokens)),
        "output" => Cell::new(format_tokens(detail.output_tokens)),
        "cost" => Cell::new(format_usd(detail.cost)),
        "jpy" => Cell::new(format_jpy(detail.cost * crate::pricing::USD_TO_JPY_RATE)),
        _ => Cell::new(""),
    }
}

pub fn print_user_table(usage: &[UserUsage], columns: &[String], breakdown: bool) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(columns.iter().map(|c| Cell::new(column_header(c))));

    let mut total = UserUsage::new("TOTAL".to_string());
    for user in usage {
        table.add_row(columns.iter().map(|c| user_cell(c, user)));

        if breakdown {
            for (model, detail) in models_by_cost(&user.model_breakdown) {
                table.add_row(columns.iter().map(|c| breakdown_cell(c, model, detail)));
            }
        }

        total.total_cost_usd += user.total_cost_usd;
        for (model, detail) in &user.model_breakdown {
            total
                .model_breakdown
                .entry(model.clone())
                .or_default()
                .accumulate(detail.input_tokens, detail.output_tokens, detail.cost);
        }
    }
    total.total_cost_jpy = total.total_cost_usd * crate::pricing::USD_TO_JPY_RATE;

    let total_cells = columns.iter().map(|c| match c.as_str() {
        "models" => Cell::new(""),
        _ => user_cell(c, &total),
    });
    table.add_row(total_cells);

    println!("{table}");
}

pub fn print_period_table(series: &[DailyUsage], breakdown: bool) {
    let columns = ["period", "input", "output", "cost", "models"];

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(if *c == "period" { "Period" } else { column_header(c) })),
    );

    let mut total = DailyUsage::new("TOTAL".to_string());
    for period in series {
        table.add_row(columns.iter().map(|c| period_cell(c, period)));

        if breakdown {
            for (model, detail) in models_by_cost(&period.model_breakdown) {
                table.add_row(columns.iter().map(|c| breakdown_cell(c, model, detail)));
            }
        }

        total.accumulate_from(period);
    }

    let total_cells = columns.iter().map(|c| match *c {
        "models" => Cell::new(""),
        _ => period_cell(c, &total),
    });
    table.add_row(total_cells);

    println!("{table}");
}

fn period_cell(col: &str, period: &DailyUsage) -> Cell {
    match col {
        "period" => Cell::new(&period.date),
        "input" => Cell::new(format_tokens(period.input_tokens)),
        "output" => Cell::new(format_tokens(period.output_tokens)),
        "cost" => Cell::new(format_usd(period.cost)),
        "models" => Cell::new(
            models_by_cost(&period.model_breakdown)
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => Cell::new(""),
    }
}

pub fn print_user_json(usage: &[UserUsage]) {
    println!(
        "{}",
        serde_json::to_string_pretty(usage).expect("JSON serialization failed")
    );
}

pub fn print_period_json(series: &[DailyUsage]) {
    println!(
        "{}",
        serde_json::to_string_pretty(series).expect("JSON serialization failed")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_formatting() {
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_500), "1.5K");
        assert_eq!(format_tokens(2_500_000), "2.5M");
    }

    #[test]
    fn cost_formatting() {
        assert_eq!(format_usd(45.0), "$45.00");
        assert_eq!(format_jpy(6750.0), "¥6750");
    }

    #[test]
    fn models_ordered_by_descending_cost() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(
            "Claude Haiku 3.5".to_string(),
            ModelBreakdown {
                input_tokens: 10,
                output_tokens: 1,
                cost: 0.1,
            },
        );
        breakdown.insert(
            "Claude Opus 4".to_string(),
            ModelBreakdown {
                input_tokens: 10,
                output_tokens: 1,
                cost: 5.0,
            },
        );
        let names: Vec<&str> = models_by_cost(&breakdown).iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Claude Opus 4", "Claude Haiku 3.5"]);
    }
}
