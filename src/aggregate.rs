use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;

use crate::pricing::{PricingTable, USD_TO_JPY_RATE};
use crate::types::{DailyUsage, UsageRecord, UserUsage};
use crate::users::extract_user;

/// Period length for re-bucketing a daily series.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

/// Fold the whole record set into per-user totals with per-model breakdowns,
/// sorted by descending USD cost. Records priced under no known model are
/// skipped; they contribute nothing (the caller surfaces the advisory).
pub fn calculate_user_usage(records: &[UsageRecord], pricing: &PricingTable) -> Vec<UserUsage> {
    // First-encounter order is kept alongside the map: the final sort is
    // stable, so cost ties preserve input order.
    let mut order: Vec<String> = Vec::new();
    let mut users: HashMap<String, UserUsage> = HashMap::new();

    for r in records {
        let Some(entry) = pricing.lookup(&r.model) else {
            continue;
        };
        let user = extract_user(&r.api_key);
        let counts = r.token_counts();
        let cost = entry.record_cost(&counts);

        let usage = users.entry(user.clone()).or_insert_with(|| {
            order.push(user.clone());
            UserUsage::new(user)
        });
        usage.total_cost_usd += cost;
        usage
            .model_breakdown
            .entry(entry.name.to_string())
            .or_default()
            .accumulate(counts.input_total(), counts.output, cost);
    }

    let mut result: Vec<UserUsage> = order
        .iter()
        .filter_map(|user| users.remove(user))
        .collect();
    for usage in &mut result {
        usage.total_cost_jpy = usage.total_cost_usd * USD_TO_JPY_RATE;
    }
    result.sort_by(|a, b| {
        b.total_cost_usd
            .partial_cmp(&a.total_cost_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    result
}

/// Fold one user's records into a date-keyed series, ascending by date.
/// Lexical order on the ISO `YYYY-MM-DD` strings is chronological, so the
/// BTreeMap key order is the output order.
pub fn calculate_user_daily_usage(
    records: &[UsageRecord],
    target_user: &str,
    pricing: &PricingTable,
) -> Vec<DailyUsage> {
    let mut days: BTreeMap<String, DailyUsage> = BTreeMap::new();

    for r in records {
        if extract_user(&r.api_key) != target_user {
            continue;
        }
        let Some(entry) = pricing.lookup(&r.model) else {
            continue;
        };
        let counts = r.token_counts();
        let cost = entry.record_cost(&counts);

        days.entry(r.date.clone())
            .or_insert_with(|| DailyUsage::new(r.date.clone()))
            .accumulate(entry.name, counts.input_total(), counts.output, cost);
    }

    days.into_values().collect()
}

/// Re-bucket a (date-ascending) daily series by week or month. Buckets come
/// out in first-encounter order, which is chronological because the input is
/// pre-sorted. Daily granularity returns the series unchanged.
pub fn bucket_daily(daily: &[DailyUsage], granularity: Granularity) -> Vec<DailyUsage> {
    if granularity == Granularity::Daily {
        return daily.to_vec();
    }

    let mut buckets: Vec<DailyUsage> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for day in daily {
        let key = match granularity {
            Granularity::Daily => day.date.clone(),
            Granularity::Weekly => week_key(&day.date),
            Granularity::Monthly => month_key(&day.date).to_string(),
        };
        let idx = *index.entry(key.clone()).or_insert_with(|| {
            buckets.push(DailyUsage::new(key));
            buckets.len() - 1
        });
        buckets[idx].accumulate_from(day);
    }

    buckets
}

/// ISO-8601 week label, `YYYY-Www`. The year is the ISO week-year (the year
/// of the week's Thursday), which differs from the calendar year around
/// January 1st. A date that does not parse keeps its raw string as a
/// singleton bucket key instead of being dropped.
fn week_key(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => {
            let iso = d.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        Err(_) => date.to_string(),
    }
}

/// `YYYY-MM` prefix of the date string.
fn month_key(date: &str) -> &str {
    date.get(..7).unwrap_or(date)
}
