use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of the usage CSV export. Every field arrives as a string, even
/// the token counts — the export writes empty cells for zero and the
/// aggregation step is responsible for lenient parsing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageRecord {
    #[serde(rename = "usage_date_utc")]
    pub date: String,
    #[serde(rename = "model_version")]
    pub model: String,
    pub api_key: String,
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub usage_type: String,
    #[serde(default)]
    pub usage_input_tokens_no_cache: String,
    #[serde(default)]
    pub usage_input_tokens_cache_write_5m: String,
    #[serde(default)]
    pub usage_input_tokens_cache_write_1h: String,
    #[serde(default)]
    pub usage_input_tokens_cache_read: String,
    #[serde(default)]
    pub usage_output_tokens: String,
    #[serde(default)]
    pub web_search_count: String,
}

impl UsageRecord {
    /// Parse the five token-count fields. Empty or non-numeric cells count
    /// as zero; a malformed count never fails the record.
    pub fn token_counts(&self) -> TokenCounts {
        TokenCounts {
            input_no_cache: parse_count(&self.usage_input_tokens_no_cache),
            cache_write_5m: parse_count(&self.usage_input_tokens_cache_write_5m),
            cache_write_1h: parse_count(&self.usage_input_tokens_cache_write_1h),
            cache_read: parse_count(&self.usage_input_tokens_cache_read),
            output: parse_count(&self.usage_output_tokens),
        }
    }
}

fn parse_count(s: &str) -> u64 {
    s.trim().parse().unwrap_or(0)
}

/// Parsed token counts for one record, one field per billing category.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounts {
    pub input_no_cache: u64,
    pub cache_write_5m: u64,
    pub cache_write_1h: u64,
    pub cache_read: u64,
    pub output: u64,
}

impl TokenCounts {
    /// All input-side categories combined (everything except output).
    pub fn input_total(&self) -> u64 {
        self.input_no_cache + self.cache_write_5m + self.cache_write_1h + self.cache_read
    }
}

/// Tokens and cost attributed to one model within one aggregation bucket
/// (a user, or a user-period).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelBreakdown {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

impl ModelBreakdown {
    pub fn accumulate(&mut self, input_tokens: u64, output_tokens: u64, cost: f64) {
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
        self.cost += cost;
    }
}

/// Whole-dataset totals for one user. `total_cost_jpy` is derived from the
/// USD total after the fold, never accumulated independently.
#[derive(Debug, Clone, Serialize)]
pub struct UserUsage {
    pub user: String,
    pub total_cost_usd: f64,
    pub total_cost_jpy: f64,
    pub model_breakdown: BTreeMap<String, ModelBreakdown>,
}

impl UserUsage {
    pub fn new(user: String) -> Self {
        Self {
            user,
            total_cost_usd: 0.0,
            total_cost_jpy: 0.0,
            model_breakdown: BTreeMap::new(),
        }
    }

    pub fn input_tokens(&self) -> u64 {
        self.model_breakdown.values().map(|b| b.input_tokens).sum()
    }

    pub fn output_tokens(&self) -> u64 {
        self.model_breakdown.values().map(|b| b.output_tokens).sum()
    }
}

/// One user's aggregate for a single period. The `date` field holds an ISO
/// date for daily series, and a week (`YYYY-Www`) or month (`YYYY-MM`) label
/// after re-bucketing.
#[derive(Debug, Clone, Serialize)]
pub struct DailyUsage {
    pub date: String,
    pub cost: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub model_breakdown: BTreeMap<String, ModelBreakdown>,
}

impl DailyUsage {
    pub fn new(date: String) -> Self {
        Self {
            date,
            cost: 0.0,
            input_tokens: 0,
            output_tokens: 0,
            model_breakdown: BTreeMap::new(),
        }
    }

    /// Accumulate one record's contribution under the given model name.
    pub fn accumulate(&mut self, model: &str, input_tokens: u64, output_tokens: u64, cost: f64) {
        self.cost += cost;
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
        self.model_breakdown
            .entry(model.to_string())
            .or_default()
            .accumulate(input_tokens, output_tokens, cost);
    }

    /// Merge another period's totals into this one. Used when folding daily
    /// records into week/month buckets.
    pub fn accumulate_from(&mut self, other: &DailyUsage) {
        self.cost += other.cost;
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        for (model, breakdown) in &other.model_breakdown {
            self.model_breakdown
                .entry(model.clone())
                .or_default()
                .accumulate(breakdown.input_tokens, breakdown.output_tokens, breakdown.cost);
        }
    }
}
