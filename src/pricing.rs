use std::collections::{BTreeSet, HashMap};

use crate::types::{TokenCounts, UsageRecord};

/// Display rate for the derived JPY total. Fixed by policy, not fetched.
pub const USD_TO_JPY_RATE: f64 = 150.0;

/// Per-category unit prices for one model, in USD per million tokens.
#[derive(Debug, Clone)]
pub struct PricingEntry {
    pub name: &'static str,
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
    pub cache_write_5m_per_mtok: f64,
    pub cache_write_1h_per_mtok: f64,
    pub cache_read_per_mtok: f64,
}

impl PricingEntry {
    /// Total USD cost for one record's token counts, summed over the five
    /// billing categories.
    pub fn record_cost(&self, t: &TokenCounts) -> f64 {
        token_cost(t.input_no_cache, self.input_per_mtok)
            + token_cost(t.cache_write_5m, self.cache_write_5m_per_mtok)
            + token_cost(t.cache_write_1h, self.cache_write_1h_per_mtok)
            + token_cost(t.cache_read, self.cache_read_per_mtok)
            + token_cost(t.output, self.output_per_mtok)
    }
}

fn token_cost(tokens: u64, price_per_mtok: f64) -> f64 {
    (tokens as f64 / 1_000_000.0) * price_per_mtok
}

/// Static model-identifier → pricing mapping. Extending coverage means
/// adding an entry here; the aggregation code never changes.
pub struct PricingTable {
    entries: HashMap<&'static str, PricingEntry>,
}

impl PricingTable {
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "claude-3-5-haiku-20241022",
            PricingEntry {
                name: "Claude Haiku 3.5",
                input_per_mtok: 0.80,
                output_per_mtok: 4.00,
                cache_write_5m_per_mtok: 1.00,
                cache_write_1h_per_mtok: 1.60,
                cache_read_per_mtok: 0.08,
            },
        );
        entries.insert(
            "claude-sonnet-4-20250514",
            PricingEntry {
                name: "Claude Sonnet 4",
                input_per_mtok: 3.0,
                output_per_mtok: 15.0,
                cache_write_5m_per_mtok: 3.75,
                cache_write_1h_per_mtok: 6.00,
                cache_read_per_mtok: 0.30,
            },
        );
        entries.insert(
            "claude-opus-4",
            PricingEntry {
                name: "Claude Opus 4",
                input_per_mtok: 15.0,
                output_per_mtok: 75.0,
                cache_write_5m_per_mtok: 18.75,
                cache_write_1h_per_mtok: 30.00,
                cache_read_per_mtok: 1.50,
            },
        );
        entries.insert(
            "claude-3-5-sonnet-20241022",
            PricingEntry {
                name: "Claude 3.5 Sonnet",
                input_per_mtok: 3.0,
                output_per_mtok: 15.0,
                cache_write_5m_per_mtok: 3.75,
                cache_write_1h_per_mtok: 6.00,
                cache_read_per_mtok: 0.30,
            },
        );
        Self { entries }
    }

    /// Look up pricing by model identifier. An unknown identifier is a
    /// recognized outcome, not an error.
    pub fn lookup(&self, model: &str) -> Option<&PricingEntry> {
        self.entries.get(model)
    }

    /// Model identifiers that appeared in records but have no pricing.
    /// Sorted and deduplicated, for a one-line stderr advisory.
    pub fn unpriced_models(&self, records: &[UsageRecord]) -> Vec<String> {
        let mut unpriced = BTreeSet::new();
        for r in records {
            if self.lookup(&r.model).is_none() {
                unpriced.insert(r.model.clone());
            }
        }
        unpriced.into_iter().collect()
    }
}
