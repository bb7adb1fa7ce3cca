use std::path::Path;

use anyhow::{Context, Result};

use crate::types::UsageRecord;

/// Read a usage CSV export into records.
///
/// A row that fails to deserialize is skipped with a stderr warning; a row
/// missing its date or model identifier is dropped silently, since nothing
/// downstream can price or bucket it. Only failing to open or read the file
/// itself is an error.
pub fn read_csv(path: &Path) -> Result<Vec<UsageRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    Ok(collect_records(&mut reader))
}

fn collect_records<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Vec<UsageRecord> {
    let mut records = Vec::new();

    for (i, row) in reader.deserialize::<UsageRecord>().enumerate() {
        let record = match row {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Warning: skipping row {}: {}", i + 2, e);
                continue;
            }
        };
        if record.date.is_empty() || record.model.is_empty() {
            continue;
        }
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(data: &str) -> Vec<UsageRecord> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data.as_bytes());
        collect_records(&mut reader)
    }

    const HEADER: &str = "usage_date_utc,model_version,api_key,workspace,usage_type,\
usage_input_tokens_no_cache,usage_input_tokens_cache_write_5m,usage_input_tokens_cache_write_1h,\
usage_input_tokens_cache_read,usage_output_tokens,web_search_count";

    #[test]
    fn parses_well_formed_rows() {
        let data = format!(
            "{HEADER}\n2024-01-01,claude-opus-4,bob-api-key,default,api,1000000,,,,500,0\n"
        );
        let records = read_str(&data);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-01-01");
        assert_eq!(records[0].model, "claude-opus-4");
        assert_eq!(records[0].token_counts().input_no_cache, 1_000_000);
        assert_eq!(records[0].token_counts().output, 500);
    }

    #[test]
    fn drops_rows_missing_required_fields() {
        let data = format!(
            "{HEADER}\n\
             ,claude-opus-4,bob-api-key,default,api,1,,,,1,0\n\
             2024-01-01,,bob-api-key,default,api,1,,,,1,0\n\
             2024-01-01,claude-opus-4,bob-api-key,default,api,1,,,,1,0\n"
        );
        let records = read_str(&data);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn token_fields_stay_strings_until_aggregation() {
        let data = format!(
            "{HEADER}\n2024-01-01,claude-opus-4,bob-api-key,default,api,not-a-number,,,,,\n"
        );
        let records = read_str(&data);
        assert_eq!(records[0].usage_input_tokens_no_cache, "not-a-number");
        assert_eq!(records[0].token_counts().input_no_cache, 0);
    }
}
