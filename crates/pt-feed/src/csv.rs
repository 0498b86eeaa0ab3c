//! CSV bar parsing.
//!
//! Column contract (header row required, order-independent by name):
//!
//! | Column      | Example                | Notes                     |
//! |-------------|------------------------|---------------------------|
//! | `timestamp` | `2024-01-02T14:30:00Z` | RFC 3339, strictly increasing |
//! | `open`      | `102.5`                | decimal text, no floats   |
//! | `high`      | `105`                  | decimal text              |
//! | `low`       | `99`                   | decimal text              |
//! | `close`     | `102`                  | decimal text              |
//! | `volume`    | `1000000`              | non-negative integer      |
//!
//! The symbol is not a column; one file holds one symbol's history and
//! the caller supplies it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::warn;

use pt_schemas::{money::parse_micros, Bar};

use crate::FeedError;

/// Load bars for `symbol` from a CSV file on disk.
///
/// IO failure is fatal; malformed rows are skipped with a warning.
pub fn load_csv_file(symbol: &str, path: impl AsRef<Path>) -> Result<Vec<Bar>, FeedError> {
    let content = fs::read_to_string(path)?;
    parse_csv_bars(symbol, &content)
}

/// Parse bars from CSV content.
///
/// Rows that fail to parse, or whose timestamp does not strictly
/// increase over the previous accepted row, are skipped with a
/// warning. Header problems are fatal.
pub fn parse_csv_bars(symbol: &str, content: &str) -> Result<Vec<Bar>, FeedError> {
    let mut lines = content.lines().enumerate();

    let (_, header_line) = lines.next().ok_or(FeedError::Empty)?;
    let header_line = header_line.trim().trim_start_matches('\u{feff}');
    if header_line.is_empty() {
        return Err(FeedError::Empty);
    }

    let mut idx: BTreeMap<String, usize> = BTreeMap::new();
    for (i, name) in header_line.split(',').enumerate() {
        idx.insert(name.trim().to_ascii_lowercase(), i);
    }

    let col_ts = find_required(&idx, "timestamp", header_line)?;
    let col_open = find_required(&idx, "open", header_line)?;
    let col_high = find_required(&idx, "high", header_line)?;
    let col_low = find_required(&idx, "low", header_line)?;
    let col_close = find_required(&idx, "close", header_line)?;
    let col_volume = find_required(&idx, "volume", header_line)?;

    let mut bars: Vec<Bar> = Vec::new();
    let mut last_ts: Option<DateTime<Utc>> = None;

    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        match parse_row(
            symbol, &fields, col_ts, col_open, col_high, col_low, col_close, col_volume,
        ) {
            Ok(bar) => {
                if let Some(prev) = last_ts {
                    if bar.ts <= prev {
                        warn!(
                            line = line_no + 1,
                            ts = %bar.ts,
                            prev = %prev,
                            "skipping bar row: timestamp not strictly increasing"
                        );
                        continue;
                    }
                }
                last_ts = Some(bar.ts);
                bars.push(bar);
            }
            Err(reason) => {
                warn!(line = line_no + 1, %reason, "skipping malformed bar row");
            }
        }
    }

    Ok(bars)
}

fn find_required(
    idx: &BTreeMap<String, usize>,
    name: &'static str,
    header: &str,
) -> Result<usize, FeedError> {
    idx.get(name)
        .copied()
        .ok_or_else(|| FeedError::BadHeader(format!("missing column '{name}' in '{header}'")))
}

#[allow(clippy::too_many_arguments)]
fn parse_row(
    symbol: &str,
    fields: &[&str],
    col_ts: usize,
    col_open: usize,
    col_high: usize,
    col_low: usize,
    col_close: usize,
    col_volume: usize,
) -> Result<Bar, String> {
    let get = |col: usize, name: &str| -> Result<&str, String> {
        fields
            .get(col)
            .copied()
            .ok_or_else(|| format!("missing field '{name}'"))
    };

    let ts = DateTime::parse_from_rfc3339(get(col_ts, "timestamp")?)
        .map_err(|e| format!("bad timestamp: {e}"))?
        .with_timezone(&Utc);

    let price = |col: usize, name: &str| -> Result<i64, String> {
        parse_micros(get(col, name)?).map_err(|e| format!("bad {name}: {e}"))
    };

    let volume = get(col_volume, "volume")?
        .parse::<u64>()
        .map_err(|e| format!("bad volume: {e}"))?;

    Ok(Bar {
        symbol: symbol.to_string(),
        ts,
        open_micros: price(col_open, "open")?,
        high_micros: price(col_high, "high")?,
        low_micros: price(col_low, "low")?,
        close_micros: price(col_close, "close")?,
        volume,
    })
}
