//! Static station tables (`stops.txt` style feed files).
//!
//! Columns are kept as the feed defines them; only `stop_id` is required.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

pub const STOP_ID_COLUMN: &str = "stop_id";

/// Identifiers starting with this prefix are aggregate stations grouping
/// several sub-stations of the feed.
pub const AGGREGATE_PREFIX: &str = "est_90";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTable {
    pub headers: Vec<String>,
    /// Row values, aligned with `headers`.
    pub rows: Vec<Vec<String>>,
}

impl StaticTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if !headers.iter().any(|h| h == STOP_ID_COLUMN) {
            bail!("static station table has no `{STOP_ID_COLUMN}` column");
        }
        Ok(Self { headers, rows })
    }

    /// Loads a comma-separated table with a header row.
    pub fn load(path: &Path) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("opening static table {}", path.display()))?;

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.with_context(|| format!("reading {}", path.display()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        info!(path = %path.display(), rows = rows.len(), "Static table loaded");
        Self::new(headers, rows).with_context(|| format!("invalid table {}", path.display()))
    }

    /// Stacks tables vertically. The result has the union of all headers in
    /// first-seen order; cells of columns a table lacks are empty.
    pub fn concat(tables: impl IntoIterator<Item = StaticTable>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        let mut rows = Vec::new();

        for table in tables {
            for header in &table.headers {
                if !headers.contains(header) {
                    headers.push(header.clone());
                }
            }
            let positions: Vec<usize> = table
                .headers
                .iter()
                .filter_map(|h| headers.iter().position(|known| known == h))
                .collect();
            for row in table.rows {
                let mut aligned = vec![String::new(); headers.len()];
                for (pos, value) in positions.iter().zip(row) {
                    aligned[*pos] = value;
                }
                rows.push(aligned);
            }
        }

        // earlier rows were built before later tables added their columns
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }

        debug!(columns = width, rows = rows.len(), "Static tables concatenated");
        Self { headers, rows }
    }

    fn stop_id_index(&self) -> Option<usize> {
        self.headers.iter().position(|h| h == STOP_ID_COLUMN)
    }

    pub fn stop_id<'a>(&self, row: &'a [String]) -> &'a str {
        self.stop_id_index()
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Rows of aggregate stations, untouched.
    pub fn aggregate_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows
            .iter()
            .filter(|row| self.stop_id(row).starts_with(AGGREGATE_PREFIX))
    }

    /// Maps each derived join key to the indices of the rows carrying it.
    pub fn join_index(&self) -> HashMap<String, Vec<usize>> {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            let stop_id = self.stop_id(row);
            match join_key(stop_id) {
                Some(key) => index.entry(key).or_default().push(i),
                None => warn!(stop_id, "Static stop id has no join key"),
            }
        }
        index
    }
}

/// The middle two `_`-separated segments of a feed id: `est_4_281` → `4_281`.
pub fn join_key(stop_id: &str) -> Option<String> {
    let mut segments = stop_id.split('_').skip(1);
    let mode = segments.next()?;
    let code = segments.next()?;
    Some(format!("{mode}_{code}"))
}

/// Transport code encoded in a join key: `4_281` → `4`.
pub fn transport_code(key: &str) -> &str {
    key.split('_').next().unwrap_or_default()
}
