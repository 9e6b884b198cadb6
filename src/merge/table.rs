//! Row types of the merged table and their CSV cell layout.

use std::cmp::Ordering;
use std::fmt;

use super::flags::AccessibilityFlags;

/// A line code as published. Numeric codes order before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LineCode {
    Numeric(i64),
    Text(String),
}

impl LineCode {
    /// Numeric when the code parses as an integer, the raw text otherwise.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(n) => LineCode::Numeric(n),
            Err(_) => LineCode::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineCode::Numeric(n) => write!(f, "{n}"),
            LineCode::Text(s) => f.write_str(s),
        }
    }
}

/// One stop of one line, expanded from a line record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStop {
    pub stop_id: String,
    /// 1-based position along the line.
    pub order_id: usize,
    pub line_name: String,
    pub line_id: LineCode,
}

/// Per-station columns derived from an accessibility record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationAccess {
    pub stop_id: String,
    pub flags: AccessibilityFlags,
    pub transport_name: &'static str,
}

/// Static feed columns matched to a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMatch {
    pub values: Vec<String>,
    pub transport_code: String,
}

/// A line stop with whatever the left joins found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    pub stop: LineStop,
    pub access: Option<StationAccess>,
    pub feed: Option<StaticMatch>,
}

impl JoinedRow {
    pub fn transport_name(&self) -> Option<&'static str> {
        self.access.as_ref().map(|a| a.transport_name)
    }

    /// Orders by transport name, missing names last, then by line code.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        let by_mode = match (self.transport_name(), other.transport_name()) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_mode.then_with(|| self.stop.line_id.cmp(&other.stop.line_id))
    }
}

/// Final table: joined rows in sort order, then aggregate stations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedTable {
    pub static_headers: Vec<String>,
    pub joined: Vec<JoinedRow>,
    pub aggregates: Vec<Vec<String>>,
}

const LINE_COLUMNS: [&str; 3] = ["order_id", "line_name", "line_id"];
const MODE_COLUMNS: [&str; 2] = ["transport_name", "transport_code"];
const TRAILING_COLUMNS: usize = LINE_COLUMNS.len() + MODE_COLUMNS.len() + 5;

impl MergedTable {
    /// Static columns first, then line columns, then mode and flag columns.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = self.static_headers.clone();
        headers.extend(LINE_COLUMNS.iter().chain(&MODE_COLUMNS).map(|c| c.to_string()));
        headers.extend(AccessibilityFlags::columns().map(str::to_string));
        headers
    }

    pub fn len(&self) -> usize {
        self.joined.len() + self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every row as CSV cells aligned with [`MergedTable::headers`]. Missing
    /// values are empty cells.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        let width = self.static_headers.len();
        let joined = self.joined.iter().map(move |row| {
            let mut cells = match &row.feed {
                Some(feed) => feed.values.clone(),
                None => vec![String::new(); width],
            };
            cells.extend([
                row.stop.order_id.to_string(),
                row.stop.line_name.clone(),
                row.stop.line_id.to_string(),
                row.transport_name().unwrap_or_default().to_string(),
                row.feed
                    .as_ref()
                    .map(|feed| feed.transport_code.clone())
                    .unwrap_or_default(),
            ]);
            match &row.access {
                Some(access) => cells.extend(access.flags.cells()),
                None => cells.extend(AccessibilityFlags::columns().map(|_| String::new())),
            }
            cells
        });
        let aggregates = self.aggregates.iter().map(|values| {
            let mut cells = values.clone();
            cells.resize(values.len() + TRAILING_COLUMNS, String::new());
            cells
        });
        joined.chain(aggregates)
    }
}
