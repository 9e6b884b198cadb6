//! Data merger: reshapes scraped records, joins them with the static station
//! tables and produces the final sorted table.

pub mod flags;
pub mod table;

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::output::{read_records, write_table};
use crate::records::{AccessibilityRecord, ExtractedRecord, LineRecord, TransportMode};
use crate::stops::{StaticTable, transport_code};
use flags::AccessibilityFlags;
use table::{JoinedRow, LineCode, LineStop, MergedTable, StaticMatch, StationAccess};

/// One row per station of each line, numbered from 1 in line order.
pub fn expand_lines<'a>(lines: impl IntoIterator<Item = &'a LineRecord>) -> Vec<LineStop> {
    lines
        .into_iter()
        .flat_map(|line| {
            line.stations.iter().enumerate().map(move |(i, station)| LineStop {
                stop_id: station.clone(),
                order_id: i + 1,
                line_name: line.line_name.clone(),
                line_id: LineCode::normalize(&line.line_code),
            })
        })
        .collect()
}

pub fn station_access(record: &AccessibilityRecord) -> StationAccess {
    StationAccess {
        stop_id: record.station_code.clone(),
        flags: AccessibilityFlags::from_sentences(&record.sentences),
        transport_name: TransportMode::from_station_code(&record.station_code).name(),
    }
}

/// Left-joins line stops with accessibility data and static feed rows, sorts
/// the result and appends the aggregate stations of the feed.
pub fn merge(records: &[ExtractedRecord], stops: &StaticTable) -> MergedTable {
    let mut lines = Vec::new();
    let mut access = Vec::new();
    for record in records {
        match record {
            ExtractedRecord::Line(line) => lines.push(line),
            ExtractedRecord::Accessibility(station) => access.push(station_access(station)),
        }
    }

    let line_stops = expand_lines(lines);
    debug!(
        line_stops = line_stops.len(),
        stations = access.len(),
        accessible = access.iter().filter(|a| a.flags.accessible()).count(),
        "Scraped records reshaped"
    );

    let mut access_index: HashMap<&str, Vec<&StationAccess>> = HashMap::new();
    for station in &access {
        access_index.entry(station.stop_id.as_str()).or_default().push(station);
    }
    let static_index = stops.join_index();

    let mut joined = Vec::new();
    let mut unmatched = 0usize;
    for stop in line_stops {
        let access_matches: Vec<Option<StationAccess>> = match access_index.get(stop.stop_id.as_str()) {
            Some(found) => found.iter().map(|a| Some((*a).clone())).collect(),
            None => vec![None],
        };
        let feed_matches: Vec<Option<StaticMatch>> = match static_index.get(&stop.stop_id) {
            Some(rows) => rows
                .iter()
                .map(|&i| {
                    Some(StaticMatch {
                        values: stops.rows[i].clone(),
                        transport_code: transport_code(&stop.stop_id).to_string(),
                    })
                })
                .collect(),
            None => {
                unmatched += 1;
                vec![None]
            }
        };

        for access in &access_matches {
            for feed in &feed_matches {
                joined.push(JoinedRow {
                    stop: stop.clone(),
                    access: access.clone(),
                    feed: feed.clone(),
                });
            }
        }
    }

    joined.sort_by(JoinedRow::sort_cmp);

    let aggregates: Vec<Vec<String>> = stops.aggregate_rows().cloned().collect();
    info!(
        joined = joined.len(),
        unmatched_stops = unmatched,
        aggregates = aggregates.len(),
        "Merge complete"
    );

    MergedTable {
        static_headers: stops.headers.clone(),
        joined,
        aggregates,
    }
}

/// Reads both modes' intermediate files and static tables, merges them and
/// writes the output table.
#[tracing::instrument(skip_all, fields(output = %config.output.display()))]
pub fn merge_files(config: &Config) -> Result<MergedTable> {
    let mut records = Vec::new();
    for path in config.intermediate_paths() {
        records.extend(read_records(path)?);
    }

    let tables = config
        .static_tables()
        .into_iter()
        .map(|path| StaticTable::load(path))
        .collect::<Result<Vec<_>>>()?;
    let stops = StaticTable::concat(tables);

    let merged = merge(&records, &stops);
    write_table(&config.output, &merged)?;

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(code: &str, name: &str, stations: &[&str]) -> ExtractedRecord {
        ExtractedRecord::Line(LineRecord {
            line_code: code.to_string(),
            line_name: name.to_string(),
            stations: stations.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn station(code: &str, sentences: &[&str]) -> ExtractedRecord {
        ExtractedRecord::Accessibility(AccessibilityRecord {
            station_code: code.to_string(),
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn stops(ids: &[&str]) -> StaticTable {
        StaticTable::new(
            vec!["stop_id".to_string(), "stop_name".to_string()],
            ids.iter()
                .map(|id| vec![id.to_string(), format!("name {id}")])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_expand_lines_numbers_stops() {
        let record = LineRecord {
            line_code: "4".to_string(),
            line_name: "L 1".to_string(),
            stations: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };

        let stops = expand_lines([&record]);

        assert_eq!(stops.len(), 3);
        assert_eq!(
            stops.iter().map(|s| s.order_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(stops.iter().all(|s| s.line_name == "L 1"));
        assert!(stops.iter().all(|s| s.line_id == LineCode::Numeric(4)));
        assert_eq!(stops[2].stop_id, "c");
    }

    #[test]
    fn test_station_access_mode() {
        let metro = AccessibilityRecord {
            station_code: "4_1".to_string(),
            sentences: vec![],
        };
        let light_rail = AccessibilityRecord {
            station_code: "10_1".to_string(),
            sentences: vec!["Estación accesible".to_string()],
        };

        assert_eq!(station_access(&metro).transport_name, "metro");
        assert!(!station_access(&metro).flags.accessible());
        assert_eq!(station_access(&light_rail).transport_name, "metro_ligero");
        assert!(station_access(&light_rail).flags.accessible());
    }

    #[test]
    fn test_merge_left_joins_keep_unmatched_stops() {
        let records = vec![line("1", "L 1", &["4_1", "4_2"]), station("4_1", &[])];

        let merged = merge(&records, &stops(&["est_4_1"]));

        assert_eq!(merged.joined.len(), 2);
        let first = &merged.joined[0];
        assert_eq!(first.stop.stop_id, "4_1");
        assert_eq!(first.feed.as_ref().unwrap().transport_code, "4");
        // 4_2 has neither an accessibility record nor a feed row
        let second = &merged.joined[1];
        assert!(second.access.is_none());
        assert!(second.feed.is_none());
    }

    #[test]
    fn test_merge_repeats_rows_for_every_feed_match() {
        let records = vec![line("1", "L 1", &["4_1"]), station("4_1", &[])];

        let merged = merge(&records, &stops(&["est_4_1", "acc_4_1_1", "acc_4_1_2"]));

        let ids: Vec<_> = merged
            .joined
            .iter()
            .map(|row| row.feed.as_ref().unwrap().values[0].as_str())
            .collect();
        assert_eq!(ids, vec!["est_4_1", "acc_4_1_1", "acc_4_1_2"]);
    }

    #[test]
    fn test_merge_sorts_by_mode_then_line() {
        let records = vec![
            line("10", "ML 1", &["10_1"]),
            line("R", "Ramal", &["4_9"]),
            line("12", "L 12", &["4_7"]),
            line("2", "L 2", &["4_8"]),
            station("10_1", &[]),
            station("4_7", &[]),
            station("4_8", &[]),
            station("4_9", &[]),
        ];

        let merged = merge(&records, &stops(&[]));

        let order: Vec<_> = merged
            .joined
            .iter()
            .map(|row| row.stop.line_name.as_str())
            .collect();
        assert_eq!(order, vec!["L 2", "L 12", "Ramal", "ML 1"]);
    }

    #[test]
    fn test_merge_appends_aggregates_unchanged() {
        let table = stops(&["est_4_1", "est_90_5", "est_90_6"]);

        let merged = merge(&[], &table);

        assert!(merged.joined.is_empty());
        assert_eq!(merged.aggregates, vec![table.rows[1].clone(), table.rows[2].clone()]);
        assert_eq!(merged.len(), 2);
    }
}
