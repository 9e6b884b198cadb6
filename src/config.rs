//! Run configuration, passed explicitly into the crawl and merge entry points.

use std::path::PathBuf;

use crate::records::TransportMode;

pub const DEFAULT_BASE_URL: &str = "http://www.crtm.es";
pub const DEFAULT_USER_AGENT: &str = concat!("metro_spyder/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    /// Scheme and host of the transit authority's website.
    pub base_url: String,
    pub user_agent: String,
    /// Maximum page requests in flight within one mode's crawl.
    pub concurrency: usize,
    pub metro_stops: PathBuf,
    pub light_rail_stops: PathBuf,
    pub metro_records: PathBuf,
    pub light_rail_records: PathBuf,
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            metro_stops: PathBuf::from("stops.txt"),
            light_rail_stops: PathBuf::from("stops_ligero.txt"),
            metro_records: PathBuf::from("metro.json"),
            light_rail_records: PathBuf::from("ligero.json"),
            output: PathBuf::from("DATOS.csv"),
        }
    }
}

impl Config {
    /// Intermediate record file written by the crawl of `mode`.
    pub fn records_path(&self, mode: TransportMode) -> &PathBuf {
        match mode {
            TransportMode::Metro => &self.metro_records,
            TransportMode::LightRail => &self.light_rail_records,
        }
    }

    pub fn intermediate_paths(&self) -> [&PathBuf; 2] {
        [&self.metro_records, &self.light_rail_records]
    }

    /// Static station tables, in concatenation order.
    pub fn static_tables(&self) -> [&PathBuf; 2] {
        [&self.metro_stops, &self.light_rail_stops]
    }
}
