//! Records produced by the station extractor.
//!
//! The extractor emits a tagged [`ExtractedRecord`] per scraped page, so the
//! merger never has to guess a record's shape from its key.

use serde::{Deserialize, Serialize};

/// Station codes of metro stations carry this marker (transport code 4).
pub const METRO_CODE_MARKER: &str = "4_";

/// The two rail modes published on the transit authority's website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Metro,
    LightRail,
}

impl TransportMode {
    pub const ALL: [TransportMode; 2] = [TransportMode::Metro, TransportMode::LightRail];

    /// Path segment used by the website for this mode.
    pub fn slug(self) -> &'static str {
        match self {
            TransportMode::Metro => "metro",
            TransportMode::LightRail => "metro-ligero",
        }
    }

    /// Name written to the `transport_name` output column.
    pub fn name(self) -> &'static str {
        match self {
            TransportMode::Metro => "metro",
            TransportMode::LightRail => "metro_ligero",
        }
    }

    /// Classifies a scraped station code by the presence of the metro marker.
    pub fn from_station_code(code: &str) -> Self {
        if code.contains(METRO_CODE_MARKER) {
            TransportMode::Metro
        } else {
            TransportMode::LightRail
        }
    }

    pub fn lines_index_url(self, base_url: &str) -> String {
        format!(
            "{}/tu-transporte-publico/{}/lineas.aspx",
            base_url.trim_end_matches('/'),
            self.slug()
        )
    }

    pub fn line_path_prefix(self) -> String {
        format!("/tu-transporte-publico/{}/lineas/", self.slug())
    }

    pub fn station_path_prefix(self) -> String {
        format!("/tu-transporte-publico/{}/estaciones/", self.slug())
    }
}

/// Ordered stations of one line. Position in `stations` is the stop order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub line_code: String,
    pub line_name: String,
    pub stations: Vec<String>,
}

/// Accessibility notices scraped from one station page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityRecord {
    pub station_code: String,
    pub sentences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractedRecord {
    Line(LineRecord),
    Accessibility(AccessibilityRecord),
}
