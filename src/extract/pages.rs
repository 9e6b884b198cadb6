//! HTML parsers for the three page kinds of the website: the lines index,
//! a line page and a station page.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::fetch::Page;
use crate::records::{AccessibilityRecord, LineRecord, TransportMode};

static INDEX_LINK_SELECTOR: OnceLock<Selector> = OnceLock::new();
static TABLE_LINK_SELECTOR: OnceLock<Selector> = OnceLock::new();
static HEADING_SELECTOR: OnceLock<Selector> = OnceLock::new();
static HEADING_CODE_SELECTOR: OnceLock<Selector> = OnceLock::new();
static PARAGRAPH_SELECTOR: OnceLock<Selector> = OnceLock::new();
static SENTENCE_REGEX: OnceLock<Regex> = OnceLock::new();

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("static CSS selector"))
}

/// Link patterns of one transport mode.
#[derive(Debug, Clone)]
pub struct ModePatterns {
    line_link: Regex,
    station_link: Regex,
}

impl ModePatterns {
    pub fn new(mode: TransportMode) -> Self {
        let pattern = |prefix: String| {
            Regex::new(&format!("{}.*", regex::escape(&prefix))).expect("escaped link pattern")
        };
        Self {
            line_link: pattern(mode.line_path_prefix()),
            station_link: pattern(mode.station_path_prefix()),
        }
    }
}

/// What a line page yields: its record, if the heading could be read, and the
/// station pages it links to.
#[derive(Debug, Clone, Default)]
pub struct LinePage {
    pub record: Option<LineRecord>,
    pub station_links: Vec<Url>,
}

/// Returns the trailing path segment of `path`, cut at the first `.`.
pub fn station_code_from_path(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or_default();
    segment.split('.').next().unwrap_or_default().to_string()
}

/// Matched portions of every `href` under `selector` that fit `pattern`.
fn matching_hrefs<'a>(
    document: &'a Html,
    selector: &'static Selector,
    pattern: &'a Regex,
) -> impl Iterator<Item = &'a str> + 'a {
    document
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| pattern.find(href).map(|m| m.as_str()))
}

fn resolve(base: &Url, hrefs: impl Iterator<Item = impl AsRef<str>>) -> Vec<Url> {
    hrefs
        .filter_map(|href| match base.join(href.as_ref()) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(href = href.as_ref(), error = %e, "Unresolvable link skipped");
                None
            }
        })
        .collect()
}

fn direct_text(element: ElementRef<'_>) -> impl Iterator<Item = &str> {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
}

/// Line page links listed on a mode's lines index.
pub fn parse_index_page(page: &Page, patterns: &ModePatterns) -> Vec<Url> {
    let document = Html::parse_document(&page.body);
    let index_links = selector(&INDEX_LINK_SELECTOR, "div ul li a");
    resolve(
        &page.url,
        matching_hrefs(&document, index_links, &patterns.line_link),
    )
}

pub fn parse_line_page(page: &Page, patterns: &ModePatterns) -> LinePage {
    let document = Html::parse_document(&page.body);
    let table_links = selector(&TABLE_LINK_SELECTOR, "td a");

    let hrefs: Vec<&str> = matching_hrefs(&document, table_links, &patterns.station_link).collect();
    let station_links = resolve(&page.url, hrefs.iter());
    let stations = hrefs.iter().map(|href| station_code_from_path(href)).collect();

    let record = parse_heading(&document).map(|(line_code, line_name)| LineRecord {
        line_code,
        line_name,
        stations,
    });
    if record.is_none() {
        debug!(url = %page.url, "Line page without heading");
    }

    LinePage {
        record,
        station_links,
    }
}

/// Reads `(line code, line name)` from the `h4.titu4` heading.
fn parse_heading(document: &Html) -> Option<(String, String)> {
    let heading = document
        .select(selector(&HEADING_SELECTOR, "div h4.titu4"))
        .next()?;
    let name = direct_text(heading)
        .map(str::trim)
        .find(|text| !text.is_empty())?;
    let span = heading
        .select(selector(&HEADING_CODE_SELECTOR, "span"))
        .next()?;
    let code = direct_text(span).next()?;

    Some((code.trim().to_string(), name.to_string()))
}

pub fn parse_station_page(page: &Page) -> AccessibilityRecord {
    let document = Html::parse_document(&page.body);
    let sentence = SENTENCE_REGEX.get_or_init(|| Regex::new("Estación.*").expect("static regex"));

    let sentences = document
        .select(selector(&PARAGRAPH_SELECTOR, "div p"))
        .flat_map(|paragraph| direct_text(paragraph))
        .flat_map(|text| sentence.find_iter(text).map(|m| m.as_str().to_string()))
        .collect();

    AccessibilityRecord {
        station_code: station_code_from_path(page.url.path()),
        sentences,
    }
}
