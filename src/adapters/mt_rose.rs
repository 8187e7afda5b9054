//! Adapter for Mt Rose Ski Tahoe.
//!
//! The conditions page lists each lift by name with a status word, and
//! reports snow data as elevation ranges like `47-58"`. Trail counts are
//! not published as explicit numbers (terrain is shown as a percentage),
//! so they usually stay unknown.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::{parse_bool_status, ParseError, ParseOutcome};
use crate::models::{Operations, Snow};
use crate::utils::{clean_text, visible_text};

/// Known lifts at Mt Rose.
const LIFT_NAMES: [&str; 8] = [
    "Northwest Express",
    "Zephyr Express",
    "Lakeview Express",
    "Wizard",
    "Magic",
    "Galena",
    "Chuter",
    "Blazing Zephyr",
];

static LIFT_STATUS: Lazy<Vec<Regex>> = Lazy::new(|| {
    LIFT_NAMES
        .iter()
        .map(|name| {
            // Status is the word right after the lift name; anything
            // longer would bleed into the next lift's entry.
            let pattern = format!(r"(?i){}\s+(\w+)", regex::escape(name));
            Regex::new(&pattern).unwrap()
        })
        .collect()
});

static TRAIL_COUNTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s*(?:trails?|runs?)").unwrap());

static NEW_SNOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)new\s*snow[:\s]*(\d+)[-–]?(\d+)?["″]"#).unwrap());
static BASE_DEPTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)base\s*(?:depth)?[:\s]*(\d+)[-–]?(\d+)?["″]"#).unwrap());
static SEASON_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)season\s*(?:total)?[:\s]*(\d+)[-–]?(\d+)?["″]"#).unwrap());
static STORM_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)storm\s*(?:total)?[:\s]*(\d+)[-–]?(\d+)?["″]"#).unwrap());

pub fn parse(html: &str) -> Result<ParseOutcome, ParseError> {
    let document = Html::parse_document(html);
    let mut ops = Operations::default();
    let mut snow = Snow::default();

    // Prefer the lift-status section; fall back to the whole page.
    let lift_selector = Selector::parse(".lift-status").unwrap();
    let lift_text = document
        .select(&lift_selector)
        .next()
        .map(|section| clean_text(&section.text().collect::<Vec<_>>().join(" ")));
    let page_text = visible_text(html);

    let (lifts_open, lifts_total) = count_lifts(lift_text.as_deref().unwrap_or(&page_text));
    ops.lifts_open = lifts_open;
    ops.lifts_total = lifts_total;

    if let Some(caps) = TRAIL_COUNTS.captures(&page_text) {
        ops.trails_open = caps[1].parse().ok();
        ops.trails_total = caps[2].parse().ok();
    }

    snow.new_snow_24h_in = parse_range(&NEW_SNOW, &page_text);
    snow.base_depth_in = parse_range(&BASE_DEPTH, &page_text);
    snow.season_total_in = parse_range(&SEASON_TOTAL, &page_text);
    snow.new_snow_48h_in = parse_range(&STORM_TOTAL, &page_text);

    ops.open_flag = match ops.lifts_open {
        Some(n) if n > 0 => Some(true),
        Some(_) => Some(false),
        None if page_text.to_lowercase().contains("closed") => Some(false),
        None => None,
    };

    Ok(ParseOutcome { ops, snow })
}

/// Scan for each known lift name followed by a status word. "Scheduled to
/// open" counts as open.
fn count_lifts(text: &str) -> (Option<u32>, Option<u32>) {
    let mut open = 0u32;
    let mut total = 0u32;

    for pattern in LIFT_STATUS.iter() {
        if let Some(caps) = pattern.captures(text) {
            total += 1;
            let status = caps[1].to_lowercase();
            if status.contains("scheduled") || parse_bool_status(&status) == Some(true) {
                open += 1;
            }
        }
    }

    if total == 0 {
        (None, None)
    } else {
        (Some(open), Some(total))
    }
}

/// Parse a value that might be an elevation range like `47-58`; ranges
/// average to their midpoint.
fn parse_range(pattern: &Regex, text: &str) -> Option<f64> {
    let caps = pattern.captures(text)?;
    let low: f64 = caps[1].parse().ok()?;
    if let Some(high) = caps.get(2) {
        let high: f64 = high.as_str().parse().ok()?;
        return Some((low + high) / 2.0);
    }
    Some(low)
}
