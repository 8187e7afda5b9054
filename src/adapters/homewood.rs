//! Adapter for Homewood Mountain Resort.
//!
//! The snow report page labels its counters, so the patterns anchor on
//! `Open Lifts` / `Open Runs` followed by an `X/Y` fraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ParseError, ParseOutcome};
use crate::models::{Operations, Snow};
use crate::utils::visible_text;

static OPEN_LIFTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Open\s+Lifts[^0-9]*(\d+)\s*/\s*(\d+)").unwrap());
static OPEN_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Open\s+Runs[^0-9]*(\d+)\s*/\s*(\d+)").unwrap());

static BASE_DEPTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(?:Base|Summit)[:\s]*(\d+(?:\.\d+)?)\s*(?:in|")"#).unwrap());
static SEASON_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)Season\s*(?:Total)?[:\s]*(\d+(?:\.\d+)?)\s*(?:in|")"#).unwrap());
static NEW_SNOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:24\s*(?:hr|hour)|overnight)[:\s]*(\d+(?:\.\d+)?)\s*(?:in|")"#).unwrap()
});

pub fn parse(html: &str) -> Result<ParseOutcome, ParseError> {
    let text = visible_text(html);

    let mut ops = Operations::default();
    let mut snow = Snow::default();

    if let Some(caps) = OPEN_LIFTS.captures(&text) {
        ops.lifts_open = caps[1].parse().ok();
        ops.lifts_total = caps[2].parse().ok();
    }
    if let Some(caps) = OPEN_RUNS.captures(&text) {
        ops.trails_open = caps[1].parse().ok();
        ops.trails_total = caps[2].parse().ok();
    }

    let grab = |pattern: &Regex| {
        pattern
            .captures(&text)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    };
    snow.base_depth_in = grab(&BASE_DEPTH);
    snow.season_total_in = grab(&SEASON_TOTAL);
    snow.new_snow_24h_in = grab(&NEW_SNOW);

    ops.open_flag = match (ops.lifts_open, ops.trails_open) {
        (Some(lifts), _) => Some(lifts > 0),
        (None, Some(trails)) => Some(trails > 0),
        (None, None) => None,
    };

    Ok(ParseOutcome { ops, snow })
}
