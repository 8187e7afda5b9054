//! Adapter for Vail Resorts properties (Heavenly, Northstar, Kirkwood).
//!
//! The terrain-and-lift-status pages embed two JSON feeds in script tags,
//! `FR.TerrainStatusFeed` (lifts and grooming areas) and
//! `FR.snowReportData` (snow measurements). Both are extracted first;
//! visible-text patterns like `X / Y Lifts` serve as the fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{ParseError, ParseOutcome};
use crate::models::{Operations, Snow};
use crate::utils::visible_text;

static SNOW_REPORT_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)FR\.snowReportData\s*=\s*(\{[^;]+\});").unwrap());
static TERRAIN_STATUS_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)FR\.TerrainStatusFeed\s*=\s*(\{[^;]+\});").unwrap());
static TRAILING_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

static LIFT_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s*Lifts?(?:\s*Open)?").unwrap());
static TRAIL_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s*(?:Trails?|Runs?)(?:\s*Open)?").unwrap());

static INCHES_IN_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*inch").unwrap());

static FALLBACK_24H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)24\s*(?:hr|hour)s?[:\s]*(\d+(?:\.\d+)?)").unwrap());
static FALLBACK_48H: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)48\s*(?:hr|hour)s?[:\s]*(\d+(?:\.\d+)?)").unwrap());
static FALLBACK_BASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)base[:\s]*(\d+(?:\.\d+)?)\s*(?:in|")"#).unwrap());
static FALLBACK_SEASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)season[:\s]*(\d+(?:\.\d+)?)").unwrap());

pub fn parse(html: &str) -> Result<ParseOutcome, ParseError> {
    let text = visible_text(html);

    let mut ops = Operations::default();

    // === LIFTS ===
    let terrain = extract_embedded_json(&TERRAIN_STATUS_JSON, html);
    if let Some(lifts) = terrain.as_ref().and_then(|t| t["Lifts"].as_array()) {
        let counts = count_lift_statuses(lifts);
        ops.lifts_open = Some(counts.open);
        ops.lifts_scheduled = Some(counts.scheduled);
        ops.lifts_total = Some(counts.total);
    } else if let Some(caps) = LIFT_FRACTION.captures(&text) {
        ops.lifts_open = caps[1].parse().ok();
        ops.lifts_total = caps[2].parse().ok();
    }

    // === TRAILS ===
    // Trails live inside GroomingAreas, not at the feed's top level.
    if let Some(areas) = terrain.as_ref().and_then(|t| t["GroomingAreas"].as_array()) {
        let trails: Vec<&Value> = areas
            .iter()
            .filter_map(|area| area["Trails"].as_array())
            .flatten()
            .collect();
        if !trails.is_empty() {
            let open = trails
                .iter()
                .filter(|t| t["IsOpen"].as_bool().unwrap_or(false))
                .count() as u32;
            ops.trails_open = Some(open);
            ops.trails_total = Some(trails.len() as u32);
        }
    }
    if ops.trails_total.is_none() {
        if let Some(caps) = TRAIL_FRACTION.captures(&text) {
            ops.trails_open = caps[1].parse().ok();
            ops.trails_total = caps[2].parse().ok();
        }
    }

    // === SNOW DATA ===
    let snow = match extract_embedded_json(&SNOW_REPORT_JSON, html) {
        Some(report) => parse_snow_report(&report),
        None => parse_snow_fallback(&text),
    };

    // === OPEN STATUS ===
    let lifts_active = ops.lifts_open.unwrap_or(0) + ops.lifts_scheduled.unwrap_or(0);
    let trails_active = ops.trails_open.unwrap_or(0) + ops.trails_scheduled.unwrap_or(0);
    ops.open_flag = if lifts_active > 0 || trails_active > 0 {
        Some(true)
    } else if ops.lifts_open.is_some() || ops.lifts_scheduled.is_some() {
        Some(false)
    } else {
        None
    };

    Ok(ParseOutcome { ops, snow })
}

/// Pull one of the `FR.*` assignments out of a script tag and parse it,
/// tolerating the trailing commas the feeds tend to carry.
fn extract_embedded_json(pattern: &Regex, html: &str) -> Option<Value> {
    let caps = pattern.captures(html)?;
    let cleaned = TRAILING_COMMAS.replace_all(&caps[1], "$1");
    match serde_json::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Failed to parse embedded feed JSON");
            None
        }
    }
}

#[derive(Default)]
struct LiftCounts {
    open: u32,
    scheduled: u32,
    total: u32,
}

/// Count lifts by status. The feed uses either numeric codes
/// (0 closed, 1 open, 2 on hold, 3 scheduled) or status strings.
fn count_lift_statuses(lifts: &[Value]) -> LiftCounts {
    let mut counts = LiftCounts::default();

    for lift in lifts {
        counts.total += 1;
        match &lift["Status"] {
            Value::Number(n) => match n.as_i64() {
                Some(1) => counts.open += 1,
                Some(3) => counts.scheduled += 1,
                _ => {}
            },
            Value::String(s) => match s.to_lowercase().as_str() {
                "open" => counts.open += 1,
                "scheduled" => counts.scheduled += 1,
                _ => {}
            },
            _ => {}
        }
    }

    counts
}

fn parse_snow_report(report: &Value) -> Snow {
    let mut snow = Snow::default();
    snow.new_snow_24h_in = extract_inches(&report["TwentyFourHourSnowfall"])
        .or_else(|| extract_inches(&report["OvernightSnowfall"]));
    snow.new_snow_48h_in = extract_inches(&report["FortyEightHourSnowfall"]);
    snow.base_depth_in = extract_inches(&report["BaseDepth"]);
    snow.season_total_in = extract_inches(&report["CurrentSeason"]);
    snow
}

/// Extract inches from the feed's measurement formats: either
/// `{"Inches": "5", "Centimeters": "12"}` or `"5 inches / 12 cm"`.
fn extract_inches(value: &Value) -> Option<f64> {
    match value {
        Value::Object(map) => {
            let inches = map.get("Inches")?.as_str()?;
            if inches.is_empty() {
                return None;
            }
            inches.parse().ok()
        }
        Value::String(s) => INCHES_IN_STRING
            .captures(s)
            .and_then(|caps| caps[1].parse().ok()),
        _ => None,
    }
}

fn parse_snow_fallback(text: &str) -> Snow {
    let grab = |pattern: &Regex| {
        pattern
            .captures(text)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    };

    let mut snow = Snow::default();
    snow.new_snow_24h_in = grab(&FALLBACK_24H);
    snow.new_snow_48h_in = grab(&FALLBACK_48H);
    snow.base_depth_in = grab(&FALLBACK_BASE);
    snow.season_total_in = grab(&FALLBACK_SEASON);
    snow
}
