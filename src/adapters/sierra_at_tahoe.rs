//! Adapter for Sierra-at-Tahoe.
//!
//! Server-rendered HTML with patterns like:
//! - `10/14 Lifts Open`
//! - `41/50 Runs Open`
//! - `60" (summit), 35" (base)` for depths

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ParseError, ParseOutcome};
use crate::models::{Operations, Snow};
use crate::utils::visible_text;

static LIFTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s*lifts?\s*open|lifts?\s*open[:\s]*(\d+)\s*/\s*(\d+)")
        .unwrap()
});
static RUNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s*runs?\s*open|runs?\s*open[:\s]*(\d+)\s*/\s*(\d+)").unwrap()
});

static SNOW_24H: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)24[- ]?hour[:\s]*(\d+(?:\.\d+)?)["']?\s*(?:in|inches?)?"#,
        r#"(?i)(\d+(?:\.\d+)?)["']\s*(?:in\s+)?24[- ]?hour"#,
        r"(?i)last\s*24\s*hours?[:\s]*(\d+(?:\.\d+)?)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BASE_DEPTH: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)base\s*depth[:\s]*(\d+(?:\.\d+)?)",
        r#"(?i)(\d+)["']\s*\(summit\)"#,
        r#"(?i)base[:\s]*(\d+)["']"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SEASON_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ytd[:\s]*(\d+)|season\s*total[:\s]*(\d+)").unwrap());

pub fn parse(html: &str) -> Result<ParseOutcome, ParseError> {
    let text = visible_text(html);

    let mut ops = Operations::default();
    let mut snow = Snow::default();

    if let Some((open, total)) = alternating_fraction(&LIFTS, &text) {
        ops.lifts_open = Some(open);
        ops.lifts_total = Some(total);
    }
    if let Some((open, total)) = alternating_fraction(&RUNS, &text) {
        ops.trails_open = Some(open);
        ops.trails_total = Some(total);
    }

    snow.new_snow_24h_in = find_value(&SNOW_24H, &text);
    snow.base_depth_in = find_value(&BASE_DEPTH, &text);
    snow.season_total_in = SEASON_TOTAL.captures(&text).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    });

    ops.open_flag = Some(ops.lifts_open.is_some_and(|n| n > 0));

    Ok(ParseOutcome { ops, snow })
}

/// Both orderings appear in the wild: `10/14 Lifts Open` and
/// `Lifts Open: 10/14`. The alternation shifts which capture groups
/// participate.
fn alternating_fraction(pattern: &Regex, text: &str) -> Option<(u32, u32)> {
    let caps = pattern.captures(text)?;
    if let (Some(open), Some(total)) = (caps.get(1), caps.get(2)) {
        return Some((open.as_str().parse().ok()?, total.as_str().parse().ok()?));
    }
    if let (Some(open), Some(total)) = (caps.get(3), caps.get(4)) {
        return Some((open.as_str().parse().ok()?, total.as_str().parse().ok()?));
    }
    None
}

fn find_value(patterns: &[Regex], text: &str) -> Option<f64> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Some(value) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                return Some(value);
            }
        }
    }
    None
}
