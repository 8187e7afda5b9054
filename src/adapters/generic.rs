//! Generic adapter that sweeps a page's visible text for common patterns.
//!
//! This works for some simpler resort pages but may miss data on
//! JS-heavy sites.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_fraction, parse_inches, ParseError, ParseOutcome};
use crate::models::{Operations, Snow};
use crate::utils::{clean_text, visible_text};

static LIFT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+\s*(?:/|of|out\s+of)\s*\d+)\s*lifts?",
        r"(?i)lifts?\s*(?:open)?[:\s]*(\d+\s*(?:/|of|out\s+of)\s*\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TRAIL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+\s*(?:/|of|out\s+of)\s*\d+)\s*(?:trails?|runs?)",
        r"(?i)(?:trails?|runs?)\s*(?:open)?[:\s]*(\d+\s*(?:/|of|out\s+of)\s*\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static NEW_SNOW_24: Lazy<Vec<Regex>> = Lazy::new(|| new_snow_patterns("24"));
static NEW_SNOW_48: Lazy<Vec<Regex>> = Lazy::new(|| new_snow_patterns("48"));

fn new_snow_patterns(hours: &str) -> Vec<Regex> {
    [
        format!(r#"(?i)(\d+(?:\.\d+)?)["″]\s*(?:in\s+)?(?:last\s+)?{hours}\s*(?:hr|hour)"#),
        format!(r#"(?i){hours}\s*(?:hr|hour)s?\s*[:\s]*(\d+(?:\.\d+)?)["″]?"#),
        format!(r#"(?i)new\s+snow\s*\(?{hours}h?\)?\s*[:\s]*(\d+(?:\.\d+)?)"#),
        format!(r#"(?i)(\d+(?:\.\d+)?)\s*(?:in|inches?|")\s*(?:in\s+)?{hours}\s*(?:hr|hour)"#),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
}

static BASE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // capture the whole measurement so ranges average properly
        r#"(?i)base\s*(?:depth)?[:\s]*(\d+(?:\.\d+)?(?:\s*[-–]\s*\d+(?:\.\d+)?)?["″]?)"#,
        r#"(?i)(\d+(?:\.\d+)?)["″]?\s*base"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SEASON_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)season\s*total[:\s]*(\d+(?:\.\d+)?)["″]?\s*(?:in|inches?)?"#,
        r#"(?i)ytd[:\s]*(\d+(?:\.\d+)?)["″]?"#,
        r#"(?i)(\d+(?:\.\d+)?)["″]?\s*(?:in|inches?)?\s*season"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SURFACE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)surface[:\s]+([A-Za-z\s,]+?)(?:\.|$)",
        r"(?i)conditions?[:\s]+([A-Za-z\s,]+?)(?:\.|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Parse a page by searching its visible text for common condition
/// patterns. Succeeds when at least lift counts or 24h snowfall were
/// found.
pub fn parse(html: &str) -> Result<ParseOutcome, ParseError> {
    let text = visible_text(html);
    let text_lower = text.to_lowercase();

    let mut ops = Operations::default();
    let mut snow = Snow::default();

    if let Some((open, total)) = find_counts(&LIFT_PATTERNS, &text) {
        ops.lifts_open = Some(open);
        ops.lifts_total = Some(total);
    }
    if let Some((open, total)) = find_counts(&TRAIL_PATTERNS, &text) {
        ops.trails_open = Some(open);
        ops.trails_total = Some(total);
    }

    ops.open_flag = find_open_status(&text_lower, &ops);

    snow.new_snow_24h_in = find_value(&NEW_SNOW_24, &text);
    snow.new_snow_48h_in = find_value(&NEW_SNOW_48, &text);
    snow.base_depth_in = find_base_depth(&text);
    snow.season_total_in = find_value(&SEASON_PATTERNS, &text);
    snow.surface = find_surface(&text);

    if ops.lifts_open.is_some() || snow.new_snow_24h_in.is_some() {
        Ok(ParseOutcome { ops, snow })
    } else {
        Err(ParseError::NoData)
    }
}

fn find_counts(patterns: &[Regex], text: &str) -> Option<(u32, u32)> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Some(counts) = parse_fraction(&caps[1]) {
                return Some(counts);
            }
        }
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

fn find_base_depth(text: &str) -> Option<f64> {
    for pattern in BASE_PATTERNS.iter() {
        if let Some(value) = pattern
            .captures(text)
            .and_then(|caps| parse_inches(&caps[1]))
        {
            return Some(value);
        }
    }
    None
}

fn find_open_status(text_lower: &str, ops: &Operations) -> Option<bool> {
    if text_lower.contains("resort closed") || text_lower.contains("mountain closed") {
        return Some(false);
    }
    if text_lower.contains("resort open") || text_lower.contains("mountain open") {
        return Some(true);
    }
    ops.lifts_open.map(|open| open > 0)
}

fn find_surface(text: &str) -> Option<String> {
    for pattern in SURFACE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let surface = clean_text(&caps[1]);
            if !surface.is_empty() && surface.len() < 50 {
                return Some(surface);
            }
        }
    }
    None
}
