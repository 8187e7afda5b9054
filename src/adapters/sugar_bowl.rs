//! Adapter for Sugar Bowl.
//!
//! Key patterns on the conditions page:
//! - named lift entries with Open/Scheduled/Closed statuses
//! - `X / Y Lifts Open` and `X / Y Trails Open` fractions
//! - `X" 24 Hr` snowfall, `X" 7 Day`, `X" Year to Date`
//! - base depth reported at the Summit

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ParseError, ParseOutcome};
use crate::models::{Operations, Snow};
use crate::utils::visible_text;

/// Known lifts at Sugar Bowl.
const LIFT_NAMES: [&str; 11] = [
    "Mt. Judah Express",
    "Jerome Hill Express",
    "Mt. Lincoln Express",
    "Christmas Tree Express",
    "Mt. Disney Express",
    "Nob Hill",
    "White Pine",
    "Summit Chair",
    "Gondola",
    "Flume Carpet",
    "Crow's Peak",
];

static LIFT_STATUS: Lazy<Vec<Regex>> = Lazy::new(|| {
    LIFT_NAMES
        .iter()
        .map(|name| {
            let pattern = format!(r"(?i){}\s+(Open|Scheduled|Closed)\b", regex::escape(name));
            Regex::new(&pattern).unwrap()
        })
        .collect()
});

static LIFT_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s*Lifts?\s*Open").unwrap());
static TRAIL_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s*Trails?\s*Open").unwrap());

static SNOW_24H: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)(\d+(?:\.\d+)?)\s*["″]\s*24\s*Hr"#,
        r#"(?i)24\s*Hr\s*(?:Snowfall)?[:\s]*(\d+(?:\.\d+)?)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SEASON_TOTAL: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)(\d+(?:\.\d+)?)\s*["″]\s*(?:Year\s*to\s*Date|YTD)"#,
        r#"(?i)(?:Year\s*to\s*Date|YTD)[:\s]*(\d+(?:\.\d+)?)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SEVEN_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(\d+(?:\.\d+)?)\s*["″]\s*7\s*Day"#).unwrap());

static BASE_DEPTH: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)(?:Summit|Base)[:\s]*(\d+(?:\.\d+)?)\s*["″]"#,
        r#"(?i)(\d+(?:\.\d+)?)\s*["″]\s*(?:at\s+)?(?:Summit|Base)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub fn parse(html: &str) -> Result<ParseOutcome, ParseError> {
    let text = visible_text(html);

    let mut ops = Operations::default();
    let mut snow = Snow::default();

    // === LIFTS ===
    // Count individual lift statuses first so scheduled lifts are visible.
    let mut open = 0u32;
    let mut scheduled = 0u32;
    let mut total = 0u32;
    for pattern in LIFT_STATUS.iter() {
        if let Some(caps) = pattern.captures(&text) {
            total += 1;
            match caps[1].to_lowercase().as_str() {
                "open" => open += 1,
                "scheduled" => scheduled += 1,
                _ => {}
            }
        }
    }
    if total > 0 {
        ops.lifts_open = Some(open);
        ops.lifts_scheduled = Some(scheduled);
        ops.lifts_total = Some(total);
    } else if let Some(caps) = LIFT_FRACTION.captures(&text) {
        ops.lifts_open = caps[1].parse().ok();
        ops.lifts_total = caps[2].parse().ok();
    }

    // === TRAILS ===
    if let Some(caps) = TRAIL_FRACTION.captures(&text) {
        ops.trails_open = caps[1].parse().ok();
        ops.trails_total = caps[2].parse().ok();
    }

    // === SNOW DATA ===
    snow.new_snow_24h_in = find_value(&SNOW_24H, &text);
    snow.season_total_in = find_value(&SEASON_TOTAL, &text);
    // 7-day total is the closest thing the page has to a 48h number
    snow.new_snow_48h_in = SEVEN_DAY
        .captures(&text)
        .and_then(|caps| caps[1].parse().ok());
    snow.base_depth_in = find_value(&BASE_DEPTH, &text);

    // === OPEN STATUS ===
    let lifts_active = ops.lifts_open.unwrap_or(0) + ops.lifts_scheduled.unwrap_or(0);
    ops.open_flag = if text.to_lowercase().contains("mountain status open") {
        Some(true)
    } else if lifts_active > 0 {
        Some(true)
    } else if ops.lifts_open.is_some() || ops.lifts_scheduled.is_some() {
        Some(false)
    } else {
        None
    };

    Ok(ParseOutcome { ops, snow })
}

fn find_value(patterns: &[Regex], text: &str) -> Option<f64> {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Ok(value) = caps[1].parse() {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction_page() {
        let html = r#"
        <html>
        <body>
            <div>5 / 9 Lifts Open</div>
            <div>93 / 105 Trails Open</div>
            <div>0" 24 Hr</div>
            <div>66" 7 Day</div>
            <div>99" Year to Date</div>
            <div>Summit: 47"</div>
            <div>Mountain Status Open</div>
        </body>
        </html>
        "#;

        let outcome = parse(html).unwrap();
        assert_eq!(outcome.ops.lifts_open, Some(5));
        assert_eq!(outcome.ops.lifts_total, Some(9));
        assert_eq!(outcome.ops.trails_open, Some(93));
        assert_eq!(outcome.ops.trails_total, Some(105));
        assert_eq!(outcome.ops.open_flag, Some(true));
        assert_eq!(outcome.snow.new_snow_24h_in, Some(0.0));
        assert_eq!(outcome.snow.new_snow_48h_in, Some(66.0));
        assert_eq!(outcome.snow.season_total_in, Some(99.0));
        assert_eq!(outcome.snow.base_depth_in, Some(47.0));
    }

    #[test]
    fn test_parse_named_lift_statuses() {
        let html = r#"
        <html><body>
            <ul>
                <li>Mt. Judah Express Open</li>
                <li>Jerome Hill Express Scheduled</li>
                <li>Mt. Lincoln Express Closed</li>
                <li>Nob Hill Closed</li>
            </ul>
        </body></html>
        "#;

        let outcome = parse(html).unwrap();
        assert_eq!(outcome.ops.lifts_open, Some(1));
        assert_eq!(outcome.ops.lifts_scheduled, Some(1));
        assert_eq!(outcome.ops.lifts_total, Some(4));
        // one open plus one scheduled means skiable today
        assert_eq!(outcome.ops.open_flag, Some(true));
    }

    #[test]
    fn test_parse_everything_closed() {
        let html = r#"
        <html><body>
            <li>Mt. Judah Express Closed</li>
            <li>Nob Hill Closed</li>
        </body></html>
        "#;

        let outcome = parse(html).unwrap();
        assert_eq!(outcome.ops.lifts_open, Some(0));
        assert_eq!(outcome.ops.open_flag, Some(false));
    }
}
