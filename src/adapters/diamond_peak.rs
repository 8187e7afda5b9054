//! Adapter for Diamond Peak.
//!
//! The page uses structured HTML with CSS classes:
//! - `conditions__row--header` rows carry lifts
//! - `conditions__row--open` / `conditions__row--groomed` mark open items
//! - `conditions__row--closed` marks closed items
//! - `conditions__label` / `conditions__status` hold the text

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{ParseError, ParseOutcome};
use crate::models::{Operations, Snow};
use crate::utils::{clean_text, visible_text};

static SNOW_24H: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)(\d+)\s*(?:Inches?|")\s*24\s*H"#,
        r#"(?i)24\s*H(?:our)?s?[:\s]*(\d+)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static OVERNIGHT: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)(\d+)\s*(?:Inches?|")\s*overnight"#,
        r#"(?i)overnight[:\s]*(\d+)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BASE_DEPTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)base[:\s]*(\d+)\s*(?:Inches?|")"#).unwrap());
static PEAK_DEPTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)peak[:\s]*(\d+)\s*(?:Inches?|")"#).unwrap());
static SEASON_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)season[:\s]*(\d+)\s*(?:Inches?|")"#).unwrap());

static STORM_TOTAL: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)storm\s*(?:total)?[:\s]*(\d+)\s*(?:Inches?|")"#,
        r#"(?i)(\d+)\s*(?:Inches?|")\s*storm\s*(?:total)?"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub fn parse(html: &str) -> Result<ParseOutcome, ParseError> {
    let document = Html::parse_document(html);
    let text = visible_text(html);

    let mut ops = Operations::default();
    let mut snow = Snow::default();

    // === LIFTS ===
    let header_selector = Selector::parse(".conditions__row--header").unwrap();
    let label_selector = Selector::parse(".conditions__label").unwrap();
    let status_selector = Selector::parse(".conditions__status").unwrap();

    let mut lifts_open = 0u32;
    let mut lifts_total = 0u32;
    for row in document.select(&header_selector) {
        let label = row.select(&label_selector).next().map(element_text);
        let status = row.select(&status_selector).next().map(element_text);
        if let (Some(label), Some(status)) = (label, status) {
            if ["Lift", "Chair", "Powerline", "Express"]
                .iter()
                .any(|word| label.contains(word))
            {
                lifts_total += 1;
                let status = status.to_lowercase();
                if status == "open" || status == "groomed" {
                    lifts_open += 1;
                }
            }
        }
    }
    if lifts_total > 0 {
        ops.lifts_open = Some(lifts_open);
        ops.lifts_total = Some(lifts_total);
    }

    // === TRAILS ===
    let trail_selector =
        Selector::parse(".conditions__row--open, .conditions__row--groomed, .conditions__row--closed")
            .unwrap();

    let mut trails_open = 0u32;
    let mut trails_total = 0u32;
    for row in document.select(&trail_selector) {
        let classes: Vec<&str> = row.value().classes().collect();
        if classes.contains(&"conditions__row--header") {
            continue;
        }
        // Terrain park items live under "Village"
        if let Some(label) = row.select(&label_selector).next() {
            if element_text(label).contains("Village") {
                continue;
            }
        }
        trails_total += 1;
        if classes.contains(&"conditions__row--open") || classes.contains(&"conditions__row--groomed")
        {
            trails_open += 1;
        }
    }
    if trails_total > 0 {
        ops.trails_open = Some(trails_open);
        ops.trails_total = Some(trails_total);
    }

    // === SNOW DATA ===
    snow.new_snow_24h_in = find_value(&SNOW_24H, &text).or_else(|| find_value(&OVERNIGHT, &text));
    snow.base_depth_in = BASE_DEPTH
        .captures(&text)
        .or_else(|| PEAK_DEPTH.captures(&text))
        .and_then(|caps| caps[1].parse().ok());
    snow.season_total_in = SEASON_TOTAL
        .captures(&text)
        .and_then(|caps| caps[1].parse().ok());
    snow.new_snow_48h_in = find_value(&STORM_TOTAL, &text);

    // === OPEN STATUS ===
    let text_lower = text.to_lowercase();
    ops.open_flag = match ops.lifts_open {
        Some(n) => Some(n > 0),
        None if text_lower.contains("mountain closed") || text_lower.contains("closed for season") => {
            Some(false)
        }
        None if text_lower.contains("open") => Some(true),
        None => None,
    };

    Ok(ParseOutcome { ops, snow })
}

fn element_text(el: ElementRef) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
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
    fn test_parse_snow_report() {
        let html = r#"
        <html>
        <body>
            <strong>0</strong> Inches overnight
            <strong>5</strong> Inches 24 hour
            <strong>34</strong> Inches storm total
            Base: <strong>16</strong> Inches
            Season: <strong>66</strong> Inches
        </body>
        </html>
        "#;

        let outcome = parse(html).unwrap();
        // the explicit 24 hour value wins over overnight
        assert_eq!(outcome.snow.new_snow_24h_in, Some(5.0));
        assert_eq!(outcome.snow.new_snow_48h_in, Some(34.0));
        assert_eq!(outcome.snow.base_depth_in, Some(16.0));
        assert_eq!(outcome.snow.season_total_in, Some(66.0));
    }

    #[test]
    fn test_parse_lift_and_trail_rows() {
        let html = r#"
        <html>
        <body>
            <div class="conditions__row--header">
                <span class="conditions__label">Crystal Express Lift</span>
                <span class="conditions__status">Open</span>
            </div>
            <div class="conditions__row--header">
                <span class="conditions__label">Red Fox Chair</span>
                <span class="conditions__status">Closed</span>
            </div>
            <div class="conditions__row--open">
                <span class="conditions__label">Sunnyside</span>
            </div>
            <div class="conditions__row--groomed">
                <span class="conditions__label">Penguin</span>
            </div>
            <div class="conditions__row--closed">
                <span class="conditions__label">The Great Flume</span>
            </div>
            <div class="conditions__row--open">
                <span class="conditions__label">Village Terrain Park</span>
            </div>
        </body>
        </html>
        "#;

        let outcome = parse(html).unwrap();
        assert_eq!(outcome.ops.lifts_open, Some(1));
        assert_eq!(outcome.ops.lifts_total, Some(2));
        assert_eq!(outcome.ops.open_flag, Some(true));
        // Village terrain park rows are excluded
        assert_eq!(outcome.ops.trails_open, Some(2));
        assert_eq!(outcome.ops.trails_total, Some(3));
    }

    #[test]
    fn test_parse_closed_for_season() {
        let html = "<html><body><p>Mountain closed for the season. See you in December!</p></body></html>";
        let outcome = parse(html).unwrap();
        assert_eq!(outcome.ops.open_flag, Some(false));
        assert!(outcome.ops.lifts_open.is_none());
    }
}
