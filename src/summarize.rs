//! Rule-based summarization of resort conditions.
//!
//! Produces the `summary.json` payload: per-resort blurb sentences,
//! cross-resort highlights, and open/closed/stale counts. Lifts and
//! trails that are scheduled to open count as available.

use chrono::Utc;
use std::collections::BTreeMap;

use crate::models::{ResortConditions, Summary, SummaryCounts};

/// Generate a short human-readable blurb for one resort.
pub fn generate_blurb(resort: &ResortConditions) -> String {
    if resort.stale {
        return format!(
            "Latest update unavailable; showing last known conditions from {} UTC.",
            resort.fetched_at_utc.format("%Y-%m-%d %H:%M")
        );
    }

    let mut parts = vec![format!("{}:", resort.name)];

    let ops = &resort.ops;
    let lifts_available = ops.lifts_open.unwrap_or(0) + ops.lifts_scheduled.unwrap_or(0);
    let trails_available = ops.trails_open.unwrap_or(0) + ops.trails_scheduled.unwrap_or(0);

    if let Some(lifts_total) = ops.lifts_total {
        parts.push(format!("{lifts_available}/{lifts_total} lifts"));
    }
    if let Some(trails_total) = ops.trails_total {
        parts.push(format!("{trails_available}/{trails_total} trails."));
    } else if ops.lifts_total.is_some() {
        if let Some(last) = parts.last_mut() {
            last.push('.');
        }
    }

    let snow = &resort.snow;
    if let Some(new_snow) = snow.new_snow_24h_in {
        parts.push(format!("New snow (24h): {new_snow:.0}\"."));
    } else if let Some(base) = snow.base_depth_in {
        parts.push(format!("Base: {base:.0}\"."));
    }

    let weather = &resort.weather;
    let mut weather_parts = Vec::new();
    if let Some(forecast) = &weather.short_forecast {
        weather_parts.push(forecast.clone());
    }
    if let Some(temp) = weather.temp_f {
        weather_parts.push(format!("{temp:.0}°F"));
    }
    if let Some(wind) = weather.wind_mph {
        weather_parts.push(format!("wind {wind:.0} mph"));
    }
    if !weather_parts.is_empty() {
        parts.push(format!("Forecast: {}.", weather_parts.join(", ")));
    }

    parts.join(" ")
}

/// Compute cross-resort highlight statements.
pub fn compute_highlights(resorts: &[ResortConditions]) -> Vec<String> {
    let mut highlights = Vec::new();

    let active: Vec<&ResortConditions> = resorts
        .iter()
        .filter(|r| !r.stale && r.ops.open_flag == Some(true))
        .collect();

    if active.is_empty() {
        return vec!["All resorts are currently closed or unavailable.".to_string()];
    }

    // Most open terrain, by trails-open ratio
    let best_terrain = active
        .iter()
        .filter_map(|r| match (r.ops.trails_open, r.ops.trails_total) {
            (Some(open), Some(total)) if open > 0 && total > 0 => {
                Some((*r, open, total, open as f64 / total as f64))
            }
            _ => None,
        })
        .max_by(|a, b| a.3.total_cmp(&b.3));
    if let Some((resort, open, total, ratio)) = best_terrain {
        highlights.push(format!(
            "Most open terrain: {} ({open}/{total} trails, {:.0}%)",
            resort.name,
            ratio * 100.0
        ));
    }

    // Most new snow in the last 24 hours
    let most_snow = active
        .iter()
        .filter_map(|r| r.snow.new_snow_24h_in.filter(|s| *s > 0.0).map(|s| (*r, s)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((resort, snow)) = most_snow {
        highlights.push(format!(
            "Most new snow: {} ({snow:.0}\" in 24h)",
            resort.name
        ));
    }

    // Windiest, when notably windy
    let windiest = active
        .iter()
        .filter_map(|r| r.weather.wind_mph.map(|w| (*r, w)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((resort, wind)) = windiest {
        if wind >= 15.0 {
            highlights.push(format!("Windiest: {} ({wind:.0} mph)", resort.name));
        }
    }

    // Coldest, when at or below freezing
    let coldest = active
        .iter()
        .filter_map(|r| r.weather.temp_f.map(|t| (*r, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((resort, temp)) = coldest {
        if temp <= 32.0 {
            highlights.push(format!("Coldest: {} ({temp:.0}°F)", resort.name));
        }
    }

    highlights
}

/// Generate the complete summary for a run.
pub fn generate_summary(resorts: &[ResortConditions]) -> Summary {
    let mut counts = SummaryCounts::default();
    let mut blurbs = BTreeMap::new();

    for resort in resorts {
        blurbs.insert(resort.slug.clone(), generate_blurb(resort));

        if resort.stale {
            counts.stale_resorts += 1;
        } else if resort.ops.open_flag == Some(true) {
            counts.open_resorts += 1;
        } else {
            counts.closed_resorts += 1;
        }
    }

    Summary {
        last_updated_utc: Utc::now(),
        counts,
        highlights: compute_highlights(resorts),
        blurbs,
    }
}
