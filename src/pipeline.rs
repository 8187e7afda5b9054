//! Per-resort processing: fetch, parse, and merge with last-known-good.
//!
//! One resort's failure never affects another; every path through this
//! module ends in a [`ResortConditions`] record. The possible outcomes:
//!
//! - fresh fetch + parse succeed: new record, `stale = false`
//! - anything fails (kind not fetchable, network, HTTP status, parse):
//!   the previous output file is re-emitted with `stale = true` and its
//!   original `fetched_at_utc` preserved
//! - no previous file either: a skeleton record with null ops/snow and
//!   `stale = true`
//!
//! Weather is fetched in every case and attached independently; a weather
//! failure only nulls the weather fields.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::adapters::{self, ParseOutcome};
use crate::http::Fetcher;
use crate::models::{ResortConditions, ResortConfig, Sources};
use crate::outputs::json::{load_existing_resort, OutputPaths};
use crate::weather::{fetch_weather, WeatherReport};

/// How this cycle's ops/snow attempt ended.
enum OpsOutcome {
    /// Fresh data parsed this cycle.
    Fresh(ParseOutcome),
    /// Fetch or parse failed; substitute the previous record if any.
    Fallback(Option<ResortConditions>),
}

/// Process a single resort: fetch and parse its conditions page, attach
/// weather, and fall back to last-known-good on failure.
#[instrument(level = "info", skip(fetcher, paths), fields(slug = %config.slug))]
pub async fn process_resort(
    fetcher: &Fetcher,
    paths: &OutputPaths,
    config: &ResortConfig,
) -> ResortConditions {
    let now = Utc::now();

    let outcome = if !config.kind.is_fetchable() {
        info!(kind = config.kind.as_str(), "Source not fetchable; skipping network attempt");
        OpsOutcome::Fallback(load_existing_resort(paths, &config.slug).await)
    } else {
        match fetcher.page_text(&config.source_url).await {
            Ok(body) => match adapters::parse(config.kind, &body) {
                Ok(parsed) => {
                    let lifts_available = parsed.ops.lifts_open.unwrap_or(0)
                        + parsed.ops.lifts_scheduled.unwrap_or(0);
                    info!(
                        lifts_available,
                        lifts_total = ?parsed.ops.lifts_total,
                        "Parsed conditions"
                    );
                    OpsOutcome::Fresh(parsed)
                }
                Err(e) => {
                    warn!(error = %e, "Parse failed; falling back to last known good");
                    OpsOutcome::Fallback(load_existing_resort(paths, &config.slug).await)
                }
            },
            Err(e) => {
                warn!(error = %e, "Fetch failed; falling back to last known good");
                OpsOutcome::Fallback(load_existing_resort(paths, &config.slug).await)
            }
        }
    };

    let weather = fetch_weather(fetcher, config.lat, config.lon).await;

    merge_record(config, outcome, weather, now)
}

/// Assemble the final record from this cycle's ops outcome and weather.
fn merge_record(
    config: &ResortConfig,
    outcome: OpsOutcome,
    weather: WeatherReport,
    now: DateTime<Utc>,
) -> ResortConditions {
    let sources = Sources {
        ops_url: config.source_url.clone(),
        weather_points_url: Some(weather.points_url),
        weather_forecast_url: weather.forecast_url,
    };

    match outcome {
        OpsOutcome::Fresh(parsed) => ResortConditions {
            slug: config.slug.clone(),
            name: config.name.clone(),
            fetched_at_utc: now,
            stale: false,
            sources,
            ops: parsed.ops,
            snow: parsed.snow,
            weather: weather.weather,
        },
        OpsOutcome::Fallback(Some(previous)) => {
            info!(
                slug = %config.slug,
                previous_fetch = %previous.fetched_at_utc,
                "Using last known good"
            );
            ResortConditions {
                slug: config.slug.clone(),
                name: config.name.clone(),
                // keep the old timestamp: it reflects when the shown
                // ops/snow data was actually obtained
                fetched_at_utc: previous.fetched_at_utc,
                stale: true,
                sources,
                ops: previous.ops,
                snow: previous.snow,
                weather: weather.weather,
            }
        }
        OpsOutcome::Fallback(None) => ResortConditions {
            slug: config.slug.clone(),
            name: config.name.clone(),
            fetched_at_utc: now,
            stale: true,
            sources,
            ops: Default::default(),
            snow: Default::default(),
            weather: weather.weather,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::AdapterKind;
    use crate::models::{Operations, Snow, Weather};
    use crate::outputs::json::write_resort;
    use chrono::TimeZone;

    fn config(slug: &str, kind: AdapterKind) -> ResortConfig {
        ResortConfig {
            slug: slug.to_string(),
            name: "Test Resort".to_string(),
            kind,
            source_url: "https://example.com/conditions".to_string(),
            lat: 39.0,
            lon: -120.0,
            enabled: true,
            note: None,
        }
    }

    fn weather_report() -> WeatherReport {
        WeatherReport {
            weather: Weather {
                temp_f: Some(25.0),
                short_forecast: Some("Sunny".to_string()),
                ..Default::default()
            },
            points_url: "https://api.weather.gov/points/39.0,-120.0".to_string(),
            forecast_url: Some("https://api.weather.gov/gridpoints/REV/33,87/forecast".to_string()),
        }
    }

    #[test]
    fn test_fresh_parse_produces_exact_record() {
        let cfg = config("mt-rose", AdapterKind::MtRose);
        let now = Utc::now();
        let parsed = ParseOutcome {
            ops: Operations {
                open_flag: Some(true),
                lifts_open: Some(5),
                lifts_total: Some(10),
                ..Default::default()
            },
            snow: Snow::default(),
        };

        let rec = merge_record(&cfg, OpsOutcome::Fresh(parsed), weather_report(), now);

        assert_eq!(rec.slug, "mt-rose");
        assert_eq!(rec.name, "Test Resort");
        assert!(!rec.stale);
        assert_eq!(rec.fetched_at_utc, now);
        assert_eq!(rec.ops.lifts_open, Some(5));
        assert_eq!(rec.ops.lifts_total, Some(10));
        assert_eq!(rec.weather.temp_f, Some(25.0));
        assert_eq!(rec.sources.ops_url, "https://example.com/conditions");
    }

    #[test]
    fn test_fallback_preserves_previous_conditions() {
        let cfg = config("diamond-peak", AdapterKind::DiamondPeak);
        let previous_fetch = Utc.with_ymd_and_hms(2026, 1, 14, 8, 0, 0).unwrap();
        let previous = ResortConditions {
            slug: "diamond-peak".to_string(),
            name: "Diamond Peak".to_string(),
            fetched_at_utc: previous_fetch,
            stale: false,
            sources: Default::default(),
            ops: Operations {
                lifts_open: Some(4),
                lifts_total: Some(6),
                ..Default::default()
            },
            snow: Snow {
                base_depth_in: Some(40.0),
                ..Default::default()
            },
            weather: Weather::default(),
        };

        let rec = merge_record(
            &cfg,
            OpsOutcome::Fallback(Some(previous)),
            weather_report(),
            Utc::now(),
        );

        assert!(rec.stale);
        assert_eq!(rec.snow.base_depth_in, Some(40.0));
        assert_eq!(rec.ops.lifts_open, Some(4));
        // the timestamp of the substituted data is preserved
        assert_eq!(rec.fetched_at_utc, previous_fetch);
        // but weather is still this cycle's
        assert_eq!(rec.weather.temp_f, Some(25.0));
    }

    #[test]
    fn test_fallback_without_previous_is_null_skeleton() {
        let cfg = config("sugar-bowl", AdapterKind::SugarBowl);
        let now = Utc::now();

        let rec = merge_record(&cfg, OpsOutcome::Fallback(None), WeatherReport::default(), now);

        assert!(rec.stale);
        assert_eq!(rec.slug, "sugar-bowl");
        assert_eq!(rec.fetched_at_utc, now);
        assert!(rec.ops.lifts_open.is_none());
        assert!(rec.ops.open_flag.is_none());
        assert!(rec.snow.base_depth_in.is_none());
        assert!(rec.weather.temp_f.is_none());
    }

    #[test]
    fn test_weather_failure_never_suppresses_fresh_ops() {
        let cfg = config("homewood", AdapterKind::Homewood);
        let parsed = ParseOutcome {
            ops: Operations {
                lifts_open: Some(3),
                lifts_total: Some(8),
                ..Default::default()
            },
            snow: Snow::default(),
        };
        // weather lookup failed entirely: null fields, no forecast URL
        let failed_weather = WeatherReport {
            points_url: "https://api.weather.gov/points/39.086,-120.16".to_string(),
            ..Default::default()
        };

        let rec = merge_record(&cfg, OpsOutcome::Fresh(parsed), failed_weather, Utc::now());

        assert!(!rec.stale);
        assert_eq!(rec.ops.lifts_open, Some(3));
        assert!(rec.weather.temp_f.is_none());
        assert!(rec.sources.weather_forecast_url.is_none());
    }

    #[tokio::test]
    async fn test_fallback_roundtrip_through_output_files() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(tmp.path());
        let cfg = config("diamond-peak", AdapterKind::DiamondPeak);

        let previous_fetch = Utc.with_ymd_and_hms(2026, 1, 14, 8, 0, 0).unwrap();
        let mut previous = merge_record(
            &cfg,
            OpsOutcome::Fresh(ParseOutcome {
                ops: Operations::default(),
                snow: Snow {
                    base_depth_in: Some(40.0),
                    ..Default::default()
                },
            }),
            WeatherReport::default(),
            previous_fetch,
        );
        previous.stale = false;
        write_resort(&paths, &previous).await.unwrap();

        let loaded = load_existing_resort(&paths, "diamond-peak").await;
        let rec = merge_record(&cfg, OpsOutcome::Fallback(loaded), WeatherReport::default(), Utc::now());

        assert!(rec.stale);
        assert_eq!(rec.snow.base_depth_in, Some(40.0));
        assert_eq!(rec.fetched_at_utc, previous_fetch);
    }
}
