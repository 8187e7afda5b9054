//! Data models for the resort conditions contract.
//!
//! This module defines the structures shared across the pipeline:
//! - [`ResortConfig`]: one entry of the `resorts.yaml` registry
//! - [`ResortConditions`]: the complete per-resort record written to disk
//! - Nested sections: [`Sources`], [`Operations`], [`Snow`], [`Weather`]
//! - Aggregates: [`LatestFeed`] and [`Summary`]
//!
//! Every field of a record other than `slug`, `name`, and `fetched_at_utc`
//! is optional and independently nullable: a value the source did not
//! publish (or we could not parse) is `null` in the JSON output, never a
//! fabricated zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::adapters::AdapterKind;

/// Configuration for a single resort, loaded from `resorts.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResortConfig {
    /// Unique key, used for per-resort output filenames.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Which parsing strategy handles this resort's page.
    pub kind: AdapterKind,
    /// Conditions page (or feed) to fetch.
    pub source_url: String,
    /// Latitude, for the weather lookup.
    pub lat: f64,
    /// Longitude, for the weather lookup.
    pub lon: f64,
    /// Disabled resorts are skipped entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Free-form operator note, carried through from the registry.
    #[serde(default)]
    pub note: Option<String>,
}

fn default_true() -> bool {
    true
}

/// URLs that were used (or would have been used) to build a record.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Sources {
    pub ops_url: String,
    pub weather_points_url: Option<String>,
    pub weather_forecast_url: Option<String>,
}

/// Lift and trail operations status.
///
/// `lifts_scheduled` / `trails_scheduled` count terrain that is planned to
/// open later today; summaries treat scheduled as available.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Operations {
    pub open_flag: Option<bool>,
    pub lifts_open: Option<u32>,
    pub lifts_scheduled: Option<u32>,
    pub lifts_total: Option<u32>,
    pub trails_open: Option<u32>,
    pub trails_scheduled: Option<u32>,
    pub trails_total: Option<u32>,
}

/// Snow conditions in inches.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Snow {
    pub new_snow_24h_in: Option<f64>,
    pub new_snow_48h_in: Option<f64>,
    pub base_depth_in: Option<f64>,
    pub season_total_in: Option<f64>,
    /// Surface description, e.g. "Packed Powder".
    pub surface: Option<String>,
    /// When the resort says its own report was last updated.
    pub report_updated_at: Option<DateTime<Utc>>,
}

/// Current weather extracted from the NWS forecast.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Weather {
    pub temp_f: Option<f64>,
    pub wind_mph: Option<f64>,
    pub wind_gust_mph: Option<f64>,
    pub short_forecast: Option<String>,
    pub forecast_period_name: Option<String>,
}

/// Complete per-resort record, one per resort per run.
///
/// # Staleness
///
/// `stale` is `true` exactly when this cycle's fetch or parse failed and
/// the ops/snow sections were substituted from the previous output file
/// (or nulled when no previous file existed). On substitution
/// `fetched_at_utc` is preserved from the previous record so consumers can
/// see the true age of the data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResortConditions {
    pub slug: String,
    pub name: String,
    pub fetched_at_utc: DateTime<Utc>,
    #[serde(default)]
    pub stale: bool,
    pub sources: Sources,
    #[serde(default)]
    pub ops: Operations,
    #[serde(default)]
    pub snow: Snow,
    #[serde(default)]
    pub weather: Weather,
}

/// Payload of `latest.json`: every record from the run plus a generation
/// timestamp.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LatestFeed {
    pub generated_at_utc: DateTime<Utc>,
    pub resorts: Vec<ResortConditions>,
}

/// Resort counts bucketed by status.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SummaryCounts {
    pub open_resorts: u32,
    pub closed_resorts: u32,
    pub stale_resorts: u32,
}

/// Payload of `summary.json`: derived highlights and per-resort blurbs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Summary {
    pub last_updated_utc: DateTime<Utc>,
    #[serde(default)]
    pub counts: SummaryCounts,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub blurbs: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(slug: &str) -> ResortConditions {
        ResortConditions {
            slug: slug.to_string(),
            name: "Test Resort".to_string(),
            fetched_at_utc: Utc.with_ymd_and_hms(2026, 1, 15, 14, 30, 0).unwrap(),
            stale: false,
            sources: Sources {
                ops_url: "https://example.com/conditions".to_string(),
                weather_points_url: None,
                weather_forecast_url: None,
            },
            ops: Operations::default(),
            snow: Snow::default(),
            weather: Weather::default(),
        }
    }

    #[test]
    fn test_unknown_fields_serialize_as_null() {
        let json = serde_json::to_value(record("mt-rose")).unwrap();
        assert_eq!(json["slug"], "mt-rose");
        assert!(json["ops"]["lifts_open"].is_null());
        assert!(json["snow"]["base_depth_in"].is_null());
        assert!(json["weather"]["temp_f"].is_null());
        assert!(json["sources"]["weather_points_url"].is_null());
    }

    #[test]
    fn test_record_roundtrip() {
        let mut rec = record("diamond-peak");
        rec.ops.lifts_open = Some(3);
        rec.ops.lifts_total = Some(6);
        rec.snow.base_depth_in = Some(40.0);

        let json = serde_json::to_string(&rec).unwrap();
        let back: ResortConditions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.slug, "diamond-peak");
        assert_eq!(back.ops.lifts_open, Some(3));
        assert_eq!(back.snow.base_depth_in, Some(40.0));
        assert!(!back.stale);
    }

    #[test]
    fn test_record_deserializes_with_missing_sections() {
        // Older output files may predate some sections; missing ones
        // default to all-null rather than failing the fallback load.
        let json = r#"{
            "slug": "homewood",
            "name": "Homewood",
            "fetched_at_utc": "2026-01-15T14:30:00Z",
            "sources": {"ops_url": "https://example.com"}
        }"#;

        let rec: ResortConditions = serde_json::from_str(json).unwrap();
        assert_eq!(rec.slug, "homewood");
        assert!(!rec.stale);
        assert!(rec.ops.lifts_open.is_none());
        assert!(rec.weather.short_forecast.is_none());
    }

    #[test]
    fn test_resort_config_enabled_defaults_true() {
        let yaml = r#"
slug: mt-rose
name: Mt Rose Ski Tahoe
kind: mt_rose
source_url: https://skirose.com/the-mountain/
lat: 39.314
lon: -119.886
"#;
        let cfg: ResortConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.kind, AdapterKind::MtRose);
        assert!(cfg.note.is_none());
    }

    #[test]
    fn test_summary_serialization() {
        let summary = Summary {
            last_updated_utc: Utc.with_ymd_and_hms(2026, 1, 15, 14, 30, 0).unwrap(),
            counts: SummaryCounts {
                open_resorts: 4,
                closed_resorts: 1,
                stale_resorts: 2,
            },
            highlights: vec!["Most new snow: Mt Rose (8\" in 24h)".to_string()],
            blurbs: BTreeMap::new(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["counts"]["open_resorts"], 4);
        assert_eq!(json["highlights"][0], "Most new snow: Mt Rose (8\" in 24h)");
    }
}
