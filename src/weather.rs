//! National Weather Service integration.
//!
//! Weather is resolved in two steps: the points endpoint maps coordinates
//! to a gridded forecast URL, then the forecast's first period supplies
//! current conditions. Both responses are cached by the [`Fetcher`]'s API
//! cache. Any failure here degrades to null weather fields; it never
//! blocks the ops/snow data for the same resort.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::http::Fetcher;
use crate::models::Weather;

const NWS_POINTS_URL: &str = "https://api.weather.gov/points";

/// Weather fields plus the URLs that produced them, for the record's
/// `sources` section.
#[derive(Debug, Clone, Default)]
pub struct WeatherReport {
    pub weather: Weather,
    pub points_url: String,
    pub forecast_url: Option<String>,
}

static WIND_SPEED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:to\s*(\d+))?\s*mph").unwrap());
static WIND_GUST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)gust(?:ing|s)?\s*(?:to\s*)?(\d+)\s*mph").unwrap());

/// Fetch current weather for the given coordinates.
///
/// # Arguments
///
/// * `fetcher` - Shared fetch facade (provides the API cache)
/// * `lat` / `lon` - Resort coordinates from the registry
///
/// # Returns
///
/// A [`WeatherReport`]; on any failure the weather fields are null and
/// the URLs reflect how far the lookup got.
#[instrument(level = "info", skip(fetcher))]
pub async fn fetch_weather(fetcher: &Fetcher, lat: f64, lon: f64) -> WeatherReport {
    let points_url = format!("{NWS_POINTS_URL}/{lat},{lon}");
    fetch_weather_from(fetcher, points_url).await
}

async fn fetch_weather_from(fetcher: &Fetcher, points_url: String) -> WeatherReport {
    let mut report = WeatherReport {
        points_url: points_url.clone(),
        ..Default::default()
    };

    // Step 1: resolve the forecast URL from the points endpoint
    debug!(%points_url, "Fetching NWS points");
    let points = match fetcher.api_json(&points_url).await {
        Ok(points) => points,
        Err(e) => {
            warn!(error = %e, "Failed to fetch NWS points");
            return report;
        }
    };

    let Some(forecast_url) = points["properties"]["forecast"].as_str().map(str::to_string) else {
        warn!(%points_url, "No forecast URL in NWS points response");
        return report;
    };
    report.forecast_url = Some(forecast_url.clone());

    // Step 2: fetch the forecast itself
    debug!(%forecast_url, "Fetching NWS forecast");
    let forecast = match fetcher.api_json(&forecast_url).await {
        Ok(forecast) => forecast,
        Err(e) => {
            warn!(error = %e, "Failed to fetch NWS forecast");
            return report;
        }
    };

    let Some(current) = forecast["properties"]["periods"].get(0) else {
        warn!(%forecast_url, "No forecast periods in NWS response");
        return report;
    };

    if let Some(temp) = current["temperature"].as_f64() {
        let temp_f = match current["temperatureUnit"].as_str() {
            Some("C") => temp * 9.0 / 5.0 + 32.0,
            _ => temp,
        };
        report.weather.temp_f = Some(temp_f);
    }

    let (wind_mph, wind_gust_mph) = parse_wind(current["windSpeed"].as_str().unwrap_or(""));
    report.weather.wind_mph = wind_mph;
    report.weather.wind_gust_mph = wind_gust_mph;

    report.weather.short_forecast = current["shortForecast"].as_str().map(str::to_string);
    report.weather.forecast_period_name = current["name"].as_str().map(str::to_string);

    info!(
        temp_f = ?report.weather.temp_f,
        wind_mph = ?report.weather.wind_mph,
        "NWS weather fetched"
    );

    report
}

/// Parse a wind string like `10 mph`, `10 to 20 mph`, or
/// `10 mph gusting to 25 mph`. For a range the higher value is taken as
/// the base speed.
fn parse_wind(wind: &str) -> (Option<f64>, Option<f64>) {
    if wind.is_empty() {
        return (None, None);
    }

    let wind_mph = WIND_SPEED.captures(wind).and_then(|caps| {
        caps.get(2)
            .or_else(|| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    });

    let wind_gust_mph = WIND_GUST
        .captures(wind)
        .and_then(|caps| caps[1].parse().ok());

    (wind_mph, wind_gust_mph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn test_fetcher(cache_dir: &std::path::Path) -> Fetcher {
        Fetcher::with_ttls(
            cache_dir,
            "TestBot/0.1 (test@example.com)",
            Duration::from_secs(900),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_parse_wind_simple() {
        assert_eq!(parse_wind("10 mph"), (Some(10.0), None));
    }

    #[test]
    fn test_parse_wind_range_takes_higher() {
        assert_eq!(parse_wind("10 to 20 mph"), (Some(20.0), None));
    }

    #[test]
    fn test_parse_wind_with_gusts() {
        assert_eq!(
            parse_wind("10 mph gusting to 25 mph"),
            (Some(10.0), Some(25.0))
        );
        assert_eq!(parse_wind("15 mph gusts to 30 mph"), (Some(15.0), Some(30.0)));
    }

    #[test]
    fn test_parse_wind_empty() {
        assert_eq!(parse_wind(""), (None, None));
    }

    #[tokio::test]
    async fn test_two_step_lookup() {
        let server = MockServer::start();
        let forecast_path = "/gridpoints/REV/33,87/forecast";

        let points_mock = server.mock(|when, then| {
            when.method(GET).path("/points/39.314,-119.886");
            then.status(200).json_body(serde_json::json!({
                "properties": {"forecast": server.url(forecast_path)}
            }));
        });
        let forecast_mock = server.mock(|when, then| {
            when.method(GET).path(forecast_path);
            then.status(200).json_body(serde_json::json!({
                "properties": {"periods": [{
                    "name": "This Afternoon",
                    "temperature": 28,
                    "temperatureUnit": "F",
                    "windSpeed": "10 to 20 mph",
                    "shortForecast": "Snow Showers"
                }]}
            }));
        });

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(tmp.path());
        let points_url = server.url("/points/39.314,-119.886");

        let report = fetch_weather_from(&fetcher, points_url.clone()).await;

        points_mock.assert();
        forecast_mock.assert();
        assert_eq!(report.points_url, points_url);
        assert_eq!(report.forecast_url.as_deref(), Some(server.url(forecast_path).as_str()));
        assert_eq!(report.weather.temp_f, Some(28.0));
        assert_eq!(report.weather.wind_mph, Some(20.0));
        assert_eq!(report.weather.short_forecast.as_deref(), Some("Snow Showers"));
        assert_eq!(
            report.weather.forecast_period_name.as_deref(),
            Some("This Afternoon")
        );
    }

    #[tokio::test]
    async fn test_celsius_converts_to_fahrenheit() {
        let server = MockServer::start();
        let forecast_path = "/forecast";

        server.mock(|when, then| {
            when.method(GET).path("/points/39.0,-120.0");
            then.status(200).json_body(serde_json::json!({
                "properties": {"forecast": server.url(forecast_path)}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path(forecast_path);
            then.status(200).json_body(serde_json::json!({
                "properties": {"periods": [{
                    "name": "Tonight",
                    "temperature": -5,
                    "temperatureUnit": "C",
                    "windSpeed": "5 mph"
                }]}
            }));
        });

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(tmp.path());

        let report = fetch_weather_from(&fetcher, server.url("/points/39.0,-120.0")).await;
        assert_eq!(report.weather.temp_f, Some(23.0));
        assert!(report.weather.short_forecast.is_none());
    }

    #[tokio::test]
    async fn test_missing_forecast_url_degrades_to_nulls() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/points/39.0,-120.0");
            then.status(200).json_body(serde_json::json!({"properties": {}}));
        });

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(tmp.path());

        let report = fetch_weather_from(&fetcher, server.url("/points/39.0,-120.0")).await;
        assert!(report.forecast_url.is_none());
        assert!(report.weather.temp_f.is_none());
        assert!(report.weather.wind_mph.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_points_degrades_to_nulls() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/points/39.0,-120.0");
            then.status(200).body("not json at all");
        });

        let tmp = tempfile::tempdir().unwrap();
        let fetcher = test_fetcher(tmp.path());

        let report = fetch_weather_from(&fetcher, server.url("/points/39.0,-120.0")).await;
        assert!(report.forecast_url.is_none());
        assert!(report.weather.temp_f.is_none());
    }
}
