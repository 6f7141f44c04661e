//! Third-party proxy endpoints: currency exchange rate and local weather.
//!
//! Both endpoints fetch an upstream HTTP API, validate that the expected
//! fields are present, and shape the result for display. Upstream failures
//! (network, non-2xx, missing fields) map to 502; the raw upstream body is
//! never forwarded. Responses carry `Cache-Control` directives so CDN-layer
//! caches can serve stale data while revalidating.

use axum::{
    extract::State,
    http::{header, HeaderName},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::error::ApiError;
use crate::AppState;

/// Exchange rates move slowly; cache for an hour
const EXCHANGE_RATE_TTL_SECS: u64 = 3600;

/// Weather changes faster; cache for ten minutes
const WEATHER_TTL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("upstream response missing field: {0}")]
    MissingField(&'static str),
}

/// Success envelope shared by both proxies
#[derive(Debug, Serialize)]
pub struct ProxyResponse<T> {
    pub success: bool,
    pub data: T,
}

fn cache_control(ttl_secs: u64) -> (HeaderName, String) {
    (
        header::CACHE_CONTROL,
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            ttl_secs,
            ttl_secs / 2
        ),
    )
}

// -------------------------------------------------------------------------
// Exchange rate
// -------------------------------------------------------------------------

/// Subset of the exchange-rate provider's response we rely on
#[derive(Debug, Deserialize)]
struct ExchangeRateUpstream {
    rates: Option<HashMap<String, f64>>,
    time_last_update_utc: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateData {
    /// Base-to-target rate, rounded to the nearest whole unit for display
    pub rate: i64,
    pub last_updated: String,
}

fn shape_exchange_rate(
    upstream: ExchangeRateUpstream,
    target_currency: &str,
) -> Result<ExchangeRateData, UpstreamError> {
    let rate = upstream
        .rates
        .as_ref()
        .and_then(|rates| rates.get(target_currency))
        .copied()
        .ok_or(UpstreamError::MissingField("rates"))?;

    Ok(ExchangeRateData {
        rate: rate.round() as i64,
        last_updated: upstream
            .time_last_update_utc
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    })
}

/// Current base-to-target exchange rate
///
/// GET /api/exchange-rate
pub async fn exchange_rate(
    State(state): State<Arc<AppState>>,
) -> Result<([(HeaderName, String); 1], Json<ProxyResponse<ExchangeRateData>>), ApiError> {
    let upstream = &state.config.upstream;
    let url = format!(
        "{}/{}",
        upstream.exchange_rate_url.trim_end_matches('/'),
        upstream.base_currency
    );

    let data = fetch_json::<ExchangeRateUpstream>(&state.http, &url)
        .await
        .and_then(|body| shape_exchange_rate(body, &upstream.target_currency))
        .map_err(|e| {
            tracing::warn!("Exchange rate fetch failed: {}", e);
            ApiError::upstream("Exchange rate service unavailable")
        })?;

    Ok((
        [cache_control(EXCHANGE_RATE_TTL_SECS)],
        Json(ProxyResponse {
            success: true,
            data,
        }),
    ))
}

// -------------------------------------------------------------------------
// Weather
// -------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WeatherUpstream {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    weather_code: Option<i64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Temperature in whole degrees Celsius
    pub temp: i64,
    /// WMO weather interpretation code
    pub weather_code: i64,
    pub humidity: i64,
    /// Wind speed in whole km/h
    pub wind_speed: i64,
}

fn shape_weather(upstream: WeatherUpstream) -> Result<WeatherData, UpstreamError> {
    let current = upstream
        .current
        .ok_or(UpstreamError::MissingField("current"))?;

    let temp = current
        .temperature_2m
        .ok_or(UpstreamError::MissingField("temperature_2m"))?;
    let weather_code = current
        .weather_code
        .ok_or(UpstreamError::MissingField("weather_code"))?;
    let humidity = current
        .relative_humidity_2m
        .ok_or(UpstreamError::MissingField("relative_humidity_2m"))?;
    let wind_speed = current
        .wind_speed_10m
        .ok_or(UpstreamError::MissingField("wind_speed_10m"))?;

    Ok(WeatherData {
        temp: temp.round() as i64,
        weather_code,
        humidity: humidity.round() as i64,
        wind_speed: wind_speed.round() as i64,
    })
}

/// Current weather at the configured market location
///
/// GET /api/weather
pub async fn weather(
    State(state): State<Arc<AppState>>,
) -> Result<([(HeaderName, String); 1], Json<ProxyResponse<WeatherData>>), ApiError> {
    let upstream = &state.config.upstream;
    let url = format!(
        "{}?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m",
        upstream.weather_url.trim_end_matches('?'),
        upstream.latitude,
        upstream.longitude
    );

    let data = fetch_json::<WeatherUpstream>(&state.http, &url)
        .await
        .and_then(shape_weather)
        .map_err(|e| {
            tracing::warn!("Weather fetch failed: {}", e);
            ApiError::upstream("Weather service unavailable")
        })?;

    Ok((
        [cache_control(WEATHER_TTL_SECS)],
        Json(ProxyResponse {
            success: true,
            data,
        }),
    ))
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, UpstreamError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(UpstreamError::Status(response.status().as_u16()));
    }

    Ok(response.json::<T>().await?)
}
