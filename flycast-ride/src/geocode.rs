use std::time::Duration;

use serde::Deserialize;

use flycast_core::ride::{GeoPoint, ProviderError};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Keyed client for the Google Geocoding API. Optional: without a maps key
/// the address path is unavailable and only direct-distance trips resolve.
pub struct MapsGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

impl MapsGeocoder {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    pub async fn geocode(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Http(format!(
                "geocoding API returned {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        if body.status != "OK" {
            return Err(ProviderError::Geocoding(format!(
                "geocoding status {} for '{address}'",
                body.status
            )));
        }

        body.results
            .first()
            .map(|r| GeoPoint { lat: r.geometry.location.lat, lng: r.geometry.location.lng })
            .ok_or_else(|| ProviderError::Geocoding(format!("no geocoding result for '{address}'")))
    }
}

/// Great-circle distance in statute miles.
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_MILES: f64 = 3958.8;

    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}
