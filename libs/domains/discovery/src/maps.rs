//! Distance matrix and geocoding against the Google Maps web services.

use async_trait::async_trait;
use domain_users::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::MapsConfig;
use crate::error::{DiscoveryError, DiscoveryResult};

/// Destinations accepted per distance matrix request
pub const MAX_DESTINATIONS: usize = 25;

/// One origin/destination cell of a distance matrix
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixElement {
    pub status: String,
    pub distance_meters: Option<u64>,
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelEstimate {
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl MatrixElement {
    /// Distance and duration, when the cell was routable
    pub fn estimate(&self) -> Option<TravelEstimate> {
        if self.status != "OK" {
            return None;
        }
        Some(TravelEstimate {
            distance_meters: self.distance_meters?,
            duration_seconds: self.duration_seconds?,
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DistanceMatrix: Send + Sync {
    /// Travel from `origin` to each destination, in destination order.
    ///
    /// At most [`MAX_DESTINATIONS`] destinations per call.
    async fn distances(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> DiscoveryResult<Vec<MatrixElement>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinate of the best match for a free-text place name
    async fn geocode(&self, address: &str) -> DiscoveryResult<Coordinate>;

    /// Formatted address of the best match for a coordinate
    async fn reverse_geocode(&self, location: Coordinate) -> DiscoveryResult<String>;
}

#[derive(Debug, Deserialize)]
struct MatrixReply {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    status: String,
    distance: Option<ValueField>,
    duration: Option<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct GeocodeReply {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLngField,
}

#[derive(Debug, Deserialize)]
struct LatLngField {
    lat: f64,
    lng: f64,
}

fn format_coordinate(c: Coordinate) -> String {
    format!("{},{}", c.latitude, c.longitude)
}

/// Google Maps implementation of [`DistanceMatrix`] and [`Geocoder`]
pub struct GoogleMapsClient {
    client: Client,
    config: MapsConfig,
}

impl GoogleMapsClient {
    pub fn new(config: MapsConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> DiscoveryResult<T> {
        let url = format!("{}/{}", self.config.base_url, path);
        debug!(%url, "Calling maps API");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DiscoveryError::Upstream(format!(
                "Maps API {} returned {}",
                path,
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            DiscoveryError::Upstream(format!(
                "Malformed reply from maps API {}: {}",
                path,
                e.without_url()
            ))
        })
    }
}

#[async_trait]
impl DistanceMatrix for GoogleMapsClient {
    async fn distances(
        &self,
        origin: Coordinate,
        destinations: &[Coordinate],
    ) -> DiscoveryResult<Vec<MatrixElement>> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }
        if destinations.len() > MAX_DESTINATIONS {
            return Err(DiscoveryError::Validation(format!(
                "At most {} destinations per request, got {}",
                MAX_DESTINATIONS,
                destinations.len()
            )));
        }

        let joined = destinations
            .iter()
            .map(|d| format_coordinate(*d))
            .collect::<Vec<_>>()
            .join("|");
        let params = [
            ("origins", format_coordinate(origin)),
            ("destinations", joined),
            ("units", "metric".to_string()),
        ];

        let reply: MatrixReply = self.get("distancematrix/json", &params).await?;
        if reply.status != "OK" {
            return Err(DiscoveryError::Upstream(format!(
                "Distance matrix status {}: {}",
                reply.status,
                reply.error_message.unwrap_or_default()
            )));
        }

        let elements = reply
            .rows
            .into_iter()
            .next()
            .map(|row| row.elements)
            .unwrap_or_default();

        if elements.len() != destinations.len() {
            return Err(DiscoveryError::Upstream(format!(
                "Distance matrix returned {} elements for {} destinations",
                elements.len(),
                destinations.len()
            )));
        }

        Ok(elements
            .into_iter()
            .map(|e| MatrixElement {
                status: e.status,
                distance_meters: e.distance.map(|d| d.value),
                duration_seconds: e.duration.map(|d| d.value),
            })
            .collect())
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> DiscoveryResult<Coordinate> {
        let reply: GeocodeReply = self
            .get("geocode/json", &[("address", address.to_string())])
            .await?;

        match reply.status.as_str() {
            "OK" => reply
                .results
                .into_iter()
                .next()
                .map(|r| Coordinate::new(r.geometry.location.lat, r.geometry.location.lng))
                .ok_or_else(|| DiscoveryError::LocationUnresolved(address.to_string())),
            "ZERO_RESULTS" => Err(DiscoveryError::LocationUnresolved(address.to_string())),
            other => Err(DiscoveryError::Upstream(format!(
                "Geocoding status {}: {}",
                other,
                reply.error_message.unwrap_or_default()
            ))),
        }
    }

    async fn reverse_geocode(&self, location: Coordinate) -> DiscoveryResult<String> {
        let reply: GeocodeReply = self
            .get("geocode/json", &[("latlng", format_coordinate(location))])
            .await?;

        match reply.status.as_str() {
            "OK" => reply
                .results
                .into_iter()
                .next()
                .map(|r| r.formatted_address)
                .ok_or_else(|| DiscoveryError::NotFound("No address for location".to_string())),
            "ZERO_RESULTS" => Err(DiscoveryError::NotFound(
                "No address for location".to_string(),
            )),
            other => Err(DiscoveryError::Upstream(format!(
                "Reverse geocoding status {}: {}",
                other,
                reply.error_message.unwrap_or_default()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, routing::get};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    async fn stub_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> GoogleMapsClient {
        GoogleMapsClient::new(MapsConfig::new("test-key").with_base_url(base_url)).unwrap()
    }

    #[test]
    fn test_element_estimate_requires_ok_status() {
        let ok = MatrixElement {
            status: "OK".to_string(),
            distance_meters: Some(1200),
            duration_seconds: Some(300),
        };
        assert_eq!(
            ok.estimate(),
            Some(TravelEstimate {
                distance_meters: 1200,
                duration_seconds: 300
            })
        );

        let unroutable = MatrixElement {
            status: "ZERO_RESULTS".to_string(),
            distance_meters: None,
            duration_seconds: None,
        };
        assert_eq!(unroutable.estimate(), None);
    }

    #[tokio::test]
    async fn test_distances_sends_pipe_joined_destinations() {
        let router = Router::new().route(
            "/distancematrix/json",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["key"], "test-key");
                assert_eq!(params["origins"], "46.5,7.5");
                assert_eq!(params["destinations"], "46,7|47,8");
                Json(json!({
                    "status": "OK",
                    "rows": [{
                        "elements": [
                            { "status": "OK", "distance": { "text": "12 km", "value": 12000 }, "duration": { "text": "15 mins", "value": 900 } },
                            { "status": "ZERO_RESULTS" }
                        ]
                    }]
                }))
            }),
        );
        let maps = client(stub_server(router).await);

        let elements = maps
            .distances(
                Coordinate::new(46.5, 7.5),
                &[Coordinate::new(46.0, 7.0), Coordinate::new(47.0, 8.0)],
            )
            .await
            .unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].distance_meters, Some(12000));
        assert_eq!(elements[0].duration_seconds, Some(900));
        assert_eq!(elements[1].estimate(), None);
    }

    #[tokio::test]
    async fn test_distances_non_ok_status_is_upstream_error() {
        let router = Router::new().route(
            "/distancematrix/json",
            get(|| async {
                Json(json!({ "status": "REQUEST_DENIED", "error_message": "bad key", "rows": [] }))
            }),
        );
        let maps = client(stub_server(router).await);

        let result = maps
            .distances(Coordinate::new(0.0, 0.0), &[Coordinate::new(1.0, 1.0)])
            .await;

        assert!(matches!(result, Err(DiscoveryError::Upstream(msg)) if msg.contains("REQUEST_DENIED")));
    }

    #[tokio::test]
    async fn test_distances_rejects_oversized_batch() {
        let maps = client("http://127.0.0.1:9".to_string());
        let destinations = vec![Coordinate::new(0.0, 0.0); MAX_DESTINATIONS + 1];

        let result = maps.distances(Coordinate::new(0.0, 0.0), &destinations).await;
        assert!(matches!(result, Err(DiscoveryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_geocode_and_reverse() {
        let router = Router::new().route(
            "/geocode/json",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let reply: Value = match (params.get("address"), params.get("latlng")) {
                    (Some(address), _) if address == "Nowhere" => {
                        json!({ "status": "ZERO_RESULTS", "results": [] })
                    }
                    (Some(_), _) => json!({
                        "status": "OK",
                        "results": [{
                            "formatted_address": "Zermatt, Switzerland",
                            "geometry": { "location": { "lat": 46.02, "lng": 7.75 } }
                        }]
                    }),
                    (None, Some(latlng)) => {
                        assert_eq!(latlng, "46.02,7.75");
                        json!({
                            "status": "OK",
                            "results": [{
                                "formatted_address": "3920 Zermatt, Switzerland",
                                "geometry": { "location": { "lat": 46.02, "lng": 7.75 } }
                            }]
                        })
                    }
                    _ => json!({ "status": "INVALID_REQUEST" }),
                };
                Json(reply)
            }),
        );
        let maps = client(stub_server(router).await);

        let coordinate = maps.geocode("Zermatt").await.unwrap();
        assert_eq!(coordinate, Coordinate::new(46.02, 7.75));

        let missing = maps.geocode("Nowhere").await;
        assert!(matches!(missing, Err(DiscoveryError::LocationUnresolved(name)) if name == "Nowhere"));

        let address = maps.reverse_geocode(coordinate).await.unwrap();
        assert_eq!(address, "3920 Zermatt, Switzerland");
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let maps = GoogleMapsClient::new(
            MapsConfig::new("secret-maps-key").with_base_url("http://127.0.0.1:1"),
        )
        .unwrap();

        let err = maps.geocode("Zermatt").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Upstream(_)));
        assert!(!err.to_string().contains("secret-maps-key"));

        let err = maps
            .distances(Coordinate::new(0.0, 0.0), &[Coordinate::new(1.0, 1.0)])
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("secret-maps-key"));
    }

    #[tokio::test]
    async fn test_malformed_reply_does_not_expose_api_key() {
        let router = Router::new().route("/geocode/json", get(|| async { "not json" }));
        let maps = GoogleMapsClient::new(
            MapsConfig::new("secret-maps-key").with_base_url(stub_server(router).await),
        )
        .unwrap();

        let err = maps.geocode("Zermatt").await.unwrap_err();
        assert!(matches!(&err, DiscoveryError::Upstream(msg) if msg.contains("Malformed reply")));
        assert!(!err.to_string().contains("secret-maps-key"));
    }
}
