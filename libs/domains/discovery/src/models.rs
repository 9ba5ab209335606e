use domain_users::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

/// A recommender hit, in the order the recommender ranked it
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub tour_id: i64,
    pub score: f64,
    pub image: Option<String>,
}

impl Candidate {
    pub fn new(tour_id: i64, score: f64) -> Self {
        Self {
            tour_id,
            score,
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// One result card: catalog fields, similarity and travel estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrichedTrek {
    pub id: i64,
    pub route_type: String,
    pub title: String,
    pub difficulty: String,
    pub image: String,
    /// Similarity reported by the recommender
    pub rating: f64,
    /// Walking time in minutes
    #[serde(rename = "durationValue")]
    pub duration_value: Option<u64>,
    /// `"H hours M minutes"` or `"N/A"`
    pub duration: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters from the user's location
    pub distance: u64,
    /// Driving seconds from the user's location
    #[serde(rename = "TimeToReach")]
    pub time_to_reach: u64,
}

/// Ranges for the client-side filter widgets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterMetadata {
    pub difficulties: Vec<String>,
    pub route_types: Vec<String>,
    /// Hours
    pub max_duration: u64,
    /// Kilometers
    pub max_distance: u64,
    /// Hours
    pub max_time_to_reach: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscoveryResponse {
    pub results: Vec<EnrichedTrek>,
    pub filters: FilterMetadata,
}

/// Sketch search input. At least one field must be non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SketchRequest {
    /// Base64-encoded PNG drawn by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sketch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub caption: Option<String>,
}

impl SketchRequest {
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().is_none_or(|v| v.trim().is_empty());
        blank(&self.sketch) && blank(&self.caption)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindQuery {
    /// Free-text hint such as a region name
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct LatLng {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

/// Either a place name to geocode or explicit coordinates
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LocationUpdate {
    Named {
        #[serde(rename = "locationName")]
        location_name: String,
    },
    Coordinates { location: LatLng },
}

impl Validate for LocationUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            // Blank names are rejected after trimming, by the service
            LocationUpdate::Named { .. } => Ok(()),
            LocationUpdate::Coordinates { location } => location.validate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationUpdated {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    /// Formatted address of the stored location
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Destination {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl From<Destination> for Coordinate {
    fn from(destination: Destination) -> Self {
        Coordinate::new(destination.latitude, destination.longitude)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DistanceRequest {
    #[validate(length(min = 1, max = 25), nested)]
    pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Measure {
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DistanceResult {
    pub destination: Destination,
    pub distance: Option<Measure>,
    pub duration: Option<Measure>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DistanceResponse {
    /// `"lat,lng"` of the user's stored location
    pub origin: String,
    pub destinations: Vec<DistanceResult>,
}

/// Quiz picks, passed through from the recommender with their embeddings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuizResponse {
    #[schema(value_type = Vec<Object>)]
    pub recommendations: Vec<Value>,
    #[serde(default)]
    pub embeddings: HashMap<i64, Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_update_variants() {
        let named: LocationUpdate =
            serde_json::from_value(json!({ "locationName": "Zermatt" })).unwrap();
        assert_eq!(
            named,
            LocationUpdate::Named {
                location_name: "Zermatt".to_string()
            }
        );

        let coords: LocationUpdate =
            serde_json::from_value(json!({ "location": { "lat": 46.0, "lng": 7.7 } })).unwrap();
        assert_eq!(
            coords,
            LocationUpdate::Coordinates {
                location: LatLng { lat: 46.0, lng: 7.7 }
            }
        );

        assert!(serde_json::from_value::<LocationUpdate>(json!({ "place": "x" })).is_err());
    }

    #[test]
    fn test_sketch_request_emptiness() {
        assert!(SketchRequest::default().is_empty());
        assert!(
            SketchRequest {
                sketch: Some(String::new()),
                caption: Some("   ".to_string()),
            }
            .is_empty()
        );
        assert!(
            !SketchRequest {
                sketch: None,
                caption: Some("lake with mountains".to_string()),
            }
            .is_empty()
        );
    }

    #[test]
    fn test_enriched_trek_wire_names() {
        let trek = EnrichedTrek {
            id: 1,
            route_type: "Loop".to_string(),
            title: "T".to_string(),
            difficulty: "medium".to_string(),
            image: String::new(),
            rating: 0.5,
            duration_value: Some(90),
            duration: "1 hours 30 minutes".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            distance: 10,
            time_to_reach: 20,
        };
        let value = serde_json::to_value(&trek).unwrap();
        assert_eq!(value["durationValue"], 90);
        assert_eq!(value["TimeToReach"], 20);

        let filters = serde_json::to_value(FilterMetadata::default()).unwrap();
        assert!(filters.get("routeTypes").is_some());
        assert!(filters.get("maxTimeToReach").is_some());
    }
}
