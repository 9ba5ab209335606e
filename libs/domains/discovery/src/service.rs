use domain_treks::{TrekRepository, TrekService};
use domain_users::{Coordinate, UserRepository, UserService};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::ImageBlocklist;
use crate::enrichment;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::maps::{DistanceMatrix, Geocoder, MAX_DESTINATIONS};
use crate::models::{
    AddressResponse, Candidate, DiscoveryResponse, DistanceRequest, DistanceResponse,
    DistanceResult, FindQuery, LocationUpdate, LocationUpdated, Measure, QuizResponse,
    SketchRequest,
};
use crate::recommender::{QuizQuery, RecommendationQuery, Recommender, StoredEmbeddings};

/// Past ratings sent along with a personalized search
pub const RATING_HISTORY_LIMIT: u64 = 50;

/// External collaborators of the discovery service
#[derive(Clone)]
pub struct DiscoveryClients {
    pub recommender: Arc<dyn Recommender>,
    pub distance_matrix: Arc<dyn DistanceMatrix>,
    pub geocoder: Arc<dyn Geocoder>,
}

/// Recommendation flows: quiz, sketch search, personalized search, distances
/// and location management
pub struct DiscoveryService<U: UserRepository, T: TrekRepository> {
    users: UserService<U>,
    treks: TrekService<T>,
    clients: DiscoveryClients,
    blocklist: Arc<ImageBlocklist>,
}

impl<U: UserRepository, T: TrekRepository> Clone for DiscoveryService<U, T> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            treks: self.treks.clone(),
            clients: self.clients.clone(),
            blocklist: Arc::clone(&self.blocklist),
        }
    }
}

impl<U: UserRepository, T: TrekRepository> DiscoveryService<U, T> {
    pub fn new(
        users: UserService<U>,
        treks: TrekService<T>,
        clients: DiscoveryClients,
        blocklist: ImageBlocklist,
    ) -> Self {
        Self {
            users,
            treks,
            clients,
            blocklist: Arc::new(blocklist),
        }
    }

    /// Next quiz picks, based on the user's rating windows
    #[instrument(skip(self))]
    pub async fn quiz(&self, user_id: Uuid) -> DiscoveryResult<QuizResponse> {
        let user = self.users.get_user(user_id).await?;

        let query = QuizQuery {
            liked_tours: user.liked_tours,
            disliked_tours: user.disliked_tours,
            include_embeddings: true,
        };
        self.clients.recommender.quiz(query).await
    }

    /// Treks whose photos resemble a drawing and/or caption
    #[instrument(skip(self, request))]
    pub async fn sketch(
        &self,
        user_id: Uuid,
        request: SketchRequest,
    ) -> DiscoveryResult<DiscoveryResponse> {
        if request.is_empty() {
            return Err(DiscoveryError::Validation(
                "Either a sketch or a caption is required".to_string(),
            ));
        }

        let origin = self.users.get_location(user_id).await?;
        let candidates = self.clients.recommender.sketch(request).await?;
        info!(candidates = candidates.len(), "Sketch search returned");

        self.enrich(candidates, origin).await
    }

    /// Personalized ranking from stored embeddings and recent ratings
    #[instrument(skip(self, query))]
    pub async fn find(&self, user_id: Uuid, query: FindQuery) -> DiscoveryResult<DiscoveryResponse> {
        let user = self.users.get_user(user_id).await?;
        let origin = user.location.ok_or(DiscoveryError::LocationNotSet)?;

        let tour_ratings = self
            .treks
            .recent_ratings(user_id, RATING_HISTORY_LIMIT)
            .await?;

        let query = RecommendationQuery {
            user_id: user_id.to_string(),
            user_query: query.location.unwrap_or_default(),
            stored_embeddings: StoredEmbeddings {
                liked: user.liked_embedding,
                disliked: user.disliked_embedding,
            },
            tour_ratings,
            disliked_tour_indices: user.disliked_tours,
        };
        let candidates = self.clients.recommender.recommend(query).await?;
        info!(candidates = candidates.len(), "Personalized search returned");

        self.enrich(candidates, origin).await
    }

    /// Travel distance and time from the stored location to each destination
    #[instrument(skip(self, request), fields(destinations = request.destinations.len()))]
    pub async fn distance(
        &self,
        user_id: Uuid,
        request: DistanceRequest,
    ) -> DiscoveryResult<DistanceResponse> {
        let count = request.destinations.len();
        if count == 0 || count > MAX_DESTINATIONS {
            return Err(DiscoveryError::Validation(format!(
                "Between 1 and {} destinations are required, got {}",
                MAX_DESTINATIONS, count
            )));
        }

        let origin = self.users.get_location(user_id).await?;
        let coordinates: Vec<Coordinate> = request
            .destinations
            .iter()
            .copied()
            .map(Coordinate::from)
            .collect();
        let elements = self
            .clients
            .distance_matrix
            .distances(origin, &coordinates)
            .await?;

        let destinations = request
            .destinations
            .into_iter()
            .zip(elements)
            .map(|(destination, element)| DistanceResult {
                destination,
                distance: element.distance_meters.map(|value| Measure { value }),
                duration: element.duration_seconds.map(|value| Measure { value }),
                status: element.status,
            })
            .collect();

        Ok(DistanceResponse {
            origin: format!("{},{}", origin.latitude, origin.longitude),
            destinations,
        })
    }

    /// Store a location given either a place name or coordinates
    #[instrument(skip(self, update))]
    pub async fn update_location(
        &self,
        user_id: Uuid,
        update: LocationUpdate,
    ) -> DiscoveryResult<LocationUpdated> {
        let location = match update {
            LocationUpdate::Named { location_name } => {
                let name = location_name.trim();
                if name.is_empty() {
                    return Err(DiscoveryError::Validation(
                        "Location name must not be empty".to_string(),
                    ));
                }
                self.clients.geocoder.geocode(name).await?
            }
            LocationUpdate::Coordinates { location } => Coordinate::new(location.lat, location.lng),
        };

        let user = self.users.set_location(user_id, location).await?;
        let stored = user.location.unwrap_or(location);

        Ok(LocationUpdated {
            latitude: stored.latitude,
            longitude: stored.longitude,
        })
    }

    /// Formatted address of the stored location
    pub async fn address(&self, user_id: Uuid) -> DiscoveryResult<AddressResponse> {
        let origin = self.users.get_location(user_id).await?;
        let location = self.clients.geocoder.reverse_geocode(origin).await?;
        Ok(AddressResponse { location })
    }

    async fn enrich(
        &self,
        candidates: Vec<Candidate>,
        origin: Coordinate,
    ) -> DiscoveryResult<DiscoveryResponse> {
        enrichment::enrich(
            candidates,
            Some(origin),
            &self.treks,
            self.clients.distance_matrix.as_ref(),
            &self.blocklist,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::{MatrixElement, MockDistanceMatrix, MockGeocoder};
    use crate::models::{Destination, LatLng};
    use crate::recommender::MockRecommender;
    use domain_treks::{CreateComment, InMemoryTrekRepository, Trek, TrekComment};
    use domain_users::{InMemoryUserRepository, User};
    use serde_json::json;

    struct Fixture {
        users: InMemoryUserRepository,
        treks: InMemoryTrekRepository,
        recommender: MockRecommender,
        distance_matrix: MockDistanceMatrix,
        geocoder: MockGeocoder,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                users: InMemoryUserRepository::new(),
                treks: InMemoryTrekRepository::with_treks([trek(1), trek(2)]),
                recommender: MockRecommender::new(),
                distance_matrix: MockDistanceMatrix::new(),
                geocoder: MockGeocoder::new(),
            }
        }

        async fn user(&self, location: Option<Coordinate>) -> User {
            let mut user = User::new(
                "hiker".to_string(),
                "Ada".to_string(),
                "Alp".to_string(),
                "hash".to_string(),
                2,
            );
            user.location = location;
            user.disliked_tours = vec![9];
            self.users.create(user).await.unwrap()
        }

        fn service(self) -> DiscoveryService<InMemoryUserRepository, InMemoryTrekRepository> {
            DiscoveryService::new(
                UserService::with_embedding_dim(self.users, 2),
                TrekService::new(self.treks),
                DiscoveryClients {
                    recommender: Arc::new(self.recommender),
                    distance_matrix: Arc::new(self.distance_matrix),
                    geocoder: Arc::new(self.geocoder),
                },
                ImageBlocklist::default(),
            )
        }
    }

    fn trek(tour_id: i64) -> Trek {
        Trek {
            tour_id,
            title: format!("Trek {}", tour_id),
            route_type: "Loop".to_string(),
            difficulty: Some("easy".to_string()),
            short_description: String::new(),
            long_description: String::new(),
            images: vec![],
            cover_image: None,
            amenities: json!({}),
            tags: vec![],
            best_months: vec![],
            url: String::new(),
            map_url: String::new(),
            latitude: 46.5,
            longitude: 8.0,
        }
    }

    fn zurich() -> Coordinate {
        Coordinate::new(47.37, 8.54)
    }

    fn ok_element(meters: u64, seconds: u64) -> MatrixElement {
        MatrixElement {
            status: "OK".to_string(),
            distance_meters: Some(meters),
            duration_seconds: Some(seconds),
        }
    }

    #[tokio::test]
    async fn test_quiz_sends_stored_windows() {
        let mut fixture = Fixture::new();
        fixture
            .recommender
            .expect_quiz()
            .withf(|q| q.liked_tours.is_empty() && q.disliked_tours == vec![9] && q.include_embeddings)
            .times(1)
            .returning(|_| Ok(QuizResponse::default()));
        let user = fixture.user(None).await;

        let response = fixture.service().quiz(user.id).await.unwrap();
        assert!(response.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_sketch_requires_input() {
        let mut fixture = Fixture::new();
        fixture.recommender.expect_sketch().never();
        let user = fixture.user(Some(zurich())).await;

        let result = fixture
            .service()
            .sketch(user.id, SketchRequest::default())
            .await;
        assert!(matches!(result, Err(DiscoveryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sketch_without_location_skips_recommender() {
        let mut fixture = Fixture::new();
        fixture.recommender.expect_sketch().never();
        let user = fixture.user(None).await;

        let request = SketchRequest {
            sketch: None,
            caption: Some("glacier".to_string()),
        };
        let result = fixture.service().sketch(user.id, request).await;
        assert!(matches!(result, Err(DiscoveryError::LocationNotSet)));
    }

    #[tokio::test]
    async fn test_sketch_enriches_hits() {
        let mut fixture = Fixture::new();
        fixture.recommender.expect_sketch().times(1).returning(|_| {
            Ok(vec![
                Candidate::new(2, 0.9).with_image("https://img/2.jpg"),
                Candidate::new(404, 0.8),
                Candidate::new(1, 0.7),
            ])
        });
        fixture
            .distance_matrix
            .expect_distances()
            .times(1)
            .returning(|_, dests| Ok(dests.iter().map(|_| ok_element(12_000, 900)).collect()));
        let user = fixture.user(Some(zurich())).await;

        let request = SketchRequest {
            sketch: Some("aGVsbG8=".to_string()),
            caption: None,
        };
        let response = fixture.service().sketch(user.id, request).await.unwrap();

        let ids: Vec<i64> = response.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(response.results[0].image, "https://img/2.jpg");
        assert_eq!(response.filters.max_distance, 12);
    }

    #[tokio::test]
    async fn test_find_sends_profile_and_recent_ratings() {
        let mut fixture = Fixture::new();
        let user = fixture.user(Some(zurich())).await;
        fixture
            .treks
            .create_comment(TrekComment::new(
                user.id,
                1,
                CreateComment {
                    rating: Some(4.5),
                    text: "Great views".to_string(),
                    images: vec![],
                },
            ))
            .await
            .unwrap();

        let expected_user_id = user.id.to_string();
        fixture
            .recommender
            .expect_recommend()
            .withf(move |q| {
                q.user_id == expected_user_id
                    && q.user_query == "Valais"
                    && q.stored_embeddings.liked == vec![0.0, 0.0]
                    && q.tour_ratings.len() == 1
                    && q.tour_ratings[0].tour_id == 1
                    && q.disliked_tour_indices == vec![9]
            })
            .times(1)
            .returning(|_| Ok(vec![Candidate::new(1, 0.6)]));
        fixture
            .distance_matrix
            .expect_distances()
            .returning(|_, dests| Ok(dests.iter().map(|_| ok_element(1_500, 100)).collect()));

        let query = FindQuery {
            location: Some("Valais".to_string()),
        };
        let response = fixture.service().find(user.id, query).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].distance, 1_500);
    }

    #[tokio::test]
    async fn test_find_without_location() {
        let mut fixture = Fixture::new();
        fixture.recommender.expect_recommend().never();
        let user = fixture.user(None).await;

        let result = fixture.service().find(user.id, FindQuery::default()).await;
        assert!(matches!(result, Err(DiscoveryError::LocationNotSet)));
    }

    #[tokio::test]
    async fn test_distance_maps_elements() {
        let mut fixture = Fixture::new();
        fixture
            .distance_matrix
            .expect_distances()
            .withf(|origin, dests| *origin == zurich() && dests.len() == 2)
            .returning(|_, _| {
                Ok(vec![
                    ok_element(5_000, 600),
                    MatrixElement {
                        status: "ZERO_RESULTS".to_string(),
                        distance_meters: None,
                        duration_seconds: None,
                    },
                ])
            });
        let user = fixture.user(Some(zurich())).await;

        let request = DistanceRequest {
            destinations: vec![
                Destination {
                    latitude: 46.0,
                    longitude: 7.0,
                },
                Destination {
                    latitude: 10.0,
                    longitude: 10.0,
                },
            ],
        };
        let response = fixture.service().distance(user.id, request).await.unwrap();

        assert_eq!(response.origin, "47.37,8.54");
        assert_eq!(response.destinations[0].distance, Some(Measure { value: 5_000 }));
        assert_eq!(response.destinations[0].status, "OK");
        assert_eq!(response.destinations[1].duration, None);
        assert_eq!(response.destinations[1].status, "ZERO_RESULTS");
    }

    #[tokio::test]
    async fn test_distance_rejects_empty_and_oversized() {
        let mut fixture = Fixture::new();
        fixture.distance_matrix.expect_distances().never();
        let user = fixture.user(Some(zurich())).await;
        let service = fixture.service();

        let empty = DistanceRequest {
            destinations: vec![],
        };
        assert!(matches!(
            service.distance(user.id, empty).await,
            Err(DiscoveryError::Validation(_))
        ));

        let oversized = DistanceRequest {
            destinations: vec![
                Destination {
                    latitude: 46.0,
                    longitude: 7.0
                };
                MAX_DESTINATIONS + 1
            ],
        };
        assert!(matches!(
            service.distance(user.id, oversized).await,
            Err(DiscoveryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_location_geocodes_names() {
        let mut fixture = Fixture::new();
        fixture
            .geocoder
            .expect_geocode()
            .withf(|name| name == "Zermatt")
            .times(1)
            .returning(|_| Ok(Coordinate::new(46.02, 7.75)));
        let user = fixture.user(None).await;
        let users = fixture.users.clone();

        let updated = fixture
            .service()
            .update_location(
                user.id,
                LocationUpdate::Named {
                    location_name: " Zermatt ".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated, LocationUpdated { latitude: 46.02, longitude: 7.75 });
        let stored = users.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.location, Some(Coordinate::new(46.02, 7.75)));
    }

    #[tokio::test]
    async fn test_update_location_rejects_out_of_range_coordinates() {
        let mut fixture = Fixture::new();
        fixture.geocoder.expect_geocode().never();
        let user = fixture.user(None).await;

        let result = fixture
            .service()
            .update_location(
                user.id,
                LocationUpdate::Coordinates {
                    location: LatLng { lat: 120.0, lng: 7.0 },
                },
            )
            .await;
        assert!(matches!(result, Err(DiscoveryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_address_reverse_geocodes_stored_location() {
        let mut fixture = Fixture::new();
        fixture
            .geocoder
            .expect_reverse_geocode()
            .withf(|c| *c == zurich())
            .returning(|_| Ok("Zürich, Switzerland".to_string()));
        let user = fixture.user(Some(zurich())).await;

        let address = fixture.service().address(user.id).await.unwrap();
        assert_eq!(address.location, "Zürich, Switzerland");
    }
}
