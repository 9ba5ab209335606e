//! Turns raw recommender hits into result cards.
//!
//! Stages, in order: dedup by tour id, catalog join, display fields,
//! batched distance lookup, merge with sentinels, filter metadata.
//! Output keeps the recommender's order minus dropped hits.

use domain_treks::{Trek, TrekRepository, TrekService};
use domain_users::Coordinate;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::warn;

use crate::config::ImageBlocklist;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::maps::{DistanceMatrix, MAX_DESTINATIONS, TravelEstimate};
use crate::models::{Candidate, DiscoveryResponse, EnrichedTrek, FilterMetadata};

/// Distance used when no route could be computed (meters)
pub const SENTINEL_DISTANCE_METERS: u64 = 5_000_000;
/// Travel time used when no route could be computed (seconds)
pub const SENTINEL_TRAVEL_SECONDS: u64 = 1_800_000;

pub const DEFAULT_DIFFICULTY: &str = "medium";

/// Catalog match with the candidate's score and image
#[derive(Debug, Clone)]
struct Joined {
    trek: Trek,
    score: f64,
    image: Option<String>,
}

/// Run the full pipeline for one request.
///
/// Fails with [`DiscoveryError::LocationNotSet`] before touching the catalog
/// or the maps API when `origin` is `None`.
pub async fn enrich<T: TrekRepository>(
    candidates: Vec<Candidate>,
    origin: Option<Coordinate>,
    treks: &TrekService<T>,
    maps: &dyn DistanceMatrix,
    blocklist: &ImageBlocklist,
) -> DiscoveryResult<DiscoveryResponse> {
    let origin = origin.ok_or(DiscoveryError::LocationNotSet)?;

    let unique = dedup(candidates);
    let joined = join_catalog(unique, treks).await;

    let destinations: Vec<Coordinate> = joined
        .iter()
        .map(|j| Coordinate::new(j.trek.latitude, j.trek.longitude))
        .collect();
    let estimates = batched_distances(maps, origin, &destinations).await;

    let results: Vec<EnrichedTrek> = joined
        .into_iter()
        .zip(estimates)
        .map(|(joined, estimate)| to_result(joined, estimate, blocklist))
        .collect();
    let filters = filter_metadata(&results);

    Ok(DiscoveryResponse { results, filters })
}

/// Keep the first occurrence of each tour id
pub fn dedup(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.tour_id))
        .collect()
}

async fn join_catalog<T: TrekRepository>(
    candidates: Vec<Candidate>,
    treks: &TrekService<T>,
) -> Vec<Joined> {
    let lookups = candidates.iter().map(|c| treks.get_trek(c.tour_id));
    let found = join_all(lookups).await;

    candidates
        .into_iter()
        .zip(found)
        .filter_map(|(candidate, lookup)| match lookup {
            Ok(Some(trek)) => Some(Joined {
                trek,
                score: candidate.score,
                image: candidate.image,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!(tour_id = candidate.tour_id, error = %e, "Catalog lookup failed, dropping");
                None
            }
        })
        .collect()
}

/// Travel estimates for every destination, in order.
///
/// Requests go out in concurrent chunks of [`MAX_DESTINATIONS`]; a failed
/// chunk yields `None` for each of its destinations.
pub async fn batched_distances(
    maps: &dyn DistanceMatrix,
    origin: Coordinate,
    destinations: &[Coordinate],
) -> Vec<Option<TravelEstimate>> {
    let batches = destinations.chunks(MAX_DESTINATIONS).map(|chunk| async move {
        match maps.distances(origin, chunk).await {
            Ok(elements) if elements.len() == chunk.len() => {
                elements.iter().map(|e| e.estimate()).collect()
            }
            Ok(elements) => {
                warn!(
                    expected = chunk.len(),
                    actual = elements.len(),
                    "Distance batch size mismatch, using sentinels"
                );
                vec![None; chunk.len()]
            }
            Err(e) => {
                warn!(batch_size = chunk.len(), error = %e, "Distance batch failed, using sentinels");
                vec![None; chunk.len()]
            }
        }
    });

    join_all(batches).await.into_iter().flatten().collect()
}

/// `"H hours M minutes"`, or `"N/A"` without a duration
pub fn format_duration(minutes: Option<u64>) -> String {
    match minutes {
        Some(m) if m > 0 => format!("{} hours {} minutes", m / 60, m % 60),
        _ => "N/A".to_string(),
    }
}

/// Candidate image, else cover image, else first catalog image; skipping blocked URLs
pub fn pick_image(candidate_image: Option<&str>, trek: &Trek, blocklist: &ImageBlocklist) -> String {
    candidate_image
        .and_then(|url| blocklist.allow(url))
        .or_else(|| {
            trek.cover_image
                .as_ref()
                .and_then(|cover| blocklist.allow(&cover.url))
        })
        .or_else(|| trek.images.iter().find_map(|img| blocklist.allow(&img.url)))
        .unwrap_or_default()
        .to_string()
}

fn to_result(
    joined: Joined,
    estimate: Option<TravelEstimate>,
    blocklist: &ImageBlocklist,
) -> EnrichedTrek {
    let Joined { trek, score, image } = joined;
    let duration_value = trek.duration_minutes();
    let image = pick_image(image.as_deref(), &trek, blocklist);
    let difficulty = trek
        .difficulty
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string());

    EnrichedTrek {
        id: trek.tour_id,
        route_type: trek.route_type,
        title: trek.title,
        difficulty,
        image,
        rating: score,
        duration_value,
        duration: format_duration(duration_value),
        latitude: trek.latitude,
        longitude: trek.longitude,
        distance: estimate.map_or(SENTINEL_DISTANCE_METERS, |e| e.distance_meters),
        time_to_reach: estimate.map_or(SENTINEL_TRAVEL_SECONDS, |e| e.duration_seconds),
    }
}

/// Distinct lower-cased difficulties and route types, plus range maxima.
///
/// Sentinel distances and travel times do not count toward the maxima.
pub fn filter_metadata(results: &[EnrichedTrek]) -> FilterMetadata {
    let mut difficulties: Vec<String> = Vec::new();
    let mut route_types: Vec<String> = Vec::new();
    let mut max_duration_secs: u64 = 0;
    let mut max_distance_m: u64 = 0;
    let mut max_travel_secs: u64 = 0;

    for r in results {
        let difficulty = r.difficulty.to_lowercase();
        if !difficulty.is_empty() && !difficulties.contains(&difficulty) {
            difficulties.push(difficulty);
        }
        let route_type = r.route_type.to_lowercase();
        if !route_type.is_empty() && !route_types.contains(&route_type) {
            route_types.push(route_type);
        }

        let duration_secs = r.duration_value.unwrap_or(0).saturating_mul(60);
        max_duration_secs = max_duration_secs.max(duration_secs);
        if r.distance != SENTINEL_DISTANCE_METERS {
            max_distance_m = max_distance_m.max(r.distance);
        }
        if r.time_to_reach != SENTINEL_TRAVEL_SECONDS {
            max_travel_secs = max_travel_secs.max(r.time_to_reach);
        }
    }

    FilterMetadata {
        difficulties,
        route_types,
        max_duration: max_duration_secs.div_ceil(3600),
        max_distance: max_distance_m.div_ceil(1000),
        max_time_to_reach: max_travel_secs.div_ceil(3600),
    }
}
