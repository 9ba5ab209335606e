//! Preference vector math.
//!
//! A user's taste is two unit vectors in the recommender's embedding space.
//! Each feedback batch decays the old vectors by [`DECAY`], adds the batch's
//! embeddings, and re-normalizes. Rated tour ids go into FIFO windows of
//! [`HISTORY_CAP`] entries.

use crate::models::PreferenceProfile;
use tracing::warn;

pub const DECAY: f32 = 0.9;
pub const HISTORY_CAP: usize = 50;

/// Scale `v` to unit Euclidean norm. The zero vector is returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| (f64::from(*x) / norm) as f32).collect()
}

/// One rated tour from a feedback batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackEntry {
    pub tour_id: i64,
    pub liked: bool,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackOutcome {
    pub profile: PreferenceProfile,
    /// Entries that contributed nothing to the sums
    pub skipped: usize,
}

/// Fold a feedback batch into `current`.
///
/// Entries without an embedding of length `dim` (or with non-finite values)
/// are left out of the sums with a warning; their ids are still recorded.
pub fn apply_feedback(
    current: &PreferenceProfile,
    entries: &[FeedbackEntry],
    dim: usize,
) -> FeedbackOutcome {
    let mut sum_liked = vec![0.0f32; dim];
    let mut sum_disliked = vec![0.0f32; dim];
    let mut skipped = 0;

    for entry in entries {
        let Some(embedding) = entry.embedding.as_deref() else {
            warn!(tour_id = entry.tour_id, "No embedding for rated tour, skipping");
            skipped += 1;
            continue;
        };

        if embedding.len() != dim {
            warn!(
                tour_id = entry.tour_id,
                expected = dim,
                actual = embedding.len(),
                "Embedding length mismatch, skipping"
            );
            skipped += 1;
            continue;
        }

        if embedding.iter().any(|x| !x.is_finite()) {
            warn!(tour_id = entry.tour_id, "Embedding has non-finite values, skipping");
            skipped += 1;
            continue;
        }

        let target = if entry.liked {
            &mut sum_liked
        } else {
            &mut sum_disliked
        };
        for (acc, x) in target.iter_mut().zip(embedding) {
            *acc += x;
        }
    }

    let liked_ids = entries.iter().filter(|e| e.liked).map(|e| e.tour_id);
    let disliked_ids = entries.iter().filter(|e| !e.liked).map(|e| e.tour_id);

    FeedbackOutcome {
        profile: PreferenceProfile {
            liked_embedding: normalize(&decay_blend(&current.liked_embedding, &sum_liked)),
            disliked_embedding: normalize(&decay_blend(&current.disliked_embedding, &sum_disliked)),
            liked_tours: push_capped(&current.liked_tours, liked_ids),
            disliked_tours: push_capped(&current.disliked_tours, disliked_ids),
        },
        skipped,
    }
}

/// `old * DECAY + sum`. A stored vector of the wrong length counts as zero.
fn decay_blend(old: &[f32], sum: &[f32]) -> Vec<f32> {
    if old.len() != sum.len() {
        warn!(
            expected = sum.len(),
            actual = old.len(),
            "Stored preference vector has wrong dimension, resetting"
        );
        return sum.to_vec();
    }
    old.iter().zip(sum).map(|(o, s)| o * DECAY + s).collect()
}

/// Append `new` to `previous` and keep the last [`HISTORY_CAP`] ids.
fn push_capped(previous: &[i64], new: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = previous.iter().copied().chain(new).collect();
    if ids.len() > HISTORY_CAP {
        ids.drain(..ids.len() - HISTORY_CAP);
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn entry(tour_id: i64, liked: bool, embedding: Option<Vec<f32>>) -> FeedbackEntry {
        FeedbackEntry {
            tour_id,
            liked,
            embedding,
        }
    }

    fn profile(liked: Vec<f32>, disliked: Vec<f32>) -> PreferenceProfile {
        PreferenceProfile {
            liked_embedding: liked,
            disliked_embedding: disliked,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_produces_unit_vectors() {
        let cases: [&[f32]; 4] = [&[3.0, 4.0], &[1.0, 1.0, 1.0, 1.0], &[-2.5], &[1e-3, 7.0, -4.0]];
        for v in cases {
            let n = normalize(v);
            assert_eq!(n.len(), v.len());
            assert!((norm(&n) - 1.0).abs() < 1e-5, "norm of {:?} is {}", n, norm(&n));
        }
        assert_eq!(normalize(&[3.0, 4.0]), vec![0.6, 0.8]);
    }

    #[test]
    fn test_normalize_zero_vector_is_identity() {
        assert_eq!(normalize(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_single_like_on_same_direction_stays_unit() {
        let current = profile(vec![1.0, 0.0], vec![0.0, 0.0]);
        let outcome = apply_feedback(&current, &[entry(1, true, Some(vec![1.0, 0.0]))], 2);

        // [1*0.9 + 1, 0] = [1.9, 0] normalizes back to [1, 0]
        assert_eq!(outcome.profile.liked_embedding, vec![1.0, 0.0]);
        assert_eq!(outcome.profile.disliked_embedding, vec![0.0, 0.0]);
        assert_eq!(outcome.profile.liked_tours, vec![1]);
        assert!(outcome.profile.disliked_tours.is_empty());
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_decay_weights_history_below_new_signal() {
        let current = profile(vec![1.0, 0.0], vec![0.0, 0.0]);
        let outcome = apply_feedback(&current, &[entry(2, true, Some(vec![0.0, 1.0]))], 2);

        let liked = &outcome.profile.liked_embedding;
        assert!(liked[1] > liked[0]);
        assert!((norm(liked) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_length_mismatch_is_skipped_without_aborting() {
        let current = profile(vec![0.0, 0.0], vec![0.0, 0.0]);
        let entries = [
            entry(1, true, Some(vec![1.0, 0.0, 0.0])),
            entry(2, true, None),
            entry(3, false, Some(vec![0.0, 2.0])),
        ];

        let outcome = apply_feedback(&current, &entries, 2);

        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.profile.liked_embedding, vec![0.0, 0.0]);
        assert_eq!(outcome.profile.disliked_embedding, vec![0.0, 1.0]);
        // Ratings still count as history even when the vector was unusable
        assert_eq!(outcome.profile.liked_tours, vec![1, 2]);
        assert_eq!(outcome.profile.disliked_tours, vec![3]);
    }

    #[test]
    fn test_non_finite_embedding_is_skipped() {
        let current = profile(vec![0.0, 1.0], vec![0.0, 0.0]);
        let outcome = apply_feedback(&current, &[entry(1, true, Some(vec![f32::NAN, 0.0]))], 2);

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.profile.liked_embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn test_empty_batch_only_renormalizes() {
        let current = profile(vec![3.0, 4.0], vec![0.0, 0.0]);
        let outcome = apply_feedback(&current, &[], 2);

        let liked = &outcome.profile.liked_embedding;
        assert!((liked[0] - 0.6).abs() < 1e-6);
        assert!((liked[1] - 0.8).abs() < 1e-6);
        assert_eq!(outcome.profile.disliked_embedding, vec![0.0, 0.0]);
    }

    #[test]
    fn test_history_window_keeps_most_recent_fifty() {
        let mut current = profile(vec![0.0], vec![0.0]);
        current.liked_tours = (1..=45).collect();

        let entries: Vec<_> = (100..110).map(|id| entry(id, true, None)).collect();
        let outcome = apply_feedback(&current, &entries, 1);

        let liked = &outcome.profile.liked_tours;
        assert_eq!(liked.len(), HISTORY_CAP);
        assert_eq!(liked.first(), Some(&6));
        assert_eq!(&liked[40..], &(100..110).collect::<Vec<_>>()[..]);
    }

    #[test]
    fn test_history_keeps_duplicates() {
        let mut current = profile(vec![0.0], vec![0.0]);
        current.disliked_tours = vec![7];

        let outcome = apply_feedback(&current, &[entry(7, false, None)], 1);
        assert_eq!(outcome.profile.disliked_tours, vec![7, 7]);
    }

    #[test]
    fn test_stored_vector_of_wrong_dimension_is_reset() {
        let current = profile(vec![1.0], vec![]);
        let outcome = apply_feedback(&current, &[entry(1, true, Some(vec![0.0, 5.0]))], 2);

        assert_eq!(outcome.profile.liked_embedding, vec![0.0, 1.0]);
        assert_eq!(outcome.profile.disliked_embedding, vec![0.0, 0.0]);
    }
}
