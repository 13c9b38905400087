//! Pure aggregation over fetched rows.
//!
//! The storage layer keeps its queries simple (one pass for like counts,
//! one for the current user's liked set) and the merging and statistics
//! happen here, where they can be tested without a database.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::model::{Post, PostWithLikes};

/// Aggregate mood statistics across all users.
#[derive(Debug, PartialEq, Serialize)]
pub struct MoodStats {
	/// Arithmetic mean of all ratings, 0 when there are no entries.
	pub average_rating: f64,
	pub total_entries: usize,
	/// Occurrence count per observed rating. Ratings that never occur
	/// are absent, not present with a zero count.
	pub rating_distribution: BTreeMap<i32, u64>,
}

/// Computes the mood statistics for a set of ratings.
pub fn mood_stats(ratings: &[i32]) -> MoodStats {
	let total_entries = ratings.len();
	let sum: i64 = ratings.iter().copied().map(i64::from).sum();

	let average_rating = if total_entries == 0 {
		0.0
	} else {
		sum as f64 / total_entries as f64
	};

	let mut rating_distribution = BTreeMap::new();

	for &rating in ratings {
		*rating_distribution.entry(rating).or_insert(0) += 1;
	}

	MoodStats {
		average_rating,
		total_entries,
		rating_distribution,
	}
}

/// Merges per-post like counts and the current user's liked set into the
/// base post list, preserving its order.
///
/// `counts` comes from a `GROUP BY post_id` pass over the likes and only
/// contains posts with at least one like; everything else reports 0.
pub fn with_like_info(
	posts: Vec<Post>,
	counts: Vec<(Uuid, i64)>,
	liked: Vec<Uuid>,
) -> Vec<PostWithLikes> {
	let counts: HashMap<Uuid, i64> = counts.into_iter().collect();
	let liked: HashSet<Uuid> = liked.into_iter().collect();

	posts
		.into_iter()
		.map(|post| PostWithLikes {
			likes_count: counts.get(&post.id).copied().unwrap_or(0),
			user_liked: liked.contains(&post.id),
			post,
		})
		.collect()
}
