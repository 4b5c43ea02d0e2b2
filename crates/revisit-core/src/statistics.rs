// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Study statistics. Everything here is recomputed from the review history on
//! every call; nothing is cached or stored.

use std::borrow::Borrow;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::types::date::Date;
use crate::types::deck::Deck;
use crate::types::deck::DeckId;
use crate::types::review::ReviewRecord;
use crate::types::timestamp::Timestamp;

/// Reviews at or above this interval (in days) count as mature.
pub const MATURE_INTERVAL_THRESHOLD: u32 = 21;

/// Decks with fewer reviews than this are always `New`.
pub const NEW_DECK_MIN_REVIEWS: usize = 5;

/// How many of the latest reviews make up the recent success rate.
pub const RECENT_REVIEW_WINDOW: usize = 10;

pub const MASTERED_MIN_SUCCESS_RATE: f64 = 0.85;
pub const MASTERED_MIN_RETENTION_RATE: f64 = 0.80;
pub const MASTERED_MIN_RECENT_SUCCESS_RATE: f64 = 0.80;

pub const CHALLENGING_MAX_SUCCESS_RATE: f64 = 0.60;
pub const CHALLENGING_MAX_RETENTION_RATE: f64 = 0.50;
pub const CHALLENGING_MAX_RECENT_SUCCESS_RATE: f64 = 0.60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyRanking {
    New,
    Learning,
    Challenging,
    Mastered,
}

impl DifficultyRanking {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyRanking::New => "new",
            DifficultyRanking::Learning => "learning",
            DifficultyRanking::Challenging => "challenging",
            DifficultyRanking::Mastered => "mastered",
        }
    }
}

impl Display for DifficultyRanking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckStatistics {
    pub deck_id: DeckId,
    pub deck_name: String,
    pub retention_rate: f64,
    pub total_reviews: usize,
    /// The latest review in the deck, or the deck's creation time if it has
    /// never been studied.
    pub last_studied: Timestamp,
    pub difficulty_ranking: DifficultyRanking,
}

impl DeckStatistics {
    pub fn never_studied(&self) -> bool {
        self.total_reviews == 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_reviews: usize,
    pub daily_reviews: BTreeMap<Date, usize>,
    pub success_rate: f64,
    pub retention_rate: f64,
    pub streak: usize,
    pub deck_statistics: Vec<DeckStatistics>,
}

/// Count reviews per UTC calendar date.
pub fn calculate_daily_reviews<I>(dates: I) -> BTreeMap<Date, usize>
where
    I: IntoIterator<Item = Timestamp>,
{
    let mut daily = BTreeMap::new();
    for date in dates {
        *daily.entry(date.date()).or_insert(0) += 1;
    }
    daily
}

/// The number of consecutive days with at least one review, walking back from
/// `today`. A `today` without reviews does not break the streak: counting
/// starts from yesterday instead.
pub fn calculate_streak<I>(today: Timestamp, dates: I) -> usize
where
    I: IntoIterator<Item = Timestamp>,
{
    let seen: HashSet<Date> = dates.into_iter().map(Timestamp::date).collect();
    let mut streak = 0;
    let mut current = today.date();
    if seen.contains(&current) {
        streak += 1;
    }
    while let Some(previous) = current.pred() {
        if !seen.contains(&previous) {
            break;
        }
        streak += 1;
        current = previous;
    }
    streak
}

/// Among mature reviews (interval at least `mature_interval_threshold`), the
/// fraction that succeeded. Zero if there are no mature reviews.
pub fn calculate_retention_rate<R>(reviews: &[R], mature_interval_threshold: u32) -> f64
where
    R: Borrow<ReviewRecord>,
{
    let mature = reviews
        .iter()
        .map(Borrow::<ReviewRecord>::borrow)
        .filter(|review| review.interval >= mature_interval_threshold);
    ratio(mature)
}

/// Among graded reviews (skips excluded), the fraction that succeeded. Zero if
/// nothing was graded.
pub fn calculate_success_rate<R>(reviews: &[R]) -> f64
where
    R: Borrow<ReviewRecord>,
{
    let graded = reviews
        .iter()
        .map(Borrow::<ReviewRecord>::borrow)
        .filter(|review| review.succeeded() || review.failed());
    ratio(graded)
}

fn ratio<'a>(reviews: impl Iterator<Item = &'a ReviewRecord>) -> f64 {
    let (succeeded, total) = reviews.fold((0usize, 0usize), |(succeeded, total), review| {
        (succeeded + usize::from(review.succeeded()), total + 1)
    });
    if total == 0 {
        0.0
    } else {
        succeeded as f64 / total as f64
    }
}

/// Classify a deck from its reviews, oldest first.
pub fn classify_deck_difficulty<R>(reviews: &[R]) -> DifficultyRanking
where
    R: Borrow<ReviewRecord>,
{
    if reviews.len() < NEW_DECK_MIN_REVIEWS {
        return DifficultyRanking::New;
    }

    let success_rate = calculate_success_rate(reviews);
    let retention_rate = calculate_retention_rate(reviews, MATURE_INTERVAL_THRESHOLD);
    let recent = &reviews[reviews.len().saturating_sub(RECENT_REVIEW_WINDOW)..];
    let recent_success_rate = calculate_success_rate(recent);

    // The bands overlap, so the order of these checks matters.
    if success_rate >= MASTERED_MIN_SUCCESS_RATE
        && retention_rate >= MASTERED_MIN_RETENTION_RATE
        && recent_success_rate >= MASTERED_MIN_RECENT_SUCCESS_RATE
    {
        DifficultyRanking::Mastered
    } else if success_rate <= CHALLENGING_MAX_SUCCESS_RATE
        || retention_rate <= CHALLENGING_MAX_RETENTION_RATE
        || recent_success_rate <= CHALLENGING_MAX_RECENT_SUCCESS_RATE
    {
        DifficultyRanking::Challenging
    } else {
        DifficultyRanking::Learning
    }
}

/// Statistics for one deck, picked out of all of the user's reviews.
pub fn get_deck_statistics(deck: &Deck, reviews: &[ReviewRecord]) -> DeckStatistics {
    let mut deck_reviews: Vec<&ReviewRecord> = reviews
        .iter()
        .filter(|review| review.deck_id == deck.id)
        .collect();

    let Some(last_studied) = deck_reviews.iter().map(|review| review.reviewed_at).max() else {
        return DeckStatistics {
            deck_id: deck.id,
            deck_name: deck.name.clone(),
            retention_rate: 0.0,
            total_reviews: 0,
            last_studied: deck.created_at,
            difficulty_ranking: DifficultyRanking::New,
        };
    };

    deck_reviews.sort_by_key(|review| review.reviewed_at);
    DeckStatistics {
        deck_id: deck.id,
        deck_name: deck.name.clone(),
        retention_rate: calculate_retention_rate(&deck_reviews, MATURE_INTERVAL_THRESHOLD),
        total_reviews: deck_reviews.len(),
        last_studied,
        difficulty_ranking: classify_deck_difficulty(&deck_reviews),
    }
}

/// Sort deck statistics by most recently studied, with never-studied decks
/// last.
pub fn sort_deck_statistics(stats: &mut [DeckStatistics]) {
    stats.sort_by_key(|deck| (deck.never_studied(), Reverse(deck.last_studied)));
}

/// Compute all statistics for a user from their decks and full review
/// history. Reviews of decks that no longer exist still count towards the
/// overall figures.
pub fn compute_statistics(
    today: Timestamp,
    decks: &[Deck],
    reviews: &[ReviewRecord],
) -> UserStatistics {
    let dates = || reviews.iter().map(|review| review.reviewed_at);
    let mut deck_statistics: Vec<DeckStatistics> = decks
        .iter()
        .map(|deck| get_deck_statistics(deck, reviews))
        .collect();
    sort_deck_statistics(&mut deck_statistics);
    UserStatistics {
        total_reviews: reviews.len(),
        daily_reviews: calculate_daily_reviews(dates()),
        success_rate: calculate_success_rate(reviews),
        retention_rate: calculate_retention_rate(reviews, MATURE_INTERVAL_THRESHOLD),
        streak: calculate_streak(today, dates()),
        deck_statistics,
    }
}
