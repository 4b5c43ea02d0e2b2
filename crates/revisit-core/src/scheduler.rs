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

//! The review scheduler: an SM-2 style transition from one review outcome and
//! the card's current schedule state to its next schedule state.

use serde::Deserialize;
use serde::Serialize;

use crate::types::review::ReviewFeedback;
use crate::types::review::ReviewRecord;
use crate::types::timestamp::Timestamp;

/// Interval of a card that has never been reviewed.
pub const DEFAULT_INTERVAL: u32 = 1;

/// Ease factor of a card that has never been reviewed.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Repetitions of a card that has never been reviewed.
pub const DEFAULT_REPETITIONS: u32 = 0;

/// The ease factor never drops below this.
pub const MIN_EASE_FACTOR: f64 = 1.3;

const EASE_BONUS: f64 = 0.15;
const EASE_PENALTY: f64 = 0.2;

/// The interval after the second consecutive successful review.
const SECOND_INTERVAL: u32 = 5;

/// A card's position on the spaced repetition curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Days until the next review.
    pub interval: u32,
    pub ease_factor: f64,
    /// Consecutive successful reviews.
    pub repetitions: u32,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

impl ScheduleState {
    /// The state carried forward from a card's most recent review, or the
    /// defaults if the card has never been reviewed.
    pub fn from_last_review(last: Option<&ReviewRecord>) -> Self {
        match last {
            Some(review) => Self {
                interval: review.interval,
                ease_factor: review.ease_factor,
                repetitions: review.repetitions,
            },
            None => Self::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub interval: u32,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub next_review_date: Timestamp,
}

impl ScheduleResult {
    /// The state to feed into the next scheduling step.
    pub fn state(&self) -> ScheduleState {
        ScheduleState {
            interval: self.interval,
            ease_factor: self.ease_factor,
            repetitions: self.repetitions,
        }
    }
}

pub trait Scheduler {
    fn schedule(
        &self,
        feedback: ReviewFeedback,
        state: ScheduleState,
        now: Timestamp,
    ) -> ScheduleResult;
}

/// The default scheduler.
///
/// - `Skipped` leaves the curve untouched and asks again tomorrow.
/// - `Forgot` resets repetitions and the interval, and lowers the ease factor
///   down to `MIN_EASE_FACTOR` at most.
/// - `Ok` raises the ease factor and moves along the interval curve
///   `1, 5, round(previous * ease), ...`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicScheduler;

impl Scheduler for BasicScheduler {
    fn schedule(
        &self,
        feedback: ReviewFeedback,
        state: ScheduleState,
        now: Timestamp,
    ) -> ScheduleResult {
        let ScheduleState {
            interval,
            ease_factor,
            repetitions,
        } = state;
        match feedback {
            ReviewFeedback::Skipped => ScheduleResult {
                interval,
                ease_factor,
                repetitions,
                next_review_date: now.plus_days(1),
            },
            ReviewFeedback::Forgot => ScheduleResult {
                interval: 1,
                ease_factor: f64::max(MIN_EASE_FACTOR, ease_factor - EASE_PENALTY),
                repetitions: 0,
                next_review_date: now.plus_days(1),
            },
            ReviewFeedback::Ok => {
                let repetitions = repetitions.saturating_add(1);
                let ease_factor = ease_factor + EASE_BONUS;
                let interval = match repetitions {
                    1 => 1,
                    2 => SECOND_INTERVAL,
                    _ => round_interval(f64::from(interval) * ease_factor),
                };
                ScheduleResult {
                    interval,
                    ease_factor,
                    repetitions,
                    next_review_date: now.plus_days(interval),
                }
            }
        }
    }
}

/// Schedule a card with the default scheduler.
pub fn schedule(
    feedback: ReviewFeedback,
    repetitions: u32,
    ease_factor: f64,
    interval: u32,
    now: Timestamp,
) -> ScheduleResult {
    let state = ScheduleState {
        interval,
        ease_factor,
        repetitions,
    };
    BasicScheduler.schedule(feedback, state, now)
}

/// Round a raw interval to whole days, ties to even, never below one day.
fn round_interval(raw: f64) -> u32 {
    // Float to int casts saturate, so huge intervals clamp at u32::MAX.
    raw.round_ties_even().max(1.0) as u32
}
