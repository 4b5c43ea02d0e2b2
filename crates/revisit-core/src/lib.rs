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

//! revisit-core: Core library for the revisit spaced repetition system.
//!
//! This library has no I/O. It provides:
//! - The review scheduler (an SM-2 style state transition)
//! - Study statistics over a review history
//! - The value types both of them exchange with their callers

pub mod error;
pub mod scheduler;
pub mod statistics;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use scheduler::{BasicScheduler, ScheduleResult, ScheduleState, Scheduler, schedule};
pub use statistics::{DeckStatistics, DifficultyRanking, UserStatistics, compute_statistics};
pub use types::card_hash::CardHash;
pub use types::date::Date;
pub use types::deck::{Deck, DeckId};
pub use types::review::{ReviewFeedback, ReviewRecord};
pub use types::timestamp::Timestamp;
