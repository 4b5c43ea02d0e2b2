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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::card_hash::CardHash;
use crate::types::deck::DeckId;
use crate::types::timestamp::Timestamp;

/// The outcome of a single review.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReviewFeedback {
    /// Recalled successfully.
    Ok,
    /// Deferred without judging recall.
    Skipped,
    /// Failed to recall.
    Forgot,
}

impl ReviewFeedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewFeedback::Ok => "ok",
            ReviewFeedback::Skipped => "skipped",
            ReviewFeedback::Forgot => "forgot",
        }
    }
}

impl Display for ReviewFeedback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for ReviewFeedback {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "ok" => Ok(ReviewFeedback::Ok),
            "skipped" => Ok(ReviewFeedback::Skipped),
            "forgot" => Ok(ReviewFeedback::Forgot),
            _ => fail(format!("invalid review feedback: '{value}'")),
        }
    }
}

impl From<ReviewFeedback> for String {
    fn from(feedback: ReviewFeedback) -> String {
        feedback.as_str().to_string()
    }
}

/// A stored review. Records are append-only: the deck name and card content
/// are snapshots taken at review time, so a record stays meaningful after its
/// card or deck is deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub card_id: CardHash,
    pub deck_id: DeckId,
    pub deck_name: String,
    pub card_content: String,
    pub feedback: ReviewFeedback,
    /// The interval in days produced by this review.
    pub interval: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    pub reviewed_at: Timestamp,
}

impl ReviewRecord {
    pub fn succeeded(&self) -> bool {
        self.feedback == ReviewFeedback::Ok
    }

    pub fn failed(&self) -> bool {
        self.feedback == ReviewFeedback::Forgot
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;
    use crate::error::Fallible;

    const ALL: [ReviewFeedback; 3] = [
        ReviewFeedback::Ok,
        ReviewFeedback::Skipped,
        ReviewFeedback::Forgot,
    ];

    #[test]
    fn test_feedback_string_roundtrip() -> Fallible<()> {
        for feedback in ALL {
            assert_eq!(feedback, ReviewFeedback::try_from(feedback.to_string())?);
        }
        Ok(())
    }

    #[test]
    fn test_feedback_serialization_format() -> Fallible<()> {
        for (feedback, expected) in zip(ALL, ["\"ok\"", "\"skipped\"", "\"forgot\""]) {
            assert_eq!(serde_json::to_string(&feedback)?, expected);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_feedback() {
        for s in ["", "OK", "hard", "good"] {
            assert!(ReviewFeedback::try_from(s.to_string()).is_err());
        }
        let err = ReviewFeedback::try_from("meh".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "error: invalid review feedback: 'meh'");
    }

    #[test]
    fn test_invalid_feedback_in_json() {
        let parsed: Result<ReviewFeedback, _> = serde_json::from_str("\"easy\"");
        assert!(parsed.is_err());
    }
}
