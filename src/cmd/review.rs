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

use std::io::Write;

use revisit_core::Fallible;
use revisit_core::ReviewFeedback;
use revisit_core::ReviewRecord;
use revisit_core::ScheduleResult;
use revisit_core::ScheduleState;
use revisit_core::Scheduler;
use revisit_core::Timestamp;
use revisit_core::fail;

use crate::cmd::card::resolve_card;
use crate::db::Database;

/// Review a card: schedule it from its last review, store the new review, and
/// move the card's next review time.
pub fn review_card(
    db: &mut Database,
    scheduler: &impl Scheduler,
    card_prefix: &str,
    feedback: &str,
    now: Timestamp,
    out: &mut impl Write,
) -> Fallible<ScheduleResult> {
    let feedback = ReviewFeedback::try_from(feedback.to_string())?;
    let card = resolve_card(db, card_prefix)?;
    let Some(deck) = db.decks()?.into_iter().find(|deck| deck.id == card.deck_id) else {
        return fail(format!("card {} has no deck", card.hash));
    };

    let last = db.last_review(card.hash)?;
    let state = ScheduleState::from_last_review(last.as_ref());
    let result = scheduler.schedule(feedback, state, now);
    log::debug!(
        "Scheduled card {}: {:?} + {} -> {:?}",
        card.hash,
        state,
        feedback,
        result
    );

    let review = ReviewRecord {
        card_id: card.hash,
        deck_id: deck.id,
        deck_name: deck.name,
        card_content: card.content,
        feedback,
        interval: result.interval,
        repetitions: result.repetitions,
        ease_factor: result.ease_factor,
        reviewed_at: now,
    };
    db.record_review(&review, result.next_review_date)?;
    log::info!("Recorded {} review of card {}", feedback, card.hash);

    writeln!(
        out,
        "Next review on {} (interval {} days, ease {:.2}, repetitions {}).",
        result.next_review_date.date(),
        result.interval,
        result.ease_factor,
        result.repetitions
    )?;
    Ok(result)
}
