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
use revisit_core::Timestamp;

use crate::db::Card;
use crate::db::Database;

/// Cards due at or before `now`, most overdue first.
pub fn due_cards(db: &Database, deck_name: Option<&str>, now: Timestamp) -> Fallible<Vec<Card>> {
    let deck_id = match deck_name {
        Some(name) => Some(db.get_deck(name)?.id),
        None => None,
    };
    let mut due: Vec<Card> = db
        .cards(deck_id)?
        .into_iter()
        .filter(|card| card.next_review_at <= now)
        .collect();
    due.sort_by_key(|card| card.next_review_at);
    Ok(due)
}

pub fn list_due(
    db: &Database,
    deck_name: Option<&str>,
    now: Timestamp,
    out: &mut impl Write,
) -> Fallible<()> {
    let due = due_cards(db, deck_name, now)?;
    if due.is_empty() {
        writeln!(out, "No cards due.")?;
        return Ok(());
    }
    for card in &due {
        writeln!(out, "{}\t{}", card.hash, card.content)?;
    }
    Ok(())
}
