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
use revisit_core::fail;

use crate::db::Card;
use crate::db::Database;

pub fn add_card(
    db: &mut Database,
    deck_name: &str,
    content: &str,
    now: Timestamp,
    out: &mut impl Write,
) -> Fallible<Card> {
    let content = content.trim();
    if content.is_empty() {
        return fail("card content is empty");
    }
    let deck = db.get_deck(deck_name)?;
    let card = db.add_card(&deck, content, now)?;
    log::info!("Added card {} to deck '{}'", card.hash, deck.name);
    writeln!(out, "{}", card.hash)?;
    Ok(card)
}

pub fn list_cards(db: &Database, deck_name: Option<&str>, out: &mut impl Write) -> Fallible<()> {
    let deck_id = match deck_name {
        Some(name) => Some(db.get_deck(name)?.id),
        None => None,
    };
    for card in db.cards(deck_id)? {
        writeln!(out, "{}\tdue {}\t{}", card.hash, card.next_review_at, card.content)?;
    }
    Ok(())
}

pub fn delete_card(db: &mut Database, prefix: &str, out: &mut impl Write) -> Fallible<()> {
    let card = resolve_card(db, prefix)?;
    db.delete_card(card.hash)?;
    log::info!("Deleted card {}", card.hash);
    writeln!(out, "Deleted card {}.", card.hash)?;
    Ok(())
}

/// Find the one card whose hash starts with `prefix`.
pub fn resolve_card(db: &Database, prefix: &str) -> Fallible<Card> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        return fail("card hash is empty");
    }
    let mut matches: Vec<Card> = db
        .cards(None)?
        .into_iter()
        .filter(|card| card.hash.to_hex().starts_with(&prefix))
        .collect();
    match matches.len() {
        0 => fail(format!("card not found: '{prefix}'")),
        1 => Ok(matches.remove(0)),
        n => fail(format!("card hash prefix '{prefix}' is ambiguous ({n} cards)")),
    }
}
