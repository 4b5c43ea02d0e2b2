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

use revisit_core::Deck;
use revisit_core::Fallible;
use revisit_core::Timestamp;
use revisit_core::fail;

use crate::db::Database;

pub fn add_deck(
    db: &mut Database,
    name: &str,
    now: Timestamp,
    out: &mut impl Write,
) -> Fallible<Deck> {
    let name = name.trim();
    if name.is_empty() {
        return fail("deck name is empty");
    }
    let deck = db.add_deck(name, now)?;
    log::info!("Created deck '{}' with id {}", deck.name, deck.id);
    writeln!(out, "Created deck '{}'.", deck.name)?;
    Ok(deck)
}

pub fn list_decks(db: &Database, out: &mut impl Write) -> Fallible<()> {
    for deck in db.decks()? {
        let cards = db.cards(Some(deck.id))?.len();
        writeln!(out, "{}\t{} cards\tcreated {}", deck.name, cards, deck.created_at)?;
    }
    Ok(())
}

/// Delete a deck and its cards. Reviews of those cards are kept.
pub fn delete_deck(db: &mut Database, name: &str, out: &mut impl Write) -> Fallible<()> {
    let deck = db.get_deck(name)?;
    let cards = db.delete_deck(&deck)?;
    log::info!("Deleted deck '{}' and {} cards", deck.name, cards);
    writeln!(out, "Deleted deck '{}' ({} cards).", deck.name, cards)?;
    Ok(())
}
