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

//! Moving decks between databases as JSON files.

use std::fs::read_to_string;
use std::io::Write;
use std::path::Path;

use revisit_core::Deck;
use revisit_core::Fallible;
use revisit_core::Timestamp;
use revisit_core::fail;
use serde::Deserialize;
use serde::Serialize;

use crate::db::Database;

/// The only deck file version this build reads and writes.
pub const FORMAT_VERSION: &str = "repeater-v1";

/// A deck as written to an export file. Review history is not included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckData {
    pub version: String,
    pub name: String,
    pub description: Option<String>,
    pub cards: Vec<CardData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    pub content: String,
}

impl DeckData {
    /// Parse a deck file, checking its version before anything else.
    pub fn parse(text: &str) -> Fallible<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("version").and_then(|v| v.as_str()) {
            Some(FORMAT_VERSION) => Ok(serde_json::from_value(value)?),
            Some(other) => fail(format!("unknown deck file version: '{other}'")),
            None => fail("deck file has no version"),
        }
    }
}

/// Write a deck and its cards as JSON.
pub fn export_deck(db: &Database, name: &str, out: &mut impl Write) -> Fallible<DeckData> {
    let deck = db.get_deck(name)?;
    let cards = db
        .cards(Some(deck.id))?
        .into_iter()
        .map(|card| CardData {
            content: card.content,
        })
        .collect();
    let data = DeckData {
        version: FORMAT_VERSION.to_string(),
        description: db.deck_description(&deck)?,
        name: deck.name,
        cards,
    };
    serde_json::to_writer_pretty(&mut *out, &data)?;
    writeln!(out)?;
    log::info!("Exported deck '{}' with {} cards", data.name, data.cards.len());
    Ok(data)
}

/// Create a new deck from an export file. Fails without storing anything if
/// the deck exists or any card is empty or repeated.
pub fn import_deck(
    db: &mut Database,
    path: &Path,
    now: Timestamp,
    out: &mut impl Write,
) -> Fallible<Deck> {
    let data = DeckData::parse(&read_to_string(path)?)?;
    let name = data.name.trim();
    if name.is_empty() {
        return fail("deck name is empty");
    }
    let mut contents = Vec::with_capacity(data.cards.len());
    for card in &data.cards {
        let content = card.content.trim();
        if content.is_empty() {
            return fail(format!("deck '{name}' contains an empty card"));
        }
        contents.push(content.to_string());
    }
    let (deck, cards) = db.import_deck(name, data.description.as_deref(), &contents, now)?;
    log::info!("Imported deck '{}' with {} cards", deck.name, cards.len());
    writeln!(out, "Imported deck '{}' ({} cards).", deck.name, cards.len())?;
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::io::sink;

    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::try_from("2025-07-01T09:00:00.000Z".to_string()).unwrap()
    }

    fn open_tmp() -> Fallible<(TempDir, Database)> {
        let dir = tempdir()?;
        let db = Database::open(&dir.path().join("revisit.db"))?;
        Ok((dir, db))
    }

    #[test]
    fn test_export_then_import() -> Fallible<()> {
        let (dir, mut db) = open_tmp()?;
        let deck = db.add_deck("Spanish", now())?;
        db.add_card(&deck, "hola", now())?;
        db.add_card(&deck, "adiós", now())?;

        let mut file = Vec::new();
        let exported = export_deck(&db, "Spanish", &mut file)?;
        assert_eq!(exported.version, "repeater-v1");
        assert_eq!(exported.description, None);

        let target = dir.path().join("target.db");
        let mut other = Database::open(&target)?;
        let path = dir.path().join("spanish.json");
        write(&path, &file)?;
        let imported = import_deck(&mut other, &path, now(), &mut sink())?;
        assert_eq!(imported.name, "Spanish");
        let contents: Vec<String> = other
            .cards(Some(imported.id))?
            .into_iter()
            .map(|card| card.content)
            .collect();
        assert_eq!(contents, vec!["hola", "adiós"]);
        Ok(())
    }

    #[test]
    fn test_export_format() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let deck = db.add_deck("deck", now())?;
        db.add_card(&deck, "card", now())?;
        let mut out = Vec::new();
        export_deck(&db, "deck", &mut out)?;
        let value: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(
            value,
            serde_json::json!({
                "version": "repeater-v1",
                "name": "deck",
                "description": null,
                "cards": [{"content": "card"}],
            })
        );
        Ok(())
    }

    #[test]
    fn test_import_keeps_description() -> Fallible<()> {
        let (dir, mut db) = open_tmp()?;
        let path = dir.path().join("deck.json");
        write(
            &path,
            r#"{"version": "repeater-v1", "name": "Capitals", "description": "Europe",
                "cards": [{"content": "Paris"}, {"content": "Rome"}]}"#,
        )?;
        let deck = import_deck(&mut db, &path, now(), &mut sink())?;
        assert_eq!(db.cards(Some(deck.id))?.len(), 2);
        let exported = export_deck(&db, "Capitals", &mut sink())?;
        assert_eq!(exported.description.as_deref(), Some("Europe"));
        Ok(())
    }

    #[test]
    fn test_unknown_version_is_rejected() -> Fallible<()> {
        let (dir, mut db) = open_tmp()?;
        let path = dir.path().join("deck.json");
        write(
            &path,
            r#"{"version": "repeater-v2", "name": "deck", "description": null, "cards": []}"#,
        )?;
        let err = import_deck(&mut db, &path, now(), &mut sink()).unwrap_err();
        assert_eq!(err.to_string(), "error: unknown deck file version: 'repeater-v2'");
        assert!(db.decks()?.is_empty());

        assert!(DeckData::parse(r#"{"name": "deck", "cards": []}"#).is_err());
        Ok(())
    }

    #[test]
    fn test_duplicate_card_stores_nothing() -> Fallible<()> {
        let (dir, mut db) = open_tmp()?;
        let path = dir.path().join("deck.json");
        write(
            &path,
            r#"{"version": "repeater-v1", "name": "deck", "description": null,
                "cards": [{"content": "one"}, {"content": "two"}, {"content": " one "}]}"#,
        )?;
        assert!(import_deck(&mut db, &path, now(), &mut sink()).is_err());
        assert!(db.decks()?.is_empty());
        assert!(db.cards(None)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_import_into_existing_deck_fails() -> Fallible<()> {
        let (dir, mut db) = open_tmp()?;
        db.add_deck("deck", now())?;
        let path = dir.path().join("deck.json");
        write(
            &path,
            r#"{"version": "repeater-v1", "name": "deck", "description": null,
                "cards": [{"content": "one"}]}"#,
        )?;
        let err = import_deck(&mut db, &path, now(), &mut sink()).unwrap_err();
        assert_eq!(err.to_string(), "error: deck already exists: 'deck'");
        assert!(db.cards(None)?.is_empty());
        Ok(())
    }
}
