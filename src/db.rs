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

//! The local review log: decks, cards, and an append-only table of reviews.
//! Reviews carry no foreign keys, so deleting a card or a deck never touches
//! them.

use std::path::Path;

use revisit_core::CardHash;
use revisit_core::Deck;
use revisit_core::DeckId;
use revisit_core::ErrorReport;
use revisit_core::Fallible;
use revisit_core::ReviewFeedback;
use revisit_core::ReviewRecord;
use revisit_core::Timestamp;
use revisit_core::fail;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;

const SCHEMA: &str = "
    create table if not exists decks (
        id integer primary key,
        name text not null unique,
        description text,
        created_at text not null
    );
    create table if not exists cards (
        card_hash text primary key,
        deck_id integer not null,
        content text not null,
        created_at text not null,
        next_review_at text not null
    );
    create table if not exists reviews (
        id integer primary key,
        card_hash text not null,
        deck_id integer not null,
        deck_name text not null,
        card_content text not null,
        feedback text not null,
        interval integer not null,
        repetitions integer not null,
        ease_factor real not null,
        reviewed_at text not null
    );
";

const REVIEW_COLUMNS: &str = "card_hash, deck_id, deck_name, card_content, feedback, \
                              interval, repetitions, ease_factor, reviewed_at";

/// A card as stored locally.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub hash: CardHash,
    pub deck_id: DeckId,
    pub content: String,
    pub created_at: Timestamp,
    pub next_review_at: Timestamp,
}

pub struct Database {
    conn: Connection,
}

fn sql(e: rusqlite::Error) -> ErrorReport {
    ErrorReport::new(format!("database error: {e}"))
}

impl Database {
    pub fn open(path: &Path) -> Fallible<Self> {
        let conn = Connection::open(path).map_err(sql)?;
        conn.execute_batch(SCHEMA).map_err(sql)?;
        log::info!("Opened database at {}", path.display());
        Ok(Self { conn })
    }

    pub fn add_deck(&mut self, name: &str, created_at: Timestamp) -> Fallible<Deck> {
        insert_deck(&self.conn, name, None, created_at)
    }

    pub fn find_deck(&self, name: &str) -> Fallible<Option<Deck>> {
        find_deck(&self.conn, name)
    }

    /// Like `find_deck`, but a missing deck is an error.
    pub fn get_deck(&self, name: &str) -> Fallible<Deck> {
        match self.find_deck(name)? {
            Some(deck) => Ok(deck),
            None => fail(format!("deck not found: '{name}'")),
        }
    }

    pub fn decks(&self) -> Fallible<Vec<Deck>> {
        let mut stmt = self
            .conn
            .prepare("select id, name, created_at from decks order by id")
            .map_err(sql)?;
        let mut rows = stmt.query([]).map_err(sql)?;
        let mut decks = Vec::new();
        while let Some(row) = rows.next().map_err(sql)? {
            decks.push(Deck {
                id: row.get(0).map_err(sql)?,
                name: row.get(1).map_err(sql)?,
                created_at: Timestamp::try_from(row.get::<_, String>(2).map_err(sql)?)?,
            });
        }
        Ok(decks)
    }

    pub fn deck_description(&self, deck: &Deck) -> Fallible<Option<String>> {
        self.conn
            .query_row(
                "select description from decks where id = ?1",
                params![deck.id],
                |row| row.get(0),
            )
            .map_err(sql)
    }

    /// Create a deck together with its cards. Either everything is stored or
    /// nothing is.
    pub fn import_deck(
        &mut self,
        name: &str,
        description: Option<&str>,
        contents: &[String],
        created_at: Timestamp,
    ) -> Fallible<(Deck, Vec<Card>)> {
        let tx = self.conn.transaction().map_err(sql)?;
        let deck = insert_deck(&tx, name, description, created_at)?;
        let mut cards = Vec::with_capacity(contents.len());
        for content in contents {
            cards.push(insert_card(&tx, &deck, content, created_at)?);
        }
        tx.commit().map_err(sql)?;
        Ok((deck, cards))
    }

    /// Delete a deck and its cards. Returns the number of cards deleted.
    pub fn delete_deck(&mut self, deck: &Deck) -> Fallible<usize> {
        let tx = self.conn.transaction().map_err(sql)?;
        let cards = tx
            .execute("delete from cards where deck_id = ?1", params![deck.id])
            .map_err(sql)?;
        tx.execute("delete from decks where id = ?1", params![deck.id])
            .map_err(sql)?;
        tx.commit().map_err(sql)?;
        Ok(cards)
    }

    /// Add a card to a deck. New cards are due immediately.
    pub fn add_card(
        &mut self,
        deck: &Deck,
        content: &str,
        created_at: Timestamp,
    ) -> Fallible<Card> {
        insert_card(&self.conn, deck, content, created_at)
    }

    pub fn card(&self, hash: CardHash) -> Fallible<Option<Card>> {
        let mut stmt = self
            .conn
            .prepare(
                "select card_hash, deck_id, content, created_at, next_review_at
                 from cards where card_hash = ?1",
            )
            .map_err(sql)?;
        let mut rows = stmt.query(params![hash.to_hex()]).map_err(sql)?;
        match rows.next().map_err(sql)? {
            Some(row) => Ok(Some(card_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// All cards, optionally restricted to one deck, in insertion order.
    pub fn cards(&self, deck_id: Option<DeckId>) -> Fallible<Vec<Card>> {
        let mut stmt = self
            .conn
            .prepare(
                "select card_hash, deck_id, content, created_at, next_review_at
                 from cards where ?1 is null or deck_id = ?1 order by rowid",
            )
            .map_err(sql)?;
        let mut rows = stmt.query(params![deck_id]).map_err(sql)?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next().map_err(sql)? {
            cards.push(card_from_row(row)?);
        }
        Ok(cards)
    }

    /// Delete a card. Its reviews are kept.
    pub fn delete_card(&mut self, hash: CardHash) -> Fallible<bool> {
        let deleted = self
            .conn
            .execute("delete from cards where card_hash = ?1", params![hash.to_hex()])
            .map_err(sql)?;
        Ok(deleted > 0)
    }

    /// The most recent review of a card, if any.
    pub fn last_review(&self, hash: CardHash) -> Fallible<Option<ReviewRecord>> {
        let query = format!(
            "select {REVIEW_COLUMNS} from reviews where card_hash = ?1 order by id desc limit 1"
        );
        let mut stmt = self.conn.prepare(&query).map_err(sql)?;
        let mut rows = stmt.query(params![hash.to_hex()]).map_err(sql)?;
        match rows.next().map_err(sql)? {
            Some(row) => Ok(Some(review_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Append a review and move the card's next review time, atomically.
    pub fn record_review(
        &mut self,
        review: &ReviewRecord,
        next_review_at: Timestamp,
    ) -> Fallible<()> {
        let tx = self.conn.transaction().map_err(sql)?;
        let query = format!(
            "insert into reviews ({REVIEW_COLUMNS}) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        );
        tx.execute(
            &query,
            params![
                review.card_id.to_hex(),
                review.deck_id,
                review.deck_name,
                review.card_content,
                review.feedback.as_str(),
                review.interval,
                review.repetitions,
                review.ease_factor,
                review.reviewed_at.to_string(),
            ],
        )
        .map_err(sql)?;
        tx.execute(
            "update cards set next_review_at = ?1 where card_hash = ?2",
            params![next_review_at.to_string(), review.card_id.to_hex()],
        )
        .map_err(sql)?;
        tx.commit().map_err(sql)?;
        Ok(())
    }

    /// The full review history, oldest first.
    pub fn reviews(&self) -> Fallible<Vec<ReviewRecord>> {
        let query = format!("select {REVIEW_COLUMNS} from reviews order by id");
        let mut stmt = self.conn.prepare(&query).map_err(sql)?;
        let mut rows = stmt.query([]).map_err(sql)?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next().map_err(sql)? {
            reviews.push(review_from_row(row)?);
        }
        Ok(reviews)
    }
}

fn find_deck(conn: &Connection, name: &str) -> Fallible<Option<Deck>> {
    let raw: Option<(DeckId, String, String)> = conn
        .query_row(
            "select id, name, created_at from decks where name = ?1",
            params![name],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(sql)?;
    match raw {
        Some((id, name, created_at)) => Ok(Some(Deck {
            id,
            name,
            created_at: Timestamp::try_from(created_at)?,
        })),
        None => Ok(None),
    }
}

fn insert_deck(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
    created_at: Timestamp,
) -> Fallible<Deck> {
    if find_deck(conn, name)?.is_some() {
        return fail(format!("deck already exists: '{name}'"));
    }
    conn.execute(
        "insert into decks (name, description, created_at) values (?1, ?2, ?3)",
        params![name, description, created_at.to_string()],
    )
    .map_err(sql)?;
    Ok(Deck {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        created_at,
    })
}

fn insert_card(
    conn: &Connection,
    deck: &Deck,
    content: &str,
    created_at: Timestamp,
) -> Fallible<Card> {
    let hash = CardHash::for_card(deck.id, content);
    let exists: bool = conn
        .query_row(
            "select exists(select 1 from cards where card_hash = ?1)",
            params![hash.to_hex()],
            |row| row.get(0),
        )
        .map_err(sql)?;
    if exists {
        return fail(format!("card already exists in deck '{}': '{content}'", deck.name));
    }
    conn.execute(
        "insert into cards (card_hash, deck_id, content, created_at, next_review_at)
         values (?1, ?2, ?3, ?4, ?4)",
        params![hash.to_hex(), deck.id, content, created_at.to_string()],
    )
    .map_err(sql)?;
    Ok(Card {
        hash,
        deck_id: deck.id,
        content: content.to_string(),
        created_at,
        next_review_at: created_at,
    })
}

fn card_from_row(row: &Row) -> Fallible<Card> {
    Ok(Card {
        hash: CardHash::from_hex(&row.get::<_, String>(0).map_err(sql)?)?,
        deck_id: row.get(1).map_err(sql)?,
        content: row.get(2).map_err(sql)?,
        created_at: Timestamp::try_from(row.get::<_, String>(3).map_err(sql)?)?,
        next_review_at: Timestamp::try_from(row.get::<_, String>(4).map_err(sql)?)?,
    })
}

fn review_from_row(row: &Row) -> Fallible<ReviewRecord> {
    Ok(ReviewRecord {
        card_id: CardHash::from_hex(&row.get::<_, String>(0).map_err(sql)?)?,
        deck_id: row.get(1).map_err(sql)?,
        deck_name: row.get(2).map_err(sql)?,
        card_content: row.get(3).map_err(sql)?,
        feedback: ReviewFeedback::try_from(row.get::<_, String>(4).map_err(sql)?)?,
        interval: row.get(5).map_err(sql)?,
        repetitions: row.get(6).map_err(sql)?,
        ease_factor: row.get(7).map_err(sql)?,
        reviewed_at: Timestamp::try_from(row.get::<_, String>(8).map_err(sql)?)?,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    fn open_tmp() -> Fallible<(TempDir, Database)> {
        let dir = tempdir()?;
        let db = Database::open(&dir.path().join("revisit.db"))?;
        Ok((dir, db))
    }

    fn review_of(card: &Card, deck: &Deck, feedback: ReviewFeedback, at: &str) -> ReviewRecord {
        ReviewRecord {
            card_id: card.hash,
            deck_id: deck.id,
            deck_name: deck.name.clone(),
            card_content: card.content.clone(),
            feedback,
            interval: 5,
            repetitions: 2,
            ease_factor: 2.8,
            reviewed_at: ts(at),
        }
    }

    #[test]
    fn test_decks() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        let spanish = db.add_deck("Spanish", created_at)?;
        let german = db.add_deck("German", created_at)?;
        assert_ne!(spanish.id, german.id);
        assert_eq!(db.decks()?, vec![spanish.clone(), german]);
        assert_eq!(db.find_deck("Spanish")?, Some(spanish));
        assert_eq!(db.find_deck("French")?, None);
        assert_eq!(
            db.get_deck("French").unwrap_err().to_string(),
            "error: deck not found: 'French'"
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_deck() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        db.add_deck("Spanish", created_at)?;
        let err = db.add_deck("Spanish", created_at).unwrap_err();
        assert_eq!(err.to_string(), "error: deck already exists: 'Spanish'");
        Ok(())
    }

    #[test]
    fn test_cards() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        let a = db.add_deck("a", created_at)?;
        let b = db.add_deck("b", created_at)?;
        let one = db.add_card(&a, "one", created_at)?;
        let two = db.add_card(&b, "two", created_at)?;
        assert_eq!(one.next_review_at, created_at);
        assert_eq!(db.card(one.hash)?, Some(one.clone()));
        assert_eq!(db.cards(None)?, vec![one.clone(), two.clone()]);
        assert_eq!(db.cards(Some(b.id))?, vec![two]);
        assert!(db.add_card(&a, "one", created_at).is_err());
        assert!(db.delete_card(one.hash)?);
        assert!(!db.delete_card(one.hash)?);
        assert_eq!(db.card(one.hash)?, None);
        Ok(())
    }

    #[test]
    fn test_record_review() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        let deck = db.add_deck("deck", created_at)?;
        let card = db.add_card(&deck, "card", created_at)?;
        assert_eq!(db.last_review(card.hash)?, None);

        let first = review_of(&card, &deck, ReviewFeedback::Forgot, "2025-07-01T11:00:00.000Z");
        let second = review_of(&card, &deck, ReviewFeedback::Ok, "2025-07-02T11:00:00.000Z");
        db.record_review(&first, ts("2025-07-02T11:00:00.000Z"))?;
        db.record_review(&second, ts("2025-07-07T11:00:00.000Z"))?;

        assert_eq!(db.last_review(card.hash)?, Some(second.clone()));
        assert_eq!(db.reviews()?, vec![first, second]);
        let stored = db.card(card.hash)?.unwrap();
        assert_eq!(stored.next_review_at, ts("2025-07-07T11:00:00.000Z"));
        Ok(())
    }

    #[test]
    fn test_reviews_outlive_deck() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        let deck = db.add_deck("deck", created_at)?;
        let card = db.add_card(&deck, "card", created_at)?;
        let review = review_of(&card, &deck, ReviewFeedback::Ok, "2025-07-01T11:00:00.000Z");
        db.record_review(&review, ts("2025-07-02T11:00:00.000Z"))?;

        assert_eq!(db.delete_deck(&deck)?, 1);
        assert!(db.decks()?.is_empty());
        assert!(db.cards(None)?.is_empty());
        assert_eq!(db.reviews()?, vec![review]);
        Ok(())
    }

    #[test]
    fn test_far_future_next_review() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        let deck = db.add_deck("deck", created_at)?;
        let card = db.add_card(&deck, "card", created_at)?;
        let other = db.add_card(&deck, "other", created_at)?;
        let review = review_of(&card, &deck, ReviewFeedback::Ok, "2025-07-01T11:00:00.000Z");
        let far = created_at.plus_days(u32::MAX);
        db.record_review(&review, far)?;

        let stored = db.card(card.hash)?.unwrap();
        assert_eq!(stored.next_review_at, far);
        assert_eq!(stored.next_review_at.to_string(), "9999-12-31T23:59:59.999Z");
        assert_eq!(db.cards(None)?.len(), 2);
        assert_eq!(db.card(other.hash)?, Some(other));
        Ok(())
    }

    #[test]
    fn test_import_deck() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        let contents = vec!["one".to_string(), "two".to_string()];
        let (deck, cards) = db.import_deck("deck", Some("numbers"), &contents, created_at)?;
        assert_eq!(db.decks()?, vec![deck.clone()]);
        assert_eq!(db.deck_description(&deck)?, Some("numbers".to_string()));
        assert_eq!(db.cards(Some(deck.id))?, cards);
        Ok(())
    }

    #[test]
    fn test_import_deck_rolls_back_on_duplicate_card() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let created_at = ts("2025-07-01T10:00:00.000Z");
        let contents = vec!["one".to_string(), "two".to_string(), "one".to_string()];
        let err = db.import_deck("deck", None, &contents, created_at).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error: card already exists in deck 'deck': 'one'"
        );
        assert!(db.decks()?.is_empty());
        assert!(db.cards(None)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_plain_deck_has_no_description() -> Fallible<()> {
        let (_dir, mut db) = open_tmp()?;
        let deck = db.add_deck("deck", ts("2025-07-01T10:00:00.000Z"))?;
        assert_eq!(db.deck_description(&deck)?, None);
        Ok(())
    }

    #[test]
    fn test_reopen() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("revisit.db");
        {
            let mut db = Database::open(&path)?;
            db.add_deck("deck", ts("2025-07-01T10:00:00.000Z"))?;
        }
        let db = Database::open(&path)?;
        assert_eq!(db.decks()?.len(), 1);
        Ok(())
    }
}
