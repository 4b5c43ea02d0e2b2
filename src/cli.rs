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

use std::env;
use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use revisit_core::BasicScheduler;
use revisit_core::Fallible;
use revisit_core::ScheduleState;
use revisit_core::Timestamp;
use revisit_core::scheduler::DEFAULT_EASE_FACTOR;
use revisit_core::scheduler::DEFAULT_INTERVAL;
use revisit_core::scheduler::DEFAULT_REPETITIONS;

use crate::cmd::card::add_card;
use crate::cmd::card::delete_card;
use crate::cmd::card::list_cards;
use crate::cmd::deck::add_deck;
use crate::cmd::deck::delete_deck;
use crate::cmd::deck::list_decks;
use crate::cmd::due::list_due;
use crate::cmd::review::review_card;
use crate::cmd::schedule::print_schedule;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::transfer::export_deck;
use crate::cmd::transfer::import_deck;
use crate::config::Config;
use crate::config::DATABASE_ENV;
use crate::db::Database;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the review database. Overrides $REVISIT_DB and the config file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to the config file. By default, `revisit.toml` in the current
    /// directory is used if it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the next schedule state for a single review, without storing anything.
    Schedule {
        /// The review outcome: ok, skipped, or forgot.
        #[arg(long)]
        feedback: String,
        /// Consecutive successful reviews so far.
        #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
        repetitions: u32,
        /// The current ease factor.
        #[arg(long, default_value_t = DEFAULT_EASE_FACTOR)]
        ease_factor: f64,
        /// The current interval in days.
        #[arg(long, default_value_t = DEFAULT_INTERVAL)]
        interval: u32,
    },
    /// Commands relating to decks.
    Deck {
        #[command(subcommand)]
        command: DeckCommand,
    },
    /// Commands relating to cards.
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },
    /// Review a card and schedule its next review.
    Review {
        /// The card's hash, or a unique prefix of it.
        card: String,
        /// The review outcome: ok, skipped, or forgot.
        #[arg(long)]
        feedback: String,
    },
    /// List the cards that are due for review.
    Due {
        /// Only list cards from this deck.
        #[arg(long)]
        deck: Option<String>,
    },
    /// Print study statistics.
    Stats {
        /// Which output format to use. Default is json, or `stats_format` from the config file.
        #[arg(long)]
        format: Option<StatsFormat>,
    },
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a deck.
    Add { name: String },
    /// List all decks.
    List,
    /// Delete a deck and its cards. Review history is kept.
    Delete { name: String },
    /// Print a deck and its cards as a JSON deck file.
    Export { name: String },
    /// Create a deck from a JSON deck file.
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card to a deck and print its hash.
    Add {
        /// The deck to add the card to.
        #[arg(long)]
        deck: String,
        content: String,
    },
    /// List cards.
    List {
        /// Only list cards from this deck.
        #[arg(long)]
        deck: Option<String>,
    },
    /// Delete a card. Review history is kept.
    Delete {
        /// The card's hash, or a unique prefix of it.
        card: String,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let path = config.database_path(cli.db, env::var(DATABASE_ENV).ok());
    let now = Timestamp::now();
    let mut out = stdout().lock();
    match cli.command {
        Command::Schedule {
            feedback,
            repetitions,
            ease_factor,
            interval,
        } => {
            let state = ScheduleState {
                interval,
                ease_factor,
                repetitions,
            };
            print_schedule(&feedback, state, now, &mut out).map(|_| ())
        }
        Command::Deck { command } => {
            let mut db = Database::open(&path)?;
            match command {
                DeckCommand::Add { name } => add_deck(&mut db, &name, now, &mut out).map(|_| ()),
                DeckCommand::List => list_decks(&db, &mut out),
                DeckCommand::Delete { name } => delete_deck(&mut db, &name, &mut out),
                DeckCommand::Export { name } => export_deck(&db, &name, &mut out).map(|_| ()),
                DeckCommand::Import { file } => {
                    import_deck(&mut db, &file, now, &mut out).map(|_| ())
                }
            }
        }
        Command::Card { command } => {
            let mut db = Database::open(&path)?;
            match command {
                CardCommand::Add { deck, content } => {
                    add_card(&mut db, &deck, &content, now, &mut out).map(|_| ())
                }
                CardCommand::List { deck } => list_cards(&db, deck.as_deref(), &mut out),
                CardCommand::Delete { card } => delete_card(&mut db, &card, &mut out),
            }
        }
        Command::Review { card, feedback } => {
            let mut db = Database::open(&path)?;
            review_card(&mut db, &BasicScheduler, &card, &feedback, now, &mut out).map(|_| ())
        }
        Command::Due { deck } => {
            let db = Database::open(&path)?;
            list_due(&db, deck.as_deref(), now, &mut out)
        }
        Command::Stats { format } => {
            let db = Database::open(&path)?;
            let format = format
                .or(config.stats_format)
                .unwrap_or(StatsFormat::Json);
            print_stats(&db, format, now, &mut out).map(|_| ())
        }
    }
}
