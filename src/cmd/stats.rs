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
use std::io::Write;

use clap::ValueEnum;
use maud::Markup;
use maud::html;
use revisit_core::Fallible;
use revisit_core::Timestamp;
use revisit_core::UserStatistics;
use revisit_core::compute_statistics;
use serde::Deserialize;

use crate::cmd::template::page_template;
use crate::db::Database;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsFormat {
    /// Machine-readable JSON.
    Json,
    /// A standalone HTML page.
    Html,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Json => write!(f, "json"),
            StatsFormat::Html => write!(f, "html"),
        }
    }
}

pub fn print_stats(
    db: &Database,
    format: StatsFormat,
    today: Timestamp,
    out: &mut impl Write,
) -> Fallible<UserStatistics> {
    let decks = db.decks()?;
    let reviews = db.reviews()?;
    let stats = compute_statistics(today, &decks, &reviews);
    log::info!(
        "Computed statistics over {} reviews in {} decks",
        reviews.len(),
        decks.len()
    );
    match format {
        StatsFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &stats)?;
            writeln!(out)?;
        }
        StatsFormat::Html => {
            writeln!(out, "{}", render_stats(&stats).into_string())?;
        }
    }
    Ok(stats)
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn render_stats(stats: &UserStatistics) -> Markup {
    let body = html! {
        h1 { "Statistics" }
        div.metrics {
            div.metric {
                div.label { "Reviews" }
                div.value { (stats.total_reviews) }
            }
            div.metric {
                div.label { "Streak" }
                div.value { (stats.streak) " days" }
            }
            div.metric {
                div.label { "Success rate" }
                div.value { (percent(stats.success_rate)) }
            }
            div.metric {
                div.label { "Retention rate" }
                div.value { (percent(stats.retention_rate)) }
            }
        }
        h2 { "Decks" }
        @if stats.deck_statistics.is_empty() {
            p { "No decks." }
        } @else {
            table {
                thead {
                    tr {
                        th { "Deck" }
                        th { "Reviews" }
                        th { "Retention" }
                        th { "Last studied" }
                        th { "Difficulty" }
                    }
                }
                tbody {
                    @for deck in &stats.deck_statistics {
                        tr {
                            td { (deck.deck_name) }
                            td { (deck.total_reviews) }
                            td { (percent(deck.retention_rate)) }
                            td {
                                @if deck.never_studied() {
                                    "never"
                                } @else {
                                    (deck.last_studied.date())
                                }
                            }
                            td { (deck.difficulty_ranking) }
                        }
                    }
                }
            }
        }
        h2 { "Daily reviews" }
        @if stats.daily_reviews.is_empty() {
            p { "No reviews yet." }
        } @else {
            table {
                thead {
                    tr {
                        th { "Date" }
                        th { "Reviews" }
                    }
                }
                tbody {
                    @for (date, count) in stats.daily_reviews.iter().rev() {
                        tr {
                            td { (date) }
                            td { (count) }
                        }
                    }
                }
            }
        }
    };
    page_template("revisit: statistics", body)
}
