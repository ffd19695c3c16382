// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wordhoard stats`, `wordhoard master`, and `wordhoard reset-progress`.

use wordhoard_core::{StudyStatistics, StudyStore, WordId, WordhoardError};
use wordhoard_srs::{format_interval, SqliteStudyStore, INTERVALS};

use crate::study::to_json;

/// Run the `wordhoard stats` command.
pub async fn run_stats(store: &SqliteStudyStore, json: bool) -> Result<(), WordhoardError> {
    let stats = store.get_study_statistics().await?;
    if json {
        println!("{}", to_json(&stats)?);
    } else {
        print!("{}", render_stats(&stats));
    }
    Ok(())
}

/// Run the `wordhoard master` command.
pub async fn run_master(
    store: &SqliteStudyStore,
    word_id: WordId,
    mastered: bool,
) -> Result<(), WordhoardError> {
    store.set_word_mastered(word_id, mastered).await?;
    if mastered {
        println!("word {word_id} marked mastered");
    } else {
        println!("word {word_id} back in rotation");
    }
    Ok(())
}

/// Run the `wordhoard reset-progress` command.
pub async fn run_reset_progress(
    store: &SqliteStudyStore,
    word_id: Option<WordId>,
) -> Result<(), WordhoardError> {
    match word_id {
        Some(word_id) => {
            if store.reset_word_progress(word_id).await? {
                println!("word {word_id}: progress cleared");
            } else {
                println!("word {word_id}: nothing to clear");
            }
        }
        None => {
            let removed = store.reset_progress().await?;
            println!("cleared progress for {removed} word(s)");
        }
    }
    Ok(())
}

fn render_stats(stats: &StudyStatistics) -> String {
    let mut out = format!(
        "words     {}\nmastered  {}\ndue       {}\ntoday     {}\n\nlevel  interval  words\n",
        stats.total_words, stats.mastered_words, stats.due_count, stats.today_learned
    );
    for (level, count) in stats.level_distribution.iter().enumerate() {
        out.push_str(&format!(
            "{level:>5}  {:>8}  {count}\n",
            format_interval(INTERVALS[level])
        ));
    }
    out
}
