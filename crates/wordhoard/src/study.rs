// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wordhoard study`, `wordhoard answer`, and `wordhoard show`.

use wordhoard_core::{FlashCardWord, StudyStore, WordDetails, WordId, WordhoardError};
use wordhoard_srs::{format_interval, SqliteStudyStore};

use crate::StudyMode;

/// Run the `wordhoard study` command.
pub async fn run_study(
    store: &SqliteStudyStore,
    mode: StudyMode,
    limit: u32,
    json: bool,
) -> Result<(), WordhoardError> {
    let cards = match mode {
        StudyMode::Review => store.get_words_for_review(limit).await?,
        StudyMode::New => store.get_new_words_for_learning(limit).await?,
        StudyMode::Mixed => store.get_mixed_words_for_practice(limit).await?,
    };

    if json {
        println!("{}", to_json(&cards)?);
        return Ok(());
    }
    if cards.is_empty() {
        println!("nothing to study");
        return Ok(());
    }
    for card in &cards {
        println!("{}", card_line(card));
    }
    Ok(())
}

/// Run the `wordhoard answer` command.
pub async fn run_answer(
    store: &SqliteStudyStore,
    word_id: WordId,
    is_correct: bool,
) -> Result<(), WordhoardError> {
    let stat = store.update_learning_stats(word_id, is_correct).await?;
    println!(
        "word {word_id}: level {}, next review {} ({})",
        stat.memory_level,
        stat.due_date,
        format_interval(stat.last_interval)
    );
    Ok(())
}

/// Run the `wordhoard show` command.
pub async fn run_show(store: &SqliteStudyStore, word_id: WordId) -> Result<(), WordhoardError> {
    let details = store.get_word_details(word_id).await?;
    print!("{}", render_details(&details));
    Ok(())
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, WordhoardError> {
    serde_json::to_string_pretty(value).map_err(|e| WordhoardError::Internal(e.to_string()))
}

fn card_line(card: &FlashCardWord) -> String {
    let mut line = format!(
        "[{:>5}] {:<6} {}",
        card.word.id,
        card.source.to_string(),
        card.word.word
    );
    if let Some(pos) = &card.word.pos {
        line.push_str(&format!(" {pos}"));
    }
    if let Some(definition) = &card.definition {
        line.push_str(&format!(" - {definition}"));
    }
    if let Some(stat) = &card.stat {
        line.push_str(&format!(" (level {})", stat.memory_level));
    }
    line
}

fn render_details(details: &WordDetails) -> String {
    let word = &details.word;
    let mut out = format!("{} [{}]", word.word, word.id);
    if let Some(pos) = &word.pos {
        out.push_str(&format!(" {pos}"));
    }
    if let Some(phonetic) = &word.phonetic {
        out.push_str(&format!("  UK {phonetic}"));
    }
    if let Some(phonetic_am) = &word.phonetic_am {
        out.push_str(&format!("  US {phonetic_am}"));
    }
    if word.mastered {
        out.push_str("  (mastered)");
    }
    out.push('\n');

    for (i, entry) in details.senses.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, entry.sense.definition));
        for example in &entry.examples {
            match &example.cf {
                Some(cf) => out.push_str(&format!("     - {} ({cf})\n", example.x)),
                None => out.push_str(&format!("     - {}\n", example.x)),
            }
        }
    }

    match &details.stat {
        Some(stat) => out.push_str(&format!(
            "  level {} | seen {} | correct {} | due {}\n",
            stat.memory_level, stat.times_seen, stat.times_correct, stat.due_date
        )),
        None => out.push_str("  not studied yet\n"),
    }
    out
}
