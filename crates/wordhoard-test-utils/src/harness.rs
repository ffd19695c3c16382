// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` writes a seed database shaped like the packaged one (no
//! `mastered` column, no `learning_stats` table) so every run also
//! exercises bootstrap and migration. The store it builds reads "today"
//! from a [`FixedClock`] the test can advance.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::params;
use tempfile::TempDir;
use wordhoard_config::WordhoardConfig;
use wordhoard_core::{FixedClock, StudyStore, WordhoardError};
use wordhoard_srs::SqliteStudyStore;

/// One sense of a seed word.
#[derive(Debug, Clone)]
pub struct SeedSense {
    pub definition: String,
    /// `(collocation, sentence)` pairs in display order.
    pub examples: Vec<(Option<String>, String)>,
}

/// One word of the seed database.
#[derive(Debug, Clone)]
pub struct SeedWord {
    pub word: String,
    pub pos: String,
    pub senses: Vec<SeedSense>,
}

impl SeedWord {
    /// A noun with one sense and one example.
    pub fn simple(word: &str) -> Self {
        Self {
            word: word.to_string(),
            pos: "n.".to_string(),
            senses: vec![SeedSense {
                definition: format!("definition of {word}"),
                examples: vec![(None, format!("{word} in a sentence."))],
            }],
        }
    }
}

const SEED_SCHEMA: &str = "
    CREATE TABLE words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT NOT NULL,
        pos TEXT,
        phonetic TEXT,
        phonetic_text TEXT,
        phonetic_am TEXT,
        phonetic_am_text TEXT,
        created_at TEXT
    );
    CREATE TABLE senses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word_id INTEGER NOT NULL REFERENCES words(id),
        definition TEXT,
        sense_order INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE examples (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sense_id INTEGER NOT NULL REFERENCES senses(id),
        cf TEXT,
        x TEXT,
        example_order INTEGER NOT NULL DEFAULT 0
    );";

/// Write a packaged-style seed database holding `words` to `path`.
///
/// Word ids follow the slice order starting at 1.
pub fn write_seed(path: &Path, words: &[SeedWord]) -> Result<(), rusqlite::Error> {
    let mut conn = rusqlite::Connection::open(path)?;
    conn.execute_batch(SEED_SCHEMA)?;
    let tx = conn.transaction()?;
    for (i, word) in words.iter().enumerate() {
        let word_id = i as i64 + 1;
        tx.execute(
            "INSERT INTO words (id, word, pos, phonetic, phonetic_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, '2026-01-01T00:00:00.000Z')",
            params![
                word_id,
                word.word,
                word.pos,
                format!("/{}/", word.word),
                format!("[{}]", word.word)
            ],
        )?;
        for (order, sense) in word.senses.iter().enumerate() {
            tx.execute(
                "INSERT INTO senses (word_id, definition, sense_order) VALUES (?1, ?2, ?3)",
                params![word_id, sense.definition, order as i64 + 1],
            )?;
            let sense_id = tx.last_insert_rowid();
            for (ex_order, (cf, x)) in sense.examples.iter().enumerate() {
                tx.execute(
                    "INSERT INTO examples (sense_id, cf, x, example_order)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![sense_id, cf, x, ex_order as i64 + 1],
                )?;
            }
        }
    }
    tx.commit()
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    words: Vec<SeedWord>,
    today: NaiveDate,
    clock: Option<FixedClock>,
    seeded: bool,
    configure: Option<Box<dyn FnOnce(&mut WordhoardConfig)>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            words: Vec::new(),
            today: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default(),
            clock: None,
            seeded: true,
            configure: None,
        }
    }

    /// Add simple seed words, one sense and one example each.
    pub fn with_words(mut self, words: &[&str]) -> Self {
        self.words.extend(words.iter().map(|w| SeedWord::simple(w)));
        self
    }

    /// Add a fully specified seed word.
    pub fn with_word(mut self, word: SeedWord) -> Self {
        self.words.push(word);
        self
    }

    /// Pin the clock to `today` (noon UTC).
    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Use `clock` as is, e.g. one with a non-UTC offset. Overrides [`Self::on`].
    pub fn with_clock(mut self, clock: FixedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Configure no seed file; the database starts empty.
    pub fn without_seed(mut self) -> Self {
        self.seeded = false;
        self
    }

    /// Adjust the generated configuration before the store is built.
    pub fn configure(mut self, f: impl FnOnce(&mut WordhoardConfig) + 'static) -> Self {
        self.configure = Some(Box::new(f));
        self
    }

    /// Build the harness: temp directory, seed file, config, clock, store.
    pub fn build(self) -> Result<TestHarness, WordhoardError> {
        let temp_dir = TempDir::new().map_err(|e| WordhoardError::Internal(e.to_string()))?;
        let database_path = temp_dir.path().join("data").join("wordhoard.db");
        let seed_path = temp_dir.path().join("seed.db");

        if self.seeded {
            write_seed(&seed_path, &self.words)
                .map_err(|e| WordhoardError::bootstrap("writing test seed failed", e))?;
        }

        let mut config = WordhoardConfig::default();
        config.storage.database_path = database_path.display().to_string();
        config.storage.seed_path = self.seeded.then(|| seed_path.display().to_string());
        config.queue.retry_base_delay_ms = 5;
        config.queue.settle_delay_ms = 0;
        config.init.retry_delay_ms = 10;
        config.init.ready_poll_ms = 5;
        if let Some(configure) = self.configure {
            configure(&mut config);
        }

        let clock = Arc::new(self.clock.unwrap_or_else(|| FixedClock::on(self.today)));
        let store = SqliteStudyStore::with_clock(&config, clock.clone());

        Ok(TestHarness {
            store,
            clock,
            config,
            temp_dir,
        })
    }
}

/// A seeded temporary environment and a store over it.
pub struct TestHarness {
    /// The store under test (not yet initialized).
    pub store: SqliteStudyStore,
    /// The clock shared by every store this harness builds.
    pub clock: Arc<FixedClock>,
    /// Configuration pointing at the temporary paths.
    pub config: WordhoardConfig,
    /// Temp directory kept alive for cleanup on drop.
    temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Initialize [`Self::store`] and return the harness.
    pub async fn ready(self) -> Result<Self, WordhoardError> {
        self.store.initialize().await?;
        Ok(self)
    }

    /// A second, independent store over the same files, as after an app restart.
    pub fn reopen(&self) -> SqliteStudyStore {
        SqliteStudyStore::with_clock(&self.config, self.clock.clone())
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.config.storage.database_path)
    }

    pub fn seed_path(&self) -> Option<PathBuf> {
        self.config.storage.seed_path.as_ref().map(PathBuf::from)
    }

    /// Root of the temporary directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write the configuration as `wordhoard.toml` in the temp directory.
    pub fn write_config_file(&self) -> Result<PathBuf, WordhoardError> {
        let path = self.dir().join("wordhoard.toml");
        let rendered =
            toml::to_string(&self.config).map_err(|e| WordhoardError::Config(e.to_string()))?;
        std::fs::write(&path, rendered).map_err(|e| WordhoardError::Internal(e.to_string()))?;
        Ok(path)
    }
}
