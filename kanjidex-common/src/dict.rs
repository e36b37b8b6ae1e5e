//! Dictionary-entry reconciliation, bulk import, and the denormalized view
//!
//! A dictionary entry nests one kanji with its compound words and example
//! sentences; the collections store each kind flat. Reconciliation
//! converges the flat records toward an incoming entry: the kanji is
//! upserted by natural key, and each embedded compound word or sentence
//! either gets the kanji appended to its `related_kanji` list (iff missing)
//! or is created fresh with `related_kanji == [kanji]`.
//!
//! Content fields of a pre-existing compound word or sentence are never
//! refreshed: first writer wins for content, last writer wins for relation
//! membership.
//!
//! There is no transaction across the three collections. A failure partway
//! through an entry leaves the earlier phases applied; the error names the
//! phase that failed so callers can see how far the entry got.

use crate::error::ReconcilePhase;
use crate::models::{CompoundWord, ExampleSentence, Kanji, KanjiDict, ListFilter};
use crate::repo::Repository;
use crate::store::Store;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// What reconciliation did with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    /// Record did not exist and was inserted
    Created,
    /// Existing kanji record merge-updated in place
    Updated,
    /// Kanji key appended to an existing record's relation list
    Linked,
    /// Existing record already listed the kanji
    Unchanged,
}

/// Per-sub-entity outcome within one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub key: String,
    pub action: ReconcileAction,
}

/// Structured result of reconciling one dictionary entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub kanji: String,
    pub kanji_action: ReconcileAction,
    pub compound_words: Vec<LinkReport>,
    pub example_sentences: Vec<LinkReport>,
}

/// Aggregate result of a bulk import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Whether the three collections were dropped before importing
    pub truncated: bool,
    pub entries: Vec<EntryReport>,
}

/// The dictionary core over the three entity repositories.
#[derive(Clone)]
pub struct Dictionary {
    kanji: Repository<Kanji>,
    compound_words: Repository<CompoundWord>,
    example_sentences: Repository<ExampleSentence>,
}

impl Dictionary {
    pub fn new(store: &Store) -> Self {
        Self {
            kanji: Repository::new(store),
            compound_words: Repository::new(store),
            example_sentences: Repository::new(store),
        }
    }

    /// Reconcile one entry against the flat collections.
    ///
    /// Idempotent with respect to record existence and `related_kanji`
    /// membership; not idempotent with respect to other mutable fields of
    /// pre-existing compound words and sentences (their content is never
    /// refreshed here).
    pub async fn reconcile(&self, entry: &KanjiDict) -> Result<EntryReport> {
        let key = entry
            .kanji
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::MalformedInput("dictionary entry is missing its kanji key".to_string())
            })?;

        let kanji_action = self
            .reconcile_kanji(entry, key)
            .await
            .map_err(|e| aborted(key, ReconcilePhase::Kanji, e))?;

        let mut compound_words = Vec::with_capacity(entry.compound_words.len());
        for word in &entry.compound_words {
            let report = self
                .link_compound_word(word, key)
                .await
                .map_err(|e| aborted(key, ReconcilePhase::CompoundWords, e))?;
            compound_words.push(report);
        }

        let mut example_sentences = Vec::with_capacity(entry.example_sentences.len());
        for sentence in &entry.example_sentences {
            let report = self
                .link_example_sentence(sentence, key)
                .await
                .map_err(|e| aborted(key, ReconcilePhase::ExampleSentences, e))?;
            example_sentences.push(report);
        }

        Ok(EntryReport {
            kanji: key.to_string(),
            kanji_action,
            compound_words,
            example_sentences,
        })
    }

    async fn reconcile_kanji(&self, entry: &KanjiDict, key: &str) -> Result<ReconcileAction> {
        match self.kanji.find_by_natural_key(key).await? {
            Some(existing) => {
                info!(kanji = %key, "kanji already exists, updating");
                let doc_id = existing
                    .doc_id
                    .as_deref()
                    .ok_or_else(|| Error::Internal(format!("stored kanji '{key}' has no doc_id")))?;
                self.kanji.update_by_id(doc_id, &entry.kanji_update()).await?;
                Ok(ReconcileAction::Updated)
            }
            None => {
                info!(kanji = %key, "kanji does not exist, creating");
                self.kanji.create(entry.to_kanji(key)).await?;
                Ok(ReconcileAction::Created)
            }
        }
    }

    async fn link_compound_word(
        &self,
        word: &CompoundWord,
        kanji_key: &str,
    ) -> Result<LinkReport> {
        if word.compound_word.is_empty() {
            return Err(Error::MalformedInput(format!(
                "embedded compound word under kanji '{kanji_key}' has no natural key"
            )));
        }

        match self
            .compound_words
            .find_by_natural_key(&word.compound_word)
            .await?
        {
            Some(existing) => {
                if existing.related_kanji.iter().any(|k| k == kanji_key) {
                    debug!(compound_word = %word.compound_word, kanji = %kanji_key,
                        "compound word already references kanji");
                    Ok(LinkReport {
                        key: word.compound_word.clone(),
                        action: ReconcileAction::Unchanged,
                    })
                } else {
                    info!(compound_word = %word.compound_word, kanji = %kanji_key,
                        "compound word already exists, appending related kanji");
                    let doc_id = existing.doc_id.as_deref().ok_or_else(|| {
                        Error::Internal(format!(
                            "stored compound word '{}' has no doc_id",
                            word.compound_word
                        ))
                    })?;
                    let mut related_kanji = existing.related_kanji.clone();
                    related_kanji.push(kanji_key.to_string());
                    self.compound_words
                        .update_by_id(
                            doc_id,
                            &crate::models::CompoundWordUpdate {
                                related_kanji: Some(related_kanji),
                                ..Default::default()
                            },
                        )
                        .await?;
                    Ok(LinkReport {
                        key: word.compound_word.clone(),
                        action: ReconcileAction::Linked,
                    })
                }
            }
            None => {
                let mut created = word.clone();
                created.doc_id = None;
                created.related_kanji = vec![kanji_key.to_string()];
                self.compound_words.create(created).await?;
                Ok(LinkReport {
                    key: word.compound_word.clone(),
                    action: ReconcileAction::Created,
                })
            }
        }
    }

    async fn link_example_sentence(
        &self,
        sentence: &ExampleSentence,
        kanji_key: &str,
    ) -> Result<LinkReport> {
        if sentence.example_sentence.is_empty() {
            return Err(Error::MalformedInput(format!(
                "embedded example sentence under kanji '{kanji_key}' has no natural key"
            )));
        }

        match self
            .example_sentences
            .find_by_natural_key(&sentence.example_sentence)
            .await?
        {
            Some(existing) => {
                if existing.related_kanji.iter().any(|k| k == kanji_key) {
                    debug!(example_sentence = %sentence.example_sentence, kanji = %kanji_key,
                        "example sentence already references kanji");
                    Ok(LinkReport {
                        key: sentence.example_sentence.clone(),
                        action: ReconcileAction::Unchanged,
                    })
                } else {
                    info!(example_sentence = %sentence.example_sentence, kanji = %kanji_key,
                        "example sentence already exists, appending related kanji");
                    let doc_id = existing.doc_id.as_deref().ok_or_else(|| {
                        Error::Internal(format!(
                            "stored example sentence '{}' has no doc_id",
                            sentence.example_sentence
                        ))
                    })?;
                    let mut related_kanji = existing.related_kanji.clone();
                    related_kanji.push(kanji_key.to_string());
                    self.example_sentences
                        .update_by_id(
                            doc_id,
                            &crate::models::ExampleSentenceUpdate {
                                related_kanji: Some(related_kanji),
                                ..Default::default()
                            },
                        )
                        .await?;
                    Ok(LinkReport {
                        key: sentence.example_sentence.clone(),
                        action: ReconcileAction::Linked,
                    })
                }
            }
            None => {
                let mut created = sentence.clone();
                created.doc_id = None;
                created.related_kanji = vec![kanji_key.to_string()];
                self.example_sentences.create(created).await?;
                Ok(LinkReport {
                    key: sentence.example_sentence.clone(),
                    action: ReconcileAction::Created,
                })
            }
        }
    }

    /// Bulk import. With `replace_all`, all three collections are dropped
    /// first (irreversible, no backup). Entries are processed strictly
    /// sequentially; the first failing entry aborts the remainder of the
    /// batch with earlier entries left applied.
    pub async fn import_all(&self, entries: &[KanjiDict], replace_all: bool) -> Result<ImportReport> {
        if replace_all {
            info!("replace_all set, dropping all three collections");
            self.kanji.clear().await?;
            self.compound_words.clear().await?;
            self.example_sentences.clear().await?;
        }

        info!(entries = entries.len(), "starting bulk import");
        let mut report = ImportReport {
            truncated: replace_all,
            entries: Vec::with_capacity(entries.len()),
        };
        for entry in entries {
            report.entries.push(self.reconcile(entry).await?);
        }
        info!(imported = report.entries.len(), "bulk import complete");
        Ok(report)
    }

    /// Join the three collections back into nested dictionary entries.
    ///
    /// A compound word or sentence listing several kanji appears under each
    /// of them (fan-out). A kanji referenced by no compound word and no
    /// sentence is omitted from the result entirely; callers wanting the
    /// complete kanji list must read the kanji collection directly.
    pub async fn build_all(&self) -> Result<Vec<KanjiDict>> {
        let kanjis = self.kanji.list(&ListFilter::default()).await?;
        let compound_words = self.compound_words.list(&ListFilter::default()).await?;
        let example_sentences = self.example_sentences.list(&ListFilter::default()).await?;

        let mut buckets: HashMap<String, Bucket> = HashMap::new();
        for word in &compound_words {
            for key in &word.related_kanji {
                buckets
                    .entry(key.clone())
                    .or_default()
                    .compound_words
                    .push(word.clone());
            }
        }
        for sentence in &example_sentences {
            for key in &sentence.related_kanji {
                buckets
                    .entry(key.clone())
                    .or_default()
                    .example_sentences
                    .push(sentence.clone());
            }
        }

        let mut dicts = Vec::new();
        for kanji in kanjis {
            let Some(bucket) = buckets.remove(&kanji.kanji) else {
                continue;
            };
            let mut dict = KanjiDict::from(kanji);
            dict.compound_words = bucket.compound_words;
            dict.example_sentences = bucket.example_sentences;
            dicts.push(dict);
        }

        info!(entries = dicts.len(), "assembled dictionary view");
        Ok(dicts)
    }
}

#[derive(Default)]
struct Bucket {
    compound_words: Vec<CompoundWord>,
    example_sentences: Vec<ExampleSentence>,
}

fn aborted(kanji: &str, phase: ReconcilePhase, source: Error) -> Error {
    Error::Reconcile {
        kanji: kanji.to_string(),
        phase,
        source: Box::new(source),
    }
}
