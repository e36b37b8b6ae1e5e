//! Entity shapes for the three collections plus the nested dictionary view
//!
//! Each stored entity carries a business-meaningful natural key (the kanji
//! character, the compound word, the sentence text) alongside a generated
//! `doc_id` assigned once at insert. Update shapes use explicit `Option`
//! presence: `Some` overwrites the stored field, `None` leaves it alone,
//! so a zero rating or an empty list is a real value and not "unset".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kana section heading a kanji is filed under in the jouyou table,
/// ordered あ through わ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KanjiSection {
    #[serde(rename = "あ")]
    A,
    #[serde(rename = "い")]
    I,
    #[serde(rename = "う")]
    U,
    #[serde(rename = "え")]
    E,
    #[serde(rename = "お")]
    O,
    #[serde(rename = "か")]
    Ka,
    #[serde(rename = "き")]
    Ki,
    #[serde(rename = "く")]
    Ku,
    #[serde(rename = "け")]
    Ke,
    #[serde(rename = "こ")]
    Ko,
    #[serde(rename = "さ")]
    Sa,
    #[serde(rename = "し")]
    Shi,
    #[serde(rename = "す")]
    Su,
    #[serde(rename = "せ")]
    Se,
    #[serde(rename = "そ")]
    So,
    #[serde(rename = "た")]
    Ta,
    #[serde(rename = "ち")]
    Chi,
    #[serde(rename = "つ")]
    Tsu,
    #[serde(rename = "て")]
    Te,
    #[serde(rename = "と")]
    To,
    #[serde(rename = "な")]
    Na,
    #[serde(rename = "に")]
    Ni,
    #[serde(rename = "ぬ")]
    Nu,
    #[serde(rename = "ね")]
    Ne,
    #[serde(rename = "の")]
    No,
    #[serde(rename = "は")]
    Ha,
    #[serde(rename = "ひ")]
    Hi,
    #[serde(rename = "ふ")]
    Fu,
    #[serde(rename = "へ")]
    He,
    #[serde(rename = "ほ")]
    Ho,
    #[serde(rename = "ま")]
    Ma,
    #[serde(rename = "み")]
    Mi,
    #[serde(rename = "む")]
    Mu,
    #[serde(rename = "め")]
    Me,
    #[serde(rename = "も")]
    Mo,
    #[serde(rename = "や")]
    Ya,
    #[serde(rename = "ゆ")]
    Yu,
    #[serde(rename = "よ")]
    Yo,
    #[serde(rename = "ら")]
    Ra,
    #[serde(rename = "り")]
    Ri,
    #[serde(rename = "る")]
    Ru,
    #[serde(rename = "れ")]
    Re,
    #[serde(rename = "ろ")]
    Ro,
    #[serde(rename = "わ")]
    Wa,
}

/// A single jouyou kanji.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kanji {
    /// Generated storage identifier; absent until the record is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Natural key: the kanji character itself
    pub kanji: String,
    /// Ordinal in the jouyou (common use) list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jouyou_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kanji_section: Option<KanjiSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jlpt_level: Option<String>,
    /// Ranking of most used in newspapers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_rank: Option<i64>,
    #[serde(default)]
    pub onyomi: Vec<String>,
    #[serde(default)]
    pub kunyomi: Vec<String>,
    #[serde(default)]
    pub meaning: Vec<String>,
    /// Set server-side at creation, not refreshed by updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update for a kanji record; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KanjiUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kanji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jouyou_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kanji_section: Option<KanjiSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jlpt_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onyomi: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kunyomi: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<Vec<String>>,
}

impl Kanji {
    /// Field-level merge: overwrite each field the update carries.
    pub fn merge(&mut self, update: &KanjiUpdate) {
        if let Some(kanji) = &update.kanji {
            self.kanji = kanji.clone();
        }
        if let Some(jouyou_number) = update.jouyou_number {
            self.jouyou_number = Some(jouyou_number);
        }
        if let Some(kanji_section) = update.kanji_section {
            self.kanji_section = Some(kanji_section);
        }
        if let Some(radical) = &update.radical {
            self.radical = Some(radical.clone());
        }
        if let Some(strokes) = update.strokes {
            self.strokes = Some(strokes);
        }
        if let Some(jlpt_level) = &update.jlpt_level {
            self.jlpt_level = Some(jlpt_level.clone());
        }
        if let Some(frequency_rank) = update.frequency_rank {
            self.frequency_rank = Some(frequency_rank);
        }
        if let Some(onyomi) = &update.onyomi {
            self.onyomi = onyomi.clone();
        }
        if let Some(kunyomi) = &update.kunyomi {
            self.kunyomi = kunyomi.clone();
        }
        if let Some(meaning) = &update.meaning {
            self.meaning = meaning.clone();
        }
    }
}

/// A compound word built from one or more kanji.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundWord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Natural key
    pub compound_word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiragana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    /// Kanji natural keys this word is filed under. Order is first-seen;
    /// reconciliation only ever appends.
    #[serde(default)]
    pub related_kanji: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update for a compound word; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundWordUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compound_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiragana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_kanji: Option<Vec<String>>,
}

impl CompoundWord {
    pub fn merge(&mut self, update: &CompoundWordUpdate) {
        if let Some(compound_word) = &update.compound_word {
            self.compound_word = compound_word.clone();
        }
        if let Some(hiragana) = &update.hiragana {
            self.hiragana = Some(hiragana.clone());
        }
        if let Some(translation) = &update.translation {
            self.translation = Some(translation.clone());
        }
        if let Some(rating) = update.rating {
            self.rating = Some(rating);
        }
        if let Some(related_kanji) = &update.related_kanji {
            self.related_kanji = related_kanji.clone();
        }
    }
}

/// An example sentence; same shape as a compound word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleSentence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Natural key
    pub example_sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiragana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub related_kanji: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update for an example sentence; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleSentenceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hiragana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_kanji: Option<Vec<String>>,
}

impl ExampleSentence {
    pub fn merge(&mut self, update: &ExampleSentenceUpdate) {
        if let Some(example_sentence) = &update.example_sentence {
            self.example_sentence = example_sentence.clone();
        }
        if let Some(hiragana) = &update.hiragana {
            self.hiragana = Some(hiragana.clone());
        }
        if let Some(translation) = &update.translation {
            self.translation = Some(translation.clone());
        }
        if let Some(rating) = update.rating {
            self.rating = Some(rating);
        }
        if let Some(related_kanji) = &update.related_kanji {
            self.related_kanji = related_kanji.clone();
        }
    }
}

/// Nested dictionary entry: one kanji plus the compound words and example
/// sentences filed under it. The bulk-import input shape and the read-side
/// output shape; never persisted as its own document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KanjiDict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kanji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jouyou_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kanji_section: Option<KanjiSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jlpt_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onyomi: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kunyomi: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<Vec<String>>,
    #[serde(default)]
    pub compound_words: Vec<CompoundWord>,
    #[serde(default)]
    pub example_sentences: Vec<ExampleSentence>,
}

impl KanjiDict {
    /// Kanji update shape carrying the fields set on this entry.
    pub fn kanji_update(&self) -> KanjiUpdate {
        KanjiUpdate {
            kanji: self.kanji.clone(),
            jouyou_number: self.jouyou_number,
            kanji_section: self.kanji_section,
            radical: self.radical.clone(),
            strokes: self.strokes,
            jlpt_level: self.jlpt_level.clone(),
            frequency_rank: self.frequency_rank,
            onyomi: self.onyomi.clone(),
            kunyomi: self.kunyomi.clone(),
            meaning: self.meaning.clone(),
        }
    }

    /// Fresh kanji record from this entry, keyed by `key`.
    pub fn to_kanji(&self, key: &str) -> Kanji {
        Kanji {
            doc_id: None,
            kanji: key.to_string(),
            jouyou_number: self.jouyou_number,
            kanji_section: self.kanji_section,
            radical: self.radical.clone(),
            strokes: self.strokes,
            jlpt_level: self.jlpt_level.clone(),
            frequency_rank: self.frequency_rank,
            onyomi: self.onyomi.clone().unwrap_or_default(),
            kunyomi: self.kunyomi.clone().unwrap_or_default(),
            meaning: self.meaning.clone().unwrap_or_default(),
            updated_at: None,
        }
    }
}

impl From<Kanji> for KanjiDict {
    fn from(kanji: Kanji) -> Self {
        KanjiDict {
            doc_id: kanji.doc_id,
            kanji: Some(kanji.kanji),
            jouyou_number: kanji.jouyou_number,
            kanji_section: kanji.kanji_section,
            radical: kanji.radical,
            strokes: kanji.strokes,
            jlpt_level: kanji.jlpt_level,
            frequency_rank: kanji.frequency_rank,
            onyomi: Some(kanji.onyomi),
            kunyomi: Some(kanji.kunyomi),
            meaning: Some(kanji.meaning),
            compound_words: Vec::new(),
            example_sentences: Vec::new(),
        }
    }
}

/// Listing filter shared by the three repositories. Both sets use `in`
/// (OR) semantics; `related_kanji` matches on intersection with a record's
/// relation list. Offset and limit are applied in memory after filtering,
/// uniformly for all entity kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub related_kanji: Vec<String>,
    pub ratings: Vec<i64>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}
