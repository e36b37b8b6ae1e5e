//! Entity repositories
//!
//! One logical collection per entity kind, wrapped by a repository that is
//! generic over the kind. The repository owns the natural-key and id
//! lookups, filtered listing, create with duplicate rejection, field-level
//! merge updates, and delete-by-id.
//!
//! The store enforces no uniqueness constraint, so `create` checks for an
//! existing natural key first. That check and the subsequent insert are
//! not atomic as a pair; concurrent writers racing on the same key can
//! still duplicate a record.

use crate::models::{
    CompoundWord, CompoundWordUpdate, ExampleSentence, ExampleSentenceUpdate, Kanji, KanjiUpdate,
    ListFilter,
};
use crate::store::{Filter, Store, DOC_ID_FIELD};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, info};

/// One storable entity kind.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Partial-update shape for this kind
    type Update: Serialize + Send + Sync;

    /// Backing collection name
    const COLLECTION: &'static str;
    /// Document field holding the natural key
    const KEY_FIELD: &'static str;
    /// Human-readable kind name for error messages
    const KIND: &'static str;

    fn natural_key(&self) -> &str;
    fn doc_id(&self) -> Option<&str>;
    fn set_doc_id(&mut self, doc_id: String);
    fn set_updated_at(&mut self, at: DateTime<Utc>);
    /// Field-level merge; update fields that are `None` leave the stored
    /// value untouched.
    fn merge(&mut self, update: &Self::Update);
}

impl Entity for Kanji {
    type Update = KanjiUpdate;

    const COLLECTION: &'static str = "kanji";
    const KEY_FIELD: &'static str = "kanji";
    const KIND: &'static str = "kanji";

    fn natural_key(&self) -> &str {
        &self.kanji
    }
    fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }
    fn set_doc_id(&mut self, doc_id: String) {
        self.doc_id = Some(doc_id);
    }
    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
    fn merge(&mut self, update: &KanjiUpdate) {
        Kanji::merge(self, update);
    }
}

impl Entity for CompoundWord {
    type Update = CompoundWordUpdate;

    const COLLECTION: &'static str = "kanji_compound_word";
    const KEY_FIELD: &'static str = "compound_word";
    const KIND: &'static str = "compound word";

    fn natural_key(&self) -> &str {
        &self.compound_word
    }
    fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }
    fn set_doc_id(&mut self, doc_id: String) {
        self.doc_id = Some(doc_id);
    }
    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
    fn merge(&mut self, update: &CompoundWordUpdate) {
        CompoundWord::merge(self, update);
    }
}

impl Entity for ExampleSentence {
    type Update = ExampleSentenceUpdate;

    const COLLECTION: &'static str = "kanji_example_sentence";
    const KEY_FIELD: &'static str = "example_sentence";
    const KIND: &'static str = "example sentence";

    fn natural_key(&self) -> &str {
        &self.example_sentence
    }
    fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }
    fn set_doc_id(&mut self, doc_id: String) {
        self.doc_id = Some(doc_id);
    }
    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
    fn merge(&mut self, update: &ExampleSentenceUpdate) {
        ExampleSentence::merge(self, update);
    }
}

/// Repository over one entity kind's collection.
#[derive(Clone)]
pub struct Repository<E: Entity> {
    collection: crate::store::Collection,
    _kind: PhantomData<E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(store: &Store) -> Self {
        Self {
            collection: store.collection(E::COLLECTION),
            _kind: PhantomData,
        }
    }

    /// Exact-match lookup by natural key; `None` when absent.
    pub async fn find_by_natural_key(&self, key: &str) -> Result<Option<E>> {
        debug!(kind = E::KIND, key, "lookup by natural key");
        let filter = Filter::new().eq(E::KEY_FIELD, key);
        self.collection
            .find_one(&filter)
            .await?
            .map(decode::<E>)
            .transpose()
    }

    /// Lookup by generated identifier; `None` when absent.
    pub async fn find_by_id(&self, doc_id: &str) -> Result<Option<E>> {
        debug!(kind = E::KIND, doc_id, "lookup by id");
        let filter = Filter::new().eq(DOC_ID_FIELD, doc_id);
        self.collection
            .find_one(&filter)
            .await?
            .map(decode::<E>)
            .transpose()
    }

    /// Filtered listing. The empty filter returns every record; order is
    /// undefined. Offset and limit are applied in memory after filtering.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<E>> {
        let mut query = Filter::new();
        if !filter.related_kanji.is_empty() {
            query = query.is_in("related_kanji", filter.related_kanji.iter().cloned());
        }
        if !filter.ratings.is_empty() {
            query = query.is_in("rating", filter.ratings.iter().copied());
        }

        let docs = self.collection.find(&query).await?;
        let decoded = docs
            .into_iter()
            .map(decode::<E>)
            .collect::<Result<Vec<_>>>()?;

        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(usize::MAX);
        let records: Vec<E> = decoded.into_iter().skip(offset).take(limit).collect();

        info!(kind = E::KIND, count = records.len(), "retrieved records");
        Ok(records)
    }

    /// Insert a new record, rejecting a natural key that already has one.
    /// Assigns the generated identifier and the `updated_at` timestamp;
    /// returns the stored form.
    pub async fn create(&self, mut entity: E) -> Result<E> {
        let key = entity.natural_key().to_string();
        if self.find_by_natural_key(&key).await?.is_some() {
            return Err(Error::AlreadyExists(format!(
                "{} '{}' already exists",
                E::KIND,
                key
            )));
        }

        entity.set_updated_at(Utc::now());
        let doc = serde_json::to_value(&entity)?;
        let doc_id = self.collection.insert_one(doc).await?;
        entity.set_doc_id(doc_id);

        info!(kind = E::KIND, key = %key, "created record");
        Ok(entity)
    }

    /// Field-level merge update by identifier, written back as a full
    /// replace. `updated_at` is not refreshed.
    pub async fn update_by_id(&self, doc_id: &str, update: &E::Update) -> Result<E> {
        let mut entity = self.find_by_id(doc_id).await?.ok_or_else(|| {
            Error::NotFound(format!("{} '{}' not found", E::KIND, doc_id))
        })?;

        entity.merge(update);
        let doc = serde_json::to_value(&entity)?;
        self.collection
            .replace_one(&Filter::new().eq(DOC_ID_FIELD, doc_id), doc)
            .await?;

        info!(kind = E::KIND, doc_id, "updated record");
        Ok(entity)
    }

    /// Remove exactly one record by identifier.
    pub async fn delete_by_id(&self, doc_id: &str) -> Result<()> {
        let removed = self
            .collection
            .delete_one(&Filter::new().eq(DOC_ID_FIELD, doc_id))
            .await?;
        if removed == 0 {
            return Err(Error::NotFound(format!(
                "{} '{}' not found",
                E::KIND,
                doc_id
            )));
        }
        info!(kind = E::KIND, doc_id, "deleted record");
        Ok(())
    }

    /// Drop every record in the collection. Irreversible.
    pub async fn clear(&self) -> Result<()> {
        self.collection.drop().await
    }
}

fn decode<E: Entity>(doc: serde_json::Value) -> Result<E> {
    Ok(serde_json::from_value(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KanjiSection;

    async fn test_store() -> Store {
        Store::in_memory().await.expect("in-memory store")
    }

    fn word(key: &str, related: &[&str], rating: Option<i64>) -> CompoundWord {
        CompoundWord {
            doc_id: None,
            compound_word: key.to_string(),
            hiragana: Some("かな".into()),
            translation: Some("test".into()),
            rating,
            related_kanji: related.iter().map(|k| k.to_string()).collect(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp() {
        let store = test_store().await;
        let repo = Repository::<Kanji>::new(&store);

        let created = repo
            .create(Kanji {
                doc_id: None,
                kanji: "亜".into(),
                jouyou_number: Some(1),
                kanji_section: Some(KanjiSection::A),
                radical: Some("二".into()),
                strokes: Some(7),
                jlpt_level: Some("1".into()),
                frequency_rank: Some(1509),
                onyomi: vec!["ア".into()],
                kunyomi: vec![],
                meaning: vec!["asia".into()],
                updated_at: None,
            })
            .await
            .unwrap();

        assert!(created.doc_id.is_some());
        assert!(created.updated_at.is_some());

        let by_key = repo.find_by_natural_key("亜").await.unwrap().unwrap();
        assert_eq!(by_key.doc_id, created.doc_id);
        let by_id = repo
            .find_by_id(created.doc_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id.kanji, "亜");
    }

    #[tokio::test]
    async fn create_rejects_duplicate_natural_key() {
        let store = test_store().await;
        let repo = Repository::<CompoundWord>::new(&store);

        repo.create(word("亜鉛", &["亜"], None)).await.unwrap();
        let result = repo.create(word("亜鉛", &["鉛"], None)).await;
        assert!(matches!(result, Err(Error::AlreadyExists(_))));

        let all = repo.list(&ListFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn update_merges_only_set_fields() {
        let store = test_store().await;
        let repo = Repository::<CompoundWord>::new(&store);
        let created = repo.create(word("亜鉛", &["亜"], Some(3))).await.unwrap();
        let doc_id = created.doc_id.clone().unwrap();

        let updated = repo
            .update_by_id(
                &doc_id,
                &CompoundWordUpdate {
                    translation: Some("zinc".into()),
                    ..CompoundWordUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.translation.as_deref(), Some("zinc"));
        assert_eq!(updated.hiragana.as_deref(), Some("かな"));
        assert_eq!(updated.rating, Some(3));
        assert_eq!(updated.related_kanji, vec!["亜".to_string()]);

        // The merge is persisted, not just returned
        let stored = repo.find_by_id(&doc_id).await.unwrap().unwrap();
        assert_eq!(stored.translation.as_deref(), Some("zinc"));
        assert_eq!(stored.rating, Some(3));
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let store = test_store().await;
        let repo = Repository::<Kanji>::new(&store);
        let result = repo
            .update_by_id("no-such-id", &KanjiUpdate::default())
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_missing_id_is_not_found() {
        let store = test_store().await;
        let repo = Repository::<Kanji>::new(&store);
        repo.create(Kanji {
            doc_id: None,
            kanji: "亜".into(),
            jouyou_number: None,
            kanji_section: None,
            radical: None,
            strokes: None,
            jlpt_level: None,
            frequency_rank: None,
            onyomi: vec![],
            kunyomi: vec![],
            meaning: vec![],
            updated_at: None,
        })
        .await
        .unwrap();

        let result = repo.delete_by_id("no-such-id").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(repo.list(&ListFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_by_id_removes_exactly_one() {
        let store = test_store().await;
        let repo = Repository::<CompoundWord>::new(&store);
        let created = repo.create(word("亜鉛", &["亜"], None)).await.unwrap();
        repo.create(word("鉛筆", &["鉛"], None)).await.unwrap();

        repo.delete_by_id(created.doc_id.as_deref().unwrap())
            .await
            .unwrap();
        let remaining = repo.list(&ListFilter::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].compound_word, "鉛筆");
    }

    #[tokio::test]
    async fn list_filters_on_related_kanji_and_rating() {
        let store = test_store().await;
        let repo = Repository::<CompoundWord>::new(&store);
        repo.create(word("亜鉛", &["亜", "鉛"], Some(5))).await.unwrap();
        repo.create(word("鉛筆", &["鉛", "筆"], Some(2))).await.unwrap();
        repo.create(word("飴", &[], None)).await.unwrap();

        let by_kanji = repo
            .list(&ListFilter {
                related_kanji: vec!["亜".into()],
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_kanji.len(), 1);
        assert_eq!(by_kanji[0].compound_word, "亜鉛");

        let by_rating = repo
            .list(&ListFilter {
                ratings: vec![2, 3],
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_rating.len(), 1);
        assert_eq!(by_rating[0].compound_word, "鉛筆");

        let conjunction = repo
            .list(&ListFilter {
                related_kanji: vec!["鉛".into()],
                ratings: vec![5],
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(conjunction.len(), 1);
        assert_eq!(conjunction[0].compound_word, "亜鉛");
    }

    #[tokio::test]
    async fn list_applies_offset_and_limit() {
        let store = test_store().await;
        let repo = Repository::<CompoundWord>::new(&store);
        for key in ["一", "二", "三", "四"] {
            repo.create(word(key, &[], None)).await.unwrap();
        }

        let page = repo
            .list(&ListFilter {
                offset: Some(1),
                limit: Some(2),
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);

        let tail = repo
            .list(&ListFilter {
                offset: Some(3),
                ..ListFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(tail.len(), 1);
    }
}
