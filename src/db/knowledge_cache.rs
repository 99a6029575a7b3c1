use crate::db::mongo::DISCOVERY_DB;
use crate::error::StoreError;
use crate::models::candidate::{CacheEntry, CacheKey};
use crate::services::collaborators::KnowledgeCache;
use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use serde::Deserialize;
use std::sync::Arc;

/// Rejected names remembered per key. Older ones fall out of the prompt.
const MAX_REJECTED_NAMES: i64 = 30;

#[derive(Debug, Deserialize)]
struct RejectedName {
    name: String,
}

/*
    Discovery.PlaceCache:     verified POIs, several per (subcategory, district, city, country)
    Discovery.RejectedNames:  AI proposals that failed verification for a key
*/
pub struct MongoKnowledgeCache {
    client: Arc<Client>,
}

impl MongoKnowledgeCache {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn places(&self) -> Collection<CacheEntry> {
        self.client.database(DISCOVERY_DB).collection("PlaceCache")
    }

    fn rejected(&self) -> Collection<Document> {
        self.client.database(DISCOVERY_DB).collection("RejectedNames")
    }
}

fn key_filter(key: &CacheKey) -> Document {
    doc! {
        "subcategory": &key.subcategory,
        "district": &key.district,
        "city": &key.city,
        "country": &key.country,
    }
}

#[async_trait]
impl KnowledgeCache for MongoKnowledgeCache {
    /// A random cached entry for the key, so repeated runs see variety.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        let pipeline = vec![
            doc! { "$match": key_filter(key) },
            doc! { "$sample": { "size": 1 } },
        ];
        let mut cursor = self.places().aggregate(pipeline).await?;
        match cursor.try_next().await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), StoreError> {
        let mut filter = key_filter(&entry.key);
        filter.insert("name", entry.name.clone());
        self.places().replace_one(filter, &entry).upsert(true).await?;
        Ok(())
    }

    async fn rejected_names(&self, key: &CacheKey) -> Result<Vec<String>, StoreError> {
        let cursor = self
            .rejected()
            .find(key_filter(key))
            .sort(doc! { "rejectedAt": -1 })
            .limit(MAX_REJECTED_NAMES)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        let mut names = Vec::with_capacity(documents.len());
        for document in documents {
            let rejected: RejectedName = bson::from_document(document)?;
            names.push(rejected.name);
        }
        Ok(names)
    }

    async fn record_rejection(&self, key: &CacheKey, name: &str) -> Result<(), StoreError> {
        let mut filter = key_filter(key);
        filter.insert("name", name);
        self.rejected()
            .update_one(filter, doc! { "$set": { "rejectedAt": bson::DateTime::now() } })
            .upsert(true)
            .await?;
        Ok(())
    }
}
