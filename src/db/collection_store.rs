use crate::db::mongo::USERS_DB;
use crate::error::StoreError;
use crate::models::reward::RewardRecord;
use crate::services::collaborators::CollectionStore;
use async_trait::async_trait;
use bson::{doc, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::Client;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectedPlace {
    place_name: String,
}

/*
    Users.Collections: places a user has collected on earlier trips
    Users.Rewards:     reward records; unexpired ones occupy inventory slots
*/
pub struct MongoCollectionStore {
    client: Arc<Client>,
}

impl MongoCollectionStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CollectionStore for MongoCollectionStore {
    async fn collected_place_names(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let collection = self
            .client
            .database(USERS_DB)
            .collection::<Document>("Collections");

        let cursor = collection
            .find(doc! { "userId": user_id })
            .projection(doc! { "placeName": 1 })
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        let mut names = Vec::with_capacity(documents.len());
        for document in documents {
            let place: CollectedPlace = bson::from_document(document)?;
            names.push(place.place_name);
        }
        Ok(names)
    }

    async fn inventory_count(&self, user_id: &str) -> Result<usize, StoreError> {
        let collection = self
            .client
            .database(USERS_DB)
            .collection::<RewardRecord>("Rewards");

        let filter = doc! {
            "owner_user_id": user_id,
            "valid_until": { "$gt": bson::DateTime::from_chrono(Utc::now()) },
        };
        let count = collection.count_documents(filter).await?;
        Ok(count as usize)
    }

    async fn insert_reward(&self, record: &RewardRecord) -> Result<(), StoreError> {
        let collection = self
            .client
            .database(USERS_DB)
            .collection::<RewardRecord>("Rewards");
        collection.insert_one(record).await?;
        Ok(())
    }
}
