use crate::db::mongo::LOCATIONS_DB;
use crate::error::StoreError;
use crate::models::catalog::MacroCategory;
use crate::models::location::{Coordinates, DistrictContext, RegionScope};
use crate::services::collaborators::LocationStore;
use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use log::debug;
use mongodb::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/*
    Locations.Districts: one document per district with its parent names denormalized.
    Locations.Places:    live POIs, counted per category for the quota weights.
*/
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DistrictDocument {
    district_id: i64,
    district_name: String,
    region_id: i64,
    region_name: String,
    country_id: i64,
    country_name: String,
    #[serde(default)]
    centroid: Option<Coordinates>,
}

impl From<DistrictDocument> for DistrictContext {
    fn from(doc: DistrictDocument) -> Self {
        Self {
            district_id: doc.district_id,
            district_name: doc.district_name,
            region_id: doc.region_id,
            region_name: doc.region_name,
            country_id: doc.country_id,
            country_name: doc.country_name,
            centroid: doc.centroid,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryCount {
    #[serde(rename = "_id")]
    category: String,
    count: i64,
}

pub struct MongoLocationStore {
    client: Arc<Client>,
}

impl MongoLocationStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

fn scope_filter(scope: RegionScope) -> Document {
    match scope {
        RegionScope::Region(id) => doc! { "regionId": id },
        RegionScope::Country(id) => doc! { "countryId": id },
    }
}

#[async_trait]
impl LocationStore for MongoLocationStore {
    async fn random_district(
        &self,
        scope: RegionScope,
    ) -> Result<Option<DistrictContext>, StoreError> {
        let collection = self
            .client
            .database(LOCATIONS_DB)
            .collection::<Document>("Districts");

        let pipeline = vec![
            doc! { "$match": scope_filter(scope) },
            doc! { "$sample": { "size": 1 } },
        ];
        let mut cursor = collection.aggregate(pipeline).await?;

        match cursor.try_next().await? {
            Some(document) => {
                let district: DistrictDocument = bson::from_document(document)?;
                Ok(Some(district.into()))
            }
            None => Ok(None),
        }
    }

    async fn category_inventory(
        &self,
        district: &DistrictContext,
    ) -> Result<HashMap<MacroCategory, u64>, StoreError> {
        let collection = self
            .client
            .database(LOCATIONS_DB)
            .collection::<Document>("Places");

        let pipeline = vec![
            doc! { "$match": { "regionId": district.region_id, "isActive": true } },
            doc! { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
        ];
        let mut cursor = collection.aggregate(pipeline).await?;

        let mut inventory = HashMap::new();
        while let Some(document) = cursor.try_next().await? {
            let row: CategoryCount = bson::from_document(document)?;
            match MacroCategory::ALL.iter().find(|c| c.as_str() == row.category) {
                Some(category) => {
                    inventory.insert(*category, row.count.max(0) as u64);
                }
                None => debug!("Ignoring unknown place category '{}'", row.category),
            }
        }

        Ok(inventory)
    }
}
