use crate::db::mongo::MERCHANTS_DB;
use crate::error::StoreError;
use crate::models::reward::{Promotion, PromotionLookup};
use crate::services::collaborators::PromotionStore;
use async_trait::async_trait;
use bson::{doc, Document};
use chrono::Utc;
use mongodb::Client;
use std::sync::Arc;

/*
    Merchants.Promotions: active promotional overlays keyed by place_id, or by
    name + district + city for places the merchant registered by hand.
*/
pub struct MongoPromotionStore {
    client: Arc<Client>,
}

impl MongoPromotionStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

fn lookup_filter(lookup: &PromotionLookup<'_>) -> Document {
    let mut matches = vec![doc! {
        "name": lookup.name,
        "district": lookup.district,
        "city": lookup.city,
    }];
    if let Some(place_id) = lookup.place_id {
        matches.insert(0, doc! { "place_id": place_id });
    }

    let now = bson::DateTime::from_chrono(Utc::now());
    doc! {
        "active": true,
        "$or": matches,
        "$and": [
            { "$or": [ { "starts_at": null }, { "starts_at": { "$lte": now } } ] },
            { "$or": [ { "ends_at": null }, { "ends_at": { "$gt": now } } ] },
        ],
    }
}

#[async_trait]
impl PromotionStore for MongoPromotionStore {
    async fn active_promotion(
        &self,
        lookup: &PromotionLookup<'_>,
    ) -> Result<Option<Promotion>, StoreError> {
        let collection = self
            .client
            .database(MERCHANTS_DB)
            .collection::<Promotion>("Promotions");
        Ok(collection.find_one(lookup_filter(lookup)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_id_is_matched_first() {
        let lookup = PromotionLookup {
            place_id: Some("ChIJ123"),
            name: "Longshan Temple",
            district: "Wanhua",
            city: "Taipei",
        };
        let filter = lookup_filter(&lookup);
        let alternatives = filter.get_array("$or").unwrap();
        assert_eq!(alternatives.len(), 2);
        assert_eq!(
            alternatives[0].as_document().unwrap().get_str("place_id").unwrap(),
            "ChIJ123"
        );
    }

    #[test]
    fn test_name_match_without_place_id() {
        let lookup = PromotionLookup {
            place_id: None,
            name: "Night Market",
            district: "Shilin",
            city: "Taipei",
        };
        let filter = lookup_filter(&lookup);
        let alternatives = filter.get_array("$or").unwrap();
        assert_eq!(alternatives.len(), 1);
        assert_eq!(
            alternatives[0].as_document().unwrap().get_str("district").unwrap(),
            "Shilin"
        );
    }
}
