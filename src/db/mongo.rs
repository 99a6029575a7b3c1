use crate::error::StoreError;
use log::{info, warn};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

pub const LOCATIONS_DB: &str = "Locations";
pub const DISCOVERY_DB: &str = "Discovery";
pub const USERS_DB: &str = "Users";
pub const MERCHANTS_DB: &str = "Merchants";

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, StoreError> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Stable API, MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client
        .database(LOCATIONS_DB)
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
    {
        Ok(_) => info!("Connected to MongoDB and verified with ping"),
        Err(e) => {
            warn!("Connected to MongoDB but ping failed: {}", e);
            warn!("Discovery will degrade to cache misses until the store recovers");
        }
    }

    Ok(Arc::new(client))
}
