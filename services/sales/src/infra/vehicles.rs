use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Deserializer};

use crate::domain::repository::VehicleCatalogPort;
use crate::domain::types::{Vehicle, VehicleStatus};
use crate::error::SalesServiceError;

/// Timeout for catalog lookups. Generous compared to the webhook timeout —
/// a slow catalog fails a single create request, not a sweep.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client implementing [`VehicleCatalogPort`] against the vehicle
/// catalog service (`GET <base>/api/vehicles/{id}`).
#[derive(Clone)]
pub struct HttpVehicleCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVehicleCatalog {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }
}

impl VehicleCatalogPort for HttpVehicleCatalog {
    async fn find_by_id(&self, vehicle_id: &str) -> Result<Option<Vehicle>, SalesServiceError> {
        let url = format!("{}/api/vehicles/{vehicle_id}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await
            .context("vehicle catalog request")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp
            .error_for_status()
            .context("vehicle catalog response")?;
        let envelope: VehicleEnvelope = resp.json().await.context("decode vehicle response")?;
        Ok(Some(envelope.data.into_vehicle()))
    }
}

#[derive(Debug, Deserialize)]
struct VehicleEnvelope {
    data: VehicleDto,
}

#[derive(Debug, Deserialize)]
struct VehicleDto {
    id: String,
    /// Accepted as either a JSON number or a string; kept as raw text and
    /// parsed into a decimal at validation time.
    #[serde(deserialize_with = "price_as_text")]
    price: String,
    status: VehicleStatus,
}

impl VehicleDto {
    fn into_vehicle(self) -> Vehicle {
        Vehicle {
            id: self.id,
            price: self.price,
            status: self.status,
        }
    }
}

fn price_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
