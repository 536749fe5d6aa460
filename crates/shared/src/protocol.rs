use serde::{Deserialize, Serialize};

use crate::domain::{DistrictId, Spot};

/// Envelope of `GET /spots`. `GET /districts` returns a bare array instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotListResponse {
    pub data: Vec<Spot>,
}

/// Body of `POST /spots`: only the user-editable fields of a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpotRequest {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub district_id: DistrictId,
}

impl From<&Spot> for CreateSpotRequest {
    fn from(spot: &Spot) -> Self {
        Self {
            name: spot.name_or_empty().to_string(),
            description: spot.description.clone(),
            latitude: spot.latitude,
            longitude: spot.longitude,
            district_id: spot.district_id.clone(),
        }
    }
}
