//! Backend REST contract for spots and districts.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{District, Spot, SpotId},
    protocol::{CreateSpotRequest, SpotListResponse},
};
use tracing::debug;
use url::Url;

use crate::{config::Settings, error::ClientError};

/// Remote data source the controller reconciles against.
///
/// Any non-2xx status or transport failure is an `Err`; write responses carry
/// no data the controller needs.
#[async_trait]
pub trait SpotApi: Send + Sync {
    async fn list_spots(&self) -> Result<Vec<Spot>>;
    async fn list_districts(&self) -> Result<Vec<District>>;
    async fn create_spot(&self, request: &CreateSpotRequest) -> Result<()>;
    async fn update_spot(&self, id: &SpotId, spot: &Spot) -> Result<()>;
    async fn delete_spot(&self, id: &SpotId) -> Result<()>;
}

pub struct HttpSpotApi {
    http: Client,
    base_url: Url,
}

impl HttpSpotApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let base_url = crate::config::normalize_base_url(&settings.api_base_url)?;
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn spot_url(&self, id: &SpotId) -> Result<Url> {
        let mut url = self.endpoint("spots")?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("api base url {} cannot carry a path", self.base_url))?
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl SpotApi for HttpSpotApi {
    async fn list_spots(&self) -> Result<Vec<Spot>> {
        let body: SpotListResponse = self
            .http
            .get(self.endpoint("spots")?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = body.data.len(), "fetched spots");
        Ok(body.data)
    }

    async fn list_districts(&self) -> Result<Vec<District>> {
        let districts: Vec<District> = self
            .http
            .get(self.endpoint("districts")?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = districts.len(), "fetched districts");
        Ok(districts)
    }

    async fn create_spot(&self, request: &CreateSpotRequest) -> Result<()> {
        self.http
            .post(self.endpoint("spots")?)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn update_spot(&self, id: &SpotId, spot: &Spot) -> Result<()> {
        self.http
            .put(self.spot_url(id)?)
            .json(spot)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_spot(&self, id: &SpotId) -> Result<()> {
        self.http
            .delete(self.spot_url(id)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
