//! reqwest transport for the moderation API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AdId, AdvertisementDetail},
    error::ApiError,
    protocol::{
        ActivityPoint, CategoryCounts, DecisionCounts, DecisionRequest, ListPage, ListQuery,
        StatsPeriod, StatsSummary,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    backend::{DecisionGateway, ItemReader, ListingDataSource, StatsSource},
    error::{ClientBuildError, FetchError},
};

#[derive(Debug, Clone)]
pub struct HttpModerationClient {
    http: Client,
    base_url: String,
}

impl HttpModerationClient {
    /// `base_url` is the API root, e.g. `http://localhost:3001/api`.
    pub fn new(base_url: &str) -> Result<Self, ClientBuildError> {
        Self::build(base_url, Client::builder())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        Self::build(base_url, Client::builder().timeout(timeout))
    }

    fn build(base_url: &str, builder: reqwest::ClientBuilder) -> Result<Self, ClientBuildError> {
        let parsed = Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientBuildError::Scheme(parsed.scheme().to_string()));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_stats<T: DeserializeOwned>(
        &self,
        path: &str,
        period: StatsPeriod,
    ) -> Result<T, FetchError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .query(&[("period", period.as_str())])
            .send()
            .await?;
        read_json(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => api_error.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => body,
    };
    Err(FetchError::Server {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let bytes = ensure_success(response).await?.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

#[async_trait]
impl ListingDataSource for HttpModerationClient {
    async fn fetch_page(&self, query: &ListQuery) -> Result<ListPage, FetchError> {
        debug!(page = query.page, "GET /ads");
        let response = self
            .http
            .get(self.endpoint("ads"))
            .query(&query.query_pairs())
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl ItemReader for HttpModerationClient {
    async fn fetch_item(&self, id: AdId) -> Result<Option<AdvertisementDetail>, FetchError> {
        let response = self
            .http
            .get(self.endpoint(&format!("ads/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(ad_id = %id, "listing not found");
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }
}

#[async_trait]
impl DecisionGateway for HttpModerationClient {
    async fn submit(&self, id: AdId, decision: &DecisionRequest) -> Result<(), FetchError> {
        let url = self.endpoint(&format!(
            "ads/{id}/{}",
            decision.kind().path_segment()
        ));
        let request = self.http.post(url);
        let request = match decision.body() {
            Some(body) => request.json(body),
            None => request,
        };
        ensure_success(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl StatsSource for HttpModerationClient {
    async fn summary(&self, period: StatsPeriod) -> Result<StatsSummary, FetchError> {
        self.get_stats("stats/summary", period).await
    }

    async fn activity(&self, period: StatsPeriod) -> Result<Vec<ActivityPoint>, FetchError> {
        self.get_stats("stats/chart/activity", period).await
    }

    async fn decisions(&self, period: StatsPeriod) -> Result<DecisionCounts, FetchError> {
        self.get_stats("stats/chart/decisions", period).await
    }

    async fn categories(&self, period: StatsPeriod) -> Result<CategoryCounts, FetchError> {
        self.get_stats("stats/chart/categories", period).await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
