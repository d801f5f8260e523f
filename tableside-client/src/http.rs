//! HTTP access to the admin notification feed

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::ApiResponse;
use shared::models::{
    Notification, NotificationCountResponse, NotificationList, NotificationStatus, StatusCounts,
    StatusUpdate, StatusUpdated,
};

use crate::{ClientConfig, ClientError, ClientResult};

const FEED_PATH: &str = "admin/notifications-api";
const TENANT_HEADER: &str = "x-tenant-id";

/// Feed endpoints used by [`NotificationFeed`](crate::NotificationFeed)
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Per-status counts
    async fn count(&self) -> ClientResult<StatusCounts>;

    /// `new` notifications, newest first
    async fn list_new(&self) -> ClientResult<Vec<Notification>>;

    /// Set status `seen`
    async fn mark_seen(&self, id: i64) -> ClientResult<()>;
}

/// reqwest-backed [`FeedApi`]
#[derive(Debug, Clone)]
pub struct NetworkFeedApi {
    client: Client,
    base_url: String,
    tenant_id: Option<i64>,
}

impl NetworkFeedApi {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant_id: config.tenant_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base_url, FEED_PATH, path)
    }

    /// Same as [`url`](Self::url) with a `_t` cache-buster for GETs
    fn fresh_url(&self, path: &str) -> String {
        format!("{}?_t={}", self.url(path), shared::util::now_millis())
    }

    fn with_tenant(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header(reqwest::header::ACCEPT, "application/json");
        match self.tenant_id {
            Some(id) => req.header(TENANT_HEADER, id.to_string()),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            if let Ok(api_err) = serde_json::from_str::<ApiResponse>(&body) {
                return Err(ClientError::Api {
                    code: api_err.code,
                    message: api_err.message,
                });
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl FeedApi for NetworkFeedApi {
    async fn count(&self) -> ClientResult<StatusCounts> {
        let req = self.with_tenant(self.client.get(self.fresh_url("/count")));
        let body: NotificationCountResponse = Self::handle_response(req.send().await?).await?;
        Ok(body.counts)
    }

    async fn list_new(&self) -> ClientResult<Vec<Notification>> {
        let req = self.with_tenant(self.client.get(self.fresh_url("/")));
        let body: NotificationList = Self::handle_response(req.send().await?).await?;
        if !body.ok {
            return Err(ClientError::InvalidResponse("list returned ok=false".into()));
        }
        Ok(body.items)
    }

    async fn mark_seen(&self, id: i64) -> ClientResult<()> {
        let body = StatusUpdate {
            status: NotificationStatus::Seen,
            acted_by: None,
        };
        let req = self.with_tenant(self.client.patch(self.url(&format!("/{id}"))).json(&body));
        let updated: StatusUpdated = Self::handle_response(req.send().await?).await?;
        if updated.id != id || updated.status != NotificationStatus::Seen {
            return Err(ClientError::InvalidResponse(format!(
                "unexpected update result for notification {id}"
            )));
        }
        Ok(())
    }
}
