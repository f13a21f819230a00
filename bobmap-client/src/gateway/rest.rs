use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use bobmap_core::models::FollowEdge;
use bobmap_shared::errors::{AppError, AppResult, ErrorCode};
use bobmap_shared::types::api::{ApiErrorResponse, ApiResponse};

use super::{SyncGateway, WireNotification, WireUser};
use crate::config::AppConfig;

/// `reqwest`-backed implementation of [`SyncGateway`].
///
/// Decodes the backend's `{success, data}` / `{success, error}` envelopes;
/// transport failures surface as `AppError::Http`, error envelopes as typed
/// `AppError::Known` values.
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
}

impl RestGateway {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let envelope: ApiResponse<T> = serde_json::from_slice(&body).map_err(|e| {
                AppError::internal(format!("malformed success envelope: {e}"))
            })?;
            return Ok(envelope.into_data());
        }

        match serde_json::from_slice::<ApiErrorResponse>(&body) {
            Ok(envelope) => {
                tracing::warn!(status = %status, code = %envelope.error.code, "backend rejected request");
                envelope.into_result()
            }
            Err(_) => Err(AppError::new(
                ErrorCode::UpstreamUnavailable,
                format!("upstream returned {status}"),
            )),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn post_ack(&self, path: &str) -> AppResult<()> {
        let response = self.http.post(self.url(path)).send().await?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }

    async fn delete_ack(&self, path: &str) -> AppResult<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }
}

impl SyncGateway for RestGateway {
    fn fetch_user(&self, id: Uuid) -> impl Future<Output = AppResult<WireUser>> + Send {
        async move { self.get_json(&format!("/users/{id}")).await }
    }

    fn fetch_follow_edges(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = AppResult<Vec<FollowEdge>>> + Send {
        async move { self.get_json(&format!("/users/{user_id}/follows")).await }
    }

    fn persist_follow(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> impl Future<Output = AppResult<()>> + Send {
        async move {
            self.post_ack(&format!("/users/{actor_id}/follows/{target_id}"))
                .await
        }
    }

    fn persist_unfollow(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> impl Future<Output = AppResult<()>> + Send {
        async move {
            self.delete_ack(&format!("/users/{actor_id}/follows/{target_id}"))
                .await
        }
    }

    fn fetch_notifications(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = AppResult<Vec<WireNotification>>> + Send {
        async move {
            self.get_json(&format!("/users/{user_id}/notifications"))
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = AppConfig {
            api_base_url: "http://localhost:9999/api/".into(),
            ..AppConfig::default()
        };
        let gateway = RestGateway::new(&config).unwrap();
        assert_eq!(gateway.url("/users/1"), "http://localhost:9999/api/users/1");
    }
}
