//! HTTP client for the external user service.
//!
//! Thin reqwest adapter behind `UserStatusPort`; the resilience pipeline
//! (retry, breaker, rate limit, bulkhead, timeout) lives in the activity
//! gate, not here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::application::dto::UserDto;
use crate::application::ports::{UserStatusError, UserStatusPort};
use crate::domain::shared::UserId;

/// Configuration for the user-service client.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// Base URL, e.g. `http://localhost:8081`.
    pub base_url: String,
    /// Path template; `{userId}` is replaced with the id.
    pub user_by_id_path: String,
    /// Transport-level request timeout.
    pub timeout: Duration,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            user_by_id_path: "/v1/assetflow/users/{userId}".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Reqwest-based implementation of `UserStatusPort`.
#[derive(Debug, Clone)]
pub struct HttpUserStatusClient {
    client: Client,
    config: UserServiceConfig,
}

impl HttpUserStatusClient {
    /// Build the client from config.
    ///
    /// # Errors
    ///
    /// Returns `UserStatusError::Rejected` when the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: UserServiceConfig) -> Result<Self, UserStatusError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UserStatusError::Rejected {
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    fn user_url(&self, user_id: UserId) -> String {
        let path = self
            .config
            .user_by_id_path
            .replace("{userId}", &user_id.to_string());
        format!("{}{}", self.config.base_url, path)
    }
}

#[async_trait]
impl UserStatusPort for HttpUserStatusClient {
    async fn fetch_user(&self, user_id: UserId) -> Result<UserDto, UserStatusError> {
        let url = self.user_url(user_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            // Connect errors and client-side timeouts are transient
            UserStatusError::Unreachable {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(UserStatusError::Unreachable {
                message: format!("user service returned {status}"),
            });
        }
        if !status.is_success() {
            return Err(UserStatusError::Rejected {
                message: format!("user service returned {status}"),
            });
        }

        response
            .json::<UserDto>()
            .await
            .map_err(|e| UserStatusError::Rejected {
                message: format!("malformed user record: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpUserStatusClient {
        HttpUserStatusClient::new(UserServiceConfig {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_and_parses_user_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/assetflow/users/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "userId": 7,
                "username": "sam",
                "isActive": true
            })))
            .mount(&server)
            .await;

        let user = client_for(&server)
            .fetch_user(UserId::new(7))
            .await
            .unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.is_active, Some(true));
    }

    #[tokio::test]
    async fn null_activity_flag_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/assetflow/users/3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "userId": 3, "username": "kim" })),
            )
            .mount(&server)
            .await;

        let user = client_for(&server)
            .fetch_user(UserId::new(3))
            .await
            .unwrap();
        assert!(user.is_active.is_none());
    }

    #[tokio::test]
    async fn server_errors_are_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_user(UserId::new(1))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn client_errors_are_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_user(UserId::new(1))
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn connection_failure_is_transient() {
        // Nothing is listening on this port
        let client = HttpUserStatusClient::new(UserServiceConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();

        let err = client.fetch_user(UserId::new(1)).await.unwrap_err();
        assert!(err.is_transient());
    }
}
