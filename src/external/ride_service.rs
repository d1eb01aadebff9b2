use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize};

use crate::{
    api::{NotificationAPI, RideRequestAPI},
    config::AppConfig,
    entities::RideRequest,
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectParams {
    pub request_id: i64,
    pub user_id: i64,
}

/// HTTP transport for the ride request backend. One call is one round trip;
/// nothing is retried here.
#[derive(Clone, Debug)]
pub struct RideServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl RideServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.ride_service_base_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&RejectParams>) -> Result<Response, Error> {
        let mut req = self.http.request(method, self.url(path));

        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        check_status(res).await
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<RideRequest>, Error> {
        let res = self.send(Method::GET, path, None).await?;
        let requests: Vec<RideRequest> = res.json().await.map_err(|err| {
            tracing::error!(error = %err, "ride request list could not be decoded");
            upstream_error()
        })?;

        for request in requests.iter() {
            request.validate()?;
        }

        Ok(requests)
    }
}

async fn check_status(res: Response) -> Result<Response, Error> {
    let status_code = res.status().as_u16();

    if res.status().is_success() {
        return Ok(res);
    }

    let body: serde_json::Value = res.json().await.unwrap_or_default();

    if (400..500).contains(&status_code) {
        tracing::warn!(status_code, %body, "ride service rejected request");
        return Err(invalid_input_error());
    }

    tracing::error!(status_code, %body, "ride service failed");
    Err(upstream_error())
}

#[async_trait]
impl RideRequestAPI for RideServiceClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_created(&self, user_id: i64) -> Result<Vec<RideRequest>, Error> {
        self.fetch_list(&format!("/ride-requests/created/{}", user_id))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_accepted(&self, user_id: i64) -> Result<Vec<RideRequest>, Error> {
        self.fetch_list(&format!("/ride-requests/accepted/{}", user_id))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_request(&self, request_id: i64) -> Result<(), Error> {
        self.send(
            Method::DELETE,
            &format!("/ride-requests/{}", request_id),
            None,
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn reject_request(&self, request_id: i64, user_id: i64) -> Result<(), Error> {
        let params = RejectParams {
            request_id,
            user_id,
        };

        self.send(Method::POST, "/ride-requests/reject", Some(&params))
            .await?;

        Ok(())
    }
}

#[async_trait]
impl NotificationAPI for RideServiceClient {
    #[tracing::instrument(skip(self))]
    async fn ride_rejected(&self, request_id: i64, user_id: i64) -> Result<(), Error> {
        let params = RejectParams {
            request_id,
            user_id,
        };

        self.send(Method::POST, "/notifications/ride-rejected", Some(&params))
            .await?;

        Ok(())
    }
}

#[test]
fn reject_params_use_camel_case() {
    let body = serde_json::to_value(RejectParams {
        request_id: 9,
        user_id: 4,
    })
    .unwrap();

    assert_eq!(body, serde_json::json!({ "requestId": 9, "userId": 4 }));
}

#[test]
fn base_url_is_normalised() {
    let client = RideServiceClient::new("http://localhost:3000/api/");

    assert_eq!(
        client.url("/ride-requests/5"),
        "http://localhost:3000/api/ride-requests/5"
    );
}
