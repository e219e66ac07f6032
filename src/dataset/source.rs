//! Upstream route feed.

use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::FetchError;
use crate::models::RouteDataset;

/// Something that can produce a complete route dataset
pub trait RouteSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<RouteDataset, FetchError>> + Send;
}

/// Fetches the dataset with a GET request to a fixed URL
pub struct HttpRouteSource {
    client: Client,
    url: Url,
}

impl HttpRouteSource {
    /// Create a source; `timeout` bounds every request
    pub fn new(url: Url, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RouteSource for HttpRouteSource {
    async fn fetch(&self) -> Result<RouteDataset, FetchError> {
        debug!("Fetching routes from {}", self.url);

        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        let dataset = RouteDataset::from_json(&body)?;

        info!(
            "Fetched {} routes ({} point references) from {}",
            dataset.len(),
            dataset.point_refs(),
            self.url
        );

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    /// Serve `router` on an ephemeral local port and return its base URL
    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}/routes", addr)).unwrap()
    }

    fn source(url: Url) -> HttpRouteSource {
        HttpRouteSource::new(url, Duration::from_secs(5), "juniper-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_decodes_payload() {
        let url = serve(Router::new().route(
            "/routes",
            get(|| async {
                r#"[{"id": "r1", "points": [{"id": "p1"}]}, {"id": "r2", "points": []}]"#
            }),
        ))
        .await;

        let dataset = source(url).fetch().await.unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.point_refs(), 1);
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let url = serve(Router::new().route(
            "/routes",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        ))
        .await;

        match source(url).fetch().await {
            Err(FetchError::Status(status)) => assert_eq!(status, StatusCode::BAD_GATEWAY),
            other => panic!("expected status error, got {:?}", other.map(|d| d.len())),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_array_body() {
        let url = serve(Router::new().route("/routes", get(|| async { r#"{"routes": []}"# })))
            .await;

        assert!(matches!(
            source(url).fetch().await,
            Err(FetchError::Decode(_))
        ));
    }
}
