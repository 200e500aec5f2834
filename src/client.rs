//! Boundary to the external analysis service.

use crate::error::AnalysisError;
use crate::model::{AnalysisRequest, AnalysisResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Anything that can turn a set of assets into an analysis result.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}

/// Analysis service reached over HTTP with a JSON POST.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

// Only a non-empty string `detail` is a display message; FastAPI validation errors
// put an array there.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        tracing::info!(
            endpoint = %self.endpoint,
            assets = request.assets.len(),
            "submitting portfolio for analysis"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = extract_detail(&body);
            tracing::warn!(status = status.as_u16(), ?detail, "analysis request rejected");
            return Err(AnalysisError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let result: AnalysisResult = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "analysis response did not match the expected schema");
            AnalysisError::from(e)
        })?;
        tracing::debug!(
            total_value = result.total_value,
            items = result.breakdown.len(),
            "analysis received"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE;
    use crate::model::AssetPayload;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use warp::http::StatusCode;
    use warp::Filter;

    fn request(symbol: &str, quantity: &str) -> AnalysisRequest {
        AnalysisRequest {
            assets: vec![AssetPayload {
                symbol: symbol.to_string(),
                quantity: quantity.to_string(),
            }],
        }
    }

    // Serves `body` with `status` on POST /analyze and records the request bodies.
    fn serve(
        status: StatusCode,
        body: &'static str,
    ) -> (SocketAddr, Arc<Mutex<Vec<serde_json::Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let route = warp::path("analyze")
            .and(warp::post())
            .and(warp::body::json())
            .map(move |payload: serde_json::Value| {
                recorder.lock().unwrap().push(payload);
                warp::reply::with_status(
                    warp::reply::with_header(body, "content-type", "application/json"),
                    status,
                )
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        (addr, seen)
    }

    fn client_for(addr: SocketAddr) -> HttpAnalysisClient {
        HttpAnalysisClient::new(format!("http://{addr}/analyze"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_success_decodes_result() {
        let (addr, seen) = serve(
            StatusCode::OK,
            r#"{"total_value": 1500.005, "currency": "INR",
                "breakdown": [{"symbol": "AAPL", "quantity": 10, "price": 150.0005,
                               "value": 1500.005, "percentage": 100, "risk": "Low"}],
                "ai_insight": "All in on Apple."}"#,
        );
        let result = client_for(addr).analyze(&request("AAPL", "10")).await.unwrap();

        assert_eq!(result.total_value, 1500.005);
        assert_eq!(result.breakdown[0].symbol, "AAPL");
        assert_eq!(result.insight(), Some("All in on Apple."));
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[serde_json::json!({"assets": [{"symbol": "AAPL", "quantity": "10"}]})]
        );
    }

    #[tokio::test]
    async fn test_rejection_carries_detail() {
        let (addr, _) = serve(StatusCode::BAD_REQUEST, r#"{"detail": "Invalid symbol"}"#);
        let err = client_for(addr)
            .analyze(&request("NVDA", "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Rejected { status: 400, .. }));
        assert_eq!(err.user_message(), "Invalid symbol");
    }

    #[tokio::test]
    async fn test_rejection_without_string_detail() {
        let (addr, _) = serve(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#,
        );
        let err = client_for(addr)
            .analyze(&request("AAPL", "1"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let (addr, _) = serve(StatusCode::BAD_REQUEST, r#"{"detail": ""}"#);
        let err = client_for(addr)
            .analyze(&request("AAPL", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Rejected { detail: None, .. }));
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let (addr, _) = serve(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        let err = client_for(addr)
            .analyze(&request("AAPL", "1"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let (addr, _) = serve(StatusCode::OK, r#"{"total": "lots"}"#);
        let err = client_for(addr)
            .analyze(&request("AAPL", "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Malformed(_)));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Bind and drop a listener so the port is very likely closed.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let err = client_for(addr)
            .analyze(&request("AAPL", "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Transport(_)));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(br#"{"detail": "Unsupported symbol: X"}"#),
            Some("Unsupported symbol: X".to_string())
        );
        assert_eq!(extract_detail(br#"{"detail": 3}"#), None);
        assert_eq!(extract_detail(br#"{"detail": ""}"#), None);
        assert_eq!(extract_detail(b"not json"), None);
    }
}
