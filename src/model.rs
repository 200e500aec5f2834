use serde::{Deserialize, Serialize};

/// One asset as sent to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPayload {
    pub symbol: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub assets: Vec<AssetPayload>,
}

/// Valuation of a single asset as returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub value: f64,
    pub percentage: f64,
    pub risk: String,
}

impl BreakdownItem {
    pub fn risk_tag(&self) -> RiskTag {
        RiskTag::from_label(&self.risk)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_value: f64,
    pub breakdown: Vec<BreakdownItem>,
    #[serde(default)]
    pub ai_insight: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl AnalysisResult {
    /// The insight text, if present and non-empty.
    pub fn insight(&self) -> Option<&str> {
        self.ai_insight.as_deref().filter(|s| !s.is_empty())
    }
}

/// Display category of a risk label, derived from its lowercase form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskTag {
    Low,
    Normal,
    Medium,
    High,
    Other(String),
}

impl RiskTag {
    pub fn from_label(label: &str) -> RiskTag {
        match label.trim().to_lowercase().as_str() {
            "low" => RiskTag::Low,
            "normal" => RiskTag::Normal,
            "medium" => RiskTag::Medium,
            "high" => RiskTag::High,
            other => RiskTag::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = AnalysisRequest {
            assets: vec![AssetPayload {
                symbol: "AAPL".to_string(),
                quantity: "10".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"assets": [{"symbol": "AAPL", "quantity": "10"}]})
        );
    }

    #[test]
    fn test_result_from_backend_json() {
        let body = r#"{
            "total_value": 1500.005,
            "currency": "INR",
            "breakdown": [
                {"symbol": "AAPL", "quantity": 10, "price": 150.0005,
                 "value": 1500.005, "percentage": 100, "risk": "Low"}
            ],
            "ai_insight": "Concentrated in a single stock."
        }"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].quantity, 10.0);
        assert_eq!(result.breakdown[0].risk_tag(), RiskTag::Low);
        assert_eq!(result.currency.as_deref(), Some("INR"));
        assert_eq!(result.insight(), Some("Concentrated in a single stock."));
    }

    #[test]
    fn test_insight_is_optional() {
        let body = r#"{"total_value": 0, "breakdown": []}"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.insight(), None);

        let body = r#"{"total_value": 0, "breakdown": [], "ai_insight": ""}"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.insight(), None);
    }

    #[test]
    fn test_missing_breakdown_is_rejected() {
        let body = r#"{"total_value": 12.5}"#;
        assert!(serde_json::from_str::<AnalysisResult>(body).is_err());
    }

    #[test]
    fn test_risk_tag_from_label() {
        assert_eq!(RiskTag::from_label("HIGH"), RiskTag::High);
        assert_eq!(RiskTag::from_label(" normal "), RiskTag::Normal);
        assert_eq!(RiskTag::from_label("Medium"), RiskTag::Medium);
        assert_eq!(
            RiskTag::from_label("Extreme"),
            RiskTag::Other("extreme".to_string())
        );
    }
}
