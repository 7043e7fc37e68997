//! Outfit recommendation tool — suggests clothing for a forecast.
//!
//! Pure function of temperature and condition; pairs with whatever weather
//! source the caller already has.

use async_trait::async_trait;
use workbench_core::error::ToolError;
use workbench_core::tool::{Tool, ToolResult};

pub struct RecommendOutfitTool;

/// Suggest clothing for `temperature` (Celsius) and a free-text `condition`.
pub fn recommend_outfit(temperature: f64, condition: &str) -> String {
    let mut recommendation = vec![if temperature < 10.0 {
        "Heavy coat, scarf, and gloves"
    } else if temperature < 20.0 {
        "Light jacket or sweater"
    } else {
        "T-shirt and light trousers"
    }];

    let condition = condition.to_lowercase();
    if condition.contains("rain") || condition.contains("drizzle") {
        recommendation.push("don't forget an umbrella or raincoat");
    } else if condition.contains("snow") {
        recommendation.push("wear waterproof boots");
    } else if condition.contains("sunny") && temperature > 20.0 {
        recommendation.push("wear sunglasses and a hat");
    }

    format!("{}.", recommendation.join(", "))
}

#[async_trait]
impl Tool for RecommendOutfitTool {
    fn name(&self) -> &str {
        "recommend_outfit"
    }

    fn description(&self) -> &str {
        "Suggest appropriate clothing based on temperature (Celsius) and weather condition."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "temperature": {
                    "type": "number",
                    "description": "Temperature in degrees Celsius"
                },
                "condition": {
                    "type": "string",
                    "description": "Weather condition, e.g. 'light rain' or 'sunny'"
                }
            },
            "required": ["temperature", "condition"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let temperature = arguments["temperature"]
            .as_f64()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'temperature' argument".into()))?;
        let condition = arguments["condition"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'condition' argument".into()))?;

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: recommend_outfit(temperature, condition),
            data: None,
        })
    }
}
