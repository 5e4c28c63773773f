use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conversation::Message;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_message: String,
    #[serde(default)]
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub bot_message: String,
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyRecommendationRequest {
    pub customer_id: String,
    pub insurance_type: String,
    pub customer_age: u32,
    pub employment_status: String,
    pub marital_status: String,
    pub dependents: u32,
    pub health_status: String,
    pub existing_coverage: String,
    pub text_data: String,
    #[serde(default)]
    pub numerical_data: ProfileData,
    pub additional_financial_goals: String,
    #[serde(default)]
    pub behavioral_data: ProfileData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyRecommendationResponse {
    pub recommendation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub teacher_code: String,
    pub student_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Free-form profile attributes such as `{"income": 50000}`. Values are
/// limited to scalars; nested objects, arrays and nulls are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileData(pub BTreeMap<String, ProfileValue>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Integer(i64),
    Number(f64),
    Flag(bool),
    Text(String),
}

impl fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileValue::Integer(v) => write!(f, "{}", v),
            ProfileValue::Number(v) => write!(f, "{}", v),
            ProfileValue::Flag(v) => write!(f, "{}", v),
            ProfileValue::Text(v) => f.write_str(v),
        }
    }
}

impl fmt::Display for ProfileData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("{}");
        }
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_data_accepts_scalars() {
        let data: ProfileData = serde_json::from_value(json!({
            "income": 50000,
            "existingPremium": 1200.5,
            "smoker": false,
            "recentInteractions": "Browsed policy details, visited FAQ"
        }))
        .unwrap();

        assert_eq!(data.0["income"], ProfileValue::Integer(50000));
        assert_eq!(data.0["existingPremium"], ProfileValue::Number(1200.5));
        assert_eq!(data.0["smoker"], ProfileValue::Flag(false));
        assert_eq!(
            data.to_string(),
            "existingPremium: 1200.5, income: 50000, \
             recentInteractions: Browsed policy details, visited FAQ, smoker: false"
        );
    }

    #[test]
    fn profile_data_rejects_nested_values() {
        assert!(serde_json::from_value::<ProfileData>(json!({"a": {"b": 1}})).is_err());
        assert!(serde_json::from_value::<ProfileData>(json!({"a": [1, 2]})).is_err());
        assert!(serde_json::from_value::<ProfileData>(json!({"a": null})).is_err());
    }

    #[test]
    fn empty_profile_data_renders_braces() {
        assert_eq!(ProfileData::default().to_string(), "{}");
    }

    #[test]
    fn chat_request_history_defaults_to_empty() {
        let req: ChatRequest = serde_json::from_value(json!({"user_message": "Hi"})).unwrap();
        assert!(req.history.is_empty());
    }

    #[test]
    fn evaluate_response_omits_unparsed_fields() {
        let body = serde_json::to_value(EvaluateResponse {
            result: "unclear".to_string(),
            match_percent: None,
            score: None,
        })
        .unwrap();
        assert_eq!(body, json!({"result": "unclear"}));
    }
}
