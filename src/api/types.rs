//! Backend request and response types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::ProviderUser;

/// Backend user profile. Field set is owned by the backend.
pub type Profile = Map<String, Value>;

/// Body of `POST api/auth/signup-complete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupCompleteRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub google_id: String,
}

impl SignupCompleteRequest {
    pub fn from_user(user: &ProviderUser) -> Self {
        Self {
            email: user.email.clone(),
            name: user.display_name.clone(),
            google_id: user.uid.clone(),
        }
    }
}

/// Body of `POST api/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `POST api/auth/login`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Whatever else the backend sends alongside the token.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST api/users/profile/photo`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpdateRequest<'a> {
    pub photo_url: &'a str,
}

/// Response of `POST api/users/profile/photo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpdateResponse {
    pub photo_url: String,
}

/// Response of `POST api/diagnosis/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub result: DiagnosisResult,
}

/// Outcome of an image analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub condition: String,
    /// Percentage in `0..=100`.
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub top3: Vec<RankedCondition>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// One of the model's top predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCondition {
    pub class: String,
    pub confidence: f64,
}

impl fmt::Display for DiagnosisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (confidence: {}%)", self.condition, self.confidence)?;

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "Description:")?;
            writeln!(f, "  {}", self.description)?;
        }

        if !self.top3.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top Predictions:")?;
            for ranked in &self.top3 {
                writeln!(f, "  {:<32} {:.2}%", ranked.class, ranked.confidence)?;
            }
        }

        if !self.recommendations.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recommendations:")?;
            for rec in &self.recommendations {
                writeln!(f, "  - {}", rec)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signup_payload_wire_names() {
        let user = ProviderUser {
            uid: "g-1".into(),
            email: Some("ada@example.com".into()),
            display_name: Some("Ada".into()),
            photo_url: None,
        };
        let value = serde_json::to_value(SignupCompleteRequest::from_user(&user)).unwrap();
        assert_eq!(
            value,
            json!({ "email": "ada@example.com", "name": "Ada", "googleId": "g-1" })
        );
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let req = LoginRequest {
            email: "a@b.c",
            password: "hunter2",
        };
        let debug = format!("{:?}", req);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("a@b.c"));
    }

    #[test]
    fn test_login_response_keeps_extra_fields() {
        let resp: LoginResponse =
            serde_json::from_value(json!({ "token": "t", "user": { "id": 1 } })).unwrap();
        assert_eq!(resp.token, "t");
        assert_eq!(resp.extra["user"]["id"], 1);
    }

    #[test]
    fn test_photo_request_wire_name() {
        let value = serde_json::to_value(PhotoUpdateRequest { photo_url: "u" }).unwrap();
        assert_eq!(value, json!({ "photoUrl": "u" }));
    }

    #[test]
    fn test_diagnosis_optional_lists() {
        let resp: AnalyzeResponse = serde_json::from_value(json!({
            "result": { "condition": "Eczema", "confidence": 87.5 }
        }))
        .unwrap();
        assert!(resp.result.top3.is_empty());
        assert!(resp.result.recommendations.is_empty());
        assert_eq!(resp.result.description, "");
    }

    #[test]
    fn test_diagnosis_display() {
        let result = DiagnosisResult {
            condition: "Psoriasis".into(),
            confidence: 91.0,
            description: "Chronic skin condition.".into(),
            top3: vec![RankedCondition {
                class: "Psoriasis".into(),
                confidence: 91.0,
            }],
            recommendations: vec!["See a dermatologist".into()],
        };
        let text = result.to_string();
        assert!(text.starts_with("Psoriasis (confidence: 91%)"));
        assert!(text.contains("91.00%"));
        assert!(text.contains("- See a dermatologist"));
    }
}
