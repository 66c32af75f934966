use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;

/// A college recommended for a career/location query.
///
/// Field names follow the camelCase shape the completion service is asked
/// to produce, so a decoded response deserializes straight into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct College {
    /// Unique key within a result set and within the saved selection
    pub name: String,
    pub city: String,
    pub state: String,
    /// Percentage, e.g. 75 for 75%
    pub acceptance_rate: f64,
    /// Estimated annual cost in USD
    pub annual_cost: f64,
    pub description: String,
    pub reason_for_fit: String,
}

impl College {
    /// Check the numeric and key fields hold values a college can have.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::BlankName);
        }

        if !self.acceptance_rate.is_finite() || !(0.0..=100.0).contains(&self.acceptance_rate) {
            return Err(CoreError::AcceptanceRateOutOfRange {
                name: self.name.clone(),
                value: self.acceptance_rate,
            });
        }

        if !self.annual_cost.is_finite() || self.annual_cost < 0.0 {
            return Err(CoreError::AnnualCostOutOfRange {
                name: self.name.clone(),
                value: self.annual_cost,
            });
        }

        Ok(())
    }

    /// `City, ST` as shown next to the name.
    pub fn location(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> College {
        College {
            name: "Acme U".to_string(),
            city: "Boston".to_string(),
            state: "MA".to_string(),
            acceptance_rate: 55.0,
            annual_cost: 30000.0,
            description: "A university".to_string(),
            reason_for_fit: "Strong nursing program".to_string(),
        }
    }

    #[test]
    fn test_college_deserializes_camel_case() {
        let json = r#"{
            "name": "Acme U",
            "city": "Boston",
            "state": "MA",
            "acceptanceRate": 55,
            "annualCost": 30000,
            "description": "A university",
            "reasonForFit": "Strong nursing program"
        }"#;

        let college: College = serde_json::from_str(json).unwrap();
        assert_eq!(college, acme());
    }

    #[test]
    fn test_college_serializes_camel_case() {
        let json = serde_json::to_value(acme()).unwrap();
        assert_eq!(json["acceptanceRate"], 55.0);
        assert_eq!(json["reasonForFit"], "Strong nursing program");
        assert!(json.get("acceptance_rate").is_none());
    }

    #[test]
    fn test_validate_accepts_bounds() {
        let mut college = acme();
        college.acceptance_rate = 0.0;
        assert!(college.validate().is_ok());

        college.acceptance_rate = 100.0;
        college.annual_cost = 0.0;
        assert!(college.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut college = acme();
        college.acceptance_rate = 120.0;
        assert!(matches!(
            college.validate(),
            Err(CoreError::AcceptanceRateOutOfRange { .. })
        ));

        let mut college = acme();
        college.annual_cost = -1.0;
        assert!(matches!(
            college.validate(),
            Err(CoreError::AnnualCostOutOfRange { .. })
        ));

        let mut college = acme();
        college.acceptance_rate = f64::NAN;
        assert!(college.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut college = acme();
        college.name = "   ".to_string();
        assert_eq!(college.validate(), Err(CoreError::BlankName));
    }

    #[test]
    fn test_location() {
        assert_eq!(acme().location(), "Boston, MA");
    }
}
