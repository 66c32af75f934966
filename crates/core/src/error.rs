use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("College name must not be blank")]
    BlankName,

    #[error("Acceptance rate for {name} out of range: {value}")]
    AcceptanceRateOutOfRange { name: String, value: f64 },

    #[error("Annual cost for {name} out of range: {value}")]
    AnnualCostOutOfRange { name: String, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::AcceptanceRateOutOfRange {
            name: "Acme U".to_string(),
            value: 140.0,
        };
        let text = error.to_string();
        assert!(text.contains("Acme U"));
        assert!(text.contains("140"));
    }
}
