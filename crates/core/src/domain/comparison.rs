use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pros and cons for one compared college
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ComparisonEntry {
    pub name: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Side-by-side analysis of the saved colleges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ComparisonAnalysis {
    /// Entries in the order the service returned them
    pub comparison: Vec<ComparisonEntry>,
    pub recommendation: String,
}

impl ComparisonAnalysis {
    pub fn entry(&self, name: &str) -> Option<&ComparisonEntry> {
        self.comparison.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.comparison.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparison.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_deserialization_keeps_order() {
        let json = r#"{
            "comparison": [
                {"name": "Beta U", "pros": ["Cheap"], "cons": ["Far"]},
                {"name": "Acme U", "pros": [], "cons": ["Pricey", "Crowded"]}
            ],
            "recommendation": "Beta U"
        }"#;

        let analysis: ComparisonAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis.comparison[0].name, "Beta U");
        assert_eq!(analysis.comparison[1].cons.len(), 2);
        assert_eq!(analysis.recommendation, "Beta U");
    }

    #[test]
    fn test_entry_lookup() {
        let analysis = ComparisonAnalysis {
            comparison: vec![ComparisonEntry {
                name: "Acme U".to_string(),
                pros: vec!["Close to home".to_string()],
                cons: vec![],
            }],
            recommendation: "Acme U".to_string(),
        };

        assert!(analysis.entry("Acme U").is_some());
        assert!(analysis.entry("Beta U").is_none());
        assert!(!analysis.is_empty());
    }
}
