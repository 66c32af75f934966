//! View controller
//!
//! Translates user intents into orchestrator and store calls. The search
//! form lives here so the intents can read the current job and location.

use std::sync::{Arc, RwLock};

use compass_core::{College, ComparisonAnalysis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::query::{PendingCompare, PendingSearch, QueryOrchestrator};
use crate::store::StateStore;

/// Inputs of the search form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SearchForm {
    pub job: String,
    pub location: String,
}

impl SearchForm {
    pub fn new(job: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            location: location.into(),
        }
    }

    /// Both fields hold something other than whitespace
    pub fn is_ready(&self) -> bool {
        !self.job.trim().is_empty() && !self.location.trim().is_empty()
    }
}

pub struct ViewController {
    orchestrator: Arc<QueryOrchestrator>,
    form: RwLock<SearchForm>,
}

impl ViewController {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        Self {
            orchestrator,
            form: RwLock::new(SearchForm::default()),
        }
    }

    pub fn orchestrator(&self) -> &Arc<QueryOrchestrator> {
        &self.orchestrator
    }

    pub fn store(&self) -> &StateStore {
        self.orchestrator.store()
    }

    pub fn form(&self) -> SearchForm {
        self.form
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_form(&self, form: SearchForm) {
        *self
            .form
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = form;
    }

    pub fn set_job(&self, job: impl Into<String>) {
        self.form
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .job = job.into();
    }

    pub fn set_location(&self, location: impl Into<String>) {
        self.form
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .location = location.into();
    }

    /// Start a search from the form, or `None` if job or location is blank.
    ///
    /// The comparison panel is hidden before the request goes out.
    pub fn dispatch_search(&self) -> Option<PendingSearch> {
        let form = self.form();
        if !form.is_ready() {
            debug!("Search ignored: job and location are required");
            return None;
        }

        self.store().set_show_comparison(false);
        let job = form.job.trim();
        let location = form.location.trim();
        info!(job = %job, location = %location, "Search requested");
        Some(self.orchestrator.start_search(job, location))
    }

    pub async fn on_search(&self) -> Option<Result<Vec<College>>> {
        let pending = self.dispatch_search()?;
        Some(pending.run().await)
    }

    /// Returns whether the college is saved afterwards
    pub fn on_toggle_save(&self, college: College) -> bool {
        self.store().toggle_save(college)
    }

    /// Start a comparison of the saved colleges for the form's job and show
    /// the comparison panel.
    ///
    /// Returns `None` when fewer than two colleges are saved; the panel is
    /// shown regardless.
    pub fn dispatch_compare(&self) -> Option<PendingCompare> {
        let saved = self.store().saved();
        let job = self.form().job;
        info!(job = %job.trim(), colleges = saved.len(), "Comparison requested");

        let pending = self.orchestrator.start_compare(saved.as_slice(), job.trim());
        self.store().set_show_comparison(true);
        pending
    }

    pub async fn on_compare(&self) -> Option<Result<ComparisonAnalysis>> {
        let pending = self.dispatch_compare()?;
        Some(pending.run().await)
    }

    pub fn set_show_comparison(&self, visible: bool) {
        self.store().set_show_comparison(visible);
    }
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("form", &self.form())
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryKind;
    use crate::query::testing::ScriptedProvider;
    use events::EventBus;

    const ACME: &str = r#"[{"name":"Acme U","city":"Boston","state":"MA","acceptanceRate":55,"annualCost":30000,"description":"...","reasonForFit":"..."},{"name":"Beta U","city":"Cambridge","state":"MA","acceptanceRate":70,"annualCost":20000,"description":"...","reasonForFit":"..."}]"#;

    const COMPARISON: &str = r#"{"comparison":[{"name":"Acme U","pros":["a"],"cons":["b"]},{"name":"Beta U","pros":["c"],"cons":["d"]}],"recommendation":"Beta U"}"#;

    fn controller(provider: ScriptedProvider) -> (Arc<ScriptedProvider>, ViewController) {
        let provider = Arc::new(provider);
        let store = StateStore::new(EventBus::new());
        let orchestrator = QueryOrchestrator::new(provider.clone(), store).unwrap();
        (provider, ViewController::new(Arc::new(orchestrator)))
    }

    #[test]
    fn test_form_readiness() {
        assert!(!SearchForm::default().is_ready());
        assert!(!SearchForm::new("nurse", "   ").is_ready());
        assert!(!SearchForm::new("\t", "Boston").is_ready());
        assert!(SearchForm::new("nurse", "Boston").is_ready());
    }

    #[test]
    fn test_form_setters() {
        let (_, controller) = controller(ScriptedProvider::new());

        controller.set_job("nurse");
        controller.set_location("Boston");
        assert_eq!(controller.form(), SearchForm::new("nurse", "Boston"));

        controller.set_form(SearchForm::new("architect", "Denver"));
        assert_eq!(controller.form().job, "architect");
    }

    #[tokio::test]
    async fn test_on_search_requires_job_and_location() {
        let (provider, controller) = controller(ScriptedProvider::new().reply(ACME));
        controller.set_job("nurse");

        assert!(controller.on_search().await.is_none());
        assert_eq!(provider.calls(), 0);
        assert!(!controller.store().is_searching());
    }

    #[tokio::test]
    async fn test_on_search_hides_comparison_and_trims() {
        let (provider, controller) = controller(ScriptedProvider::new().reply(ACME));
        controller.set_form(SearchForm::new("  nurse ", " Boston  "));
        controller.set_show_comparison(true);

        let colleges = controller.on_search().await.unwrap().unwrap();

        assert_eq!(colleges.len(), 2);
        assert!(!controller.store().show_comparison());
        assert!(provider.prompts()[0].contains("in or near Boston that"));
    }

    #[tokio::test]
    async fn test_search_save_compare_flow() {
        let (provider, controller) =
            controller(ScriptedProvider::new().reply(ACME).reply(COMPARISON));
        controller.set_form(SearchForm::new("nurse", "Boston"));

        let colleges = controller.on_search().await.unwrap().unwrap();
        assert!(controller.on_toggle_save(colleges[0].clone()));
        assert!(!controller.store().can_compare());
        assert!(controller.on_toggle_save(colleges[1].clone()));
        assert!(controller.store().can_compare());

        let analysis = controller.on_compare().await.unwrap().unwrap();

        let store = controller.store();
        assert_eq!(analysis.recommendation, "Beta U");
        assert_eq!(store.comparison(), Some(analysis));
        assert!(store.show_comparison());
        assert!(!store.is_comparing());
        assert!(store.error().is_none());
        assert_eq!(provider.calls(), 2);
        assert!(provider.prompts()[1].contains("career in \"nurse\""));
    }

    #[tokio::test]
    async fn test_on_compare_below_threshold_shows_panel_only() {
        let (provider, controller) = controller(ScriptedProvider::new());
        controller.set_form(SearchForm::new("nurse", "Boston"));

        assert!(controller.on_compare().await.is_none());
        assert_eq!(provider.calls(), 0);
        assert!(controller.store().show_comparison());
        assert!(controller.store().comparison().is_none());
    }

    #[tokio::test]
    async fn test_on_compare_failure_sets_message() {
        let (_, controller) = controller(ScriptedProvider::new().reply("{\"comparison\": []}"));
        let colleges: Vec<College> = serde_json::from_str(ACME).unwrap();
        for college in colleges {
            controller.on_toggle_save(college);
        }

        assert!(controller.on_compare().await.unwrap().is_err());
        assert_eq!(
            controller.store().error().as_deref(),
            Some(QueryKind::Compare.user_message())
        );
    }
}
