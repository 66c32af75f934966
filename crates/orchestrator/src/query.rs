//! Query orchestrator
//!
//! Turns a search or compare intent into one completion request, decodes
//! the reply and publishes the outcome to the [`StateStore`]. Each call
//! makes exactly one request: there is no caching, deduplication or retry.
//!
//! Operations run in two phases so the HTTP layer can answer before the
//! completion service does. `start_*` performs the synchronous prefix
//! (ticket, state reset, flag, prompt) and returns a pending handle whose
//! `run` awaits the reply.

use std::sync::Arc;

use compass_core::{College, ComparisonAnalysis, MIN_COMPARE};
use gemini::CompletionProvider;
use tracing::{debug, error, info};

use crate::decode::ResponseDecoders;
use crate::error::{QueryKind, Result};
use crate::prompts::QueryPrompts;
use crate::resources::InFlightGuard;
use crate::store::StateStore;

/// Dispatches search and compare requests against a completion provider
pub struct QueryOrchestrator {
    provider: Arc<dyn CompletionProvider>,
    store: StateStore,
    decoders: Arc<ResponseDecoders>,
}

impl QueryOrchestrator {
    pub fn new(provider: Arc<dyn CompletionProvider>, store: StateStore) -> Result<Self> {
        Ok(Self {
            provider,
            store,
            decoders: Arc::new(ResponseDecoders::new()?),
        })
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Begin a search. Results, analysis and error are cleared and the
    /// searching flag is raised before this returns.
    ///
    /// The caller ensures `job` and `location` are non-empty.
    pub fn start_search(&self, job: &str, location: &str) -> PendingSearch {
        let ticket = self.store.begin_search(job, location);
        let guard = InFlightGuard::new(self.store.clone(), QueryKind::Search, ticket);
        let prompt = QueryPrompts::search(job, location);

        debug!(
            job = %job,
            location = %location,
            ticket,
            provider = self.provider.name(),
            "Built search request"
        );

        PendingSearch {
            request: Request {
                provider: Arc::clone(&self.provider),
                decoders: Arc::clone(&self.decoders),
                store: self.store.clone(),
                prompt,
                guard,
            },
        }
    }

    pub async fn search(&self, job: &str, location: &str) -> Result<Vec<College>> {
        self.start_search(job, location).run().await
    }

    /// Begin a comparison over `colleges`.
    ///
    /// Returns `None` without touching any state when fewer than two
    /// colleges are given.
    pub fn start_compare(&self, colleges: &[College], job: &str) -> Option<PendingCompare> {
        if colleges.len() < MIN_COMPARE {
            debug!(count = colleges.len(), "Comparison needs at least two colleges");
            return None;
        }

        let ticket = self.store.begin_compare(colleges);
        let guard = InFlightGuard::new(self.store.clone(), QueryKind::Compare, ticket);
        let prompt = QueryPrompts::compare(colleges, job);

        debug!(
            job = %job,
            colleges = colleges.len(),
            ticket,
            provider = self.provider.name(),
            "Built comparison request"
        );

        Some(PendingCompare {
            request: Request {
                provider: Arc::clone(&self.provider),
                decoders: Arc::clone(&self.decoders),
                store: self.store.clone(),
                prompt,
                guard,
            },
        })
    }

    /// Compare `colleges`. `Ok(None)` means nothing was requested.
    pub async fn compare(
        &self,
        colleges: &[College],
        job: &str,
    ) -> Result<Option<ComparisonAnalysis>> {
        match self.start_compare(colleges, job) {
            Some(pending) => pending.run().await.map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("provider", &self.provider.name())
            .field("store", &self.store)
            .finish()
    }
}

/// Everything a started request needs once it leaves the orchestrator
struct Request {
    provider: Arc<dyn CompletionProvider>,
    decoders: Arc<ResponseDecoders>,
    store: StateStore,
    prompt: String,
    guard: InFlightGuard,
}

impl Request {
    fn ticket(&self) -> u64 {
        self.guard.ticket()
    }
}

/// A started search awaiting its reply
#[must_use = "a pending search does nothing until run"]
pub struct PendingSearch {
    request: Request,
}

impl PendingSearch {
    pub fn ticket(&self) -> u64 {
        self.request.ticket()
    }

    /// Await the reply and publish it.
    ///
    /// The decoded colleges are returned even when a newer search has
    /// superseded this one; only the store ignores them.
    pub async fn run(self) -> Result<Vec<College>> {
        let Request {
            provider,
            decoders,
            store,
            prompt,
            guard,
        } = self.request;
        let ticket = guard.ticket();

        let outcome = match provider.generate(&prompt, decoders.search.schema()).await {
            Ok(text) => decoders.colleges(&text),
            Err(e) => Err(e.into()),
        };

        match &outcome {
            Ok(colleges) => {
                if store.complete_search(ticket, colleges.clone()) {
                    info!(ticket, count = colleges.len(), "Search completed");
                }
            }
            Err(e) => {
                error!(ticket, error = %e, "Search failed");
                store.fail(QueryKind::Search, ticket);
            }
        }

        guard.release();
        outcome
    }
}

/// A started comparison awaiting its reply
#[must_use = "a pending comparison does nothing until run"]
pub struct PendingCompare {
    request: Request,
}

impl PendingCompare {
    pub fn ticket(&self) -> u64 {
        self.request.ticket()
    }

    pub async fn run(self) -> Result<ComparisonAnalysis> {
        let Request {
            provider,
            decoders,
            store,
            prompt,
            guard,
        } = self.request;
        let ticket = guard.ticket();

        let outcome = match provider.generate(&prompt, decoders.compare.schema()).await {
            Ok(text) => decoders.comparison(&text),
            Err(e) => Err(e.into()),
        };

        match &outcome {
            Ok(analysis) => {
                if store.complete_compare(ticket, analysis.clone()) {
                    info!(ticket, entries = analysis.len(), "Comparison completed");
                }
            }
            Err(e) => {
                error!(ticket, error = %e, "Comparison failed");
                store.fail(QueryKind::Compare, ticket);
            }
        }

        guard.release();
        outcome
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory completion provider

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use gemini::{CompletionProvider, GeminiError, GeminiResult, ResponseSchema};
    use tokio::sync::oneshot;

    pub enum Reply {
        Text(String),
        Fail(GeminiError),
        /// Resolves when the test sends the text
        Wait(oneshot::Receiver<String>),
    }

    #[derive(Default)]
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Reply>>,
        prompts: Mutex<Vec<String>>,
        schemas: Mutex<Vec<ResponseSchema>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, text: &str) -> Self {
            self.push(Reply::Text(text.to_string()))
        }

        pub fn fail(self, error: GeminiError) -> Self {
            self.push(Reply::Fail(error))
        }

        /// Queue a reply the test releases later through the returned sender
        pub fn wait(&self) -> oneshot::Sender<String> {
            let (tx, rx) = oneshot::channel();
            self.lock_replies().push_back(Reply::Wait(rx));
            tx
        }

        fn push(self, reply: Reply) -> Self {
            self.lock_replies().push_back(reply);
            self
        }

        fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Reply>> {
            self.replies.lock().unwrap()
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn schemas(&self) -> Vec<ResponseSchema> {
            self.schemas.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str, schema: &ResponseSchema) -> GeminiResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.schemas.lock().unwrap().push(schema.clone());

            let reply = self.lock_replies().pop_front();
            match reply {
                Some(Reply::Text(text)) => Ok(text),
                Some(Reply::Fail(error)) => Err(error),
                Some(Reply::Wait(rx)) => rx.await.map_err(|_| GeminiError::Api {
                    message: "reply sender dropped".to_string(),
                    status_code: None,
                }),
                None => Ok(String::new()),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }
}
