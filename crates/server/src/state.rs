use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use events::EventBus;
use gemini::CompletionProvider;
use orchestrator::{QueryOrchestrator, StateStore, ViewController};

use crate::routes::sse::{
    spawn_event_recorder, EventBuffer, SharedEventBuffer, DEFAULT_EVENT_BUFFER_SIZE,
};

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ViewController>,
    pub event_bus: EventBus,
    pub event_buffer: SharedEventBuffer,
    pub app_dir: Option<PathBuf>,
}

impl AppState {
    /// Wire store, orchestrator and controller around `provider` and start
    /// recording events for SSE replay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> orchestrator::Result<Self> {
        let event_bus = EventBus::new();
        let event_buffer = Arc::new(RwLock::new(EventBuffer::new(DEFAULT_EVENT_BUFFER_SIZE)));
        spawn_event_recorder(&event_bus, Arc::clone(&event_buffer));

        let store = StateStore::new(event_bus.clone());
        let orchestrator = Arc::new(QueryOrchestrator::new(provider, store)?);

        Ok(Self {
            controller: Arc::new(ViewController::new(orchestrator)),
            event_bus,
            event_buffer,
            app_dir: None,
        })
    }

    pub fn with_app_dir(mut self, app_dir: PathBuf) -> Self {
        self.app_dir = Some(app_dir);
        self
    }

    pub fn store(&self) -> &StateStore {
        self.controller.store()
    }
}
