//! Contact dialog state shared by every call-to-action on the page.
//!
//! A single [`PopupController`] is created when the page is composed and
//! handed out through a [`UiScope`]. Triggers only ever go through
//! [`PopupController::open_popup`] and [`PopupController::close_popup`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const DEFAULT_TITLE: &str = "Оставить заявку";
pub const DEFAULT_SOURCE: &str = "Сайт";

/// Delay before labels fall back to defaults, matching the close transition.
pub const RESET_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupState {
    pub is_open: bool,
    pub title: String,
    pub source: String,
}

impl Default for PopupState {
    fn default() -> Self {
        Self {
            is_open: false,
            title: DEFAULT_TITLE.to_string(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

/// Structured framing for a dialog; absent fields use the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupOptions {
    pub title: Option<String>,
    pub source: Option<String>,
}

impl PopupOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// What a trigger asks the dialog to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupRequest {
    Default,
    Title(String),
    Custom(PopupOptions),
}

impl PopupRequest {
    fn resolve(self) -> (String, String) {
        match self {
            PopupRequest::Default => (DEFAULT_TITLE.to_string(), DEFAULT_SOURCE.to_string()),
            PopupRequest::Title(title) => (title, DEFAULT_SOURCE.to_string()),
            PopupRequest::Custom(options) => (
                options.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                options.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            ),
        }
    }
}

impl From<()> for PopupRequest {
    fn from(_: ()) -> Self {
        PopupRequest::Default
    }
}

impl From<&str> for PopupRequest {
    fn from(title: &str) -> Self {
        PopupRequest::Title(title.to_string())
    }
}

impl From<String> for PopupRequest {
    fn from(title: String) -> Self {
        PopupRequest::Title(title)
    }
}

impl From<PopupOptions> for PopupRequest {
    fn from(options: PopupOptions) -> Self {
        PopupRequest::Custom(options)
    }
}

#[derive(Debug, Default)]
struct PopupInner {
    state: PopupState,
    // Bumped on every open/close so a stale reset never touches a reopened dialog.
    generation: u64,
    pending_reset: Option<JoinHandle<()>>,
}

impl PopupInner {
    fn cancel_pending_reset(&mut self) {
        if let Some(handle) = self.pending_reset.take() {
            handle.abort();
        }
    }

    fn reset_labels(&mut self) {
        self.state.title = DEFAULT_TITLE.to_string();
        self.state.source = DEFAULT_SOURCE.to_string();
    }
}

#[derive(Debug, Clone)]
pub struct PopupController {
    inner: Arc<Mutex<PopupInner>>,
    reset_delay: Duration,
}

impl Default for PopupController {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupController {
    pub fn new() -> Self {
        Self::with_reset_delay(RESET_DELAY)
    }

    pub fn with_reset_delay(reset_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PopupInner::default())),
            reset_delay,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PopupInner> {
        self.inner.lock().expect("popup state mutex poisoned")
    }

    pub fn state(&self) -> PopupState {
        self.lock().state.clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().state.is_open
    }

    pub fn open_popup(&self, request: impl Into<PopupRequest>) {
        let (title, source) = request.into().resolve();
        let mut inner = self.lock();
        inner.cancel_pending_reset();
        inner.generation = inner.generation.wrapping_add(1);
        inner.state = PopupState {
            is_open: true,
            title,
            source,
        };
        tracing::debug!(title = %inner.state.title, source = %inner.state.source, "contact popup opened");
    }

    /// Hide the dialog now and restore default labels once the close
    /// transition has had time to finish.
    pub fn close_popup(&self) {
        let mut inner = self.lock();
        inner.cancel_pending_reset();
        inner.generation = inner.generation.wrapping_add(1);
        inner.state.is_open = false;

        let Ok(runtime) = Handle::try_current() else {
            inner.reset_labels();
            return;
        };

        let generation = inner.generation;
        let shared = Arc::clone(&self.inner);
        let delay = self.reset_delay;
        inner.pending_reset = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = shared.lock().expect("popup state mutex poisoned");
            if inner.generation == generation && !inner.state.is_open {
                inner.reset_labels();
                inner.pending_reset = None;
            }
        }));
    }
}

/// Context handed to the UI tree at composition time.
#[derive(Debug, Clone, Default)]
pub struct UiScope {
    popup: Option<PopupController>,
}

impl UiScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_popup(mut self, controller: PopupController) -> Self {
        self.popup = Some(controller);
        self
    }

    pub fn try_popup(&self) -> Option<PopupController> {
        self.popup.clone()
    }

    /// Popup controller for this scope.
    ///
    /// # Panics
    ///
    /// Panics when the scope was composed without a controller.
    #[track_caller]
    pub fn popup(&self) -> PopupController {
        match &self.popup {
            Some(controller) => controller.clone(),
            None => panic!("popup controller used outside of a UiScope that provides one"),
        }
    }
}
