//! Application state and its transitions.

use std::sync::Arc;

use playground_core::edit::DEFAULT_CODE;
use playground_core::request::{Origin, RequestContext};
use playground_core::resolver::{is_auto_build, resolve_primary_action};
use playground_core::{SourceAnalyzer, SourceFacts};
use playground_types::wire::Versions;
use playground_types::{Action, Configuration, InvocationId, Snippet};

use crate::focus::FocusController;
use crate::state::{Outcome, Outputs, RequestRecord, Response};

/// Everything the view renders from.
///
/// Transitions are plain methods on this struct; asynchronous work lives in
/// [`Playground`](crate::Playground) and reports back through settlements.
#[derive(Debug)]
pub struct AppState {
    code: Arc<str>,
    analyzer: SourceAnalyzer,
    facts: SourceFacts,
    pub(crate) configuration: Configuration,
    pub(crate) outputs: Outputs,
    pub(crate) focus: FocusController,
    snippet: Option<Snippet>,
    pub(crate) versions: Option<Versions>,
}

impl AppState {
    #[must_use]
    pub fn new(configuration: Configuration) -> Self {
        let mut state = Self {
            code: Arc::from(""),
            analyzer: SourceAnalyzer::new(),
            facts: SourceFacts::default(),
            configuration,
            outputs: Outputs::default(),
            focus: FocusController::default(),
            snippet: None,
            versions: None,
        };
        state.set_code(DEFAULT_CODE);
        state
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn facts(&self) -> &SourceFacts {
        &self.facts
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[must_use]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    #[must_use]
    pub fn record(&self, action: Action) -> &RequestRecord {
        self.outputs.record(action)
    }

    #[must_use]
    pub fn focus(&self) -> Option<Action> {
        self.focus.current()
    }

    #[must_use]
    pub fn snippet(&self) -> Option<&Snippet> {
        self.snippet.as_ref()
    }

    #[must_use]
    pub fn versions(&self) -> Option<&Versions> {
        self.versions.as_ref()
    }

    // ========================================================================
    // Derived facts
    // ========================================================================

    /// What the source alone asks for.
    #[must_use]
    pub fn default_action(&self) -> Action {
        self.facts.default_action()
    }

    /// What the generic "run" control performs right now.
    #[must_use]
    pub fn primary_action(&self) -> Action {
        resolve_primary_action(self.configuration.primary_action, self.default_action())
    }

    #[must_use]
    pub fn execution_label(&self) -> &'static str {
        self.primary_action().label()
    }

    #[must_use]
    pub fn is_auto_build(&self) -> bool {
        is_auto_build(self.configuration.primary_action, self.default_action())
    }

    #[must_use]
    pub fn show_snippet_loader(&self) -> bool {
        self.outputs.is_pending(Action::LoadSnippet) || self.outputs.is_pending(Action::SaveSnippet)
    }

    #[must_use]
    pub fn is_output_focused(&self) -> bool {
        self.focus.is_focused()
    }

    #[must_use]
    pub fn has_any_result(&self) -> bool {
        self.outputs.has_any_result()
    }

    pub(crate) fn request_context(&self, origin: Origin) -> RequestContext<'_> {
        RequestContext {
            code: &self.code,
            config: &self.configuration,
            facts: &self.facts,
            origin,
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    pub(crate) fn set_code(&mut self, code: impl Into<Arc<str>>) {
        self.code = code.into();
        self.facts = self.analyzer.facts(&self.code).clone();
    }

    /// A call for `action` started under `id`.
    pub(crate) fn begin(&mut self, action: Action, id: InvocationId) {
        self.outputs.record_mut(action).start(id);
        self.focus.on_trigger(action);
        if action == Action::LoadSnippet {
            self.set_code("");
        }
    }

    /// A trigger for `action` reused the outstanding call.
    pub(crate) fn reuse(&mut self, action: Action) {
        self.focus.on_trigger(action);
    }

    /// Stores a settled outcome. Returns `false` when the record is no longer
    /// waiting on `id`.
    pub(crate) fn settle(&mut self, action: Action, id: InvocationId, outcome: Outcome) -> bool {
        let record = self.outputs.record(action);
        if record.invocation() != Some(id) || !record.is_pending() {
            tracing::warn!(%action, %id, "Discarding stale settlement");
            return false;
        }

        match &outcome {
            Ok(response) => {
                tracing::debug!(%action, %id, "Request succeeded");
                self.apply_response(action, response);
            }
            Err(error) => {
                tracing::warn!(%action, %id, %error, "Request failed");
            }
        }
        self.outputs.record_mut(action).settle(id, outcome)
    }

    fn apply_response(&mut self, action: Action, response: &Response) {
        match (action, response) {
            (Action::Format, Response::Format(formatted)) if formatted.success => {
                self.set_code(formatted.code.as_str());
                self.focus.on_format_applied();
            }
            (Action::LoadSnippet, Response::Snippet(snippet)) => {
                self.set_code(snippet.code.as_str());
                self.configuration.channel = snippet.channel;
                self.configuration.mode = snippet.mode;
                self.configuration.edition = snippet.edition;
                self.snippet = Some(snippet.clone());
            }
            (Action::SaveSnippet, Response::Snippet(snippet)) => {
                self.snippet = Some(snippet.clone());
            }
            _ => {}
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}
