//! Orchestration core for the playground client.
//!
//! [`Playground`] owns the [`AppState`], the [`MutationRegistry`] and the
//! backend. Triggers run synchronously: they snapshot source and
//! configuration, build the request, register the call and move focus. The
//! network call itself runs on a spawned task that posts a [`Settlement`] back
//! on the engine's channel; settlements are applied on the caller's thread by
//! [`Playground::apply_pending_settlements`], [`Playground::next_settlement`]
//! or [`Playground::settle`].
//!
//! Triggers spawn onto the ambient Tokio runtime and must be called from
//! within one. Requests are never retried and never cancelled. A trigger for
//! a kind that already has a call outstanding gets a [`Ticket`] for that same
//! call.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, TryFutureExt};
use tokio::sync::mpsc;

use playground_client::fetch_versions;
use playground_core::edit;
use playground_core::page::{InitialSource, PageQuery, resolve_page_load};
use playground_core::request::{Origin, Request, build_request, load_gist_request};
use playground_types::wire::{CrateInfo, GistResponse, Versions};
use playground_types::{
    Action, AssemblyOptions, Backtrace, Channel, Configuration, Edition, InvocationId, Mode,
    PrimaryAction, Snippet, SnippetSettings,
};

mod app;
mod focus;
mod registry;
mod state;

pub use app::AppState;
pub use focus::FocusController;
pub use playground_client::{ApiError, Backend};
pub use playground_core::BuildError;
pub use registry::{Completion, MutationRegistry};
pub use state::{Outcome, Outputs, RecordStatus, RequestRecord, Response};

/// Handle for one trigger.
#[derive(Clone)]
pub struct Ticket {
    action: Action,
    id: InvocationId,
    reused: bool,
    completion: Completion,
}

impl Ticket {
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub fn id(&self) -> InvocationId {
        self.id
    }

    /// Whether this trigger joined a call that was already outstanding.
    #[must_use]
    pub fn reused(&self) -> bool {
        self.reused
    }

    /// Resolves to the call's outcome. Does not touch application state.
    pub async fn outcome(&self) -> Outcome {
        self.completion.clone().await
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("action", &self.action)
            .field("id", &self.id)
            .field("reused", &self.reused)
            .finish_non_exhaustive()
    }
}

/// A finished call on its way back to the state.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub action: Action,
    pub id: InvocationId,
    pub outcome: Outcome,
}

/// Configuration and output a snippet request carries into its response.
#[derive(Debug, Default)]
struct SnippetCapture {
    settings: SnippetSettings,
    stdout: String,
    stderr: String,
}

pub struct Playground<B: ?Sized> {
    state: AppState,
    backend: Arc<B>,
    registry: MutationRegistry,
    settlements_tx: mpsc::UnboundedSender<Settlement>,
    settlements_rx: mpsc::UnboundedReceiver<Settlement>,
}

impl<B: Backend + ?Sized> Playground<B> {
    pub fn new(backend: Arc<B>, configuration: Configuration) -> Self {
        let (settlements_tx, settlements_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(configuration),
            backend,
            registry: MutationRegistry::new(),
            settlements_tx,
            settlements_rx,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    // ========================================================================
    // Source edits
    // ========================================================================

    pub fn edit_code(&mut self, code: impl Into<Arc<str>>) {
        self.state.set_code(code);
    }

    pub fn add_main_function(&mut self) {
        let code = edit::add_main_function(self.state.code());
        self.state.set_code(code);
    }

    pub fn add_import(&mut self, import: &str) {
        let code = edit::add_import(self.state.code(), import);
        self.state.set_code(code);
    }

    pub fn enable_feature_gate(&mut self, feature: &str) {
        let code = edit::enable_feature_gate(self.state.code(), feature);
        self.state.set_code(code);
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn change_channel(&mut self, channel: Channel) {
        self.state.configuration.channel = channel;
    }

    pub fn change_mode(&mut self, mode: Mode) {
        self.state.configuration.mode = mode;
    }

    pub fn change_edition(&mut self, edition: Edition) {
        self.state.configuration.edition = edition;
    }

    pub fn change_backtrace(&mut self, backtrace: Backtrace) {
        self.state.configuration.backtrace = backtrace;
    }

    pub fn change_primary_action(&mut self, primary: PrimaryAction) {
        self.state.configuration.primary_action = primary;
    }

    pub fn change_assembly(&mut self, assembly: AssemblyOptions) {
        self.state.configuration.assembly = assembly;
    }

    pub fn change_focus(&mut self, focus: Option<Action>) {
        self.state.focus.set(focus);
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// Performs whatever the generic "run" control is bound to.
    pub fn perform_primary(&mut self) -> Result<Ticket, BuildError> {
        let origin = match self.state.configuration.primary_action {
            PrimaryAction::Auto => Origin::Auto,
            PrimaryAction::Action(_) => Origin::Explicit,
        };
        let action = self.state.primary_action();
        self.trigger(action, origin)
    }

    /// Performs `action` on the user's explicit request.
    ///
    /// Run, build, test and the show family also become the primary action.
    /// HIR and WASM switch to nightly first.
    pub fn perform(&mut self, action: Action) -> Result<Ticket, BuildError> {
        if action.requires_nightly() {
            self.state.configuration.channel = Channel::Nightly;
        }
        if action.is_primary_candidate() {
            self.state.configuration.primary_action = PrimaryAction::Action(action);
        }
        self.trigger(action, Origin::Explicit)
    }

    /// Turns backtraces on and runs again.
    pub fn re_execute_with_backtrace(&mut self) -> Result<Ticket, BuildError> {
        self.state.configuration.backtrace = Backtrace::Enabled;
        self.trigger(Action::Execute, Origin::Explicit)
    }

    /// Fetches a snippet. `settings` override the configuration stored with it.
    pub fn load_snippet(&mut self, id: impl Into<String>, settings: SnippetSettings) -> Ticket {
        if let Some(ticket) = self.reuse(Action::LoadSnippet) {
            return ticket;
        }
        self.launch(Action::LoadSnippet, load_gist_request(id), settings)
    }

    /// Shares the current source together with the latest run output.
    pub fn save_snippet(&mut self) -> Result<Ticket, BuildError> {
        self.trigger(Action::SaveSnippet, Origin::Explicit)
    }

    /// Applies the configuration carried by a shared link and starts loading
    /// its snippet, if any.
    pub fn index_page_load(&mut self, query: &PageQuery) -> Option<Ticket> {
        let initial = resolve_page_load(query);
        let settings = initial.settings();
        self.state.configuration.channel = settings.channel;
        self.state.configuration.mode = settings.mode;
        self.state.configuration.edition = settings.edition;

        match initial.source {
            InitialSource::Code(code) => {
                self.state.set_code(code);
                None
            }
            InitialSource::Snippet(id) => Some(self.load_snippet(id, settings)),
            InitialSource::Default => None,
        }
    }

    fn trigger(&mut self, action: Action, origin: Origin) -> Result<Ticket, BuildError> {
        if let Some(ticket) = self.reuse(action) {
            return Ok(ticket);
        }
        let request = build_request(action, &self.state.request_context(origin))?;
        let settings = self.state.configuration.snippet_settings();
        Ok(self.launch(action, request, settings))
    }

    fn reuse(&mut self, action: Action) -> Option<Ticket> {
        let (id, completion) = self.registry.in_flight(action)?;
        tracing::debug!(%action, %id, "Reusing in-flight request");
        self.state.reuse(action);
        Some(Ticket {
            action,
            id,
            reused: true,
            completion,
        })
    }

    fn launch(&mut self, action: Action, request: Request, settings: SnippetSettings) -> Ticket {
        let (stdout, stderr) = if matches!(request, Request::SaveGist(_)) {
            self.state.outputs.latest_execution_output()
        } else {
            Default::default()
        };
        let capture = SnippetCapture {
            settings,
            stdout,
            stderr,
        };

        let call = dispatch(self.backend.as_ref(), request, capture);
        let (id, completion) = self.registry.begin(action, call);
        self.state.begin(action, id);
        tracing::debug!(%action, %id, "Started request");

        let tx = self.settlements_tx.clone();
        let driver = completion.clone();
        tokio::spawn(async move {
            let outcome = driver.await;
            let _ = tx.send(Settlement {
                action,
                id,
                outcome,
            });
        });

        Ticket {
            action,
            id,
            reused: false,
            completion,
        }
    }

    // ========================================================================
    // Settlements
    // ========================================================================

    /// Applies one settlement. Returns `false` if it was stale.
    pub fn apply_settlement(&mut self, settlement: Settlement) -> bool {
        let Settlement {
            action,
            id,
            outcome,
        } = settlement;
        self.registry.finish(action, id);
        self.state.settle(action, id, outcome)
    }

    /// Applies every settlement that has already arrived, without waiting.
    pub fn apply_pending_settlements(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(settlement) = self.settlements_rx.try_recv() {
            if self.apply_settlement(settlement) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next settlement and applies it.
    pub async fn next_settlement(&mut self) -> Option<Action> {
        let settlement = self.settlements_rx.recv().await?;
        let action = settlement.action;
        self.apply_settlement(settlement).then_some(action)
    }

    /// Applies settlements until the ticket's call has been stored.
    pub async fn settle(&mut self, ticket: &Ticket) -> &RequestRecord {
        while self.is_waiting_on(ticket) {
            let Some(settlement) = self.settlements_rx.recv().await else {
                break;
            };
            self.apply_settlement(settlement);
        }
        self.state.record(ticket.action)
    }

    fn is_waiting_on(&self, ticket: &Ticket) -> bool {
        let record = self.state.record(ticket.action);
        record.invocation() == Some(ticket.id) && record.is_pending()
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Fetches and stores every toolchain version.
    pub async fn refresh_versions(&mut self) -> Result<&Versions, ApiError> {
        let versions = fetch_versions(self.backend.as_ref()).await?;
        let stored = self.state.versions.insert(versions);
        Ok(&*stored)
    }

    pub async fn crates(&self) -> Result<Vec<CrateInfo>, ApiError> {
        self.backend.crates().await
    }
}

fn dispatch<B: Backend + ?Sized>(
    backend: &B,
    request: Request,
    capture: SnippetCapture,
) -> BoxFuture<'static, Outcome> {
    match request {
        Request::Execute(body) => backend.execute(body).map_ok(Response::Execute).boxed(),
        Request::Compile(body) => backend.compile(body).map_ok(Response::Compile).boxed(),
        Request::Format(body) => backend.format(body).map_ok(Response::Format).boxed(),
        Request::Clippy(body) => backend.clippy(body).map_ok(Response::Tool).boxed(),
        Request::Miri(body) => backend.miri(body).map_ok(Response::Tool).boxed(),
        Request::MacroExpansion(body) => {
            backend.macro_expansion(body).map_ok(Response::Tool).boxed()
        }
        Request::LoadGist { id } => backend
            .load_gist(id)
            .map_ok(move |gist| Response::Snippet(snippet_from(gist, capture)))
            .boxed(),
        Request::SaveGist(body) => {
            let code = body.code.clone();
            backend
                .save_gist(body)
                .map_ok(move |gist| {
                    Response::Snippet(snippet_from(GistResponse { code, ..gist }, capture))
                })
                .boxed()
        }
    }
}

/// Merges a gist with the configuration and output captured at trigger time.
/// The captured configuration wins; code comes from the gist.
fn snippet_from(gist: GistResponse, capture: SnippetCapture) -> Snippet {
    Snippet {
        id: gist.id,
        url: gist.url,
        code: gist.code,
        stdout: capture.stdout,
        stderr: capture.stderr,
        channel: capture.settings.channel,
        mode: capture.settings.mode,
        edition: capture.settings.edition,
    }
}
