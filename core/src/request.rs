//! Assembles the outbound payload for each action.
//!
//! Builders only read the [`RequestContext`] they are handed; the caller
//! snapshots source and configuration at trigger time, so a slow request is
//! never affected by later edits.

use thiserror::Error;

use playground_types::wire::{
    ClippyRequest, CompileRequest, EditionRequest, ExecuteRequest, SaveGistRequest,
};
use playground_types::{Action, Configuration};

use crate::heuristics::SourceFacts;

/// How the action was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Resolved from the source by the auto selector.
    Auto,
    /// Picked by the user (a dedicated button, or a fixed primary selector).
    Explicit,
}

/// Everything a builder may read.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub code: &'a str,
    pub config: &'a Configuration,
    pub facts: &'a SourceFacts,
    pub origin: Origin,
}

/// A fully built request, tagged with the endpoint it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Execute(ExecuteRequest),
    Compile(CompileRequest),
    Format(EditionRequest),
    Clippy(ClippyRequest),
    Miri(EditionRequest),
    MacroExpansion(EditionRequest),
    LoadGist { id: String },
    SaveGist(SaveGistRequest),
}

impl Request {
    /// Path relative to the service root.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Request::Execute(_) => "execute".to_string(),
            Request::Compile(_) => "compile".to_string(),
            Request::Format(_) => "format".to_string(),
            Request::Clippy(_) => "clippy".to_string(),
            Request::Miri(_) => "miri".to_string(),
            Request::MacroExpansion(_) => "macro-expansion".to_string(),
            Request::LoadGist { id } => format!("meta/gist/{id}"),
            Request::SaveGist(_) => "meta/gist".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("loading a snippet requires its id")]
    MissingSnippetId,
}

/// Builds the request for `action`.
///
/// Snippet loads are addressed by id rather than by source; use
/// [`load_gist_request`] for those.
pub fn build_request(action: Action, ctx: &RequestContext<'_>) -> Result<Request, BuildError> {
    let request = match action {
        Action::Execute | Action::Compile | Action::Test => {
            Request::Execute(execute_request(action, ctx))
        }
        Action::ShowAssembly
        | Action::ShowLlvmIr
        | Action::ShowHir
        | Action::ShowMir
        | Action::ShowWasm => Request::Compile(compile_request(action, ctx)),
        Action::Format => Request::Format(edition_request(ctx)),
        Action::Lint => Request::Clippy(ClippyRequest {
            code: ctx.code.to_string(),
            edition: ctx.config.edition,
            crate_type: ctx.facts.crate_type().to_string(),
        }),
        Action::Interpret => Request::Miri(edition_request(ctx)),
        Action::ExpandMacros => Request::MacroExpansion(edition_request(ctx)),
        Action::SaveSnippet => Request::SaveGist(SaveGistRequest {
            code: ctx.code.to_string(),
        }),
        Action::LoadSnippet => return Err(BuildError::MissingSnippetId),
    };
    Ok(request)
}

#[must_use]
pub fn load_gist_request(id: impl Into<String>) -> Request {
    Request::LoadGist { id: id.into() }
}

/// Crate type and test flag for the `/execute` family.
///
/// Explicit picks are fixed shapes. Auto picks honour a declared crate type
/// and run tests exactly when the heuristics chose `test`.
fn execution_shape(action: Action, ctx: &RequestContext<'_>) -> (String, bool) {
    match ctx.origin {
        Origin::Explicit => match action {
            Action::Execute => ("bin".to_string(), false),
            Action::Test => ("lib".to_string(), true),
            _ => ("lib".to_string(), false),
        },
        Origin::Auto => {
            let crate_type = match ctx.facts.output_kind.as_deref() {
                Some(kind) => kind,
                None if action == Action::Execute => "bin",
                None => "lib",
            };
            (crate_type.to_string(), action == Action::Test)
        }
    }
}

fn execute_request(action: Action, ctx: &RequestContext<'_>) -> ExecuteRequest {
    let (crate_type, tests) = execution_shape(action, ctx);
    ExecuteRequest {
        channel: ctx.config.channel,
        mode: ctx.config.mode,
        edition: ctx.config.edition,
        crate_type,
        tests,
        code: ctx.code.to_string(),
        backtrace: ctx.config.backtrace_enabled(),
    }
}

fn compile_request(action: Action, ctx: &RequestContext<'_>) -> CompileRequest {
    let target = action
        .compile_target()
        .map(|target| target.as_str())
        .unwrap_or_default();
    CompileRequest {
        channel: ctx.config.channel,
        mode: ctx.config.mode,
        edition: ctx.config.edition,
        crate_type: ctx.facts.crate_type().to_string(),
        tests: ctx.facts.runs_as_test(),
        code: ctx.code.to_string(),
        backtrace: ctx.config.backtrace_enabled(),
        target: target.to_string(),
        assembly_flavor: ctx.config.assembly.flavor,
        demangle_assembly: ctx.config.assembly.demangle,
        process_assembly: ctx.config.assembly.process,
    }
}

fn edition_request(ctx: &RequestContext<'_>) -> EditionRequest {
    EditionRequest {
        code: ctx.code.to_string(),
        edition: ctx.config.edition,
    }
}
