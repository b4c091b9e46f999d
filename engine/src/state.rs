//! Request records and the output aggregation over them.

use playground_client::ApiError;
use playground_types::wire::{CompileResponse, ExecuteResponse, FormatResponse, ToolResponse};
use playground_types::{Action, InvocationId, Snippet};

/// A settled call: the decoded response or the normalized error.
pub type Outcome = Result<Response, ApiError>;

/// Decoded response of one remote action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Execute(ExecuteResponse),
    Compile(CompileResponse),
    Format(FormatResponse),
    /// Lint, interpret and macro expansion share one shape.
    Tool(ToolResponse),
    /// A loaded or saved snippet, already merged with its configuration.
    Snippet(Snippet),
}

impl Response {
    /// Whether the view has anything to render for this response.
    #[must_use]
    pub fn has_content(&self) -> bool {
        match self {
            Response::Execute(r) => !r.stdout.is_empty() || !r.stderr.is_empty(),
            Response::Compile(r) => {
                !r.code.is_empty() || !r.stdout.is_empty() || !r.stderr.is_empty()
            }
            Response::Format(r) => !r.code.is_empty() || !r.stdout.is_empty() || !r.stderr.is_empty(),
            Response::Tool(r) => r.success || !r.stdout.is_empty() || !r.stderr.is_empty(),
            Response::Snippet(_) => true,
        }
    }

    /// `(stdout, stderr)` of the response.
    #[must_use]
    pub fn output(&self) -> (&str, &str) {
        match self {
            Response::Execute(r) => (&r.stdout, &r.stderr),
            Response::Compile(r) => (&r.stdout, &r.stderr),
            Response::Format(r) => (&r.stdout, &r.stderr),
            Response::Tool(r) => (&r.stdout, &r.stderr),
            Response::Snippet(s) => (&s.stdout, &s.stderr),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordStatus {
    #[default]
    Idle,
    Pending,
    Succeeded(Response),
    Failed(ApiError),
}

/// Lifecycle of one action kind.
///
/// Moves to `Pending` when a fresh call starts (dropping the previous result)
/// and to `Succeeded` or `Failed` when that call settles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestRecord {
    invocation: Option<InvocationId>,
    status: RecordStatus,
}

impl RequestRecord {
    #[must_use]
    pub fn invocation(&self) -> Option<InvocationId> {
        self.invocation
    }

    #[must_use]
    pub fn status(&self) -> &RecordStatus {
        &self.status
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.status, RecordStatus::Pending)
    }

    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match &self.status {
            RecordStatus::Succeeded(response) => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match &self.status {
            RecordStatus::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Pending, a response with content, or an error.
    #[must_use]
    pub fn has_something_to_show(&self) -> bool {
        match &self.status {
            RecordStatus::Idle => false,
            RecordStatus::Pending | RecordStatus::Failed(_) => true,
            RecordStatus::Succeeded(response) => response.has_content(),
        }
    }

    pub(crate) fn start(&mut self, id: InvocationId) {
        self.invocation = Some(id);
        self.status = RecordStatus::Pending;
    }

    /// Stores the outcome if `id` is the call this record is waiting on.
    pub(crate) fn settle(&mut self, id: InvocationId, outcome: Outcome) -> bool {
        if self.invocation != Some(id) || !self.is_pending() {
            return false;
        }
        self.status = match outcome {
            Ok(response) => RecordStatus::Succeeded(response),
            Err(error) => RecordStatus::Failed(error),
        };
        true
    }
}

/// One record per action kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    pub execute: RequestRecord,
    pub compile: RequestRecord,
    pub test: RequestRecord,
    pub assembly: RequestRecord,
    pub llvm_ir: RequestRecord,
    pub hir: RequestRecord,
    pub mir: RequestRecord,
    pub wasm: RequestRecord,
    pub format: RequestRecord,
    pub clippy: RequestRecord,
    pub miri: RequestRecord,
    pub macro_expansion: RequestRecord,
    pub gist_load: RequestRecord,
    pub gist_save: RequestRecord,
}

impl Outputs {
    #[must_use]
    pub fn record(&self, action: Action) -> &RequestRecord {
        match action {
            Action::Execute => &self.execute,
            Action::Compile => &self.compile,
            Action::Test => &self.test,
            Action::ShowAssembly => &self.assembly,
            Action::ShowLlvmIr => &self.llvm_ir,
            Action::ShowHir => &self.hir,
            Action::ShowMir => &self.mir,
            Action::ShowWasm => &self.wasm,
            Action::Format => &self.format,
            Action::Lint => &self.clippy,
            Action::Interpret => &self.miri,
            Action::ExpandMacros => &self.macro_expansion,
            Action::LoadSnippet => &self.gist_load,
            Action::SaveSnippet => &self.gist_save,
        }
    }

    pub(crate) fn record_mut(&mut self, action: Action) -> &mut RequestRecord {
        match action {
            Action::Execute => &mut self.execute,
            Action::Compile => &mut self.compile,
            Action::Test => &mut self.test,
            Action::ShowAssembly => &mut self.assembly,
            Action::ShowLlvmIr => &mut self.llvm_ir,
            Action::ShowHir => &mut self.hir,
            Action::ShowMir => &mut self.mir,
            Action::ShowWasm => &mut self.wasm,
            Action::Format => &mut self.format,
            Action::Lint => &mut self.clippy,
            Action::Interpret => &mut self.miri,
            Action::ExpandMacros => &mut self.macro_expansion,
            Action::LoadSnippet => &mut self.gist_load,
            Action::SaveSnippet => &mut self.gist_save,
        }
    }

    /// Anything to show: a spinner, a result or an error, across every kind.
    #[must_use]
    pub fn has_any_result(&self) -> bool {
        Action::ALL
            .into_iter()
            .any(|action| self.record(action).has_something_to_show())
    }

    #[must_use]
    pub fn is_pending(&self, action: Action) -> bool {
        self.record(action).is_pending()
    }

    /// Output of the most recently started successful run, build or test.
    #[must_use]
    pub fn latest_execution_output(&self) -> (String, String) {
        [&self.execute, &self.compile, &self.test]
            .into_iter()
            .filter_map(|record| Some((record.invocation?, record.response()?)))
            .max_by_key(|(id, _)| *id)
            .map(|(_, response)| {
                let (stdout, stderr) = response.output();
                (stdout.to_string(), stderr.to_string())
            })
            .unwrap_or_default()
    }
}
