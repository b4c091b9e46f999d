use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// One remote operation the playground can run.
///
/// Every kind owns exactly one request record and at most one in-flight call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Execute,
    Compile,
    Test,
    ShowAssembly,
    ShowLlvmIr,
    ShowHir,
    ShowMir,
    ShowWasm,
    Format,
    Lint,
    Interpret,
    ExpandMacros,
    LoadSnippet,
    SaveSnippet,
}

impl Action {
    pub const ALL: [Action; 14] = [
        Action::Execute,
        Action::Compile,
        Action::Test,
        Action::ShowAssembly,
        Action::ShowLlvmIr,
        Action::ShowHir,
        Action::ShowMir,
        Action::ShowWasm,
        Action::Format,
        Action::Lint,
        Action::Interpret,
        Action::ExpandMacros,
        Action::LoadSnippet,
        Action::SaveSnippet,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Execute => "execute",
            Action::Compile => "compile",
            Action::Test => "test",
            Action::ShowAssembly => "asm",
            Action::ShowLlvmIr => "llvm-ir",
            Action::ShowHir => "hir",
            Action::ShowMir => "mir",
            Action::ShowWasm => "wasm",
            Action::Format => "format",
            Action::Lint => "clippy",
            Action::Interpret => "miri",
            Action::ExpandMacros => "macro-expansion",
            Action::LoadSnippet => "gist-load",
            Action::SaveSnippet => "gist-save",
        }
    }

    /// Human label for the control that triggers this action.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Action::Execute => "Run",
            Action::Compile => "Build",
            Action::Test => "Test",
            Action::ShowAssembly => "Show Assembly",
            Action::ShowLlvmIr => "Show LLVM IR",
            Action::ShowHir => "Show HIR",
            Action::ShowMir => "Show MIR",
            Action::ShowWasm => "Show WASM",
            Action::Format => "Format",
            Action::Lint => "Clippy",
            Action::Interpret => "Miri",
            Action::ExpandMacros => "Expand macros",
            Action::LoadSnippet => "Load",
            Action::SaveSnippet => "Share",
        }
    }

    /// Compiler output target for the show family; `None` for everything else.
    #[must_use]
    pub const fn compile_target(self) -> Option<CompileTarget> {
        match self {
            Action::ShowAssembly => Some(CompileTarget::Assembly),
            Action::ShowLlvmIr => Some(CompileTarget::LlvmIr),
            Action::ShowHir => Some(CompileTarget::Hir),
            Action::ShowMir => Some(CompileTarget::Mir),
            Action::ShowWasm => Some(CompileTarget::Wasm),
            Action::Execute
            | Action::Compile
            | Action::Test
            | Action::Format
            | Action::Lint
            | Action::Interpret
            | Action::ExpandMacros
            | Action::LoadSnippet
            | Action::SaveSnippet => None,
        }
    }

    /// Whether this action posts to `/execute`.
    #[must_use]
    pub const fn is_execution(self) -> bool {
        matches!(self, Action::Execute | Action::Compile | Action::Test)
    }

    /// Whether the generic "run" control may be bound to this action.
    #[must_use]
    pub const fn is_primary_candidate(self) -> bool {
        self.is_execution() || self.compile_target().is_some()
    }

    /// Whether this action only makes sense on the nightly channel.
    #[must_use]
    pub const fn requires_nightly(self) -> bool {
        matches!(self, Action::ShowHir | Action::ShowWasm)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("action", s))
    }
}

/// The user's choice for the generic "run" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimaryAction {
    /// Let the source heuristics decide.
    #[default]
    Auto,
    Action(Action),
}

impl fmt::Display for PrimaryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryAction::Auto => f.write_str("auto"),
            PrimaryAction::Action(action) => action.fmt(f),
        }
    }
}

impl FromStr for PrimaryAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(PrimaryAction::Auto);
        }
        s.parse()
            .map(PrimaryAction::Action)
            .map_err(|_| ParseEnumError::new("primary action", s))
    }
}

impl From<Action> for PrimaryAction {
    fn from(action: Action) -> Self {
        PrimaryAction::Action(action)
    }
}

/// Output format requested from `/compile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileTarget {
    Assembly,
    LlvmIr,
    Hir,
    Mir,
    Wasm,
}

impl CompileTarget {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CompileTarget::Assembly => "asm",
            CompileTarget::LlvmIr => "llvm-ir",
            CompileTarget::Hir => "hir",
            CompileTarget::Mir => "mir",
            CompileTarget::Wasm => "wasm",
        }
    }
}

impl fmt::Display for CompileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_parses_from_its_name() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("run".parse::<Action>().is_err());
    }

    #[test]
    fn primary_candidates_are_execution_and_show_family() {
        let candidates: Vec<_> = Action::ALL
            .into_iter()
            .filter(|a| a.is_primary_candidate())
            .collect();
        assert_eq!(
            candidates,
            vec![
                Action::Execute,
                Action::Compile,
                Action::Test,
                Action::ShowAssembly,
                Action::ShowLlvmIr,
                Action::ShowHir,
                Action::ShowMir,
                Action::ShowWasm,
            ]
        );
    }

    #[test]
    fn primary_action_parse() {
        assert_eq!("auto".parse::<PrimaryAction>().unwrap(), PrimaryAction::Auto);
        assert_eq!(
            "mir".parse::<PrimaryAction>().unwrap(),
            PrimaryAction::Action(Action::ShowMir)
        );
        let err = "bogus".parse::<PrimaryAction>().unwrap_err();
        assert_eq!(err.kind(), "primary action");
    }

    #[test]
    fn labels() {
        assert_eq!(Action::Execute.label(), "Run");
        assert_eq!(Action::Compile.label(), "Build");
        assert_eq!(Action::Test.label(), "Test");
        assert_eq!(Action::ShowLlvmIr.label(), "Show LLVM IR");
    }

    #[test]
    fn only_show_family_has_compile_target() {
        assert_eq!(
            Action::ShowWasm.compile_target(),
            Some(CompileTarget::Wasm)
        );
        assert_eq!(Action::Execute.compile_target(), None);
        assert_eq!(Action::Format.compile_target(), None);
    }
}
