//! Picks the one concrete action behind the generic "run" control.

use playground_types::{Action, PrimaryAction};

use crate::heuristics::PROC_MACRO_CRATE_TYPE;

/// The action implied by the source alone.
///
/// A declared output kind wins (except `proc-macro`, which says nothing about
/// running): `bin` runs, anything else builds. Otherwise tests beat `main`,
/// and code with neither is built.
#[must_use]
pub fn resolve_default_action(
    output_kind: Option<&str>,
    has_tests: bool,
    has_entry_point: bool,
) -> Action {
    match output_kind {
        Some(kind) if kind != PROC_MACRO_CRATE_TYPE => {
            if kind == "bin" {
                Action::Execute
            } else {
                Action::Compile
            }
        }
        _ if has_tests => Action::Test,
        _ if has_entry_point => Action::Execute,
        _ => Action::Compile,
    }
}

#[must_use]
pub fn resolve_primary_action(selection: PrimaryAction, default_action: Action) -> Action {
    match selection {
        PrimaryAction::Auto => default_action,
        PrimaryAction::Action(action) => action,
    }
}

#[must_use]
pub fn label_for(action: Action) -> &'static str {
    action.label()
}

/// Auto mode settled on a plain build; the UI words the control differently.
#[must_use]
pub fn is_auto_build(selection: PrimaryAction, default_action: Action) -> bool {
    selection == PrimaryAction::Auto && default_action == Action::Compile
}
