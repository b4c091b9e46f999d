//! Core domain types for the playground client.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod action;
mod ids;
mod snippet;
pub mod wire;

pub use action::{Action, CompileTarget, PrimaryAction};
pub use ids::InvocationId;
pub use snippet::{Snippet, SnippetSettings};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    #[must_use]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// wire spelling is fixed.
macro_rules! wire_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError::new($kind, other)),
                }
            }
        }
    };
}

// ============================================================================
// Toolchain selection
// ============================================================================

/// Release channel of the toolchain used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Stable,
    Beta,
    Nightly,
}

wire_enum!(Channel, "channel", {
    Stable => "stable",
    Beta => "beta",
    Nightly => "nightly",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Debug,
    Release,
}

wire_enum!(Mode, "mode", {
    Debug => "debug",
    Release => "release",
});

/// Language edition. Variants are declared oldest first so `Ord` follows
/// edition age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Edition {
    #[serde(rename = "2015")]
    Rust2015,
    #[serde(rename = "2018")]
    Rust2018,
    #[serde(rename = "2021")]
    Rust2021,
}

wire_enum!(Edition, "edition", {
    Rust2015 => "2015",
    Rust2018 => "2018",
    Rust2021 => "2021",
});

impl Edition {
    pub const ALL: [Edition; 3] = [Edition::Rust2015, Edition::Rust2018, Edition::Rust2021];

    /// The oldest supported edition. Links that predate editions resolve here.
    pub const OLDEST: Edition = Edition::Rust2015;

    /// The newest supported edition. Fresh sessions resolve here.
    pub const NEWEST: Edition = Edition::Rust2021;
}

impl Default for Edition {
    fn default() -> Self {
        Self::NEWEST
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backtrace {
    #[default]
    Disabled,
    Enabled,
}

wire_enum!(Backtrace, "backtrace", {
    Disabled => "disabled",
    Enabled => "enabled",
});

impl Backtrace {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

// ============================================================================
// Assembly display options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyFlavor {
    #[default]
    Att,
    Intel,
}

wire_enum!(AssemblyFlavor, "assembly flavor", {
    Att => "att",
    Intel => "intel",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemangleAssembly {
    #[default]
    Demangle,
    Mangle,
}

wire_enum!(DemangleAssembly, "demangle option", {
    Demangle => "demangle",
    Mangle => "mangle",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessAssembly {
    #[default]
    Filter,
    Raw,
}

wire_enum!(ProcessAssembly, "assembly processing", {
    Filter => "filter",
    Raw => "raw",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AssemblyOptions {
    pub flavor: AssemblyFlavor,
    pub demangle: DemangleAssembly,
    pub process: ProcessAssembly,
}

// ============================================================================
// Configuration
// ============================================================================

/// User-chosen configuration.
///
/// Requests copy the fields they need at trigger time; a later change never
/// affects a request that has already started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Configuration {
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
    pub backtrace: Backtrace,
    pub assembly: AssemblyOptions,
    pub primary_action: PrimaryAction,
}

impl Configuration {
    #[must_use]
    pub fn is_nightly(&self) -> bool {
        self.channel == Channel::Nightly
    }

    /// HIR output is only produced by the nightly compiler.
    #[must_use]
    pub fn is_hir_available(&self) -> bool {
        self.is_nightly()
    }

    /// WASM output is only produced by the nightly compiler.
    #[must_use]
    pub fn is_wasm_available(&self) -> bool {
        self.is_nightly()
    }

    #[must_use]
    pub fn is_edition_default(&self) -> bool {
        self.edition == Edition::NEWEST
    }

    #[must_use]
    pub fn backtrace_enabled(&self) -> bool {
        self.backtrace.is_enabled()
    }

    /// Whether any setting hidden behind the "advanced" menu differs from its default.
    #[must_use]
    pub fn advanced_options_set(&self) -> bool {
        !self.is_edition_default() || self.backtrace_enabled()
    }

    #[must_use]
    pub fn snippet_settings(&self) -> SnippetSettings {
        SnippetSettings {
            channel: self.channel,
            mode: self.mode,
            edition: self.edition,
        }
    }
}

/// Toolchain component whose version the backend reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainComponent {
    Stable,
    Beta,
    Nightly,
    Rustfmt,
    Clippy,
    Miri,
}

wire_enum!(ToolchainComponent, "toolchain component", {
    Stable => "stable",
    Beta => "beta",
    Nightly => "nightly",
    Rustfmt => "rustfmt",
    Clippy => "clippy",
    Miri => "miri",
});

impl ToolchainComponent {
    pub const ALL: [ToolchainComponent; 6] = [
        ToolchainComponent::Stable,
        ToolchainComponent::Beta,
        ToolchainComponent::Nightly,
        ToolchainComponent::Rustfmt,
        ToolchainComponent::Clippy,
        ToolchainComponent::Miri,
    ];
}
