//! JSON payloads exchanged with the playground backend.
//!
//! Field names are part of the compatibility contract with the service and
//! must not be renamed.

use serde::{Deserialize, Serialize};

use crate::{AssemblyFlavor, Channel, DemangleAssembly, Edition, Mode, ProcessAssembly};

/// `POST /execute` body, shared by execute, compile and test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
    pub crate_type: String,
    pub tests: bool,
    pub code: String,
    pub backtrace: bool,
}

/// `POST /compile` body for the show family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
    pub crate_type: String,
    pub tests: bool,
    pub code: String,
    pub backtrace: bool,
    pub target: String,
    pub assembly_flavor: AssemblyFlavor,
    pub demangle_assembly: DemangleAssembly,
    pub process_assembly: ProcessAssembly,
}

/// `POST /format`, `/miri` and `/macro-expansion` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditionRequest {
    pub code: String,
    pub edition: Edition,
}

/// `POST /clippy` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClippyRequest {
    pub code: String,
    pub edition: Edition,
    pub crate_type: String,
}

/// `POST /meta/gist` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveGistRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatResponse {
    pub success: bool,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

/// Response of the lint, interpret and macro-expansion endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistResponse {
    pub id: String,
    pub url: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub version: String,
    pub date: String,
    pub hash: String,
}

impl Version {
    /// `"{date} {hash}"` with the hash cut to its first 20 characters.
    #[must_use]
    pub fn details(&self) -> String {
        let short: String = self.hash.chars().take(20).collect();
        format!("{} {short}", self.date)
    }
}

/// Versions of every toolchain component, fetched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    pub stable: Version,
    pub beta: Version,
    pub nightly: Version,
    pub rustfmt: Version,
    pub clippy: Version,
    pub miri: Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CratesResponse {
    #[serde(default)]
    pub crates: Vec<CrateInfo>,
}

/// Error body returned by the backend on 4xx/5xx.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn execute_request_uses_camel_case_fields() {
        let request = ExecuteRequest {
            channel: Channel::Beta,
            mode: Mode::Release,
            edition: Edition::Rust2018,
            crate_type: "bin".to_string(),
            tests: false,
            code: "fn main() {}".to_string(),
            backtrace: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "channel": "beta",
                "mode": "release",
                "edition": "2018",
                "crateType": "bin",
                "tests": false,
                "code": "fn main() {}",
                "backtrace": true,
            })
        );
    }

    #[test]
    fn compile_request_carries_assembly_options() {
        let request = CompileRequest {
            channel: Channel::Nightly,
            mode: Mode::Debug,
            edition: Edition::Rust2021,
            crate_type: "lib".to_string(),
            tests: false,
            code: String::new(),
            backtrace: false,
            target: "asm".to_string(),
            assembly_flavor: AssemblyFlavor::Intel,
            demangle_assembly: DemangleAssembly::Mangle,
            process_assembly: ProcessAssembly::Raw,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["target"], "asm");
        assert_eq!(value["assemblyFlavor"], "intel");
        assert_eq!(value["demangleAssembly"], "mangle");
        assert_eq!(value["processAssembly"], "raw");
        assert_eq!(value["crateType"], "lib");
    }

    #[test]
    fn responses_tolerate_missing_output_fields() {
        let parsed: ExecuteResponse = serde_json::from_value(json!({ "stdout": "hi" })).unwrap();
        assert_eq!(parsed.stdout, "hi");
        assert_eq!(parsed.stderr, "");

        let parsed: FormatResponse =
            serde_json::from_value(json!({ "success": true, "code": "x" })).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.code, "x");
    }

    #[test]
    fn version_details_truncate_hash() {
        let version = Version {
            version: "1.60.0".to_string(),
            date: "2022-04-04".to_string(),
            hash: "7737e0b5c4103216d6fd8cf941b7ab9bdbaace7c".to_string(),
        };
        assert_eq!(version.details(), "2022-04-04 7737e0b5c4103216d6fd");
    }
}
