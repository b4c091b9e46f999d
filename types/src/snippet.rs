use crate::{Channel, Edition, Mode};

/// A shared bundle of source and captured output, identified by its gist id.
///
/// Replaced wholesale by the next successful load or save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: String,
    pub url: String,
    pub code: String,
    pub stdout: String,
    pub stderr: String,
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
}

/// Configuration recorded alongside a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnippetSettings {
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
}
