//! Initial configuration read out of a shared link.

use url::Url;

use playground_types::{Channel, Edition, Mode, SnippetSettings};

/// Query parameters a shared link may carry. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub version: Option<String>,
    pub mode: Option<String>,
    pub edition: Option<String>,
    pub gist: Option<String>,
    pub code: Option<String>,
}

impl PageQuery {
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Parses a raw query string, with or without the leading `?`.
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a>(
        pairs: impl Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    ) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "version" => &mut query.version,
                "mode" => &mut query.mode,
                "edition" => &mut query.edition,
                "gist" => &mut query.gist,
                "code" => &mut query.code,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        query
    }
}

/// What the editor starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialSource {
    /// Inline source from the link.
    Code(String),
    /// A snippet to fetch by id.
    Snippet(String),
    /// Nothing in the link; keep the current buffer.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    pub channel: Channel,
    pub mode: Mode,
    pub edition: Edition,
    pub source: InitialSource,
}

impl InitialState {
    #[must_use]
    pub fn settings(&self) -> SnippetSettings {
        SnippetSettings {
            channel: self.channel,
            mode: self.mode,
            edition: self.edition,
        }
    }
}

/// Resolves a page load.
///
/// Unknown channel and mode values fall back to stable and debug. Links that
/// carry code or a snippet but no edition predate editions and must keep
/// resolving to the oldest one; a bare page gets the newest. Inline code takes
/// precedence over a snippet id.
#[must_use]
pub fn resolve_page_load(query: &PageQuery) -> InitialState {
    let channel = query
        .version
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let mode = query
        .mode
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let explicit_edition = query.edition.as_deref().and_then(|v| v.parse().ok());

    let source = match (&query.code, &query.gist) {
        (Some(code), _) => InitialSource::Code(code.clone()),
        (None, Some(gist)) => InitialSource::Snippet(gist.clone()),
        (None, None) => InitialSource::Default,
    };

    let edition = explicit_edition.unwrap_or(match source {
        InitialSource::Default => Edition::NEWEST,
        InitialSource::Code(_) | InitialSource::Snippet(_) => Edition::OLDEST,
    });

    tracing::debug!(%channel, %mode, %edition, "Resolved page load");
    InitialState {
        channel,
        mode,
        edition,
        source,
    }
}
