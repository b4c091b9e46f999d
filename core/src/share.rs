//! Shareable links and the forum post body for a saved snippet.

use url::Url;

use playground_types::Snippet;

/// Where new forum topics are opened.
pub const FORUM_NEW_TOPIC_URL: &str = "https://users.rust-lang.org/new-topic";

/// Link that reopens the playground on the saved snippet.
#[must_use]
pub fn permalink(base: &Url, snippet: &Snippet) -> Url {
    with_query(base, snippet, ("gist", &snippet.id))
}

/// Link that embeds the source inline instead of referencing the snippet.
#[must_use]
pub fn code_url(base: &Url, snippet: &Snippet) -> Url {
    with_query(base, snippet, ("code", &snippet.code))
}

fn with_query(base: &Url, snippet: &Snippet, source: (&str, &str)) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("version", snippet.channel.as_str())
        .append_pair("mode", snippet.mode.as_str())
        .append_pair("edition", snippet.edition.as_str())
        .append_pair(source.0, source.1);
    url
}

fn code_block(text: &str, language: &str) -> String {
    format!("```{language}\n{text}\n```")
}

/// Markdown body for a forum post: the code with a playground link, then any
/// captured output. Empty sections are left out.
#[must_use]
pub fn forum_snippet(snippet: &Snippet, permalink: &Url) -> String {
    let mut body = String::new();

    if !snippet.code.is_empty() {
        body.push_str(&code_block(&snippet.code, "rust"));
        body.push_str(&format!("\n\n([Playground]({permalink}))"));
    }
    if !snippet.stdout.is_empty() {
        body.push_str("\n\nOutput:\n\n");
        body.push_str(&code_block(&snippet.stdout, ""));
    }
    if !snippet.stderr.is_empty() {
        body.push_str("\n\nErrors:\n\n");
        body.push_str(&code_block(&snippet.stderr, ""));
    }
    body
}

/// New-topic link with `body` prefilled.
pub fn forum_url(body: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(FORUM_NEW_TOPIC_URL, [("body", body)])
}
