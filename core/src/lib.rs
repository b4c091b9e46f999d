//! Pure playground logic: everything that decides *what* to send without
//! sending it.
//!
//! Data flows through the modules in this order:
//!
//! 1. [`heuristics`] derives [`SourceFacts`] from the source text, memoized
//!    per distinct text by [`SourceAnalyzer`].
//! 2. [`resolver`] turns the facts and the user's primary-action selector
//!    into one concrete [`Action`](playground_types::Action).
//! 3. [`request`] assembles the exact payload for that action.
//!
//! [`share`] and [`page`] cover the URL side: building shareable links and
//! reading configuration back out of them. [`edit`] holds the canned source
//! edits.

pub mod edit;
pub mod heuristics;
pub mod page;
pub mod request;
pub mod resolver;
mod selector;
pub mod share;

pub use heuristics::{SourceAnalyzer, SourceFacts};
pub use request::{BuildError, Origin, Request, RequestContext, build_request};
pub use resolver::{resolve_default_action, resolve_primary_action};
pub use selector::Memo;
