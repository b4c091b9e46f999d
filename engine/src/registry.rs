//! At most one outstanding call per action kind.

use std::collections::HashMap;
use std::fmt;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};

use playground_types::{Action, InvocationId};

use crate::state::Outcome;

/// Completion of one call, cloneable so every trigger that reuses the call
/// observes the same outcome.
pub type Completion = Shared<BoxFuture<'static, Outcome>>;

struct InFlight {
    id: InvocationId,
    completion: Completion,
}

impl fmt::Debug for InFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Tracks the in-flight call for each action kind.
///
/// The action kind is the cache key: a trigger for a kind that already has an
/// entry reuses it instead of starting another call. Entries are removed when
/// their call settles.
#[derive(Debug)]
pub struct MutationRegistry {
    in_flight: HashMap<Action, InFlight>,
    last_id: InvocationId,
}

impl Default for MutationRegistry {
    fn default() -> Self {
        Self {
            in_flight: HashMap::new(),
            last_id: InvocationId::new(0),
        }
    }
}

impl MutationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The call currently outstanding for `action`.
    #[must_use]
    pub fn in_flight(&self, action: Action) -> Option<(InvocationId, Completion)> {
        self.in_flight
            .get(&action)
            .map(|entry| (entry.id, entry.completion.clone()))
    }

    #[must_use]
    pub fn is_in_flight(&self, action: Action) -> bool {
        self.in_flight.contains_key(&action)
    }

    /// Registers a new call for `action` under a fresh id.
    ///
    /// Callers check [`in_flight`](Self::in_flight) first; registering over a
    /// live entry is a logic error and replaces it.
    pub fn begin(
        &mut self,
        action: Action,
        call: BoxFuture<'static, Outcome>,
    ) -> (InvocationId, Completion) {
        self.last_id = self.last_id.next();
        let id = self.last_id;
        let completion = call.shared();
        if let Some(previous) = self.in_flight.insert(
            action,
            InFlight {
                id,
                completion: completion.clone(),
            },
        ) {
            tracing::warn!(%action, previous = %previous.id, %id, "Replaced an in-flight call");
        }
        (id, completion)
    }

    /// Clears the entry for `action` if it still belongs to `id`.
    pub fn finish(&mut self, action: Action, id: InvocationId) -> bool {
        match self.in_flight.get(&action) {
            Some(entry) if entry.id == id => {
                self.in_flight.remove(&action);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}
