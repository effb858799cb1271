//! Viewfinder use case: the reducer-driven state machine.
//!
//! The UI sends [`Action`]s to a [`StoreHandle`] and observes published
//! [`State`] snapshots. Transitions are computed by the pure [`reduce`]
//! function; the effects it returns (permission requests, configuration,
//! camera toggling) run as tasks that answer with further actions.

mod effects;
mod reducer;
mod state;
mod store;

pub use effects::Environment;
pub use reducer::{reduce, Context};
pub use state::{Action, Effect, State};
pub use store::StoreHandle;
