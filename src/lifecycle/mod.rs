//! Request lifecycle: the state machine for work requests and the
//! cross-entity consistency rules that keep Collaboration and DeclinedEntry
//! records in lockstep with their originating request.

pub mod coordinator;
pub mod engine;

pub use coordinator::Coordinator;
pub use engine::LifecycleEngine;
