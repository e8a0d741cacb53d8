//! Client-side reconciliation of locally held cart and favorites data with
//! the server copy.
//!
//! The session moves through an explicit state machine (`Phase`) rather than
//! a set of boolean flags: anonymous sessions touch only local storage,
//! a fresh login schedules exactly one merge, and authenticated mutations go
//! remote-first with a local fallback when the server is unreachable.

pub mod item;
pub mod remote;
pub mod session;
pub mod store;

pub use item::{LocalCartItem, SyncItem};
pub use remote::{RemoteCollection, RemoteError};
pub use session::{Applied, MergeReport, Phase, SyncSession, Totals};
pub use store::{LocalStore, MemoryStore};
