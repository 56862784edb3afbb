//! Per-panel session state
//!
//! Each panel (video platform, repository) is an explicit state object that
//! callers create and pass around; there is no ambient global state, so any
//! number of independent sessions can coexist.
//!
//! Sessions are cheap `Clone` handles over shared state. Overlapping calls on
//! the same session are allowed: every request takes a sequence number, and a
//! completing request only writes state if nothing newer (including a logout)
//! has started since. The most recently *issued* request wins, not the most
//! recently *finished* one.

mod repo;
mod video;

pub use repo::{RepoSession, RepoSnapshot};
pub use video::{VideoSession, VideoSnapshot};

/// Sequence number handed out to each request
pub(crate) type Ticket = u64;
