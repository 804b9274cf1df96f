//! Domain models for the planning hierarchy.
//!
//! # Hierarchy
//!
//! ```text
//! Project
//! └── Initiative (strategic initiative)
//!     └── Goal
//!         └── Objective
//!             └── KeyResult
//!                 └── ActionItem
//! ```
//!
//! Every level is a distinct struct sharing the [`Auditable`] and [`Progress`]
//! traits; [`Node`] is the closed sum over all six for code that walks the tree
//! without caring about the level.
//!
//! - Non-leaf `progress` is derived: the rounded mean of the node's active
//!   children, recomputed by the rollup after every write.
//! - [`ActionItem`] progress comes from its completion flag (or a manual value).
//! - [`KeyResult`] can be locked with `manual_progress_set`, which stops its
//!   progress from being derived from action items.
//! - Nodes are never removed; `active = false` marks them soft-deleted.

mod action_item;
mod actor;
mod goal;
mod initiative;
mod key_result;
mod node;
mod objective;
mod project;
mod tree;

pub use action_item::*;
pub use actor::*;
pub use goal::*;
pub use initiative::*;
pub use key_result::*;
pub use node::*;
pub use objective::*;
pub use project::*;
pub use tree::*;
