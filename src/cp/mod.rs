//! Constraint-programming core.
//!
//! Translates a validated instance into a propagatable constraint model and
//! solves it with bounds propagation interleaved with disjunctive
//! branch-and-bound search:
//!
//! - **`model`**: precedence edges, disjunctive machine pairs, horizon-bounded
//!   start-time domains
//! - **`bounds`**: earliest/latest-start windows with trail-based undo and
//!   fixed-point propagation
//! - **`search`**: branching over unresolved machine pairs with backtracking,
//!   lower-bound pruning, and budget-bounded best-so-far tracking
//!
//! # References
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"
//! - Carlier & Pinson (1989), "An Algorithm for Solving the Job-Shop Problem"

mod bounds;
mod model;
mod search;

pub use model::{ConstraintModel, DisjunctivePair, PairOrder};
pub use search::{SearchBudget, SearchEngine, SearchOutcome};
