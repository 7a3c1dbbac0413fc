//! Job-shop scheduling engine.
//!
//! Computes a feasible, near-optimal production schedule for a job shop:
//! every job is an ordered sequence of tasks, every task needs exclusive use
//! of one machine for a fixed duration. The engine combines bounds
//! propagation with disjunctive branch-and-bound search under a time or
//! iteration budget, always returning the best schedule found, and derives
//! analytics (makespan, machine utilization, job priority ranking) from it.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Job`, `Task`, `Schedule`, `Assignment`
//! - **`instance`**: Input records, validation, and the immutable `Instance`
//! - **`cp`**: Constraint model, bounds propagation, branch-and-bound search
//! - **`greedy`**: Always-feasible list scheduler used as the search incumbent
//! - **`objective`**: Scoring policies (makespan, tardiness, weighted)
//! - **`ranking`**: Pluggable job priority ranking rules
//! - **`analytics`**: Schedule extraction and performance metrics
//! - **`solver`**: End-to-end solve orchestration and configuration
//!
//! Parsing of tabular inputs and rendering of the resulting schedule are the
//! caller's concern; the engine consumes task records and hands back a
//! stable in-memory schedule plus metrics.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"
//! - Carlier & Pinson (1989), "An Algorithm for Solving the Job-Shop Problem"

pub mod analytics;
pub mod cp;
pub mod greedy;
pub mod instance;
pub mod models;
pub mod objective;
pub mod ranking;
pub mod solver;
