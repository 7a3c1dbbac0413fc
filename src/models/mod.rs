//! Scheduling domain models.
//!
//! Provides the core data types for representing job-shop problems and
//! solutions: jobs with ordered task sequences, and completed schedules
//! as machine-and-time assignments.
//!
//! # Time Representation
//!
//! All times are non-negative integers in abstract time units relative to
//! a scheduling epoch (t=0). The consumer defines what one unit means
//! (minutes, shifts, ...).

mod job;
mod schedule;

pub use job::{Job, Task};
pub use schedule::{Assignment, Schedule};
