//! Job and task models.
//!
//! A job is an ordered sequence of tasks routed through the shop. Each task
//! occupies exactly one machine for a fixed duration; task positions within
//! a job define the precedence order.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use serde::{Deserialize, Serialize};

/// A single operation of a job on one machine.
///
/// Positions are 0-based and must be gapless within a job; a task cannot
/// start before the task at the previous position finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Position within the owning job (0-based, defines precedence).
    pub position: u32,
    /// Machine this task requires exclusively.
    pub machine: String,
    /// Fixed processing duration (time units, > 0).
    pub duration: i64,
}

impl Task {
    /// Creates a new task.
    pub fn new(position: u32, machine: impl Into<String>, duration: i64) -> Self {
        Self {
            position,
            machine: machine.into(),
            duration,
        }
    }
}

/// A job to be scheduled: an ordered sequence of tasks.
///
/// The job exclusively owns its task list; tasks never move between jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Priority weight for weighted objectives and ranking (default 1).
    pub weight: i64,
    /// Latest desired completion time. `None` = no deadline.
    ///
    /// Deadlines are soft: they influence objectives and metrics but are
    /// never enforced as hard constraints.
    pub deadline: Option<i64>,
    /// Tasks in position order.
    pub tasks: Vec<Task>,
}

impl Job {
    /// Creates a new job with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            weight: 1,
            deadline: None,
            tasks: Vec::new(),
        }
    }

    /// Sets the priority weight.
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the deadline (latest desired completion time).
    pub fn with_deadline(mut self, deadline: i64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Appends a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Total processing duration across all tasks.
    pub fn total_duration(&self) -> i64 {
        self.tasks.iter().map(|t| t.duration).sum()
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
