//! Schedule (solution) model.
//!
//! A schedule is a complete placement of every task on its machine and in
//! time. Schedules are produced once, read-only, at the end of a solve and
//! handed off to rendering/report collaborators.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A task-machine-time placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Owning job ID.
    pub job_id: String,
    /// Task position within the job.
    pub position: u32,
    /// Machine the task runs on.
    pub machine_id: String,
    /// Start time (inclusive).
    pub start: i64,
    /// End time (exclusive): start + duration.
    pub end: i64,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        job_id: impl Into<String>,
        position: u32,
        machine_id: impl Into<String>,
        start: i64,
        end: i64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            position,
            machine_id: machine_id.into(),
            start,
            end,
        }
    }

    /// Duration (end - start).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether this assignment overlaps another in time.
    #[inline]
    pub fn overlaps(&self, other: &Assignment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A complete schedule: one assignment per task.
///
/// Assignments are kept in (job, position) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Task placements.
    pub assignments: Vec<Assignment>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Makespan: latest end time across all assignments.
    pub fn makespan(&self) -> i64 {
        self.assignments.iter().map(|a| a.end).max().unwrap_or(0)
    }

    /// Finds the assignment for one task.
    pub fn assignment_for(&self, job_id: &str, position: u32) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.job_id == job_id && a.position == position)
    }

    /// All assignments of a job, in position order.
    pub fn assignments_for_job(&self, job_id: &str) -> Vec<&Assignment> {
        let mut v: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.job_id == job_id)
            .collect();
        v.sort_by_key(|a| a.position);
        v
    }

    /// All assignments on a machine, in start order.
    pub fn assignments_for_machine(&self, machine_id: &str) -> Vec<&Assignment> {
        let mut v: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.machine_id == machine_id)
            .collect();
        v.sort_by_key(|a| a.start);
        v
    }

    /// Completion time of a job (latest end of its assignments).
    pub fn job_completion_time(&self, job_id: &str) -> Option<i64> {
        self.assignments
            .iter()
            .filter(|a| a.job_id == job_id)
            .map(|a| a.end)
            .max()
    }

    /// Busy time per machine (sum of assignment durations).
    pub fn machine_busy_times(&self) -> HashMap<String, i64> {
        let mut busy: HashMap<String, i64> = HashMap::new();
        for a in &self.assignments {
            *busy.entry(a.machine_id.clone()).or_insert(0) += a.duration();
        }
        busy
    }

    /// Utilization (busy / makespan) for machines that have assignments.
    pub fn machine_utilizations(&self) -> HashMap<String, f64> {
        let horizon = self.makespan();
        if horizon <= 0 {
            return HashMap::new();
        }
        self.machine_busy_times()
            .into_iter()
            .map(|(id, busy)| (id, busy as f64 / horizon as f64))
            .collect()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
