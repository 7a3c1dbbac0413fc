//! Schedule extraction and quality metrics.
//!
//! Converts a complete start-time assignment into a read-only [`Schedule`]
//! and computes performance indicators from it. Both operations are pure;
//! the assignment is never mutated.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Machine usage | Busy/idle time and utilization per machine |
//! | Total/Max Tardiness | Deadline overruns across jobs |
//! | On-Time Rate | Fraction of jobs meeting deadlines |
//! | Job Ranking | Priority order from the configured ranking rule |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::instance::Instance;
use crate::models::{Assignment, Schedule};
use crate::ranking::RankingRule;

/// Realizes a start-time assignment as a schedule.
///
/// `starts` is indexed by flat task order (jobs sorted by ID, tasks by
/// position); assignments come out in that same order. Durations are taken
/// from the instance, keeping end times consistent by construction.
pub fn extract_schedule(instance: &Instance, starts: &[i64]) -> Schedule {
    let mut schedule = Schedule::new();
    for (t, flat) in instance.flat().iter().enumerate() {
        schedule.add_assignment(Assignment::new(
            instance.jobs()[flat.job].id.clone(),
            flat.position,
            instance.machines()[flat.machine].clone(),
            starts[t],
            starts[t] + flat.duration,
        ));
    }
    schedule
}

/// Busy/idle breakdown for one machine over the schedule's makespan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineUsage {
    /// Time spent processing tasks.
    pub busy: i64,
    /// Makespan minus busy time.
    pub idle: i64,
    /// busy / makespan (0.0 for an empty schedule).
    pub utilization: f64,
}

/// Schedule performance indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// Completion time of the last-finishing task.
    pub makespan: i64,
    /// Usage per machine, covering every machine of the instance.
    pub usage_by_machine: HashMap<String, MachineUsage>,
    /// Mean utilization across machines (0.0..1.0).
    pub avg_utilization: f64,
    /// Summed deadline tardiness across jobs.
    pub total_tardiness: i64,
    /// Largest single-job tardiness.
    pub max_tardiness: i64,
    /// Fraction of jobs completing by their deadline; jobs without a
    /// deadline count as on time.
    pub on_time_rate: f64,
    /// Job IDs in priority order, per the configured ranking rule.
    pub job_ranking: Vec<String>,
}

impl ScheduleMetrics {
    /// Computes metrics from a schedule and its instance.
    pub fn calculate(
        schedule: &Schedule,
        instance: &Instance,
        ranking: &dyn RankingRule,
    ) -> Self {
        let makespan = schedule.makespan();
        let busy = schedule.machine_busy_times();

        let mut usage_by_machine = HashMap::new();
        for machine in instance.machines() {
            let b = busy.get(machine).copied().unwrap_or(0);
            usage_by_machine.insert(
                machine.clone(),
                MachineUsage {
                    busy: b,
                    idle: makespan - b,
                    utilization: if makespan > 0 {
                        b as f64 / makespan as f64
                    } else {
                        0.0
                    },
                },
            );
        }
        let avg_utilization = if usage_by_machine.is_empty() {
            0.0
        } else {
            usage_by_machine.values().map(|u| u.utilization).sum::<f64>()
                / usage_by_machine.len() as f64
        };

        let mut total_tardiness = 0;
        let mut max_tardiness = 0;
        let mut on_time = 0usize;
        for job in instance.jobs() {
            let completion = schedule.job_completion_time(&job.id).unwrap_or(0);
            match job.deadline {
                Some(deadline) if completion > deadline => {
                    let tardiness = completion - deadline;
                    total_tardiness += tardiness;
                    max_tardiness = max_tardiness.max(tardiness);
                }
                _ => on_time += 1,
            }
        }
        let on_time_rate = if instance.jobs().is_empty() {
            1.0
        } else {
            on_time as f64 / instance.jobs().len() as f64
        };

        Self {
            makespan,
            usage_by_machine,
            avg_utilization,
            total_tardiness,
            max_tardiness,
            on_time_rate,
            job_ranking: ranking.rank(schedule, instance),
        }
    }
}
