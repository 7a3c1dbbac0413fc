//! Problem instance construction and validation.
//!
//! Builds a typed, validated [`Instance`] from raw task records (one record
//! per task, the shape produced by tabular ingestion). Detects:
//! - Non-positive durations
//! - Gapped or duplicated task positions within a job
//! - Empty machine references
//! - Duplicate job IDs (when building from [`Job`] values directly)
//!
//! Construction is pure; all validation happens before any search work.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

use crate::models::{Job, Task};

/// One raw task record from the ingestion boundary.
///
/// Field aliases match the tabular column headers (`JobID`, `TaskID`,
/// `MachineID`, `Duration`, `Deadline`), so a row deserializes directly.
/// `deadline` and `weight` are job-level attributes carried on task rows;
/// the first present value per job wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Owning job identifier.
    #[serde(alias = "JobID")]
    pub job: String,
    /// Task position within the job (0-based).
    #[serde(alias = "TaskID")]
    pub position: u32,
    /// Machine identifier.
    #[serde(alias = "MachineID")]
    pub machine: String,
    /// Processing duration (time units, > 0).
    #[serde(alias = "Duration")]
    pub duration: i64,
    /// Optional job deadline.
    #[serde(default, alias = "Deadline")]
    pub deadline: Option<i64>,
    /// Optional job priority weight.
    #[serde(default, alias = "Weight")]
    pub weight: Option<i64>,
}

impl TaskRecord {
    /// Creates a record with no deadline or weight.
    pub fn new(
        job: impl Into<String>,
        position: u32,
        machine: impl Into<String>,
        duration: i64,
    ) -> Self {
        Self {
            job: job.into(),
            position,
            machine: machine.into(),
            duration,
            deadline: None,
            weight: None,
        }
    }

    /// Sets the job deadline.
    pub fn with_deadline(mut self, deadline: i64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the job priority weight.
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Malformed input detected at instance build time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInstance {
    /// A task's duration is zero or negative.
    #[error("task {position} of job '{job}' has non-positive duration {duration}")]
    NonPositiveDuration {
        job: String,
        position: u32,
        duration: i64,
    },
    /// A job's task positions are not a gapless 0..k-1 range.
    #[error("job '{job}' has gapped task positions: expected {expected}, found {found}")]
    PositionGap {
        job: String,
        expected: u32,
        found: u32,
    },
    /// Two tasks of the same job share a position.
    #[error("job '{job}' has duplicate task position {position}")]
    DuplicatePosition { job: String, position: u32 },
    /// A task references an empty machine ID.
    #[error("task {position} of job '{job}' references an empty machine id")]
    EmptyMachine { job: String, position: u32 },
    /// Two jobs share an ID.
    #[error("duplicate job id '{job}'")]
    DuplicateJob { job: String },
}

/// Flattened task view used by the constraint model and search.
///
/// Indices are dense: jobs and machines index into the instance's sorted
/// job/machine lists.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlatTask {
    /// Index into [`Instance::jobs`].
    pub job: usize,
    /// Position within the job.
    pub position: u32,
    /// Index into [`Instance::machines`].
    pub machine: usize,
    /// Processing duration.
    pub duration: i64,
}

/// A validated, immutable job-shop instance.
///
/// Jobs and machines are held in sorted ID order so every derived ordering
/// (machine selection tie-breaks, rankings) is reproducible.
#[derive(Debug, Clone)]
pub struct Instance {
    jobs: Vec<Job>,
    machines: Vec<String>,
    horizon: i64,
    flat: Vec<FlatTask>,
    job_tasks: Vec<Vec<usize>>,
    machine_tasks: Vec<Vec<usize>>,
}

impl Instance {
    /// Builds an instance from raw task records.
    ///
    /// Records are grouped by job ID (sorted), ordered by position within
    /// each job, and validated. Empty input yields an empty instance.
    ///
    /// # Errors
    /// [`InvalidInstance`] naming the offending job/task on the first
    /// violation encountered.
    pub fn build(records: &[TaskRecord]) -> Result<Self, InvalidInstance> {
        let mut grouped: BTreeMap<&str, Vec<&TaskRecord>> = BTreeMap::new();
        for r in records {
            grouped.entry(r.job.as_str()).or_default().push(r);
        }

        let mut jobs = Vec::with_capacity(grouped.len());
        for (job_id, mut recs) in grouped {
            recs.sort_by_key(|r| r.position);

            let mut job = Job::new(job_id);
            job.deadline = recs.iter().find_map(|r| r.deadline);
            job.weight = recs.iter().find_map(|r| r.weight).unwrap_or(1);
            for r in &recs {
                job.tasks
                    .push(Task::new(r.position, r.machine.clone(), r.duration));
            }
            jobs.push(job);
        }

        Self::from_jobs(jobs)
    }

    /// Builds an instance from already-assembled jobs.
    ///
    /// Jobs are sorted by ID; tasks within each job by position. The same
    /// validation as [`Instance::build`] applies.
    pub fn from_jobs(mut jobs: Vec<Job>) -> Result<Self, InvalidInstance> {
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        for pair in jobs.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(InvalidInstance::DuplicateJob {
                    job: pair[0].id.clone(),
                });
            }
        }

        let mut machine_ids: BTreeSet<String> = BTreeSet::new();
        for job in &mut jobs {
            job.tasks.sort_by_key(|t| t.position);
            for (expected, task) in job.tasks.iter().enumerate() {
                let expected = expected as u32;
                if task.duration <= 0 {
                    return Err(InvalidInstance::NonPositiveDuration {
                        job: job.id.clone(),
                        position: task.position,
                        duration: task.duration,
                    });
                }
                if task.machine.is_empty() {
                    return Err(InvalidInstance::EmptyMachine {
                        job: job.id.clone(),
                        position: task.position,
                    });
                }
                if task.position < expected {
                    return Err(InvalidInstance::DuplicatePosition {
                        job: job.id.clone(),
                        position: task.position,
                    });
                }
                if task.position > expected {
                    return Err(InvalidInstance::PositionGap {
                        job: job.id.clone(),
                        expected,
                        found: task.position,
                    });
                }
                machine_ids.insert(task.machine.clone());
            }
        }

        let machines: Vec<String> = machine_ids.into_iter().collect();
        let machine_index: HashMap<&str, usize> = machines
            .iter()
            .enumerate()
            .map(|(i, m)| (m.as_str(), i))
            .collect();

        let mut flat = Vec::new();
        let mut job_tasks = vec![Vec::new(); jobs.len()];
        let mut machine_tasks = vec![Vec::new(); machines.len()];
        let mut horizon: i64 = 0;

        for (j, job) in jobs.iter().enumerate() {
            for task in &job.tasks {
                let m = machine_index[task.machine.as_str()];
                let idx = flat.len();
                flat.push(FlatTask {
                    job: j,
                    position: task.position,
                    machine: m,
                    duration: task.duration,
                });
                job_tasks[j].push(idx);
                machine_tasks[m].push(idx);
                horizon += task.duration;
            }
        }

        Ok(Self {
            jobs,
            machines,
            horizon,
            flat,
            job_tasks,
            machine_tasks,
        })
    }

    /// Jobs in sorted ID order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Machine IDs in sorted order.
    pub fn machines(&self) -> &[String] {
        &self.machines
    }

    /// Safe upper bound on any feasible makespan: sum of all durations.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Total number of tasks.
    pub fn task_count(&self) -> usize {
        self.flat.len()
    }

    /// Total processing demand per machine.
    ///
    /// Dividing by [`Instance::horizon`] gives the pre-optimization
    /// utilization estimate (the load were all work serialized).
    pub fn machine_load(&self) -> HashMap<String, i64> {
        let mut load: HashMap<String, i64> = HashMap::new();
        for t in &self.flat {
            *load.entry(self.machines[t.machine].clone()).or_insert(0) += t.duration;
        }
        load
    }

    pub(crate) fn flat(&self) -> &[FlatTask] {
        &self.flat
    }

    /// Flat task indices of one job, in position order.
    pub(crate) fn job_task_indices(&self, job: usize) -> &[usize] {
        &self.job_tasks[job]
    }

    /// Flat task indices sharing one machine.
    pub(crate) fn machine_task_indices(&self, machine: usize) -> &[usize] {
        &self.machine_tasks[machine]
    }
}
