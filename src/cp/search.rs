//! Disjunctive branch-and-bound search.
//!
//! Resolves machine disjunctions one pair at a time, propagating bounds
//! after every decision and backtracking on contradiction. The engine keeps
//! exactly one best-so-far assignment, seeded with a feasible incumbent, and
//! improves it whenever a complete consistent assignment scores strictly
//! lower; ties keep the earlier find for determinism.
//!
//! # Branching heuristic
//!
//! - Machine: most unresolved pairs, tie-break lowest machine id
//! - Pair: smallest combined start-window slack, tie-break lowest pair index
//! - Ordering: smaller resulting makespan bound first; exact ties are broken
//!   by a seeded RNG for reproducible runs
//!
//! Subtrees whose lower bound cannot beat the best-so-far score are pruned.
//! The budget (wall clock and/or iteration cap) is checked at every branch
//! decision so the engine stops promptly and still returns its best.

use std::time::{Duration, Instant};

use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::bounds::Bounds;
use super::model::{ConstraintModel, PairOrder};
use crate::instance::Instance;
use crate::objective::Objective;

/// Search termination budget.
///
/// Both limits are honored; whichever is hit first stops the search.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    /// Maximum wall-clock time.
    pub time_limit: Duration,
    /// Maximum number of branch decisions. `None` = unbounded.
    pub max_iterations: Option<u64>,
}

impl Default for SearchBudget {
    /// A small budget suitable for interactive use.
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(5),
            max_iterations: None,
        }
    }
}

/// Terminal state of one search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The whole tree was explored; the returned assignment is optimal.
    Optimal {
        /// Start time per flat task index.
        starts: Vec<i64>,
        /// Objective score of the assignment.
        score: i64,
        /// Branch decisions taken.
        iterations: u64,
    },
    /// The budget ran out; the best-so-far assignment is returned unproven.
    BudgetExceeded {
        starts: Vec<i64>,
        score: i64,
        iterations: u64,
    },
    /// No start-time assignment satisfies the constraints (defensive; not
    /// expected for well-formed job-shop instances).
    Infeasible,
}

/// An applied branch decision, recorded for cheap undo.
#[derive(Debug, Clone, Copy)]
struct Decision {
    pair: usize,
    order: PairOrder,
    /// Whether the alternative ordering was already tried.
    flipped: bool,
    trail_mark: usize,
}

struct Best {
    starts: Vec<i64>,
    score: i64,
}

/// Single-solve depth-first search engine.
///
/// Owns all mutable search state; independent solves on separate threads
/// never share an engine.
pub struct SearchEngine<'a> {
    model: &'a ConstraintModel,
    instance: &'a Instance,
    objective: Objective,
    bounds: Bounds,
    /// Active ordering edges: precedence edges, then one per decision.
    edges: Vec<(usize, usize)>,
    pair_order: Vec<Option<PairOrder>>,
    /// Unresolved pair count per machine.
    unresolved: Vec<usize>,
    decisions: Vec<Decision>,
    rng: SmallRng,
    best: Option<Best>,
    iterations: u64,
}

impl<'a> SearchEngine<'a> {
    /// Creates an engine for one solve.
    ///
    /// `tie_break_seed` makes ordering tie-breaks reproducible; identical
    /// seeds yield identical searches.
    pub fn new(
        model: &'a ConstraintModel,
        instance: &'a Instance,
        objective: Objective,
        tie_break_seed: u64,
    ) -> Self {
        Self {
            model,
            instance,
            objective,
            bounds: Bounds::new(model),
            edges: model.precedences.clone(),
            pair_order: vec![None; model.pair_count()],
            unresolved: model.machine_pairs.iter().map(Vec::len).collect(),
            decisions: Vec::new(),
            rng: SmallRng::seed_from_u64(tie_break_seed),
            best: None,
            iterations: 0,
        }
    }

    /// Runs the search to completion or budget exhaustion.
    ///
    /// `incumbent` must be a feasible assignment (typically from the greedy
    /// bootstrap); it guarantees a near-zero budget still yields a schedule.
    pub fn run(mut self, budget: &SearchBudget, incumbent: (Vec<i64>, i64)) -> SearchOutcome {
        self.best = Some(Best {
            starts: incumbent.0,
            score: incumbent.1,
        });
        let deadline = Instant::now().checked_add(budget.time_limit);

        if !self.propagate() {
            // Root contradiction: no assignment satisfies the precedence
            // chains within the horizon.
            return SearchOutcome::Infeasible;
        }

        loop {
            if self.budget_exhausted(deadline, budget) {
                let best = match self.best.take() {
                    Some(b) => b,
                    None => return SearchOutcome::Infeasible,
                };
                debug!(
                    "search budget exhausted after {} iterations, best score {}",
                    self.iterations, best.score
                );
                return SearchOutcome::BudgetExceeded {
                    starts: best.starts,
                    score: best.score,
                    iterations: self.iterations,
                };
            }
            self.iterations += 1;

            if self.decisions.len() == self.model.pair_count() {
                // Complete consistent assignment: earliest starts realize it.
                self.record_candidate();
                if !self.backtrack() {
                    break;
                }
                continue;
            }

            if let Some(best) = &self.best {
                if self.lower_bound() >= best.score {
                    if !self.backtrack() {
                        break;
                    }
                    continue;
                }
            }

            let pair = self.select_pair();
            let order = self.select_order(pair);
            trace!("iteration {}: resolving pair {pair} {order:?}", self.iterations);
            self.apply(pair, order, false);
            if !self.propagate() && !self.backtrack() {
                break;
            }
        }

        // Tree exhausted: best-so-far is optimal, or nothing was feasible.
        match self.best.take() {
            Some(b) => {
                debug!(
                    "search exhausted after {} iterations, optimal score {}",
                    self.iterations, b.score
                );
                SearchOutcome::Optimal {
                    starts: b.starts,
                    score: b.score,
                    iterations: self.iterations,
                }
            }
            None => SearchOutcome::Infeasible,
        }
    }

    fn budget_exhausted(&self, deadline: Option<Instant>, budget: &SearchBudget) -> bool {
        if let Some(cap) = budget.max_iterations {
            if self.iterations >= cap {
                return true;
            }
        }
        matches!(deadline, Some(d) if Instant::now() >= d)
    }

    fn propagate(&mut self) -> bool {
        self.bounds.propagate(&self.edges, &self.model.durations)
    }

    fn lower_bound(&self) -> i64 {
        self.objective
            .score_bounds(self.instance, self.bounds.est_all(), &self.model.durations)
    }

    fn record_candidate(&mut self) {
        let starts = self.bounds.est_all().to_vec();
        let score = self
            .objective
            .score_bounds(self.instance, &starts, &self.model.durations);
        let improved = self.best.as_ref().map_or(true, |b| score < b.score);
        if improved {
            debug!(
                "new incumbent with score {score} after {} iterations",
                self.iterations
            );
            self.best = Some(Best { starts, score });
        }
    }

    /// Picks the next unresolved pair: most-constrained machine first, then
    /// smallest combined slack.
    fn select_pair(&self) -> usize {
        let mut machine = 0;
        let mut most = 0;
        for (m, &count) in self.unresolved.iter().enumerate() {
            if count > most {
                most = count;
                machine = m;
            }
        }

        let mut chosen = usize::MAX;
        let mut least_slack = i64::MAX;
        for &p in &self.model.machine_pairs[machine] {
            if self.pair_order[p].is_some() {
                continue;
            }
            let pair = &self.model.pairs[p];
            let slack = self.bounds.slack(pair.a) + self.bounds.slack(pair.b);
            if slack < least_slack || (slack == least_slack && p < chosen) {
                least_slack = slack;
                chosen = p;
            }
        }
        chosen
    }

    /// Greedy ordering heuristic: try the direction whose makespan bound is
    /// smaller first; exact ties go to the seeded RNG.
    fn select_order(&mut self, pair: usize) -> PairOrder {
        let a_first = self.order_bound(pair, PairOrder::AFirst);
        let b_first = self.order_bound(pair, PairOrder::BFirst);
        if a_first < b_first {
            PairOrder::AFirst
        } else if b_first < a_first {
            PairOrder::BFirst
        } else if self.rng.random_bool(0.5) {
            PairOrder::AFirst
        } else {
            PairOrder::BFirst
        }
    }

    /// Estimated makespan bound after orienting a pair, without propagating.
    fn order_bound(&self, pair: usize, order: PairOrder) -> i64 {
        let (u, v) = self.model.pair_edge(pair, order);
        let d = &self.model.durations;
        let est_v = self.bounds.est(v).max(self.bounds.est(u) + d[u]);
        self.bounds
            .makespan_lower_bound(d)
            .max(est_v + d[v])
    }

    fn apply(&mut self, pair: usize, order: PairOrder, flipped: bool) {
        let trail_mark = self.bounds.mark();
        self.pair_order[pair] = Some(order);
        self.unresolved[self.model.pairs[pair].machine] -= 1;
        self.edges.push(self.model.pair_edge(pair, order));
        self.decisions.push(Decision {
            pair,
            order,
            flipped,
            trail_mark,
        });
    }

    fn undo_last(&mut self) -> Option<Decision> {
        let d = self.decisions.pop()?;
        self.edges.pop();
        self.pair_order[d.pair] = None;
        self.unresolved[self.model.pairs[d.pair].machine] += 1;
        self.bounds.undo_to(d.trail_mark);
        Some(d)
    }

    /// Unwinds to the deepest decision with an untried alternative, applies
    /// that alternative, and re-propagates. Returns `false` when the tree is
    /// exhausted.
    fn backtrack(&mut self) -> bool {
        while let Some(d) = self.undo_last() {
            if !d.flipped {
                self.apply(d.pair, d.order.flipped(), true);
                if self.propagate() {
                    return true;
                }
                // Contradiction on the alternative too: keep unwinding.
            }
        }
        false
    }
}
