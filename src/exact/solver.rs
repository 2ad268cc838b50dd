//! Exact solver interface and a small enumeration solver.

use std::time::{Duration, Instant};

use super::program::{BinaryProgram, Sense, FEASIBILITY_TOLERANCE};
use crate::error::{NrpError, Result};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not proven optimal) solution found before the time limit.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Time limit reached without any feasible solution.
    Timeout,
    /// Program is invalid or malformed.
    ModelInvalid,
}

/// Result of one exact solve.
#[derive(Debug, Clone)]
pub struct ExactSolution {
    pub status: SolverStatus,
    /// One value per variable, in `[0, 1]`. Empty when no solution was found.
    pub values: Vec<f64>,
    pub objective_value: Option<f64>,
    pub solve_time: Duration,
}

impl ExactSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: None,
            solve_time: Duration::ZERO,
        }
    }

    /// Whether a feasible assignment was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolverStatus::Optimal
    }

    /// Values rounded to the nearest 0/1.
    pub fn rounded(&self) -> Vec<bool> {
        self.values.iter().map(|v| v.round() == 1.0).collect()
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock limit for one solve.
    pub time_limit: Duration,
    /// Number of parallel workers.
    pub num_workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
            num_workers: 1,
        }
    }
}

/// A capability that solves 0/1 linear programs.
///
/// [`MicroLpSolver`](super::MicroLpSolver) backs experiments;
/// [`SimpleBinarySolver`] is the exhaustive reference.
pub trait ExactSolver {
    /// Checks that the solver can handle `program` before any solve.
    ///
    /// Called once when a session is opened. The default validates the
    /// program's shape.
    fn prepare(&self, program: &BinaryProgram) -> Result<()> {
        program.validate().map_err(NrpError::Solver)
    }

    /// Solves the program.
    ///
    /// Infeasibility and timeouts are statuses, not errors; `Err` is
    /// reserved for solver failures.
    fn solve(&self, program: &BinaryProgram, config: &SolverConfig) -> Result<ExactSolution>;
}

impl<T: ExactSolver + ?Sized> ExactSolver for Box<T> {
    fn prepare(&self, program: &BinaryProgram) -> Result<()> {
        (**self).prepare(program)
    }

    fn solve(&self, program: &BinaryProgram, config: &SolverConfig) -> Result<ExactSolution> {
        (**self).solve(program, config)
    }
}

/// Depth-first bounded enumeration over the binary variables.
///
/// Prunes on objective bound and on constraint reachability, honours the
/// wall-clock limit, and reports `Optimal` only after the whole tree is
/// exhausted. Always single-threaded.
///
/// # Limitations
///
/// - Exponential in the worst case: meant for small programs and tests
/// - No LP relaxation, cuts or presolve
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleBinarySolver;

impl SimpleBinarySolver {
    pub fn new() -> Self {
        Self
    }
}

impl ExactSolver for SimpleBinarySolver {
    fn solve(&self, program: &BinaryProgram, config: &SolverConfig) -> Result<ExactSolution> {
        if program.validate().is_err() {
            return Ok(ExactSolution::empty(SolverStatus::ModelInvalid));
        }

        let start = Instant::now();
        let mut search = Search::new(program, start + config.time_limit);
        search.descend(0, 0.0);
        Ok(search.finish(start))
    }
}

/// How often (in nodes) the deadline is polled.
const DEADLINE_POLL_MASK: u64 = 0xFF;

struct Search<'a> {
    program: &'a BinaryProgram,
    deadline: Instant,
    /// `columns[j]` = `(constraint index, coefficient)` for variable `j`.
    columns: Vec<Vec<(usize, f64)>>,
    /// Smallest / largest activity still reachable from variables `>= depth`.
    reach_min: Vec<Vec<f64>>,
    reach_max: Vec<Vec<f64>>,
    objective_floor: Vec<f64>,
    activity: Vec<f64>,
    assignment: Vec<bool>,
    best: Option<(f64, Vec<bool>)>,
    nodes: u64,
    timed_out: bool,
}

impl<'a> Search<'a> {
    fn new(program: &'a BinaryProgram, deadline: Instant) -> Self {
        let n = program.num_variables();
        let m = program.constraints().len();

        let mut columns = vec![Vec::new(); n];
        let mut reach_min = vec![vec![0.0; n + 1]; m];
        let mut reach_max = vec![vec![0.0; n + 1]; m];
        for (c, constraint) in program.constraints().iter().enumerate() {
            let mut dense = vec![0.0; n];
            for &(j, a) in &constraint.terms {
                dense[j] += a;
            }
            for (j, &a) in dense.iter().enumerate() {
                if a != 0.0 {
                    columns[j].push((c, a));
                }
            }
            for j in (0..n).rev() {
                reach_min[c][j] = reach_min[c][j + 1] + dense[j].min(0.0);
                reach_max[c][j] = reach_max[c][j + 1] + dense[j].max(0.0);
            }
        }

        let mut objective_floor = vec![0.0; n + 1];
        for j in (0..n).rev() {
            objective_floor[j] = objective_floor[j + 1] + program.objective()[j].min(0.0);
        }

        Self {
            program,
            deadline,
            columns,
            reach_min,
            reach_max,
            objective_floor,
            activity: vec![0.0; m],
            assignment: vec![false; n],
            best: None,
            nodes: 0,
            timed_out: false,
        }
    }

    fn finish(self, start: Instant) -> ExactSolution {
        let status = match (&self.best, self.timed_out) {
            (Some(_), false) => SolverStatus::Optimal,
            (Some(_), true) => SolverStatus::Feasible,
            (None, false) => SolverStatus::Infeasible,
            (None, true) => SolverStatus::Timeout,
        };
        let (objective_value, values) = match self.best {
            Some((value, assignment)) => (
                Some(value),
                assignment.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect(),
            ),
            None => (None, Vec::new()),
        };
        ExactSolution {
            status,
            values,
            objective_value,
            solve_time: start.elapsed(),
        }
    }

    fn descend(&mut self, depth: usize, partial: f64) {
        if self.timed_out {
            return;
        }
        self.nodes += 1;
        if self.nodes & DEADLINE_POLL_MASK == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
            return;
        }

        if let Some((incumbent, _)) = &self.best {
            if partial + self.objective_floor[depth] >= *incumbent - FEASIBILITY_TOLERANCE {
                return;
            }
        }
        if !self.reachable(depth) {
            return;
        }

        let n = self.program.num_variables();
        if depth == n {
            self.best = Some((partial, self.assignment.clone()));
            return;
        }

        let cost = self.program.objective()[depth];
        let order = if cost < 0.0 { [true, false] } else { [false, true] };
        for value in order {
            self.assign(depth, value);
            self.descend(depth + 1, if value { partial + cost } else { partial });
            self.assign(depth, false);
        }
    }

    /// Whether every constraint can still be satisfied by the free variables.
    fn reachable(&self, depth: usize) -> bool {
        self.program
            .constraints()
            .iter()
            .enumerate()
            .all(|(c, constraint)| match constraint.sense {
                Sense::Le => {
                    self.activity[c] + self.reach_min[c][depth]
                        <= constraint.rhs + FEASIBILITY_TOLERANCE
                }
                Sense::Ge => {
                    self.activity[c] + self.reach_max[c][depth]
                        >= constraint.rhs - FEASIBILITY_TOLERANCE
                }
            })
    }

    fn assign(&mut self, j: usize, value: bool) {
        if self.assignment[j] == value {
            return;
        }
        self.assignment[j] = value;
        let sign = if value { 1.0 } else { -1.0 };
        for &(c, a) in &self.columns[j] {
            self.activity[c] += sign * a;
        }
    }
}
