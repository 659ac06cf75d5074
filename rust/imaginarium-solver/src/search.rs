//! The reference engine: randomized chronological backtracking.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::constraint::Propagation;
use crate::error::{Result, SolverError};
use crate::literal::{Literal, Proposition};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::variable::{Domain, Value};

pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Anything that can turn a [`Problem`] into a [`Solution`].
pub trait Engine {
    fn solve(&mut self, problem: &Problem) -> Result<Solution>;
}

/// Backtracking search with unit and cardinality propagation.
///
/// Decision order is shuffled per solve and each decision tries the
/// polarity drawn from the proposition's prior first, so repeated solves
/// of one problem explore different models.
pub struct Backtracking<R = ChaCha8Rng> {
    rng: R,
    max_steps: usize,
}

impl Backtracking<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Backtracking::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Backtracking::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> Backtracking<R> {
    pub fn new(rng: R) -> Self {
        Backtracking {
            rng,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl<R: Rng> Engine for Backtracking<R> {
    fn solve(&mut self, problem: &Problem) -> Result<Solution> {
        let mut search = Search::new(problem, self.max_steps);
        let assignment = search.run(&mut self.rng)?;
        trace!(
            propositions = problem.proposition_count(),
            constraints = problem.constraints().len(),
            steps = search.steps,
            "search finished"
        );

        let values = problem
            .variables()
            .iter()
            .map(|variable| {
                let guard = variable.guard;
                if assignment[guard.proposition.index()] != guard.positive {
                    return None;
                }
                match &variable.domain {
                    Domain::Float { low, high } => {
                        Some(Value::Float(self.rng.gen_range(*low..=*high)))
                    }
                    Domain::Menu { values, choices } => values
                        .iter()
                        .zip(choices)
                        .find(|(_, choice)| assignment[choice.index()])
                        .map(|(value, _)| Value::Text(value.clone())),
                }
            })
            .collect();

        let solution = Solution::new(assignment, values, search.steps);
        debug_assert!(problem.violated(&solution).is_none());
        Ok(solution)
    }
}

struct Decision {
    proposition: Proposition,
    value: bool,
    flipped: bool,
    trail_len: usize,
}

struct Search<'p> {
    problem: &'p Problem,
    assignment: Vec<Option<bool>>,
    trail: Vec<Proposition>,
    occurrences: Vec<Vec<usize>>,
    steps: usize,
    max_steps: usize,
}

impl<'p> Search<'p> {
    fn new(problem: &'p Problem, max_steps: usize) -> Self {
        let count = problem.proposition_count();
        let mut occurrences = vec![Vec::new(); count];
        for (index, constraint) in problem.constraints().iter().enumerate() {
            for literal in constraint.guard.iter().chain(&constraint.literals) {
                let list = &mut occurrences[literal.proposition.index()];
                if list.last() != Some(&index) {
                    list.push(index);
                }
            }
        }
        Search {
            problem,
            assignment: vec![None; count],
            trail: Vec::new(),
            occurrences,
            steps: 0,
            max_steps,
        }
    }

    fn run(&mut self, rng: &mut impl Rng) -> Result<Vec<bool>> {
        if !self.propagate_all()? {
            return Err(SolverError::Contradiction);
        }

        let mut order: Vec<Proposition> = (0..self.assignment.len() as u32)
            .map(Proposition)
            .collect();
        order.shuffle(rng);

        let mut stack: Vec<Decision> = Vec::new();
        let mut cursor = 0;
        loop {
            while cursor < order.len() && self.assignment[order[cursor].index()].is_some() {
                cursor += 1;
            }
            let Some(&proposition) = order.get(cursor) else {
                break;
            };

            let value = rng.gen_bool(self.problem.prior(proposition));
            stack.push(Decision {
                proposition,
                value,
                flipped: false,
                trail_len: self.trail.len(),
            });
            if !self.assign_and_propagate(proposition, value)? {
                if !self.backtrack(&mut stack)? {
                    return Err(SolverError::Contradiction);
                }
                // Backtracking may unassign propositions before the cursor.
                cursor = 0;
            }
        }

        Ok(self
            .assignment
            .iter()
            .map(|value| value.unwrap_or(false))
            .collect())
    }

    fn backtrack(&mut self, stack: &mut Vec<Decision>) -> Result<bool> {
        while let Some(decision) = stack.pop() {
            self.undo(decision.trail_len);
            if decision.flipped {
                continue;
            }
            let value = !decision.value;
            let proposition = decision.proposition;
            stack.push(Decision {
                value,
                flipped: true,
                ..decision
            });
            if self.assign_and_propagate(proposition, value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn undo(&mut self, trail_len: usize) {
        for proposition in self.trail.drain(trail_len..) {
            self.assignment[proposition.index()] = None;
        }
    }

    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > self.max_steps {
            Err(SolverError::Timeout {
                steps: self.max_steps,
            })
        } else {
            Ok(())
        }
    }

    fn value(&self, literal: Literal) -> Option<bool> {
        literal.evaluate(self.assignment[literal.proposition.index()])
    }

    fn set(&mut self, literal: Literal) {
        self.assignment[literal.proposition.index()] = Some(literal.positive);
        self.trail.push(literal.proposition);
    }

    fn propagate_all(&mut self) -> Result<bool> {
        let mut queue = Vec::new();
        for index in 0..self.problem.constraints().len() {
            if !self.propagate_constraint(index, &mut queue)? {
                return Ok(false);
            }
        }
        self.drain(queue)
    }

    fn assign_and_propagate(&mut self, proposition: Proposition, value: bool) -> Result<bool> {
        self.tick()?;
        self.set(Literal::new(proposition, value));
        self.drain(vec![proposition])
    }

    fn drain(&mut self, mut queue: Vec<Proposition>) -> Result<bool> {
        while let Some(proposition) = queue.pop() {
            for position in 0..self.occurrences[proposition.index()].len() {
                let index = self.occurrences[proposition.index()][position];
                if !self.propagate_constraint(index, &mut queue)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn propagate_constraint(&mut self, index: usize, queue: &mut Vec<Proposition>) -> Result<bool> {
        self.tick()?;
        let problem = self.problem;
        let constraint = &problem.constraints()[index];
        match constraint.propagate(|literal| self.value(literal)) {
            Propagation::Open | Propagation::Settled => Ok(true),
            Propagation::Conflict => Ok(false),
            Propagation::Force(literals) => {
                for literal in literals {
                    match self.value(literal) {
                        Some(true) => {}
                        Some(false) => return Ok(false),
                        None => {
                            self.set(literal);
                            queue.push(literal.proposition);
                        }
                    }
                }
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn satisfies_clauses() -> TestResult {
        let mut problem = Problem::new();
        let a = problem.proposition("a");
        let b = problem.proposition("b");
        problem.clause([a.negative(), b.positive()]);
        problem.assert(a.positive());

        for seed in 0..20 {
            let solution = Backtracking::seeded(seed).solve(&problem)?;
            assert!(solution.holds(a));
            assert!(solution.holds(b));
        }
        Ok(())
    }

    #[test]
    fn reports_contradiction() {
        let mut problem = Problem::new();
        let a = problem.proposition("a");
        problem.assert(a.positive());
        problem.assert(a.negative());
        let result = Backtracking::seeded(1).solve(&problem);
        assert_eq!(result.err(), Some(SolverError::Contradiction));
    }

    #[test]
    fn finds_contradiction_by_search() {
        // Pigeonhole: three pigeons, two holes.
        let mut problem = Problem::new();
        let mut holes = vec![Vec::new(), Vec::new()];
        for pigeon in 0..3 {
            let choices: Vec<Literal> = (0..2)
                .map(|hole| {
                    let p = problem.proposition(format!("in({pigeon}, {hole})"));
                    holes[hole].push(p.positive());
                    p.positive()
                })
                .collect();
            problem.unique(choices);
        }
        for hole in holes {
            problem.at_most(1, hole);
        }
        let result = Backtracking::seeded(3).solve(&problem);
        assert_eq!(result.err(), Some(SolverError::Contradiction));
    }

    #[test]
    fn step_budget_produces_timeout() {
        let mut problem = Problem::new();
        for i in 0..50 {
            problem.proposition(format!("p{i}"));
        }
        let result = Backtracking::seeded(3).with_max_steps(5).solve(&problem);
        assert!(matches!(result, Err(SolverError::Timeout { .. })));
    }

    #[test]
    fn quantified_bounds_hold() -> TestResult {
        let mut problem = Problem::new();
        let literals: Vec<Literal> = (0..5)
            .map(|i| problem.proposition(format!("x{i}")).positive())
            .collect();
        problem.quantify(2, 3, literals.clone());
        for seed in 0..30 {
            let solution = Backtracking::seeded(seed).solve(&problem)?;
            let count = literals.iter().filter(|l| solution.literal(**l)).count();
            assert!((2..=3).contains(&count), "count {count} out of bounds");
        }
        Ok(())
    }

    #[test]
    fn priors_bias_free_propositions() -> TestResult {
        let mut problem = Problem::new();
        let rare = problem.proposition("rare");
        problem.set_prior(rare, 0.0);
        for seed in 0..10 {
            assert!(!Backtracking::seeded(seed).solve(&problem)?.holds(rare));
        }
        Ok(())
    }

    #[test]
    fn float_variables_respect_guard_and_range() -> TestResult {
        let mut problem = Problem::new();
        let cat = problem.proposition("cat");
        let dog = problem.proposition("dog");
        problem.assert(cat.positive());
        problem.assert(dog.negative());
        let age = problem.float_variable("age", 1.0, 20.0, cat.positive());
        let bark = problem.float_variable("bark", 1.0, 2.0, dog.positive());
        for seed in 0..20 {
            let solution = Backtracking::seeded(seed).solve(&problem)?;
            let value = solution.value(age).and_then(|v| v.as_float());
            assert!(value.is_some_and(|v| (1.0..=20.0).contains(&v)));
            assert_eq!(solution.value(bark), None);
        }
        Ok(())
    }

    #[test]
    fn menu_restrictions_apply_under_conditions() -> TestResult {
        let mut problem = Problem::new();
        let cat = problem.proposition("cat");
        let fuzzy = problem.proposition("fuzzy");
        problem.assert(cat.positive());
        problem.assert(fuzzy.positive());
        let color = problem.menu_variable(
            "color",
            vec!["black".into(), "grey".into(), "white".into()],
            cat.positive(),
        );
        problem.restrict_menu(color, &[fuzzy.positive()], &["grey".into(), "white".into()]);
        for seed in 0..20 {
            let solution = Backtracking::seeded(seed).solve(&problem)?;
            let value = solution.value(color).map(|v| v.to_string());
            assert!(matches!(value.as_deref(), Some("grey") | Some("white")));
        }
        Ok(())
    }
}
