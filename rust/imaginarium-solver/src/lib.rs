//! # Imaginarium Solver
//!
//! The constraint side of Imaginarium. The generator describes what it wants
//! as a [`Problem`]: named Boolean propositions, clauses over literals,
//! cardinality constraints (optionally guarded by a literal), and typed
//! variables that only exist when their guard proposition is true. An
//! [`Engine`] turns a problem into a [`Solution`] or reports that none could
//! be found.
//!
//! ```
//! use imaginarium_solver::{Backtracking, Engine, Problem};
//!
//! let mut problem = Problem::new();
//! let big = problem.unary("big", "cat");
//! let small = problem.unary("small", "cat");
//! problem.unique([big.positive(), small.positive()]);
//!
//! let mut engine = Backtracking::seeded(7);
//! let solution = engine.solve(&problem).unwrap();
//! assert_ne!(solution.holds(big), solution.holds(small));
//! ```
//!
//! The engine is deliberately simple: chronological backtracking with unit
//! and cardinality propagation, randomized decision order and polarity
//! (biased by each proposition's prior), and a step budget after which it
//! gives up with [`SolverError::Timeout`].

pub mod constraint;
pub mod error;
pub mod literal;
pub mod problem;
pub mod search;
pub mod solution;
pub mod variable;

pub use constraint::Constraint;
pub use error::{Result, SolverError};
pub use literal::{Literal, Proposition};
pub use problem::Problem;
pub use search::{Backtracking, Engine};
pub use solution::Solution;
pub use variable::{Domain, Value, VariableId};
