pub mod problem;

pub use problem::{NewProblem, Problem, ProblemUpdate};
