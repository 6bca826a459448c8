//! Bipartite matching between two index sets
//!
//! - [`matrix`]: construction helpers for dense similarity / cost matrices
//! - [`hungarian`]: minimum-cost assignment (Kuhn–Munkres)

pub mod hungarian;
pub mod matrix;

pub use hungarian::{solve_assignment, Hungarian};
