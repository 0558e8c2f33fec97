#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod brute_force;
pub mod clause;
pub mod cnf;
pub mod config;
pub mod context;
pub mod dimacs;
pub mod dpll;
pub mod error;
pub mod formula;
pub mod frame;
pub mod generator;
pub mod literal;
pub mod portfolio;
pub mod restarter;
pub mod solver;
pub mod trail;
pub mod variable_selection;
