//! Signal rule engine.

pub mod crossover;
pub mod engine;
pub mod rules;

pub use crossover::{detect_crossover, CrossoverType};
pub use engine::SignalEngine;
pub use rules::{evaluate_rules, RuleInputs, RULES};
