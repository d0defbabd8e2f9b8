//! Engine module - the evolutionary optimization loop.
//!
//! # Overview
//!
//! The engine consists of:
//!
//! - **Similarity Metrics** (`similarity`): pluggable block comparison
//! - **Fitness Evaluation** (`fitness`): mean per-block similarity
//! - **Genetic Operators** (`genetic`): initialization, crossover, mutation
//! - **Selection** (`select`): elitism plus tournament parent pools
//! - **Mutation Schedule** (`schedule`): stagnation-driven rate adaptation
//! - **Search** (`search`): the generation loop and run results

mod fitness;
mod genetic;
mod schedule;
mod search;
mod select;
mod similarity;

pub use fitness::*;
pub use genetic::*;
pub use schedule::*;
pub use search::*;
pub use select::*;
pub use similarity::*;
