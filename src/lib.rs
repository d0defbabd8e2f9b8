//! Evolutionary ASCII art - approximates raster images with character grids.
//!
//! This crate searches for the character grid whose rendered glyphs best
//! resemble a target image, using a genetic algorithm with elitism,
//! tournament selection, uniform crossover, alphabet-adjacency mutation,
//! adaptive mutation-rate control, and periodic diversity injection.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: configuration, alphabet/chromosome, and bitmap data types
//! - `engine`: similarity metrics, fitness evaluation, genetic operators,
//!   and the generation loop
//!
//! Image decoding and glyph rasterization are external collaborators: the
//! engine consumes a pre-cut [`TargetGrid`] and a rendered [`GlyphCache`],
//! both validated at construction.
//!
//! # Example
//!
//! ```rust
//! use ascii_evolve::{
//!     engine::EvolutionEngine,
//!     schema::{Alphabet, Bitmap, EvolutionConfig, GlyphCache, TargetGrid},
//! };
//!
//! // A 1x2 target: one dark block above one bright block.
//! let target = TargetGrid::new(
//!     1,
//!     2,
//!     2,
//!     2,
//!     vec![Bitmap::filled(2, 2, 0), Bitmap::filled(2, 2, 255)],
//! )
//! .unwrap();
//! let glyphs = GlyphCache::new(
//!     2,
//!     2,
//!     [
//!         ('.', Bitmap::filled(2, 2, 20)),
//!         ('#', Bitmap::filled(2, 2, 230)),
//!     ],
//! )
//! .unwrap();
//! let alphabet = Alphabet::new(".#".chars());
//!
//! let config = EvolutionConfig {
//!     population_size: 20,
//!     generation_count: 10,
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(config, alphabet, target, glyphs).unwrap();
//! let result = engine.run();
//! for row in result.best.render_rows() {
//!     println!("{row}");
//! }
//! ```

pub mod engine;
pub mod schema;

// Re-export commonly used types
pub use engine::{EvolutionEngine, FitnessEvaluator, SimilarityMetric};
pub use schema::{Alphabet, Chromosome, EvolutionConfig, EvolutionResult, GlyphCache, TargetGrid};
