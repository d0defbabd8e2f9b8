//! ASCII evolution CLI - Run the engine from JSON collaborator files.

use std::fs;
use std::path::PathBuf;

use ascii_evolve::{
    engine::EvolutionEngine,
    schema::{Alphabet, EvolutionConfig, GlyphCache, TargetGrid},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    if args.len() < 5 {
        eprintln!(
            "Usage: {} <config.json> <target.json> <glyphs.json> <alphabet.txt>",
            args[0]
        );
        eprintln!();
        eprintln!("Evolve an ASCII art rendition of a preprocessed target image.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json   Evolution configuration");
        eprintln!("  target.json   Target image as a grid of grayscale blocks");
        eprintln!("  glyphs.json   Rendered glyph bitmaps, one per character");
        eprintln!("  alphabet.txt  Characters on the first line, ideally luminance-sorted");
        eprintln!();
        eprintln!("An example configuration is printed with --example.");
        std::process::exit(1);
    }

    let config_path = PathBuf::from(&args[1]);
    let config: EvolutionConfig = read_json(&config_path);
    let target: TargetGrid = read_json(&PathBuf::from(&args[2]));
    let glyphs: GlyphCache = read_json(&PathBuf::from(&args[3]));
    let alphabet = read_alphabet(&PathBuf::from(&args[4]));

    for &ch in alphabet.chars() {
        if !glyphs.contains(ch) {
            log::warn!("alphabet character {ch:?} has no rendered glyph");
        }
    }

    let (grid_w, grid_h) = target.grid_size();
    let (block_w, block_h) = target.block_size();
    println!("ASCII Evolution");
    println!("===============");
    println!("Grid: {grid_w}x{grid_h} cells of {block_w}x{block_h} px");
    println!("Alphabet: {} characters", alphabet.len());
    println!(
        "Population: {}, generations: {}",
        config.population_size, config.generation_count
    );
    println!();

    let generation_count = config.generation_count;
    let mut engine = EvolutionEngine::new(config, alphabet, target, glyphs).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    });

    let baseline = engine.evaluator().greedy_baseline();
    println!(
        "Greedy baseline fitness: {:.4}",
        baseline.fitness.unwrap_or(0.0)
    );
    println!();

    println!("Running evolution...");
    let progress_step = (generation_count / 10).max(1);
    let result = engine.run_with_callback(|stats| {
        if stats.generation % progress_step == 0 || stats.generation == generation_count {
            println!(
                "  Generation {}/{}: best={:.4}, mean={:.4}, rate={:.3}",
                stats.generation,
                generation_count,
                stats.best_fitness,
                stats.mean_fitness,
                stats.mutation_rate
            );
        }
    });

    println!();
    println!("Best fitness: {:.4}", result.stats.best_fitness);
    println!(
        "Time: {:.2}s ({:?})",
        result.stats.elapsed_seconds, result.stats.stop_reason
    );
    println!();
    for row in result.best.render_rows() {
        println!("{row}");
    }

    let history_path = config_path.with_extension("history.json");
    match serde_json::to_string_pretty(&result.history) {
        Ok(json) => {
            if let Err(e) = fs::write(&history_path, json) {
                eprintln!("Error writing history file: {e}");
            } else {
                println!();
                println!("Fitness history written to {}", history_path.display());
            }
        }
        Err(e) => eprintln!("Error serializing history: {e}"),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> T {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        std::process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing {}: {e}", path.display());
        std::process::exit(1);
    })
}

/// The alphabet is the first line of a text file; duplicates are dropped
/// while first-occurrence order is kept.
fn read_alphabet(path: &PathBuf) -> Alphabet {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        std::process::exit(1);
    });
    let line = text.lines().next().unwrap_or("");
    let alphabet = Alphabet::new(line.trim_end().chars());
    if alphabet.is_empty() {
        eprintln!("Alphabet file {} has no characters", path.display());
        std::process::exit(1);
    }
    alphabet
}

fn print_example_config() {
    let config = EvolutionConfig::default();
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
