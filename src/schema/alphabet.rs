//! Alphabet and chromosome types for the character-grid genome.
//!
//! The alphabet's order is load-bearing: mutation steps move one index along
//! it, so a luminance-sorted alphabet makes each mutation a small brightness
//! adjustment rather than an arbitrary jump.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Direction of an adjacency mutation step along the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Towards index 0, wrapping to the last character.
    Predecessor,
    /// Towards the last index, wrapping to index 0.
    Successor,
}

/// An ordered, duplicate-free character set, immutable for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<char>", into = "Vec<char>")]
pub struct Alphabet {
    chars: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Build an alphabet from characters, dropping duplicates while keeping
    /// first-occurrence order. May be empty; emptiness is rejected by config
    /// validation before a run starts.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut unique = Vec::new();
        let mut index = HashMap::new();
        for ch in chars {
            if let std::collections::hash_map::Entry::Vacant(entry) = index.entry(ch) {
                entry.insert(unique.len());
                unique.push(ch);
            }
        }
        Self {
            chars: unique,
            index,
        }
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the alphabet holds no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at `index`.
    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Position of a character, if it belongs to the alphabet.
    pub fn index_of(&self, ch: char) -> Option<usize> {
        self.index.get(&ch).copied()
    }

    /// The characters in order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Step one position along the alphabet with circular wrap. Characters
    /// outside the alphabet are returned unchanged.
    pub fn step(&self, ch: char, direction: StepDirection) -> char {
        let Some(i) = self.index_of(ch) else {
            return ch;
        };
        let n = self.chars.len();
        let j = match direction {
            StepDirection::Predecessor => (i + n - 1) % n,
            StepDirection::Successor => (i + 1) % n,
        };
        self.chars[j]
    }
}

impl From<Vec<char>> for Alphabet {
    fn from(chars: Vec<char>) -> Self {
        Self::new(chars)
    }
}

impl From<Alphabet> for Vec<char> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.chars
    }
}

/// One candidate solution: a `width x height` grid of alphabet characters
/// plus its fitness, which is `None` until the engine evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Row-major cells, exactly `width * height` characters.
    pub cells: Vec<char>,
    /// Mean per-block similarity, set by the evaluation step.
    pub fitness: Option<f32>,
}

impl Chromosome {
    /// Create a chromosome from row-major cells.
    pub fn new(width: usize, height: usize, cells: Vec<char>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
            fitness: None,
        }
    }

    /// Character at cell `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> char {
        self.cells[y * self.width + x]
    }

    /// Set the character at cell `(x, y)`.
    pub fn set_cell(&mut self, x: usize, y: usize, ch: char) {
        self.cells[y * self.width + x] = ch;
    }

    /// Fitness if evaluated, panicking otherwise. Selection only runs after
    /// the engine's evaluation step, so a missing fitness is a logic error.
    pub fn evaluated_fitness(&self) -> f32 {
        self.fitness
            .expect("chromosome fitness read before evaluation")
    }

    /// The grid as one string per row, for text output.
    pub fn render_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }
}
