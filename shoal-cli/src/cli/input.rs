//! Line-oriented input formats accepted by the CLI.
//!
//! Both formats are whitespace separated. Blank lines and lines starting
//! with `#` are skipped.

use std::{
    collections::{HashMap, HashSet},
    io::{self, BufRead},
    str::FromStr,
};

use shoal_core::{IdSetIndex, IdentifiableIdSet, ScoredElement};
use thiserror::Error;

/// Errors raised while parsing an input file.
#[derive(Debug, Error)]
pub enum InputError {
    /// Reading from the underlying source failed.
    #[error("failed to read input: {source}")]
    Read {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A required column was absent.
    #[error("line {line}: missing {field}")]
    MissingField {
        /// One-based line number.
        line: usize,
        /// Name of the missing column.
        field: &'static str,
    },
    /// A column could not be parsed as a number.
    #[error("line {line}: invalid {field} `{raw}`")]
    InvalidNumber {
        /// One-based line number.
        line: usize,
        /// Name of the malformed column.
        field: &'static str,
        /// Raw column text.
        raw: String,
    },
    /// A score row carried more than three columns.
    #[error("line {line}: unexpected trailing column `{raw}`")]
    TrailingField {
        /// One-based line number.
        line: usize,
        /// First unexpected column.
        raw: String,
    },
    /// The same identifier appeared on two rows.
    #[error("line {line}: duplicate id {id}")]
    DuplicateId {
        /// One-based line number of the second occurrence.
        line: usize,
        /// Repeated identifier.
        id: u64,
    },
}

/// Scores parsed from an `id score [weight]` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredInput {
    /// Elements in file order.
    pub elements: Vec<ScoredElement>,
    /// Optional per-id weights; absent ids weigh one.
    pub weights: HashMap<u64, u64>,
}

impl ScoredInput {
    /// Returns the weight of `id`.
    #[must_use]
    pub fn weight(&self, id: u64) -> u64 {
        self.weights.get(&id).copied().unwrap_or(1)
    }
}

/// Parses `id score [weight]` rows.
///
/// # Errors
/// Returns [`InputError`] when a row is malformed or an id repeats.
///
/// # Examples
/// ```
/// use shoal_cli::cli::read_scored_elements;
///
/// let input = read_scored_elements("# ranked\n1 0.9\n2 0.4 3\n".as_bytes())?;
/// assert_eq!(input.elements.len(), 2);
/// assert_eq!(input.weight(1), 1);
/// assert_eq!(input.weight(2), 3);
/// # Ok::<(), shoal_cli::cli::InputError>(())
/// ```
pub fn read_scored_elements(reader: impl BufRead) -> Result<ScoredInput, InputError> {
    let mut input = ScoredInput::default();
    let mut seen = HashSet::new();
    for row in rows(reader) {
        let (line, text) = row?;
        let mut columns = text.split_whitespace();
        let id: u64 = column(&mut columns, line, "id")?;
        let score: f64 = column(&mut columns, line, "score")?;
        if !score.is_finite() {
            return Err(InputError::InvalidNumber {
                line,
                field: "score",
                raw: score.to_string(),
            });
        }
        if let Some(raw) = columns.next() {
            input.weights.insert(id, number(raw, line, "weight")?);
        }
        if let Some(raw) = columns.next() {
            return Err(InputError::TrailingField {
                line,
                raw: raw.to_owned(),
            });
        }
        if !seen.insert(id) {
            return Err(InputError::DuplicateId { line, id });
        }
        input.elements.push(ScoredElement::new(id, score));
    }
    Ok(input)
}

/// Parses `id member member...` rows into an index.
///
/// A row with only an id describes an empty set.
///
/// # Errors
/// Returns [`InputError`] when a row is malformed or an id repeats.
///
/// # Examples
/// ```
/// use shoal_cli::cli::read_id_sets;
///
/// let index = read_id_sets("1 1 2 3\n2 3 2\n3\n".as_bytes())?;
/// assert_eq!(index.len(), 3);
/// assert_eq!(index.get(2).map(|set| set.members()), Some(&[2, 3][..]));
/// # Ok::<(), shoal_cli::cli::InputError>(())
/// ```
pub fn read_id_sets(reader: impl BufRead) -> Result<IdSetIndex, InputError> {
    let mut index = IdSetIndex::new();
    for row in rows(reader) {
        let (line, text) = row?;
        let mut columns = text.split_whitespace();
        let id: u64 = column(&mut columns, line, "id")?;
        let members = columns
            .map(|raw| number(raw, line, "member"))
            .collect::<Result<Vec<u64>, _>>()?;
        if index.insert(IdentifiableIdSet::new(id, members)).is_some() {
            return Err(InputError::DuplicateId { line, id });
        }
    }
    Ok(index)
}

/// Yields non-blank, non-comment rows with one-based line numbers.
fn rows(reader: impl BufRead) -> impl Iterator<Item = Result<(usize, String), InputError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(offset, line)| match line {
            Ok(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('#'))
                    .then(|| Ok((offset + 1, trimmed.to_owned())))
            }
            Err(source) => Some(Err(InputError::Read { source })),
        })
}

fn column<'a, T: FromStr>(
    columns: &mut impl Iterator<Item = &'a str>,
    line: usize,
    field: &'static str,
) -> Result<T, InputError> {
    let raw = columns
        .next()
        .ok_or(InputError::MissingField { line, field })?;
    number(raw, line, field)
}

fn number<T: FromStr>(raw: &str, line: usize, field: &'static str) -> Result<T, InputError> {
    raw.parse().map_err(|_| InputError::InvalidNumber {
        line,
        field,
        raw: raw.to_owned(),
    })
}
