//! Natural sort order for document and folder names.
//!
//! Names are split into alternating text and digit runs. Digit runs compare
//! as integers, text runs compare case-insensitively, so `"2_intro"` sorts
//! before `"10_setup"`.

use std::cmp::Ordering;

/// A single run of a name, as used in a [`NaturalKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk {
    /// Lower-cased non-digit run.
    Text(String),
    /// Digit run with leading zeros stripped.
    Number(String),
}

impl Ord for Chunk {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            // Compared without parsing so arbitrarily long runs never overflow
            (Self::Number(a), Self::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Chunk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Composite sort key for natural ordering.
///
/// Always starts with a (possibly empty) text chunk, then alternates, so two
/// keys never compare a text run against a digit run at the same position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Chunk>);

impl NaturalKey {
    /// Build the natural sort key for a name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut chunks = Vec::new();
        let mut text = String::new();
        let mut digits = String::new();

        for c in name.chars() {
            if c.is_ascii_digit() {
                if digits.is_empty() {
                    chunks.push(Chunk::Text(std::mem::take(&mut text).to_lowercase()));
                }
                digits.push(c);
            } else {
                if !digits.is_empty() {
                    chunks.push(number_chunk(&std::mem::take(&mut digits)));
                }
                text.push(c);
            }
        }

        if digits.is_empty() {
            chunks.push(Chunk::Text(text.to_lowercase()));
        } else {
            chunks.push(number_chunk(&digits));
            chunks.push(Chunk::Text(String::new()));
        }

        Self(chunks)
    }
}

fn number_chunk(digits: &str) -> Chunk {
    let trimmed = digits.trim_start_matches('0');
    Chunk::Number(trimmed.to_owned())
}

/// Sort names in natural order, ascending.
///
/// The sort is stable: names with equal keys (e.g. `"A"` and `"a"`) keep their
/// relative input order.
///
/// # Examples
///
/// ```
/// use etoc_site::natural_sort;
///
/// let sorted = natural_sort(["10_setup", "2_intro", "1_start"]);
/// assert_eq!(sorted, ["1_start", "2_intro", "10_setup"]);
/// ```
pub fn natural_sort<I, S>(names: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<S> = names.into_iter().collect();
    names.sort_by_cached_key(|name| NaturalKey::new(name.as_ref()));
    names
}
