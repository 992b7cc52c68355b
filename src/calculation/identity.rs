//! Identity resolution for raw punch identifiers.
//!
//! Biometric exports identify people by AC-No, sometimes zero-padded,
//! sometimes with separators, and occasionally by a typed name. Resolution
//! is an ordered chain of matchers evaluated short-circuit:
//!
//! 1. exact id match (emp id, emp no, AC-No, alternate ids)
//! 2. digit-normalized match (digits only, leading zeros trimmed)
//! 3. normalized-name match
//!
//! When two employees produce the same key, the first one in roster order
//! keeps it. Collisions are counted but never resolved automatically.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Employee;

/// The matcher that resolved an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Identifier equals a stored id verbatim (after trimming).
    Exact,
    /// Identifier's digits equal a stored id's digits.
    DigitNormalized,
    /// Identifier normalizes to an employee's name.
    NormalizedName,
}

/// A resolved identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Canonical employee id.
    pub employee_id: String,
    /// Which matcher succeeded.
    pub rule: MatchRule,
}

const NAME_SUFFIXES: [&str; 5] = ["jr", "sr", "ii", "iii", "iv"];

/// Normalizes a person's name for matching.
///
/// Lowercases, turns `Last, First` into `First Last`, drops generational
/// suffixes and punctuation, and collapses whitespace.
///
/// # Examples
///
/// ```
/// use dtr_payroll::calculation::normalize_name;
///
/// assert_eq!(normalize_name("DELA CRUZ, Juan Jr."), "juan dela cruz");
/// assert_eq!(normalize_name("  Juan   Dela-Cruz III "), "juan dela cruz");
/// ```
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let reordered = match lowered.split_once(',') {
        Some((last, rest)) => format!("{rest} {last}"),
        None => lowered,
    };

    let cleaned: String = reordered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !NAME_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduces an identifier to its digits with leading zeros trimmed.
///
/// Returns `None` when the identifier has no digits at all.
///
/// ```
/// use dtr_payroll::calculation::digit_key;
///
/// assert_eq!(digit_key("00-0123").as_deref(), Some("123"));
/// assert_eq!(digit_key("000").as_deref(), Some("0"));
/// assert_eq!(digit_key("abc"), None);
/// ```
pub fn digit_key(identifier: &str) -> Option<String> {
    let digits: String = identifier.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

/// Lookup tables built once per roster snapshot.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    exact: HashMap<String, String>,
    digits: HashMap<String, String>,
    names: HashMap<String, String>,
    collisions: usize,
}

impl IdentityIndex {
    /// Indexes every candidate key of every employee, in roster order.
    pub fn build(roster: &[Employee]) -> Self {
        let mut index = IdentityIndex::default();

        for employee in roster {
            let id_candidates = std::iter::once(employee.emp_id.as_str())
                .chain(employee.emp_no.as_deref())
                .chain(employee.ac_no.as_deref())
                .chain(employee.alternate_emp_ids.iter().map(String::as_str));

            for candidate in id_candidates {
                let candidate = candidate.trim();
                if candidate.is_empty() {
                    continue;
                }
                index.insert(Table::Exact, candidate.to_string(), &employee.emp_id);
                if let Some(key) = digit_key(candidate) {
                    index.insert(Table::Digits, key, &employee.emp_id);
                }
            }

            let name_candidates =
                std::iter::once(employee.name.as_str()).chain(employee.normalized_name.as_deref());
            for name in name_candidates {
                let key = normalize_name(name);
                if !key.is_empty() {
                    index.insert(Table::Names, key, &employee.emp_id);
                }
            }
        }

        index
    }

    fn insert(&mut self, table: Table, key: String, employee_id: &str) {
        let map = match table {
            Table::Exact => &mut self.exact,
            Table::Digits => &mut self.digits,
            Table::Names => &mut self.names,
        };
        let collided = match map.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(employee_id.to_string());
                false
            }
            Entry::Occupied(slot) if slot.get() != employee_id => {
                debug!(
                    key = %slot.key(),
                    kept = %slot.get(),
                    dropped = %employee_id,
                    table = ?table,
                    "Identity key collision, keeping first indexed employee"
                );
                true
            }
            Entry::Occupied(_) => false,
        };
        if collided {
            self.collisions += 1;
        }
    }

    /// Number of keys claimed by more than one employee.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Runs the matcher chain over a raw identifier.
    pub fn resolve(&self, identifier_raw: &str) -> Option<Resolution> {
        MATCHERS.iter().find_map(|(rule, matcher)| {
            matcher(self, identifier_raw).map(|employee_id| Resolution {
                employee_id: employee_id.to_string(),
                rule: *rule,
            })
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Exact,
    Digits,
    Names,
}

type Matcher = for<'a> fn(&'a IdentityIndex, &str) -> Option<&'a str>;

const MATCHERS: [(MatchRule, Matcher); 3] = [
    (MatchRule::Exact, match_exact),
    (MatchRule::DigitNormalized, match_digits),
    (MatchRule::NormalizedName, match_name),
];

/// Matches an identifier verbatim (after trimming) against stored ids.
pub fn match_exact<'a>(index: &'a IdentityIndex, identifier_raw: &str) -> Option<&'a str> {
    index.exact.get(identifier_raw.trim()).map(String::as_str)
}

/// Matches an identifier's digits against stored ids' digits.
pub fn match_digits<'a>(index: &'a IdentityIndex, identifier_raw: &str) -> Option<&'a str> {
    let key = digit_key(identifier_raw)?;
    index.digits.get(&key).map(String::as_str)
}

/// Matches an identifier as a person's name.
pub fn match_name<'a>(index: &'a IdentityIndex, identifier_raw: &str) -> Option<&'a str> {
    let key = normalize_name(identifier_raw);
    if key.is_empty() {
        return None;
    }
    index.names.get(&key).map(String::as_str)
}
