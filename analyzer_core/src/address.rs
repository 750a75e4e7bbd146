use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::InputError;

lazy_static! {
    static ref ADDRESS_RE: Regex = Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap();
}

/// Lowercase `0x`-prefixed 20-byte hex address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn is_valid(candidate: &str) -> bool {
        ADDRESS_RE.is_match(candidate)
    }

    pub fn parse(candidate: &str) -> Result<Self, InputError> {
        let trimmed = candidate.trim();
        if Self::is_valid(trimmed) {
            Ok(Self(trimmed.to_lowercase()))
        } else {
            Err(InputError::InvalidAddress(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex digits without the `0x` marker
    pub fn hex_digits(&self) -> &str {
        &self.0[2..]
    }

    /// `0x12345678...abcd`
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..10], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of splitting raw input into usable and rejected addresses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddressValidation {
    pub valid: Vec<Address>,
    pub invalid: Vec<String>,
}

impl AddressValidation {
    pub fn has_invalid(&self) -> bool {
        !self.invalid.is_empty()
    }

    /// Counts for display; `total` is the size of the raw input
    pub fn summary(&self, total: usize) -> ValidationSummary {
        ValidationSummary {
            total,
            valid_count: self.valid.len(),
            invalid_count: self.invalid.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// Trim, drop blanks, lowercase and deduplicate valid entries; deduplicate rejects.
///
/// Both lists keep first-seen order.
pub fn validate_addresses<I, S>(addresses: I) -> AddressValidation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = AddressValidation::default();
    let mut seen_valid = HashSet::new();
    let mut seen_invalid = HashSet::new();

    for raw in addresses {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }

        match Address::parse(trimmed) {
            Ok(address) => {
                if seen_valid.insert(address.clone()) {
                    result.valid.push(address);
                }
            }
            Err(_) => {
                if seen_invalid.insert(trimmed.to_string()) {
                    result.invalid.push(trimmed.to_string());
                }
            }
        }
    }

    result
}

/// Strings of a JSON array; `None` for anything else. Nulls are skipped and
/// other scalars stringified, so they fail validation instead of vanishing.
pub fn json_string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
    )
}

/// Validate an untyped JSON payload. Anything but an array yields two empty lists.
pub fn validate_json(value: &Value) -> AddressValidation {
    match json_string_list(value) {
        Some(strings) => validate_addresses(strings),
        None => AddressValidation::default(),
    }
}

/// Split newline separated input into trimmed, lowercased, non-empty lines
pub fn parse_address_input(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_lowercase)
        .collect()
}
