//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through a publish run.
//! Each type validates its input so that downstream path building and
//! product id derivation can rely on well-formed values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Well label on an instrument plate, e.g. `A01` or `A1`
///
/// Instruments report labels zero-padded (`A01`) while the registry often
/// stores them unpadded (`A1`). Equality and hashing use the normalized
/// form so the two spellings compare equal.
///
/// # Examples
///
/// ```
/// use seqferry::domain::ids::WellLabel;
/// use std::str::FromStr;
///
/// let well = WellLabel::from_str("A01").unwrap();
/// assert_eq!(well.normalized(), "A1");
/// assert_eq!(well.padded(), "A01");
/// assert_eq!(well, WellLabel::from_str("A1").unwrap());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellLabel {
    row: String,
    column: u32,
}

impl WellLabel {
    /// Creates a new WellLabel from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(WellLabel)` for a label of one or more letters followed by
    /// digits, `Err` otherwise
    pub fn new(label: impl AsRef<str>) -> Result<Self, String> {
        let label = label.as_ref().trim();
        let split = label
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| format!("Invalid well label '{label}': missing column number"))?;
        let (row, column) = label.split_at(split);

        if row.is_empty() || !row.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid well label '{label}': missing row letter"));
        }
        let column: u32 = column
            .parse()
            .map_err(|_| format!("Invalid well label '{label}': bad column number"))?;
        if column == 0 {
            return Err(format!("Invalid well label '{label}': column must be > 0"));
        }

        Ok(Self {
            row: row.to_ascii_uppercase(),
            column,
        })
    }

    /// Label without zero padding (`A1`)
    pub fn normalized(&self) -> String {
        format!("{}{}", self.row, self.column)
    }

    /// Label zero-padded to two digits (`A01`)
    pub fn padded(&self) -> String {
        format!("{}{:02}", self.row, self.column)
    }
}

impl PartialEq for WellLabel {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.column == other.column
    }
}

impl Eq for WellLabel {}

impl std::hash::Hash for WellLabel {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.row.hash(state);
        self.column.hash(state);
    }
}

impl fmt::Display for WellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

impl FromStr for WellLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Analysis identifier assigned by the secondary analysis pipeline
///
/// Used as a path component in both the marker file name and the
/// destination collection, so path separators are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisId(String);

impl AnalysisId {
    /// Creates a new AnalysisId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Analysis ID cannot be empty".to_string());
        }
        if id.contains('/') || id.contains('\\') || id == "." || id == ".." {
            return Err(format!("Analysis ID '{id}' is not a valid path component"));
        }
        Ok(Self(id))
    }

    /// Returns the analysis ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AnalysisId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AnalysisId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stable product identifier (64 hex characters)
///
/// See [`crate::core::metadata::product_id`] for the derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Wraps an already derived product id
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.len() != 64 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid product id '{id}': expected 64 hex characters"));
        }
        Ok(Self(id))
    }

    /// Wraps a freshly computed hex digest
    pub(crate) fn from_digest(digest: String) -> Self {
        Self(digest)
    }

    /// Returns the product ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
