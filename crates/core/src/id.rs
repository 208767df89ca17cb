//! Strongly-typed identifiers used across the domain.
//!
//! Branch and SKU codes arrive from upstream systems as padded strings; they
//! are trimmed once here and never re-normalized downstream.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a warehouse/store branch (e.g. `"05AY"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchCode(String);

/// Identifier of a stock-keeping unit (e.g. `"A0101-000123"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuNumber(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build a code from raw input, trimming surrounding whitespace.
            ///
            /// Blank input is rejected.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, " must not be blank")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_code_newtype!(BranchCode, "BranchCode");
impl_code_newtype!(SkuNumber, "SkuNumber");

impl BranchCode {
    /// Numeric value of the leading digits within the first two characters
    /// (`"05AY"` → `5`, `"5A"` → `5`).
    ///
    /// Branch codes carry their ordinal in the prefix; `None` when the code
    /// does not start with a digit.
    pub fn numeric_prefix(&self) -> Option<u32> {
        let digits: String = self.0.chars().take(2).take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }
}
