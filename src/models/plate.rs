//! # License Plate Assembly

//! Indonesian plates are entered as three parts: a region letter prefix, a numeric body and a letter suffix.
//! Parts are sanitized the way the check-in form does it and joined with single spaces.

use std::fmt;
use crate::errors::{DockQueueError, DockQueueResult};

/// A license plate split into its three parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicensePlate {
    pub prefix: String,
    pub number: String,
    pub suffix: String,
}

impl LicensePlate {
    pub const MAX_PREFIX: usize = 4;
    pub const MAX_NUMBER: usize = 4;
    pub const MAX_SUFFIX: usize = 5;

    /// Builds a plate from raw input, upper-casing letters and dropping characters that do not belong in each part
    ///
    /// # Returns
    ///
    /// * `Ok(LicensePlate)` when every part fits its length limit
    /// * `Err(DockQueueError::ValidationError)` naming the part that is too long
    pub fn new(prefix: &str, number: &str, suffix: &str) -> DockQueueResult<Self> {
        let prefix = letters_only(prefix);
        let number: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        let suffix = letters_only(suffix);

        check_len("prefix", &prefix, Self::MAX_PREFIX)?;
        check_len("number", &number, Self::MAX_NUMBER)?;
        check_len("suffix", &suffix, Self::MAX_SUFFIX)?;

        Ok(Self { prefix, number, suffix })
    }

    /// Splits an assembled plate back into its parts. Everything after the number is treated as suffix.
    pub fn parse(plate: &str) -> Self {
        let mut parts = plate.split_whitespace();
        let prefix = parts.next().unwrap_or_default().to_string();
        let number = parts.next().unwrap_or_default().to_string();
        let suffix = parts.collect::<String>();
        Self { prefix, number, suffix }
    }

    /// Prefix and number are mandatory at check-in; the suffix is optional
    pub fn is_complete(&self) -> bool {
        !self.prefix.is_empty() && !self.number.is_empty()
    }

    /// `B 1234 XYZ`, or `B 1234` when the suffix is empty
    pub fn assemble(&self) -> String {
        [self.prefix.as_str(), self.number.as_str(), self.suffix.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.assemble())
    }
}

fn letters_only(raw: &str) -> String {
    raw.to_uppercase().chars().filter(|c| c.is_ascii_uppercase()).collect()
}

fn check_len(part: &str, value: &str, max: usize) -> DockQueueResult<()> {
    if value.len() > max {
        return Err(DockQueueError::ValidationError(format!(
            "plate {} '{}' exceeds {} characters",
            part, value, max
        )));
    }
    Ok(())
}
