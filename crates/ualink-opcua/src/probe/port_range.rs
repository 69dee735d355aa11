// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Port ranges for endpoint sweeps.
//!
//! Ranges are written as `;` or `,` separated entries, each a single port or
//! a `lower-upper` pair. `*` stands for the lowest or highest port:
//!
//! ```
//! use ualink_opcua::probe::PortRange;
//!
//! let ranges = PortRange::parse("4840-4841; 50000, 4841-4845").unwrap();
//! assert_eq!(PortRange::format(&ranges), "4840-4845;50000");
//!
//! let all = PortRange::parse("*").unwrap();
//! assert_eq!(all, PortRange::all());
//! ```

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::ConfigurationError;

/// An inclusive range of TCP ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRange {
    lower: u16,
    upper: u16,
}

impl PortRange {
    /// Creates a range; the bounds may be given in either order.
    pub fn new(lower: u16, upper: u16) -> Self {
        Self {
            lower: lower.min(upper),
            upper: lower.max(upper),
        }
    }

    /// Creates a range holding a single port.
    pub fn single(port: u16) -> Self {
        Self::new(port, port)
    }

    /// Returns the lowest port.
    #[inline]
    pub fn lower(&self) -> u16 {
        self.lower
    }

    /// Returns the highest port.
    #[inline]
    pub fn upper(&self) -> u16 {
        self.upper
    }

    /// Returns the number of ports in the range.
    #[inline]
    pub fn count(&self) -> u32 {
        u32::from(self.upper) - u32::from(self.lower) + 1
    }

    /// Returns `true` if `port` lies in the range.
    #[inline]
    pub fn contains(&self, port: u16) -> bool {
        (self.lower..=self.upper).contains(&port)
    }

    /// Returns `true` if the ranges share at least one port.
    pub fn overlaps(&self, other: &PortRange) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }

    /// Returns every endpoint of `address` in the range.
    pub fn endpoints(&self, address: IpAddr) -> impl Iterator<Item = SocketAddr> {
        (self.lower..=self.upper).map(move |port| SocketAddr::new(address, port))
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// The IANA assigned OPC UA ports.
    pub fn opc_ua() -> Vec<PortRange> {
        vec![Self::new(4840, 4841)]
    }

    /// Ports commonly used by OPC UA server products.
    pub fn well_known() -> Vec<PortRange> {
        vec![
            Self::new(4840, 4841),
            Self::new(48000, 48100),
            Self::single(49320),
            Self::single(50000),
            Self::new(51200, 51300),
            Self::single(62222),
        ]
    }

    /// Every port.
    pub fn all() -> Vec<PortRange> {
        vec![Self::new(u16::MIN, u16::MAX)]
    }

    // =========================================================================
    // Parsing and formatting
    // =========================================================================

    /// Parses range text and merges the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPortRange`] for entries with more
    /// than two bounds, bounds that are not ports, or a lower bound above the
    /// upper bound.
    pub fn parse(text: &str) -> Result<Vec<PortRange>, ConfigurationError> {
        let mut ranges = Vec::new();
        for entry in text.split([';', ',']).map(str::trim).filter(|s| !s.is_empty()) {
            ranges.push(entry.parse()?);
        }
        Ok(Self::merge(ranges))
    }

    /// Sorts ranges and collapses overlapping or adjacent ones.
    pub fn merge(ranges: impl IntoIterator<Item = PortRange>) -> Vec<PortRange> {
        let mut sorted: Vec<PortRange> = ranges.into_iter().collect();
        sorted.sort();

        let mut merged: Vec<PortRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(top) if u32::from(range.lower) <= u32::from(top.upper) + 1 => {
                    top.upper = top.upper.max(range.upper);
                }
                _ => merged.push(range),
            }
        }
        merged
    }

    /// Formats ranges as `;` separated text.
    pub fn format(ranges: &[PortRange]) -> String {
        ranges
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Returns the total number of ports in `ranges`.
    pub fn total(ranges: &[PortRange]) -> u64 {
        ranges.iter().map(|r| u64::from(r.count())).sum()
    }
}

impl FromStr for PortRange {
    type Err = ConfigurationError;

    /// Parses a single `port`, `lower-upper` or `*` entry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigurationError::invalid_port_range(s, reason);

        let mut bounds = s.split('-').map(str::trim);
        let lower = bounds.next().unwrap_or_default();
        let upper = bounds.next().unwrap_or(lower);
        if bounds.next().is_some() {
            return Err(invalid("Bad range format"));
        }

        let parse_bound = |text: &str, wildcard: u16| -> Result<u16, ConfigurationError> {
            if text == "*" {
                return Ok(wildcard);
            }
            text.parse::<u16>()
                .map_err(|_| invalid("Port numbers are out of the range"))
        };

        let lower = parse_bound(lower, u16::MIN)?;
        let upper = parse_bound(upper, u16::MAX)?;
        if lower > upper {
            return Err(invalid("Lower bound above upper bound"));
        }
        Ok(Self { lower, upper })
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lower == self.upper {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "{}-{}", self.lower, self.upper)
        }
    }
}
