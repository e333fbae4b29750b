// Copyright (c) 2025 - Cowboy AI, Inc.
//! Log Retention Classes
//!
//! Log destinations only accept an enumerated set of retention periods.
//! [`RetentionClass::resolve`] maps any requested day count onto that set by
//! rounding down, with a floor at the shortest supported period.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported log retention period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionClass {
    OneDay,
    ThreeDays,
    FiveDays,
    OneWeek,
    TwoWeeks,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    FourMonths,
    FiveMonths,
    SixMonths,
    OneYear,
    ThirteenMonths,
    EighteenMonths,
    TwoYears,
    FiveYears,
    TenYears,
}

impl RetentionClass {
    /// All classes in ascending order of days
    pub const ALL: [RetentionClass; 17] = [
        Self::OneDay,
        Self::ThreeDays,
        Self::FiveDays,
        Self::OneWeek,
        Self::TwoWeeks,
        Self::OneMonth,
        Self::TwoMonths,
        Self::ThreeMonths,
        Self::FourMonths,
        Self::FiveMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::ThirteenMonths,
        Self::EighteenMonths,
        Self::TwoYears,
        Self::FiveYears,
        Self::TenYears,
    ];

    /// Day count of this class
    pub fn days(&self) -> u32 {
        match self {
            Self::OneDay => 1,
            Self::ThreeDays => 3,
            Self::FiveDays => 5,
            Self::OneWeek => 7,
            Self::TwoWeeks => 14,
            Self::OneMonth => 30,
            Self::TwoMonths => 60,
            Self::ThreeMonths => 90,
            Self::FourMonths => 120,
            Self::FiveMonths => 150,
            Self::SixMonths => 180,
            Self::OneYear => 365,
            Self::ThirteenMonths => 400,
            Self::EighteenMonths => 545,
            Self::TwoYears => 731,
            Self::FiveYears => 1827,
            Self::TenYears => 3653,
        }
    }

    /// Shortest supported class
    pub fn minimum() -> Self {
        Self::OneDay
    }

    /// Resolve a requested day count to a supported class
    ///
    /// Returns the exact class when one exists, otherwise the largest class
    /// not exceeding the request. Requests below the minimum resolve to the
    /// minimum. Never fails.
    pub fn resolve(requested_days: u32) -> Self {
        Self::ALL
            .iter()
            .rev()
            .find(|class| class.days() <= requested_days)
            .copied()
            .unwrap_or_else(Self::minimum)
    }
}

impl fmt::Display for RetentionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}
