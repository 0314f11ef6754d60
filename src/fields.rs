//! Enumerations and field types for task management.
//!
//! This module defines the structured values used to categorise and filter
//! tasks: priority levels and completion status filters.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Priority {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    /// Parse a priority label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{other}', expected low | medium | high")),
        }
    }
}

/// Completion status filter for task lists.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StatusFilter {
    Completed,
    Pending,
}

impl StatusFilter {
    /// Whether a task with the given completion flag passes this filter.
    pub fn matches(self, completed: bool) -> bool {
        match self {
            StatusFilter::Completed => completed,
            StatusFilter::Pending => !completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Completed => "Completed",
            StatusFilter::Pending => "Pending",
        }
    }
}
