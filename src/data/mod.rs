//! Core data models for the trophy pipeline
//!
//! This module contains the normalized types produced by the scraper, stored by
//! the cache, and consumed by analytics and export.

pub mod profile;
pub mod rarity;

pub use profile::{IdError, ProfileId};
pub use rarity::{RarityThresholds, RarityTier};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trophy grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrophyType {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl TrophyType {
    /// All grades, lowest first
    pub const ALL: [TrophyType; 4] = [
        TrophyType::Bronze,
        TrophyType::Silver,
        TrophyType::Gold,
        TrophyType::Platinum,
    ];

    /// Parses the grade name PSNProfiles puts in the grade icon's title
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bronze" => Some(TrophyType::Bronze),
            "silver" => Some(TrophyType::Silver),
            "gold" => Some(TrophyType::Gold),
            "platinum" => Some(TrophyType::Platinum),
            _ => None,
        }
    }

    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            TrophyType::Bronze => "Bronze",
            TrophyType::Silver => "Silver",
            TrophyType::Gold => "Gold",
            TrophyType::Platinum => "Platinum",
        }
    }
}

/// One earned trophy from the profile's trophy log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrophyRecord {
    /// Trophy name
    pub name: String,
    /// Trophy description (may be empty)
    pub description: String,
    /// Title of the game the trophy belongs to
    pub game: String,
    /// Grade of the trophy
    pub trophy_type: TrophyType,
    /// Percentage of players owning the trophy (0-100)
    ///
    /// `None` when the upstream shows no figure (`N/A`), which happens for
    /// trophies too new to have statistics.
    pub rarity_percent: Option<f64>,
    /// Tier derived from `rarity_percent`
    pub rarity_tier: Option<RarityTier>,
    /// When the trophy was earned, in the upstream's local time
    ///
    /// `None` for trophies the upstream lists without a date.
    pub earned_at: Option<NaiveDateTime>,
    /// Trophy icon, if the row carried one
    pub icon_url: Option<String>,
}

/// Trophy totals shown in the profile's user bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrophyTotals {
    pub total: u32,
    pub platinum: u32,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

/// Header information from a profile page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Username as displayed by the upstream
    pub username: String,
    /// Avatar image URL, if present
    pub avatar_url: Option<String>,
    /// Trophy counts by grade
    pub totals: TrophyTotals,
    /// Free-form profile statistics (label to value), e.g. "Games Played"
    pub stats: BTreeMap<String, String>,
}

/// Everything scraped for one profile
///
/// Records keep the upstream order (most recently earned first). Aggregates
/// are computed on demand by [`crate::analytics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrophyDataset {
    /// Profile header data
    pub summary: ProfileSummary,
    /// Earned trophies
    pub records: Vec<TrophyRecord>,
}

impl TrophyDataset {
    /// Number of trophy records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no trophy records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that carry an earned timestamp
    pub fn dated(&self) -> impl Iterator<Item = (&TrophyRecord, NaiveDateTime)> {
        self.records
            .iter()
            .filter_map(|r| r.earned_at.map(|at| (r, at)))
    }
}
