//! Rarity tiers and the threshold table that assigns them
//!
//! PSNProfiles reports rarity as the share of players who own a trophy. The
//! tiers below bucket that percentage; the cut-offs are kept in a
//! `RarityThresholds` value so they can be tuned without touching the parser.

use serde::{Deserialize, Serialize};

/// Rarity bucket for a trophy, rarest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RarityTier {
    UltraRare,
    VeryRare,
    Rare,
    Uncommon,
    Common,
}

impl RarityTier {
    /// All tiers, rarest first
    pub const ALL: [RarityTier; 5] = [
        RarityTier::UltraRare,
        RarityTier::VeryRare,
        RarityTier::Rare,
        RarityTier::Uncommon,
        RarityTier::Common,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RarityTier::UltraRare => "Ultra Rare",
            RarityTier::VeryRare => "Very Rare",
            RarityTier::Rare => "Rare",
            RarityTier::Uncommon => "Uncommon",
            RarityTier::Common => "Common",
        }
    }
}

/// Upper bounds (exclusive) for each tier below Common
///
/// A percentage `p` is UltraRare if `p < ultra_rare`, VeryRare if
/// `p < very_rare`, and so on; anything else is Common. The bounds must be
/// ascending. Every finite value, including those outside [0, 100], lands in
/// exactly one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityThresholds {
    pub ultra_rare: f64,
    pub very_rare: f64,
    pub rare: f64,
    pub uncommon: f64,
}

impl Default for RarityThresholds {
    fn default() -> Self {
        Self {
            ultra_rare: 5.0,
            very_rare: 10.0,
            rare: 20.0,
            uncommon: 50.0,
        }
    }
}

impl RarityThresholds {
    /// Maps a rarity percentage to its tier
    pub fn tier_for(&self, percent: f64) -> RarityTier {
        if percent < self.ultra_rare {
            RarityTier::UltraRare
        } else if percent < self.very_rare {
            RarityTier::VeryRare
        } else if percent < self.rare {
            RarityTier::Rare
        } else if percent < self.uncommon {
            RarityTier::Uncommon
        } else {
            RarityTier::Common
        }
    }

    /// Whether the bounds are strictly ascending
    pub fn is_ordered(&self) -> bool {
        self.ultra_rare < self.very_rare && self.very_rare < self.rare && self.rare < self.uncommon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_and_a_half_percent_is_ultra_rare() {
        let thresholds = RarityThresholds::default();
        assert_eq!(thresholds.tier_for(2.5), RarityTier::UltraRare);
    }

    #[test]
    fn test_boundaries_belong_to_the_commoner_tier() {
        let t = RarityThresholds::default();
        assert_eq!(t.tier_for(0.0), RarityTier::UltraRare);
        assert_eq!(t.tier_for(4.99), RarityTier::UltraRare);
        assert_eq!(t.tier_for(5.0), RarityTier::VeryRare);
        assert_eq!(t.tier_for(10.0), RarityTier::Rare);
        assert_eq!(t.tier_for(20.0), RarityTier::Uncommon);
        assert_eq!(t.tier_for(50.0), RarityTier::Common);
        assert_eq!(t.tier_for(100.0), RarityTier::Common);
    }

    #[test]
    fn test_thresholds_cover_whole_range() {
        let t = RarityThresholds::default();
        // Every tenth of a percent maps somewhere, and tiers never go backwards
        let mut previous = RarityTier::UltraRare;
        for step in 0..=1000 {
            let tier = t.tier_for(step as f64 / 10.0);
            assert!(tier >= previous, "tiers must be monotonic at {step}");
            previous = tier;
        }
        assert_eq!(previous, RarityTier::Common);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = RarityThresholds {
            ultra_rare: 1.0,
            very_rare: 2.0,
            rare: 3.0,
            uncommon: 4.0,
        };
        assert!(t.is_ordered());
        assert_eq!(t.tier_for(2.5), RarityTier::Rare);
        assert_eq!(t.tier_for(4.0), RarityTier::Common);
    }

    #[test]
    fn test_default_thresholds_are_ordered() {
        assert!(RarityThresholds::default().is_ordered());
        let broken = RarityThresholds {
            ultra_rare: 10.0,
            ..Default::default()
        };
        assert!(!broken.is_ordered());
    }

    #[test]
    fn test_tier_labels() {
        let labels: Vec<_> = RarityTier::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            vec!["Ultra Rare", "Very Rare", "Rare", "Uncommon", "Common"]
        );
    }
}
