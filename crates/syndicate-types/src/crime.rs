//! The fixed enumeration of crimes a gang can plan.

use serde::{Deserialize, Serialize};

/// A crime a gang can target during a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CrimeType {
    /// Robbing a bank vault.
    BankRobbery,
    /// Robbing a jewelry store.
    JewelryRobbery,
    /// Moving narcotics.
    DrugTrafficking,
    /// Stealing artwork from a gallery or collector.
    ArtworkRobbery,
    /// Abducting a person for ransom.
    Kidnapping,
    /// Extorting a target with compromising material.
    Blackmailing,
    /// Moving illegal weapons.
    ArmTrafficking,
}

impl CrimeType {
    /// Every crime type, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::BankRobbery,
        Self::JewelryRobbery,
        Self::DrugTrafficking,
        Self::ArtworkRobbery,
        Self::Kidnapping,
        Self::Blackmailing,
        Self::ArmTrafficking,
    ];

    /// Human-readable name used in logs and the dashboard.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BankRobbery => "Bank Robbery",
            Self::JewelryRobbery => "Jewelry Robbery",
            Self::DrugTrafficking => "Drug Trafficking",
            Self::ArtworkRobbery => "Artwork Robbery",
            Self::Kidnapping => "Kidnapping",
            Self::Blackmailing => "Blackmailing",
            Self::ArmTrafficking => "Arm Trafficking",
        }
    }

    /// Crimes that police escalate in their logs when a reliable,
    /// high-suspicion report names them.
    pub const fn is_high_risk(self) -> bool {
        matches!(
            self,
            Self::Kidnapping | Self::BankRobbery | Self::ArmTrafficking
        )
    }
}

impl core::fmt::Display for CrimeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.label())
    }
}
