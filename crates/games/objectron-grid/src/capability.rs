//! Which interactions apply to which occupants.
//!
//! Effects never inspect what an occupant is; they ask the capability table
//! and silently do nothing when the capability is missing.

use objectron_core::game_trait::{ItemId, PlayerId};
use serde::{Deserialize, Serialize};

/// Something that can enter a cell and be acted upon by effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Player(PlayerId),
    /// An identity disk in flight.
    Disk(ItemId),
}

/// Interaction categories an effect may need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Can be moved by a teleporter.
    Teleportable,
    /// Can lose actions to explosions, disk hits and power failures.
    LosesActions,
    /// Is defeated when a force field switches on around it.
    ForceFieldVulnerable,
}

const PLAYER_CAPABILITIES: &[Capability] = &[
    Capability::Teleportable,
    Capability::LosesActions,
    Capability::ForceFieldVulnerable,
];

const DISK_CAPABILITIES: &[Capability] = &[Capability::Teleportable];

impl Occupant {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Occupant::Player(_) => PLAYER_CAPABILITIES,
            Occupant::Disk(_) => DISK_CAPABILITIES,
        }
    }

    pub fn supports(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Handle for effects that take actions away, `None` if not applicable.
    pub fn as_action_loser(self) -> Option<PlayerId> {
        match self {
            Occupant::Player(id) if self.supports(Capability::LosesActions) => Some(id),
            _ => None,
        }
    }

    /// Handle for force field checks, `None` if not applicable.
    pub fn as_force_field_vulnerable(self) -> Option<PlayerId> {
        match self {
            Occupant::Player(id) if self.supports(Capability::ForceFieldVulnerable) => Some(id),
            _ => None,
        }
    }

    /// Whether a teleporter may move this occupant.
    pub fn is_teleportable(self) -> bool {
        self.supports(Capability::Teleportable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_support_everything() {
        let player = Occupant::Player(1);
        assert!(player.is_teleportable());
        assert_eq!(player.as_action_loser(), Some(1));
        assert_eq!(player.as_force_field_vulnerable(), Some(1));
    }

    #[test]
    fn disks_only_teleport() {
        let disk = Occupant::Disk(4);
        assert!(disk.is_teleportable());
        assert_eq!(disk.as_action_loser(), None);
        assert_eq!(disk.as_force_field_vulnerable(), None);
    }
}
