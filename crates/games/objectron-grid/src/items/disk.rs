use objectron_core::geometry::Direction;
use serde::{Deserialize, Serialize};

use crate::config::ObjectronConfig;
use crate::error::GameError;

/// Lifecycle of one throw of an identity disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskState {
    Ready,
    InFlight,
    Landed,
}

/// A throwable disk. Charged disks fly until something stops them, uncharged
/// disks have a limited range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDisk {
    charged: bool,
    state: DiskState,
    direction: Option<Direction>,
}

impl IdentityDisk {
    pub fn new(charged: bool) -> Self {
        Self {
            charged,
            state: DiskState::Ready,
            direction: None,
        }
    }

    pub fn is_charged(&self) -> bool {
        self.charged
    }

    pub fn state(&self) -> DiskState {
        self.state
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Maximum number of cells the disk travels, `None` when unlimited.
    pub fn range(&self, config: &ObjectronConfig) -> Option<u32> {
        (!self.charged).then_some(config.uncharged_disk_range)
    }

    /// Aim the disk. Disks only fly horizontally or vertically.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), GameError> {
        if direction.is_diagonal() {
            return Err(GameError::invalid(format!(
                "identity disks cannot be thrown {direction:?}"
            )));
        }
        if self.state != DiskState::Ready {
            return Err(GameError::illegal("identity disk has already been thrown"));
        }
        self.direction = Some(direction);
        Ok(())
    }

    /// Check that the disk could be launched, without launching it.
    pub fn check_launch(&self) -> Result<Direction, GameError> {
        if self.state != DiskState::Ready {
            return Err(GameError::illegal("identity disk has already been thrown"));
        }
        self.direction
            .ok_or_else(|| GameError::illegal("identity disk has no direction"))
    }

    /// READY -> IN-FLIGHT. Returns the direction of flight.
    pub fn launch(&mut self) -> Result<Direction, GameError> {
        let direction = self.check_launch()?;
        self.state = DiskState::InFlight;
        Ok(direction)
    }

    /// IN-FLIGHT -> LANDED.
    pub fn land(&mut self) -> Result<(), GameError> {
        if self.state != DiskState::InFlight {
            return Err(GameError::illegal("identity disk is not in flight"));
        }
        self.state = DiskState::Landed;
        Ok(())
    }

    /// Ready the disk for another throw once a player picks it up.
    pub fn rearm(&mut self) {
        self.state = DiskState::Ready;
        self.direction = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_without_direction_is_illegal() {
        let mut disk = IdentityDisk::new(false);
        assert!(matches!(disk.launch(), Err(GameError::IllegalState(_))));
        assert_eq!(disk.state(), DiskState::Ready);
    }

    #[test]
    fn second_launch_is_illegal() {
        let mut disk = IdentityDisk::new(true);
        disk.set_direction(Direction::East).unwrap();
        assert_eq!(disk.launch().unwrap(), Direction::East);
        assert!(matches!(disk.launch(), Err(GameError::IllegalState(_))));
        disk.land().unwrap();
        assert!(matches!(disk.launch(), Err(GameError::IllegalState(_))));
    }

    #[test]
    fn diagonal_direction_is_rejected() {
        let mut disk = IdentityDisk::new(false);
        assert!(matches!(
            disk.set_direction(Direction::NorthEast),
            Err(GameError::InvalidArgument(_))
        ));
        assert_eq!(disk.direction(), None);
    }

    #[test]
    fn range_depends_on_charge() {
        let config = ObjectronConfig::default();
        assert_eq!(IdentityDisk::new(false).range(&config), Some(4));
        assert_eq!(IdentityDisk::new(true).range(&config), None);
    }

    #[test]
    fn rearm_resets_throw() {
        let mut disk = IdentityDisk::new(false);
        disk.set_direction(Direction::South).unwrap();
        disk.launch().unwrap();
        disk.land().unwrap();
        disk.rearm();
        assert_eq!(disk.state(), DiskState::Ready);
        assert_eq!(disk.direction(), None);
    }
}
