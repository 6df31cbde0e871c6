use objectron_core::game_trait::ItemId;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// A fixed pad that sends whoever enters it to its destination teleporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teleporter {
    destination: Option<ItemId>,
    skip_next_teleport: bool,
}

impl Teleporter {
    pub fn new(destination: Option<ItemId>) -> Self {
        Self {
            destination,
            skip_next_teleport: false,
        }
    }

    pub fn destination(&self) -> Option<ItemId> {
        self.destination
    }

    /// Bind the destination. Allowed once, and only if none was given at
    /// construction.
    pub fn set_destination(&mut self, destination: ItemId) -> Result<(), GameError> {
        if self.destination.is_some() {
            return Err(GameError::illegal("teleporter destination is already set"));
        }
        self.destination = Some(destination);
        Ok(())
    }

    /// Mark that the next arrival here came from a linked teleporter and must
    /// not bounce straight back.
    pub fn skip_next(&mut self) {
        self.skip_next_teleport = true;
    }

    pub fn is_skipping(&self) -> bool {
        self.skip_next_teleport
    }

    /// Consume the skip flag. Returns `true` if the hop must be skipped.
    pub fn take_skip(&mut self) -> bool {
        std::mem::take(&mut self.skip_next_teleport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_binds_once() {
        let mut teleporter = Teleporter::new(None);
        teleporter.set_destination(7).unwrap();
        assert_eq!(teleporter.destination(), Some(7));
        assert!(matches!(
            teleporter.set_destination(8),
            Err(GameError::IllegalState(_))
        ));
        assert_eq!(teleporter.destination(), Some(7));
    }

    #[test]
    fn constructed_destination_cannot_be_rebound() {
        let mut teleporter = Teleporter::new(Some(3));
        assert!(teleporter.set_destination(4).is_err());
    }

    #[test]
    fn skip_flag_is_consumed_once() {
        let mut teleporter = Teleporter::new(Some(1));
        assert!(!teleporter.take_skip());
        teleporter.skip_next();
        assert!(teleporter.is_skipping());
        assert!(teleporter.take_skip());
        assert!(!teleporter.take_skip());
    }
}
