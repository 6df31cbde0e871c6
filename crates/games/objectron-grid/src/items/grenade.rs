use serde::{Deserialize, Serialize};

use crate::config::ObjectronConfig;
use crate::error::GameError;

/// Lifecycle of a light grenade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrenadeState {
    /// Lying around or carried; harmless.
    Inactive,
    /// Armed on a cell; explodes on the next player entering it.
    Active,
    /// Spent.
    Exploded,
}

/// What a grenade needs to know about the cell it is armed on.
#[derive(Debug, Clone, Copy)]
pub struct GrenadeSite {
    pub is_wall: bool,
    pub holds_grenade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightGrenade {
    state: GrenadeState,
    strength_increased: bool,
}

impl Default for LightGrenade {
    fn default() -> Self {
        Self::new()
    }
}

impl LightGrenade {
    pub fn new() -> Self {
        Self {
            state: GrenadeState::Inactive,
            strength_increased: false,
        }
    }

    pub fn state(&self) -> GrenadeState {
        self.state
    }

    /// Only an inactive grenade can be picked up.
    pub fn is_carriable(&self) -> bool {
        self.state == GrenadeState::Inactive
    }

    /// Check that the grenade could be armed on `site`, without arming it.
    pub fn check_activate(&self, site: GrenadeSite) -> Result<(), GameError> {
        match self.state {
            GrenadeState::Inactive => {},
            GrenadeState::Active => return Err(GameError::illegal("light grenade is already active")),
            GrenadeState::Exploded => {
                return Err(GameError::illegal("light grenade has already exploded"));
            },
        }
        if site.is_wall {
            return Err(GameError::unsupported("cannot arm a light grenade on a wall"));
        }
        if site.holds_grenade {
            return Err(GameError::illegal("cell already holds a light grenade"));
        }
        Ok(())
    }

    /// INACTIVE -> ACTIVE.
    pub fn activate(&mut self, site: GrenadeSite) -> Result<(), GameError> {
        self.check_activate(site)?;
        self.state = GrenadeState::Active;
        Ok(())
    }

    /// Increase the explosion strength. Only the first call before the
    /// explosion has an effect; returns whether this call changed anything.
    pub fn increase_strength(&mut self) -> bool {
        if self.strength_increased || self.state == GrenadeState::Exploded {
            return false;
        }
        self.strength_increased = true;
        true
    }

    /// Actions skipped by this grenade's explosion.
    pub fn strength(&self, config: &ObjectronConfig) -> u8 {
        if self.strength_increased {
            config.grenade_boosted_strength
        } else {
            config.grenade_strength
        }
    }

    /// ACTIVE -> EXPLODED. Returns the number of actions the victim loses.
    pub fn explode(&mut self, config: &ObjectronConfig) -> Result<u8, GameError> {
        if self.state != GrenadeState::Active {
            return Err(GameError::illegal(format!(
                "only an active light grenade can explode (state {:?})",
                self.state
            )));
        }
        self.state = GrenadeState::Exploded;
        Ok(self.strength(config))
    }
}
