use serde::{Deserialize, Serialize};

/// Data-driven configuration for an Objectron game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectronConfig {
    /// Exact number of players (and starting positions) a board needs.
    pub player_count: usize,
    /// Actions granted at the start of an unpenalized turn.
    pub actions_per_turn: u8,
    /// Maximum number of items a player can carry.
    pub inventory_capacity: usize,
    /// Number of recently left cells that carry a player's light trail.
    pub light_trail_length: usize,
    /// Actions lost to a light grenade explosion.
    pub grenade_strength: u8,
    /// Actions lost to a light grenade whose strength was increased.
    pub grenade_boosted_strength: u8,
    /// Actions lost by a player hit by an identity disk.
    pub disk_hit_actions: u8,
    /// Cells an uncharged identity disk can travel.
    pub uncharged_disk_range: u32,
    /// Maximum distance (in cells) between two generators forming a force field.
    pub force_field_max_distance: u32,
    /// Elapsed actions (all players) between two force field flips.
    pub force_field_flip_actions: u32,
    /// Turns a primary power failure lasts.
    pub primary_power_failure_turns: u32,
    /// Actions a secondary power failure lasts.
    pub secondary_power_failure_actions: u32,
    /// Actions a tertiary power failure lasts.
    pub tertiary_power_failure_actions: u32,
    /// Chance per square and turn of a new primary power failure.
    pub power_failure_chance: f64,
    /// Actions lost when starting a turn on a power-failed cell.
    pub power_failure_start_penalty: u8,
    /// Whether ending a turn without moving loses the game.
    pub must_move_each_turn: bool,
    /// Seed of the random source used for power failures.
    pub rng_seed: u64,
}

impl Default for ObjectronConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            actions_per_turn: 3,
            inventory_capacity: 6,
            light_trail_length: 3,
            grenade_strength: 3,
            grenade_boosted_strength: 4,
            disk_hit_actions: 3,
            uncharged_disk_range: 4,
            force_field_max_distance: 3,
            force_field_flip_actions: 2,
            primary_power_failure_turns: 3,
            secondary_power_failure_actions: 2,
            tertiary_power_failure_actions: 1,
            power_failure_chance: 0.05,
            power_failure_start_penalty: 1,
            must_move_each_turn: true,
            rng_seed: 0x0b1e_c7a0_11fe_5eed,
        }
    }
}

impl ObjectronConfig {
    /// Load config from a TOML file. The path comes from `OBJECTRON_CONFIG`,
    /// falling back to `config/objectron.toml`, then to defaults if the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("OBJECTRON_CONFIG")
            .unwrap_or_else(|_| "config/objectron.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Parse a config from TOML text; missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(content)
    }

    /// A config without random power failures, for deterministic play.
    pub fn without_random_failures(mut self) -> Self {
        self.power_failure_chance = 0.0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ObjectronConfig::from_toml("actions_per_turn = 4\nplayer_count = 3\n").unwrap();
        assert_eq!(config.actions_per_turn, 4);
        assert_eq!(config.player_count, 3);
        assert_eq!(config.inventory_capacity, 6);
        assert_eq!(config.light_trail_length, 3);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(ObjectronConfig::from_toml("actions_per_turn = \"many\"").is_err());
    }

    #[test]
    fn without_random_failures_zeroes_chance() {
        let config = ObjectronConfig::default().without_random_failures();
        assert_eq!(config.power_failure_chance, 0.0);
    }
}
