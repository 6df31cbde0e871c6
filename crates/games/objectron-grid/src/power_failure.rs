use std::collections::BTreeMap;

use objectron_core::game_trait::{HazardId, PowerFailureLevel};
use objectron_core::geometry::{Coordinate, Direction};
use serde::{Deserialize, Serialize};

use crate::config::ObjectronConfig;
use crate::turn::TurnEvent;

/// Turn-clock tick a failure of `level` counts down on.
pub fn listens_to(level: PowerFailureLevel) -> TurnEvent {
    match level {
        PowerFailureLevel::Primary => TurnEvent::EndTurn,
        PowerFailureLevel::Secondary | PowerFailureLevel::Tertiary => TurnEvent::EndAction,
    }
}

/// Initial time to live of a failure of `level`.
pub fn lifetime(level: PowerFailureLevel, config: &ObjectronConfig) -> u32 {
    match level {
        PowerFailureLevel::Primary => config.primary_power_failure_turns,
        PowerFailureLevel::Secondary => config.secondary_power_failure_actions,
        PowerFailureLevel::Tertiary => config.tertiary_power_failure_actions,
    }
}

/// Level spawned next to a failure of `level`, if any.
pub fn child_level(level: PowerFailureLevel) -> Option<PowerFailureLevel> {
    match level {
        PowerFailureLevel::Primary => Some(PowerFailureLevel::Secondary),
        PowerFailureLevel::Secondary => Some(PowerFailureLevel::Tertiary),
        PowerFailureLevel::Tertiary => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerFailure {
    id: HazardId,
    level: PowerFailureLevel,
    cell: Coordinate,
    time_to_live: u32,
    parent: Option<HazardId>,
    /// Direction from the parent's cell to this one.
    bearing: Option<Direction>,
}

impl PowerFailure {
    pub fn id(&self) -> HazardId {
        self.id
    }

    pub fn level(&self) -> PowerFailureLevel {
        self.level
    }

    pub fn cell(&self) -> Coordinate {
        self.cell
    }

    pub fn time_to_live(&self) -> u32 {
        self.time_to_live
    }

    pub fn parent(&self) -> Option<HazardId> {
        self.parent
    }

    pub fn bearing(&self) -> Option<Direction> {
        self.bearing
    }
}

/// Every live power failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerFailures {
    failures: BTreeMap<HazardId, PowerFailure>,
    next_id: HazardId,
}

impl PowerFailures {
    pub fn new() -> Self {
        Self {
            failures: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn create(
        &mut self,
        level: PowerFailureLevel,
        cell: Coordinate,
        time_to_live: u32,
        parent: Option<(HazardId, Direction)>,
    ) -> HazardId {
        let id = self.next_id;
        self.next_id += 1;
        self.failures.insert(
            id,
            PowerFailure {
                id,
                level,
                cell,
                time_to_live,
                parent: parent.map(|(p, _)| p),
                bearing: parent.map(|(_, d)| d),
            },
        );
        id
    }

    pub fn get(&self, id: HazardId) -> Option<&PowerFailure> {
        self.failures.get(&id)
    }

    pub fn is_alive(&self, id: HazardId) -> bool {
        self.failures.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PowerFailure> {
        self.failures.values()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn covers(&self, cell: Coordinate) -> bool {
        self.failures.values().any(|f| f.cell == cell)
    }

    /// Count down every failure listening to `event` and return the ones
    /// that expired, in id order.
    pub fn on_turn_event(&mut self, event: TurnEvent) -> Vec<PowerFailure> {
        let mut expired = Vec::new();
        for failure in self.failures.values_mut() {
            if listens_to(failure.level) == event {
                failure.time_to_live = failure.time_to_live.saturating_sub(1);
                if failure.time_to_live == 0 {
                    expired.push(failure.id);
                }
            }
        }
        expired
            .into_iter()
            .filter_map(|id| self.failures.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_listen_to_their_own_clock() {
        let mut failures = PowerFailures::new();
        let at = Coordinate::new(1, 1);
        let primary = failures.create(PowerFailureLevel::Primary, at, 3, None);
        let secondary = failures.create(
            PowerFailureLevel::Secondary,
            at.step(Direction::North),
            2,
            Some((primary, Direction::North)),
        );

        assert!(failures.on_turn_event(TurnEvent::EndAction).is_empty());
        let expired = failures.on_turn_event(TurnEvent::EndAction);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id(), secondary);
        assert_eq!(expired[0].parent(), Some(primary));
        assert_eq!(expired[0].bearing(), Some(Direction::North));
        assert_eq!(failures.get(primary).unwrap().time_to_live(), 3);

        failures.on_turn_event(TurnEvent::EndTurn);
        failures.on_turn_event(TurnEvent::EndTurn);
        assert!(failures.covers(at));
        assert_eq!(failures.on_turn_event(TurnEvent::EndTurn).len(), 1);
        assert!(failures.is_empty());
    }

    #[test]
    fn default_lifetimes() {
        let config = ObjectronConfig::default();
        assert_eq!(lifetime(PowerFailureLevel::Primary, &config), 3);
        assert_eq!(lifetime(PowerFailureLevel::Secondary, &config), 2);
        assert_eq!(lifetime(PowerFailureLevel::Tertiary, &config), 1);
        assert_eq!(child_level(PowerFailureLevel::Tertiary), None);
    }
}
