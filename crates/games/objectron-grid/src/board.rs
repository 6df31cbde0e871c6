//! The playing field and the rules that tie cells, items, players and
//! hazards together.
//!
//! Every command validates all of its preconditions before the first
//! mutation. Effects triggered by entering a cell run through an
//! [`EffectChain`] with the board as its [`EffectContext`]; hazards advance on
//! the [`TurnEvent`]s emitted after every action and every turn.

use std::collections::BTreeSet;

use objectron_core::command::Command;
use objectron_core::game_trait::{
    DefeatReason, GameEvent, HazardId, ItemId, PlayerId, PowerFailureLevel,
};
use objectron_core::geometry::{Coordinate, Direction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::capability::Occupant;
use crate::cell::{Cell, Decoration};
use crate::config::ObjectronConfig;
use crate::effect::{Effect, EffectChain, EffectContext};
use crate::error::GameError;
use crate::force_field::{self, ForceFields};
use crate::grid::Grid;
use crate::items::grenade::{GrenadeSite, GrenadeState};
use crate::items::{Item, ItemKind, ItemStore, Placement};
use crate::light_trail::LightTrail;
use crate::outcome::{self, Outcome};
use crate::player::{PlayerState, TurnStart};
use crate::power_failure::{self, PowerFailure, PowerFailures};
use crate::turn::{PlayerDatabase, TurnEvent};

/// Upper bound of consecutive turn starts per seated player, reached only
/// when every player owes more actions than a turn grants.
const MAX_SKIPS_PER_PLAYER: usize = 32;

#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    items: ItemStore,
    players: PlayerDatabase,
    fields: ForceFields,
    failures: PowerFailures,
    config: ObjectronConfig,
    rng: StdRng,
    /// Cell of the identity disk currently in flight.
    flight: Option<Coordinate>,
    outcome: Option<Outcome>,
    events: Vec<GameEvent>,
}

impl Board {
    pub(crate) fn new(
        grid: Grid,
        items: ItemStore,
        players: PlayerDatabase,
        config: ObjectronConfig,
    ) -> Self {
        Self {
            grid,
            items,
            players,
            fields: ForceFields::new(config.force_field_flip_actions),
            failures: PowerFailures::new(),
            rng: StdRng::seed_from_u64(config.rng_seed),
            flight: None,
            outcome: None,
            events: Vec::new(),
            config,
        }
    }

    /// Grant the first player its actions.
    pub(crate) fn start(&mut self) -> Vec<GameEvent> {
        self.start_next_turn();
        self.drain_events()
    }

    // ================================================================
    // Queries
    // ================================================================

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    pub fn players(&self) -> &PlayerDatabase {
        &self.players
    }

    pub fn force_fields(&self) -> &ForceFields {
        &self.fields
    }

    pub fn power_failures(&self) -> &PowerFailures {
        &self.failures
    }

    pub fn config(&self) -> &ObjectronConfig {
        &self.config
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.outcome.and_then(Outcome::winner)
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// The player whose turn it is, `None` once the game is over.
    pub fn current_player(&self) -> Option<PlayerId> {
        (!self.is_game_over()).then(|| self.players.current_id())
    }

    pub fn get_player_at(&self, at: Coordinate) -> Option<PlayerId> {
        self.grid.get_player_at(at)
    }

    pub fn get_items_at(&self, at: Coordinate) -> Vec<ItemId> {
        self.grid.get_items_at(at)
    }

    pub fn inventory(&self, player: PlayerId) -> Result<&[ItemId], GameError> {
        self.players.get(player).map(PlayerState::inventory)
    }

    pub fn light_trail(&self, player: PlayerId) -> Result<&LightTrail, GameError> {
        self.players.get(player).map(PlayerState::light_trail)
    }

    pub fn is_power_failed(&self, at: Coordinate) -> bool {
        self.grid.cell(at).is_ok_and(Cell::is_power_failed)
    }

    pub fn force_field_active(&self, at: Coordinate) -> bool {
        self.grid.cell(at).is_ok_and(Cell::has_active_force_field)
    }

    // ================================================================
    // Commands
    // ================================================================

    /// Validate and apply one command of `player`. On error nothing changed.
    pub fn execute(
        &mut self,
        player: PlayerId,
        command: Command,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        self.players.get(player)?;
        if self.players.current_id() != player {
            return Err(GameError::NotYourTurn { player });
        }

        let result = match command {
            Command::Move(direction) => self.move_player(player, direction),
            Command::PickUp(item) => self.pick_up(player, item),
            Command::UseItem { item, direction } => self.use_item(player, item, direction),
            Command::EndTurn => {
                self.finish_turn(player);
                Ok(())
            },
        };
        if let Err(e) = result {
            self.events.clear();
            return Err(e);
        }
        if command.is_action() {
            self.after_action(player);
        }
        Ok(self.drain_events())
    }

    /// Move `player` one cell in `direction`, leaving a light trail behind.
    pub fn move_player(&mut self, player: PlayerId, direction: Direction) -> Result<(), GameError> {
        let state = self.players.get(player)?;
        require_actions(state)?;
        let from = state.position();
        let to = self
            .grid
            .neighbor(from, direction)
            .ok_or_else(|| GameError::invalid(format!("no cell {direction:?} of {from}")))?;
        if self.crosses_light_trail(from, direction) {
            return Err(GameError::illegal("cannot cross a light trail diagonally"));
        }
        self.grid.relocate_player(player, from, to)?;

        let state = self.players.get_mut(player)?;
        state.set_position(to);
        state.spend_action();
        state.record_move();
        state.light_trail_mut().extend(from, &mut self.grid);
        self.events.push(GameEvent::PlayerMoved {
            player_id: player,
            from,
            to,
        });

        self.enter_cell(Occupant::Player(player), to);
        if outcome::reached_opponent_start(&self.players, player) {
            self.declare(Outcome::Won(player));
        }
        Ok(())
    }

    /// Take `item` from the player's cell into its inventory.
    pub fn pick_up(&mut self, player: PlayerId, item: ItemId) -> Result<(), GameError> {
        let state = self.players.get(player)?;
        require_actions(state)?;
        let at = state.position();
        if !self.grid.cell(at)?.items().contains(&item) {
            return Err(GameError::invalid(format!("item {item} is not on {at}")));
        }
        self.items.item(item)?.check_carriable()?;
        state.check_can_carry(item)?;

        self.grid.cell_mut(at)?.remove_item(item)?;
        let state = self.players.get_mut(player)?;
        state.store(item)?;
        state.spend_action();
        state.light_trail_mut().fade(&mut self.grid);
        self.items.set_placement(item, Placement::Inventory(player));
        if let Item::IdentityDisk(disk) = self.items.item_mut(item)? {
            disk.rearm();
        }
        if self.items.kind(item) == Some(ItemKind::ForceFieldGenerator) {
            self.dissolve_fields(item);
        }
        self.events.push(GameEvent::ItemPickedUp {
            player_id: player,
            item_id: item,
        });
        Ok(())
    }

    /// Use a carried item. Identity disks need a `direction`; other items
    /// ignore it.
    pub fn use_item(
        &mut self,
        player: PlayerId,
        item: ItemId,
        direction: Option<Direction>,
    ) -> Result<(), GameError> {
        let state = self.players.get(player)?;
        require_actions(state)?;
        let kind = self
            .items
            .kind(item)
            .ok_or_else(|| GameError::invalid(format!("no item with id {item}")))?;
        let carried = state.has_item(item);
        let at = state.position();
        match kind {
            ItemKind::Teleporter => return Err(GameError::unsupported("teleporters cannot be used")),
            _ if !carried => {
                return Err(GameError::invalid(format!(
                    "player {player} does not carry item {item}"
                )));
            },
            ItemKind::LightGrenade => self.arm_grenade(player, item, at)?,
            ItemKind::ChargedIdentityDisk | ItemKind::UnchargedIdentityDisk => {
                self.throw_disk(player, item, at, direction)?;
            },
            ItemKind::ForceFieldGenerator => self.place_generator(player, item, at)?,
        }

        let state = self.players.get_mut(player)?;
        state.spend_action();
        state.light_trail_mut().fade(&mut self.grid);
        Ok(())
    }

    /// Start a primary power failure (with its secondary and tertiary) on
    /// `at`.
    pub fn place_power_failure(&mut self, at: Coordinate) -> Result<Vec<GameEvent>, GameError> {
        if self.grid.cell(at)?.is_wall() {
            return Err(GameError::unsupported("a wall has no power to lose"));
        }
        self.start_power_failure(PowerFailureLevel::Primary, at, None);
        Ok(self.drain_events())
    }

    // ================================================================
    // Items
    // ================================================================

    fn arm_grenade(&mut self, player: PlayerId, item: ItemId, at: Coordinate) -> Result<(), GameError> {
        let kind = ItemKind::LightGrenade;
        let cell = self.grid.cell(at)?;
        let site = GrenadeSite {
            is_wall: cell.is_wall(),
            holds_grenade: cell
                .items()
                .iter()
                .any(|&id| self.items.kind(id) == Some(ItemKind::LightGrenade)),
        };
        cell.check_add_item(item, kind)?;
        self.items.grenade_mut(item)?.activate(site)?;

        self.players.get_mut(player)?.take(item)?;
        self.grid.cell_mut(at)?.add_item(item, kind)?;
        self.items.set_placement(item, Placement::Cell(at));
        tracing::debug!(player, grenade = item, %at, "Light grenade armed");
        self.events.push(GameEvent::ItemPlaced {
            player_id: player,
            item_id: item,
            at,
        });
        Ok(())
    }

    fn throw_disk(
        &mut self,
        player: PlayerId,
        item: ItemId,
        start: Coordinate,
        direction: Option<Direction>,
    ) -> Result<(), GameError> {
        let mut disk = match self.items.item(item)? {
            Item::IdentityDisk(disk) => disk.clone(),
            _ => return Err(GameError::invalid(format!("item {item} is not an identity disk"))),
        };
        if let Some(direction) = direction {
            disk.set_direction(direction)?;
        }
        let range = disk.range(&self.config);
        let direction = disk.launch()?;

        *self.items.disk_mut(item)? = disk;
        self.players.get_mut(player)?.take(item)?;
        self.items.set_placement(item, Placement::InFlight);
        self.flight = Some(start);

        // A disk never crosses the same cell twice, so teleporter loops end.
        let mut visited = BTreeSet::from([start]);
        let mut travelled = 0;
        while let Some(at) = self.flight {
            if range.is_some_and(|limit| travelled >= limit) {
                break;
            }
            let Some(next) = self.grid.neighbor(at, direction) else {
                break;
            };
            let cell = self.grid.cell(next)?;
            if cell.is_wall() || visited.contains(&next) {
                break;
            }
            if let Some(victim) = cell.player() {
                self.flight = Some(next);
                self.hit_player(item, victim);
                break;
            }
            if cell.has_active_force_field() {
                self.destroy_disk(item, next);
                break;
            }
            travelled += 1;
            visited.insert(next);
            self.flight = Some(next);
            tracing::debug!(disk = item, at = %next, "Identity disk advanced");
            self.enter_cell(Occupant::Disk(item), next);
            if let Some(now) = self.flight {
                visited.insert(now);
            }
        }

        if let Some(at) = self.flight.take() {
            self.land_disk(item, at)?;
        }
        Ok(())
    }

    fn hit_player(&mut self, disk: ItemId, victim: PlayerId) {
        let actions_lost = self.config.disk_hit_actions;
        if let Ok(state) = self.players.get_mut(victim) {
            state.skip_actions(actions_lost);
        }
        tracing::info!(disk, victim, actions_lost, "Identity disk hit a player");
        self.events.push(GameEvent::DiskHit {
            item_id: disk,
            victim,
            actions_lost,
        });
    }

    fn land_disk(&mut self, disk: ItemId, at: Coordinate) -> Result<(), GameError> {
        let kind = self
            .items
            .kind(disk)
            .ok_or_else(|| GameError::invalid(format!("no item with id {disk}")))?;
        if self.grid.cell(at)?.check_add_item(disk, kind).is_err() {
            self.destroy_disk(disk, at);
            return Ok(());
        }
        self.grid.cell_mut(at)?.add_item(disk, kind)?;
        self.items.disk_mut(disk)?.land()?;
        self.items.set_placement(disk, Placement::Cell(at));
        self.events.push(GameEvent::DiskLanded { item_id: disk, at });
        Ok(())
    }

    fn destroy_disk(&mut self, disk: ItemId, at: Coordinate) {
        self.flight = None;
        self.items.set_placement(disk, Placement::Consumed);
        tracing::info!(disk, %at, "Identity disk destroyed by a force field");
        self.events.push(GameEvent::DiskDestroyed { item_id: disk, at });
    }

    fn place_generator(&mut self, player: PlayerId, item: ItemId, at: Coordinate) -> Result<(), GameError> {
        let kind = ItemKind::ForceFieldGenerator;
        self.grid.cell(at)?.check_add_item(item, kind)?;

        self.players.get_mut(player)?.take(item)?;
        self.grid.cell_mut(at)?.add_item(item, kind)?;
        self.items.set_placement(item, Placement::Cell(at));
        self.events.push(GameEvent::ItemPlaced {
            player_id: player,
            item_id: item,
            at,
        });

        let partners: Vec<(ItemId, Coordinate)> = self
            .items
            .iter()
            .filter(|&(id, entry)| id != item && entry.item.kind() == kind)
            .filter_map(|(id, entry)| match entry.placement {
                Placement::Cell(other) => Some((id, other)),
                _ => None,
            })
            .collect();
        for (partner, other) in partners {
            if self.can_span_field(at, other) && !self.fields.exists_between(item, partner) {
                self.form_field([item, partner], at, other);
            }
        }
        Ok(())
    }

    /// Generators pair up along a straight line within range, with only
    /// squares in between.
    fn can_span_field(&self, a: Coordinate, b: Coordinate) -> bool {
        a.direction_to(b).is_some()
            && a.chebyshev_distance(b) <= self.config.force_field_max_distance
            && a.cells_between(b)
                .into_iter()
                .all(|at| self.grid.cell(at).is_ok_and(|cell| !cell.is_wall()))
    }

    fn form_field(&mut self, generators: [ItemId; 2], a: Coordinate, b: Coordinate) {
        let cells = force_field::span(a, b);
        let field = self.fields.create(generators, cells.clone());
        for &at in &cells {
            if let Ok(cell) = self.grid.cell_mut(at) {
                cell.decorate(Decoration::ForceField { field, active: true });
            }
        }
        tracing::info!(field, from = %a, to = %b, "Force field created");
        self.events.push(GameEvent::ForceFieldCreated {
            field_id: field,
            cells,
        });
    }

    fn dissolve_fields(&mut self, generator: ItemId) {
        for field in self.fields.remove_for_generator(generator) {
            for &at in field.cells() {
                if let Ok(cell) = self.grid.cell_mut(at) {
                    cell.remove_force_field(field.id());
                }
            }
            tracing::info!(field = field.id(), "Force field removed");
            self.events.push(GameEvent::ForceFieldRemoved {
                field_id: field.id(),
            });
        }
    }

    // ================================================================
    // Entering cells
    // ================================================================

    /// Run the effects of `at` against an occupant that just arrived there.
    fn enter_cell(&mut self, occupant: Occupant, at: Coordinate) {
        let mut chain = EffectChain::new();
        for effect in self.entry_effects(at) {
            chain.add_effect(effect);
        }
        chain.execute(occupant, self);
    }

    /// Effects of a cell in execution order: missing power, then armed
    /// grenades, then teleporters.
    fn entry_effects(&self, at: Coordinate) -> Vec<Effect> {
        let Ok(cell) = self.grid.cell(at) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if cell.is_power_failed() {
            effects.push(Effect::PowerFailure);
        }
        let mut teleports = Vec::new();
        for &id in cell.items() {
            match self.items.item(id) {
                Ok(Item::LightGrenade(grenade)) if grenade.state() == GrenadeState::Active => {
                    effects.push(Effect::Explode {
                        grenade: id,
                        boosted: false,
                    });
                },
                Ok(Item::Teleporter(_)) => teleports.push(Effect::Teleport { teleporter: id }),
                _ => {},
            }
        }
        effects.extend(teleports);
        effects
    }

    fn cut_power(&mut self, target: Occupant) {
        if let Some(player) = target.as_action_loser()
            && let Ok(state) = self.players.get_mut(player)
        {
            state.lose_remaining_actions();
            tracing::debug!(player, "Entered a cell without power");
        }
    }

    fn explode(&mut self, grenade: ItemId, boosted: bool, target: Occupant) -> Result<(), GameError> {
        let Some(victim) = target.as_action_loser() else {
            return Ok(());
        };
        let Some(at) = self.items.cell_of(grenade) else {
            return Ok(());
        };
        let light_grenade = self.items.grenade_mut(grenade)?;
        if light_grenade.state() != GrenadeState::Active {
            return Ok(());
        }
        if boosted {
            light_grenade.increase_strength();
        }
        let actions_lost = light_grenade.explode(&self.config)?;

        self.grid.cell_mut(at)?.remove_item(grenade)?;
        self.items.set_placement(grenade, Placement::Consumed);
        self.players.get_mut(victim)?.skip_actions(actions_lost);
        tracing::info!(grenade, victim, actions_lost, %at, "Light grenade exploded");
        self.events.push(GameEvent::GrenadeExploded {
            item_id: grenade,
            at,
            victim,
            actions_lost,
        });
        Ok(())
    }

    fn teleport(
        &mut self,
        teleporter: ItemId,
        target: Occupant,
        chain: &mut EffectChain,
    ) -> Result<(), GameError> {
        if !target.is_teleportable() {
            return Ok(());
        }
        let pad = self.items.teleporter_mut(teleporter)?;
        if pad.take_skip() {
            return Ok(());
        }
        let Some(destination) = pad.destination() else {
            return Ok(());
        };
        let (Some(from), Some(to)) = (self.items.cell_of(teleporter), self.items.cell_of(destination))
        else {
            return Ok(());
        };
        let (occupied, fenced, trailed) = {
            let arrival = self.grid.cell(to)?;
            (
                arrival.has_player(),
                arrival.has_active_force_field(),
                arrival.has_light_trail(),
            )
        };

        if occupied {
            tracing::debug!(?target, %to, "Teleport skipped, destination occupied");
            return Ok(());
        }
        match target {
            Occupant::Player(player) => {
                if fenced {
                    self.defeat(player, DefeatReason::ForceField);
                    return Ok(());
                }
                if trailed {
                    self.defeat(player, DefeatReason::LightTrail);
                    return Ok(());
                }
                self.grid.relocate_player(player, from, to)?;
                let state = self.players.get_mut(player)?;
                state.set_position(to);
                state.light_trail_mut().extend(from, &mut self.grid);
                tracing::debug!(player, %from, %to, "Player teleported");
                self.events.push(GameEvent::PlayerTeleported {
                    player_id: player,
                    from,
                    to,
                });
            },
            Occupant::Disk(disk) => {
                if fenced {
                    self.destroy_disk(disk, to);
                    return Ok(());
                }
                self.flight = Some(to);
            },
        }

        self.items.teleporter_mut(destination)?.skip_next();
        for effect in self.entry_effects(to) {
            chain.add_effect(effect);
        }
        Ok(())
    }

    // ================================================================
    // Turn clock
    // ================================================================

    /// Advance hazards after an action, then end the turn if the player has
    /// nothing left to do.
    fn after_action(&mut self, player: PlayerId) {
        self.on_turn_event(TurnEvent::EndAction);
        if self.decide() {
            return;
        }
        let done = self
            .players
            .get(player)
            .map_or(true, |s| s.is_defeated() || !s.has_actions());
        if done {
            self.finish_turn(player);
        }
    }

    fn finish_turn(&mut self, player: PlayerId) {
        let idle = self
            .players
            .get(player)
            .is_ok_and(|s| !s.moved_this_turn() && !s.is_defeated());
        if self.config.must_move_each_turn && idle {
            self.defeat(player, DefeatReason::DidNotMove);
        }
        // Penalties taken while waiting must come out of the next turn.
        if let Ok(state) = self.players.get_mut(player) {
            state.lose_remaining_actions();
        }
        self.events.push(GameEvent::TurnEnded { player_id: player });
        if !self.players.notify_turn_end(player) {
            return;
        }
        self.on_turn_event(TurnEvent::EndTurn);
        if self.decide() {
            return;
        }
        self.start_next_turn();
    }

    /// Hand the turn to the next player able to act. Defeated players are
    /// passed over, trapped players are defeated, and players whose deficit
    /// eats the whole turn skip it.
    fn start_next_turn(&mut self) {
        let actions = self.config.actions_per_turn;
        let penalty = self.config.power_failure_start_penalty;
        for _ in 0..self.players.len() * MAX_SKIPS_PER_PLAYER {
            let player = self.players.current_id();
            let Ok(state) = self.players.get(player) else {
                return;
            };
            if state.is_defeated() {
                self.players.notify_turn_end(player);
                continue;
            }
            let position = state.position();
            if !self.has_escape(player, position) {
                self.defeat(player, DefeatReason::Trapped);
                if self.decide() {
                    return;
                }
                self.players.notify_turn_end(player);
                continue;
            }

            let power_failed = self.is_power_failed(position);
            let Ok(state) = self.players.get_mut(player) else {
                return;
            };
            let mut start = state.begin_turn(actions);
            if power_failed && matches!(start, TurnStart::Play(_)) {
                state.skip_actions(penalty);
                start = if state.has_actions() {
                    TurnStart::Play(state.remaining_actions())
                } else {
                    TurnStart::Skipped
                };
            }
            match start {
                TurnStart::Play(actions) => {
                    tracing::info!(player, actions, "Turn started");
                    self.events.push(GameEvent::TurnStarted {
                        player_id: player,
                        actions,
                    });
                    return;
                },
                TurnStart::Skipped => {
                    tracing::info!(player, "Turn skipped");
                    self.events.push(GameEvent::TurnSkipped { player_id: player });
                    self.players.notify_turn_end(player);
                    self.on_turn_event(TurnEvent::EndTurn);
                },
            }
        }
        tracing::warn!("No player was able to start a turn");
    }

    /// Whether `player` could step onto any neighbor of `at`. A player held
    /// by an active force field is waiting, not trapped.
    fn has_escape(&self, player: PlayerId, at: Coordinate) -> bool {
        if self.force_field_active(at) {
            return true;
        }
        let Some(container) = self.grid.container(at) else {
            return false;
        };
        container.neighbors().any(|(direction, next)| {
            !self.crosses_light_trail(at, direction)
                && self
                    .grid
                    .cell(next)
                    .is_ok_and(|cell| cell.check_add_player(player).is_ok())
        })
    }

    /// A diagonal step from `from` squeezing between two light trail cells.
    fn crosses_light_trail(&self, from: Coordinate, direction: Direction) -> bool {
        direction.components().is_some_and(|(a, b)| {
            self.grid.cell(from.step(a)).is_ok_and(Cell::has_light_trail)
                && self.grid.cell(from.step(b)).is_ok_and(Cell::has_light_trail)
        })
    }

    fn on_turn_event(&mut self, event: TurnEvent) {
        self.flip_force_fields(event);
        self.decay_power_failures(event);
        if event == TurnEvent::EndTurn {
            self.spawn_random_power_failures();
        }
    }

    fn flip_force_fields(&mut self, event: TurnEvent) {
        let flipped: Vec<(HazardId, bool, Vec<Coordinate>)> = self
            .fields
            .on_turn_event(event)
            .into_iter()
            .map(|f| (f.id(), f.is_active(), f.cells().to_vec()))
            .collect();
        for (field, active, cells) in flipped {
            for &at in &cells {
                if let Ok(cell) = self.grid.cell_mut(at) {
                    cell.set_force_field_active(field, active);
                }
            }
            tracing::info!(field, active, "Force field flipped");
            self.events.push(GameEvent::ForceFieldToggled {
                field_id: field,
                active,
            });
            if active {
                for at in cells {
                    if let Some(player) = self
                        .grid
                        .get_player_at(at)
                        .and_then(|p| Occupant::Player(p).as_force_field_vulnerable())
                    {
                        self.defeat(player, DefeatReason::ForceField);
                    }
                }
            }
        }
    }

    // ================================================================
    // Power failures
    // ================================================================

    fn start_power_failure(
        &mut self,
        level: PowerFailureLevel,
        at: Coordinate,
        parent: Option<(HazardId, Direction)>,
    ) -> HazardId {
        let time_to_live = power_failure::lifetime(level, &self.config);
        let failure = self.failures.create(level, at, time_to_live, parent);
        if let Ok(cell) = self.grid.cell_mut(at) {
            cell.decorate(Decoration::PowerFailure { failure });
        }
        tracing::info!(failure, ?level, %at, "Power failure started");
        self.events.push(GameEvent::PowerFailureStarted {
            failure_id: failure,
            at,
            level,
        });
        self.spawn_child(failure);
        failure
    }

    /// Start the next-level failure on a random square next to `parent`.
    fn spawn_child(&mut self, parent: HazardId) {
        let Some((level, at)) = self
            .failures
            .get(parent)
            .and_then(|p| Some((power_failure::child_level(p.level())?, p.cell())))
        else {
            return;
        };
        let options = self.square_neighbors(at);
        if options.is_empty() {
            return;
        }
        let (direction, cell) = options[self.rng.random_range(0..options.len())];
        self.start_power_failure(level, cell, Some((parent, direction)));
    }

    fn decay_power_failures(&mut self, event: TurnEvent) {
        for failure in self.failures.on_turn_event(event) {
            if let Ok(cell) = self.grid.cell_mut(failure.cell()) {
                cell.remove_power_failure(failure.id());
            }
            tracing::info!(failure = failure.id(), at = %failure.cell(), "Power failure ended");
            self.events.push(GameEvent::PowerFailureEnded {
                failure_id: failure.id(),
                at: failure.cell(),
            });
            self.replace_child(&failure);
        }
    }

    /// A child outliving its time is replaced while the parent lasts: a
    /// secondary moves one step clockwise around its primary, a tertiary
    /// re-rolls a random square next to its secondary.
    fn replace_child(&mut self, expired: &PowerFailure) {
        let Some(parent) = expired.parent() else {
            return;
        };
        let Some(center) = self.failures.get(parent).map(PowerFailure::cell) else {
            return;
        };
        match expired.level() {
            PowerFailureLevel::Secondary => {
                let from = expired.bearing().map_or(Direction::North, Direction::clockwise);
                if let Some((direction, at)) = self.next_square_clockwise(center, from) {
                    self.start_power_failure(PowerFailureLevel::Secondary, at, Some((parent, direction)));
                }
            },
            PowerFailureLevel::Tertiary => self.spawn_child(parent),
            PowerFailureLevel::Primary => {},
        }
    }

    fn next_square_clockwise(
        &self,
        center: Coordinate,
        from: Direction,
    ) -> Option<(Direction, Coordinate)> {
        let mut direction = from;
        for _ in 0..Direction::ALL.len() {
            if let Some(at) = self.grid.neighbor(center, direction)
                && self.grid.cell(at).is_ok_and(|cell| !cell.is_wall())
            {
                return Some((direction, at));
            }
            direction = direction.clockwise();
        }
        None
    }

    fn square_neighbors(&self, at: Coordinate) -> Vec<(Direction, Coordinate)> {
        self.grid
            .container(at)
            .map(|container| {
                container
                    .neighbors()
                    .filter(|&(_, next)| self.grid.cell(next).is_ok_and(|cell| !cell.is_wall()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn spawn_random_power_failures(&mut self) {
        let chance = self.config.power_failure_chance;
        if chance <= 0.0 {
            return;
        }
        let chance = chance.min(1.0);
        for at in self.grid.squares() {
            if !self.is_power_failed(at) && self.rng.random_bool(chance) {
                self.start_power_failure(PowerFailureLevel::Primary, at, None);
            }
        }
    }

    // ================================================================
    // Outcome
    // ================================================================

    fn defeat(&mut self, player: PlayerId, reason: DefeatReason) {
        if let Ok(state) = self.players.get_mut(player)
            && state.defeat(reason)
        {
            tracing::info!(player, ?reason, "Player defeated");
            self.events.push(GameEvent::PlayerDefeated {
                player_id: player,
                reason,
            });
        }
    }

    fn declare(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        match outcome {
            Outcome::Won(player) => {
                tracing::info!(player, "Game won");
                self.events.push(GameEvent::GameWon { player_id: player });
            },
            Outcome::Draw => tracing::info!("Game ended without a winner"),
        }
    }

    /// Settle the game if at most one player stands. Returns whether it is
    /// over.
    fn decide(&mut self) -> bool {
        if self.outcome.is_none()
            && let Some(outcome) = outcome::last_standing(&self.players)
        {
            self.declare(outcome);
        }
        self.is_game_over()
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EffectContext for Board {
    fn apply(&mut self, effect: Effect, target: Occupant, chain: &mut EffectChain) {
        let result = match effect {
            Effect::PowerFailure => {
                self.cut_power(target);
                Ok(())
            },
            Effect::Explode { grenade, boosted } => self.explode(grenade, boosted, target),
            Effect::Teleport { teleporter } => self.teleport(teleporter, target, chain),
        };
        if let Err(e) = result {
            tracing::warn!(?effect, ?target, error = %e, "Effect could not be applied");
        }
    }
}

fn require_actions(state: &PlayerState) -> Result<(), GameError> {
    if state.has_actions() {
        Ok(())
    } else {
        Err(GameError::illegal(format!(
            "player {} has no actions left",
            state.id()
        )))
    }
}
