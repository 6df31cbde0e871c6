//! Ordered effects applied to one occupant entering a cell.
//!
//! The chain is run front to back. Effects may append more effects while the
//! chain is running (a teleport queues up the effects of the cell it lands
//! on). Appending first consults the [`MergeRule`] table: when the pending
//! tail and the new effect form a known pair they are collapsed into one.

use objectron_core::game_trait::ItemId;

use crate::capability::Occupant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Send the occupant through a teleporter.
    Teleport { teleporter: ItemId },
    /// Explode an armed light grenade under the occupant.
    Explode { grenade: ItemId, boosted: bool },
    /// End the occupant's turn: the cell has no power.
    PowerFailure,
}

/// Effect variant without payload, used as the key of merge rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Teleport,
    Explode,
    PowerFailure,
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Teleport { .. } => EffectKind::Teleport,
            Effect::Explode { .. } => EffectKind::Explode,
            Effect::PowerFailure => EffectKind::PowerFailure,
        }
    }
}

/// Collapses a pending tail effect and a newly added effect into one.
#[derive(Debug, Clone, Copy)]
pub struct MergeRule {
    pub tail: EffectKind,
    pub incoming: EffectKind,
    pub merge: fn(&Effect, &Effect) -> Effect,
}

impl MergeRule {
    pub fn applies(&self, tail: &Effect, incoming: &Effect) -> bool {
        self.tail == tail.kind() && self.incoming == incoming.kind()
    }
}

/// A grenade going off in a cell without power hits harder; the power
/// failure itself is absorbed and never runs.
fn boost_explosion(a: &Effect, b: &Effect) -> Effect {
    match (a, b) {
        (Effect::Explode { grenade, .. }, _) | (_, Effect::Explode { grenade, .. }) => {
            Effect::Explode {
                grenade: *grenade,
                boosted: true,
            }
        },
        _ => *a,
    }
}

pub const DEFAULT_MERGE_RULES: &[MergeRule] = &[
    MergeRule {
        tail: EffectKind::PowerFailure,
        incoming: EffectKind::Explode,
        merge: boost_explosion,
    },
    MergeRule {
        tail: EffectKind::Explode,
        incoming: EffectKind::PowerFailure,
        merge: boost_explosion,
    },
];

/// Applies single effects on behalf of a running chain.
pub trait EffectContext {
    /// Apply `effect` to `target`. May append to `chain`.
    fn apply(&mut self, effect: Effect, target: Occupant, chain: &mut EffectChain);
}

#[derive(Debug, Clone)]
pub struct EffectChain {
    effects: Vec<Effect>,
    cursor: usize,
    rules: &'static [MergeRule],
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectChain {
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_MERGE_RULES)
    }

    pub fn with_rules(rules: &'static [MergeRule]) -> Self {
        Self {
            effects: Vec::new(),
            cursor: 0,
            rules,
        }
    }

    /// Append `effect`, or merge it into the tail if the tail has not run yet
    /// and a rule covers the pair.
    pub fn add_effect(&mut self, effect: Effect) {
        if self.effects.len() > self.cursor
            && let Some(tail) = self.effects.last_mut()
            && let Some(rule) = self.rules.iter().find(|r| r.applies(tail, &effect))
        {
            let merged = (rule.merge)(tail, &effect);
            tracing::debug!(?tail, incoming = ?effect, ?merged, "Merged effects");
            *tail = merged;
            return;
        }
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Effects that have not run yet.
    pub fn pending(&self) -> &[Effect] {
        &self.effects[self.cursor..]
    }

    /// Run every pending effect against `target`, including effects appended
    /// along the way. An empty chain does nothing.
    pub fn execute<C: EffectContext>(&mut self, target: Occupant, context: &mut C) {
        while let Some(&effect) = self.effects.get(self.cursor) {
            self.cursor += 1;
            context.apply(effect, target, self);
        }
    }
}
