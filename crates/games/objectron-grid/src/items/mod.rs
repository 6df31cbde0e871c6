pub mod disk;
pub mod grenade;
pub mod teleporter;

use std::collections::BTreeMap;

use objectron_core::game_trait::{ItemId, PlayerId};
use objectron_core::geometry::Coordinate;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use disk::IdentityDisk;
use grenade::LightGrenade;
use teleporter::Teleporter;

/// An item and its variant state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    LightGrenade(LightGrenade),
    IdentityDisk(IdentityDisk),
    Teleporter(Teleporter),
    ForceFieldGenerator,
}

/// Item variant without state, for queries and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    LightGrenade,
    ChargedIdentityDisk,
    UnchargedIdentityDisk,
    Teleporter,
    ForceFieldGenerator,
}

impl ItemKind {
    pub fn is_identity_disk(self) -> bool {
        matches!(
            self,
            ItemKind::ChargedIdentityDisk | ItemKind::UnchargedIdentityDisk
        )
    }

    /// Single-character marker used by text renderers.
    pub fn symbol(self) -> char {
        match self {
            ItemKind::LightGrenade => 'L',
            ItemKind::ChargedIdentityDisk => 'C',
            ItemKind::UnchargedIdentityDisk => 'D',
            ItemKind::Teleporter => 'T',
            ItemKind::ForceFieldGenerator => 'G',
        }
    }
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::LightGrenade(_) => ItemKind::LightGrenade,
            Item::IdentityDisk(disk) if disk.is_charged() => ItemKind::ChargedIdentityDisk,
            Item::IdentityDisk(_) => ItemKind::UnchargedIdentityDisk,
            Item::Teleporter(_) => ItemKind::Teleporter,
            Item::ForceFieldGenerator => ItemKind::ForceFieldGenerator,
        }
    }

    /// Whether a player may pick this item up right now.
    pub fn check_carriable(&self) -> Result<(), GameError> {
        match self {
            Item::Teleporter(_) => Err(GameError::unsupported("teleporters cannot be picked up")),
            Item::LightGrenade(grenade) if !grenade.is_carriable() => Err(GameError::illegal(
                "only an inactive light grenade can be picked up",
            )),
            _ => Ok(()),
        }
    }
}

/// Where an item currently is. Exactly one holder at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Cell(Coordinate),
    Inventory(PlayerId),
    InFlight,
    /// Exploded grenades and destroyed disks.
    Consumed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEntry {
    pub item: Item,
    pub placement: Placement,
}

/// Owns every item of a game, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemStore {
    entries: BTreeMap<ItemId, ItemEntry>,
    next_id: ItemId,
}

impl ItemStore {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register a new item and return its id.
    pub fn insert(&mut self, item: Item, placement: Placement) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, ItemEntry { item, placement });
        id
    }

    pub fn entry(&self, id: ItemId) -> Result<&ItemEntry, GameError> {
        self.entries
            .get(&id)
            .ok_or_else(|| GameError::invalid(format!("no item with id {id}")))
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, GameError> {
        self.entry(id).map(|e| &e.item)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, GameError> {
        self.entries
            .get_mut(&id)
            .map(|e| &mut e.item)
            .ok_or_else(|| GameError::invalid(format!("no item with id {id}")))
    }

    pub fn kind(&self, id: ItemId) -> Option<ItemKind> {
        self.entries.get(&id).map(|e| e.item.kind())
    }

    pub fn placement(&self, id: ItemId) -> Option<Placement> {
        self.entries.get(&id).map(|e| e.placement)
    }

    pub fn set_placement(&mut self, id: ItemId, placement: Placement) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.placement = placement;
        }
    }

    pub fn grenade_mut(&mut self, id: ItemId) -> Result<&mut LightGrenade, GameError> {
        match self.item_mut(id)? {
            Item::LightGrenade(grenade) => Ok(grenade),
            _ => Err(GameError::invalid(format!("item {id} is not a light grenade"))),
        }
    }

    pub fn disk_mut(&mut self, id: ItemId) -> Result<&mut IdentityDisk, GameError> {
        match self.item_mut(id)? {
            Item::IdentityDisk(disk) => Ok(disk),
            _ => Err(GameError::invalid(format!("item {id} is not an identity disk"))),
        }
    }

    pub fn teleporter(&self, id: ItemId) -> Result<&Teleporter, GameError> {
        match self.item(id)? {
            Item::Teleporter(teleporter) => Ok(teleporter),
            _ => Err(GameError::invalid(format!("item {id} is not a teleporter"))),
        }
    }

    pub fn teleporter_mut(&mut self, id: ItemId) -> Result<&mut Teleporter, GameError> {
        match self.item_mut(id)? {
            Item::Teleporter(teleporter) => Ok(teleporter),
            _ => Err(GameError::invalid(format!("item {id} is not a teleporter"))),
        }
    }

    /// Cell a teleporter (or any other item) lies on.
    pub fn cell_of(&self, id: ItemId) -> Option<Coordinate> {
        match self.placement(id)? {
            Placement::Cell(at) => Some(at),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ItemEntry)> {
        self.entries.iter().map(|(&id, entry)| (id, entry))
    }
}
