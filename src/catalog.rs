//! Read-only game content.
//!
//! Equipment, item, world and sect records are authored and stored outside
//! the engine. Operations look them up through the [`Catalog`] trait, which
//! the caller implements over whatever store it uses. [`MemoryCatalog`] is a
//! plain in-memory implementation.

use crate::attr_id::AttrId;
use crate::config::GameConfig;
use crate::player::{PlayerId, SectId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub name: String,
    /// Slot id, one of the configured slots.
    pub slot: String,
    pub quality: String,
    #[serde(default)]
    pub level_requirement: u32,
    #[serde(default)]
    pub world_level_requirement: u32,
    #[serde(default)]
    pub attributes: BTreeMap<AttrId, f64>,
    /// Free-form effects the engine does not interpret.
    #[serde(default)]
    pub special_effects: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub description: String,
}

impl Equipment {
    /// An unrestricted record with no attributes.
    pub fn new(
        name: impl Into<String>,
        slot: impl Into<String>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slot: slot.into(),
            quality: quality.into(),
            level_requirement: 0,
            world_level_requirement: 0,
            attributes: BTreeMap::new(),
            special_effects: BTreeMap::new(),
            description: String::new(),
        }
    }

    /// Builder-style attribute bonus.
    pub fn with_attribute(mut self, attr: &str, amount: f64) -> Self {
        self.attributes.insert(AttrId::from_str(attr), amount);
        self
    }

    /// Builder-style requirements.
    pub fn with_requirements(mut self, level: u32, world_level: u32) -> Self {
        self.level_requirement = level;
        self.world_level_requirement = world_level;
        self
    }
}

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Consumable,
    Material,
    Special,
}

/// One effect of a usable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Effect {
    /// Permanent change to a base attribute.
    Attribute { attribute: AttrId, amount: f64 },
    /// Experience points.
    Experience(u64),
    /// Number of forced level-up attempts.
    LevelUp(u32),
    /// Currency credited to an existing balance.
    Currency { currency: String, amount: i64 },
}

/// Legacy key for experience effects.
pub const EXPERIENCE_KEY: &str = "经验";
/// Legacy key for forced level-ups.
pub const LEVEL_UP_KEY: &str = "升级";

impl Effect {
    /// Classify a legacy `name -> magnitude` effect entry.
    ///
    /// Attribute names win over the experience and level-up keys; anything
    /// unrecognized is treated as a currency.
    pub fn classify(key: &str, magnitude: f64, config: &GameConfig) -> Effect {
        if config.is_attribute(key) {
            Effect::Attribute {
                attribute: AttrId::from_str(key),
                amount: magnitude,
            }
        } else if key == EXPERIENCE_KEY {
            Effect::Experience(magnitude.max(0.0) as u64)
        } else if key == LEVEL_UP_KEY {
            Effect::LevelUp(magnitude.max(0.0) as u32)
        } else {
            Effect::Currency {
                currency: key.to_string(),
                amount: magnitude as i64,
            }
        }
    }
}

/// A consumable, material or special item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub usable: bool,
    #[serde(default)]
    pub description: String,
}

impl Item {
    /// A usable consumable with the given effects.
    pub fn consumable(name: impl Into<String>, effects: Vec<Effect>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Consumable,
            effects,
            usable: true,
            description: String::new(),
        }
    }

    /// Build an item from a legacy effect map, classifying every entry.
    pub fn from_effect_map(
        name: impl Into<String>,
        kind: ItemKind,
        effects: &BTreeMap<String, f64>,
        usable: bool,
        config: &GameConfig,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            effects: effects
                .iter()
                .map(|(key, magnitude)| Effect::classify(key, *magnitude, config))
                .collect(),
            usable,
            description: String::new(),
        }
    }
}

/// A world players can travel to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub name: String,
    pub world_level: u32,
    #[serde(default)]
    pub description: String,
    /// Primary currency; the configured default when absent.
    #[serde(default)]
    pub currency: Option<String>,
}

/// An artifact placed in a sect's defensive array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectContribution {
    pub id: u64,
    pub player_id: PlayerId,
    pub artifact_name: String,
    pub value: i64,
    pub contributed_at: NaiveDateTime,
}

/// A sect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sect {
    pub id: SectId,
    pub name: String,
    pub leader_id: PlayerId,
    #[serde(default)]
    pub description: String,
    pub level: u32,
    #[serde(default)]
    pub exp: u64,
    pub max_members: u32,
    /// Bonuses applied to every member's effective attributes.
    #[serde(default)]
    pub buffs: BTreeMap<AttrId, f64>,
    /// Sum of contribution values.
    #[serde(default)]
    pub defense: i64,
    #[serde(default)]
    pub members: BTreeSet<PlayerId>,
    #[serde(default)]
    pub contributions: Vec<SectContribution>,
}

impl Sect {
    /// A level-1 sect with the configured member cap. The leader is not
    /// a member until they join.
    pub fn new(
        id: SectId,
        name: impl Into<String>,
        leader_id: PlayerId,
        config: &GameConfig,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            leader_id,
            description: String::new(),
            level: 1,
            exp: 0,
            max_members: config.sect.max_members,
            buffs: BTreeMap::new(),
            defense: 0,
            members: BTreeSet::new(),
            contributions: Vec::new(),
        }
    }

    /// Builder-style member buff.
    pub fn with_buff(mut self, attr: &str, amount: f64) -> Self {
        self.buffs.insert(AttrId::from_str(attr), amount);
        self
    }
}

/// Lookup of content records by key.
pub trait Catalog {
    /// Equipment record by item name.
    fn equipment(&self, name: &str) -> Option<&Equipment>;

    /// Item record by name. Equipment has no item record.
    fn item(&self, name: &str) -> Option<&Item>;

    /// World record by name.
    fn world(&self, name: &str) -> Option<&World>;

    /// Sect record by id.
    fn sect(&self, id: SectId) -> Option<&Sect>;

    /// Every equipment record, in a stable order. Used for drops.
    fn equipment_pool(&self) -> Vec<&Equipment>;
}

/// A [`Catalog`] held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCatalog {
    #[serde(default)]
    pub equipment: BTreeMap<String, Equipment>,
    #[serde(default)]
    pub items: BTreeMap<String, Item>,
    #[serde(default)]
    pub worlds: BTreeMap<String, World>,
    #[serde(default)]
    pub sects: BTreeMap<SectId, Sect>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_equipment(&mut self, equipment: Equipment) {
        self.equipment.insert(equipment.name.clone(), equipment);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.insert(item.name.clone(), item);
    }

    pub fn add_world(&mut self, world: World) {
        self.worlds.insert(world.name.clone(), world);
    }

    /// Insert or replace the sect with the same id.
    pub fn add_sect(&mut self, sect: Sect) {
        self.sects.insert(sect.id, sect);
    }

    /// Stored sect record, for membership and contribution changes.
    pub fn sect_mut(&mut self, id: SectId) -> Option<&mut Sect> {
        self.sects.get_mut(&id)
    }
}

impl Catalog for MemoryCatalog {
    fn equipment(&self, name: &str) -> Option<&Equipment> {
        self.equipment.get(name)
    }

    fn item(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    fn world(&self, name: &str) -> Option<&World> {
        self.worlds.get(name)
    }

    fn sect(&self, id: SectId) -> Option<&Sect> {
        self.sects.get(&id)
    }

    fn equipment_pool(&self) -> Vec<&Equipment> {
        self.equipment.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_precedence() {
        let config = GameConfig::default();
        assert_eq!(
            Effect::classify("攻击力", 10.0, &config),
            Effect::Attribute {
                attribute: AttrId::from_str("攻击力"),
                amount: 10.0
            }
        );
        assert_eq!(Effect::classify("经验", 150.0, &config), Effect::Experience(150));
        assert_eq!(Effect::classify("升级", 2.0, &config), Effect::LevelUp(2));
        assert_eq!(
            Effect::classify("中品灵石", 5.0, &config),
            Effect::Currency {
                currency: "中品灵石".into(),
                amount: 5
            }
        );
    }

    #[test]
    fn test_classify_attribute_named_like_reserved_key() {
        let mut config = GameConfig::default();
        config.attributes.push(AttrId::from_str("经验"));
        assert!(matches!(
            Effect::classify("经验", 1.0, &config),
            Effect::Attribute { .. }
        ));
    }

    #[test]
    fn test_item_from_effect_map() {
        let config = GameConfig::default();
        let effects: BTreeMap<String, f64> =
            [("经验".to_string(), 50.0), ("速度".to_string(), 2.0)].into_iter().collect();
        let item = Item::from_effect_map("悟道丹", ItemKind::Consumable, &effects, true, &config);
        assert_eq!(item.effects.len(), 2);
        assert!(item.effects.contains(&Effect::Experience(50)));
    }

    #[test]
    fn test_memory_catalog_lookup() {
        let config = GameConfig::default();
        let mut catalog = MemoryCatalog::new();
        catalog.add_equipment(
            Equipment::new("青锋剑", "武器", "精良").with_attribute("攻击力", 30.0),
        );
        catalog.add_sect(Sect::new(7, "青云门", 1, &config));

        assert_eq!(catalog.equipment("青锋剑").unwrap().slot, "武器");
        assert!(catalog.item("青锋剑").is_none());
        assert_eq!(catalog.sect(7).unwrap().max_members, 50);
        assert_eq!(catalog.equipment_pool().len(), 1);
    }

    #[test]
    fn test_effect_serde_tag() {
        let json = serde_json::to_value(Effect::Experience(5)).unwrap();
        assert_eq!(json["type"], "experience");
    }
}
