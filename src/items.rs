//! Equipping gear and using items.

use crate::catalog::{Catalog, Effect, Equipment};
use crate::config::GameConfig;
use crate::error::ActionError;
use crate::player::Player;
use crate::progression::{level_up, LevelGain};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a successful equip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipOutcome {
    pub slot: String,
    pub equipped: String,
    /// Item previously in the slot, now back in the inventory.
    pub replaced: Option<String>,
}

impl fmt::Display for EquipOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "equipped {} in {}", self.equipped, self.slot)?;
        if let Some(old) = &self.replaced {
            write!(f, ", {} returned to inventory", old)?;
        }
        Ok(())
    }
}

/// One effect as it was actually applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppliedEffect {
    Attribute { attribute: String, amount: f64 },
    Experience { amount: u64 },
    LevelUp { gains: Vec<LevelGain> },
    Currency { currency: String, amount: i64 },
    /// Unknown attribute or currency the player does not hold.
    Ignored { effect: Effect },
}

impl fmt::Display for AppliedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedEffect::Attribute { attribute, amount } => write!(f, "{}+{}", attribute, amount),
            AppliedEffect::Experience { amount } => write!(f, "exp+{}", amount),
            AppliedEffect::LevelUp { gains } => match gains.last() {
                Some(gain) => write!(f, "level {}", gain.level),
                None => f.write_str("not enough exp to level up"),
            },
            AppliedEffect::Currency { currency, amount } => write!(f, "{}+{}", currency, amount),
            AppliedEffect::Ignored { .. } => f.write_str("no effect"),
        }
    }
}

/// Result of a successful item use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUseOutcome {
    pub item: String,
    pub effects: Vec<AppliedEffect>,
}

impl fmt::Display for ItemUseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "used {}", self.item)?;
        let parts: Vec<String> = self
            .effects
            .iter()
            .filter(|e| !matches!(e, AppliedEffect::Ignored { .. }))
            .map(ToString::to_string)
            .collect();
        if !parts.is_empty() {
            write!(f, ": {}", parts.join(", "))?;
        }
        Ok(())
    }
}

/// Check level and world-tier requirements.
pub fn can_equip(player: &Player, equipment: &Equipment) -> Result<(), ActionError> {
    if player.level < equipment.level_requirement {
        return Err(ActionError::LevelTooLow {
            required: equipment.level_requirement,
            current: player.level,
        });
    }
    if player.world_level < equipment.world_level_requirement {
        return Err(ActionError::WorldLevelTooLow {
            required: equipment.world_level_requirement,
            current: player.world_level,
        });
    }
    Ok(())
}

/// Equip one unit of `name` from the inventory.
///
/// Whatever occupied the slot goes back to the inventory.
pub fn equip_item(
    player: &mut Player,
    name: &str,
    catalog: &dyn Catalog,
    config: &GameConfig,
) -> Result<EquipOutcome, ActionError> {
    if player.quantity(name) == 0 {
        return Err(ActionError::NotInInventory(name.to_string()));
    }
    let equipment = catalog
        .equipment(name)
        .ok_or_else(|| ActionError::EquipmentNotFound(name.to_string()))?;
    if config.slot(&equipment.slot).is_none() {
        return Err(ActionError::UnknownSlot(equipment.slot.clone()));
    }
    can_equip(player, equipment)?;

    let slot = equipment.slot.clone();
    let replaced = player.equipped(&slot).map(str::to_string);
    if let Some(old) = &replaced {
        player.grant(old, 1);
    }
    player.equipment.insert(slot.clone(), name.to_string());
    player.take_one(name);

    log::debug!("player {} equipped {} in {}", player.id, name, slot);
    Ok(EquipOutcome {
        slot,
        equipped: name.to_string(),
        replaced,
    })
}

/// Use one unit of `name`, applying its effects in order.
///
/// Experience gained here does not trigger further level-ups; callers run
/// [`resolve_level_ups`](crate::progression::resolve_level_ups) if they
/// want the cascade.
pub fn use_item(
    player: &mut Player,
    name: &str,
    catalog: &dyn Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<ItemUseOutcome, ActionError> {
    if player.quantity(name) == 0 {
        return Err(ActionError::NotInInventory(name.to_string()));
    }
    let item = catalog
        .item(name)
        .ok_or_else(|| ActionError::ItemNotFound(name.to_string()))?;
    if !item.usable {
        return Err(ActionError::NotUsable(name.to_string()));
    }

    let mut applied = Vec::with_capacity(item.effects.len());
    for effect in &item.effects {
        applied.push(apply_effect(player, effect, config, rng));
    }
    player.take_one(name);

    log::debug!("player {} used {}", player.id, name);
    Ok(ItemUseOutcome {
        item: name.to_string(),
        effects: applied,
    })
}

fn apply_effect(
    player: &mut Player,
    effect: &Effect,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> AppliedEffect {
    match effect {
        Effect::Attribute { attribute, amount } if config.is_attribute(attribute.as_str()) => {
            player.add_attribute(attribute, *amount);
            AppliedEffect::Attribute {
                attribute: attribute.to_string(),
                amount: *amount,
            }
        }
        Effect::Experience(amount) => {
            player.exp = player.exp.saturating_add(*amount);
            AppliedEffect::Experience { amount: *amount }
        }
        Effect::LevelUp(attempts) => {
            let mut gains = Vec::new();
            for _ in 0..*attempts {
                if let Some(gain) = level_up(player, config, rng) {
                    gains.push(gain);
                }
            }
            AppliedEffect::LevelUp { gains }
        }
        Effect::Currency { currency, amount } if player.currencies.contains_key(currency) => {
            player.credit(currency, *amount);
            AppliedEffect::Currency {
                currency: currency.clone(),
                amount: *amount,
            }
        }
        other => AppliedEffect::Ignored {
            effect: other.clone(),
        },
    }
}
