//! Player records.
//!
//! A [`Player`] is the whole persisted state of one character. Engine
//! operations take `&mut Player`, validate first and only then write, so a
//! rejected operation leaves the record untouched.

use crate::attr_id::AttrId;
use crate::config::GameConfig;
use crate::error::ActionError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable player id (the chat user id).
pub type PlayerId = i64;

/// Sect id.
pub type SectId = i64;

/// What the player is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActivityState {
    #[default]
    Idle,
    /// Hurt while hunting; cannot hunt until `until`.
    Injured { until: NaiveDateTime },
    /// In secluded cultivation until `until`.
    Retreating { until: NaiveDateTime },
}

impl ActivityState {
    /// Whether an injury is still in effect at `now`.
    pub fn is_injured_at(&self, now: NaiveDateTime) -> bool {
        matches!(self, ActivityState::Injured { until } if now < *until)
    }

    /// In secluded cultivation, whether or not the end time has passed.
    pub fn is_retreating(&self) -> bool {
        matches!(self, ActivityState::Retreating { .. })
    }

    /// Whether the player may take part in hunts and duels at `now`.
    pub fn is_available_at(&self, now: NaiveDateTime) -> bool {
        !self.is_injured_at(now) && !self.is_retreating()
    }
}

/// Rank inside a sect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectRole {
    /// 弟子
    #[default]
    Disciple,
    /// 长老
    Elder,
    /// 副宗主
    ViceLeader,
    /// 宗主
    Leader,
}

/// A player's standing in their sect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectMembership {
    pub sect_id: SectId,
    pub role: SectRole,
    pub contribution: i64,
}

/// A persistent character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub username: String,
    pub name: String,
    pub level: u32,
    pub exp: u64,
    /// Current world; empty until the player travels somewhere.
    #[serde(default)]
    pub world: String,
    pub world_level: u32,
    /// Base attributes, before equipment and sect bonuses.
    pub attributes: BTreeMap<AttrId, f64>,
    pub currencies: BTreeMap<String, i64>,
    /// Item and equipment name to quantity. Quantities are always positive.
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
    /// Slot id to equipped item name.
    #[serde(default)]
    pub equipment: BTreeMap<String, String>,
    #[serde(default)]
    pub sect: Option<SectMembership>,
    #[serde(default)]
    pub activity: ActivityState,
    #[serde(default)]
    pub last_signin: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_hunt: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Player {
    /// Create a level-1 character with the configured starting kit.
    ///
    /// An empty `name` falls back to the configured default name.
    pub fn new(id: PlayerId, name: &str, config: &GameConfig, now: NaiveDateTime) -> Self {
        let name = if name.trim().is_empty() {
            config.new_player.name.clone()
        } else {
            name.trim().to_string()
        };
        Self {
            id,
            username: String::new(),
            name,
            level: 1,
            exp: 0,
            world: String::new(),
            world_level: 1,
            attributes: config.new_player.attributes.clone(),
            currencies: config.new_player.currencies.clone(),
            inventory: BTreeMap::new(),
            equipment: BTreeMap::new(),
            sect: None,
            activity: ActivityState::Idle,
            last_signin: None,
            last_hunt: None,
            created_at: now,
        }
    }

    /// Base value of `attr` (0 if absent).
    pub fn attribute(&self, attr: &str) -> f64 {
        self.attributes.get(attr).copied().unwrap_or(0.0)
    }

    pub(crate) fn add_attribute(&mut self, attr: &AttrId, amount: f64) {
        *self.attributes.entry(attr.clone()).or_insert(0.0) += amount;
    }

    /// Balance of `currency` (0 if absent).
    pub fn currency(&self, currency: &str) -> i64 {
        self.currencies.get(currency).copied().unwrap_or(0)
    }

    /// Add `amount` to `currency`, opening the balance if needed.
    pub fn credit(&mut self, currency: &str, amount: i64) {
        *self.currencies.entry(currency.to_string()).or_insert(0) += amount;
    }

    /// Held quantity of `name`.
    pub fn quantity(&self, name: &str) -> u32 {
        self.inventory.get(name).copied().unwrap_or(0)
    }

    /// Add `quantity` units of `name` to the inventory.
    pub fn grant(&mut self, name: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.inventory.entry(name.to_string()).or_insert(0) += quantity;
    }

    /// Remove one unit of `name`, dropping the entry when it reaches zero.
    ///
    /// Returns `false` (and changes nothing) if none is held.
    pub fn take_one(&mut self, name: &str) -> bool {
        match self.inventory.get_mut(name) {
            Some(qty) if *qty > 1 => {
                *qty -= 1;
                true
            }
            Some(_) => {
                self.inventory.remove(name);
                true
            }
            None => false,
        }
    }

    /// Item equipped in `slot`, if any.
    pub fn equipped(&self, slot: &str) -> Option<&str> {
        self.equipment
            .get(slot)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Sect the player belongs to.
    pub fn sect_id(&self) -> Option<SectId> {
        self.sect.as_ref().map(|m| m.sect_id)
    }

    /// Change the display name.
    pub fn rename(&mut self, name: &str, config: &GameConfig) -> Result<(), ActionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ActionError::InvalidName("name is empty".into()));
        }
        if name.chars().count() > config.max_name_len {
            return Err(ActionError::InvalidName(format!(
                "longer than {} characters",
                config.max_name_len
            )));
        }
        log::debug!("player {} renamed {} -> {}", self.id, self.name, name);
        self.name = name.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_player_defaults() {
        let config = GameConfig::default();
        let player = Player::new(42, "", &config, at(8));
        assert_eq!(player.name, "修仙者");
        assert_eq!(player.level, 1);
        assert_eq!(player.world_level, 1);
        assert_eq!(player.attribute("生命值"), 1000.0);
        assert_eq!(player.currency("下品灵石"), 1000);
        assert_eq!(player.activity, ActivityState::Idle);
    }

    #[test]
    fn test_inventory_never_holds_zero() {
        let config = GameConfig::default();
        let mut player = Player::new(1, "韩立", &config, at(8));
        player.grant("回春丹", 2);
        player.grant("回春丹", 0);
        assert_eq!(player.quantity("回春丹"), 2);

        assert!(player.take_one("回春丹"));
        assert!(player.take_one("回春丹"));
        assert!(!player.inventory.contains_key("回春丹"));
        assert!(!player.take_one("回春丹"));
    }

    #[test]
    fn test_injury_expiry() {
        let state = ActivityState::Injured { until: at(12) };
        assert!(state.is_injured_at(at(11)));
        assert!(!state.is_injured_at(at(12)));
        assert!(state.is_available_at(at(13)));
        assert!(!ActivityState::Retreating { until: at(1) }.is_available_at(at(13)));
    }

    #[test]
    fn test_rename_limits() {
        let config = GameConfig::default();
        let mut player = Player::new(1, "韩立", &config, at(8));
        assert!(player.rename("   ", &config).is_err());
        let long: String = std::iter::repeat('仙').take(21).collect();
        assert!(player.rename(&long, &config).is_err());
        assert_eq!(player.name, "韩立");

        player.rename(" 厉飞雨 ", &config).unwrap();
        assert_eq!(player.name, "厉飞雨");
    }

    #[test]
    fn test_activity_state_serde_tag() {
        let json = serde_json::to_value(ActivityState::Retreating { until: at(6) }).unwrap();
        assert_eq!(json["state"], "retreating");
    }
}
