//! Attribute identifier module.
//!
//! Provides the `AttrId` type, an interned string identifier for player
//! attributes, together with the names of the attributes the default
//! balance tables refer to. The engine never hardcodes an attribute list;
//! recognized attributes come from [`GameConfig`](crate::config::GameConfig).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::sync::Arc;

/// Attack (攻击力).
pub const ATTACK: &str = "攻击力";
/// Defense (防御力).
pub const DEFENSE: &str = "防御力";
/// Health (生命值).
pub const HEALTH: &str = "生命值";
/// Mana (法力值).
pub const MANA: &str = "法力值";
/// Speed (速度).
pub const SPEED: &str = "速度";
/// Critical hit rate (暴击率).
pub const CRIT_RATE: &str = "暴击率";
/// Evasion rate (闪避率).
pub const EVASION: &str = "闪避率";
/// Accuracy (命中率).
pub const ACCURACY: &str = "命中率";
/// Spell power (法术强度).
pub const SPELL_POWER: &str = "法术强度";
/// Tenacity (韧性).
pub const TENACITY: &str = "韧性";
/// Luck (幸运值).
pub const LUCK: &str = "幸运值";

/// Derived attribute holding the combat-power scalar.
pub const COMBAT_POWER: &str = "战斗力";

/// Interned string identifier for attributes.
///
/// Uses `Arc<str>` so that cloning an id between attribute maps,
/// breakdowns and configuration tables never copies the name.
///
/// # Examples
///
/// ```rust
/// use xianlu::AttrId;
///
/// let atk = AttrId::from_str("攻击力");
/// let atk2: AttrId = "攻击力".into();
///
/// assert_eq!(atk, atk2);
/// assert_eq!(atk.as_str(), xianlu::attr_id::ATTACK);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct AttrId(Arc<str>);

impl Serialize for AttrId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttrId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AttrId::from(s))
    }
}

impl AttrId {
    /// Create a new `AttrId` from a string slice.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// The attribute name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AttrId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttrId {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for AttrId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl std::fmt::Display for AttrId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_attr_id_equality() {
        let a = AttrId::from_str(ATTACK);
        let b: AttrId = String::from(ATTACK).into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), ATTACK);
    }

    #[test]
    fn test_map_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(AttrId::from_str(SPEED), 12.0);
        assert_eq!(map.get(SPEED), Some(&12.0));
        assert_eq!(map.get(LUCK), None);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&AttrId::from_str(DEFENSE)).unwrap();
        assert_eq!(json, "\"防御力\"");
        let back: AttrId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), DEFENSE);
    }
}
