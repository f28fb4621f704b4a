//! Attribute sources.
//!
//! Sources contribute flat values to attributes. Every source carries a
//! [`SourceKind`] so the resolved breakdown can show where each part of an
//! effective attribute came from (base, a piece of equipment, the sect).
//! Multiple sources for the same attribute are summed.

use crate::attr_id::AttrId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where an attribute contribution came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum SourceKind {
    /// The player's own base attributes.
    Base,
    /// An equipped item, by name.
    Equipment(String),
    /// Buffs of the player's sect, by sect name.
    Sect(String),
    /// An already-aggregated attribute sheet.
    Effective,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Base => f.write_str("base"),
            SourceKind::Equipment(name) => write!(f, "equipment:{}", name),
            SourceKind::Sect(name) => write!(f, "sect:{}", name),
            SourceKind::Effective => f.write_str("effective"),
        }
    }
}

/// Trait for values that contribute to attributes.
///
/// Implementations are stateless and deterministic.
pub trait AttributeSource: Send + Sync {
    /// Label used in resolved breakdowns.
    fn kind(&self) -> SourceKind;

    /// Attributes this source contributes to, in a stable order.
    fn attributes(&self) -> Vec<AttrId>;

    /// Contribution to `attr`, or `None` if this source does not touch it.
    fn get_value(&self, attr: &AttrId) -> Option<f64>;
}

/// A source backed by an attribute map.
///
/// # Examples
///
/// ```rust
/// use xianlu::source::{AttributeSource, MapSource, SourceKind};
/// use xianlu::AttrId;
///
/// let mut source = MapSource::empty(SourceKind::Equipment("青锋剑".into()));
/// source.insert(AttrId::from_str("攻击力"), 30.0);
///
/// assert_eq!(source.get_value(&AttrId::from_str("攻击力")), Some(30.0));
/// assert_eq!(source.get_value(&AttrId::from_str("速度")), None);
/// ```
#[derive(Debug, Clone)]
pub struct MapSource {
    kind: SourceKind,
    values: BTreeMap<AttrId, f64>,
}

impl MapSource {
    /// Create a source from an existing attribute map.
    pub fn new(kind: SourceKind, values: BTreeMap<AttrId, f64>) -> Self {
        Self { kind, values }
    }

    /// Create an empty source.
    pub fn empty(kind: SourceKind) -> Self {
        Self::new(kind, BTreeMap::new())
    }

    /// Insert a contribution.
    pub fn insert(&mut self, attr: AttrId, value: f64) {
        self.values.insert(attr, value);
    }
}

impl AttributeSource for MapSource {
    fn kind(&self) -> SourceKind {
        self.kind.clone()
    }

    fn attributes(&self) -> Vec<AttrId> {
        self.values.keys().cloned().collect()
    }

    fn get_value(&self, attr: &AttrId) -> Option<f64> {
        self.values.get(attr).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source() {
        let mut values = BTreeMap::new();
        values.insert(AttrId::from_str("生命值"), 1000.0);
        values.insert(AttrId::from_str("攻击力"), 100.0);
        let source = MapSource::new(SourceKind::Base, values);

        assert_eq!(source.kind(), SourceKind::Base);
        assert_eq!(source.attributes().len(), 2);
        assert_eq!(source.get_value(&AttrId::from_str("生命值")), Some(1000.0));
        assert_eq!(source.get_value(&AttrId::from_str("韧性")), None);
    }

    #[test]
    fn test_source_kind_labels() {
        assert_eq!(SourceKind::Base.to_string(), "base");
        assert_eq!(
            SourceKind::Equipment("玄铁甲".into()).to_string(),
            "equipment:玄铁甲"
        );
        assert_eq!(SourceKind::Sect("青云门".into()).to_string(), "sect:青云门");
    }
}
