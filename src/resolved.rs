//! Resolved attribute results.
//!
//! [`ResolvedAttribute`] is one attribute's final value plus the breakdown
//! of every source and transform that produced it. [`AttributeSheet`] is
//! the full set of effective attributes for a player.

use crate::attr_id::AttrId;
use crate::source::SourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved attribute value with its breakdown.
///
/// # Examples
///
/// ```rust
/// use xianlu::{AttrId, ResolvedAttribute};
/// use xianlu::source::SourceKind;
///
/// let mut resolved = ResolvedAttribute::new(AttrId::from_str("攻击力"), 130.0);
/// resolved.add_source(SourceKind::Base, 100.0);
/// resolved.add_source(SourceKind::Equipment("青锋剑".into()), 30.0);
///
/// assert_eq!(resolved.base(), 100.0);
/// assert_eq!(resolved.bonus(), 30.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAttribute {
    /// The attribute.
    pub attr: AttrId,

    /// Final value.
    pub value: f64,

    /// Source contributions in aggregation order (base, equipment, sect).
    pub sources: Vec<(SourceKind, f64)>,

    /// Transforms applied, with the value after each one.
    pub transforms: Vec<(String, f64)>,
}

impl ResolvedAttribute {
    /// Create a resolved attribute with an empty breakdown.
    pub fn new(attr: AttrId, value: f64) -> Self {
        Self {
            attr,
            value,
            sources: Vec::new(),
            transforms: Vec::new(),
        }
    }

    /// Record a source contribution.
    pub fn add_source(&mut self, kind: SourceKind, value: f64) {
        self.sources.push((kind, value));
    }

    /// Record a transform and the value it produced.
    pub fn add_transform(&mut self, description: impl Into<String>, value: f64) {
        self.transforms.push((description.into(), value));
    }

    /// The part contributed by the player's base attributes.
    pub fn base(&self) -> f64 {
        self.sources
            .iter()
            .filter(|(kind, _)| *kind == SourceKind::Base)
            .map(|(_, v)| v)
            .sum()
    }

    /// Everything on top of the base value.
    pub fn bonus(&self) -> f64 {
        self.value - self.base()
    }
}

/// A player's effective attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSheet {
    entries: BTreeMap<AttrId, ResolvedAttribute>,
}

impl AttributeSheet {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resolved attribute, replacing any previous entry.
    pub fn insert(&mut self, resolved: ResolvedAttribute) {
        self.entries.insert(resolved.attr.clone(), resolved);
    }

    /// Effective value of `attr`; attributes nobody contributes to are 0.
    pub fn get(&self, attr: &str) -> f64 {
        self.entries.get(attr).map(|r| r.value).unwrap_or(0.0)
    }

    /// Full breakdown of `attr`, if anything contributed to it.
    pub fn breakdown(&self, attr: &str) -> Option<&ResolvedAttribute> {
        self.entries.get(attr)
    }

    /// Iterate over resolved attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedAttribute> {
        self.entries.values()
    }

    /// Number of attributes on the sheet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sheet is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain `attribute -> value` map.
    pub fn to_map(&self) -> BTreeMap<AttrId, f64> {
        self.entries
            .iter()
            .map(|(attr, r)| (attr.clone(), r.value))
            .collect()
    }
}

impl FromIterator<ResolvedAttribute> for AttributeSheet {
    fn from_iter<I: IntoIterator<Item = ResolvedAttribute>>(iter: I) -> Self {
        let mut sheet = AttributeSheet::new();
        for resolved in iter {
            sheet.insert(resolved);
        }
        sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_and_bonus() {
        let mut hp = ResolvedAttribute::new(AttrId::from_str("生命值"), 1250.0);
        hp.add_source(SourceKind::Base, 1000.0);
        hp.add_source(SourceKind::Equipment("玄铁甲".into()), 200.0);
        hp.add_source(SourceKind::Sect("青云门".into()), 50.0);

        assert_eq!(hp.base(), 1000.0);
        assert_eq!(hp.bonus(), 250.0);
        assert_eq!(hp.sources[1].0, SourceKind::Equipment("玄铁甲".into()));
    }

    #[test]
    fn test_bonus_without_base() {
        let mut luck = ResolvedAttribute::new(AttrId::from_str("幸运值"), 3.0);
        luck.add_source(SourceKind::Sect("青云门".into()), 3.0);
        assert_eq!(luck.base(), 0.0);
        assert_eq!(luck.bonus(), 3.0);
    }

    #[test]
    fn test_sheet_lookup_defaults_to_zero() {
        let sheet: AttributeSheet = vec![ResolvedAttribute::new(AttrId::from_str("速度"), 100.0)]
            .into_iter()
            .collect();
        assert_eq!(sheet.get("速度"), 100.0);
        assert_eq!(sheet.get("韧性"), 0.0);
        assert!(sheet.breakdown("韧性").is_none());
        assert_eq!(sheet.len(), 1);
    }
}
