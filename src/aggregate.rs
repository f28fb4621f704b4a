//! Effective attributes.
//!
//! Base attributes, equipment bonuses and sect buffs are registered as
//! sources on an [`AttributeResolver`] in that order, so every attribute's
//! breakdown reads base, then each equipped item, then the sect.

use crate::attr_id::AttrId;
use crate::catalog::{Catalog, Equipment, Sect};
use crate::error::StatError;
use crate::player::Player;
use crate::resolved::AttributeSheet;
use crate::resolver::AttributeResolver;
use crate::source::{MapSource, SourceKind};
use std::collections::BTreeMap;

/// Aggregate base attributes with equipment bonuses and sect buffs.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use xianlu::aggregate::aggregate;
/// use xianlu::catalog::Equipment;
/// use xianlu::AttrId;
///
/// let base: BTreeMap<AttrId, f64> = [(AttrId::from_str("攻击力"), 100.0)].into_iter().collect();
/// let sword = Equipment::new("青锋剑", "武器", "精良").with_attribute("攻击力", 30.0);
///
/// let sheet = aggregate(&base, &[&sword], None).unwrap();
/// assert_eq!(sheet.get("攻击力"), 130.0);
/// assert_eq!(sheet.breakdown("攻击力").unwrap().bonus(), 30.0);
/// ```
pub fn aggregate(
    base: &BTreeMap<AttrId, f64>,
    equipment: &[&Equipment],
    sect: Option<&Sect>,
) -> Result<AttributeSheet, StatError> {
    let mut resolver = AttributeResolver::new();
    resolver.register_source(Box::new(MapSource::new(SourceKind::Base, base.clone())));
    for item in equipment {
        resolver.register_source(Box::new(MapSource::new(
            SourceKind::Equipment(item.name.clone()),
            item.attributes.clone(),
        )));
    }
    if let Some(sect) = sect {
        resolver.register_source(Box::new(MapSource::new(
            SourceKind::Sect(sect.name.clone()),
            sect.buffs.clone(),
        )));
    }
    Ok(resolver.resolve_all()?.clone())
}

/// Effective attributes of `player`, looking up equipment and sect records
/// in `catalog`. Records missing from the catalog contribute nothing.
pub fn effective_attributes(
    player: &Player,
    catalog: &dyn Catalog,
) -> Result<AttributeSheet, StatError> {
    let mut equipped = Vec::new();
    for (slot, name) in &player.equipment {
        if name.is_empty() {
            continue;
        }
        match catalog.equipment(name) {
            Some(record) => equipped.push(record),
            None => log::warn!(
                "player {} has {} equipped in {} but no record exists",
                player.id,
                name,
                slot
            ),
        }
    }

    let sect = match player.sect_id() {
        Some(id) => {
            let record = catalog.sect(id);
            if record.is_none() {
                log::warn!("player {} belongs to missing sect {}", player.id, id);
            }
            record
        }
        None => None,
    };

    aggregate(&player.attributes, &equipped, sect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::config::GameConfig;
    use crate::player::{SectMembership, SectRole};
    use chrono::NaiveDate;

    fn player() -> Player {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Player::new(1, "韩立", &GameConfig::default(), now)
    }

    #[test]
    fn test_equipment_and_sect_bonuses() {
        let config = GameConfig::default();
        let mut catalog = MemoryCatalog::new();
        catalog.add_equipment(
            Equipment::new("玄铁甲", "服饰", "精良")
                .with_attribute("生命值", 200.0)
                .with_attribute("韧性", 5.0),
        );
        catalog.add_sect(Sect::new(3, "青云门", 99, &config).with_buff("生命值", 50.0));

        let mut player = player();
        player.equipment.insert("服饰".into(), "玄铁甲".into());
        player.sect = Some(SectMembership {
            sect_id: 3,
            role: SectRole::Disciple,
            contribution: 0,
        });

        let sheet = effective_attributes(&player, &catalog).unwrap();
        assert_eq!(sheet.get("生命值"), 1250.0);
        assert_eq!(sheet.get("韧性"), 15.0);

        let hp = sheet.breakdown("生命值").unwrap();
        assert_eq!(hp.base(), 1000.0);
        assert_eq!(hp.bonus(), 250.0);
        assert_eq!(hp.sources[1].0, SourceKind::Equipment("玄铁甲".into()));
        assert_eq!(hp.sources[2].0, SourceKind::Sect("青云门".into()));
    }

    #[test]
    fn test_missing_records_are_skipped() {
        let catalog = MemoryCatalog::new();
        let mut player = player();
        player.equipment.insert("武器".into(), "失传之剑".into());
        player.sect = Some(SectMembership {
            sect_id: 404,
            role: SectRole::Disciple,
            contribution: 0,
        });

        let sheet = effective_attributes(&player, &catalog).unwrap();
        assert_eq!(sheet.get("攻击力"), 100.0);
    }

    #[test]
    fn test_bonus_to_attribute_missing_from_base() {
        let base = BTreeMap::new();
        let charm = Equipment::new("幸运符", "护符", "稀有").with_attribute("幸运值", 3.0);
        let sheet = aggregate(&base, &[&charm], None).unwrap();
        assert_eq!(sheet.get("幸运值"), 3.0);
    }
}
