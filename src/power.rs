//! Combat power.
//!
//! Combat power is a derived attribute: the effective sheet is registered
//! as a single source and [`COMBAT_POWER`] gets one [`ScalingTransform`]
//! per configured weight, applied in table order.

use crate::aggregate::effective_attributes;
use crate::attr_id::{AttrId, COMBAT_POWER};
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::error::StatError;
use crate::player::Player;
use crate::resolved::{AttributeSheet, ResolvedAttribute};
use crate::resolver::AttributeResolver;
use crate::source::{MapSource, SourceKind};
use crate::transform::ScalingTransform;

/// Resolve combat power with its per-weight breakdown.
pub fn combat_power_breakdown(
    sheet: &AttributeSheet,
    config: &GameConfig,
) -> Result<ResolvedAttribute, StatError> {
    let power = AttrId::from_str(COMBAT_POWER);
    let mut resolver = AttributeResolver::new();
    resolver.register_source(Box::new(MapSource::new(
        SourceKind::Effective,
        sheet.to_map(),
    )));
    for weight in &config.combat_weights {
        resolver.register_transform(
            power.clone(),
            Box::new(ScalingTransform::new(weight.attribute.clone(), weight.weight)),
        );
    }
    resolver.resolve(&power)
}

/// Combat power of an effective attribute sheet, truncated toward zero.
///
/// # Examples
///
/// ```rust
/// use xianlu::{AttrId, AttributeSheet, GameConfig, ResolvedAttribute};
/// use xianlu::power::combat_power;
///
/// let sheet: AttributeSheet = vec![ResolvedAttribute::new(AttrId::from_str("攻击力"), 101.0)]
///     .into_iter()
///     .collect();
///
/// // 101 * 1.5 = 151.5
/// assert_eq!(combat_power(&sheet, &GameConfig::default()).unwrap(), 151);
/// ```
pub fn combat_power(sheet: &AttributeSheet, config: &GameConfig) -> Result<i64, StatError> {
    let resolved = combat_power_breakdown(sheet, config)?;
    Ok(resolved.value.trunc() as i64)
}

/// Combat power of `player` including equipment and sect bonuses.
pub fn player_combat_power(
    player: &Player,
    catalog: &dyn Catalog,
    config: &GameConfig,
) -> Result<i64, StatError> {
    let sheet = effective_attributes(player, catalog)?;
    combat_power(&sheet, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Equipment, MemoryCatalog};
    use crate::config::CombatWeight;
    use chrono::NaiveDate;

    fn sheet(values: &[(&str, f64)]) -> AttributeSheet {
        values
            .iter()
            .map(|(attr, v)| ResolvedAttribute::new(AttrId::from_str(attr), *v))
            .collect()
    }

    #[test]
    fn test_starting_player_power() {
        let config = GameConfig::default();
        let sheet: AttributeSheet = sheet(
            &config
                .new_player
                .attributes
                .iter()
                .map(|(a, v)| (a.as_str(), *v))
                .collect::<Vec<_>>(),
        );
        // 150 + 120 + 800 + 50 + 50 + 50 + 40
        assert_eq!(combat_power(&sheet, &config).unwrap(), 1260);
    }

    #[test]
    fn test_missing_attributes_count_as_zero() {
        let config = GameConfig::default();
        assert_eq!(combat_power(&AttributeSheet::new(), &config).unwrap(), 0);
        assert_eq!(combat_power(&sheet(&[("暴击率", 2.5)]), &config).unwrap(), 25);
    }

    #[test]
    fn test_truncates_toward_zero() {
        let config = GameConfig::default();
        assert_eq!(combat_power(&sheet(&[("速度", 3.0)]), &config).unwrap(), 1);
        assert_eq!(combat_power(&sheet(&[("速度", -3.0)]), &config).unwrap(), -1);
    }

    #[test]
    fn test_breakdown_lists_every_weight() {
        let config = GameConfig::default();
        let resolved = combat_power_breakdown(&sheet(&[("攻击力", 100.0)]), &config).unwrap();
        assert_eq!(resolved.transforms.len(), config.combat_weights.len());
        assert_eq!(resolved.transforms[0].1, 150.0);
    }

    #[test]
    fn test_self_weighted_power_is_a_cycle() {
        let mut config = GameConfig::default();
        config.combat_weights.push(CombatWeight {
            attribute: AttrId::from_str(COMBAT_POWER),
            weight: 1.0,
        });
        assert!(matches!(
            combat_power(&AttributeSheet::new(), &config),
            Err(StatError::Cycle { .. })
        ));
    }

    #[test]
    fn test_player_power_includes_equipment() {
        let config = GameConfig::default();
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut catalog = MemoryCatalog::new();
        catalog.add_equipment(
            Equipment::new("青锋剑", "武器", "精良").with_attribute("攻击力", 20.0),
        );
        let mut player = Player::new(1, "韩立", &config, now);
        let before = player_combat_power(&player, &catalog, &config).unwrap();
        player.equipment.insert("武器".into(), "青锋剑".into());
        let after = player_combat_power(&player, &catalog, &config).unwrap();
        assert_eq!(after - before, 30);
    }
}
