//! Timed activities: hunting, secluded cultivation, daily sign-in and travel.
//!
//! Every function takes the clock as a `now` parameter and randomness as an
//! injected [`Rng`]. Injuries expire lazily: an `Injured` state whose expiry
//! has passed is cleared by the next activity that checks it.

use crate::catalog::{Catalog, Equipment};
use crate::config::{Difficulty, GameConfig};
use crate::error::ActionError;
use crate::items::can_equip;
use crate::player::{ActivityState, Player};
use crate::progression::{resolve_level_ups, LevelGain};
use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a hunt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuntReport {
    pub difficulty: Difficulty,
    /// Uniform draw in `[0, 1)` checked against the injury rate.
    pub injury_roll: f64,
    pub injured_until: Option<NaiveDateTime>,
    pub exp_gained: u64,
    pub currency: String,
    pub currency_gained: i64,
    /// Uniform draw checked against the drop chance (absent when injured).
    pub drop_roll: Option<f64>,
    pub dropped: Option<String>,
    pub level_gains: Vec<LevelGain>,
}

impl HuntReport {
    pub fn injured(&self) -> bool {
        self.injured_until.is_some()
    }
}

impl fmt::Display for HuntReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(until) = self.injured_until {
            return write!(f, "injured while hunting, recovering until {}", until);
        }
        write!(
            f,
            "hunt succeeded: exp+{}, {}+{}",
            self.exp_gained, self.currency, self.currency_gained
        )?;
        if let Some(item) = &self.dropped {
            write!(f, ", found {}", item)?;
        }
        for gain in &self.level_gains {
            write!(f, "; {}", gain)?;
        }
        Ok(())
    }
}

/// Outcome of entering secluded cultivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetreatReport {
    pub hours: u32,
    pub until: NaiveDateTime,
    pub currency: String,
    pub reward: i64,
}

impl fmt::Display for RetreatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entered secluded cultivation for {}h until {}, {}+{}",
            self.hours, self.until, self.currency, self.reward
        )
    }
}

/// Outcome of the daily sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigninReport {
    pub currency: String,
    pub reward: i64,
    pub signed_in_at: NaiveDateTime,
}

impl fmt::Display for SigninReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signed in, {}+{}", self.currency, self.reward)
    }
}

/// Primary currency of `world`, or the configured default.
pub fn world_currency(world: &str, catalog: &dyn Catalog, config: &GameConfig) -> String {
    catalog
        .world(world)
        .and_then(|w| w.currency.clone())
        .unwrap_or_else(|| config.default_currency.clone())
}

/// Hours an injury lasts at `level`.
pub fn injury_hours(level: u32, config: &GameConfig) -> u32 {
    let hunt = &config.hunt;
    let reduction = level / hunt.levels_per_injury_hour.max(1);
    hunt.injury_base_hours
        .saturating_sub(reduction)
        .max(hunt.min_injury_hours)
}

fn injured_error(until: NaiveDateTime, now: NaiveDateTime) -> ActionError {
    let remaining = until - now;
    ActionError::Injured {
        hours: remaining.num_hours(),
        minutes: remaining.num_minutes() % 60,
    }
}

/// Reject an unexpired injury, then clear an expired one.
fn check_injury(player: &Player, now: NaiveDateTime) -> Result<(), ActionError> {
    match player.activity {
        ActivityState::Injured { until } if now < until => Err(injured_error(until, now)),
        _ => Ok(()),
    }
}

pub(crate) fn clear_expired_injury(player: &mut Player, now: NaiveDateTime) {
    if let ActivityState::Injured { until } = player.activity {
        if now >= until {
            log::debug!("player {} recovered from injury", player.id);
            player.activity = ActivityState::Idle;
        }
    }
}

/// Hunt at `difficulty`.
pub fn hunt(
    player: &mut Player,
    difficulty: Difficulty,
    now: NaiveDateTime,
    catalog: &dyn Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<HuntReport, ActionError> {
    if let ActivityState::Retreating { until } = player.activity {
        return Err(ActionError::Retreating { until });
    }
    check_injury(player, now)?;
    let preset = config
        .hunt
        .preset(difficulty)
        .ok_or_else(|| ActionError::UnknownDifficulty(difficulty.to_string()))?;

    clear_expired_injury(player, now);
    player.last_hunt = Some(now);
    let currency = world_currency(&player.world, catalog, config);

    let injury_roll = rng.gen::<f64>();
    if injury_roll * 100.0 < preset.injury_rate {
        let until = now + Duration::hours(i64::from(injury_hours(player.level, config)));
        player.activity = ActivityState::Injured { until };
        log::info!(
            "player {} injured on a {} hunt until {}",
            player.id,
            difficulty,
            until
        );
        return Ok(HuntReport {
            difficulty,
            injury_roll,
            injured_until: Some(until),
            exp_gained: 0,
            currency,
            currency_gained: 0,
            drop_roll: None,
            dropped: None,
            level_gains: Vec::new(),
        });
    }

    let level = player.level;
    let multiplier = preset.reward_multiplier;
    let exp_gained = (u64::from(level) * config.hunt.exp_per_level) as f64 * multiplier;
    let exp_gained = exp_gained as u64;
    let currency_gained = (i64::from(level) * config.hunt.currency_per_level) as f64 * multiplier;
    let currency_gained = currency_gained as i64;
    player.exp = player.exp.saturating_add(exp_gained);
    player.credit(&currency, currency_gained);

    let drop_roll = rng.gen::<f64>();
    let dropped = if drop_roll < config.hunt.drop_rate * multiplier {
        roll_equipment_drop(player, catalog, config, rng)
    } else {
        None
    };
    if let Some(name) = &dropped {
        player.grant(name, 1);
        log::info!("player {} found {} while hunting", player.id, name);
    }

    let level_gains = resolve_level_ups(player, config, rng);
    log::debug!(
        "player {} {} hunt: exp+{} {}+{}",
        player.id,
        difficulty,
        exp_gained,
        currency,
        currency_gained
    );

    Ok(HuntReport {
        difficulty,
        injury_roll,
        injured_until: None,
        exp_gained,
        currency,
        currency_gained,
        drop_roll: Some(drop_roll),
        dropped,
        level_gains,
    })
}

/// Pick a piece of equipment the player could wear, favoring low qualities.
///
/// Quality index `q` of `n` configured qualities weighs `n - q`; unknown
/// qualities weigh 1.
pub fn roll_equipment_drop(
    player: &Player,
    catalog: &dyn Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Option<String> {
    let eligible: Vec<(&Equipment, u32)> = catalog
        .equipment_pool()
        .into_iter()
        .filter(|e| can_equip(player, e).is_ok())
        .map(|e| {
            let weight = config
                .quality_index(&e.quality)
                .map(|q| (config.qualities.len() - q) as u32)
                .unwrap_or(1);
            (e, weight)
        })
        .collect();
    if eligible.is_empty() {
        return None;
    }

    let total_weight: u32 = eligible.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total_weight);
    for (equipment, weight) in &eligible {
        if roll < *weight {
            return Some(equipment.name.clone());
        }
        roll -= weight;
    }
    None
}

/// Enter secluded cultivation for `hours`, paying the reward up front.
pub fn start_retreat(
    player: &mut Player,
    hours: u32,
    now: NaiveDateTime,
    catalog: &dyn Catalog,
    config: &GameConfig,
) -> Result<RetreatReport, ActionError> {
    if let ActivityState::Retreating { until } = player.activity {
        return Err(ActionError::Retreating { until });
    }
    check_injury(player, now)?;
    if !config.retreat.hour_options.contains(&hours) {
        return Err(ActionError::InvalidRetreatDuration(hours));
    }

    let retreat = &config.retreat;
    let base = i64::from(player.level) * i64::from(hours) * retreat.currency_per_level_hour;
    let reward = (base as f64 * (f64::from(player.world_level) * retreat.world_multiplier)) as i64;
    let currency = world_currency(&player.world, catalog, config);
    let until = now + Duration::hours(i64::from(hours));

    player.activity = ActivityState::Retreating { until };
    player.credit(&currency, reward);
    log::info!("player {} in secluded cultivation until {}", player.id, until);

    Ok(RetreatReport {
        hours,
        until,
        currency,
        reward,
    })
}

/// Leave secluded cultivation once it has run its course.
pub fn finish_retreat(player: &mut Player, now: NaiveDateTime) -> Result<(), ActionError> {
    match player.activity {
        ActivityState::Retreating { until } if now < until => {
            Err(ActionError::RetreatNotFinished { until })
        }
        ActivityState::Retreating { .. } => {
            player.activity = ActivityState::Idle;
            log::info!("player {} left secluded cultivation", player.id);
            Ok(())
        }
        _ => Err(ActionError::NotRetreating),
    }
}

/// Whether the player has not yet signed in on `now`'s calendar date.
pub fn can_sign_in(player: &Player, now: NaiveDateTime) -> bool {
    player
        .last_signin
        .map_or(true, |last| last.date() < now.date())
}

/// Claim the daily sign-in reward.
pub fn sign_in(
    player: &mut Player,
    now: NaiveDateTime,
    catalog: &dyn Catalog,
    config: &GameConfig,
) -> Result<SigninReport, ActionError> {
    if !can_sign_in(player, now) {
        return Err(ActionError::AlreadySignedIn);
    }
    let reward =
        config.signin.base_reward + i64::from(player.level) * config.signin.reward_per_level;
    let currency = world_currency(&player.world, catalog, config);
    player.credit(&currency, reward);
    player.last_signin = Some(now);
    log::debug!("player {} signed in for {}+{}", player.id, currency, reward);

    Ok(SigninReport {
        currency,
        reward,
        signed_in_at: now,
    })
}

/// Move to `world`. Worlds above the player's tier are locked.
pub fn travel(player: &mut Player, world: &str, catalog: &dyn Catalog) -> Result<(), ActionError> {
    let record = catalog
        .world(world)
        .ok_or_else(|| ActionError::WorldNotFound(world.to_string()))?;
    if record.world_level > player.world_level {
        return Err(ActionError::WorldLocked {
            name: record.name.clone(),
            required: record.world_level,
        });
    }
    log::debug!("player {} travelled to {}", player.id, record.name);
    player.world = record.name.clone();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, World};
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn player(config: &GameConfig) -> Player {
        Player::new(1, "韩立", config, at(1, 8, 0))
    }

    fn safe_config() -> GameConfig {
        let mut config = GameConfig::default();
        for preset in &mut config.hunt.presets {
            preset.injury_rate = 0.0;
        }
        config.hunt.drop_rate = 0.0;
        config
    }

    #[test]
    fn test_injury_hours() {
        let config = GameConfig::default();
        assert_eq!(injury_hours(1, &config), 6);
        assert_eq!(injury_hours(20, &config), 5);
        assert_eq!(injury_hours(99, &config), 2);
        assert_eq!(injury_hours(100, &config), 1);
        assert_eq!(injury_hours(500, &config), 1);
    }

    #[test]
    fn test_hunt_rewards_scale_with_difficulty() {
        let config = safe_config();
        let catalog = MemoryCatalog::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = player(&config);
        player.level = 20;

        let report = hunt(&mut player, Difficulty::Normal, at(1, 9, 0), &catalog, &config, &mut rng)
            .unwrap();
        assert_eq!(report.exp_gained, 300);
        assert_eq!(report.currency_gained, 150);
        assert_eq!(report.currency, "下品灵石");
        assert_eq!(player.currency("下品灵石"), 1150);
        assert_eq!(player.last_hunt, Some(at(1, 9, 0)));
    }

    #[test]
    fn test_hunt_rewards_trigger_level_up() {
        let config = safe_config();
        let catalog = MemoryCatalog::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut player = player(&config);
        player.exp = 95;

        let report = hunt(&mut player, Difficulty::Hard, at(1, 9, 0), &catalog, &config, &mut rng)
            .unwrap();
        assert_eq!(report.exp_gained, 20);
        assert_eq!(report.level_gains.len(), 1);
        assert_eq!(report.level_gains[0].level, 2);
        assert_eq!(player.level, 2);
        assert_eq!(player.exp, 15);
    }

    #[test]
    fn test_hunt_injury_blocks_until_expiry() {
        let mut config = GameConfig::default();
        config.hunt.presets[0].injury_rate = 100.0;
        let catalog = MemoryCatalog::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut player = player(&config);
        let start = at(1, 9, 0);

        let report = hunt(&mut player, Difficulty::Easy, start, &catalog, &config, &mut rng)
            .unwrap();
        assert!(report.injured());
        assert_eq!(report.exp_gained, 0);
        assert_eq!(player.activity, ActivityState::Injured { until: at(1, 15, 0) });
        assert_eq!(player.currency("下品灵石"), 1000);

        let err = hunt(&mut player, Difficulty::Easy, at(1, 12, 30), &catalog, &config, &mut rng)
            .unwrap_err();
        assert_eq!(err, ActionError::Injured { hours: 2, minutes: 30 });

        let safe = safe_config();
        hunt(&mut player, Difficulty::Easy, at(1, 15, 0), &catalog, &safe, &mut rng).unwrap();
        assert_eq!(player.activity, ActivityState::Idle);
    }

    #[test]
    fn test_hunt_uses_world_currency() {
        let config = safe_config();
        let mut catalog = MemoryCatalog::new();
        catalog.add_world(World {
            name: "乱星海".into(),
            world_level: 1,
            description: String::new(),
            currency: Some("中品灵石".into()),
        });
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut player = player(&config);
        travel(&mut player, "乱星海", &catalog).unwrap();

        let report = hunt(&mut player, Difficulty::Easy, at(1, 9, 0), &catalog, &config, &mut rng)
            .unwrap();
        assert_eq!(report.currency, "中品灵石");
        assert_eq!(player.currency("中品灵石"), 105);
    }

    #[test]
    fn test_hunt_drop_adds_to_inventory() {
        let mut config = safe_config();
        config.hunt.drop_rate = 1.0;
        let mut catalog = MemoryCatalog::new();
        catalog.add_equipment(Equipment::new("铁剑", "武器", "普通"));
        catalog.add_equipment(Equipment::new("仙剑", "武器", "传说").with_requirements(50, 1));
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut player = player(&config);

        let report = hunt(&mut player, Difficulty::Easy, at(1, 9, 0), &catalog, &config, &mut rng)
            .unwrap();
        assert_eq!(report.dropped.as_deref(), Some("铁剑"));
        assert_eq!(player.quantity("铁剑"), 1);
    }

    #[test]
    fn test_drop_with_empty_pool() {
        let config = GameConfig::default();
        let mut catalog = MemoryCatalog::new();
        catalog.add_equipment(Equipment::new("仙剑", "武器", "传说").with_requirements(50, 1));
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert_eq!(roll_equipment_drop(&player(&config), &catalog, &config, &mut rng), None);
    }

    #[test]
    fn test_drop_favors_low_quality() {
        let config = GameConfig::default();
        let mut catalog = MemoryCatalog::new();
        catalog.add_equipment(Equipment::new("破剑", "武器", "破损"));
        catalog.add_equipment(Equipment::new("神剑", "武器", "鸿蒙"));
        let player = player(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let common = (0..1200)
            .filter_map(|_| roll_equipment_drop(&player, &catalog, &config, &mut rng))
            .filter(|name| name == "破剑")
            .count();
        // weights 11 and 1
        assert!(common > 1000, "common drops: {}", common);
    }

    #[test]
    fn test_retreat_reward_and_completion() {
        let config = GameConfig::default();
        let catalog = MemoryCatalog::new();
        let mut player = player(&config);
        player.level = 10;

        let report = start_retreat(&mut player, 6, at(1, 8, 0), &catalog, &config).unwrap();
        assert_eq!(report.reward, 180);
        assert_eq!(report.until, at(1, 14, 0));
        assert_eq!(player.currency("下品灵石"), 1180);

        assert!(matches!(
            start_retreat(&mut player, 1, at(1, 9, 0), &catalog, &config),
            Err(ActionError::Retreating { .. })
        ));
        assert_eq!(
            finish_retreat(&mut player, at(1, 13, 59)),
            Err(ActionError::RetreatNotFinished { until: at(1, 14, 0) })
        );
        finish_retreat(&mut player, at(1, 14, 0)).unwrap();
        assert_eq!(player.activity, ActivityState::Idle);
        assert_eq!(finish_retreat(&mut player, at(1, 15, 0)), Err(ActionError::NotRetreating));
    }

    #[test]
    fn test_retreat_validation() {
        let config = GameConfig::default();
        let catalog = MemoryCatalog::new();
        let mut player = player(&config);
        assert_eq!(
            start_retreat(&mut player, 5, at(1, 8, 0), &catalog, &config),
            Err(ActionError::InvalidRetreatDuration(5))
        );

        player.activity = ActivityState::Injured { until: at(1, 10, 0) };
        assert!(matches!(
            start_retreat(&mut player, 1, at(1, 8, 0), &catalog, &config),
            Err(ActionError::Injured { .. })
        ));
        let report = start_retreat(&mut player, 1, at(1, 10, 0), &catalog, &config).unwrap();
        assert_eq!(report.reward, 3);
    }

    #[test]
    fn test_hunt_while_retreating_fails() {
        let config = GameConfig::default();
        let catalog = MemoryCatalog::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut player = player(&config);
        start_retreat(&mut player, 1, at(1, 8, 0), &catalog, &config).unwrap();
        let before = player.clone();

        for difficulty in Difficulty::ALL {
            assert!(matches!(
                hunt(&mut player, difficulty, at(2, 8, 0), &catalog, &config, &mut rng),
                Err(ActionError::Retreating { .. })
            ));
        }
        assert_eq!(player, before);
    }

    #[test]
    fn test_sign_in_once_per_day() {
        let config = GameConfig::default();
        let catalog = MemoryCatalog::new();
        let mut player = player(&config);
        player.level = 4;

        let report = sign_in(&mut player, at(1, 23, 0), &catalog, &config).unwrap();
        assert_eq!(report.reward, 70);
        assert_eq!(
            sign_in(&mut player, at(1, 23, 59), &catalog, &config),
            Err(ActionError::AlreadySignedIn)
        );
        assert!(can_sign_in(&player, at(2, 0, 0)));
        sign_in(&mut player, at(2, 0, 0), &catalog, &config).unwrap();
        assert_eq!(player.currency("下品灵石"), 1140);
    }

    #[test]
    fn test_travel_requires_tier() {
        let config = GameConfig::default();
        let mut catalog = MemoryCatalog::new();
        catalog.add_world(World {
            name: "灵界".into(),
            world_level: 2,
            description: String::new(),
            currency: None,
        });
        let mut player = player(&config);
        assert_eq!(
            travel(&mut player, "灵界", &catalog),
            Err(ActionError::WorldLocked {
                name: "灵界".into(),
                required: 2
            })
        );
        assert_eq!(
            travel(&mut player, "仙界", &catalog),
            Err(ActionError::WorldNotFound("仙界".into()))
        );
        player.world_level = 2;
        travel(&mut player, "灵界", &catalog).unwrap();
        assert_eq!(player.world, "灵界");
        assert_eq!(world_currency(&player.world, &catalog, &config), "下品灵石");
    }
}
