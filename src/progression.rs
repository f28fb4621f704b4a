//! Experience, levels and world tiers.

use crate::attr_id::AttrId;
use crate::config::{GameConfig, WorldTier};
use crate::player::Player;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one successful level-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelGain {
    pub level: u32,
    /// Random growth rolled for each attribute, in table order.
    pub growth: Vec<(AttrId, i64)>,
    /// New world tier, if this level raised it.
    pub world_level: Option<u32>,
}

impl fmt::Display for LevelGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reached level {}", self.level)?;
        for (attr, amount) in &self.growth {
            write!(f, ", {}+{}", attr, amount)?;
        }
        if let Some(tier) = self.world_level {
            write!(f, "; world tier {} unlocked", tier)?;
        }
        Ok(())
    }
}

/// Experience needed to advance from `level`.
///
/// `level * exp_per_level`, plus `milestone_bonus` for every completed
/// milestone interval.
pub fn required_exp(level: u32, config: &GameConfig) -> u64 {
    let progression = &config.progression;
    let milestones = u64::from(level / progression.milestone_interval.max(1));
    u64::from(level) * progression.exp_per_level + milestones * progression.milestone_bonus
}

/// Whether the player has the experience for the next level.
///
/// Always false at the highest representable level.
pub fn can_level_up(player: &Player, config: &GameConfig) -> bool {
    player.level < u32::MAX && player.exp >= required_exp(player.level, config)
}

/// Experience still missing for the next level (0 when eligible).
pub fn exp_to_next_level(player: &Player, config: &GameConfig) -> u64 {
    required_exp(player.level, config).saturating_sub(player.exp)
}

/// World tier a character of `level` belongs to, capped at the highest
/// configured tier.
pub fn world_tier_for_level(level: u32, config: &GameConfig) -> u32 {
    let per_world = config.progression.levels_per_world.max(1);
    let tier = level.saturating_sub(1) / per_world + 1;
    tier.min(config.max_world_tier())
}

/// Name and level range of world tier `tier`.
pub fn world_tier_info(tier: u32, config: &GameConfig) -> Option<&WorldTier> {
    config.world_tier(tier)
}

/// The next world tier, if the player's level already qualifies for it.
pub fn next_world_unlocked<'a>(
    player: &Player,
    config: &'a GameConfig,
) -> Option<&'a WorldTier> {
    config
        .world_tier(player.world_level.saturating_add(1))
        .filter(|next| player.level >= next.min_level)
}

/// Advance one level if the player has enough experience.
///
/// Returns `None` and leaves the player untouched otherwise. Never advances
/// more than one level; see [`resolve_level_ups`].
pub fn level_up(
    player: &mut Player,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Option<LevelGain> {
    if !can_level_up(player, config) {
        return None;
    }

    player.exp -= required_exp(player.level, config);
    player.level += 1;

    let mut growth = Vec::with_capacity(config.progression.growth.len());
    for range in &config.progression.growth {
        let amount = rng.gen_range(range.min..=range.max);
        player.add_attribute(&range.attribute, amount as f64);
        growth.push((range.attribute.clone(), amount));
    }
    log::debug!(
        "player {} growth at level {}: {:?}",
        player.id,
        player.level,
        growth
    );

    let tier = world_tier_for_level(player.level, config);
    let world_level = if tier > player.world_level {
        player.world_level = tier;
        log::info!("player {} unlocked world tier {}", player.id, tier);
        Some(tier)
    } else {
        None
    };

    log::info!("player {} reached level {}", player.id, player.level);
    Some(LevelGain {
        level: player.level,
        growth,
        world_level,
    })
}

/// Level up for as long as the player is eligible.
pub fn resolve_level_ups(
    player: &mut Player,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<LevelGain> {
    let mut gains = Vec::new();
    while let Some(gain) = level_up(player, config, rng) {
        gains.push(gain);
    }
    gains
}
