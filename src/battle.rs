//! Player-versus-player duels.

use crate::activity::clear_expired_injury;
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::error::ActionError;
use crate::player::{Player, PlayerId};
use crate::power::player_combat_power;
use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub challenger_id: PlayerId,
    pub target_id: PlayerId,
    pub challenger_power: i64,
    pub target_power: i64,
    pub win_probability: f64,
    pub roll: f64,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    /// Experience awarded to the challenger on a win.
    pub exp_gained: Option<u64>,
}

impl BattleReport {
    pub fn challenger_won(&self) -> bool {
        self.winner_id == self.challenger_id
    }
}

impl fmt::Display for BattleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} ({:.1}% to win): {} wins",
            self.challenger_power,
            self.target_power,
            self.win_probability * 100.0,
            self.winner_id
        )?;
        if let Some(exp) = self.exp_gained {
            write!(f, ", exp+{}", exp)?;
        }
        Ok(())
    }
}

/// Chance that a challenger with power `challenger` beats `target`.
///
/// Even odds when neither side has positive total power.
pub fn win_probability(challenger: i64, target: i64) -> f64 {
    let total = challenger as f64 + target as f64;
    if total <= 0.0 {
        return 0.5;
    }
    challenger as f64 / total
}

fn check_available(player: &Player, now: NaiveDateTime) -> Result<(), ActionError> {
    if player.activity.is_available_at(now) {
        Ok(())
    } else {
        Err(ActionError::Unavailable(player.id))
    }
}

/// Fight `target`. Only the challenger is mutated.
pub fn resolve_battle(
    challenger: &mut Player,
    target: &Player,
    now: NaiveDateTime,
    catalog: &dyn Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Result<BattleReport, ActionError> {
    if challenger.id == target.id {
        return Err(ActionError::SelfChallenge);
    }
    check_available(challenger, now)?;
    check_available(target, now)?;

    let challenger_power = player_combat_power(challenger, catalog, config)?;
    let target_power = player_combat_power(target, catalog, config)?;
    let win_probability = win_probability(challenger_power, target_power);

    clear_expired_injury(challenger, now);
    let roll = rng.gen::<f64>();
    let won = roll < win_probability;
    let exp_gained = if won {
        let exp = config
            .battle
            .min_exp
            .max(u64::from(target.level) * config.battle.exp_per_target_level);
        challenger.exp = challenger.exp.saturating_add(exp);
        Some(exp)
    } else {
        None
    };

    let (winner_id, loser_id) = if won {
        (challenger.id, target.id)
    } else {
        (target.id, challenger.id)
    };
    log::debug!(
        "duel {} ({}) vs {} ({}): p={:.3} roll={:.3}",
        challenger.id,
        challenger_power,
        target.id,
        target_power,
        win_probability,
        roll
    );

    Ok(BattleReport {
        challenger_id: challenger.id,
        target_id: target.id,
        challenger_power,
        target_power,
        win_probability,
        roll,
        winner_id,
        loser_id,
        exp_gained,
    })
}
