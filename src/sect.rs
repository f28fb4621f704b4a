//! Sect membership and the defensive array.
//!
//! These are the only operations that write to a [`Sect`]. The caller loads
//! the sect record, passes it alongside the player and persists both.

use crate::catalog::{Catalog, Sect, SectContribution};
use crate::config::GameConfig;
use crate::error::ActionError;
use crate::player::{Player, SectMembership, SectRole};
use chrono::NaiveDateTime;

/// Defense of `sect`: the sum of its artifact contributions.
pub fn sect_defense(sect: &Sect) -> i64 {
    sect.contributions.iter().map(|c| c.value).sum()
}

fn recompute_defense(sect: &mut Sect) {
    sect.defense = sect_defense(sect);
}

fn check_member(player: &Player, sect: &Sect) -> Result<(), ActionError> {
    if player.sect_id() == Some(sect.id) {
        Ok(())
    } else {
        Err(ActionError::NotInSect(sect.id))
    }
}

/// Join `sect`. The sect's leader joins with the leader role.
pub fn join_sect(player: &mut Player, sect: &mut Sect) -> Result<SectRole, ActionError> {
    if let Some(current) = player.sect_id() {
        return Err(ActionError::AlreadyInSect(current));
    }
    if sect.members.len() >= sect.max_members as usize {
        return Err(ActionError::SectFull {
            max: sect.max_members,
        });
    }

    let role = if player.id == sect.leader_id {
        SectRole::Leader
    } else {
        SectRole::Disciple
    };
    player.sect = Some(SectMembership {
        sect_id: sect.id,
        role,
        contribution: 0,
    });
    sect.members.insert(player.id);
    log::info!("player {} joined sect {} as {:?}", player.id, sect.name, role);
    Ok(role)
}

/// Leave `sect`, taking back every contributed artifact.
///
/// Returns the names of the returned artifacts.
pub fn leave_sect(player: &mut Player, sect: &mut Sect) -> Result<Vec<String>, ActionError> {
    check_member(player, sect)?;
    if player.id == sect.leader_id {
        return Err(ActionError::LeaderCannotLeave);
    }

    let (mine, others): (Vec<_>, Vec<_>) = sect
        .contributions
        .drain(..)
        .partition(|c| c.player_id == player.id);
    sect.contributions = others;
    let returned: Vec<String> = mine.into_iter().map(|c| c.artifact_name).collect();
    for name in &returned {
        player.grant(name, 1);
    }

    sect.members.remove(&player.id);
    player.sect = None;
    recompute_defense(sect);
    log::info!(
        "player {} left sect {}, {} artifacts returned",
        player.id,
        sect.name,
        returned.len()
    );
    Ok(returned)
}

/// Place one artifact from the inventory into the sect's defensive array.
pub fn contribute_artifact(
    player: &mut Player,
    sect: &mut Sect,
    artifact: &str,
    now: NaiveDateTime,
    catalog: &dyn Catalog,
    config: &GameConfig,
) -> Result<SectContribution, ActionError> {
    check_member(player, sect)?;
    if player.quantity(artifact) == 0 {
        return Err(ActionError::NotInInventory(artifact.to_string()));
    }
    let equipment = catalog
        .equipment(artifact)
        .filter(|e| e.slot == config.sect.artifact_slot)
        .ok_or_else(|| ActionError::NotAnArtifact(artifact.to_string()))?;
    if sect.contributions.len() >= config.sect.max_artifacts {
        return Err(ActionError::ArtifactLimit {
            max: config.sect.max_artifacts,
        });
    }

    let quality = config.quality_index(&equipment.quality).unwrap_or(0) as i64;
    let value = (quality + 1) * config.sect.contribution_per_quality;
    let id = sect.contributions.iter().map(|c| c.id).max().unwrap_or(0) + 1;
    let contribution = SectContribution {
        id,
        player_id: player.id,
        artifact_name: artifact.to_string(),
        value,
        contributed_at: now,
    };

    player.take_one(artifact);
    if let Some(membership) = player.sect.as_mut() {
        membership.contribution += value;
    }
    sect.contributions.push(contribution.clone());
    recompute_defense(sect);
    log::info!(
        "player {} contributed {} to sect {} (+{})",
        player.id,
        artifact,
        sect.name,
        value
    );
    Ok(contribution)
}

/// Take back one of the player's own contributions.
pub fn withdraw_artifact(
    player: &mut Player,
    sect: &mut Sect,
    contribution_id: u64,
) -> Result<SectContribution, ActionError> {
    check_member(player, sect)?;
    let index = sect
        .contributions
        .iter()
        .position(|c| c.id == contribution_id)
        .ok_or(ActionError::ContributionNotFound(contribution_id))?;
    if sect.contributions[index].player_id != player.id {
        return Err(ActionError::NotContributor(contribution_id));
    }

    let contribution = sect.contributions.remove(index);
    player.grant(&contribution.artifact_name, 1);
    if let Some(membership) = player.sect.as_mut() {
        membership.contribution -= contribution.value;
    }
    recompute_defense(sect);
    log::info!(
        "player {} withdrew {} from sect {}",
        player.id,
        contribution.artifact_name,
        sect.name
    );
    Ok(contribution)
}
