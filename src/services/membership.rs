// src/services/membership.rs

use crate::models::{JoinCode, Membership, ServiceError, Team};
use crate::services::watch::{publish_team_update, WatchRegistry};
use crate::utils::join_code;
use crate::utils::store::TeamStore;
use crate::utils::UserContext;
use chrono::Utc;
use log::{error, info, warn};
use uuid::Uuid;

// Attempts before giving up on finding an unclaimed join code
const MAX_CODE_ATTEMPTS: usize = 5;

// Create a team. Writes the team document, its join-code mapping, and the
// owner's membership (0 points). The store has no multi-document
// transaction, so a failure after the first committed write is reported as
// a PartialFailure instead of being retried or rolled back.
pub fn create_team(
    store: &TeamStore,
    name: &str,
    description: &str,
    reset_interval_days: u32,
    owner: &UserContext,
) -> Result<Team, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation(
            "Team name must not be empty".to_string(),
        ));
    }

    let code = allocate_join_code(store)?;

    let team = Team {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: description.trim().to_string(),
        owner_id: owner.user_id.clone(),
        join_code: code.clone(),
        reset_interval_days,
        created_at: Utc::now(),
    };

    store.save_team(&team)?;

    store
        .save_join_code(&JoinCode {
            code: code.clone(),
            team_id: team.id.clone(),
        })
        .map_err(|e| {
            error!("❌ Team {} created but join code not mapped: {}", team.id, e);
            ServiceError::PartialFailure(format!(
                "Team {} was created but its join code could not be mapped: {}",
                team.id, e
            ))
        })?;

    let membership = Membership {
        team_id: team.id.clone(),
        user_id: owner.user_id.clone(),
        display_name: owner.display_name.clone(),
        points: 0,
        joined_at: Utc::now(),
        last_point_change: None,
    };

    store.save_membership(&membership).map_err(|e| {
        error!("❌ Team {} created without owner membership: {}", team.id, e);
        ServiceError::PartialFailure(format!(
            "Team {} was created but the owner membership could not be written: {}",
            team.id, e
        ))
    })?;

    info!("✅ Team created: {} ({})", team.name, team.id);

    Ok(team)
}

// Join a team by its 8-digit code. Joining twice is rejected without
// touching the existing membership record.
pub fn join_by_code(
    store: &TeamStore,
    registry: &WatchRegistry,
    code: &str,
    user: &UserContext,
) -> Result<Team, ServiceError> {
    let code = code.trim();
    if !join_code::is_valid_format(code) {
        return Err(ServiceError::Validation(
            "Join code must be exactly 8 digits".to_string(),
        ));
    }

    let mapping = match store.find_join_code(code)? {
        Some(mapping) => mapping,
        None => return Err(ServiceError::NotFound),
    };

    let team = match store.find_team_by_id(&mapping.team_id)? {
        Some(team) => team,
        None => {
            // Stale mapping left behind by an interrupted delete
            warn!("Join code {} maps to missing team {}", code, mapping.team_id);
            return Err(ServiceError::NotFound);
        }
    };

    if store.find_membership(&team.id, &user.user_id)?.is_some() {
        return Err(ServiceError::AlreadyMember);
    }

    let membership = Membership {
        team_id: team.id.clone(),
        user_id: user.user_id.clone(),
        display_name: user.display_name.clone(),
        points: 0,
        joined_at: Utc::now(),
        last_point_change: None,
    };

    store.save_membership(&membership)?;

    info!("✅ User {} joined team {}", user.user_id, team.id);

    publish_team_update(store, registry, &team.id);

    Ok(team)
}

// Leave a team. The owner's membership is never deleted by this path, and
// leaving a team one is not a member of is an error, not a silent success.
pub fn leave(
    store: &TeamStore,
    registry: &WatchRegistry,
    team_id: &str,
    user_id: &str,
) -> Result<(), ServiceError> {
    let team = store.find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;

    if team.owner_id == user_id {
        return Err(ServiceError::OwnerCannotLeave);
    }

    if store.find_membership(team_id, user_id)?.is_none() {
        return Err(ServiceError::NotMember);
    }

    store.delete_membership(team_id, user_id)?;

    info!("✅ User {} left team {}", user_id, team_id);

    publish_team_update(store, registry, team_id);

    Ok(())
}

// Delete a team with its join code and every membership. Owner only.
pub fn delete_team(
    store: &TeamStore,
    registry: &WatchRegistry,
    team_id: &str,
    requester_id: &str,
) -> Result<(), ServiceError> {
    let team = store.find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;

    if team.owner_id != requester_id {
        error!("❌ User {} is not the owner of team {}", requester_id, team_id);
        return Err(ServiceError::NotAuthorized);
    }

    store.delete_team_memberships(team_id)?;

    store.delete_join_code(&team.join_code).map_err(|e| {
        error!("❌ Memberships of team {} deleted but join code remains: {}", team_id, e);
        ServiceError::PartialFailure(format!(
            "Memberships of team {} were deleted but its join code could not be removed: {}",
            team_id, e
        ))
    })?;

    store.delete_team_doc(team_id).map_err(|e| {
        error!("❌ Team document {} survived its own deletion: {}", team_id, e);
        ServiceError::PartialFailure(format!(
            "Join code and memberships of team {} were deleted but the team document remains: {}",
            team_id, e
        ))
    })?;

    info!("✅ Team deleted: {}", team_id);

    registry.publish(team_id, crate::models::TeamEvent::Deleted);

    Ok(())
}

// Gate used by reads and point mutations: the team must exist and the
// requester must hold a membership in it
pub fn require_member(
    store: &TeamStore,
    team_id: &str,
    user_id: &str,
) -> Result<Team, ServiceError> {
    let team = store.find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;

    if store.find_membership(team_id, user_id)?.is_none() {
        return Err(ServiceError::NotAuthorized);
    }

    Ok(team)
}

fn allocate_join_code(store: &TeamStore) -> Result<String, ServiceError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = join_code::generate();
        if !store.join_code_exists(&candidate)? {
            return Ok(candidate);
        }
        warn!("Join code collision on {}, regenerating", candidate);
    }

    error!("❌ No unclaimed join code after {} attempts", MAX_CODE_ATTEMPTS);
    Err(ServiceError::CodeSpaceExhausted)
}
