// src/services/points.rs

use crate::models::{Membership, PointChange, ServiceError};
use crate::services::watch::{publish_team_update, WatchRegistry};
use crate::utils::store::TeamStore;
use chrono::Utc;
use log::{error, info};

// Apply a signed delta to a member's points. Totals are not clamped, so
// repeated negative deltas can drive them below zero.
//
// This is a read-modify-write without a concurrency guard: the store has no
// atomic increment, so two concurrent calls for the same membership can
// lose one of the updates. Serialization of concurrent writers is deferred
// entirely to the store.
pub fn add_points(
    store: &TeamStore,
    registry: &WatchRegistry,
    team_id: &str,
    user_id: &str,
    delta: i64,
) -> Result<Membership, ServiceError> {
    let mut membership = store
        .find_membership(team_id, user_id)?
        .ok_or(ServiceError::NotMember)?;

    membership.points += delta;
    membership.last_point_change = Some(PointChange {
        timestamp: Utc::now(),
        amount: delta,
    });

    store.save_membership(&membership)?;

    info!(
        "✅ {} points for user {} in team {} (total: {})",
        delta, user_id, team_id, membership.points
    );

    publish_team_update(store, registry, team_id);

    Ok(membership)
}

// Overwrite a member's points with an absolute value. The audit record's
// `amount` field carries the new total here rather than a delta; existing
// stored data uses that shape, so it is preserved.
pub fn set_points(
    store: &TeamStore,
    registry: &WatchRegistry,
    team_id: &str,
    user_id: &str,
    new_points: i64,
) -> Result<Membership, ServiceError> {
    let mut membership = store
        .find_membership(team_id, user_id)?
        .ok_or(ServiceError::NotMember)?;

    membership.points = new_points;
    membership.last_point_change = Some(PointChange {
        timestamp: Utc::now(),
        amount: new_points,
    });

    store.save_membership(&membership)?;

    info!(
        "✅ Points set to {} for user {} in team {}",
        new_points, user_id, team_id
    );

    publish_team_update(store, registry, team_id);

    Ok(membership)
}

// Zero every member's points, e.g. at the start of a scoring period.
// Owner only. Returns how many memberships were reset.
pub fn reset_points(
    store: &TeamStore,
    registry: &WatchRegistry,
    team_id: &str,
    requester_id: &str,
) -> Result<usize, ServiceError> {
    let team = store.find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;

    if team.owner_id != requester_id {
        error!("❌ User {} is not the owner of team {}", requester_id, team_id);
        return Err(ServiceError::NotAuthorized);
    }

    let now = Utc::now();
    let members = store.list_memberships(team_id)?;
    let count = members.len();

    for mut membership in members {
        membership.points = 0;
        membership.last_point_change = Some(PointChange {
            timestamp: now,
            amount: 0,
        });
        store.save_membership(&membership)?;
    }

    info!("✅ Reset points for {} members of team {}", count, team_id);

    publish_team_update(store, registry, team_id);

    Ok(count)
}
