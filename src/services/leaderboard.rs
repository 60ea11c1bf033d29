// src/services/leaderboard.rs

use crate::models::{Membership, ServiceError, TeamSnapshot, TeamStats};
use crate::utils::store::TeamStore;

// Leaderboard assembly. A projection is a pure function of the stored
// membership records and is recomputed on every read and every watch
// notification; no incremental state is kept anywhere.

// Highest points first; equal points keep join order. The pre-sort pins the
// scan order (directory order is arbitrary) and the second, stable sort
// preserves it within equal scores.
pub fn sort_members(members: &mut [Membership]) {
    members.sort_by(|a, b| {
        a.joined_at
            .cmp(&b.joined_at)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    members.sort_by(|a, b| b.points.cmp(&a.points));
}

// Ordered leaderboard for one team
pub fn project(store: &TeamStore, team_id: &str) -> Result<Vec<Membership>, ServiceError> {
    if store.find_team_by_id(team_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let mut members = store.list_memberships(team_id)?;
    sort_members(&mut members);
    Ok(members)
}

// Team document plus its ordered leaderboard; None when the team is gone
pub fn snapshot(store: &TeamStore, team_id: &str) -> Result<Option<TeamSnapshot>, ServiceError> {
    let team = match store.find_team_by_id(team_id)? {
        Some(team) => team,
        None => return Ok(None),
    };

    let mut members = store.list_memberships(team_id)?;
    sort_members(&mut members);

    Ok(Some(TeamSnapshot { team, members }))
}

// Every team the user belongs to, each with its full leaderboard.
// Filter + join over all teams, O(teams x avg members).
pub fn project_user_teams(
    store: &TeamStore,
    user_id: &str,
) -> Result<Vec<TeamSnapshot>, ServiceError> {
    let mut result = Vec::new();

    for team in store.list_teams()? {
        if store.find_membership(&team.id, user_id)?.is_some() {
            let mut members = store.list_memberships(&team.id)?;
            sort_members(&mut members);
            result.push(TeamSnapshot { team, members });
        }
    }

    // Oldest team first so the list itself has a stable order
    result.sort_by(|a, b| a.team.created_at.cmp(&b.team.created_at));

    Ok(result)
}

// Summary for the team info sheet: headcount, point total, top performer
pub fn team_stats(store: &TeamStore, team_id: &str) -> Result<TeamStats, ServiceError> {
    let snapshot = snapshot(store, team_id)?.ok_or(ServiceError::NotFound)?;

    let total_points = snapshot.members.iter().map(|m| m.points).sum();
    // Members are already ordered, so the front of the list is the top
    // performer and ties go to the earliest joiner
    let top_performer = snapshot.members.first().cloned();

    Ok(TeamStats {
        team_id: snapshot.team.id,
        name: snapshot.team.name,
        member_count: snapshot.members.len(),
        total_points,
        join_code: snapshot.team.join_code,
        top_performer,
    })
}
