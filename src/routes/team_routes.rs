use crate::models::{CreateTeamRequest, JoinTeamRequest, ServiceError};
use crate::services::watch::WatchRegistry;
use crate::services::{leaderboard, membership};
use crate::utils::get_user_context;
use crate::utils::store::TeamStore;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// Create a new team
#[post("/teams")]
async fn create_team(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    body: web::Json<CreateTeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;

    info!("📝 Creating new team: {} for user: {}", body.name, user.user_id);

    let team = membership::create_team(
        &store,
        &body.name,
        &body.description,
        body.reset_interval_days,
        &user,
    )?;

    Ok(HttpResponse::Ok().json(team))
}

// Get all teams the current user belongs to, each with its leaderboard
#[get("/teams")]
async fn get_user_teams(
    req: HttpRequest,
    store: web::Data<TeamStore>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;

    info!("📋 Fetching teams for user: {}", user.user_id);

    let teams = leaderboard::project_user_teams(&store, &user.user_id)?;

    info!("✅ Found {} teams for user: {}", teams.len(), user.user_id);

    Ok(HttpResponse::Ok().json(teams))
}

// Get a specific team with its sorted members
#[get("/teams/{team_id}")]
async fn get_team(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let team_id = path.into_inner();

    info!("🔍 Fetching team: {} for user: {}", team_id, user.user_id);

    membership::require_member(&store, &team_id, &user.user_id)?;

    let snapshot = leaderboard::snapshot(&store, &team_id)?.ok_or(ServiceError::NotFound)?;

    Ok(HttpResponse::Ok().json(snapshot))
}

// Get only the ordered leaderboard of a team
#[get("/teams/{team_id}/leaderboard")]
async fn get_leaderboard(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let team_id = path.into_inner();

    membership::require_member(&store, &team_id, &user.user_id)?;

    let members = leaderboard::project(&store, &team_id)?;

    Ok(HttpResponse::Ok().json(members))
}

// Get the team info-sheet summary
#[get("/teams/{team_id}/stats")]
async fn get_team_stats(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let team_id = path.into_inner();

    membership::require_member(&store, &team_id, &user.user_id)?;

    let stats = leaderboard::team_stats(&store, &team_id)?;

    Ok(HttpResponse::Ok().json(stats))
}

// Join a team by its 8-digit code
#[post("/teams/join")]
async fn join_team(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    registry: web::Data<WatchRegistry>,
    body: web::Json<JoinTeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;

    info!("👥 User {} joining with code: {}", user.user_id, body.code);

    let team = membership::join_by_code(&store, &registry, &body.code, &user)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Joined team successfully",
        "team_id": team.id,
        "team_name": team.name
    })))
}

// Leave a team
#[post("/teams/{team_id}/leave")]
async fn leave_team(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    registry: web::Data<WatchRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let team_id = path.into_inner();

    info!("🚪 User {} leaving team: {}", user.user_id, team_id);

    membership::leave(&store, &registry, &team_id, &user.user_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Left team successfully",
        "team_id": team_id
    })))
}

// Delete a team (owner only)
#[delete("/teams/{team_id}")]
async fn delete_team(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    registry: web::Data<WatchRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let team_id = path.into_inner();

    info!("🗑️ Deleting team: {}", team_id);

    membership::delete_team(&store, &registry, &team_id, &user.user_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Team deleted successfully",
        "team_id": team_id
    })))
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_team)
        .service(get_user_teams)
        .service(join_team)
        .service(get_team)
        .service(get_leaderboard)
        .service(get_team_stats)
        .service(leave_team)
        .service(delete_team);
}
