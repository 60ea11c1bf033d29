use crate::models::{AddPointsRequest, ServiceError, SetPointsRequest};
use crate::services::watch::WatchRegistry;
use crate::services::{membership, points};
use crate::utils::get_user_context;
use crate::utils::store::TeamStore;
use actix_web::{post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// Add (or subtract) points for a team member
#[post("/teams/{team_id}/members/{user_id}/points")]
async fn add_points(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    registry: web::Data<WatchRegistry>,
    path: web::Path<(String, String)>,
    body: web::Json<AddPointsRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let (team_id, target_user_id) = path.into_inner();

    info!(
        "🎯 User {} adding {} points to {} in team {}",
        user.user_id, body.amount, target_user_id, team_id
    );

    membership::require_member(&store, &team_id, &user.user_id)?;

    let updated = points::add_points(&store, &registry, &team_id, &target_user_id, body.amount)?;

    Ok(HttpResponse::Ok().json(updated))
}

// Overwrite a team member's points
#[put("/teams/{team_id}/members/{user_id}/points")]
async fn set_points(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    registry: web::Data<WatchRegistry>,
    path: web::Path<(String, String)>,
    body: web::Json<SetPointsRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let (team_id, target_user_id) = path.into_inner();

    info!(
        "🎯 User {} setting points of {} to {} in team {}",
        user.user_id, target_user_id, body.points, team_id
    );

    membership::require_member(&store, &team_id, &user.user_id)?;

    let updated = points::set_points(&store, &registry, &team_id, &target_user_id, body.points)?;

    Ok(HttpResponse::Ok().json(updated))
}

// Zero every member's points (owner only)
#[post("/teams/{team_id}/points/reset")]
async fn reset_points(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    registry: web::Data<WatchRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let team_id = path.into_inner();

    info!("🔄 User {} resetting points for team {}", user.user_id, team_id);

    let reset_count = points::reset_points(&store, &registry, &team_id, &user.user_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Points reset successfully",
        "team_id": team_id,
        "members_reset": reset_count
    })))
}

// Register all points routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(add_points)
        .service(set_points)
        .service(reset_points);
}
