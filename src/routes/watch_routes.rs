use crate::models::{ServiceError, TeamEvent};
use crate::services::watch::WatchRegistry;
use crate::services::{leaderboard, membership};
use crate::utils::get_user_context;
use crate::utils::store::TeamStore;
use actix_web::{get, web, HttpRequest, HttpResponse};
use futures::stream::{self, StreamExt};
use log::info;

// Live team updates as a server-sent-event stream. The first frame is the
// current snapshot; every membership or points mutation afterwards pushes a
// fresh one. Closing the connection drops the subscription, which
// unregisters the observer from the shared team channel.
#[get("/teams/{team_id}/watch")]
async fn watch_team(
    req: HttpRequest,
    store: web::Data<TeamStore>,
    registry: web::Data<WatchRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user = get_user_context(&req)?;
    let team_id = path.into_inner();

    membership::require_member(&store, &team_id, &user.user_id)?;

    info!("👀 User {} watching team {}", user.user_id, team_id);

    let subscription = registry.subscribe(&team_id)?;

    let initial = leaderboard::snapshot(&store, &team_id)?
        .map(TeamEvent::Snapshot)
        .unwrap_or(TeamEvent::Deleted);

    let updates = stream::unfold(subscription, |mut subscription| async move {
        subscription
            .next()
            .await
            .map(|event| (event, subscription))
    });

    let body = stream::iter(std::iter::once(initial))
        .chain(updates)
        .map(|event| sse_frame(&event));

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .append_header(("Cache-Control", "no-cache"))
        .streaming(body))
}

fn sse_frame(event: &TeamEvent) -> Result<web::Bytes, actix_web::Error> {
    let json = serde_json::to_string(event).map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(web::Bytes::from(format!("data: {}\n\n", json)))
}

// Register all watch routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(watch_team);
}
