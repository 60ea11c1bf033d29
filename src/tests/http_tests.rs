#[cfg(test)]
mod tests {
    use crate::routes::{points_routes, team_routes};
    use crate::services::watch::WatchRegistry;
    use crate::tests::{cleanup, test_store};
    use crate::utils::{jwt, Auth};
    use actix_web::{test, web, App};
    use serde_json::json;

    fn bearer(user_id: &str, name: &str) -> (&'static str, String) {
        let token = jwt::issue_token(user_id, &format!("{}@example.com", user_id), Some(name))
            .expect("Failed to issue test token");
        ("Authorization", format!("Bearer {}", token))
    }

    macro_rules! test_app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .wrap(Auth)
                    .app_data(web::Data::new($store.clone()))
                    .app_data(web::Data::new(WatchRegistry::new()))
                    .configure(team_routes::init_routes)
                    .configure(points_routes::init_routes),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn create_join_and_rank_members() {
        let (store, dir) = test_store();
        let app = test_app!(store);

        // Owner creates the team
        let create_request = test::TestRequest::post()
            .uri("/teams")
            .insert_header(bearer("owner-1", "Alice"))
            .set_json(&json!({"name": "Alpha", "description": "House points"}))
            .to_request();

        let team: serde_json::Value = test::call_and_read_body_json(&app, create_request).await;
        let team_id = team["id"].as_str().unwrap().to_string();
        let join_code = team["join_code"].as_str().unwrap().to_string();
        assert_eq!(join_code.len(), 8);

        // Second user joins with the code
        let join_request = test::TestRequest::post()
            .uri("/teams/join")
            .insert_header(bearer("u-1", "Uma"))
            .set_json(&json!({"code": join_code}))
            .to_request();

        let join_response: serde_json::Value =
            test::call_and_read_body_json(&app, join_request).await;
        assert_eq!(join_response["team_id"].as_str().unwrap(), team_id);

        // Newcomer earns points and takes the lead
        let points_request = test::TestRequest::post()
            .uri(&format!("/teams/{}/members/u-1/points", team_id))
            .insert_header(bearer("u-1", "Uma"))
            .set_json(&json!({"amount": 75}))
            .to_request();

        let updated: serde_json::Value =
            test::call_and_read_body_json(&app, points_request).await;
        assert_eq!(updated["points"].as_i64().unwrap(), 75);

        let leaderboard_request = test::TestRequest::get()
            .uri(&format!("/teams/{}/leaderboard", team_id))
            .insert_header(bearer("owner-1", "Alice"))
            .to_request();

        let leaderboard: serde_json::Value =
            test::call_and_read_body_json(&app, leaderboard_request).await;
        let members = leaderboard.as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0]["user_id"].as_str().unwrap(), "u-1");
        assert_eq!(members[1]["user_id"].as_str().unwrap(), "owner-1");

        cleanup(&dir);
    }

    #[actix_rt::test]
    async fn malformed_join_code_is_rejected() {
        let (store, dir) = test_store();
        let app = test_app!(store);

        let join_request = test::TestRequest::post()
            .uri("/teams/join")
            .insert_header(bearer("u-1", "Uma"))
            .set_json(&json!({"code": "1234"}))
            .to_request();

        let response = test::call_service(&app, join_request).await;
        assert_eq!(response.status(), 400);

        cleanup(&dir);
    }

    #[actix_rt::test]
    async fn delete_by_non_owner_is_forbidden() {
        let (store, dir) = test_store();
        let app = test_app!(store);

        let create_request = test::TestRequest::post()
            .uri("/teams")
            .insert_header(bearer("owner-1", "Alice"))
            .set_json(&json!({"name": "Alpha"}))
            .to_request();

        let team: serde_json::Value = test::call_and_read_body_json(&app, create_request).await;
        let team_id = team["id"].as_str().unwrap().to_string();
        let join_code = team["join_code"].as_str().unwrap().to_string();

        let join_request = test::TestRequest::post()
            .uri("/teams/join")
            .insert_header(bearer("u-1", "Uma"))
            .set_json(&json!({"code": join_code}))
            .to_request();
        test::call_service(&app, join_request).await;

        let delete_request = test::TestRequest::delete()
            .uri(&format!("/teams/{}", team_id))
            .insert_header(bearer("u-1", "Uma"))
            .to_request();

        let response = test::call_service(&app, delete_request).await;
        assert_eq!(response.status(), 403);

        // The team must be fully intact afterwards
        let get_request = test::TestRequest::get()
            .uri(&format!("/teams/{}", team_id))
            .insert_header(bearer("owner-1", "Alice"))
            .to_request();

        let snapshot: serde_json::Value = test::call_and_read_body_json(&app, get_request).await;
        assert_eq!(snapshot["id"].as_str().unwrap(), team_id);
        assert_eq!(snapshot["members"].as_array().unwrap().len(), 2);

        cleanup(&dir);
    }

    #[actix_rt::test]
    async fn requests_without_a_token_are_unauthorized() {
        let (store, dir) = test_store();
        let app = test_app!(store);

        let request = test::TestRequest::get().uri("/teams").to_request();

        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), 401);

        cleanup(&dir);
    }

    #[actix_rt::test]
    async fn non_members_cannot_read_a_team() {
        let (store, dir) = test_store();
        let app = test_app!(store);

        let create_request = test::TestRequest::post()
            .uri("/teams")
            .insert_header(bearer("owner-1", "Alice"))
            .set_json(&json!({"name": "Alpha"}))
            .to_request();

        let team: serde_json::Value = test::call_and_read_body_json(&app, create_request).await;
        let team_id = team["id"].as_str().unwrap().to_string();

        let get_request = test::TestRequest::get()
            .uri(&format!("/teams/{}", team_id))
            .insert_header(bearer("stranger", "Sam"))
            .to_request();

        let response = test::call_service(&app, get_request).await;
        assert_eq!(response.status(), 403);

        cleanup(&dir);
    }
}
