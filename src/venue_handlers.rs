use actix_web::{get, web, HttpResponse, Responder};

use crate::models::{ApiResponse, STATUS_OK};
use crate::state::AppState;

/// List every venue loaded at startup
#[get("/venues")]
pub async fn list_venues(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::data(STATUS_OK, &state.venues))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::config::{Config, OperatingMode};
    use crate::db::SqliteStore;
    use crate::models::Venue;
    use crate::routes;
    use crate::state::AppState;

    #[actix_web::test]
    async fn venues_are_listed_with_extra_columns() {
        let venues: Vec<Venue> = serde_json::from_value(json!([
            {"id": 1, "name": "Blue Note", "city": "New York"},
            {"id": 2, "name": "Ronnie Scott's", "capacity": 250},
            {"city": "Paris", "open": true}
        ]))
        .unwrap();
        let config = Config {
            port: 0,
            mode: OperatingMode::Safe,
            jwt_secret: "test-secret".into(),
            token_ttl_minutes: 30,
            bcrypt_cost: 4,
            database_url: "sqlite::memory:".into(),
            users_file: String::new(),
            venues_file: String::new(),
        };
        let state = AppState::new(&config, Arc::new(SqliteStore::in_memory().await.unwrap()), venues);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(state))
                .configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/venues").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["data"][0]["city"], "New York");
        assert_eq!(body["data"][1]["capacity"], 250);
        assert_eq!(body["data"][2], json!({"city": "Paris", "open": true}));
        assert!(body.get("msg").is_none());
    }
}
