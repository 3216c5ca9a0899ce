use actix_web::{HttpResponse, get, web};

use crate::state::AppState;

#[get("/api/session")]
pub async fn get_session(app_state: web::Data<AppState>) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(&app_state.session)
}

#[cfg(test)]
mod tests {
    use crate::handlers::configure;
    use crate::state::testing;
    use actix_web::{App, test, web};
    use serde_json::Value;
    use std::time::{Duration, Instant};

    #[actix_web::test]
    async fn session_user_is_stamped() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::state(1.0, 1.0)))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/session").to_request();
        let session: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(session["user"]["name"], "Harsh Deo");
        assert_eq!(session["user"]["role"], "admin");
        assert!(session["user"]["lastLogin"].is_string());
    }

    #[actix_web::test]
    async fn session_waits_like_every_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::delayed(40)))
                .configure(configure),
        )
        .await;
        let started = Instant::now();
        let req = test::TestRequest::get().uri("/api/session").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
