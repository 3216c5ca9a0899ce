use actix_web::{HttpResponse, get, post, web};
use common::{CoursePaymentForm, SalaryPaymentForm};

use crate::error::ApiError;
use crate::state::AppState;

#[get("/salary")]
pub async fn get_salary_payments(app_state: web::Data<AppState>) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(&app_state.fixtures.salary_payments)
}

#[post("/salary")]
pub async fn create_salary_payment(
    form: web::Json<SalaryPaymentForm>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let payment = form.into_inner().into_pending().map_err(|e| {
        log::warn!("Rejected salary payment: {}", e);
        ApiError::BadRequest(e.to_string())
    })?;
    app_state.pause().await;

    log::info!(
        "Salary payment {} for teacher {} queued",
        payment.reference,
        payment.teacher_id
    );
    Ok(HttpResponse::Ok().json(payment))
}

#[get("/course")]
pub async fn get_course_payments(app_state: web::Data<AppState>) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(&app_state.fixtures.course_payments)
}

#[post("/course")]
pub async fn create_course_payment(
    form: web::Json<CoursePaymentForm>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let payment = form.into_inner().into_pending().map_err(|e| {
        log::warn!("Rejected course payment: {}", e);
        ApiError::BadRequest(e.to_string())
    })?;
    app_state.pause().await;

    log::info!(
        "Course payment {} for student {} queued",
        payment.reference,
        payment.student_id
    );
    Ok(HttpResponse::Ok().json(payment))
}

#[get("/stats")]
pub async fn get_payment_stats(app_state: web::Data<AppState>) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(&app_state.fixtures.payment_stats)
}

#[cfg(test)]
mod tests {
    use crate::handlers::configure;
    use crate::state::testing;
    use actix_web::{App, http::StatusCode, test, web};
    use common::{CoursePayment, PaymentStatus, SalaryPayment};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn salary_list_and_create() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::state(1.0, 1.0)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/payments/salary").to_request();
        let payments: Vec<SalaryPayment> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].reference, "SAL-2024-001");

        let req = test::TestRequest::post()
            .uri("/api/payments/salary")
            .set_json(json!({
                "teacherId": "1",
                "amount": 3200,
                "currency": "USD",
                "paymentMethod": "bank_transfer"
            }))
            .to_request();
        let payment: SalaryPayment = test::call_and_read_body_json(&app, req).await;
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.reference.starts_with("SAL-"));
    }

    #[actix_web::test]
    async fn salary_over_the_cap_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::state(1.0, 1.0)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/payments/salary")
            .set_json(json!({
                "teacherId": "1",
                "amount": 100001,
                "currency": "USD",
                "paymentMethod": "bank_transfer"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn course_create_needs_a_known_method() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::state(1.0, 1.0)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/payments/course")
            .set_json(json!({
                "studentId": "1",
                "courseId": "1",
                "amount": 480,
                "currency": "USD",
                "paymentMethod": "credit_card"
            }))
            .to_request();
        let payment: CoursePayment = test::call_and_read_body_json(&app, req).await;
        assert!(payment.reference.starts_with("CRS-"));

        let req = test::TestRequest::post()
            .uri("/api/payments/course")
            .set_json(json!({
                "studentId": "1",
                "courseId": "1",
                "amount": 480,
                "currency": "USD",
                "paymentMethod": "cash"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unknown payment method `cash`");
    }

    #[actix_web::test]
    async fn stats_are_served() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::state(1.0, 1.0)))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/payments/stats").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["completedPayments"], 161);
    }
}
