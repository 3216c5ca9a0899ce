use actix_web::{HttpResponse, get, http::header, post, web};
use common::{
    Category, HistoryQuery, PaymentRequest, history_csv_bytes, mask_address,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyPayload {
    #[serde(default, alias = "vpa")]
    address: Option<String>,
}

#[post("/verify-vpa")]
pub async fn verify_vpa(
    payload: web::Json<VerifyPayload>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let address = match payload.into_inner().address {
        Some(a) if !a.trim().is_empty() => a,
        _ => return Err(ApiError::BadRequest("VPA is required".to_string())),
    };

    let result = app_state.gateway.verify_address(&address).await.map_err(|e| {
        log::error!("Verification of {} failed: {}", mask_address(&address), e);
        ApiError::Internal("VPA verification failed".to_string())
    })?;

    Ok(HttpResponse::Ok().json(result))
}

/// Payment body as sent by clients; every field is checked for presence
/// before the request is built.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    #[serde(default, alias = "toVPA")]
    to_address: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default, alias = "pin")]
    authorization_code: Option<String>,
}

impl PaymentPayload {
    fn into_request(self) -> Result<PaymentRequest, ApiError> {
        let mut missing = Vec::new();
        let to_address = self.to_address.filter(|v| !v.is_empty());
        let description = self.description.filter(|v| !v.trim().is_empty());
        let authorization_code = self.authorization_code.filter(|v| !v.is_empty());

        if to_address.is_none() {
            missing.push("toAddress");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        if description.is_none() {
            missing.push("description");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if authorization_code.is_none() {
            missing.push("authorizationCode");
        }

        match (to_address, self.amount, description, self.category, authorization_code) {
            (Some(to_address), Some(amount), Some(description), Some(category), Some(code)) => {
                Ok(PaymentRequest {
                    to_address,
                    amount,
                    description,
                    category,
                    authorization_code: code,
                })
            }
            _ => Err(ApiError::BadRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

#[post("/payments")]
pub async fn create_upi_payment(
    payload: web::Json<PaymentPayload>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner().into_request()?;
    log::debug!("Payment requested: {:?}", request);

    let transaction = app_state.gateway.initiate_payment(&request).await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("/transactions")]
pub async fn get_transactions(
    query: web::Query<HistoryQuery>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(app_state.fixtures.transaction_history(&query))
}

#[get("/transactions/export")]
pub async fn export_transactions(
    query: web::Query<HistoryQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    app_state.pause().await;
    let records = app_state.fixtures.transaction_history(&query);
    let body = history_csv_bytes(&records).await.map_err(|e| {
        log::error!("Failed to export transactions: {:#}", e);
        ApiError::Internal("Failed to export transactions".to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"upi-transactions.csv\"",
        ))
        .body(body))
}

#[get("/transactions/{id}")]
pub async fn get_transaction(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    app_state.pause().await;

    match app_state.fixtures.transaction(&id) {
        Some(transaction) => Ok(HttpResponse::Ok().json(transaction)),
        None => {
            log::warn!("Transaction not found: {}", id);
            Err(ApiError::NotFound("Transaction not found".to_string()))
        }
    }
}

#[get("/stats")]
pub async fn get_upi_stats(app_state: web::Data<AppState>) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(&app_state.fixtures.upi_stats)
}

#[cfg(test)]
mod tests {
    use crate::handlers::configure;
    use crate::state::testing;
    use actix_web::{App, http::StatusCode, test, web};
    use common::{TransactionRecord, VerificationResult};
    use serde_json::{Value, json};
    use std::time::{Duration, Instant};

    macro_rules! app {
        ($verify:expr, $pay:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(testing::state($verify, $pay)))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn verify_accepts_either_key() {
        let app = app!(1.0, 1.0);
        for body in [json!({"address": "sarah.johnson@gpay"}), json!({"vpa": "sarah.johnson@gpay"})] {
            let req = test::TestRequest::post()
                .uri("/api/upi/verify-vpa")
                .set_json(body)
                .to_request();
            let result: VerificationResult = test::call_and_read_body_json(&app, req).await;
            assert!(result.is_valid);
            assert!(result.display_name.is_some());
        }
    }

    #[actix_web::test]
    async fn verify_without_address_is_bad_request() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::post()
            .uri("/api/upi/verify-vpa")
            .set_json(json!({"address": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "VPA is required");
    }

    #[actix_web::test]
    async fn malformed_json_still_answers_json() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::post()
            .uri("/api/upi/verify-vpa")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[actix_web::test]
    async fn payment_settles_with_legacy_keys() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::post()
            .uri("/api/upi/payments")
            .set_json(json!({
                "toVPA": "sarah.johnson@gpay",
                "amount": 1500,
                "description": "Piano course fee",
                "category": "course_fee",
                "pin": "123456"
            }))
            .to_request();
        let record: TransactionRecord = test::call_and_read_body_json(&app, req).await;
        assert!(record.is_consistent());
        assert_eq!(record.amount, 1500.0);
        assert_eq!(record.from_address, "teacher@paytm");
    }

    #[actix_web::test]
    async fn declined_payment_is_400_with_record() {
        let app = app!(1.0, 0.0);
        let req = test::TestRequest::post()
            .uri("/api/upi/payments")
            .set_json(json!({
                "toAddress": "sarah.johnson@gpay",
                "amount": 1500,
                "description": "Piano course fee",
                "category": "course_fee",
                "authorizationCode": "1234"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Payment failed");
        assert_eq!(body["transaction"]["status"], "failed");
        assert_eq!(body["transaction"]["failureReason"], "Transaction declined by bank");
    }

    #[actix_web::test]
    async fn missing_fields_are_listed() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::post()
            .uri("/api/upi/payments")
            .set_json(json!({"toAddress": "sarah.johnson@gpay", "amount": 10}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"],
            "Missing required fields: description, category, authorizationCode"
        );
    }

    #[actix_web::test]
    async fn invalid_fields_are_rejected_before_the_gateway_decides() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::post()
            .uri("/api/upi/payments")
            .set_json(json!({
                "toAddress": "sarah.johnson@gpay",
                "amount": 100000.01,
                "description": "Too much",
                "category": "other",
                "authorizationCode": "1234"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "amount: Amount cannot exceed ₹1,00,000");
    }

    #[actix_web::test]
    async fn history_is_filtered_and_paged() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::get()
            .uri("/api/upi/transactions?type=receive")
            .to_request();
        let records: Vec<TransactionRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "txn_002");

        let req = test::TestRequest::get()
            .uri("/api/upi/transactions?limit=2&offset=1")
            .to_request();
        let records: Vec<TransactionRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "txn_002");
    }

    #[actix_web::test]
    async fn unknown_status_filter_is_bad_request() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::get()
            .uri("/api/upi/transactions?status=lost")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn export_is_csv_and_not_shadowed_by_id_route() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::get()
            .uri("/api/upi/transactions/export?status=failed")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/csv; charset=utf-8"
        );
        let body = test::read_body(resp).await;
        let text = std::str::from_utf8(&body).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("txn_003"));
    }

    #[actix_web::test]
    async fn empty_export_keeps_the_header_and_the_delay() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(testing::delayed(40)))
                .configure(configure),
        )
        .await;
        let started = Instant::now();
        let req = test::TestRequest::get()
            .uri("/api/upi/transactions/export?status=cancelled")
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(started.elapsed() >= Duration::from_millis(40));

        let text = std::str::from_utf8(&body).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("id,transactionId,"));
    }

    #[actix_web::test]
    async fn single_transaction_or_404() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::get()
            .uri("/api/upi/transactions/txn_001")
            .to_request();
        let record: TransactionRecord = test::call_and_read_body_json(&app, req).await;
        assert_eq!(record.to_address, "sarah.johnson@gpay");

        let req = test::TestRequest::get()
            .uri("/api/upi/transactions/txn_999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn stats_match_fixtures() {
        let app = app!(1.0, 1.0);
        let req = test::TestRequest::get().uri("/api/upi/stats").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["totalTransactions"], 247);
        assert_eq!(stats["averageTransactionAmount"], 2750.0);
    }
}
