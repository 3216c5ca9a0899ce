mod payments;
mod session;
mod teachers;
mod upi;

use actix_web::{HttpResponse, Responder, get, web};
pub use payments::*;
pub use session::*;
pub use teachers::*;
pub use upi::*;

use crate::error::{json_config, query_config};

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Welcome to Tutor Portal!")
}

/// Registers every route. Literal segments are registered before the
/// `{id}` routes they would otherwise be shadowed by.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(index)
        .service(get_session)
        .service(
            web::scope("/api/upi")
                .service(verify_vpa)
                .service(create_upi_payment)
                .service(export_transactions)
                .service(get_transactions)
                .service(get_transaction)
                .service(get_upi_stats),
        )
        .service(
            web::scope("/api/payments")
                .service(get_salary_payments)
                .service(create_salary_payment)
                .service(get_course_payments)
                .service(create_course_payment)
                .service(get_payment_stats),
        )
        .service(
            web::scope("/api/teachers")
                .service(get_teacher_students)
                .service(get_teacher_lessons)
                .service(get_teacher_slots)
                .service(get_teacher_comments)
                .service(get_teacher_history)
                .service(get_teacher)
                .service(update_teacher),
        );
}
