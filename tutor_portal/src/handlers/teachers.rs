use actix_web::{HttpResponse, get, patch, web};
use common::TeacherUpdate;

use crate::error::ApiError;
use crate::state::AppState;

#[get("/{id}")]
pub async fn get_teacher(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    app_state.pause().await;

    match app_state.fixtures.teacher(&id) {
        Some(teacher) => Ok(HttpResponse::Ok().json(teacher)),
        None => {
            log::warn!("Teacher not found: {}", id);
            Err(ApiError::NotFound("Teacher not found".to_string()))
        }
    }
}

/// Returns the profile with the supplied fields merged in. Nothing is saved.
#[patch("/{id}")]
pub async fn update_teacher(
    path: web::Path<String>,
    update: web::Json<TeacherUpdate>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    if !app_state.session.is_admin() {
        return Err(ApiError::Forbidden(
            "Only administrators can update teacher profiles".to_string(),
        ));
    }

    let id = path.into_inner();
    let teacher = app_state.fixtures.teacher(&id).ok_or_else(|| {
        log::warn!("Teacher not found: {}", id);
        ApiError::NotFound("Teacher not found".to_string())
    })?;
    app_state.pause().await;

    let updated = update.into_inner().apply_to(teacher);
    log::info!("{} updated teacher {}", app_state.session.user.name, id);
    Ok(HttpResponse::Ok().json(updated))
}

#[get("/{id}/students")]
pub async fn get_teacher_students(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(app_state.fixtures.students_of(&path))
}

#[get("/{id}/lessons")]
pub async fn get_teacher_lessons(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(app_state.fixtures.lessons_of(&path))
}

#[get("/{id}/slots")]
pub async fn get_teacher_slots(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(app_state.fixtures.slots_of(&path))
}

#[get("/{id}/comments")]
pub async fn get_teacher_comments(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(app_state.fixtures.comments_of(&path))
}

#[get("/{id}/history")]
pub async fn get_teacher_history(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    app_state.pause().await;
    HttpResponse::Ok().json(app_state.fixtures.history_of(&path))
}
