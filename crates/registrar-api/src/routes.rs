//! Router

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, students};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let student_routes = Router::new()
        .route(
            "/students",
            post(students::create_student)
                .get(students::list_students)
                .put(students::update_student),
        )
        .route(
            "/students/{id}",
            get(students::get_student).delete(students::delete_student),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", student_routes)
        .with_state(state)
}
