//! Trainer Attendance API 模块 — 教练每日考勤

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/trainer-attendance", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/check-in", post(handler::check_in))
        .route("/check-out", post(handler::check_out))
}
