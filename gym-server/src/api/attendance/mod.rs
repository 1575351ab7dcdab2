//! Attendance API 模块
//!
//! 前台代签走 JSON；自助签到/签退走 multipart (照片必填)。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attendance", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/lookup", get(handler::lookup))
        .route("/check-in", post(handler::check_in))
        .route("/check-out", post(handler::check_out))
        .route("/self/check-in", post(handler::self_check_in))
        .route("/self/check-out", post(handler::self_check_out))
        .route("/auto-checkout", post(handler::auto_checkout))
}
