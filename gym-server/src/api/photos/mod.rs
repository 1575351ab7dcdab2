//! 照片访问路由
//!
//! 考勤记录里存的照片 URL (`/photos/{hash}.jpg`) 由这里回源。

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use http::header;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/photos/{filename}", get(serve_photo))
}

enum PhotoResponse {
    Ok(Bytes),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for PhotoResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            PhotoResponse::Ok(content) => (
                http::StatusCode::OK,
                [(header::CONTENT_TYPE, "image/jpeg")],
                content,
            )
                .into_response(),
            PhotoResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "Photo not found").into_response()
            }
            PhotoResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// GET /photos/:filename - 读取存证照片
async fn serve_photo(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> PhotoResponse {
    // 路径穿越防护
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return PhotoResponse::BadRequest("Invalid filename");
    }

    match state.photos.read(&filename).await {
        Some(content) => PhotoResponse::Ok(content.into()),
        None => PhotoResponse::NotFound,
    }
}
