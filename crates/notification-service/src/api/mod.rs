//! HTTP 接入层
//!
//! 供业务方通过 HTTP 调用分发核心，路由只做请求解析和错误映射。

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{BatchSendRequest, ScheduleNotificationRequest, SendNotificationRequest};

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware};
use parcel_shared::observability::middleware::http_tracing;

use crate::dispatcher::NotificationDispatcher;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// 通知相关路由
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", post(handlers::send_notification))
        .route("/notifications/batch", post(handlers::batch_send))
        .route("/notifications/schedule", post(handlers::schedule_notification))
        .route("/notifications/scheduled", post(handlers::run_scheduled))
}

/// 构建完整路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", notification_routes())
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn(http_tracing))
        .with_state(state)
}
