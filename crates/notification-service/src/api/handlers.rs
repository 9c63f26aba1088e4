//! 通知接口处理器

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use parcel_shared::events::NotificationTrigger;
use serde::Deserialize;

use super::AppState;
use super::error::ApiError;
use crate::dispatcher::BatchRecipient;
use crate::scheduler::{JobHandle, ScheduledNotification};
use crate::types::{NotificationPreferences, NotificationProviderResponse, NotificationTemplateData};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// 即时发送请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub trigger: NotificationTrigger,
    #[serde(default)]
    pub template_data: NotificationTemplateData,
    #[serde(default)]
    pub user_preferences: Option<NotificationPreferences>,
}

/// 批量发送请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSendRequest {
    pub trigger: NotificationTrigger,
    pub recipients: Vec<BatchRecipient>,
}

/// 定时发送请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleNotificationRequest {
    pub trigger: NotificationTrigger,
    #[serde(default)]
    pub template_data: NotificationTemplateData,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub user_preferences: Option<NotificationPreferences>,
}

/// POST /api/notifications
pub async fn send_notification(
    State(state): State<AppState>,
    payload: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<NotificationProviderResponse>>> {
    let Json(req) = payload?;

    let responses = state
        .dispatcher
        .send_notification(req.trigger, &req.template_data, req.user_preferences.as_ref())
        .await?;

    Ok(Json(responses))
}

/// POST /api/notifications/batch
pub async fn batch_send(
    State(state): State<AppState>,
    payload: Result<Json<BatchSendRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Vec<NotificationProviderResponse>>>> {
    let Json(req) = payload?;

    let results = state.dispatcher.batch_send(req.trigger, req.recipients).await;
    Ok(Json(results))
}

/// POST /api/notifications/schedule
pub async fn schedule_notification(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleNotificationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JobHandle>)> {
    let Json(req) = payload?;

    let handle = state
        .dispatcher
        .schedule_notification(
            req.trigger,
            req.template_data,
            req.scheduled_for,
            req.user_preferences,
        )
        .await?;

    Ok((StatusCode::ACCEPTED, Json(handle)))
}

/// POST /api/notifications/scheduled
///
/// 任务队列到期回调，按即时发送的语义执行
pub async fn run_scheduled(
    State(state): State<AppState>,
    payload: Result<Json<ScheduledNotification>, JsonRejection>,
) -> ApiResult<Json<Vec<NotificationProviderResponse>>> {
    let Json(job) = payload?;

    let responses = job.dispatch(&state.dispatcher).await?;
    Ok(Json(responses))
}

/// 存活探针
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "notification-service"
    }))
}
