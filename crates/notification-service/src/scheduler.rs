//! 定时通知提交
//!
//! 本服务不实现调度器，只负责把定时请求交给外部任务队列，
//! 并约定任务触发时按 `send_notification` 的语义执行。

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parcel_shared::config::SchedulerConfig;
use parcel_shared::events::NotificationTrigger;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dispatcher::NotificationDispatcher;
use crate::error::{NotificationError, Result};
use crate::types::{NotificationPreferences, NotificationProviderResponse, NotificationTemplateData};

/// 提交给任务队列的定时通知载荷
///
/// `scheduledFor` 以 RFC 3339 (ISO-8601) 时间戳序列化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotification {
    pub trigger: NotificationTrigger,
    pub template_data: NotificationTemplateData,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub user_preferences: Option<NotificationPreferences>,
}

impl ScheduledNotification {
    /// 任务到期时执行，语义与即时发送一致
    pub async fn dispatch(
        &self,
        dispatcher: &NotificationDispatcher,
    ) -> Result<Vec<NotificationProviderResponse>> {
        dispatcher
            .send_notification(
                self.trigger,
                &self.template_data,
                self.user_preferences.as_ref(),
            )
            .await
    }
}

/// 任务队列返回的句柄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: String,
    pub scheduled_for: DateTime<Utc>,
}

/// 外部任务队列
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn submit(&self, job: &ScheduledNotification) -> Result<JobHandle>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAck {
    job_id: Option<String>,
}

/// 基于 HTTP 的任务队列客户端
pub struct HttpJobQueue {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpJobQueue {
    pub fn new(endpoint: impl Into<String>, config: &SchedulerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| NotificationError::Scheduling(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: config.api_key.clone(),
        })
    }

    /// 未配置 url 时返回 None，定时通知不可用
    pub fn from_config(config: &SchedulerConfig) -> Result<Option<Self>> {
        match config.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Self::new(url, config).map(Some),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl JobQueue for HttpJobQueue {
    async fn submit(&self, job: &ScheduledNotification) -> Result<JobHandle> {
        let mut request = self.client.post(&self.endpoint).json(job);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotificationError::Scheduling(format!("请求任务队列失败: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Scheduling(format!(
                "任务队列返回 HTTP {status}"
            )));
        }

        let ack: SubmitAck = response
            .json()
            .await
            .map_err(|e| NotificationError::Scheduling(format!("任务队列响应解析失败: {e}")))?;

        let job_id = ack
            .job_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| NotificationError::Scheduling("任务队列响应缺少 jobId".to_string()))?;

        info!(job_id = %job_id, trigger = %job.trigger, "定时通知已提交");

        Ok(JobHandle {
            job_id,
            scheduled_for: job.scheduled_for,
        })
    }
}
