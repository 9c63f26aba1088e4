//! 通知分发编排
//!
//! 单一入口 `send_notification`：查触发器配置 → 过滤渠道 → 检查用户退订 →
//! 选择语言 → 各渠道并发解析模板并调用服务商适配器。
//!
//! 渠道之间相互独立，一个渠道失败不会取消或阻塞其它渠道，
//! 失败以 `success = false` 的结果返回。分发器在启动时显式构建，
//! 以 `Arc` 注入调用方。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::join_all;
use parcel_shared::config::{AppConfig, NotificationConfig};
use parcel_shared::events::{Language, NotificationChannel, NotificationTrigger};
use parcel_shared::observability::metrics;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{NotificationError, Result};
use crate::providers::ProviderTable;
use crate::scheduler::{HttpJobQueue, JobHandle, JobQueue, ScheduledNotification};
use crate::templates::TemplateStore;
use crate::triggers::{TriggerConfig, TriggerRegistry};
use crate::types::{
    NotificationPreferences, NotificationProviderResponse, NotificationTemplateData,
    OutboundMessage, ProviderId,
};

/// 分发策略
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub default_language: Language,
    /// 全局可用渠道，对所有触发器生效
    pub enabled_channels: Vec<NotificationChannel>,
    /// 为 true 时事务性触发器忽略用户的渠道级退订
    pub transactional_overrides_channel_opt_out: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

impl From<&NotificationConfig> for DispatchSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            default_language: config.default_language,
            enabled_channels: config.enabled_channels.clone(),
            transactional_overrides_channel_opt_out: config.transactional_overrides_channel_opt_out,
        }
    }
}

/// 批量发送中的单个收件人
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecipient {
    pub template_data: NotificationTemplateData,
    #[serde(default)]
    pub user_preferences: Option<NotificationPreferences>,
}

/// 通知分发器
pub struct NotificationDispatcher {
    registry: Arc<TriggerRegistry>,
    templates: Arc<TemplateStore>,
    providers: ProviderTable,
    settings: DispatchSettings,
    job_queue: Option<Arc<dyn JobQueue>>,
}

impl NotificationDispatcher {
    pub fn new(
        registry: Arc<TriggerRegistry>,
        templates: Arc<TemplateStore>,
        providers: ProviderTable,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            registry,
            templates,
            providers,
            settings,
            job_queue: None,
        }
    }

    /// 按应用配置构建：内置触发器表与模板目录，HTTP 服务商与任务队列
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = ProviderTable::from_config(&config.providers)?;
        let mut dispatcher = Self::new(
            Arc::new(TriggerRegistry::with_defaults()),
            Arc::new(TemplateStore::with_defaults()),
            providers,
            DispatchSettings::from(&config.notification),
        );

        match HttpJobQueue::from_config(&config.scheduler)? {
            Some(queue) => dispatcher = dispatcher.with_job_queue(Arc::new(queue)),
            None => warn!("未配置任务队列地址，定时通知不可用"),
        }

        Ok(dispatcher)
    }

    pub fn with_job_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.job_queue = Some(queue);
        self
    }

    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// 发送通知
    ///
    /// 只有触发器未注册时返回错误；渠道级失败都体现在结果列表中。
    /// 返回的结果每个渠道一条，渠道之间不保证顺序。
    #[instrument(skip_all, fields(trigger = %trigger, dispatch_id = %Uuid::now_v7()))]
    pub async fn send_notification(
        &self,
        trigger: NotificationTrigger,
        data: &NotificationTemplateData,
        preferences: Option<&NotificationPreferences>,
    ) -> Result<Vec<NotificationProviderResponse>> {
        let start = Instant::now();

        let config = match self.registry.get_trigger_config(trigger) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "触发器配置缺失");
                metrics::record_notification_dispatch(
                    trigger.as_str(),
                    "configuration_error",
                    start.elapsed().as_secs_f64(),
                );
                return Err(e);
            }
        };

        let channels = self.eligible_channels(config, preferences);

        let suppressed = !config.transactional
            && preferences.is_some_and(|prefs| prefs.is_trigger_disabled(trigger));
        if suppressed {
            info!("用户已退订该触发器，跳过发送");
            metrics::record_notification_dispatch(
                trigger.as_str(),
                "suppressed",
                start.elapsed().as_secs_f64(),
            );
            return Ok(Vec::new());
        }

        let language = preferences
            .and_then(|p| p.language)
            .unwrap_or(self.settings.default_language);

        let in_quiet_hours = preferences
            .and_then(|p| p.quiet_hours.as_ref())
            .is_some_and(|quiet| quiet.contains_instant(Utc::now()));
        if in_quiet_hours {
            // 免打扰时段只记录，不延迟也不丢弃
            debug!("当前处于用户免打扰时段，照常发送");
            metrics::record_quiet_hours_dispatch(trigger.as_str());
        }

        let sends = channels
            .iter()
            .map(|&channel| self.dispatch_channel(trigger, channel, language, data));
        let responses = join_all(sends).await;

        let succeeded = responses.iter().filter(|r| r.success).count();
        let outcome = dispatch_outcome(&responses);
        metrics::record_notification_dispatch(
            trigger.as_str(),
            outcome,
            start.elapsed().as_secs_f64(),
        );

        info!(
            language = %language,
            channels = responses.len(),
            succeeded,
            outcome,
            "通知分发完成"
        );

        Ok(responses)
    }

    /// 批量发送
    ///
    /// 每个收件人独立并发处理；单个收件人出错或 panic 时其结果为空列表，
    /// 不影响其它收件人。输出顺序与输入一致。
    #[instrument(skip_all, fields(trigger = %trigger, recipients = recipients.len()))]
    pub async fn batch_send(
        &self,
        trigger: NotificationTrigger,
        recipients: Vec<BatchRecipient>,
    ) -> Vec<Vec<NotificationProviderResponse>> {
        let sends = recipients.iter().enumerate().map(|(index, recipient)| async move {
            let send = self.send_notification(
                trigger,
                &recipient.template_data,
                recipient.user_preferences.as_ref(),
            );

            match AssertUnwindSafe(send).catch_unwind().await {
                Ok(Ok(responses)) => responses,
                Ok(Err(e)) => {
                    error!(index, error = %e, "收件人分发失败");
                    Vec::new()
                }
                Err(_) => {
                    error!(index, "收件人分发过程中发生 panic");
                    Vec::new()
                }
            }
        });

        join_all(sends).await
    }

    /// 提交定时通知
    ///
    /// 触发器必须已注册；任务到期后由 `ScheduledNotification::dispatch` 执行。
    #[instrument(skip_all, fields(trigger = %trigger, scheduled_for = %scheduled_for))]
    pub async fn schedule_notification(
        &self,
        trigger: NotificationTrigger,
        data: NotificationTemplateData,
        scheduled_for: DateTime<Utc>,
        preferences: Option<NotificationPreferences>,
    ) -> Result<JobHandle> {
        self.registry.get_trigger_config(trigger)?;

        let Some(queue) = &self.job_queue else {
            metrics::record_notification_scheduled(trigger.as_str(), "unavailable");
            return Err(NotificationError::Scheduling("未配置任务队列".to_string()));
        };

        let job = ScheduledNotification {
            trigger,
            template_data: data,
            scheduled_for,
            user_preferences: preferences,
        };

        match queue.submit(&job).await {
            Ok(handle) => {
                metrics::record_notification_scheduled(trigger.as_str(), "accepted");
                info!(job_id = %handle.job_id, "定时通知已受理");
                Ok(handle)
            }
            Err(e) => {
                metrics::record_notification_scheduled(trigger.as_str(), "failed");
                warn!(error = %e, "定时通知提交失败");
                Err(e)
            }
        }
    }

    /// 计算实际发送的渠道：触发器渠道 ∩ 全局可用渠道，再按用户渠道偏好过滤
    fn eligible_channels(
        &self,
        config: &TriggerConfig,
        preferences: Option<&NotificationPreferences>,
    ) -> Vec<NotificationChannel> {
        let keep_all_for_transactional =
            config.transactional && self.settings.transactional_overrides_channel_opt_out;

        config
            .channels
            .iter()
            .copied()
            .filter(|channel| self.settings.enabled_channels.contains(channel))
            .filter(|&channel| match preferences {
                Some(prefs) if !keep_all_for_transactional => {
                    let enabled = prefs.is_channel_enabled(channel);
                    if !enabled {
                        debug!(channel = %channel, "用户关闭了该渠道");
                    }
                    enabled
                }
                _ => true,
            })
            .collect()
    }

    /// 单渠道发送：模板缺失或服务商未注册时直接返回失败，不调用服务商
    async fn dispatch_channel(
        &self,
        trigger: NotificationTrigger,
        channel: NotificationChannel,
        language: Language,
        data: &NotificationTemplateData,
    ) -> NotificationProviderResponse {
        let provider = ProviderId::for_channel(channel);

        let Some(template) = self.templates.get_template(trigger, channel, language) else {
            let err = NotificationError::TemplateNotFound {
                trigger,
                channel,
                language,
            };
            return self.local_failure(channel, provider, err);
        };

        let Some(adapter) = self.providers.get(channel) else {
            return self.local_failure(
                channel,
                provider,
                NotificationError::ProviderNotRegistered { channel },
            );
        };

        let content = template.render(data);
        let message = OutboundMessage {
            to: data.address_for(channel).unwrap_or_default().to_string(),
            subject: content.subject,
            body: content.body,
            action: content.action,
            trigger,
        };

        adapter.send(&message).await
    }

    fn local_failure(
        &self,
        channel: NotificationChannel,
        provider: ProviderId,
        err: NotificationError,
    ) -> NotificationProviderResponse {
        warn!(channel = %channel, error = %err, "渠道未发送");
        metrics::record_channel_result(channel.as_str(), provider.as_str(), false);
        NotificationProviderResponse::failed(channel, provider, err.to_string())
    }
}

/// 按渠道结果归类本次分发：no_channels / sent / partial / failed
fn dispatch_outcome(responses: &[NotificationProviderResponse]) -> &'static str {
    let succeeded = responses.iter().filter(|r| r.success).count();
    if responses.is_empty() {
        "no_channels"
    } else if succeeded == responses.len() {
        "sent"
    } else if succeeded > 0 {
        "partial"
    } else {
        "failed"
    }
}
