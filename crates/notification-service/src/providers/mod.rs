//! 服务商适配器
//!
//! 通过 `ProviderAdapter` trait 抽象发送行为，每个渠道一个实现，
//! 由 `ProviderTable` 按渠道查表选择，新增渠道只需注册新的适配器。
//!
//! 适配器边界上的失败都是数据：传输失败、空地址等情况返回
//! `success = false` 的结果，不会 panic 或向上传播错误。

mod email;
mod push;
mod sms;
mod whatsapp;

pub use email::EmailAdapter;
pub use push::PushAdapter;
pub use sms::SmsAdapter;
pub use whatsapp::WhatsAppAdapter;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parcel_shared::config::{ProviderEndpointConfig, ProvidersConfig};
use parcel_shared::events::NotificationChannel;
use parcel_shared::observability::metrics;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{NotificationError, Result};
use crate::types::{NotificationProviderResponse, OutboundMessage, ProviderId};

/// 服务商适配器 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// 适配器负责的渠道
    fn channel(&self) -> NotificationChannel;

    /// 背后的服务商
    fn provider(&self) -> ProviderId;

    /// 发送一条消息，每次调用恰好发起一次外部请求，不做重试
    async fn send(&self, message: &OutboundMessage) -> NotificationProviderResponse;
}

// ---------------------------------------------------------------------------
// ProviderTable — 渠道到适配器的查找表
// ---------------------------------------------------------------------------

/// 渠道到适配器的查找表
#[derive(Clone, Default)]
pub struct ProviderTable {
    adapters: HashMap<NotificationChannel, Arc<dyn ProviderAdapter>>,
}

impl ProviderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据服务商配置构建四个渠道的 HTTP 适配器
    ///
    /// SMS 与 WhatsApp 共用同一个 Twilio 客户端。
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let twilio = ProviderClient::new(ProviderId::Twilio, &config.sms)?;
        let sendgrid = ProviderClient::new(ProviderId::SendGrid, &config.email)?;
        let firebase = ProviderClient::new(ProviderId::Firebase, &config.push)?;

        Ok(Self::new()
            .with(Arc::new(SmsAdapter::new(twilio.clone())))
            .with(Arc::new(WhatsAppAdapter::new(twilio)))
            .with(Arc::new(EmailAdapter::new(sendgrid)))
            .with(Arc::new(PushAdapter::new(firebase))))
    }

    pub fn with(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// 注册适配器，同一渠道重复注册时覆盖
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        info!(
            channel = %adapter.channel(),
            provider = %adapter.provider(),
            "注册服务商适配器"
        );
        self.adapters.insert(adapter.channel(), adapter);
    }

    pub fn get(&self, channel: NotificationChannel) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(&channel)
    }

    /// 已注册的渠道
    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.adapters.keys().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// ProviderClient — 共享的 HTTP 传输
// ---------------------------------------------------------------------------

/// 服务商成功响应，至少包含 messageId
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderAck {
    message_id: Option<String>,
}

/// 服务商 HTTP 客户端
///
/// 每次发送一个 JSON `POST`，超时由 reqwest 传输层负责。
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    provider: ProviderId,
    endpoint: String,
    api_key: String,
}

impl ProviderClient {
    pub fn new(provider: ProviderId, config: &ProviderEndpointConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| NotificationError::Transport {
                provider: provider.to_string(),
                reason: format!("创建 HTTP 客户端失败: {e}"),
            })?;

        Ok(Self {
            client,
            provider,
            endpoint: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// 发送载荷，返回服务商消息 ID
    pub async fn post_message(&self, payload: &serde_json::Value) -> Result<String> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(format!("请求失败: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.transport_error(format!(
                "HTTP {status}: {}",
                truncate(&body, 200)
            )));
        }

        let ack: ProviderAck = response
            .json()
            .await
            .map_err(|e| self.transport_error(format!("响应解析失败: {e}")))?;

        ack.message_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| self.transport_error("响应缺少 messageId".to_string()))
    }

    fn transport_error(&self, reason: String) -> NotificationError {
        NotificationError::Transport {
            provider: self.provider.to_string(),
            reason,
        }
    }
}

// ---------------------------------------------------------------------------
// 适配器公共辅助
// ---------------------------------------------------------------------------

/// 校验收件地址，空地址属于调用方错误，在任何网络请求之前失败
pub(crate) fn require_address(channel: NotificationChannel, to: &str) -> Result<&str> {
    let to = to.trim();
    if to.is_empty() {
        return Err(NotificationError::InvalidRecipient { channel });
    }
    Ok(to)
}

/// 把适配器内部的 Result 转换为对外的发送结果
pub(crate) fn into_response(
    channel: NotificationChannel,
    provider: ProviderId,
    result: Result<String>,
) -> NotificationProviderResponse {
    let response = match result {
        Ok(message_id) => {
            info!(
                channel = %channel,
                provider = %provider,
                message_id = %message_id,
                "渠道发送成功"
            );
            NotificationProviderResponse::delivered(channel, provider, message_id)
        }
        Err(e) => {
            warn!(
                channel = %channel,
                provider = %provider,
                error = %e,
                "渠道发送失败"
            );
            NotificationProviderResponse::failed(channel, provider, e.to_string())
        }
    };

    metrics::record_channel_result(channel.as_str(), provider.as_str(), response.success);
    response
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}
