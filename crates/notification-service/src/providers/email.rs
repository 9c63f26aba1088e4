//! 邮件适配器（SendGrid）
//!
//! 渲染后的正文按 HTML 发送，在这里完成转义与换行处理。

use async_trait::async_trait;
use parcel_shared::events::NotificationChannel;
use serde_json::json;

use super::{ProviderAdapter, ProviderClient, into_response, require_address};
use crate::error::Result;
use crate::types::{NotificationProviderResponse, OutboundMessage, ProviderId};

pub struct EmailAdapter {
    client: ProviderClient,
}

impl EmailAdapter {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<String> {
        let to = require_address(NotificationChannel::Email, &message.to)?;
        let mut payload = json!({
            "to": to,
            "subject": message.subject.as_deref().unwrap_or_default(),
            "body": html_body(&message.body),
            "trigger": message.trigger,
        });
        if let Some(action) = &message.action {
            payload["action"] = json!({
                "label": html_escape(&action.label),
                "url": html_escape(&action.url),
            });
        }
        self.client.post_message(&payload).await
    }
}

/// HTML 转义
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_body(text: &str) -> String {
    html_escape(text).replace("\r\n", "\n").replace('\n', "<br>")
}

#[async_trait]
impl ProviderAdapter for EmailAdapter {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    fn provider(&self) -> ProviderId {
        self.client.provider()
    }

    async fn send(&self, message: &OutboundMessage) -> NotificationProviderResponse {
        let result = self.deliver(message).await;
        into_response(self.channel(), self.provider(), result)
    }
}
