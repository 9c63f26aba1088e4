//! WhatsApp 适配器
//!
//! 与短信共用 Twilio 客户端，收件地址加 `whatsapp:` 前缀区分。

use async_trait::async_trait;
use parcel_shared::events::NotificationChannel;
use serde_json::json;

use super::{ProviderAdapter, ProviderClient, into_response, require_address};
use crate::error::Result;
use crate::types::{NotificationProviderResponse, OutboundMessage, ProviderId};

const WHATSAPP_PREFIX: &str = "whatsapp:";

pub struct WhatsAppAdapter {
    client: ProviderClient,
}

impl WhatsAppAdapter {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<String> {
        let to = require_address(NotificationChannel::WhatsApp, &message.to)?;
        let payload = json!({
            "to": whatsapp_address(to),
            "body": message.body,
            "trigger": message.trigger,
        });
        self.client.post_message(&payload).await
    }
}

/// 已带前缀的地址保持不变
fn whatsapp_address(phone: &str) -> String {
    if phone.starts_with(WHATSAPP_PREFIX) {
        phone.to_string()
    } else {
        format!("{WHATSAPP_PREFIX}{phone}")
    }
}

#[async_trait]
impl ProviderAdapter for WhatsAppAdapter {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::WhatsApp
    }

    fn provider(&self) -> ProviderId {
        self.client.provider()
    }

    async fn send(&self, message: &OutboundMessage) -> NotificationProviderResponse {
        let result = self.deliver(message).await;
        into_response(self.channel(), self.provider(), result)
    }
}
