//! 短信适配器（Twilio）

use async_trait::async_trait;
use parcel_shared::events::NotificationChannel;
use serde_json::json;

use super::{ProviderAdapter, ProviderClient, into_response, require_address};
use crate::error::Result;
use crate::types::{NotificationProviderResponse, OutboundMessage, ProviderId};

/// 短信发送器
///
/// 纯文本正文，操作按钮与主题不随短信发送。
pub struct SmsAdapter {
    client: ProviderClient,
}

impl SmsAdapter {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<String> {
        let to = require_address(NotificationChannel::Sms, &message.to)?;
        let payload = json!({
            "to": to,
            "body": message.body,
            "trigger": message.trigger,
        });
        self.client.post_message(&payload).await
    }
}

#[async_trait]
impl ProviderAdapter for SmsAdapter {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Sms
    }

    fn provider(&self) -> ProviderId {
        self.client.provider()
    }

    async fn send(&self, message: &OutboundMessage) -> NotificationProviderResponse {
        let result = self.deliver(message).await;
        into_response(self.channel(), self.provider(), result)
    }
}
