//! 推送适配器（Firebase）

use async_trait::async_trait;
use parcel_shared::events::NotificationChannel;
use serde_json::json;

use super::{ProviderAdapter, ProviderClient, into_response, require_address};
use crate::error::Result;
use crate::types::{NotificationProviderResponse, OutboundMessage, ProviderId};

/// 推送发送器，收件地址为设备令牌
pub struct PushAdapter {
    client: ProviderClient,
}

impl PushAdapter {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    async fn deliver(&self, message: &OutboundMessage) -> Result<String> {
        let token = require_address(NotificationChannel::Push, &message.to)?;
        let mut payload = json!({
            "to": token,
            "body": message.body,
            "trigger": message.trigger,
        });
        if let Some(action) = &message.action {
            payload["action"] = json!(action);
        }
        self.client.post_message(&payload).await
    }
}

#[async_trait]
impl ProviderAdapter for PushAdapter {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Push
    }

    fn provider(&self) -> ProviderId {
        self.client.provider()
    }

    async fn send(&self, message: &OutboundMessage) -> NotificationProviderResponse {
        let result = self.deliver(message).await;
        into_response(self.channel(), self.provider(), result)
    }
}
