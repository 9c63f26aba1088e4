//! 通知类型定义
//!
//! 模板数据、用户偏好、服务商标识与发送结果等数据结构。
//! 线上格式统一使用 camelCase，与调用方的 JSON 约定保持一致。

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use parcel_shared::events::{Language, NotificationChannel, NotificationTrigger};

// ---------------------------------------------------------------------------
// NotificationTemplateData — 模板数据
// ---------------------------------------------------------------------------

/// 模板插值数据
///
/// 每次通知请求由调用方构造，本服务不持久化。
/// 未列出的字段会被收进 `extra`，同样可以在模板中通过 `{{fieldName}}` 引用。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duty_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duty_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customs_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    // 收件地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl NotificationTemplateData {
    /// 按模板占位符名称取值
    ///
    /// 数值字段使用 `Display` 渲染（45.0 → "45"），extra 中的 null 视为缺失。
    pub fn field(&self, name: &str) -> Option<String> {
        let known = match name {
            "userName" => self.user_name.clone(),
            "recipientName" => self.recipient_name.clone(),
            "trackingNumber" => self.tracking_number.clone(),
            "origin" => self.origin.clone(),
            "destination" => self.destination.clone(),
            "pickupDate" => self.pickup_date.clone(),
            "pickupTime" => self.pickup_time.clone(),
            "deliveryDate" => self.delivery_date.clone(),
            "estimatedDelivery" => self.estimated_delivery.clone(),
            "dutyAmount" => self.duty_amount.map(|v| v.to_string()),
            "dutyCurrency" => self.duty_currency.clone(),
            "paymentUrl" => self.payment_url.clone(),
            "trackingUrl" => self.tracking_url.clone(),
            "driverName" => self.driver_name.clone(),
            "driverPhone" => self.driver_phone.clone(),
            "delayReason" => self.delay_reason.clone(),
            "customsReason" => self.customs_reason.clone(),
            "failureReason" => self.failure_reason.clone(),
            "amount" => self.amount.map(|v| v.to_string()),
            "currency" => self.currency.clone(),
            "phone" => self.phone.clone(),
            "email" => self.email.clone(),
            "deviceToken" => self.device_token.clone(),
            _ => None,
        };

        known.or_else(|| self.extra.get(name).and_then(value_to_string))
    }

    /// 渠道对应的收件地址：SMS/WhatsApp 用手机号，邮件用邮箱，推送用设备令牌
    pub fn address_for(&self, channel: NotificationChannel) -> Option<&str> {
        match channel {
            NotificationChannel::Sms | NotificationChannel::WhatsApp => self.phone.as_deref(),
            NotificationChannel::Email => self.email.as_deref(),
            NotificationChannel::Push => self.device_token.as_deref(),
        }
    }
}

/// JSON 值转字符串：字符串去掉引号，数值等其它类型按 JSON 表示
fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// NotificationPreferences — 用户偏好
// ---------------------------------------------------------------------------

/// 用户通知偏好
///
/// 由外部用户资料服务持久化，本服务只读。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub channels: ChannelPreferences,
    /// 用户退订的触发器，对事务性触发器无效
    #[serde(default)]
    pub disabled_triggers: Vec<NotificationTrigger>,
    #[serde(default)]
    pub quiet_hours: Option<QuietHours>,
}

impl NotificationPreferences {
    pub fn is_channel_enabled(&self, channel: NotificationChannel) -> bool {
        self.channels.is_enabled(channel)
    }

    pub fn is_trigger_disabled(&self, trigger: NotificationTrigger) -> bool {
        self.disabled_triggers.contains(&trigger)
    }
}

fn enabled() -> bool {
    true
}

/// 渠道开关，缺省全部开启
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPreferences {
    #[serde(default = "enabled")]
    pub sms: bool,
    #[serde(default = "enabled")]
    pub email: bool,
    #[serde(default = "enabled")]
    pub push: bool,
    #[serde(default = "enabled")]
    pub whatsapp: bool,
}

impl Default for ChannelPreferences {
    fn default() -> Self {
        Self {
            sms: true,
            email: true,
            push: true,
            whatsapp: true,
        }
    }
}

impl ChannelPreferences {
    pub fn is_enabled(&self, channel: NotificationChannel) -> bool {
        match channel {
            NotificationChannel::Sms => self.sms,
            NotificationChannel::Email => self.email,
            NotificationChannel::Push => self.push,
            NotificationChannel::WhatsApp => self.whatsapp,
        }
    }

    pub fn set(&mut self, channel: NotificationChannel, value: bool) {
        match channel {
            NotificationChannel::Sms => self.sms = value,
            NotificationChannel::Email => self.email = value,
            NotificationChannel::Push => self.push = value,
            NotificationChannel::WhatsApp => self.whatsapp = value,
        }
    }
}

/// 免打扰时段，按用户本地时间 `HH:MM` 表示，允许跨越午夜
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    /// 用户时区相对 UTC 的偏移（分钟），取值范围 ±1439
    #[serde(default, deserialize_with = "utc_offset")]
    pub utc_offset_minutes: i32,
}

impl QuietHours {
    /// 本地时间是否落在区间 [start, end) 内；start == end 表示空区间
    pub fn contains(&self, local: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= local && local < self.end
        } else {
            local >= self.start || local < self.end
        }
    }

    pub fn contains_instant(&self, now: DateTime<Utc>) -> bool {
        let Some(offset) = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
        else {
            return false;
        };
        self.contains(now.with_timezone(&offset).time())
    }
}

/// UTC 偏移上限（分钟），不含整 24 小时
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60 - 1;

fn utc_offset<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let minutes = i32::deserialize(deserializer)?;
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(serde::de::Error::custom(format!(
            "utcOffsetMinutes 超出范围 ±{MAX_UTC_OFFSET_MINUTES}: {minutes}"
        )));
    }
    Ok(minutes)
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ProviderId / 发送结果
// ---------------------------------------------------------------------------

/// 外部服务商标识，渠道到服务商的映射固定不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Twilio,
    SendGrid,
    Firebase,
}

impl ProviderId {
    pub fn for_channel(channel: NotificationChannel) -> Self {
        match channel {
            NotificationChannel::Sms | NotificationChannel::WhatsApp => Self::Twilio,
            NotificationChannel::Email => Self::SendGrid,
            NotificationChannel::Push => Self::Firebase,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twilio => "twilio",
            Self::SendGrid => "sendgrid",
            Self::Firebase => "firebase",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次渠道发送结果
///
/// 每次尝试都生成新的结果，本服务不做自动重试。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationProviderResponse {
    pub success: bool,
    pub channel: NotificationChannel,
    pub provider: ProviderId,
    /// 服务商返回的消息标识，用于追踪投递状态
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationProviderResponse {
    pub fn delivered(
        channel: NotificationChannel,
        provider: ProviderId,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            channel,
            provider,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(
        channel: NotificationChannel,
        provider: ProviderId,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            channel,
            provider,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// 出站消息
// ---------------------------------------------------------------------------

/// 操作按钮，label 与 url 都可以包含占位符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub url: String,
}

/// 渲染完成、等待交给服务商的消息
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: Option<String>,
    pub body: String,
    pub action: Option<ActionButton>,
    pub trigger: NotificationTrigger,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_data_deserialize_with_extra() {
        let data: NotificationTemplateData = serde_json::from_value(json!({
            "dutyAmount": 45,
            "dutyCurrency": "EUR",
            "trackingNumber": "TR-99",
            "parcelWeight": 2.5,
            "relayPoint": "Casablanca Maarif",
            "note": null
        }))
        .unwrap();

        assert_eq!(data.field("dutyAmount").as_deref(), Some("45"));
        assert_eq!(data.field("dutyCurrency").as_deref(), Some("EUR"));
        assert_eq!(data.field("trackingNumber").as_deref(), Some("TR-99"));
        assert_eq!(data.field("parcelWeight").as_deref(), Some("2.5"));
        assert_eq!(data.field("relayPoint").as_deref(), Some("Casablanca Maarif"));
        assert_eq!(data.field("note"), None);
        assert_eq!(data.field("userName"), None);
    }

    #[test]
    fn test_address_for_channel() {
        let data = NotificationTemplateData {
            phone: Some("+212600000001".to_string()),
            email: Some("amina@example.com".to_string()),
            device_token: Some("fcm-token-1".to_string()),
            ..Default::default()
        };

        assert_eq!(data.address_for(NotificationChannel::Sms), Some("+212600000001"));
        assert_eq!(
            data.address_for(NotificationChannel::WhatsApp),
            Some("+212600000001")
        );
        assert_eq!(
            data.address_for(NotificationChannel::Email),
            Some("amina@example.com")
        );
        assert_eq!(data.address_for(NotificationChannel::Push), Some("fcm-token-1"));
    }

    #[test]
    fn test_preferences_defaults() {
        let prefs: NotificationPreferences = serde_json::from_value(json!({
            "language": "fr",
            "channels": { "sms": false },
            "disabledTriggers": ["DELAY_ALERT"]
        }))
        .unwrap();

        assert_eq!(prefs.language, Some(Language::Fr));
        assert!(!prefs.is_channel_enabled(NotificationChannel::Sms));
        assert!(prefs.is_channel_enabled(NotificationChannel::Email));
        assert!(prefs.is_channel_enabled(NotificationChannel::WhatsApp));
        assert!(prefs.is_trigger_disabled(NotificationTrigger::DelayAlert));
        assert!(!prefs.is_trigger_disabled(NotificationTrigger::Delivered));
        assert!(prefs.quiet_hours.is_none());
    }

    #[test]
    fn test_quiet_hours_wrapping_midnight() {
        let quiet: QuietHours = serde_json::from_value(json!({
            "start": "22:00",
            "end": "07:30"
        }))
        .unwrap();

        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert!(quiet.contains(at(23, 15)));
        assert!(quiet.contains(at(2, 0)));
        assert!(!quiet.contains(at(7, 30)));
        assert!(!quiet.contains(at(12, 0)));
    }

    #[test]
    fn test_quiet_hours_same_day_window_and_offset() {
        let quiet = QuietHours {
            start: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            utc_offset_minutes: 60,
        };

        // 12:30 UTC = 13:30 本地
        let now = DateTime::parse_from_rfc3339("2026-03-01T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(quiet.contains_instant(now));

        let later = DateTime::parse_from_rfc3339("2026-03-01T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(!quiet.contains_instant(later));
    }

    #[test]
    fn test_quiet_hours_rejects_out_of_range_offset() {
        for minutes in [i32::MAX, i32::MIN, 1440, -1440] {
            let result: Result<QuietHours, _> = serde_json::from_value(json!({
                "start": "22:00",
                "end": "07:00",
                "utcOffsetMinutes": minutes
            }));
            assert!(result.is_err(), "offset {minutes} should be rejected");
        }

        let edge: QuietHours = serde_json::from_value(json!({
            "start": "22:00",
            "end": "07:00",
            "utcOffsetMinutes": -1439
        }))
        .unwrap();
        assert_eq!(edge.utc_offset_minutes, -1439);
    }

    #[test]
    fn test_quiet_hours_extreme_offset_is_ignored() {
        let quiet = QuietHours {
            start: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            utc_offset_minutes: i32::MAX,
        };
        assert!(!quiet.contains_instant(Utc::now()));
    }

    #[test]
    fn test_quiet_hours_serialize_format() {
        let quiet = QuietHours {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            utc_offset_minutes: 0,
        };
        let value = serde_json::to_value(&quiet).unwrap();
        assert_eq!(value["start"], "22:00");
        assert_eq!(value["end"], "07:00");
    }

    #[test]
    fn test_provider_mapping_is_fixed() {
        assert_eq!(ProviderId::for_channel(NotificationChannel::Sms), ProviderId::Twilio);
        assert_eq!(
            ProviderId::for_channel(NotificationChannel::WhatsApp),
            ProviderId::Twilio
        );
        assert_eq!(
            ProviderId::for_channel(NotificationChannel::Email),
            ProviderId::SendGrid
        );
        assert_eq!(
            ProviderId::for_channel(NotificationChannel::Push),
            ProviderId::Firebase
        );
    }

    #[test]
    fn test_response_serialization() {
        let ok = NotificationProviderResponse::delivered(
            NotificationChannel::Sms,
            ProviderId::Twilio,
            "SM123",
        );
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["messageId"], "SM123");
        assert_eq!(value["provider"], "twilio");
        assert!(value.get("error").is_none());

        let failed = NotificationProviderResponse::failed(
            NotificationChannel::Email,
            ProviderId::SendGrid,
            "HTTP 500",
        );
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("HTTP 500"));
    }
}
