//! 通知领域模型
//!
//! 定义通知触发器、投递渠道、优先级和语言等跨服务共享的枚举。
//! 这些类型在编译期固定，序列化格式与上游业务系统约定一致。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParcelError;

// ---------------------------------------------------------------------------
// NotificationTrigger — 通知触发器
// ---------------------------------------------------------------------------

/// 通知触发器
///
/// 每个业务事件实例恰好触发一个触发器。按包裹生命周期排列：
/// 下单 → 揽收 → 运输 → 清关 → 派送。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationTrigger {
    // 下单与揽收
    BookingConfirmed,
    PickupScheduled,
    ParcelPickedUp,

    // 运输与清关
    InTransit,
    CustomsHold,
    DutyPaymentRequired,
    DutyPaymentReceived,

    // 派送
    OutForDelivery,
    Delivered,
    DelayAlert,
    DeliveryFailed,

    // 支付
    PaymentFailed,
}

impl NotificationTrigger {
    pub const ALL: [NotificationTrigger; 12] = [
        Self::BookingConfirmed,
        Self::PickupScheduled,
        Self::ParcelPickedUp,
        Self::InTransit,
        Self::CustomsHold,
        Self::DutyPaymentRequired,
        Self::DutyPaymentReceived,
        Self::OutForDelivery,
        Self::Delivered,
        Self::DelayAlert,
        Self::DeliveryFailed,
        Self::PaymentFailed,
    ];

    /// 线上格式的名称，用于日志字段和指标标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingConfirmed => "BOOKING_CONFIRMED",
            Self::PickupScheduled => "PICKUP_SCHEDULED",
            Self::ParcelPickedUp => "PARCEL_PICKED_UP",
            Self::InTransit => "IN_TRANSIT",
            Self::CustomsHold => "CUSTOMS_HOLD",
            Self::DutyPaymentRequired => "DUTY_PAYMENT_REQUIRED",
            Self::DutyPaymentReceived => "DUTY_PAYMENT_RECEIVED",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::DelayAlert => "DELAY_ALERT",
            Self::DeliveryFailed => "DELIVERY_FAILED",
            Self::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl fmt::Display for NotificationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NotificationChannel — 投递渠道
// ---------------------------------------------------------------------------

/// 通知投递渠道
///
/// 各渠道的寻址方式不同：SMS/WhatsApp 使用手机号，邮件使用邮箱，
/// 推送使用设备令牌。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    Sms,
    Email,
    Push,
    #[serde(rename = "WHATSAPP")]
    WhatsApp,
}

impl NotificationChannel {
    pub const ALL: [NotificationChannel; 4] =
        [Self::Sms, Self::Email, Self::Push, Self::WhatsApp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "SMS",
            Self::Email => "EMAIL",
            Self::Push => "PUSH",
            Self::WhatsApp => "WHATSAPP",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority — 优先级
// ---------------------------------------------------------------------------

/// 通知优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

// ---------------------------------------------------------------------------
// Language — 模板语言
// ---------------------------------------------------------------------------

/// 模板语言，线上使用 ISO 639-1 代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ParcelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            "ar" => Ok(Self::Ar),
            other => Err(ParcelError::Validation(format!("不支持的语言: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_serde_format() {
        let json = serde_json::to_string(&NotificationTrigger::DutyPaymentRequired).unwrap();
        assert_eq!(json, "\"DUTY_PAYMENT_REQUIRED\"");

        let parsed: NotificationTrigger = serde_json::from_str("\"CUSTOMS_HOLD\"").unwrap();
        assert_eq!(parsed, NotificationTrigger::CustomsHold);
    }

    #[test]
    fn test_trigger_display_matches_wire_name() {
        for trigger in NotificationTrigger::ALL {
            let json = serde_json::to_string(&trigger).unwrap();
            assert_eq!(json.trim_matches('"'), trigger.to_string());
        }
    }

    #[test]
    fn test_channel_serde_format() {
        let json = serde_json::to_string(&NotificationChannel::WhatsApp).unwrap();
        assert_eq!(json, "\"WHATSAPP\"");

        for channel in NotificationChannel::ALL {
            let json = serde_json::to_string(&channel).unwrap();
            assert_eq!(json.trim_matches('"'), channel.as_str());
        }
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!(" AR ".parse::<Language>().unwrap(), Language::Ar);
        assert!("nl".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::En);
    }
}
