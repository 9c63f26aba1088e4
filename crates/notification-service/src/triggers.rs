//! 触发器配置注册表
//!
//! 静态映射：触发器 → 必需渠道、优先级、是否事务性。
//! 启动时构建一次，之后只读，可在任意并发上下文中无锁读取。

use std::collections::HashMap;

use parcel_shared::events::{NotificationChannel, NotificationTrigger, Priority};

use crate::error::{NotificationError, Result};

/// 单个触发器的投递配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    pub trigger: NotificationTrigger,
    /// 有序的必需渠道
    pub channels: Vec<NotificationChannel>,
    pub priority: Priority,
    /// 事务性通知不可被用户按触发器退订
    pub transactional: bool,
}

impl TriggerConfig {
    pub fn new(
        trigger: NotificationTrigger,
        channels: &[NotificationChannel],
        priority: Priority,
        transactional: bool,
    ) -> Self {
        Self {
            trigger,
            channels: channels.to_vec(),
            priority,
            transactional,
        }
    }
}

use NotificationChannel::{Email, Push, Sms, WhatsApp};
use NotificationTrigger as T;

/// 默认触发器表
const DEFAULT_TRIGGERS: &[(NotificationTrigger, &[NotificationChannel], Priority, bool)] = &[
    (T::BookingConfirmed, &[Sms, Email], Priority::High, true),
    (T::PickupScheduled, &[Sms, Push], Priority::Medium, false),
    (T::ParcelPickedUp, &[Push, Email], Priority::Medium, false),
    (T::InTransit, &[Push], Priority::Low, false),
    (T::CustomsHold, &[Sms, Email, Push], Priority::Critical, true),
    (T::DutyPaymentRequired, &[Sms, Email, WhatsApp], Priority::Critical, true),
    (T::DutyPaymentReceived, &[Email], Priority::Medium, true),
    (T::OutForDelivery, &[Sms, Push, WhatsApp], Priority::High, false),
    (T::Delivered, &[Sms, Email, Push], Priority::High, true),
    (T::DelayAlert, &[Sms, Email, Push], Priority::High, false),
    (T::DeliveryFailed, &[Sms, Email, WhatsApp], Priority::Critical, true),
    (T::PaymentFailed, &[Email, Sms], Priority::Critical, true),
];

/// 触发器配置注册表
#[derive(Debug, Clone)]
pub struct TriggerRegistry {
    configs: HashMap<NotificationTrigger, TriggerConfig>,
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TriggerRegistry {
    /// 使用内置触发器表创建
    pub fn with_defaults() -> Self {
        Self::from_configs(
            DEFAULT_TRIGGERS
                .iter()
                .map(|(trigger, channels, priority, transactional)| {
                    TriggerConfig::new(*trigger, channels, *priority, *transactional)
                }),
        )
    }

    /// 从任意配置集合创建，同一触发器后出现的覆盖先出现的
    pub fn from_configs(configs: impl IntoIterator<Item = TriggerConfig>) -> Self {
        Self {
            configs: configs.into_iter().map(|c| (c.trigger, c)).collect(),
        }
    }

    /// 查询触发器配置
    ///
    /// 枚举是封闭的，正常情况下不会缺失；缺失说明注册表构建有误。
    pub fn get_trigger_config(&self, trigger: NotificationTrigger) -> Result<&TriggerConfig> {
        self.configs
            .get(&trigger)
            .ok_or(NotificationError::Configuration { trigger })
    }

    pub fn is_transactional(&self, trigger: NotificationTrigger) -> Result<bool> {
        Ok(self.get_trigger_config(trigger)?.transactional)
    }

    /// 已注册的触发器
    pub fn triggers(&self) -> impl Iterator<Item = NotificationTrigger> + '_ {
        self.configs.keys().copied()
    }
}
