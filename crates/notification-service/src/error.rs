//! 通知服务错误类型
//!
//! 只有 `Configuration` 与 `Scheduling` 会中断调用并返回给调用方；
//! 其余变体在渠道内部被转换为失败的发送结果，不会向上传播。

use parcel_shared::events::{Language, NotificationChannel, NotificationTrigger};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("触发器未注册配置: {trigger}")]
    Configuration { trigger: NotificationTrigger },

    #[error("通知模板未找到: 触发器={trigger}, 渠道={channel}, 语言={language}")]
    TemplateNotFound {
        trigger: NotificationTrigger,
        channel: NotificationChannel,
        language: Language,
    },

    #[error("服务商请求失败: 服务商={provider}, 原因={reason}")]
    Transport { provider: String, reason: String },

    #[error("收件地址为空: 渠道={channel}")]
    InvalidRecipient { channel: NotificationChannel },

    #[error("渠道未注册服务商: {channel}")]
    ProviderNotRegistered { channel: NotificationChannel },

    #[error("定时通知提交失败: {0}")]
    Scheduling(String),

    #[error(transparent)]
    Shared(#[from] parcel_shared::error::ParcelError),
}

impl NotificationError {
    /// 错误码，用于 API 响应
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            Self::Transport { .. } => "PROVIDER_TRANSPORT_ERROR",
            Self::InvalidRecipient { .. } => "INVALID_RECIPIENT",
            Self::ProviderNotRegistered { .. } => "PROVIDER_NOT_REGISTERED",
            Self::Scheduling(_) => "SCHEDULING_ERROR",
            Self::Shared(e) => e.code(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotificationError>;
