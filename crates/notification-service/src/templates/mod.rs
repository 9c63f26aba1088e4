//! 通知模板管理
//!
//! 模板按 (触发器, 渠道, 语言) 三元组精确查找，启动时注册，运行期只读。
//! 查找不做语言回退：缺少对应语言的模板时调用方收到 `None`，
//! 并把该渠道记为失败。

mod catalog;
mod render;

use std::collections::HashMap;

use parcel_shared::events::{Language, NotificationChannel, NotificationTrigger};

pub use render::{extract_variables, has_placeholders, missing_variables, render_template};

use crate::types::{ActionButton, NotificationTemplateData};

/// 通知模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub trigger: NotificationTrigger,
    pub channel: NotificationChannel,
    pub language: Language,
    /// 仅邮件模板使用
    pub subject: Option<String>,
    pub body: String,
    pub action: Option<ActionButton>,
}

/// 渲染后的模板内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub subject: Option<String>,
    pub body: String,
    pub action: Option<ActionButton>,
}

impl NotificationTemplate {
    pub fn new(
        trigger: NotificationTrigger,
        channel: NotificationChannel,
        language: Language,
        body: impl Into<String>,
    ) -> Self {
        Self {
            trigger,
            channel,
            language,
            subject: None,
            body: body.into(),
            action: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.action = Some(ActionButton {
            label: label.into(),
            url: url.into(),
        });
        self
    }

    /// 渲染主题、正文和操作按钮
    pub fn render(&self, data: &NotificationTemplateData) -> RenderedContent {
        RenderedContent {
            subject: self.subject.as_deref().map(|s| render_template(s, data)),
            body: render_template(&self.body, data),
            action: self.action.as_ref().map(|action| ActionButton {
                label: render_template(&action.label, data),
                url: render_template(&action.url, data),
            }),
        }
    }

    /// 模板各部分引用的字段
    pub fn variables(&self) -> Vec<String> {
        let mut variables = extract_variables(&self.body);
        if let Some(subject) = &self.subject {
            variables.extend(extract_variables(subject));
        }
        if let Some(action) = &self.action {
            variables.extend(extract_variables(&action.label));
            variables.extend(extract_variables(&action.url));
        }
        variables
    }
}

type TemplateKey = (NotificationTrigger, NotificationChannel, Language);

/// 模板存储
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<TemplateKey, NotificationTemplate>,
}

impl TemplateStore {
    /// 创建空的模板存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建带内置模板目录的存储
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        catalog::register_defaults(&mut store);
        store
    }

    /// 注册模板，同一三元组重复注册时覆盖
    pub fn register(&mut self, template: NotificationTemplate) {
        self.templates.insert(
            (template.trigger, template.channel, template.language),
            template,
        );
    }

    /// 精确查找模板
    pub fn get_template(
        &self,
        trigger: NotificationTrigger,
        channel: NotificationChannel,
        language: Language,
    ) -> Option<&NotificationTemplate> {
        self.templates.get(&(trigger, channel, language))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationTemplate> {
        self.templates.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_exact_lookup_without_fallback() {
        let mut store = TemplateStore::new();
        store.register(NotificationTemplate::new(
            NotificationTrigger::Delivered,
            NotificationChannel::Sms,
            Language::Fr,
            "Colis {{trackingNumber}} livré.",
        ));

        assert!(store
            .get_template(NotificationTrigger::Delivered, NotificationChannel::Sms, Language::Fr)
            .is_some());
        // 不回退到其它语言
        assert!(store
            .get_template(NotificationTrigger::Delivered, NotificationChannel::Sms, Language::En)
            .is_none());
        assert!(store
            .get_template(NotificationTrigger::Delivered, NotificationChannel::Email, Language::Fr)
            .is_none());
    }

    #[test]
    fn test_register_overrides_same_key() {
        let mut store = TemplateStore::new();
        let key = (NotificationTrigger::InTransit, NotificationChannel::Push, Language::En);
        store.register(NotificationTemplate::new(key.0, key.1, key.2, "v1"));
        store.register(NotificationTemplate::new(key.0, key.1, key.2, "v2"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_template(key.0, key.1, key.2).unwrap().body, "v2");
    }

    #[test]
    fn test_render_all_parts() {
        let template = NotificationTemplate::new(
            NotificationTrigger::DutyPaymentRequired,
            NotificationChannel::Email,
            Language::En,
            "Pay {{dutyAmount}} {{dutyCurrency}} for {{trackingNumber}}",
        )
        .with_subject("Customs duty for {{trackingNumber}}")
        .with_action("Pay {{dutyAmount}} {{dutyCurrency}}", "{{paymentUrl}}");

        let data: NotificationTemplateData = serde_json::from_value(json!({
            "dutyAmount": 45,
            "dutyCurrency": "EUR",
            "trackingNumber": "TR-99",
            "paymentUrl": "https://pay.example.com/TR-99"
        }))
        .unwrap();

        let rendered = template.render(&data);
        assert_eq!(rendered.subject.as_deref(), Some("Customs duty for TR-99"));
        assert_eq!(rendered.body, "Pay 45 EUR for TR-99");
        let action = rendered.action.unwrap();
        assert_eq!(action.label, "Pay 45 EUR");
        assert_eq!(action.url, "https://pay.example.com/TR-99");

        assert_eq!(template.variables().len(), 7);
    }
}
