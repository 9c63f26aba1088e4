//! 内置模板目录
//!
//! 英语、法语覆盖所有触发器的全部配置渠道；阿拉伯语目前只覆盖 SMS 与 WhatsApp。

use parcel_shared::events::Language::{self, Ar, En, Fr};
use parcel_shared::events::NotificationChannel::{Email, Push, Sms, WhatsApp};
use parcel_shared::events::{NotificationChannel, NotificationTrigger as T};

use super::{NotificationTemplate, TemplateStore};

fn text(
    trigger: T,
    channel: NotificationChannel,
    language: Language,
    body: &str,
) -> NotificationTemplate {
    NotificationTemplate::new(trigger, channel, language, body)
}

fn mail(trigger: T, language: Language, subject: &str, body: &str) -> NotificationTemplate {
    NotificationTemplate::new(trigger, Email, language, body).with_subject(subject)
}

#[rustfmt::skip]
pub(super) fn register_defaults(store: &mut TemplateStore) {
    let templates = [
        // ==================== BOOKING_CONFIRMED ====================
        text(T::BookingConfirmed, Sms, En,
            "Booking confirmed! Parcel {{trackingNumber}} from {{origin}} to {{destination}}. Pickup on {{pickupDate}}. Track: {{trackingUrl}}"),
        text(T::BookingConfirmed, Sms, Fr,
            "Réservation confirmée ! Colis {{trackingNumber}} de {{origin}} vers {{destination}}. Enlèvement le {{pickupDate}}. Suivi : {{trackingUrl}}"),
        text(T::BookingConfirmed, Sms, Ar,
            "تم تأكيد الحجز! الطرد {{trackingNumber}} من {{origin}} إلى {{destination}}. الاستلام يوم {{pickupDate}}. التتبع: {{trackingUrl}}"),
        mail(T::BookingConfirmed, En,
            "Your booking {{trackingNumber}} is confirmed",
            "Hello {{userName}},\n\nYour parcel {{trackingNumber}} from {{origin}} to {{destination}} is booked. Our driver will collect it on {{pickupDate}}.\n\nThank you for shipping with us.")
            .with_action("Track my parcel", "{{trackingUrl}}"),
        mail(T::BookingConfirmed, Fr,
            "Votre réservation {{trackingNumber}} est confirmée",
            "Bonjour {{userName}},\n\nVotre colis {{trackingNumber}} de {{origin}} vers {{destination}} est réservé. Notre chauffeur passera le récupérer le {{pickupDate}}.\n\nMerci de votre confiance.")
            .with_action("Suivre mon colis", "{{trackingUrl}}"),

        // ==================== PICKUP_SCHEDULED ====================
        text(T::PickupScheduled, Sms, En,
            "Pickup for {{trackingNumber}} scheduled on {{pickupDate}} at {{pickupTime}}. Driver: {{driverName}} ({{driverPhone}})."),
        text(T::PickupScheduled, Sms, Fr,
            "Enlèvement de {{trackingNumber}} prévu le {{pickupDate}} à {{pickupTime}}. Chauffeur : {{driverName}} ({{driverPhone}})."),
        text(T::PickupScheduled, Sms, Ar,
            "موعد استلام الطرد {{trackingNumber}} يوم {{pickupDate}} على الساعة {{pickupTime}}. السائق: {{driverName}} ({{driverPhone}})."),
        text(T::PickupScheduled, Push, En,
            "Pickup scheduled: {{pickupDate}} at {{pickupTime}} for parcel {{trackingNumber}}.")
            .with_action("View details", "{{trackingUrl}}"),
        text(T::PickupScheduled, Push, Fr,
            "Enlèvement prévu : {{pickupDate}} à {{pickupTime}} pour le colis {{trackingNumber}}.")
            .with_action("Voir le détail", "{{trackingUrl}}"),

        // ==================== PARCEL_PICKED_UP ====================
        text(T::ParcelPickedUp, Push, En,
            "Your parcel {{trackingNumber}} has been picked up and is heading to {{destination}}.")
            .with_action("Track", "{{trackingUrl}}"),
        text(T::ParcelPickedUp, Push, Fr,
            "Votre colis {{trackingNumber}} a été récupéré et part vers {{destination}}.")
            .with_action("Suivre", "{{trackingUrl}}"),
        mail(T::ParcelPickedUp, En,
            "Parcel {{trackingNumber}} picked up",
            "Hello {{userName}},\n\n{{driverName}} picked up your parcel {{trackingNumber}}. It is now on its way from {{origin}} to {{destination}}."),
        mail(T::ParcelPickedUp, Fr,
            "Colis {{trackingNumber}} récupéré",
            "Bonjour {{userName}},\n\n{{driverName}} a récupéré votre colis {{trackingNumber}}. Il est en route de {{origin}} vers {{destination}}."),

        // ==================== IN_TRANSIT ====================
        text(T::InTransit, Push, En,
            "Parcel {{trackingNumber}} is in transit. Estimated delivery: {{estimatedDelivery}}.")
            .with_action("Track", "{{trackingUrl}}"),
        text(T::InTransit, Push, Fr,
            "Le colis {{trackingNumber}} est en transit. Livraison estimée : {{estimatedDelivery}}.")
            .with_action("Suivre", "{{trackingUrl}}"),

        // ==================== CUSTOMS_HOLD ====================
        text(T::CustomsHold, Sms, En,
            "Parcel {{trackingNumber}} is held at customs: {{customsReason}}. Details: {{trackingUrl}}"),
        text(T::CustomsHold, Sms, Fr,
            "Le colis {{trackingNumber}} est retenu en douane : {{customsReason}}. Détails : {{trackingUrl}}"),
        text(T::CustomsHold, Sms, Ar,
            "الطرد {{trackingNumber}} محتجز لدى الجمارك: {{customsReason}}. التفاصيل: {{trackingUrl}}"),
        mail(T::CustomsHold, En,
            "Action needed: parcel {{trackingNumber}} held at customs",
            "Hello {{userName}},\n\nCustoms is holding your parcel {{trackingNumber}} ({{origin}} → {{destination}}).\nReason: {{customsReason}}\n\nPlease review the details so we can release it quickly.")
            .with_action("Review customs details", "{{trackingUrl}}"),
        mail(T::CustomsHold, Fr,
            "Action requise : colis {{trackingNumber}} retenu en douane",
            "Bonjour {{userName}},\n\nLa douane retient votre colis {{trackingNumber}} ({{origin}} → {{destination}}).\nMotif : {{customsReason}}\n\nMerci de vérifier les informations afin que nous puissions le libérer rapidement.")
            .with_action("Voir les détails douaniers", "{{trackingUrl}}"),
        text(T::CustomsHold, Push, En,
            "Customs hold on {{trackingNumber}}: {{customsReason}}")
            .with_action("Review", "{{trackingUrl}}"),
        text(T::CustomsHold, Push, Fr,
            "Colis {{trackingNumber}} retenu en douane : {{customsReason}}")
            .with_action("Vérifier", "{{trackingUrl}}"),

        // ==================== DUTY_PAYMENT_REQUIRED ====================
        text(T::DutyPaymentRequired, Sms, En,
            "Customs duty of {{dutyAmount}} {{dutyCurrency}} is due for {{trackingNumber}}. Pay here: {{paymentUrl}}"),
        text(T::DutyPaymentRequired, Sms, Fr,
            "Des droits de douane de {{dutyAmount}} {{dutyCurrency}} sont dus pour {{trackingNumber}}. Payer ici : {{paymentUrl}}"),
        text(T::DutyPaymentRequired, Sms, Ar,
            "يجب أداء رسوم جمركية بقيمة {{dutyAmount}} {{dutyCurrency}} للطرد {{trackingNumber}}. الأداء هنا: {{paymentUrl}}"),
        mail(T::DutyPaymentRequired, En,
            "Customs duty due for {{trackingNumber}}",
            "Hello {{userName}},\n\nYour parcel {{trackingNumber}} requires a customs duty payment of {{dutyAmount}} {{dutyCurrency}} before it can be delivered to {{destination}}.")
            .with_action("Pay {{dutyAmount}} {{dutyCurrency}}", "{{paymentUrl}}"),
        mail(T::DutyPaymentRequired, Fr,
            "Droits de douane à régler pour {{trackingNumber}}",
            "Bonjour {{userName}},\n\nVotre colis {{trackingNumber}} nécessite le paiement de droits de douane de {{dutyAmount}} {{dutyCurrency}} avant sa livraison à {{destination}}.")
            .with_action("Payer {{dutyAmount}} {{dutyCurrency}}", "{{paymentUrl}}"),
        text(T::DutyPaymentRequired, WhatsApp, En,
            "Hi {{userName}}, customs duty of {{dutyAmount}} {{dutyCurrency}} is due for parcel {{trackingNumber}}. Pay securely: {{paymentUrl}}"),
        text(T::DutyPaymentRequired, WhatsApp, Fr,
            "Bonjour {{userName}}, des droits de douane de {{dutyAmount}} {{dutyCurrency}} sont dus pour le colis {{trackingNumber}}. Paiement sécurisé : {{paymentUrl}}"),
        text(T::DutyPaymentRequired, WhatsApp, Ar,
            "مرحبا {{userName}}، يجب أداء رسوم جمركية بقيمة {{dutyAmount}} {{dutyCurrency}} للطرد {{trackingNumber}}. الأداء الآمن: {{paymentUrl}}"),

        // ==================== DUTY_PAYMENT_RECEIVED ====================
        mail(T::DutyPaymentReceived, En,
            "Duty payment received for {{trackingNumber}}",
            "Hello {{userName}},\n\nWe received your customs duty payment of {{dutyAmount}} {{dutyCurrency}}. Parcel {{trackingNumber}} is being released for delivery.")
            .with_action("Track my parcel", "{{trackingUrl}}"),
        mail(T::DutyPaymentReceived, Fr,
            "Paiement des droits reçu pour {{trackingNumber}}",
            "Bonjour {{userName}},\n\nNous avons bien reçu votre paiement de {{dutyAmount}} {{dutyCurrency}}. Le colis {{trackingNumber}} est en cours de libération pour livraison.")
            .with_action("Suivre mon colis", "{{trackingUrl}}"),

        // ==================== OUT_FOR_DELIVERY ====================
        text(T::OutForDelivery, Sms, En,
            "Parcel {{trackingNumber}} is out for delivery today with {{driverName}} ({{driverPhone}})."),
        text(T::OutForDelivery, Sms, Fr,
            "Le colis {{trackingNumber}} est en cours de livraison aujourd'hui avec {{driverName}} ({{driverPhone}})."),
        text(T::OutForDelivery, Sms, Ar,
            "الطرد {{trackingNumber}} في طريقه إليك اليوم مع {{driverName}} ({{driverPhone}})."),
        text(T::OutForDelivery, Push, En,
            "Out for delivery: {{trackingNumber}} arrives today.")
            .with_action("Track live", "{{trackingUrl}}"),
        text(T::OutForDelivery, Push, Fr,
            "En cours de livraison : {{trackingNumber}} arrive aujourd'hui.")
            .with_action("Suivre en direct", "{{trackingUrl}}"),
        text(T::OutForDelivery, WhatsApp, En,
            "Hi {{recipientName}}, {{driverName}} is delivering parcel {{trackingNumber}} today. Call {{driverPhone}} if needed."),
        text(T::OutForDelivery, WhatsApp, Fr,
            "Bonjour {{recipientName}}, {{driverName}} livre le colis {{trackingNumber}} aujourd'hui. Appelez le {{driverPhone}} si besoin."),
        text(T::OutForDelivery, WhatsApp, Ar,
            "مرحبا {{recipientName}}، {{driverName}} سيسلم الطرد {{trackingNumber}} اليوم. اتصل بالرقم {{driverPhone}} عند الحاجة."),

        // ==================== DELIVERED ====================
        text(T::Delivered, Sms, En,
            "Parcel {{trackingNumber}} was delivered on {{deliveryDate}}. Thank you!"),
        text(T::Delivered, Sms, Fr,
            "Le colis {{trackingNumber}} a été livré le {{deliveryDate}}. Merci !"),
        text(T::Delivered, Sms, Ar,
            "تم تسليم الطرد {{trackingNumber}} يوم {{deliveryDate}}. شكرا لكم!"),
        mail(T::Delivered, En,
            "Parcel {{trackingNumber}} delivered",
            "Hello {{userName}},\n\nYour parcel {{trackingNumber}} was delivered to {{recipientName}} in {{destination}} on {{deliveryDate}}.\n\nThank you for shipping with us."),
        mail(T::Delivered, Fr,
            "Colis {{trackingNumber}} livré",
            "Bonjour {{userName}},\n\nVotre colis {{trackingNumber}} a été remis à {{recipientName}} à {{destination}} le {{deliveryDate}}.\n\nMerci de votre confiance."),
        text(T::Delivered, Push, En,
            "Delivered! {{trackingNumber}} reached {{destination}}."),
        text(T::Delivered, Push, Fr,
            "Livré ! {{trackingNumber}} est arrivé à {{destination}}."),

        // ==================== DELAY_ALERT ====================
        text(T::DelayAlert, Sms, En,
            "Delay on {{trackingNumber}}: {{delayReason}}. New estimate: {{estimatedDelivery}}."),
        text(T::DelayAlert, Sms, Fr,
            "Retard sur {{trackingNumber}} : {{delayReason}}. Nouvelle estimation : {{estimatedDelivery}}."),
        text(T::DelayAlert, Sms, Ar,
            "تأخير في الطرد {{trackingNumber}}: {{delayReason}}. الموعد الجديد: {{estimatedDelivery}}."),
        mail(T::DelayAlert, En,
            "Your parcel {{trackingNumber}} is delayed",
            "Hello {{userName}},\n\nWe're sorry: parcel {{trackingNumber}} is delayed ({{delayReason}}). The new estimated delivery is {{estimatedDelivery}}.")
            .with_action("Track my parcel", "{{trackingUrl}}"),
        mail(T::DelayAlert, Fr,
            "Votre colis {{trackingNumber}} est retardé",
            "Bonjour {{userName}},\n\nNous sommes désolés : le colis {{trackingNumber}} est retardé ({{delayReason}}). La nouvelle date estimée est le {{estimatedDelivery}}.")
            .with_action("Suivre mon colis", "{{trackingUrl}}"),
        text(T::DelayAlert, Push, En,
            "{{trackingNumber}} delayed: {{delayReason}}. New ETA {{estimatedDelivery}}."),
        text(T::DelayAlert, Push, Fr,
            "{{trackingNumber}} retardé : {{delayReason}}. Nouvelle estimation {{estimatedDelivery}}."),

        // ==================== DELIVERY_FAILED ====================
        text(T::DeliveryFailed, Sms, En,
            "Delivery attempt for {{trackingNumber}} failed: {{failureReason}}. Reschedule: {{trackingUrl}}"),
        text(T::DeliveryFailed, Sms, Fr,
            "Échec de livraison pour {{trackingNumber}} : {{failureReason}}. Reprogrammer : {{trackingUrl}}"),
        text(T::DeliveryFailed, Sms, Ar,
            "فشلت محاولة تسليم الطرد {{trackingNumber}}: {{failureReason}}. إعادة الجدولة: {{trackingUrl}}"),
        mail(T::DeliveryFailed, En,
            "Delivery failed for {{trackingNumber}}",
            "Hello {{userName}},\n\nWe could not deliver parcel {{trackingNumber}} to {{recipientName}}.\nReason: {{failureReason}}\n\nPlease choose a new delivery slot.")
            .with_action("Reschedule delivery", "{{trackingUrl}}"),
        mail(T::DeliveryFailed, Fr,
            "Échec de livraison pour {{trackingNumber}}",
            "Bonjour {{userName}},\n\nNous n'avons pas pu livrer le colis {{trackingNumber}} à {{recipientName}}.\nMotif : {{failureReason}}\n\nMerci de choisir un nouveau créneau de livraison.")
            .with_action("Reprogrammer la livraison", "{{trackingUrl}}"),
        text(T::DeliveryFailed, WhatsApp, En,
            "Hi {{recipientName}}, we missed you for parcel {{trackingNumber}} ({{failureReason}}). Pick a new slot: {{trackingUrl}}"),
        text(T::DeliveryFailed, WhatsApp, Fr,
            "Bonjour {{recipientName}}, nous vous avons manqué pour le colis {{trackingNumber}} ({{failureReason}}). Choisissez un nouveau créneau : {{trackingUrl}}"),
        text(T::DeliveryFailed, WhatsApp, Ar,
            "مرحبا {{recipientName}}، لم نتمكن من تسليم الطرد {{trackingNumber}} ({{failureReason}}). اختر موعدا جديدا: {{trackingUrl}}"),

        // ==================== PAYMENT_FAILED ====================
        mail(T::PaymentFailed, En,
            "Payment failed for booking {{trackingNumber}}",
            "Hello {{userName}},\n\nYour payment of {{amount}} {{currency}} for booking {{trackingNumber}} could not be processed. Please update your payment method to keep your pickup slot.")
            .with_action("Retry payment", "{{paymentUrl}}"),
        mail(T::PaymentFailed, Fr,
            "Échec du paiement pour la réservation {{trackingNumber}}",
            "Bonjour {{userName}},\n\nVotre paiement de {{amount}} {{currency}} pour la réservation {{trackingNumber}} n'a pas abouti. Merci de mettre à jour votre moyen de paiement pour conserver votre créneau d'enlèvement.")
            .with_action("Réessayer le paiement", "{{paymentUrl}}"),
        text(T::PaymentFailed, Sms, En,
            "Payment of {{amount}} {{currency}} for {{trackingNumber}} failed. Retry: {{paymentUrl}}"),
        text(T::PaymentFailed, Sms, Fr,
            "Le paiement de {{amount}} {{currency}} pour {{trackingNumber}} a échoué. Réessayer : {{paymentUrl}}"),
        text(T::PaymentFailed, Sms, Ar,
            "فشل أداء مبلغ {{amount}} {{currency}} للحجز {{trackingNumber}}. أعد المحاولة: {{paymentUrl}}"),
    ];

    for template in templates {
        store.register(template);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{has_placeholders, missing_variables};
    use crate::triggers::TriggerRegistry;
    use crate::types::NotificationTemplateData;
    use serde_json::json;

    /// 目录允许引用的字段
    const KNOWN_FIELDS: &[&str] = &[
        "userName",
        "recipientName",
        "trackingNumber",
        "origin",
        "destination",
        "pickupDate",
        "pickupTime",
        "deliveryDate",
        "estimatedDelivery",
        "dutyAmount",
        "dutyCurrency",
        "paymentUrl",
        "trackingUrl",
        "driverName",
        "driverPhone",
        "delayReason",
        "customsReason",
        "failureReason",
        "amount",
        "currency",
    ];

    fn full_data() -> NotificationTemplateData {
        serde_json::from_value(json!({
            "userName": "Karim",
            "recipientName": "Fatima",
            "trackingNumber": "TR-2026-0001",
            "origin": "Brussels",
            "destination": "Tangier",
            "pickupDate": "2026-05-02",
            "pickupTime": "10:30",
            "deliveryDate": "2026-05-06",
            "estimatedDelivery": "2026-05-07",
            "dutyAmount": 45,
            "dutyCurrency": "EUR",
            "paymentUrl": "https://pay.example.com/TR-2026-0001",
            "trackingUrl": "https://track.example.com/TR-2026-0001",
            "driverName": "Hamza",
            "driverPhone": "+32470000000",
            "delayReason": "ferry cancelled",
            "customsReason": "missing invoice",
            "failureReason": "nobody home",
            "amount": 89.9,
            "currency": "EUR"
        }))
        .unwrap()
    }

    #[test]
    fn test_every_configured_pair_has_en_and_fr() {
        let store = TemplateStore::with_defaults();
        let registry = TriggerRegistry::with_defaults();

        for trigger in registry.triggers() {
            let config = registry.get_trigger_config(trigger).unwrap();
            for channel in &config.channels {
                for language in [En, Fr] {
                    assert!(
                        store.get_template(trigger, *channel, language).is_some(),
                        "缺少模板: {trigger}/{channel}/{language}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_templates_only_for_configured_channels() {
        let store = TemplateStore::with_defaults();
        let registry = TriggerRegistry::with_defaults();

        for template in store.iter() {
            let config = registry.get_trigger_config(template.trigger).unwrap();
            assert!(
                config.channels.contains(&template.channel),
                "{}/{} 不在触发器渠道配置中",
                template.trigger,
                template.channel
            );
        }
    }

    #[test]
    fn test_arabic_only_for_phone_channels() {
        let store = TemplateStore::with_defaults();
        for template in store.iter().filter(|t| t.language == Ar) {
            assert!(matches!(template.channel, Sms | WhatsApp));
        }
        assert!(store
            .get_template(T::DutyPaymentRequired, WhatsApp, Ar)
            .is_some());
        assert!(store.get_template(T::DutyPaymentRequired, Email, Ar).is_none());
    }

    #[test]
    fn test_subject_only_on_email() {
        let store = TemplateStore::with_defaults();
        for template in store.iter() {
            assert_eq!(
                template.subject.is_some(),
                template.channel == Email,
                "{}/{}/{}",
                template.trigger,
                template.channel,
                template.language
            );
        }
    }

    #[test]
    fn test_all_placeholders_are_known_fields() {
        let store = TemplateStore::with_defaults();
        for template in store.iter() {
            for variable in template.variables() {
                assert!(
                    KNOWN_FIELDS.contains(&variable.as_str()),
                    "未知字段 {variable} 出现在 {}/{}/{}",
                    template.trigger,
                    template.channel,
                    template.language
                );
            }
        }
    }

    #[test]
    fn test_full_data_renders_without_leftover_tokens() {
        let store = TemplateStore::with_defaults();
        let data = full_data();

        for template in store.iter() {
            assert!(missing_variables(&template.body, &data).is_empty());

            let rendered = template.render(&data);
            assert!(!has_placeholders(&rendered.body));
            if let Some(subject) = &rendered.subject {
                assert!(!has_placeholders(subject));
            }
            if let Some(action) = &rendered.action {
                assert!(!has_placeholders(&action.label));
                assert!(!has_placeholders(&action.url));
            }
        }
    }

    #[test]
    fn test_duty_sms_renders_amount() {
        let store = TemplateStore::with_defaults();
        let template = store.get_template(T::DutyPaymentRequired, Sms, En).unwrap();

        let rendered = template.render(&full_data());
        assert_eq!(
            rendered.body,
            "Customs duty of 45 EUR is due for TR-2026-0001. Pay here: https://pay.example.com/TR-2026-0001"
        );
    }
}
