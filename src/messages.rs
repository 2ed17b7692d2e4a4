//! User-facing texts. Raw errors never end up here.

use crate::{error::GateError, models::Amount};

pub const DEFAULT_NAME: &str = "Друг";
pub const GO_TO_CHANNEL: &str = "Перейти в канал";
pub const PAYMENT_LINK_PROMPT: &str = "Перейдите по ссылке для оплаты:";
pub const PAYMENT_SUCCEEDED: &str = "Оплата прошла успешно! Вы получили доступ к каналу.";
pub const PAYMENT_RECEIVED: &str =
    "Оплата получена! Ссылка на канал придёт в ближайшие минуты.";
pub const GRANT_FAILED: &str =
    "Произошла ошибка при добавлении вас в канал. Пожалуйста, свяжитесь с поддержкой.";

pub const TRY_LATER: &str = "Произошла ошибка. Попробуйте позже.";
pub const PAYMENT_FAILED: &str = "Произошла ошибка при создании платежа. Попробуйте позже.";
pub const PAYMENT_CANCELED: &str = "Оплата отменена. Попробуйте снова.";
pub const PAYMENT_UNKNOWN: &str = "Результат обработки платежа неизвестен. \
     Пожалуйста, не оплачивайте повторно и попробуйте позже.";

const WELCOME_TEMPLATE: &str = "{name} 👋

Приглашаем вас в наш закрытый канал.

Оформляйте подписку и становитесь частью нашего сообщества!

🔸 доступ: НАВСЕГДА";

pub fn display_name(first_name: Option<&str>) -> &str {
    match first_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => DEFAULT_NAME,
    }
}

/// Fills `{name}` in the configured template, or in the built-in one.
pub fn welcome(name: &str, template: Option<&str>) -> String {
    template.unwrap_or(WELCOME_TEMPLATE).replace("{name}", name)
}

pub fn already_member(name: &str) -> String {
    format!(
        "{}, вы уже являетесь участником закрытого канала! ✅\n\nНажмите кнопку ниже, чтобы перейти в канал:",
        name
    )
}

pub fn pay_button(amount: &Amount) -> String {
    let value = amount.value.normalize();
    match amount.currency.as_str() {
        "RUB" => format!("Оплатить {}₽", value),
        currency => format!("Оплатить {} {}", value, currency),
    }
}

/// Apology matching what went wrong while offering a payment.
pub fn payment_failure(error: &GateError) -> &'static str {
    match error {
        e if e.is_indeterminate() => PAYMENT_UNKNOWN,
        GateError::PaymentCanceled { .. } => PAYMENT_CANCELED,
        _ => PAYMENT_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentFailure;
    use rust_decimal_macros::dec;

    #[test]
    fn falls_back_to_default_name() {
        assert_eq!(display_name(None), DEFAULT_NAME);
        assert_eq!(display_name(Some("  ")), DEFAULT_NAME);
        assert_eq!(display_name(Some("Анна")), "Анна");
    }

    #[test]
    fn custom_template_gets_the_name() {
        assert_eq!(welcome("Анна", Some("Привет, {name}!")), "Привет, Анна!");
        assert!(welcome("Анна", None).starts_with("Анна 👋"));
    }

    #[test]
    fn pay_button_drops_trailing_zeros() {
        assert_eq!(pay_button(&Amount::new(dec!(100.00), "RUB")), "Оплатить 100₽");
        assert_eq!(pay_button(&Amount::new(dec!(9.5), "USD")), "Оплатить 9.5 USD");
    }

    #[test]
    fn indeterminate_failures_get_their_own_notice() {
        let unknown = GateError::payment(PaymentFailure::Indeterminate { status: 500 });
        let rejected = GateError::payment(PaymentFailure::Rejected {
            status: 400,
            description: "bad amount".to_string(),
        });

        assert_eq!(payment_failure(&unknown), PAYMENT_UNKNOWN);
        assert_eq!(payment_failure(&rejected), PAYMENT_FAILED);
        assert_eq!(
            payment_failure(&GateError::PaymentCanceled { reason: None }),
            PAYMENT_CANCELED
        );
    }
}
