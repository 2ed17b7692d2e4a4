use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::Amount;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Illustrative image sent before the payment offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    File(PathBuf),
    None,
}

/// How channel invites are obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteStrategy {
    /// One fixed link for everybody.
    Static(String),
    /// A fresh link per grant. `None` means no member limit.
    Generated { member_limit: Option<u32> },
}

/// When the payment is created in the request flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferMode {
    /// Right after `/start`.
    Immediate,
    /// After the user presses the pay button on the welcome message.
    Button,
}

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub api_url: String,
    pub shop_id: String,
    pub secret_key: String,
    pub return_url: String,
    pub amount: Amount,
    pub description: String,
    pub capture: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Telegram
    pub bot_token: String,
    pub channel_id: String,

    // YooKassa
    pub payment: PaymentSettings,

    // Presentation
    pub image: ImageSource,
    pub invite: InviteStrategy,
    pub offer_mode: OfferMode,
    pub welcome_template: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} required", key))
        };
        let or_default = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let environment = Self::parse_environment(&or_default("ENVIRONMENT", "development"))?;

        let amount = Decimal::from_str(&or_default("PAYMENT_AMOUNT", "100.00"))
            .context("Invalid PAYMENT_AMOUNT")?;

        let config = Self {
            environment,
            host: or_default("HOST", "0.0.0.0"),
            port: or_default("PORT", "3000")
                .parse()
                .context("Invalid PORT")?,

            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            channel_id: required("CHANNEL_ID")?,

            payment: PaymentSettings {
                api_url: or_default("YOOKASSA_API_URL", "https://api.yookassa.ru"),
                shop_id: required("SHOP_ID")?,
                secret_key: required("API_KEY")?,
                return_url: required("RETURN_URL")?,
                amount: Amount::new(amount, or_default("PAYMENT_CURRENCY", "RUB")),
                description: or_default("PAYMENT_DESCRIPTION", "Доступ к закрытому каналу"),
                capture: Self::parse_bool("PAYMENT_CAPTURE", &or_default("PAYMENT_CAPTURE", "true"))?,
            },

            image: Self::parse_image(lookup("WELCOME_IMAGE")),
            invite: match lookup("CHANNEL_INVITE_LINK").filter(|v| !v.trim().is_empty()) {
                Some(link) => InviteStrategy::Static(link),
                None => {
                    let limit: u32 = or_default("INVITE_MEMBER_LIMIT", "1")
                        .parse()
                        .context("Invalid INVITE_MEMBER_LIMIT")?;
                    InviteStrategy::Generated {
                        member_limit: (limit > 0).then_some(limit),
                    }
                }
            },
            offer_mode: Self::parse_offer_mode(&or_default("OFFER_MODE", "immediate"))?,
            welcome_template: match lookup("WELCOME_TEXT_FILE").filter(|v| !v.trim().is_empty()) {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Cannot read WELCOME_TEXT_FILE {}", path))?,
                ),
                None => None,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(env: &str) -> Result<Environment> {
        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_bool(var: &str, value: &str) -> Result<bool> {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => bail!("Invalid {}: {}", var, value),
        }
    }

    fn parse_image(value: Option<String>) -> ImageSource {
        match value.map(|v| v.trim().to_string()) {
            None => ImageSource::None,
            Some(v) if v.is_empty() || v.eq_ignore_ascii_case("none") => ImageSource::None,
            Some(v) if v.starts_with("http://") || v.starts_with("https://") => ImageSource::Url(v),
            Some(v) => ImageSource::File(PathBuf::from(v)),
        }
    }

    fn parse_offer_mode(value: &str) -> Result<OfferMode> {
        match value.to_lowercase().as_str() {
            "immediate" => Ok(OfferMode::Immediate),
            "button" => Ok(OfferMode::Button),
            _ => bail!("Unknown OFFER_MODE: {}", value),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.payment.api_url.starts_with("http") {
            bail!("YOOKASSA_API_URL must be HTTP(S) URL");
        }
        if !self.payment.return_url.starts_with("http") {
            bail!("RETURN_URL must be HTTP(S) URL");
        }
        if let InviteStrategy::Static(link) = &self.invite {
            if !link.starts_with("https://") {
                bail!("CHANNEL_INVITE_LINK must be an https:// link");
            }
        }
        if self.payment.amount.value <= Decimal::ZERO {
            bail!("PAYMENT_AMOUNT must be positive");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("CHANNEL_ID", "@private_channel"),
            ("SHOP_ID", "501234"),
            ("API_KEY", "test_secret"),
            ("RETURN_URL", "https://t.me/gate_bot"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_source(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = load(&base_vars()).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.payment.api_url, "https://api.yookassa.ru");
        assert_eq!(config.payment.amount.value.to_string(), "100.00");
        assert_eq!(config.payment.amount.currency, "RUB");
        assert!(config.payment.capture);
        assert_eq!(config.image, ImageSource::None);
        assert_eq!(config.invite, InviteStrategy::Generated { member_limit: Some(1) });
        assert_eq!(config.offer_mode, OfferMode::Immediate);
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let mut vars = base_vars();
        vars.remove("API_KEY");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn static_invite_link_and_image_variants() {
        let mut vars = base_vars();
        vars.insert("CHANNEL_INVITE_LINK", "https://t.me/+mQND8LqAcHk1NGYy");
        vars.insert("WELCOME_IMAGE", "assets/welcome.jpg");
        vars.insert("OFFER_MODE", "button");
        vars.insert("PAYMENT_CAPTURE", "false");
        let config = load(&vars).unwrap();

        assert_eq!(
            config.invite,
            InviteStrategy::Static("https://t.me/+mQND8LqAcHk1NGYy".to_string())
        );
        assert_eq!(config.image, ImageSource::File(PathBuf::from("assets/welcome.jpg")));
        assert_eq!(config.offer_mode, OfferMode::Button);
        assert!(!config.payment.capture);
    }

    #[test]
    fn zero_member_limit_means_unlimited() {
        let mut vars = base_vars();
        vars.insert("INVITE_MEMBER_LIMIT", "0");
        vars.insert("WELCOME_IMAGE", "https://example.com/cover.png");
        let config = load(&vars).unwrap();

        assert_eq!(config.invite, InviteStrategy::Generated { member_limit: None });
        assert_eq!(
            config.image,
            ImageSource::Url("https://example.com/cover.png".to_string())
        );
    }

    #[test]
    fn rejects_non_http_return_url() {
        let mut vars = base_vars();
        vars.insert("RETURN_URL", "t.me/gate_bot");
        assert!(load(&vars).is_err());
    }
}
