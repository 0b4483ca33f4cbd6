use std::{fs, path::Path};

use anyhow::Context;
use shared::{
    domain::{CsrfToken, SessionIdentity, DEFAULT_ANONYMOUS_SENTINEL},
    protocol::{DEFAULT_SORT_CLASS, DEFAULT_UPDATE_CART_CLASS, UPDATE_ITEM_PATH},
};
use tracing::warn;
use url::Url;

use crate::{
    dispatcher::{ConcurrencyPolicy, DispatcherConfig},
    page::BindingClasses,
};

pub const DEFAULT_SETTINGS_FILE: &str = "shop_client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub update_item_path: String,
    pub csrf_token: String,
    pub session_user: String,
    pub anonymous_sentinel: String,
    pub update_cart_class: String,
    pub sort_class: String,
    pub serialize_per_product: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            update_item_path: UPDATE_ITEM_PATH.into(),
            csrf_token: String::new(),
            session_user: DEFAULT_ANONYMOUS_SENTINEL.into(),
            anonymous_sentinel: DEFAULT_ANONYMOUS_SENTINEL.into(),
            update_cart_class: DEFAULT_UPDATE_CART_CLASS.into(),
            sort_class: DEFAULT_SORT_CLASS.into(),
            serialize_per_product: false,
        }
    }
}

impl ClientSettings {
    pub fn update_item_url(&self) -> Result<Url, url::ParseError> {
        let base = Url::parse(self.base_url.trim())?;
        base.join(self.update_item_path.trim())
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            session: SessionIdentity::new(self.session_user.clone()),
            anonymous_sentinel: self.anonymous_sentinel.clone(),
            csrf_token: CsrfToken::new(self.csrf_token.clone()),
            concurrency: if self.serialize_per_product {
                ConcurrencyPolicy::SerializePerProduct
            } else {
                ConcurrencyPolicy::Unordered
            },
        }
    }

    pub fn binding_classes(&self) -> BindingClasses {
        BindingClasses {
            update_cart: self.update_cart_class.clone(),
            sort: self.sort_class.clone(),
        }
    }
}

/// Defaults, then `./shop_client.toml` if present, then environment variables.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    let path = Path::new(DEFAULT_SETTINGS_FILE);
    let file = if path.exists() { Some(path) } else { None };
    load_settings_from(file, |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Some(path) = file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    }

    apply_env_overrides(&mut settings, env);
    Ok(settings)
}

fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let table: toml::Table = toml::from_str(raw)?;

    let text = |key: &str| table.get(key).and_then(|v| v.as_str()).map(str::to_string);

    if let Some(v) = text("base_url") {
        settings.base_url = v;
    }
    if let Some(v) = text("update_item_path") {
        settings.update_item_path = v;
    }
    if let Some(v) = text("csrf_token") {
        settings.csrf_token = v;
    }
    if let Some(v) = text("session_user") {
        settings.session_user = v;
    }
    if let Some(v) = text("anonymous_sentinel") {
        settings.anonymous_sentinel = v;
    }
    if let Some(v) = text("update_cart_class") {
        settings.update_cart_class = v;
    }
    if let Some(v) = text("sort_class") {
        settings.sort_class = v;
    }
    match table.get("serialize_per_product") {
        Some(toml::Value::Boolean(v)) => settings.serialize_per_product = *v,
        Some(toml::Value::String(v)) => {
            if let Some(parsed) = parse_flag(v) {
                settings.serialize_per_product = parsed;
            }
        }
        Some(other) => warn!(value = %other, "ignoring non-boolean serialize_per_product"),
        None => {}
    }

    Ok(())
}

fn apply_env_overrides(settings: &mut ClientSettings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("SHOP_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("SHOP_UPDATE_ITEM_PATH") {
        settings.update_item_path = v;
    }

    if let Some(v) = env("SHOP_CSRF_TOKEN") {
        settings.csrf_token = v;
    }
    if let Some(v) = env("APP__CSRF_TOKEN") {
        settings.csrf_token = v;
    }

    if let Some(v) = env("SHOP_SESSION_USER") {
        settings.session_user = v;
    }

    if let Some(v) = env("SHOP_ANONYMOUS_SENTINEL") {
        settings.anonymous_sentinel = v;
    }

    if let Some(v) = env("SHOP_UPDATE_CART_CLASS") {
        settings.update_cart_class = v;
    }
    if let Some(v) = env("SHOP_SORT_CLASS") {
        settings.sort_class = v;
    }

    if let Some(v) = env("SHOP_SERIALIZE_PER_PRODUCT") {
        match parse_flag(&v) {
            Some(parsed) => settings.serialize_per_product = parsed,
            None => warn!(value = %v, "ignoring unparseable SHOP_SERIALIZE_PER_PRODUCT"),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
