use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toml;

use crate::die;
use crate::platform::PlatformKind;
use crate::theme::ThemeKind;

#[derive(Deserialize, Serialize, Default, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Keybindings {
    #[default]
    Emacs,
    Vi,
}

#[derive(Deserialize, Serialize, Default, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ProviderActivationPolicy {
    /// Activate when credentials are found (or, for ollama, when the server answers)
    #[default]
    Auto,
    Enabled,
    Disabled,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Provider {
    #[serde(default)]
    pub activate: ProviderActivationPolicy,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub default_model: Option<String>,
    pub priority: Option<u8>,
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Providers {
    #[serde(default)]
    pub gemini: Provider,
    #[serde(default)]
    pub openai: Provider,
    #[serde(default)]
    pub ollama: Provider,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(default)]
pub(crate) struct Defaults {
    pub platform: PlatformKind,
    pub theme: ThemeKind,
    pub contact_name: String,
    pub me_name: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            platform: PlatformKind::default(),
            theme: ThemeKind::default(),
            contact_name: "Crush ❤️".to_string(),
            me_name: "Me".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(default)]
pub(crate) struct Request {
    pub timeout_secs: u64,
    pub reply_delay_ms: u64,
}

impl Default for Request {
    fn default() -> Self {
        Request {
            timeout_secs: 60,
            reply_delay_ms: 2000,
        }
    }
}

#[derive(Deserialize, Serialize, Default, Debug)]
pub(crate) struct Config {
    #[serde(default)]
    pub keybindings: Keybindings,
    pub default_model: Option<String>,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub request: Request,
    #[serde(default)]
    pub providers: Providers,
}

fn get_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME");

    if let Some(home) = home {
        let home = PathBuf::from(home);

        const USER_PATHS: [&str; 2] = [".config/mockchat/config.toml", ".mockchat.toml"];

        for &path in USER_PATHS.iter() {
            let fullpath = home.join(path);

            if fullpath.exists() {
                return Some(fullpath);
            }
        }
    }

    let system_config = PathBuf::from("/etc/mockchat.toml");

    if system_config.exists() {
        Some(system_config)
    } else {
        None
    }
}

fn parse_config<S: serde::de::DeserializeOwned>(config: &str) -> Result<S, toml::de::Error> {
    toml::de::from_str(config)
}

fn extra_fields_helper<'a>(
    path: &mut Vec<&'a str>,
    user_config: &'a toml::Table,
    config: &'a toml::Table,
    extra: &mut Vec<String>,
) {
    for (user_key, user_value) in user_config {
        path.push(user_key);

        match (user_value, config.get(user_key)) {
            (toml::Value::Table(user_value), Some(toml::Value::Table(config_value))) => {
                extra_fields_helper(path, user_value, config_value, extra)
            }
            (_, Some(_)) => {}
            (_, None) => extra.push(path.join(".")),
        }

        path.pop();
    }
}

/// Returns the dotted paths of keys in `raw_config` which `config` did not consume
fn extraneous_keys(config: &Config, raw_config: &str) -> Result<Vec<String>, toml::de::Error> {
    let user_config: toml::Table = parse_config(raw_config)?;

    // Keys the parsed config knows about. Optional fields left unset are absent
    // from the serialized form but were also absent from the user's file.
    let known = match toml::Value::try_from(config) {
        Ok(toml::Value::Table(known)) => known,
        Ok(_) => return Ok(Vec::new()),
        Err(err) => {
            tracing::debug!(error = %err, "failed to reserialize config");

            return Ok(Vec::new());
        }
    };

    let mut path = Vec::new();
    let mut extra = Vec::new();

    extra_fields_helper(&mut path, &user_config, &known, &mut extra);

    Ok(extra)
}

pub(crate) fn parse_config_str(raw_config: &str) -> Result<(Config, Vec<String>), toml::de::Error> {
    let config: Config = parse_config(raw_config)?;
    let extra = extraneous_keys(&config, raw_config)?;

    Ok((config, extra))
}

fn read_config_file(path: &Path) -> Config {
    let raw_config = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => die!("failed to read config \"{}\": {}", path.display(), err),
    };

    match parse_config_str(&raw_config) {
        Ok((config, extra)) => {
            for key in extra {
                crate::warn!("config contains extraneous key \"{}\", ignoring", key);
            }

            config
        }
        Err(err) => die!("failed to parse config \"{}\": {}", path.display(), err),
    }
}

pub(crate) fn read_config(config: Option<PathBuf>) -> Config {
    let config_path = config.or_else(get_config_path);

    if let Some(path) = config_path {
        tracing::debug!(path = %path.display(), "reading config");

        read_config_file(&path)
    } else {
        Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let (config, extra) = parse_config_str("").unwrap();

        assert!(extra.is_empty());
        assert_eq!(config.keybindings, Keybindings::Emacs);
        assert_eq!(config.defaults.platform, PlatformKind::Instagram);
        assert_eq!(config.defaults.theme, ThemeKind::Flirty);
        assert_eq!(config.defaults.contact_name, "Crush ❤️");
        assert_eq!(config.defaults.me_name, "Me");
        assert_eq!(config.request.timeout_secs, 60);
        assert_eq!(config.request.reply_delay_ms, 2000);
        assert_eq!(
            config.providers.gemini.activate,
            ProviderActivationPolicy::Auto
        );
    }

    #[test]
    fn test_full_config() {
        let raw = r#"
            keybindings = "vi"
            default_model = "gemini/gemini-2.5-flash"

            [defaults]
            platform = "tinder"
            theme = "red-flag"
            contact_name = "Alex"

            [request]
            timeout_secs = 5

            [providers.openai]
            activate = "disabled"

            [providers.ollama]
            api_base = "http://gpu-box:11434"
            default_model = "llama3.1"
            priority = 200
        "#;

        let (config, extra) = parse_config_str(raw).unwrap();

        assert!(extra.is_empty(), "{:?}", extra);
        assert_eq!(config.keybindings, Keybindings::Vi);
        assert_eq!(config.default_model.as_deref(), Some("gemini/gemini-2.5-flash"));
        assert_eq!(config.defaults.platform, PlatformKind::Tinder);
        assert_eq!(config.defaults.theme, ThemeKind::RedFlag);
        assert_eq!(config.defaults.me_name, "Me");
        assert_eq!(config.request.timeout_secs, 5);
        assert_eq!(config.request.reply_delay_ms, 2000);
        assert_eq!(
            config.providers.openai.activate,
            ProviderActivationPolicy::Disabled
        );
        assert_eq!(config.providers.ollama.priority, Some(200));
        assert_eq!(
            config.providers.ollama.api_base.as_deref(),
            Some("http://gpu-box:11434")
        );
    }

    #[test]
    fn test_extraneous_keys_are_reported() {
        let raw = r#"
            editor = "vim"

            [defaults]
            platform = "whatsapp"
            avatar = "me.png"

            [providers.gemini]
            api_key = "k"
            model = "typo"
        "#;

        let (config, mut extra) = parse_config_str(raw).unwrap();
        extra.sort();

        assert_eq!(config.defaults.platform, PlatformKind::WhatsApp);
        assert_eq!(
            extra,
            ["defaults.avatar", "editor", "providers.gemini.model"]
        );
    }

    #[test]
    fn test_unknown_platform_is_an_error() {
        assert!(parse_config_str("[defaults]\nplatform = \"myspace\"").is_err());
    }
}
