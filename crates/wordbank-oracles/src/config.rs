//! Configuration and oracle factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use wordbank_core::statistics::PracticeLimits;

use crate::anthropic::AnthropicChat;
use crate::assistant::AiAssistant;
use crate::chat::{ChatModel, ModelRouter};
use crate::dictionary::{FreeDictionaryClient, DEFAULT_DICTIONARY_URL};
use crate::grading::AiGrader;
use crate::openai::{OpenAiChat, OPENROUTER_BASE_URL};

const OPENROUTER_REFERER: &str = "http://localhost:5173";
const OPENROUTER_TITLE: &str = "Vocab Manager";

/// Configuration for a single chat provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
        /// `HTTP-Referer` header (OpenRouter attribution).
        #[serde(default)]
        referer: Option<String>,
        /// `X-Title` header.
        #[serde(default)]
        title: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
                referer,
                title,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .field("referer", referer)
                .field("title", title)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// A model alias: which provider serves it and under which model id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAlias {
    pub provider: String,
    pub model: String,
}

impl ModelAlias {
    fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
        }
    }
}

/// Top-level wordbank configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordbankConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Model aliases keyed by alias.
    #[serde(default = "default_models")]
    pub models: HashMap<String, ModelAlias>,
    /// Alias used for grading when none is requested.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Alias used for spell check, translation and example correction.
    #[serde(default = "default_assistant_model")]
    pub assistant_model: String,
    /// Where the entry file lives. Defaults to [`default_data_dir`].
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_dictionary_url")]
    pub dictionary_url: String,
    #[serde(default)]
    pub practice: PracticeLimits,
}

fn default_models() -> HashMap<String, ModelAlias> {
    HashMap::from([
        (
            "haiku".to_string(),
            ModelAlias::new("anthropic", "claude-3-5-haiku-20241022"),
        ),
        (
            "sonnet".to_string(),
            ModelAlias::new("anthropic", "claude-sonnet-4-20250514"),
        ),
        (
            "qwen".to_string(),
            ModelAlias::new("openrouter", "qwen/qwen-2.5-72b-instruct:free"),
        ),
    ])
}
fn default_model() -> String {
    "haiku".to_string()
}
fn default_assistant_model() -> String {
    "qwen".to_string()
}
fn default_dictionary_url() -> String {
    DEFAULT_DICTIONARY_URL.to_string()
}

impl Default for WordbankConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            models: default_models(),
            default_model: default_model(),
            assistant_model: default_assistant_model(),
            data_dir: None,
            dictionary_url: default_dictionary_url(),
            practice: PracticeLimits::default(),
        }
    }
}

impl WordbankConfig {
    /// The configured data directory, or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Build a router with one route per alias whose provider is configured.
    ///
    /// Providers are instantiated once and shared between aliases.
    pub fn build_router(&self) -> Result<ModelRouter> {
        let mut router = ModelRouter::new(self.default_model.clone());
        let mut backends: HashMap<&str, Arc<dyn ChatModel>> = HashMap::new();

        let mut aliases: Vec<(&String, &ModelAlias)> = self.models.iter().collect();
        aliases.sort_by(|a, b| a.0.cmp(b.0));

        for (alias, target) in aliases {
            let Some(provider_config) = self.providers.get(&target.provider) else {
                debug!(
                    alias = %alias,
                    provider = %target.provider,
                    "skipping alias without provider"
                );
                continue;
            };
            let chat = match backends.get(target.provider.as_str()) {
                Some(chat) => chat.clone(),
                None => {
                    let chat = create_chat_model(&target.provider, provider_config)?;
                    backends.insert(target.provider.as_str(), chat.clone());
                    chat
                }
            };
            router.insert(alias.clone(), chat, target.model.clone());
        }

        if router.aliases().is_empty() {
            warn!("no model aliases have a configured provider; AI features are unavailable");
        }
        Ok(router)
    }

    pub fn build_grader(&self) -> Result<AiGrader> {
        Ok(AiGrader::new(self.build_router()?))
    }

    /// The assistant uses `assistant_model`, falling back to the default alias.
    pub fn build_assistant(&self) -> Result<AiAssistant> {
        let router = self.build_router()?;
        let route = router
            .resolve(Some(&self.assistant_model))
            .context("no chat provider configured for the writing assistant")?;
        Ok(AiAssistant::new(route.chat.clone(), route.model.clone()))
    }

    pub fn build_dictionary(&self) -> Result<FreeDictionaryClient> {
        FreeDictionaryClient::new(Some(self.dictionary_url.clone()))
            .context("failed to build dictionary client")
    }
}

/// `~/.local/share/wordbank`, or `./wordbank-data` without `$HOME`.
pub fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".local").join("share").join("wordbank"))
        .unwrap_or_else(|| PathBuf::from("wordbank-data"))
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let resolve = |v: &Option<String>| v.as_ref().map(|s| resolve_env_vars(s));
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
            referer,
            title,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve(base_url),
            org_id: resolve(org_id),
            referer: resolve(referer),
            title: resolve(title),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: resolve(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `wordbank.toml` in the current directory
/// 2. `~/.config/wordbank/config.toml`
///
/// Environment variable overrides: `WORDBANK_ANTHROPIC_KEY`, `WORDBANK_OPENROUTER_KEY`.
pub fn load_config() -> Result<WordbankConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WordbankConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("wordbank.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<WordbankConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            debug!(path = %path.display(), "loaded config");
            config
        }
        None => WordbankConfig::default(),
    };

    apply_env_overrides(
        &mut config,
        std::env::var("WORDBANK_ANTHROPIC_KEY").ok(),
        std::env::var("WORDBANK_OPENROUTER_KEY").ok(),
    );

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn apply_env_overrides(
    config: &mut WordbankConfig,
    anthropic_key: Option<String>,
    openrouter_key: Option<String>,
) {
    if let Some(key) = anthropic_key {
        let provider = config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Anthropic { api_key, .. } = provider {
            *api_key = key;
        }
    }

    if let Some(key) = openrouter_key {
        let provider = config
            .providers
            .entry("openrouter".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: Some(OPENROUTER_BASE_URL.to_string()),
                org_id: None,
                referer: Some(OPENROUTER_REFERER.to_string()),
                title: Some(OPENROUTER_TITLE.to_string()),
            });
        if let ProviderConfig::OpenAI { api_key, .. } = provider {
            *api_key = key;
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("wordbank"))
}

/// Create a chat backend from its configuration.
pub fn create_chat_model(name: &str, config: &ProviderConfig) -> Result<Arc<dyn ChatModel>> {
    let chat: Arc<dyn ChatModel> = match config {
        ProviderConfig::Anthropic { api_key, base_url } => Arc::new(
            AnthropicChat::new(api_key, base_url.clone())
                .with_context(|| format!("failed to build provider '{name}'"))?,
        ),
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
            referer,
            title,
        } => Arc::new(
            OpenAiChat::new(api_key, base_url.clone(), org_id.clone())
                .with_context(|| format!("failed to build provider '{name}'"))?
                .with_app_headers(referer.clone(), title.clone()),
        ),
    };
    Ok(chat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_WORDBANK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_WORDBANK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_WORDBANK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        assert_eq!(resolve_env_vars("${UNCLOSED"), "${UNCLOSED");
        std::env::remove_var("_WORDBANK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = WordbankConfig::default();
        assert_eq!(config.default_model, "haiku");
        assert_eq!(config.assistant_model, "qwen");
        assert_eq!(config.models["sonnet"].model, "claude-sonnet-4-20250514");
        assert_eq!(config.models["qwen"].provider, "openrouter");
        assert_eq!(config.practice.score_window, 3);
        assert_eq!(config.practice.max_error_patterns, 5);
        assert_eq!(config.dictionary_url, DEFAULT_DICTIONARY_URL);
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
default_model = "sonnet"
data_dir = "/tmp/words"

[providers.anthropic]
type = "anthropic"
api_key = "sk-test"

[providers.openrouter]
type = "openai"
api_key = "sk-or"
base_url = "https://openrouter.ai/api"
title = "Vocab Manager"

[models.fast]
provider = "anthropic"
model = "claude-3-5-haiku-20241022"

[practice]
add_example_threshold = 80
"#;
        let config: WordbankConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert!(matches!(
            config.providers.get("openrouter"),
            Some(ProviderConfig::OpenAI { title: Some(t), .. }) if t == "Vocab Manager"
        ));
        assert_eq!(config.default_model, "sonnet");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/words"));
        // An explicit table replaces the built-in aliases.
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.practice.add_example_threshold, 80);
        assert_eq!(config.practice.score_window, 3);
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::Anthropic {
            api_key: "sk-secret".into(),
            base_url: None,
        };
        let printed = format!("{config:?}");
        assert!(printed.contains("***"));
        assert!(!printed.contains("sk-secret"));
    }

    #[test]
    fn env_overrides_create_providers() {
        let mut config = WordbankConfig::default();
        apply_env_overrides(&mut config, Some("sk-a".into()), Some("sk-or".into()));

        assert!(matches!(
            config.providers.get("anthropic"),
            Some(ProviderConfig::Anthropic { api_key, .. }) if api_key == "sk-a"
        ));
        match config.providers.get("openrouter") {
            Some(ProviderConfig::OpenAI {
                api_key,
                base_url,
                referer,
                ..
            }) => {
                assert_eq!(api_key, "sk-or");
                assert_eq!(base_url.as_deref(), Some(OPENROUTER_BASE_URL));
                assert_eq!(referer.as_deref(), Some(OPENROUTER_REFERER));
            }
            other => panic!("unexpected provider: {other:?}"),
        }
    }

    #[test]
    fn env_override_patches_existing_key() {
        let mut config = WordbankConfig::default();
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig::Anthropic {
                api_key: "old".into(),
                base_url: Some("http://proxy".into()),
            },
        );
        apply_env_overrides(&mut config, Some("new".into()), None);
        assert!(matches!(
            config.providers.get("anthropic"),
            Some(ProviderConfig::Anthropic { api_key, base_url: Some(url) })
                if api_key == "new" && url == "http://proxy"
        ));
        assert!(!config.providers.contains_key("openrouter"));
    }

    #[test]
    fn load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "assistant_model = \"haiku\"\n[providers.anthropic]\ntype = \"anthropic\"\napi_key = \"k\""
        )
        .unwrap();
        let config = load_config_from(Some(file.path())).unwrap();
        assert_eq!(config.assistant_model, "haiku");
        assert!(config.providers.contains_key("anthropic"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "providers = 12").unwrap();
        let err = load_config_from(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }

    #[test]
    fn router_only_includes_configured_providers() {
        let mut config = WordbankConfig::default();
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig::Anthropic {
                api_key: "k".into(),
                base_url: Some("http://127.0.0.1:9".into()),
            },
        );
        let router = config.build_router().unwrap();
        assert_eq!(router.aliases(), vec!["haiku", "sonnet"]);
        assert_eq!(
            router.resolve(Some("qwen")).unwrap().model,
            "claude-3-5-haiku-20241022"
        );
    }

    #[test]
    fn assistant_requires_some_provider() {
        let config = WordbankConfig::default();
        assert!(config.build_assistant().is_err());
    }
}
