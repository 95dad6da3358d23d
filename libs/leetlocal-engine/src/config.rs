// Language configuration management for the execution engine
use crate::engine::{Backend, InProcessBackend, JsLoader, SubprocessBackend};
use leetlocal_common::types::Language;
use leetlocal_common::Config;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    InProcess,
    Subprocess,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageConfig {
    pub language: Language,
    pub backend: BackendKind,
    /// Interpreter for subprocess languages.
    pub command: Option<String>,
    /// Kill deadline for subprocess languages. In-process runs are not bounded.
    pub timeout_ms: Option<u64>,
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<Language, LanguageConfig>,
}

impl LanguageConfigManager {
    pub fn from_config(config: &Config) -> Self {
        let mut configs = HashMap::new();

        configs.insert(
            Language::Js,
            LanguageConfig {
                language: Language::Js,
                backend: BackendKind::InProcess,
                command: None,
                timeout_ms: None,
            },
        );
        configs.insert(
            Language::Python,
            LanguageConfig {
                language: Language::Python,
                backend: BackendKind::Subprocess,
                command: Some(config.python_command.clone()),
                timeout_ms: Some(config.timeout_ms),
            },
        );

        Self { configs }
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: Language) -> Option<&LanguageConfig> {
        self.configs.get(&language)
    }

    /// Build the execution backend for a language
    pub fn backend_for(&self, language: Language) -> Backend {
        match self.get_config(language) {
            Some(LanguageConfig {
                backend: BackendKind::Subprocess,
                command,
                timeout_ms,
                ..
            }) => Backend::Subprocess(SubprocessBackend::new(
                command.clone().unwrap_or_else(|| Config::default().python_command),
                Duration::from_millis(timeout_ms.unwrap_or(Config::default().timeout_ms)),
            )),
            _ => Backend::InProcess(InProcessBackend::new(JsLoader)),
        }
    }
}
