// Language and engine configuration, loaded once during startup.
use anyhow::{bail, Context, Result};
use aula_common::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub version: String,
    pub image: String,
    pub cpu_limit: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Registry of configured language runtimes.
/// Loaded from config/languages.json during the explicit startup phase;
/// there is no lazy re-reading once the engine accepts requests.
#[derive(Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<String, LanguageConfig>,
}

impl LanguageConfigManager {
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!(
                "Language config file not found: {}",
                config_path.display()
            );
        }

        let content =
            fs::read_to_string(config_path).context("Failed to read languages.json")?;
        let languages_json: LanguagesJson =
            serde_json::from_str(&content).context("Failed to parse languages.json")?;

        if languages_json.languages.is_empty() {
            bail!("No languages configured in languages.json");
        }

        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            if Language::from_str(&lang.name).is_none() {
                bail!("Unknown language '{}' in languages.json", lang.name);
            }
            configs.insert(lang.name.clone(), lang);
        }

        Ok(Self { configs })
    }

    /// Load with default path (config/languages.json)
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new("config/languages.json"))
    }

    pub fn get_config(&self, language: &Language) -> Result<&LanguageConfig> {
        let lang_name = language.to_string();
        self.configs
            .get(&lang_name)
            .ok_or_else(|| anyhow::anyhow!("No configuration found for language: {}", lang_name))
    }

    pub fn image(&self, language: &Language) -> Result<String> {
        Ok(self.get_config(language)?.image.clone())
    }

    /// CPU quota in Docker nano-CPU units. Defaults to half a core.
    pub fn nano_cpus(&self, language: &Language) -> i64 {
        self.get_config(language)
            .map(|c| (c.cpu_limit * 1_000_000_000.0) as i64)
            .unwrap_or(500_000_000)
    }

    pub fn configured_languages(&self) -> Vec<Language> {
        self.configs
            .keys()
            .filter_map(|name| Language::from_str(name))
            .collect()
    }
}

/// Engine-level settings from the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub redis_url: String,
    pub bind_addr: String,
    /// Global cap on concurrently grading submissions. Requests beyond the
    /// cap are rejected with 503 rather than queued, so a burst cannot
    /// exhaust host CPU or memory.
    pub max_concurrent_submissions: usize,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let max_concurrent_submissions = std::env::var("MAX_CONCURRENT_SUBMISSIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            max_concurrent_submissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("aula-languages-{}.json", uuid::Uuid::new_v4()));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_valid_config() {
        let path = write_config(
            r#"{"languages":[
                {"name":"python","version":"3.12","image":"aula-python:latest","cpu_limit":0.5}
            ]}"#,
        );
        let manager = LanguageConfigManager::load(&path).unwrap();
        assert_eq!(
            manager.image(&Language::Python).unwrap(),
            "aula-python:latest"
        );
        assert_eq!(manager.nano_cpus(&Language::Python), 500_000_000);
        assert_eq!(manager.configured_languages(), vec![Language::Python]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_unknown_language() {
        let path = write_config(
            r#"{"languages":[
                {"name":"cobol","version":"85","image":"x","cpu_limit":1.0}
            ]}"#,
        );
        assert!(LanguageConfigManager::load(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_empty_config() {
        let path = write_config(r#"{"languages":[]}"#);
        assert!(LanguageConfigManager::load(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn unconfigured_language_is_an_error() {
        let path = write_config(
            r#"{"languages":[
                {"name":"python","version":"3.12","image":"aula-python:latest","cpu_limit":0.5}
            ]}"#,
        );
        let manager = LanguageConfigManager::load(&path).unwrap();
        assert!(manager.image(&Language::Java).is_err());
        fs::remove_file(path).ok();
    }
}
