use super::RelayConfig;
use crate::utils::error::{RelayError, Result};
use regex::Regex;
use std::path::Path;

impl RelayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RelayError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RelayError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// 替換環境變數 (例如 ${ZHIPU_API_KEY})；未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RelayError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogMode, LogSink, ProviderKind};
    use crate::domain::model::Group;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config() {
        let toml_content = r#"
provider = "deepseek"
api_key = "sk-test"
"#;

        let config = RelayConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.provider, ProviderKind::Deepseek);
        assert_eq!(config.token_ttl_seconds, 3600);
        assert_eq!(config.request_timeout_seconds, 60);
        assert_eq!(config.log.sink, LogSink::Disabled);
        assert_eq!(config.log.airtable_table, "Log");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
provider = "zhipu"
api_key = "abc.def"
model = "glm-4-air"
token_ttl_seconds = 600

[prompts]
instructive = "Correct every sentence."

[log]
sink = "csv"
mode = "inline"
csv_path = "./interactions.csv"
"#;

        let config = RelayConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.provider, ProviderKind::Zhipu);
        assert_eq!(config.model(), "glm-4-air");
        assert_eq!(config.token_ttl_seconds, 600);
        assert_eq!(
            config.prompts.for_group(Group::Instructive),
            "Correct every sentence."
        );
        assert_eq!(config.log.sink, LogSink::Csv);
        assert_eq!(config.log.mode, LogMode::Inline);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FEEDBACK_RELAY_TEST_KEY", "sk-from-env");

        let toml_content = r#"
provider = "deepseek"
api_key = "${FEEDBACK_RELAY_TEST_KEY}"
"#;

        let config = RelayConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key, "sk-from-env");

        std::env::remove_var("FEEDBACK_RELAY_TEST_KEY");
    }

    #[test]
    fn test_unset_variable_left_verbatim() {
        let toml_content = r#"
provider = "deepseek"
api_key = "${FEEDBACK_RELAY_SURELY_UNSET_VAR}"
"#;

        let config = RelayConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key, "${FEEDBACK_RELAY_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_unknown_provider_is_parse_error() {
        let toml_content = r#"
provider = "openai"
api_key = "sk"
"#;

        assert!(matches!(
            RelayConfig::from_toml_str(toml_content),
            Err(RelayError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
provider = "deepseek"
api_key = "sk"
api_base = "invalid-url"
"#;

        let config = RelayConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
provider = "deepseek"
api_key = "sk-file"

[log]
sink = "airtable"
airtable_api_key = "pat"
airtable_base_id = "app1"
airtable_table = "Interactions"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = RelayConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api_key, "sk-file");
        assert_eq!(config.log.airtable_table, "Interactions");
        assert_eq!(config.log.airtable_api_base, "https://api.airtable.com/v0");
    }
}
