use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::str::FromStr;

/// Default Qianfan API host used when `QIANFAN_BASE_URL` is not set.
pub const DEFAULT_QIANFAN_BASE_URL: &str = "https://aip.baidubce.com";

/// Default DeepSeek API base URL used when `DEEPSEEK_BASE_URL` is not set.
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Chat-completion vendor backing every request of the running process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    Qianfan,
    Deepseek,
}

#[derive(Debug, PartialEq, Eq)]
pub struct LlmProviderParseError;

impl FromStr for LlmProvider {
    type Err = LlmProviderParseError;
    fn from_str(provider: &str) -> Result<LlmProvider, Self::Err> {
        match provider.trim().to_lowercase().as_str() {
            "qianfan" => Ok(LlmProvider::Qianfan),
            "deepseek" => Ok(LlmProvider::Deepseek),
            _ => Err(LlmProviderParseError),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The LLM vendor to use: "qianfan" or "deepseek". Unknown values fall back to qianfan.
    #[arg(long, env, default_value = "qianfan")]
    llm_provider: String,

    /// The Qianfan access key (OAuth client_id).
    #[arg(long, env)]
    qianfan_access_key: Option<String>,

    /// The Qianfan secret key (OAuth client_secret).
    #[arg(long, env)]
    qianfan_secret_key: Option<String>,

    /// The base URL of the Qianfan API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_QIANFAN_BASE_URL)]
    qianfan_base_url: String,

    /// The Qianfan model to call, e.g. ERNIE-4.0-8K.
    #[arg(long, env, default_value = "ERNIE-4.0-8K")]
    default_model: String,

    /// The API key to use when calling DeepSeek (or any OpenAI-compatible endpoint).
    #[arg(long, env)]
    deepseek_api_key: Option<String>,

    /// The base URL of the OpenAI-compatible API.
    #[arg(long, env, default_value = DEFAULT_DEEPSEEK_BASE_URL)]
    deepseek_base_url: String,

    /// The model to request from the OpenAI-compatible API.
    #[arg(long, env, default_value = "deepseek-chat")]
    deepseek_model: String,

    /// A list of CORS origin URLs allowed to receive server responses. "*" allows any origin.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "*"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(long, env, default_value = "0.0.0.0")]
    pub host: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 8000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long = "log-level",
        env = "LOG_LEVEL",
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new([
            "OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE",
            "off", "error", "warn", "info", "debug", "trace",
        ])
            .map(|s| s.parse::<LevelFilter>().unwrap_or(LevelFilter::Info)),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns the configured provider, or `None` when `LLM_PROVIDER` names an unknown vendor.
    pub fn llm_provider(&self) -> Option<LlmProvider> {
        self.llm_provider.parse().ok()
    }

    /// Returns the raw `LLM_PROVIDER` value as given.
    pub fn llm_provider_name(&self) -> &str {
        &self.llm_provider
    }

    /// Returns the Qianfan access key, if configured and non-blank.
    pub fn qianfan_access_key(&self) -> Option<String> {
        non_blank(&self.qianfan_access_key)
    }

    /// Returns the Qianfan secret key, if configured and non-blank.
    pub fn qianfan_secret_key(&self) -> Option<String> {
        non_blank(&self.qianfan_secret_key)
    }

    pub fn qianfan_base_url(&self) -> &str {
        &self.qianfan_base_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Returns the DeepSeek API key, if configured and non-blank.
    pub fn deepseek_api_key(&self) -> Option<String> {
        non_blank(&self.deepseek_api_key)
    }

    pub fn deepseek_base_url(&self) -> &str {
        &self.deepseek_base_url
    }

    pub fn deepseek_model(&self) -> &str {
        &self.deepseek_model
    }

    /// Returns `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["meeting_minutes_rs"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_llm_provider_parses_case_insensitively() {
        assert_eq!("DeepSeek".parse::<LlmProvider>(), Ok(LlmProvider::Deepseek));
        assert_eq!(" qianfan ".parse::<LlmProvider>(), Ok(LlmProvider::Qianfan));
        assert_eq!(
            "openai".parse::<LlmProvider>(),
            Err(LlmProviderParseError)
        );
    }

    #[test]
    fn test_unknown_provider_is_reported_as_none() {
        let config = parse(&["--llm-provider", "openai"]);
        assert_eq!(config.llm_provider(), None);
        assert_eq!(config.llm_provider_name(), "openai");
    }

    #[test]
    fn test_explicit_arguments_are_applied() {
        let config = parse(&[
            "--llm-provider",
            "deepseek",
            "--deepseek-model",
            "deepseek-reasoner",
            "--host",
            "127.0.0.1",
            "--port",
            "9100",
            "--log-level",
            "debug",
        ]);
        assert_eq!(config.llm_provider(), Some(LlmProvider::Deepseek));
        assert_eq!(config.deepseek_model(), "deepseek-reasoner");
        assert_eq!(config.bind_address(), "127.0.0.1:9100");
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }

    #[test]
    fn test_blank_credentials_are_treated_as_missing() {
        let config = parse(&["--deepseek-api-key", "   ", "--qianfan-access-key", "ak"]);
        assert_eq!(config.deepseek_api_key(), None);
        assert_eq!(config.qianfan_access_key(), Some("ak".to_string()));
    }

    #[test]
    fn test_allowed_origins_splits_on_commas() {
        let config = parse(&[
            "--allowed-origins",
            "http://localhost:3000,https://minutes.example.com",
        ]);
        assert_eq!(
            config.allowed_origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://minutes.example.com".to_string()
            ]
        );
    }
}
