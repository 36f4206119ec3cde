//! # Settings — layered configuration
//!
//! Sources, lowest priority first:
//!
//! 1. The [`Default`] values below.
//! 2. An optional `config.toml` in the working directory.
//! 3. `AIMED_`-prefixed environment variables, `__` between sections
//!    (e.g. `AIMED_SERVER__PORT=8080`, `AIMED_LLM__MODEL=...`).
//! 4. The plain variable names deployments already use: `PORT`, `DATABASE_URL`,
//!    `JWT_SECRET`, `GROQ_API_KEY`, `TAVILY_API_KEY`, `CLIENT_ORIGIN`.
//!
//! `.env` is loaded by the binary before [`Settings::new`] runs.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// Browser origin allowed by CORS.
    pub client_origin: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            client_origin: "http://localhost:5173".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    /// `postgres://...`; without it the server keeps data in memory.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".into(),
            token_ttl_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Llm {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Model calls allowed per agent run.
    pub max_steps: usize,
}

impl Default for Llm {
    fn default() -> Self {
        let groq = agent::GroqConfig::default();
        Self {
            api_key: groq.api_key,
            base_url: groq.base_url,
            model: groq.model,
            temperature: groq.temperature,
            timeout_secs: groq.timeout_secs,
            max_steps: agent::DEFAULT_MAX_STEPS,
        }
    }
}

impl Llm {
    pub fn groq_config(&self) -> agent::GroqConfig {
        agent::GroqConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    pub api_key: String,
    pub endpoint: String,
    pub max_results: u32,
    pub timeout_secs: u64,
}

impl Default for Search {
    fn default() -> Self {
        let tavily = agent::TavilyConfig::default();
        Self {
            api_key: tavily.api_key,
            endpoint: tavily.endpoint,
            max_results: tavily.max_results,
            timeout_secs: tavily.timeout_secs,
        }
    }
}

impl Search {
    pub fn tavily_config(&self) -> agent::TavilyConfig {
        agent::TavilyConfig {
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
            max_results: self.max_results,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub llm: Llm,
    pub search: Search,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load("config.toml")
    }

    /// Load settings with `path` as the optional TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();

        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("AIMED")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env("PORT"))?
            .set_override_option("server.client_origin", env("CLIENT_ORIGIN"))?
            .set_override_option("database.url", env("DATABASE_URL"))?
            .set_override_option("auth.jwt_secret", env("JWT_SECRET"))?
            .set_override_option("llm.api_key", env("GROQ_API_KEY"))?
            .set_override_option("search.api_key", env("TAVILY_API_KEY"))?
            .build()?;

        config.try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
