//! Server configuration from CLI flags and environment

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Args;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::planner::DEFAULT_PER_GROUP;

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, global = true, env = "FITJOURNAL_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Exercises picked per muscle group when generating the next workout
    #[arg(long, global = true, env = "FITJOURNAL_EXERCISES_PER_GROUP", default_value_t = DEFAULT_PER_GROUP)]
    pub per_group: usize,

    /// Allowed CORS origins, comma separated ("*" allows any)
    #[arg(
        long = "cors-origin",
        global = true,
        env = "FITJOURNAL_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let origins: Vec<&str> = self
            .cors_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() || origins.contains(&"*") {
            return Ok(CorsLayer::permissive());
        }

        let origins = origins
            .into_iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {}", o)))
            .collect::<Result<Vec<_>>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            per_group: DEFAULT_PER_GROUP,
            cors_origins: vec!["*".to_string()],
        }
    }
}
