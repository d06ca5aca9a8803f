//! Server configuration (CLI flags with environment variable fallbacks).

use clap::Parser;
use hanashi_shared::logger::LogFormat;

#[derive(Parser, Debug, Clone)]
#[command(name = "hanashi-server")]
#[command(about = "Real-time chat server with presence and room fanout", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HANASHI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HANASHI_PORT", default_value = "8080")]
    pub port: u16,

    /// Secret used to verify HS256 bearer tokens
    #[arg(long, env = "HANASHI_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Origin allowed by CORS (any origin when unset)
    #[arg(long, env = "HANASHI_FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "HANASHI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "HANASHI_JSON_LOGS")]
    pub json_logs: bool,
}

impl ServerConfig {
    pub fn log_format(&self) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}
