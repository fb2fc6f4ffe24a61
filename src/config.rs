use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub risk_scorer_url: String,
    pub need_scorer_url: String,
    pub fraud_scorer_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            risk_scorer_url: scorer_url_from_env("RISK_SCORER_URL", "http://127.0.0.1:8001")?,
            need_scorer_url: scorer_url_from_env("NEED_SCORER_URL", "http://127.0.0.1:8002")?,
            fraud_scorer_url: scorer_url_from_env("FRAUD_SCORER_URL", "http://127.0.0.1:8003")?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Risk scorer URL: {}", config.risk_scorer_url);
        tracing::debug!("Need scorer URL: {}", config.need_scorer_url);
        tracing::debug!("Fraud scorer URL: {}", config.fraud_scorer_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn scorer_url_from_env(var: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(var).unwrap_or_else(|_| default.to_string());
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", var);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", var);
    }
    Ok(url)
}
