// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The remote table store is optional: without `SUPABASE_URL` and
//! `SUPABASE_ANON_KEY` the service runs on the embedded dataset only.

use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RECENT_REPORTS_LIMIT: u32 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted project base URL (e.g. `https://xyz.supabase.co`)
    pub supabase_url: Option<String>,
    /// Public anon key for the hosted project
    pub supabase_anon_key: Option<String>,
    /// Shared secret expected on database webhook calls
    pub webhook_secret: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Upper bound on a single remote call
    pub remote_timeout: Duration,
    /// Number of reports loaded by a report refresh
    pub recent_reports_limit: u32,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let remote_timeout_secs = parse_or_default(
            "REMOTE_TIMEOUT_SECS",
            env::var("REMOTE_TIMEOUT_SECS").ok(),
            DEFAULT_REMOTE_TIMEOUT_SECS,
        )?;

        Ok(Self {
            supabase_url: non_empty_var("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY"),
            webhook_secret: env::var("WEBHOOK_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WEBHOOK_SECRET"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or_default("PORT", env::var("PORT").ok(), DEFAULT_PORT)?,
            remote_timeout: Duration::from_secs(remote_timeout_secs),
            recent_reports_limit: parse_or_default(
                "RECENT_REPORTS_LIMIT",
                env::var("RECENT_REPORTS_LIMIT").ok(),
                DEFAULT_RECENT_REPORTS_LIMIT,
            )?,
        })
    }

    /// Default config for testing only (no remote store).
    pub fn test_default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            webhook_secret: "test_webhook_secret".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: DEFAULT_PORT,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            recent_reports_limit: DEFAULT_RECENT_REPORTS_LIMIT,
        }
    }

    /// Both remote credentials are present.
    pub fn is_remote_configured(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_default<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(name, v)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
