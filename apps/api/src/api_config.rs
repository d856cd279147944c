use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use presensi_core::AppError;
use presensi_domain::{ApprovalLevel, ApprovalPolicy, DefaultContextPolicy, LegacyRoleLevels};
use tracing_subscriber::EnvFilter;
use url::Url;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackendConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Redis {
        redis_url: String,
    },
    Memory,
}

impl SessionBackendConfig {
    /// Returns the `SESSION_BACKEND` value selecting this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Redis { .. } => "redis",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub backend_base_url: Url,
    pub backend_timeout: Duration,
    pub session_backend: SessionBackendConfig,
    pub cookie_secure: bool,
    pub session_inactivity_minutes: i64,
    pub default_context_policy: DefaultContextPolicy,
    pub approval_policy: ApprovalPolicy,
    pub role_levels: LegacyRoleLevels,
    pub context_event_capacity: usize,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(|name| env::var(name).ok(), migrate_only)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        migrate_only: bool,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("API_PORT", optional("API_PORT"), 3001_u16)?;

        let backend_base_url = optional("BACKEND_BASE_URL")
            .ok_or_else(|| AppError::Validation("BACKEND_BASE_URL is required".to_owned()))
            .and_then(|value| {
                Url::parse(value.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid BACKEND_BASE_URL: {error}"))
                })
            })?;
        let backend_timeout = Duration::from_millis(parse_or(
            "BACKEND_TIMEOUT_MS",
            optional("BACKEND_TIMEOUT_MS"),
            5000_u64,
        )?);

        let session_backend = match optional("SESSION_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => SessionBackendConfig::Postgres {
                database_url: optional("DATABASE_URL").ok_or_else(|| {
                    AppError::Validation(
                        "DATABASE_URL is required when SESSION_BACKEND=postgres".to_owned(),
                    )
                })?,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    optional("DATABASE_MAX_CONNECTIONS"),
                    5_u32,
                )?
                .max(1),
            },
            "redis" => SessionBackendConfig::Redis {
                redis_url: optional("REDIS_URL").ok_or_else(|| {
                    AppError::Validation(
                        "REDIS_URL is required when SESSION_BACKEND=redis".to_owned(),
                    )
                })?,
            },
            "memory" => SessionBackendConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "SESSION_BACKEND must be one of 'postgres', 'redis' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && !matches!(session_backend, SessionBackendConfig::Postgres { .. }) {
            return Err(AppError::Validation(
                "the migrate command requires SESSION_BACKEND=postgres".to_owned(),
            ));
        }

        let cookie_secure = optional("SESSION_COOKIE_SECURE")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        let session_inactivity_minutes = parse_or(
            "SESSION_INACTIVITY_MINUTES",
            optional("SESSION_INACTIVITY_MINUTES"),
            30_i64,
        )?;
        if session_inactivity_minutes <= 0 {
            return Err(AppError::Validation(
                "SESSION_INACTIVITY_MINUTES must be greater than zero".to_owned(),
            ));
        }

        let default_context_policy = optional("CONTEXT_DEFAULT")
            .map(|value| DefaultContextPolicy::from_str(value.to_lowercase().as_str()))
            .transpose()?
            .unwrap_or_default();

        let approval_policy = ApprovalPolicy::new(
            ApprovalLevel::new(parse_or(
                "APPROVAL_DIVISION_MIN_LEVEL",
                optional("APPROVAL_DIVISION_MIN_LEVEL"),
                ApprovalLevel::DIVISION.as_u8(),
            )?),
            ApprovalLevel::new(parse_or(
                "APPROVAL_ORGANIZATION_MIN_LEVEL",
                optional("APPROVAL_ORGANIZATION_MIN_LEVEL"),
                ApprovalLevel::ORGANIZATION.as_u8(),
            )?),
        )?;

        let role_levels = match optional("LEGACY_ROLE_LEVELS") {
            Some(value) => LegacyRoleLevels::from_str(value.as_str())?
                .with_admin_groups(vec!["admin".to_owned()]),
            None => LegacyRoleLevels::default(),
        };
        let role_levels = match optional("ADMIN_GROUPS") {
            Some(value) => role_levels.with_admin_groups(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|group| !group.is_empty())
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>(),
            ),
            None => role_levels,
        };

        let context_event_capacity = parse_or(
            "CONTEXT_EVENT_CAPACITY",
            optional("CONTEXT_EVENT_CAPACITY"),
            256_usize,
        )?;

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            frontend_url,
            backend_base_url,
            backend_timeout,
            session_backend,
            cookie_secure,
            session_inactivity_minutes,
            default_context_policy,
            approval_policy,
            role_levels,
            context_event_capacity,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn session_ttl_seconds(&self) -> u64 {
        u64::try_from(self.session_inactivity_minutes.saturating_mul(60)).unwrap_or(u64::MAX)
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}
