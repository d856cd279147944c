use std::collections::HashMap;
use std::time::Duration;

use presensi_core::{AppError, EmployeeId, UserIdentity};
use presensi_domain::{ApprovalLevel, DefaultContextPolicy};

use super::{ApiConfig, SessionBackendConfig};

fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();

    ApiConfig::from_lookup(|name| values.get(name).cloned(), false)
}

fn identity(groups: &[&str]) -> UserIdentity {
    UserIdentity::new(EmployeeId::new(1), "budi", "Budi", None)
        .with_groups(groups.iter().map(|group| (*group).to_owned()).collect())
}

#[test]
fn defaults_apply_with_minimal_environment() {
    let config = load(&[
        ("BACKEND_BASE_URL", "https://presensi.example.test/api/"),
        ("SESSION_BACKEND", "memory"),
    ])
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(config.api_port, 3001);
    assert_eq!(config.frontend_url, "http://localhost:3000");
    assert_eq!(config.backend_timeout, Duration::from_millis(5000));
    assert_eq!(config.session_backend, SessionBackendConfig::Memory);
    assert_eq!(config.session_ttl_seconds(), 30 * 60);
    assert_eq!(config.default_context_policy, DefaultContextPolicy::Primary);
    assert!(!config.cookie_secure);
    assert!(config.role_levels.is_admin(&identity(&["admin"])));
    assert_eq!(
        config.role_levels.role_level(&identity(&["ppk"])),
        ApprovalLevel::ORGANIZATION
    );
}

#[test]
fn postgres_backend_reads_pool_size() {
    let config = load(&[
        ("BACKEND_BASE_URL", "https://presensi.example.test/"),
        ("DATABASE_URL", "postgres://presensi@localhost/presensi"),
        ("DATABASE_MAX_CONNECTIONS", "12"),
    ])
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(
        config.session_backend,
        SessionBackendConfig::Postgres {
            database_url: "postgres://presensi@localhost/presensi".to_owned(),
            max_connections: 12,
        }
    );
    assert_eq!(config.session_backend.as_str(), "postgres");
}

#[test]
fn backend_base_url_is_required() {
    let result = load(&[("SESSION_BACKEND", "memory")]);

    assert!(matches!(
        result,
        Err(AppError::Validation(ref message)) if message.contains("BACKEND_BASE_URL")
    ));
}

#[test]
fn postgres_backend_requires_database_url() {
    let result = load(&[("BACKEND_BASE_URL", "https://presensi.example.test/")]);

    assert!(matches!(
        result,
        Err(AppError::Validation(ref message)) if message.contains("DATABASE_URL")
    ));
}

#[test]
fn unknown_session_backend_is_rejected() {
    let result = load(&[
        ("BACKEND_BASE_URL", "https://presensi.example.test/"),
        ("SESSION_BACKEND", "memcached"),
    ]);

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn context_and_role_settings_are_configurable() {
    let config = load(&[
        ("BACKEND_BASE_URL", "https://presensi.example.test/"),
        ("SESSION_BACKEND", "memory"),
        ("CONTEXT_DEFAULT", "Combined"),
        ("ADMIN_GROUPS", "hrd, it_support"),
        ("LEGACY_ROLE_LEVELS", "atasan=1,direktur=3"),
    ])
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(config.default_context_policy, DefaultContextPolicy::Combined);
    assert!(config.role_levels.is_admin(&identity(&["IT_Support"])));
    assert!(!config.role_levels.is_admin(&identity(&["admin"])));
    assert_eq!(
        config.role_levels.role_level(&identity(&["direktur"])),
        ApprovalLevel::new(3)
    );
    assert_eq!(
        config.role_levels.role_level(&identity(&["supervisor"])),
        ApprovalLevel::NONE
    );
}

#[test]
fn inverted_approval_thresholds_are_rejected() {
    let result = load(&[
        ("BACKEND_BASE_URL", "https://presensi.example.test/"),
        ("SESSION_BACKEND", "memory"),
        ("APPROVAL_DIVISION_MIN_LEVEL", "3"),
        ("APPROVAL_ORGANIZATION_MIN_LEVEL", "2"),
    ]);

    assert!(matches!(result, Err(AppError::Validation(_))));
}
