//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Usernames must be valid POSIX login names
//! - Timezones must be non-empty relative tz database names
//! - Package and service names must be non-empty words not starting with `-`
//! - Firewall rules must be `<port>[/tcp|/udp]`
//! - fail2ban times must be `<n>[smhdw]` and allow at least one retry

use crate::config::schema::RunContext;
use crate::error::{HostprepError, Result};
use regex::Regex;
use std::sync::LazyLock;

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("valid username regex"));

static FIREWALL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,5})(/(tcp|udp))?$").expect("valid rule regex"));

static BAN_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[smhdw]?$").expect("valid duration regex"));

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Config field the error refers to
    pub field: String,
}

impl ValidationError {
    fn new(rule: &str, field: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            field: field.to_string(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(ctx: &RunContext) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_username(ctx));
    errors.extend(validate_timezone(ctx));
    errors.extend(validate_names("packages", &ctx.packages));
    errors.extend(validate_names("services", &ctx.services));
    errors.extend(validate_firewall(ctx));

    for (field, value) in [
        ("fail2ban.bantime", &ctx.fail2ban.bantime),
        ("fail2ban.findtime", &ctx.fail2ban.findtime),
    ] {
        if !BAN_DURATION.is_match(value) {
            errors.push(ValidationError::new(
                "invalid-duration",
                field,
                format!(
                    "{} '{}' must be a number with an optional s/m/h/d/w unit",
                    field,
                    value.escape_debug()
                ),
            ));
        }
    }

    if ctx.fail2ban.maxretry == 0 {
        errors.push(ValidationError::new(
            "invalid-maxretry",
            "fail2ban.maxretry",
            "fail2ban.maxretry must be at least 1".to_string(),
        ));
    }

    errors
}

fn validate_username(ctx: &RunContext) -> Vec<ValidationError> {
    if USERNAME.is_match(&ctx.username) {
        return Vec::new();
    }
    vec![ValidationError::new(
        "invalid-username",
        "username",
        format!(
            "Username '{}' must start with a lowercase letter or underscore and contain only [a-z0-9_-] (max 32)",
            ctx.username
        ),
    )]
}

fn validate_timezone(ctx: &RunContext) -> Vec<ValidationError> {
    let tz = ctx.timezone.as_str();
    if tz.trim().is_empty() {
        return vec![ValidationError::new(
            "invalid-timezone",
            "timezone",
            "Timezone must not be empty".to_string(),
        )];
    }
    let malformed = tz.trim() != tz
        || tz.starts_with('/')
        || tz.split('/').any(|part| part == ".." || part.is_empty());
    if malformed {
        return vec![ValidationError::new(
            "invalid-timezone",
            "timezone",
            format!("Timezone '{}' is not a tz database name", ctx.timezone),
        )];
    }
    Vec::new()
}

fn validate_names(field: &str, names: &[String]) -> Vec<ValidationError> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            name.trim().is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace)
        })
        .map(|(idx, name)| {
            ValidationError::new(
                "invalid-name",
                field,
                format!("{}[{}] '{}' is not a valid name", field, idx, name),
            )
        })
        .collect()
}

fn validate_firewall(ctx: &RunContext) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for rule in &ctx.firewall.allow {
        let port = FIREWALL_RULE
            .captures(rule)
            .and_then(|caps| caps[1].parse::<u32>().ok());

        match port {
            Some(p) if (1..=65535).contains(&p) => {}
            _ => errors.push(ValidationError::new(
                "invalid-firewall-rule",
                "firewall.allow",
                format!(
                    "Firewall rule '{}' must be <port>[/tcp|/udp] with port 1-65535",
                    rule
                ),
            )),
        }
    }

    errors
}

/// Validate configuration, returning the first error as a Result.
pub fn validate(ctx: &RunContext) -> Result<()> {
    let errors = validate_config(ctx);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(HostprepError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
