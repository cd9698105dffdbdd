//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` so the operator sees
//! the whole list on one failed start.

mod helpers;


use crate::schema::NotbotConfig;
use notbot_common::ConfigError;

use helpers::{validate_range, validate_token};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &NotbotConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_irc(&mut errors, config);
    validate_watchers(&mut errors, config);
    validate_http(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_irc(errors: &mut Vec<String>, config: &NotbotConfig) {
    let irc = &config.irc;
    validate_token(errors, "irc.server", &irc.server);
    if !irc.server.is_empty() && !irc.server.contains(':') {
        errors.push(format!("irc.server = '{}' must be host:port", irc.server));
    }
    validate_token(errors, "irc.nick", &irc.nick);
    validate_token(errors, "irc.user", &irc.user);
    for channel in &irc.channels {
        validate_token(errors, "irc.channels[]", channel);
    }
}

fn validate_watchers(errors: &mut Vec<String>, config: &NotbotConfig) {
    if config.checkin.enabled {
        validate_token(errors, "checkin.channel", &config.checkin.channel);
        validate_token(errors, "checkin.api", &config.checkin.api);
        validate_range(
            errors,
            "checkin.interval_secs",
            config.checkin.interval_secs,
            1,
            3600,
        );
    }

    validate_range(
        errors,
        "jitsi.keepalive_secs",
        config.jitsi.keepalive_secs,
        1,
        300,
    );
    validate_range(
        errors,
        "jitsi.reconnect_delay_secs",
        config.jitsi.reconnect_delay_secs,
        1,
        300,
    );
    validate_range(
        errors,
        "spaceapi.interval_secs",
        config.spaceapi.interval_secs,
        1,
        3600,
    );
    for keyword in &config.spaceapi.keywords {
        validate_token(errors, "spaceapi.keywords[]", keyword);
    }
}

fn validate_http(errors: &mut Vec<String>, config: &NotbotConfig) {
    validate_range(errors, "http.timeout_secs", config.http.timeout_secs, 1, 300);
    validate_range(
        errors,
        "http.max_body_bytes",
        config.http.max_body_bytes as u64,
        1024,
        u64::MAX,
    );
}
