//! Parsing of the `channel,source[,source2]` mapping strings.
//!
//! Mappings fan out into one watcher each, so a malformed entry must stop
//! startup rather than silently drop a watcher.

use notbot_common::ConfigError;

/// `channel,server,room`: one conference room relayed into one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JitsiMapping {
    pub channel: String,
    pub server: String,
    pub room: String,
}

/// `channel,url`: one spaceAPI endpoint relayed into one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceApiMapping {
    pub channel: String,
    pub url: String,
}

/// One spaceAPI endpoint and every channel it reports to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceApiTarget {
    pub url: String,
    pub channels: Vec<String>,
}

fn split_fields<'a>(
    kind: &'static str,
    value: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, ConfigError> {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();

    if fields.len() != expected {
        return Err(ConfigError::Mapping {
            kind,
            value: value.to_string(),
            reason: format!("expected {expected} fields, got {}", fields.len()),
        });
    }
    if let Some(pos) = fields.iter().position(|f| f.is_empty()) {
        return Err(ConfigError::Mapping {
            kind,
            value: value.to_string(),
            reason: format!("field {} is empty", pos + 1),
        });
    }
    if let Some(field) = fields.iter().find(|f| f.contains(char::is_whitespace)) {
        return Err(ConfigError::Mapping {
            kind,
            value: value.to_string(),
            reason: format!("field '{field}' contains whitespace"),
        });
    }

    Ok(fields)
}

pub fn parse_jitsi_mapping(value: &str) -> Result<JitsiMapping, ConfigError> {
    let fields = split_fields("jitsi", value, 3)?;
    Ok(JitsiMapping {
        channel: fields[0].to_string(),
        server: fields[1].to_string(),
        room: fields[2].to_string(),
    })
}

pub fn parse_spaceapi_mapping(value: &str) -> Result<SpaceApiMapping, ConfigError> {
    let fields = split_fields("spaceapi", value, 2)?;
    let url = fields[1];
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Mapping {
            kind: "spaceapi",
            value: value.to_string(),
            reason: format!("'{url}' is not an http(s) URL"),
        });
    }
    Ok(SpaceApiMapping {
        channel: fields[0].to_string(),
        url: url.to_string(),
    })
}

/// Parse every entry, failing on the first malformed one.
pub fn parse_jitsi_mappings(values: &[String]) -> Result<Vec<JitsiMapping>, ConfigError> {
    values.iter().map(|v| parse_jitsi_mapping(v)).collect()
}

/// Parse every entry and group channels by endpoint, in order of first
/// appearance. Duplicate channel entries for one endpoint collapse.
pub fn parse_spaceapi_targets(values: &[String]) -> Result<Vec<SpaceApiTarget>, ConfigError> {
    let mut targets: Vec<SpaceApiTarget> = Vec::new();

    for value in values {
        let mapping = parse_spaceapi_mapping(value)?;
        match targets.iter_mut().find(|t| t.url == mapping.url) {
            Some(target) => {
                if !target.channels.contains(&mapping.channel) {
                    target.channels.push(mapping.channel);
                }
            }
            None => targets.push(SpaceApiTarget {
                url: mapping.url,
                channels: vec![mapping.channel],
            }),
        }
    }

    Ok(targets)
}
