//! INI configuration for a whole logger.
//!
//! ```ini
//! # root settings
//! logg.root.level = info
//! logg.root.callfile = true
//!
//! # primary output
//! logg.appender.stdout = console
//! logg.appender.stdout.level = debug
//!
//! # further outputs, each configured under logg.appender.<name>
//! logg.appender = errors
//! logg.appender.errors = file
//! logg.appender.errors.file = logs/errors.log
//! logg.appender.errors.level = error
//! logg.appender.errors.maxsize = 1048576
//! logg.appender.errors.maxday = 7
//! ```
//!
//! Keys may also be grouped under `[section]` headers, in which case the
//! section name is prefixed to each key. Every appender's options are turned
//! into the JSON object its sink's `init` expects.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{LogError, Result};
use crate::level::Level;

const ROOT_LEVEL: &str = "logg.root.level";
const ROOT_CALLFILE: &str = "logg.root.callfile";
const APPENDER_LIST: &str = "logg.appender";
const STDOUT: &str = "stdout";

/// Flat `key = value` view of an INI file
#[derive(Debug, Default, Clone)]
pub struct IniConfig {
    values: HashMap<String, String>,
}

impl IniConfig {
    /// Read and parse an INI file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LogError::Config(format!("error reading file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse INI text
    pub fn parse(content: &str) -> Result<Self> {
        let mut values = HashMap::new();
        let mut section: Option<String> = None;

        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].trim();
                section = (!name.is_empty()).then(|| name.to_string());
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| LogError::Config(format!("line {}: expected key = value", n + 1)))?;
            let key = key.trim();
            let value = value.trim().trim_matches('"');
            let key = match &section {
                Some(section) => format!("{}.{}", section, key),
                None => key.to_string(),
            };
            values.insert(key, value.to_string());
        }

        Ok(Self { values })
    }

    /// Raw value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Comma separated list, empty entries skipped
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Boolean value; `true/false/1/0/yes/no/on/off`
    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key).map(|v| parse_bool(key, v)).transpose()
    }

    /// Every `(suffix, value)` pair for keys starting with `prefix.`
    fn options(&self, prefix: &str) -> impl Iterator<Item = (&str, &str)> {
        let dotted = format!("{}.", prefix);
        self.values.iter().filter_map(move |(k, v)| {
            k.strip_prefix(dotted.as_str())
                .filter(|rest| !rest.contains('.'))
                .map(|rest| (rest, v.as_str()))
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(LogError::Config(format!("{}: '{}' is not a boolean", key, other))),
    }
}

/// One sink to attach
#[derive(Debug, Clone, PartialEq)]
pub struct AppenderSpec {
    /// Label the sink is attached under
    pub label: String,
    /// Registry name of the sink type
    pub kind: String,
    /// JSON configuration handed to the sink's `init`
    pub config: String,
}

/// Everything an INI file says about a logger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggerConfig {
    /// Logger-wide threshold
    pub level: Option<Level>,
    /// Whether to prefix messages with `file:line`
    pub caller: Option<bool>,
    /// Sinks in attach order
    pub appenders: Vec<AppenderSpec>,
}

impl LoggerConfig {
    /// Load from an INI file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_ini(&IniConfig::load(path)?)
    }

    /// Parse INI text
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_ini(&IniConfig::parse(content)?)
    }

    /// Interpret an already parsed INI file
    pub fn from_ini(ini: &IniConfig) -> Result<Self> {
        let level: Option<Level> = ini.get(ROOT_LEVEL).map(str::parse).transpose()?;
        let caller = ini.bool(ROOT_CALLFILE)?;

        let mut names = vec![STDOUT];
        names.extend(ini.list(APPENDER_LIST).into_iter().filter(|n| *n != STDOUT));

        let mut appenders = Vec::new();
        for name in names {
            let prefix = format!("{}.{}", APPENDER_LIST, name);
            let Some(kind) = ini.get(&prefix).filter(|k| !k.is_empty()) else {
                continue;
            };
            appenders.push(AppenderSpec {
                label: name.to_string(),
                kind: kind.to_string(),
                config: sink_json(ini, &prefix)?,
            });
        }

        Ok(Self {
            level,
            caller,
            appenders,
        })
    }
}

/// Turn `prefix.*` options into the JSON object a sink's `init` expects.
fn sink_json(ini: &IniConfig, prefix: &str) -> Result<String> {
    let mut object = Map::new();
    for (key, raw) in ini.options(prefix) {
        let (name, value) = match key {
            "level" => ("level", Value::from(u8::from(raw.parse::<Level>()?))),
            "file" => ("filename", Value::from(raw)),
            "maxday" => ("maxdays", option_value(raw)),
            other => (other, option_value(raw)),
        };
        object.insert(name.to_string(), value);
    }
    if object.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(&Value::Object(object))?)
}

fn option_value(raw: &str) -> Value {
    if let Ok(flag) = parse_bool("", raw) {
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Value::from(flag);
        }
    }
    raw.parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# root
logg.root.level = info
logg.root.callfile = true

logg.appender.stdout = console
logg.appender.stdout.level = warn

logg.appender = errors, ,audit
logg.appender.errors = file
logg.appender.errors.file = "logs/errors.log"
logg.appender.errors.level = error
logg.appender.errors.maxsize = 1024
logg.appender.errors.maxday = 7
logg.appender.errors.daily = false

[logg.appender.audit]
level = debug
"#;

    #[test]
    fn test_ini_parse_sections_and_quotes() {
        let ini = IniConfig::parse(SAMPLE).unwrap();
        assert_eq!(ini.get("logg.root.level"), Some("info"));
        assert_eq!(ini.get("logg.appender.errors.file"), Some("logs/errors.log"));
        assert_eq!(ini.get("logg.appender.audit.level"), Some("debug"));
        assert_eq!(ini.list("logg.appender"), vec!["errors", "audit"]);
    }

    #[test]
    fn test_ini_rejects_garbage_line() {
        let err = IniConfig::parse("logg.root.level = info\nnonsense\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_logger_config_from_sample() {
        let config = LoggerConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.level, Some(Level::Info));
        assert_eq!(config.caller, Some(true));

        // audit has options but no kind, so it is skipped
        assert_eq!(config.appenders.len(), 2);

        let stdout = &config.appenders[0];
        assert_eq!(stdout.label, "stdout");
        assert_eq!(stdout.kind, "console");
        let json: Value = serde_json::from_str(&stdout.config).unwrap();
        assert_eq!(json["level"], 2);

        let errors = &config.appenders[1];
        assert_eq!(errors.label, "errors");
        assert_eq!(errors.kind, "file");
        let json: Value = serde_json::from_str(&errors.config).unwrap();
        assert_eq!(json["filename"], "logs/errors.log");
        assert_eq!(json["level"], 1);
        assert_eq!(json["maxsize"], 1024);
        assert_eq!(json["maxdays"], 7);
        assert_eq!(json["daily"], false);
    }

    #[test]
    fn test_console_without_options_gets_empty_config() {
        let config = LoggerConfig::parse("logg.appender.stdout = console").unwrap();
        assert_eq!(config.appenders[0].config, "");
        assert_eq!(config.level, None);
    }

    #[test]
    fn test_bad_level_name() {
        assert!(LoggerConfig::parse("logg.root.level = loud").is_err());
    }

    #[test]
    fn test_option_value_types() {
        assert_eq!(option_value("true"), Value::from(true));
        assert_eq!(option_value("0"), Value::from(0));
        assert_eq!(option_value("15"), Value::from(15));
        assert_eq!(option_value("logs/a.log"), Value::from("logs/a.log"));
    }
}
