use common::{get_or_default, AppResult};
use config::{Config, ConfigError, Map, Value, ValueKind};
use data_processing::ProcessorSettings;

pub const DEFAULT_BUFFER: usize = 100;

/// Runtime configuration of the data processor binary
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessorAppConfig {
    /// Capacity of the channel between the reader and the processor
    pub input_buffer: usize,
    /// Capacity of the channel between the processor and the writer
    pub output_buffer: usize,
    /// Handed to the processor unchanged
    pub settings: ProcessorSettings,
}

impl ProcessorAppConfig {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            input_buffer: get_or_default(config, "input_buffer", DEFAULT_BUFFER)?.max(1),
            output_buffer: get_or_default(config, "output_buffer", DEFAULT_BUFFER)?.max(1),
            settings: settings_from(config)?,
        })
    }
}

/// Reads the `settings` table. Nested tables, such as those produced by
/// `SETTINGS__A__B`, become dotted keys (`a.b`).
fn settings_from(config: &Config) -> AppResult<ProcessorSettings> {
    let table = match config.get_table("settings") {
        Ok(table) => table,
        Err(ConfigError::NotFound(_)) => return Ok(ProcessorSettings::default()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    flatten_table(None, table, &mut entries)?;
    Ok(entries.into_iter().collect())
}

fn flatten_table(prefix: Option<&str>, table: Map<String, Value>, entries: &mut Vec<(String, String)>) -> AppResult<()> {
    for (key, value) in table {
        let key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key,
        };
        match value.kind {
            ValueKind::Table(nested) => flatten_table(Some(&key), nested, entries)?,
            _ => entries.push((key, value.into_string()?)),
        }
    }
    Ok(())
}
