//! Support for `-c key=value` overrides.
//!
//! [`CliConfigOverrides`] can be embedded into a `clap`-derived CLI struct
//! using `#[clap(flatten)]`. Each occurrence of `-c key=value` (or
//! `--config key=value`) is collected as a raw string and converted into a
//! `(dotted.path, toml::Value)` pair on demand.

use clap::ArgAction;
use clap::Parser;
use toml::Value;

/// CLI option that captures arbitrary configuration overrides specified as
/// `-c key=value`. Both halves are kept unparsed until
/// [`CliConfigOverrides::parse_overrides`] is called.
#[derive(Parser, Debug, Default, Clone)]
pub struct CliConfigOverrides {
    /// Override a configuration value that would otherwise be loaded from
    /// `~/.autotheme/config.toml`. The `value` portion is parsed as TOML. If
    /// it fails to parse, the raw string is used as a literal.
    ///
    /// Examples:
    ///   - `-c day_preset=SolarizedLight`
    ///   - `-c day_end_hour=20`
    ///   - `-c poll_interval_secs=60`
    #[arg(
        short = 'c',
        long = "config",
        value_name = "key=value",
        action = ArgAction::Append,
        global = true,
    )]
    pub raw_overrides: Vec<String>,
}

impl CliConfigOverrides {
    /// Parse the raw strings captured from the CLI into a list of `(path,
    /// value)` tuples.
    pub fn parse_overrides(&self) -> Result<Vec<(String, Value)>, String> {
        self.raw_overrides
            .iter()
            .map(|s| {
                // Only split on the first '=' so values may contain it.
                let mut parts = s.splitn(2, '=');
                let key = match parts.next() {
                    Some(k) => k.trim(),
                    None => return Err("Override missing key".to_string()),
                };
                let value_str = parts
                    .next()
                    .ok_or_else(|| format!("Invalid override (missing '='): {s}"))?
                    .trim();

                if key.is_empty() {
                    return Err(format!("Empty key in override: {s}"));
                }

                // `-c day_preset=Nord` works without quoting.
                let value = match parse_toml_value(value_str) {
                    Some(v) => v,
                    None => Value::String(value_str.trim_matches('"').to_string()),
                };

                Ok((key.to_string(), value))
            })
            .collect()
    }
}

fn parse_toml_value(raw: &str) -> Option<Value> {
    let wrapped = format!("_x_ = {raw}");
    let mut table: toml::Table = toml::from_str(&wrapped).ok()?;
    table.remove("_x_")
}
