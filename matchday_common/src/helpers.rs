use std::{env, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Reads and parses the environment variable `name`.
///
/// Returns `None` if the variable is not set, and `Some(Err(..))` carrying a printable message if it is set but cannot
/// be parsed as a `T`.
pub fn parse_env_var<T>(name: &str) -> Option<Result<T, String>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).ok()?;
    Some(raw.trim().parse::<T>().map_err(|e| format!("{raw} is not a valid value for {name}. {e}")))
}
