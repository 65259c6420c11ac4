use serde_json::Value;
use std::{fs, path::PathBuf};

/// # Errors
///
/// Will return `Err` if the file is not readable
pub fn check_readable_file(file: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(file);
    if !path.is_file() || fs::metadata(&path).is_err() {
        return Err(format!("The file '{file}' is not readable."));
    }
    Ok(path)
}

/// # Errors
///
/// Will return `Err` if the file is not readable or does not hold a json object
pub fn check_readable_json(file: &str) -> Result<PathBuf, String> {
    let path = check_readable_file(file)?;
    let contents =
        fs::read_to_string(&path).map_err(|e| format!("The json file '{file}' is not readable: {e}"))?;
    let json: Value =
        serde_json::from_str(&contents).map_err(|e| format!("The file '{file}' is not valid json: {e}"))?;
    if !json.is_object() {
        return Err(format!("The json file '{file}' must hold a single object."));
    }
    Ok(path)
}

/// # Errors
///
/// Will return `Err` unless the value is a whole number of seconds above zero
pub fn check_interval_secs(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("The interval must be at least one second.".to_string()),
        Ok(secs) => Ok(secs),
        Err(_) => Err(format!("'{value}' is not a number of seconds.")),
    }
}
