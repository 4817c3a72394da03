use std::time::Duration;

use etaapi::VariableType;

pub(crate) fn parse_timeout(arg: &str) -> Option<Duration> {
    match parse_duration::parse(arg) {
        Err(err) => {
            eprintln!("{:?}", err);
            None
        }
        Ok(parsed) => Some(parsed),
    }
}

pub(crate) fn valid_timeout(arg: String) -> Result<(), String> {
    parse_timeout(&arg)
        .map(|_| ())
        .ok_or_else(|| "Not a valid timeout".to_string())
}

pub(crate) fn parse_types(arg: &str) -> etaapi::Result<Vec<VariableType>> {
    arg.split(',').map(|ea| ea.trim().parse()).collect()
}

pub(crate) fn valid_types(arg: String) -> Result<(), String> {
    parse_types(&arg).map(|_| ()).map_err(|err| err.to_string())
}

/// Splits `Kessel/Zählerstände/Volllaststunden` into the top level node and
/// the path below it.
pub(crate) fn split_path(path: &str) -> Option<(&str, &str)> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return None;
    }
    match path.split_once('/') {
        Some((node, rest)) => Some((node, rest)),
        None => Some((path, "")),
    }
}

pub(crate) fn valid_path(arg: String) -> Result<(), String> {
    split_path(&arg)
        .map(|_| ())
        .ok_or_else(|| "Not a valid node path".to_string())
}
