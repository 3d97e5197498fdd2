use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info};

const SCUTIL: &str = "/usr/sbin/scutil";

/// Hierarchical key/value system configuration store.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Returns whether the key is gone afterwards.
    fn remove(&mut self, key: &str) -> Result<bool>;
}

/// Dynamic store access through `scutil`, one command per invocation.
pub struct Scutil {
    program: PathBuf,
}

impl Default for Scutil {
    fn default() -> Self {
        Self {
            program: PathBuf::from(SCUTIL),
        }
    }
}

impl Scutil {
    fn run(&self, command: &str, key: &str) -> Result<String> {
        if key.contains(['\n', '\r']) {
            bail!("invalid store key {key:?}");
        }

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{command} {key}")?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            bail!(
                "{} {command} {key} failed: {}",
                self.program.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ConfigStore for Scutil {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let out = self.run("show", key)?;
        Ok(parse(&out))
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        self.run("remove", key)?;
        Ok(self.get(key)?.is_none())
    }
}

/// Parses `scutil` `show` output. `None` when the key does not exist.
pub fn parse(text: &str) -> Option<Value> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let head = lines.next()?;

    if head.contains("No such key") {
        return None;
    }

    Some(parse_value(head, &mut lines))
}

fn parse_value<'a>(head: &str, lines: &mut impl Iterator<Item = &'a str>) -> Value {
    let head = head.trim();

    if head.starts_with("<dictionary>") {
        let mut map = Map::new();
        while let Some((key, value)) = next_entry(lines) {
            map.insert(key.to_string(), parse_value(value, lines));
        }
        return Value::Object(map);
    }

    if head.starts_with("<array>") {
        let mut items = Vec::new();
        while let Some((_, value)) = next_entry(lines) {
            items.push(parse_value(value, lines));
        }
        return Value::Array(items);
    }

    match head {
        "TRUE" => Value::Bool(true),
        "FALSE" => Value::Bool(false),
        s => match s.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(s.to_string()),
        },
    }
}

/// Next `key : value` line of a block, `None` at its closing brace.
fn next_entry<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<(&'a str, &'a str)> {
    loop {
        let line = lines.next()?;
        if line == "}" {
            return None;
        }
        if let Some((key, value)) = line.split_once(" :") {
            return Some((key.trim(), value.trim()));
        }
    }
}

/// Removes each key that is present. Returns the keys removed, or that
/// would be in a dry run.
pub fn purge<S: ConfigStore>(store: &mut S, keys: &[String], dry_run: bool) -> Result<Vec<String>> {
    let mut purged = Vec::new();

    for key in keys {
        if store.get(key)?.is_none() {
            debug!(%key, "store key absent");
            continue;
        }

        if dry_run {
            info!(%key, "would delete store key");
        } else {
            info!(%key, "deleting store key");
            if !store.remove(key)? {
                bail!("store key {key} is still present after removal");
            }
        }
        purged.push(key.clone());
    }

    Ok(purged)
}

/// Interfaces listed under `root` whose link is active and that carry an
/// IPv4 configuration.
pub fn interfaces_to_cycle<S: ConfigStore>(store: &S, root: &str) -> Result<Vec<String>> {
    let Some(listing) = store.get(root)? else {
        return Ok(Vec::new());
    };

    let names: Vec<String> = listing
        .get("Interfaces")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(|n| match n {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let mut selected = Vec::new();
    for name in names {
        let active = store
            .get(&format!("{root}/{name}/Link"))?
            .and_then(|link| link.get("Active").and_then(Value::as_bool))
            .unwrap_or(false);
        let has_ipv4 = store.get(&format!("{root}/{name}/IPv4"))?.is_some();

        debug!(interface = %name, active, has_ipv4, "interface state");
        if active && has_ipv4 {
            selected.push(name);
        }
    }

    Ok(selected)
}
