use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const VPN_SERVICE_KEYS: [&str; 2] = [
    "State:/Network/Service/F5NetworksServicePPP/IPv4",
    "State:/Network/Service/F5NetworksServicePPP/DNS",
];

pub const INTERFACE_ROOT: &str = "State:/Network/Interface";

pub const HOSTS_FILE: &str = "/private/etc/hosts";
pub const HOSTS_BACKUP: &str = "/private/etc/.hosts.bkp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecoveryConfig {
    /// Address whose routes are always removed.
    pub sentinel: IpAddr,

    /// Configuration store keys the VPN client leaves behind.
    pub vpn_keys: Vec<String>,

    pub interface_root: String,

    pub hosts_file: PathBuf,

    pub hosts_backup: PathBuf,

    pub cycle_interfaces: bool,

    /// Fail the run when any route delete is rejected.
    pub strict: bool,

    pub dry_run: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            sentinel: IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
            vpn_keys: VPN_SERVICE_KEYS.iter().map(|k| k.to_string()).collect(),
            interface_root: INTERFACE_ROOT.to_string(),
            hosts_file: PathBuf::from(HOSTS_FILE),
            hosts_backup: PathBuf::from(HOSTS_BACKUP),
            cycle_interfaces: true,
            strict: false,
            dry_run: false,
        }
    }
}

impl RecoveryConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        json.parse()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn write(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json).map_err(|e| anyhow::anyhow!(e))
    }
}

impl FromStr for RecoveryConfig {
    type Err = anyhow::Error;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RecoveryConfig::default();

        assert_eq!(config.sentinel.to_string(), "1.1.1.1");
        assert_eq!(config.vpn_keys.len(), 2);
        assert!(config.vpn_keys[1].ends_with("/DNS"));
        assert_eq!(config.hosts_backup, Path::new("/private/etc/.hosts.bkp"));
        assert!(config.cycle_interfaces);
        assert!(!config.strict);
        assert!(!config.dry_run);
    }

    #[test]
    fn config_from_partial_json() {
        let json = r#"{"sentinel":"203.0.113.9","strict":true}"#;
        let config: RecoveryConfig = json.parse().unwrap();

        assert_eq!(config.sentinel.to_string(), "203.0.113.9");
        assert!(config.strict);
        assert_eq!(config.interface_root, INTERFACE_ROOT);
        assert_eq!(config.hosts_file, Path::new(HOSTS_FILE));
    }

    #[test]
    fn config_rejects_bad_sentinel() {
        assert!(r#"{"sentinel":"not-an-address"}"#
            .parse::<RecoveryConfig>()
            .is_err());
    }

    #[test]
    fn write_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etc/netrecover.json");

        let config = RecoveryConfig {
            dry_run: true,
            vpn_keys: vec!["State:/Network/Service/utun3/IPv4".to_string()],
            ..Default::default()
        };
        config.write(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains(r#""dryRun": true"#));
        assert!(json.contains(r#""cycleInterfaces": true"#));

        assert_eq!(RecoveryConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecoveryConfig::load(dir.path().join("absent.json")).unwrap_err();

        assert!(err.to_string().contains("absent.json"));
    }
}
