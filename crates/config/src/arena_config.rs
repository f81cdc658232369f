// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{
    env, fmt,
    path::{Path, PathBuf},
};

use alloy_primitives::{address, Address};
use anyhow::{bail, Context, Result};
use arena_fhe::BfvPreset;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    load_config::{find_in_parent, resolve_config_path},
    paths::{PathsEngine, DEFAULT_CONFIG_NAME},
    validation::ValidUrl,
    yaml::load_yaml_with_env,
    Contract,
};

/// Where the first contract deployed on a fresh local chain lands.
pub const DEFAULT_LEDGER_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const DEFAULT_DECRYPTION_ADDRESS: Address =
    address!("0000000000000000000000000000000000000dec");
pub const DEFAULT_CHAIN_ID: u64 = 31337;
pub const DEFAULT_AUTHORIZATION_DAYS: u64 = 365;
pub const ENV_PREFIX: &str = "ARENA_";

/// A private key that never shows up in logs.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

/// The configuration file as written, before any path is resolved.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Name of this node. Scopes the data dir.
    pub name: String,
    /// Defaults to `.arena/data` next to a project config file or the OS data dir
    pub data_dir: Option<PathBuf>,
    pub db_file: Option<PathBuf>,
    pub chain_id: u64,
    pub contract: Contract,
    /// Verifying contract of the decryption authorization domain
    pub decryption_address: Address,
    /// The ledger function scores are submitted through
    pub submit_function: String,
    /// JSON interface description of the ledger. The bundled one is used when unset.
    pub interface_file: Option<PathBuf>,
    pub private_key: Option<SecretString>,
    /// How long a signed decryption authorization stays valid
    pub authorization_days: u64,
    pub preset: BfvPreset,
    /// Keep everything in memory instead of sled
    pub in_mem: bool,
    /// Open Telemetry collector grpc endpoint. Eg. http://127.0.0.1:4317
    pub otel: Option<String>,
    /// Set by the loader. Not meant to be written in configuration files.
    pub found_config_file: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            name: "_default".to_string(),
            data_dir: None,
            db_file: None,
            chain_id: DEFAULT_CHAIN_ID,
            contract: Contract::AddressOnly(DEFAULT_LEDGER_ADDRESS),
            decryption_address: DEFAULT_DECRYPTION_ADDRESS,
            submit_function: "submitScore".to_string(),
            interface_file: None,
            private_key: None,
            authorization_days: DEFAULT_AUTHORIZATION_DAYS,
            preset: BfvPreset::default(),
            in_mem: false,
            otel: None,
            found_config_file: None,
        }
    }
}

/// Values from the command line. Unset fields leave the configuration alone.
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_mem: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_config_file: Option<PathBuf>,
}

/// The config actually used throughout the app
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    name: String,
    paths: PathsEngine,
    chain_id: u64,
    contract: Contract,
    decryption_address: Address,
    submit_function: String,
    interface_file: Option<PathBuf>,
    private_key: Option<SecretString>,
    authorization_days: u64,
    preset: BfvPreset,
    in_mem: bool,
    otel: Option<String>,
}

impl ArenaConfig {
    pub fn try_from_file(
        file: ConfigFile,
        default_data_dir: &Path,
        default_config_dir: &Path,
        cwd: &Path,
    ) -> Result<Self> {
        if file.name.trim().is_empty() {
            bail!("The node name cannot be empty");
        }
        if file.submit_function.trim().is_empty() {
            bail!("submit_function cannot be empty");
        }
        if file.authorization_days == 0 {
            bail!("authorization_days must be at least 1");
        }
        if let Some(otel) = &file.otel {
            otel.parse::<ValidUrl>()
                .with_context(|| format!("Invalid otel endpoint '{otel}'"))?;
        }

        let paths = PathsEngine::new(
            &file.name,
            cwd,
            default_data_dir,
            default_config_dir,
            file.found_config_file.as_deref(),
            file.data_dir.as_deref(),
            file.db_file.as_deref(),
        );
        let interface_file = file
            .interface_file
            .as_deref()
            .map(|p| paths.relative_to_config(p));

        Ok(Self {
            name: file.name,
            paths,
            chain_id: file.chain_id,
            contract: file.contract,
            decryption_address: file.decryption_address,
            submit_function: file.submit_function,
            interface_file,
            private_key: file.private_key,
            authorization_days: file.authorization_days,
            preset: file.preset,
            in_mem: file.in_mem,
            otel: file.otel,
        })
    }

    /// Resolve with the OS default directories.
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        Self::try_from_file(
            file,
            &OsDirs::data_dir()?,
            &OsDirs::config_dir()?,
            &env::current_dir()?,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_file(&self) -> PathBuf {
        self.paths.config_file()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.paths.node_data_dir()
    }

    pub fn db_file(&self) -> PathBuf {
        self.paths.db_file()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn decryption_address(&self) -> Address {
        self.decryption_address
    }

    pub fn submit_function(&self) -> &str {
        &self.submit_function
    }

    pub fn interface_file(&self) -> Option<&Path> {
        self.interface_file.as_deref()
    }

    pub fn private_key(&self) -> Option<&SecretString> {
        self.private_key.as_ref()
    }

    pub fn authorization_days(&self) -> u64 {
        self.authorization_days
    }

    pub fn preset(&self) -> BfvPreset {
        self.preset
    }

    /// Use the in-memory store
    pub fn use_in_mem_store(&self) -> bool {
        self.in_mem
    }

    /// Get the open telemetry collector url
    pub fn otel(&self) -> Option<String> {
        self.otel.clone()
    }
}

/// Load configuration: defaults, then the yaml file, then `ARENA_` variables, then `overrides`.
///
/// An explicit `config_file` must exist. Without one, a missing file just means defaults.
pub fn load_config(config_file: Option<&Path>, overrides: CliOverrides) -> Result<ArenaConfig> {
    let cwd = env::current_dir()?;
    let default_config_dir = OsDirs::config_dir()?;
    let resolved = resolve_config_path(
        find_in_parent,
        &cwd,
        &default_config_dir,
        DEFAULT_CONFIG_NAME,
        config_file,
    );

    let mut figment = Figment::from(Serialized::defaults(ConfigFile::default()));
    let mut found_config_file = None;
    if config_file.is_some() || resolved.exists() {
        let yaml = load_yaml_with_env(&resolved).context("Configuration file not found")?;
        figment = figment.merge(Yaml::string(&yaml));
        found_config_file = Some(resolved);
    }
    debug!(config_file = ?found_config_file, "loading configuration");

    let overrides = CliOverrides {
        found_config_file,
        ..overrides
    };
    let file: ConfigFile = figment
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides))
        .extract()
        .context("Could not parse configuration")?;

    ArenaConfig::try_from_file(file, &OsDirs::data_dir()?, &default_config_dir, &cwd)
}

pub struct OsDirs;

impl OsDirs {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Arena may only be run on an OS that can provide a config dir. See https://docs.rs/dirs for more information.")?
            .join("arena"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        Ok(dirs::data_local_dir()
            .context("Arena may only be run on an OS that can provide a data dir. See https://docs.rs/dirs for more information.")?
            .join("arena"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn jailed_home(jail: &mut Jail) {
        let home = format!("{}", jail.directory().to_string_lossy());
        jail.set_env("HOME", &home);
        jail.set_env("XDG_CONFIG_HOME", format!("{home}/.config"));
        jail.set_env("XDG_DATA_HOME", format!("{home}/.local/share"));
    }

    #[test]
    fn test_deserialization() -> Result<()> {
        let config_str = r#"
name: "alice"
data_dir: "/mydata/arena"
chain_id: 11155111
contract:
  address: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
  deploy_block: 4242
interface_file: "./abi/ScoreLedger.json"
authorization_days: 30
preset: SECURE_SET_8192
found_config_file: "/proj/arena.config.yaml"
"#;
        let file: ConfigFile = serde_yaml::from_str(config_str)?;
        let config = ArenaConfig::try_from_file(
            file,
            Path::new("/default/data"),
            Path::new("/default/config"),
            Path::new("/my/cwd"),
        )?;

        assert_eq!(config.name(), "alice");
        assert_eq!(config.db_file(), PathBuf::from("/mydata/arena/alice/db"));
        assert_eq!(config.chain_id(), 11155111);
        assert_eq!(
            config.contract().address(),
            address!("9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0")
        );
        assert_eq!(config.contract().deploy_block(), Some(4242));
        assert_eq!(
            config.interface_file(),
            Some(Path::new("/proj/abi/ScoreLedger.json"))
        );
        assert_eq!(config.authorization_days(), 30);
        assert_eq!(config.preset(), BfvPreset::SecureSet8192);
        assert_eq!(config.submit_function(), "submitScore");
        assert!(!config.use_in_mem_store());
        Ok(())
    }

    #[test]
    fn test_validation() -> Result<()> {
        let resolve = |file: ConfigFile| {
            ArenaConfig::try_from_file(file, Path::new("/d"), Path::new("/c"), Path::new("/w"))
        };
        assert!(resolve(ConfigFile {
            authorization_days: 0,
            ..ConfigFile::default()
        })
        .is_err());
        assert!(resolve(ConfigFile {
            otel: Some("localhost:4317".into()),
            ..ConfigFile::default()
        })
        .is_err());
        assert!(resolve(ConfigFile {
            submit_function: " ".into(),
            ..ConfigFile::default()
        })
        .is_err());
        assert!(resolve(ConfigFile {
            otel: Some("http://localhost:4317".into()),
            ..ConfigFile::default()
        })
        .is_ok());
        Ok(())
    }

    #[test]
    fn test_defaults_without_a_file() {
        Jail::expect_with(|jail| {
            jailed_home(jail);
            let config =
                load_config(None, CliOverrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(config.name(), "_default");
            assert_eq!(config.chain_id(), DEFAULT_CHAIN_ID);
            assert_eq!(config.contract().address(), DEFAULT_LEDGER_ADDRESS);
            assert_eq!(config.authorization_days(), DEFAULT_AUTHORIZATION_DAYS);
            assert_eq!(
                config.config_file(),
                OsDirs::config_dir()
                    .map_err(|e| e.to_string())?
                    .join(DEFAULT_CONFIG_NAME)
            );
            assert!(config.private_key().is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config(Some(Path::new("/nope")), CliOverrides::default()) else {
            bail!("error expected");
        };
        let Some(e) = err.downcast_ref::<std::io::Error>() else {
            bail!("io error expected");
        };
        assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_project_file_env_and_overrides() {
        Jail::expect_with(|jail| {
            jailed_home(jail);
            jail.set_env("TEST_LEDGER", "0x1234567890123456789012345678901234567890");
            jail.create_file(
                DEFAULT_CONFIG_NAME,
                r#"
name: "bob"
contract: ""
chain_id: 1
private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#,
            )?;
            jail.set_env("ARENA_CHAIN_ID", "5");
            jail.set_env("ARENA_AUTHORIZATION_DAYS", "7");

            let config = load_config(
                None,
                CliOverrides {
                    in_mem: Some(true),
                    otel: Some("http://127.0.0.1:4317".into()),
                    ..CliOverrides::default()
                },
            )
            .map_err(|e| e.to_string())?;

            let dir = jail.directory().to_path_buf();
            assert_eq!(config.name(), "bob");
            assert_eq!(
                config.contract().address(),
                address!("1234567890123456789012345678901234567890")
            );
            assert_eq!(config.chain_id(), 5);
            assert_eq!(config.authorization_days(), 7);
            assert!(config.use_in_mem_store());
            assert_eq!(config.otel().as_deref(), Some("http://127.0.0.1:4317"));
            assert_eq!(config.config_file(), dir.join(DEFAULT_CONFIG_NAME));
            assert_eq!(config.db_file(), dir.join(".arena/data/bob/db"));
            assert!(config.private_key().is_some());
            assert_eq!(
                format!("{:?}", config.private_key()),
                "Some(SecretString(***))"
            );
            Ok(())
        });
    }
}
