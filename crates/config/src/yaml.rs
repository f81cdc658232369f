// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{fs, path::Path};

use anyhow::Result;

/// Read a yaml file, substituting `${VAR}` references from the environment.
pub fn load_yaml_with_env(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)?;
    let expanded = shellexpand::env(&raw)?;
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn expands_environment_variables() {
        Jail::expect_with(|jail| {
            jail.set_env("ARENA_TEST_CHAIN", "1337");
            jail.create_file("conf.yaml", "chain_id: ${ARENA_TEST_CHAIN}\n")?;
            let loaded = load_yaml_with_env(&jail.directory().join("conf.yaml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(loaded, "chain_id: 1337\n");
            Ok(())
        });
    }
}
