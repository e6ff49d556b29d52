use config::{Config, ConfigError, File};
use serde::Deserialize;

/// Blockchain transport and aggregator configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RpcSettings {
    /// HTTP JSON-RPC endpoint.
    pub endpoint: String,
    /// Address of the deployed multicall aggregator contract.
    pub multicall_address: String,
    /// Upper bound on calls bundled into one aggregator invocation. The
    /// aggregator contract and the transport both impose practical
    /// payload limits.
    #[serde(default = "default_chunk_capacity")]
    pub chunk_capacity: usize,
}

fn default_chunk_capacity() -> usize {
    2000
}

/// Farm contract configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct FarmSettings {
    /// Address of the MasterChef-style farm contract.
    pub address: String,
    /// Pool ids excluded from every listing (known-defunct pools).
    #[serde(default = "default_dead_pools")]
    pub dead_pools: Vec<u64>,
}

fn default_dead_pools() -> Vec<u64> {
    vec![331, 369]
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup and immutable thereafter.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub rpc: RpcSettings,
    pub farm: FarmSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn minimal_config_gets_defaults() {
        let yaml = r#"
rpc:
  endpoint: "https://bsc-dataseed.binance.org"
  multicall_address: "0x1ee38d535d541c55c9dae27b12edf090c608e6fb"
farm:
  address: "0x0895196562c7868c5be92459fae7f877ed450452"
"#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.rpc.chunk_capacity, 2000);
        assert_eq!(settings.farm.dead_pools, vec![331, 369]);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let yaml = r#"
rpc:
  endpoint: "http://localhost:8545"
  multicall_address: "0x1ee38d535d541c55c9dae27b12edf090c608e6fb"
  chunk_capacity: 50
farm:
  address: "0x0895196562c7868c5be92459fae7f877ed450452"
  dead_pools: [1, 2, 3]
"#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.rpc.chunk_capacity, 50);
        assert_eq!(settings.farm.dead_pools, vec![1, 2, 3]);
    }
}
