pub mod errors;
pub mod eth;
pub mod relay;
pub mod server;

pub use errors::ConfigError;
pub use eth::EthConfig;
pub use relay::RelaySettings;
pub use server::ServerConfig;

/// Aggregate of every sub-config the node needs at startup, mirroring the
/// teacher's `SequencerConfig`. `config-missing` (`spec.md` §7) is raised
/// here and is fatal to the process.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub eth: EthConfig,
    pub server: ServerConfig,
    pub relay: RelaySettings,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            eth: EthConfig::from_env()?,
            server: ServerConfig::from_env()?,
            relay: RelaySettings::from_env()?,
        })
    }
}
