pub mod config;
pub mod eip1193;

pub use config::{load_network_config, BridgeAdapterConfig, RuntimeProfile};
pub use eip1193::{BridgeCall, Eip1193Bridge};
