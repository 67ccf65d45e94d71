pub mod fs;
pub mod manager;
pub mod types;

pub use fs::{Filesystem, MemoryFilesystem, OsFilesystem};
pub use manager::{
    ConfigError, ConfigManager, FilesystemConfigManager, Transform, get_config_path,
};
pub use types::{Allowlist, AutoConnectData, Dns, PortSet, Ports, Protocol, Settings, Subnets};
