//! Configuration discovery and loading for the CLI

pub mod loader;

pub use loader::{load_dotenv_files, CliConfigLoader, LoadedConfig};
