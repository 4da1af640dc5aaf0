#[cfg(feature = "cli")]
pub mod cli;
pub mod env_file;
pub mod profile_file;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use env_file::load_dotenv;
pub use profile_file::load_profile;
