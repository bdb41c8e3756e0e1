//! Configuration surface: catalogue file loading and startup environment
//! variables.

pub mod catalogue_loader;
pub mod env;

pub use catalogue_loader::load_catalogue;
pub use env::StartupEnv;
