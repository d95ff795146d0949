// Library interface for newsverdict modules
// This allows tests and binaries to import modules

pub mod analysis;
pub mod domain;
pub mod history;
pub mod llm;
pub mod scraping;
pub mod server;
pub mod sessions;
