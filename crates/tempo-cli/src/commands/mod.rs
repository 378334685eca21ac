pub mod daemon;
pub mod data;
pub mod helpers;
pub mod report;

use anyhow::Result;
use std::sync::Arc;
use tempo_core::{Classifier, Config, Reporter};
use tempo_storage::Database;

/// Open the database named by `config`
pub fn open_database(config: &Config) -> Result<Database> {
    Database::open(&config.database_path()?, config.store_busy_timeout())
}

/// Reporter over the configured database and classifier model
pub fn open_reporter(config: &Config) -> Result<Reporter> {
    let database = Arc::new(open_database(config)?);
    let classifier = Arc::new(Classifier::new(Some(config.model_path()?)));
    Ok(Reporter::new(database, classifier))
}
