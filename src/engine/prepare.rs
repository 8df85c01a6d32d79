//! Startup sequence for a classification run

use tracing::info;

use crate::backend::AzureLanguageBackend;
use crate::config::SentimentConfig;
use crate::dataset::load_from_config;
use crate::error::Result;
use crate::models::Record;

/// A configured client and the records it should classify
#[derive(Debug)]
pub struct PreparedRun {
    pub backend: AzureLanguageBackend,
    pub records: Vec<Record>,
}

/// Resolve credentials, build the client, then load the dataset
///
/// Nothing on disk is read or created until the credentials check out, so a
/// misconfigured run fails without touching the dataset or the results log.
pub fn prepare_run(config: &SentimentConfig) -> Result<PreparedRun> {
    let credentials = config.backend.credentials()?;
    let backend = AzureLanguageBackend::new(&credentials, &config.backend)?;

    let records = load_from_config(&config.dataset)?;
    info!(
        records = records.len(),
        dataset = %config.dataset.path.display(),
        "Run prepared"
    );

    Ok(PreparedRun { backend, records })
}
