use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{info, warn};

use crate::dataset::DatasetClient;
use crate::domain::{DatasetDescriptor, file_name_from_url};
use crate::error::SyncError;
use crate::normalize::column_ident;
use crate::store::{Snapshot, Store};

/// Per-dataset outcome. `Unchanged` and `Failed` both leave the snapshot
/// entry alone; they stay separate variants so the report and the logs can
/// tell a clean skip from a broken download.
#[derive(Debug)]
pub enum ProcessOutcome {
    Updated { file_name: String, modified: String },
    Unchanged { file_name: String },
    Failed { file_name: String, error: SyncError },
}

pub struct Processor<'a, D: DatasetClient> {
    store: &'a Store,
    datasets: &'a D,
}

impl<'a, D: DatasetClient> Processor<'a, D> {
    pub fn new(store: &'a Store, datasets: &'a D) -> Self {
        Self { store, datasets }
    }

    /// Decide skip-vs-download for one descriptor and carry the download
    /// through. Every failure is caught here and reported as an outcome;
    /// nothing propagates across the worker-pool boundary.
    pub fn process(&self, descriptor: &DatasetDescriptor, prior: &Snapshot) -> ProcessOutcome {
        let url = match descriptor.download_url() {
            Some(url) => url,
            None => {
                let error = SyncError::MissingDownloadUrl(descriptor.title.clone());
                warn!(title = %descriptor.title, %error, "skipping dataset");
                return ProcessOutcome::Failed {
                    file_name: descriptor.title.clone(),
                    error,
                };
            }
        };
        let file_name = match file_name_from_url(url) {
            Ok(name) => name,
            Err(error) => {
                warn!(title = %descriptor.title, %error, "skipping dataset");
                return ProcessOutcome::Failed {
                    file_name: descriptor.title.clone(),
                    error,
                };
            }
        };

        let modified = descriptor.modified_stamp();
        if prior.get(&file_name).is_some_and(|seen| *seen == modified) {
            info!(file = %file_name, "unchanged, skipping");
            return ProcessOutcome::Unchanged { file_name };
        }

        info!(title = %descriptor.title, url, "downloading");
        match self.download_and_transform(url, &file_name) {
            Ok(()) => {
                info!(file = %file_name, "saved");
                ProcessOutcome::Updated {
                    file_name,
                    modified,
                }
            }
            Err(error) => {
                warn!(file = %file_name, %error, "failed to process dataset");
                ProcessOutcome::Failed { file_name, error }
            }
        }
    }

    fn download_and_transform(&self, url: &str, file_name: &str) -> Result<(), SyncError> {
        let body = self.datasets.fetch_table(url)?;
        let table = rewrite_headers(&body)?;
        Store::write_bytes_atomic(&self.store.dataset_path(file_name), &table)
    }
}

/// Rewrite the header record through the normalizer; rows pass through
/// verbatim with column order preserved. The whole table is serialized in
/// memory before anything touches the output path.
fn rewrite_headers(raw: &[u8]) -> Result<Vec<u8>, SyncError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(raw);
    let headers = reader
        .headers()
        .map_err(|err| SyncError::Table(err.to_string()))?;
    let renamed: StringRecord = headers.iter().map(column_ident).collect();

    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer
        .write_record(&renamed)
        .map_err(|err| SyncError::Table(err.to_string()))?;
    for record in reader.records() {
        let record = record.map_err(|err| SyncError::Table(err.to_string()))?;
        writer
            .write_record(&record)
            .map_err(|err| SyncError::Table(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| SyncError::Table(err.to_string()))
}
