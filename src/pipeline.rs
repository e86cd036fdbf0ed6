use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;

use serde::Serialize;
use tracing::info;

use crate::catalog::CatalogClient;
use crate::dataset::DatasetClient;
use crate::domain::DatasetDescriptor;
use crate::error::SyncError;
use crate::processor::{ProcessOutcome, Processor};
use crate::store::{Snapshot, Store};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub items: Vec<RunItem>,
    pub finished_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunItem {
    pub file_name: String,
    pub action: String,
    pub modified: Option<String>,
    pub error: Option<String>,
}

pub struct Pipeline<C: CatalogClient, D: DatasetClient> {
    store: Store,
    catalog: C,
    datasets: D,
    theme: String,
    workers: usize,
}

impl<C: CatalogClient, D: DatasetClient> Pipeline<C, D> {
    pub fn new(
        store: Store,
        catalog: C,
        datasets: D,
        theme: impl Into<String>,
        workers: usize,
    ) -> Self {
        Self {
            store,
            catalog,
            datasets,
            theme: theme.into(),
            workers: workers.max(1),
        }
    }

    /// One full run: load the prior snapshot, fetch the filtered catalog,
    /// process every descriptor on the worker pool, fold successful results
    /// into the snapshot and persist it exactly once. Catalog and snapshot
    /// errors are fatal; per-dataset failures are not.
    pub fn run(&self) -> Result<RunReport, SyncError> {
        self.store.ensure_output_root()?;
        let prior = self.store.load_snapshot()?;
        let descriptors = self.catalog.fetch_datasets(&self.theme)?;
        info!(datasets = descriptors.len(), theme = %self.theme, "catalog fetched");

        let outcomes = self.process_all(&descriptors, &prior);

        let mut snapshot = prior;
        let mut items = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                ProcessOutcome::Updated {
                    file_name,
                    modified,
                } => {
                    snapshot.insert(file_name.clone(), modified.clone());
                    items.push(RunItem {
                        file_name,
                        action: "download".to_string(),
                        modified: Some(modified),
                        error: None,
                    });
                }
                ProcessOutcome::Unchanged { file_name } => {
                    items.push(RunItem {
                        file_name,
                        action: "unchanged".to_string(),
                        modified: None,
                        error: None,
                    });
                }
                ProcessOutcome::Failed { file_name, error } => {
                    items.push(RunItem {
                        file_name,
                        action: "failed".to_string(),
                        modified: None,
                        error: Some(error.to_string()),
                    });
                }
            }
        }
        self.store.save_snapshot(&snapshot)?;

        Ok(RunReport {
            items,
            finished_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Bounded fan-out: workers pull descriptors off a shared channel and
    /// report outcomes back over a second channel to this thread. Workers
    /// never touch the snapshot; each writes only its own output file.
    fn process_all(
        &self,
        descriptors: &[DatasetDescriptor],
        prior: &Snapshot,
    ) -> Vec<ProcessOutcome> {
        if descriptors.is_empty() {
            return Vec::new();
        }

        let processor = Processor::new(&self.store, &self.datasets);
        let (job_tx, job_rx) = mpsc::channel();
        for descriptor in descriptors {
            job_tx.send(descriptor).unwrap();
        }
        drop(job_tx);
        let job_rx = Mutex::new(job_rx);

        let worker_count = self.workers.min(descriptors.len());
        let (result_tx, result_rx) = mpsc::channel();
        thread::scope(|scope| {
            for _ in 0..worker_count {
                let result_tx = result_tx.clone();
                let job_rx = &job_rx;
                let processor = &processor;
                scope.spawn(move || {
                    loop {
                        let descriptor = {
                            let receiver = job_rx.lock().unwrap();
                            match receiver.recv() {
                                Ok(descriptor) => descriptor,
                                Err(_) => break,
                            }
                        };
                        let outcome = processor.process(descriptor, prior);
                        if result_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);
            result_rx.iter().collect()
        })
    }
}
