//! Measurement runner
//!
//! Drives one speed-test capability through a full run and converts its raw
//! throughput figures to Mbps. `run` blocks; `spawn` moves it onto a worker
//! thread and hands the outcome back over a channel.

pub mod backend;
pub mod http;

pub use backend::{BackendFactory, MeasureResult, ServerInfo, SpeedTestBackend, SpeedTestResults};
pub use http::{HttpBackendFactory, HttpBackendSettings, HttpSpeedTestBackend};

use crate::error::MeasurementError;
use crate::logging::MeasurementLogger;
use crate::models::SpeedSample;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use uuid::Uuid;

/// Message sent from a worker back to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    Finished {
        run_id: Uuid,
        outcome: Result<SpeedSample, MeasurementError>,
    },
}

/// Runs measurements through a backend factory
#[derive(Clone)]
pub struct MeasurementRunner {
    factory: Arc<dyn BackendFactory>,
    logger: Arc<MeasurementLogger>,
}

impl MeasurementRunner {
    pub fn new(factory: Arc<dyn BackendFactory>, logger: Arc<MeasurementLogger>) -> Self {
        Self { factory, logger }
    }

    /// Perform one blocking measurement
    pub fn run(&self) -> Result<SpeedSample, MeasurementError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| MeasurementError::runtime(format!("Failed to start async runtime: {}", e)))?;

        runtime.block_on(async {
            let mut backend = self.factory.create()?;

            let server = backend.best_server().await?;
            self.logger.log_server_selected(&server);

            backend.measure_download().await?;
            backend.measure_upload().await?;

            let results = backend.results();
            self.logger.log_raw_results(&results);
            Ok(SpeedSample::from_raw(results.ping, results.download, results.upload))
        })
    }

    /// Run on a fresh worker thread, reporting through `sender` and then
    /// calling `notify` so the UI can wake up and drain the channel.
    pub fn spawn<F>(&self, run_id: Uuid, sender: Sender<RunnerEvent>, notify: F) -> std::io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        let runner = self.clone();
        thread::Builder::new()
            .name(format!("speedtest-{}", run_id.simple()))
            .spawn(move || {
                runner.logger.log_run_started(run_id);
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| runner.run())).unwrap_or_else(|payload| {
                    Err(MeasurementError::runtime(format!(
                        "measurement worker panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                });
                runner.logger.log_run_finished(run_id, &outcome);

                // The receiver may be gone if the window closed mid-run
                let _ = sender.send(RunnerEvent::Finished { run_id, outcome });
                notify();
            })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
