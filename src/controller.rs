//! Application state machine
//!
//! `Idle -> Running -> Idle`. The trigger is only accepted while idle; the
//! worker's outcome arrives over an mpsc channel and is applied on the thread
//! that polls, which is also the only thread that writes the history file.

use crate::chart::{TrendChart, TrendSeries};
use crate::error::MeasurementError;
use crate::history::HistoryStore;
use crate::logging::MeasurementLogger;
use crate::models::{Config, MeasurementRecord};
use crate::presenter::ResultsPresenter;
use crate::runner::{HttpBackendFactory, MeasurementRunner, RunnerEvent};
use crate::types::RunState;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use uuid::Uuid;

const WAIT_SLICE: Duration = Duration::from_millis(100);

/// How a run ended, as seen by the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum RunCompletion {
    /// The record that was shown and appended to the history
    Succeeded(MeasurementRecord),
    Failed(MeasurementError),
}

pub struct AppController {
    state: RunState,
    presenter: ResultsPresenter,
    store: HistoryStore,
    chart: TrendChart,
    runner: MeasurementRunner,
    logger: Arc<MeasurementLogger>,
    sender: Sender<RunnerEvent>,
    receiver: Receiver<RunnerEvent>,
    worker: Option<JoinHandle<()>>,
    history_revision: u64,
}

impl AppController {
    pub fn new(store: HistoryStore, chart: TrendChart, runner: MeasurementRunner, logger: Arc<MeasurementLogger>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            state: RunState::Idle,
            presenter: ResultsPresenter::new(),
            store,
            chart,
            runner,
            logger,
            sender,
            receiver,
            worker: None,
            history_revision: 0,
        }
    }

    /// Wire the HTTP capability, history file and chart window from config
    pub fn from_config(config: &Config) -> Self {
        let logger = Arc::new(MeasurementLogger::new(config));
        let factory = Arc::new(HttpBackendFactory::from_config(config));
        let runner = MeasurementRunner::new(factory, logger.clone());
        Self::new(
            HistoryStore::new(config.history_file.clone()),
            TrendChart::new(config.chart_points),
            runner,
            logger,
        )
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn presenter(&self) -> &ResultsPresenter {
        &self.presenter
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Bumped after every successful append
    pub fn history_revision(&self) -> u64 {
        self.history_revision
    }

    /// Current history; unreadable files count as empty
    pub fn history(&self) -> Vec<MeasurementRecord> {
        match self.store.try_load() {
            Ok(records) => records,
            Err(e) => {
                self.logger.log_history_unreadable(self.store.path(), &e.to_string());
                Vec::new()
            }
        }
    }

    /// Chart series for the most recent records
    pub fn trend(&self) -> TrendSeries {
        self.chart.render(&self.history())
    }

    /// Start a run. Returns false if one is already in flight or the worker
    /// could not be started.
    pub fn trigger<F>(&mut self, notify: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.state.is_running() {
            return false;
        }

        let run_id = Uuid::new_v4();
        self.presenter.show_running();

        match self.runner.spawn(run_id, self.sender.clone(), notify) {
            Ok(handle) => {
                self.worker = Some(handle);
                self.state = RunState::Running { run_id };
                true
            }
            Err(e) => {
                let err = MeasurementError::runtime(format!("Failed to start measurement thread: {}", e));
                self.logger.log_run_finished(run_id, &Err(err));
                self.presenter.show_error();
                false
            }
        }
    }

    /// Apply a finished run, if one has reported. Never blocks.
    pub fn poll(&mut self) -> Option<RunCompletion> {
        let run_id = self.state.run_id()?;

        match self.receiver.try_recv() {
            Ok(event) => self.handle_event(run_id, event),
            Err(TryRecvError::Empty) => {
                let worker_gone = self.worker.as_ref().is_some_and(|h| h.is_finished());
                if !worker_gone {
                    return None;
                }
                // The worker may have sent just before exiting
                if let Ok(event) = self.receiver.try_recv() {
                    return self.handle_event(run_id, event);
                }
                Some(self.finish(Err(MeasurementError::runtime("measurement worker exited without reporting"))))
            }
            Err(TryRecvError::Disconnected) => {
                Some(self.finish(Err(MeasurementError::runtime("measurement channel closed"))))
            }
        }
    }

    /// Block until the in-flight run completes or `timeout` elapses
    pub fn wait(&mut self, timeout: Option<Duration>) -> Option<RunCompletion> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let run_id = self.state.run_id()?;

            if let Some(done) = self.poll() {
                return Some(done);
            }

            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    WAIT_SLICE.min(deadline - now)
                }
                None => WAIT_SLICE,
            };

            match self.receiver.recv_timeout(slice) {
                Ok(event) => {
                    if let Some(done) = self.handle_event(run_id, event) {
                        return Some(done);
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Some(self.finish(Err(MeasurementError::runtime("measurement channel closed"))));
                }
            }
        }
    }

    fn handle_event(&mut self, current: Uuid, event: RunnerEvent) -> Option<RunCompletion> {
        let RunnerEvent::Finished { run_id, outcome } = event;
        if run_id != current {
            return None;
        }
        Some(self.finish(outcome))
    }

    fn finish(&mut self, outcome: Result<crate::models::SpeedSample, MeasurementError>) -> RunCompletion {
        self.state = RunState::Idle;
        self.worker = None;

        match outcome {
            Ok(sample) => {
                self.presenter.show_sample(&sample);
                let record = sample.into_record_now();

                match self.store.append(record.clone()) {
                    Ok(()) => {
                        self.history_revision += 1;
                        self.logger.log_history_appended(self.store.path(), self.history_revision);
                    }
                    Err(e) => self.logger.log_history_write_failed(self.store.path(), &e),
                }

                RunCompletion::Succeeded(record)
            }
            Err(err) => {
                self.presenter.show_error();
                RunCompletion::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use crate::runner::{BackendFactory, MeasureResult, ServerInfo, SpeedTestBackend, SpeedTestResults};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Blocks in `best_server` until released, then succeeds
    struct GatedBackend {
        gate: Arc<Mutex<mpsc::Receiver<()>>>,
        results: SpeedTestResults,
    }

    #[async_trait]
    impl SpeedTestBackend for GatedBackend {
        async fn best_server(&mut self) -> MeasureResult<ServerInfo> {
            let _ = self.gate.lock().unwrap().recv();
            self.results.ping = 9.0;
            Ok(ServerInfo { url: "http://gated".to_string(), latency_ms: 9.0 })
        }

        async fn measure_download(&mut self) -> MeasureResult<f64> {
            self.results.download = 50_000_000.0;
            Ok(self.results.download)
        }

        async fn measure_upload(&mut self) -> MeasureResult<f64> {
            self.results.upload = 5_000_000.0;
            Ok(self.results.upload)
        }

        fn results(&self) -> SpeedTestResults {
            self.results.clone()
        }
    }

    struct GatedFactory(Arc<Mutex<mpsc::Receiver<()>>>);

    impl BackendFactory for GatedFactory {
        fn create(&self) -> MeasureResult<Box<dyn SpeedTestBackend>> {
            Ok(Box::new(GatedBackend { gate: self.0.clone(), results: SpeedTestResults::default() }))
        }
    }

    fn gated_controller(dir: &TempDir) -> (AppController, mpsc::Sender<()>) {
        let (release, gate) = mpsc::channel();
        let logger = Arc::new(MeasurementLogger::quiet(LogLevel::Fatal));
        let runner = MeasurementRunner::new(Arc::new(GatedFactory(Arc::new(Mutex::new(gate)))), logger.clone());
        let store = HistoryStore::new(dir.path().join("history.json"));
        (AppController::new(store, TrendChart::default(), runner, logger), release)
    }

    #[test]
    fn test_trigger_rejected_while_running() {
        let dir = TempDir::new().unwrap();
        let (mut controller, release) = gated_controller(&dir);

        assert!(controller.trigger(|| {}));
        assert!(controller.state().is_running());
        assert!(!controller.presenter().trigger_enabled());
        assert!(!controller.trigger(|| {}));
        assert_eq!(controller.poll(), None);

        release.send(()).unwrap();
        let done = controller.wait(Some(Duration::from_secs(5))).unwrap();
        assert!(matches!(done, RunCompletion::Succeeded(_)));
        assert_eq!(controller.state(), RunState::Idle);
        assert!(controller.presenter().trigger_enabled());
        assert_eq!(controller.presenter().download_text(), "50.00 Mbps");
        assert_eq!(controller.history().len(), 1);
        assert_eq!(controller.history_revision(), 1);
    }

    #[test]
    fn test_poll_when_idle_is_noop() {
        let dir = TempDir::new().unwrap();
        let (mut controller, _release) = gated_controller(&dir);
        assert_eq!(controller.poll(), None);
        assert_eq!(controller.wait(Some(Duration::from_millis(10))), None);
    }

    #[test]
    fn test_wait_times_out_while_blocked() {
        let dir = TempDir::new().unwrap();
        let (mut controller, release) = gated_controller(&dir);

        controller.trigger(|| {});
        assert_eq!(controller.wait(Some(Duration::from_millis(150))), None);
        assert!(controller.state().is_running());

        release.send(()).unwrap();
        assert!(controller.wait(Some(Duration::from_secs(5))).is_some());
    }

    /// Succeeds until the upload stage, then panics
    struct PanickingBackend(SpeedTestResults);

    #[async_trait]
    impl SpeedTestBackend for PanickingBackend {
        async fn best_server(&mut self) -> MeasureResult<ServerInfo> {
            Ok(ServerInfo { url: "http://panicky".to_string(), latency_ms: 12.0 })
        }

        async fn measure_download(&mut self) -> MeasureResult<f64> {
            Ok(40_000_000.0)
        }

        async fn measure_upload(&mut self) -> MeasureResult<f64> {
            panic!("socket state corrupted");
        }

        fn results(&self) -> SpeedTestResults {
            self.0.clone()
        }
    }

    struct PanickingFactory;

    impl BackendFactory for PanickingFactory {
        fn create(&self) -> MeasureResult<Box<dyn SpeedTestBackend>> {
            Ok(Box::new(PanickingBackend(SpeedTestResults::default())))
        }
    }

    #[test]
    fn test_worker_panic_becomes_failed_run() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(MeasurementLogger::quiet(LogLevel::Fatal));
        let runner = MeasurementRunner::new(Arc::new(PanickingFactory), logger.clone());
        let store = HistoryStore::new(dir.path().join("history.json"));
        let mut controller = AppController::new(store.clone(), TrendChart::default(), runner, logger);

        assert!(controller.trigger(|| {}));
        let done = controller.wait(Some(Duration::from_secs(5))).unwrap();

        assert!(matches!(done, RunCompletion::Failed(MeasurementError::Runtime(_))));
        assert_eq!(controller.state(), RunState::Idle);
        assert_eq!(controller.presenter().download_text(), "Error");
        assert_eq!(controller.presenter().ping_text(), "-- ms");
        assert!(controller.presenter().trigger_enabled());
        assert!(store.load().is_empty());
        assert!(!store.path().exists());

        // The next run is accepted again
        assert!(controller.trigger(|| {}));
        assert!(controller.wait(Some(Duration::from_secs(5))).is_some());
    }

    #[test]
    fn test_trend_reads_history() {
        let dir = TempDir::new().unwrap();
        let (controller, _release) = gated_controller(&dir);
        assert!(controller.trend().is_empty());
    }
}
