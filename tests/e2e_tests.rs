//! End-to-end scenarios through the controller with a scripted capability
//!
//! Each scenario wires a real `HistoryStore` in a temp directory, the
//! controller, presenter and chart, and swaps only the network capability.

use async_trait::async_trait;
use chrono::NaiveDate;
use speedcheck::{
    controller::RunCompletion,
    error::MeasurementError,
    logging::{LogLevel, MeasurementLogger},
    runner::{BackendFactory, MeasureResult, ServerInfo, SpeedTestBackend, SpeedTestResults},
    AppController, HistoryStore, MeasurementRecord, MeasurementRunner, SpeedSample, TrendChart,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Clone, Copy, PartialEq)]
enum Stage {
    Server,
    Download,
    Upload,
}

/// Reports fixed raw figures, optionally failing at one stage
struct ScriptedBackend {
    ping: f64,
    download_bps: f64,
    upload_bps: f64,
    fail_at: Option<Stage>,
    results: SpeedTestResults,
}

#[async_trait]
impl SpeedTestBackend for ScriptedBackend {
    async fn best_server(&mut self) -> MeasureResult<ServerInfo> {
        if self.fail_at == Some(Stage::Server) {
            return Err(MeasurementError::no_server("no servers configured"));
        }
        self.results.ping = self.ping;
        Ok(ServerInfo { url: "http://scripted.test".to_string(), latency_ms: self.ping })
    }

    async fn measure_download(&mut self) -> MeasureResult<f64> {
        if self.fail_at == Some(Stage::Download) {
            return Err(MeasurementError::transfer("connection reset during download"));
        }
        self.results.download = self.download_bps;
        Ok(self.download_bps)
    }

    async fn measure_upload(&mut self) -> MeasureResult<f64> {
        if self.fail_at == Some(Stage::Upload) {
            return Err(MeasurementError::transfer("upload rejected"));
        }
        self.results.upload = self.upload_bps;
        Ok(self.upload_bps)
    }

    fn results(&self) -> SpeedTestResults {
        self.results.clone()
    }
}

struct ScriptedFactory {
    ping: f64,
    download_bps: f64,
    upload_bps: f64,
    fail_at: Option<Stage>,
}

impl BackendFactory for ScriptedFactory {
    fn create(&self) -> MeasureResult<Box<dyn SpeedTestBackend>> {
        Ok(Box::new(ScriptedBackend {
            ping: self.ping,
            download_bps: self.download_bps,
            upload_bps: self.upload_bps,
            fail_at: self.fail_at,
            results: SpeedTestResults::default(),
        }))
    }
}

struct Harness {
    _dir: TempDir,
    store: HistoryStore,
    controller: AppController,
    log_lines: Arc<Mutex<Vec<String>>>,
}

fn harness(factory: ScriptedFactory) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::new(dir.path().join("speed_history.json"));
    let log_lines = Arc::new(Mutex::new(Vec::new()));
    let logger = Arc::new(MeasurementLogger::capturing(LogLevel::Error, log_lines.clone()));
    let runner = MeasurementRunner::new(Arc::new(factory), logger.clone());
    let controller = AppController::new(store.clone(), TrendChart::default(), runner, logger);
    Harness { _dir: dir, store, controller, log_lines }
}

fn succeeding() -> ScriptedFactory {
    ScriptedFactory { ping: 23.6, download_bps: 94_213_700.0, upload_bps: 11_250_000.0, fail_at: None }
}

fn failing_at(stage: Stage) -> ScriptedFactory {
    ScriptedFactory { fail_at: Some(stage), ..succeeding() }
}

fn run_once(h: &mut Harness) -> RunCompletion {
    assert!(h.controller.trigger(|| {}));
    h.controller.wait(Some(Duration::from_secs(10))).expect("run did not finish")
}

fn prior_record(minute: u32, down: f64, up: f64) -> MeasurementRecord {
    let at = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(9, minute, 0).unwrap();
    SpeedSample::new(20.0, down, up).into_record(at)
}

#[test]
fn test_successful_run_formats_and_records() {
    let mut h = harness(succeeding());

    let done = run_once(&mut h);
    let RunCompletion::Succeeded(record) = done else {
        panic!("expected success");
    };

    let presenter = h.controller.presenter();
    assert_eq!(presenter.ping_text(), "24 ms");
    assert_eq!(presenter.download_text(), "94.21 Mbps");
    assert_eq!(presenter.upload_text(), "11.25 Mbps");
    assert!(presenter.trigger_enabled());
    assert!(!presenter.progress_visible());

    let history = h.store.load();
    assert_eq!(history, vec![record.clone()]);
    assert_eq!(record.download_mbps(), 94.2137);
    assert_eq!(record.upload_mbps(), 11.25);
    assert_eq!(record.ping_ms(), 23.6);
}

#[test]
fn test_failure_during_upload_appends_nothing() {
    let mut h = harness(failing_at(Stage::Upload));

    let done = run_once(&mut h);
    assert_eq!(done, RunCompletion::Failed(MeasurementError::transfer("upload rejected")));

    let presenter = h.controller.presenter();
    assert_eq!(presenter.ping_text(), "-- ms");
    assert_eq!(presenter.download_text(), "Error");
    assert_eq!(presenter.upload_text(), "-- Mbps");
    assert!(presenter.trigger_enabled());

    assert!(h.store.load().is_empty());
    assert!(!h.store.path().exists());

    let lines = h.log_lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.contains("Speed test error") && l.contains("upload rejected")));
}

#[test]
fn test_every_failure_stage_shows_error() {
    for stage in [Stage::Server, Stage::Download, Stage::Upload] {
        let mut h = harness(failing_at(stage));
        assert!(matches!(run_once(&mut h), RunCompletion::Failed(_)));
        assert_eq!(h.controller.presenter().download_text(), "Error");
        assert!(h.store.load().is_empty());
    }
}

#[test]
fn test_three_prior_records_plus_one_success() {
    let mut h = harness(succeeding());
    for (minute, down) in [(0, 100.0), (1, 110.0), (2, 120.0)] {
        h.store.append(prior_record(minute, down, 10.0)).unwrap();
    }

    run_once(&mut h);

    let history = h.controller.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].download_mbps(), 100.0);
    assert_eq!(history[2].download_mbps(), 120.0);
    assert_eq!(history[3].download_mbps(), 94.2137);

    let series = h.controller.trend();
    assert_eq!(series.len(), 4);
    let downloads: Vec<f64> = series.download_points().iter().map(|p| p[1]).collect();
    assert_eq!(downloads, vec![100.0, 110.0, 120.0, 94.2137]);
    assert_eq!(series.labels()[0], "2024-06-01 09:00");
}

#[test]
fn test_empty_history_gives_empty_chart() {
    let h = harness(succeeding());
    let series = h.controller.trend();
    assert!(series.is_empty());
    assert!(series.download_points().is_empty());
    assert!(series.upload_points().is_empty());
}

#[test]
fn test_chart_windows_to_last_ten_after_many_runs() {
    let mut h = harness(succeeding());
    for minute in 0..12 {
        h.store.append(prior_record(minute, minute as f64, 1.0)).unwrap();
    }

    run_once(&mut h);

    assert_eq!(h.controller.history().len(), 13);
    let series = h.controller.trend();
    assert_eq!(series.len(), 10);
    assert_eq!(series.download_points()[0][1], 3.0);
    assert_eq!(series.download_points()[9][1], 94.2137);
}

#[test]
fn test_corrupt_history_is_replaced_on_next_success() {
    let mut h = harness(succeeding());
    std::fs::write(h.store.path(), "{ not json").unwrap();

    assert!(h.controller.history().is_empty());
    run_once(&mut h);

    assert_eq!(h.store.load().len(), 1);
}

#[test]
fn test_sequential_runs_bump_revision() {
    let mut h = harness(succeeding());
    run_once(&mut h);
    run_once(&mut h);
    assert_eq!(h.controller.history_revision(), 2);
    assert_eq!(h.store.load().len(), 2);
}
