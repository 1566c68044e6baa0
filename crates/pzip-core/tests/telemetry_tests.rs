mod support;

#[cfg(feature = "telemetry")]
mod telemetry_enabled_tests {
    use std::sync::Mutex;

    use pzip_core::telemetry::{self, tags};
    use pzip_core::{CompressionPipeline, MmapInput};

    use super::support::{TestResult, write_fixture};

    static TELEMETRY_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn records_metrics_for_a_run() -> TestResult {
        let _guard = TELEMETRY_TEST_MUTEX
            .lock()
            .expect("telemetry test lock poisoned");
        telemetry::reset();

        let dir = tempfile::tempdir()?;
        let good = write_fixture(dir.path(), "good", b"aaabbbbc")?;
        let missing = dir.path().join("missing");

        let (report, _) = CompressionPipeline::default().run(&[good, missing], Vec::new())?;
        assert_eq!(report.succeeded_count(), 1);

        let snapshot = telemetry::snapshot();
        assert_eq!(snapshot.counter(tags::METRIC_PIPELINE_RUN_COUNT), Some(1));
        assert_eq!(snapshot.counter(tags::METRIC_PIPELINE_FILES_SKIPPED), Some(1));
        assert_eq!(snapshot.counter(tags::METRIC_MMAP_OPEN_COUNT), Some(1));
        assert_eq!(snapshot.counter(tags::METRIC_MMAP_OPEN_FAIL_COUNT), Some(1));
        assert_eq!(snapshot.counter(tags::METRIC_MMAP_MAPPED_BYTES), Some(8));
        assert_eq!(snapshot.counter(tags::METRIC_SINK_EMIT_COUNT), Some(3));
        assert_eq!(snapshot.counter(tags::METRIC_WORKER_START_COUNT), Some(1));
        assert_eq!(snapshot.counter(tags::METRIC_WORKER_FINISH_COUNT), Some(1));

        let lock_wait = snapshot
            .histogram(tags::METRIC_SINK_LOCK_WAIT_US)
            .expect("lock wait histogram");
        assert_eq!(lock_wait.count, 3);
        Ok(())
    }

    #[test]
    fn reset_clears_recorded_values() -> TestResult {
        let _guard = TELEMETRY_TEST_MUTEX
            .lock()
            .expect("telemetry test lock poisoned");

        let dir = tempfile::tempdir()?;
        let path = write_fixture(dir.path(), "input", b"xyz")?;
        let _input = MmapInput::open(&path)?;
        assert!(telemetry::snapshot().counter(tags::METRIC_MMAP_OPEN_COUNT).is_some());

        telemetry::reset();
        let snapshot = telemetry::snapshot();
        assert!(snapshot.counters.is_empty());
        assert!(snapshot.histograms.is_empty());
        Ok(())
    }
}

#[cfg(not(feature = "telemetry"))]
#[test]
fn snapshot_is_empty_without_feature() {
    pzip_core::telemetry::increment_counter(pzip_core::telemetry::tags::METRIC_PIPELINE_RUN_COUNT, 1, &[]);
    assert!(pzip_core::telemetry::snapshot().counters.is_empty());
}
