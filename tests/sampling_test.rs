use std::time::Duration;

use samplefilter::audio::MemorySource;
use samplefilter::config::{FilterKind, SystemConfig};
use samplefilter::processing::{LatchActuator, SamplingLoop, TickOutcome};
use samplefilter::sampling::{
    CaptureBuffer, CaptureProducer, ClockSource, OutputQuantizer, PushStatus, SampleClock,
    SimulatedClock,
};
use samplefilter::signal_processing::FilterBank;

fn smoother_config() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.filter.kind = FilterKind::Fir;
    config.filter.fir_taps = vec![0.25, 0.5, 0.25];
    config
}

#[test]
fn test_input_clamped_before_filtering() {
    let mut config = SystemConfig::default();
    config.filter.kind = FilterKind::Fir;
    config.filter.fir_taps = vec![0.5];
    let mut sampling = SamplingLoop::new(&config, LatchActuator::default()).unwrap();

    // -1000 clamps to -1.65 V, the filter halves it to -0.825 V
    let report = sampling.process_sample(-1000.0);
    assert_eq!(report.input, -1.65);
    assert_eq!(report.output, -0.825);
    // (−0.825 + 1.65) / 3.3 · 255 = 63.75, truncated
    assert_eq!(report.code, 63);
}

#[test]
fn test_quantizer_edges() {
    let quantizer = OutputQuantizer::new(0.0, 3.3, 8);
    assert_eq!(quantizer.quantize(-1.0), 0);
    assert_eq!(quantizer.quantize(0.0), 0);
    assert_eq!(quantizer.quantize(3.3), 255);
    assert_eq!(quantizer.quantize(99.0), 255);
    assert_eq!(quantizer.quantize(f32::NAN), 0);
}

#[test]
fn test_capture_seal_is_idempotent() {
    let mut capture = CaptureBuffer::new(3);
    assert_eq!(capture.push(1.0, 0.5), PushStatus::Stored);
    assert_eq!(capture.push(2.0, 1.0), PushStatus::Stored);
    assert_eq!(capture.push(3.0, 1.5), PushStatus::Sealed);

    for _ in 0..5 {
        assert_eq!(capture.push(9.0, 9.0), PushStatus::Rejected);
    }
    capture.seal();
    assert!(capture.is_sealed());
    assert_eq!(capture.raw(), &[1.0, 2.0, 3.0]);
    assert_eq!(capture.filtered(), &[0.5, 1.0, 1.5]);
}

#[test]
fn test_capture_drain_reset_drain_is_empty() {
    let mut capture = CaptureBuffer::new(4);
    capture.push(1.0, 1.0);
    capture.push(2.0, 2.0);

    let first: Vec<_> = capture.drain().collect();
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].index, 1);
    assert!(!capture.has_pending());

    capture.reset();
    assert_eq!(capture.drain().count(), 0);
    assert!(!capture.is_sealed());
    assert_eq!(capture.push(5.0, 5.0), PushStatus::Stored);
}

#[test]
fn test_clock_survives_wraparound() {
    let mut clock = SampleClock::new(125);
    let near_wrap = u32::MAX - 50;

    assert!(clock.should_sample(near_wrap));
    assert!(!clock.should_sample(near_wrap.wrapping_add(100)));
    // 125 us later, on the other side of zero
    assert!(clock.should_sample(74));
    assert!(!clock.should_sample(100));
    assert_eq!(clock.elapsed(100), 26);
}

#[test]
fn test_clock_reports_overrun() {
    let mut clock = SampleClock::new(125);
    assert!(clock.should_sample(1000));
    assert!(!clock.overran(1000 + 249));
    assert!(clock.overran(1000 + 250));
    // sampling re-anchors at the late time
    assert!(clock.should_sample(1000 + 250));
    assert!(!clock.overran(1000 + 300));
}

#[test]
fn test_loop_counts_overruns() {
    let mut sampling = SamplingLoop::new(&smoother_config(), LatchActuator::default()).unwrap();
    let mut source = MemorySource::new(vec![0.0; 10]);
    let clock = SimulatedClock::new(0);

    clock.advance(125);
    assert!(matches!(
        sampling.tick(clock.now_us(), &mut source),
        TickOutcome::Sampled(_)
    ));
    clock.advance(400);
    assert!(matches!(
        sampling.tick(clock.now_us(), &mut source),
        TickOutcome::Sampled(_)
    ));
    assert_eq!(sampling.stats().overruns, 1);
    assert_eq!(sampling.stats().samples, 2);
}

#[test]
fn test_handoff_matches_cooperative_capture() {
    let config = smoother_config();
    let input: Vec<f32> = (0..32).map(|i| ((i * 7) % 11) as f32 / 10.0 - 0.5).collect();

    let mut sampling = SamplingLoop::new(&config, LatchActuator::default()).unwrap();
    let cooperative: Vec<f32> = input
        .iter()
        .map(|&x| sampling.process_sample(x).output)
        .collect();

    let bank = FilterBank::from_config(&config).unwrap();
    let mut producer = CaptureProducer::spawn(bank, input.len()).unwrap();
    for &x in &input {
        producer.push(x).unwrap();
    }
    let buffer = producer
        .collect_timeout(Duration::from_secs(5))
        .unwrap()
        .expect("worker returned the buffer");

    assert_eq!(buffer.raw(), input.as_slice());
    assert_eq!(buffer.filtered(), cooperative.as_slice());
    producer.shutdown().unwrap();
}

#[test]
fn test_handoff_restarts_filter_per_buffer() {
    let bank = FilterBank::from_config(&smoother_config()).unwrap();
    let mut producer = CaptureProducer::spawn(bank, 2).unwrap();

    let mut outputs = Vec::new();
    for _ in 0..2 {
        producer.push(4.0).unwrap();
        producer.push(0.0).unwrap();
        let buffer = producer
            .collect_timeout(Duration::from_secs(5))
            .unwrap()
            .expect("worker returned the buffer");
        outputs.push(buffer.filtered().to_vec());
        assert!(producer.recycle(buffer));
    }
    assert_eq!(outputs[0], vec![1.0, 2.0]);
    assert_eq!(outputs[0], outputs[1]);
}
