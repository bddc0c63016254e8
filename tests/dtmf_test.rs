mod test_signals;

use std::io::Write;
use std::sync::{Arc, Mutex};

use samplefilter::audio::MemorySource;
use samplefilter::config::{FilterKind, SystemConfig};
use samplefilter::control::Command;
use samplefilter::dtmf::{DtmfAction, DtmfDetector, KeySequencer, LogIndicator, SequenceEvent};
use samplefilter::processing::{LatchActuator, SamplingLoop, TickOutcome};
use samplefilter::sampling::{ClockSource, SimulatedClock};
use samplefilter::FilterError;
use samplefilter::simulation::{measure_detection_across_snr, signal_power};

const RATE: f32 = 8000.0;
// three whole 256-sample blocks
const TONE: usize = 768;
const GAP: usize = 768;

fn detecting_loop(config: &SystemConfig) -> SamplingLoop<LatchActuator> {
    let detector = DtmfDetector::from_config(&config.detection, RATE).unwrap();
    SamplingLoop::new(config, LatchActuator::default())
        .unwrap()
        .with_detector(detector)
}

fn keyed_signal(keys: &str) -> Vec<f32> {
    let mut signal = vec![0.0; GAP];
    for key in keys.chars() {
        signal.extend(test_signals::generate::dtmf_key(key, TONE, RATE));
        signal.extend(std::iter::repeat_n(0.0, GAP));
    }
    signal
}

fn decode(sampling: &mut SamplingLoop<LatchActuator>, signal: &[f32]) -> String {
    signal
        .iter()
        .filter_map(|&x| sampling.process_sample(x).key)
        .collect()
}

#[test]
fn test_every_key_through_sampling_loop() {
    let mut sampling = detecting_loop(&SystemConfig::default());
    let keys = "123A456B789C*0#D";
    assert_eq!(decode(&mut sampling, &keyed_signal(keys)), keys);
}

#[test]
fn test_held_key_reported_once() {
    let mut sampling = detecting_loop(&SystemConfig::default());
    let mut signal = test_signals::generate::dtmf_key('5', TONE * 10, RATE);
    signal.extend(vec![0.0; GAP]);
    assert_eq!(decode(&mut sampling, &signal), "5");
}

#[test]
fn test_repeated_key_needs_a_gap() {
    let mut sampling = detecting_loop(&SystemConfig::default());
    assert_eq!(decode(&mut sampling, &keyed_signal("77")), "77");

    // back to back with no silence is one press
    let mut joined = test_signals::generate::dtmf_key('7', TONE, RATE);
    joined.extend(test_signals::generate::dtmf_key('7', TONE, RATE));
    sampling.handle_command(Command::Reset).unwrap();
    assert_eq!(decode(&mut sampling, &joined), "7");
}

#[test]
fn test_adjacent_keys_both_reported() {
    let mut sampling = detecting_loop(&SystemConfig::default());
    let mut signal = test_signals::generate::dtmf_key('1', TONE, RATE);
    signal.extend(test_signals::generate::dtmf_key('2', TONE, RATE));
    assert_eq!(decode(&mut sampling, &signal), "12");
}

#[test]
fn test_single_tone_is_not_a_key() {
    let mut sampling = detecting_loop(&SystemConfig::default());
    let signal = test_signals::generate::sine(697.0, 1.0, TONE * 4, RATE);
    assert_eq!(decode(&mut sampling, &signal), "");
}

#[test]
fn test_keys_survive_noise() {
    let mut sampling = detecting_loop(&SystemConfig::default());
    let clean = keyed_signal("*2580#");
    let noise = test_signals::noise::white_noise(clean.len(), 0.1, 21);
    let noisy: Vec<f32> = clean.iter().zip(noise.iter()).map(|(s, n)| s + n).collect();
    assert_eq!(decode(&mut sampling, &noisy), "*2580#");
}

#[test]
fn test_detection_through_fir_filter() {
    let mut config = SystemConfig::default();
    config.filter.kind = FilterKind::Fir;
    // pure delay
    config.filter.fir_taps = vec![0.0, 0.0, 1.0];
    let mut sampling = detecting_loop(&config);
    assert_eq!(decode(&mut sampling, &keyed_signal("9#")), "9#");
}

#[test]
fn test_sequence_drives_indicator() {
    let mut sampling = detecting_loop(&SystemConfig::default());
    let mut sequencer = KeySequencer::new();
    let mut indicator = LogIndicator::default();
    let mut actions = Vec::new();

    for key in decode(&mut sampling, &keyed_signal("*1#*9#")).chars() {
        if let SequenceEvent::Completed(command) = sequencer.push(key) {
            let action = DtmfAction::from_sequence(&command);
            action.execute(&mut indicator);
            actions.push(action);
        }
    }

    assert_eq!(
        actions,
        vec![DtmfAction::On, DtmfAction::Unrecognized("9".into())]
    );
    assert!(indicator.is_on());
}

#[test]
fn test_ticked_loop_reports_keys() {
    let config = SystemConfig::default();
    let mut sampling = detecting_loop(&config);
    let mut source = MemorySource::new(keyed_signal("4"));
    let clock = SimulatedClock::new(0);

    let mut keys = String::new();
    loop {
        clock.advance(125);
        match sampling.tick(clock.now_us(), &mut source) {
            TickOutcome::Sampled(report) => keys.extend(report.key),
            TickOutcome::Idle => {}
            TickOutcome::Exhausted => break,
        }
    }
    assert_eq!(keys, "4");
    assert_eq!(sampling.stats().overruns, 0);
}

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_text_commands_drive_loop() {
    let mut config = SystemConfig::default();
    config.filter.fir_taps = vec![0.25, 0.5, 0.25];
    config.capture.capacity = 4;
    config.telemetry.pause_ms = 0;
    config.telemetry.include_timestamp = false;

    let sink = SharedSink::default();
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut sampling = SamplingLoop::new(&config, LatchActuator::default())
        .unwrap()
        .with_commands(rx)
        .with_export(Box::new(sink.clone()), &config);

    for line in ["1", "c", "bogus", "DATA:1.0", "data: 0", "s"] {
        match line.parse::<Command>() {
            Ok(command) => tx.send(command).unwrap(),
            Err(e) => assert!(matches!(e, FilterError::UnknownCommand(_))),
        }
    }
    sampling.tick(0, &mut MemorySource::new(Vec::new()));

    let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    assert_eq!(
        text,
        "DATA_START\nindex,input,output\n0,1.0000,0.2500\n1,0.0000,0.5000\nDATA_END\n"
    );
}

#[test]
fn test_simulated_snr_sweep() {
    let points =
        measure_detection_across_snr("*147#", &[40.0, 20.0], &SystemConfig::default(), 12)
            .unwrap();
    assert!(points.iter().all(|p| p.correct), "{:?}", points);
    assert!(signal_power(&test_signals::generate::dtmf_key('1', 256, RATE)) > 0.2);
}
