mod test_signals;

use approx::assert_abs_diff_eq;
use samplefilter::config::{FilterKind, SystemConfig};
use samplefilter::signal_processing::{
    DesiredSignal, Filter, FilterBank, FirFilterCore, IirCoefficients, IirFilter, LmsFilter,
    ShiftRegisterFir,
};

fn filtered<F: Filter>(filter: &mut F, input: &[f32]) -> Vec<f32> {
    let mut buffer = input.to_vec();
    filter.process_buffer(&mut buffer);
    buffer
}

#[test]
fn test_fir_matches_direct_convolution() {
    let taps: Vec<f64> = (0..17).map(|i| ((i as f64) * 0.37).sin() / 8.0).collect();
    let input = test_signals::noise::white_noise(2000, 0.5, 11);

    let mut fir = FirFilterCore::new(taps.clone()).unwrap();
    let output = filtered(&mut fir, &input);
    let expected = test_signals::generate::direct_convolution(&taps, &input);

    for (i, (got, want)) in output.iter().zip(expected.iter()).enumerate() {
        assert!(
            (got - want).abs() < 1e-5,
            "sample {}: got {}, expected {}",
            i,
            got,
            want
        );
    }
}

#[test]
fn test_fir_three_tap_smoother() {
    let mut fir = FirFilterCore::new(vec![0.25, 0.5, 0.25]).unwrap();
    let output = filtered(&mut fir, &[4.0, 0.0, 0.0]);
    assert_eq!(output, vec![1.0, 2.0, 1.0]);

    // a reset filter repeats itself exactly
    fir.reset();
    assert_eq!(filtered(&mut fir, &[4.0, 0.0, 0.0]), output);
}

#[test]
fn test_shift_register_is_bit_identical() {
    let taps: Vec<f64> = (0..33).map(|i| 1.0 / (1.0 + i as f64)).collect();
    let input = test_signals::noise::white_noise(5000, 1.0, 5);

    let mut circular = FirFilterCore::new(taps.clone()).unwrap();
    let mut shifting = ShiftRegisterFir::new(taps).unwrap();

    for &x in &input {
        assert_eq!(
            circular.process(x).to_bits(),
            shifting.process(x).to_bits()
        );
    }
}

#[test]
fn test_iir_impulse_response_matches_recurrence() {
    let b = vec![0.2, 0.3, 0.1];
    let a = vec![1.0, -0.5, 0.25];
    let input = test_signals::generate::impulse(64);

    let mut iir = IirFilter::new(IirCoefficients::new(b.clone(), a.clone()).unwrap());
    let output = filtered(&mut iir, &input);
    let expected = test_signals::generate::iir_recurrence(&b, &a, &input);

    for (got, want) in output.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
    }
    assert_abs_diff_eq!(output[0], 0.2, epsilon = 1e-7);
    assert_abs_diff_eq!(output[1], 0.3 + 0.5 * 0.2, epsilon = 1e-7);
}

#[test]
fn test_iir_divides_by_leading_coefficient() {
    let b = vec![0.5, 0.25];
    let a = vec![2.0, -0.5];
    let input = test_signals::noise::white_noise(200, 0.3, 2);

    let mut iir = IirFilter::new(IirCoefficients::new(b.clone(), a.clone()).unwrap());
    let output = filtered(&mut iir, &input);
    let expected = test_signals::generate::iir_recurrence(&b, &a, &input);

    for (got, want) in output.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
    }
}

#[test]
fn test_iir_rejects_zero_leading_coefficient() {
    assert!(IirCoefficients::new(vec![1.0, 0.0], vec![0.0, 0.5]).is_err());
    assert!(IirCoefficients::new(vec![1.0], vec![1.0, 0.5]).is_err());
}

#[test]
fn test_lms_converges_to_scaled_identity() {
    let k = 0.7;
    let mut lms = LmsFilter::new(21, 0.01, DesiredSignal::ScaledInput(k)).unwrap();
    let input = test_signals::noise::white_noise(8000, 0.5, 9);

    for &x in &input {
        lms.process(x);
    }

    let weights = lms.weights();
    assert_abs_diff_eq!(weights[0], k as f64, epsilon = 0.01);
    for (i, w) in weights.iter().enumerate().skip(1) {
        assert!(w.abs() < 0.01, "weight {} = {}", i, w);
    }
    assert!(lms.last_error().abs() < 0.01);
}

#[test]
fn test_lms_tracks_external_reference() {
    let mut lms = LmsFilter::new(4, 0.05, DesiredSignal::External).unwrap();
    let input = test_signals::noise::white_noise(6000, 0.5, 4);

    // reference is the input delayed by one sample
    let mut previous = 0.0;
    for &x in &input {
        lms.process_with_reference(x, previous);
        previous = x;
    }
    assert_abs_diff_eq!(lms.weights()[1], 1.0, epsilon = 0.02);
    assert!(lms.weights()[0].abs() < 0.02);
}

#[test]
fn test_bank_unknown_id_selects_bypass() {
    let mut config = SystemConfig::default();
    config.filter.fir_taps = vec![0.25, 0.5, 0.25];
    let mut bank = FilterBank::from_config(&config).unwrap();

    assert_eq!(bank.select_id(1), FilterKind::Fir);
    assert_eq!(bank.process(4.0), 1.0);

    assert_eq!(bank.select_id(42), FilterKind::Bypass);
    assert_eq!(bank.process(0.3), 0.3);
}

#[test]
fn test_bank_switch_resets_new_filter() {
    let mut config = SystemConfig::default();
    config.filter.fir_taps = vec![0.25, 0.5, 0.25];
    let mut bank = FilterBank::from_config(&config).unwrap();

    bank.select(FilterKind::Fir);
    bank.process(4.0);
    bank.select(FilterKind::Bypass);
    bank.select(FilterKind::Fir);
    // no history from before the switch
    assert_eq!(bank.process(4.0), 1.0);
}

#[test]
fn test_bank_rejects_bad_coefficients_up_front() {
    let mut config = SystemConfig::default();
    config.filter.iir_b = vec![1.0, 0.0];
    config.filter.iir_a = vec![0.0, 1.0];
    assert!(FilterBank::from_config(&config).is_err());
}
