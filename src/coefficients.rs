//! Static coefficient tables.
//!
//! Tables are plain data; lengths are part of the types so a feedforward /
//! feedback pair can never disagree. Convert to runtime coefficient sets with
//! [`IirTable::to_vecs`] or by collecting the FIR arrays.

/// Paired IIR coefficients of a fixed order
#[derive(Debug, Clone, Copy)]
pub struct IirTable<const N: usize> {
    /// Feedforward (numerator) coefficients
    pub b: [f32; N],
    /// Feedback (denominator) coefficients, `a[0]` is the divisor
    pub a: [f32; N],
}

impl<const N: usize> IirTable<N> {
    /// Filter order (one less than the number of coefficients)
    pub const fn order(&self) -> usize {
        N - 1
    }

    pub fn to_vecs(&self) -> (Vec<f64>, Vec<f64>) {
        (
            self.b.iter().map(|&c| c as f64).collect(),
            self.a.iter().map(|&c| c as f64).collect(),
        )
    }
}

/// 11-tap windowed lowpass for 1 kHz sampling
pub const LOWPASS_FIR_11: [f32; 11] = [
    0.0087, 0.0279, 0.0741, 0.1348, 0.1932, 0.2123, 0.1932, 0.1348, 0.0741, 0.0279, 0.0087,
];

/// 51-tap smoother with a dominant tap (passes most of the input)
///
/// Not symmetric: the 0.95 peak sits at index 26, one past the center, so
/// the response is not linear phase.
pub const SMOOTHING_FIR_51: [f32; 51] = [
    0.0002, 0.0005, 0.0008, 0.0012, 0.0018, 0.0025, 0.0033, 0.0042, 0.0052, 0.0063, 0.0074,
    0.0085, 0.0096, 0.0106, 0.0115, 0.0123, 0.0129, 0.0133, 0.0135, 0.0134, 0.0131, 0.0125,
    0.0116, 0.0104, 0.0089, 0.0071, 0.9500, 0.0071, 0.0089, 0.0104, 0.0116, 0.0125, 0.0131,
    0.0134, 0.0135, 0.0133, 0.0129, 0.0123, 0.0115, 0.0106, 0.0096, 0.0085, 0.0074, 0.0063,
    0.0052, 0.0042, 0.0033, 0.0025, 0.0018, 0.0012, 0.0008,
];

/// 33-tap Hamming bandpass, 200-250 Hz at 6666 Hz sampling
pub const BANDPASS_FIR_33: [f32; 33] = [
    -0.0011349724,
    -0.0013041142,
    -0.0016691340,
    -0.0021563960,
    -0.0026293532,
    -0.0029131377,
    -0.0028275073,
    -0.0022225072,
    -0.0010106533,
    0.0008100707,
    0.0031466461,
    0.0058169284,
    0.0085705196,
    0.0111215798,
    0.0131885349,
    0.0145344294,
    0.0150015002,
    0.0145344294,
    0.0131885349,
    0.0111215798,
    0.0085705196,
    0.0058169284,
    0.0031466461,
    0.0008100707,
    -0.0010106533,
    -0.0022225072,
    -0.0028275073,
    -0.0029131377,
    -0.0026293532,
    -0.0021563960,
    -0.0016691340,
    -0.0013041142,
    -0.0011349724,
];

/// 11-tap Hamming bandpass centered on the 697 Hz DTMF row tone (8 kHz)
pub const DTMF_697_FIR_11: [f32; 11] = [
    -0.02562321,
    -0.03393353,
    -0.00990209,
    0.10894631,
    0.27150666,
    0.34860540,
    0.27150666,
    0.10894631,
    -0.00990209,
    -0.03393353,
    -0.02562321,
];

/// 11-tap Hamming bandpass centered on the 1209 Hz DTMF column tone (8 kHz)
pub const DTMF_1209_FIR_11: [f32; 11] = [
    0.00104646,
    -0.04922714,
    -0.14105668,
    -0.08146032,
    0.19664735,
    0.37040013,
    0.19664735,
    -0.08146032,
    -0.14105668,
    -0.04922714,
    0.00104646,
];

/// 4th-order Butterworth lowpass, fc = 800 Hz at fs = 8 kHz
pub const BUTTERWORTH_LOWPASS_800HZ: IirTable<5> = IirTable {
    b: [0.0067, 0.0269, 0.0404, 0.0269, 0.0067],
    a: [1.0000, -2.3741, 2.3147, -1.0543, 0.1873],
};

/// 6th-order Butterworth bandpass around the 1209 Hz DTMF column tone (8 kHz)
pub const DTMF_1209_IIR: IirTable<7> = IirTable {
    b: [
        0.00000160,
        0.00000000,
        -0.00000479,
        0.00000000,
        0.00000479,
        0.00000000,
        -0.00000160,
    ],
    a: [
        1.00000000,
        -3.46512461,
        6.95536324,
        -8.36292165,
        6.84696035,
        -3.35795292,
        0.95396816,
    ],
};

/// 6th-order Butterworth bandpass around the 770 Hz DTMF row tone (8 kHz)
pub const DTMF_770_IIR: IirTable<7> = IirTable {
    b: [
        0.00000160,
        0.00000000,
        -0.00000479,
        0.00000000,
        0.00000479,
        0.00000000,
        -0.00000160,
    ],
    a: [
        1.00000000,
        -4.89741784,
        10.94802376,
        -13.99246579,
        10.77739019,
        -4.74594722,
        0.95396816,
    ],
};
