//! Machine listening and analysis UGens.

use crate::enums::CalculationRate;
use crate::signal::Signal;
use crate::synthdef::{self, fixed, ugen, UGenSpec};

ugen! {
    /// Template-based beat tracker.
    BeatTrack[kr](outputs: fixed(4)) {
        pv_chain: required,
        lock: 0.0,
    }
}

ugen! {
    /// Feature-driven beat tracker.
    BeatTrack2[kr](outputs: fixed(6)) {
        bus_index: 0.0,
        feature_count: required,
        window_size: 2,
        phase_accuracy: 0.02,
        lock: 0.0,
        weighting_scheme: (-2.1),
    }
}

ugen! {
    /// Key tracker over an FFT chain.
    KeyTrack[kr] {
        pv_chain: required,
        key_decay: 2,
        chroma_leak: 0.5,
    }
}

ugen! {
    /// Perceptual loudness in sones.
    Loudness[kr] {
        pv_chain: required,
        smask: 0.25,
        tmask: 1,
    }
}

ugen! {
    /// Onset detector over an FFT chain.
    Onsets[kr] {
        pv_chain: required,
        threshold: 0.5,
        odftype: 3,
        relaxtime: 1,
        floor: 0.1,
        mingap: 10,
        medianspan: 11,
        whtype: 1,
        rawodf: 0,
    }
}

ugen! {
    /// Autocorrelation pitch follower. Outputs frequency and a clarity
    /// flag.
    Pitch[kr](outputs: fixed(2)) {
        source: required,
        initial_frequency: 440,
        min_frequency: 60,
        max_frequency: 4000,
        exec_frequency: 100,
        max_bins_per_octave: 16,
        median: 1,
        amplitude_threshold: 0.01,
        peak_threshold: 0.5,
        down_sample_factor: 1,
        clarity: 0,
    }
}

ugen! {
    /// Spectral centroid.
    SpecCentroid[kr] {
        pv_chain: required,
    }
}

ugen! {
    /// Spectral flatness.
    SpecFlatness[kr] {
        pv_chain: required,
    }
}

ugen! {
    /// Spectral percentile.
    SpecPcile[kr] {
        pv_chain: required,
        fraction: 0.5,
        interpolate: 0,
    }
}

/// Mel-frequency cepstral coefficients.
///
/// The output channel count equals the coefficient count, so the count is
/// a plain integer rather than a signal input.
#[derive(Debug, Clone)]
pub struct MFCC {
    pv_chain: Signal,
    coeff_count: u32,
}

impl MFCC {
    const SPEC: UGenSpec = UGenSpec {
        name: "MFCC",
        outputs: crate::synthdef::Outputs::Multi,
        ..UGenSpec::DEFAULT
    };

    pub fn new(pv_chain: impl Into<Signal>) -> Self {
        MFCC {
            pv_chain: pv_chain.into(),
            coeff_count: 13,
        }
    }

    pub fn coeff_count(mut self, coeff_count: u32) -> Self {
        self.coeff_count = coeff_count;
        self
    }

    pub fn kr(self) -> Signal {
        synthdef::construct(
            &Self::SPEC,
            CalculationRate::Control,
            Some(self.coeff_count),
            0,
            vec![
                ("pv_chain", self.pv_chain, false),
                ("coeff_count", Signal::Const(self.coeff_count as f32), false),
            ],
        )
    }
}
