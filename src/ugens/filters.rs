//! Filter UGens.

use crate::synthdef::ugen;

ugen! {
    /// All-pass filter with radius control.
    APF[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        radius: 0.8,
    }
}

ugen! {
    /// Second-order band-pass filter.
    BPF[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        reciprocal_of_q: 1.0,
    }
}

ugen! {
    /// Two-zero fixed midpass filter.
    BPZ2[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Second-order band-reject filter.
    BRF[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        reciprocal_of_q: 1.0,
    }
}

ugen! {
    /// Two-zero fixed midcut filter.
    BRZ2[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Exponential decay of impulses.
    Decay[ar, kr](pure: true) {
        source: required,
        decay_time: 1.0,
    }
}

ugen! {
    /// Attack-decay envelope on impulses.
    Decay2[ar, kr](pure: true) {
        source: required,
        attack_time: 0.01,
        decay_time: 1.0,
    }
}

ugen! {
    /// Fire a done action when the source falls silent.
    DetectSilence[ar, kr] {
        source: required,
        threshold: 0.0001,
        time: 0.1,
        done_action: 0,
    }
}

ugen! {
    /// First-order section with explicit coefficients.
    FOS[ar, kr](pure: true) {
        source: required,
        a_0: 0.0,
        a_1: 0.0,
        b_1: 0.0,
    }
}

ugen! {
    /// Formant-style resonator with attack and decay.
    Formlet[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        attack_time: 1.0,
        decay_time: 1.0,
    }
}

ugen! {
    /// Second-order high-pass filter.
    HPF[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
    }
}

ugen! {
    /// One-zero high-pass filter.
    HPZ1[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Two-zero high-pass filter.
    HPZ2[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Leaky integrator.
    Integrator[ar, kr](pure: true) {
        source: required,
        coefficient: 1.0,
    }
}

ugen! {
    /// Exponential lag smoother.
    Lag[ar, kr](pure: true) {
        source: required,
        lag_time: 0.1,
    }
}

ugen! {
    /// Lag with separate up and down times.
    LagUD[ar, kr](pure: true) {
        source: required,
        lag_time_up: 0.1,
        lag_time_down: 0.1,
    }
}

ugen! {
    /// Cascade of two lags.
    Lag2[ar, kr](pure: true) {
        source: required,
        lag_time: 0.1,
    }
}

ugen! {
    /// Cascade of two up/down lags.
    Lag2UD[ar, kr](pure: true) {
        source: required,
        lag_time_up: 0.1,
        lag_time_down: 0.1,
    }
}

ugen! {
    /// Cascade of three lags.
    Lag3[ar, kr](pure: true) {
        source: required,
        lag_time: 0.1,
    }
}

ugen! {
    /// Cascade of three up/down lags.
    Lag3UD[ar, kr](pure: true) {
        source: required,
        lag_time_up: 0.1,
        lag_time_down: 0.1,
    }
}

ugen! {
    /// Remove DC offset.
    LeakDC[ar, kr](pure: true) {
        source: required,
        coefficient: 0.995,
    }
}

ugen! {
    /// Second-order low-pass filter.
    LPF[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
    }
}

ugen! {
    /// One-zero low-pass filter.
    LPZ1[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Two-zero low-pass filter.
    LPZ2[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Running median over a sliding window.
    Median[ar, kr](pure: true) {
        length: 3,
        source: required,
    }
}

ugen! {
    /// Parametric mid-band equalizer.
    MidEQ[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        reciprocal_of_q: 1.0,
        db: 0.0,
    }
}

ugen! {
    /// Moog-style 24 dB resonant low-pass ladder.
    MoogFF[ar, kr](pure: true) {
        source: required,
        frequency: 100.0,
        gain: 2.0,
        reset: 0.0,
    }
}

ugen! {
    /// One-pole filter.
    OnePole[ar, kr](pure: true) {
        source: required,
        coefficient: 0.5,
    }
}

ugen! {
    /// One-zero filter.
    OneZero[ar, kr](pure: true) {
        source: required,
        coefficient: 0.5,
    }
}

ugen! {
    /// Resonant high-pass filter.
    RHPF[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        reciprocal_of_q: 1.0,
    }
}

ugen! {
    /// Resonant low-pass filter.
    RLPF[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        reciprocal_of_q: 1.0,
    }
}

ugen! {
    /// Break a signal into linear line segments.
    Ramp[ar, kr](pure: true) {
        source: required,
        lag_time: 0.1,
    }
}

ugen! {
    /// Ringing resonator.
    Ringz[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        decay_time: 1.0,
    }
}

ugen! {
    /// Second-order section with explicit coefficients.
    SOS[ar, kr](pure: true) {
        source: required,
        a_0: 0.0,
        a_1: 0.0,
        a_2: 0.0,
        b_1: 0.0,
        b_2: 0.0,
    }
}

ugen! {
    /// Slew-rate limiter.
    Slew[ar, kr](pure: true) {
        source: required,
        up: 1.0,
        down: 1.0,
    }
}

ugen! {
    /// First-order derivative approximation.
    Slope[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Two-pole filter.
    TwoPole[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        radius: 0.8,
    }
}

ugen! {
    /// Two-zero filter.
    TwoZero[ar, kr](pure: true) {
        source: required,
        frequency: 440.0,
        radius: 0.8,
    }
}
