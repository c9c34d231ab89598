//! Band-limited oscillator UGens.

use crate::synthdef::ugen;

ugen! {
    /// Band-limited impulse oscillator with harmonic count control.
    Blip[ar, kr] {
        frequency: 440.0,
        harmonic_count: 200.0,
    }
}

ugen! {
    /// Fast fixed-frequency sine oscillator.
    FSinOsc[ar, kr] {
        frequency: 440.0,
        initial_phase: 0.0,
    }
}

ugen! {
    /// Band-limited pulse oscillator.
    Pulse[ar, kr] {
        frequency: 440.0,
        width: 0.5,
    }
}

ugen! {
    /// Band-limited sawtooth oscillator.
    Saw[ar, kr](pure: true) {
        frequency: 440.0,
    }
}
