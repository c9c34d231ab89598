//! Oscillator UGens.

use crate::synthdef::ugen;

ugen! {
    /// Chorusing wavetable oscillator.
    COsc[ar, kr](pure: true) {
        buffer_id: required,
        frequency: 440.0,
        beats: 0.5,
    }
}

ugen! {
    /// Convert a signal to modal pitch via a scale buffer.
    DegreeToKey[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        octave: 12,
    }
}

ugen! {
    /// Non-band-limited impulse oscillator.
    Impulse[ar, kr](pure: true) {
        frequency: 440.0,
        phase: 0.0,
    }
}

ugen! {
    /// Index into a buffer with a signal.
    Index[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
    }
}

ugen! {
    /// Cubic-approximation sine oscillator.
    LFCub[ar, kr](pure: true) {
        frequency: 440.0,
        initial_phase: 0.0,
    }
}

ugen! {
    /// Gaussian function oscillator.
    LFGauss[ar, kr](pure: true) {
        duration: 1,
        width: 0.1,
        initial_phase: 0,
        looping: 1,
        done_action: 0,
    }
}

ugen! {
    /// Parabolic-approximation sine oscillator.
    LFPar[ar, kr](pure: true) {
        frequency: 440.0,
        initial_phase: 0.0,
    }
}

ugen! {
    /// Non-band-limited pulse oscillator.
    LFPulse[ar, kr](pure: true) {
        frequency: 440.0,
        initial_phase: 0.0,
        width: 0.5,
    }
}

ugen! {
    /// Non-band-limited sawtooth oscillator.
    LFSaw[ar, kr](pure: true) {
        frequency: 440.0,
        initial_phase: 0.0,
    }
}

ugen! {
    /// Non-band-limited triangle oscillator.
    LFTri[ar, kr](pure: true) {
        frequency: 440.0,
        initial_phase: 0.0,
    }
}

ugen! {
    /// Interpolating wavetable oscillator.
    Osc[ar, kr](pure: true) {
        buffer_id: required,
        frequency: 440.0,
        initial_phase: 0.0,
    }
}

ugen! {
    /// Non-interpolating wavetable oscillator.
    OscN[ar, kr](pure: true) {
        buffer_id: required,
        frequency: 440.0,
        initial_phase: 0.0,
    }
}

ugen! {
    /// Select one signal from an array by index.
    Select[ar, kr](pure: true) {
        selector: required,
        sources: unexpanded,
    }
}

ugen! {
    /// Sine oscillator.
    SinOsc[ar, kr](pure: true) {
        frequency: 440.0,
        phase: 0.0,
    }
}

ugen! {
    /// Hard-sync sawtooth oscillator.
    SyncSaw[ar, kr](pure: true) {
        sync_frequency: 440.0,
        saw_frequency: 440.0,
    }
}

ugen! {
    /// Wavetable oscillator sweeping between adjacent buffers.
    VOsc[ar, kr](pure: true) {
        buffer_id: required,
        frequency: 440.0,
        phase: 0.0,
    }
}

ugen! {
    /// Three-oscillator variant of `VOsc`.
    VOsc3[ar, kr](pure: true) {
        buffer_id: required,
        freq_1: 110.0,
        freq_2: 220.0,
        freq_3: 440.0,
    }
}

ugen! {
    /// Variable-duty sawtooth oscillator.
    VarSaw[ar, kr](pure: true) {
        frequency: 440.0,
        initial_phase: 0.0,
        width: 0.5,
    }
}

ugen! {
    /// Vibrato around a fundamental frequency.
    Vibrato[ar, kr](pure: true) {
        frequency: 440,
        rate: 6,
        depth: 0.02,
        delay: 0,
        onset: 0,
        rate_variation: 0.04,
        depth_variation: 0.1,
        initial_phase: 0,
    }
}

ugen! {
    /// Index into a buffer, wrapping out-of-range values.
    WrapIndex[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
    }
}
