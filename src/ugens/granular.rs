//! Granular synthesis UGens.

use crate::synthdef::ugen;

ugen! {
    /// Granulate a buffer.
    multi(1) GrainBuf[ar] {
        trigger: 0,
        duration: 1,
        buffer_id: required,
        rate: 1,
        position: 0,
        interpolate: 2,
        pan: 0,
        envelope_buffer_id: (-1),
        maximum_overlap: 512,
    }
}

ugen! {
    /// Granulate a live input.
    multi(1) GrainIn[ar] {
        trigger: 0,
        duration: 1,
        source: required,
        position: 0,
        envelope_buffer_id: (-1),
        maximum_overlap: 512,
    }
}

ugen! {
    /// Time-domain pitch shifter.
    PitchShift[ar] {
        source: required,
        window_size: 0.2,
        pitch_ratio: 1.0,
        pitch_dispersion: 0.0,
        time_dispersion: 0.0,
    }
}

ugen! {
    /// Warp-style granular time stretcher.
    multi(1) Warp1[ar] {
        buffer_id: 0,
        pointer: 0,
        frequency_scaling: 1,
        window_size: 0.2,
        envelope_buffer_id: (-1),
        overlaps: 8,
        window_rand_ratio: 0,
        interpolation: 1,
    }
}
