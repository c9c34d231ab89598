//! BiQuad equalizer filter UGens.

use crate::synthdef::ugen;

ugen! {
    /// All-pass biquad.
    BAllPass[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        reciprocal_of_q: 1.0,
    }
}

ugen! {
    /// Band-pass biquad.
    BBandPass[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        bandwidth: 1.0,
    }
}

ugen! {
    /// Band-stop biquad.
    BBandStop[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        bandwidth: 1.0,
    }
}

ugen! {
    /// Cascaded high-cut biquad.
    BHiCut[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        order: 2.0,
        max_order: 5.0,
    }
}

ugen! {
    /// High-pass biquad.
    BHiPass[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        reciprocal_of_q: 1.0,
    }
}

ugen! {
    /// High-shelf biquad.
    BHiShelf[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        reciprocal_of_s: 1.0,
        gain: 0.0,
    }
}

ugen! {
    /// Cascaded low-cut biquad.
    BLowCut[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        order: 2.0,
        max_order: 5.0,
    }
}

ugen! {
    /// Low-pass biquad.
    BLowPass[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        reciprocal_of_q: 1.0,
    }
}

ugen! {
    /// Low-shelf biquad.
    BLowShelf[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        reciprocal_of_s: 1.0,
        gain: 0.0,
    }
}

ugen! {
    /// Parametric peaking biquad.
    BPeakEQ[ar](pure: true) {
        source: required,
        frequency: 1200.0,
        reciprocal_of_q: 1.0,
        gain: 0.0,
    }
}
