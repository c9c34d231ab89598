//! Hilbert transform and frequency shifting UGens.

use crate::synthdef::{fixed, ugen};

ugen! {
    /// Single-sideband frequency shifter.
    FreqShift[ar] {
        source: required,
        frequency: 0.0,
        phase: 0.0,
    }
}

ugen! {
    /// Hilbert transform: outputs the signal and its 90-degree shift.
    Hilbert[ar](outputs: fixed(2)) {
        source: required,
    }
}
