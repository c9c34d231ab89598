//! Safety and diagnostic UGens.

use crate::synthdef::ugen;

ugen! {
    /// Report NaN, infinity, and denormals in a signal.
    CheckBadValues[ar, kr] {
        source: required,
        ugen_id: 0,
        post_mode: 2,
    }
}

ugen! {
    /// Replace NaN, infinity, and denormals with another value.
    Sanitize[ar, kr] {
        source: required,
        replace: 0.0,
    }
}
