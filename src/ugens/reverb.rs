//! Reverb UGens.

use crate::synthdef::ugen;

ugen! {
    /// Schroeder-style reverb.
    FreeVerb[ar] {
        source: required,
        mix: 0.33,
        room_size: 0.5,
        damping: 0.5,
    }
}
