//! Bus input/output UGens.

use crate::synthdef::{fixed, ugen};

ugen! {
    /// Read from an audio or control bus.
    multi(1) In[ar, kr] {
        bus: 0.0,
    }
}

ugen! {
    /// Read from an audio bus with a one-block feedback delay.
    multi(1) InFeedback[ar, kr] {
        bus: 0.0,
    }
}

ugen! {
    /// Write to the synth-local feedback buses.
    LocalOut[ar, kr](outputs: fixed(0)) {
        source: unexpanded,
    }
}

ugen! {
    /// Sample-accurate bus output.
    OffsetOut[ar, kr](outputs: fixed(0)) {
        bus: 0,
        source: unexpanded,
    }
}

ugen! {
    /// Write (mix) to an audio or control bus.
    Out[ar, kr](outputs: fixed(0)) {
        bus: 0,
        source: unexpanded,
    }
}

ugen! {
    /// Overwrite the contents of a bus.
    ReplaceOut[ar, kr](outputs: fixed(0)) {
        bus: 0,
        source: unexpanded,
    }
}

ugen! {
    /// Crossfade between the existing bus contents and the source.
    XOut[ar, kr](outputs: fixed(0)) {
        bus: 0,
        crossfade: 0.0,
        source: unexpanded,
    }
}
