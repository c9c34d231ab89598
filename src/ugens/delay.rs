//! Delay line UGens.

use crate::synthdef::ugen;

ugen! {
    /// Cubic-interpolating all-pass delay.
    AllpassC[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Linear-interpolating all-pass delay.
    AllpassL[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Non-interpolating all-pass delay.
    AllpassN[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Buffer-backed cubic all-pass delay.
    BufAllpassC[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Buffer-backed linear all-pass delay.
    BufAllpassL[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Buffer-backed non-interpolating all-pass delay.
    BufAllpassN[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Buffer-backed cubic comb delay.
    BufCombC[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Buffer-backed linear comb delay.
    BufCombL[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Buffer-backed non-interpolating comb delay.
    BufCombN[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Buffer-backed cubic delay.
    BufDelayC[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
    }
}

ugen! {
    /// Buffer-backed linear delay.
    BufDelayL[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
    }
}

ugen! {
    /// Buffer-backed non-interpolating delay.
    BufDelayN[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
    }
}

ugen! {
    /// Cubic-interpolating comb delay.
    CombC[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Linear-interpolating comb delay.
    CombL[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Non-interpolating comb delay.
    CombN[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1.0,
    }
}

ugen! {
    /// Read a tap from a delay-line buffer.
    DelTapRd[ar, kr](pure: true) {
        buffer_id: required,
        phase: required,
        delay_time: 0.0,
        interpolation: 1.0,
    }
}

ugen! {
    /// Write into a delay-line buffer.
    DelTapWr[ar, kr](pure: true) {
        buffer_id: required,
        source: required,
    }
}

ugen! {
    /// Cubic-interpolating delay.
    DelayC[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
    }
}

ugen! {
    /// Linear-interpolating delay.
    DelayL[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
    }
}

ugen! {
    /// Non-interpolating delay.
    DelayN[ar, kr](pure: true) {
        source: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
    }
}

ugen! {
    /// One-sample delay.
    Delay1[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Two-sample delay.
    Delay2[ar, kr](pure: true) {
        source: required,
    }
}
