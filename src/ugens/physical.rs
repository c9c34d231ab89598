//! Physical modeling UGens.

use crate::synthdef::ugen;

ugen! {
    /// Bouncing-ball model driven by a surface signal.
    Ball[ar, kr] {
        source: required,
        gravity: 1.0,
        damping: 0.0,
        friction: 0.01,
    }
}

ugen! {
    /// Karplus-Strong plucked string.
    Pluck[ar] {
        source: required,
        trigger: required,
        maximum_delay_time: 0.2,
        delay_time: 0.2,
        decay_time: 1,
        coefficient: 0.5,
    }
}

ugen! {
    /// Spring model.
    Spring[ar, kr] {
        source: required,
        spring: 1.0,
        damping: 0.0,
    }
}

ugen! {
    /// Bouncing-ball model with trigger excitation.
    TBall[ar, kr] {
        source: required,
        gravity: 10.0,
        damping: 0.0,
        friction: 0.01,
    }
}
