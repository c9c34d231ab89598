//! Panning and spatialization UGens.

use crate::signal::Signal;
use crate::synthdef::{fixed, ugen};

ugen! {
    /// Equal-power balance between two channels.
    Balance2[ar, kr](outputs: fixed(2)) {
        left: required,
        right: required,
        position: 0.0,
        level: 1.0,
    }
}

ugen! {
    /// Two-channel ambisonic B-format panner.
    BiPanB2[ar, kr](outputs: fixed(3)) {
        in_a: required,
        in_b: required,
        azimuth: required,
        gain: 1.0,
    }
}

ugen! {
    /// Decode two-dimensional B-format to a speaker ring.
    multi(4) DecodeB2[ar, kr] {
        w: required,
        x: required,
        y: required,
        orientation: 0.5,
    }
}

ugen! {
    /// Two-channel equal-power panner.
    Pan2[ar, kr](outputs: fixed(2)) {
        source: required,
        position: 0.0,
        level: 1.0,
    }
}

ugen! {
    /// Four-channel equal-power panner.
    Pan4[ar, kr](outputs: fixed(4)) {
        source: required,
        x_position: 0,
        y_position: 0,
        gain: 1,
    }
}

ugen! {
    /// Azimuth panner over an arbitrary speaker ring.
    multi(1) PanAz[ar, kr] {
        source: required,
        position: 0,
        amplitude: 1,
        width: 2,
        orientation: 0.5,
    }
}

ugen! {
    /// Ambisonic B-format panner.
    PanB[ar, kr](outputs: fixed(3)) {
        source: required,
        azimuth: 0,
        elevation: 0,
        gain: 1,
    }
}

ugen! {
    /// Two-dimensional ambisonic B-format panner.
    PanB2[ar, kr](outputs: fixed(3)) {
        source: required,
        azimuth: 0,
        gain: 1,
    }
}

ugen! {
    /// Rotate a two-channel sound field.
    Rotate2[ar, kr](outputs: fixed(2)) {
        x: required,
        y: required,
        position: 0,
    }
}

ugen! {
    /// Equal-power crossfade between two inputs.
    XFade2[ar, kr](pure: true) {
        in_a: required,
        in_b: 0,
        pan: 0,
        level: 1,
    }
}

/// Spread an array of channels evenly across the stereo field.
///
/// Expands into one `Pan2` per source channel, mixed down to a stereo
/// pair, with optional equal-power level compensation.
#[derive(Debug, Clone)]
pub struct Splay {
    sources: Signal,
    spread: Signal,
    level: Signal,
    center: Signal,
    level_compensation: bool,
}

impl Splay {
    pub fn new(sources: impl Into<Signal>) -> Self {
        Splay {
            sources: sources.into(),
            spread: Signal::Const(1.0),
            level: Signal::Const(1.0),
            center: Signal::Const(0.0),
            level_compensation: true,
        }
    }

    pub fn spread(mut self, value: impl Into<Signal>) -> Self {
        self.spread = value.into();
        self
    }

    pub fn level(mut self, value: impl Into<Signal>) -> Self {
        self.level = value.into();
        self
    }

    pub fn center(mut self, value: impl Into<Signal>) -> Self {
        self.center = value.into();
        self
    }

    pub fn level_compensation(mut self, enabled: bool) -> Self {
        self.level_compensation = enabled;
        self
    }

    pub fn ar(self) -> Signal {
        let sources = super::basic::flatten_signals(self.sources);
        let count = sources.len().max(1);
        let level = if self.level_compensation {
            self.level * Signal::Const(1.0 / count as f32).sqrt()
        } else {
            self.level
        };
        let mut panned = Vec::with_capacity(count);
        for (index, source) in sources.into_iter().enumerate() {
            let position = if count == 1 {
                Signal::Const(0.0)
            } else {
                Signal::Const(index as f32 * 2.0 / (count as f32 - 1.0) - 1.0)
            };
            let position = position * self.spread.clone() + self.center.clone();
            panned.push(Pan2::new(source).position(position).ar());
        }
        super::basic::Mix::multichannel(Signal::Vector(panned), 2) * level
    }
}
