//! Line, level, and range-mapping UGens.

use crate::signal::Signal;
use crate::synthdef::ugen;
use crate::ugens::basic::MulAdd;

ugen! {
    /// Convert an audio-rate signal to control rate.
    A2K[kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Psychoacoustic amplitude compensation.
    AmpComp[ar, kr, ir](pure: true) {
        frequency: 1000.0,
        root: 0.0,
        exp: 0.3333,
    }
}

ugen! {
    /// ANSI A-weighting amplitude compensation.
    AmpCompA[ar, kr, ir](pure: true) {
        frequency: 1000.0,
        root: 0.0,
        min_amp: 0.32,
        root_amp: 1.0,
    }
}

ugen! {
    /// Constant signal.
    DC[ar, kr](pure: true) {
        source: required,
    }
}

ugen! {
    /// Convert a control-rate signal to audio rate.
    K2A[ar](pure: true) {
        source: required,
    }
}

ugen! {
    /// Map a linear range to an exponential range.
    LinExp[ar, kr](pure: true) {
        source: required,
        input_minimum: 0,
        input_maximum: 1,
        output_minimum: 1,
        output_maximum: 2,
    }
}

ugen! {
    /// Linear ramp with a done flag.
    Line[ar, kr](has_done_flag: true) {
        start: 0.0,
        stop: 1.0,
        duration: 1.0,
        done_action: 0,
    }
}

ugen! {
    /// Exponential ramp with a done flag.
    XLine[ar, kr](has_done_flag: true) {
        start: 1.0,
        stop: 2.0,
        duration: 1.0,
        done_action: 0,
    }
}

/// Linear-to-linear range mapping pseudo-UGen.
///
/// Expands into a fused `MulAdd` of the precomputed scale and offset.
#[derive(Debug, Clone)]
pub struct LinLin {
    source: Signal,
    input_minimum: Signal,
    input_maximum: Signal,
    output_minimum: Signal,
    output_maximum: Signal,
}

impl LinLin {
    pub fn new(source: impl Into<Signal>) -> Self {
        LinLin {
            source: source.into(),
            input_minimum: Signal::Const(0.0),
            input_maximum: Signal::Const(1.0),
            output_minimum: Signal::Const(1.0),
            output_maximum: Signal::Const(2.0),
        }
    }

    pub fn input_minimum(mut self, value: impl Into<Signal>) -> Self {
        self.input_minimum = value.into();
        self
    }

    pub fn input_maximum(mut self, value: impl Into<Signal>) -> Self {
        self.input_maximum = value.into();
        self
    }

    pub fn output_minimum(mut self, value: impl Into<Signal>) -> Self {
        self.output_minimum = value.into();
        self
    }

    pub fn output_maximum(mut self, value: impl Into<Signal>) -> Self {
        self.output_maximum = value.into();
        self
    }

    pub fn ar(self) -> Signal {
        self.expand()
    }

    pub fn kr(self) -> Signal {
        self.expand()
    }

    fn expand(self) -> Signal {
        let scale = (self.output_maximum - self.output_minimum.clone())
            / (self.input_maximum - self.input_minimum.clone());
        let offset = self.output_minimum - scale.clone() * self.input_minimum;
        MulAdd::new(self.source, scale, offset)
    }
}

/// Audio-rate silence pseudo-UGen: a zero `DC` fanned out over channels.
pub struct Silence;

impl Silence {
    pub fn ar(channel_count: usize) -> Signal {
        let silence = DC::new(0.0).ar();
        if channel_count == 1 {
            return silence;
        }
        Signal::Vector(vec![silence; channel_count.max(1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{Out, SinOsc};

    #[test]
    fn linlin_expands_to_muladd() {
        let builder = SynthDefBuilder::new();
        let mapped = LinLin::new(SinOsc::new().kr())
            .input_minimum(-1.0)
            .input_maximum(1.0)
            .output_minimum(200.0)
            .output_maximum(800.0)
            .kr();
        Out::new(SinOsc::new().frequency(mapped).ar()).ar();
        let synthdef = builder.build("linlin").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        assert!(names.contains(&"MulAdd"));
        assert!(!names.contains(&"LinLin"));
    }

    #[test]
    fn silence_reuses_one_dc_node() {
        let builder = SynthDefBuilder::new();
        let silence = Silence::ar(2);
        assert_eq!(silence.channel_count(), 2);
        Out::new(silence).ar();
        let synthdef = builder.build("silence").unwrap();
        let dc_count = synthdef
            .ugens()
            .iter()
            .filter(|u| u.name() == "DC")
            .count();
        assert_eq!(dc_count, 1);
    }
}
