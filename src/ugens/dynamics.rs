//! Dynamics processing UGens.

use crate::signal::Signal;
use crate::synthdef::ugen;
use crate::ugens::delay::DelayN;

ugen! {
    /// Amplitude follower.
    Amplitude[ar, kr] {
        source: required,
        attack_time: 0.01,
        release_time: 0.01,
    }
}

ugen! {
    /// Compressor / expander / limiter / gate.
    Compander[ar] {
        source: required,
        control: 0.0,
        threshold: 0.5,
        slope_below: 1.0,
        slope_above: 1.0,
        clamp_time: 0.01,
        relax_time: 0.1,
    }
}

ugen! {
    /// Lookahead limiter.
    Limiter[ar] {
        source: required,
        level: 1.0,
        duration: 0.01,
    }
}

ugen! {
    /// Flatten dynamics toward a constant level.
    Normalizer[ar] {
        source: required,
        level: 1.0,
        duration: 0.01,
    }
}

/// `Compander` driven by a delayed copy of its own source, so the
/// detector sees the signal ahead of the processed audio.
#[derive(Debug, Clone)]
pub struct CompanderD {
    source: Signal,
    threshold: Signal,
    slope_below: Signal,
    slope_above: Signal,
    clamp_time: Signal,
    relax_time: Signal,
}

impl CompanderD {
    pub fn new(source: impl Into<Signal>) -> Self {
        CompanderD {
            source: source.into(),
            threshold: Signal::Const(0.5),
            slope_below: Signal::Const(1.0),
            slope_above: Signal::Const(1.0),
            clamp_time: Signal::Const(0.01),
            relax_time: Signal::Const(0.1),
        }
    }

    pub fn threshold(mut self, value: impl Into<Signal>) -> Self {
        self.threshold = value.into();
        self
    }

    pub fn slope_below(mut self, value: impl Into<Signal>) -> Self {
        self.slope_below = value.into();
        self
    }

    pub fn slope_above(mut self, value: impl Into<Signal>) -> Self {
        self.slope_above = value.into();
        self
    }

    pub fn clamp_time(mut self, value: impl Into<Signal>) -> Self {
        self.clamp_time = value.into();
        self
    }

    pub fn relax_time(mut self, value: impl Into<Signal>) -> Self {
        self.relax_time = value.into();
        self
    }

    pub fn ar(self) -> Signal {
        let delayed = DelayN::new(self.source.clone())
            .maximum_delay_time(self.clamp_time.clone())
            .delay_time(self.clamp_time.clone())
            .ar();
        Compander::new(delayed)
            .control(self.source)
            .threshold(self.threshold)
            .slope_below(self.slope_below)
            .slope_above(self.slope_above)
            .clamp_time(self.clamp_time)
            .relax_time(self.relax_time)
            .ar()
    }
}

#[cfg(test)]
mod tests {
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{CompanderD, Out, SinOsc};

    #[test]
    fn compander_d_inserts_a_detection_delay() {
        let builder = SynthDefBuilder::new();
        let sig = CompanderD::new(SinOsc::new().ar()).threshold(0.4).ar();
        Out::new(sig).ar();
        let synthdef = builder.build("companderd").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        assert!(names.contains(&"DelayN"));
        assert!(names.contains(&"Compander"));
        assert!(!names.contains(&"CompanderD"));
    }
}
