//! Dynamic stochastic synthesis (Gendy) UGens.
//!
//! Waveforms are generated by random walks on breakpoint amplitudes and
//! durations. `knum` defaults to the control-point count when unset, so
//! these are written by hand instead of declared through `ugen!`.
//!
//! Wire orders follow `GendynUGens.cpp` `ZIN0()` indices: Gendy1 takes 10
//! inputs, Gendy2 appends the two Lehmer parameters, and Gendy3 replaces
//! the min/max frequency pair with a single frequency.

use crate::enums::CalculationRate;
use crate::signal::Signal;
use crate::synthdef::{self, UGenSpec};

macro_rules! gendy_setters {
    ($($name:ident),*) => {
        $(
            pub fn $name(mut self, value: impl Into<Signal>) -> Self {
                self.$name = value.into();
                self
            }
        )*
        pub fn knum(mut self, value: impl Into<Signal>) -> Self {
            self.knum = Some(value.into());
            self
        }
    };
}

/// Gendy generator with a frequency range.
#[derive(Debug, Clone)]
pub struct Gendy1 {
    amplitude_distribution: Signal,
    duration_distribution: Signal,
    amplitude_parameter: Signal,
    duration_parameter: Signal,
    min_frequency: Signal,
    max_frequency: Signal,
    amplitude_scale: Signal,
    duration_scale: Signal,
    init_cps: Signal,
    knum: Option<Signal>,
}

impl Gendy1 {
    const SPEC: UGenSpec = UGenSpec {
        name: "Gendy1",
        ..UGenSpec::DEFAULT
    };

    pub fn new() -> Self {
        Gendy1 {
            amplitude_distribution: Signal::Const(1.0),
            duration_distribution: Signal::Const(1.0),
            amplitude_parameter: Signal::Const(1.0),
            duration_parameter: Signal::Const(1.0),
            min_frequency: Signal::Const(440.0),
            max_frequency: Signal::Const(660.0),
            amplitude_scale: Signal::Const(0.5),
            duration_scale: Signal::Const(0.5),
            init_cps: Signal::Const(12.0),
            knum: None,
        }
    }

    gendy_setters!(
        amplitude_distribution,
        duration_distribution,
        amplitude_parameter,
        duration_parameter,
        min_frequency,
        max_frequency,
        amplitude_scale,
        duration_scale,
        init_cps
    );

    pub fn ar(self) -> Signal {
        self.construct_at(CalculationRate::Audio)
    }

    pub fn kr(self) -> Signal {
        self.construct_at(CalculationRate::Control)
    }

    fn construct_at(self, rate: CalculationRate) -> Signal {
        let knum = self.knum.unwrap_or_else(|| self.init_cps.clone());
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("amplitude_distribution", self.amplitude_distribution, false),
                ("duration_distribution", self.duration_distribution, false),
                ("amplitude_parameter", self.amplitude_parameter, false),
                ("duration_parameter", self.duration_parameter, false),
                ("min_frequency", self.min_frequency, false),
                ("max_frequency", self.max_frequency, false),
                ("amplitude_scale", self.amplitude_scale, false),
                ("duration_scale", self.duration_scale, false),
                ("init_cps", self.init_cps, false),
                ("knum", knum, false),
            ],
        )
    }
}

impl Default for Gendy1 {
    fn default() -> Self {
        Self::new()
    }
}

/// Gendy generator with Lehmer random-number parameters.
#[derive(Debug, Clone)]
pub struct Gendy2 {
    amplitude_distribution: Signal,
    duration_distribution: Signal,
    amplitude_parameter: Signal,
    duration_parameter: Signal,
    min_frequency: Signal,
    max_frequency: Signal,
    amplitude_scale: Signal,
    duration_scale: Signal,
    init_cps: Signal,
    knum: Option<Signal>,
    a: Signal,
    c: Signal,
}

impl Gendy2 {
    const SPEC: UGenSpec = UGenSpec {
        name: "Gendy2",
        ..UGenSpec::DEFAULT
    };

    pub fn new() -> Self {
        Gendy2 {
            amplitude_distribution: Signal::Const(1.0),
            duration_distribution: Signal::Const(1.0),
            amplitude_parameter: Signal::Const(1.0),
            duration_parameter: Signal::Const(1.0),
            min_frequency: Signal::Const(440.0),
            max_frequency: Signal::Const(660.0),
            amplitude_scale: Signal::Const(0.5),
            duration_scale: Signal::Const(0.5),
            init_cps: Signal::Const(12.0),
            knum: None,
            a: Signal::Const(1.17),
            c: Signal::Const(0.31),
        }
    }

    gendy_setters!(
        amplitude_distribution,
        duration_distribution,
        amplitude_parameter,
        duration_parameter,
        min_frequency,
        max_frequency,
        amplitude_scale,
        duration_scale,
        init_cps,
        a,
        c
    );

    pub fn ar(self) -> Signal {
        self.construct_at(CalculationRate::Audio)
    }

    pub fn kr(self) -> Signal {
        self.construct_at(CalculationRate::Control)
    }

    fn construct_at(self, rate: CalculationRate) -> Signal {
        let knum = self.knum.unwrap_or_else(|| self.init_cps.clone());
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("amplitude_distribution", self.amplitude_distribution, false),
                ("duration_distribution", self.duration_distribution, false),
                ("amplitude_parameter", self.amplitude_parameter, false),
                ("duration_parameter", self.duration_parameter, false),
                ("min_frequency", self.min_frequency, false),
                ("max_frequency", self.max_frequency, false),
                ("amplitude_scale", self.amplitude_scale, false),
                ("duration_scale", self.duration_scale, false),
                ("init_cps", self.init_cps, false),
                ("knum", knum, false),
                ("a", self.a, false),
                ("c", self.c, false),
            ],
        )
    }
}

impl Default for Gendy2 {
    fn default() -> Self {
        Self::new()
    }
}

/// Gendy generator with a single wrapped frequency.
#[derive(Debug, Clone)]
pub struct Gendy3 {
    amplitude_distribution: Signal,
    duration_distribution: Signal,
    amplitude_parameter: Signal,
    duration_parameter: Signal,
    frequency: Signal,
    amplitude_scale: Signal,
    duration_scale: Signal,
    init_cps: Signal,
    knum: Option<Signal>,
}

impl Gendy3 {
    const SPEC: UGenSpec = UGenSpec {
        name: "Gendy3",
        ..UGenSpec::DEFAULT
    };

    pub fn new() -> Self {
        Gendy3 {
            amplitude_distribution: Signal::Const(1.0),
            duration_distribution: Signal::Const(1.0),
            amplitude_parameter: Signal::Const(1.0),
            duration_parameter: Signal::Const(1.0),
            frequency: Signal::Const(440.0),
            amplitude_scale: Signal::Const(0.5),
            duration_scale: Signal::Const(0.5),
            init_cps: Signal::Const(12.0),
            knum: None,
        }
    }

    gendy_setters!(
        amplitude_distribution,
        duration_distribution,
        amplitude_parameter,
        duration_parameter,
        frequency,
        amplitude_scale,
        duration_scale,
        init_cps
    );

    pub fn ar(self) -> Signal {
        self.construct_at(CalculationRate::Audio)
    }

    pub fn kr(self) -> Signal {
        self.construct_at(CalculationRate::Control)
    }

    fn construct_at(self, rate: CalculationRate) -> Signal {
        let knum = self.knum.unwrap_or_else(|| self.init_cps.clone());
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("amplitude_distribution", self.amplitude_distribution, false),
                ("duration_distribution", self.duration_distribution, false),
                ("amplitude_parameter", self.amplitude_parameter, false),
                ("duration_parameter", self.duration_parameter, false),
                ("frequency", self.frequency, false),
                ("amplitude_scale", self.amplitude_scale, false),
                ("duration_scale", self.duration_scale, false),
                ("init_cps", self.init_cps, false),
                ("knum", knum, false),
            ],
        )
    }
}

impl Default for Gendy3 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::Out;

    #[test]
    fn knum_defaults_to_init_cps() {
        let builder = SynthDefBuilder::new();
        Out::new(Gendy1::new().init_cps(24.0).ar()).ar();
        let synthdef = builder.build("gendy").unwrap();
        let gendy = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "Gendy1")
            .unwrap();
        assert_eq!(gendy.inputs().len(), 10);
        // init_cps and knum share the same constant.
        assert_eq!(gendy.inputs()[8], gendy.inputs()[9]);
    }
}
