//! Envelope breakpoint data and the `EnvGen` UGen.
//!
//! An [`Envelope`] is pure data: breakpoint amplitudes, segment durations,
//! and interpolation curves. [`Envelope::serialize`] flattens it into the
//! signal tuple that `EnvGen` consumes as its trailing variadic input:
//!
//! `[a0, N-1, release_node | -99, loop_node | -99,
//!   a1, d0, shape0, curve0, a2, d1, shape1, curve1, ...]`

use crate::compiler::CompileError;
use crate::enums::{CalculationRate, EnvelopeShape};
use crate::signal::Signal;
use crate::synthdef::{self, UGenSpec};

/// Interpolation of one envelope segment: a symbolic shape, or a numeric
/// curvature (positive bends late, negative bends early).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Shape(EnvelopeShape),
    Value(f32),
}

impl Curve {
    fn shape_code(&self) -> f32 {
        match self {
            Curve::Shape(shape) => *shape as i32 as f32,
            Curve::Value(_) => EnvelopeShape::Custom as i32 as f32,
        }
    }

    fn curvature(&self) -> f32 {
        match self {
            Curve::Shape(_) => 0.0,
            Curve::Value(value) => *value,
        }
    }
}

impl From<EnvelopeShape> for Curve {
    fn from(shape: EnvelopeShape) -> Self {
        Curve::Shape(shape)
    }
}

impl From<f32> for Curve {
    fn from(value: f32) -> Self {
        Curve::Value(value)
    }
}

/// A breakpoint envelope specification for `EnvGen`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    amplitudes: Vec<Signal>,
    durations: Vec<Signal>,
    curves: Vec<Curve>,
    release_node: Option<usize>,
    loop_node: Option<usize>,
}

impl Envelope {
    /// Build an envelope from breakpoints. `durations` must have exactly
    /// one entry fewer than `amplitudes`; `curves` are cycled across the
    /// segments (an empty list means linear).
    pub fn new(
        amplitudes: Vec<Signal>,
        durations: Vec<Signal>,
        curves: Vec<Curve>,
    ) -> Result<Self, CompileError> {
        if amplitudes.len() < 2 || durations.len() != amplitudes.len() - 1 {
            return Err(CompileError::EnvelopeMismatch {
                amplitudes: amplitudes.len(),
                durations: durations.len(),
            });
        }
        let curves = if curves.is_empty() {
            vec![Curve::Shape(EnvelopeShape::Linear)]
        } else {
            curves
        };
        Ok(Envelope {
            amplitudes,
            durations,
            curves,
            release_node: None,
            loop_node: None,
        })
    }

    /// Mark the breakpoint at which the envelope sustains until gate
    /// release.
    pub fn release_node(mut self, node: usize) -> Self {
        self.release_node = Some(node);
        self
    }

    /// Mark the breakpoint to loop back to while sustaining.
    pub fn loop_node(mut self, node: usize) -> Self {
        self.loop_node = Some(node);
        self
    }

    /// Attack-decay-sustain-release envelope with a release node.
    pub fn adsr(attack_time: f32, decay_time: f32, sustain: f32, release_time: f32) -> Envelope {
        Envelope {
            amplitudes: vec![
                Signal::Const(0.0),
                Signal::Const(1.0),
                Signal::Const(sustain),
                Signal::Const(0.0),
            ],
            durations: vec![
                Signal::Const(attack_time),
                Signal::Const(decay_time),
                Signal::Const(release_time),
            ],
            curves: vec![Curve::Value(-4.0)],
            release_node: Some(2),
            loop_node: None,
        }
    }

    /// Attack-sustain-release envelope with a release node.
    pub fn asr(attack_time: f32, sustain: f32, release_time: f32) -> Envelope {
        Envelope {
            amplitudes: vec![
                Signal::Const(0.0),
                Signal::Const(sustain),
                Signal::Const(0.0),
            ],
            durations: vec![Signal::Const(attack_time), Signal::Const(release_time)],
            curves: vec![Curve::Value(-4.0)],
            release_node: Some(1),
            loop_node: None,
        }
    }

    /// Attack-sustain-release trapezoid without a gate.
    pub fn linen(attack_time: f32, sustain_time: f32, release_time: f32, level: f32) -> Envelope {
        Envelope {
            amplitudes: vec![
                Signal::Const(0.0),
                Signal::Const(level),
                Signal::Const(level),
                Signal::Const(0.0),
            ],
            durations: vec![
                Signal::Const(attack_time),
                Signal::Const(sustain_time),
                Signal::Const(release_time),
            ],
            curves: vec![Curve::Shape(EnvelopeShape::Linear)],
            release_node: None,
            loop_node: None,
        }
    }

    /// Percussive attack-release envelope.
    pub fn percussive(attack_time: f32, release_time: f32) -> Envelope {
        Envelope {
            amplitudes: vec![
                Signal::Const(0.0),
                Signal::Const(1.0),
                Signal::Const(0.0),
            ],
            durations: vec![Signal::Const(attack_time), Signal::Const(release_time)],
            curves: vec![Curve::Shape(EnvelopeShape::Linear)],
            release_node: None,
            loop_node: None,
        }
    }

    /// Symmetric rise-fall triangle over `duration` seconds.
    pub fn triangle(duration: f32, amplitude: f32) -> Envelope {
        let half = duration / 2.0;
        Envelope {
            amplitudes: vec![
                Signal::Const(0.0),
                Signal::Const(amplitude),
                Signal::Const(0.0),
            ],
            durations: vec![Signal::Const(half), Signal::Const(half)],
            curves: vec![Curve::Shape(EnvelopeShape::Linear)],
            release_node: None,
            loop_node: None,
        }
    }

    fn segment_count(&self) -> usize {
        self.amplitudes.len() - 1
    }

    /// Flatten into the signal tuple consumed by `EnvGen`.
    pub fn serialize(&self) -> Signal {
        let mut values: Vec<Signal> = Vec::with_capacity(4 + self.segment_count() * 4);
        values.push(self.amplitudes[0].clone());
        values.push(Signal::Const(self.segment_count() as f32));
        values.push(Signal::Const(
            self.release_node.map(|node| node as f32).unwrap_or(-99.0),
        ));
        values.push(Signal::Const(
            self.loop_node.map(|node| node as f32).unwrap_or(-99.0),
        ));
        for segment in 0..self.segment_count() {
            let curve = self.curves[segment % self.curves.len()];
            values.push(self.amplitudes[segment + 1].clone());
            values.push(self.durations[segment].clone());
            values.push(Signal::Const(curve.shape_code()));
            values.push(Signal::Const(curve.curvature()));
        }
        Signal::Vector(values)
    }

    /// Total duration, as a signal expression.
    pub fn duration(&self) -> Signal {
        self.durations
            .iter()
            .fold(Signal::Const(0.0), |acc, duration| acc + duration.clone())
    }
}

impl From<&Envelope> for Signal {
    fn from(envelope: &Envelope) -> Self {
        envelope.serialize()
    }
}

impl From<Envelope> for Signal {
    fn from(envelope: Envelope) -> Self {
        envelope.serialize()
    }
}

/// Envelope generator.
///
/// ```
/// use magnon::{DoneAction, Envelope, SynthDefBuilder};
/// use magnon::envelope::EnvGen;
/// use magnon::ugens::{Out, SinOsc};
///
/// let builder = SynthDefBuilder::new();
/// let env = EnvGen::new(Envelope::percussive(0.01, 1.0))
///     .done_action(DoneAction::FreeSynth)
///     .kr();
/// Out::new(SinOsc::new().ar() * env).ar();
/// let synthdef = builder.build("ping").unwrap();
/// # assert!(synthdef.compile().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EnvGen {
    gate: Signal,
    level_scale: Signal,
    level_bias: Signal,
    time_scale: Signal,
    done_action: Signal,
    envelope: Signal,
}

impl EnvGen {
    const SPEC: UGenSpec = UGenSpec {
        name: "EnvGen",
        has_done_flag: true,
        ..UGenSpec::DEFAULT
    };

    pub fn new(envelope: impl Into<Signal>) -> Self {
        EnvGen {
            gate: Signal::Const(1.0),
            level_scale: Signal::Const(1.0),
            level_bias: Signal::Const(0.0),
            time_scale: Signal::Const(1.0),
            done_action: Signal::Const(0.0),
            envelope: envelope.into(),
        }
    }

    pub fn gate(mut self, value: impl Into<Signal>) -> Self {
        self.gate = value.into();
        self
    }

    pub fn level_scale(mut self, value: impl Into<Signal>) -> Self {
        self.level_scale = value.into();
        self
    }

    pub fn level_bias(mut self, value: impl Into<Signal>) -> Self {
        self.level_bias = value.into();
        self
    }

    pub fn time_scale(mut self, value: impl Into<Signal>) -> Self {
        self.time_scale = value.into();
        self
    }

    pub fn done_action(mut self, value: impl Into<Signal>) -> Self {
        self.done_action = value.into();
        self
    }

    pub fn ar(self) -> Signal {
        self.construct_at(CalculationRate::Audio)
    }

    pub fn kr(self) -> Signal {
        self.construct_at(CalculationRate::Control)
    }

    fn construct_at(self, rate: CalculationRate) -> Signal {
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("gate", self.gate, false),
                ("level_scale", self.level_scale, false),
                ("level_bias", self.level_bias, false),
                ("time_scale", self.time_scale, false),
                ("done_action", self.done_action, false),
                ("envelope", self.envelope, true),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::DoneAction;
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{Out, SinOsc};

    fn flatten(envelope: &Envelope) -> Vec<f32> {
        match envelope.serialize() {
            Signal::Vector(values) => values
                .iter()
                .map(|value| value.as_const().expect("constant envelope entry"))
                .collect(),
            other => panic!("expected vector, got {:?}", other),
        }
    }

    #[test]
    fn percussive_flattens_to_the_canonical_tuple() {
        let values = flatten(&Envelope::percussive(0.01, 1.0));
        assert_eq!(
            values,
            vec![0.0, 2.0, -99.0, -99.0, 1.0, 0.01, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn adsr_structure() {
        let values = flatten(&Envelope::adsr(0.01, 0.3, 0.5, 1.0));
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 3.0);
        assert_eq!(values[2], 2.0);
        assert_eq!(values[3], -99.0);
        // Custom curvature -4 on every segment.
        assert_eq!(values[6], EnvelopeShape::Custom as i32 as f32);
        assert_eq!(values[7], -4.0);
    }

    #[test]
    fn asr_release_node() {
        let values = flatten(&Envelope::asr(0.01, 0.9, 1.5));
        assert_eq!(values[1], 2.0);
        assert_eq!(values[2], 1.0);
        assert_eq!(values[4], 0.9);
        assert_eq!(values[8], 0.0);
    }

    #[test]
    fn linen_amplitudes() {
        let values = flatten(&Envelope::linen(0.1, 2.0, 0.5, 0.7));
        assert_eq!(values[1], 3.0);
        assert_eq!(values[2], -99.0);
        assert_eq!(values[4], 0.7);
        assert_eq!(values[8], 0.7);
        assert_eq!(values[12], 0.0);
    }

    #[test]
    fn triangle_splits_duration() {
        let values = flatten(&Envelope::triangle(4.0, 1.0));
        assert_eq!(values[5], 2.0);
        assert_eq!(values[9], 2.0);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let error = Envelope::new(vec![Signal::Const(0.0)], vec![], vec![]).unwrap_err();
        assert!(matches!(error, CompileError::EnvelopeMismatch { .. }));
        let error = Envelope::new(
            vec![Signal::Const(0.0), Signal::Const(1.0), Signal::Const(0.0)],
            vec![Signal::Const(1.0)],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(error, CompileError::EnvelopeMismatch { .. }));
    }

    #[test]
    fn curves_cycle_across_segments() {
        let envelope = Envelope::new(
            vec![
                Signal::Const(0.0),
                Signal::Const(1.0),
                Signal::Const(0.5),
                Signal::Const(0.0),
            ],
            vec![Signal::Const(0.1), Signal::Const(0.2), Signal::Const(0.3)],
            vec![Curve::Value(5.0)],
        )
        .unwrap();
        let values = flatten(&envelope);
        assert_eq!(values[6], EnvelopeShape::Custom as i32 as f32);
        assert_eq!(values[7], 5.0);
        assert_eq!(values[10], EnvelopeShape::Custom as i32 as f32);
        assert_eq!(values[11], 5.0);
    }

    #[test]
    fn envgen_wires_envelope_as_trailing_inputs() {
        let builder = SynthDefBuilder::new();
        let env = EnvGen::new(Envelope::percussive(0.01, 1.0))
            .done_action(DoneAction::FreeSynth)
            .kr();
        Out::new(SinOsc::new().ar() * env).ar();
        let synthdef = builder.build("ping").unwrap();
        let envgen = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "EnvGen")
            .unwrap();
        // 5 leading inputs plus the 12-element flattened envelope.
        assert_eq!(envgen.inputs().len(), 17);
        assert!(envgen.has_done_flag());
        assert_eq!(envgen.calculation_rate(), CalculationRate::Control);
    }

    #[test]
    fn envelope_total_duration_folds() {
        let envelope = Envelope::percussive(0.25, 0.75);
        assert_eq!(envelope.duration(), Signal::Const(1.0));
    }
}
