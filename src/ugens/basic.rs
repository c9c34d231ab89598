//! Basic utility UGens: `MulAdd`, `Sum3`, `Sum4`, and the `Mix` pseudo-UGen.
//!
//! These all collapse to cheaper forms when some of their inputs are
//! constant identities, so their constructors are written out by hand
//! rather than declared through `ugen!`.

use crate::enums::CalculationRate;
use crate::signal::Signal;
use crate::synthdef::{self, UGenSpec};

/// Flatten arbitrarily nested vectors into a flat channel list.
pub(crate) fn flatten_signals(signal: Signal) -> Vec<Signal> {
    match signal {
        Signal::Vector(values) => values.into_iter().flat_map(flatten_signals).collect(),
        scalar => vec![scalar],
    }
}

/// Broadcast an n-ary scalar operation over vector arguments.
fn expand_n(inputs: Vec<Signal>, f: &dyn Fn(Vec<Signal>) -> Signal) -> Signal {
    let size = inputs
        .iter()
        .filter_map(|input| match input {
            Signal::Vector(values) => Some(values.len()),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    if size == 0 {
        return f(inputs);
    }
    Signal::Vector(
        (0..size)
            .map(|i| {
                let element_inputs = inputs
                    .iter()
                    .map(|input| match input {
                        Signal::Vector(values) if !values.is_empty() => {
                            values[i % values.len()].clone()
                        }
                        other => other.clone(),
                    })
                    .collect();
                expand_n(element_inputs, f)
            })
            .collect(),
    )
}

fn rate_of(signals: &[&Signal]) -> CalculationRate {
    signals
        .iter()
        .map(|signal| signal.calculation_rate())
        .max()
        .unwrap_or(CalculationRate::Scalar)
}

/// Fused multiply-add: `source * multiplier + addend`.
///
/// Collapses to the plain arithmetic forms when the multiplier or addend
/// is an identity, and falls back to `source * multiplier + addend` when
/// the input rates cannot legally drive a MulAdd node.
pub struct MulAdd;

impl MulAdd {
    const SPEC: UGenSpec = UGenSpec {
        name: "MulAdd",
        pure: true,
        ..UGenSpec::DEFAULT
    };

    pub fn new(
        source: impl Into<Signal>,
        multiplier: impl Into<Signal>,
        addend: impl Into<Signal>,
    ) -> Signal {
        expand_n(
            vec![source.into(), multiplier.into(), addend.into()],
            &|mut inputs| {
                let addend = inputs.pop().expect("muladd addend");
                let multiplier = inputs.pop().expect("muladd multiplier");
                let source = inputs.pop().expect("muladd source");
                Self::single(source, multiplier, addend)
            },
        )
    }

    fn inputs_are_valid(source: &Signal, multiplier: &Signal, addend: &Signal) -> bool {
        if source.calculation_rate() == CalculationRate::Audio {
            return true;
        }
        let at_most_control = |signal: &Signal| {
            matches!(
                signal.calculation_rate(),
                CalculationRate::Control | CalculationRate::Scalar
            )
        };
        source.calculation_rate() == CalculationRate::Control
            && at_most_control(multiplier)
            && at_most_control(addend)
    }

    fn single(source: Signal, multiplier: Signal, addend: Signal) -> Signal {
        let is = |signal: &Signal, value: f32| matches!(signal, Signal::Const(v) if *v == value);
        if is(&multiplier, 0.0) {
            return addend;
        }
        let minus = is(&multiplier, -1.0);
        let no_multiplier = is(&multiplier, 1.0);
        let no_addend = is(&addend, 0.0);
        if no_multiplier && no_addend {
            return source;
        }
        if minus && no_addend {
            return -source;
        }
        if no_addend {
            return source * multiplier;
        }
        if minus {
            return addend - source;
        }
        if no_multiplier {
            return source + addend;
        }
        if Self::inputs_are_valid(&source, &multiplier, &addend) {
            let rate = rate_of(&[&source, &multiplier, &addend]);
            return synthdef::construct(
                &Self::SPEC,
                rate,
                None,
                0,
                vec![
                    ("source", source, false),
                    ("multiplier", multiplier, false),
                    ("addend", addend, false),
                ],
            );
        }
        if Self::inputs_are_valid(&multiplier, &source, &addend) {
            let rate = rate_of(&[&source, &multiplier, &addend]);
            return synthdef::construct(
                &Self::SPEC,
                rate,
                None,
                0,
                vec![
                    ("source", multiplier, false),
                    ("multiplier", source, false),
                    ("addend", addend, false),
                ],
            );
        }
        source * multiplier + addend
    }
}

/// Sum of three signals in a single node.
pub struct Sum3;

impl Sum3 {
    const SPEC: UGenSpec = UGenSpec {
        name: "Sum3",
        pure: true,
        ..UGenSpec::DEFAULT
    };

    pub fn new(
        input_one: impl Into<Signal>,
        input_two: impl Into<Signal>,
        input_three: impl Into<Signal>,
    ) -> Signal {
        expand_n(
            vec![input_one.into(), input_two.into(), input_three.into()],
            &|mut inputs| {
                let three = inputs.pop().expect("sum3 input");
                let two = inputs.pop().expect("sum3 input");
                let one = inputs.pop().expect("sum3 input");
                Self::single(one, two, three)
            },
        )
    }

    pub(crate) fn single(one: Signal, two: Signal, three: Signal) -> Signal {
        let is_zero = |signal: &Signal| matches!(signal, Signal::Const(v) if *v == 0.0);
        if is_zero(&three) {
            return one + two;
        }
        if is_zero(&two) {
            return one + three;
        }
        if is_zero(&one) {
            return two + three;
        }
        // Inputs are ordered fastest-rate first.
        let mut inputs = vec![one, two, three];
        inputs.sort_by_key(|signal| std::cmp::Reverse(signal.calculation_rate()));
        let rate = rate_of(&inputs.iter().collect::<Vec<_>>());
        let mut iter = inputs.into_iter();
        let one = iter.next().expect("sum3 input");
        let two = iter.next().expect("sum3 input");
        let three = iter.next().expect("sum3 input");
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("input_one", one, false),
                ("input_two", two, false),
                ("input_three", three, false),
            ],
        )
    }
}

/// Sum of four signals in a single node.
pub struct Sum4;

impl Sum4 {
    const SPEC: UGenSpec = UGenSpec {
        name: "Sum4",
        pure: true,
        ..UGenSpec::DEFAULT
    };

    pub fn new(
        input_one: impl Into<Signal>,
        input_two: impl Into<Signal>,
        input_three: impl Into<Signal>,
        input_four: impl Into<Signal>,
    ) -> Signal {
        expand_n(
            vec![
                input_one.into(),
                input_two.into(),
                input_three.into(),
                input_four.into(),
            ],
            &|mut inputs| {
                let four = inputs.pop().expect("sum4 input");
                let three = inputs.pop().expect("sum4 input");
                let two = inputs.pop().expect("sum4 input");
                let one = inputs.pop().expect("sum4 input");
                Self::single(one, two, three, four)
            },
        )
    }

    fn single(one: Signal, two: Signal, three: Signal, four: Signal) -> Signal {
        let is_zero = |signal: &Signal| matches!(signal, Signal::Const(v) if *v == 0.0);
        if is_zero(&one) {
            return Sum3::single(two, three, four);
        }
        if is_zero(&two) {
            return Sum3::single(one, three, four);
        }
        if is_zero(&three) {
            return Sum3::single(one, two, four);
        }
        if is_zero(&four) {
            return Sum3::single(one, two, three);
        }
        let mut inputs = vec![one, two, three, four];
        inputs.sort_by_key(|signal| std::cmp::Reverse(signal.calculation_rate()));
        let rate = rate_of(&inputs.iter().collect::<Vec<_>>());
        let mut iter = inputs.into_iter();
        let one = iter.next().expect("sum4 input");
        let two = iter.next().expect("sum4 input");
        let three = iter.next().expect("sum4 input");
        let four = iter.next().expect("sum4 input");
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("input_one", one, false),
                ("input_two", two, false),
                ("input_three", three, false),
                ("input_four", four, false),
            ],
        )
    }
}

/// Down-to-mono signal mixer pseudo-UGen.
///
/// Sums any number of channels using `Sum4`/`Sum3` chunks.
pub struct Mix;

impl Mix {
    pub fn new(sources: impl Into<Signal>) -> Signal {
        let flat = flatten_signals(sources.into());
        if flat.is_empty() {
            return Signal::Const(0.0);
        }
        let mut summed: Vec<Signal> = Vec::new();
        for chunk in flat.chunks(4) {
            let signal = match chunk {
                [one, two, three, four] => Sum4::new(
                    one.clone(),
                    two.clone(),
                    three.clone(),
                    four.clone(),
                ),
                [one, two, three] => Sum3::new(one.clone(), two.clone(), three.clone()),
                [one, two] => one.clone() + two.clone(),
                [one] => one.clone(),
                _ => unreachable!("chunks(4) yields 1-4 elements"),
            };
            summed.push(signal);
        }
        if summed.len() == 1 {
            summed.into_iter().next().expect("mix output")
        } else {
            Mix::new(Signal::Vector(summed))
        }
    }

    /// Mix down to `channel_count` channels: sources are split into
    /// consecutive frames of `channel_count` channels and summed
    /// column-wise.
    pub fn multichannel(sources: impl Into<Signal>, channel_count: usize) -> Signal {
        let flat = flatten_signals(sources.into());
        let mut columns: Vec<Vec<Signal>> = vec![Vec::new(); channel_count];
        for (index, signal) in flat.into_iter().enumerate() {
            columns[index % channel_count].push(signal);
        }
        Signal::Vector(
            columns
                .into_iter()
                .map(|column| Mix::new(Signal::Vector(column)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{Out, SinOsc, WhiteNoise};

    fn names(synthdef: &crate::SynthDef) -> Vec<&'static str> {
        synthdef.ugens().iter().map(|u| u.name()).collect()
    }

    #[test]
    fn muladd_identities() {
        let builder = SynthDefBuilder::new();
        let source = SinOsc::new().ar();
        assert_eq!(MulAdd::new(source.clone(), 0.0, 7.0), Signal::Const(7.0));
        assert_eq!(MulAdd::new(source.clone(), 1.0, 0.0), source);
        drop(builder);
    }

    #[test]
    fn muladd_with_no_addend_degrades_to_multiplication() {
        let builder = SynthDefBuilder::new();
        let sig = MulAdd::new(SinOsc::new().ar(), 2.0, 0.0);
        Out::new(sig).ar();
        let synthdef = builder.build("muladd_mul").unwrap();
        assert!(!names(&synthdef).contains(&"MulAdd"));
        assert!(names(&synthdef).contains(&"BinaryOpUGen"));
    }

    #[test]
    fn muladd_emits_single_node() {
        let builder = SynthDefBuilder::new();
        let sig = MulAdd::new(SinOsc::new().ar(), 0.5, 0.25);
        Out::new(sig).ar();
        let synthdef = builder.build("muladd").unwrap();
        assert!(names(&synthdef).contains(&"MulAdd"));
        assert!(!names(&synthdef).contains(&"BinaryOpUGen"));
    }

    #[test]
    fn muladd_swaps_operands_when_needed() {
        let builder = SynthDefBuilder::new();
        // Control-rate source with audio-rate multiplier is invalid as
        // written but valid swapped.
        let control = SinOsc::new().kr();
        let audio = SinOsc::new().ar();
        let sig = MulAdd::new(control, audio, 0.25);
        Out::new(sig).ar();
        let synthdef = builder.build("swapped").unwrap();
        let muladd = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "MulAdd")
            .unwrap();
        assert_eq!(muladd.calculation_rate(), CalculationRate::Audio);
    }

    #[test]
    fn sum3_elides_zero_inputs() {
        let builder = SynthDefBuilder::new();
        let a = SinOsc::new().ar();
        let b = WhiteNoise::new().ar();
        Out::new(Sum3::new(a, b, 0.0)).ar();
        let synthdef = builder.build("sum3").unwrap();
        assert!(!names(&synthdef).contains(&"Sum3"));
        assert!(names(&synthdef).contains(&"BinaryOpUGen"));
    }

    #[test]
    fn sum4_falls_back_to_sum3() {
        let builder = SynthDefBuilder::new();
        let a = SinOsc::new().ar();
        let b = WhiteNoise::new().ar();
        let c = SinOsc::new().frequency(220.0).ar();
        Out::new(Sum4::new(a, b, c, 0.0)).ar();
        let synthdef = builder.build("sum4").unwrap();
        assert!(names(&synthdef).contains(&"Sum3"));
        assert!(!names(&synthdef).contains(&"Sum4"));
    }

    #[test]
    fn mix_chunks_by_four() {
        let builder = SynthDefBuilder::new();
        let sources: Vec<Signal> = (0..5)
            .map(|i| SinOsc::new().frequency(220.0 * (i + 1) as f32).ar())
            .collect();
        Out::new(Mix::new(Signal::Vector(sources))).ar();
        let synthdef = builder.build("mix").unwrap();
        // Five sources: one Sum4 over the first four, then one addition.
        assert_eq!(
            names(&synthdef)
                .iter()
                .filter(|name| **name == "Sum4")
                .count(),
            1
        );
        assert!(names(&synthdef).contains(&"BinaryOpUGen"));
    }

    #[test]
    fn mix_multichannel_mixes_columns() {
        let builder = SynthDefBuilder::new();
        let frames: Vec<Signal> = (0..4)
            .map(|i| SinOsc::new().frequency(110.0 * (i + 1) as f32).ar())
            .collect();
        let mixed = Mix::multichannel(Signal::Vector(frames), 2);
        assert_eq!(mixed.channel_count(), 2);
        Out::new(mixed).ar();
        builder.build("mix2").unwrap();
    }
}
