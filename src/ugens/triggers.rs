//! Trigger, gate, and reply UGens.

use crate::enums::CalculationRate;
use crate::signal::Signal;
use crate::synthdef::{self, ugen, UGenSpec};

ugen! {
    /// Clamp a signal to a range.
    Clip[ar, kr, ir] {
        source: required,
        minimum: 0.0,
        maximum: 1.0,
    }
}

ugen! {
    /// Fold a signal into a range.
    Fold[ar, kr, ir] {
        source: required,
        minimum: 0.0,
        maximum: 1.0,
    }
}

ugen! {
    /// Pass the source while the trigger is open.
    Gate[ar, kr] {
        source: required,
        trigger: 0,
    }
}

ugen! {
    /// 1 while the source is inside the range.
    InRange[ar, kr, ir] {
        source: required,
        minimum: 0.0,
        maximum: 1.0,
    }
}

ugen! {
    /// Sample and hold on trigger.
    Latch[ar, kr] {
        source: required,
        trigger: 0,
    }
}

ugen! {
    /// Output whichever input changed least.
    LeastChange[ar, kr] {
        a: 0,
        b: 0,
    }
}

ugen! {
    /// Output whichever input changed most.
    MostChange[ar, kr] {
        a: 0,
        b: 0,
    }
}

ugen! {
    /// Track the maximum absolute value since the last trigger.
    Peak[ar, kr] {
        source: required,
        trigger: 0,
    }
}

ugen! {
    /// Peak detector with exponential decay.
    PeakFollower[ar, kr] {
        source: required,
        decay: 0.999,
    }
}

ugen! {
    /// Resettable linear ramp between limits.
    Phasor[ar, kr] {
        trigger: 0,
        rate: 1.0,
        start: 0.0,
        stop: 1.0,
        reset_pos: 0.0,
    }
}

ugen! {
    /// Track the running maximum since the last trigger.
    RunningMax[ar, kr] {
        source: required,
        trigger: 0,
    }
}

ugen! {
    /// Track the running minimum since the last trigger.
    RunningMin[ar, kr] {
        source: required,
        trigger: 0,
    }
}

ugen! {
    /// Schmidt trigger: 1 once above the range, 0 once below.
    Schmidt[ar, kr] {
        source: required,
        minimum: 0.0,
        maximum: 1.0,
    }
}

ugen! {
    /// Send a `/tr` reply to the client on trigger.
    SendTrig[ar, kr] {
        trigger: required,
        id: 0,
        value: 0.0,
    }
}

ugen! {
    /// Seconds elapsed since the last trigger.
    Sweep[ar, kr] {
        trigger: 0,
        rate: 1.0,
    }
}

ugen! {
    /// Delay a trigger.
    TDelay[ar, kr] {
        source: required,
        duration: 0.1,
    }
}

ugen! {
    /// Toggle flip-flop on trigger.
    ToggleFF[ar, kr] {
        trigger: 0,
    }
}

ugen! {
    /// Emit a fixed-duration gate for each trigger, ignoring triggers
    /// that arrive while the gate is open.
    Trig1[ar, kr] {
        source: required,
        duration: 0.1,
    }
}

ugen! {
    /// Emit a fixed-duration gate carrying the trigger's value.
    Trig[ar, kr] {
        source: required,
        duration: 0.1,
    }
}

ugen! {
    /// Wrap a signal into a range.
    Wrap[ar, kr, ir] {
        source: required,
        minimum: 0.0,
        maximum: 1.0,
    }
}

ugen! {
    /// Count zero crossings per second.
    ZeroCrossing[ar, kr] {
        source: required,
    }
}

fn encode_label(label: &str) -> Signal {
    let mut values = Vec::with_capacity(label.len() + 1);
    values.push(Signal::Const(label.len() as f32));
    values.extend(
        label
            .bytes()
            .map(|byte| Signal::Const(byte as f32)),
    );
    Signal::Vector(values)
}

/// Print a signal's value to the server log on trigger.
///
/// The label defaults to the source UGen's class name and is wired as a
/// length-prefixed character array.
#[derive(Debug, Clone)]
pub struct Poll {
    trigger: Signal,
    source: Signal,
    trigger_id: Signal,
    label: Option<String>,
}

impl Poll {
    const SPEC: UGenSpec = UGenSpec {
        name: "Poll",
        ..UGenSpec::DEFAULT
    };

    pub fn new(trigger: impl Into<Signal>, source: impl Into<Signal>) -> Self {
        Poll {
            trigger: trigger.into(),
            source: source.into(),
            trigger_id: Signal::Const(-1.0),
            label: None,
        }
    }

    pub fn trigger_id(mut self, value: impl Into<Signal>) -> Self {
        self.trigger_id = value.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn ar(self) -> Signal {
        self.construct_at(CalculationRate::Audio)
    }

    pub fn kr(self) -> Signal {
        self.construct_at(CalculationRate::Control)
    }

    fn construct_at(self, rate: CalculationRate) -> Signal {
        let label = self.label.unwrap_or_else(|| match &self.source {
            Signal::Output(proxy) => synthdef::node_name_of(proxy)
                .unwrap_or("UGen")
                .to_string(),
            _ => "UGen".to_string(),
        });
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("trigger", self.trigger, false),
                ("source", self.source, false),
                ("trigger_id", self.trigger_id, false),
                ("label", encode_label(&label), true),
            ],
        )
    }
}

/// Send an OSC reply with the current values of the source channels.
#[derive(Debug, Clone)]
pub struct SendReply {
    trigger: Signal,
    source: Signal,
    command_name: String,
    reply_id: Signal,
}

impl SendReply {
    const SPEC: UGenSpec = UGenSpec {
        name: "SendReply",
        outputs: crate::synthdef::Outputs::Fixed(0),
        ..UGenSpec::DEFAULT
    };

    pub fn new(trigger: impl Into<Signal>, source: impl Into<Signal>) -> Self {
        SendReply {
            trigger: trigger.into(),
            source: source.into(),
            command_name: "/reply".to_string(),
            reply_id: Signal::Const(-1.0),
        }
    }

    pub fn command_name(mut self, command_name: impl Into<String>) -> Self {
        self.command_name = command_name.into();
        self
    }

    pub fn reply_id(mut self, value: impl Into<Signal>) -> Self {
        self.reply_id = value.into();
        self
    }

    pub fn ar(self) -> Signal {
        self.construct_at(CalculationRate::Audio)
    }

    pub fn kr(self) -> Signal {
        self.construct_at(CalculationRate::Control)
    }

    fn construct_at(self, rate: CalculationRate) -> Signal {
        let characters: Vec<Signal> = self
            .command_name
            .bytes()
            .map(|byte| Signal::Const(byte as f32))
            .collect();
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("trigger", self.trigger, false),
                ("reply_id", self.reply_id, false),
                (
                    "character_count",
                    Signal::Const(self.command_name.len() as f32),
                    false,
                ),
                ("character", Signal::Vector(characters), true),
                ("source", self.source, true),
            ],
        )
    }
}

/// Periodically send peak and RMS levels to the client.
#[derive(Debug, Clone)]
pub struct SendPeakRMS {
    source: Signal,
    reply_rate: Signal,
    peak_lag: Signal,
    reply_id: Signal,
    command_name: String,
}

impl SendPeakRMS {
    const SPEC: UGenSpec = UGenSpec {
        name: "SendPeakRMS",
        outputs: crate::synthdef::Outputs::Fixed(0),
        ..UGenSpec::DEFAULT
    };

    pub fn new(source: impl Into<Signal>) -> Self {
        SendPeakRMS {
            source: source.into(),
            reply_rate: Signal::Const(20.0),
            peak_lag: Signal::Const(3.0),
            reply_id: Signal::Const(-1.0),
            command_name: "/reply".to_string(),
        }
    }

    pub fn reply_rate(mut self, value: impl Into<Signal>) -> Self {
        self.reply_rate = value.into();
        self
    }

    pub fn peak_lag(mut self, value: impl Into<Signal>) -> Self {
        self.peak_lag = value.into();
        self
    }

    pub fn reply_id(mut self, value: impl Into<Signal>) -> Self {
        self.reply_id = value.into();
        self
    }

    pub fn command_name(mut self, command_name: impl Into<String>) -> Self {
        self.command_name = command_name.into();
        self
    }

    pub fn ar(self) -> Signal {
        self.construct_at(CalculationRate::Audio)
    }

    pub fn kr(self) -> Signal {
        self.construct_at(CalculationRate::Control)
    }

    fn construct_at(self, rate: CalculationRate) -> Signal {
        let source_channels = super::basic::flatten_signals(self.source);
        let source_size = source_channels.len();
        let characters: Vec<Signal> = self
            .command_name
            .bytes()
            .map(|byte| Signal::Const(byte as f32))
            .collect();
        synthdef::construct(
            &Self::SPEC,
            rate,
            None,
            0,
            vec![
                ("reply_rate", self.reply_rate, false),
                ("peak_lag", self.peak_lag, false),
                ("reply_id", self.reply_id, false),
                ("source_size", Signal::Const(source_size as f32), false),
                ("source", Signal::Vector(source_channels), true),
                (
                    "character_count",
                    Signal::Const(self.command_name.len() as f32),
                    false,
                ),
                ("character", Signal::Vector(characters), true),
            ],
        )
    }
}

/// 1 whenever the source changes by more than a threshold: a one-zero
/// high-pass fed through `abs` and a comparison.
pub struct Changed;

impl Changed {
    pub fn ar(source: impl Into<Signal>, threshold: impl Into<Signal>) -> Signal {
        crate::ugens::filters::HPZ1::new(source)
            .ar()
            .abs()
            .gt(threshold)
    }

    pub fn kr(source: impl Into<Signal>, threshold: impl Into<Signal>) -> Signal {
        crate::ugens::filters::HPZ1::new(source)
            .kr()
            .abs()
            .gt(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthdef::{CompiledInput, SynthDefBuilder};
    use crate::ugens::{Impulse, Out, SinOsc};

    #[test]
    fn poll_encodes_its_label() {
        let builder = SynthDefBuilder::new();
        let source = SinOsc::new().ar();
        Poll::new(Impulse::new().frequency(1.0).kr(), source.clone())
            .label("osc")
            .ar();
        Out::new(source).ar();
        let synthdef = builder.build("polled").unwrap();
        let poll = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "Poll")
            .unwrap();
        // trigger, source, trigger_id, length, then one slot per byte.
        assert_eq!(poll.inputs().len(), 7);
        let length = match poll.inputs()[3] {
            CompiledInput::Constant(index) => synthdef.constants()[index as usize],
            _ => panic!("expected constant length"),
        };
        assert_eq!(length, 3.0);
    }

    #[test]
    fn poll_defaults_label_to_source_class() {
        let builder = SynthDefBuilder::new();
        let source = SinOsc::new().ar();
        Poll::new(Impulse::new().frequency(1.0).kr(), source.clone()).ar();
        Out::new(source).ar();
        let synthdef = builder.build("polled").unwrap();
        let poll = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "Poll")
            .unwrap();
        // "SinOsc" is six characters.
        assert_eq!(poll.inputs().len(), 4 + 6);
    }

    #[test]
    fn send_reply_wires_command_name_and_channels() {
        let builder = SynthDefBuilder::new();
        let source = SinOsc::new().ar();
        SendReply::new(Impulse::new().frequency(10.0).kr(), source.clone())
            .command_name("/level")
            .kr();
        Out::new(source).ar();
        let synthdef = builder.build("reply").unwrap();
        let send = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "SendReply")
            .unwrap();
        // trigger, reply_id, count, six characters, one source channel.
        assert_eq!(send.inputs().len(), 10);
        assert_eq!(send.output_count(), 0);
    }

    #[test]
    fn send_reply_survives_dead_code_elimination() {
        let builder = SynthDefBuilder::new();
        SendReply::new(Impulse::new().frequency(10.0).kr(), SinOsc::new().kr()).kr();
        Out::new(SinOsc::new().ar()).ar();
        let synthdef = builder.build("keep").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        assert!(names.contains(&"SendReply"));
    }

    #[test]
    fn changed_expands_to_hpz1_chain() {
        let builder = SynthDefBuilder::new();
        let changed = Changed::kr(SinOsc::new().kr(), 0.1);
        Out::new(SinOsc::new().ar() * changed).ar();
        let synthdef = builder.build("changed").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        assert!(names.contains(&"HPZ1"));
        assert!(names.contains(&"UnaryOpUGen"));
        assert!(names.contains(&"BinaryOpUGen"));
    }
}
