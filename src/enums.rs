//! Closed tag types shared across the graph builder, compiler, and server.
//!
//! The integer values of [`BinaryOperator`] and [`UnaryOperator`] are the
//! SCgf `special_index` wire contract and must not be renumbered.

use std::fmt;

/// UGen computation rate.
///
/// Determines how often a UGen computes new output values:
///
/// - `Scalar` (0) — computed once at synth creation (`.ir`).
/// - `Control` (1) — computed once per control block, typically every 64
///   samples (`.kr`).
/// - `Audio` (2) — computed every sample (`.ar`).
/// - `Demand` (3) — computed only when demanded by another UGen (`.dr`).
///
/// When signals at different rates are combined, the result runs at the
/// highest rate among its inputs (audio + control = audio). The derived
/// ordering encodes that promotion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalculationRate {
    Scalar = 0,
    Control = 1,
    Audio = 2,
    Demand = 3,
}

impl CalculationRate {
    /// The rate constructor token (`ir`, `kr`, `ar`, `dr`).
    pub fn token(self) -> &'static str {
        match self {
            CalculationRate::Scalar => "ir",
            CalculationRate::Control => "kr",
            CalculationRate::Audio => "ar",
            CalculationRate::Demand => "dr",
        }
    }
}

impl From<ParameterRate> for CalculationRate {
    fn from(rate: ParameterRate) -> Self {
        match rate {
            ParameterRate::Scalar => CalculationRate::Scalar,
            ParameterRate::Trigger => CalculationRate::Control,
            ParameterRate::Audio => CalculationRate::Audio,
            ParameterRate::Control => CalculationRate::Control,
        }
    }
}

/// SynthDef parameter rate.
///
/// Governs which Control UGen a [`SynthDefBuilder`](crate::SynthDefBuilder)
/// parameter is materialized into:
///
/// - `Scalar` (0) — set once at synth creation; `Control.ir`.
/// - `Trigger` (1) — re-triggers when set; `TrigControl`.
/// - `Audio` (2) — audio-rate input; `AudioControl`.
/// - `Control` (3) — standard control-rate parameter; `Control.kr`, or
///   `LagControl` when a lag is specified.
///
/// Distinct from [`CalculationRate`]: this selects the control class, not
/// the per-sample computation rate. The discriminant order is also the
/// order in which control groups are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterRate {
    Scalar = 0,
    Trigger = 1,
    Audio = 2,
    Control = 3,
}

impl ParameterRate {
    pub const ALL: [ParameterRate; 4] = [
        ParameterRate::Scalar,
        ParameterRate::Trigger,
        ParameterRate::Audio,
        ParameterRate::Control,
    ];
}

/// Binary operator special indices.
///
/// Each member is a `BinaryOpUGen` `special_index` selecting the operation
/// applied to two input signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Addition = 0,
    Subtraction = 1,
    Multiplication = 2,
    IntegerDivision = 3,
    FloatDivision = 4,
    Modulo = 5,
    Equal = 6,
    NotEqual = 7,
    LessThan = 8,
    GreaterThan = 9,
    LessThanOrEqual = 10,
    GreaterThanOrEqual = 11,
    Minimum = 14,
    Maximum = 15,
    BitwiseAnd = 16,
    BitwiseOr = 17,
    BitwiseXor = 18,
    Lcm = 19,
    Gcd = 20,
    Round = 21,
    RoundUp = 22,
    Truncation = 23,
    Atan2 = 24,
    Hypot = 25,
    Hypotx = 26,
    Power = 27,
    ShiftLeft = 28,
    ShiftRight = 29,
    Ring1 = 32,
    Ring2 = 33,
    Ring3 = 34,
    Ring4 = 35,
    DifferenceOfSquares = 36,
    SumOfSquares = 37,
    SquareOfSum = 38,
    SquareOfDifference = 39,
    AbsoluteDifference = 40,
    Threshold = 41,
    AmplitudeClipping = 42,
    ScaleNegative = 43,
    Clip2 = 44,
    Excess = 45,
    Fold2 = 46,
    Wrap2 = 47,
}

impl BinaryOperator {
    /// Recover the operator from a serialized `special_index`.
    pub fn from_special_index(index: i16) -> Option<Self> {
        use BinaryOperator::*;
        Some(match index {
            0 => Addition,
            1 => Subtraction,
            2 => Multiplication,
            3 => IntegerDivision,
            4 => FloatDivision,
            5 => Modulo,
            6 => Equal,
            7 => NotEqual,
            8 => LessThan,
            9 => GreaterThan,
            10 => LessThanOrEqual,
            11 => GreaterThanOrEqual,
            14 => Minimum,
            15 => Maximum,
            16 => BitwiseAnd,
            17 => BitwiseOr,
            18 => BitwiseXor,
            19 => Lcm,
            20 => Gcd,
            21 => Round,
            22 => RoundUp,
            23 => Truncation,
            24 => Atan2,
            25 => Hypot,
            26 => Hypotx,
            27 => Power,
            28 => ShiftLeft,
            29 => ShiftRight,
            32 => Ring1,
            33 => Ring2,
            34 => Ring3,
            35 => Ring4,
            36 => DifferenceOfSquares,
            37 => SumOfSquares,
            38 => SquareOfSum,
            39 => SquareOfDifference,
            40 => AbsoluteDifference,
            41 => Threshold,
            42 => AmplitudeClipping,
            43 => ScaleNegative,
            44 => Clip2,
            45 => Excess,
            46 => Fold2,
            47 => Wrap2,
            _ => return None,
        })
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Unary operator special indices.
///
/// Each member is a `UnaryOpUGen` `special_index` selecting the operation
/// applied to a single input signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negative = 0,
    BitNot = 4,
    AbsoluteValue = 5,
    Ceiling = 8,
    Floor = 9,
    FractionalPart = 10,
    Sign = 11,
    Squared = 12,
    Cubed = 13,
    SquareRoot = 14,
    Exponential = 15,
    Reciprocal = 16,
    MidiCps = 17,
    CpsMidi = 18,
    MidiRatio = 19,
    RatioMidi = 20,
    DbAmp = 21,
    AmpDb = 22,
    OctCps = 23,
    CpsOct = 24,
    Log = 25,
    Log2 = 26,
    Log10 = 27,
    Sin = 28,
    Cos = 29,
    Tan = 30,
    ArcSin = 31,
    ArcCos = 32,
    ArcTan = 33,
    Sinh = 34,
    Cosh = 35,
    Tanh = 36,
    Distort = 42,
    SoftClip = 43,
}

impl UnaryOperator {
    /// Recover the operator from a serialized `special_index`.
    pub fn from_special_index(index: i16) -> Option<Self> {
        use UnaryOperator::*;
        Some(match index {
            0 => Negative,
            4 => BitNot,
            5 => AbsoluteValue,
            8 => Ceiling,
            9 => Floor,
            10 => FractionalPart,
            11 => Sign,
            12 => Squared,
            13 => Cubed,
            14 => SquareRoot,
            15 => Exponential,
            16 => Reciprocal,
            17 => MidiCps,
            18 => CpsMidi,
            19 => MidiRatio,
            20 => RatioMidi,
            21 => DbAmp,
            22 => AmpDb,
            23 => OctCps,
            24 => CpsOct,
            25 => Log,
            26 => Log2,
            27 => Log10,
            28 => Sin,
            29 => Cos,
            30 => Tan,
            31 => ArcSin,
            32 => ArcCos,
            33 => ArcTan,
            34 => Sinh,
            35 => Cosh,
            36 => Tanh,
            42 => Distort,
            43 => SoftClip,
            _ => return None,
        })
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Action taken when a UGen with a done flag finishes.
///
/// Passed to `EnvGen`, `Line`, `XLine`, `Linen`, and friends as the
/// `done_action` input. `FreeSynth` (2) is by far the most common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoneAction {
    Nothing = 0,
    PauseSynth = 1,
    FreeSynth = 2,
    FreeSynthAndPrecedingNode = 3,
    FreeSynthAndFollowingNode = 4,
    FreeSynthAndAllSiblingNodes = 13,
    FreeSynthAndEnclosingGroup = 14,
}

/// Interpolation curve shape for envelope segments.
///
/// A numeric curvature is expressed as `Custom` (5) with the value carried
/// separately in the flattened envelope tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeShape {
    Step = 0,
    Linear = 1,
    Exponential = 2,
    Sine = 3,
    Welch = 4,
    Custom = 5,
    Squared = 6,
    Cubed = 7,
    Hold = 8,
}

/// Node placement relative to a target, as used by `/s_new` and `/g_new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddAction {
    ToHead = 0,
    ToTail = 1,
    Before = 2,
    After = 3,
    Replace = 4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_ordering_promotes_upward() {
        assert!(CalculationRate::Scalar < CalculationRate::Control);
        assert!(CalculationRate::Control < CalculationRate::Audio);
        assert!(CalculationRate::Audio < CalculationRate::Demand);
        assert_eq!(
            CalculationRate::Control.max(CalculationRate::Audio),
            CalculationRate::Audio
        );
    }

    #[test]
    fn rate_tokens() {
        assert_eq!(CalculationRate::Scalar.token(), "ir");
        assert_eq!(CalculationRate::Control.token(), "kr");
        assert_eq!(CalculationRate::Audio.token(), "ar");
        assert_eq!(CalculationRate::Demand.token(), "dr");
    }

    #[test]
    fn parameter_rate_maps_to_calculation_rate() {
        assert_eq!(
            CalculationRate::from(ParameterRate::Trigger),
            CalculationRate::Control
        );
        assert_eq!(
            CalculationRate::from(ParameterRate::Audio),
            CalculationRate::Audio
        );
    }

    #[test]
    fn operator_codes_are_wire_values() {
        assert_eq!(BinaryOperator::Addition as i16, 0);
        assert_eq!(BinaryOperator::Multiplication as i16, 2);
        assert_eq!(BinaryOperator::FloatDivision as i16, 4);
        assert_eq!(BinaryOperator::Power as i16, 27);
        assert_eq!(BinaryOperator::Wrap2 as i16, 47);
        assert_eq!(UnaryOperator::Negative as i16, 0);
        assert_eq!(UnaryOperator::MidiCps as i16, 17);
        assert_eq!(UnaryOperator::SoftClip as i16, 43);
    }

    #[test]
    fn operator_round_trip_through_special_index() {
        for op in [
            BinaryOperator::Addition,
            BinaryOperator::Minimum,
            BinaryOperator::Ring3,
            BinaryOperator::Wrap2,
        ] {
            assert_eq!(BinaryOperator::from_special_index(op as i16), Some(op));
        }
        assert_eq!(BinaryOperator::from_special_index(12), None);
        for op in [
            UnaryOperator::BitNot,
            UnaryOperator::Tanh,
            UnaryOperator::SoftClip,
        ] {
            assert_eq!(UnaryOperator::from_special_index(op as i16), Some(op));
        }
        assert_eq!(UnaryOperator::from_special_index(1), None);
    }
}
