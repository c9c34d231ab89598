//! Signal values and the operator algebra over them.
//!
//! Everything that can be wired into a UGen input is a [`Signal`]: a float
//! constant, a reference to one output of a UGen already in the graph, or a
//! vector of signals (the result of multichannel expansion). Arithmetic on
//! signals builds `BinaryOpUGen`/`UnaryOpUGen` nodes in the active builder
//! scope; when every operand is a constant and the operator has float
//! semantics, the result is folded at construction time and no node is
//! emitted.
//!
//! Signal-rate comparison is spelled with the named methods ([`Signal::gt`],
//! [`Signal::equal`], ...) which return signals. `Signal` deliberately does
//! not implement `PartialOrd`, so a signal can never leak into host-side
//! control flow.

use crate::enums::{BinaryOperator, CalculationRate, UnaryOperator};
use crate::synthdef::{self, GraphError};

/// A reference to a single output channel of a UGen in a builder scope.
///
/// Two proxies are equal iff they name the same UGen and the same output
/// index. The calculation rate is cached so that operator rate promotion
/// does not need to consult the owning scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputProxy {
    pub(crate) scope: u64,
    pub(crate) ugen: usize,
    pub(crate) output: u32,
    pub(crate) rate: CalculationRate,
}

impl OutputProxy {
    /// The output index within the owning UGen.
    pub fn output_index(&self) -> u32 {
        self.output
    }

    /// The rate of the owning UGen.
    pub fn calculation_rate(&self) -> CalculationRate {
        self.rate
    }
}

/// A signal value: constant, UGen output, or vector of signals.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Const(f32),
    Output(OutputProxy),
    Vector(Vec<Signal>),
}

impl Signal {
    /// The calculation rate of this signal. Constants are scalar; vectors
    /// promote to the highest rate among their elements.
    pub fn calculation_rate(&self) -> CalculationRate {
        match self {
            Signal::Const(_) => CalculationRate::Scalar,
            Signal::Output(proxy) => proxy.rate,
            Signal::Vector(values) => values
                .iter()
                .map(Signal::calculation_rate)
                .max()
                .unwrap_or(CalculationRate::Scalar),
        }
    }

    /// Number of channels: 1 for scalars, element count for vectors.
    pub fn channel_count(&self) -> usize {
        match self {
            Signal::Vector(values) => values.len(),
            _ => 1,
        }
    }

    /// Extract one channel. Scalar signals return themselves for index 0.
    pub fn channel(&self, index: usize) -> Option<Signal> {
        match self {
            Signal::Vector(values) => values.get(index).cloned(),
            other if index == 0 => Some(other.clone()),
            _ => None,
        }
    }

    /// The constant value, if this signal is a constant.
    pub fn as_const(&self) -> Option<f32> {
        match self {
            Signal::Const(value) => Some(*value),
            _ => None,
        }
    }

    fn is_const(&self, value: f32) -> bool {
        matches!(self, Signal::Const(v) if *v == value)
    }
}

impl From<f32> for Signal {
    fn from(value: f32) -> Self {
        Signal::Const(value)
    }
}

impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        Signal::Const(value as f32)
    }
}

impl From<i32> for Signal {
    fn from(value: i32) -> Self {
        Signal::Const(value as f32)
    }
}

impl From<u32> for Signal {
    fn from(value: u32) -> Self {
        Signal::Const(value as f32)
    }
}

impl From<OutputProxy> for Signal {
    fn from(proxy: OutputProxy) -> Self {
        Signal::Output(proxy)
    }
}

impl From<&Signal> for Signal {
    fn from(signal: &Signal) -> Self {
        signal.clone()
    }
}

impl From<Vec<Signal>> for Signal {
    fn from(values: Vec<Signal>) -> Self {
        Signal::Vector(values)
    }
}

impl<T: Into<Signal> + Clone, const N: usize> From<[T; N]> for Signal {
    fn from(values: [T; N]) -> Self {
        Signal::Vector(values.into_iter().map(Into::into).collect())
    }
}

impl From<&[f32]> for Signal {
    fn from(values: &[f32]) -> Self {
        Signal::Vector(values.iter().map(|&v| Signal::Const(v)).collect())
    }
}

impl From<crate::enums::DoneAction> for Signal {
    fn from(action: crate::enums::DoneAction) -> Self {
        Signal::Const(action as i32 as f32)
    }
}

/// Python-style floored modulo, matching the server's `mod` operator.
fn floored_mod(a: f32, b: f32) -> f32 {
    a - b * (a / b).floor()
}

fn bool_to_signal(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

type Fold2 = fn(f32, f32) -> f32;
type Fold1 = fn(f32) -> f32;

/// Apply a binary operator with pointwise vector broadcast.
///
/// Vector operands must have equal lengths, or length 1 (which broadcasts).
/// Asymmetric lengths are recorded as a build-time error in the active
/// scope.
pub(crate) fn binary_op(
    left: Signal,
    right: Signal,
    operator: BinaryOperator,
    fold: Option<Fold2>,
) -> Signal {
    match (left, right) {
        (Signal::Vector(left), Signal::Vector(right)) => {
            if left.is_empty() || right.is_empty() {
                return Signal::Vector(Vec::new());
            }
            if left.len() != right.len() && left.len() != 1 && right.len() != 1 {
                synthdef::record_error(GraphError::MismatchedLengths {
                    left: left.len(),
                    right: right.len(),
                });
            }
            let size = left.len().max(right.len());
            Signal::Vector(
                (0..size)
                    .map(|i| {
                        binary_op(
                            left[i % left.len()].clone(),
                            right[i % right.len()].clone(),
                            operator,
                            fold,
                        )
                    })
                    .collect(),
            )
        }
        (Signal::Vector(left), right) => Signal::Vector(
            left.into_iter()
                .map(|value| binary_op(value, right.clone(), operator, fold))
                .collect(),
        ),
        (left, Signal::Vector(right)) => Signal::Vector(
            right
                .into_iter()
                .map(|value| binary_op(left.clone(), value, operator, fold))
                .collect(),
        ),
        (left, right) => binary_op_scalar(left, right, operator, fold),
    }
}

fn binary_op_scalar(
    left: Signal,
    right: Signal,
    operator: BinaryOperator,
    fold: Option<Fold2>,
) -> Signal {
    if let (Some(a), Some(b), Some(f)) = (left.as_const(), right.as_const(), fold) {
        return Signal::Const(f(a, b));
    }
    match operator {
        BinaryOperator::Multiplication => {
            if left.is_const(0.0) || right.is_const(0.0) {
                return Signal::Const(0.0);
            }
            if left.is_const(1.0) {
                return right;
            }
            if left.is_const(-1.0) {
                return negate(right);
            }
            if right.is_const(1.0) {
                return left;
            }
            if right.is_const(-1.0) {
                return negate(left);
            }
        }
        BinaryOperator::Addition => {
            if left.is_const(0.0) {
                return right;
            }
            if right.is_const(0.0) {
                return left;
            }
        }
        BinaryOperator::Subtraction => {
            if left.is_const(0.0) {
                return negate(right);
            }
            if right.is_const(0.0) {
                return left;
            }
        }
        BinaryOperator::FloatDivision => {
            if right.is_const(1.0) {
                return left;
            }
            if right.is_const(-1.0) {
                return negate(left);
            }
        }
        BinaryOperator::Power => {
            if right.is_const(0.0) {
                return Signal::Const(1.0);
            }
            if right.is_const(1.0) {
                return left;
            }
        }
        _ => {}
    }
    let rate = left.calculation_rate().max(right.calculation_rate());
    synthdef::construct_operator(
        "BinaryOpUGen",
        rate,
        operator as i16,
        vec![("left", left), ("right", right)],
    )
}

fn negate(signal: Signal) -> Signal {
    unary_op(signal, UnaryOperator::Negative, Some(|x| -x))
}

/// Apply a unary operator, mapping over vectors.
pub(crate) fn unary_op(source: Signal, operator: UnaryOperator, fold: Option<Fold1>) -> Signal {
    match source {
        Signal::Vector(values) => Signal::Vector(
            values
                .into_iter()
                .map(|value| unary_op(value, operator, fold))
                .collect(),
        ),
        source => {
            if let (Some(value), Some(f)) = (source.as_const(), fold) {
                return Signal::Const(f(value));
            }
            let rate = source.calculation_rate();
            synthdef::construct_operator(
                "UnaryOpUGen",
                rate,
                operator as i16,
                vec![("source", source)],
            )
        }
    }
}

macro_rules! binary_method {
    ($(#[$meta:meta])* $name:ident, $operator:ident) => {
        $(#[$meta])*
        pub fn $name(self, expr: impl Into<Signal>) -> Signal {
            binary_op(self, expr.into(), BinaryOperator::$operator, None)
        }
    };
    ($(#[$meta:meta])* $name:ident, $operator:ident, $fold:expr) => {
        $(#[$meta])*
        pub fn $name(self, expr: impl Into<Signal>) -> Signal {
            binary_op(self, expr.into(), BinaryOperator::$operator, Some($fold))
        }
    };
}

macro_rules! unary_method {
    ($(#[$meta:meta])* $name:ident, $operator:ident) => {
        $(#[$meta])*
        pub fn $name(self) -> Signal {
            unary_op(self, UnaryOperator::$operator, None)
        }
    };
    ($(#[$meta:meta])* $name:ident, $operator:ident, $fold:expr) => {
        $(#[$meta])*
        pub fn $name(self) -> Signal {
            unary_op(self, UnaryOperator::$operator, Some($fold))
        }
    };
}

impl Signal {
    binary_method!(
        /// Raise to a power.
        pow, Power, |a, b| a.powf(b)
    );
    binary_method!(
        /// Integer (floored) division.
        floor_div, IntegerDivision, |a, b| (a / b).floor()
    );
    binary_method!(
        /// Signal equality test: 1.0 when equal, 0.0 otherwise.
        equal, Equal, |a, b| bool_to_signal(a == b)
    );
    binary_method!(
        /// Signal inequality test: 1.0 when not equal, 0.0 otherwise.
        not_equal, NotEqual, |a, b| bool_to_signal(a != b)
    );
    binary_method!(
        /// Signal comparison: 1.0 when less than.
        lt, LessThan, |a, b| bool_to_signal(a < b)
    );
    binary_method!(
        /// Signal comparison: 1.0 when greater than.
        gt, GreaterThan, |a, b| bool_to_signal(a > b)
    );
    binary_method!(
        /// Signal comparison: 1.0 when less than or equal.
        le, LessThanOrEqual, |a, b| bool_to_signal(a <= b)
    );
    binary_method!(
        /// Signal comparison: 1.0 when greater than or equal.
        ge, GreaterThanOrEqual, |a, b| bool_to_signal(a >= b)
    );
    binary_method!(
        /// Minimum of the two signals.
        min, Minimum, |a, b| a.min(b)
    );
    binary_method!(
        /// Maximum of the two signals.
        max, Maximum, |a, b| a.max(b)
    );
    binary_method!(
        /// Least common multiple.
        lcm, Lcm
    );
    binary_method!(
        /// Greatest common divisor.
        gcd, Gcd
    );
    binary_method!(
        /// Round to the nearest multiple of `expr`.
        round, Round
    );
    binary_method!(
        /// Round up to the next multiple of `expr`.
        round_up, RoundUp
    );
    binary_method!(
        /// Truncate to a multiple of `expr`.
        trunc, Truncation
    );
    binary_method!(
        /// Two-argument arctangent, in radians.
        atan2, Atan2, |a, b| a.atan2(b)
    );
    binary_method!(
        /// Euclidean distance: `sqrt(self² + expr²)`.
        hypot, Hypot, |a, b| a.hypot(b)
    );
    binary_method!(
        /// Approximate hypotenuse.
        hypotx, Hypotx
    );
    binary_method!(
        /// Ring modulation: `self * expr + self`.
        ring1, Ring1
    );
    binary_method!(
        /// Ring modulation: `self * expr + self + expr`.
        ring2, Ring2
    );
    binary_method!(
        /// Ring modulation: `self * self * expr`.
        ring3, Ring3
    );
    binary_method!(
        /// Ring modulation: `self * self * expr - self * expr * expr`.
        ring4, Ring4
    );
    binary_method!(
        /// Difference of squares: `self² - expr²`.
        difsqr, DifferenceOfSquares
    );
    binary_method!(
        /// Sum of squares: `self² + expr²`.
        sumsqr, SumOfSquares
    );
    binary_method!(
        /// Square of sum: `(self + expr)²`.
        sqrsum, SquareOfSum
    );
    binary_method!(
        /// Square of difference: `(self - expr)²`.
        sqrdif, SquareOfDifference
    );
    binary_method!(
        /// Absolute difference: `|self - expr|`.
        absdif, AbsoluteDifference
    );
    binary_method!(
        /// Threshold gate: `self` when `self >= expr`, else 0.
        thresh, Threshold
    );
    binary_method!(
        /// Amplitude clipping: `self * expr` when `expr > 0`, else 0.
        amclip, AmplitudeClipping
    );
    binary_method!(
        /// Scale the negative part of the signal by `expr`.
        scaleneg, ScaleNegative
    );
    binary_method!(
        /// Bilateral clipping into `[-expr, +expr]`.
        clip2, Clip2
    );
    binary_method!(
        /// Residual after `clip2`.
        excess, Excess
    );
    binary_method!(
        /// Bilateral folding into `[-expr, +expr]`.
        fold2, Fold2
    );
    binary_method!(
        /// Bilateral wrapping into `[-expr, +expr)`.
        wrap2, Wrap2
    );

    unary_method!(
        /// Absolute value.
        abs, AbsoluteValue, |x| x.abs()
    );
    unary_method!(
        /// Round towards positive infinity.
        ceil, Ceiling, |x| x.ceil()
    );
    unary_method!(
        /// Round towards negative infinity.
        floor, Floor, |x| x.floor()
    );
    unary_method!(
        /// Fractional part: `self - floor(self)`.
        frac, FractionalPart
    );
    unary_method!(
        /// Sign function: -1, 0, or 1.
        sign, Sign
    );
    unary_method!(
        /// Square: `self * self`.
        squared, Squared, |x| x * x
    );
    unary_method!(
        /// Cube: `self * self * self`.
        cubed, Cubed, |x| x * x * x
    );
    unary_method!(
        /// Square root.
        sqrt, SquareRoot, |x| x.sqrt()
    );
    unary_method!(
        /// Natural exponential.
        exp, Exponential, |x| x.exp()
    );
    unary_method!(
        /// Reciprocal: `1 / self`.
        reciprocal, Reciprocal, |x| 1.0 / x
    );
    unary_method!(
        /// MIDI note number to frequency in Hz (69 → 440).
        midicps, MidiCps
    );
    unary_method!(
        /// Frequency in Hz to MIDI note number (440 → 69).
        cpsmidi, CpsMidi
    );
    unary_method!(
        /// MIDI interval in semitones to frequency ratio (12 → 2).
        midiratio, MidiRatio
    );
    unary_method!(
        /// Frequency ratio to MIDI interval in semitones (2 → 12).
        ratiomidi, RatioMidi
    );
    unary_method!(
        /// Decibels to linear amplitude.
        dbamp, DbAmp
    );
    unary_method!(
        /// Linear amplitude to decibels.
        ampdb, AmpDb
    );
    unary_method!(
        /// Decimal octave notation to frequency in Hz.
        octcps, OctCps
    );
    unary_method!(
        /// Frequency in Hz to decimal octave notation.
        cpsoct, CpsOct
    );
    unary_method!(
        /// Natural logarithm.
        log, Log, |x| x.ln()
    );
    unary_method!(
        /// Base-2 logarithm.
        log2, Log2, |x| x.log2()
    );
    unary_method!(
        /// Base-10 logarithm.
        log10, Log10, |x| x.log10()
    );
    unary_method!(sin, Sin, |x| x.sin());
    unary_method!(cos, Cos, |x| x.cos());
    unary_method!(tan, Tan, |x| x.tan());
    unary_method!(asin, ArcSin, |x| x.asin());
    unary_method!(acos, ArcCos, |x| x.acos());
    unary_method!(atan, ArcTan, |x| x.atan());
    unary_method!(sinh, Sinh, |x| x.sinh());
    unary_method!(cosh, Cosh, |x| x.cosh());
    unary_method!(tanh, Tanh, |x| x.tanh());
    unary_method!(
        /// Nonlinear distortion: `self / (1 + |self|)`.
        distort, Distort
    );
    unary_method!(
        /// Soft clipping: linear below 0.5, asymptotic above.
        softclip, SoftClip
    );
}

macro_rules! binary_trait {
    ($trait_:ident, $method:ident, $operator:ident, $fold:expr) => {
        impl<T: Into<Signal>> std::ops::$trait_<T> for Signal {
            type Output = Signal;
            fn $method(self, rhs: T) -> Signal {
                binary_op(self, rhs.into(), BinaryOperator::$operator, $fold)
            }
        }

        impl<T: Into<Signal>> std::ops::$trait_<T> for &Signal {
            type Output = Signal;
            fn $method(self, rhs: T) -> Signal {
                binary_op(self.clone(), rhs.into(), BinaryOperator::$operator, $fold)
            }
        }
    };
}

binary_trait!(Add, add, Addition, Some(|a, b| a + b));
binary_trait!(Sub, sub, Subtraction, Some(|a, b| a - b));
binary_trait!(Mul, mul, Multiplication, Some(|a, b| a * b));
binary_trait!(Div, div, FloatDivision, Some(|a, b| a / b));
binary_trait!(Rem, rem, Modulo, Some(floored_mod));
binary_trait!(BitAnd, bitand, BitwiseAnd, None);
binary_trait!(BitOr, bitor, BitwiseOr, None);
binary_trait!(BitXor, bitxor, BitwiseXor, None);
binary_trait!(Shl, shl, ShiftLeft, None);
binary_trait!(Shr, shr, ShiftRight, None);

macro_rules! scalar_lhs_trait {
    ($trait_:ident, $method:ident, $operator:ident, $fold:expr) => {
        impl std::ops::$trait_<Signal> for f32 {
            type Output = Signal;
            fn $method(self, rhs: Signal) -> Signal {
                binary_op(
                    Signal::Const(self),
                    rhs,
                    BinaryOperator::$operator,
                    $fold,
                )
            }
        }

        impl std::ops::$trait_<&Signal> for f32 {
            type Output = Signal;
            fn $method(self, rhs: &Signal) -> Signal {
                binary_op(
                    Signal::Const(self),
                    rhs.clone(),
                    BinaryOperator::$operator,
                    $fold,
                )
            }
        }
    };
}

scalar_lhs_trait!(Add, add, Addition, Some(|a, b| a + b));
scalar_lhs_trait!(Sub, sub, Subtraction, Some(|a, b| a - b));
scalar_lhs_trait!(Mul, mul, Multiplication, Some(|a, b| a * b));
scalar_lhs_trait!(Div, div, FloatDivision, Some(|a, b| a / b));

impl std::ops::Neg for Signal {
    type Output = Signal;
    fn neg(self) -> Signal {
        match self {
            Signal::Vector(values) => {
                Signal::Vector(values.into_iter().map(|value| -value).collect())
            }
            signal => negate(signal),
        }
    }
}

impl std::ops::Neg for &Signal {
    type Output = Signal;
    fn neg(self) -> Signal {
        -self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_folding_arithmetic() {
        assert_eq!(Signal::from(2.0) + 3.0, Signal::Const(5.0));
        assert_eq!(Signal::from(2.0) - 3.0, Signal::Const(-1.0));
        assert_eq!(Signal::from(2.0) * 3.0, Signal::Const(6.0));
        assert_eq!(Signal::from(1.0) / 4.0, Signal::Const(0.25));
        assert_eq!(Signal::from(7.0).floor_div(2.0), Signal::Const(3.0));
        assert_eq!(Signal::from(2.0).pow(3.0), Signal::Const(8.0));
    }

    #[test]
    fn constant_folding_is_commutative_for_commutative_ops() {
        assert_eq!(Signal::from(2.0) + 3.0, Signal::from(3.0) + 2.0);
        assert_eq!(Signal::from(2.0) * 3.0, Signal::from(3.0) * 2.0);
    }

    #[test]
    fn floored_modulo_matches_server_semantics() {
        assert_eq!(Signal::from(7.0) % 2.0, Signal::Const(1.0));
        assert_eq!(Signal::from(-7.0) % 2.0, Signal::Const(1.0));
    }

    #[test]
    fn comparison_folding() {
        assert_eq!(Signal::from(3.0).le(5.0), Signal::Const(1.0));
        assert_eq!(Signal::from(3.0).ge(5.0), Signal::Const(0.0));
        assert_eq!(Signal::from(3.0).lt(5.0), Signal::Const(1.0));
        assert_eq!(Signal::from(3.0).gt(5.0), Signal::Const(0.0));
        assert_eq!(Signal::from(3.0).equal(3.0), Signal::Const(1.0));
        assert_eq!(Signal::from(3.0).not_equal(3.0), Signal::Const(0.0));
    }

    #[test]
    fn min_max_folding() {
        assert_eq!(Signal::from(3.0).min(5.0), Signal::Const(3.0));
        assert_eq!(Signal::from(3.0).max(5.0), Signal::Const(5.0));
    }

    #[test]
    fn unary_folding() {
        assert_eq!(Signal::from(9.0).sqrt(), Signal::Const(3.0));
        assert_eq!(Signal::from(0.0).sin(), Signal::Const(0.0));
        assert_eq!(Signal::from(-2.5).abs(), Signal::Const(2.5));
        assert_eq!(-Signal::from(2.0), Signal::Const(-2.0));
        assert_eq!(Signal::from(3.0).squared(), Signal::Const(9.0));
    }

    #[test]
    fn vector_ops_broadcast_pointwise() {
        let vector = Signal::from([1.0, 2.0, 3.0]) * 2.0;
        assert_eq!(
            vector,
            Signal::Vector(vec![
                Signal::Const(2.0),
                Signal::Const(4.0),
                Signal::Const(6.0),
            ])
        );
    }

    #[test]
    fn vector_length_one_broadcasts() {
        let result = Signal::from([10.0]) + Signal::from([1.0, 2.0]);
        assert_eq!(
            result,
            Signal::Vector(vec![Signal::Const(11.0), Signal::Const(12.0)])
        );
    }

    #[test]
    fn scalar_lhs_operators() {
        assert_eq!(2.0 * Signal::from(3.0), Signal::Const(6.0));
        assert_eq!(1.0 - Signal::from(0.25), Signal::Const(0.75));
    }

    #[test]
    fn rate_of_constants_is_scalar() {
        assert_eq!(
            Signal::from(440.0).calculation_rate(),
            CalculationRate::Scalar
        );
    }
}
