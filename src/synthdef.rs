//! SynthDef graphs: builder scopes, UGen declarations, and compilation to
//! an ordered, optimized graph.
//!
//! A [`SynthDefBuilder`] opens a thread-local scope. Every UGen constructed
//! while the scope is active registers itself with the innermost builder.
//! [`SynthDefBuilder::build`] snapshots the scope into an immutable
//! [`SynthDef`]: parameters are materialized into Control UGens, `LocalBuf`
//! bookkeeping is inserted, the graph is topologically sorted with
//! width-first hoisting, unused pure UGens are eliminated, and constants are
//! interned into a deduplicated pool.
//!
//! Concrete UGens are declared with the [`ugen!`] macro, which generates a
//! builder struct with defaulted inputs and one constructor per supported
//! calculation rate:
//!
//! ```
//! use magnon::ugens::{Out, SinOsc};
//! use magnon::SynthDefBuilder;
//!
//! let builder = SynthDefBuilder::new();
//! let sig = SinOsc::new().frequency(440.0).ar() * 0.3;
//! Out::new(sig).ar();
//! let synthdef = builder.build("sine").unwrap();
//! assert_eq!(synthdef.name(), Some("sine"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use crate::compiler::{self, CompileError};
use crate::enums::{BinaryOperator, CalculationRate, ParameterRate, UnaryOperator};
use crate::signal::{OutputProxy, Signal};

/// Errors raised while constructing or building a UGen graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A UGen input referenced an output proxy from a different builder
    /// scope.
    CrossScopeWiring { ugen: &'static str },
    /// Two parameters with the same name were registered on one builder.
    DuplicateParameter(String),
    /// The graph contains a cycle.
    Cycle,
    /// Vector operands of incompatible lengths were combined.
    MismatchedLengths { left: usize, right: usize },
    /// The builder contained no UGens.
    EmptyGraph,
    /// A vector landed on an input position that does not accept one.
    UnexpectedVector {
        ugen: &'static str,
        input: &'static str,
    },
    /// A parameter value was structurally invalid (e.g. empty).
    InvalidParameter(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::CrossScopeWiring { ugen } => {
                write!(f, "{}: UGen input in different scope", ugen)
            }
            GraphError::DuplicateParameter(name) => {
                write!(f, "Duplicate parameter name: '{}'", name)
            }
            GraphError::Cycle => write!(f, "UGen graph contains a cycle"),
            GraphError::MismatchedLengths { left, right } => write!(
                f,
                "Cannot broadcast vectors of lengths {} and {}",
                left, right
            ),
            GraphError::EmptyGraph => write!(f, "No UGens provided"),
            GraphError::UnexpectedVector { ugen, input } => {
                write!(f, "{}: unexpected vector for input '{}'", ugen, input)
            }
            GraphError::InvalidParameter(name) => {
                write!(f, "Invalid value for parameter '{}'", name)
            }
        }
    }
}

impl std::error::Error for GraphError {}

// ---------------------------------------------------------------------------
// Scope stack
// ---------------------------------------------------------------------------

const DETACHED_SCOPE: u64 = 0;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Default)]
struct ScopeState {
    id: u64,
    nodes: Vec<UGenNode>,
    parameters: Vec<(String, usize)>,
    errors: Vec<GraphError>,
}

thread_local! {
    static ACTIVE: RefCell<Vec<Rc<RefCell<ScopeState>>>> = const { RefCell::new(Vec::new()) };
    // UGens constructed outside any builder land here. They can be used in
    // free-standing expressions (tests) but are never compilable.
    static DETACHED: Rc<RefCell<ScopeState>> = Rc::new(RefCell::new(ScopeState {
        id: DETACHED_SCOPE,
        ..Default::default()
    }));
}

fn with_current<R>(f: impl FnOnce(&mut ScopeState) -> R) -> R {
    let scope = ACTIVE.with(|stack| stack.borrow().last().cloned());
    match scope {
        Some(scope) => {
            let mut scope = scope.borrow_mut();
            f(&mut scope)
        }
        None => DETACHED.with(|detached| {
            let mut detached = detached.borrow_mut();
            f(&mut detached)
        }),
    }
}

fn current_scope_id() -> u64 {
    with_current(|scope| scope.id)
}

fn deactivate(id: u64) {
    ACTIVE.with(|stack| {
        let mut stack = stack.borrow_mut();
        if let Some(position) = stack.iter().rposition(|scope| scope.borrow().id == id) {
            stack.remove(position);
        }
    });
}

/// Record a construction error in the active scope. Surfaced by `build`.
pub(crate) fn record_error(error: GraphError) {
    with_current(|scope| scope.errors.push(error));
}

/// Look up the class name of the UGen a proxy points at, if the proxy
/// belongs to the active scope.
pub(crate) fn node_name_of(proxy: &OutputProxy) -> Option<&'static str> {
    with_current(|scope| {
        if scope.id == proxy.scope {
            scope.nodes.get(proxy.ugen).map(|node| node.name)
        } else {
            None
        }
    })
}

// ---------------------------------------------------------------------------
// Graph nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Input {
    Constant(f32),
    Proxy { ugen: usize, output: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParameterSpec {
    pub name: String,
    pub value: Vec<f32>,
    pub rate: ParameterRate,
    pub lag: Option<f32>,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Standard,
    Parameter(ParameterSpec),
    Control(Vec<ParameterSpec>),
}

#[derive(Debug, Clone)]
pub(crate) struct UGenNode {
    pub name: &'static str,
    pub kind: NodeKind,
    pub rate: CalculationRate,
    pub special_index: i16,
    pub inputs: Vec<Input>,
    pub input_names: Vec<&'static str>,
    pub channel_count: u32,
    pub pure: bool,
    pub width_first: bool,
    pub has_done_flag: bool,
}

/// Output channel shape of a UGen class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outputs {
    /// A fixed number of output channels (possibly zero for sinks).
    Fixed(u32),
    /// Caller-selected channel count (`In`, `PlayBuf`, ...).
    Multi,
}

/// Shorthand used in `ugen!` flag lists.
pub const fn fixed(channels: u32) -> Outputs {
    Outputs::Fixed(channels)
}

/// Static description of a UGen class, consumed by [`construct`].
#[derive(Debug, Clone, Copy)]
pub struct UGenSpec {
    pub name: &'static str,
    pub pure: bool,
    pub width_first: bool,
    pub has_done_flag: bool,
    pub outputs: Outputs,
}

impl UGenSpec {
    pub const DEFAULT: UGenSpec = UGenSpec {
        name: "",
        pure: false,
        width_first: false,
        has_done_flag: false,
        outputs: Outputs::Fixed(1),
    };
}

// ---------------------------------------------------------------------------
// UGen construction and multichannel expansion
// ---------------------------------------------------------------------------

fn input_participates(values: &[Signal], unexpanded: bool) -> bool {
    !unexpanded || values.iter().any(|v| matches!(v, Signal::Vector(_)))
}

fn expansion_size(inputs: &[(&'static str, Signal, bool)]) -> usize {
    let mut size = 0;
    for (_, signal, unexpanded) in inputs {
        if let Signal::Vector(values) = signal {
            if input_participates(values, *unexpanded) {
                size = size.max(values.len());
            }
        }
    }
    size
}

/// Construct a UGen, applying multichannel expansion.
///
/// Vector-shaped inputs on expandable positions replicate the UGen; each
/// clone takes the `i % len`-th element of every participating input.
/// Positions marked unexpanded splat their elements into consecutive input
/// slots instead. Returns the UGen's output signal: a single proxy, a
/// vector of proxies, or an empty vector for sinks.
pub(crate) fn construct(
    spec: &UGenSpec,
    rate: CalculationRate,
    channels: Option<u32>,
    special_index: i16,
    inputs: Vec<(&'static str, Signal, bool)>,
) -> Signal {
    let size = expansion_size(&inputs);
    if size > 0 {
        let results = (0..size)
            .map(|i| {
                let element_inputs = inputs
                    .iter()
                    .map(|(name, signal, unexpanded)| {
                        let value = match signal {
                            Signal::Vector(values)
                                if !values.is_empty()
                                    && input_participates(values, *unexpanded) =>
                            {
                                values[i % values.len()].clone()
                            }
                            other => other.clone(),
                        };
                        (*name, value, *unexpanded)
                    })
                    .collect();
                construct(spec, rate, channels, special_index, element_inputs)
            })
            .collect();
        return Signal::Vector(results);
    }
    construct_single(spec, rate, channels, special_index, inputs)
}

/// Construct a `BinaryOpUGen`/`UnaryOpUGen` node. Operands are scalar; the
/// operator special index selects the operation.
pub(crate) fn construct_operator(
    name: &'static str,
    rate: CalculationRate,
    special_index: i16,
    inputs: Vec<(&'static str, Signal)>,
) -> Signal {
    let spec = UGenSpec {
        name,
        pure: true,
        ..UGenSpec::DEFAULT
    };
    construct_single(
        &spec,
        rate,
        None,
        special_index,
        inputs
            .into_iter()
            .map(|(name, signal)| (name, signal, false))
            .collect(),
    )
}

fn construct_single(
    spec: &UGenSpec,
    rate: CalculationRate,
    channels: Option<u32>,
    special_index: i16,
    inputs: Vec<(&'static str, Signal, bool)>,
) -> Signal {
    let channel_count = channels.unwrap_or(match spec.outputs {
        Outputs::Fixed(count) => count,
        Outputs::Multi => 1,
    });
    let scope_id = current_scope_id();
    let mut slots = Vec::new();
    let mut names = Vec::new();
    for (name, signal, unexpanded) in inputs {
        match signal {
            Signal::Vector(values) if unexpanded => {
                for value in values {
                    push_slot(spec, name, value, scope_id, &mut slots, &mut names);
                }
            }
            value => push_slot(spec, name, value, scope_id, &mut slots, &mut names),
        }
    }
    let node = UGenNode {
        name: spec.name,
        kind: NodeKind::Standard,
        rate,
        special_index,
        inputs: slots,
        input_names: names,
        channel_count,
        pure: spec.pure,
        width_first: spec.width_first,
        has_done_flag: spec.has_done_flag,
    };
    let index = with_current(|scope| {
        let index = scope.nodes.len();
        scope.nodes.push(node);
        index
    });
    match channel_count {
        0 => Signal::Vector(Vec::new()),
        1 => Signal::Output(OutputProxy {
            scope: scope_id,
            ugen: index,
            output: 0,
            rate,
        }),
        count => Signal::Vector(
            (0..count)
                .map(|output| {
                    Signal::Output(OutputProxy {
                        scope: scope_id,
                        ugen: index,
                        output,
                        rate,
                    })
                })
                .collect(),
        ),
    }
}

fn push_slot(
    spec: &UGenSpec,
    name: &'static str,
    value: Signal,
    scope_id: u64,
    slots: &mut Vec<Input>,
    names: &mut Vec<&'static str>,
) {
    match value {
        Signal::Const(constant) => {
            slots.push(Input::Constant(constant));
            names.push(name);
        }
        Signal::Output(proxy) => {
            if proxy.scope != scope_id {
                record_error(GraphError::CrossScopeWiring { ugen: spec.name });
            }
            slots.push(Input::Proxy {
                ugen: proxy.ugen,
                output: proxy.output,
            });
            names.push(name);
        }
        Signal::Vector(_) => {
            record_error(GraphError::UnexpectedVector {
                ugen: spec.name,
                input: name,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// ugen! declaration macro
// ---------------------------------------------------------------------------

/// Map a rate token (`ar`, `kr`, `ir`, `dr`) to its [`CalculationRate`].
macro_rules! rate_token {
    (ar) => {
        $crate::enums::CalculationRate::Audio
    };
    (kr) => {
        $crate::enums::CalculationRate::Control
    };
    (ir) => {
        $crate::enums::CalculationRate::Scalar
    };
    (dr) => {
        $crate::enums::CalculationRate::Demand
    };
}

macro_rules! default_value {
    (($expr:expr)) => {
        $crate::signal::Signal::from($expr)
    };
    ($lit:literal) => {
        $crate::signal::Signal::from($lit)
    };
}

macro_rules! unexpanded_flag {
    (unexpanded) => {
        true
    };
    ($other:tt) => {
        false
    };
}

/// Declare a UGen class.
///
/// ```ignore
/// ugen! {
///     /// Sine oscillator.
///     SinOsc[ar, kr](pure: true) {
///         frequency: 440.0,
///         phase: 0.0,
///     }
/// }
/// ```
///
/// Generates a builder struct with one [`Signal`] field per input, a
/// `new(...)` constructor taking the `required`/`unexpanded` inputs, a
/// setter per input, and one finisher per listed rate token. Flags are
/// [`UGenSpec`] field overrides (`pure`, `width_first`, `has_done_flag`,
/// `outputs`). The `multi(n)` prefix declares a caller-selected output
/// channel count with default `n` and generates a `channels(n)` setter.
/// Defaults that are not plain literals (negative numbers, constants) are
/// written in parentheses: `reply_id: (-1.0)`.
macro_rules! ugen {
    // Caller-selected channel count.
    (
        $(#[$meta:meta])*
        multi($default_channels:literal) $name:ident [ $($rate:ident),+ $(,)? ]
        $(( $($flag:ident : $flagval:expr),* $(,)? ))?
        { $($pname:ident : $pdef:tt),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            channel_count: u32,
            $($pname: $crate::signal::Signal,)*
        }

        impl $name {
            pub(crate) const SPEC: $crate::synthdef::UGenSpec = $crate::synthdef::UGenSpec {
                name: stringify!($name),
                outputs: $crate::synthdef::Outputs::Multi,
                $($($flag: $flagval,)*)?
                ..$crate::synthdef::UGenSpec::DEFAULT
            };

            $crate::synthdef::ugen!(@new_fn [channel_count: $default_channels,]; []; $($pname: $pdef,)*);

            /// Set the output channel count.
            pub fn channels(mut self, channel_count: u32) -> Self {
                self.channel_count = channel_count;
                self
            }

            $(
                pub fn $pname(mut self, value: impl Into<$crate::signal::Signal>) -> Self {
                    self.$pname = value.into();
                    self
                }
            )*

            $(
                pub fn $rate(self) -> $crate::signal::Signal {
                    let channels = Some(self.channel_count);
                    self.construct_at($crate::synthdef::rate_token!($rate), channels)
                }
            )+

            fn construct_at(
                self,
                rate: $crate::enums::CalculationRate,
                channels: Option<u32>,
            ) -> $crate::signal::Signal {
                $crate::synthdef::construct(
                    &Self::SPEC,
                    rate,
                    channels,
                    0,
                    vec![$((
                        stringify!($pname),
                        self.$pname,
                        $crate::synthdef::unexpanded_flag!($pdef),
                    ),)*],
                )
            }
        }
    };

    // Fixed channel count, taken from the class's UGenSpec (default 1).
    (
        $(#[$meta:meta])*
        $name:ident [ $($rate:ident),+ $(,)? ]
        $(( $($flag:ident : $flagval:expr),* $(,)? ))?
        { $($pname:ident : $pdef:tt),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            $($pname: $crate::signal::Signal,)*
        }

        impl $name {
            pub(crate) const SPEC: $crate::synthdef::UGenSpec = $crate::synthdef::UGenSpec {
                name: stringify!($name),
                $($($flag: $flagval,)*)?
                ..$crate::synthdef::UGenSpec::DEFAULT
            };

            $crate::synthdef::ugen!(@new_fn []; []; $($pname: $pdef,)*);

            $(
                pub fn $pname(mut self, value: impl Into<$crate::signal::Signal>) -> Self {
                    self.$pname = value.into();
                    self
                }
            )*

            $(
                pub fn $rate(self) -> $crate::signal::Signal {
                    self.construct_at($crate::synthdef::rate_token!($rate), None)
                }
            )+

            fn construct_at(
                self,
                rate: $crate::enums::CalculationRate,
                channels: Option<u32>,
            ) -> $crate::signal::Signal {
                $crate::synthdef::construct(
                    &Self::SPEC,
                    rate,
                    channels,
                    0,
                    vec![$((
                        stringify!($pname),
                        self.$pname,
                        $crate::synthdef::unexpanded_flag!($pdef),
                    ),)*],
                )
            }
        }
    };

    // new() generation: required/unexpanded inputs become arguments in
    // declaration order, defaulted inputs take their default.
    (@new_fn [$($seed:tt)*]; [$($req:ident)*];) => {
        pub fn new($($req: impl Into<$crate::signal::Signal>),*) -> Self {
            Self { $($seed)* }
        }
    };
    (@new_fn [$($seed:tt)*]; [$($req:ident)*]; $p:ident: required, $($rest:tt)*) => {
        $crate::synthdef::ugen!(@new_fn [$($seed)* $p: $p.into(),]; [$($req)* $p]; $($rest)*);
    };
    (@new_fn [$($seed:tt)*]; [$($req:ident)*]; $p:ident: unexpanded, $($rest:tt)*) => {
        $crate::synthdef::ugen!(@new_fn [$($seed)* $p: $p.into(),]; [$($req)* $p]; $($rest)*);
    };
    (@new_fn [$($seed:tt)*]; [$($req:ident)*]; $p:ident: $def:tt, $($rest:tt)*) => {
        $crate::synthdef::ugen!(
            @new_fn [$($seed)* $p: $crate::synthdef::default_value!($def),];
            [$($req)*];
            $($rest)*
        );
    };
}

pub(crate) use {default_value, rate_token, ugen, unexpanded_flag};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// A SynthDef parameter descriptor: default value(s), rate, optional lag.
///
/// Built from plain values or via [`control`]:
///
/// ```
/// use magnon::{control, ParameterRate, SynthDefBuilder};
///
/// let builder = SynthDefBuilder::new();
/// let freq = builder.add_parameter("freq", 440.0).unwrap();
/// let amp = builder
///     .add_parameter("amp", control(0.3).lag(0.1))
///     .unwrap();
/// let bus = builder
///     .add_parameter("bus", (ParameterRate::Scalar, 0.0))
///     .unwrap();
/// # let _ = (freq, amp, bus);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    value: Vec<f32>,
    rate: ParameterRate,
    lag: Option<f32>,
}

impl Parameter {
    /// Set the parameter rate.
    pub fn rate(mut self, rate: ParameterRate) -> Self {
        self.rate = rate;
        self
    }

    /// Set a lag time in seconds. Control-rate parameters with a lag are
    /// materialized into a `LagControl`.
    pub fn lag(mut self, lag: f32) -> Self {
        self.lag = Some(lag);
        self
    }
}

/// Define a control-rate parameter with the given default value.
pub fn control(value: impl Into<Parameter>) -> Parameter {
    value.into()
}

impl From<f32> for Parameter {
    fn from(value: f32) -> Self {
        Parameter {
            value: vec![value],
            rate: ParameterRate::Control,
            lag: None,
        }
    }
}

impl From<i32> for Parameter {
    fn from(value: i32) -> Self {
        Parameter::from(value as f32)
    }
}

impl From<Vec<f32>> for Parameter {
    fn from(value: Vec<f32>) -> Self {
        Parameter {
            value,
            rate: ParameterRate::Control,
            lag: None,
        }
    }
}

impl From<&[f32]> for Parameter {
    fn from(value: &[f32]) -> Self {
        Parameter::from(value.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for Parameter {
    fn from(value: [f32; N]) -> Self {
        Parameter::from(value.to_vec())
    }
}

impl From<(ParameterRate, f32)> for Parameter {
    fn from((rate, value): (ParameterRate, f32)) -> Self {
        Parameter {
            value: vec![value],
            rate,
            lag: None,
        }
    }
}

impl From<(ParameterRate, f32, f32)> for Parameter {
    fn from((rate, value, lag): (ParameterRate, f32, f32)) -> Self {
        Parameter {
            value: vec![value],
            rate,
            lag: Some(lag),
        }
    }
}

// ---------------------------------------------------------------------------
// SynthDefBuilder
// ---------------------------------------------------------------------------

/// Scope-bounded collector for SynthDef UGen graphs.
///
/// Creating a builder pushes a scope onto the thread-local stack; UGens
/// constructed afterwards register with it. [`build`](Self::build) pops the
/// scope and freezes the graph. Dropping the builder without building
/// simply discards the scope.
pub struct SynthDefBuilder {
    scope: Rc<RefCell<ScopeState>>,
    id: u64,
}

impl Default for SynthDefBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthDefBuilder {
    pub fn new() -> Self {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        let scope = Rc::new(RefCell::new(ScopeState {
            id,
            ..Default::default()
        }));
        ACTIVE.with(|stack| stack.borrow_mut().push(scope.clone()));
        Self { scope, id }
    }

    /// Register a named parameter, returning its signal (a single control
    /// proxy, or a vector for multi-value parameters).
    pub fn add_parameter(
        &self,
        name: &str,
        parameter: impl Into<Parameter>,
    ) -> Result<Signal, GraphError> {
        let parameter = parameter.into();
        if parameter.value.is_empty() {
            return Err(GraphError::InvalidParameter(name.to_string()));
        }
        let mut scope = self.scope.borrow_mut();
        if scope.parameters.iter().any(|(existing, _)| existing == name) {
            return Err(GraphError::DuplicateParameter(name.to_string()));
        }
        let spec = ParameterSpec {
            name: name.to_string(),
            value: parameter.value,
            rate: parameter.rate,
            lag: parameter.lag,
        };
        let rate = CalculationRate::from(spec.rate);
        let channel_count = spec.value.len() as u32;
        let index = scope.nodes.len();
        scope.nodes.push(UGenNode {
            name: "Parameter",
            kind: NodeKind::Parameter(spec),
            rate,
            special_index: 0,
            inputs: Vec::new(),
            input_names: Vec::new(),
            channel_count,
            pure: false,
            width_first: false,
            has_done_flag: false,
        });
        scope.parameters.push((name.to_string(), index));
        Ok(self.parameter_signal(index, channel_count, rate))
    }

    /// Look up a previously registered parameter by name.
    pub fn parameter(&self, name: &str) -> Option<Signal> {
        let scope = self.scope.borrow();
        let &(_, index) = scope
            .parameters
            .iter()
            .find(|(existing, _)| existing == name)?;
        let node = &scope.nodes[index];
        Some(self.parameter_signal(index, node.channel_count, node.rate))
    }

    fn parameter_signal(&self, index: usize, channel_count: u32, rate: CalculationRate) -> Signal {
        let mut proxies = (0..channel_count).map(|output| {
            Signal::Output(OutputProxy {
                scope: self.id,
                ugen: index,
                output,
                rate,
            })
        });
        if channel_count == 1 {
            proxies.next().unwrap_or(Signal::Const(0.0))
        } else {
            Signal::Vector(proxies.collect())
        }
    }

    /// Freeze the scope into a named [`SynthDef`].
    pub fn build(self, name: &str) -> Result<SynthDef, GraphError> {
        self.finish(Some(name), true)
    }

    /// Freeze the scope into an anonymous [`SynthDef`] whose effective name
    /// is a hash of the compiled graph.
    pub fn build_anonymous(self) -> Result<SynthDef, GraphError> {
        self.finish(None, true)
    }

    /// Freeze with explicit control over naming and dead-code elimination.
    pub fn build_with(self, name: Option<&str>, optimize: bool) -> Result<SynthDef, GraphError> {
        self.finish(name, optimize)
    }

    fn finish(self, name: Option<&str>, optimize: bool) -> Result<SynthDef, GraphError> {
        deactivate(self.id);
        let state = self.scope.borrow().clone();
        build_graph(state, name, optimize)
    }
}

impl Drop for SynthDefBuilder {
    fn drop(&mut self) {
        deactivate(self.id);
    }
}

// ---------------------------------------------------------------------------
// Build pipeline
// ---------------------------------------------------------------------------

fn build_graph(
    state: ScopeState,
    name: Option<&str>,
    optimize: bool,
) -> Result<SynthDef, GraphError> {
    if let Some(error) = state.errors.into_iter().next() {
        return Err(error);
    }
    let nodes = materialize_controls(state.nodes);
    let nodes = cleanup_local_bufs(nodes);
    let nodes = sort_topologically(nodes)?;
    let nodes = if optimize {
        eliminate_dead_code(nodes)
    } else {
        nodes
    };
    freeze(nodes, name)
}

/// Group parameters by rate, emit one Control-family UGen per non-empty
/// group at the head of the list, and rewrite parameter proxies into
/// control output proxies.
fn materialize_controls(nodes: Vec<UGenNode>) -> Vec<UGenNode> {
    let mut parameter_indices: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| matches!(node.kind, NodeKind::Parameter(_)))
        .map(|(index, _)| index)
        .collect();
    parameter_indices.sort_by(|&a, &b| {
        let name_of = |index: usize| match &nodes[index].kind {
            NodeKind::Parameter(spec) => spec.name.clone(),
            _ => String::new(),
        };
        name_of(a).cmp(&name_of(b))
    });

    let mut controls: Vec<UGenNode> = Vec::new();
    // (parameter node index, channel) -> (control position, control output)
    let mut parameter_map: HashMap<(usize, u32), (usize, u32)> = HashMap::new();
    let mut starting_control_index = 0u32;
    for rate in ParameterRate::ALL {
        let group: Vec<usize> = parameter_indices
            .iter()
            .copied()
            .filter(|&index| match &nodes[index].kind {
                NodeKind::Parameter(spec) => spec.rate == rate,
                _ => false,
            })
            .collect();
        if group.is_empty() {
            continue;
        }
        let specs: Vec<ParameterSpec> = group
            .iter()
            .map(|&index| match &nodes[index].kind {
                NodeKind::Parameter(spec) => spec.clone(),
                _ => unreachable!("parameter group contains a non-parameter node"),
            })
            .collect();
        let (control_name, control_rate) = match rate {
            ParameterRate::Scalar => ("Control", CalculationRate::Scalar),
            ParameterRate::Trigger => ("TrigControl", CalculationRate::Control),
            ParameterRate::Audio => ("AudioControl", CalculationRate::Audio),
            ParameterRate::Control => {
                if specs.iter().any(|spec| spec.lag.is_some()) {
                    ("LagControl", CalculationRate::Control)
                } else {
                    ("Control", CalculationRate::Control)
                }
            }
        };
        let channel_count: u32 = specs.iter().map(|spec| spec.value.len() as u32).sum();
        let (inputs, input_names) = if control_name == "LagControl" {
            let mut lags = Vec::new();
            for spec in &specs {
                for _ in 0..spec.value.len() {
                    lags.push(Input::Constant(spec.lag.unwrap_or(0.0)));
                }
            }
            let names = vec!["lags"; lags.len()];
            (lags, names)
        } else {
            (Vec::new(), Vec::new())
        };
        let control_position = controls.len();
        let mut output_index = 0u32;
        for &parameter_index in &group {
            for channel in 0..nodes[parameter_index].channel_count {
                parameter_map.insert(
                    (parameter_index, channel),
                    (control_position, output_index),
                );
                output_index += 1;
            }
        }
        controls.push(UGenNode {
            name: control_name,
            kind: NodeKind::Control(specs),
            rate: control_rate,
            special_index: starting_control_index as i16,
            inputs,
            input_names,
            channel_count,
            pure: false,
            width_first: false,
            has_done_flag: false,
        });
        starting_control_index += channel_count;
    }

    let control_count = controls.len();
    let mut result = controls;
    let mut old_to_new: HashMap<usize, usize> = HashMap::new();
    for (old_index, node) in nodes.into_iter().enumerate() {
        if matches!(node.kind, NodeKind::Parameter(_)) {
            continue;
        }
        old_to_new.insert(old_index, result.len());
        result.push(node);
    }
    for node in result.iter_mut().skip(control_count) {
        for input in &mut node.inputs {
            if let Input::Proxy { ugen, output } = input {
                if let Some(&(control, control_output)) = parameter_map.get(&(*ugen, *output)) {
                    *ugen = control;
                    *output = control_output;
                } else if let Some(&new_index) = old_to_new.get(ugen) {
                    *ugen = new_index;
                }
            }
        }
    }
    result
}

/// Insert a `MaxLocalBufs` ahead of the first `LocalBuf` and wire every
/// `LocalBuf` to it. Pre-existing unreferenced `MaxLocalBufs` are rebuilt.
fn cleanup_local_bufs(mut nodes: Vec<UGenNode>) -> Vec<UGenNode> {
    if !nodes.iter().any(|node| node.name == "LocalBuf") {
        return nodes;
    }
    // Drop stale MaxLocalBufs that nothing references; the pass recreates
    // one with the correct count.
    let referenced: Vec<bool> = {
        let mut referenced = vec![false; nodes.len()];
        for node in &nodes {
            for input in &node.inputs {
                if let Input::Proxy { ugen, .. } = input {
                    referenced[*ugen] = true;
                }
            }
        }
        referenced
    };
    let removable: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(index, node)| node.name == "MaxLocalBufs" && !referenced[*index])
        .map(|(index, _)| index)
        .collect();
    if !removable.is_empty() {
        let mut remap = vec![0usize; nodes.len()];
        let mut kept = Vec::with_capacity(nodes.len() - removable.len());
        for (index, node) in nodes.into_iter().enumerate() {
            if removable.contains(&index) {
                continue;
            }
            remap[index] = kept.len();
            kept.push(node);
        }
        for node in &mut kept {
            for input in &mut node.inputs {
                if let Input::Proxy { ugen, .. } = input {
                    *ugen = remap[*ugen];
                }
            }
        }
        nodes = kept;
    }

    let local_bufs: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.name == "LocalBuf")
        .map(|(index, _)| index)
        .collect();
    let insert_position = local_bufs[0];
    nodes.insert(
        insert_position,
        UGenNode {
            name: "MaxLocalBufs",
            kind: NodeKind::Standard,
            rate: CalculationRate::Scalar,
            special_index: 0,
            inputs: vec![Input::Constant(local_bufs.len() as f32)],
            input_names: vec!["maximum"],
            channel_count: 1,
            pure: false,
            width_first: false,
            has_done_flag: false,
        },
    );
    for node in &mut nodes {
        for input in &mut node.inputs {
            if let Input::Proxy { ugen, .. } = input {
                if *ugen >= insert_position {
                    *ugen += 1;
                }
            }
        }
    }
    for local_buf in local_bufs {
        let index = local_buf + 1;
        nodes[index].inputs.truncate(2);
        nodes[index].input_names.truncate(2);
        nodes[index].inputs.push(Input::Proxy {
            ugen: insert_position,
            output: 0,
        });
        nodes[index].input_names.push("max_local_bufs");
    }
    nodes
}

struct SortBundle {
    antecedents: Vec<usize>,
    descendants: Vec<usize>,
}

fn initiate_sort(nodes: &[UGenNode]) -> Vec<SortBundle> {
    let mut width_first_antecedents: Vec<Vec<usize>> = Vec::with_capacity(nodes.len());
    let mut accumulated: Vec<usize> = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        width_first_antecedents.push(accumulated.clone());
        if node.width_first {
            accumulated.push(index);
        }
    }
    let mut bundles: Vec<SortBundle> = (0..nodes.len())
        .map(|_| SortBundle {
            antecedents: Vec::new(),
            descendants: Vec::new(),
        })
        .collect();
    for (index, node) in nodes.iter().enumerate() {
        for input in &node.inputs {
            if let Input::Proxy { ugen, .. } = input {
                if !bundles[index].antecedents.contains(ugen) {
                    bundles[index].antecedents.push(*ugen);
                }
                if !bundles[*ugen].descendants.contains(&index) {
                    bundles[*ugen].descendants.push(index);
                }
            }
        }
        for &antecedent in &width_first_antecedents[index] {
            if !bundles[index].antecedents.contains(&antecedent) {
                bundles[index].antecedents.push(antecedent);
            }
            if !bundles[antecedent].descendants.contains(&index) {
                bundles[antecedent].descendants.push(index);
            }
        }
    }
    // Descendants are visited in insertion-index order; this is what makes
    // the sort deterministic.
    for bundle in &mut bundles {
        bundle.descendants.sort_unstable();
    }
    bundles
}

fn sort_topologically(nodes: Vec<UGenNode>) -> Result<Vec<UGenNode>, GraphError> {
    let mut bundles = initiate_sort(&nodes);
    let mut available: Vec<usize> = Vec::new();
    for index in (0..nodes.len()).rev() {
        if bundles[index].antecedents.is_empty() && !available.contains(&index) {
            available.push(index);
        }
    }
    let mut order: Vec<usize> = Vec::with_capacity(nodes.len());
    while let Some(index) = available.pop() {
        let descendants = bundles[index].descendants.clone();
        for &descendant in descendants.iter().rev() {
            bundles[descendant]
                .antecedents
                .retain(|&antecedent| antecedent != index);
            if bundles[descendant].antecedents.is_empty() && !available.contains(&descendant) {
                available.push(descendant);
            }
        }
        order.push(index);
    }
    if order.len() != nodes.len() {
        return Err(GraphError::Cycle);
    }
    Ok(reorder(nodes, &order))
}

fn reorder(nodes: Vec<UGenNode>, order: &[usize]) -> Vec<UGenNode> {
    let mut position = vec![0usize; nodes.len()];
    for (new_index, &old_index) in order.iter().enumerate() {
        position[old_index] = new_index;
    }
    let mut by_old: Vec<Option<UGenNode>> = nodes.into_iter().map(Some).collect();
    let mut result: Vec<UGenNode> = order
        .iter()
        .map(|&old_index| by_old[old_index].take().expect("node reordered twice"))
        .collect();
    for node in &mut result {
        for input in &mut node.inputs {
            if let Input::Proxy { ugen, .. } = input {
                *ugen = position[*ugen];
            }
        }
    }
    result
}

/// Remove pure UGens with no consumers, cascading to newly orphaned
/// antecedents.
fn eliminate_dead_code(nodes: Vec<UGenNode>) -> Vec<UGenNode> {
    let mut bundles = initiate_sort(&nodes);
    let mut alive = vec![true; nodes.len()];
    let mut work: Vec<usize> = (0..nodes.len()).collect();
    while let Some(index) = work.pop() {
        if !alive[index] || !nodes[index].pure || !bundles[index].descendants.is_empty() {
            continue;
        }
        alive[index] = false;
        let antecedents = std::mem::take(&mut bundles[index].antecedents);
        for antecedent in antecedents {
            if !alive[antecedent] {
                continue;
            }
            bundles[antecedent]
                .descendants
                .retain(|&descendant| descendant != index);
            work.push(antecedent);
        }
    }
    let mut remap = vec![usize::MAX; nodes.len()];
    let mut result = Vec::new();
    for (index, node) in nodes.into_iter().enumerate() {
        if alive[index] {
            remap[index] = result.len();
            result.push(node);
        }
    }
    for node in &mut result {
        for input in &mut node.inputs {
            if let Input::Proxy { ugen, .. } = input {
                *ugen = remap[*ugen];
            }
        }
    }
    result
}

fn freeze(nodes: Vec<UGenNode>, name: Option<&str>) -> Result<SynthDef, GraphError> {
    if nodes.is_empty() {
        return Err(GraphError::EmptyGraph);
    }
    let mut constants: Vec<f32> = Vec::new();
    let mut constant_indices: HashMap<u32, u32> = HashMap::new();
    let mut parameters: Vec<ParameterInfo> = Vec::new();
    let mut ugens: Vec<CompiledUGen> = Vec::new();
    for node in &nodes {
        if let NodeKind::Control(specs) = &node.kind {
            let mut index = node.special_index as u32;
            for spec in specs {
                parameters.push(ParameterInfo {
                    name: spec.name.clone(),
                    index,
                    value: spec.value.clone(),
                    rate: spec.rate,
                    lag: spec.lag,
                });
                index += spec.value.len() as u32;
            }
        }
        let inputs = node
            .inputs
            .iter()
            .map(|input| match input {
                Input::Constant(value) => {
                    let bits = value.to_bits();
                    let index = *constant_indices.entry(bits).or_insert_with(|| {
                        constants.push(*value);
                        (constants.len() - 1) as u32
                    });
                    CompiledInput::Constant(index)
                }
                Input::Proxy { ugen, output } => CompiledInput::UGen {
                    index: *ugen as u32,
                    output: *output,
                },
            })
            .collect();
        let control_names = match &node.kind {
            NodeKind::Control(specs) => specs.iter().map(|spec| spec.name.clone()).collect(),
            _ => Vec::new(),
        };
        ugens.push(CompiledUGen {
            name: node.name,
            rate: node.rate,
            special_index: node.special_index,
            inputs,
            input_names: node.input_names.clone(),
            output_count: node.channel_count,
            has_done_flag: node.has_done_flag,
            control_names,
        });
    }
    Ok(SynthDef {
        name: name.map(str::to_string),
        ugens,
        constants,
        parameters,
        anonymous_name: OnceLock::new(),
    })
}

// ---------------------------------------------------------------------------
// SynthDef
// ---------------------------------------------------------------------------

/// One input slot of a compiled UGen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompiledInput {
    /// Index into the constant pool.
    Constant(u32),
    /// Output `output` of the UGen at `index` in the sorted list.
    UGen { index: u32, output: u32 },
}

/// A UGen record in a compiled SynthDef.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUGen {
    pub(crate) name: &'static str,
    pub(crate) rate: CalculationRate,
    pub(crate) special_index: i16,
    pub(crate) inputs: Vec<CompiledInput>,
    pub(crate) input_names: Vec<&'static str>,
    pub(crate) output_count: u32,
    pub(crate) has_done_flag: bool,
    pub(crate) control_names: Vec<String>,
}

impl CompiledUGen {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn calculation_rate(&self) -> CalculationRate {
        self.rate
    }

    pub fn special_index(&self) -> i16 {
        self.special_index
    }

    pub fn inputs(&self) -> &[CompiledInput] {
        &self.inputs
    }

    pub fn output_count(&self) -> u32 {
        self.output_count
    }

    pub fn has_done_flag(&self) -> bool {
        self.has_done_flag
    }

    /// Names of the parameters exposed by this UGen, when it is a
    /// Control-family UGen; empty otherwise.
    pub fn control_names(&self) -> &[String] {
        &self.control_names
    }
}

/// A named SynthDef parameter and its index into the parameter-value table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub index: u32,
    pub value: Vec<f32>,
    pub rate: ParameterRate,
    pub lag: Option<f32>,
}

/// An immutable, compiled UGen graph ready for SCgf serialization.
///
/// Produced by [`SynthDefBuilder::build`]. Inputs of every UGen reference
/// only UGens earlier in the list or the constant pool.
#[derive(Debug)]
pub struct SynthDef {
    name: Option<String>,
    ugens: Vec<CompiledUGen>,
    constants: Vec<f32>,
    parameters: Vec<ParameterInfo>,
    anonymous_name: OnceLock<String>,
}

impl PartialEq for SynthDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ugens == other.ugens
            && self.constants == other.constants
            && self.parameters == other.parameters
    }
}

impl fmt::Display for SynthDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SynthDef: {}>", self.effective_name())
    }
}

impl SynthDef {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The given name, or the anonymous hash name when unnamed.
    pub fn effective_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.anonymous_name(),
        }
    }

    /// Hex digest of the compiled graph, used to name anonymous SynthDefs.
    pub fn anonymous_name(&self) -> &str {
        self.anonymous_name
            .get_or_init(|| compiler::graph_digest(self))
    }

    pub fn ugens(&self) -> &[CompiledUGen] {
        &self.ugens
    }

    pub fn constants(&self) -> &[f32] {
        &self.constants
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|info| info.name == name)
    }

    /// Flattened parameter default values, in control order.
    pub fn parameter_values(&self) -> Vec<f32> {
        self.parameters
            .iter()
            .flat_map(|info| info.value.iter().copied())
            .collect()
    }

    /// Serialize to SCgf bytes.
    pub fn compile(&self) -> Result<Vec<u8>, CompileError> {
        compiler::compile_synthdefs(&[self], false)
    }

    /// Human-readable representation of the sorted UGen graph.
    pub fn dump_ugens(&self) -> String {
        let mut lines = vec![format!("SynthDef: {}", self.effective_name())];
        for (index, ugen) in self.ugens.iter().enumerate() {
            let rate = ugen.rate.token();
            let line = if !ugen.control_names.is_empty() {
                format!(
                    "  {}: {}.{} - [{}]",
                    index,
                    ugen.name,
                    rate,
                    ugen.control_names.join(", ")
                )
            } else {
                let inputs = ugen
                    .inputs
                    .iter()
                    .zip(&ugen.input_names)
                    .map(|(input, name)| match input {
                        CompiledInput::Constant(constant) => {
                            format!("{}: {}", name, self.constants[*constant as usize])
                        }
                        CompiledInput::UGen { index, output } => {
                            format!(
                                "{}: {}[{}]",
                                name, self.ugens[*index as usize].name, output
                            )
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let operator = match ugen.name {
                    "BinaryOpUGen" => BinaryOperator::from_special_index(ugen.special_index)
                        .map(|op| format!("{}, ", op)),
                    "UnaryOpUGen" => UnaryOperator::from_special_index(ugen.special_index)
                        .map(|op| format!("{}, ", op)),
                    _ => None,
                };
                let mut line = format!(
                    "  {}: {}.{}({}{})",
                    index,
                    ugen.name,
                    rate,
                    operator.unwrap_or_default(),
                    inputs
                );
                if ugen.output_count > 1 {
                    line.push_str(&format!(" -> {} outputs", ugen.output_count));
                }
                line
            };
            lines.push(line);
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    ugen! {
        /// Test oscillator.
        TestOsc[ar, kr](pure: true) {
            frequency: 440.0,
            phase: 0.0,
        }
    }

    ugen! {
        /// Test noise source (impure).
        TestNoise[ar] {}
    }

    ugen! {
        /// Test filter.
        TestFilter[ar, kr](pure: true) {
            source: required,
            frequency: 1000.0,
        }
    }

    ugen! {
        /// Test bus output sink.
        TestSink[ar, kr](outputs: fixed(0)) {
            bus: 0,
            source: unexpanded,
        }
    }

    ugen! {
        /// Test stereo panner.
        TestPanner[ar](outputs: fixed(2)) {
            source: required,
            position: 0.0,
        }
    }

    ugen! {
        /// Test multichannel bus input.
        multi(1) TestIn[ar, kr] {
            bus: 0.0,
        }
    }

    fn names(synthdef: &SynthDef) -> Vec<&'static str> {
        synthdef.ugens().iter().map(|u| u.name()).collect()
    }

    #[test]
    fn sink_before_source_sorts_source_first() {
        let builder = SynthDefBuilder::new();
        TestSink::new(TestOsc::new().ar()).ar();
        let synthdef = builder.build("test").unwrap();
        assert_eq!(names(&synthdef), vec!["TestOsc", "TestSink"]);
    }

    #[test]
    fn chain_is_ordered() {
        let builder = SynthDefBuilder::new();
        let sig = TestOsc::new().ar();
        let sig = TestFilter::new(sig).ar();
        TestSink::new(sig).ar();
        let synthdef = builder.build("test").unwrap();
        assert_eq!(names(&synthdef), vec!["TestOsc", "TestFilter", "TestSink"]);
    }

    #[test]
    fn multichannel_expansion_clones_ugens() {
        let builder = SynthDefBuilder::new();
        let result = TestOsc::new().frequency([440.0, 443.0]).ar();
        assert_eq!(result.channel_count(), 2);
        TestSink::new(result).ar();
        let synthdef = builder.build("test").unwrap();
        assert_eq!(
            names(&synthdef),
            vec!["TestOsc", "TestOsc", "TestSink"]
        );
    }

    #[test]
    fn expanded_constants_are_wired_per_clone() {
        let builder = SynthDefBuilder::new();
        TestSink::new(TestOsc::new().frequency([440.0, 880.0]).ar()).ar();
        let synthdef = builder.build("test").unwrap();
        let oscs: Vec<&CompiledUGen> = synthdef
            .ugens()
            .iter()
            .filter(|u| u.name() == "TestOsc")
            .collect();
        assert_eq!(oscs.len(), 2);
        let freq_of = |ugen: &CompiledUGen| match ugen.inputs()[0] {
            CompiledInput::Constant(index) => synthdef.constants()[index as usize],
            _ => panic!("expected constant input"),
        };
        assert_eq!(freq_of(oscs[0]), 440.0);
        assert_eq!(freq_of(oscs[1]), 880.0);
    }

    #[test]
    fn multichannel_output_ugen() {
        let builder = SynthDefBuilder::new();
        let sig = TestIn::new().channels(4).ar();
        assert_eq!(sig.channel_count(), 4);
        TestSink::new(sig).ar();
        let synthdef = builder.build("test").unwrap();
        let input = &synthdef.ugens()[0];
        assert_eq!(input.name(), "TestIn");
        assert_eq!(input.output_count(), 4);
        assert_eq!(synthdef.ugens()[1].inputs().len(), 5);
    }

    #[test]
    fn fixed_output_counts() {
        let builder = SynthDefBuilder::new();
        let panned = TestPanner::new(TestOsc::new().ar()).ar();
        assert_eq!(panned.channel_count(), 2);
        TestSink::new(panned).ar();
        let synthdef = builder.build("test").unwrap();
        let panner = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "TestPanner")
            .unwrap();
        assert_eq!(panner.output_count(), 2);
        let sink = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "TestSink")
            .unwrap();
        assert_eq!(sink.output_count(), 0);
    }

    #[test]
    fn operators_create_operator_ugens() {
        let builder = SynthDefBuilder::new();
        let sig = TestOsc::new().ar() * 0.5;
        TestSink::new(sig).ar();
        let synthdef = builder.build("test").unwrap();
        let op = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "BinaryOpUGen")
            .unwrap();
        assert_eq!(
            op.special_index(),
            BinaryOperator::Multiplication as i16
        );
        assert_eq!(op.calculation_rate(), CalculationRate::Audio);
    }

    #[test]
    fn multiply_by_one_is_identity() {
        let builder = SynthDefBuilder::new();
        TestSink::new(TestOsc::new().ar() * 1.0).ar();
        let synthdef = builder.build("test").unwrap();
        assert!(!names(&synthdef).contains(&"BinaryOpUGen"));
    }

    #[test]
    fn add_zero_is_identity() {
        let builder = SynthDefBuilder::new();
        TestSink::new(TestOsc::new().ar() + 0.0).ar();
        let synthdef = builder.build("test").unwrap();
        assert!(!names(&synthdef).contains(&"BinaryOpUGen"));
    }

    #[test]
    fn multiply_by_zero_collapses_to_constant() {
        let builder = SynthDefBuilder::new();
        let sig = TestOsc::new().ar() * 0.0;
        assert_eq!(sig, Signal::Const(0.0));
        drop(builder);
    }

    #[test]
    fn power_identities() {
        let builder = SynthDefBuilder::new();
        let osc = TestOsc::new().ar();
        assert_eq!(osc.clone().pow(0.0), Signal::Const(1.0));
        assert_eq!(osc.clone().pow(1.0), osc);
        drop(builder);
    }

    #[test]
    fn negation_creates_unary_op() {
        let builder = SynthDefBuilder::new();
        TestSink::new(-TestOsc::new().ar()).ar();
        let synthdef = builder.build("test").unwrap();
        let op = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "UnaryOpUGen")
            .unwrap();
        assert_eq!(op.special_index(), UnaryOperator::Negative as i16);
    }

    #[test]
    fn rate_promotion_on_operators() {
        let builder = SynthDefBuilder::new();
        let audio = TestOsc::new().ar();
        let control = TestOsc::new().kr();
        let sum = audio + control;
        assert_eq!(sum.calculation_rate(), CalculationRate::Audio);
        drop(builder);
    }

    #[test]
    fn parameters_materialize_into_controls() {
        let builder = SynthDefBuilder::new();
        let freq = builder.add_parameter("frequency", 440.0).unwrap();
        let amp = builder.add_parameter("amplitude", 0.5).unwrap();
        TestSink::new(TestOsc::new().frequency(freq).ar() * amp).ar();
        let synthdef = builder.build("test").unwrap();
        assert_eq!(synthdef.ugens()[0].name(), "Control");
        assert_eq!(synthdef.ugens()[0].output_count(), 2);
        assert!(synthdef.parameter("frequency").is_some());
        assert!(synthdef.parameter("amplitude").is_some());
    }

    #[test]
    fn parameter_names_are_sorted() {
        let builder = SynthDefBuilder::new();
        let zebra = builder.add_parameter("zebra", 1.0).unwrap();
        let alpha = builder.add_parameter("alpha", 2.0).unwrap();
        let middle = builder.add_parameter("middle", 3.0).unwrap();
        TestSink::new(TestOsc::new().frequency(alpha).ar() * middle + zebra).ar();
        let synthdef = builder.build("test").unwrap();
        let names: Vec<&str> = synthdef
            .parameters()
            .iter()
            .map(|info| info.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "middle", "zebra"]);
        assert_eq!(synthdef.parameter("alpha").unwrap().index, 0);
        assert_eq!(synthdef.parameter("zebra").unwrap().index, 2);
    }

    #[test]
    fn rate_grouped_controls() {
        let builder = SynthDefBuilder::new();
        let freq = builder
            .add_parameter("freq", control(440.0).rate(ParameterRate::Audio))
            .unwrap();
        let amp = builder
            .add_parameter("amp", control(0.3).lag(0.1))
            .unwrap();
        let trig = builder
            .add_parameter("trig", control(0.0).rate(ParameterRate::Trigger))
            .unwrap();
        let bus = builder
            .add_parameter("bus", (ParameterRate::Scalar, 0.0))
            .unwrap();
        TestSink::new(TestOsc::new().frequency(freq).ar() * amp * trig)
            .bus(bus)
            .ar();
        let synthdef = builder.build("test").unwrap();
        let control_names: Vec<&'static str> = synthdef
            .ugens()
            .iter()
            .filter(|u| !u.control_names.is_empty())
            .map(|u| u.name())
            .collect();
        assert_eq!(
            control_names,
            vec!["Control", "TrigControl", "AudioControl", "LagControl"]
        );
        assert_eq!(synthdef.parameter("bus").unwrap().index, 0);
        assert_eq!(synthdef.parameter("trig").unwrap().index, 1);
        assert_eq!(synthdef.parameter("freq").unwrap().index, 2);
        assert_eq!(synthdef.parameter("amp").unwrap().index, 3);
    }

    #[test]
    fn multi_value_parameter() {
        let builder = SynthDefBuilder::new();
        let freqs = builder.add_parameter("frequencies", [440.0, 443.0]).unwrap();
        assert_eq!(freqs.channel_count(), 2);
        TestSink::new(TestOsc::new().frequency(freqs).ar()).ar();
        let synthdef = builder.build("test").unwrap();
        assert_eq!(synthdef.parameter_values(), vec![440.0, 443.0]);
        assert_eq!(synthdef.ugens()[0].output_count(), 2);
    }

    #[test]
    fn duplicate_parameter_is_rejected() {
        let builder = SynthDefBuilder::new();
        builder.add_parameter("freq", 440.0).unwrap();
        let error = builder.add_parameter("freq", 880.0).unwrap_err();
        assert_eq!(error, GraphError::DuplicateParameter("freq".into()));
    }

    #[test]
    fn cross_scope_wiring_fails_at_build() {
        let outer = SynthDefBuilder::new();
        let stray = {
            let inner = SynthDefBuilder::new();
            let sig = TestOsc::new().ar();
            drop(inner);
            sig
        };
        TestSink::new(stray).ar();
        let error = outer.build("test").unwrap_err();
        assert!(matches!(error, GraphError::CrossScopeWiring { .. }));
    }

    #[test]
    fn detached_construction_is_allowed() {
        let sig = TestOsc::new().ar();
        assert_eq!(sig.calculation_rate(), CalculationRate::Audio);
    }

    #[test]
    fn dead_pure_ugens_are_eliminated() {
        let builder = SynthDefBuilder::new();
        TestOsc::new().ar();
        TestSink::new(TestNoise::new().ar()).ar();
        let synthdef = builder.build("test").unwrap();
        assert_eq!(names(&synthdef), vec!["TestNoise", "TestSink"]);
    }

    #[test]
    fn dead_code_elimination_cascades() {
        let builder = SynthDefBuilder::new();
        let sig = TestOsc::new().ar();
        TestFilter::new(sig).ar();
        TestSink::new(TestNoise::new().ar()).ar();
        let synthdef = builder.build("cascade").unwrap();
        assert_eq!(names(&synthdef), vec!["TestNoise", "TestSink"]);
    }

    #[test]
    fn used_pure_ugens_survive() {
        let builder = SynthDefBuilder::new();
        let osc = TestOsc::new().ar();
        TestFilter::new(osc.clone()).ar();
        TestSink::new(osc).ar();
        let synthdef = builder.build("partial").unwrap();
        assert!(names(&synthdef).contains(&"TestOsc"));
        assert!(!names(&synthdef).contains(&"TestFilter"));
    }

    #[test]
    fn impure_ugens_are_never_eliminated() {
        let builder = SynthDefBuilder::new();
        TestNoise::new().ar();
        TestSink::new(TestOsc::new().ar()).ar();
        let synthdef = builder.build("impure").unwrap();
        assert!(names(&synthdef).contains(&"TestNoise"));
    }

    #[test]
    fn optimization_can_be_disabled() {
        let builder = SynthDefBuilder::new();
        TestOsc::new().ar();
        TestSink::new(TestNoise::new().ar()).ar();
        let synthdef = builder.build_with(Some("noopt"), false).unwrap();
        assert!(names(&synthdef).contains(&"TestOsc"));
    }

    #[test]
    fn empty_builder_fails() {
        let builder = SynthDefBuilder::new();
        assert_eq!(builder.build("empty").unwrap_err(), GraphError::EmptyGraph);
    }

    #[test]
    fn sort_is_deterministic() {
        let build = || {
            let builder = SynthDefBuilder::new();
            let freq = builder.add_parameter("freq", 440.0).unwrap();
            let sig = TestOsc::new().frequency(freq).ar();
            let left = sig.clone() * 0.5;
            let right = sig * 0.3;
            TestSink::new(left).ar();
            TestSink::new(right).bus(1).ar();
            builder.build("det").unwrap()
        };
        let first = build();
        let second = build();
        assert_eq!(first, second);
    }

    #[test]
    fn inputs_reference_earlier_ugens_only() {
        let builder = SynthDefBuilder::new();
        let freq = builder.add_parameter("freq", 440.0).unwrap();
        let sig = TestFilter::new(TestOsc::new().frequency(freq).ar()).ar();
        TestSink::new(sig).ar();
        let synthdef = builder.build("forward").unwrap();
        for (index, ugen) in synthdef.ugens().iter().enumerate() {
            for input in ugen.inputs() {
                if let CompiledInput::UGen { index: source, .. } = input {
                    assert!((*source as usize) < index);
                }
            }
        }
    }

    #[test]
    fn constants_are_deduplicated() {
        let builder = SynthDefBuilder::new();
        let a = TestOsc::new().frequency(440.0).ar();
        let b = TestOsc::new().frequency(440.0).ar();
        TestSink::new(a + b).ar();
        let synthdef = builder.build("dedup").unwrap();
        let count = synthdef
            .constants()
            .iter()
            .filter(|&&value| value == 440.0)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn dump_ugens_shows_graph() {
        let builder = SynthDefBuilder::new();
        let amp = builder.add_parameter("amplitude", 0.5).unwrap();
        TestSink::new(TestOsc::new().ar() * amp).ar();
        let synthdef = builder.build("dumped").unwrap();
        let dump = synthdef.dump_ugens();
        assert!(dump.starts_with("SynthDef: dumped"));
        assert!(dump.contains("TestOsc"));
        assert!(dump.contains("Multiplication"));
        assert!(dump.contains("amplitude"));
        assert!(dump.contains("  0:"));
    }

    #[test]
    fn nested_builders_are_independent_scopes() {
        let outer = SynthDefBuilder::new();
        let outer_sig = TestOsc::new().ar();
        {
            let inner = SynthDefBuilder::new();
            TestSink::new(TestOsc::new().ar()).ar();
            let inner_def = inner.build("inner").unwrap();
            assert_eq!(inner_def.ugens().len(), 2);
        }
        TestSink::new(outer_sig).ar();
        let outer_def = outer.build("outer").unwrap();
        assert_eq!(outer_def.ugens().len(), 2);
    }
}
