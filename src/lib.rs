//! # Magnon - SuperCollider SynthDef compiler and server control plane
//!
//! Magnon builds SuperCollider audio graphs from Rust expressions,
//! compiles them to the SCgf binary interchange format, and drives a
//! running scsynth engine over its OSC control protocol.
//!
//! ## Core Features
//!
//! - **SynthDef graphs**: build UGen graphs inside a
//!   [`SynthDefBuilder`] scope; arithmetic on [`Signal`]s becomes
//!   operator UGens, with constant folding and identity elimination
//! - **Multichannel expansion**: pass arrays anywhere a signal is
//!   expected and the graph replicates itself per channel
//! - **Byte-exact SCgf**: compiled SynthDefs serialize to the format
//!   scsynth loads with `/d_recv`
//! - **UGen catalogue**: oscillators, filters, delays, panners, demand
//!   and phase-vocoder chains, transcribed with their canonical wire
//!   orders
//! - **Server sessions**: boot scsynth, install SynthDefs, create nodes
//!   and buffers, route replies to subscribers and one-shot waiters
//!
//! ## Building a SynthDef
//!
//! ```
//! use magnon::{Envelope, DoneAction, SynthDefBuilder};
//! use magnon::envelope::EnvGen;
//! use magnon::ugens::{Out, Pan2, SinOsc};
//!
//! let builder = SynthDefBuilder::new();
//! let frequency = builder.add_parameter("frequency", 440.0).unwrap();
//! let amplitude = builder.add_parameter("amplitude", 0.3).unwrap();
//! let env = EnvGen::new(Envelope::percussive(0.01, 1.0))
//!     .done_action(DoneAction::FreeSynth)
//!     .kr();
//! let sig = SinOsc::new().frequency(frequency).ar() * amplitude * env;
//! Out::new(Pan2::new(sig).ar()).ar();
//!
//! let synthdef = builder.build("ping").unwrap();
//! let bytes = synthdef.compile().unwrap();
//! assert_eq!(&bytes[..4], b"SCgf");
//! ```
//!
//! ## Driving a server
//!
//! ```no_run
//! use std::time::Duration;
//! use magnon::{Options, Server, SynthDefBuilder};
//! use magnon::ugens::{Out, SinOsc};
//!
//! let builder = SynthDefBuilder::new();
//! Out::new(SinOsc::new().ar() * 0.2).ar();
//! let synthdef = builder.build("sine").unwrap();
//!
//! let server = Server::new(Options::default());
//! server.boot().unwrap();
//! server.send_synthdef_sync(&synthdef, Duration::from_secs(1)).unwrap();
//! let synth = server.synth("sine", &[]).unwrap();
//! let status = server.request_status(Duration::from_secs(1)).unwrap();
//! assert!(status.synth_count >= 1);
//! synth.free().unwrap();
//! server.quit().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - [`synthdef`] — builder scopes, UGen declarations, sorting,
//!   optimization
//! - [`signal`] — the signal value type and its operator algebra
//! - [`compiler`] — the SCgf emitter
//! - [`envelope`] — envelope breakpoints and `EnvGen`
//! - [`ugens`] — the UGen catalogue
//! - [`osc`] — wire-protocol command constructors over `rosc`
//! - [`engine`] — server options and the engine world boundary
//! - [`server`] — sessions, allocators, reply routing, managed resources

pub mod compiler;
#[cfg(feature = "embedded-scsynth")]
pub mod embedded;
pub mod engine;
pub mod enums;
pub mod envelope;
pub mod osc;
pub mod server;
pub mod signal;
pub mod synthdef;
pub mod ugens;

pub use compiler::{compile_synthdefs, CompileError};
pub use engine::{BootStatus, EngineError, Options, ProcessWorld, ReplyCallback, World};
pub use enums::{
    AddAction, BinaryOperator, CalculationRate, DoneAction, EnvelopeShape, ParameterRate,
    UnaryOperator,
};
pub use envelope::{Curve, Envelope};
pub use server::{
    Buffer, Group, ManagedBuffer, ManagedGroup, ManagedSynth, Server, ServerError, StatusReply,
    SubscriptionId, Synth, WorldFactory,
};
pub use signal::{OutputProxy, Signal};
pub use synthdef::{
    control, CompiledInput, CompiledUGen, GraphError, Parameter, ParameterInfo, SynthDef,
    SynthDefBuilder,
};
