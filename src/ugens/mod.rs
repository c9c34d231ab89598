//! Concrete UGen declarations, grouped by family.
//!
//! Most of these are mechanical [`ugen!`](crate::synthdef) declarations
//! transcribing each class's wire order, defaults, supported rates, and
//! flags. A handful with irregular construction (`MulAdd`, `Poll`, `FFT`,
//! the Gendy family) are written out by hand, as are the pseudo-UGens
//! (`Mix`, `Splay`, `LinLin`, `Silence`, `Changed`, `CompanderD`) that
//! expand into sub-graphs instead of emitting a node of their own.

pub mod basic;
pub mod beq;
pub mod bufio;
pub mod chaos;
pub mod convolution;
pub mod delay;
pub mod demand;
pub mod diskio;
pub mod dynamics;
pub mod envelopes;
pub mod ffsinosc;
pub mod filters;
pub mod gendyn;
pub mod granular;
pub mod hilbert;
pub mod info;
pub mod inout;
pub mod lines;
pub mod mac;
pub mod ml;
pub mod noise;
pub mod osc;
pub mod panning;
pub mod physical;
pub mod pv;
pub mod reverb;
pub mod safety;
pub mod triggers;

pub use basic::*;
pub use beq::*;
pub use bufio::*;
pub use chaos::*;
pub use convolution::*;
pub use delay::*;
pub use demand::*;
pub use diskio::*;
pub use dynamics::*;
pub use envelopes::*;
pub use ffsinosc::*;
pub use filters::*;
pub use gendyn::*;
pub use granular::*;
pub use hilbert::*;
pub use info::*;
pub use inout::*;
pub use lines::*;
pub use mac::*;
pub use ml::*;
pub use noise::*;
pub use osc::*;
pub use panning::*;
pub use physical::*;
pub use pv::*;
pub use reverb::*;
pub use safety::*;
pub use triggers::*;
