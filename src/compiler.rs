//! SCgf binary emitter.
//!
//! Serializes compiled [`SynthDef`]s into the version-2 SCgf interchange
//! format consumed by scsynth's `/d_recv`. All multi-byte integers are
//! big-endian; strings are Pascal-style with a single-byte length prefix.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::synthdef::{CompiledInput, SynthDef};

/// Index value marking "read from the constant pool" in an input spec.
const CONSTANT_SOURCE: u32 = 0xFFFF_FFFF;

const FORMAT_MAGIC: &[u8; 4] = b"SCgf";
const FORMAT_VERSION: u32 = 2;

/// Errors raised while serializing a SynthDef.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A constant in the pool is NaN. Infinity is allowed; demand-rate
    /// sequence lengths default to it.
    NonFiniteConstant,
    /// A name does not fit the single-byte pstring length prefix.
    NameTooLong(String),
    /// A name contains non-ASCII characters.
    NameNotAscii(String),
    /// More SynthDefs than the 16-bit header count can carry.
    TooManySynthDefs(usize),
    /// An envelope's durations do not line up with its amplitudes.
    EnvelopeMismatch {
        amplitudes: usize,
        durations: usize,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::NonFiniteConstant => {
                write!(f, "SynthDef constant pool contains NaN")
            }
            CompileError::NameTooLong(name) => {
                write!(f, "Name too long for SCgf ({} bytes): {}", name.len(), name)
            }
            CompileError::NameNotAscii(name) => {
                write!(f, "Name is not ASCII: {}", name)
            }
            CompileError::TooManySynthDefs(count) => {
                write!(f, "Cannot serialize {} SynthDefs in one container", count)
            }
            CompileError::EnvelopeMismatch {
                amplitudes,
                durations,
            } => write!(
                f,
                "Envelope durations ({}) must equal amplitudes - 1 ({})",
                durations,
                amplitudes.saturating_sub(1)
            ),
        }
    }
}

impl std::error::Error for CompileError {}

fn encode_string(out: &mut Vec<u8>, value: &str) -> Result<(), CompileError> {
    if !value.is_ascii() {
        return Err(CompileError::NameNotAscii(value.to_string()));
    }
    if value.len() > u8::MAX as usize {
        return Err(CompileError::NameTooLong(value.to_string()));
    }
    out.push(value.len() as u8);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

fn encode_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn encode_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

fn encode_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn encode_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn compile_graph(out: &mut Vec<u8>, synthdef: &SynthDef) -> Result<(), CompileError> {
    // Constant pool.
    let constants = synthdef.constants();
    encode_u32(out, constants.len() as u32);
    for &constant in constants {
        encode_f32(out, constant);
    }
    // Parameter values, then (name, index) pairs.
    let values = synthdef.parameter_values();
    encode_u32(out, values.len() as u32);
    for value in values {
        encode_f32(out, value);
    }
    let parameters = synthdef.parameters();
    encode_u32(out, parameters.len() as u32);
    for info in parameters {
        encode_string(out, &info.name)?;
        encode_u32(out, info.index);
    }
    // UGen records.
    let ugens = synthdef.ugens();
    encode_u32(out, ugens.len() as u32);
    for ugen in ugens {
        encode_string(out, ugen.name())?;
        encode_u8(out, ugen.calculation_rate() as u8);
        encode_u32(out, ugen.inputs().len() as u32);
        encode_u32(out, ugen.output_count());
        encode_u16(out, ugen.special_index() as u16);
        for input in ugen.inputs() {
            match input {
                CompiledInput::Constant(index) => {
                    encode_u32(out, CONSTANT_SOURCE);
                    encode_u32(out, *index);
                }
                CompiledInput::UGen { index, output } => {
                    encode_u32(out, *index);
                    encode_u32(out, *output);
                }
            }
        }
        for _ in 0..ugen.output_count() {
            encode_u8(out, ugen.calculation_rate() as u8);
        }
    }
    // No variants.
    encode_u16(out, 0);
    Ok(())
}

/// Hex digest of a SynthDef's graph bytes, used for anonymous names.
/// 32 hex characters: the first 16 bytes of the SHA-256 of the graph.
pub(crate) fn graph_digest(synthdef: &SynthDef) -> String {
    let mut graph = Vec::new();
    // The digest ignores serialization failures; NaN constants still hash.
    let _ = compile_graph(&mut graph, synthdef);
    let digest = Sha256::digest(&graph);
    digest[..16].iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Serialize one or more SynthDefs into a single SCgf container.
///
/// With `use_anonymous_names`, every SynthDef is named by its graph digest
/// regardless of its given name.
pub fn compile_synthdefs(
    synthdefs: &[&SynthDef],
    use_anonymous_names: bool,
) -> Result<Vec<u8>, CompileError> {
    if synthdefs.len() > u16::MAX as usize {
        return Err(CompileError::TooManySynthDefs(synthdefs.len()));
    }
    let mut out = Vec::new();
    out.extend_from_slice(FORMAT_MAGIC);
    encode_u32(&mut out, FORMAT_VERSION);
    encode_u16(&mut out, synthdefs.len() as u16);
    for synthdef in synthdefs {
        if synthdef.constants().iter().any(|constant| constant.is_nan()) {
            return Err(CompileError::NonFiniteConstant);
        }
        let name = if use_anonymous_names {
            synthdef.anonymous_name()
        } else {
            synthdef.effective_name()
        };
        encode_string(&mut out, name)?;
        compile_graph(&mut out, synthdef)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{Out, Pan2, SinOsc};

    fn sine_synthdef() -> SynthDef {
        let builder = SynthDefBuilder::new();
        let sig = SinOsc::new().frequency(440.0).ar() * 0.3;
        Out::new(Pan2::new(sig).ar()).ar();
        builder.build("sine").unwrap()
    }

    #[test]
    fn header_bytes() {
        let data = sine_synthdef().compile().unwrap();
        assert_eq!(
            &data[..10],
            &[0x53, 0x43, 0x67, 0x66, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01]
        );
        assert_eq!(data[10], 4);
        assert_eq!(&data[11..15], b"sine");
    }

    #[test]
    fn compilation_is_deterministic() {
        let first = sine_synthdef().compile().unwrap();
        let second = sine_synthdef().compile().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn multiple_synthdefs_share_a_container() {
        let a = sine_synthdef();
        let builder = SynthDefBuilder::new();
        Out::new(SinOsc::new().frequency(880.0).ar()).ar();
        let b = builder.build("other").unwrap();
        let data = compile_synthdefs(&[&a, &b], false).unwrap();
        assert_eq!(&data[..4], b"SCgf");
        assert_eq!(u16::from_be_bytes([data[8], data[9]]), 2);
        assert!(data.windows(4).any(|window| window == b"sine"));
        assert!(data.windows(5).any(|window| window == b"other"));
    }

    #[test]
    fn anonymous_names_replace_given_names() {
        let synthdef = sine_synthdef();
        let data = compile_synthdefs(&[&synthdef], true).unwrap();
        assert!(!data.windows(4).any(|window| window == b"sine"));
        assert_eq!(synthdef.anonymous_name().len(), 32);
        assert!(data
            .windows(32)
            .any(|window| window == synthdef.anonymous_name().as_bytes()));
    }

    #[test]
    fn constant_pool_layout() {
        let builder = SynthDefBuilder::new();
        Out::new(SinOsc::new().frequency(880.0).phase(0.5).ar()).ar();
        let synthdef = builder.build("constants").unwrap();
        // Constants appear in first-use order: 880.0, 0.5, then Out's bus 0.
        assert_eq!(synthdef.constants(), &[880.0, 0.5, 0.0]);
        let data = synthdef.compile().unwrap();
        let offset = 11 + "constants".len();
        assert_eq!(
            u32::from_be_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]),
            3
        );
        assert_eq!(
            f32::from_be_bytes([
                data[offset + 4],
                data[offset + 5],
                data[offset + 6],
                data[offset + 7]
            ]),
            880.0
        );
    }

    #[test]
    fn nan_constants_are_rejected() {
        let builder = SynthDefBuilder::new();
        Out::new(SinOsc::new().frequency(f32::NAN).ar()).ar();
        let synthdef = builder.build("bad").unwrap();
        assert_eq!(synthdef.compile(), Err(CompileError::NonFiniteConstant));
    }

    #[test]
    fn infinity_constants_are_allowed() {
        let builder = SynthDefBuilder::new();
        Out::new(SinOsc::new().frequency(f32::INFINITY).ar()).ar();
        let synthdef = builder.build("inf").unwrap();
        assert!(synthdef.compile().is_ok());
    }

    #[test]
    fn long_names_are_rejected() {
        let builder = SynthDefBuilder::new();
        Out::new(SinOsc::new().ar()).ar();
        let synthdef = builder.build(&"x".repeat(300)).unwrap();
        assert!(matches!(
            synthdef.compile(),
            Err(CompileError::NameTooLong(_))
        ));
    }
}
