//! Buffer I/O UGens.
//!
//! `LocalBuf` gets a third input wired to a `MaxLocalBufs` during the
//! build's cleanup pass; declarations here carry only the two user-facing
//! inputs.

use crate::synthdef::{fixed, ugen};

ugen! {
    /// Read from a buffer at an arbitrary phase.
    multi(1) BufRd[ar, kr](pure: true) {
        buffer_id: required,
        phase: 0.0,
        looping: 1,
        interpolation: 2,
    }
}

ugen! {
    /// Write to a buffer at an arbitrary phase.
    BufWr[ar, kr](has_done_flag: true) {
        buffer_id: required,
        phase: 0.0,
        looping: 1.0,
        source: unexpanded,
    }
}

ugen! {
    /// Zero a buffer at initialization.
    ClearBuf[ir](width_first: true) {
        buffer_id: required,
    }
}

ugen! {
    /// Allocate a synth-local buffer.
    LocalBuf[ir] {
        channel_count: 1.0,
        frame_count: 1.0,
    }
}

ugen! {
    /// Declare the number of synth-local buffers. Inserted automatically
    /// by the build pass when any `LocalBuf` is present.
    MaxLocalBufs[ir] {
        maximum: 0,
    }
}

ugen! {
    /// Sample playback from a buffer.
    multi(1) PlayBuf[ar, kr] {
        buffer_id: required,
        rate: 1,
        trigger: 1,
        start_position: 0,
        looping: 0,
        done_action: 0,
    }
}

ugen! {
    /// Record into a buffer.
    RecordBuf[ar, kr](has_done_flag: true) {
        buffer_id: required,
        offset: 0.0,
        record_level: 1.0,
        preexisting_level: 0.0,
        run: 1.0,
        looping: 1.0,
        trigger: 1.0,
        done_action: 0,
        source: unexpanded,
    }
}

ugen! {
    /// Write a signal to a buffer for scope display.
    ScopeOut[ar, kr](outputs: fixed(0)) {
        buffer_id: required,
        source: unexpanded,
    }
}

#[cfg(test)]
mod tests {
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{LocalBuf, Out, PlayBuf};

    #[test]
    fn local_buf_gains_a_max_local_bufs() {
        let builder = SynthDefBuilder::new();
        let buffer = LocalBuf::new().frame_count(2048.0).ir();
        Out::new(PlayBuf::new(buffer).ar()).ar();
        let synthdef = builder.build("localbuf").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        let max_index = names.iter().position(|n| *n == "MaxLocalBufs").unwrap();
        let buf_index = names.iter().position(|n| *n == "LocalBuf").unwrap();
        assert!(max_index < buf_index);
        let local_buf = &synthdef.ugens()[buf_index];
        assert_eq!(local_buf.inputs().len(), 3);
    }

    #[test]
    fn two_local_bufs_share_one_counter() {
        let builder = SynthDefBuilder::new();
        let a = LocalBuf::new().frame_count(1024.0).ir();
        let b = LocalBuf::new().frame_count(512.0).ir();
        Out::new(PlayBuf::new(a).ar() + PlayBuf::new(b).ar()).ar();
        let synthdef = builder.build("two_bufs").unwrap();
        let counters: Vec<_> = synthdef
            .ugens()
            .iter()
            .filter(|u| u.name() == "MaxLocalBufs")
            .collect();
        assert_eq!(counters.len(), 1);
        // The counter carries the LocalBuf count.
        let maximum = match counters[0].inputs()[0] {
            crate::synthdef::CompiledInput::Constant(index) => {
                synthdef.constants()[index as usize]
            }
            _ => panic!("expected constant maximum"),
        };
        assert_eq!(maximum, 2.0);
    }
}
