//! Disk streaming UGens.

use crate::synthdef::{fixed, ugen};

ugen! {
    /// Stream audio from an open file buffer.
    multi(1) DiskIn[ar](has_done_flag: true) {
        buffer_id: required,
        looping: 0,
    }
}

ugen! {
    /// Stream audio to an open file buffer.
    DiskOut[ar](outputs: fixed(0)) {
        buffer_id: required,
        source: unexpanded,
    }
}

ugen! {
    /// Stream audio from disk with rate control.
    multi(1) VDiskIn[ar](has_done_flag: true) {
        buffer_id: required,
        rate: 1,
        looping: 0.0,
        send_id: 0,
    }
}
