//! Server and buffer info UGens.

use crate::synthdef::ugen;

ugen! {
    /// Block size of the server, in samples.
    BlockSize[ir] {}
}

ugen! {
    /// Channel count of a buffer.
    BufChannels[kr, ir] {
        buffer_id: required,
    }
}

ugen! {
    /// Duration of a buffer, in seconds.
    BufDur[kr, ir] {
        buffer_id: required,
    }
}

ugen! {
    /// Frame count of a buffer.
    BufFrames[kr, ir] {
        buffer_id: required,
    }
}

ugen! {
    /// Ratio of a buffer's sample rate to the server's.
    BufRateScale[kr, ir] {
        buffer_id: required,
    }
}

ugen! {
    /// Sample rate of a buffer.
    BufSampleRate[kr, ir] {
        buffer_id: required,
    }
}

ugen! {
    /// Total sample count of a buffer.
    BufSamples[kr, ir] {
        buffer_id: required,
    }
}

ugen! {
    /// Duration of one control block, in seconds.
    ControlDur[ir] {}
}

ugen! {
    /// Control rate of the server, in Hz.
    ControlRate[ir] {}
}

ugen! {
    /// Node id of the enclosing synth.
    NodeID[ir] {}
}

ugen! {
    /// Number of audio buses.
    NumAudioBuses[ir] {}
}

ugen! {
    /// Number of buffers.
    NumBuffers[ir] {}
}

ugen! {
    /// Number of control buses.
    NumControlBuses[ir] {}
}

ugen! {
    /// Number of input buses.
    NumInputBuses[ir] {}
}

ugen! {
    /// Number of output buses.
    NumOutputBuses[ir] {}
}

ugen! {
    /// Number of currently running synths.
    NumRunningSynths[kr, ir] {}
}

ugen! {
    /// Radians per sample at the server's sample rate.
    RadiansPerSample[ir] {}
}

ugen! {
    /// Duration of one sample, in seconds.
    SampleDur[ir] {}
}

ugen! {
    /// Sample rate of the server, in Hz.
    SampleRate[ir] {}
}

ugen! {
    /// Offset of the synth's start within its control block.
    SubsampleOffset[ir] {}
}
