//! Convolution UGens.

use crate::synthdef::ugen;

ugen! {
    /// Real-time convolution with a signal kernel.
    Convolution[ar] {
        source: required,
        kernel: required,
        framesize: 512,
    }
}

ugen! {
    /// Convolution with a buffer kernel, swapped on trigger.
    Convolution2[ar] {
        source: required,
        kernel: required,
        trigger: 0.0,
        framesize: 2048,
    }
}

ugen! {
    /// Like `Convolution2`, with a crossfade between kernels.
    Convolution2L[ar] {
        source: required,
        kernel: required,
        trigger: 0.0,
        framesize: 2048,
        crossfade: 1.0,
    }
}

ugen! {
    /// Time-domain convolution.
    Convolution3[ar] {
        source: required,
        kernel: required,
        trigger: 0.0,
        framesize: 2048,
    }
}
