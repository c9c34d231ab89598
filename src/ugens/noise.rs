//! Noise and random UGens.

use crate::synthdef::ugen;

ugen! {
    /// Brownian noise.
    BrownNoise[ar, kr] {}
}

ugen! {
    /// Noise whose values are only -1 or +1.
    ClipNoise[ar, kr] {}
}

ugen! {
    /// Statistically pass or block triggers.
    CoinGate[ar, kr] {
        probability: 0.5,
        trigger: required,
    }
}

ugen! {
    /// Chaotic noise from a crackle map.
    Crackle[ar, kr] {
        chaos_parameter: 1.5,
    }
}

ugen! {
    /// Random positive impulses.
    Dust[ar, kr] {
        density: 0.0,
    }
}

ugen! {
    /// Random bipolar impulses.
    Dust2[ar, kr] {
        density: 0.0,
    }
}

ugen! {
    /// Exponentially distributed random value at initialization.
    ExpRand[ir] {
        minimum: 0.0,
        maximum: 1.0,
    }
}

ugen! {
    /// Gray-code noise.
    GrayNoise[ar, kr] {}
}

ugen! {
    /// Deterministic scrambling of a signal into noise.
    Hasher[ar, kr] {
        source: required,
    }
}

ugen! {
    /// Uniform random integer at initialization.
    IRand[ir] {
        minimum: 0,
        maximum: 127,
    }
}

ugen! {
    /// Sample-and-hold clipped noise.
    LFClipNoise[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Dynamic-rate clipped noise.
    LFDClipNoise[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Dynamic-rate step noise.
    LFDNoise0[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Dynamic-rate ramp noise.
    LFDNoise1[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Dynamic-rate cubic noise.
    LFDNoise3[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Step noise.
    LFNoise0[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Linearly interpolated noise.
    LFNoise1[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Quadratically interpolated noise.
    LFNoise2[ar, kr] {
        frequency: 500.0,
    }
}

ugen! {
    /// Skewed random value at initialization.
    LinRand[ir] {
        minimum: 0.0,
        maximum: 1.0,
        skew: 0,
    }
}

ugen! {
    /// Chaotic noise from the logistic map.
    Logistic[ar, kr] {
        chaos_parameter: 3,
        frequency: 1000,
        initial_y: 0.5,
    }
}

ugen! {
    /// Mask off mantissa bits to add quantization noise.
    MantissaMask[ar, kr] {
        source: 0,
        bits: 3,
    }
}

ugen! {
    /// Sum of `n` uniform random values at initialization.
    NRand[ir] {
        minimum: 0.0,
        maximum: 1.0,
        n: 1,
    }
}

ugen! {
    /// Pink noise.
    PinkNoise[ar, kr] {}
}

ugen! {
    /// Uniform random value at initialization.
    Rand[ir] {
        minimum: 0.0,
        maximum: 1.0,
    }
}

ugen! {
    /// Select the random generator stream for this synth.
    RandID[kr, ir](width_first: true) {
        rand_id: 1,
    }
}

ugen! {
    /// Reseed the random generator stream.
    RandSeed[ar, kr, ir](width_first: true) {
        trigger: 0,
        seed: 56789,
    }
}

ugen! {
    /// Triggered exponentially distributed random value.
    TExpRand[ar, kr] {
        minimum: 0.01,
        maximum: 1.0,
        trigger: 0,
    }
}

ugen! {
    /// Triggered random integer.
    TIRand[ar, kr] {
        minimum: 0,
        maximum: 127,
        trigger: 0,
    }
}

ugen! {
    /// Triggered uniform random value.
    TRand[ar, kr] {
        minimum: 0.0,
        maximum: 1.0,
        trigger: 0,
    }
}

ugen! {
    /// Triggered weighted index selection.
    TWindex[ar, kr] {
        trigger: required,
        normalize: 0,
        array: unexpanded,
    }
}

ugen! {
    /// White noise.
    WhiteNoise[ar, kr] {}
}
