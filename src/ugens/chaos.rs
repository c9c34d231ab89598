//! Chaotic generator UGens.

use crate::synthdef::ugen;

ugen! {
    /// Cusp map generator, linear interpolation.
    CuspL[ar] {
        frequency: 22050,
        a: 1.0,
        b: 1.9,
        xi: 0.0,
    }
}

ugen! {
    /// Cusp map generator, no interpolation.
    CuspN[ar] {
        frequency: 22050,
        a: 1.0,
        b: 1.9,
        xi: 0.0,
    }
}

ugen! {
    /// Feedback sine with chaotic phase indexing, cubic interpolation.
    FBSineC[ar] {
        frequency: 22050,
        im: 1.0,
        fb: 0.1,
        a: 1.1,
        c: 0.5,
        xi: 0.1,
        yi: 0.1,
    }
}

ugen! {
    /// Feedback sine with chaotic phase indexing, linear interpolation.
    FBSineL[ar] {
        frequency: 22050,
        im: 1.0,
        fb: 0.1,
        a: 1.1,
        c: 0.5,
        xi: 0.1,
        yi: 0.1,
    }
}

ugen! {
    /// Feedback sine with chaotic phase indexing, no interpolation.
    FBSineN[ar] {
        frequency: 22050,
        im: 1.0,
        fb: 0.1,
        a: 1.1,
        c: 0.5,
        xi: 0.1,
        yi: 0.1,
    }
}

ugen! {
    /// Gingerbreadman map generator, linear interpolation.
    GbmanL[ar] {
        frequency: 22050,
        xi: 1.2,
        yi: 2.1,
    }
}

ugen! {
    /// Gingerbreadman map generator, no interpolation.
    GbmanN[ar] {
        frequency: 22050,
        xi: 1.2,
        yi: 2.1,
    }
}

ugen! {
    /// Henon map generator, cubic interpolation.
    HenonC[ar] {
        frequency: 22050,
        a: 1.4,
        b: 0.3,
        x_0: 0,
        x_1: 0,
    }
}

ugen! {
    /// Henon map generator, linear interpolation.
    HenonL[ar] {
        frequency: 22050,
        a: 1.4,
        b: 0.3,
        x_0: 0,
        x_1: 0,
    }
}

ugen! {
    /// Henon map generator, no interpolation.
    HenonN[ar] {
        frequency: 22050,
        a: 1.4,
        b: 0.3,
        x_0: 0,
        x_1: 0,
    }
}

ugen! {
    /// Latoocarfian map generator, cubic interpolation.
    LatoocarfianC[ar] {
        frequency: 22050,
        a: 1,
        b: 3,
        c: 0.5,
        d: 0.5,
        xi: 0.5,
        yi: 0.5,
    }
}

ugen! {
    /// Latoocarfian map generator, linear interpolation.
    LatoocarfianL[ar] {
        frequency: 22050,
        a: 1,
        b: 3,
        c: 0.5,
        d: 0.5,
        xi: 0.5,
        yi: 0.5,
    }
}

ugen! {
    /// Latoocarfian map generator, no interpolation.
    LatoocarfianN[ar] {
        frequency: 22050,
        a: 1,
        b: 3,
        c: 0.5,
        d: 0.5,
        xi: 0.5,
        yi: 0.5,
    }
}

ugen! {
    /// Linear congruential generator, cubic interpolation.
    LinCongC[ar] {
        frequency: 22050,
        a: 1.1,
        c: 0.13,
        m: 1,
        xi: 0,
    }
}

ugen! {
    /// Linear congruential generator, linear interpolation.
    LinCongL[ar] {
        frequency: 22050,
        a: 1.1,
        c: 0.13,
        m: 1,
        xi: 0,
    }
}

ugen! {
    /// Linear congruential generator, no interpolation.
    LinCongN[ar] {
        frequency: 22050,
        a: 1.1,
        c: 0.13,
        m: 1,
        xi: 0,
    }
}

ugen! {
    /// Lorenz attractor generator.
    LorenzL[ar] {
        frequency: 22050,
        s: 10,
        r: 28,
        b: 2.667,
        h: 0.05,
        xi: 0.1,
        yi: 0,
        zi: 0,
    }
}

ugen! {
    /// General quadratic map generator, cubic interpolation.
    QuadC[ar] {
        frequency: 22050,
        a: 1,
        b: (-1),
        c: (-0.75),
        xi: 0,
    }
}

ugen! {
    /// General quadratic map generator, linear interpolation.
    QuadL[ar] {
        frequency: 22050,
        a: 1,
        b: (-1),
        c: (-0.75),
        xi: 0,
    }
}

ugen! {
    /// General quadratic map generator, no interpolation.
    QuadN[ar] {
        frequency: 22050,
        a: 1,
        b: (-1),
        c: (-0.75),
        xi: 0,
    }
}

ugen! {
    /// Standard map generator, linear interpolation.
    StandardL[ar] {
        frequency: 22050,
        k: 1,
        xi: 0.5,
        yi: 0,
    }
}

ugen! {
    /// Standard map generator, no interpolation.
    StandardN[ar] {
        frequency: 22050,
        k: 1,
        xi: 0.5,
        yi: 0,
    }
}
