//! Mouse and keyboard input UGens.

use crate::synthdef::ugen;

ugen! {
    /// Track the state of one key.
    KeyState[kr] {
        keycode: 0,
        minimum: 0.0,
        maximum: 1.0,
        lag: 0.2,
    }
}

ugen! {
    /// Track the mouse button.
    MouseButton[kr] {
        minimum: 0.0,
        maximum: 1.0,
        lag: 0.2,
    }
}

ugen! {
    /// Track the horizontal mouse position.
    MouseX[kr] {
        minimum: 0.0,
        maximum: 1.0,
        warp: 0,
        lag: 0.2,
    }
}

ugen! {
    /// Track the vertical mouse position.
    MouseY[kr] {
        minimum: 0.0,
        maximum: 1.0,
        warp: 0,
        lag: 0.2,
    }
}
