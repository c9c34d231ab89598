//! Done-flag and node lifecycle UGens. `EnvGen` itself lives in
//! [`crate::envelope`].

use crate::synthdef::ugen;

ugen! {
    /// 1 when the source's done flag is set.
    Done[kr] {
        source: required,
    }
}

ugen! {
    /// Free another node when triggered.
    Free[kr] {
        trigger: 0,
        node_id: required,
    }
}

ugen! {
    /// Free the enclosing synth when triggered.
    FreeSelf[kr] {
        trigger: required,
    }
}

ugen! {
    /// Free the enclosing synth when the source is done.
    FreeSelfWhenDone[kr] {
        source: required,
    }
}

ugen! {
    /// Simple attack-sustain-release envelope with a gate.
    Linen[kr](has_done_flag: true) {
        gate: 1.0,
        attack_time: 0.01,
        sustain_level: 1.0,
        release_time: 1.0,
        done_action: 0,
    }
}

ugen! {
    /// Pause another node when triggered.
    Pause[kr] {
        trigger: required,
        node_id: required,
    }
}

ugen! {
    /// Pause the enclosing synth when triggered.
    PauseSelf[kr] {
        trigger: required,
    }
}

ugen! {
    /// Pause the enclosing synth when the source is done.
    PauseSelfWhenDone[kr] {
        source: required,
    }
}
