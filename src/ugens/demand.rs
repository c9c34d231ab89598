//! Demand-rate UGens.

use crate::synthdef::ugen;

ugen! {
    /// Demand-rate brownian walk.
    Dbrown[dr] {
        minimum: 0.0,
        maximum: 1.0,
        step: 0.01,
        length: (f32::INFINITY),
    }
}

ugen! {
    /// Demand-rate buffer reader.
    Dbufrd[dr] {
        buffer_id: 0,
        phase: 0,
        looping: 1,
    }
}

ugen! {
    /// Demand-rate buffer writer.
    Dbufwr[dr] {
        source: 0.0,
        buffer_id: 0.0,
        phase: 0.0,
        looping: 1.0,
    }
}

ugen! {
    /// Envelope generator driven by demand-rate streams.
    DemandEnvGen[ar, kr] {
        level: required,
        duration: required,
        shape: 1,
        curve: 0,
        gate: 1,
        reset: 1,
        level_scale: 1,
        level_bias: 0,
        time_scale: 1,
        done_action: 0,
    }
}

ugen! {
    /// Demand-rate geometric series.
    Dgeom[dr] {
        start: 1,
        grow: 2,
        length: (f32::INFINITY),
    }
}

ugen! {
    /// Demand-rate integer brownian walk.
    Dibrown[dr] {
        minimum: 0,
        maximum: 12,
        step: 1,
        length: (f32::INFINITY),
    }
}

ugen! {
    /// Demand-rate integer white noise.
    Diwhite[dr] {
        minimum: 0,
        maximum: 1,
        length: (f32::INFINITY),
    }
}

ugen! {
    /// Random selection from a sequence, with replacement.
    Drand[dr] {
        repeats: 1,
        sequence: unexpanded,
    }
}

ugen! {
    /// Reset a demand-rate stream.
    Dreset[dr] {
        source: required,
        reset: 0,
    }
}

ugen! {
    /// Sequential reading of a value list.
    Dseq[dr] {
        repeats: 1,
        sequence: unexpanded,
    }
}

ugen! {
    /// Like `Dseq`, but `repeats` counts single values instead of passes.
    Dser[dr] {
        repeats: 1,
        sequence: unexpanded,
    }
}

ugen! {
    /// Demand-rate arithmetic series.
    Dseries[dr] {
        length: (f32::INFINITY),
        start: 1,
        step: 1,
    }
}

ugen! {
    /// Shuffled reading of a value list.
    Dshuf[dr] {
        repeats: 1,
        sequence: unexpanded,
    }
}

ugen! {
    /// Repeat each demanded value `n` times.
    Dstutter[dr] {
        n: 2,
        source: required,
    }
}

ugen! {
    /// Switch between demand streams, completing each.
    Dswitch[dr] {
        index: required,
        sequence: unexpanded,
    }
}

ugen! {
    /// Switch between demand streams one value at a time.
    Dswitch1[dr] {
        index: required,
        sequence: unexpanded,
    }
}

ugen! {
    /// Return unique values from a demand stream.
    Dunique[dr] {
        source: required,
        max_buffer_size: 1024,
        protected: 1,
    }
}

ugen! {
    /// Demand values from streams on a timed schedule.
    Duty[ar, kr] {
        duration: 1.0,
        reset: 0.0,
        level: 1.0,
        done_action: 0.0,
    }
}

ugen! {
    /// Demand-rate white noise.
    Dwhite[dr] {
        minimum: 0.0,
        maximum: 0.0,
        length: (f32::INFINITY),
    }
}

ugen! {
    /// Random selection without immediate repetition.
    Dxrand[dr] {
        repeats: 1,
        sequence: unexpanded,
    }
}

#[cfg(test)]
mod tests {
    use crate::enums::CalculationRate;
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{Dseq, Duty, Out, SinOsc};

    #[test]
    fn demand_streams_run_at_demand_rate() {
        let builder = SynthDefBuilder::new();
        let sequence = Dseq::new([440.0, 550.0, 660.0]).repeats(2).dr();
        assert_eq!(sequence.calculation_rate(), CalculationRate::Demand);
        let frequency = Duty::new().duration(0.5).level(sequence).kr();
        Out::new(SinOsc::new().frequency(frequency).ar()).ar();
        let synthdef = builder.build("dseq").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        assert!(names.contains(&"Dseq"));
        assert!(names.contains(&"Duty"));
    }

    #[test]
    fn sequence_values_splat_into_inputs() {
        let builder = SynthDefBuilder::new();
        let sequence = Dseq::new([1.0, 2.0, 3.0, 4.0]).dr();
        let sig = Duty::new().duration(0.25).level(sequence).ar();
        Out::new(sig).ar();
        let synthdef = builder.build("splat").unwrap();
        let dseq = synthdef
            .ugens()
            .iter()
            .find(|u| u.name() == "Dseq")
            .unwrap();
        // repeats plus four sequence slots
        assert_eq!(dseq.inputs().len(), 5);
    }
}
