//! Phase vocoder UGens.
//!
//! The FFT chain UGens are width-first: the topological sort hoists them
//! ahead of their textual position so spectral chains run before the
//! time-domain UGens that consume them.

use crate::enums::CalculationRate;
use crate::signal::Signal;
use crate::synthdef::{self, ugen, UGenSpec};
use crate::ugens::bufio::LocalBuf;

/// Fast Fourier transform.
///
/// Without an explicit buffer, allocates a `LocalBuf` of `window_size`
/// frames (2048 when the window size is left at 0).
#[derive(Debug, Clone)]
pub struct FFT {
    buffer_id: Option<Signal>,
    source: Signal,
    hop: Signal,
    window_type: Signal,
    active: Signal,
    window_size: Signal,
}

impl FFT {
    const SPEC: UGenSpec = UGenSpec {
        name: "FFT",
        width_first: true,
        ..UGenSpec::DEFAULT
    };

    pub fn new(source: impl Into<Signal>) -> Self {
        FFT {
            buffer_id: None,
            source: source.into(),
            hop: Signal::Const(0.5),
            window_type: Signal::Const(0.0),
            active: Signal::Const(1.0),
            window_size: Signal::Const(0.0),
        }
    }

    pub fn buffer_id(mut self, value: impl Into<Signal>) -> Self {
        self.buffer_id = Some(value.into());
        self
    }

    pub fn hop(mut self, value: impl Into<Signal>) -> Self {
        self.hop = value.into();
        self
    }

    pub fn window_type(mut self, value: impl Into<Signal>) -> Self {
        self.window_type = value.into();
        self
    }

    pub fn active(mut self, value: impl Into<Signal>) -> Self {
        self.active = value.into();
        self
    }

    pub fn window_size(mut self, value: impl Into<Signal>) -> Self {
        self.window_size = value.into();
        self
    }

    pub fn kr(self) -> Signal {
        let buffer_id = match self.buffer_id {
            Some(buffer_id) => buffer_id,
            None => {
                let frame_count = match self.window_size.as_const() {
                    Some(size) if size > 0.0 => size,
                    _ => 2048.0,
                };
                LocalBuf::new().frame_count(frame_count).ir()
            }
        };
        synthdef::construct(
            &Self::SPEC,
            CalculationRate::Control,
            None,
            0,
            vec![
                ("buffer_id", buffer_id, false),
                ("source", self.source, false),
                ("hop", self.hop, false),
                ("window_type", self.window_type, false),
                ("active", self.active, false),
                ("window_size", self.window_size, false),
            ],
        )
    }
}

ugen! {
    /// Inverse fast Fourier transform.
    IFFT[ar, kr](width_first: true) {
        pv_chain: required,
        window_type: 0,
        window_size: 0,
    }
}

ugen! {
    /// Add two FFT chains bin-wise.
    PV_Add[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Scramble bins on trigger.
    PV_BinScramble[kr](width_first: true) {
        pv_chain: required,
        wipe: 0,
        width: 0.2,
        trigger: 0,
    }
}

ugen! {
    /// Stretch and shift bin positions.
    PV_BinShift[kr](width_first: true) {
        pv_chain: required,
        stretch: 1.0,
        shift: 0.0,
        interpolate: 0,
    }
}

ugen! {
    /// Crossfade bins between two chains.
    PV_BinWipe[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
        wipe: 0,
    }
}

ugen! {
    /// Zero bins above or below a cutoff.
    PV_BrickWall[kr](width_first: true) {
        pv_chain: required,
        wipe: 0,
    }
}

ugen! {
    /// Complex-plane conformal map.
    PV_ConformalMap[kr](width_first: true) {
        pv_chain: required,
        areal: 0,
        aimag: 0,
    }
}

ugen! {
    /// Complex conjugate.
    PV_Conj[kr](width_first: true) {
        pv_chain: required,
    }
}

ugen! {
    /// Copy one FFT chain into another buffer.
    PV_Copy[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Combine magnitudes of one chain with phases of another.
    PV_CopyPhase[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Randomize phases on trigger.
    PV_Diffuser[kr](width_first: true) {
        pv_chain: required,
        trigger: 0,
    }
}

ugen! {
    /// Divide two FFT chains bin-wise.
    PV_Div[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Hainsworth/Foote onset detector.
    PV_HainsworthFoote[kr](width_first: true) {
        pv_chain: required,
        proph: 0,
        propf: 0,
        threshold: 1,
        waittime: 0.04,
    }
}

ugen! {
    /// Jensen/Andersen onset detector.
    PV_JensenAndersen[kr](width_first: true) {
        pv_chain: required,
        propsc: 0.25,
        prophfe: 0.25,
        prophfc: 0.25,
        propsf: 0.25,
        threshold: 1,
        waittime: 0.04,
    }
}

ugen! {
    /// Keep only bins that are local spectral maxima.
    PV_LocalMax[kr](width_first: true) {
        pv_chain: required,
        threshold: 0,
    }
}

ugen! {
    /// Pass bins above a magnitude threshold.
    PV_MagAbove[kr](width_first: true) {
        pv_chain: required,
        threshold: 0,
    }
}

ugen! {
    /// Pass bins below a magnitude threshold.
    PV_MagBelow[kr](width_first: true) {
        pv_chain: required,
        threshold: 0,
    }
}

ugen! {
    /// Clip bin magnitudes.
    PV_MagClip[kr](width_first: true) {
        pv_chain: required,
        threshold: 0,
    }
}

ugen! {
    /// Divide magnitudes of two chains.
    PV_MagDiv[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
        zeroed: 0.0001,
    }
}

ugen! {
    /// Freeze magnitudes while the freeze input is set.
    PV_MagFreeze[kr](width_first: true) {
        pv_chain: required,
        freeze: 0,
    }
}

ugen! {
    /// Multiply magnitudes of two chains.
    PV_MagMul[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Multiply magnitudes by noise.
    PV_MagNoise[kr](width_first: true) {
        pv_chain: required,
    }
}

ugen! {
    /// Stretch and shift magnitudes across bins.
    PV_MagShift[kr](width_first: true) {
        pv_chain: required,
        stretch: 1.0,
        shift: 0.0,
    }
}

ugen! {
    /// Average magnitudes across neighboring bins.
    PV_MagSmear[kr](width_first: true) {
        pv_chain: required,
        bins: 0,
    }
}

ugen! {
    /// Square magnitudes.
    PV_MagSquared[kr](width_first: true) {
        pv_chain: required,
    }
}

ugen! {
    /// Bin-wise maximum of two chains.
    PV_Max[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Bin-wise minimum of two chains.
    PV_Min[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Complex multiply of two chains.
    PV_Mul[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
    }
}

ugen! {
    /// Shift phases by an angle.
    PV_PhaseShift[kr](width_first: true) {
        pv_chain: required,
        shift: required,
        integrate: 0,
    }
}

ugen! {
    /// Shift phases by 270 degrees.
    PV_PhaseShift270[kr](width_first: true) {
        pv_chain: required,
    }
}

ugen! {
    /// Shift phases by 90 degrees.
    PV_PhaseShift90[kr](width_first: true) {
        pv_chain: required,
    }
}

ugen! {
    /// Pass a random comb of bins.
    PV_RandComb[kr](width_first: true) {
        pv_chain: required,
        wipe: 0,
        trigger: 0,
    }
}

ugen! {
    /// Crossfade between two chains bin-by-bin in random order.
    PV_RandWipe[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
        wipe: 0,
        trigger: 0,
    }
}

ugen! {
    /// Pass a rectangular comb of bins.
    PV_RectComb[kr](width_first: true) {
        pv_chain: required,
        num_teeth: 0,
        phase: 0,
        width: 0.5,
    }
}

ugen! {
    /// Rectangular comb crossfading between two chains.
    PV_RectComb2[kr](width_first: true) {
        pv_chain_a: required,
        pv_chain_b: required,
        num_teeth: 0,
        phase: 0,
        width: 0.5,
    }
}

ugen! {
    /// Running sum over a fixed sample count.
    RunningSum[ar, kr] {
        source: required,
        sample_count: 40,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthdef::SynthDefBuilder;
    use crate::ugens::{Out, WhiteNoise};

    #[test]
    fn fft_allocates_a_local_buf_by_default() {
        let builder = SynthDefBuilder::new();
        let chain = FFT::new(WhiteNoise::new().ar()).kr();
        let chain = PV_MagAbove::new(chain).threshold(0.1).kr();
        Out::new(IFFT::new(chain).ar()).ar();
        let synthdef = builder.build("spectral").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        assert!(names.contains(&"MaxLocalBufs"));
        assert!(names.contains(&"LocalBuf"));
        assert!(names.contains(&"FFT"));
        assert!(names.contains(&"PV_MagAbove"));
        assert!(names.contains(&"IFFT"));
    }

    #[test]
    fn width_first_chain_precedes_consumers() {
        let builder = SynthDefBuilder::new();
        let source = WhiteNoise::new().ar();
        let chain = FFT::new(source.clone()).kr();
        let resynth = IFFT::new(chain).ar();
        Out::new(resynth + source).ar();
        let synthdef = builder.build("hoisted").unwrap();
        let names: Vec<&str> = synthdef.ugens().iter().map(|u| u.name()).collect();
        let fft = names.iter().position(|n| *n == "FFT").unwrap();
        let ifft = names.iter().position(|n| *n == "IFFT").unwrap();
        let out = names.iter().position(|n| *n == "Out").unwrap();
        assert!(fft < ifft);
        assert!(ifft < out);
    }
}
