//! Lock-free parameter bank shared between a control thread and the renderer.
//!
//! [`SharedParams`] stores each parameter as f32 bits in an `AtomicU32`. The
//! control side calls [`SharedParams::set`]; the render side calls
//! [`SharedParams::sync_if_changed`] once per period, which pushes the values
//! into the [`Synth`] and [`Sequencer`] only when the version counter moved.
//!
//! Fields are independent atomics, so a reader can observe half of a
//! multi-parameter update. The next sync fixes it up.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use klimper_dsp::AdsrValues;

use crate::sequencer::Sequencer;
use crate::synth::Synth;

/// Display and range metadata for one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamInfo {
    /// Human-readable label.
    pub name: &'static str,
    /// Smallest allowed value.
    pub min: f32,
    /// Largest allowed value.
    pub max: f32,
    /// Increment used by encoder-style controls.
    pub step: f32,
}

/// Identifiers of the shared parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ParamId {
    Volume,
    CarrierAttack,
    CarrierPeak,
    CarrierDecay,
    CarrierSustain,
    CarrierRelease,
    ModulatorAttack,
    ModulatorPeak,
    ModulatorDecay,
    ModulatorSustain,
    ModulatorRelease,
    Bpm,
}

const PARAM_COUNT: usize = 12;

impl ParamId {
    /// Every parameter, in storage order.
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::Volume,
        ParamId::CarrierAttack,
        ParamId::CarrierPeak,
        ParamId::CarrierDecay,
        ParamId::CarrierSustain,
        ParamId::CarrierRelease,
        ParamId::ModulatorAttack,
        ParamId::ModulatorPeak,
        ParamId::ModulatorDecay,
        ParamId::ModulatorSustain,
        ParamId::ModulatorRelease,
        ParamId::Bpm,
    ];

    /// Storage slot.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Range and label.
    pub fn info(self) -> ParamInfo {
        let (name, min, max, step) = match self {
            ParamId::Volume => ("Volume", 0.0, 1.0, 0.05),
            ParamId::CarrierAttack => ("Attack", 0.0, 10.0, 0.05),
            ParamId::CarrierPeak => ("Peak", 0.0, 1.0, 0.05),
            ParamId::CarrierDecay => ("Decay", 0.0, 10.0, 0.05),
            ParamId::CarrierSustain => ("Sustain", 0.0, 1.0, 0.05),
            ParamId::CarrierRelease => ("Release", 0.0, 10.0, 0.05),
            ParamId::ModulatorAttack => ("Mod Attack", 0.0, 10.0, 0.05),
            ParamId::ModulatorPeak => ("Mod Peak", 0.0, 1.0, 0.05),
            ParamId::ModulatorDecay => ("Mod Decay", 0.0, 10.0, 0.05),
            ParamId::ModulatorSustain => ("Mod Sustain", 0.0, 1.0, 0.05),
            ParamId::ModulatorRelease => ("Mod Release", 0.0, 10.0, 0.05),
            ParamId::Bpm => ("BPM", 1.0, 300.0, 1.0),
        };
        ParamInfo {
            name,
            min,
            max,
            step,
        }
    }
}

/// Atomic parameter bank.
///
/// ```rust
/// use klimper_synth::{ParamId, Sequencer, SharedParams, Synth, SynthSettings};
///
/// let mut synth = Synth::new(SynthSettings::default()).unwrap();
/// let mut seq = Sequencer::new(44100.0, &[60], 80, 1).unwrap();
/// let params = SharedParams::capture(&synth, &seq);
///
/// let mut seen = params.version();
/// params.set(ParamId::Volume, 0.25);
/// assert!(params.sync_if_changed(&mut seen, &mut synth, &mut seq));
/// assert_eq!(synth.volume(), 0.25);
/// assert!(!params.sync_if_changed(&mut seen, &mut synth, &mut seq));
/// ```
#[derive(Debug)]
pub struct SharedParams {
    values: [AtomicU32; PARAM_COUNT],
    running: AtomicBool,
    version: AtomicU32,
}

impl SharedParams {
    /// Snapshot the current engine state as the initial parameter values.
    pub fn capture(synth: &Synth, sequencer: &Sequencer) -> Self {
        let carrier = synth.carrier_envelope();
        let modulator = synth.modulator_envelope();
        let initial = |id: ParamId| match id {
            ParamId::Volume => synth.volume(),
            ParamId::CarrierAttack => carrier.attack,
            ParamId::CarrierPeak => carrier.peak,
            ParamId::CarrierDecay => carrier.decay,
            ParamId::CarrierSustain => carrier.sustain,
            ParamId::CarrierRelease => carrier.release,
            ParamId::ModulatorAttack => modulator.attack,
            ParamId::ModulatorPeak => modulator.peak,
            ParamId::ModulatorDecay => modulator.decay,
            ParamId::ModulatorSustain => modulator.sustain,
            ParamId::ModulatorRelease => modulator.release,
            ParamId::Bpm => sequencer.bpm() as f32,
        };

        Self {
            values: core::array::from_fn(|i| AtomicU32::new(initial(ParamId::ALL[i]).to_bits())),
            running: AtomicBool::new(sequencer.is_running()),
            version: AtomicU32::new(0),
        }
    }

    /// Store `value`, clamped to the parameter range, and return what was stored.
    ///
    /// Non-finite values are ignored and the current value is returned.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        if !value.is_finite() {
            return self.get(id);
        }
        let info = id.info();
        let clamped = value.clamp(info.min, info.max);
        self.values[id.index()].store(clamped.to_bits(), Ordering::Release);
        self.version.fetch_add(1, Ordering::Release);
        clamped
    }

    /// Current value.
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Acquire))
    }

    /// Start or stop the sequencer.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Requested sequencer run state.
    pub fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Change counter, bumped by every write.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    /// Carrier envelope as currently stored.
    pub fn carrier_envelope(&self) -> AdsrValues {
        AdsrValues {
            attack: self.get(ParamId::CarrierAttack),
            peak: self.get(ParamId::CarrierPeak),
            decay: self.get(ParamId::CarrierDecay),
            sustain: self.get(ParamId::CarrierSustain),
            release: self.get(ParamId::CarrierRelease),
        }
    }

    /// Modulator envelope as currently stored.
    pub fn modulator_envelope(&self) -> AdsrValues {
        AdsrValues {
            attack: self.get(ParamId::ModulatorAttack),
            peak: self.get(ParamId::ModulatorPeak),
            decay: self.get(ParamId::ModulatorDecay),
            sustain: self.get(ParamId::ModulatorSustain),
            release: self.get(ParamId::ModulatorRelease),
        }
    }

    /// Push every value into the engine.
    pub fn sync_to(&self, synth: &mut Synth, sequencer: &mut Sequencer) {
        synth.set_volume(self.get(ParamId::Volume));
        synth.set_carrier_envelope(self.carrier_envelope());
        synth.set_modulator_envelope(self.modulator_envelope());

        let bpm = self.get(ParamId::Bpm) as u32;
        if bpm != sequencer.bpm() {
            sequencer.set_bpm(bpm);
        }
        let running = self.running();
        if running != sequencer.is_running() {
            sequencer.set_running(running);
        }
    }

    /// Push values into the engine if anything changed since `last_seen`.
    ///
    /// Updates `last_seen` and returns whether a sync happened.
    pub fn sync_if_changed(
        &self,
        last_seen: &mut u32,
        synth: &mut Synth,
        sequencer: &mut Sequencer,
    ) -> bool {
        let version = self.version();
        if version == *last_seen {
            return false;
        }
        self.sync_to(synth, sequencer);
        *last_seen = version;

        #[cfg(feature = "tracing")]
        tracing::debug!(version, "shared parameters applied");

        true
    }
}
