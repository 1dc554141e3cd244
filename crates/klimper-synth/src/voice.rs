//! A single two-operator FM voice.

use klimper_dsp::{AdsrValues, Envelope, Oscillator, Panner, Waveform, Wavetable, midi_to_hz};

/// Depth of the LFO that sweeps the voice across the stereo field.
const PAN_DEPTH: f32 = 0.75;

/// One synthesizer voice.
///
/// The modulator oscillator (shaped by its own envelope and scaled by the FM
/// index) modulates the carrier's phase increment. The carrier envelope alone
/// decides whether the voice is sounding. A per-voice LFO moves the voice
/// left and right.
#[derive(Debug, Clone)]
pub struct Voice {
    note: Option<u8>,
    velocity: f32,
    active: bool,

    carrier: Oscillator<'static>,
    carrier_env: Envelope,
    modulator: Oscillator<'static>,
    modulator_env: Envelope,
    lfo: Oscillator<'static>,

    fm_ratio: f32,
    fm_index: f32,
}

impl Voice {
    /// Create an idle voice whose pan LFO runs at `lfo_rate` Hz.
    pub fn new(
        sample_rate: f32,
        lfo_rate: f32,
        carrier_envelope: AdsrValues,
        modulator_envelope: AdsrValues,
    ) -> Self {
        let sine = Wavetable::shared(Waveform::Sine);

        let mut carrier_env = Envelope::new(sample_rate);
        carrier_env.set_values(carrier_envelope);
        let mut modulator_env = Envelope::new(sample_rate);
        modulator_env.set_values(modulator_envelope);

        let mut lfo = Oscillator::new(sine, sample_rate);
        lfo.reinit(lfo_rate, true);

        Self {
            note: None,
            velocity: 0.0,
            active: false,
            carrier: Oscillator::new(sine, sample_rate),
            carrier_env,
            modulator: Oscillator::new(sine, sample_rate),
            modulator_env,
            lfo,
            fm_ratio: 1.0,
            fm_index: 0.0,
        }
    }

    /// Start `note`. Oscillator phases carry over so retriggers don't click.
    pub fn start(&mut self, note: u8, velocity: f32, fm_ratio: f32, fm_index: f32) {
        self.note = Some(note);
        self.velocity = velocity;
        self.fm_ratio = fm_ratio;
        self.fm_index = fm_index;

        let freq = midi_to_hz(f32::from(note));
        self.carrier.reinit(freq, false);
        self.carrier.set_fm_scale(self.carrier.phase_increment());
        self.modulator.reinit(freq * fm_ratio, false);

        self.carrier_env.trigger_attack();
        self.modulator_env.trigger_attack();
        self.active = true;
    }

    /// Release the carrier envelope. The modulator envelope keeps running.
    pub fn release(&mut self) {
        self.carrier_env.trigger_release();
    }

    /// Render one frame and return the `(left, right)` contribution.
    #[inline]
    pub fn render(&mut self, gain: f32, panner: &Panner) -> (f32, f32) {
        let modulation = self.modulator.tick(0.0) * self.modulator_env.tick() * self.fm_index;
        let sample = self.carrier.tick(modulation) * self.carrier_env.tick() * gain;
        let pan = self.lfo.tick(0.0) * PAN_DEPTH;
        panner.stereo(sample, pan)
    }

    /// Recompute the activity flag from the carrier envelope.
    pub fn refresh_activity(&mut self) {
        self.active = !self.carrier_env.is_stopped();
    }

    /// Loudness estimate used for voice stealing.
    pub fn amplitude(&self) -> f32 {
        self.velocity * self.carrier_env.value()
    }

    /// Replace the carrier envelope parameters.
    pub fn set_carrier_envelope(&mut self, values: AdsrValues) {
        self.carrier_env.set_values(values);
    }

    /// Replace the modulator envelope parameters.
    pub fn set_modulator_envelope(&mut self, values: AdsrValues) {
        self.modulator_env.set_values(values);
    }

    /// Last note started on this voice, if any.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Velocity of the last note.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// True while the carrier envelope is running (as of the last block).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Modulator frequency ratio chosen for the current note.
    pub fn fm_ratio(&self) -> f32 {
        self.fm_ratio
    }

    /// FM index chosen for the current note.
    pub fn fm_index(&self) -> f32 {
        self.fm_index
    }

    /// Pan LFO rate in Hz.
    pub fn lfo_rate(&self) -> f32 {
        self.lfo.frequency()
    }

    /// Carrier envelope.
    pub fn carrier_envelope(&self) -> &Envelope {
        &self.carrier_env
    }

    /// Modulator envelope.
    pub fn modulator_envelope(&self) -> &Envelope {
        &self.modulator_env
    }

    /// Carrier oscillator.
    pub fn carrier(&self) -> &Oscillator<'static> {
        &self.carrier
    }

    /// Modulator oscillator.
    pub fn modulator(&self) -> &Oscillator<'static> {
        &self.modulator
    }
}
