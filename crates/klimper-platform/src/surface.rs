//! Validated control API in front of the shared parameter bank.
//!
//! [`ControlSurface`] is what buttons, encoders, a console or a MIDI input
//! talk to. Parameter writes go straight into [`SharedParams`]; note events
//! go through a bounded queue the audio worker drains once per period.
//! Nothing here ever blocks.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use klimper_synth::{AdsrValues, NoteEvent, ParamId, SharedParams};

use crate::error::ControlError;

/// Default capacity of the note event queue.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

const CARRIER_IDS: [ParamId; 5] = [
    ParamId::CarrierAttack,
    ParamId::CarrierPeak,
    ParamId::CarrierDecay,
    ParamId::CarrierSustain,
    ParamId::CarrierRelease,
];

const MODULATOR_IDS: [ParamId; 5] = [
    ParamId::ModulatorAttack,
    ParamId::ModulatorPeak,
    ParamId::ModulatorDecay,
    ParamId::ModulatorSustain,
    ParamId::ModulatorRelease,
];

/// Handle for changing the running engine.
///
/// Cheap to clone; every clone feeds the same parameter bank and queue.
///
/// ```rust
/// use std::sync::Arc;
/// use klimper_platform::{ControlError, ControlSurface};
/// use klimper_synth::{NoteEvent, Sequencer, SharedParams, Synth, SynthSettings};
///
/// let synth = Synth::new(SynthSettings::default()).unwrap();
/// let seq = Sequencer::new(44100.0, &[60], 80, 1).unwrap();
/// let params = Arc::new(SharedParams::capture(&synth, &seq));
/// let (surface, events) = ControlSurface::new(params, 8);
///
/// surface.note_on(60, 0.8).unwrap();
/// assert_eq!(events.try_recv(), Ok(NoteEvent::On { note: 60, velocity: 0.8 }));
/// assert_eq!(surface.set_bpm(0), Err(ControlError::ZeroBpm));
/// ```
#[derive(Debug, Clone)]
pub struct ControlSurface {
    params: Arc<SharedParams>,
    events: Sender<NoteEvent>,
}

impl ControlSurface {
    /// Create a surface and the receiving end of its note queue.
    ///
    /// The queue holds `capacity` events; it is allocated here and never grows.
    pub fn new(params: Arc<SharedParams>, capacity: usize) -> (Self, Receiver<NoteEvent>) {
        let (events, rx) = crossbeam_channel::bounded(capacity.max(1));
        (Self { params, events }, rx)
    }

    /// The shared parameter bank.
    pub fn params(&self) -> &Arc<SharedParams> {
        &self.params
    }

    /// Queue a note-on.
    pub fn note_on(&self, note: u8, velocity: f32) -> Result<(), ControlError> {
        check_note(note)?;
        if !(0.0..=1.0).contains(&velocity) {
            return Err(ControlError::InvalidVelocity(velocity));
        }
        self.send(NoteEvent::On { note, velocity })
    }

    /// Queue a note-off.
    pub fn note_off(&self, note: u8) -> Result<(), ControlError> {
        check_note(note)?;
        self.send(NoteEvent::Off { note })
    }

    /// Queue a release of every voice.
    pub fn all_notes_off(&self) -> Result<(), ControlError> {
        self.send(NoteEvent::AllOff)
    }

    /// Set one parameter. The value must be finite and inside the range.
    pub fn set_param(&self, id: ParamId, value: f32) -> Result<(), ControlError> {
        check_param(id, value)?;
        self.params.set(id, value);
        tracing::debug!(param = id.info().name, value, "parameter changed");
        Ok(())
    }

    /// Current value of one parameter.
    pub fn param(&self, id: ParamId) -> f32 {
        self.params.get(id)
    }

    /// Set the master volume in `[0, 1]`.
    pub fn set_volume(&self, volume: f32) -> Result<(), ControlError> {
        self.set_param(ParamId::Volume, volume)
    }

    /// Replace the carrier envelope. Nothing is written unless every value passes.
    pub fn set_carrier_envelope(&self, values: AdsrValues) -> Result<(), ControlError> {
        self.set_envelope(CARRIER_IDS, values)
    }

    /// Replace the modulator envelope. Nothing is written unless every value passes.
    pub fn set_modulator_envelope(&self, values: AdsrValues) -> Result<(), ControlError> {
        self.set_envelope(MODULATOR_IDS, values)
    }

    /// Set the sequencer tempo.
    pub fn set_bpm(&self, bpm: u32) -> Result<(), ControlError> {
        if bpm == 0 {
            return Err(ControlError::ZeroBpm);
        }
        self.set_param(ParamId::Bpm, bpm as f32)
    }

    /// Start or stop the sequencer.
    pub fn set_running(&self, running: bool) {
        self.params.set_running(running);
        tracing::debug!(running, "sequencer run state changed");
    }

    /// Requested sequencer run state.
    pub fn running(&self) -> bool {
        self.params.running()
    }

    fn set_envelope(&self, ids: [ParamId; 5], values: AdsrValues) -> Result<(), ControlError> {
        let values = [
            values.attack,
            values.peak,
            values.decay,
            values.sustain,
            values.release,
        ];
        for (&id, &value) in ids.iter().zip(&values) {
            check_param(id, value)?;
        }
        for (&id, &value) in ids.iter().zip(&values) {
            self.params.set(id, value);
        }
        Ok(())
    }

    fn send(&self, event: NoteEvent) -> Result<(), ControlError> {
        match self.events.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "note queue full, event dropped");
                Err(ControlError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(ControlError::Disconnected),
        }
    }
}

fn check_note(note: u8) -> Result<(), ControlError> {
    if note > 127 {
        return Err(ControlError::NoteOutOfRange(note));
    }
    Ok(())
}

fn check_param(id: ParamId, value: f32) -> Result<(), ControlError> {
    let info = id.info();
    if !value.is_finite() {
        return Err(ControlError::NotFinite { param: info.name });
    }
    if value < info.min || value > info.max {
        return Err(ControlError::OutOfRange {
            param: info.name,
            value,
            min: info.min,
            max: info.max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use klimper_synth::{Sequencer, Synth, SynthSettings};

    fn surface(capacity: usize) -> (ControlSurface, Receiver<NoteEvent>) {
        let synth = Synth::new(SynthSettings::default()).unwrap();
        let seq = Sequencer::new(44100.0, &[60], 80, 1).unwrap();
        ControlSurface::new(Arc::new(SharedParams::capture(&synth, &seq)), capacity)
    }

    #[test]
    fn test_note_validation() {
        let (s, rx) = surface(4);
        assert_eq!(s.note_on(128, 1.0), Err(ControlError::NoteOutOfRange(128)));
        assert_eq!(s.note_off(200), Err(ControlError::NoteOutOfRange(200)));
        assert!(matches!(s.note_on(60, 1.5), Err(ControlError::InvalidVelocity(_))));
        assert!(matches!(s.note_on(60, f32::NAN), Err(ControlError::InvalidVelocity(_))));
        assert!(rx.is_empty());

        s.note_on(127, 0.0).unwrap();
        s.note_off(0).unwrap();
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn test_full_queue_drops() {
        let (s, rx) = surface(1);
        s.note_on(60, 1.0).unwrap();
        assert_eq!(s.note_on(61, 1.0), Err(ControlError::QueueFull));
        assert_eq!(rx.try_recv(), Ok(NoteEvent::On { note: 60, velocity: 1.0 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected() {
        let (s, rx) = surface(1);
        drop(rx);
        assert_eq!(s.all_notes_off(), Err(ControlError::Disconnected));
    }

    #[test]
    fn test_param_validation() {
        let (s, _rx) = surface(1);
        let before = s.params().version();

        assert!(matches!(
            s.set_volume(f32::INFINITY),
            Err(ControlError::NotFinite { .. })
        ));
        assert!(matches!(s.set_volume(1.5), Err(ControlError::OutOfRange { .. })));
        assert_eq!(s.params().version(), before);

        s.set_volume(0.3).unwrap();
        assert_eq!(s.param(ParamId::Volume), 0.3);
        assert!(s.params().version() > before);
    }

    #[test]
    fn test_bpm() {
        let (s, _rx) = surface(1);
        assert_eq!(s.set_bpm(0), Err(ControlError::ZeroBpm));
        assert!(matches!(s.set_bpm(1000), Err(ControlError::OutOfRange { .. })));
        s.set_bpm(140).unwrap();
        assert_eq!(s.param(ParamId::Bpm), 140.0);
    }

    #[test]
    fn test_envelope_all_or_nothing() {
        let (s, _rx) = surface(1);
        let original = s.params().carrier_envelope();

        let bad = AdsrValues {
            sustain: 2.0,
            ..AdsrValues::default()
        };
        assert!(s.set_carrier_envelope(bad).is_err());
        assert_eq!(s.params().carrier_envelope(), original);

        let good = AdsrValues {
            attack: 0.02,
            peak: 0.9,
            decay: 0.1,
            sustain: 0.4,
            release: 1.0,
        };
        s.set_modulator_envelope(good).unwrap();
        assert_eq!(s.params().modulator_envelope(), good);
        assert_eq!(s.params().carrier_envelope(), original);
    }

    #[test]
    fn test_running() {
        let (s, _rx) = surface(1);
        s.set_running(false);
        assert!(!s.running());
        s.set_running(true);
        assert!(s.running());
    }
}
