//! Linear-segment ADSR envelope generator.
//!
//! Every segment is a straight line: the envelope adds a precomputed
//! increment once per sample until the segment target is crossed, then
//! clamps to the target and moves on. Increments are recomputed whenever any
//! parameter changes, so a running envelope picks up new timings on the next
//! sample.

/// ADSR envelope status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStatus {
    /// Envelope is finished. Output holds at its last value (zero after a release).
    #[default]
    Stopped,
    /// Rising from the current value toward the peak.
    Attack,
    /// Falling from the peak toward the sustain level.
    Decay,
    /// Holding at the sustain level while the note is held.
    Sustain,
    /// Falling toward zero after the note was released.
    Release,
}

/// One segment of the envelope.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Breakpoint {
    /// Level the segment heads for.
    pub target: f32,
    /// Nominal segment length in seconds.
    pub duration: f32,
    /// Per-sample step, derived from target, origin and duration.
    pub increment: f32,
}

/// Complete envelope parameter set, used for templates and bulk updates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdsrValues {
    /// Attack time in seconds.
    pub attack: f32,
    /// Peak level reached at the end of the attack.
    pub peak: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for AdsrValues {
    fn default() -> Self {
        Self {
            attack: 0.1,
            peak: 1.0,
            decay: 0.3,
            sustain: 0.5,
            release: 0.5,
        }
    }
}

/// ADSR envelope.
///
/// # Example
///
/// ```rust
/// use klimper_dsp::{AdsrValues, Envelope, EnvelopeStatus};
///
/// let mut env = Envelope::new(1000.0);
/// env.set_values(AdsrValues { attack: 0.01, peak: 1.0, decay: 0.01, sustain: 0.5, release: 0.02 });
///
/// env.trigger_attack();
/// for _ in 0..100 {
///     env.tick();
/// }
/// assert_eq!(env.status(), EnvelopeStatus::Sustain);
///
/// env.trigger_release();
/// for _ in 0..100 {
///     env.tick();
/// }
/// assert_eq!(env.status(), EnvelopeStatus::Stopped);
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    sample_rate: f32,
    min_samples: f32,
    attack: Breakpoint,
    decay: Breakpoint,
    release: Breakpoint,
    sustain_level: f32,
    status: EnvelopeStatus,
    value: f32,
}

impl Envelope {
    /// Create a stopped envelope with [`AdsrValues::default`] parameters.
    ///
    /// No segment is shorter than 1% of a second worth of samples.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            sample_rate,
            min_samples: sample_rate * 0.01,
            attack: Breakpoint::default(),
            decay: Breakpoint::default(),
            release: Breakpoint::default(),
            sustain_level: 0.0,
            status: EnvelopeStatus::Stopped,
            value: 0.0,
        };
        env.set_values(AdsrValues::default());
        env
    }

    /// Replace all parameters at once.
    pub fn set_values(&mut self, values: AdsrValues) {
        self.attack.duration = values.attack;
        self.attack.target = values.peak;
        self.decay.duration = values.decay;
        self.sustain_level = values.sustain;
        self.release.duration = values.release;
        self.recalculate();
    }

    /// Current parameters.
    pub fn values(&self) -> AdsrValues {
        AdsrValues {
            attack: self.attack.duration,
            peak: self.attack.target,
            decay: self.decay.duration,
            sustain: self.sustain_level,
            release: self.release.duration,
        }
    }

    /// Set attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.attack.duration = seconds;
        self.recalculate();
    }

    /// Set the peak level.
    pub fn set_peak(&mut self, level: f32) {
        self.attack.target = level;
        self.recalculate();
    }

    /// Set decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.decay.duration = seconds;
        self.recalculate();
    }

    /// Set the sustain level.
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = level;
        self.recalculate();
    }

    /// Set release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.release.duration = seconds;
        self.recalculate();
    }

    /// Start (or restart) the attack from the current value.
    pub fn trigger_attack(&mut self) {
        self.status = EnvelopeStatus::Attack;
    }

    /// Start the release from the current value, whatever the current stage.
    pub fn trigger_release(&mut self) {
        self.status = EnvelopeStatus::Release;
    }

    /// Current status.
    pub fn status(&self) -> EnvelopeStatus {
        self.status
    }

    /// True once the envelope has finished.
    pub fn is_stopped(&self) -> bool {
        self.status == EnvelopeStatus::Stopped
    }

    /// Current output value, without advancing.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Attack segment.
    pub fn attack(&self) -> Breakpoint {
        self.attack
    }

    /// Decay segment.
    pub fn decay(&self) -> Breakpoint {
        self.decay
    }

    /// Release segment.
    pub fn release(&self) -> Breakpoint {
        self.release
    }

    /// Return the current value, then advance one sample.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let out = self.value;

        match self.status {
            EnvelopeStatus::Attack => {
                self.value += self.attack.increment;
                if self.value >= self.attack.target {
                    self.value = self.attack.target;
                    self.status = EnvelopeStatus::Decay;
                }
            }
            EnvelopeStatus::Decay => {
                self.value += self.decay.increment;
                if self.value <= self.decay.target {
                    self.value = self.decay.target;
                    self.status = EnvelopeStatus::Sustain;
                }
            }
            EnvelopeStatus::Release => {
                self.value += self.release.increment;
                if self.value <= 0.0 {
                    self.value = 0.0;
                    self.status = EnvelopeStatus::Stopped;
                }
            }
            EnvelopeStatus::Sustain | EnvelopeStatus::Stopped => {}
        }

        out
    }

    fn recalculate(&mut self) {
        let peak = self.attack.target;
        self.decay.target = self.sustain_level;
        self.release.target = 0.0;

        self.attack.increment = peak / self.segment_samples(self.attack.duration);
        self.decay.increment =
            (self.sustain_level - peak) / self.segment_samples(self.decay.duration);

        // A zero sustain would give a zero release slope; release from the peak instead
        let release_origin = if self.sustain_level > 0.0 {
            self.sustain_level
        } else {
            peak
        };
        self.release.increment = -release_origin / self.segment_samples(self.release.duration);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            attack = self.attack.increment,
            decay = self.decay.increment,
            release = self.release.increment,
            "envelope increments recalculated"
        );
    }

    fn segment_samples(&self, seconds: f32) -> f32 {
        (seconds * self.sample_rate).max(self.min_samples)
    }
}
