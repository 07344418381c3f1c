//! Best-effort haptic feedback dispatch.

use holoscene_core::input::Hand;
use log::trace;

/// Minimum spacing between pulses to the same hand, in seconds. Caps the
/// pulse rate well above anything a gesture legitimately produces.
pub const MIN_PULSE_INTERVAL: f32 = 0.01;

/// Device boundary for haptic delivery.
///
/// Implementations must be infallible: a device that cannot deliver
/// haptics simply does nothing. The dispatcher never retries and never
/// queues — the sink only ever sees the most recent request.
pub trait HapticSink {
    /// Fire a single pulse on `hand`. `intensity` is in [0, 1].
    fn pulse(&mut self, hand: Hand, intensity: f32, duration_ms: u32);
}

/// Default sink for hosts without haptic hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHapticSink;

impl HapticSink for NullHapticSink {
    fn pulse(&mut self, _hand: Hand, _intensity: f32, _duration_ms: u32) {}
}

/// Discrete interaction moments that map to pulses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HapticCue {
    /// The input ray moved onto a handle.
    HoverEnter,
    /// A drag began.
    Grab,
    /// A value crossed onto a snap target (edge-triggered).
    SnapEngage,
    /// A drag ended.
    Release,
    /// Slow-rotation fine-tune mode engaged.
    FineTuneEnter,
    /// Both grips closed on the target.
    TwoHandEngage,
    /// Pinch-scale progress; carries the current scale factor.
    TwoHandScale(f32),
    /// A pinch ended.
    TwoHandRelease,
}

impl HapticCue {
    /// Map a cue to its `(intensity, duration_ms)` pair.
    pub fn params(self) -> (f32, u32) {
        match self {
            HapticCue::HoverEnter => (0.15, 10),
            HapticCue::Grab => (0.5, 25),
            HapticCue::SnapEngage => (0.35, 15),
            HapticCue::Release => (0.3, 20),
            HapticCue::FineTuneEnter => (0.25, 40),
            HapticCue::TwoHandEngage => (0.8, 40),
            HapticCue::TwoHandScale(scale) => {
                // stronger feedback the further the pinch is from 1:1
                (((scale - 1.0).abs() * 0.5).clamp(0.05, 0.4), 10)
            }
            HapticCue::TwoHandRelease => (0.4, 25),
        }
    }
}

/// Rate-limited, best-effort pulse dispatch.
///
/// Pulses landing inside [`MIN_PULSE_INTERVAL`] of the previous one on
/// the same hand are dropped rather than queued.
pub struct HapticDispatcher {
    sink: Box<dyn HapticSink>,
    enabled: bool,
    /// Seconds remaining until each hand may pulse again.
    cooldown: [f32; 2],
}

impl HapticDispatcher {
    pub fn new(sink: Box<dyn HapticSink>, enabled: bool) -> Self {
        Self {
            sink,
            enabled,
            cooldown: [0.0; 2],
        }
    }

    /// Advance the per-hand cooldowns. Call once per frame.
    pub fn tick(&mut self, dt: f32) {
        for cooldown in &mut self.cooldown {
            *cooldown = (*cooldown - dt).max(0.0);
        }
    }

    /// Fire `cue` on `hand` if the hand's cooldown allows it.
    pub fn send(&mut self, hand: Hand, cue: HapticCue) {
        if !self.enabled {
            return;
        }
        let slot = hand.index();
        if self.cooldown[slot] > 0.0 {
            trace!("haptic cue {cue:?} on {hand:?} dropped (cooldown)");
            return;
        }
        let (intensity, duration_ms) = cue.params();
        self.sink.pulse(hand, intensity, duration_ms);
        self.cooldown[slot] = MIN_PULSE_INTERVAL;
    }

    /// Fire `cue` on both hands.
    pub fn send_both(&mut self, cue: HapticCue) {
        for hand in Hand::BOTH {
            self.send(hand, cue);
        }
    }
}

/// Test sink capturing every delivered pulse.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSink {
    pub pulses: std::rc::Rc<std::cell::RefCell<Vec<(Hand, f32, u32)>>>,
}

#[cfg(test)]
impl RecordingSink {
    /// Count of delivered pulses matching `cue`'s parameters.
    pub fn count(&self, cue: HapticCue) -> usize {
        let (intensity, duration) = cue.params();
        self.pulses
            .borrow()
            .iter()
            .filter(|(_, i, d)| (*i - intensity).abs() < 1e-6 && *d == duration)
            .count()
    }
}

#[cfg(test)]
impl HapticSink for RecordingSink {
    fn pulse(&mut self, hand: Hand, intensity: f32, duration_ms: u32) {
        self.pulses.borrow_mut().push((hand, intensity, duration_ms));
    }
}
