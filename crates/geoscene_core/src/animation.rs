//! Time-based animations advanced once per frame

use std::time::{Duration, Instant};

type UpdateFn = Box<dyn FnMut(f64)>;
type CompleteFn = Box<dyn FnOnce()>;

/// An animation driven by normalized progress in `[0, 1]`
pub struct Animation {
    duration: Duration,
    started: Option<Instant>,
    on_update: UpdateFn,
    on_complete: Option<CompleteFn>,
}

impl Animation {
    /// Create an animation; it starts on the first collection update after being added
    pub fn new(duration: Duration, on_update: impl FnMut(f64) + 'static) -> Self {
        Self {
            duration,
            started: None,
            on_update: Box::new(on_update),
            on_complete: None,
        }
    }

    /// Run `on_complete` once after the final update
    pub fn with_on_complete(mut self, on_complete: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Advance to `now`; returns true once finished
    fn advance(&mut self, now: Instant) -> bool {
        let started = *self.started.get_or_insert(now);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (now.saturating_duration_since(started).as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        (self.on_update)(progress);
        if progress >= 1.0 {
            if let Some(on_complete) = self.on_complete.take() {
                on_complete();
            }
            return true;
        }
        false
    }
}

/// Active animations
#[derive(Default)]
pub struct AnimationCollection {
    animations: Vec<Animation>,
}

impl AnimationCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    /// Advance every animation to the current time
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Advance every animation to `now`, dropping the ones that finish
    pub fn update_at(&mut self, now: Instant) {
        self.animations.retain_mut(|animation| !animation.advance(now));
    }

    pub fn remove_all(&mut self) {
        self.animations.clear();
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
