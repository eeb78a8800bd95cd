use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::{Easing, Tween};

type Task = Box<dyn FnOnce()>;
type AnimationStep = Box<dyn FnMut(f32)>;
type AnimationCompletion = Box<dyn FnOnce(bool)>;

/// Identifies an animated property on a specific owner.
///
/// Starting an animation whose key is already running replaces the running one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationKey {
    pub owner: u64,
    pub property: &'static str,
}

impl AnimationKey {
    pub fn new(owner: u64, property: &'static str) -> Self {
        Self { owner, property }
    }
}

struct Timer {
    deadline_ms: u64,
    seq: u64,
    task: Task,
}

struct Animation {
    key: AnimationKey,
    seq: u64,
    tween: Tween,
    step: AnimationStep,
    completion: Option<AnimationCompletion>,
}

enum Due {
    Timer(Task),
    Animation(Animation),
}

#[derive(Default)]
struct Inner {
    now_ms: u64,
    next_seq: u64,
    next_owner: u64,
    timers: Vec<Timer>,
    animations: Vec<Animation>,
}

impl Inner {
    fn seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        seq
    }

    fn push_timer(&mut self, deadline_ms: u64, task: Task) {
        let seq = self.seq();
        self.timers.push(Timer {
            deadline_ms,
            seq,
            task,
        });
    }

    /// Removes the earliest timer or animation completion due at or before `limit_ms`.
    fn pop_due(&mut self, limit_ms: u64) -> Option<Due> {
        let timer = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline_ms <= limit_ms)
            .min_by_key(|(_, t)| (t.deadline_ms, t.seq))
            .map(|(i, t)| (i, t.deadline_ms, t.seq));
        let anim = self
            .animations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.tween.end_ms() <= limit_ms)
            .min_by_key(|(_, a)| (a.tween.end_ms(), a.seq))
            .map(|(i, a)| (i, a.tween.end_ms(), a.seq));

        let take_timer = match (timer, anim) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some((_, td, ts)), Some((_, ad, aseq))) => (td, ts) <= (ad, aseq),
        };

        if take_timer {
            let (i, at, _) = timer?;
            self.now_ms = self.now_ms.max(at);
            Some(Due::Timer(self.timers.swap_remove(i).task))
        } else {
            let (i, at, _) = anim?;
            self.now_ms = self.now_ms.max(at);
            Some(Due::Animation(self.animations.swap_remove(i)))
        }
    }
}

/// The single-threaded execution context that owns every deferred continuation.
///
/// Nothing here runs on its own: an adapter drives the clock by calling
/// [`RunLoop::advance_to`] from its frame loop or timer. Continuations scheduled with
/// [`RunLoop::delay`] and animation completions run in the order their deadlines expire.
#[derive(Clone, Default)]
pub struct RunLoop {
    inner: Rc<RefCell<Inner>>,
}

impl RunLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Hands out a fresh owner id for [`AnimationKey`]s.
    pub fn allocate_owner_id(&self) -> u64 {
        let mut inner = self.inner.borrow_mut();
        inner.next_owner = inner.next_owner.wrapping_add(1);
        inner.next_owner
    }

    /// Schedules `f` for the next turn of the loop.
    pub fn immediately(&self, f: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        let now = inner.now_ms;
        inner.push_timer(now, Box::new(f));
    }

    /// Schedules `f` to run once `delay_ms` have elapsed.
    pub fn delay(&self, delay_ms: u64, f: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        let deadline = inner.now_ms.saturating_add(delay_ms);
        inner.push_timer(deadline, Box::new(f));
    }

    /// Starts an animation.
    ///
    /// `step` receives eased progress on every tick and `1.0` when the animation ends.
    /// `completion` receives `true` when the animation ran to the end, or `false` when it was
    /// replaced by a newer animation with the same key.
    pub fn animate(
        &self,
        key: AnimationKey,
        duration_ms: u64,
        easing: Easing,
        step: impl FnMut(f32) + 'static,
        completion: impl FnOnce(bool) + 'static,
    ) {
        let replaced = {
            let mut inner = self.inner.borrow_mut();
            let replaced = inner
                .animations
                .iter()
                .position(|a| a.key == key)
                .map(|i| inner.animations.swap_remove(i));
            let seq = inner.seq();
            let tween = Tween::new(inner.now_ms, duration_ms, easing);
            inner.animations.push(Animation {
                key,
                seq,
                tween,
                step: Box::new(step),
                completion: Some(Box::new(completion)),
            });
            replaced
        };

        if let Some(old) = replaced {
            lctrace!(
                owner = key.owner,
                property = key.property,
                "animation replaced"
            );
            self.interrupt(old);
        }
    }

    /// Stops the animation running under `key` where it is. Its completion runs with `false` on
    /// the next turn. Returns whether anything was running.
    pub fn cancel(&self, key: AnimationKey) -> bool {
        let cancelled = {
            let mut inner = self.inner.borrow_mut();
            inner
                .animations
                .iter()
                .position(|a| a.key == key)
                .map(|i| inner.animations.swap_remove(i))
        };
        match cancelled {
            Some(anim) => {
                lctrace!(owner = key.owner, property = key.property, "animation cancelled");
                self.interrupt(anim);
                true
            }
            None => false,
        }
    }

    pub fn is_animating(&self, key: AnimationKey) -> bool {
        self.inner.borrow().animations.iter().any(|a| a.key == key)
    }

    /// Number of scheduled timers plus running animations.
    pub fn pending(&self) -> usize {
        let inner = self.inner.borrow();
        inner.timers.len() + inner.animations.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Earliest deadline among timers and animation ends.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        let inner = self.inner.borrow();
        let timers = inner.timers.iter().map(|t| t.deadline_ms);
        let anims = inner.animations.iter().map(|a| a.tween.end_ms());
        timers.chain(anims).min()
    }

    /// Advances the clock to `now_ms`, firing everything that became due on the way.
    ///
    /// The clock never moves backwards; an earlier `now_ms` only flushes work that is due now.
    pub fn advance_to(&self, now_ms: u64) {
        let target = now_ms.max(self.now_ms());

        loop {
            let due = self.inner.borrow_mut().pop_due(target);
            match due {
                None => break,
                Some(Due::Timer(task)) => task(),
                Some(Due::Animation(mut anim)) => {
                    (anim.step)(1.0);
                    if let Some(completion) = anim.completion.take() {
                        completion(true);
                    }
                }
            }
        }

        let mut running = {
            let mut inner = self.inner.borrow_mut();
            inner.now_ms = target;
            core::mem::take(&mut inner.animations)
        };
        for anim in running.iter_mut() {
            (anim.step)(anim.tween.progress(target));
        }

        // Steps may have started animations of their own; those win over what we took out.
        let mut replaced = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let started = core::mem::take(&mut inner.animations);
            for anim in running {
                if started.iter().any(|a| a.key == anim.key) {
                    replaced.push(anim);
                } else {
                    inner.animations.push(anim);
                }
            }
            inner.animations.extend(started);
        }
        for anim in replaced {
            self.interrupt(anim);
        }
    }

    pub fn advance_by(&self, delta_ms: u64) {
        self.advance_to(self.now_ms().saturating_add(delta_ms));
    }

    /// Jumps from deadline to deadline until nothing is pending.
    ///
    /// Returns `false` if work kept rescheduling itself past `max_turns`.
    pub fn run_until_idle(&self, max_turns: usize) -> bool {
        for _ in 0..max_turns {
            let Some(deadline) = self.next_deadline_ms() else {
                return true;
            };
            self.advance_to(deadline);
        }
        let idle = self.is_idle();
        if !idle {
            lcwarn!(
                pending = self.pending(),
                max_turns,
                "run loop did not settle"
            );
        }
        idle
    }

    fn interrupt(&self, mut anim: Animation) {
        if let Some(completion) = anim.completion.take() {
            self.immediately(move || completion(false));
        }
    }
}

impl fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RunLoop")
            .field("now_ms", &inner.now_ms)
            .field("timers", &inner.timers.len())
            .field("animations", &inner.animations.len())
            .finish()
    }
}
