//! Interrupt-owned state cells.
//!
//! The interrupt bridge and the transport's ISR half need `static` homes
//! because the vector table cannot capture closures.  [`IsrCell`] keeps
//! that state behind a critical section so the bridge and the foreground
//! never touch it at the same time.
//!
//! On ESP-IDF the bridge runs on the esp_timer task and its UART calls may
//! block, so the critical section is [`TaskCriticalSection`]: a task-level
//! lock that leaves interrupts enabled.  Host builds use the
//! `critical-section` std implementation.

use core::cell::RefCell;

use critical_section::Mutex;

/// A `static`-friendly slot installed once at init and borrowed from
/// interrupt context afterwards.
pub struct IsrCell<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> IsrCell<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Move the value in.  Must happen before the interrupt is armed.
    pub fn install(&self, value: T) {
        critical_section::with(|cs| {
            self.inner.borrow(cs).replace(Some(value));
        });
    }

    /// Run `f` on the value inside the critical section.  `None` if nothing
    /// has been installed yet (an interrupt that fires too early is ignored).
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }
}

impl<T> Default for IsrCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  ESP-IDF critical section
// ═══════════════════════════════════════════════════════════════

#[cfg(any(target_os = "espidf", test))]
mod task_lock {
    use core::cell::{Cell, RefCell};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use critical_section::RawRestoreState;

    pub(super) static TASK_LOCK: Mutex<()> = Mutex::new(());

    thread_local! {
        static DEPTH: Cell<u32> = const { Cell::new(0) };
        static HELD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
    }

    /// Process-wide lock taken once per task; nested sections on the same
    /// task only bump a depth counter.
    pub struct TaskCriticalSection;

    // SAFETY: the outermost acquire on a task takes `TASK_LOCK` and the
    // matching release drops it, so no two tasks are ever inside at once.
    unsafe impl critical_section::Impl for TaskCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            DEPTH.with(|depth| {
                if depth.get() == 0 {
                    // A panic inside a section poisons the lock; the cells
                    // stay consistent because `RefCell` borrows unwind.
                    let guard = TASK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
                    HELD.with(|held| *held.borrow_mut() = Some(guard));
                }
                depth.set(depth.get() + 1);
            });
            Default::default()
        }

        unsafe fn release(_restore: RawRestoreState) {
            DEPTH.with(|depth| match depth.get() {
                0 => {}
                1 => {
                    depth.set(0);
                    HELD.with(|held| drop(held.borrow_mut().take()));
                }
                n => depth.set(n - 1),
            });
        }
    }

    #[cfg(target_os = "espidf")]
    critical_section::set_impl!(TaskCriticalSection);
}
