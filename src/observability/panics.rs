//! Panic reports for the internal-error record.
//!
//! By the time a panic is caught the stack has unwound, so a backtrace taken
//! there only shows the catch site. A process-wide hook records the location
//! and backtrace at the panic itself into a thread-local slot; the catcher,
//! which runs on the same thread, takes it from there.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::sync::Once;

/// Where a panic happened, captured while the stack was still intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicReport {
    /// `file:line:column` of the panic.
    pub location: Option<String>,
    pub backtrace: String,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Install the recording hook. Idempotent.
///
/// The previously installed hook still runs afterwards, so the usual stderr
/// panic message is kept.
pub fn install_hook() {
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let report = PanicReport {
                location: info
                    .location()
                    .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column())),
                backtrace: Backtrace::force_capture().to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
            previous(info);
        }));
    });
}

/// Take the report of the most recent panic on this thread, if any.
pub fn take_report() -> Option<PanicReport> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}
