//! Autosave scheduling contracts and the session-owned autosave process.

use std::{
    cell::{Cell, RefCell},
    fmt,
    future::Future,
    pin::Pin,
    rc::{Rc, Weak},
    time::Duration,
};

use crate::session::{FileSession, SessionInner};

/// Interval the autosave process uses when none is configured explicitly.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Fire-and-forget local task consumed by [`TaskSpawner`].
pub type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Host timer service scheduling a repeating callback at a fixed interval.
pub trait IntervalScheduler {
    /// Schedules `tick` to run every `interval` until the handle cancels it.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot schedule repeating timers.
    fn schedule(
        &self,
        interval: Duration,
        tick: Box<dyn FnMut()>,
    ) -> Result<Box<dyn IntervalHandle>, String>;
}

/// Cancellation handle for a scheduled repeating callback.
pub trait IntervalHandle {
    /// Stops the repeating callback; later calls are no-ops.
    fn cancel(&mut self);
}

/// Host executor for fire-and-forget local async tasks.
pub trait TaskSpawner {
    /// Spawns `task` on the host's single-threaded executor.
    fn spawn(&self, task: LocalTask);
}

#[derive(Debug, Clone, Copy, Default)]
/// Scheduler for unsupported targets; every schedule attempt fails.
pub struct NoopIntervalScheduler;

impl IntervalScheduler for NoopIntervalScheduler {
    fn schedule(
        &self,
        _interval: Duration,
        _tick: Box<dyn FnMut()>,
    ) -> Result<Box<dyn IntervalHandle>, String> {
        Err("interval scheduling unavailable".to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Spawner that drops every task, for unsupported targets.
pub struct NoopTaskSpawner;

impl TaskSpawner for NoopTaskSpawner {
    fn spawn(&self, _task: LocalTask) {}
}

#[derive(Debug, Clone, Copy, Default)]
/// Spawner that runs every task to completion inline.
///
/// Only suitable for tests and hosts whose futures never suspend on real
/// I/O, such as the in-memory doubles.
pub struct BlockingTaskSpawner;

impl TaskSpawner for BlockingTaskSpawner {
    fn spawn(&self, task: LocalTask) {
        futures::executor::block_on(task);
    }
}

struct ManualSlot {
    interval: Duration,
    tick: Rc<RefCell<Box<dyn FnMut()>>>,
    cancelled: Rc<Cell<bool>>,
}

#[derive(Clone, Default)]
/// Test scheduler whose ticks are fired manually.
pub struct ManualIntervalScheduler {
    inner: Rc<RefCell<Vec<ManualSlot>>>,
}

impl ManualIntervalScheduler {
    /// Number of scheduled intervals that have not been cancelled.
    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .iter()
            .filter(|slot| !slot.cancelled.get())
            .count()
    }

    /// Interval of the most recently scheduled active entry.
    pub fn last_interval(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .iter()
            .rev()
            .find(|slot| !slot.cancelled.get())
            .map(|slot| slot.interval)
    }

    /// Runs one tick of every active schedule.
    pub fn fire(&self) {
        let ticks: Vec<_> = self
            .inner
            .borrow()
            .iter()
            .filter(|slot| !slot.cancelled.get())
            .map(|slot| Rc::clone(&slot.tick))
            .collect();
        for tick in ticks {
            (&mut *tick.borrow_mut())();
        }
    }
}

impl IntervalScheduler for ManualIntervalScheduler {
    fn schedule(
        &self,
        interval: Duration,
        tick: Box<dyn FnMut()>,
    ) -> Result<Box<dyn IntervalHandle>, String> {
        let cancelled = Rc::new(Cell::new(false));
        self.inner.borrow_mut().push(ManualSlot {
            interval,
            tick: Rc::new(RefCell::new(tick)),
            cancelled: Rc::clone(&cancelled),
        });
        Ok(Box::new(ManualIntervalHandle { cancelled }))
    }
}

/// Cancellation handle for [`ManualIntervalScheduler`] entries.
pub struct ManualIntervalHandle {
    cancelled: Rc<Cell<bool>>,
}

impl IntervalHandle for ManualIntervalHandle {
    fn cancel(&mut self) {
        self.cancelled.set(true);
    }
}

#[derive(Clone)]
/// Configuration for the autosave process.
pub struct AutosaveSetup {
    interval: Duration,
    content_source: Rc<dyn Fn() -> String>,
}

impl AutosaveSetup {
    /// Starts building a setup with the default interval.
    pub fn builder() -> AutosaveSetupBuilder {
        AutosaveSetupBuilder {
            interval: DEFAULT_AUTOSAVE_INTERVAL,
            content_source: None,
        }
    }

    /// How often the process saves.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub(crate) fn read_content(&self) -> String {
        (self.content_source)()
    }
}

impl fmt::Debug for AutosaveSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutosaveSetup")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AutosaveSetup`].
pub struct AutosaveSetupBuilder {
    interval: Duration,
    content_source: Option<Rc<dyn Fn() -> String>>,
}

impl AutosaveSetupBuilder {
    /// Sets how often the process saves.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the closure read at each tick for the content to save.
    ///
    /// The source is read at tick time, not captured when autosave starts,
    /// so edits between ticks are always picked up.
    pub fn content_source(mut self, source: impl Fn() -> String + 'static) -> Self {
        self.content_source = Some(Rc::new(source));
        self
    }

    /// Builds the setup.
    ///
    /// # Errors
    ///
    /// Returns an error when the interval is zero or no content source was
    /// provided.
    pub fn build(self) -> Result<AutosaveSetup, String> {
        if self.interval.is_zero() {
            return Err("autosave interval must be positive".to_string());
        }
        let Some(content_source) = self.content_source else {
            return Err("autosave requires a content source".to_string());
        };
        Ok(AutosaveSetup {
            interval: self.interval,
            content_source,
        })
    }
}

struct AutosaveInner {
    session: Weak<SessionInner>,
    enabled: bool,
    setup: Option<AutosaveSetup>,
    active: Option<Box<dyn IntervalHandle>>,
    last_autosaved: Option<String>,
}

#[derive(Clone)]
/// Session-owned component managing the periodic autosave process.
///
/// Autosave must be enabled and configured before [`Autosave::start`] has an
/// effect. Successful open/create operations start it automatically when
/// enabled; close stops it.
pub struct Autosave {
    inner: Rc<RefCell<AutosaveInner>>,
}

impl Autosave {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(AutosaveInner {
                session: Weak::new(),
                enabled: false,
                setup: None,
                active: None,
                last_autosaved: None,
            })),
        }
    }

    pub(crate) fn bind(&self, session: Weak<SessionInner>) {
        self.inner.borrow_mut().session = session;
    }

    /// Enables or disables the autosave process.
    ///
    /// Disabling does not stop a process that is already running.
    pub fn set_enabled(&self, enable: bool) {
        self.inner.borrow_mut().enabled = enable;
    }

    /// Returns true when autosave is enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.borrow().enabled
    }

    /// Returns true when the autosave process is running.
    pub fn is_running(&self) -> bool {
        self.inner.borrow().active.is_some()
    }

    /// Replaces the autosave configuration.
    pub fn set_setup(&self, setup: AutosaveSetup) {
        self.inner.borrow_mut().setup = Some(setup);
    }

    pub(crate) fn current_setup(&self) -> Option<AutosaveSetup> {
        self.inner.borrow().setup.clone()
    }

    pub(crate) fn matches_last_autosaved(&self, content: &str) -> bool {
        self.inner.borrow().last_autosaved.as_deref() == Some(content)
    }

    pub(crate) fn record_autosaved(&self, content: String) {
        self.inner.borrow_mut().last_autosaved = Some(content);
    }

    /// Starts the autosave process.
    ///
    /// Silently does nothing when autosave is disabled. When the process is
    /// already running it is stopped first, so at most one timer is ever
    /// active. Each tick reads the configured content source and skips the
    /// save when the content has not changed since the last successful
    /// autosave; tick outcomes are delivered through the session observer's
    /// autosave listeners and never stop the timer.
    ///
    /// # Errors
    ///
    /// Returns an error when no setup has been configured, when the owning
    /// session is gone, or when the host scheduler rejects the interval.
    pub fn start(&self) -> Result<(), String> {
        if !self.is_enabled() {
            return Ok(());
        }
        let (setup, session) = {
            let inner = self.inner.borrow();
            let setup = inner
                .setup
                .clone()
                .ok_or_else(|| "autosave must be configured before it is started".to_string())?;
            let session = inner
                .session
                .upgrade()
                .ok_or_else(|| "autosave is not attached to a session".to_string())?;
            (setup, session)
        };
        if self.is_running() {
            self.stop();
        }

        let weak = Rc::downgrade(&session);
        let tick: Box<dyn FnMut()> = Box::new(move || {
            let Some(session) = weak.upgrade() else {
                return;
            };
            let tick_session = FileSession::from_inner(Rc::clone(&session));
            session
                .services
                .spawner
                .spawn(Box::pin(async move { tick_session.run_autosave_tick().await }));
        });
        let handle = session.services.scheduler.schedule(setup.interval(), tick)?;
        self.inner.borrow_mut().active = Some(handle);
        FileSession::from_inner(session).set_autosave_running(true);
        Ok(())
    }

    /// Stops the autosave process; does nothing when it is not running.
    pub fn stop(&self) {
        let handle = {
            let mut inner = self.inner.borrow_mut();
            inner.last_autosaved = None;
            inner.active.take()
        };
        let Some(mut handle) = handle else {
            return;
        };
        handle.cancel();
        let session = self.inner.borrow().session.upgrade();
        if let Some(session) = session {
            FileSession::from_inner(session).set_autosave_running(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;

    use crate::error::SessionErrorKind;
    use crate::host::{HostFailure, MemoryFile, MemoryFilePicker};
    use crate::observer::SaveFileEvent;
    use crate::session::{FileSession, SessionServices};

    use super::*;

    fn session_with(
        picker: &MemoryFilePicker,
        scheduler: &ManualIntervalScheduler,
    ) -> FileSession {
        FileSession::new(SessionServices {
            picker: Rc::new(picker.clone()),
            scheduler: Rc::new(scheduler.clone()),
            spawner: Rc::new(BlockingTaskSpawner),
        })
    }

    fn configured_session(
        file: &MemoryFile,
        scheduler: &ManualIntervalScheduler,
        source: &Rc<RefCell<String>>,
    ) -> FileSession {
        let picker = MemoryFilePicker::returning(vec![file.clone()]);
        let session = session_with(&picker, scheduler);
        let source = Rc::clone(source);
        session.autosave().set_setup(
            AutosaveSetup::builder()
                .interval(Duration::from_secs(1))
                .content_source(move || source.borrow().clone())
                .build()
                .expect("setup"),
        );
        session.autosave().set_enabled(true);
        session
    }

    #[test]
    fn builder_validates_interval_and_source() {
        let err = AutosaveSetup::builder()
            .interval(Duration::ZERO)
            .content_source(String::new)
            .build()
            .expect_err("zero interval");
        assert!(err.contains("positive"));

        let err = AutosaveSetup::builder().build().expect_err("no source");
        assert!(err.contains("content source"));

        let setup = AutosaveSetup::builder()
            .content_source(|| "x".to_string())
            .build()
            .expect("setup");
        assert_eq!(setup.interval(), DEFAULT_AUTOSAVE_INTERVAL);
    }

    #[test]
    fn manual_scheduler_fires_and_cancels() {
        let scheduler = ManualIntervalScheduler::default();
        let count = Rc::new(Cell::new(0u32));
        let count_tick = Rc::clone(&count);
        let mut handle = scheduler
            .schedule(
                Duration::from_secs(1),
                Box::new(move || count_tick.set(count_tick.get() + 1)),
            )
            .expect("schedule");

        scheduler.fire();
        scheduler.fire();
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.last_interval(), Some(Duration::from_secs(1)));

        handle.cancel();
        scheduler.fire();
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn ticks_persist_the_live_content() {
        let file = MemoryFile::new("notes.txt", "text/plain", "hello");
        let scheduler = ManualIntervalScheduler::default();
        let source = Rc::new(RefCell::new("hello".to_string()));
        let session = configured_session(&file, &scheduler, &source);

        block_on(session.open_file()).expect("open");
        assert!(session.autosave().is_running());
        assert_eq!(scheduler.active_count(), 1);

        *source.borrow_mut() = "second".to_string();
        scheduler.fire();
        assert_eq!(file.content(), "second");
    }

    #[test]
    fn restart_leaves_exactly_one_active_timer() {
        let file = MemoryFile::new("notes.txt", "text/plain", "hello");
        let scheduler = ManualIntervalScheduler::default();
        let source = Rc::new(RefCell::new("hello".to_string()));
        let session = configured_session(&file, &scheduler, &source);

        block_on(session.open_file()).expect("open");
        session.autosave().start().expect("restart");
        assert_eq!(scheduler.active_count(), 1);

        *source.borrow_mut() = "tick".to_string();
        scheduler.fire();
        assert_eq!(file.write_commits(), 1);
    }

    #[test]
    fn unchanged_content_skips_the_save() {
        let file = MemoryFile::new("notes.txt", "text/plain", "hello");
        let scheduler = ManualIntervalScheduler::default();
        let source = Rc::new(RefCell::new("draft".to_string()));
        let session = configured_session(&file, &scheduler, &source);

        block_on(session.open_file()).expect("open");
        scheduler.fire();
        scheduler.fire();
        assert_eq!(file.content(), "draft");
        assert_eq!(file.write_commits(), 1);

        *source.borrow_mut() = "draft 2".to_string();
        scheduler.fire();
        assert_eq!(file.write_commits(), 2);
    }

    #[test]
    fn tick_failures_are_surfaced_and_keep_the_timer() {
        let file = MemoryFile::new("notes.txt", "text/plain", "hello");
        let scheduler = ManualIntervalScheduler::default();
        let source = Rc::new(RefCell::new("draft".to_string()));
        let session = configured_session(&file, &scheduler, &source);

        block_on(session.open_file()).expect("open");
        file.fail_writes_with(HostFailure::new("NoModificationAllowedError", "locked"));

        let events: Rc<RefCell<Vec<SaveFileEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let _sub = session
            .observer()
            .add_autosave_file_listener(move |event| sink.borrow_mut().push(event.clone()));

        scheduler.fire();
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert!(events[0].failed());
        assert_eq!(
            events[0].error.as_ref().map(|e| e.kind),
            Some(SessionErrorKind::NoModificationAllowed)
        );
        assert!(session.autosave().is_running());
    }

    #[test]
    fn start_requires_setup_and_respects_enabled() {
        let picker = MemoryFilePicker::returning(vec![]);
        let scheduler = ManualIntervalScheduler::default();
        let session = session_with(&picker, &scheduler);

        session.autosave().start().expect("disabled start is a no-op");
        assert!(!session.autosave().is_running());

        session.autosave().set_enabled(true);
        let err = session.autosave().start().expect_err("missing setup");
        assert!(err.contains("configured"));
    }

    #[test]
    fn close_stops_the_running_process() {
        let file = MemoryFile::new("notes.txt", "text/plain", "hello");
        let scheduler = ManualIntervalScheduler::default();
        let source = Rc::new(RefCell::new("hello".to_string()));
        let session = configured_session(&file, &scheduler, &source);

        let running_changes: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&running_changes);
        let _sub = session
            .observer()
            .add_autosave_running_listener(move |event| sink.borrow_mut().push(event.running));

        block_on(session.open_file()).expect("open");
        assert!(session.state().autosave_running);

        block_on(session.close_file()).expect("close");
        assert!(!session.autosave().is_running());
        assert!(!session.state().autosave_running);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(*running_changes.borrow(), vec![true, false]);
    }
}
