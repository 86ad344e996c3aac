//! Job queue and flush scheduling
//!
//! Scheduled effects and component updates do not re-run inside the write
//! that triggered them. They enqueue a [`Job`]; the first enqueue after a
//! flush asks the host for one deferred task that later calls
//! [`flush_jobs`]. Every job queued in between runs once, in first-enqueue
//! order.
//!
//! ## Host integration
//!
//! ```ignore
//! // In WASM environment
//! reinhardt_reactive::scheduler::set_scheduler(|task| {
//!     wasm_bindgen_futures::spawn_local(async move { task() });
//! });
//! ```
//!
//! Without a host scheduler, requested flushes wait on the runtime's own
//! deferred queue until the host calls [`tick`].

use core::cell::{Cell, RefCell};
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::task::{Context, Poll, Waker};
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use super::diagnostics::{Severity, panic_message, report};
use super::error::ReactiveError;
use super::runtime::{Runtime, with_runtime};

/// A deferred unit of work handed to the host
pub type Task = Box<dyn FnOnce()>;

/// Type for the host's deferred-task primitive
type HostScheduler = Rc<dyn Fn(Task)>;

/// Unique identifier for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(usize);

impl JobId {
	fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

struct JobInner {
	id: JobId,
	label: Rc<str>,
	callback: RefCell<Box<dyn FnMut()>>,
	queued: Cell<bool>,
	disposed: Cell<bool>,
}

/// A unit of deferred work, deduplicated by identity
///
/// Clones share identity: queueing any clone of a job that is already
/// pending does nothing.
#[derive(Clone)]
pub struct Job(Rc<JobInner>);

impl Job {
	/// Create a job; `label` appears in diagnostics
	pub fn new<F>(label: &str, callback: F) -> Self
	where
		F: FnMut() + 'static,
	{
		Self(Rc::new(JobInner {
			id: JobId::new(),
			label: Rc::from(label),
			callback: RefCell::new(Box::new(callback)),
			queued: Cell::new(false),
			disposed: Cell::new(false),
		}))
	}

	/// Get the job's ID
	pub fn id(&self) -> JobId {
		self.0.id
	}

	/// Get the job's label
	pub fn label(&self) -> &str {
		&self.0.label
	}

	/// Whether the job waits in the queue
	pub fn is_queued(&self) -> bool {
		self.0.queued.get()
	}

	/// Whether the job was disposed
	pub fn is_disposed(&self) -> bool {
		self.0.disposed.get()
	}

	/// Permanently disable the job and drop it from the queue
	pub fn dispose(&self) {
		self.0.disposed.set(true);
		invalidate_job(self);
	}

	fn call(&self) {
		match self.0.callback.try_borrow_mut() {
			Ok(mut callback) => (*callback)(),
			Err(_) => tracing::trace!(job = %self.label(), "job already running, skipped"),
		}
	}
}

impl fmt::Debug for Job {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Job")
			.field("id", &self.0.id)
			.field("label", &self.0.label)
			.field("queued", &self.0.queued.get())
			.field("disposed", &self.0.disposed.get())
			.finish()
	}
}

/// One flush boundary that [`next_tick`] futures and [`on_next_flush`]
/// callbacks wait for.
#[derive(Default)]
struct Tick {
	done: Cell<bool>,
	wakers: RefCell<Vec<Waker>>,
	callbacks: RefCell<Vec<Task>>,
}

impl Tick {
	fn complete(&self) {
		self.done.set(true);
		let wakers = self.wakers.take();
		for waker in wakers {
			waker.wake();
		}
		let callbacks = self.callbacks.take();
		for callback in callbacks {
			callback();
		}
	}
}

/// Pending jobs and flush bookkeeping, owned by the [`Runtime`]
#[derive(Default)]
pub(crate) struct JobQueue {
	queue: RefCell<VecDeque<Job>>,
	flush_requested: Cell<bool>,
	flushing: Cell<bool>,
	/// Boundaries resolved at the end of the next flush
	pending_ticks: RefCell<Vec<Rc<Tick>>>,
	/// Boundaries resolved at the end of the running flush
	active_ticks: RefCell<Vec<Rc<Tick>>>,
	/// Runs per job since the queue was last idle
	run_counts: RefCell<HashMap<JobId, u32>>,
	host: RefCell<Option<HostScheduler>>,
	deferred: RefCell<VecDeque<Task>>,
}

impl JobQueue {
	fn request_flush(&self) {
		if self.flush_requested.replace(true) {
			return;
		}
		let task: Task = Box::new(flush_jobs);
		let host = self.host.borrow().clone();
		match host {
			Some(host) => host(task),
			None => self.deferred.borrow_mut().push_back(task),
		}
	}

	fn upcoming_tick(&self) -> Rc<Tick> {
		if self.flushing.get() && !self.flush_requested.get() {
			let mut active = self.active_ticks.borrow_mut();
			if let Some(tick) = active.last() {
				return Rc::clone(tick);
			}
			let tick = Rc::new(Tick::default());
			active.push(Rc::clone(&tick));
			return tick;
		}

		self.request_flush();
		let mut pending = self.pending_ticks.borrow_mut();
		if let Some(tick) = pending.last() {
			return Rc::clone(tick);
		}
		let tick = Rc::new(Tick::default());
		pending.push(Rc::clone(&tick));
		tick
	}
}

/// Restores the queue when a flush ends, including by unwinding.
struct Flush<'rt> {
	jobs: &'rt JobQueue,
	batch: VecDeque<Job>,
}

impl Drop for Flush<'_> {
	fn drop(&mut self) {
		let jobs = self.jobs;
		jobs.flushing.set(false);

		let leftovers: Vec<Job> = self.batch.drain(..).filter(Job::is_queued).collect();
		let ticks = jobs.active_ticks.take();
		let completed = if leftovers.is_empty() {
			ticks
		} else {
			tracing::debug!(jobs = leftovers.len(), "flush interrupted, re-queueing remainder");
			let mut queue = jobs.queue.borrow_mut();
			for job in leftovers.into_iter().rev() {
				queue.push_front(job);
			}
			let mut pending = jobs.pending_ticks.borrow_mut();
			let mut carried = ticks;
			carried.append(&mut pending);
			*pending = carried;
			Vec::new()
		};

		if jobs.queue.borrow().is_empty() {
			jobs.run_counts.borrow_mut().clear();
		}
		if !jobs.queue.borrow().is_empty() || !jobs.pending_ticks.borrow().is_empty() {
			jobs.request_flush();
		}

		for tick in completed {
			tick.complete();
		}
	}
}

impl Runtime {
	fn flush(&self) {
		let jobs = &self.jobs;
		if jobs.flushing.get() {
			return;
		}
		jobs.flush_requested.set(false);

		let batch = jobs.queue.take();
		let ticks = jobs.pending_ticks.take();
		if batch.is_empty() && ticks.is_empty() {
			jobs.run_counts.borrow_mut().clear();
			return;
		}

		let config = self.config.borrow().clone();
		tracing::debug!(jobs = batch.len(), "flushing job queue");
		*jobs.active_ticks.borrow_mut() = ticks;
		jobs.flushing.set(true);
		let mut flush = Flush { jobs, batch };

		while let Some(job) = flush.batch.pop_front() {
			if !job.0.queued.replace(false) || job.is_disposed() {
				continue;
			}

			let runs = {
				let mut counts = jobs.run_counts.borrow_mut();
				let count = counts.entry(job.id()).or_insert(0);
				*count += 1;
				*count
			};
			if runs > config.recursion_limit {
				report(
					Severity::Error,
					ReactiveError::RecursionLimitExceeded {
						label: job.label().to_owned(),
						limit: config.recursion_limit,
					},
				);
				continue;
			}

			if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.call())) {
				report(
					Severity::Error,
					ReactiveError::JobPanicked {
						label: job.label().to_owned(),
						message: panic_message(&*payload),
					},
				);
				if !config.catch_panics {
					panic::resume_unwind(payload);
				}
			}
		}
	}
}

/// Enqueue `job` for the next flush
///
/// Idempotent while the job is pending. A job enqueued while the queue is
/// flushing (including by itself) runs in the following flush.
pub fn queue_job(job: &Job) {
	if job.is_disposed() || job.0.queued.replace(true) {
		return;
	}
	tracing::trace!(job = %job.label(), "job queued");
	with_runtime(|rt| {
		rt.jobs.queue.borrow_mut().push_back(job.clone());
		rt.jobs.request_flush();
	});
}

/// Remove `job` from the queue if it is pending
pub fn invalidate_job(job: &Job) {
	if !job.0.queued.replace(false) {
		return;
	}
	with_runtime(|rt| {
		rt.jobs
			.queue
			.borrow_mut()
			.retain(|queued| queued.id() != job.id());
	});
}

/// Run every pending job once, in first-enqueue order
///
/// A panicking job is reported through the diagnostic channel and the
/// remaining jobs still run. Calling this from inside a flush does nothing.
pub fn flush_jobs() {
	with_runtime(Runtime::flush);
}

/// Whether a flush has been requested and not yet run
pub fn is_flush_pending() -> bool {
	with_runtime(|rt| rt.jobs.flush_requested.get())
}

/// Whether a flush is running
pub fn is_flushing() -> bool {
	with_runtime(|rt| rt.jobs.flushing.get())
}

/// Install the host's deferred-task primitive for the current thread
///
/// Flushes requested before the call are handed over immediately.
///
/// # Example
///
/// ```ignore
/// let local = tokio::task::LocalSet::new();
/// set_scheduler(|task| {
///     tokio::task::spawn_local(async move { task() });
/// });
/// ```
pub fn set_scheduler<F>(scheduler: F)
where
	F: Fn(Task) + 'static,
{
	let host: HostScheduler = Rc::new(scheduler);
	let waiting = with_runtime(|rt| {
		*rt.jobs.host.borrow_mut() = Some(Rc::clone(&host));
		rt.jobs.deferred.take()
	});
	for task in waiting {
		host(task);
	}
}

/// Remove the host scheduler; later flushes wait for [`tick`]
pub fn clear_scheduler() {
	with_runtime(|rt| rt.jobs.host.take());
}

/// Drain the runtime's own deferred queue until it is empty
///
/// The explicit flush trigger for hosts without a native scheduler. Returns
/// the number of deferred tasks that ran.
pub fn tick() -> usize {
	let mut ran = 0;
	while let Some(task) = with_runtime(|rt| rt.jobs.deferred.borrow_mut().pop_front()) {
		task();
		ran += 1;
	}
	ran
}

/// A future resolving once the next flush boundary has passed
///
/// Created by [`next_tick`].
#[must_use = "futures do nothing unless polled"]
pub struct NextTick {
	tick: Rc<Tick>,
}

impl NextTick {
	/// Whether the boundary has already passed
	pub fn is_ready(&self) -> bool {
		self.tick.done.get()
	}
}

impl Future for NextTick {
	type Output = ();

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.tick.done.get() {
			return Poll::Ready(());
		}
		let mut wakers = self.tick.wakers.borrow_mut();
		if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
			wakers.push(cx.waker().clone());
		}
		Poll::Pending
	}
}

impl fmt::Debug for NextTick {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NextTick")
			.field("ready", &self.is_ready())
			.finish()
	}
}

/// Wait until every job queued so far has run
///
/// Inside a flush with nothing queued after it, resolves when that flush
/// ends; otherwise after the next flush, requesting one if needed.
pub fn next_tick() -> NextTick {
	NextTick {
		tick: with_runtime(|rt| rt.jobs.upcoming_tick()),
	}
}

/// Callback form of [`next_tick`]
pub fn on_next_flush<F>(callback: F)
where
	F: FnOnce() + 'static,
{
	let tick = with_runtime(|rt| rt.jobs.upcoming_tick());
	tick.callbacks.borrow_mut().push(Box::new(callback));
}
