//! Cooperative cancellation and progress reporting.
//!
//! Long-running operations receive a [`Context`]. They poll
//! [`Context::is_cancellation_requested`] once per unit of work (one
//! destination row for resizing) and report progress in stages:
//!
//! ```text
//! new_stage(InitializingQuantizer, 1) .. complete()
//! new_stage(InitializingDitherer, 1)  .. complete()
//! new_stage(ProcessingPixels, rows)   increment() x rows .. complete()
//! ```
//!
//! A cancelled operation returns early with `Ok(false)`; whatever it has
//! already written stays written.
//!
//! # Example
//!
//! ```rust
//! use raster_ops::context::{CancellationToken, Context};
//!
//! let token = CancellationToken::new();
//! let ctx = Context::new().with_cancellation(token.clone());
//! assert!(!ctx.is_cancellation_requested());
//!
//! token.cancel();
//! assert!(ctx.is_cancellation_requested());
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shareable cancellation flag.
///
/// Clones observe the same flag, so one clone can be handed to the
/// operation while another cancels it from a different thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Phase of an operation, reported to [`ProgressReporter::new_stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStage {
    /// A quantizing session is being created.
    InitializingQuantizer,
    /// A dithering session is being created.
    InitializingDitherer,
    /// Destination pixels are being produced.
    ProcessingPixels,
}

/// Receiver of progress updates.
///
/// Called from worker threads when rows are processed in parallel.
pub trait ProgressReporter: Send + Sync {
    /// A new stage starts with `total` expected increments.
    fn new_stage(&self, stage: OperationStage, total: usize);

    /// One unit of the current stage is done.
    fn increment(&self);

    /// The current stage is finished.
    fn complete(&self);
}

/// Cooperative context of one operation.
#[derive(Clone, Default)]
pub struct Context {
    cancellation: Option<CancellationToken>,
    progress: Option<Arc<dyn ProgressReporter>>,
    max_parallelism: usize,
}

impl Context {
    /// Creates a context that never cancels and reports nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Attaches a progress reporter.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Limits parallel processing; `1` forces sequential processing, `0`
    /// (the default) lets the operation decide.
    pub fn with_max_parallelism(mut self, max: usize) -> Self {
        self.max_parallelism = max;
        self
    }

    /// Returns the parallelism limit (`0` means automatic).
    #[inline]
    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Returns `true` if the attached token was cancelled.
    #[inline]
    pub fn is_cancellation_requested(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Reports the start of a stage.
    pub fn new_stage(&self, stage: OperationStage, total: usize) {
        if let Some(progress) = &self.progress {
            progress.new_stage(stage, total);
        }
    }

    /// Reports one finished unit of work.
    #[inline]
    pub fn increment(&self) {
        if let Some(progress) = &self.progress {
            progress.increment();
        }
    }

    /// Reports the end of the current stage.
    pub fn complete(&self) {
        if let Some(progress) = &self.progress {
            progress.complete();
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancellation", &self.cancellation)
            .field("progress", &self.progress.is_some())
            .field("max_parallelism", &self.max_parallelism)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for Recorder {
        fn new_stage(&self, stage: OperationStage, total: usize) {
            self.events.lock().unwrap().push(format!("{stage:?}/{total}"));
        }

        fn increment(&self) {
            self.events.lock().unwrap().push("+".into());
        }

        fn complete(&self) {
            self.events.lock().unwrap().push("done".into());
        }
    }

    #[test]
    fn test_default_context_is_silent() {
        let ctx = Context::new();
        assert!(!ctx.is_cancellation_requested());
        ctx.new_stage(OperationStage::ProcessingPixels, 3);
        ctx.increment();
        ctx.complete();
        assert_eq!(ctx.max_parallelism(), 0);
    }

    #[test]
    fn test_progress_forwarded() {
        let recorder = Arc::new(Recorder::default());
        let ctx = Context::new().with_progress(recorder.clone());
        ctx.new_stage(OperationStage::ProcessingPixels, 2);
        ctx.increment();
        ctx.increment();
        ctx.complete();
        let events = recorder.events.lock().unwrap();
        assert_eq!(*events, ["ProcessingPixels/2", "+", "+", "done"]);
    }

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let ctx = Context::new().with_cancellation(token.clone());
        let copy = ctx.clone();
        token.cancel();
        assert!(copy.is_cancellation_requested());
    }
}
