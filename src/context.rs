use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::fs::{Fs, OsFs};

/// Request-scoped values handed to installer predicates, constructors and
/// backends: the file store to operate on and a cancellation flag.
///
/// Cloning is cheap and clones share the same cancellation flag.
#[derive(Clone, Default)]
pub struct Context {
    fs: Option<Arc<dyn Fs>>,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context carrying `fs`.
    pub fn with_fs(&self, fs: Arc<dyn Fs>) -> Self {
        Self {
            fs: Some(fs),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// The carried file store, or the OS file system when none was set.
    pub fn fs(&self) -> Arc<dyn Fs> {
        self.fs.clone().unwrap_or_else(|| Arc::new(OsFs))
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_fs", &self.fs.is_some())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_os_fs() {
        let ctx = Context::new();
        assert!(ctx.fs().is_dir(&std::env::temp_dir()).unwrap());
    }

    #[test]
    fn with_fs_returns_carried_fs() {
        let fs: Arc<dyn Fs> = Arc::new(OsFs);
        let ctx = Context::new().with_fs(Arc::clone(&fs));

        assert!(Arc::ptr_eq(&ctx.fs(), &fs));
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let ctx = Context::new();
        let derived = ctx.with_fs(Arc::new(OsFs));

        assert!(!derived.is_cancelled());
        ctx.cancel();
        assert!(derived.is_cancelled());
    }
}
