//! Installer backends and the table that picks one for a plugin source.

pub mod local;

use parking_lot::Mutex;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::fs::Fs;
use crate::plugin::Plugin;

pub use local::LocalInstaller;

/// Installs a plugin from `src` into the registry directory `dest`.
///
/// Backends should check [`Context::is_cancelled`] during long transfers.
pub trait Installer: Send + Sync {
    fn install(&self, ctx: &Context, dest: &Path, src: &str) -> Result<Plugin>;
}

/// Decides whether an installer can handle a source.
pub type Validity = Arc<dyn Fn(&Context, &str) -> bool + Send + Sync>;

/// Builds an installer operating on the given file store.
pub type Constructor = Arc<dyn Fn(Arc<dyn Fs>) -> Box<dyn Installer> + Send + Sync>;

/// Closure adapter for [`Installer`].
pub struct CallbackInstaller<F>(pub F);

impl<F> Installer for CallbackInstaller<F>
where
    F: Fn(&Context, &Path, &str) -> Result<Plugin> + Send + Sync,
{
    fn install(&self, ctx: &Context, dest: &Path, src: &str) -> Result<Plugin> {
        (self.0)(ctx, dest, src)
    }
}

impl Installer for Box<dyn Installer> {
    fn install(&self, ctx: &Context, dest: &Path, src: &str) -> Result<Plugin> {
        (**self).install(ctx, dest, src)
    }
}

struct Entry {
    name: String,
    validate: Validity,
    construct: Constructor,
}

/// Registered installers, in registration order.
///
/// [`find`](Self::find) returns the first installer whose predicate accepts
/// the source, so when several predicates match, the earliest registration
/// wins. Re-registering a name replaces the entry in place.
///
/// Predicates and constructors run while the table lock is held and must not
/// call back into the same registry.
#[derive(Default)]
pub struct InstallerRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl InstallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `local` installer.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        LocalInstaller::register(&registry);
        registry
    }

    pub fn register<V, C, I>(&self, name: impl Into<String>, validity: V, constructor: C)
    where
        V: Fn(&Context, &str) -> bool + Send + Sync + 'static,
        C: Fn(Arc<dyn Fs>) -> I + Send + Sync + 'static,
        I: Installer + 'static,
    {
        let name = name.into();
        let entry = Entry {
            name: name.clone(),
            validate: Arc::new(validity),
            construct: Arc::new(move |fs: Arc<dyn Fs>| {
                Box::new(constructor(fs)) as Box<dyn Installer>
            }),
        };

        let mut entries = self.entries.lock();
        match entries.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => {
                debug!(installer = %name, "installer replaced");
                *existing = entry;
            }
            None => {
                debug!(installer = %name, "installer registered");
                entries.push(entry);
            }
        }
    }

    /// Constructs the installer registered as `name`.
    pub fn create(&self, ctx: &Context, name: &str) -> Result<Box<dyn Installer>> {
        let entries = self.entries.lock();

        let Some(entry) = entries.iter().find(|entry| entry.name == name) else {
            warn!(installer = name, "unknown installer");
            return Err(Error::UnknownInstaller);
        };

        Ok((entry.construct)(ctx.fs()))
    }

    /// Constructs the first installer whose predicate accepts `src`.
    pub fn find(&self, ctx: &Context, src: &str) -> Result<Box<dyn Installer>> {
        let entries = self.entries.lock();

        let Some(entry) = entries.iter().find(|entry| (entry.validate)(ctx, src)) else {
            warn!(source = src, "no supported installer");
            return Err(Error::NoInstaller);
        };

        debug!(installer = %entry.name, source = src, "installer selected");
        Ok((entry.construct)(ctx.fs()))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }
}

impl fmt::Debug for InstallerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerRegistry")
            .field("installers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFs;
    use std::thread;

    struct Named(&'static str);

    impl Installer for Named {
        fn install(&self, _: &Context, _: &Path, _: &str) -> Result<Plugin> {
            Ok(Plugin::new(self.0))
        }
    }

    fn named(name: &'static str) -> impl Fn(Arc<dyn Fs>) -> Named + Send + Sync + 'static {
        move |_| Named(name)
    }

    fn installed_by(installer: &dyn Installer) -> String {
        installer
            .install(&Context::new(), Path::new("/tmp"), "src")
            .unwrap()
            .name
    }

    #[test]
    fn create_unknown_installer() {
        let registry = InstallerRegistry::new();

        let err = registry.create(&Context::new(), "missing").err().unwrap();
        assert!(matches!(err, Error::UnknownInstaller));
    }

    #[test]
    fn create_by_name() {
        let registry = InstallerRegistry::new();
        registry.register("a", |_: &Context, _: &str| false, named("a"));
        registry.register("b", |_: &Context, _: &str| false, named("b"));

        let installer = registry.create(&Context::new(), "b").unwrap();
        assert_eq!(installed_by(&*installer), "b");
    }

    #[test]
    fn find_without_match() {
        let registry = InstallerRegistry::new();
        registry.register("a", |_: &Context, src: &str| src == "a", named("a"));

        let err = registry.find(&Context::new(), "src").err().unwrap();
        assert!(matches!(err, Error::NoInstaller));
        assert_eq!(err.to_string(), "no supported installer");
    }

    #[test]
    fn find_matching_predicate() {
        let registry = InstallerRegistry::new();
        registry.register(
            "http",
            |_: &Context, src: &str| src.starts_with("https://"),
            named("http"),
        );
        registry.register(
            "local",
            |_: &Context, src: &str| src.starts_with('/'),
            named("local"),
        );

        let installer = registry.find(&Context::new(), "/opt/plugin").unwrap();
        assert_eq!(installed_by(&*installer), "local");

        let installer = registry.find(&Context::new(), "https://example.org").unwrap();
        assert_eq!(installed_by(&*installer), "http");
    }

    #[test]
    fn find_prefers_earliest_registration() {
        let registry = InstallerRegistry::new();
        registry.register("first", |_: &Context, _: &str| true, named("first"));
        registry.register("second", |_: &Context, _: &str| true, named("second"));

        let installer = registry.find(&Context::new(), "anything").unwrap();
        assert_eq!(installed_by(&*installer), "first");
    }

    #[test]
    fn register_replaces_in_place() {
        let registry = InstallerRegistry::new();
        registry.register("a", |_: &Context, _: &str| true, named("old"));
        registry.register("b", |_: &Context, _: &str| true, named("b"));
        registry.register("a", |_: &Context, _: &str| true, named("new"));

        assert_eq!(registry.names(), vec!["a", "b"]);
        let installer = registry.find(&Context::new(), "anything").unwrap();
        assert_eq!(installed_by(&*installer), "new");
    }

    #[test]
    fn constructor_receives_context_fs() {
        let registry = InstallerRegistry::new();
        let fs: Arc<dyn Fs> = Arc::new(OsFs);
        let expected = Arc::clone(&fs);

        registry.register(
            "check",
            |_: &Context, _: &str| true,
            move |got: Arc<dyn Fs>| {
                assert!(Arc::ptr_eq(&got, &expected));
                CallbackInstaller(|_: &Context, _: &Path, _: &str| -> Result<Plugin> {
                    Ok(Plugin::new("ok"))
                })
            },
        );

        let ctx = Context::new().with_fs(fs);
        assert!(registry.find(&ctx, "src").is_ok());
        assert!(registry.create(&ctx, "check").is_ok());
    }

    #[test]
    fn concurrent_registration_and_lookup() {
        let registry = Arc::new(InstallerRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let name = format!("installer-{i}");
                    let source = name.clone();
                    registry.register(
                        name.clone(),
                        move |_: &Context, src: &str| src == source,
                        named("x"),
                    );
                    registry.find(&Context::new(), &name).is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(registry.names().len(), 8);
    }

    #[test]
    fn callback_errors_pass_through() {
        let installer = CallbackInstaller(|_: &Context, _: &Path, _: &str| -> Result<Plugin> {
            Err(anyhow::anyhow!("install error").into())
        });

        let err = installer
            .install(&Context::new(), Path::new("/tmp"), "src")
            .unwrap_err();
        assert_eq!(err.to_string(), "install error");
    }
}
