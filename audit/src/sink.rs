use std::fmt;
use std::io;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::OnceCell;

use crate::config::LogConfig;
use crate::entry::CallSite;
use crate::entry::LogEntry;
use crate::identity::Identity;
use crate::level::Level;
use crate::repository::LogRepository;

/// Audit log sink.
///
/// Cheap to clone; all clones share the same level, console destination and
/// persistence queue. Every entry that passes the level filter is written to
/// the console synchronously and, once a repository has been installed,
/// queued for a background worker. The caller never waits on storage.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Inner>,
}

struct Inner {
    level: AtomicU8,
    init_table: bool,
    queue_capacity: usize,
    output: Mutex<Box<dyn Write + Send>>,
    persistence: OnceCell<Persistence>,
    dropped: AtomicU64,
}

struct Persistence {
    sender: mpsc::Sender<LogEntry>,
}

impl LogSink {
    /// Create a sink writing to standard output.
    pub fn new(config: &LogConfig) -> Self {
        Self::with_output(config, io::stdout())
    }

    /// Create a sink writing to the given console destination.
    pub fn with_output(config: &LogConfig, output: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                level: AtomicU8::new(Level::parse_or_default(&config.level) as u8),
                init_table: config.init_table,
                queue_capacity: config.queue_capacity.max(1),
                output: Mutex::new(Box::new(output)),
                persistence: OnceCell::new(),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Set the minimum level by name. Unknown names select INFO.
    pub fn set_level(&self, name: &str) {
        self.inner
            .level
            .store(Level::parse_or_default(name) as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.inner.level.load(Ordering::Relaxed))
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Replace the console destination.
    pub fn set_output(&self, output: impl Write + Send + 'static) {
        *self.output() = Box::new(output);
    }

    /// Install the persistence repository and start its worker.
    ///
    /// Only the first call has any effect, even when several callers race:
    /// exactly one of them runs the installation (including the optional
    /// schema preparation) and the others wait for it to finish.
    ///
    /// # Returns
    /// True if this call installed the repository
    pub async fn set_persistence<R: LogRepository>(&self, repository: Arc<R>) -> bool {
        let installed = AtomicBool::new(false);
        let installed_ref = &installed;
        let init_table = self.inner.init_table;
        let capacity = self.inner.queue_capacity;

        self.inner
            .persistence
            .get_or_init(move || async move {
                installed_ref.store(true, Ordering::SeqCst);

                if init_table {
                    match repository.prepare().await {
                        Ok(()) => tracing::info!("Logs table initialized successfully"),
                        Err(e) => tracing::warn!(error = %e, "Failed to initialize logs table"),
                    }
                }

                let (sender, receiver) = mpsc::channel(capacity);
                tokio::spawn(run_worker(repository, receiver));

                Persistence { sender }
            })
            .await;

        installed.load(Ordering::SeqCst)
    }

    pub fn has_persistence(&self) -> bool {
        self.inner.persistence.initialized()
    }

    /// Number of entries dropped because the persistence queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Log without identity attribution.
    pub fn log(&self, level: Level, site: CallSite, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.record(level, site, None, None, args);
    }

    /// Log attributed to the identity of the current request.
    pub fn log_ctx<I: Identity + ?Sized>(
        &self,
        ctx: &I,
        level: Level,
        site: CallSite,
        args: fmt::Arguments<'_>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let email = ctx
            .user_email()
            .filter(|email| !email.is_empty())
            .map(str::to_string);
        self.record(level, site, ctx.user_id(), email, args);
    }

    /// Log at FATAL and exit the process with status 1.
    ///
    /// The console line is flushed before exiting; a queued persistence write
    /// may be lost.
    pub fn fatal(&self, site: CallSite, args: fmt::Arguments<'_>) -> ! {
        self.record(Level::Fatal, site, None, None, args);
        self.terminate()
    }

    /// Attributed variant of [`LogSink::fatal`].
    pub fn fatal_ctx<I: Identity + ?Sized>(
        &self,
        ctx: &I,
        site: CallSite,
        args: fmt::Arguments<'_>,
    ) -> ! {
        self.log_ctx(ctx, Level::Fatal, site, args);
        self.terminate()
    }

    fn terminate(&self) -> ! {
        let _ = self.output().flush();
        std::process::exit(1)
    }

    fn record(
        &self,
        level: Level,
        site: CallSite,
        user_id: Option<i64>,
        user_email: Option<String>,
        args: fmt::Arguments<'_>,
    ) {
        let entry = LogEntry {
            level,
            message: args.to_string(),
            file: site.location(),
            function: site.function().to_string(),
            user_id,
            user_email,
            created_at: Utc::now(),
        };

        let _ = writeln!(self.output(), "{}", entry.console_line());

        self.dispatch(entry);
    }

    fn dispatch(&self, entry: LogEntry) {
        let Some(persistence) = self.inner.persistence.get() else {
            return;
        };

        match persistence.sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let dropped = self.inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    tracing::warn!(dropped, "Log persistence queue full, dropping entries");
                }
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Log persistence worker stopped, entry dropped");
            }
        }
    }

    fn output(&self) -> std::sync::MutexGuard<'_, Box<dyn Write + Send>> {
        self.inner
            .output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("level", &self.level())
            .field("persistence", &self.has_persistence())
            .field("dropped", &self.dropped_count())
            .finish()
    }
}

async fn run_worker<R: LogRepository>(repository: Arc<R>, mut receiver: mpsc::Receiver<LogEntry>) {
    while let Some(entry) = receiver.recv().await {
        if let Err(e) = repository.append(&entry).await {
            tracing::warn!(
                error = %e,
                level = %entry.level,
                file = %entry.file,
                "Failed to save log to database"
            );
        }
    }
    tracing::debug!("Log persistence worker stopped");
}
