use paths::PathContext;
use std::marker::PhantomData;
#[cfg(debug_assertions)]
use std::path::PathBuf;
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
///
/// Contains path management, version info, and logging infrastructure.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    /// The log guard must be kept alive for the duration of the application
    /// to ensure log messages are properly flushed.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
/// This is a pure marker trait - no logic, just constants.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "profile-builder";
    const PROJECT_ID: &'static str = "profile_builder";
    /// Whether log records are mirrored to stderr. Full-screen terminal
    /// applications must keep this off.
    const CONSOLE_LOG: bool = true;
}

/// Builder performing the common initialization for every binary.
pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Create a new application builder.
    ///
    /// This performs all the common initialization:
    /// - Sets up path context (platform-specific directories)
    /// - Initializes logging (file, plus console when `A::CONSOLE_LOG`)
    /// - Ensures all directories exist
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        let app_id = A::APP_ID;
        let studio = A::STUDIO;
        let project_id = A::PROJECT_ID;

        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            studio,
            project_id,
            app_id,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(studio, project_id, app_id);

        path_context.ensure_directories()?;

        let log_file_path = path_context.log_file_now();
        let log_dir = log_file_path
            .parent()
            .ok_or("log file path has no parent directory")?;
        let log_filename = log_file_path
            .file_name()
            .ok_or("log file path has no file name")?;

        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        #[cfg(debug_assertions)]
        let level = LevelFilter::DEBUG;

        #[cfg(not(debug_assertions))]
        let level = LevelFilter::WARN;

        let file_layer = fmt::Layer::default()
            .with_target(true)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

        let console_layer = A::CONSOLE_LOG.then(|| {
            fmt::Layer::default()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter_fn(move |metadata| metadata.level() <= &level))
        });

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .try_init()?;

        Ok(Self {
            context: AppContext {
                path_context,
                version,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    /// Finish initialization and hand out the context.
    pub fn build(self) -> AppContext {
        self.context
    }
}

/// Shorthand for `AppBuilder::<A>::new(version)?.build()`.
pub fn init<A: Application>(version: &'static str) -> Result<AppContext, BoxError> {
    AppBuilder::<A>::new(version).map(AppBuilder::build)
}
