use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hl_core::{Error, Result};

use crate::dispatch::Dispatcher;
use crate::document::DocumentStore;
use crate::inspect::ToolRegistry;
use crate::plugin::PluginDescriptor;
use crate::project::Project;
use crate::syspath::{BuildInfo, SystemLock};

/// Everything needed to boot the headless application.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub version: String,
    pub home_dir: PathBuf,
    pub system_dir: PathBuf,
    pub plugin_dirs: Vec<PathBuf>,
    /// In test mode teardown only closes projects, so one process can run
    /// many analysis rounds against the same application.
    pub test_mode: bool,
}

/// The process-wide headless application: tool registry, document store, and
/// the single-writer/multi-reader action model.
pub struct HeadlessApplication {
    home_dir: PathBuf,
    build: BuildInfo,
    registry: ToolRegistry,
    documents: DocumentStore,
    actions: RwLock<()>,
    dispatcher: Dispatcher,
    system_lock: Mutex<Option<SystemLock>>,
    projects: Mutex<Vec<Project>>,
}

static CURRENT: Mutex<Option<Arc<HeadlessApplication>>> = Mutex::new(None);

impl HeadlessApplication {
    pub fn build(&self) -> &BuildInfo {
        &self.build
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    fn exit(self: &Arc<Self>) {
        tracing::info!("headless application shutting down");
        CURRENT.lock().take();
        self.projects.lock().clear();
        self.documents.clear();
        self.dispatcher.stop();
        self.system_lock.lock().take();
        tracing::info!("system lock freed");
    }
}

/// Owner handle for one boot of the application. Shutdown responsibility is
/// explicit: only the handle that created the application may exit it.
pub struct HostHandle {
    app: Arc<HeadlessApplication>,
    created_here: bool,
    test_mode: bool,
    /// Descriptors of the plugins verified at boot.
    pub plugins: Vec<PluginDescriptor>,
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("created_here", &self.created_here)
            .field("test_mode", &self.test_mode)
            .field("plugins", &self.plugins)
            .finish_non_exhaustive()
    }
}

/// Boot the headless application, or reuse the one this process already
/// started. A second boot from a different home directory is fatal.
pub fn boot(config: &HostConfig) -> Result<HostHandle> {
    let build = BuildInfo::from_home(&config.home_dir);
    if build.ultimate {
        return Err(Error::UltimateUnsupported);
    }

    let mut current = CURRENT.lock();
    if let Some(app) = current.as_ref() {
        let existing = canonical(&app.home_dir);
        let requested = canonical(&config.home_dir);
        if existing != requested {
            return Err(Error::ApplicationMismatch(existing, requested));
        }
        tracing::info!("headless application already exists, reusing it");
        let plugins = verify_plugins(&config.plugin_dirs, app.build())?;
        return Ok(HostHandle {
            app: app.clone(),
            created_here: false,
            test_mode: config.test_mode,
            plugins,
        });
    }

    tracing::info!(
        version = %config.version,
        home = %config.home_dir.display(),
        build = %build.number,
        "starting headless application"
    );
    let system_lock = SystemLock::allocate(&config.system_dir, &build)?;
    tracing::info!(system = %system_lock.system_path.display(), "system path allocated");

    let plugins = verify_plugins(&config.plugin_dirs, &build)?;

    let app = Arc::new(HeadlessApplication {
        home_dir: config.home_dir.clone(),
        build,
        registry: ToolRegistry::create_tools(),
        documents: DocumentStore::new(),
        actions: RwLock::new(()),
        dispatcher: Dispatcher::start(),
        system_lock: Mutex::new(Some(system_lock)),
        projects: Mutex::new(Vec::new()),
    });
    *current = Some(app.clone());

    Ok(HostHandle {
        app,
        created_here: true,
        test_mode: config.test_mode,
        plugins,
    })
}

fn canonical(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Load each requested plugin directory's descriptor. Plugins outside the
/// platform allow-list are disabled; incompatible platform plugins are fatal.
fn verify_plugins(plugin_dirs: &[PathBuf], build: &BuildInfo) -> Result<Vec<PluginDescriptor>> {
    let mut enabled = Vec::new();
    for dir in plugin_dirs {
        let descriptor = PluginDescriptor::load(dir)?;
        if !descriptor.is_platform_plugin() {
            tracing::info!(plugin = %descriptor.name, "plugin disabled (not in platform set)");
            continue;
        }
        descriptor.check_compatibility(build)?;
        tracing::info!(plugin = %descriptor.name, version = %descriptor.version, "plugin enabled");
        enabled.push(descriptor);
    }
    Ok(enabled)
}

impl HostHandle {
    pub fn app(&self) -> &Arc<HeadlessApplication> {
        &self.app
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.app.registry()
    }

    pub fn documents(&self) -> &DocumentStore {
        self.app.documents()
    }

    pub fn build(&self) -> &BuildInfo {
        self.app.build()
    }

    /// Run `f` with shared read access. Readers run concurrently with each
    /// other and are excluded from write actions.
    pub fn read_action<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.app.actions.read();
        f()
    }

    /// Run `f` as the exclusive writer, on the dispatch thread.
    pub fn write_action<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let app = self.app.clone();
        self.app.dispatcher.invoke_and_wait(move || {
            let _guard = app.actions.write();
            f()
        })
    }

    /// Run `f` on the dispatch thread without taking the write lock.
    pub fn invoke_and_wait<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.app.dispatcher.invoke_and_wait(f)
    }

    pub fn open_project(&self, project_dir: &Path, name: &str) -> Result<Project> {
        let project = Project::open(project_dir, name)?;
        self.app.projects.lock().push(project.clone());
        Ok(project)
    }

    /// Tear down this handle's claim on the application. Exits the
    /// application only if this handle booted it; in test mode only projects
    /// are closed so the process can run another round.
    pub fn shutdown(self) {
        if self.test_mode {
            tracing::info!("test mode: closing projects only");
            self.app.projects.lock().clear();
            self.app.documents.clear();
            return;
        }
        if self.created_here {
            self.app.exit();
        } else {
            tracing::info!("application was started elsewhere, no shutdown needed");
        }
    }
}
