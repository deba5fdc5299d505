use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use camino::Utf8PathBuf;

use eupnea_builder::config::{BuildConfig, DesktopEnvironment, Distro, TargetDevice};
use eupnea_builder::executor::{CommandExecutor, CommandSpec, ExecutionResult};

/// Test helper to create a BuildConfig with the given distro/desktop and
/// default values for everything else.
#[allow(dead_code)]
pub fn make_config(distro: Distro, desktop: DesktopEnvironment) -> BuildConfig {
    BuildConfig {
        distro,
        distro_version: String::new(),
        distro_link: None,
        desktop,
        username: "localuser".to_string(),
        password: "secret".to_string(),
        hostname: "eupnea-chromebook".to_string(),
        device: TargetDevice::Image,
        rebind_search: false,
    }
}

pub type CommandCalls = Arc<Mutex<Vec<CommandSpec>>>;

/// Executor that records every spec and reports success.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: CommandCalls,
    /// Canned stdout returned from every call.
    pub stdout: String,
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, spec: &CommandSpec) -> anyhow::Result<ExecutionResult> {
        self.calls.lock().unwrap().push(spec.clone());
        Ok(ExecutionResult {
            status: None,
            stdout: self.stdout.clone(),
        })
    }
}

/// An executor that fails on the Nth call (1-indexed).
/// Used to simulate failures at specific points in the provisioning flow.
#[allow(dead_code)]
pub struct FailingExecutor {
    fail_on_call: usize,
    call_count: AtomicUsize,
    pub calls: CommandCalls,
}

impl FailingExecutor {
    #[allow(dead_code)]
    pub fn new(fail_on_call: usize) -> Self {
        Self {
            fail_on_call,
            call_count: AtomicUsize::new(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl CommandExecutor for FailingExecutor {
    fn execute(&self, spec: &CommandSpec) -> anyhow::Result<ExecutionResult> {
        let current = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(spec.clone());

        if current >= self.fail_on_call {
            anyhow::bail!("simulated failure on call {}", current)
        }
        Ok(ExecutionResult {
            status: None,
            stdout: String::new(),
        })
    }
}

/// Creates a temp rootfs with the config files the Arch provisioner
/// patches. Returns the tempdir guard and the rootfs path.
#[allow(dead_code)]
pub fn arch_rootfs_fixture() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("path should be valid UTF-8");

    fs::create_dir_all(root.join("etc/pacman.d")).unwrap();
    fs::write(
        root.join("etc/pacman.d/mirrorlist"),
        "## Worldwide\n\
         #Server = https://geo.mirror.pkgbuild.com/$repo/os/$arch\n\
         #Server = http://geo.mirror.pkgbuild.com/$repo/os/$arch\n",
    )
    .unwrap();
    fs::write(
        root.join("etc/pacman.conf"),
        "[options]\nHoldPkg = pacman glibc\nCheckSpace\n",
    )
    .unwrap();
    fs::write(
        root.join("etc/sudoers"),
        "## sudoers\n\
         # %wheel ALL=(ALL:ALL) ALL\n\
         # %wheel ALL=(ALL:ALL) NOPASSWD: ALL\n",
    )
    .unwrap();
    fs::write(
        root.join("etc/os-release"),
        "NAME=\"Arch Linux\"\nPRETTY_NAME=\"Arch Linux\"\nID=arch\n",
    )
    .unwrap();

    (dir, root)
}

/// Creates a temp rootfs with the files the apt provisioners touch.
#[allow(dead_code)]
pub fn apt_rootfs_fixture(os_release: &str) -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("path should be valid UTF-8");
    fs::create_dir_all(root.join("etc")).unwrap();
    fs::write(root.join("etc/os-release"), os_release).unwrap();
    (dir, root)
}
