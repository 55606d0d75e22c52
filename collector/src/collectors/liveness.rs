//! # Liveness Probe
//!
//! Decides whether the process behind an instance is alive. The PID an
//! instance writes into `fuzzer_stats` is only a claim: the process may have
//! died without the file changing, or it may not have written its first stats
//! yet. Nothing is carried over between cycles, every verdict is fresh.
//!
//! - PID `<= 0`: [`InstanceStatus::Unknown`]
//! - process exists: [`InstanceStatus::Alive`], with CPU and memory sampled
//! - process exists but may not be signalled: alive, usage reported as inaccessible
//! - process gone: [`InstanceStatus::Starting`] if the [`StartupCheck`] says so, else [`InstanceStatus::Dead`]
//!
//! The OS-backed [`OsProbe`] is the default. [`StaticProbe`] and
//! [`FixedStartup`] answer from fixed tables so tests do not depend on live
//! processes.
//!
//! The PID is trusted as is. A PID recycled by the OS for an unrelated
//! process reports the instance as alive.

use super::stats_parser::STATS_FILE;
use crate::{
    config::ProbeSettings,
    metrics::{
        InstanceStatus,
        USAGE_INACCESSIBLE,
    },
};
use std::{
    collections::HashMap,
    future::Future,
    path::{
        Path,
        PathBuf,
    },
    pin::Pin,
    process::Stdio,
    sync::Arc,
    time::Duration,
};

/// Written by afl-fuzz at startup, before the first `fuzzer_stats`.
pub const SETUP_FILE: &str = "fuzzer_setup";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeVerdict {
    pub status: InstanceStatus,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

impl ProbeVerdict {
    pub fn alive(cpu_usage: f64, memory_usage: f64) -> Self {
        Self {
            status: InstanceStatus::Alive,
            cpu_usage,
            memory_usage,
        }
    }

    pub fn inaccessible() -> Self {
        Self::alive(USAGE_INACCESSIBLE, USAGE_INACCESSIBLE)
    }

    pub fn dead() -> Self {
        Self::idle(InstanceStatus::Dead)
    }

    pub fn starting() -> Self {
        Self::idle(InstanceStatus::Starting)
    }

    pub fn unknown() -> Self {
        Self::idle(InstanceStatus::Unknown)
    }

    fn idle(status: InstanceStatus) -> Self {
        Self {
            status,
            cpu_usage: 0.0,
            memory_usage: 0.0,
        }
    }
}

/// Determines the liveness of one instance. Implementations must not fail:
/// every error resolves to a verdict.
pub trait LivenessProbe: Send + Sync {
    fn probe<'a>(&'a self, pid: i64, dir: &'a Path) -> BoxFuture<'a, ProbeVerdict>;

    fn name(&self) -> &'static str;
}

/// Secondary check for instances whose process is gone: is it still starting up?
pub trait StartupCheck: Send + Sync {
    fn is_starting<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, bool>;
}

/// Probes real processes through `kill(pid, 0)` and samples usage with `sysinfo`.
pub struct OsProbe {
    settings: ProbeSettings,
    startup: Arc<dyn StartupCheck>,
}

impl OsProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        let startup = Arc::new(MarkerStartupCheck::new(&settings));
        Self { settings, startup }
    }

    pub fn with_startup_check(mut self, startup: Arc<dyn StartupCheck>) -> Self {
        self.startup = startup;
        self
    }

    /// Verdict for a process that cannot be sampled.
    async fn idle_verdict(&self, state: ProcessState, dir: &Path) -> ProbeVerdict {
        match state {
            ProcessState::Running | ProcessState::AccessDenied => ProbeVerdict::inaccessible(),
            ProcessState::Gone => {
                if self.startup.is_starting(dir).await {
                    ProbeVerdict::starting()
                } else {
                    ProbeVerdict::dead()
                }
            }
        }
    }
}

impl LivenessProbe for OsProbe {
    fn probe<'a>(&'a self, pid: i64, dir: &'a Path) -> BoxFuture<'a, ProbeVerdict> {
        Box::pin(async move {
            if pid <= 0 {
                return ProbeVerdict::unknown();
            }

            match process_state(pid) {
                ProcessState::Running => {
                    let interval = self.settings.cpu_sample_interval;
                    match tokio::task::spawn_blocking(move || sample_usage(pid, interval)).await {
                        Ok(Some((cpu, mem))) => ProbeVerdict::alive(cpu, mem),
                        Ok(None) => match process_state(pid) {
                            ProcessState::Gone => ProbeVerdict::alive(0.0, 0.0),
                            _ => ProbeVerdict::inaccessible(),
                        },
                        Err(e) => {
                            debug!(pid, error = %e, "Resource sampling task failed");
                            ProbeVerdict::inaccessible()
                        }
                    }
                }
                state => self.idle_verdict(state, dir).await,
            }
        })
    }

    fn name(&self) -> &'static str {
        "os"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessState {
    Running,
    AccessDenied,
    Gone,
}

#[cfg(unix)]
fn process_state(pid: i64) -> ProcessState {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return ProcessState::Gone;
    };
    // SAFETY: signal 0 performs the existence and permission checks only.
    if unsafe { libc::kill(raw, 0) } == 0 {
        return ProcessState::Running;
    }
    let errno = std::io::Error::last_os_error().raw_os_error();
    if !matches!(errno, Some(libc::EPERM | libc::ESRCH)) {
        debug!(pid, errno = ?errno, "Unexpected error while probing process");
    }
    state_from_errno(errno)
}

/// Maps the errno of a failed `kill(pid, 0)`. Only EPERM proves the process exists.
#[cfg(unix)]
fn state_from_errno(errno: Option<i32>) -> ProcessState {
    match errno {
        Some(libc::EPERM) => ProcessState::AccessDenied,
        _ => ProcessState::Gone,
    }
}

#[cfg(not(unix))]
fn process_state(pid: i64) -> ProcessState {
    let Ok(raw) = u32::try_from(pid) else {
        return ProcessState::Gone;
    };
    let mut system = sysinfo::System::new();
    if system.refresh_process(sysinfo::Pid::from_u32(raw)) {
        ProcessState::Running
    } else {
        ProcessState::Gone
    }
}

/// CPU percent over `interval` and resident memory as percent of total RAM.
fn sample_usage(pid: i64, interval: Duration) -> Option<(f64, f64)> {
    let pid = sysinfo::Pid::from_u32(u32::try_from(pid).ok()?);
    let mut system = sysinfo::System::new();
    system.refresh_memory();
    if !system.refresh_process(pid) {
        return None;
    }
    std::thread::sleep(interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
    if !system.refresh_process(pid) {
        return None;
    }

    let process = system.process(pid)?;
    let total = system.total_memory();
    let memory = if total > 0 {
        process.memory() as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    Some((process.cpu_usage() as f64, memory))
}

/// The afl-whatsup heuristic: the setup marker is newer than the stats file
/// and either an `afl-fuzz` process holds the directory open or the marker
/// was touched within the grace window.
pub struct MarkerStartupCheck {
    grace: Duration,
    lookup_timeout: Duration,
    fuser: Option<PathBuf>,
}

impl MarkerStartupCheck {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            grace: settings.startup_grace,
            lookup_timeout: settings.dir_lookup_timeout,
            fuser: which::which("fuser").ok(),
        }
    }

    /// Overrides the external lookup tool. `None` disables the lookup.
    pub fn with_lookup(mut self, fuser: Option<PathBuf>) -> Self {
        self.fuser = fuser;
        self
    }

    async fn directory_in_use(&self, dir: &Path) -> bool {
        let Some(fuser) = &self.fuser else {
            return false;
        };

        let mut command = tokio::process::Command::new(fuser);
        command
            .arg("-v")
            .arg(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.lookup_timeout, command.output()).await {
            Ok(Ok(output)) => {
                // fuser prints the verbose table on stderr
                String::from_utf8_lossy(&output.stderr).contains("afl-fuzz")
                    || String::from_utf8_lossy(&output.stdout).contains("afl-fuzz")
            }
            Ok(Err(e)) => {
                debug!(dir = %dir.display(), error = %e, "Directory lookup failed");
                false
            }
            Err(_) => {
                debug!(dir = %dir.display(), timeout = ?self.lookup_timeout, "Directory lookup timed out");
                false
            }
        }
    }
}

impl StartupCheck for MarkerStartupCheck {
    fn is_starting<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let (Some(stats_mtime), Some(setup_mtime)) = (
                modified(&dir.join(STATS_FILE)).await,
                modified(&dir.join(SETUP_FILE)).await,
            ) else {
                return false;
            };

            if setup_mtime <= stats_mtime {
                return false;
            }
            if self.directory_in_use(dir).await {
                return true;
            }
            // A marker from the future counts as fresh.
            setup_mtime.elapsed().map(|age| age < self.grace).unwrap_or(true)
        })
    }
}

async fn modified(path: &Path) -> Option<std::time::SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// Answers from a fixed PID table. Unlisted PIDs are dead.
#[derive(Debug, Default, Clone)]
pub struct StaticProbe {
    verdicts: HashMap<i64, ProbeVerdict>,
    delay: Option<Duration>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(mut self, pid: i64, verdict: ProbeVerdict) -> Self {
        self.verdicts.insert(pid, verdict);
        self
    }

    /// Delays every answer, e.g. to exercise probe timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl LivenessProbe for StaticProbe {
    fn probe<'a>(&'a self, pid: i64, _dir: &'a Path) -> BoxFuture<'a, ProbeVerdict> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if pid <= 0 {
                return ProbeVerdict::unknown();
            }
            self.verdicts.get(&pid).copied().unwrap_or_else(ProbeVerdict::dead)
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Startup check with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedStartup(pub bool);

impl StartupCheck for FixedStartup {
    fn is_starting<'a>(&'a self, _dir: &'a Path) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.0 })
    }
}
