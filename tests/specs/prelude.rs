//! Shared helpers for the behavioral specs

#![allow(dead_code)]

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Path to a workspace binary built by `cargo build --workspace`
pub fn binary(name: &str) -> PathBuf {
    let target = std::env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target"));
    target.join("debug").join(name)
}

/// An isolated pair environment: its own semaphore namespace and log dir
pub struct Pair {
    pub namespace: String,
    pub logs: TempDir,
}

impl Pair {
    pub fn new(label: &str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = uuid::Uuid::new_v4().simple().to_string();
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self {
            namespace: format!("vigil-spec-{}-{}-{}", label, &id[..8], n),
            logs: TempDir::new().unwrap(),
        }
    }

    fn command(&self, name: &str) -> Command {
        let mut cmd = Command::new(binary(name));
        cmd.env("VIGIL_NAMESPACE", &self.namespace)
            .env("VIGIL_LOG_DIR", self.logs.path())
            .env("VIGIL_WATCHDOG_BINARY", binary("vigild"))
            .env_remove("VIGIL_PEER_PID")
            .env_remove("VIGIL_CONFIG");
        cmd
    }

    pub fn vigil(&self) -> CliBuilder {
        CliBuilder(self.command("vigil"))
    }

    pub fn vigild(&self) -> CliBuilder {
        CliBuilder(self.command("vigild"))
    }

    /// Start `vigil demo` in the background with stdout streamed line by line
    pub fn demo(&self, seconds: u64) -> Demo {
        let mut child = self
            .command("vigil")
            .args(["demo", "--seconds", &seconds.to_string()])
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .unwrap();
        let stdout = child.stdout.take().unwrap();
        let (tx, lines) = mpsc::channel();
        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Demo {
            child,
            lines,
            seen: Vec::new(),
        }
    }

    /// Whether either of the pair's semaphores exists
    pub fn semaphores_present(&self) -> bool {
        let output = self.vigil().args(&["inspect"]).passes();
        output.stdout().contains("present")
    }

    pub fn watchdog_log(&self) -> String {
        let path = self
            .logs
            .path()
            .join(format!("{}.watchdog.log", self.namespace));
        std::fs::read_to_string(path).unwrap_or_default()
    }
}

impl Drop for Pair {
    fn drop(&mut self) {
        let _ = self.command("vigil").arg("cleanup").output();
    }
}

pub struct CliBuilder(Command);

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.0.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.0.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.0.output().unwrap();
        let run = RunAssert(output);
        assert!(run.0.status.success(), "expected success\n{}", run.describe());
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.0.output().unwrap();
        let run = RunAssert(output);
        assert!(!run.0.status.success(), "expected failure\n{}", run.describe());
        run
    }
}

pub struct RunAssert(Output);

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.0.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.0.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.0.status.code()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(
            self.stdout().contains(expected),
            "stdout missing {:?}\n{}",
            expected,
            self.describe()
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(
            self.stderr().contains(expected),
            "stderr missing {:?}\n{}",
            expected,
            self.describe()
        );
        self
    }

    fn describe(&self) -> String {
        format!(
            "status: {:?}\nstdout:\n{}\nstderr:\n{}",
            self.0.status,
            self.stdout(),
            self.stderr()
        )
    }
}

/// A running `vigil demo`
pub struct Demo {
    child: Child,
    lines: Receiver<String>,
    seen: Vec<String>,
}

impl Demo {
    /// Wait for a line starting with `prefix` and return the rest of it
    pub fn expect_line(&mut self, prefix: &str, timeout: Duration) -> String {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    self.seen.push(line.clone());
                    if let Some(rest) = line.strip_prefix(prefix) {
                        return rest.trim().to_string();
                    }
                }
                Err(_) => panic!("no line starting with {:?}; saw {:?}", prefix, self.seen),
            }
        }
    }

    pub fn pid(&self) -> i32 {
        self.child.id() as i32
    }

    /// Wait for the process to exit and return whether it succeeded
    pub fn wait(mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait().unwrap() {
                return status.success();
            }
            if Instant::now() > deadline {
                let _ = self.child.kill();
                panic!("demo did not exit within {:?}; saw {:?}", timeout, self.seen);
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Demo {
    /// SIGKILL the demo and reap it
    pub fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for Demo {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Send a signal to a process, ignoring processes that are already gone
pub fn signal(pid: i32, sig: nix::sys::signal::Signal) {
    let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), sig);
}

/// Whether a process exists (zombies included)
pub fn alive(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}

/// Poll until `pid` is gone; false if it is still around at the deadline
pub fn wait_for_exit(pid: i32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while alive(pid) {
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    true
}

/// Pids whose parent is `parent`, read from /proc
pub fn children_of(parent: i32) -> Vec<i32> {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().to_str()?.parse::<i32>().ok())
        .filter(|pid| {
            let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).unwrap_or_default();
            // Fields after the parenthesised command: state, ppid, ...
            stat.rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().nth(1)?.parse::<i32>().ok())
                == Some(parent)
        })
        .collect()
}
