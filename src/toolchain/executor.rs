//! Streaming executor for `xcodebuild` test commands.
//!
//! The executor echoes the command's output as it arrives and decides the outcome from textual markers rather than
//! the exit status: `xcodebuild` exits non-zero both when tests fail and when they never started, and callers need
//! to tell those apart. Stdout and stderr are scanned as one stream; `xcodebuild` prints simulator errors on either.
//!
//! The run is attempted once and blocks until the child closes both streams. There is no watchdog; a caller that
//! needs a deadline must kill the child from outside.
//!
//! On `iphoneos`, `xcodebuild` leaves a copy of each installed app under Xcode's `EmbeddedAppDeltas` cache. The
//! directories named in the output are deleted after the run.

use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{info, warn};
use xctestrun_core::{RunnerExitCode, Sdk, TestType, signals};

use crate::errors::{Result, XctestrunError};

/// Runs one `xcodebuild` test command and maps its output to a [`RunnerExitCode`].
#[derive(Debug)]
pub struct XcodebuildTestExecutor {
    command: Command,
    sdk: Sdk,
    test_type: TestType,
    succeeded_signal: Option<&'static str>,
    failed_signal: Option<&'static str>,
    echo: bool,
    test_cache_root: Option<PathBuf>,
}

/// Markers observed while streaming output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputScan {
    pub test_started: bool,
    pub test_succeeded: bool,
    pub test_failed: bool,
    /// Output printed before the first test suite started.
    pub pre_start_output: String,
    /// Per-run cache directories named in the output, in order of appearance.
    pub cache_dirs: Vec<PathBuf>,
}

impl XcodebuildTestExecutor {
    pub fn new(command: Command, sdk: Sdk, test_type: TestType) -> Self {
        Self {
            command,
            sdk,
            test_type,
            succeeded_signal: None,
            failed_signal: None,
            echo: true,
            test_cache_root: None,
        }
    }

    /// Set the markers that decide success and failure once tests have started.
    pub fn with_signals(mut self, succeeded: &'static str, failed: &'static str) -> Self {
        self.succeeded_signal = Some(succeeded);
        self.failed_signal = Some(failed);
        self
    }

    /// Whether to copy the child's output to our stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Xcode's `EmbeddedAppDeltas` directory. Only used on `iphoneos`.
    pub fn with_test_cache_root(mut self, root: Option<PathBuf>) -> Self {
        self.test_cache_root = root;
        self
    }

    /// Spawn the command, stream its output, and classify the result.
    #[tracing::instrument(skip_all, fields(sdk = %self.sdk, test_type = %self.test_type))]
    pub fn execute(mut self) -> Result<RunnerExitCode> {
        let program = self.command.get_program().to_owned();
        let mut child = self
            .command
            .env("NSUnbufferedIO", "YES")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| XctestrunError::io(Path::new(&program), e))?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, tx.clone()));
        }
        drop(tx);

        let mut scan = OutputScan::default();
        let mut out = io::stdout();
        for line in rx {
            let buf = line.map_err(|e| XctestrunError::io(Path::new(&program), e))?;
            self.observe(&mut scan, &String::from_utf8_lossy(&buf));
            if self.echo {
                // A closed stdout must not abort the run.
                let _ = out.write_all(&buf).and_then(|()| out.flush());
            }
        }
        for reader in readers {
            if reader.join().is_err() {
                warn!("An output reader thread panicked");
            }
        }

        let status = child.wait().map_err(|e| XctestrunError::io(Path::new(&program), e))?;
        delete_cache_dirs(&scan.cache_dirs);
        let exit_code = self.classify(&scan);
        info!("xcodebuild exited with {status}; test result {exit_code}");
        Ok(exit_code)
    }

    /// Update `scan` with one line of output.
    pub fn observe(&self, scan: &mut OutputScan, line: &str) {
        if let Some(root) = self.cache_root_for_run() {
            collect_cache_dirs(line, root, self.max_cache_dirs(), &mut scan.cache_dirs);
        }
        if !scan.test_started {
            if line.contains(signals::TEST_STARTED) {
                scan.test_started = true;
            }
            scan.pre_start_output.push_str(line);
            return;
        }
        if self.succeeded_signal.is_some_and(|s| line.contains(s)) {
            scan.test_succeeded = true;
        }
        if self.failed_signal.is_some_and(|s| line.contains(s)) {
            scan.test_failed = true;
        }
    }

    /// Map the observed markers to an exit code.
    pub fn classify(&self, scan: &OutputScan) -> RunnerExitCode {
        if scan.test_started {
            return if scan.test_succeeded {
                RunnerExitCode::Succeeded
            } else if scan.test_failed {
                RunnerExitCode::Failed
            } else {
                RunnerExitCode::Error
            };
        }
        if self.sdk == Sdk::IphoneSimulator
            && signals::needs_recreate_simulator(&scan.pre_start_output, self.test_type == TestType::XcUiTest)
        {
            warn!("The simulator must be recreated before tests can start");
            return RunnerExitCode::NeedRecreateSim;
        }
        RunnerExitCode::TestNotStart
    }

    fn cache_root_for_run(&self) -> Option<&Path> {
        match self.sdk {
            Sdk::IphoneOs => self.test_cache_root.as_deref(),
            Sdk::IphoneSimulator => None,
        }
    }

    /// UI tests install the runner app next to the app under test.
    fn max_cache_dirs(&self) -> usize {
        if self.test_type == TestType::XcUiTest { 2 } else { 1 }
    }
}

/// Forward each line of `stream` to `tx` until EOF or a read error.
fn spawn_line_reader<R: Read + Send + 'static>(stream: R, tx: Sender<io::Result<Vec<u8>>>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        loop {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(Ok(buf)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    break;
                }
            }
        }
    })
}

/// Append every `<root>/<name>/` in `line` whose `name` is lowercase alphanumeric, up to `max` distinct entries.
fn collect_cache_dirs(line: &str, root: &Path, max: usize, found: &mut Vec<PathBuf>) {
    let root = root.to_string_lossy();
    let prefix = format!("{}/", root.trim_end_matches('/'));
    for (start, _) in line.match_indices(&prefix) {
        if found.len() >= max {
            return;
        }
        let rest = &line[start + prefix.len()..];
        let name_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            .count();
        if name_len == 0 || rest.as_bytes().get(name_len) != Some(&b'/') {
            continue;
        }
        let dir = PathBuf::from(&line[start..start + prefix.len() + name_len]);
        if !found.contains(&dir) {
            found.push(dir);
        }
    }
}

fn delete_cache_dirs(dirs: &[PathBuf]) {
    for dir in dirs.iter().filter(|dir| dir.exists()) {
        info!("Removing cache files directory: {}", dir.display());
        if let Err(e) = fs::remove_dir_all(dir) {
            warn!("Failed to remove {}: {e}", dir.display());
        }
    }
}
