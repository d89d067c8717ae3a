//! External toolchain invocation
//!
//! Serializes a resolved configuration into configure/build command lines and
//! runs them through a [`CommandRunner`]. Commands run one at a time and are
//! waited on; their output is inherited by this process.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use fw_options::Resolution;

use crate::config::BuildSettings;

/// A single external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    /// Shell-like rendering for logs
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external commands and reports their exit status
pub trait CommandRunner {
    /// Run to completion. `Ok(None)` means the process was killed by a signal.
    fn run(&mut self, command: &CommandSpec) -> io::Result<Option<i32>>;
}

/// Runs commands as real child processes
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &CommandSpec) -> io::Result<Option<i32>> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .status()?;
        Ok(status.code())
    }
}

/// The configure step: `cmake -D... <work_dir>` run in the build directory
pub fn configure_command(settings: &BuildSettings, resolution: &Resolution) -> CommandSpec {
    let mut args = resolution.configure_args();
    args.push(path_arg(&settings.paths.work_dir));
    CommandSpec {
        program: settings.build.configure_program.clone(),
        args,
        cwd: settings.paths.build_dir.clone(),
    }
}

/// The optional `make clean` step
pub fn clean_command(settings: &BuildSettings) -> Option<CommandSpec> {
    settings.build.clean.then(|| CommandSpec {
        program: settings.build.make_program.clone(),
        args: vec!["clean".to_string()],
        cwd: settings.paths.build_dir.clone(),
    })
}

/// The build step: `make -j<jobs> <target>`
pub fn build_command(settings: &BuildSettings) -> CommandSpec {
    CommandSpec {
        program: settings.build.make_program.clone(),
        args: vec![
            format!("-j{}", settings.build.jobs),
            settings.build.target.clone(),
        ],
        cwd: settings.paths.build_dir.clone(),
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
