//! Downstream entry points.
//!
//! An entry point is anything that accepts the forwarded argument list. The
//! registry maps names to in-process functions supplied by the embedding
//! program; names it does not know are treated as external programs.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

/// In-process entry point signature.
pub type EntryFn = fn(&[String]) -> Result<()>;

pub trait EntryPoint {
    fn name(&self) -> &str;
    fn invoke(&self, args: &[String]) -> Result<()>;
}

pub struct RegisteredEntry {
    name: String,
    f: EntryFn,
}

impl EntryPoint for RegisteredEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: &[String]) -> Result<()> {
        (self.f)(args)
    }
}

/// Runs an external program with the forwarded arguments and waits for it.
pub struct ProgramEntryPoint {
    name: String,
    program: PathBuf,
}

impl ProgramEntryPoint {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self {
            name: program.display().to_string(),
            program,
        }
    }
}

impl EntryPoint for ProgramEntryPoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: &[String]) -> Result<()> {
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .with_context(|| format!("could not start entry point {}", self.name))?;
        if !status.success() {
            bail!("entry point {} exited with {}", self.name, status);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct EntryRegistry {
    entries: HashMap<String, EntryFn>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: EntryFn) -> &mut Self {
        self.entries.insert(name.into(), f);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered function for `name`, or an external program of that name.
    pub fn resolve(&self, name: &str) -> Box<dyn EntryPoint> {
        match self.entries.get(name) {
            Some(f) => Box::new(RegisteredEntry {
                name: name.to_string(),
                f: *f,
            }),
            None => Box::new(ProgramEntryPoint::new(name)),
        }
    }
}
