//! Offline audit of a store against a manifest.
//!
//! Unlike a sync run this hashes every present object, so it also finds
//! same-size corruption that the size-only trust policy accepts. Nothing is
//! fetched or deleted.

use crate::checksum::{self, HashAlgorithm};
use crate::error::SyncError;
use crate::layout::StoreLayout;
use crate::manifest::Manifest;
use crate::storage;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectProblem {
    Missing,
    WrongSize { expected: u64, found: u64 },
    Corrupt { actual: String },
}

impl fmt::Display for ObjectProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectProblem::Missing => write!(f, "missing"),
            ObjectProblem::WrongSize { expected, found } => {
                write!(f, "size {} (expected {})", found, expected)
            }
            ObjectProblem::Corrupt { actual } => write!(f, "digest {}", actual),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub name: String,
    pub hash: String,
    pub problem: ObjectProblem,
}

#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Records examined.
    pub checked: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Check every record in `manifest` against the objects under `layout`.
///
/// Objects shared by several names are hashed once.
pub fn audit_store(
    layout: &StoreLayout,
    manifest: &Manifest,
    algorithm: HashAlgorithm,
) -> Result<AuditReport, SyncError> {
    let mut seen: HashMap<&str, Option<ObjectProblem>> = HashMap::new();
    let mut report = AuditReport::default();

    for (name, record) in manifest.assets() {
        report.checked += 1;
        let problem = match seen.get(record.hash.as_str()) {
            Some(p) => p.clone(),
            None => {
                let path = layout.object_path(&record.hash);
                let p = match storage::file_len(&path) {
                    None => Some(ObjectProblem::Missing),
                    Some(found) if found != record.size => Some(ObjectProblem::WrongSize {
                        expected: record.size,
                        found,
                    }),
                    Some(_) => checksum::verify_path(&path, &record.hash, algorithm)?
                        .map(|actual| ObjectProblem::Corrupt { actual }),
                };
                seen.insert(record.hash.as_str(), p.clone());
                p
            }
        };
        if let Some(problem) = problem {
            tracing::debug!(asset = name, hash = %record.hash, %problem, "audit finding");
            report.findings.push(AuditFinding {
                name: name.to_string(),
                hash: record.hash.clone(),
                problem,
            });
        }
    }
    Ok(report)
}
