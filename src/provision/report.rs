//! # Provisioning report
//!
//! Module dedicated to the partial-success report of one provisioning
//! run. Failed nodes are listed with their error instead of aborting
//! the run: the caller can re-run at any time, every operation being
//! create-or-resolve.

use super::Error;

/// The provisioning report.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    /// The paths of the folders created remotely during this run.
    pub created: Vec<String>,

    /// The paths of the folders that already existed remotely or
    /// locally.
    pub already_existed: Vec<String>,

    /// The paths of the folders that could not be provisioned, with
    /// the error that stopped them.
    pub failed: Vec<(String, Error)>,
}

impl ProvisionReport {
    /// Count every node of the run.
    pub fn total(&self) -> usize {
        self.created.len() + self.already_existed.len() + self.failed.len()
    }

    /// Return `true` when no node failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Render the short summary shown to the user.
    pub fn summary(&self) -> String {
        let ok = self.created.len() + self.already_existed.len();
        format!("{ok} of {} folders created", self.total())
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ProvisionReport) {
        self.created.extend(other.created);
        self.already_existed.extend(other.already_existed);
        self.failed.extend(other.failed);
    }
}
