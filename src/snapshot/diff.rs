use crate::snapshot::PlacementSnapshot;
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;

/// How one job's entry differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobChange {
    Added {
        job: String,
        addresses: Vec<Ipv4Addr>,
    },
    Removed {
        job: String,
        addresses: Vec<Ipv4Addr>,
    },
    Changed {
        job: String,
        before: Vec<Ipv4Addr>,
        after: Vec<Ipv4Addr>,
    },
}

impl JobChange {
    #[must_use]
    pub fn job(&self) -> &str {
        match self {
            JobChange::Added { job, .. }
            | JobChange::Removed { job, .. }
            | JobChange::Changed { job, .. } => job,
        }
    }
}

struct Addrs<'a>(&'a [Ipv4Addr]);

impl fmt::Display for Addrs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, addr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{addr}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for JobChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobChange::Added { job, addresses } => {
                write!(f, "added {job} {}", Addrs(addresses))
            }
            JobChange::Removed { job, addresses } => {
                write!(f, "removed {job} (was {})", Addrs(addresses))
            }
            JobChange::Changed { job, before, after } => {
                write!(f, "changed {job} {} -> {}", Addrs(before), Addrs(after))
            }
        }
    }
}

/// Compare two snapshots job by job, ordered by job name.
///
/// A job counts as changed only when its set of addresses differs; reordering or a different
/// number of allocations on the same nodes is not a change. Equal snapshots yield no changes.
#[must_use]
pub fn diff(old: &PlacementSnapshot, new: &PlacementSnapshot) -> Vec<JobChange> {
    let mut changes = Vec::new();

    for (job, before) in old.iter() {
        match new.get(job) {
            None => changes.push(JobChange::Removed {
                job: job.to_string(),
                addresses: before.to_vec(),
            }),
            Some(after) => {
                let a: BTreeSet<_> = before.iter().collect();
                let b: BTreeSet<_> = after.iter().collect();
                if a != b {
                    changes.push(JobChange::Changed {
                        job: job.to_string(),
                        before: before.to_vec(),
                        after: after.to_vec(),
                    });
                }
            }
        }
    }

    for (job, addresses) in new.iter() {
        if old.get(job).is_none() {
            changes.push(JobChange::Added {
                job: job.to_string(),
                addresses: addresses.to_vec(),
            });
        }
    }

    changes.sort_by(|a, b| a.job().cmp(b.job()));
    changes
}
