use std::collections::BTreeSet;

use serde::Serialize;

use crate::workflows::workforce::WorkerId;

/// Where a worker lands when a month's work is compared with existing enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerBucket {
    NewEnrollment,
    Active,
    Inactive,
}

impl WorkerBucket {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NewEnrollment => "New enrollment",
            Self::Active => "Active",
            Self::Inactive => "Inactive (loss candidate)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerBuckets {
    pub new_enrollments: Vec<WorkerId>,
    pub active: Vec<WorkerId>,
    pub inactive: Vec<WorkerId>,
}

impl WorkerBuckets {
    pub fn bucket_of(&self, worker: &WorkerId) -> Option<WorkerBucket> {
        if self.new_enrollments.contains(worker) {
            Some(WorkerBucket::NewEnrollment)
        } else if self.active.contains(worker) {
            Some(WorkerBucket::Active)
        } else if self.inactive.contains(worker) {
            Some(WorkerBucket::Inactive)
        } else {
            None
        }
    }
}

/// Partitions workers by set difference of who worked this month and who is already enrolled.
pub fn bucket_workers<'a, W, E>(worked: W, enrolled: E) -> WorkerBuckets
where
    W: IntoIterator<Item = &'a WorkerId>,
    E: IntoIterator<Item = &'a WorkerId>,
{
    let worked: BTreeSet<&WorkerId> = worked.into_iter().collect();
    let enrolled: BTreeSet<&WorkerId> = enrolled.into_iter().collect();

    WorkerBuckets {
        new_enrollments: worked.difference(&enrolled).map(|id| (*id).clone()).collect(),
        active: worked.intersection(&enrolled).map(|id| (*id).clone()).collect(),
        inactive: enrolled.difference(&worked).map(|id| (*id).clone()).collect(),
    }
}
