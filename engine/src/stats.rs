/// Job counts collected by one saturation engine, merged at `finish`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStatistics {
    pub(crate) jobs_submitted: u64,
    /// Jobs whose root was already saturated when they were taken.
    pub(crate) jobs_already_done: u64,
    pub(crate) jobs_processed: u64,
    /// Times a worker parked on the threshold.
    pub(crate) locks: u64,
}

impl JobStatistics {
    #[must_use]
    pub fn jobs_submitted(&self) -> u64 {
        self.jobs_submitted
    }

    #[must_use]
    pub fn jobs_already_done(&self) -> u64 {
        self.jobs_already_done
    }

    #[must_use]
    pub fn jobs_processed(&self) -> u64 {
        self.jobs_processed
    }

    #[must_use]
    pub fn locks(&self) -> u64 {
        self.locks
    }

    /// `true` when every submitted job was accounted for.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.jobs_submitted == self.jobs_already_done + self.jobs_processed
    }

    pub fn merge(&mut self, other: &JobStatistics) {
        self.jobs_submitted += other.jobs_submitted;
        self.jobs_already_done += other.jobs_already_done;
        self.jobs_processed += other.jobs_processed;
        self.locks += other.locks;
    }
}
