use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Job {
    id: usize,
    line: String,
    children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedJob {
    pub id: usize,
    pub line: String,
}

/// Background pipelines that have not been reaped yet.
pub struct JobTable {
    jobs: Vec<Job>,
    next_id: usize,
    child_event: Arc<AtomicBool>,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            next_id: 1,
            child_event: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uses `flag` (raised on `SIGCHLD`) to skip polling when nothing happened.
    pub fn with_notifier(mut self, flag: Arc<AtomicBool>) -> Self {
        self.child_event = flag;
        self
    }

    pub fn add(&mut self, line: &str, children: Vec<Child>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        log::debug!(
            "job [{}] started: {:?}",
            id,
            children.iter().map(Child::id).collect::<Vec<_>>()
        );
        self.jobs.push(Job {
            id,
            line: line.to_string(),
            children,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// True when a child may have exited since the last reap.
    pub fn pending(&self) -> bool {
        !self.jobs.is_empty() && self.child_event.load(Ordering::Acquire)
    }

    /// Collects every job whose stages have all terminated, without blocking.
    pub fn reap(&mut self) -> Vec<FinishedJob> {
        self.child_event.store(false, Ordering::Release);

        for job in &mut self.jobs {
            job.children.retain_mut(|child| match child.try_wait() {
                Ok(Some(status)) => {
                    log::debug!("job [{}] pid {} exited: {}", job.id, child.id(), status);
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    log::warn!("job [{}] pid {}: {}", job.id, child.id(), e);
                    false
                }
            });
        }

        let (done, running): (Vec<Job>, Vec<Job>) = std::mem::take(&mut self.jobs)
            .into_iter()
            .partition(|job| job.children.is_empty());
        self.jobs = running;

        done.into_iter()
            .map(|job| FinishedJob {
                id: job.id,
                line: job.line,
            })
            .collect()
    }
}
