use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::trace;

use crate::SortError;

pub(crate) type JobResult<T> = Result<Vec<T>, SortError>;

/// A partition waiting on the work stack, paired with the sending half of
/// its result channel.
pub(crate) struct SortJob<T> {
    data: Vec<T>,
    depth_budget: usize,
    promise: JobPromise<T>,
}

/// Sending half of a job's result channel. Consumed by `fulfill`, so a
/// job's result can be delivered at most once.
pub(crate) struct JobPromise<T> {
    sender: Sender<JobResult<T>>,
}

/// Receiving half of a job's result channel, held by the thread that pushed
/// the job.
pub(crate) struct JobHandle<T> {
    receiver: Receiver<JobResult<T>>,
    ready: Option<JobResult<T>>,
}

impl<T> SortJob<T> {
    pub(crate) fn new(data: Vec<T>, depth_budget: usize) -> (Self, JobHandle<T>) {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let job = Self {
            data,
            depth_budget,
            promise: JobPromise { sender },
        };
        let handle = JobHandle {
            receiver,
            ready: None,
        };
        (job, handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<T>, usize, JobPromise<T>) {
        (self.data, self.depth_budget, self.promise)
    }
}

impl<T> JobPromise<T> {
    pub(crate) fn fulfill(self, result: JobResult<T>) {
        // The waiter is gone only when its own sort already failed.
        if self.sender.send(result).is_err() {
            trace!("discarding result of an abandoned partition");
        }
    }
}

impl<T> JobHandle<T> {
    /// Handle for a partition that needed no work and was never pushed.
    pub(crate) fn resolved(result: JobResult<T>) -> Self {
        Self {
            receiver: crossbeam_channel::never(),
            ready: Some(result),
        }
    }

    /// Non-blocking readiness check. Returns true once a result (or a lost
    /// channel) has been observed.
    pub(crate) fn poll(&mut self) -> bool {
        if self.ready.is_some() {
            return true;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.ready = Some(result);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.ready = Some(Err(SortError::ResultLost));
                true
            }
        }
    }

    /// Takes the result observed by `poll`. Only valid once `poll` has
    /// returned true.
    pub(crate) fn into_result(self) -> JobResult<T> {
        debug_assert!(self.ready.is_some(), "into_result before poll succeeded");
        self.ready.unwrap_or(Err(SortError::ResultLost))
    }
}
