use parking_lot::Mutex;

/// LIFO of pending work shared by every thread of one engine.
///
/// Each operation holds the lock for a constant amount of work: jobs move in
/// and out by value and are never inspected under the lock. Nothing ever
/// blocks waiting for the stack to become non-empty.
#[derive(Debug)]
pub struct WorkStack<J> {
    items: Mutex<Vec<J>>,
}

impl<J> Default for WorkStack<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J> WorkStack<J> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, job: J) {
        self.items.lock().push(job);
    }

    /// Removes the most recently pushed job, or returns `None` when empty.
    pub fn try_pop(&self) -> Option<J> {
        self.items.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
