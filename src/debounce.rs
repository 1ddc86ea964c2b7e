use std::time::{Duration, Instant};

/// A deferred one-shot action. Arming while already armed supersedes the
/// pending deadline, so bursts of events collapse into a single firing after
/// the last one.
#[derive(Debug)]
pub struct DeferredTask {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DeferredTask {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedules (or reschedules) the firing for `delay` from now.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once per arming, when the deadline has passed.
    pub fn fire_if_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn unarmed_task_never_fires() {
        let mut task = DeferredTask::new(Duration::from_millis(10));
        assert!(!task.is_armed());
        assert!(!task.fire_if_due());
    }

    #[test]
    fn fires_once_after_delay() {
        let mut task = DeferredTask::new(Duration::from_millis(20));
        task.arm();
        assert!(!task.fire_if_due());
        sleep(Duration::from_millis(30));
        assert!(task.fire_if_due());
        // Consumed; does not fire again until re-armed.
        assert!(!task.fire_if_due());
        assert!(!task.is_armed());
    }

    #[test]
    fn rearming_supersedes_previous_deadline() {
        let mut task = DeferredTask::new(Duration::from_millis(40));
        task.arm();
        sleep(Duration::from_millis(25));
        task.arm();
        sleep(Duration::from_millis(25));
        // 50ms after the first arm, but only 25ms after the second.
        assert!(!task.fire_if_due());
        sleep(Duration::from_millis(25));
        assert!(task.fire_if_due());
    }

    #[test]
    fn cancel_discards_pending_deadline() {
        let mut task = DeferredTask::new(Duration::from_millis(10));
        task.arm();
        task.cancel();
        sleep(Duration::from_millis(20));
        assert!(!task.fire_if_due());
    }
}
