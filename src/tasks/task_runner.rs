use tokio::task::JoinHandle;

/// Collects background jobs so the runtime can start them together and
/// abort them on shutdown.
pub struct TaskRunner {
    tasks: Vec<Box<dyn FnOnce() -> JoinHandle<()> + Send>>,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn add_task<F>(&mut self, task: F)
    where
        F: FnOnce() -> JoinHandle<()> + Send + 'static,
    {
        self.tasks.push(Box::new(task));
    }

    pub fn start_all(self) -> RunningTasks {
        RunningTasks {
            handles: self.tasks.into_iter().map(|task| task()).collect(),
        }
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RunningTasks {
    handles: Vec<JoinHandle<()>>,
}

impl RunningTasks {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn abort_all(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}
