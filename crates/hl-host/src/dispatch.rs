use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, JoinHandle, ThreadId};

type Job = Box<dyn FnOnce() + Send>;

/// The host's event thread. Write actions and non-transactional quick-fixes
/// are dispatched here, so the analysis worker never mutates state directly.
pub struct Dispatcher {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl Dispatcher {
    pub fn start() -> Dispatcher {
        let (sender, receiver) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name("hl-dispatch".to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            })
            .expect("failed to spawn dispatch thread");
        let thread_id = handle.thread().id();
        Dispatcher {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
            thread_id,
        }
    }

    /// Run `f` on the dispatch thread and block until it completes. Calls
    /// made from the dispatch thread itself run inline. A panic inside `f`
    /// resumes on the caller, leaving the dispatch thread alive.
    pub fn invoke_and_wait<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if thread::current().id() == self.thread_id {
            return f();
        }
        let (done_tx, done_rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(f));
            let _ = done_tx.send(outcome);
        });
        let sender = self.sender.lock();
        sender
            .as_ref()
            .expect("dispatcher stopped")
            .send(job)
            .expect("dispatch thread gone");
        drop(sender);
        match done_rx.recv().expect("dispatch thread dropped the job") {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Stop the event thread and wait for it to drain.
    pub fn stop(&self) {
        self.sender.lock().take();
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn jobs_run_on_the_dispatch_thread() {
        let dispatcher = Dispatcher::start();
        let name = dispatcher.invoke_and_wait(|| {
            thread::current().name().map(String::from)
        });
        assert_eq!(name.as_deref(), Some("hl-dispatch"));
        dispatcher.stop();
    }

    #[test]
    fn results_come_back_in_order() {
        let dispatcher = Dispatcher::start();
        let counter = Arc::new(AtomicUsize::new(0));
        for expected in 0..10 {
            let counter = counter.clone();
            let seen = dispatcher.invoke_and_wait(move || counter.fetch_add(1, Ordering::SeqCst));
            assert_eq!(seen, expected);
        }
        dispatcher.stop();
    }

    #[test]
    fn panics_propagate_but_thread_survives() {
        let dispatcher = Dispatcher::start();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            dispatcher.invoke_and_wait(|| panic!("boom"));
        }));
        assert!(result.is_err());
        // The dispatch thread is still serving jobs
        assert_eq!(dispatcher.invoke_and_wait(|| 7), 7);
        dispatcher.stop();
    }
}
