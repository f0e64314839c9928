//! Serial executors.
//!
//! A [`SerialExecutor`] owns a piece of state on a dedicated named thread and
//! runs jobs against it strictly one at a time, in submission order. The
//! application runs two of them: the model thread (project, history, scene
//! updates) and the UI queue (camera model). Every mutation of the state
//! goes through the queue, so the state itself needs no locks.
//!
//! Two submission disciplines exist:
//! - [`ExecutorHandle::post`]: fire-and-forget, the caller never observes
//!   the result
//! - [`ExecutorHandle::call`] / [`ExecutorHandle::call_async`]: round-trip,
//!   the caller waits until the job ran and receives its result
//!
//! `call` blocks the calling thread and must not be used from inside the
//! executor's own jobs or from an async task; use `call_async` there.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

use crate::error::ExecutorError;

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

enum Envelope<S> {
    Run(Job<S>),
    Stop,
}

/// Cloneable submission handle for a [`SerialExecutor`].
pub struct ExecutorHandle<S> {
    name: Arc<str>,
    sender: mpsc::UnboundedSender<Envelope<S>>,
}

impl<S> Clone for ExecutorHandle<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl<S: 'static> ExecutorHandle<S> {
    /// Name of the executor thread.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a job without waiting for it.
    pub fn post<F>(&self, job: F) -> Result<(), ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.sender
            .send(Envelope::Run(Box::new(job)))
            .map_err(|_| ExecutorError::ShutDown(self.name.to_string()))
    }

    /// Queue a job and block until its result is available.
    pub fn call<F, R>(&self, job: F) -> Result<R, ExecutorError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let reply = self.submit(job)?;
        reply
            .blocking_recv()
            .map_err(|_| ExecutorError::ReplyDropped(self.name.to_string()))
    }

    /// Queue a job and await its result.
    pub async fn call_async<F, R>(&self, job: F) -> Result<R, ExecutorError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let reply = self.submit(job)?;
        reply
            .await
            .map_err(|_| ExecutorError::ReplyDropped(self.name.to_string()))
    }

    fn submit<F, R>(&self, job: F) -> Result<oneshot::Receiver<R>, ExecutorError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.post(move |state| {
            // The caller may have given up waiting; that is fine
            let _ = tx.send(job(state));
        })?;
        Ok(rx)
    }
}

/// A dedicated thread that owns `S` and runs queued jobs serially.
pub struct SerialExecutor<S> {
    handle: ExecutorHandle<S>,
    thread: Option<JoinHandle<()>>,
}

impl<S: 'static> SerialExecutor<S> {
    /// Spawn an executor owning `state`.
    pub fn spawn(name: &str, state: S) -> Result<Self, ExecutorError>
    where
        S: Send,
    {
        Self::spawn_with(name, move || state)
    }

    /// Spawn an executor whose state is built on the executor thread.
    ///
    /// The state never leaves that thread, so it does not need to be `Send`.
    pub fn spawn_with<I>(name: &str, init: I) -> Result<Self, ExecutorError>
    where
        I: FnOnce() -> S + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Envelope<S>>();
        let thread_name = name.to_string();
        let thread = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let mut state = init();
                tracing::debug!("Executor '{}' started", thread_name);
                while let Some(Envelope::Run(job)) = receiver.blocking_recv() {
                    if catch_unwind(AssertUnwindSafe(|| job(&mut state))).is_err() {
                        tracing::error!("Job panicked on executor '{}'", thread_name);
                    }
                }
                tracing::debug!("Executor '{}' stopped", thread_name);
            })
            .map_err(|e| ExecutorError::SpawnFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            handle: ExecutorHandle {
                name: Arc::from(name),
                sender,
            },
            thread: Some(thread),
        })
    }

    /// A cloneable handle for submitting jobs.
    pub fn handle(&self) -> ExecutorHandle<S> {
        self.handle.clone()
    }

    /// Queue a job without waiting for it.
    pub fn post<F>(&self, job: F) -> Result<(), ExecutorError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.handle.post(job)
    }

    /// Queue a job and block until its result is available.
    pub fn call<F, R>(&self, job: F) -> Result<R, ExecutorError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.call(job)
    }

    /// Run every job queued so far, then stop the thread and join it.
    ///
    /// Jobs posted through outstanding handles afterwards fail with
    /// [`ExecutorError::ShutDown`].
    pub fn shutdown(self) {
        // Drop does the work
    }
}

impl<S> Drop for SerialExecutor<S> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.sender.send(Envelope::Stop);
            if thread.join().is_err() {
                tracing::error!("Executor '{}' thread panicked", self.handle.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_call_returns_result() {
        let executor = SerialExecutor::spawn("test-call", 40_u32).expect("spawn");
        let value = executor
            .call(|state| {
                *state += 2;
                *state
            })
            .expect("call");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_jobs_run_in_order() {
        let executor = SerialExecutor::spawn("test-order", Vec::<usize>::new()).expect("spawn");
        for i in 0..100 {
            executor.post(move |log| log.push(i)).expect("post");
        }
        let log = executor.call(|log| log.clone()).expect("call");
        assert_eq!(log, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_panicking_job_does_not_stop_executor() {
        let executor = SerialExecutor::spawn("test-panic", 0_u32).expect("spawn");
        let result = executor.call(|_| -> u32 { panic!("boom") });
        assert_eq!(
            result,
            Err(ExecutorError::ReplyDropped("test-panic".to_string()))
        );
        assert_eq!(executor.call(|state| *state + 1), Ok(1));
    }

    #[test]
    fn test_shutdown_drains_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        let executor = SerialExecutor::spawn("test-drain", ()).expect("spawn");
        for _ in 0..10 {
            let counter = counter.clone();
            executor
                .post(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .expect("post");
        }
        executor.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_post_after_shutdown_fails() {
        let executor = SerialExecutor::spawn("test-closed", ()).expect("spawn");
        let handle = executor.handle();
        assert!(handle.post(|_| {}).is_ok());

        executor.shutdown();
        assert_eq!(
            handle.post(|_| {}),
            Err(ExecutorError::ShutDown("test-closed".to_string()))
        );
        assert_eq!(
            handle.call(|_| ()),
            Err(ExecutorError::ShutDown("test-closed".to_string()))
        );
    }

    #[tokio::test]
    async fn test_call_async() {
        let executor = SerialExecutor::spawn("test-async", String::from("a")).expect("spawn");
        let handle = executor.handle();
        let value = handle
            .call_async(|s| {
                s.push('b');
                s.clone()
            })
            .await
            .expect("call_async");
        assert_eq!(value, "ab");
    }
}
