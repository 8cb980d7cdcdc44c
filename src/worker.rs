//! Background search and jq jobs.
//!
//! Requests fan out over a shared `flume` queue to blocking workers; results
//! come back on a second queue tagged with the generation they were
//! submitted under. The receiver decides whether a result is still wanted.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::SearchScope;
use crate::document::{QueryCache, QueryEvaluator, QueryOutput, build_matcher, find_matches};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct SearchJob {
    pub generation: u64,
    pub term: String,
    pub scope: SearchScope,
    pub regex: bool,
    pub lines: Arc<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct QueryJob {
    pub generation: u64,
    pub query: String,
    pub input: Arc<Value>,
}

#[derive(Debug, Clone)]
pub enum JobRequest {
    Search(SearchJob),
    Query(QueryJob),
}

#[derive(Debug)]
pub enum JobResult {
    Search {
        generation: u64,
        result: AppResult<Vec<usize>>,
        elapsed: Duration,
    },
    Query {
        generation: u64,
        query: String,
        result: AppResult<Arc<QueryOutput>>,
        elapsed: Duration,
    },
}

enum WorkerRequest {
    Job(JobRequest),
    Shutdown,
}

struct WorkerRuntime {
    _owned: Option<Runtime>,
    handle: Handle,
}

impl WorkerRuntime {
    fn new() -> AppResult<Self> {
        if let Ok(handle) = Handle::try_current() {
            return Ok(Self {
                _owned: None,
                handle,
            });
        }

        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("pvj-jobs")
            .build()
            .map_err(|err| AppError::io_with_context(err, "failed to start job runtime"))?;
        let handle = runtime.handle().clone();
        Ok(Self {
            _owned: Some(runtime),
            handle,
        })
    }

    fn spawn_blocking<F>(&self, task: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn_blocking(task)
    }
}

pub struct JobWorker {
    request_tx: flume::Sender<WorkerRequest>,
    result_rx: flume::Receiver<JobResult>,
    workers: Vec<JoinHandle<()>>,
    _runtime: WorkerRuntime,
}

impl JobWorker {
    pub fn spawn(
        worker_threads: usize,
        evaluator: Arc<dyn QueryEvaluator>,
        cache_entries: usize,
    ) -> AppResult<Self> {
        let (request_tx, request_rx) = flume::unbounded();
        let (result_tx, result_rx) = flume::unbounded();
        let runtime = WorkerRuntime::new()?;
        let cache = Arc::new(Mutex::new(QueryCache::new(cache_entries)));

        let workers = (0..worker_threads.max(1))
            .map(|_| {
                let request_rx = request_rx.clone();
                let result_tx = result_tx.clone();
                let evaluator = Arc::clone(&evaluator);
                let cache = Arc::clone(&cache);
                runtime.spawn_blocking(move || {
                    worker_main(request_rx, result_tx, evaluator.as_ref(), &cache)
                })
            })
            .collect();

        Ok(Self {
            request_tx,
            result_rx,
            workers,
            _runtime: runtime,
        })
    }

    pub fn submit(&self, job: JobRequest) -> AppResult<()> {
        self.request_tx
            .send(WorkerRequest::Job(job))
            .map_err(|_| AppError::invalid_argument("job worker has stopped"))
    }

    pub async fn recv_result(&self) -> Option<JobResult> {
        self.result_rx.recv_async().await.ok()
    }

    pub fn try_recv_result(&self) -> Option<JobResult> {
        self.result_rx.try_recv().ok()
    }

    pub fn shutdown(&mut self) {
        for _ in &self.workers {
            let _ = self.request_tx.send(WorkerRequest::Shutdown);
        }
        self.workers.clear();
    }
}

impl Drop for JobWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_main(
    request_rx: flume::Receiver<WorkerRequest>,
    result_tx: flume::Sender<JobResult>,
    evaluator: &dyn QueryEvaluator,
    cache: &Mutex<QueryCache>,
) {
    while let Ok(request) = request_rx.recv() {
        let job = match request {
            WorkerRequest::Job(job) => job,
            WorkerRequest::Shutdown => return,
        };
        let result = run_job(job, evaluator, cache);
        if result_tx.send(result).is_err() {
            return;
        }
    }
}

fn run_job(job: JobRequest, evaluator: &dyn QueryEvaluator, cache: &Mutex<QueryCache>) -> JobResult {
    let started = Instant::now();
    match job {
        JobRequest::Search(job) => {
            let result = build_matcher(&job.term, job.regex)
                .map(|matcher| find_matches(&job.lines, job.scope, matcher.as_ref()));
            let elapsed = started.elapsed();
            match &result {
                Ok(matches) => debug!(
                    generation = job.generation,
                    matches = matches.len(),
                    ?elapsed,
                    "search finished"
                ),
                Err(err) => warn!(generation = job.generation, error = %err, "search failed"),
            }
            JobResult::Search {
                generation: job.generation,
                result,
                elapsed,
            }
        }
        JobRequest::Query(job) => {
            // Held across evaluation: jq jobs run one at a time.
            let result = cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .evaluate(evaluator, &job.input, &job.query);
            let elapsed = started.elapsed();
            if let Err(err) = &result {
                debug!(generation = job.generation, error = %err, "jq query failed");
            }
            JobResult::Query {
                generation: job.generation,
                query: job.query,
                result,
                elapsed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use crate::app::SearchScope;
    use crate::document::PathQuery;

    use super::{JobRequest, JobResult, JobWorker, QueryJob, SearchJob};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn search_and_query_results_carry_their_generation() {
        let worker = JobWorker::spawn(2, Arc::new(PathQuery), 4).expect("worker starts");
        worker
            .submit(JobRequest::Search(SearchJob {
                generation: 7,
                term: "b".to_string(),
                scope: SearchScope::All,
                regex: false,
                lines: Arc::new(vec!["a".to_string(), "B".to_string()]),
            }))
            .expect("submit search");
        worker
            .submit(JobRequest::Query(QueryJob {
                generation: 8,
                query: ".x".to_string(),
                input: Arc::new(json!({"x": 1})),
            }))
            .expect("submit query");

        let mut seen = Vec::new();
        for _ in 0..2 {
            let result = tokio::time::timeout(Duration::from_secs(5), worker.recv_result())
                .await
                .expect("result before timeout")
                .expect("worker alive");
            seen.push(result);
        }

        assert!(seen.iter().any(|result| matches!(
            result,
            JobResult::Search { generation: 7, result: Ok(matches), .. } if matches == &vec![1]
        )));
        assert!(seen.iter().any(|result| matches!(
            result,
            JobResult::Query { generation: 8, result: Ok(output), .. } if output.lines == ["1"]
        )));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn invalid_regex_comes_back_as_error() {
        let worker = JobWorker::spawn(1, Arc::new(PathQuery), 4).expect("worker starts");
        worker
            .submit(JobRequest::Search(SearchJob {
                generation: 1,
                term: "(".to_string(),
                scope: SearchScope::All,
                regex: true,
                lines: Arc::new(Vec::new()),
            }))
            .expect("submit search");
        let result = tokio::time::timeout(Duration::from_secs(5), worker.recv_result())
            .await
            .expect("result before timeout")
            .expect("worker alive");
        assert!(matches!(result, JobResult::Search { result: Err(_), .. }));
    }
}
