//! Request dispatch between the controller and a provider.
//!
//! The controller never blocks on the provider. It hands `ProviderJob`s to a
//! `RequestSink`; completions come back as `ProviderEvent`s which the owner
//! feeds into `PlaceController::handle_provider_event`.
//!
//! # Design
//!
//! - `ThreadDispatcher`: one worker thread per job, results over `mpsc`,
//!   drained by a non-blocking `poll()` from the event loop. Completion
//!   order is not guaranteed.
//! - `QueuedSink`: holds jobs until the owner runs them, so tests choose the
//!   completion order.

use crate::model::{PlaceDetails, Prediction, ProviderError};
use crate::provider::{DetailsRequest, PredictionRequest, SharedProvider};
use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, error};

/// A provider call waiting to run.
pub enum ProviderJob {
    /// Predictions for the query issued under `generation`.
    Predictions {
        /// Query generation the response belongs to.
        generation: u64,
        /// Backend to call.
        provider: SharedProvider,
        /// Request payload.
        request: PredictionRequest,
    },
    /// Details for the selection identified by `ticket`.
    Details {
        /// Selection ticket the response belongs to.
        ticket: u64,
        /// Backend to call.
        provider: SharedProvider,
        /// Request payload.
        request: DetailsRequest,
    },
}

impl ProviderJob {
    /// Run the call on the current thread.
    pub fn run(self) -> ProviderEvent {
        match self {
            ProviderJob::Predictions {
                generation,
                provider,
                request,
            } => ProviderEvent::Predictions {
                generation,
                result: provider.predictions(&request),
            },
            ProviderJob::Details {
                ticket,
                provider,
                request,
            } => ProviderEvent::Details {
                ticket,
                result: provider.details(&request),
            },
        }
    }

    /// Predictions payload, if this is a predictions job.
    pub fn prediction_request(&self) -> Option<&PredictionRequest> {
        match self {
            ProviderJob::Predictions { request, .. } => Some(request),
            ProviderJob::Details { .. } => None,
        }
    }

    /// Details payload, if this is a details job.
    pub fn details_request(&self) -> Option<&DetailsRequest> {
        match self {
            ProviderJob::Details { request, .. } => Some(request),
            ProviderJob::Predictions { .. } => None,
        }
    }
}

impl fmt::Debug for ProviderJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderJob::Predictions {
                generation,
                request,
                ..
            } => f
                .debug_struct("Predictions")
                .field("generation", generation)
                .field("request", request)
                .finish_non_exhaustive(),
            ProviderJob::Details {
                ticket, request, ..
            } => f
                .debug_struct("Details")
                .field("ticket", ticket)
                .field("request", request)
                .finish_non_exhaustive(),
        }
    }
}

/// A finished provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// Predictions response.
    Predictions {
        /// Generation captured when the request was issued.
        generation: u64,
        /// Provider result.
        result: Result<Vec<Prediction>, ProviderError>,
    },
    /// Details response.
    Details {
        /// Selection ticket captured when the request was issued.
        ticket: u64,
        /// Provider result.
        result: Result<PlaceDetails, ProviderError>,
    },
}

/// Where the controller sends provider work.
pub trait RequestSink {
    /// Queue or start a job. Must not block on the provider.
    fn submit(&mut self, job: ProviderJob);
}

/// Runs each job on its own thread and collects results on a channel.
#[derive(Debug)]
pub struct ThreadDispatcher {
    tx: Sender<ProviderEvent>,
    rx: Receiver<ProviderEvent>,
}

impl ThreadDispatcher {
    /// Create a dispatcher with an empty result channel.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Drain finished calls.
    ///
    /// Non-blocking - returns immediately with whatever has completed.
    pub fn poll(&mut self) -> Vec<ProviderEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for ThreadDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSink for ThreadDispatcher {
    fn submit(&mut self, job: ProviderJob) {
        let tx = self.tx.clone();
        debug!(?job, "Dispatching provider job");

        // Hand the job over a channel so it is still ours if the spawn fails.
        let (job_tx, job_rx) = mpsc::channel::<ProviderJob>();
        let spawned = thread::Builder::new()
            .name("placepick-provider".to_string())
            .spawn(move || {
                if let Ok(job) = job_rx.recv() {
                    // Receiver gone means the controller was dropped.
                    let _ = tx.send(job.run());
                }
            });

        match spawned {
            Ok(_) => {
                if let Err(mpsc::SendError(job)) = job_tx.send(job) {
                    error!("Provider worker exited before receiving its job");
                    let _ = self.tx.send(job.run());
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to spawn provider worker, running inline");
                let _ = self.tx.send(job.run());
            }
        }
    }
}

/// Holds jobs until the owner runs them.
#[derive(Debug, Default)]
pub struct QueuedSink {
    jobs: VecDeque<ProviderJob>,
}

impl QueuedSink {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs not yet run.
    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    /// Inspect queued jobs in submission order.
    pub fn jobs(&self) -> impl Iterator<Item = &ProviderJob> {
        self.jobs.iter()
    }

    /// Remove the oldest job without running it.
    pub fn take_next(&mut self) -> Option<ProviderJob> {
        self.jobs.pop_front()
    }

    /// Remove the newest job without running it.
    pub fn take_last(&mut self) -> Option<ProviderJob> {
        self.jobs.pop_back()
    }

    /// Run the oldest job.
    pub fn run_next(&mut self) -> Option<ProviderEvent> {
        self.take_next().map(ProviderJob::run)
    }

    /// Run every queued job in submission order.
    pub fn run_all(&mut self) -> Vec<ProviderEvent> {
        self.jobs.drain(..).map(ProviderJob::run).collect()
    }
}

impl RequestSink for QueuedSink {
    fn submit(&mut self, job: ProviderJob) {
        self.jobs.push_back(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlaceId;
    use crate::provider::ScriptedProvider;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn predictions_job(provider: SharedProvider, generation: u64, input: &str) -> ProviderJob {
        ProviderJob::Predictions {
            generation,
            provider,
            request: PredictionRequest {
                input: input.to_string(),
                types: vec!["(cities)".to_string()],
                country: None,
            },
        }
    }

    fn scripted() -> Arc<ScriptedProvider> {
        let provider = ScriptedProvider::new();
        provider.add_place("p1", "Rome, Italy", 41.9, 12.5);
        Arc::new(provider)
    }

    #[test]
    fn queued_sink_holds_jobs_until_run() {
        let provider = scripted();
        let mut sink = QueuedSink::new();
        sink.submit(predictions_job(provider.clone(), 1, "Rom"));

        assert_eq!(sink.pending(), 1);
        assert_eq!(provider.prediction_calls().len(), 0, "Nothing runs on submit");

        let event = sink.run_next().expect("one job queued");
        match event {
            ProviderEvent::Predictions { generation, result } => {
                assert_eq!(generation, 1);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("Expected predictions event, got {other:?}"),
        }
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn queued_sink_can_complete_out_of_order() {
        let provider = scripted();
        let mut sink = QueuedSink::new();
        sink.submit(predictions_job(provider.clone(), 1, "Ro"));
        sink.submit(predictions_job(provider, 2, "Rom"));

        let newest = sink.take_last().unwrap().run();
        assert!(matches!(
            newest,
            ProviderEvent::Predictions { generation: 2, .. }
        ));
        let oldest = sink.run_next().unwrap();
        assert!(matches!(
            oldest,
            ProviderEvent::Predictions { generation: 1, .. }
        ));
    }

    #[test]
    fn job_accessors_expose_payloads() {
        let provider = scripted();
        let job = ProviderJob::Details {
            ticket: 7,
            provider,
            request: DetailsRequest::standard(PlaceId::new("p1").unwrap()),
        };
        assert!(job.prediction_request().is_none());
        assert_eq!(job.details_request().unwrap().place_id.as_str(), "p1");
    }

    #[test]
    fn thread_dispatcher_delivers_results_via_poll() {
        let provider = scripted();
        let mut dispatcher = ThreadDispatcher::new();
        dispatcher.submit(ProviderJob::Details {
            ticket: 3,
            provider,
            request: DetailsRequest::standard(PlaceId::new("p1").unwrap()),
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while events.is_empty() && Instant::now() < deadline {
            events = dispatcher.poll();
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(events.len(), 1, "Worker should deliver exactly one event");
        match &events[0] {
            ProviderEvent::Details { ticket, result } => {
                assert_eq!(*ticket, 3);
                assert!(result.is_ok());
            }
            other => panic!("Expected details event, got {other:?}"),
        }
    }

    #[test]
    fn thread_dispatcher_poll_is_empty_without_jobs() {
        let mut dispatcher = ThreadDispatcher::new();
        assert!(dispatcher.poll().is_empty());
    }
}
