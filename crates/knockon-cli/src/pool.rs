use std::fs;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use knockon_core::actions::GenTarget;
use knockon_gen::generator::TextGenerator;

const WORKER_COUNT: usize = 4;

/// Work that would block the event loop if run inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    GenerateEffects {
        source: String,
        order: u32,
        target: GenTarget,
        epoch: u64,
    },
    AskQuestion {
        question: String,
    },
    ReadPolicyFile {
        path: PathBuf,
    },
}

/// Completions sent back to the event loop thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    EffectsReady {
        target: GenTarget,
        order: u32,
        epoch: u64,
        titles: Vec<String>,
    },
    AnswerReady {
        text: String,
    },
    FileLoaded {
        text: String,
    },
    FileFailed {
        path: PathBuf,
        error: String,
    },
}

pub struct WorkerPool {
    jobs: mpsc::Sender<Job>,
}

impl WorkerPool {
    /// Spawns a fixed set of detached worker threads. A dispatched job always
    /// runs to completion; there is no cancellation path.
    pub fn start(generator: Arc<dyn TextGenerator>, events: mpsc::Sender<UiEvent>) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));
        for _ in 0..WORKER_COUNT {
            let jobs_rx = Arc::clone(&jobs_rx);
            let generator = Arc::clone(&generator);
            let events = events.clone();
            thread::spawn(move || loop {
                // Hold the lock only for the recv so a long generation call
                // on one worker never blocks the others.
                let job = {
                    let Ok(queue) = jobs_rx.lock() else {
                        return;
                    };
                    queue.recv()
                };
                match job {
                    Ok(job) => run_job(generator.as_ref(), &events, job),
                    Err(_) => return,
                }
            });
        }
        WorkerPool { jobs: jobs_tx }
    }

    pub fn submit(&self, job: Job) {
        let _ = self.jobs.send(job);
    }
}

fn run_job(generator: &dyn TextGenerator, events: &mpsc::Sender<UiEvent>, job: Job) {
    match job {
        Job::GenerateEffects {
            source,
            order,
            target,
            epoch,
        } => {
            let titles = generator.generate_effects(&source, order);
            let _ = events.send(UiEvent::EffectsReady {
                target,
                order,
                epoch,
                titles,
            });
        }
        Job::AskQuestion { question } => {
            let text = generator.answer_question(&question);
            let _ = events.send(UiEvent::AnswerReady { text });
        }
        Job::ReadPolicyFile { path } => match fs::read_to_string(&path) {
            Ok(text) => {
                let _ = events.send(UiEvent::FileLoaded { text });
            }
            Err(err) => {
                let _ = events.send(UiEvent::FileFailed {
                    path,
                    error: err.to_string(),
                });
            }
        },
    }
}
