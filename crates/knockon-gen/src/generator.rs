use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

/// Generation boundary used by the shell. Failures never cross it: both
/// methods return display-ready text, with errors represented as
/// `"Error fetching ..."` strings the tree and answer panel show as-is.
pub trait TextGenerator: Send + Sync {
    fn generate_effects(&self, text: &str, order: u32) -> Vec<String>;
    fn answer_question(&self, question: &str) -> String;
}

pub fn effect_prompt(text: &str, order: u32) -> String {
    format!("List the {order}-order effects of the following policy:\n\n{text}")
}

pub fn parse_effect_titles(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deterministic generator for tests. Responses are consumed FIFO from
/// queues; an exhausted queue yields a represented error, the same way the
/// live client does.
#[derive(Default)]
pub struct ScriptedGenerator {
    effects: Mutex<VecDeque<Vec<String>>>,
    answers: Mutex<VecDeque<String>>,
    effect_calls: AtomicUsize,
    answer_calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_effects(&self, titles: &[&str]) {
        if let Ok(mut queue) = self.effects.lock() {
            queue.push_back(titles.iter().map(|title| title.to_string()).collect());
        }
    }

    pub fn queue_answer(&self, answer: &str) {
        if let Ok(mut queue) = self.answers.lock() {
            queue.push_back(answer.to_string());
        }
    }

    pub fn effect_calls(&self) -> usize {
        self.effect_calls.load(Ordering::SeqCst)
    }

    pub fn answer_calls(&self) -> usize {
        self.answer_calls.load(Ordering::SeqCst)
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate_effects(&self, _text: &str, order: u32) -> Vec<String> {
        self.effect_calls.fetch_add(1, Ordering::SeqCst);
        self.effects
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| {
                vec![format!(
                    "Error fetching effects: no scripted response for order {order}"
                )]
            })
    }

    fn answer_question(&self, _question: &str) -> String {
        self.answer_calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| "Error fetching response: no scripted answer".to_string())
    }
}
