#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerEffect {
    RequestFrame,
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
    CopyToClipboard(String),
}

use std::path::PathBuf;

use super::actions::ExplorerAction;
use super::actions::GenTarget;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::state::ExpansionState;
use super::state::ExplorerState;
use super::state::Focus;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::ModalPrompt;
use super::state::PromptPurpose;
use super::state::ROOT_NODE;

pub fn reduce(state: &mut ExplorerState, action: ExplorerAction) -> Vec<ExplorerEffect> {
    match action {
        ExplorerAction::User(user) => reduce_user(state, user),
        ExplorerAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut ExplorerState, action: UserAction) -> Vec<ExplorerEffect> {
    match action {
        UserAction::FocusPolicyInput => {
            state.focus = Focus::PolicyInput;
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::FocusTree => {
            state.focus = Focus::Tree;
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::PolicyInput(ch) => {
            state.policy_input.buffer.push(ch);
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::PolicyBackspace => {
            state.policy_input.buffer.pop();
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::PolicyPaste(text) => {
            state.policy_input.buffer.push_str(&text);
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::PolicySubmit => {
            let policy = state.policy_input.buffer.trim().to_string();
            if policy.is_empty() {
                return Vec::new();
            }
            if state.flags.root_generating {
                push_log(
                    state,
                    LogLevel::Warn,
                    LogSource::Shell,
                    "a policy is already being explored; submission ignored".to_string(),
                );
                return vec![ExplorerEffect::RequestFrame];
            }
            state.policy_input.buffer.clear();
            begin_root_generation(state, policy)
        }
        UserAction::CursorUp => {
            state.cursor = state.tree.prev_selectable(state.cursor);
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::CursorDown => {
            state.cursor = state.tree.next_selectable(state.cursor);
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::ExpandSelected => {
            let id = state.cursor;
            let (source, order) = match state.tree.node(id) {
                Some(node) if node.expansion == ExpansionState::Collapsed => {
                    (node.full_text.clone(), node.order + 1)
                }
                _ => return Vec::new(),
            };
            state.tree.mark_requested(id);
            state.flags.jobs_in_flight += 1;
            let epoch = state.tree.epoch();
            push_log(
                state,
                LogLevel::Info,
                LogSource::Gen,
                format!(
                    "requesting order-{order} effects for \"{}\"",
                    preview(&source)
                ),
            );
            vec![
                ExplorerEffect::GenerateEffects {
                    source,
                    order,
                    target: GenTarget::Node(id),
                    epoch,
                },
                ExplorerEffect::RequestFrame,
            ]
        }
        UserAction::OpenQuestionPrompt => {
            if state.prompt.is_some() {
                return Vec::new();
            }
            let node = state.cursor;
            let subject = match state.tree.node(node) {
                Some(found) => found.full_text.clone(),
                None => return Vec::new(),
            };
            state.prompt = Some(ModalPrompt {
                prompt: format!("Question about '{subject}':"),
                buffer: String::new(),
                purpose: PromptPurpose::FollowUpQuestion { node },
            });
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::OpenLoadPrompt => {
            if state.prompt.is_some() {
                return Vec::new();
            }
            state.prompt = Some(ModalPrompt {
                prompt: "Enter the path to the policy text file:".to_string(),
                buffer: String::new(),
                purpose: PromptPurpose::LoadPolicyFile,
            });
            vec![ExplorerEffect::RequestFrame]
        }
        UserAction::PromptInput(ch) => {
            if let Some(prompt) = state.prompt.as_mut() {
                prompt.buffer.push(ch);
                return vec![ExplorerEffect::RequestFrame];
            }
            Vec::new()
        }
        UserAction::PromptBackspace => {
            if let Some(prompt) = state.prompt.as_mut() {
                prompt.buffer.pop();
                return vec![ExplorerEffect::RequestFrame];
            }
            Vec::new()
        }
        UserAction::PromptPaste(text) => {
            if let Some(prompt) = state.prompt.as_mut() {
                prompt.buffer.push_str(&text);
                return vec![ExplorerEffect::RequestFrame];
            }
            Vec::new()
        }
        UserAction::PromptSubmit => {
            let Some(prompt) = state.prompt.take() else {
                return Vec::new();
            };
            let value = prompt.buffer.trim().to_string();
            if value.is_empty() {
                return vec![ExplorerEffect::RequestFrame];
            }
            match prompt.purpose {
                PromptPurpose::FollowUpQuestion { .. } => {
                    state.flags.jobs_in_flight += 1;
                    push_log(
                        state,
                        LogLevel::Info,
                        LogSource::Gen,
                        "asking a follow-up question".to_string(),
                    );
                    vec![
                        ExplorerEffect::AskQuestion { question: value },
                        ExplorerEffect::RequestFrame,
                    ]
                }
                PromptPurpose::LoadPolicyFile => begin_file_read(state, PathBuf::from(value)),
            }
        }
        UserAction::CopySelected => {
            let text = match state.tree.node(state.cursor) {
                Some(node) => node.full_text.clone(),
                None => return Vec::new(),
            };
            push_log(
                state,
                LogLevel::Info,
                LogSource::Shell,
                "copied effect text to clipboard".to_string(),
            );
            vec![
                ExplorerEffect::CopyToClipboard(text),
                ExplorerEffect::RequestFrame,
            ]
        }
    }
}

fn reduce_runtime(state: &mut ExplorerState, action: RuntimeAction) -> Vec<ExplorerEffect> {
    match action {
        RuntimeAction::LoadPolicyFile { path } => begin_file_read(state, path),
        RuntimeAction::PolicyFileLoaded { text } => {
            state.flags.jobs_in_flight = state.flags.jobs_in_flight.saturating_sub(1);
            let policy = text.trim().to_string();
            if policy.is_empty() {
                push_log(
                    state,
                    LogLevel::Warn,
                    LogSource::Io,
                    "policy file was empty; nothing to explore".to_string(),
                );
                return vec![ExplorerEffect::RequestFrame];
            }
            if state.flags.root_generating {
                push_log(
                    state,
                    LogLevel::Warn,
                    LogSource::Shell,
                    "a policy is already being explored; file contents ignored".to_string(),
                );
                return vec![ExplorerEffect::RequestFrame];
            }
            push_log(
                state,
                LogLevel::Info,
                LogSource::Io,
                format!("loaded policy text ({} chars)", policy.chars().count()),
            );
            begin_root_generation(state, policy)
        }
        RuntimeAction::FileReadFailed { path, error } => {
            state.flags.jobs_in_flight = state.flags.jobs_in_flight.saturating_sub(1);
            state.answer.visible = true;
            state.answer.text = format!("Error reading file: {error}");
            push_log(
                state,
                LogLevel::Error,
                LogSource::Io,
                format!("failed to read {}: {error}", path.display()),
            );
            vec![ExplorerEffect::RequestFrame]
        }
        RuntimeAction::EffectsGenerated {
            target: GenTarget::Root,
            titles,
            ..
        } => {
            state.flags.jobs_in_flight = state.flags.jobs_in_flight.saturating_sub(1);
            if !state.flags.root_generating {
                push_log(
                    state,
                    LogLevel::Warn,
                    LogSource::Gen,
                    "dropping a root completion that was never requested".to_string(),
                );
                return vec![ExplorerEffect::RequestFrame];
            }
            state.flags.root_generating = false;
            state.tree.set_root_effects(&titles);
            state.cursor = ROOT_NODE;
            state.focus = Focus::Tree;
            push_log(
                state,
                LogLevel::Info,
                LogSource::Gen,
                format!("loaded {} first-order effects", titles.len()),
            );
            vec![ExplorerEffect::RequestFrame]
        }
        RuntimeAction::EffectsGenerated {
            target: GenTarget::Node(id),
            order,
            epoch,
            titles,
        } => {
            state.flags.jobs_in_flight = state.flags.jobs_in_flight.saturating_sub(1);
            if epoch != state.tree.epoch() {
                push_log(
                    state,
                    LogLevel::Warn,
                    LogSource::Gen,
                    "discarding an expansion that targeted a replaced tree".to_string(),
                );
                return vec![ExplorerEffect::RequestFrame];
            }
            let appended = state.tree.append_children(id, &titles, order);
            state.tree.mark_expanded(id);
            push_log(
                state,
                LogLevel::Info,
                LogSource::Gen,
                format!("attached {appended} order-{order} effects"),
            );
            vec![ExplorerEffect::RequestFrame]
        }
        RuntimeAction::AnswerReady { text } => {
            state.flags.jobs_in_flight = state.flags.jobs_in_flight.saturating_sub(1);
            state.answer.visible = true;
            state.answer.text = text;
            push_log(
                state,
                LogLevel::Info,
                LogSource::Gen,
                "answer received".to_string(),
            );
            vec![ExplorerEffect::RequestFrame]
        }
    }
}

fn begin_root_generation(state: &mut ExplorerState, policy: String) -> Vec<ExplorerEffect> {
    state.flags.root_generating = true;
    state.flags.jobs_in_flight += 1;
    let epoch = state.tree.epoch();
    push_log(
        state,
        LogLevel::Info,
        LogSource::Gen,
        format!(
            "requesting first-order effects for policy ({} chars)",
            policy.chars().count()
        ),
    );
    vec![
        ExplorerEffect::GenerateEffects {
            source: policy,
            order: 1,
            target: GenTarget::Root,
            epoch,
        },
        ExplorerEffect::RequestFrame,
    ]
}

fn begin_file_read(state: &mut ExplorerState, path: PathBuf) -> Vec<ExplorerEffect> {
    state.flags.jobs_in_flight += 1;
    push_log(
        state,
        LogLevel::Info,
        LogSource::Io,
        format!("reading policy file {}", path.display()),
    );
    vec![
        ExplorerEffect::ReadPolicyFile { path },
        ExplorerEffect::RequestFrame,
    ]
}

fn push_log(state: &mut ExplorerState, level: LogLevel, source: LogSource, message: String) {
    state.logs.append(LogEntry {
        seq: 0,
        level,
        ts_ms: 0,
        source,
        message,
    });
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 48;
    if text.chars().count() <= MAX_CHARS {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(MAX_CHARS).collect();
    shortened.push_str("...");
    shortened
}

#[cfg(test)]
mod tests;
