#![allow(dead_code)]

use std::path::PathBuf;

use super::state::NodeId;

#[derive(Debug, Clone)]
pub enum ExplorerAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    FocusPolicyInput,
    FocusTree,
    PolicyInput(char),
    PolicyBackspace,
    PolicyPaste(String),
    PolicySubmit,
    CursorUp,
    CursorDown,
    ExpandSelected,
    OpenQuestionPrompt,
    OpenLoadPrompt,
    PromptInput(char),
    PromptBackspace,
    PromptPaste(String),
    PromptSubmit,
    CopySelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenTarget {
    Root,
    Node(NodeId),
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    LoadPolicyFile {
        path: PathBuf,
    },
    PolicyFileLoaded {
        text: String,
    },
    FileReadFailed {
        path: PathBuf,
        error: String,
    },
    EffectsGenerated {
        target: GenTarget,
        order: u32,
        epoch: u64,
        titles: Vec<String>,
    },
    AnswerReady {
        text: String,
    },
}
