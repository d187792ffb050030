#![allow(dead_code)]

use std::collections::VecDeque;

use crate::config::Config;
use crate::wrap::{wrap_title, DISPLAY_COLUMNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub usize);

pub const ROOT_NODE: NodeId = NodeId(0);
pub const ROOT_LABEL: &str = "Effects";
pub const ROOT_FULL_TEXT: &str = "Root";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    Collapsed,
    Requesting,
    Expanded,
}

impl ExpansionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Collapsed => "collapsed",
            Self::Requesting => "requesting",
            Self::Expanded => "expanded",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EffectNode {
    pub parent: Option<NodeId>,
    pub order: u32,
    pub full_text: String,
    pub label_lines: Vec<String>,
    pub expansion: ExpansionState,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Primary,
    Continuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: NodeId,
    pub order: u32,
    pub kind: RowKind,
    pub expansion: ExpansionState,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct EffectTree {
    nodes: Vec<EffectNode>,
    epoch: u64,
}

impl Default for EffectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![EffectNode {
                parent: None,
                order: 0,
                full_text: ROOT_FULL_TEXT.to_string(),
                label_lines: vec![ROOT_LABEL.to_string()],
                expansion: ExpansionState::Expanded,
                children: Vec::new(),
            }],
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn node(&self, id: NodeId) -> Option<&EffectNode> {
        self.nodes.get(id.0)
    }

    pub fn root(&self) -> &EffectNode {
        &self.nodes[ROOT_NODE.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A node that has already completed an expansion keeps its children;
    /// further appends under it are no-ops.
    pub fn append_children(&mut self, parent: NodeId, titles: &[String], order: u32) -> usize {
        let accepts = match self.nodes.get(parent.0) {
            Some(node) => node.children.is_empty() || node.expansion != ExpansionState::Expanded,
            None => false,
        };
        if !accepts {
            return 0;
        }

        let mut appended = 0;
        for title in titles {
            let id = NodeId(self.nodes.len());
            self.nodes.push(EffectNode {
                parent: Some(parent),
                order,
                full_text: title.clone(),
                label_lines: wrap_title(title, DISPLAY_COLUMNS),
                expansion: ExpansionState::Collapsed,
                children: Vec::new(),
            });
            self.nodes[parent.0].children.push(id);
            appended += 1;
        }
        appended
    }

    /// Replaces the whole tree below the root and advances the epoch, so
    /// completions dispatched against the previous tree can be recognized
    /// and discarded.
    pub fn set_root_effects(&mut self, titles: &[String]) {
        self.nodes.truncate(1);
        self.nodes[ROOT_NODE.0].children.clear();
        self.epoch += 1;
        self.append_children(ROOT_NODE, titles, 1);
    }

    pub fn mark_requested(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) if node.expansion == ExpansionState::Collapsed => {
                node.expansion = ExpansionState::Requesting;
                true
            }
            _ => false,
        }
    }

    pub fn mark_expanded(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.expansion = ExpansionState::Expanded;
        }
    }

    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        self.push_rows(ROOT_NODE, &mut rows);
        rows
    }

    fn push_rows(&self, id: NodeId, rows: &mut Vec<TreeRow>) {
        let node = &self.nodes[id.0];
        for (idx, line) in node.label_lines.iter().enumerate() {
            rows.push(TreeRow {
                id,
                order: node.order,
                kind: if idx == 0 {
                    RowKind::Primary
                } else {
                    RowKind::Continuation
                },
                expansion: node.expansion,
                text: line.clone(),
            });
        }
        for child in &node.children {
            self.push_rows(*child, rows);
        }
    }

    pub fn selectable_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        self.push_ids(ROOT_NODE, &mut ids);
        ids
    }

    fn push_ids(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in &self.nodes[id.0].children {
            self.push_ids(*child, out);
        }
    }

    pub fn next_selectable(&self, current: NodeId) -> NodeId {
        let ids = self.selectable_ids();
        match ids.iter().position(|id| *id == current) {
            Some(idx) if idx + 1 < ids.len() => ids[idx + 1],
            Some(idx) => ids[idx],
            None => ROOT_NODE,
        }
    }

    pub fn prev_selectable(&self, current: NodeId) -> NodeId {
        let ids = self.selectable_ids();
        match ids.iter().position(|id| *id == current) {
            Some(idx) if idx > 0 => ids[idx - 1],
            Some(idx) => ids[idx],
            None => ROOT_NODE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectColor {
    Green,
    Yellow,
    Cyan,
    Magenta,
    Blue,
}

impl EffectColor {
    pub fn label(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::Blue => "blue",
        }
    }
}

pub const EFFECT_PALETTE: [EffectColor; 5] = [
    EffectColor::Green,
    EffectColor::Yellow,
    EffectColor::Cyan,
    EffectColor::Magenta,
    EffectColor::Blue,
];

pub fn color_for_order(order: u32) -> EffectColor {
    EFFECT_PALETTE[order as usize % EFFECT_PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    PolicyInput,
    Tree,
}

impl Focus {
    pub fn label(self) -> &'static str {
        match self {
            Self::PolicyInput => "policy",
            Self::Tree => "tree",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolicyInput {
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPurpose {
    FollowUpQuestion { node: NodeId },
    LoadPolicyFile,
}

#[derive(Debug, Clone)]
pub struct ModalPrompt {
    pub prompt: String,
    pub buffer: String,
    pub purpose: PromptPurpose,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerPanel {
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeFlags {
    pub root_generating: bool,
    pub jobs_in_flight: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Shell,
    Gen,
    Io,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Gen => "gen",
            Self::Io => "io",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: i64,
    pub source: LogSource,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        entry.ts_ms = chrono::Utc::now().timestamp_millis();
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.buf.back()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExplorerState {
    pub tree: EffectTree,
    pub cursor: NodeId,
    pub focus: Focus,
    pub policy_input: PolicyInput,
    pub prompt: Option<ModalPrompt>,
    pub answer: AnswerPanel,
    pub flags: RuntimeFlags,
    pub logs: LogBuffer,
    pub config: Config,
}

impl ExplorerState {
    pub fn new(config: Config) -> Self {
        Self {
            tree: EffectTree::new(),
            cursor: ROOT_NODE,
            focus: Focus::PolicyInput,
            policy_input: PolicyInput::default(),
            prompt: None,
            answer: AnswerPanel::default(),
            flags: RuntimeFlags::default(),
            logs: LogBuffer::new(500),
            config,
        }
    }

    pub fn selected_node(&self) -> Option<&EffectNode> {
        self.tree.node(self.cursor)
    }
}
