use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;

use knockon_core::actions::{ExplorerAction, RuntimeAction, UserAction};
use knockon_core::reducer::{reduce, ExplorerEffect};
use knockon_core::state::{
    color_for_order, EffectColor, ExpansionState, ExplorerState, Focus, LogLevel, PromptPurpose,
    RowKind, TreeRow,
};
use knockon_gen::generator::TextGenerator;
use knockon_gen::groq::DEFAULT_MODEL;

use crate::pool::{Job, UiEvent, WorkerPool};

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            crossterm::cursor::Show
        );
    }
}

pub fn run(
    mut state: ExplorerState,
    generator: Arc<dyn TextGenerator>,
    startup_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        crossterm::cursor::Hide
    )?;
    let _guard = TuiGuard; // Ensures terminal is restored on exit or panic

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut state, generator, startup_file).map_err(|e| e.into())
}

enum KeyHandlerResult {
    Continue(Vec<ExplorerEffect>),
    Exit,
}

fn handle_key_event(key: KeyEvent, state: &mut ExplorerState) -> KeyHandlerResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }

    // An open prompt captures every key until it is submitted.
    if state.prompt.is_some() {
        return KeyHandlerResult::Continue(handle_prompt_keys(key, state));
    }

    match state.focus {
        Focus::PolicyInput => handle_policy_keys(key, state),
        Focus::Tree => handle_tree_keys(key, state),
    }
}

fn handle_prompt_keys(key: KeyEvent, state: &mut ExplorerState) -> Vec<ExplorerEffect> {
    let action = match key.code {
        KeyCode::Enter => UserAction::PromptSubmit,
        KeyCode::Backspace => UserAction::PromptBackspace,
        KeyCode::Char(ch) => UserAction::PromptInput(ch),
        _ => return Vec::new(),
    };
    reduce(state, ExplorerAction::User(action))
}

fn handle_policy_keys(key: KeyEvent, state: &mut ExplorerState) -> KeyHandlerResult {
    let action = match key.code {
        KeyCode::Enter => UserAction::PolicySubmit,
        KeyCode::Backspace => UserAction::PolicyBackspace,
        KeyCode::Tab | KeyCode::Down | KeyCode::Esc => UserAction::FocusTree,
        KeyCode::Char(ch) => UserAction::PolicyInput(ch),
        _ => return KeyHandlerResult::Continue(Vec::new()),
    };
    KeyHandlerResult::Continue(reduce(state, ExplorerAction::User(action)))
}

fn handle_tree_keys(key: KeyEvent, state: &mut ExplorerState) -> KeyHandlerResult {
    let action = match key.code {
        KeyCode::Char('q') => return KeyHandlerResult::Exit,
        KeyCode::Char('i') | KeyCode::Tab => UserAction::FocusPolicyInput,
        KeyCode::Up => UserAction::CursorUp,
        KeyCode::Down => UserAction::CursorDown,
        KeyCode::Enter => UserAction::ExpandSelected,
        KeyCode::Char('a') => UserAction::OpenQuestionPrompt,
        KeyCode::Char('l') => UserAction::OpenLoadPrompt,
        KeyCode::Char('y') => UserAction::CopySelected,
        _ => return KeyHandlerResult::Continue(Vec::new()),
    };
    KeyHandlerResult::Continue(reduce(state, ExplorerAction::User(action)))
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ExplorerState,
    generator: Arc<dyn TextGenerator>,
    startup_file: Option<PathBuf>,
) -> io::Result<()> {
    let (events_tx, events_rx) = mpsc::channel();
    let pool = WorkerPool::start(generator, events_tx);

    if let Some(path) = startup_file {
        let effects = reduce(
            state,
            ExplorerAction::Runtime(RuntimeAction::LoadPolicyFile { path }),
        );
        run_effects(&pool, effects);
    }

    loop {
        // Apply completions from the worker pool.
        while let Ok(event) = events_rx.try_recv() {
            let action = match event {
                UiEvent::EffectsReady {
                    target,
                    order,
                    epoch,
                    titles,
                } => RuntimeAction::EffectsGenerated {
                    target,
                    order,
                    epoch,
                    titles,
                },
                UiEvent::AnswerReady { text } => RuntimeAction::AnswerReady { text },
                UiEvent::FileLoaded { text } => RuntimeAction::PolicyFileLoaded { text },
                UiEvent::FileFailed { path, error } => {
                    RuntimeAction::FileReadFailed { path, error }
                }
            };
            let effects = reduce(state, ExplorerAction::Runtime(action));
            run_effects(&pool, effects);
        }

        terminal.draw(|f| ui(f, state))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => match handle_key_event(key, state) {
                    KeyHandlerResult::Continue(effects) => run_effects(&pool, effects),
                    KeyHandlerResult::Exit => return Ok(()),
                },
                Event::Paste(text) => {
                    let action = if state.prompt.is_some() {
                        Some(UserAction::PromptPaste(text))
                    } else if state.focus == Focus::PolicyInput {
                        Some(UserAction::PolicyPaste(text))
                    } else {
                        None
                    };
                    if let Some(action) = action {
                        let effects = reduce(state, ExplorerAction::User(action));
                        run_effects(&pool, effects);
                    }
                }
                _ => {}
            }
        }
    }
}

fn run_effects(pool: &WorkerPool, effects: Vec<ExplorerEffect>) {
    for effect in effects {
        match effect {
            // The loop redraws on every pass; nothing to schedule.
            ExplorerEffect::RequestFrame => {}
            ExplorerEffect::GenerateEffects {
                source,
                order,
                target,
                epoch,
            } => {
                pool.submit(Job::GenerateEffects {
                    source,
                    order,
                    target,
                    epoch,
                });
            }
            ExplorerEffect::AskQuestion { question } => {
                pool.submit(Job::AskQuestion { question });
            }
            ExplorerEffect::ReadPolicyFile { path } => {
                pool.submit(Job::ReadPolicyFile { path });
            }
            ExplorerEffect::CopyToClipboard(text) => {
                if let Ok(mut clipboard) = arboard::Clipboard::new() {
                    let _ = clipboard.set_text(text);
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    panel_bg: Color,
    selected_bg: Color,
}

fn palette() -> UiPalette {
    UiPalette {
        accent: Color::Cyan,
        success: Color::Green,
        warning: Color::Yellow,
        danger: Color::Red,
        muted: Color::DarkGray,
        border: Color::Gray,
        panel_bg: Color::Black,
        selected_bg: Color::DarkGray,
    }
}

fn effect_color(color: EffectColor) -> Color {
    match color {
        EffectColor::Green => Color::Green,
        EffectColor::Yellow => Color::Yellow,
        EffectColor::Cyan => Color::Cyan,
        EffectColor::Magenta => Color::Magenta,
        EffectColor::Blue => Color::Blue,
    }
}

fn level_color(level: LogLevel, palette: UiPalette) -> Color {
    match level {
        LogLevel::Debug => palette.muted,
        LogLevel::Info => palette.success,
        LogLevel::Warn => palette.warning,
        LogLevel::Error => palette.danger,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn blink_on() -> bool {
    now_ms() / 500 % 2 == 0
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    frames[(now_ms() / 100) as usize % frames.len()]
}

fn ui(f: &mut ratatui::Frame, state: &ExplorerState) {
    let palette = palette();
    let answer_h = if state.answer.visible { 7 } else { 0 };

    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Length(3), // Policy input
        Constraint::Min(0),    // Effect tree
    ];
    if answer_h > 0 {
        constraints.push(Constraint::Length(answer_h)); // Answer
    }
    constraints.push(Constraint::Length(1)); // Footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.area());
    let tree_idx = 2_usize;
    let answer_idx = if answer_h > 0 { Some(3_usize) } else { None };
    let footer_idx = if answer_h > 0 { 4_usize } else { 3_usize };

    // Header
    let model = state.config.model.model.as_deref().unwrap_or(DEFAULT_MODEL);
    let busy = if state.flags.jobs_in_flight > 0 {
        format!("{} {} in flight", get_spinner(), state.flags.jobs_in_flight)
    } else {
        "idle".to_string()
    };
    let header_text = format!("Knockon Explorer | Model:{model} | {busy}");
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(palette.accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    f.render_widget(header, chunks[0]);

    // Policy input
    let policy_focused = state.focus == Focus::PolicyInput && state.prompt.is_none();
    let input_title = if state.flags.root_generating {
        format!("Policy {} (Generating...)", get_spinner())
    } else {
        "Policy (Enter to explore, Tab to switch panes)".to_string()
    };
    let input_border_style = if policy_focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.border)
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .title(input_title)
        .style(Style::default().bg(palette.panel_bg))
        .border_style(input_border_style);
    let input_text = if state.policy_input.buffer.is_empty() {
        if !policy_focused {
            Span::styled(
                "Press Tab to type a policy...",
                Style::default().fg(palette.muted),
            )
        } else if blink_on() {
            Span::styled("▌", Style::default().fg(palette.accent))
        } else {
            Span::raw("")
        }
    } else if policy_focused && blink_on() {
        Span::raw(format!("{}▌", state.policy_input.buffer))
    } else {
        Span::raw(state.policy_input.buffer.as_str())
    };
    let input = Paragraph::new(input_text).block(input_block);
    f.render_widget(input, chunks[1]);

    // Effect tree
    let rows = state.tree.visible_rows();
    let selected_index = rows
        .iter()
        .position(|row| row.id == state.cursor && row.kind == RowKind::Primary);
    let items: Vec<ListItem> = rows.iter().map(|row| ListItem::new(tree_line(row))).collect();
    let tree_border_style = if state.focus == Focus::Tree && state.prompt.is_none() {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.border)
    };
    let tree_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            "Effect Tree ({} effects)",
            state.tree.node_count().saturating_sub(1)
        ))
        .style(Style::default().bg(palette.panel_bg))
        .border_style(tree_border_style);
    let list = List::new(items)
        .block(tree_block)
        .highlight_style(Style::default().bg(palette.selected_bg));
    let mut list_state = ListState::default();
    list_state.select(selected_index);
    f.render_stateful_widget(list, chunks[tree_idx], &mut list_state);

    // Answer
    if let Some(answer_idx) = answer_idx {
        let answer = Paragraph::new(state.answer.text.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Answer")
                    .style(Style::default().bg(palette.panel_bg))
                    .border_style(Style::default().fg(palette.border)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(answer, chunks[answer_idx]);
    }

    // Footer
    let hints = if state.prompt.is_some() {
        "Prompt: type your text, Enter submits (empty input closes)"
    } else if state.focus == Focus::PolicyInput {
        "Policy: type text, Enter explore, Tab tree"
    } else {
        "Tree: Up/Down select, Enter expand, a ask, l load file, y copy, Tab policy, q quit"
    };
    let footer_line = match state.logs.latest() {
        Some(entry) => Line::from(vec![
            Span::styled(hints, Style::default().fg(palette.muted)),
            Span::raw("  |  "),
            Span::styled(
                format!("[{}] {}", entry.source.label(), entry.message),
                Style::default().fg(level_color(entry.level, palette)),
            ),
        ]),
        None => Line::from(Span::styled(hints, Style::default().fg(palette.muted))),
    };
    let footer = Paragraph::new(footer_line);
    f.render_widget(footer, chunks[footer_idx]);

    // Prompt overlay
    if let Some(prompt) = &state.prompt {
        let area = centered_rect(60, 20, f.area());
        f.render_widget(Clear, area);
        let title = match prompt.purpose {
            PromptPurpose::FollowUpQuestion { .. } => "Ask About This Effect",
            PromptPurpose::LoadPolicyFile => "Load Policy File",
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().bg(palette.panel_bg).fg(Color::White))
            .border_style(Style::default().fg(palette.accent));
        let buffer_line = if blink_on() {
            Line::from(format!("{}▌", prompt.buffer))
        } else {
            Line::from(prompt.buffer.clone())
        };
        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                prompt.prompt.clone(),
                Style::default().fg(palette.muted),
            )),
            Line::from(""),
            buffer_line,
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        f.render_widget(body, area);
    }
}

fn tree_line(row: &TreeRow) -> Line<'static> {
    let indent = "  ".repeat(row.order as usize);
    let color = effect_color(color_for_order(row.order));
    if row.kind == RowKind::Continuation {
        return Line::from(vec![
            Span::raw(format!("{indent}  ")),
            Span::styled(row.text.clone(), Style::default().fg(color)),
        ]);
    }
    if row.order == 0 {
        return Line::from(Span::styled(
            row.text.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    let marker = match row.expansion {
        ExpansionState::Collapsed => "• ".to_string(),
        ExpansionState::Requesting => format!("{} ", get_spinner()),
        ExpansionState::Expanded => "▾ ".to_string(),
    };
    Line::from(vec![
        Span::raw(indent),
        Span::styled(marker, Style::default().fg(color)),
        Span::styled(row.text.clone(), Style::default().fg(color)),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
