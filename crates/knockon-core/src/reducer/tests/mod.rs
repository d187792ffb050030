pub(super) use super::reduce;
pub(super) use super::ExplorerEffect;
pub(super) use crate::actions::ExplorerAction;
pub(super) use crate::actions::GenTarget;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::Config;
pub(super) use crate::state::color_for_order;
pub(super) use crate::state::EffectColor;
pub(super) use crate::state::ExpansionState;
pub(super) use crate::state::ExplorerState;
pub(super) use crate::state::Focus;
pub(super) use crate::state::LogBuffer;
pub(super) use crate::state::LogEntry;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::LogSource;
pub(super) use crate::state::NodeId;
pub(super) use crate::state::PromptPurpose;
pub(super) use crate::state::RowKind;
pub(super) use crate::state::ROOT_NODE;

mod expansion;
mod file_load;

pub(super) fn state() -> ExplorerState {
    ExplorerState::new(Config::default())
}

pub(super) fn titles(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

pub(super) fn run_user(state: &mut ExplorerState, action: UserAction) -> Vec<ExplorerEffect> {
    reduce(state, ExplorerAction::User(action))
}

pub(super) fn run_runtime(state: &mut ExplorerState, action: RuntimeAction) -> Vec<ExplorerEffect> {
    reduce(state, ExplorerAction::Runtime(action))
}

pub(super) fn submit_policy(state: &mut ExplorerState, policy: &str) -> Vec<ExplorerEffect> {
    for ch in policy.chars() {
        run_user(state, UserAction::PolicyInput(ch));
    }
    run_user(state, UserAction::PolicySubmit)
}

pub(super) fn complete_root(state: &mut ExplorerState, items: &[&str]) -> Vec<ExplorerEffect> {
    let epoch = state.tree.epoch();
    run_runtime(
        state,
        RuntimeAction::EffectsGenerated {
            target: GenTarget::Root,
            order: 1,
            epoch,
            titles: titles(items),
        },
    )
}

pub(super) fn complete_node(
    state: &mut ExplorerState,
    id: NodeId,
    order: u32,
    epoch: u64,
    items: &[&str],
) -> Vec<ExplorerEffect> {
    run_runtime(
        state,
        RuntimeAction::EffectsGenerated {
            target: GenTarget::Node(id),
            order,
            epoch,
            titles: titles(items),
        },
    )
}

pub(super) fn loaded_state(policy: &str, items: &[&str]) -> ExplorerState {
    let mut st = state();
    submit_policy(&mut st, policy);
    complete_root(&mut st, items);
    st
}

pub(super) fn root_child(state: &ExplorerState, idx: usize) -> NodeId {
    state.tree.root().children[idx]
}

pub(super) fn generation_requests(effects: &[ExplorerEffect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, ExplorerEffect::GenerateEffects { .. }))
        .count()
}
