use super::*;
use pretty_assertions::assert_eq;

#[test]
fn submitting_a_policy_requests_first_order_effects() {
    let mut state = state();

    let effects = submit_policy(&mut state, "ban combustion cars");

    assert_eq!(
        effects,
        vec![
            ExplorerEffect::GenerateEffects {
                source: "ban combustion cars".to_string(),
                order: 1,
                target: GenTarget::Root,
                epoch: 0,
            },
            ExplorerEffect::RequestFrame,
        ]
    );
    assert!(state.flags.root_generating);
    assert_eq!(state.flags.jobs_in_flight, 1);
    assert_eq!(state.policy_input.buffer, "");
}

#[test]
fn whitespace_only_policy_submission_is_ignored() {
    let mut state = state();

    let effects = submit_policy(&mut state, "   ");

    assert_eq!(effects, Vec::new());
    assert!(!state.flags.root_generating);
    assert_eq!(state.flags.jobs_in_flight, 0);
}

#[test]
fn second_submission_while_generating_is_ignored() {
    let mut state = state();
    submit_policy(&mut state, "first policy");

    let effects = submit_policy(&mut state, "second policy");

    assert_eq!(generation_requests(&effects), 0);
    assert_eq!(state.flags.jobs_in_flight, 1);
}

#[test]
fn root_completion_populates_and_focuses_the_tree() {
    let state = loaded_state("policy", &["effect a", "effect b", "effect c"]);

    assert_eq!(state.tree.root().children.len(), 3);
    assert_eq!(state.cursor, ROOT_NODE);
    assert_eq!(state.focus, Focus::Tree);
    assert!(!state.flags.root_generating);
    assert_eq!(state.flags.jobs_in_flight, 0);

    let first = state.tree.node(root_child(&state, 0)).unwrap();
    assert_eq!(first.full_text, "effect a");
    assert_eq!(first.order, 1);
    assert_eq!(first.expansion, ExpansionState::Collapsed);
}

#[test]
fn expanding_a_collapsed_node_requests_the_next_order() {
    let mut state = loaded_state("policy", &["effect a", "effect b"]);
    let id = root_child(&state, 0);
    state.cursor = id;

    let effects = run_user(&mut state, UserAction::ExpandSelected);

    assert_eq!(
        effects,
        vec![
            ExplorerEffect::GenerateEffects {
                source: "effect a".to_string(),
                order: 2,
                target: GenTarget::Node(id),
                epoch: 1,
            },
            ExplorerEffect::RequestFrame,
        ]
    );
    assert_eq!(
        state.tree.node(id).unwrap().expansion,
        ExpansionState::Requesting
    );
    assert_eq!(state.flags.jobs_in_flight, 1);
}

#[test]
fn expanding_a_node_with_a_request_in_flight_is_a_no_op() {
    let mut state = loaded_state("policy", &["effect a"]);
    state.cursor = root_child(&state, 0);
    run_user(&mut state, UserAction::ExpandSelected);

    let effects = run_user(&mut state, UserAction::ExpandSelected);

    assert_eq!(effects, Vec::new());
    assert_eq!(state.flags.jobs_in_flight, 1);
}

#[test]
fn node_completion_attaches_children_exactly_once() {
    let mut state = loaded_state("policy", &["effect a"]);
    let id = root_child(&state, 0);
    state.cursor = id;
    run_user(&mut state, UserAction::ExpandSelected);

    complete_node(&mut state, id, 2, 1, &["second-order x", "second-order y"]);

    let node = state.tree.node(id).unwrap();
    assert_eq!(node.expansion, ExpansionState::Expanded);
    assert_eq!(node.children.len(), 2);

    let effects = run_user(&mut state, UserAction::ExpandSelected);
    assert_eq!(effects, Vec::new());

    complete_node(&mut state, id, 2, 1, &["stray"]);
    assert_eq!(state.tree.node(id).unwrap().children.len(), 2);
}

#[test]
fn represented_error_title_becomes_a_regular_child() {
    let mut state = loaded_state("policy", &["effect a"]);
    let id = root_child(&state, 0);
    state.cursor = id;
    run_user(&mut state, UserAction::ExpandSelected);

    complete_node(
        &mut state,
        id,
        2,
        1,
        &["Error fetching effects: connection refused"],
    );

    let node = state.tree.node(id).unwrap();
    assert_eq!(node.expansion, ExpansionState::Expanded);
    assert_eq!(node.children.len(), 1);

    let child = state.tree.node(node.children[0]).unwrap();
    assert_eq!(child.full_text, "Error fetching effects: connection refused");
    assert_eq!(child.expansion, ExpansionState::Collapsed);
}

#[test]
fn expanding_the_root_is_a_no_op() {
    let mut state = loaded_state("policy", &["effect a"]);
    state.cursor = ROOT_NODE;

    let effects = run_user(&mut state, UserAction::ExpandSelected);

    assert_eq!(effects, Vec::new());
    assert_eq!(state.tree.node_count(), 2);
}

#[test]
fn two_nodes_can_have_requests_in_flight_at_once() {
    let mut state = loaded_state("policy", &["effect a", "effect b"]);
    let first = root_child(&state, 0);
    let second = root_child(&state, 1);

    state.cursor = first;
    let effects_a = run_user(&mut state, UserAction::ExpandSelected);
    state.cursor = second;
    let effects_b = run_user(&mut state, UserAction::ExpandSelected);

    assert_eq!(generation_requests(&effects_a), 1);
    assert_eq!(generation_requests(&effects_b), 1);
    assert_eq!(state.flags.jobs_in_flight, 2);

    complete_node(&mut state, second, 2, 1, &["b child"]);
    complete_node(&mut state, first, 2, 1, &["a child"]);

    assert_eq!(state.flags.jobs_in_flight, 0);
    assert_eq!(state.tree.node(first).unwrap().children.len(), 1);
    assert_eq!(state.tree.node(second).unwrap().children.len(), 1);
}
