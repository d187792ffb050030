use super::*;
use pretty_assertions::assert_eq;

#[test]
fn loaded_file_text_is_submitted_as_the_policy() {
    let mut state = state();

    let effects = run_runtime(
        &mut state,
        RuntimeAction::LoadPolicyFile {
            path: "/tmp/policy.txt".into(),
        },
    );
    assert!(effects.contains(&ExplorerEffect::ReadPolicyFile {
        path: "/tmp/policy.txt".into(),
    }));
    assert_eq!(state.flags.jobs_in_flight, 1);

    let effects = run_runtime(
        &mut state,
        RuntimeAction::PolicyFileLoaded {
            text: "subsidize heat pumps\n".to_string(),
        },
    );

    assert_eq!(generation_requests(&effects), 1);
    assert!(effects.contains(&ExplorerEffect::GenerateEffects {
        source: "subsidize heat pumps".to_string(),
        order: 1,
        target: GenTarget::Root,
        epoch: 0,
    }));
    assert!(state.flags.root_generating);
    assert_eq!(state.flags.jobs_in_flight, 1);
}

#[test]
fn file_read_failure_surfaces_in_the_answer_panel() {
    let mut state = loaded_state("policy", &["effect a"]);

    run_runtime(
        &mut state,
        RuntimeAction::LoadPolicyFile {
            path: "/missing.txt".into(),
        },
    );
    let effects = run_runtime(
        &mut state,
        RuntimeAction::FileReadFailed {
            path: "/missing.txt".into(),
            error: "No such file or directory (os error 2)".to_string(),
        },
    );

    assert_eq!(effects, vec![ExplorerEffect::RequestFrame]);
    assert!(state.answer.visible);
    assert_eq!(
        state.answer.text,
        "Error reading file: No such file or directory (os error 2)"
    );
    assert_eq!(state.tree.node_count(), 2);
    assert_eq!(state.flags.jobs_in_flight, 0);
}

#[test]
fn an_empty_file_does_not_start_generation() {
    let mut state = state();
    run_runtime(
        &mut state,
        RuntimeAction::LoadPolicyFile {
            path: "/tmp/empty.txt".into(),
        },
    );

    let effects = run_runtime(
        &mut state,
        RuntimeAction::PolicyFileLoaded {
            text: "  \n".to_string(),
        },
    );

    assert_eq!(generation_requests(&effects), 0);
    assert!(!state.flags.root_generating);
    assert_eq!(state.flags.jobs_in_flight, 0);
}

#[test]
fn a_file_arriving_mid_generation_is_dropped() {
    let mut state = state();
    submit_policy(&mut state, "typed policy");
    run_runtime(
        &mut state,
        RuntimeAction::LoadPolicyFile {
            path: "/tmp/policy.txt".into(),
        },
    );

    let effects = run_runtime(
        &mut state,
        RuntimeAction::PolicyFileLoaded {
            text: "file policy".to_string(),
        },
    );

    assert_eq!(generation_requests(&effects), 0);
    assert!(state.flags.root_generating);
    assert_eq!(state.flags.jobs_in_flight, 1);

    complete_root(&mut state, &["typed a"]);
    assert_eq!(
        state
            .tree
            .node(root_child(&state, 0))
            .unwrap()
            .full_text,
        "typed a"
    );
}
