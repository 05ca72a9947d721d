use feedscrape_core::{update, Msg, RunState};

#[test]
fn update_is_noop() {
    let state = RunState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn mutations_while_idle_do_nothing() {
    let state = RunState::new();
    let (next, effects) = update(state.clone(), Msg::MutationsObserved { added_nodes: 4 });

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
