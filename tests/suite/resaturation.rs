//! Re-saturation after rule chains change

use std::sync::Arc;

use saturate_types::OntologyGraph;

use crate::common::{new_state, saturate, saturate_state, told_chain};

#[test]
fn added_axiom_reaches_invalidated_roots() {
    let (graph, [a, b, c]) = told_chain();
    let state = new_state(graph.clone());
    let first = saturate_state(Arc::clone(&state), &[a, b, c], 2);
    assert_eq!(first.subsumers(a), vec![a, b, c]);

    let mut edited = graph;
    let d = edited.class("D");
    edited.subclass_of(b, d).unwrap();
    // `b` changed; `a` depends on it through its subsumers.
    let next = Arc::new(state.resubmission_state(Arc::new(edited), [a, b]));
    let second = saturate_state(Arc::clone(&next), &[a, b, c], 2);

    assert_eq!(second.subsumers(a), vec![a, b, c, d]);
    assert_eq!(second.subsumers(b), vec![b, c, d]);
    assert_eq!(second.statistics.jobs_already_done(), 1);
    assert_eq!(second.statistics.jobs_processed(), 2);
    assert!(Arc::ptr_eq(
        &state.context(c).unwrap(),
        &next.context(c).unwrap()
    ));
    // The old state is untouched.
    assert_eq!(state.context(a).unwrap().subsumers(), vec![a, b, c]);
}

#[test]
fn removed_axiom_shrinks_closure() {
    let (graph, [a, b, c]) = told_chain();
    let state = new_state(graph.clone());
    saturate_state(Arc::clone(&state), &[a, b], 1);

    let mut edited = graph;
    edited.remove_subclass_of(b, c).unwrap();
    let next = Arc::new(state.resubmission_state(Arc::new(edited), [a, b]));
    let second = saturate_state(next, &[a, b], 1);

    assert_eq!(second.subsumers(a), vec![a, b]);
    assert_eq!(second.subsumers(b), vec![b]);
}

#[test]
fn invalidated_root_gets_propagations_from_carried_filler() {
    // A ⊑ ∃r.B, B ⊑ C, ∃r.C ⊑ D
    let mut graph = OntologyGraph::new();
    let a = graph.class("A");
    let b = graph.class("B");
    let c = graph.class("C");
    let d = graph.class("D");
    let r = graph.property("r");
    let rb = graph.existential(r, b).unwrap();
    let rc = graph.existential(r, c).unwrap();
    graph.subclass_of(a, rb).unwrap();
    graph.subclass_of(b, c).unwrap();
    graph.subclass_of(rc, d).unwrap();
    let state = new_state(graph.clone());
    let first = saturate_state(Arc::clone(&state), &[a, b], 2);
    assert!(first.subsumers(a).contains(&d));

    let mut edited = graph;
    let x = edited.class("X");
    edited.subclass_of(a, x).unwrap();
    let fresh = saturate(edited.clone(), &[a, b], 2);
    let next = Arc::new(state.resubmission_state(Arc::new(edited), [a]));
    let second = saturate_state(next, &[a, b], 2);

    assert_eq!(second.subsumers(a), fresh.subsumers(a));
    assert_eq!(second.subsumers(a), vec![a, d, rb, rc, x]);
    assert_eq!(second.statistics.jobs_already_done(), 1);
    assert_eq!(
        second.state.context(b).unwrap().backward_links(),
        vec![(r, a)]
    );
}
