//! End-to-end saturation of small ontologies

use saturate_types::OntologyGraph;

use crate::common::{disjoint_root, parts_ontology, saturate, told_chain};

#[test]
fn told_chain_with_one_worker() {
    let (graph, [a, b, c]) = told_chain();
    let run = saturate(graph, &[a], 1);
    assert_eq!(run.subsumers(a), vec![a, b, c]);
    assert!(run.jobs[0].output().unwrap().is_saturated());
}

#[test]
fn told_chain_with_four_workers() {
    let (graph, [a, b, c]) = told_chain();
    let run = saturate(graph, &[a], 4);
    assert_eq!(run.subsumers(a), vec![a, b, c]);
    assert_eq!(run.notified, vec![0]);
}

#[test]
fn disjoint_subsumers_are_a_contradiction() {
    let (graph, root) = disjoint_root();
    let run = saturate(graph, &[root], 2);
    let context = run.jobs[0].output().unwrap();
    assert!(context.is_saturated());
    assert!(context.is_inconsistent());
}

#[test]
fn class_listed_twice_in_disjointness_is_unsatisfiable() {
    let mut graph = OntologyGraph::new();
    let a = graph.class("A");
    let b = graph.class("B");
    let sub = graph.class("Sub");
    graph.disjoint_classes(&[a, a, b]).unwrap();
    graph.subclass_of(sub, a).unwrap();

    let run = saturate(graph, &[sub, a, b], 2);
    assert!(run.is_inconsistent(sub));
    assert!(run.is_inconsistent(a));
    assert!(!run.is_inconsistent(b));
}

#[test]
fn contradiction_reaches_linking_contexts() {
    let mut graph = OntologyGraph::new();
    let a = graph.class("A");
    let b = graph.class("B");
    let c = graph.class("C");
    let r = graph.property("r");
    let bottom = graph.bottom();
    let some_b = graph.existential(r, b).unwrap();
    let some_a = graph.existential(r, a).unwrap();
    graph.subclass_of(b, bottom).unwrap();
    graph.subclass_of(a, some_b).unwrap();
    graph.subclass_of(c, some_a).unwrap();

    let run = saturate(graph, &[c], 3);
    assert!(run.is_inconsistent(b));
    assert!(run.is_inconsistent(a));
    assert!(run.is_inconsistent(c));
}

#[test]
fn propagation_follows_sub_properties() {
    let mut graph = OntologyGraph::new();
    let a = graph.class("A");
    let b = graph.class("B");
    let d = graph.class("D");
    let part = graph.property("hasPart");
    let component = graph.property("hasComponent");
    graph.sub_property_of(component, part).unwrap();
    let component_b = graph.existential(component, b).unwrap();
    let part_b = graph.existential(part, b).unwrap();
    graph.subclass_of(a, component_b).unwrap();
    graph.subclass_of(part_b, d).unwrap();

    let run = saturate(graph, &[a], 2);
    assert_eq!(run.subsumers(a), vec![a, d, component_b, part_b]);
}

#[test]
fn thing_is_derived_when_it_has_rules() {
    let mut graph = OntologyGraph::new();
    let a = graph.class("A");
    let universal = graph.class("Universal");
    let top = graph.top();
    graph.subclass_of(top, universal).unwrap();

    let run = saturate(graph, &[a], 1);
    assert_eq!(run.subsumers(a), vec![top, a, universal]);
}

#[test]
fn rendered_subsumers() {
    let (graph, a) = parts_ontology();
    let rendering = graph.clone();
    let run = saturate(graph, &[a], 2);
    let rendered: Vec<String> = run
        .subsumers(a)
        .into_iter()
        .map(|node| rendering.display(node))
        .collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    A
    D
    E
    ObjectSomeValuesFrom(hasPart B)
    ObjectSomeValuesFrom(hasPart C)
    ObjectIntersectionOf(A D)
    ");
}
