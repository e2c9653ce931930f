//! Worker count never changes the closure

use proptest::prelude::*;
use saturate_types::{NodeId, OntologyGraph};

use crate::common::saturate;

const CLASSES: usize = 8;
const PROPERTIES: usize = 2;

#[derive(Debug, Clone)]
enum Axiom {
    SubClass(usize, usize),
    SubSome(usize, usize, usize),
    SomeSub(usize, usize, usize),
    AndSub(usize, usize, usize),
    Disjoint(usize, usize),
    SubProperty(usize, usize),
    Unsatisfiable(usize),
}

fn axiom() -> impl Strategy<Value = Axiom> {
    let class = 0..CLASSES;
    let property = 0..PROPERTIES;
    prop_oneof![
        4 => (class.clone(), class.clone()).prop_map(|(a, b)| Axiom::SubClass(a, b)),
        2 => (class.clone(), property.clone(), class.clone())
            .prop_map(|(a, r, b)| Axiom::SubSome(a, r, b)),
        2 => (property.clone(), class.clone(), class.clone())
            .prop_map(|(r, a, b)| Axiom::SomeSub(r, a, b)),
        2 => (class.clone(), class.clone(), class.clone())
            .prop_map(|(a, b, c)| Axiom::AndSub(a, b, c)),
        1 => (class.clone(), class.clone()).prop_map(|(a, b)| Axiom::Disjoint(a, b)),
        1 => (property.clone(), property).prop_map(|(r, s)| Axiom::SubProperty(r, s)),
        1 => class.prop_map(Axiom::Unsatisfiable),
    ]
}

fn build(axioms: &[Axiom]) -> (OntologyGraph, Vec<NodeId>) {
    let mut graph = OntologyGraph::new();
    let classes: Vec<NodeId> = (0..CLASSES)
        .map(|index| graph.class(format!("C{index}")))
        .collect();
    let properties: Vec<_> = (0..PROPERTIES)
        .map(|index| graph.property(format!("r{index}")))
        .collect();
    let bottom = graph.bottom();
    for axiom in axioms {
        match *axiom {
            Axiom::SubClass(a, b) => graph.subclass_of(classes[a], classes[b]).unwrap(),
            Axiom::SubSome(a, r, b) => {
                let some = graph.existential(properties[r], classes[b]).unwrap();
                graph.subclass_of(classes[a], some).unwrap();
            }
            Axiom::SomeSub(r, a, b) => {
                let some = graph.existential(properties[r], classes[a]).unwrap();
                graph.subclass_of(some, classes[b]).unwrap();
            }
            Axiom::AndSub(a, b, c) => {
                let both = graph.intersection(classes[a], classes[b]).unwrap();
                graph.subclass_of(both, classes[c]).unwrap();
            }
            Axiom::Disjoint(a, b) => {
                graph.disjoint_classes(&[classes[a], classes[b]]).unwrap();
            }
            Axiom::SubProperty(r, s) => {
                graph
                    .sub_property_of(properties[r], properties[s])
                    .unwrap();
            }
            Axiom::Unsatisfiable(a) => graph.subclass_of(classes[a], bottom).unwrap(),
        }
    }
    (graph, classes)
}

/// Subsumers of consistent roots plus the inconsistency marker of every root.
fn closure(graph: OntologyGraph, roots: &[NodeId], workers: usize) -> Vec<(bool, Vec<NodeId>)> {
    let run = saturate(graph, roots, workers);
    roots
        .iter()
        .map(|&root| {
            if run.is_inconsistent(root) {
                (true, Vec::new())
            } else {
                (false, run.subsumers(root))
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_and_four_workers_agree(axioms in proptest::collection::vec(axiom(), 0..24)) {
        let (graph, roots) = build(&axioms);
        let sequential = closure(graph.clone(), &roots, 1);
        let concurrent = closure(graph, &roots, 4);
        prop_assert_eq!(sequential, concurrent);
    }
}
