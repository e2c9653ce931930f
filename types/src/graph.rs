//! The indexed node/rule graph consumed by saturation.
//!
//! Expressions are interned into dense [`NodeId`]s. Registering an axiom
//! attaches composition rules to the nodes it mentions:
//!
//! - `sub ⊑ sup` adds `sup` to the told subsumers of `sub` and registers `sub`
//!   as occurring on the left, which attaches conjunction rules to the
//!   conjuncts of left intersections and propagation rules to the fillers of
//!   left existentials (recursively).
//! - `DisjointClasses(...)` attaches a disjointness rule to every member.
//!
//! The graph is immutable while a saturation run reads it. Edits between runs
//! go through a clone (see `SaturationState::resubmission_state` in
//! `saturate-core`).

use std::collections::HashMap;

use crate::{
    ConjunctionPartner, DisjointnessAxiom, DisjointnessId, GraphError, IndexedExpression,
    IndexedNode, IndexedProperty, NodeId, PropertyId, RuleChain, RuleKind,
};

#[derive(Debug, Clone)]
pub struct OntologyGraph {
    nodes: Vec<IndexedNode>,
    interned: HashMap<IndexedExpression, NodeId>,
    properties: Vec<IndexedProperty>,
    property_names: HashMap<String, PropertyId>,
    /// Told `sub ⊑ sup` edges, indexed by `sub`.
    told_super_properties: Vec<Vec<PropertyId>>,
    disjointness: Vec<DisjointnessAxiom>,
    top: NodeId,
    bottom: NodeId,
}

impl Default for OntologyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyGraph {
    #[must_use]
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            interned: HashMap::new(),
            properties: Vec::new(),
            property_names: HashMap::new(),
            told_super_properties: Vec::new(),
            disjointness: Vec::new(),
            top: NodeId::new(0),
            bottom: NodeId::new(0),
        };
        graph.top = graph.intern(IndexedExpression::Top);
        graph.bottom = graph.intern(IndexedExpression::Bottom);
        let bottom = graph.bottom;
        graph.nodes[bottom.index()]
            .rules_mut()
            .get_or_insert(RuleKind::Bottom);
        graph
    }

    fn intern(&mut self, expression: IndexedExpression) -> NodeId {
        if let Some(&id) = self.interned.get(&expression) {
            return id;
        }
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(IndexedNode::new(expression.clone()));
        self.interned.insert(expression, id);
        id
    }

    fn check_node(&self, id: NodeId) -> Result<(), GraphError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    fn check_property(&self, id: PropertyId) -> Result<(), GraphError> {
        if id.index() < self.properties.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownProperty(id))
        }
    }

    // ------------------------------------------------------------------
    // Interning
    // ------------------------------------------------------------------

    pub fn class(&mut self, name: impl Into<String>) -> NodeId {
        self.intern(IndexedExpression::Class { name: name.into() })
    }

    #[must_use]
    pub fn top(&self) -> NodeId {
        self.top
    }

    #[must_use]
    pub fn bottom(&self) -> NodeId {
        self.bottom
    }

    pub fn intersection(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.check_node(a)?;
        self.check_node(b)?;
        Ok(self.intern(IndexedExpression::intersection(a, b)))
    }

    pub fn existential(
        &mut self,
        property: PropertyId,
        filler: NodeId,
    ) -> Result<NodeId, GraphError> {
        self.check_property(property)?;
        self.check_node(filler)?;
        Ok(self.intern(IndexedExpression::Existential { property, filler }))
    }

    pub fn property(&mut self, name: impl Into<String>) -> PropertyId {
        let name = name.into();
        if let Some(&id) = self.property_names.get(&name) {
            return id;
        }
        let id = PropertyId::new(self.properties.len() as u32);
        self.properties.push(IndexedProperty::new(id, name.clone()));
        self.told_super_properties.push(Vec::new());
        self.property_names.insert(name, id);
        id
    }

    // ------------------------------------------------------------------
    // Axioms
    // ------------------------------------------------------------------

    /// Registers `sub ⊑ sup` for properties and recomputes the hierarchy closure.
    pub fn sub_property_of(&mut self, sub: PropertyId, sup: PropertyId) -> Result<(), GraphError> {
        self.check_property(sub)?;
        self.check_property(sup)?;
        self.told_super_properties[sub.index()].push(sup);
        self.recompute_property_closure();
        Ok(())
    }

    fn recompute_property_closure(&mut self) {
        let count = self.properties.len();
        let mut supers: Vec<Vec<PropertyId>> = Vec::with_capacity(count);
        for start in 0..count {
            let mut reached = vec![false; count];
            let mut stack = vec![start];
            reached[start] = true;
            while let Some(current) = stack.pop() {
                for next in &self.told_super_properties[current] {
                    if !reached[next.index()] {
                        reached[next.index()] = true;
                        stack.push(next.index());
                    }
                }
            }
            supers.push(
                (0..count)
                    .filter(|&i| reached[i])
                    .map(|i| PropertyId::new(i as u32))
                    .collect(),
            );
        }
        let mut subs: Vec<Vec<PropertyId>> = vec![Vec::new(); count];
        for (sub, sups) in supers.iter().enumerate() {
            for sup in sups {
                subs[sup.index()].push(PropertyId::new(sub as u32));
            }
        }
        for ((property, sups), subs) in self.properties.iter_mut().zip(supers).zip(subs) {
            property.set_closure(sups, subs);
        }
    }

    /// Registers the told axiom `sub ⊑ sup`.
    pub fn subclass_of(&mut self, sub: NodeId, sup: NodeId) -> Result<(), GraphError> {
        self.check_node(sub)?;
        self.check_node(sup)?;
        self.nodes[sub.index()].rules_mut().add_told_subsumer(sup);
        self.register_negative(sub);
        Ok(())
    }

    /// Removes one registration of `sub ⊑ sup`, detaching rules that become empty.
    pub fn remove_subclass_of(&mut self, sub: NodeId, sup: NodeId) -> Result<(), GraphError> {
        self.check_node(sub)?;
        self.check_node(sup)?;
        if !self.nodes[sub.index()].rules_mut().remove_told_subsumer(sup) {
            return Err(GraphError::AxiomNotFound { sub, sup });
        }
        self.unregister_negative(sub);
        Ok(())
    }

    fn register_negative(&mut self, node: NodeId) {
        if self.nodes[node.index()].increment_negative() > 1 {
            return;
        }
        match self.nodes[node.index()].expression().clone() {
            IndexedExpression::Intersection { first, second } => {
                self.nodes[first.index()]
                    .rules_mut()
                    .add_conjunction(ConjunctionPartner {
                        partner: second,
                        conjunction: node,
                    });
                self.nodes[second.index()]
                    .rules_mut()
                    .add_conjunction(ConjunctionPartner {
                        partner: first,
                        conjunction: node,
                    });
                self.register_negative(first);
                self.register_negative(second);
            }
            IndexedExpression::Existential { filler, .. } => {
                self.nodes[filler.index()].rules_mut().add_propagation(node);
                self.register_negative(filler);
            }
            IndexedExpression::Class { .. } | IndexedExpression::Top | IndexedExpression::Bottom => {
            }
        }
    }

    fn unregister_negative(&mut self, node: NodeId) {
        if self.nodes[node.index()].decrement_negative() > 0 {
            return;
        }
        match self.nodes[node.index()].expression().clone() {
            IndexedExpression::Intersection { first, second } => {
                self.nodes[first.index()]
                    .rules_mut()
                    .remove_conjunction(ConjunctionPartner {
                        partner: second,
                        conjunction: node,
                    });
                self.nodes[second.index()]
                    .rules_mut()
                    .remove_conjunction(ConjunctionPartner {
                        partner: first,
                        conjunction: node,
                    });
                self.unregister_negative(first);
                self.unregister_negative(second);
            }
            IndexedExpression::Existential { filler, .. } => {
                self.nodes[filler.index()]
                    .rules_mut()
                    .remove_propagation(node);
                self.unregister_negative(filler);
            }
            IndexedExpression::Class { .. } | IndexedExpression::Top | IndexedExpression::Bottom => {
            }
        }
    }

    /// Registers `DisjointClasses(members...)`.
    pub fn disjoint_classes(&mut self, members: &[NodeId]) -> Result<DisjointnessId, GraphError> {
        if members.len() < 2 {
            return Err(GraphError::DisjointnessTooSmall {
                found: members.len(),
            });
        }
        for &member in members {
            self.check_node(member)?;
        }
        let id = DisjointnessId::new(self.disjointness.len() as u32);
        self.disjointness
            .push(DisjointnessAxiom::new(members.to_vec()));
        for &member in members {
            self.nodes[member.index()].rules_mut().add_disjointness(id);
        }
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len() as u32).map(NodeId::new)
    }

    /// Ids of every named class, in interning order.
    pub fn classes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids().filter(|&id| {
            matches!(
                self.nodes[id.index()].expression(),
                IndexedExpression::Class { .. }
            )
        })
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&IndexedNode> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn expression(&self, id: NodeId) -> Option<&IndexedExpression> {
        self.node(id).map(IndexedNode::expression)
    }

    #[must_use]
    pub fn rules(&self, id: NodeId) -> Option<&RuleChain> {
        self.node(id).map(IndexedNode::rules)
    }

    #[must_use]
    pub fn find_class(&self, name: &str) -> Option<NodeId> {
        self.interned
            .get(&IndexedExpression::Class {
                name: name.to_string(),
            })
            .copied()
    }

    #[must_use]
    pub fn property_info(&self, id: PropertyId) -> Option<&IndexedProperty> {
        self.properties.get(id.index())
    }

    #[must_use]
    pub fn disjointness_axiom(&self, id: DisjointnessId) -> Option<&DisjointnessAxiom> {
        self.disjointness.get(id.index())
    }

    /// Renders an expression in functional-style syntax.
    #[must_use]
    pub fn display(&self, id: NodeId) -> String {
        match self.expression(id) {
            None => id.to_string(),
            Some(IndexedExpression::Class { name }) => name.clone(),
            Some(IndexedExpression::Top) => "owl:Thing".to_string(),
            Some(IndexedExpression::Bottom) => "owl:Nothing".to_string(),
            Some(IndexedExpression::Intersection { first, second }) => format!(
                "ObjectIntersectionOf({} {})",
                self.display(*first),
                self.display(*second)
            ),
            Some(IndexedExpression::Existential { property, filler }) => {
                let property = self
                    .property_info(*property)
                    .map_or_else(|| property.to_string(), |p| p.name().to_string());
                format!("ObjectSomeValuesFrom({property} {})", self.display(*filler))
            }
        }
    }
}
