use indexmap::IndexMap;
use serde::Serialize;

use crate::client::EtaClient;
use crate::error::Result;

mod variable;
pub use variable::{Reading, Variable, VariableType};

/// A node of the menu tree: either a group of further nodes or a single
/// variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EtaNode {
    List(VariableList),
    Variable(Variable),
}

impl EtaNode {
    pub fn name(&self) -> &str {
        match self {
            EtaNode::List(list) => list.name(),
            EtaNode::Variable(var) => var.name(),
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            EtaNode::List(list) => list.uri(),
            EtaNode::Variable(var) => var.uri(),
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            EtaNode::Variable(var) => Some(var),
            EtaNode::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&VariableList> {
        match self {
            EtaNode::List(list) => Some(list),
            EtaNode::Variable(_) => None,
        }
    }

    /// All variables at or below this node in document order.
    pub fn variables(&self) -> Vec<&Variable> {
        match self {
            EtaNode::Variable(var) => vec![var],
            EtaNode::List(list) => list.variables(),
        }
    }
}

impl From<Variable> for EtaNode {
    fn from(var: Variable) -> Self {
        EtaNode::Variable(var)
    }
}

impl From<VariableList> for EtaNode {
    fn from(list: VariableList) -> Self {
        EtaNode::List(list)
    }
}

impl std::fmt::Display for EtaNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EtaNode::List(list) => list.fmt(f),
            EtaNode::Variable(var) => var.fmt(f),
        }
    }
}

/// Mutable access to a node inside a [`VariableList`]. Only fetching new
/// values is allowed, the node itself stays in place.
#[derive(Debug)]
pub struct NodeMut<'a> {
    node: &'a mut EtaNode,
}

impl<'a> NodeMut<'a> {
    /// Fetches new values, see [`EtaClient::update`].
    pub fn update(&mut self, client: &EtaClient) -> Result<()> {
        client.update(&mut *self.node)
    }

    pub fn into_ref(self) -> &'a EtaNode {
        self.node
    }
}

impl std::ops::Deref for NodeMut<'_> {
    type Target = EtaNode;

    fn deref(&self) -> &EtaNode {
        &*self.node
    }
}

/// A menu entry grouping further nodes. Children are keyed by their name and
/// kept in the order the device lists them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableList {
    name: String,
    uri: String,
    elements: IndexMap<String, EtaNode>,
}

impl VariableList {
    /// `elements` must be keyed by the children's names.
    pub(crate) fn new(
        name: impl ToString,
        uri: impl ToString,
        elements: IndexMap<String, EtaNode>,
    ) -> Self {
        VariableList {
            name: name.to_string(),
            uri: uri.to_string(),
            elements,
        }
    }

    /// Builds a list from child nodes, keyed by their names.
    pub fn from_nodes(
        name: impl ToString,
        uri: impl ToString,
        nodes: impl IntoIterator<Item = EtaNode>,
    ) -> Self {
        let elements = nodes
            .into_iter()
            .map(|node| (node.name().to_string(), node))
            .collect();
        Self::new(name, uri, elements)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn elements(&self) -> &IndexMap<String, EtaNode> {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> impl Iterator<Item = &mut EtaNode> {
        self.elements.values_mut()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EtaNode> {
        self.elements.get(name)
    }

    /// A child that can be updated but not replaced.
    pub fn get_mut(&mut self, name: &str) -> Option<NodeMut<'_>> {
        self.elements.get_mut(name).map(|node| NodeMut { node })
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.get(name).and_then(EtaNode::as_variable)
    }

    pub fn list(&self, name: &str) -> Option<&VariableList> {
        self.get(name).and_then(EtaNode::as_list)
    }

    /// Looks up a descendant by a `/` separated path of names, e.g.
    /// `"Zählerstände/Volllaststunden"`.
    pub fn find(&self, path: &str) -> Option<&EtaNode> {
        let mut names = path.split('/').filter(|name| !name.is_empty());
        let mut node = self.get(names.next()?)?;
        for name in names {
            node = node.as_list()?.get(name)?;
        }
        Some(node)
    }

    /// Like [`VariableList::find`], for updating the found node.
    pub fn find_mut(&mut self, path: &str) -> Option<NodeMut<'_>> {
        let mut names = path.split('/').filter(|name| !name.is_empty());
        let mut node = self.elements.get_mut(names.next()?)?;
        for name in names {
            node = match node {
                EtaNode::List(list) => list.elements.get_mut(name)?,
                EtaNode::Variable(_) => return None,
            };
        }
        Some(NodeMut { node })
    }

    /// All variables below this list, depth first in document order.
    pub fn variables(&self) -> Vec<&Variable> {
        self.elements
            .values()
            .flat_map(|node| node.variables())
            .collect()
    }
}

impl std::fmt::Display for VariableList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) [", self.name, self.uri)?;
        for (i, name) in self.elements.keys().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VariableList {
        let counters = VariableList::from_nodes(
            "Zählerstände",
            "/112/10021/0/0/12011",
            vec![
                EtaNode::from(Variable::new("Volllaststunden", "/112/10021/0/0/12153")),
                EtaNode::from(Variable::new("Gesamtverbrauch", "/112/10021/0/0/12016")),
            ],
        );
        VariableList::from_nodes(
            "Kessel",
            "/112/10021",
            vec![
                EtaNode::from(counters),
                EtaNode::from(Variable::new("Kesseltemperatur", "/112/10021/0/11109/0")),
            ],
        )
    }

    #[test]
    fn find_by_path() {
        let kessel = sample();
        let node = kessel.find("Zählerstände/Volllaststunden").unwrap();
        assert_eq!(node.uri(), "/112/10021/0/0/12153");
        assert!(node.as_variable().is_some());
        assert!(kessel.find("Zählerstände").unwrap().as_list().is_some());
        assert!(kessel.find("Kesseltemperatur/foo").is_none());
        assert!(kessel.find("").is_none());
    }

    #[test]
    fn find_mut_keeps_node_in_place() {
        let mut kessel = sample();
        let node = kessel.find_mut("/Zählerstände/Gesamtverbrauch").unwrap();
        assert_eq!(node.name(), "Gesamtverbrauch");
        assert_eq!(node.into_ref().uri(), "/112/10021/0/0/12016");
        assert!(kessel.find_mut("Kesseltemperatur/foo").is_none());
        assert!(kessel.get_mut("Zählerstände").unwrap().as_list().is_some());
    }

    #[test]
    fn keys_match_child_names() {
        let list = VariableList::from_nodes(
            "Heizkreis",
            "/120/10101",
            vec![
                EtaNode::from(Variable::new("Raumtemperatur", "/120/10101/0/0/12080")),
                EtaNode::from(Variable::new("Vorlauf", "/120/10101/0/0/12241")),
            ],
        );
        for (key, node) in list.elements() {
            assert_eq!(key, node.name());
        }
    }

    #[test]
    fn variables_in_document_order() {
        let kessel = sample();
        let names: Vec<_> = kessel.variables().iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            vec!["Volllaststunden", "Gesamtverbrauch", "Kesseltemperatur"]
        );
    }

    #[test]
    fn display_list() {
        let kessel = sample();
        assert_eq!(
            kessel.to_string(),
            "Kessel (/112/10021) [Zählerstände, Kesseltemperatur]"
        );
        let var = kessel.variable("Kesseltemperatur").unwrap();
        assert_eq!(
            var.to_string(),
            "Kesseltemperatur (/112/10021/0/11109/0): not updated"
        );
    }
}
