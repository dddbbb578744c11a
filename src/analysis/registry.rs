//! Node registry built from the `HCK-NODE` declarations.
//!
//! Every node prints the deployment's node table at boot:
//!
//! ```text
//! HCK-NODE root 1 1 (2 a6b9)
//! HCK-NODE non_root 2 2 (3 b081)
//! HCK-NODE non_root 3 3 (4 9768)
//! HCK-NODE end
//! ```
//!
//! The root takes table index 0; non-root nodes follow in declaration order.

use std::collections::HashMap;
use std::io::BufRead;

use log::{debug, warn};

use super::error::ParseError;
use super::log_parser::LogLines;
use super::metric::Metric;
use super::tokenizer::{split_message, REGISTRY_TAG};
use super::types::{Node, NodeId, ROOT_INDEX};

/// A single registry declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'a> {
    Root { id: &'a str, addr: &'a str },
    NonRoot { id: &'a str, addr: &'a str },
    End,
}

impl<'a> Declaration<'a> {
    /// Recognize a declaration among a line's message tokens
    pub fn parse(tokens: &[&'a str]) -> Option<Self> {
        if tokens.first() != Some(&REGISTRY_TAG) {
            return None;
        }
        match tokens.get(1).copied()? {
            "root" => Some(Declaration::Root {
                id: tokens.get(2)?,
                addr: tokens.get(3)?,
            }),
            "non_root" => Some(Declaration::NonRoot {
                id: tokens.get(2)?,
                addr: tokens.get(3)?,
            }),
            "end" => Some(Declaration::End),
            _ => None,
        }
    }
}

/// Immutable node table with O(1) id and address lookups
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    by_id: HashMap<NodeId, usize>,
    by_addr: HashMap<String, usize>,
}

impl NodeRegistry {
    pub fn new(root: Node, non_root: Vec<Node>) -> Self {
        let mut nodes = Vec::with_capacity(1 + non_root.len());
        nodes.push(root);
        nodes.extend(non_root);

        let mut by_id: HashMap<NodeId, usize> = HashMap::new();
        let mut by_addr: HashMap<String, usize> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if by_id.insert(node.id, index).is_some() {
                warn!("Node id {} declared more than once, keeping the last", node.id);
            }
            if let Some(previous) = by_addr.get(&node.addr) {
                warn!(
                    "Address {} declared for nodes {} and {}, keeping the first",
                    node.addr, nodes[*previous].id, node.id
                );
            } else {
                by_addr.insert(node.addr.clone(), index);
            }
        }

        Self {
            nodes,
            by_id,
            by_addr,
        }
    }

    /// Build the registry from the declarations at the start of a log.
    ///
    /// Reading stops at `HCK-NODE end`. A missing root declaration or a
    /// missing terminator is a [`ParseError::MalformedRegistry`]. Only the
    /// first declaration of each node id is kept, and only the first root.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root: Option<Node> = None;
        let mut non_root: Vec<Node> = Vec::new();

        for line in lines {
            let Some(tokens) = split_message(line.as_ref()) else {
                continue;
            };
            match Declaration::parse(&tokens) {
                Some(Declaration::Root { id, addr }) => {
                    let node = declared_node(id, addr)?;
                    if let Some(first) = &root {
                        warn!(
                            "Repeated root declaration for node {}, keeping node {}",
                            node.id, first.id
                        );
                        continue;
                    }
                    if let Some(pos) = non_root.iter().position(|n: &Node| n.id == node.id) {
                        warn!("Node {} declared as non_root before root, keeping root", node.id);
                        non_root.remove(pos);
                    }
                    root = Some(node);
                }
                Some(Declaration::NonRoot { id, addr }) => {
                    let node = declared_node(id, addr)?;
                    let seen = root.as_ref().is_some_and(|r| r.id == node.id)
                        || non_root.iter().any(|n: &Node| n.id == node.id);
                    if seen {
                        warn!("Skipping repeated declaration of node {}", node.id);
                        continue;
                    }
                    non_root.push(node);
                }
                Some(Declaration::End) => {
                    let root = root.ok_or_else(|| {
                        ParseError::malformed("no root declaration before HCK-NODE end")
                    })?;
                    debug!(
                        "Registry: root {} ({}), {} non-root nodes",
                        root.id,
                        root.addr,
                        non_root.len()
                    );
                    return Ok(Self::new(root, non_root));
                }
                None => {}
            }
        }

        Err(ParseError::malformed("log ended before HCK-NODE end"))
    }

    /// Build the registry from a log reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut read_error = None;
        let lines = LogLines::new(reader).map_while(|line| match line {
            Ok(line) => Some(line),
            Err(e) => {
                read_error = Some(e);
                None
            }
        });
        let result = Self::from_lines(lines);
        match (result, read_error) {
            (Err(_), Some(e)) => Err(ParseError::malformed(format!("read failed: {}", e))),
            (result, _) => result,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT_INDEX]
    }

    pub fn non_root(&self) -> &[Node] {
        &self.nodes[ROOT_INDEX + 1..]
    }

    /// All nodes in table order, root first
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn index_of_id(&self, id: NodeId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn index_of_addr(&self, addr: &str) -> Option<usize> {
        self.by_addr.get(addr).copied()
    }

    /// Table index of a non-root node by address; the root never matches
    pub fn peer_index(&self, addr: &str) -> Option<usize> {
        self.index_of_addr(addr).filter(|&i| i != ROOT_INDEX)
    }

    /// Order in which node logs are folded: non-root nodes, then the root
    pub fn processing_order(&self) -> impl Iterator<Item = usize> {
        (ROOT_INDEX + 1..self.nodes.len()).chain(std::iter::once(ROOT_INDEX))
    }

    /// Resolve a `lastP` value token to a node id.
    ///
    /// `0` means no parent; the root's address maps to the root id; any
    /// other token must be a registered non-root address.
    pub fn resolve_parent(&self, token: &str) -> Result<Option<NodeId>, ParseError> {
        if token == "0" {
            return Ok(None);
        }
        self.index_of_addr(token)
            .map(|index| Some(self.nodes[index].id))
            .ok_or_else(|| ParseError::UnknownPeerAddress {
                addr: token.to_string(),
                metric: Metric::LastParent,
            })
    }
}

fn declared_node(id: &str, addr: &str) -> Result<Node, ParseError> {
    let id = id
        .parse::<NodeId>()
        .map_err(|_| ParseError::malformed(format!("invalid node id '{}'", id)))?;
    Ok(Node {
        id,
        addr: addr.to_string(),
    })
}
