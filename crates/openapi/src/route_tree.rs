//! Hierarchical resource tree built from slash-delimited paths.
//!
//! One node per distinct path. Parents are built before children, and a
//! path that already has a node returns it instead of creating another.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use restkit_core::{BuildError, BuildResult, LogicalId, Resource, ResourceRef, Stack};

pub const ROOT_PATH: &str = "/";

/// A node of the tree: the root or one path resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNode {
    path: String,
    resource: Option<ResourceRef>,
}

impl RouteNode {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.resource.is_none()
    }

    pub fn resource(&self) -> Option<&ResourceRef> {
        self.resource.as_ref()
    }
}

/// Fail unless `path` is the root or names at least one real segment.
pub fn check_path(path: &str) -> BuildResult<()> {
    if path == ROOT_PATH || path.split('/').any(|segment| !segment.is_empty()) {
        Ok(())
    } else {
        Err(BuildError::invalid_path(path))
    }
}

/// Path → node map with the root pre-seeded.
#[derive(Debug, Clone)]
pub struct RouteTree {
    rest_api: ResourceRef,
    nodes: BTreeMap<String, RouteNode>,
    created: Vec<RouteNode>,
}

impl RouteTree {
    pub fn new(rest_api: ResourceRef) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            ROOT_PATH.to_string(),
            RouteNode {
                path: ROOT_PATH.to_string(),
                resource: None,
            },
        );
        Self {
            rest_api,
            nodes,
            created: Vec::new(),
        }
    }

    pub fn root(&self) -> &RouteNode {
        &self.nodes[ROOT_PATH]
    }

    /// Expression for a node's resource id (the root's comes from the API).
    pub fn resource_id(&self, node: &RouteNode) -> Value {
        match &node.resource {
            Some(resource) => resource.reference(),
            None => self.rest_api.attr("RootResourceId"),
        }
    }

    pub fn get(&self, path: &str) -> Option<&RouteNode> {
        self.nodes.get(path)
    }

    /// Resolve the node for `path`, creating it (and any missing parents).
    pub fn ensure_resource(&mut self, stack: &mut Stack, path: &str) -> BuildResult<RouteNode> {
        if let Some(node) = self.nodes.get(path) {
            return Ok(node.clone());
        }

        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(leaf) = segments.pop() else {
            return Err(BuildError::invalid_path(path));
        };
        let branch = format!("/{}", segments.join("/"));

        let parent = match self.nodes.get(&branch) {
            Some(parent) => parent.clone(),
            None => self.ensure_resource(stack, &branch)?,
        };

        let mut id_parts = vec![self.rest_api.id().as_str()];
        id_parts.extend(segments.iter().copied());
        id_parts.push(leaf);
        let id = stack.unique_id(&LogicalId::from_parts(&id_parts));

        let resource = stack.add(
            id,
            Resource::new(
                "AWS::ApiGateway::Resource",
                json!({
                    "ParentId": self.resource_id(&parent),
                    "PathPart": leaf,
                    "RestApiId": self.rest_api.reference(),
                }),
            ),
        )?;

        let node = RouteNode {
            path: path.to_string(),
            resource: Some(resource),
        };
        self.nodes.insert(path.to_string(), node.clone());
        self.created.push(node.clone());
        Ok(node)
    }

    /// Nodes created since the last call, parents first.
    pub fn drain_created(&mut self) -> Vec<RouteNode> {
        std::mem::take(&mut self.created)
    }

    /// Every known path, root included.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Number of path resources (the root is not one).
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }
}
