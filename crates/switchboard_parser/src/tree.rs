//! The command tree and resolver.
//!
//! Nodes live in an arena owned by [`CommandTree`] and are addressed by
//! [`NodeId`]. Children are owned by their parent's child map; the parent
//! link is a plain index used to rebuild paths. The tree is built once at
//! startup and only read afterwards.
//!
//! The tree is generic over the handler type so that this crate stays free
//! of any execution concerns.

use std::collections::HashMap;
use std::time::Duration;

use switchboard_foundation::{AuthorityLevel, CommandPath, Error, ErrorKind, Result};

use crate::binder::Param;
use crate::tokenizer::{Remainder, TokenKind};

/// Index of a node in the tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node.
    pub const ROOT: Self = Self(0);

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a rate limit is keyed on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    /// One bucket per (user, command).
    #[default]
    User,
    /// One bucket per (guild, command).
    Guild,
}

/// At most `max` invocations per `window`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RateLimitSpec {
    /// Invocations allowed within the window.
    pub max: u32,
    /// Window length.
    pub window: Duration,
    /// Bucket key.
    pub scope: RateLimitScope,
}

impl RateLimitSpec {
    /// A per-user limit.
    #[must_use]
    pub const fn per_user(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            scope: RateLimitScope::User,
        }
    }

    /// A per-guild limit.
    #[must_use]
    pub const fn per_guild(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            scope: RateLimitScope::Guild,
        }
    }
}

/// Where a command may be invoked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    /// In guilds and direct conversations.
    #[default]
    Anywhere,
    /// In guilds only.
    GuildOnly,
}

/// Declaration of a command, consumed by [`CommandTree::register`].
#[derive(Clone, Debug)]
pub struct CommandSpec<H> {
    aliases: Vec<String>,
    params: Vec<Param>,
    handler: Option<H>,
    authority: AuthorityLevel,
    rate_limit: Option<RateLimitSpec>,
    scope: Scope,
    strict: bool,
}

impl<H> CommandSpec<H> {
    /// Declares a command run by `handler`.
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            handler: Some(handler),
            ..Self::group()
        }
    }

    /// Declares a node that only hosts subcommands.
    #[must_use]
    pub fn group() -> Self {
        Self {
            aliases: Vec::new(),
            params: Vec::new(),
            handler: None,
            authority: AuthorityLevel::Regular,
            rate_limit: None,
            scope: Scope::Anywhere,
            strict: false,
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the minimum authority.
    #[must_use]
    pub fn authority(mut self, level: AuthorityLevel) -> Self {
        self.authority = level;
        self
    }

    /// Sets a rate limit.
    #[must_use]
    pub fn rate_limit(mut self, spec: RateLimitSpec) -> Self {
        self.rate_limit = Some(spec);
        self
    }

    /// Restricts the command to guilds.
    #[must_use]
    pub fn guild_only(mut self) -> Self {
        self.scope = Scope::GuildOnly;
        self
    }

    /// Rejects text left over after the last parameter.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// A node of the command tree.
#[derive(Debug)]
pub struct CommandNode<H> {
    name: String,
    path: CommandPath,
    parent: Option<NodeId>,
    declared: bool,
    spec: CommandSpec<H>,
    children: HashMap<String, NodeId>,
    child_order: Vec<NodeId>,
}

impl<H> CommandNode<H> {
    /// Returns the canonical name; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the aliases.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.spec.aliases
    }

    /// Returns the full path from the root.
    #[must_use]
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    /// Returns the parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.spec.params
    }

    /// Returns the handler, if the node is invokable.
    #[must_use]
    pub fn handler(&self) -> Option<&H> {
        self.spec.handler.as_ref()
    }

    /// Returns the minimum authority.
    #[must_use]
    pub fn authority(&self) -> AuthorityLevel {
        self.spec.authority
    }

    /// Returns the rate limit, if any.
    #[must_use]
    pub fn rate_limit(&self) -> Option<RateLimitSpec> {
        self.spec.rate_limit
    }

    /// Returns where the command may be used.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.spec.scope
    }

    /// Returns true if trailing text is rejected.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.spec.strict
    }

    /// Returns true if the node has a handler.
    #[must_use]
    pub fn is_invokable(&self) -> bool {
        self.spec.handler.is_some()
    }

    /// Returns the children, in registration order, once each.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.child_order
    }

    /// Looks up a child by name or alias, case-insensitively.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(&name.to_lowercase()).copied()
    }
}

/// Outcome of [`CommandTree::resolve`].
#[derive(Clone, Debug)]
pub struct Resolution<'a> {
    /// Deepest matched node; the root if nothing matched.
    pub node: NodeId,
    /// Canonical path of `node`.
    pub path: CommandPath,
    /// Text after the last consumed selector.
    pub remainder: Remainder<'a>,
}

impl Resolution<'_> {
    /// Returns true if no command matched.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node == NodeId::ROOT
    }
}

/// The command registry.
#[derive(Debug)]
pub struct CommandTree<H> {
    nodes: Vec<CommandNode<H>>,
}

impl<H> Default for CommandTree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> CommandTree<H> {
    /// Creates a tree holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![CommandNode {
                name: String::new(),
                path: CommandPath::root(),
                parent: None,
                declared: true,
                spec: CommandSpec::group(),
                children: HashMap::new(),
                child_order: Vec::new(),
            }],
        }
    }

    /// Registers a command at `path`, creating missing ancestors.
    ///
    /// Ancestors created on the way have no handler until they are
    /// registered themselves.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCommandName` for an empty path or a malformed name or
    /// alias, and `DuplicateAlias` if a name or alias collides with a
    /// sibling's, or if `path` was already registered.
    pub fn register(&mut self, path: &[&str], spec: CommandSpec<H>) -> Result<NodeId> {
        let Some((last, ancestors)) = path.split_last() else {
            return Err(Error::new(ErrorKind::InvalidCommandName(String::new())));
        };

        let mut parent = NodeId::ROOT;
        for segment in ancestors {
            let name = normalize(segment)?;
            parent = match self.nodes[parent.0].children.get(&name) {
                Some(&existing) => existing,
                None => self.insert(parent, name, CommandSpec::group(), false)?,
            };
        }

        let name = normalize(last)?;
        match self.nodes[parent.0].children.get(&name).copied() {
            Some(existing) if self.nodes[existing.0].declared => {
                Err(Error::duplicate_alias(self.nodes[parent.0].path.clone(), name))
            }
            Some(existing) if self.nodes[existing.0].name == name => {
                self.declare(parent, existing, spec)?;
                Ok(existing)
            }
            Some(_) => Err(Error::duplicate_alias(
                self.nodes[parent.0].path.clone(),
                name,
            )),
            None => self.insert(parent, name, spec, true),
        }
    }

    /// Resolves the longest command prefix of `remainder`.
    ///
    /// Each bare word is looked up among the current node's children; the
    /// walk stops at the first word that does not match, at a quoted token,
    /// or at the end of input. The returned remainder starts at the first
    /// unconsumed token.
    #[must_use]
    pub fn resolve<'a>(&self, remainder: Remainder<'a>) -> Resolution<'a> {
        self.resolve_localized(remainder, |_| Vec::new())
    }

    /// Resolves like [`resolve`](Self::resolve), with per-language names.
    ///
    /// `localized` returns the words naming a path in the conversation's
    /// language. See [`child_localized`](Self::child_localized) for the
    /// order in which a word is matched.
    #[must_use]
    pub fn resolve_localized<'a, F>(
        &self,
        mut remainder: Remainder<'a>,
        localized: F,
    ) -> Resolution<'a>
    where
        F: Fn(&CommandPath) -> Vec<String>,
    {
        let mut current = NodeId::ROOT;
        loop {
            let saved = remainder;
            let Some(token) = remainder.next_token() else {
                break;
            };
            let next = match token.kind {
                TokenKind::Word => self.child_localized(current, &token.text, &localized),
                TokenKind::Quoted => None,
            };
            match next {
                Some(child) => current = child,
                None => {
                    remainder = saved;
                    break;
                }
            }
        }

        Resolution {
            node: current,
            path: self.nodes[current.0].path.clone(),
            remainder,
        }
    }

    /// Finds the node at `path`, accepting aliases for every segment.
    #[must_use]
    pub fn lookup(&self, path: &CommandPath) -> Option<NodeId> {
        self.lookup_segments(path.segments().iter().map(String::as_str))
    }

    /// Finds the node reached by following `segments` from the root.
    #[must_use]
    pub fn lookup_segments<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Option<NodeId> {
        segments
            .into_iter()
            .try_fold(NodeId::ROOT, |node, segment| self.nodes[node.0].child(segment))
    }

    /// Finds the node reached by following `segments`, with per-language
    /// names.
    #[must_use]
    pub fn lookup_localized<'s, F>(
        &self,
        segments: impl IntoIterator<Item = &'s str>,
        localized: F,
    ) -> Option<NodeId>
    where
        F: Fn(&CommandPath) -> Vec<String>,
    {
        segments.into_iter().try_fold(NodeId::ROOT, |node, segment| {
            self.child_localized(node, segment, &localized)
        })
    }

    /// Looks up the child of `parent` named `word`.
    ///
    /// Localized names win, then canonical names and aliases. A trailing
    /// underscore (`toggle_`) always reaches the child canonically named
    /// `toggle`, even when a localized name shadows it.
    #[must_use]
    pub fn child_localized<F>(&self, parent: NodeId, word: &str, localized: &F) -> Option<NodeId>
    where
        F: Fn(&CommandPath) -> Vec<String>,
    {
        let word = word.to_lowercase();
        let node = &self.nodes[parent.0];

        let translated = node.child_order.iter().copied().find(|&child| {
            localized(&self.nodes[child.0].path)
                .iter()
                .any(|name| name.to_lowercase() == word)
        });
        translated
            .or_else(|| node.children.get(&word).copied())
            .or_else(|| {
                let canonical = word.strip_suffix('_')?;
                node.children
                    .get(canonical)
                    .copied()
                    .filter(|&child| self.nodes[child.0].name == canonical)
            })
    }

    /// Returns the node with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &CommandNode<H> {
        &self.nodes[id.0]
    }

    /// Returns the node with the given ID, if it exists.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&CommandNode<H>> {
        self.nodes.get(id.0)
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &CommandNode<H> {
        &self.nodes[0]
    }

    /// Returns `id` and its ancestors up to, but excluding, the root.
    #[must_use]
    pub fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == NodeId::ROOT {
                break;
            }
            chain.push(node);
            current = self.nodes[node.0].parent;
        }
        chain
    }

    /// Iterates over every node except the root.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CommandNode<H>)> {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Returns the number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn insert(
        &mut self,
        parent: NodeId,
        name: String,
        spec: CommandSpec<H>,
        declared: bool,
    ) -> Result<NodeId> {
        let keys = self.sibling_keys(parent, &name, &spec.aliases)?;
        let id = NodeId(self.nodes.len());
        let path = self.nodes[parent.0].path.child(name.clone());
        self.nodes.push(CommandNode {
            name,
            path,
            parent: Some(parent),
            declared,
            spec,
            children: HashMap::new(),
            child_order: Vec::new(),
        });

        let parent_node = &mut self.nodes[parent.0];
        for key in keys {
            parent_node.children.insert(key, id);
        }
        parent_node.child_order.push(id);
        Ok(id)
    }

    fn declare(&mut self, parent: NodeId, id: NodeId, spec: CommandSpec<H>) -> Result<()> {
        let name = self.nodes[id.0].name.clone();
        let mut keys = self.sibling_keys(parent, &name, &spec.aliases)?;
        keys.retain(|key| *key != name);

        for key in keys {
            self.nodes[parent.0].children.insert(key, id);
        }
        let node = &mut self.nodes[id.0];
        node.spec = spec;
        node.declared = true;
        Ok(())
    }

    /// Validates and normalizes the keys a new child would occupy.
    fn sibling_keys(&self, parent: NodeId, name: &str, aliases: &[String]) -> Result<Vec<String>> {
        let siblings = &self.nodes[parent.0].children;
        let mut keys = vec![name.to_string()];
        for alias in aliases {
            let alias = normalize(alias)?;
            if keys.contains(&alias) {
                return Err(Error::duplicate_alias(
                    self.nodes[parent.0].path.clone(),
                    alias,
                ));
            }
            keys.push(alias);
        }

        for key in &keys {
            let taken = siblings
                .get(key)
                .is_some_and(|&owner| self.nodes[owner.0].name != name);
            if taken {
                return Err(Error::duplicate_alias(
                    self.nodes[parent.0].path.clone(),
                    key.clone(),
                ));
            }
        }
        Ok(keys)
    }
}

fn normalize(name: &str) -> Result<String> {
    let invalid = name.is_empty()
        || name.contains(char::is_whitespace)
        || name.contains('.')
        || name.contains('*');
    if invalid {
        return Err(Error::new(ErrorKind::InvalidCommandName(name.to_string())));
    }
    Ok(name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn tree() -> CommandTree<&'static str> {
        let mut tree = CommandTree::new();
        tree.register(&["remove"], CommandSpec::new("remove").alias("rm"))
            .unwrap();
        tree.register(&["remove", "user"], CommandSpec::new("remove user").alias("u"))
            .unwrap();
        tree.register(&["example", "create"], CommandSpec::new("create"))
            .unwrap();
        tree
    }

    #[test]
    fn test_resolve_nested_path() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let resolution = tree.resolve(tokenizer.cursor("remove user <@1> <@2> 50"));
        assert_eq!(resolution.path, CommandPath::new(["remove", "user"]));
        assert_eq!(resolution.remainder.as_str(), "<@1> <@2> 50");
        assert_eq!(tree.node(resolution.node).handler(), Some(&"remove user"));
    }

    #[test]
    fn test_resolve_through_aliases() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let resolution = tree.resolve(tokenizer.cursor("RM u x"));
        assert_eq!(resolution.path, CommandPath::new(["remove", "user"]));
        assert_eq!(resolution.remainder.as_str(), "x");
    }

    #[test]
    fn test_resolve_stops_at_deepest_match() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let resolution = tree.resolve(tokenizer.cursor("remove everything now"));
        assert_eq!(resolution.path, CommandPath::new(["remove"]));
        assert_eq!(resolution.remainder.as_str(), "everything now");
    }

    #[test]
    fn test_resolve_unknown_is_root() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let resolution = tree.resolve(tokenizer.cursor("frobnicate"));
        assert!(resolution.is_root());
        assert_eq!(resolution.remainder.as_str(), "frobnicate");
    }

    #[test]
    fn test_quoted_token_is_not_a_selector() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let resolution = tree.resolve(tokenizer.cursor("remove \"user\""));
        assert_eq!(resolution.path, CommandPath::new(["remove"]));
    }

    #[test]
    fn test_intermediate_nodes_have_no_handler() {
        let tree = tree();
        let example = tree.lookup(&CommandPath::new(["example"])).unwrap();
        assert!(!tree.node(example).is_invokable());
    }

    #[test]
    fn test_intermediate_node_can_be_declared_later() {
        let mut tree = tree();
        let id = tree
            .register(&["example"], CommandSpec::new("example").alias("ex"))
            .unwrap();
        let create = tree.lookup(&CommandPath::new(["ex", "create"])).unwrap();
        assert_eq!(
            tree.node(create).path(),
            &CommandPath::new(["example", "create"])
        );
        assert!(tree.node(id).is_invokable());
    }

    #[test]
    fn test_duplicate_sibling_alias_fails() {
        let mut tree = tree();
        let err = tree
            .register(&["reset"], CommandSpec::new("reset").alias("rm"))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateAlias { .. }));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut tree = tree();
        assert!(tree.register(&["remove"], CommandSpec::new("again")).is_err());
    }

    #[test]
    fn test_aliases_unique_only_among_siblings() {
        let mut tree = tree();
        tree.register(&["example", "u"], CommandSpec::new("example u"))
            .unwrap();
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        assert!(tree.register(&[], CommandSpec::new(())).is_err());
        assert!(tree.register(&["a b"], CommandSpec::new(())).is_err());
        assert!(tree.register(&["a.b"], CommandSpec::new(())).is_err());
    }

    #[test]
    fn test_children_are_deduplicated() {
        let tree = tree();
        let remove = tree.lookup(&CommandPath::new(["remove"])).unwrap();
        assert_eq!(tree.node(remove).children().len(), 1);
        assert_eq!(tree.root().children().len(), 2);
    }

    fn french(path: &CommandPath) -> Vec<String> {
        match path.dotted().as_str() {
            "remove" => vec!["retirer".into(), "ret".into()],
            "remove.user" => vec!["membre".into()],
            "example" => vec!["remove".into()],
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_localized_names_resolve() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let resolution = tree.resolve_localized(tokenizer.cursor("RETIRER membre x"), french);
        assert_eq!(resolution.path, CommandPath::new(["remove", "user"]));
        assert_eq!(resolution.remainder.as_str(), "x");

        let resolution = tree.resolve_localized(tokenizer.cursor("ret u"), french);
        assert_eq!(resolution.path, CommandPath::new(["remove", "user"]));
    }

    #[test]
    fn test_localized_name_shadows_canonical() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let shadowed = tree.resolve_localized(tokenizer.cursor("remove create"), french);
        assert_eq!(shadowed.path, CommandPath::new(["example", "create"]));

        let escaped = tree.resolve_localized(tokenizer.cursor("remove_ user"), french);
        assert_eq!(escaped.path, CommandPath::new(["remove", "user"]));
    }

    #[test]
    fn test_escape_needs_a_canonical_name() {
        let tree = tree();
        let tokenizer = Tokenizer::new();
        let resolution = tree.resolve(tokenizer.cursor("rm_ user"));
        assert!(resolution.is_root());
        assert_eq!(
            tree.lookup_localized(["retirer", "membre"], french),
            tree.lookup(&CommandPath::new(["remove", "user"]))
        );
    }

    #[test]
    fn test_ancestry() {
        let tree = tree();
        let user = tree.lookup(&CommandPath::new(["remove", "user"])).unwrap();
        let chain: Vec<_> = tree
            .ancestry(user)
            .into_iter()
            .map(|id| tree.node(id).name().to_string())
            .collect();
        assert_eq!(chain, vec!["user", "remove"]);
    }
}
