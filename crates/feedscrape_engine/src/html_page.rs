use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use ego_tree::{NodeId, NodeRef, Tree};
use feedscrape_core::ElementHandle;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::decode::{decode_snapshot, DecodeError};
use crate::page::{Detached, MutationRecord, ObserveOptions, ObserverId, Page, PageError};

const DEFAULT_APPEND_TARGET: &str = r#"div[role="feed"]"#;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

#[derive(Debug, Default)]
struct HandleTable {
    nodes: Vec<NodeId>,
    by_node: HashMap<NodeId, ElementHandle>,
}

impl HandleTable {
    fn handle_for(&mut self, node: NodeId) -> ElementHandle {
        if let Some(handle) = self.by_node.get(&node) {
            return *handle;
        }
        let handle = ElementHandle(self.nodes.len() as u64);
        self.nodes.push(node);
        self.by_node.insert(node, handle);
        handle
    }

    fn node(&self, handle: ElementHandle) -> Option<NodeId> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| self.nodes.get(index).copied())
    }
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    target: NodeId,
    options: ObserveOptions,
}

/// A mutable in-memory page backed by a parsed HTML document.
///
/// Feed batches queued with [`HtmlPage::with_feed_batches`] emulate infinite
/// scroll: each `scroll_to_bottom` appends the next batch to the feed
/// container (or the body when the page has none).
pub struct HtmlPage {
    document: Html,
    location: Option<Url>,
    append_target: String,
    batches: VecDeque<String>,
    handles: RefCell<HandleTable>,
    observers: BTreeMap<ObserverId, Observation>,
    next_observer: ObserverId,
    records: Vec<MutationRecord>,
    clicks: Vec<ElementHandle>,
    scrolls: usize,
}

impl HtmlPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            location: None,
            append_target: DEFAULT_APPEND_TARGET.to_string(),
            batches: VecDeque::new(),
            handles: RefCell::new(HandleTable::default()),
            observers: BTreeMap::new(),
            next_observer: 1,
            records: Vec::new(),
            clicks: Vec::new(),
            scrolls: 0,
        }
    }

    /// Loads the initial page and the batches revealed by successive scrolls.
    pub fn from_files(initial: &Path, batches: &[PathBuf]) -> Result<Self, SnapshotError> {
        let page = Self::parse(&read_snapshot(initial)?);
        let batches = batches
            .iter()
            .map(|path| read_snapshot(path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(page.with_feed_batches(batches))
    }

    pub fn with_location(mut self, url: Url) -> Self {
        self.location = Some(url);
        self
    }

    pub fn with_feed_batches<I, S>(mut self, batches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batches.extend(batches.into_iter().map(Into::into));
        self
    }

    /// Selector of the container that receives scrolled-in batches.
    pub fn with_append_target(mut self, selector: impl Into<String>) -> Self {
        self.append_target = selector.into();
        self
    }

    pub fn clicks(&self) -> &[ElementHandle] {
        &self.clicks
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls
    }

    pub fn remaining_batches(&self) -> usize {
        self.batches.len()
    }

    /// Serialized markup of the attached document.
    pub fn html(&self) -> String {
        self.document.root_element().html()
    }

    fn node_id(&self, handle: ElementHandle) -> Result<NodeId, PageError> {
        self.handles
            .borrow()
            .node(handle)
            .ok_or(PageError::StaleHandle(handle))
    }

    fn node(&self, handle: ElementHandle) -> Result<NodeRef<'_, Node>, PageError> {
        let id = self.node_id(handle)?;
        self.document
            .tree
            .get(id)
            .ok_or(PageError::StaleHandle(handle))
    }

    fn element(&self, handle: ElementHandle) -> Result<ElementRef<'_>, PageError> {
        ElementRef::wrap(self.node(handle)?).ok_or(PageError::NotAnElement(handle))
    }

    fn handle(&self, node: NodeId) -> ElementHandle {
        self.handles.borrow_mut().handle_for(node)
    }

    fn attached(&self, node: NodeId) -> bool {
        let root = self.document.tree.root().id();
        match self.document.tree.get(node) {
            Some(node) => node.id() == root || node.ancestors().any(|a| a.id() == root),
            None => false,
        }
    }

    fn observes(&self, observation: &Observation, target: NodeId) -> bool {
        if observation.target == target {
            return true;
        }
        observation.options.subtree
            && self
                .document
                .tree
                .get(target)
                .is_some_and(|node| node.ancestors().any(|a| a.id() == observation.target))
    }

    fn record(&mut self, target: NodeId, added_nodes: usize, removed_nodes: usize) {
        let matching: Vec<ObserverId> = self
            .observers
            .iter()
            .filter(|(_, observation)| self.observes(observation, target))
            .map(|(id, _)| *id)
            .collect();
        if matching.is_empty() {
            return;
        }
        let target = self.handle(target);
        for observer in matching {
            self.records.push(MutationRecord {
                observer,
                target,
                added_nodes,
                removed_nodes,
            });
        }
    }
}

impl Page for HtmlPage {
    fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, PageError> {
        let parsed = Selector::parse(selector)
            .map_err(|_| PageError::InvalidSelector(selector.to_string()))?;
        let root = match scope {
            Some(handle) => self.element(handle)?,
            None => self.document.root_element(),
        };
        let root_id = root.id();
        let mut handles = self.handles.borrow_mut();
        Ok(root
            .select(&parsed)
            .filter(|el| scope.is_none() || el.id() != root_id)
            .map(|el| handles.handle_for(el.id()))
            .collect())
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>, PageError> {
        Ok(self.element(element)?.value().attr(name).map(str::to_string))
    }

    fn text_content(&self, element: ElementHandle) -> Result<String, PageError> {
        Ok(self.element(element)?.text().collect())
    }

    /// Activating a control consumes it: the expanded text is already part of
    /// the snapshot, only the control itself goes away.
    fn click(&mut self, element: ElementHandle) -> Result<(), PageError> {
        let id = self.node_id(element)?;
        self.clicks.push(element);
        if self.attached(id) {
            self.detach(element)?;
        }
        Ok(())
    }

    fn detach(&mut self, element: ElementHandle) -> Result<Detached, PageError> {
        let node = self.node(element)?;
        let parent = node.parent().ok_or(PageError::NoParent(element))?.id();
        let next_sibling = node.next_sibling().map(|sibling| sibling.id());
        let id = node.id();
        self.document
            .tree
            .get_mut(id)
            .ok_or(PageError::StaleHandle(element))?
            .detach();
        self.record(parent, 0, 1);
        Ok(Detached {
            node: element,
            parent: self.handle(parent),
            next_sibling: next_sibling.map(|sibling| self.handle(sibling)),
        })
    }

    fn reattach(&mut self, detached: &Detached) -> Result<(), PageError> {
        let node = self.node_id(detached.node)?;
        let parent = self.node_id(detached.parent)?;
        let sibling = match detached.next_sibling {
            Some(handle) => Some(self.node_id(handle)?),
            None => None,
        }
        .filter(|sibling| {
            self.document
                .tree
                .get(*sibling)
                .and_then(|s| s.parent())
                .map(|p| p.id())
                == Some(parent)
        });

        match sibling {
            Some(sibling) => {
                self.document
                    .tree
                    .get_mut(sibling)
                    .ok_or(PageError::StaleHandle(detached.node))?
                    .insert_id_before(node);
            }
            None => {
                self.document
                    .tree
                    .get_mut(parent)
                    .ok_or(PageError::StaleHandle(detached.parent))?
                    .append_id(node);
            }
        }
        self.record(parent, 1, 0);
        Ok(())
    }

    fn is_attached(&self, element: ElementHandle) -> bool {
        self.node_id(element)
            .map(|id| self.attached(id))
            .unwrap_or(false)
    }

    fn scroll_to_bottom(&mut self) -> Result<(), PageError> {
        self.scrolls += 1;
        let Some(batch) = self.batches.pop_front() else {
            return Ok(());
        };
        let target = match self.query_first(None, &self.append_target)? {
            Some(feed) => feed,
            None => self.body()?,
        };
        let parent = self.node_id(target)?;
        let fragment = Html::parse_fragment(&batch);
        let mut added = 0;
        for child in fragment.root_element().children() {
            if graft(&mut self.document.tree, parent, child).is_some() {
                added += 1;
            }
        }
        self.record(parent, added, 0);
        Ok(())
    }

    fn body(&self) -> Result<ElementHandle, PageError> {
        self.query_first(None, "body")?.ok_or(PageError::NoBody)
    }

    fn observe(
        &mut self,
        target: ElementHandle,
        options: ObserveOptions,
    ) -> Result<ObserverId, PageError> {
        let target = self.node_id(target)?;
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.insert(id, Observation { target, options });
        Ok(id)
    }

    fn disconnect(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
        self.records.retain(|record| record.observer != observer);
    }

    fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }
}

/// Deep-copies `source` from another document under `parent`.
fn graft(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) -> Option<NodeId> {
    let id = tree.get_mut(parent)?.append(source.value().clone()).id();
    for child in source.children() {
        graft(tree, id, child)?;
    }
    Some(id)
}

fn read_snapshot(path: &Path) -> Result<String, SnapshotError> {
    let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_snapshot(&bytes, None)
        .map(|decoded| decoded.html)
        .map_err(|source| SnapshotError::Decode {
            path: path.to_path_buf(),
            source,
        })
}
