//! UI hierarchy tree model and dump parsing
//!
//! A uiautomator dump is a nested XML document of `<node>` elements.
//! The parser walks the raw tags with a depth stack and pulls known
//! attributes out by regex, so extra attributes from newer Android
//! releases pass through harmlessly. One malformed node never takes
//! down the rest of the tree.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

lazy_static! {
    static ref NODE_TAG: Regex = Regex::new(r"<node\b[^>]*>|</node\s*>").unwrap();
    static ref ATTR: Regex = Regex::new(r#"([\w:-]+)="([^"]*)""#).unwrap();
    static ref BOUNDS: Regex =
        Regex::new(r"^\[(-?\d+),(-?\d+)\]\[(-?\d+),(-?\d+)\]$").unwrap();
}

/// On-screen rectangle in device pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Parse the uiautomator `[l,t][r,b]` form
    pub fn parse(raw: &str) -> Option<Bounds> {
        let caps = BOUNDS.captures(raw.trim())?;
        Some(Bounds {
            left: caps[1].parse().ok()?,
            top: caps[2].parse().ok()?,
            right: caps[3].parse().ok()?,
            bottom: caps[4].parse().ok()?,
        })
    }

    /// Center point, where downstream tap operations land
    pub fn center(&self) -> (i32, i32) {
        ((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// A single element of the captured view hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiNode {
    pub class: Option<String>,
    pub bounds: Bounds,
    pub text: Option<String>,
    pub resource_id: Option<String>,
    pub content_desc: Option<String>,
    pub clickable: bool,
    pub enabled: bool,
    pub focused: bool,
    pub scrollable: bool,
    pub children: Vec<UiNode>,
}

/// uiautomator escapes attribute values as XML entities
fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl UiNode {
    /// Build a node from the attributes of one `<node …>` tag.
    ///
    /// Unknown attributes are skipped; a malformed or missing bounds
    /// string degrades to a zero-area rect at the origin rather than
    /// rejecting the node.
    fn from_tag(tag: &str) -> UiNode {
        let mut node = UiNode {
            class: None,
            bounds: Bounds::default(),
            text: None,
            resource_id: None,
            content_desc: None,
            clickable: false,
            enabled: false,
            focused: false,
            scrollable: false,
            children: Vec::new(),
        };

        for caps in ATTR.captures_iter(tag) {
            let value = &caps[2];
            match &caps[1] {
                "class" => node.class = non_empty(unescape(value)),
                "text" => node.text = non_empty(unescape(value)),
                "resource-id" => node.resource_id = non_empty(unescape(value)),
                "content-desc" => node.content_desc = non_empty(unescape(value)),
                "clickable" => node.clickable = value == "true",
                "enabled" => node.enabled = value == "true",
                "focused" => node.focused = value == "true",
                "scrollable" => node.scrollable = value == "true",
                "bounds" => match Bounds::parse(value) {
                    Some(bounds) => node.bounds = bounds,
                    None => warn!(bounds = value, "malformed bounds, using zero-area rect"),
                },
                _ => {}
            }
        }

        node
    }

    /// Pre-order traversal of this node and its descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// An immutable snapshot of one visual frame's view hierarchy.
///
/// Parsed once per capture; queries borrow the tree, so repeated
/// queries against one frame stay consistent even if the screen has
/// since changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiTree {
    pub roots: Vec<UiNode>,
}

/// A clickable node annotated with its tap point
#[derive(Debug, Clone, Serialize)]
pub struct Clickable<'a> {
    #[serde(flatten)]
    pub node: &'a UiNode,
    pub center: (i32, i32),
}

impl UiTree {
    /// Parse a uiautomator dump document.
    ///
    /// Returns `None` when the document contains no parseable `<node>`
    /// at all; the capture layer turns that into a capture failure.
    pub fn parse(document: &str) -> Option<UiTree> {
        let mut roots: Vec<UiNode> = Vec::new();
        // Index path into the tree under construction
        let mut stack: Vec<usize> = Vec::new();

        fn node_at<'t>(roots: &'t mut Vec<UiNode>, path: &[usize]) -> &'t mut Vec<UiNode> {
            let mut children = roots;
            for &idx in path {
                children = &mut children[idx].children;
            }
            children
        }

        for tag in NODE_TAG.find_iter(document) {
            let tag = tag.as_str();
            if tag.starts_with("</") {
                stack.pop();
                continue;
            }

            let node = UiNode::from_tag(tag);
            let siblings = node_at(&mut roots, &stack);
            siblings.push(node);

            if !tag.ends_with("/>") {
                stack.push(siblings.len() - 1);
            }
        }

        if roots.is_empty() {
            None
        } else {
            Some(UiTree { roots })
        }
    }

    /// Pre-order traversal over all roots, in document order
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Total number of nodes in the snapshot
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// First node (document order) whose text or content-desc matches.
    ///
    /// Exact mode requires equality; otherwise a case-sensitive
    /// substring match. `None` is the expected miss outcome, not a
    /// fault.
    pub fn find_by_text(&self, query: &str, exact: bool) -> Option<&UiNode> {
        self.iter().find(|node| {
            let fields = [node.text.as_deref(), node.content_desc.as_deref()];
            fields.iter().flatten().any(|value| {
                if exact {
                    *value == query
                } else {
                    value.contains(query)
                }
            })
        })
    }

    /// First node (document order) whose resource-id contains `id`,
    /// so a bare `btn_login` finds `com.app:id/btn_login`.
    pub fn find_by_id(&self, id: &str) -> Option<&UiNode> {
        self.iter()
            .find(|node| node.resource_id.as_deref().is_some_and(|r| r.contains(id)))
    }

    /// All clickable nodes in document order, each annotated with its
    /// bounds center. Document order is stable but not geometric;
    /// callers wanting a spatial sort must sort the result.
    pub fn clickable_nodes(&self) -> impl Iterator<Item = Clickable<'_>> {
        self.iter().filter(|n| n.clickable).map(|node| Clickable {
            node,
            center: node.bounds.center(),
        })
    }

    /// All non-empty text values in document order, duplicates kept
    pub fn all_text(&self) -> impl Iterator<Item = &str> {
        self.iter().filter_map(|n| n.text.as_deref())
    }
}

/// Depth-first pre-order iterator over borrowed nodes
pub struct PreOrder<'a> {
    stack: Vec<&'a UiNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a UiNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_DUMP: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
<hierarchy rotation="0">
  <node index="0" text="" resource-id="" class="android.widget.FrameLayout" package="com.example.app" content-desc="" checkable="false" checked="false" clickable="false" enabled="true" focusable="false" focused="false" scrollable="false" long-clickable="false" password="false" selected="false" bounds="[0,0][1080,2400]">
    <node index="0" text="Welcome back" resource-id="com.example.app:id/title" class="android.widget.TextView" package="com.example.app" content-desc="" clickable="false" enabled="true" focused="false" scrollable="false" bounds="[100,100][980,180]" />
    <node index="1" text="Login" resource-id="com.example.app:id/btn_login" class="android.widget.Button" package="com.example.app" content-desc="" clickable="true" enabled="true" focused="false" scrollable="false" bounds="[100,200][300,260]" />
    <node index="2" text="" resource-id="com.example.app:id/list" class="androidx.recyclerview.widget.RecyclerView" package="com.example.app" content-desc="Results" clickable="false" enabled="true" focused="false" scrollable="true" bounds="[0,300][1080,2400]">
      <node index="0" text="Item one" resource-id="" class="android.widget.TextView" clickable="true" enabled="true" focused="false" scrollable="false" bounds="[0,300][1080,400]" />
      <node index="1" text="Item two" resource-id="" class="android.widget.TextView" clickable="true" enabled="true" focused="false" scrollable="false" bounds="[0,400][1080,500]" />
    </node>
  </node>
</hierarchy>
"#;

    #[test]
    fn test_parse_bounds() {
        let bounds = Bounds::parse("[100,200][300,260]").unwrap();
        assert_eq!(bounds.left, 100);
        assert_eq!(bounds.bottom, 260);
        assert_eq!(bounds.center(), (200, 230));
    }

    #[test]
    fn test_parse_bounds_negative_coords() {
        // Off-screen elements can report negative origins
        let bounds = Bounds::parse("[-10,0][90,100]").unwrap();
        assert_eq!(bounds.left, -10);
        assert_eq!(bounds.center(), (40, 50));
    }

    #[test]
    fn test_parse_bounds_malformed() {
        assert!(Bounds::parse("[bad][bad]").is_none());
        assert!(Bounds::parse("").is_none());
        assert!(Bounds::parse("[1,2][3,]").is_none());
    }

    #[test]
    fn test_parse_tree_structure() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].children.len(), 3);
        assert_eq!(tree.roots[0].children[2].children.len(), 2);
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = UiTree::parse(LOGIN_DUMP).unwrap();
        let second = UiTree::parse(LOGIN_DUMP).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.node_count(), second.node_count());
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(UiTree::parse("").is_none());
        assert!(UiTree::parse("<hierarchy rotation=\"0\"></hierarchy>").is_none());
    }

    #[test]
    fn test_malformed_bounds_does_not_break_siblings() {
        let dump = r#"<hierarchy>
  <node class="android.widget.FrameLayout" bounds="[0,0][1080,2400]">
    <node class="android.widget.TextView" text="Broken" bounds="[bad][bad]" />
    <node class="android.widget.Button" text="Fine" clickable="true" bounds="[10,10][30,30]" />
  </node>
</hierarchy>"#;
        let tree = UiTree::parse(dump).unwrap();
        assert_eq!(tree.node_count(), 3);

        let broken = tree.find_by_text("Broken", true).unwrap();
        assert_eq!(broken.bounds, Bounds::default());
        assert_eq!(broken.bounds.center(), (0, 0));

        let fine = tree.find_by_text("Fine", true).unwrap();
        assert_eq!(fine.bounds.center(), (20, 20));
    }

    #[test]
    fn test_unknown_attributes_ignored() {
        let dump = r#"<hierarchy>
  <node class="android.view.View" future-attr="whatever" hint="type here" text="ok" bounds="[0,0][10,10]" />
</hierarchy>"#;
        let tree = UiTree::parse(dump).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.roots[0].text.as_deref(), Some("ok"));
    }

    #[test]
    fn test_text_entities_unescaped() {
        let dump = r#"<hierarchy>
  <node class="android.widget.TextView" text="Tom &amp; Jerry &lt;3" bounds="[0,0][10,10]" />
</hierarchy>"#;
        let tree = UiTree::parse(dump).unwrap();
        assert_eq!(tree.roots[0].text.as_deref(), Some("Tom & Jerry <3"));
    }

    #[test]
    fn test_find_by_text_substring() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        let node = tree.find_by_text("Login", false).unwrap();
        assert_eq!(
            node.resource_id.as_deref(),
            Some("com.example.app:id/btn_login")
        );
        // Substring hit
        assert!(tree.find_by_text("Welcome", false).is_some());
        // Case sensitive
        assert!(tree.find_by_text("login", false).is_none());
    }

    #[test]
    fn test_find_by_text_exact_rejects_superstrings() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        assert!(tree.find_by_text("Welcome", true).is_none());
        assert!(tree.find_by_text("Welcome back", true).is_some());
    }

    #[test]
    fn test_find_by_text_prefers_document_order() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        let node = tree.find_by_text("Item", false).unwrap();
        assert_eq!(node.text.as_deref(), Some("Item one"));
    }

    #[test]
    fn test_find_by_text_matches_content_desc() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        let node = tree.find_by_text("Results", false).unwrap();
        assert!(node.scrollable);
    }

    #[test]
    fn test_find_by_text_not_found_is_none() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        assert!(tree.find_by_text("does not exist", false).is_none());
    }

    #[test]
    fn test_find_by_id_partial_match() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        let node = tree.find_by_id("btn_login").unwrap();
        assert_eq!(node.text.as_deref(), Some("Login"));
        assert!(tree.find_by_id("btn_logout").is_none());
    }

    #[test]
    fn test_clickable_nodes() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        let clickable: Vec<_> = tree.clickable_nodes().collect();
        assert_eq!(clickable.len(), 3);
        assert!(clickable.iter().all(|c| c.node.clickable));
        assert_eq!(clickable[0].center, (200, 230));
        assert_eq!(clickable[0].node.text.as_deref(), Some("Login"));
    }

    #[test]
    fn test_all_text_document_order() {
        let tree = UiTree::parse(LOGIN_DUMP).unwrap();
        let texts: Vec<_> = tree.all_text().collect();
        assert_eq!(texts, vec!["Welcome back", "Login", "Item one", "Item two"]);
    }
}
