//! Category paths of the form `"A > B > C"`: parsing, the three-level folder tree,
//! folder scopes and the level-by-level folder selector.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::ClientError;

/// Pseudo-category the server lists first, meaning "no filter"
pub const ALL_SENTINEL: &str = "すべて";
/// Pseudo-category the server lists when some questions have no category
pub const UNCLASSIFIED_SENTINEL: &str = "未分類";

pub const SEGMENT_SEPARATOR: &str = " > ";

pub fn is_sentinel(category: &str) -> bool {
    category == ALL_SENTINEL || category == UNCLASSIFIED_SENTINEL
}

/// Split on `>`, trim every segment and drop the empty ones
pub fn parse_segments(category: &str) -> Vec<String> {
    category
        .split('>')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

/// Every distinct segment name used by a real category, for autocomplete
pub fn segment_suggestions<S: AsRef<str>>(categories: &[S]) -> BTreeSet<String> {
    categories
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !c.is_empty() && !is_sentinel(c))
        .flat_map(parse_segments)
        .collect()
}

/// Three-level folder view over a flat category list.
///
/// Segments past the third are not represented; filtering always uses the full string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    levels: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
    has_unclassified: bool,
}

impl CategoryTree {
    pub fn from_categories<S: AsRef<str>>(categories: &[S]) -> Self {
        let mut tree = CategoryTree::default();

        for category in categories.iter().map(|c| c.as_ref()) {
            if category == UNCLASSIFIED_SENTINEL {
                tree.has_unclassified = true;
                continue;
            }
            if category == ALL_SENTINEL {
                continue;
            }

            let parts = parse_segments(category);
            let Some(lv1) = parts.first() else {
                continue;
            };
            let level2 = tree.levels.entry(lv1.clone()).or_default();
            if let Some(lv2) = parts.get(1) {
                let level3 = level2.entry(lv2.clone()).or_default();
                if let Some(lv3) = parts.get(2) {
                    level3.insert(lv3.clone());
                }
            }
        }

        tree
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn has_unclassified(&self) -> bool {
        self.has_unclassified
    }

    pub fn level1_options(&self) -> Vec<&str> {
        self.levels.keys().map(String::as_str).collect()
    }

    pub fn level2_options(&self, lv1: &str) -> Vec<&str> {
        self.levels
            .get(lv1)
            .map(|level2| level2.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn level3_options(&self, lv1: &str, lv2: &str) -> Vec<&str> {
        self.levels
            .get(lv1)
            .and_then(|level2| level2.get(lv2))
            .map(|level3| level3.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Which questions a quiz draws from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FolderScope {
    /// Every classified question
    #[default]
    All,
    /// A folder and everything beneath it
    Prefix(String),
    /// Only questions without a category
    Unclassified,
}

impl FolderScope {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            FolderScope::All => !parse_segments(category).is_empty(),
            FolderScope::Prefix(prefix) => {
                category == prefix
                    || category
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with(SEGMENT_SEPARATOR))
            }
            FolderScope::Unclassified => parse_segments(category).is_empty(),
        }
    }
}

impl fmt::Display for FolderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderScope::All => f.write_str("All questions"),
            FolderScope::Prefix(prefix) => f.write_str(prefix),
            FolderScope::Unclassified => f.write_str("Unclassified"),
        }
    }
}

/// Level-1 pick of the folder selector
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Level1Choice {
    #[default]
    All,
    Folder(String),
    Unclassified,
}

/// Folder picker state: zero or one value per level, descendants reset on parent change
#[derive(Debug, Clone, Default)]
pub struct FolderSelector {
    tree: CategoryTree,
    level1: Level1Choice,
    level2: Option<String>,
    level3: Option<String>,
}

impl FolderSelector {
    pub fn new(tree: CategoryTree) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn level1(&self) -> &Level1Choice {
        &self.level1
    }

    pub fn level2(&self) -> Option<&str> {
        self.level2.as_deref()
    }

    pub fn level3(&self) -> Option<&str> {
        self.level3.as_deref()
    }

    pub fn level2_enabled(&self) -> bool {
        matches!(self.level1, Level1Choice::Folder(_))
    }

    pub fn level3_enabled(&self) -> bool {
        self.level2_enabled() && self.level2.is_some()
    }

    pub fn level2_options(&self) -> Vec<&str> {
        match &self.level1 {
            Level1Choice::Folder(lv1) => self.tree.level2_options(lv1),
            _ => Vec::new(),
        }
    }

    pub fn level3_options(&self) -> Vec<&str> {
        match (&self.level1, &self.level2) {
            (Level1Choice::Folder(lv1), Some(lv2)) => self.tree.level3_options(lv1, lv2),
            _ => Vec::new(),
        }
    }

    /// Replace the tree after a category refresh and go back to "(all)"
    pub fn reset(&mut self, tree: CategoryTree) {
        *self = Self::new(tree);
    }

    pub fn select_level1(&mut self, choice: Level1Choice) -> Result<(), ClientError> {
        match &choice {
            Level1Choice::Folder(name) if !self.tree.levels.contains_key(name) => {
                return Err(ClientError::validation(format!("Unknown folder '{}'", name)));
            }
            Level1Choice::Unclassified if !self.tree.has_unclassified => {
                return Err(ClientError::validation("There are no unclassified questions"));
            }
            _ => {}
        }
        self.level1 = choice;
        self.level2 = None;
        self.level3 = None;
        Ok(())
    }

    pub fn select_level2(&mut self, choice: Option<String>) -> Result<(), ClientError> {
        if !self.level2_enabled() {
            return Err(ClientError::validation("Pick a first-level folder first"));
        }
        if let Some(name) = &choice {
            if !self.level2_options().contains(&name.as_str()) {
                return Err(ClientError::validation(format!("Unknown folder '{}'", name)));
            }
        }
        self.level2 = choice;
        self.level3 = None;
        Ok(())
    }

    pub fn select_level3(&mut self, choice: Option<String>) -> Result<(), ClientError> {
        if !self.level3_enabled() {
            return Err(ClientError::validation("Pick a second-level folder first"));
        }
        if let Some(name) = &choice {
            if !self.level3_options().contains(&name.as_str()) {
                return Err(ClientError::validation(format!("Unknown folder '{}'", name)));
            }
        }
        self.level3 = choice;
        Ok(())
    }

    pub fn scope(&self) -> FolderScope {
        match &self.level1 {
            Level1Choice::All => FolderScope::All,
            Level1Choice::Unclassified => FolderScope::Unclassified,
            Level1Choice::Folder(lv1) => {
                let parts: Vec<&str> = [Some(lv1.as_str()), self.level2(), self.level3()]
                    .into_iter()
                    .flatten()
                    .collect();
                FolderScope::Prefix(join_segments(&parts))
            }
        }
    }

    pub fn label(&self) -> String {
        self.scope().to_string()
    }
}

/// One entry of the admin list filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    /// Value sent as `?category=`; empty means no filter
    pub value: String,
    pub label: String,
}

/// Admin list filter built straight from the category list, sentinels included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilterOptions {
    options: Vec<FilterOption>,
    selected: String,
}

impl CategoryFilterOptions {
    pub fn from_categories<S: AsRef<str>>(categories: &[S]) -> Self {
        let options = categories
            .iter()
            .map(|c| c.as_ref())
            .map(|c| FilterOption {
                value: if c == ALL_SENTINEL { String::new() } else { c.to_string() },
                label: c.to_string(),
            })
            .collect();
        Self {
            options,
            selected: String::new(),
        }
    }

    /// Rebuild options, keeping the current selection only if it still exists
    pub fn refresh<S: AsRef<str>>(&mut self, categories: &[S]) {
        let previous = std::mem::take(&mut self.selected);
        *self = Self::from_categories(categories);
        if self.options.iter().any(|o| o.value == previous) {
            self.selected = previous;
        }
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn select(&mut self, value: &str) -> Result<(), ClientError> {
        if !value.is_empty() && !self.options.iter().any(|o| o.value == value) {
            return Err(ClientError::validation(format!("Unknown category '{}'", value)));
        }
        self.selected = value.to_string();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
