//! Layered spec registry
//!
//! The registry maps macro names, environment names and specials symbols to
//! their [specs](super::specs). Entries are grouped in named categories. The
//! categories form a shadow chain: lookups walk the categories from the most
//! recently declared to the oldest, so a later category overrides an earlier
//! definition of the same name without touching it.
//!
//! ## Lifecycle
//!
//! ```text
//! new() → add_context_category()* → freeze() → extended_with()* → freeze() → ...
//! ```
//!
//! A frozen registry never changes again. `extended_with()` copies the chain
//! of category handles (not their contents) and adds one generated layer, so
//! a single frozen base can be shared by any number of concurrent parses and
//! extensions.
//!
//! ## Example
//!
//! ```rust
//! use latexnodes::{MacroSpec, SpecRegistry};
//!
//! let mut registry = SpecRegistry::new();
//! registry
//!     .add_context_category("base", [MacroSpec::new("textbf", "{").unwrap()], [], [])
//!     .unwrap();
//! registry.freeze();
//!
//! let extended = registry
//!     .extended_with([MacroSpec::new("textbf", "[{").unwrap()], [], [])
//!     .unwrap();
//! assert_eq!(extended.category_count(), 2);
//! assert_eq!(registry.get_macro_spec("textbf").unwrap().arguments.len(), 1);
//! assert_eq!(extended.get_macro_spec("textbf").unwrap().arguments.len(), 2);
//! ```

use std::sync::Arc;

use fxhash::FxHashMap;
use indexmap::IndexMap;

use super::specs::{EnvironmentSpec, MacroSpec, SpecialsSpec};
use crate::utils::error::{RegistryError, RegistryResult};

/// Name prefix of the layers generated by `extended_with()`
pub const AUTOGEN_CATEGORY_PREFIX: &str = "__autogen_category__";

/// One named layer of specs
#[derive(Debug, Clone, Default)]
pub struct Category {
    name: String,
    macros: FxHashMap<String, Arc<MacroSpec>>,
    environments: FxHashMap<String, Arc<EnvironmentSpec>>,
    /// Declaration order matters: the first matching symbol wins
    specials: Vec<Arc<SpecialsSpec>>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        macros: impl IntoIterator<Item = MacroSpec>,
        environments: impl IntoIterator<Item = EnvironmentSpec>,
        specials: impl IntoIterator<Item = SpecialsSpec>,
    ) -> Self {
        let mut category = Category {
            name: name.into(),
            ..Default::default()
        };
        category.insert_all(macros, environments);
        for spec in specials {
            let spec = Arc::new(spec);
            match category
                .specials
                .iter()
                .position(|s| s.symbol == spec.symbol)
            {
                Some(i) => category.specials[i] = spec,
                None => category.specials.push(spec),
            }
        }
        category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_autogenerated(&self) -> bool {
        self.name.starts_with(AUTOGEN_CATEGORY_PREFIX)
    }

    pub fn macro_spec(&self, name: &str) -> Option<&Arc<MacroSpec>> {
        self.macros.get(name)
    }

    pub fn environment_spec(&self, name: &str) -> Option<&Arc<EnvironmentSpec>> {
        self.environments.get(name)
    }

    pub fn specials(&self) -> &[Arc<SpecialsSpec>] {
        &self.specials
    }

    pub fn macro_count(&self) -> usize {
        self.macros.len()
    }

    pub fn environment_count(&self) -> usize {
        self.environments.len()
    }

    fn insert_all(
        &mut self,
        macros: impl IntoIterator<Item = MacroSpec>,
        environments: impl IntoIterator<Item = EnvironmentSpec>,
    ) {
        for spec in macros {
            self.macros.insert(spec.name.clone(), Arc::new(spec));
        }
        for spec in environments {
            self.environments.insert(spec.name.clone(), Arc::new(spec));
        }
    }

    /// Copy of this layer with newer entries folded in.
    ///
    /// Newer entries replace older ones of the same name. Newer specials are
    /// placed ahead of the older ones so they take priority at a position
    /// where both match.
    fn merged_with(
        &self,
        macros: impl IntoIterator<Item = MacroSpec>,
        environments: impl IntoIterator<Item = EnvironmentSpec>,
        specials: impl IntoIterator<Item = SpecialsSpec>,
    ) -> Self {
        let mut merged = self.clone();
        merged.insert_all(macros, environments);

        let newer = Category::new("", [], [], specials).specials;
        let older = merged
            .specials
            .into_iter()
            .filter(|old| !newer.iter().any(|new| new.symbol == old.symbol));
        merged.specials = newer.iter().cloned().chain(older).collect();
        merged
    }

    fn match_specials(&self, rest: &str) -> Option<&Arc<SpecialsSpec>> {
        self.specials
            .iter()
            .find(|spec| !spec.symbol.is_empty() && rest.starts_with(spec.symbol.as_str()))
    }
}

/// Layered lookup table of callable specs
#[derive(Debug, Clone, Default)]
pub struct SpecRegistry {
    /// Declaration order is the shadowing order
    categories: IndexMap<String, Arc<Category>>,
    frozen: bool,
}

impl SpecRegistry {
    /// Create an empty, mutable registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category as the newest layer
    pub fn add_context_category(
        &mut self,
        name: impl Into<String>,
        macros: impl IntoIterator<Item = MacroSpec>,
        environments: impl IntoIterator<Item = EnvironmentSpec>,
        specials: impl IntoIterator<Item = SpecialsSpec>,
    ) -> RegistryResult<()> {
        let name = name.into();
        if self.frozen {
            return Err(RegistryError::AlreadyFrozen { category: name });
        }
        if name.starts_with(AUTOGEN_CATEGORY_PREFIX) {
            return Err(RegistryError::ReservedCategoryName { name });
        }
        if self.categories.contains_key(&name) {
            return Err(RegistryError::DuplicateCategory { name });
        }

        let category = Category::new(name.clone(), macros, environments, specials);
        tracing::debug!(
            category = %name,
            macros = category.macro_count(),
            environments = category.environment_count(),
            specials = category.specials.len(),
            "adding context category"
        );
        self.categories.insert(name, Arc::new(category));
        Ok(())
    }

    /// Forbid any further mutation. Calling it again is a no-op.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Category names in declaration order
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.get(name).map(|c| c.as_ref())
    }

    /// New registry with one more layer holding the given entries.
    ///
    /// When the newest layer is already a generated one, the entries are
    /// folded into a copy of it instead, so repeated extension does not grow
    /// the chain. The receiver must be frozen; the result is not.
    pub fn extended_with(
        &self,
        macros: impl IntoIterator<Item = MacroSpec>,
        environments: impl IntoIterator<Item = EnvironmentSpec>,
        specials: impl IntoIterator<Item = SpecialsSpec>,
    ) -> RegistryResult<SpecRegistry> {
        if !self.frozen {
            return Err(RegistryError::NotFrozen);
        }

        let mut categories = self.categories.clone();
        match categories.last_mut() {
            Some((name, last)) if last.is_autogenerated() => {
                tracing::debug!(category = %name, "merging extension into generated category");
                *last = Arc::new(last.merged_with(macros, environments, specials));
            }
            _ => {
                let name = format!("{}{}", AUTOGEN_CATEGORY_PREFIX, categories.len());
                tracing::debug!(category = %name, "appending generated category");
                let category = Category::new(name.clone(), macros, environments, specials);
                categories.insert(name, Arc::new(category));
            }
        }

        Ok(SpecRegistry {
            categories,
            frozen: false,
        })
    }

    fn newest_first(&self) -> impl Iterator<Item = &Category> {
        self.categories.values().rev().map(|c| c.as_ref())
    }

    /// Spec of macro `name` from the newest category defining it
    pub fn get_macro_spec(&self, name: &str) -> Option<&Arc<MacroSpec>> {
        self.newest_first().find_map(|c| c.macro_spec(name))
    }

    /// Spec of environment `name` from the newest category defining it
    pub fn get_environment_spec(&self, name: &str) -> Option<&Arc<EnvironmentSpec>> {
        self.newest_first().find_map(|c| c.environment_spec(name))
    }

    /// Spec registered for exactly `symbol`
    pub fn get_specials_spec(&self, symbol: &str) -> Option<&Arc<SpecialsSpec>> {
        self.newest_first()
            .find_map(|c| c.specials.iter().find(|s| s.symbol == symbol))
    }

    /// Specials whose symbol starts `s` at character offset `pos`.
    ///
    /// Categories are tried newest first; within a category the declared
    /// order decides, not the symbol length.
    pub fn test_for_specials(&self, s: &str, pos: usize) -> Option<&Arc<SpecialsSpec>> {
        let (byte_pos, _) = s.char_indices().nth(pos)?;
        self.match_specials(&s[byte_pos..])
    }

    /// Specials whose symbol is a prefix of `rest`
    pub fn match_specials(&self, rest: &str) -> Option<&Arc<SpecialsSpec>> {
        self.newest_first().find_map(|c| c.match_specials(rest))
    }
}
