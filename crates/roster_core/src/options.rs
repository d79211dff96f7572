//! Per-call options for mutating operations.

/// Options recognized by `set`, `add`, `remove`, `reset` and `sort`.
///
/// The presets mirror the defaults of each entry point:
///
/// | preset | add | remove | merge |
/// |--------|-----|--------|-------|
/// | [`SetOptions::set`] (also `Default`) | yes | yes | yes |
/// | [`SetOptions::add`] | yes | no | no |
///
/// `silent`, `parse` and `validate` default to off, `at` to "append" and
/// `sort` to "sort when the collection has a comparator".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOptions {
    /// Add inputs that do not match an existing member.
    pub add: bool,
    /// Remove current members that no input matched.
    pub remove: bool,
    /// Merge the attributes of matching inputs onto existing members.
    pub merge: bool,
    /// Explicit sort override. `None` sorts whenever a comparator is set;
    /// `Some(false)` suppresses the automatic sort for this call.
    pub sort: Option<bool>,
    /// Insert new members at this position instead of appending.
    pub at: Option<usize>,
    /// Suppress `add`, `remove`, `sort` and `reset` events.
    pub silent: bool,
    /// Run inputs through the configured parser (and the member's own
    /// `parse` when merging).
    pub parse: bool,
    /// Ask members to validate attributes before they are accepted.
    pub validate: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self::set()
    }
}

impl SetOptions {
    /// Defaults for a full reconciliation: add, remove and merge.
    #[must_use]
    pub const fn set() -> Self {
        Self {
            add: true,
            remove: true,
            merge: true,
            sort: None,
            at: None,
            silent: false,
            parse: false,
            validate: false,
        }
    }

    /// Defaults for `add`: never remove, never merge.
    #[must_use]
    pub const fn add() -> Self {
        Self {
            remove: false,
            merge: false,
            ..Self::set()
        }
    }

    /// Defaults for `remove`.
    #[must_use]
    pub const fn remove() -> Self {
        Self::set()
    }

    /// Defaults for `reset`, which adds the new members after clearing.
    #[must_use]
    pub const fn reset() -> Self {
        Self::add()
    }

    /// Sets whether unmatched inputs are added.
    #[must_use]
    pub const fn with_add(mut self, value: bool) -> Self {
        self.add = value;
        self
    }

    /// Sets whether unmatched members are removed.
    #[must_use]
    pub const fn with_remove(mut self, value: bool) -> Self {
        self.remove = value;
        self
    }

    /// Sets whether matching inputs are merged.
    #[must_use]
    pub const fn with_merge(mut self, value: bool) -> Self {
        self.merge = value;
        self
    }

    /// Overrides automatic sorting for this call.
    #[must_use]
    pub const fn with_sort(mut self, value: bool) -> Self {
        self.sort = Some(value);
        self
    }

    /// Inserts new members at `position`.
    #[must_use]
    pub const fn at(mut self, position: usize) -> Self {
        self.at = Some(position);
        self
    }

    /// Sets whether events are suppressed.
    #[must_use]
    pub const fn silent(mut self, value: bool) -> Self {
        self.silent = value;
        self
    }

    /// Sets whether inputs are parsed.
    #[must_use]
    pub const fn parse(mut self, value: bool) -> Self {
        self.parse = value;
        self
    }

    /// Sets whether members validate incoming attributes.
    #[must_use]
    pub const fn validate(mut self, value: bool) -> Self {
        self.validate = value;
        self
    }

    /// Returns true unless sorting was explicitly disabled.
    pub(crate) const fn sort_allowed(&self) -> bool {
        !matches!(self.sort, Some(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_defaults() {
        let options = SetOptions::default();
        assert!(options.add && options.remove && options.merge);
        assert!(!options.silent && !options.parse && !options.validate);
        assert_eq!(options.at, None);
        assert!(options.sort_allowed());
    }

    #[test]
    fn add_defaults() {
        let options = SetOptions::add();
        assert!(options.add);
        assert!(!options.remove);
        assert!(!options.merge);
    }

    #[test]
    fn builder_pattern() {
        let options = SetOptions::add().with_merge(true).at(2).silent(true).with_sort(false);
        assert!(options.merge);
        assert_eq!(options.at, Some(2));
        assert!(options.silent);
        assert!(!options.sort_allowed());
    }
}
