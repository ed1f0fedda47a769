/// Two-phase visibility for values defined during a generation.
///
/// Values land in `pending` when defined and become visible only after
/// `commit`, so a statement cannot refer to what it is itself defining.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    committed: Vec<String>,
    pending: Vec<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, value: impl Into<String>) {
        self.pending.push(value.into());
    }

    /// Moves every pending value into the committed set.
    pub fn commit(&mut self) {
        self.committed.append(&mut self.pending);
    }

    pub fn visible(&self) -> &[String] {
        &self.committed
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defined_values_wait_for_commit() {
        let mut scope = Scope::new();
        scope.define("a");
        scope.define("b");

        assert!(scope.visible().is_empty());
        assert_eq!(scope.pending(), ["a", "b"]);

        scope.commit();
        assert_eq!(scope.visible(), ["a", "b"]);
        assert!(scope.pending().is_empty());

        scope.define("c");
        scope.commit();
        assert_eq!(scope.visible(), ["a", "b", "c"]);
    }
}
