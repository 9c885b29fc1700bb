use crate::error::{DbError, Result};

/// What the connection must do after a counter transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nested call; the connection is not touched.
    Deferred,
    /// Outermost begin: start the real transaction.
    Begin,
    /// Outermost commit: commit the real transaction.
    Commit,
    /// Outermost rollback, or commit of a transaction a nested rollback
    /// already doomed: roll back the real transaction.
    Rollback,
}

/// Nesting counter for `begin`/`commit`/`rollback`.
///
/// Only the 0→1 and 1→0 transitions reach the real connection. A nested
/// rollback marks the whole transaction rollback-only, so the outermost
/// commit turns into a rollback.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionCounter {
    depth: u32,
    rollback_only: bool,
}

impl TransactionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    /// What a `begin` would require, without changing the depth.
    /// Call [`TransactionCounter::entered`] once the real begin succeeded.
    pub fn begin(&self) -> Outcome {
        if self.depth == 0 {
            Outcome::Begin
        } else {
            Outcome::Deferred
        }
    }

    pub fn entered(&mut self) {
        if self.depth == 0 {
            self.rollback_only = false;
        }
        self.depth += 1;
    }

    pub fn commit(&mut self) -> Result<Outcome> {
        self.leave("commit")?;
        Ok(match (self.depth, self.rollback_only) {
            (0, false) => Outcome::Commit,
            (0, true) => Outcome::Rollback,
            _ => Outcome::Deferred,
        })
    }

    pub fn rollback(&mut self) -> Result<Outcome> {
        self.leave("rollback")?;
        if self.depth == 0 {
            Ok(Outcome::Rollback)
        } else {
            self.rollback_only = true;
            Ok(Outcome::Deferred)
        }
    }

    fn leave(&mut self, op: &str) -> Result<()> {
        if self.depth == 0 {
            return Err(DbError::Transaction(format!(
                "unbalanced {op}: no transaction is open"
            )));
        }
        self.depth -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(counter: &mut TransactionCounter) -> Outcome {
        let outcome = counter.begin();
        counter.entered();
        outcome
    }

    #[test]
    fn test_only_outer_begin_and_commit_are_real() {
        let mut counter = TransactionCounter::new();
        assert_eq!(begin(&mut counter), Outcome::Begin);
        assert_eq!(begin(&mut counter), Outcome::Deferred);
        assert_eq!(counter.depth(), 2);
        assert_eq!(counter.commit().unwrap(), Outcome::Deferred);
        assert_eq!(counter.commit().unwrap(), Outcome::Commit);
        assert!(!counter.is_active());
    }

    #[test]
    fn test_outer_rollback_is_real() {
        let mut counter = TransactionCounter::new();
        begin(&mut counter);
        begin(&mut counter);
        begin(&mut counter);
        assert_eq!(counter.rollback().unwrap(), Outcome::Deferred);
        assert_eq!(counter.rollback().unwrap(), Outcome::Deferred);
        assert_eq!(counter.rollback().unwrap(), Outcome::Rollback);
        assert_eq!(counter.depth(), 0);
    }

    #[test]
    fn test_nested_rollback_dooms_outer_commit() {
        let mut counter = TransactionCounter::new();
        begin(&mut counter);
        begin(&mut counter);
        assert_eq!(counter.rollback().unwrap(), Outcome::Deferred);
        assert!(counter.is_rollback_only());
        assert_eq!(counter.commit().unwrap(), Outcome::Rollback);

        // a fresh transaction starts clean
        assert_eq!(begin(&mut counter), Outcome::Begin);
        assert!(!counter.is_rollback_only());
        assert_eq!(counter.commit().unwrap(), Outcome::Commit);
    }

    #[test]
    fn test_unbalanced_calls_fail_fast() {
        let mut counter = TransactionCounter::new();
        let err = counter.commit().unwrap_err();
        assert!(matches!(err, DbError::Transaction(ref m) if m.contains("unbalanced commit")));
        let err = counter.rollback().unwrap_err();
        assert!(matches!(err, DbError::Transaction(ref m) if m.contains("unbalanced rollback")));
        assert_eq!(counter.depth(), 0);
    }

    #[test]
    fn test_begin_without_enter_keeps_depth() {
        let counter = TransactionCounter::new();
        assert_eq!(counter.begin(), Outcome::Begin);
        assert_eq!(counter.depth(), 0);
    }
}
