//! Lexical borrow checker.
//!
//! Tracks mutability, moved-ness, and borrow counts per named binding while
//! the parser runs. Errors accumulate; the driver checks the list before
//! lowering each compile unit and clears it afterwards.
//!
//! The active guarantees on today's surface syntax are mutability and
//! redeclaration in nested scopes; the move/borrow operations exist for
//! explicit-borrow syntax and are exercised directly.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BorrowError {
    #[error("Variable '{0}' already declared in this scope")]
    AlreadyDeclared(String),

    #[error("Cannot use '{0}': value has been moved")]
    UseAfterMove(String),

    #[error("Cannot assign to undeclared variable '{0}'")]
    AssignUndeclared(String),

    #[error("Cannot assign to immutable variable '{0}'. Consider using 'let mut {0}'")]
    AssignImmutable(String),

    #[error("Cannot assign to '{0}' while it is borrowed immutably")]
    AssignWhileBorrowedImm(String),

    #[error("Cannot assign to '{0}' while it is borrowed mutably")]
    AssignWhileBorrowedMut(String),

    #[error("Cannot borrow '{0}': value has been moved")]
    BorrowAfterMove(String),

    #[error("Cannot borrow '{0}' as immutable: already borrowed as mutable")]
    ImmWhileMutBorrowed(String),

    #[error("Cannot borrow '{0}' as mutable: variable is not mutable")]
    MutBorrowOfImmutable(String),

    #[error("Cannot borrow '{0}' as mutable: already borrowed as immutable")]
    MutWhileImmBorrowed(String),

    #[error("Cannot borrow '{0}' as mutable more than once at a time")]
    DoubleMutBorrow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowKind {
    Immutable,
    Mutable,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableState {
    pub mutable: bool,
    pub moved: bool,
    pub imm_borrows: u32,
    /// At most one.
    pub mut_borrows: u32,
    pub scope_level: u32,
}

#[derive(Debug, Default)]
pub struct BorrowChecker {
    variables: HashMap<String, VariableState>,
    current_scope: u32,
    errors: Vec<BorrowError>,
}

impl BorrowChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.current_scope += 1;
    }

    /// Removes every variable declared in the scope being left.
    pub fn exit_scope(&mut self) {
        let level = self.current_scope;
        self.variables.retain(|_, state| state.scope_level != level);
        self.current_scope = self.current_scope.saturating_sub(1);
    }

    pub fn declare(&mut self, name: &str, mutable: bool) {
        if let Some(state) = self.variables.get(name) {
            if state.scope_level == self.current_scope {
                self.errors
                    .push(BorrowError::AlreadyDeclared(name.to_string()));
                return;
            }
        }
        self.variables.insert(
            name.to_string(),
            VariableState {
                mutable,
                scope_level: self.current_scope,
                ..VariableState::default()
            },
        );
    }

    /// Unknown names are allowed (parameters of enclosing externs and such);
    /// moved names fail.
    pub fn check_use(&mut self, name: &str) -> bool {
        match self.variables.get(name) {
            Some(state) if state.moved => {
                self.errors.push(BorrowError::UseAfterMove(name.to_string()));
                false
            }
            _ => true,
        }
    }

    pub fn check_assign(&mut self, name: &str) -> bool {
        let state = match self.variables.get(name) {
            Some(state) => state,
            None => {
                self.errors
                    .push(BorrowError::AssignUndeclared(name.to_string()));
                return false;
            }
        };
        if !state.mutable {
            self.errors
                .push(BorrowError::AssignImmutable(name.to_string()));
            return false;
        }
        if state.imm_borrows > 0 {
            self.errors
                .push(BorrowError::AssignWhileBorrowedImm(name.to_string()));
            return false;
        }
        if state.mut_borrows > 0 {
            self.errors
                .push(BorrowError::AssignWhileBorrowedMut(name.to_string()));
            return false;
        }
        true
    }

    pub fn mark_moved(&mut self, name: &str) {
        if let Some(state) = self.variables.get_mut(name) {
            state.moved = true;
        }
    }

    pub fn borrow_imm(&mut self, name: &str) -> bool {
        let state = match self.variables.get_mut(name) {
            Some(state) => state,
            None => return true,
        };
        if state.moved {
            self.errors
                .push(BorrowError::BorrowAfterMove(name.to_string()));
            return false;
        }
        if state.mut_borrows > 0 {
            self.errors
                .push(BorrowError::ImmWhileMutBorrowed(name.to_string()));
            return false;
        }
        state.imm_borrows += 1;
        true
    }

    pub fn borrow_mut(&mut self, name: &str) -> bool {
        let state = match self.variables.get_mut(name) {
            Some(state) => state,
            None => return true,
        };
        if state.moved {
            self.errors
                .push(BorrowError::BorrowAfterMove(name.to_string()));
            return false;
        }
        if !state.mutable {
            self.errors
                .push(BorrowError::MutBorrowOfImmutable(name.to_string()));
            return false;
        }
        if state.imm_borrows > 0 {
            self.errors
                .push(BorrowError::MutWhileImmBorrowed(name.to_string()));
            return false;
        }
        if state.mut_borrows > 0 {
            self.errors
                .push(BorrowError::DoubleMutBorrow(name.to_string()));
            return false;
        }
        state.mut_borrows = 1;
        true
    }

    pub fn release(&mut self, name: &str, kind: BorrowKind) {
        if let Some(state) = self.variables.get_mut(name) {
            match kind {
                BorrowKind::Immutable => state.imm_borrows = state.imm_borrows.saturating_sub(1),
                BorrowKind::Mutable => state.mut_borrows = state.mut_borrows.saturating_sub(1),
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[BorrowError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<BorrowError> {
        std::mem::take(&mut self.errors)
    }

    pub fn state(&self, name: &str) -> Option<&VariableState> {
        self.variables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_use() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", false);
        assert!(checker.check_use("x"));
        assert!(!checker.has_errors());
    }

    #[test]
    fn test_unknown_use_is_allowed() {
        let mut checker = BorrowChecker::new();
        assert!(checker.check_use("mystery"));
        assert!(!checker.has_errors());
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", false);
        checker.declare("x", true);
        assert_eq!(
            checker.errors(),
            &[BorrowError::AlreadyDeclared("x".to_string())]
        );
    }

    #[test]
    fn test_shadowing_in_nested_scope_is_allowed() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", false);
        checker.enter_scope();
        checker.declare("x", true);
        assert!(!checker.has_errors());
        checker.exit_scope();
    }

    #[test]
    fn test_exit_scope_removes_inner_variables() {
        let mut checker = BorrowChecker::new();
        checker.enter_scope();
        checker.declare("i", true);
        checker.exit_scope();
        assert!(checker.state("i").is_none());
    }

    #[test]
    fn test_enter_exit_leaves_table_unchanged() {
        let mut checker = BorrowChecker::new();
        checker.declare("outer", true);
        let before = checker.state("outer").cloned();
        checker.enter_scope();
        checker.exit_scope();
        assert_eq!(checker.state("outer").cloned(), before);
        assert!(!checker.has_errors());
    }

    #[test]
    fn test_use_after_move() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", false);
        checker.mark_moved("x");
        assert!(!checker.check_use("x"));
        assert_eq!(
            checker.errors(),
            &[BorrowError::UseAfterMove("x".to_string())]
        );
    }

    #[test]
    fn test_assign_to_immutable() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", false);
        assert!(!checker.check_assign("x"));
        assert_eq!(
            checker.errors(),
            &[BorrowError::AssignImmutable("x".to_string())]
        );
    }

    #[test]
    fn test_assign_to_undeclared() {
        let mut checker = BorrowChecker::new();
        assert!(!checker.check_assign("x"));
        assert_eq!(
            checker.errors(),
            &[BorrowError::AssignUndeclared("x".to_string())]
        );
    }

    #[test]
    fn test_assign_while_borrowed() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", true);
        assert!(checker.borrow_imm("x"));
        assert!(!checker.check_assign("x"));
        checker.take_errors();

        checker.release("x", BorrowKind::Immutable);
        assert!(checker.check_assign("x"));
        assert!(!checker.has_errors());
    }

    #[test]
    fn test_two_imm_borrows_are_fine() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", true);
        assert!(checker.borrow_imm("x"));
        assert!(checker.borrow_imm("x"));
        assert_eq!(checker.state("x").map(|s| s.imm_borrows), Some(2));
    }

    #[test]
    fn test_mut_borrow_conflicts() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", true);
        assert!(checker.borrow_mut("x"));
        assert!(!checker.borrow_mut("x"));
        assert!(!checker.borrow_imm("x"));
        assert_eq!(
            checker.errors(),
            &[
                BorrowError::DoubleMutBorrow("x".to_string()),
                BorrowError::ImmWhileMutBorrowed("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_mut_borrow_of_immutable() {
        let mut checker = BorrowChecker::new();
        checker.declare("x", false);
        assert!(!checker.borrow_mut("x"));
        assert_eq!(
            checker.errors(),
            &[BorrowError::MutBorrowOfImmutable("x".to_string())]
        );
    }

    #[test]
    fn test_borrow_invariants_hold() {
        // mut_borrows stays in {0, 1} and mut_borrows * imm_borrows == 0.
        let mut checker = BorrowChecker::new();
        checker.declare("x", true);
        checker.borrow_mut("x");
        checker.borrow_mut("x");
        checker.borrow_imm("x");
        let state = checker.state("x").cloned().unwrap_or_default();
        assert!(state.mut_borrows <= 1);
        assert_eq!(state.mut_borrows * state.imm_borrows, 0);

        checker.release("x", BorrowKind::Mutable);
        checker.borrow_imm("x");
        checker.borrow_imm("x");
        let state = checker.state("x").cloned().unwrap_or_default();
        assert!(state.mut_borrows <= 1);
        assert_eq!(state.mut_borrows * state.imm_borrows, 0);
    }
}
