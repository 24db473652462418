//! Scope stacks carried by the entity readers.
//!
//! Four growable stacks track the constructs currently in scope while the
//! recursive descent runs: local variables, labeled statements, switch cases,
//! and type parameters. Every construct that introduces entries truncates the
//! affected stacks back to their entry lengths on exit, on error paths too,
//! and label/switch-case references are counted from a *base* re-established
//! around each function node, so nested function bodies cannot collide with
//! outer labels or cases.
//!
//! The whole state is cheaply cloneable: lazy completions capture a clone as
//! their snapshot and re-install it when resumed.

use crate::{
    ir::{LabeledStatementRc, SwitchCaseRc, TypeParameterRc, VariableDeclarationRc},
    Error, Result,
};

/// The live scope stacks of one decode call tree.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScopeState {
    /// Local variables, indexed absolutely within the current member.
    pub(crate) variables: Vec<VariableDeclarationRc>,
    /// Labeled statements, referenced relative to `label_base`.
    pub(crate) labels: Vec<LabeledStatementRc>,
    /// Switch cases, referenced relative to `switch_case_base`.
    pub(crate) switch_cases: Vec<SwitchCaseRc>,
    /// Type parameters, indexed absolutely.
    pub(crate) type_parameters: Vec<TypeParameterRc>,
    /// Label-reference base of the innermost function node.
    pub(crate) label_base: usize,
    /// Switch-case-reference base of the innermost function node.
    pub(crate) switch_case_base: usize,
}

impl ScopeState {
    /// Resolve an absolute variable-stack reference.
    pub(crate) fn variable(&self, index: usize) -> Result<VariableDeclarationRc> {
        self.variables
            .get(index)
            .cloned()
            .ok_or(Error::VariableIndexOutOfRange {
                index,
                depth: self.variables.len(),
            })
    }

    /// Resolve a base-relative label reference.
    pub(crate) fn label(&self, index: usize) -> Result<LabeledStatementRc> {
        self.labels
            .get(self.label_base + index)
            .cloned()
            .ok_or(Error::LabelIndexOutOfRange {
                index,
                depth: self.labels.len() - self.label_base.min(self.labels.len()),
            })
    }

    /// Resolve a base-relative switch-case reference.
    pub(crate) fn switch_case(&self, index: usize) -> Result<SwitchCaseRc> {
        self.switch_cases
            .get(self.switch_case_base + index)
            .cloned()
            .ok_or(Error::SwitchCaseIndexOutOfRange {
                index,
                depth: self.switch_cases.len() - self.switch_case_base.min(self.switch_cases.len()),
            })
    }

    /// Resolve an absolute type-parameter reference.
    pub(crate) fn type_parameter(&self, index: usize) -> Result<TypeParameterRc> {
        self.type_parameters
            .get(index)
            .cloned()
            .ok_or(Error::VariableIndexOutOfRange {
                index,
                depth: self.type_parameters.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, RwLock};

    use super::*;
    use crate::ir::{LabeledStatement, Statement};

    fn label() -> LabeledStatementRc {
        Arc::new(RwLock::new(LabeledStatement {
            body: Statement::Empty,
        }))
    }

    #[test]
    fn label_lookup_is_base_relative() {
        let mut scope = ScopeState::default();
        scope.labels.push(label());
        scope.labels.push(label());
        scope.label_base = 1;

        let resolved = scope.label(0).unwrap();
        assert!(Arc::ptr_eq(&resolved, &scope.labels[1]));
        assert!(scope.label(1).is_err());
    }

    #[test]
    fn variable_lookup_reports_depth() {
        let scope = ScopeState::default();
        match scope.variable(3) {
            Err(Error::VariableIndexOutOfRange { index, depth }) => {
                assert_eq!(index, 3);
                assert_eq!(depth, 0);
            }
            other => panic!("expected VariableIndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_clone_is_independent() {
        let mut scope = ScopeState::default();
        scope.labels.push(label());
        let snapshot = scope.clone();

        scope.labels.clear();
        assert_eq!(snapshot.labels.len(), 1);
    }
}
