//! Lazy materialization of class members and function bodies.
//!
//! Instead of eagerly recursing into a class's member region or a procedure's
//! body, the decoder may capture a *resumable unit*: the byte offset to resume
//! at, the owning sub-file context, and a snapshot of the scope stacks as they
//! were at the capture point. The unit is installed on the target node and can
//! be invoked independently, out of order, long after the initial decode
//! returned.
//!
//! Resumption is an ordinary synchronous call. It checks the ambient scope
//! state out of the shared context, installs the captured snapshot, performs
//! the normal eager decode, and restores the ambient state on return: fully
//! reentrant and side-effect-free on the decoder state once it returns, even
//! when a resume is triggered while another decode is logically in progress
//! higher up the call stack.
//!
//! Lazy reading is disabled automatically whenever more than one sub-file is
//! merged in one call, when the caller requests eager reading, or when a
//! metadata overlay is active (payload offsets may cross-reference nodes that
//! would not exist yet).
//!
//! # Examples
//!
//! ```rust,no_run
//! use dillscope::binary::lazy::{force_class_members, force_function_body};
//! # let component: dillscope::Component = unimplemented!();
//!
//! let library = component.libraries()[0].clone();
//! let class = library.read().expect("Failed to acquire read lock").classes[0].clone();
//! force_class_members(&class)?;
//!
//! let procedure = class.read().expect("Failed to acquire read lock").procedures[0].clone();
//! force_function_body(&procedure)?;
//! # Ok::<(), dillscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    binary::{context::SubFileContext, reader::with_reader, scope::ScopeState},
    ir::{ClassRc, ProcedureRc},
    Result,
};

/// Resumable unit that materializes the deferred member region of a class.
///
/// Captures the sub-file context, the offset just past the class's eager
/// header, the class end offset (for the trailing procedure index), and a
/// snapshot of the scope stacks at capture time.
pub struct LazyMembers {
    pub(crate) ctx: Arc<SubFileContext>,
    pub(crate) offset: usize,
    pub(crate) class_end: usize,
    pub(crate) snapshot: ScopeState,
    pub(crate) context: String,
}

impl LazyMembers {
    /// Perform the deferred member decode into `target`.
    pub(crate) fn resume(&self, target: &ClassRc) -> Result<()> {
        let body = with_reader(
            &self.ctx,
            &[],
            Some(self.snapshot.clone()),
            vec![self.context.clone()],
            |reader| {
                reader.seek(self.offset)?;
                reader.read_class_members(self.class_end)
            },
        )?;

        let mut class = write_lock!(target);
        class.annotations = body.annotations;
        class.type_parameters = body.type_parameters;
        class.supertype = body.supertype;
        class.mixed_in_type = body.mixed_in_type;
        class.implemented_types = body.implemented_types;
        class.fields = body.fields;
        class.constructors = body.constructors;
        class.procedures = body.procedures;
        Ok(())
    }
}

impl std::fmt::Debug for LazyMembers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyMembers")
            .field("offset", &self.offset)
            .field("class_end", &self.class_end)
            .finish()
    }
}

/// Resumable unit that materializes the deferred body of a procedure.
///
/// Captures the sub-file context, the offset of the body's option marker, and
/// a snapshot of the scope stacks (parameters included) at capture time.
pub struct LazyBody {
    pub(crate) ctx: Arc<SubFileContext>,
    pub(crate) offset: usize,
    pub(crate) snapshot: ScopeState,
    pub(crate) context: String,
}

impl LazyBody {
    /// Perform the deferred body decode into `target`'s function node.
    pub(crate) fn resume(&self, target: &ProcedureRc) -> Result<()> {
        let body = with_reader(
            &self.ctx,
            &[],
            Some(self.snapshot.clone()),
            vec![self.context.clone()],
            |reader| {
                reader.seek(self.offset)?;
                reader.read_optional_statement()
            },
        )?;

        write_lock!(target).function.body = body;
        Ok(())
    }
}

impl std::fmt::Debug for LazyBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyBody")
            .field("offset", &self.offset)
            .finish()
    }
}

/// Force the deferred member region of a class, if one is pending.
///
/// Idempotent: forcing an already materialized class is a no-op.
///
/// # Errors
/// Propagates any structural decode error from the deferred region.
pub fn force_class_members(class: &ClassRc) -> Result<()> {
    let completion = write_lock!(class).members_completion.take();
    if let Some(completion) = completion {
        completion.resume(class)?;
    }
    Ok(())
}

/// Force the deferred body of a procedure, if one is pending.
///
/// Idempotent: forcing an already materialized body is a no-op.
///
/// # Errors
/// Propagates any structural decode error from the deferred body.
pub fn force_function_body(procedure: &ProcedureRc) -> Result<()> {
    let completion = write_lock!(procedure).function.body_completion.take();
    if let Some(completion) = completion {
        completion.resume(procedure)?;
    }
    Ok(())
}
