//! Recursive-descent entity readers.
//!
//! [`EntityReader`] is the mutually recursive descent parser over the tagged
//! node encoding: libraries, classes, extensions, typedefs, fields,
//! constructors, procedures, initializers, function nodes, statements,
//! expressions, types, and argument lists. It carries the scope state
//! (active local variables, labels, switch cases, type parameters) as it
//! descends, truncating every stack back to its entry length on exit from the
//! construct that grew it, error exits included.
//!
//! # Ambient state discipline
//!
//! At most one decode or lazy-resume call is active per sub-file context at a
//! time. [`with_reader`] checks the ambient scope state out of the context's
//! parking slot, hands a reader owning it to the callback, and parks state
//! back afterwards; a lazy resume installs its captured snapshot instead and
//! restores the previously parked state when it returns. See
//! [`crate::binary::lazy`] for the resumable units built on top of this.
//!
//! # Named-node upserts
//!
//! Declarations bound to a canonical name are constructed with a
//! "merge, don't duplicate" policy: if the shared root already binds the name
//! to a node of the right kind, that node's fields are overwritten in place
//! and every existing handle observes the update. Fresh nodes are allocated
//! only for never-bound names, or always when
//! [`crate::LoadOptions::always_create_new_named_nodes`] is set.

use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::{
    binary::{
        context::SubFileContext,
        index::{ClassIndex, LibraryIndex},
        lazy::{LazyBody, LazyMembers},
        metadata::MetadataRepository,
        names::lookup_reference,
        scope::ScopeState,
        tags::{
            NodeTag, SPECIALIZED_INT_LITERAL, SPECIALIZED_INT_LITERAL_BIAS,
            SPECIALIZED_PAYLOAD_MASK, SPECIALIZED_TAG_MASK, SPECIALIZED_VARIABLE_GET,
            SPECIALIZED_VARIABLE_SET,
        },
    },
    file::parser::Parser,
    ir::{
        Arguments, AsyncMarker, Catch, Class, ClassFlags, ClassRc, Constructor, ConstructorFlags,
        ConstructorRc, DartType, DependencyFlags, Expression, Extension, ExtensionMember,
        ExtensionMemberKind, ExtensionRc, Field, FieldFlags, FieldRc, FunctionNode, Initializer,
        LabeledStatement, LabeledStatementRc, Library, LibraryDependency, LibraryFlags, LibraryRc,
        LogicalOperator, Name, NamedType, NodeBinding, Nullability, Procedure, ProcedureFlags,
        ProcedureKind, ProcedureRc, Reference, Statement, Supertype, SwitchCase, SwitchCaseRc,
        Typedef, TypedefRc, TypeParameter, TypeParameterFlags, TypeParameterRc,
        VariableDeclaration, VariableDeclarationRc, VariableFlags,
    },
    Error, Result,
};

/// Run `f` with a reader over the sub-file, handling the ambient-state
/// check-out/park protocol described in the module docs.
///
/// With `install: None` the reader continues the parked ambient state; with
/// `install: Some(snapshot)` the snapshot is installed for the duration of
/// the call and the previously parked state is restored afterwards.
pub(crate) fn with_reader<T>(
    ctx: &Arc<SubFileContext>,
    repositories: &[Box<dyn MetadataRepository>],
    install: Option<ScopeState>,
    path: Vec<String>,
    f: impl FnOnce(&mut EntityReader<'_>) -> Result<T>,
) -> Result<T> {
    let prior = std::mem::take(&mut *lock!(ctx.parked));
    let (scope, restore) = match install {
        Some(snapshot) => (snapshot, Some(prior)),
        None => (prior, None),
    };

    let mut reader = EntityReader {
        parser: Parser::new(ctx.data()),
        ctx,
        repositories,
        scope,
        path,
    };

    let result = f(&mut reader);

    let parked = match restore {
        Some(previous) => previous,
        None => std::mem::take(&mut reader.scope),
    };
    *lock!(ctx.parked) = parked;

    result
}

/// Everything the eager members of one class decode into.
pub(crate) struct ClassBody {
    pub(crate) annotations: Vec<Expression>,
    pub(crate) type_parameters: Vec<TypeParameterRc>,
    pub(crate) supertype: Option<Supertype>,
    pub(crate) mixed_in_type: Option<Supertype>,
    pub(crate) implemented_types: Vec<Supertype>,
    pub(crate) fields: Vec<FieldRc>,
    pub(crate) constructors: Vec<ConstructorRc>,
    pub(crate) procedures: Vec<ProcedureRc>,
}

/// The recursive descent parser over one sub-file's node encodings.
pub(crate) struct EntityReader<'a> {
    parser: Parser<'a>,
    ctx: &'a Arc<SubFileContext>,
    repositories: &'a [Box<dyn MetadataRepository>],
    scope: ScopeState,
    path: Vec<String>,
}

impl<'a> EntityReader<'a> {
    // ------------------------------------------------------------------
    // Primitives and shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn pos(&self) -> usize {
        self.parser.pos()
    }

    pub(crate) fn seek(&mut self, pos: usize) -> Result<()> {
        self.parser.seek(pos)
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8> {
        self.parser.read_byte()
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.parser.read_bytes(len)
    }

    pub(crate) fn read_uint30(&mut self) -> Result<u32> {
        self.parser.read_uint30()
    }

    pub(crate) fn read_double(&mut self) -> Result<f64> {
        self.parser.read_double()
    }

    fn context_path(&self) -> String {
        if self.path.is_empty() {
            "<component>".to_string()
        } else {
            self.path.join("::")
        }
    }

    pub(crate) fn structural_error(&self, message: impl Into<String>) -> Error {
        Error::Structural {
            message: message.into(),
            offset: self.parser.pos(),
            context: self.context_path(),
        }
    }

    pub(crate) fn unexpected_tag_at(&self, tag: u8, offset: usize) -> Error {
        Error::UnexpectedTag {
            tag,
            offset,
            context: self.context_path(),
        }
    }

    fn read_node_tag(&mut self) -> Result<NodeTag> {
        let offset = self.parser.pos();
        let byte = self.parser.read_byte()?;
        NodeTag::from_repr(byte).ok_or_else(|| self.unexpected_tag_at(byte, offset))
    }

    fn expect_tag(&mut self, expected: NodeTag) -> Result<()> {
        let tag = self.read_node_tag()?;
        if tag != expected {
            return Err(self.structural_error(format!("Expected {expected:?} tag, found {tag:?}")));
        }
        Ok(())
    }

    fn read_option<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<Option<T>> {
        let offset = self.parser.pos();
        match self.read_node_tag()? {
            NodeTag::Nothing => Ok(None),
            NodeTag::Something => f(self).map(Some),
            tag => Err(self.unexpected_tag_at(tag as u8, offset)),
        }
    }

    pub(crate) fn read_string_index(&mut self) -> Result<String> {
        let index = self.read_uint30()? as usize;
        self.ctx.strings.get(index).map(str::to_string)
    }

    fn read_optional_name_string(&mut self) -> Result<Option<String>> {
        let text = self.read_string_index()?;
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    /// Biased index into the source table; `0` means "no URI".
    fn read_uri_reference(&mut self) -> Result<Option<String>> {
        let biased = self.read_uint30()?;
        if biased == 0 {
            return Ok(None);
        }
        match self.ctx.source_uris.get(biased as usize - 1) {
            Some(uri) => Ok(uri.clone()),
            None => Err(self.structural_error(format!(
                "Source index {} out of range ({} entries)",
                biased - 1,
                self.ctx.source_uris.len()
            ))),
        }
    }

    pub(crate) fn read_reference(&mut self) -> Result<Option<Reference>> {
        let biased = self.read_uint30()?;
        lookup_reference(&self.ctx.names, biased)
    }

    pub(crate) fn read_required_reference(&mut self) -> Result<Reference> {
        self.read_reference()?
            .ok_or_else(|| self.structural_error("Missing required reference"))
    }

    fn read_name(&mut self) -> Result<Name> {
        let text = self.read_string_index()?;
        let library = if text.starts_with('_') {
            self.read_reference()?
        } else {
            None
        };
        Ok(Name { text, library })
    }

    fn read_nullability(&mut self) -> Result<Nullability> {
        let byte = self.read_byte()?;
        Nullability::from_repr(byte)
            .ok_or_else(|| self.structural_error(format!("Invalid nullability value {byte}")))
    }

    fn read_expression_list(&mut self) -> Result<Vec<Expression>> {
        let count = self.read_uint30()? as usize;
        let mut expressions = Vec::with_capacity(count);
        for _ in 0..count {
            expressions.push(self.read_expression()?);
        }
        Ok(expressions)
    }

    fn read_annotations(&mut self) -> Result<Vec<Expression>> {
        self.read_expression_list()
    }

    fn read_type_list(&mut self) -> Result<Vec<DartType>> {
        let count = self.read_uint30()? as usize;
        let mut types = Vec::with_capacity(count);
        for _ in 0..count {
            types.push(self.read_dart_type()?);
        }
        Ok(types)
    }

    fn associate_metadata(&mut self, node_offset: usize) -> Result<()> {
        if self.repositories.is_empty() {
            return Ok(());
        }

        let node_offset = u32::try_from(node_offset)
            .map_err(|_| self.structural_error("Node offset exceeds offset space"))?;
        let (payload_start, payload_end) = self.ctx.metadata_payloads;
        for repository in self.repositories {
            for mapping in &self.ctx.metadata_mappings {
                if mapping.tag != repository.tag() {
                    continue;
                }
                let Some(&payload_offset) = mapping.pairs.get(&node_offset) else {
                    continue;
                };
                let at = payload_offset as usize;
                if at < payload_start || at > payload_end {
                    return Err(self.structural_error(format!(
                        "Metadata payload offset {at} outside payload region {payload_start}..{payload_end}"
                    )));
                }
                repository.attach(node_offset, &self.parser.data()[at..payload_end])?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Named-node upserts
    // ------------------------------------------------------------------

    fn reuse_allowed(&self) -> bool {
        !self.ctx.options.always_create_new_named_nodes
    }

    fn bind_library(&self, reference: Reference, decoded: Library) -> LibraryRc {
        if self.reuse_allowed() {
            if let Some(NodeBinding::Library(existing)) = self.ctx.root.binding(reference) {
                *write_lock!(existing) = decoded;
                return existing;
            }
        }
        let fresh = Arc::new(RwLock::new(decoded));
        self.ctx
            .root
            .bind(reference.name_id(), NodeBinding::Library(Arc::clone(&fresh)));
        fresh
    }

    fn bind_class(&self, reference: Reference, decoded: Class) -> ClassRc {
        if self.reuse_allowed() {
            if let Some(NodeBinding::Class(existing)) = self.ctx.root.binding(reference) {
                *write_lock!(existing) = decoded;
                return existing;
            }
        }
        let fresh = Arc::new(RwLock::new(decoded));
        self.ctx
            .root
            .bind(reference.name_id(), NodeBinding::Class(Arc::clone(&fresh)));
        fresh
    }

    fn bind_typedef(&self, reference: Reference, decoded: Typedef) -> TypedefRc {
        if self.reuse_allowed() {
            if let Some(NodeBinding::Typedef(existing)) = self.ctx.root.binding(reference) {
                *write_lock!(existing) = decoded;
                return existing;
            }
        }
        let fresh = Arc::new(RwLock::new(decoded));
        self.ctx
            .root
            .bind(reference.name_id(), NodeBinding::Typedef(Arc::clone(&fresh)));
        fresh
    }

    fn bind_extension(&self, reference: Reference, decoded: Extension) -> ExtensionRc {
        if self.reuse_allowed() {
            if let Some(NodeBinding::Extension(existing)) = self.ctx.root.binding(reference) {
                *write_lock!(existing) = decoded;
                return existing;
            }
        }
        let fresh = Arc::new(RwLock::new(decoded));
        self.ctx.root.bind(
            reference.name_id(),
            NodeBinding::Extension(Arc::clone(&fresh)),
        );
        fresh
    }

    fn bind_field(&self, reference: Reference, decoded: Field) -> FieldRc {
        if self.reuse_allowed() {
            if let Some(NodeBinding::Field(existing)) = self.ctx.root.binding(reference) {
                *write_lock!(existing) = decoded;
                return existing;
            }
        }
        let fresh = Arc::new(RwLock::new(decoded));
        self.ctx
            .root
            .bind(reference.name_id(), NodeBinding::Field(Arc::clone(&fresh)));
        fresh
    }

    fn bind_constructor(&self, reference: Reference, decoded: Constructor) -> ConstructorRc {
        if self.reuse_allowed() {
            if let Some(NodeBinding::Constructor(existing)) = self.ctx.root.binding(reference) {
                *write_lock!(existing) = decoded;
                return existing;
            }
        }
        let fresh = Arc::new(RwLock::new(decoded));
        self.ctx.root.bind(
            reference.name_id(),
            NodeBinding::Constructor(Arc::clone(&fresh)),
        );
        fresh
    }

    fn bind_procedure(&self, reference: Reference, decoded: Procedure) -> ProcedureRc {
        if self.reuse_allowed() {
            if let Some(NodeBinding::Procedure(existing)) = self.ctx.root.binding(reference) {
                *write_lock!(existing) = decoded;
                return existing;
            }
        }
        let fresh = Arc::new(RwLock::new(decoded));
        self.ctx.root.bind(
            reference.name_id(),
            NodeBinding::Procedure(Arc::clone(&fresh)),
        );
        fresh
    }

    // ------------------------------------------------------------------
    // Libraries and library-level declarations
    // ------------------------------------------------------------------

    /// Decode the library spanning `[start, end)` within the sub-file.
    pub(crate) fn read_library(&mut self, start: usize, end: usize) -> Result<LibraryRc> {
        self.seek(start)?;
        let flags = LibraryFlags::from_bits_truncate(self.read_byte()?);
        let language_version = (self.read_uint30()?, self.read_uint30()?);
        let reference = self.read_required_reference()?;
        let name = self.read_optional_name_string()?;
        let file_uri = self.read_uri_reference()?;

        self.path.push(self.ctx.root.path(reference.name_id()));
        trace!(library = self.path.last().map(String::as_str), "decoding library");
        let result = self.read_library_tail(start, end, reference, flags, language_version, name, file_uri);
        self.path.pop();
        result
    }

    fn read_library_tail(
        &mut self,
        start: usize,
        end: usize,
        reference: Reference,
        flags: LibraryFlags,
        language_version: (u32, u32),
        name: Option<String>,
        file_uri: Option<String>,
    ) -> Result<LibraryRc> {
        let annotations = self.read_annotations()?;

        let dependency_count = self.read_uint30()? as usize;
        let mut dependencies = Vec::with_capacity(dependency_count);
        for _ in 0..dependency_count {
            dependencies.push(self.read_library_dependency()?);
        }

        let export_count = self.read_uint30()? as usize;
        let mut additional_exports = Vec::with_capacity(export_count);
        for _ in 0..export_count {
            additional_exports.push(self.read_required_reference()?);
        }

        let typedef_count = self.read_uint30()? as usize;
        let mut typedefs = Vec::with_capacity(typedef_count);
        for _ in 0..typedef_count {
            typedefs.push(self.read_typedef()?);
        }

        let index = LibraryIndex::read(self.parser.data(), start, end)?;

        let mut classes = Vec::with_capacity(index.class_offsets.len().saturating_sub(1));
        for pair in index.class_offsets.windows(2) {
            classes.push(self.read_class(pair[0] as usize, pair[1] as usize)?);
        }
        if let Some(last) = index.class_offsets.last() {
            self.seek(*last as usize)?;
        }

        let extension_count = self.read_uint30()? as usize;
        let mut extensions = Vec::with_capacity(extension_count);
        for _ in 0..extension_count {
            extensions.push(self.read_extension()?);
        }

        let field_count = self.read_uint30()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(self.read_field()?);
        }

        let mut procedures = Vec::with_capacity(index.procedure_offsets.len().saturating_sub(1));
        for pair in index.procedure_offsets.windows(2) {
            procedures.push(self.read_procedure(pair[0] as usize, pair[1] as usize)?);
        }

        let library = self.bind_library(
            reference,
            Library {
                reference,
                flags,
                language_version,
                name,
                file_uri,
                annotations,
                dependencies,
                additional_exports,
                typedefs,
                classes,
                extensions,
                fields,
                procedures,
            },
        );
        self.associate_metadata(start)?;
        Ok(library)
    }

    fn read_library_dependency(&mut self) -> Result<LibraryDependency> {
        let flags = DependencyFlags::from_bits_truncate(self.read_byte()?);
        let annotations = self.read_annotations()?;
        let target = self.read_required_reference()?;
        let name = self.read_optional_name_string()?;
        Ok(LibraryDependency {
            flags,
            annotations,
            target,
            name,
        })
    }

    fn read_typedef(&mut self) -> Result<TypedefRc> {
        let start = self.pos();
        self.expect_tag(NodeTag::Typedef)?;
        let reference = self.read_required_reference()?;
        let file_uri = self.read_uri_reference()?;
        let file_offset = self.read_uint30()?;
        let name = self.read_string_index()?;

        self.path.push(name.clone());
        let mark = self.scope.type_parameters.len();
        let tail = self.read_typedef_tail();
        self.scope.type_parameters.truncate(mark);
        self.path.pop();
        let (annotations, type_parameters, aliased_type) = tail?;

        let typedef = self.bind_typedef(
            reference,
            Typedef {
                reference,
                name,
                file_uri,
                file_offset,
                annotations,
                type_parameters,
                aliased_type,
            },
        );
        self.associate_metadata(start)?;
        Ok(typedef)
    }

    fn read_typedef_tail(
        &mut self,
    ) -> Result<(Vec<Expression>, Vec<TypeParameterRc>, DartType)> {
        let annotations = self.read_annotations()?;
        let type_parameters = self.read_type_parameter_list()?;
        let aliased_type = self.read_dart_type()?;
        Ok((annotations, type_parameters, aliased_type))
    }

    fn read_extension(&mut self) -> Result<ExtensionRc> {
        let start = self.pos();
        self.expect_tag(NodeTag::Extension)?;
        let reference = self.read_required_reference()?;
        let name = self.read_string_index()?;
        let file_uri = self.read_uri_reference()?;
        let file_offset = self.read_uint30()?;

        self.path.push(name.clone());
        let mark = self.scope.type_parameters.len();
        let tail = self.read_extension_tail();
        self.scope.type_parameters.truncate(mark);
        self.path.pop();
        let (type_parameters, on_type, members) = tail?;

        let extension = self.bind_extension(
            reference,
            Extension {
                reference,
                name,
                file_uri,
                file_offset,
                type_parameters,
                on_type,
                members,
            },
        );
        self.associate_metadata(start)?;
        Ok(extension)
    }

    fn read_extension_tail(
        &mut self,
    ) -> Result<(Vec<TypeParameterRc>, DartType, Vec<ExtensionMember>)> {
        let type_parameters = self.read_type_parameter_list()?;
        let on_type = self.read_dart_type()?;

        let member_count = self.read_uint30()? as usize;
        let mut members = Vec::with_capacity(member_count);
        for _ in 0..member_count {
            let name = self.read_string_index()?;
            let kind_byte = self.read_byte()?;
            let kind = ExtensionMemberKind::from_repr(kind_byte).ok_or_else(|| {
                self.structural_error(format!("Invalid extension member kind {kind_byte}"))
            })?;
            let is_static = self.read_byte()? & 0x01 != 0;
            let member = self.read_required_reference()?;
            members.push(ExtensionMember {
                name,
                kind,
                is_static,
                member,
            });
        }

        Ok((type_parameters, on_type, members))
    }

    // ------------------------------------------------------------------
    // Classes and members
    // ------------------------------------------------------------------

    fn read_class(&mut self, start: usize, end: usize) -> Result<ClassRc> {
        self.seek(start)?;
        self.expect_tag(NodeTag::Class)?;
        let reference = self.read_required_reference()?;
        let file_uri = self.read_uri_reference()?;
        let file_offset = self.read_uint30()?;
        let end_offset = self.read_uint30()?;
        let flags = ClassFlags::from_bits_truncate(self.read_byte()?);
        let name = self.read_string_index()?;

        self.path.push(name.clone());
        let class = if self.ctx.lazy_enabled {
            let completion = LazyMembers {
                ctx: Arc::clone(self.ctx),
                offset: self.pos(),
                class_end: end,
                snapshot: self.scope.clone(),
                context: self.context_path(),
            };
            Ok(self.bind_class(
                reference,
                Class {
                    reference,
                    name,
                    file_uri,
                    file_offset,
                    end_offset,
                    flags,
                    annotations: Vec::new(),
                    type_parameters: Vec::new(),
                    supertype: None,
                    mixed_in_type: None,
                    implemented_types: Vec::new(),
                    fields: Vec::new(),
                    constructors: Vec::new(),
                    procedures: Vec::new(),
                    members_completion: Some(completion),
                },
            ))
        } else {
            match self.read_class_members(end) {
                Ok(body) => Ok(self.bind_class(
                    reference,
                    Class {
                        reference,
                        name,
                        file_uri,
                        file_offset,
                        end_offset,
                        flags,
                        annotations: body.annotations,
                        type_parameters: body.type_parameters,
                        supertype: body.supertype,
                        mixed_in_type: body.mixed_in_type,
                        implemented_types: body.implemented_types,
                        fields: body.fields,
                        constructors: body.constructors,
                        procedures: body.procedures,
                        members_completion: None,
                    },
                )),
                Err(error) => Err(error),
            }
        };
        self.path.pop();

        let class = class?;
        self.associate_metadata(start)?;
        Ok(class)
    }

    /// Decode the member region of a class whose byte range ends at `class_end`.
    ///
    /// The cursor must sit right after the class's eager header fields; this is
    /// both the eager path and the target of a [`LazyMembers`] resume.
    pub(crate) fn read_class_members(&mut self, class_end: usize) -> Result<ClassBody> {
        let mark = self.scope.type_parameters.len();
        let result = self.read_class_members_inner(class_end);
        self.scope.type_parameters.truncate(mark);
        result
    }

    fn read_class_members_inner(&mut self, class_end: usize) -> Result<ClassBody> {
        let annotations = self.read_annotations()?;
        let type_parameters = self.read_type_parameter_list()?;
        let supertype = self.read_option(Self::read_supertype)?;
        let mixed_in_type = self.read_option(Self::read_supertype)?;

        let implemented_count = self.read_uint30()? as usize;
        let mut implemented_types = Vec::with_capacity(implemented_count);
        for _ in 0..implemented_count {
            implemented_types.push(self.read_supertype()?);
        }

        let field_count = self.read_uint30()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(self.read_field()?);
        }

        let constructor_count = self.read_uint30()? as usize;
        let mut constructors = Vec::with_capacity(constructor_count);
        for _ in 0..constructor_count {
            constructors.push(self.read_constructor()?);
        }

        let index = ClassIndex::read(self.parser.data(), class_end)?;
        let mut procedures = Vec::with_capacity(index.procedure_offsets.len().saturating_sub(1));
        for pair in index.procedure_offsets.windows(2) {
            procedures.push(self.read_procedure(pair[0] as usize, pair[1] as usize)?);
        }

        Ok(ClassBody {
            annotations,
            type_parameters,
            supertype,
            mixed_in_type,
            implemented_types,
            fields,
            constructors,
            procedures,
        })
    }

    fn read_supertype(&mut self) -> Result<Supertype> {
        let class_reference = self.read_required_reference()?;
        let type_arguments = self.read_type_list()?;
        Ok(Supertype {
            class_reference,
            type_arguments,
        })
    }

    fn read_field(&mut self) -> Result<FieldRc> {
        let start = self.pos();
        self.expect_tag(NodeTag::Field)?;
        let reference = self.read_required_reference()?;
        let file_uri = self.read_uri_reference()?;
        let file_offset = self.read_uint30()?;
        let flags = FieldFlags::from_bits_truncate(self.read_byte()?);
        let name = self.read_name()?;

        self.path.push(name.text.clone());
        let tail = self.read_field_tail();
        self.path.pop();
        let (annotations, declared_type, initializer) = tail?;

        let field = self.bind_field(
            reference,
            Field {
                reference,
                name,
                file_uri,
                file_offset,
                flags,
                annotations,
                declared_type,
                initializer,
            },
        );
        self.associate_metadata(start)?;
        Ok(field)
    }

    fn read_field_tail(
        &mut self,
    ) -> Result<(Vec<Expression>, DartType, Option<Expression>)> {
        let annotations = self.read_annotations()?;
        let declared_type = self.read_dart_type()?;
        let initializer = self.read_option(Self::read_expression)?;
        Ok((annotations, declared_type, initializer))
    }

    fn read_constructor(&mut self) -> Result<ConstructorRc> {
        let start = self.pos();
        self.expect_tag(NodeTag::Constructor)?;
        let reference = self.read_required_reference()?;
        let file_uri = self.read_uri_reference()?;
        let file_offset = self.read_uint30()?;
        let flags = ConstructorFlags::from_bits_truncate(self.read_byte()?);
        let name = self.read_name()?;

        self.path.push(name.text.clone());
        let variable_mark = self.scope.variables.len();
        let tail = self.read_constructor_tail();
        self.scope.variables.truncate(variable_mark);
        self.path.pop();
        let (annotations, function, initializers) = tail?;

        let constructor = self.bind_constructor(
            reference,
            Constructor {
                reference,
                name,
                file_uri,
                file_offset,
                flags,
                annotations,
                function,
                initializers,
            },
        );
        self.associate_metadata(start)?;
        Ok(constructor)
    }

    fn read_constructor_tail(
        &mut self,
    ) -> Result<(Vec<Expression>, FunctionNode, Vec<Initializer>)> {
        let annotations = self.read_annotations()?;
        // Parameters stay in scope for the initializer list; the constructor
        // itself truncates the variable stack when it is done.
        let function = self.read_function_node(true, None)?;

        let initializer_count = self.read_uint30()? as usize;
        let mut initializers = Vec::with_capacity(initializer_count);
        for _ in 0..initializer_count {
            initializers.push(self.read_initializer()?);
        }

        Ok((annotations, function, initializers))
    }

    fn read_procedure(&mut self, start: usize, end: usize) -> Result<ProcedureRc> {
        self.seek(start)?;
        self.expect_tag(NodeTag::Procedure)?;
        let reference = self.read_required_reference()?;
        let file_uri = self.read_uri_reference()?;
        let file_offset = self.read_uint30()?;
        let kind_byte = self.read_byte()?;
        let kind = ProcedureKind::from_repr(kind_byte)
            .ok_or_else(|| self.structural_error(format!("Invalid procedure kind {kind_byte}")))?;
        let flags = ProcedureFlags::from_bits_truncate(self.read_byte()?);
        let name = self.read_name()?;

        self.path.push(name.text.clone());
        let tail = self.read_procedure_tail(end);
        self.path.pop();
        let (annotations, function) = tail?;

        let procedure = self.bind_procedure(
            reference,
            Procedure {
                reference,
                name,
                file_uri,
                file_offset,
                kind,
                flags,
                annotations,
                function,
            },
        );
        self.associate_metadata(start)?;
        Ok(procedure)
    }

    fn read_procedure_tail(&mut self, end: usize) -> Result<(Vec<Expression>, FunctionNode)> {
        let annotations = self.read_annotations()?;
        let function = self.read_function_node(false, Some(end))?;
        Ok((annotations, function))
    }

    fn read_initializer(&mut self) -> Result<Initializer> {
        let offset = self.pos();
        let tag = self.read_node_tag()?;
        let is_synthetic = self.read_byte()? != 0;

        Ok(match tag {
            NodeTag::InvalidInitializer => Initializer::Invalid { is_synthetic },
            NodeTag::FieldInitializer => Initializer::Field {
                is_synthetic,
                field: self.read_required_reference()?,
                value: Box::new(self.read_expression()?),
            },
            NodeTag::SuperInitializer => Initializer::Super {
                is_synthetic,
                file_offset: self.read_uint30()?,
                target: self.read_required_reference()?,
                arguments: self.read_arguments()?,
            },
            NodeTag::RedirectingInitializer => Initializer::Redirecting {
                is_synthetic,
                file_offset: self.read_uint30()?,
                target: self.read_required_reference()?,
                arguments: self.read_arguments()?,
            },
            NodeTag::LocalInitializer => {
                let variable = self.read_variable_declaration()?;
                // Visible to the initializers that follow; the constructor
                // truncates the stack.
                self.scope.variables.push(Arc::clone(&variable));
                Initializer::Local {
                    is_synthetic,
                    variable,
                }
            }
            NodeTag::AssertInitializer => {
                let condition = Box::new(self.read_expression()?);
                let message = self
                    .read_option(Self::read_expression)?
                    .map(Box::new);
                Initializer::Assert {
                    is_synthetic,
                    statement: Box::new(Statement::Assert { condition, message }),
                }
            }
            tag => return Err(self.unexpected_tag_at(tag as u8, offset)),
        })
    }

    // ------------------------------------------------------------------
    // Function nodes, parameters, type parameters
    // ------------------------------------------------------------------

    /// Decode a function node.
    ///
    /// `keep_params` leaves the parameters on the variable stack for the
    /// caller (constructors read their initializer list with parameters in
    /// scope). `body_end` enables lazy body capture: it is the sub-file offset
    /// just past the function, known only for index-addressed procedures.
    pub(crate) fn read_function_node(
        &mut self,
        keep_params: bool,
        body_end: Option<usize>,
    ) -> Result<FunctionNode> {
        self.expect_tag(NodeTag::FunctionNode)?;
        let file_offset = self.read_uint30()?;
        let end_offset = self.read_uint30()?;
        let marker_byte = self.read_byte()?;
        let async_marker = AsyncMarker::from_repr(marker_byte)
            .ok_or_else(|| self.structural_error(format!("Invalid async marker {marker_byte}")))?;

        let label_base = std::mem::replace(&mut self.scope.label_base, self.scope.labels.len());
        let case_base = std::mem::replace(
            &mut self.scope.switch_case_base,
            self.scope.switch_cases.len(),
        );
        let type_parameter_mark = self.scope.type_parameters.len();
        let variable_mark = self.scope.variables.len();

        let result = self.read_function_node_tail(file_offset, end_offset, async_marker, body_end);

        self.scope.type_parameters.truncate(type_parameter_mark);
        if !keep_params {
            self.scope.variables.truncate(variable_mark);
        }
        self.scope.label_base = label_base;
        self.scope.switch_case_base = case_base;

        result
    }

    fn read_function_node_tail(
        &mut self,
        file_offset: u32,
        end_offset: u32,
        async_marker: AsyncMarker,
        body_end: Option<usize>,
    ) -> Result<FunctionNode> {
        let type_parameters = self.read_type_parameter_list()?;
        let required_parameter_count = self.read_uint30()?;
        let positional_parameters = self.read_parameter_list()?;
        let named_parameters = self.read_parameter_list()?;
        let return_type = self.read_dart_type()?;

        let (body, body_completion) = match body_end {
            Some(end) if self.ctx.lazy_enabled => {
                let completion = LazyBody {
                    ctx: Arc::clone(self.ctx),
                    offset: self.pos(),
                    snapshot: self.scope.clone(),
                    context: self.context_path(),
                };
                self.seek(end)?;
                (None, Some(completion))
            }
            _ => (self.read_option(Self::read_statement)?, None),
        };

        Ok(FunctionNode {
            file_offset,
            end_offset,
            async_marker,
            type_parameters,
            required_parameter_count,
            positional_parameters,
            named_parameters,
            return_type,
            body,
            body_completion,
        })
    }

    fn read_parameter_list(&mut self) -> Result<Vec<VariableDeclarationRc>> {
        let count = self.read_uint30()? as usize;
        let mut parameters = Vec::with_capacity(count);
        for _ in 0..count {
            let parameter = self.read_variable_declaration()?;
            self.scope.variables.push(Arc::clone(&parameter));
            parameters.push(parameter);
        }
        Ok(parameters)
    }

    fn read_variable_declaration(&mut self) -> Result<VariableDeclarationRc> {
        let file_offset = self.read_uint30()?;
        let flags = VariableFlags::from_bits_truncate(self.read_byte()?);
        let name = self.read_optional_name_string()?;
        let annotations = self.read_annotations()?;
        let declared_type = self.read_dart_type()?;
        let initializer = self.read_option(Self::read_expression)?;

        Ok(Arc::new(RwLock::new(VariableDeclaration {
            file_offset,
            flags,
            name,
            annotations,
            declared_type,
            initializer,
        })))
    }

    /// Decode a type parameter list, leaving the parameters on the scope stack.
    ///
    /// All parameter nodes are created and pushed before any entry's fields are
    /// read: an F-bounded parameter references itself (or a sibling) from
    /// inside its own bound.
    fn read_type_parameter_list(&mut self) -> Result<Vec<TypeParameterRc>> {
        let count = self.read_uint30()? as usize;
        let mut parameters = Vec::with_capacity(count);
        for _ in 0..count {
            let parameter: TypeParameterRc = Arc::new(RwLock::new(TypeParameter {
                flags: TypeParameterFlags::empty(),
                annotations: Vec::new(),
                name: None,
                bound: DartType::Dynamic,
                default_type: None,
            }));
            self.scope.type_parameters.push(Arc::clone(&parameter));
            parameters.push(parameter);
        }

        for parameter in &parameters {
            let flags = TypeParameterFlags::from_bits_truncate(self.read_byte()?);
            let annotations = self.read_annotations()?;
            let name = self.read_optional_name_string()?;
            let bound = self.read_dart_type()?;
            let default_type = self.read_option(Self::read_dart_type)?;

            let mut guard = write_lock!(parameter);
            guard.flags = flags;
            guard.annotations = annotations;
            guard.name = name;
            guard.bound = bound;
            guard.default_type = default_type;
        }

        Ok(parameters)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    pub(crate) fn read_statement(&mut self) -> Result<Statement> {
        let offset = self.pos();
        let tag = self.read_node_tag()?;
        match tag {
            NodeTag::ExpressionStatement => Ok(Statement::Expression {
                expression: Box::new(self.read_expression()?),
            }),
            NodeTag::Block => {
                let mark = self.scope.variables.len();
                let result = self.read_statement_list();
                self.scope.variables.truncate(mark);
                Ok(Statement::Block {
                    statements: result?,
                })
            }
            NodeTag::EmptyStatement => Ok(Statement::Empty),
            NodeTag::AssertStatement => {
                let condition = Box::new(self.read_expression()?);
                let message = self.read_option(Self::read_expression)?.map(Box::new);
                Ok(Statement::Assert { condition, message })
            }
            NodeTag::LabeledStatement => {
                let label: LabeledStatementRc = Arc::new(RwLock::new(LabeledStatement {
                    body: Statement::Empty,
                }));
                self.scope.labels.push(Arc::clone(&label));
                let body = self.read_statement();
                self.scope.labels.pop();
                write_lock!(label).body = body?;
                Ok(Statement::Labeled { statement: label })
            }
            NodeTag::BreakStatement => {
                let index = self.read_uint30()? as usize;
                let target = self.scope.label(index)?;
                Ok(Statement::Break {
                    target: Arc::downgrade(&target),
                })
            }
            NodeTag::WhileStatement => Ok(Statement::While {
                condition: Box::new(self.read_expression()?),
                body: Box::new(self.read_statement()?),
            }),
            NodeTag::DoStatement => Ok(Statement::Do {
                body: Box::new(self.read_statement()?),
                condition: Box::new(self.read_expression()?),
            }),
            NodeTag::ForStatement => {
                let mark = self.scope.variables.len();
                let result = self.read_for_statement();
                self.scope.variables.truncate(mark);
                result
            }
            NodeTag::SwitchStatement => self.read_switch_statement(),
            NodeTag::ContinueSwitchStatement => {
                let index = self.read_uint30()? as usize;
                let target = self.scope.switch_case(index)?;
                Ok(Statement::ContinueSwitch {
                    target: Arc::downgrade(&target),
                })
            }
            NodeTag::IfStatement => Ok(Statement::If {
                condition: Box::new(self.read_expression()?),
                then: Box::new(self.read_statement()?),
                otherwise: self.read_option(Self::read_statement)?.map(Box::new),
            }),
            NodeTag::ReturnStatement => Ok(Statement::Return {
                expression: self.read_option(Self::read_expression)?.map(Box::new),
            }),
            NodeTag::TryCatch => {
                let body = Box::new(self.read_statement()?);
                let flags = self.read_byte()?;
                let count = self.read_uint30()? as usize;
                let mut catches = Vec::with_capacity(count);
                for _ in 0..count {
                    catches.push(self.read_catch()?);
                }
                Ok(Statement::TryCatch {
                    body,
                    flags,
                    catches,
                })
            }
            NodeTag::TryFinally => Ok(Statement::TryFinally {
                body: Box::new(self.read_statement()?),
                finalizer: Box::new(self.read_statement()?),
            }),
            NodeTag::YieldStatement => Ok(Statement::Yield {
                is_yield_star: self.read_byte()? & 0x01 != 0,
                expression: Box::new(self.read_expression()?),
            }),
            NodeTag::VariableDeclarationStatement => {
                let variable = self.read_variable_declaration()?;
                // In scope until the enclosing block/function truncates.
                self.scope.variables.push(Arc::clone(&variable));
                Ok(Statement::VariableDeclaration { variable })
            }
            NodeTag::FunctionDeclaration => {
                let file_offset = self.read_uint30()?;
                let variable = self.read_variable_declaration()?;
                // Pushed before the function body so the function can recurse.
                self.scope.variables.push(Arc::clone(&variable));
                let function = Box::new(self.read_function_node(false, None)?);
                Ok(Statement::FunctionDeclaration {
                    file_offset,
                    variable,
                    function,
                })
            }
            tag => Err(self.unexpected_tag_at(tag as u8, offset)),
        }
    }

    /// Decode an optional statement (the encoding of a function body).
    pub(crate) fn read_optional_statement(&mut self) -> Result<Option<Statement>> {
        self.read_option(Self::read_statement)
    }

    fn read_statement_list(&mut self) -> Result<Vec<Statement>> {
        let count = self.read_uint30()? as usize;
        let mut statements = Vec::with_capacity(count);
        for _ in 0..count {
            statements.push(self.read_statement()?);
        }
        Ok(statements)
    }

    fn read_for_statement(&mut self) -> Result<Statement> {
        let variable_count = self.read_uint30()? as usize;
        let mut variables = Vec::with_capacity(variable_count);
        for _ in 0..variable_count {
            let variable = self.read_variable_declaration()?;
            self.scope.variables.push(Arc::clone(&variable));
            variables.push(variable);
        }

        let condition = self.read_option(Self::read_expression)?.map(Box::new);
        let updates = self.read_expression_list()?;
        let body = Box::new(self.read_statement()?);

        Ok(Statement::For {
            variables,
            condition,
            updates,
            body,
        })
    }

    fn read_switch_statement(&mut self) -> Result<Statement> {
        let expression = Box::new(self.read_expression()?);
        let count = self.read_uint30()? as usize;

        // All case objects exist (and are in scope) before the first body is
        // decoded: continue-switch may target a textually later case.
        let mark = self.scope.switch_cases.len();
        let cases: Vec<SwitchCaseRc> = (0..count)
            .map(|_| {
                Arc::new(RwLock::new(SwitchCase {
                    expressions: Vec::new(),
                    is_default: false,
                    body: Statement::Empty,
                }))
            })
            .collect();
        self.scope.switch_cases.extend(cases.iter().cloned());

        let result = self.read_switch_cases(&cases);
        self.scope.switch_cases.truncate(mark);
        result?;

        Ok(Statement::Switch { expression, cases })
    }

    fn read_switch_cases(&mut self, cases: &[SwitchCaseRc]) -> Result<()> {
        for case in cases {
            let expression_count = self.read_uint30()? as usize;
            let mut expressions = Vec::with_capacity(expression_count);
            for _ in 0..expression_count {
                let file_offset = self.read_uint30()?;
                expressions.push((file_offset, self.read_expression()?));
            }
            let is_default = self.read_byte()? != 0;
            let body = self.read_statement()?;

            let mut guard = write_lock!(case);
            guard.expressions = expressions;
            guard.is_default = is_default;
            guard.body = body;
        }
        Ok(())
    }

    fn read_catch(&mut self) -> Result<Catch> {
        let mark = self.scope.variables.len();
        let result = self.read_catch_inner();
        self.scope.variables.truncate(mark);
        result
    }

    fn read_catch_inner(&mut self) -> Result<Catch> {
        let guard = self.read_dart_type()?;
        let exception = self.read_option(|reader| {
            let variable = reader.read_variable_declaration()?;
            reader.scope.variables.push(Arc::clone(&variable));
            Ok(variable)
        })?;
        let stack_trace = self.read_option(|reader| {
            let variable = reader.read_variable_declaration()?;
            reader.scope.variables.push(Arc::clone(&variable));
            Ok(variable)
        })?;
        let body = self.read_statement()?;

        Ok(Catch {
            guard,
            exception,
            stack_trace,
            body,
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub(crate) fn read_expression(&mut self) -> Result<Expression> {
        let offset = self.pos();
        let byte = self.parser.peek_byte()?;

        if byte & 0x80 != 0 {
            self.parser.read_byte()?;
            let payload = usize::from(byte & SPECIALIZED_PAYLOAD_MASK);
            return match byte & SPECIALIZED_TAG_MASK {
                SPECIALIZED_VARIABLE_GET => Ok(Expression::VariableGet {
                    file_offset: self.read_uint30()?,
                    variable: self.scope.variable(payload)?,
                }),
                SPECIALIZED_VARIABLE_SET => Ok(Expression::VariableSet {
                    file_offset: self.read_uint30()?,
                    variable: self.scope.variable(payload)?,
                    value: Box::new(self.read_expression()?),
                }),
                SPECIALIZED_INT_LITERAL => Ok(Expression::IntLiteral {
                    value: payload as i64 - SPECIALIZED_INT_LITERAL_BIAS,
                }),
                _ => Err(self.unexpected_tag_at(byte, offset)),
            };
        }

        let tag = self.read_node_tag()?;
        match tag {
            NodeTag::InvalidExpression => Ok(Expression::Invalid {
                message: self.read_string_index()?,
            }),
            NodeTag::VariableGet => {
                let file_offset = self.read_uint30()?;
                let index = self.read_uint30()? as usize;
                Ok(Expression::VariableGet {
                    file_offset,
                    variable: self.scope.variable(index)?,
                })
            }
            NodeTag::VariableSet => {
                let file_offset = self.read_uint30()?;
                let index = self.read_uint30()? as usize;
                Ok(Expression::VariableSet {
                    file_offset,
                    variable: self.scope.variable(index)?,
                    value: Box::new(self.read_expression()?),
                })
            }
            NodeTag::PropertyGet => Ok(Expression::PropertyGet {
                file_offset: self.read_uint30()?,
                receiver: Box::new(self.read_expression()?),
                name: self.read_name()?,
                interface_target: self.read_reference()?,
            }),
            NodeTag::PropertySet => Ok(Expression::PropertySet {
                file_offset: self.read_uint30()?,
                receiver: Box::new(self.read_expression()?),
                name: self.read_name()?,
                value: Box::new(self.read_expression()?),
                interface_target: self.read_reference()?,
            }),
            NodeTag::StaticGet => Ok(Expression::StaticGet {
                file_offset: self.read_uint30()?,
                target: self.read_required_reference()?,
            }),
            NodeTag::StaticSet => Ok(Expression::StaticSet {
                file_offset: self.read_uint30()?,
                target: self.read_required_reference()?,
                value: Box::new(self.read_expression()?),
            }),
            NodeTag::MethodInvocation => Ok(Expression::MethodInvocation {
                file_offset: self.read_uint30()?,
                receiver: Box::new(self.read_expression()?),
                name: self.read_name()?,
                arguments: self.read_arguments()?,
                interface_target: self.read_reference()?,
            }),
            NodeTag::StaticInvocation => Ok(Expression::StaticInvocation {
                file_offset: self.read_uint30()?,
                target: self.read_required_reference()?,
                arguments: self.read_arguments()?,
            }),
            NodeTag::ConstructorInvocation | NodeTag::ConstConstructorInvocation => {
                Ok(Expression::ConstructorInvocation {
                    file_offset: self.read_uint30()?,
                    target: self.read_required_reference()?,
                    arguments: self.read_arguments()?,
                    is_const: tag == NodeTag::ConstConstructorInvocation,
                })
            }
            NodeTag::Not => Ok(Expression::Not {
                operand: Box::new(self.read_expression()?),
            }),
            NodeTag::LogicalExpression => {
                let left = Box::new(self.read_expression()?);
                let operator_byte = self.read_byte()?;
                let operator = LogicalOperator::from_repr(operator_byte).ok_or_else(|| {
                    self.structural_error(format!("Invalid logical operator {operator_byte}"))
                })?;
                Ok(Expression::Logical {
                    left,
                    operator,
                    right: Box::new(self.read_expression()?),
                })
            }
            NodeTag::ConditionalExpression => Ok(Expression::Conditional {
                condition: Box::new(self.read_expression()?),
                then: Box::new(self.read_expression()?),
                otherwise: Box::new(self.read_expression()?),
                static_type: self.read_option(Self::read_dart_type)?,
            }),
            NodeTag::StringConcatenation => Ok(Expression::StringConcatenation {
                file_offset: self.read_uint30()?,
                expressions: self.read_expression_list()?,
            }),
            NodeTag::IsExpression => Ok(Expression::Is {
                file_offset: self.read_uint30()?,
                operand: Box::new(self.read_expression()?),
                tested_type: self.read_dart_type()?,
            }),
            NodeTag::AsExpression => Ok(Expression::As {
                file_offset: self.read_uint30()?,
                flags: self.read_byte()?,
                operand: Box::new(self.read_expression()?),
                target_type: self.read_dart_type()?,
            }),
            NodeTag::StringLiteral => Ok(Expression::StringLiteral {
                value: self.read_string_index()?,
            }),
            NodeTag::PositiveIntLiteral => Ok(Expression::IntLiteral {
                value: i64::from(self.read_uint30()?),
            }),
            NodeTag::NegativeIntLiteral => Ok(Expression::IntLiteral {
                value: -i64::from(self.read_uint30()?),
            }),
            NodeTag::BigIntLiteral => Ok(Expression::BigIntLiteral {
                value: self.read_string_index()?,
            }),
            NodeTag::DoubleLiteral => Ok(Expression::DoubleLiteral {
                value: self.read_double()?,
            }),
            NodeTag::TrueLiteral => Ok(Expression::BoolLiteral { value: true }),
            NodeTag::FalseLiteral => Ok(Expression::BoolLiteral { value: false }),
            NodeTag::NullLiteral => Ok(Expression::NullLiteral),
            NodeTag::SymbolLiteral => Ok(Expression::SymbolLiteral {
                value: self.read_string_index()?,
            }),
            NodeTag::TypeLiteral => Ok(Expression::TypeLiteral {
                literal_type: self.read_dart_type()?,
            }),
            NodeTag::ThisExpression => Ok(Expression::This),
            NodeTag::Rethrow => Ok(Expression::Rethrow {
                file_offset: self.read_uint30()?,
            }),
            NodeTag::Throw => Ok(Expression::Throw {
                file_offset: self.read_uint30()?,
                expression: Box::new(self.read_expression()?),
            }),
            NodeTag::ListLiteral | NodeTag::ConstListLiteral => Ok(Expression::ListLiteral {
                file_offset: self.read_uint30()?,
                type_argument: self.read_dart_type()?,
                expressions: self.read_expression_list()?,
                is_const: tag == NodeTag::ConstListLiteral,
            }),
            NodeTag::MapLiteral | NodeTag::ConstMapLiteral => {
                let file_offset = self.read_uint30()?;
                let key_type = self.read_dart_type()?;
                let value_type = self.read_dart_type()?;
                let count = self.read_uint30()? as usize;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = self.read_expression()?;
                    let value = self.read_expression()?;
                    entries.push((key, value));
                }
                Ok(Expression::MapLiteral {
                    file_offset,
                    key_type,
                    value_type,
                    entries,
                    is_const: tag == NodeTag::ConstMapLiteral,
                })
            }
            NodeTag::AwaitExpression => Ok(Expression::Await {
                operand: Box::new(self.read_expression()?),
            }),
            NodeTag::FunctionExpression => Ok(Expression::FunctionExpression {
                file_offset: self.read_uint30()?,
                function: Box::new(self.read_function_node(false, None)?),
            }),
            NodeTag::Let => {
                let mark = self.scope.variables.len();
                let result = self.read_let_expression();
                self.scope.variables.truncate(mark);
                result
            }
            NodeTag::Instantiation => Ok(Expression::Instantiation {
                expression: Box::new(self.read_expression()?),
                type_arguments: self.read_type_list()?,
            }),
            NodeTag::ConstantExpression => {
                let pool_offset = self.read_uint30()?;
                Ok(Expression::ConstantExpression {
                    constant: self.ctx.constants.get(pool_offset)?,
                })
            }
            tag => Err(self.unexpected_tag_at(tag as u8, offset)),
        }
    }

    fn read_let_expression(&mut self) -> Result<Expression> {
        let variable = self.read_variable_declaration()?;
        self.scope.variables.push(Arc::clone(&variable));
        let body = Box::new(self.read_expression()?);
        Ok(Expression::Let { variable, body })
    }

    fn read_arguments(&mut self) -> Result<Arguments> {
        let type_arguments = self.read_type_list()?;
        let positional = self.read_expression_list()?;

        let named_count = self.read_uint30()? as usize;
        let mut named = Vec::with_capacity(named_count);
        for _ in 0..named_count {
            let name = self.read_string_index()?;
            named.push((name, self.read_expression()?));
        }

        Ok(Arguments {
            type_arguments,
            positional,
            named,
        })
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub(crate) fn read_dart_type(&mut self) -> Result<DartType> {
        let offset = self.pos();
        let tag = self.read_node_tag()?;
        match tag {
            NodeTag::InvalidType => Ok(DartType::Invalid),
            NodeTag::DynamicType => Ok(DartType::Dynamic),
            NodeTag::VoidType => Ok(DartType::Void),
            NodeTag::NullType => Ok(DartType::Null),
            NodeTag::NeverType => Ok(DartType::Never {
                nullability: self.read_nullability()?,
            }),
            NodeTag::InterfaceType => Ok(DartType::Interface {
                nullability: self.read_nullability()?,
                class_reference: self.read_required_reference()?,
                type_arguments: self.read_type_list()?,
            }),
            NodeTag::SimpleInterfaceType => Ok(DartType::Interface {
                nullability: self.read_nullability()?,
                class_reference: self.read_required_reference()?,
                type_arguments: Vec::new(),
            }),
            NodeTag::FunctionType => {
                let nullability = self.read_nullability()?;
                let mark = self.scope.type_parameters.len();
                let result = self.read_function_type_tail(nullability);
                self.scope.type_parameters.truncate(mark);
                result
            }
            NodeTag::TypeParameterType => {
                let nullability = self.read_nullability()?;
                let index = self.read_uint30()? as usize;
                let parameter = self.scope.type_parameter(index)?;
                Ok(DartType::TypeParameter {
                    nullability,
                    parameter: Arc::downgrade(&parameter),
                })
            }
            tag => Err(self.unexpected_tag_at(tag as u8, offset)),
        }
    }

    fn read_function_type_tail(&mut self, nullability: Nullability) -> Result<DartType> {
        let type_parameters = self.read_type_parameter_list()?;
        let required_parameter_count = self.read_uint30()?;
        let positional = self.read_type_list()?;

        let named_count = self.read_uint30()? as usize;
        let mut named = Vec::with_capacity(named_count);
        for _ in 0..named_count {
            let name = self.read_string_index()?;
            named.push(NamedType {
                name,
                declared_type: self.read_dart_type()?,
            });
        }

        let return_type = Box::new(self.read_dart_type()?);

        Ok(DartType::Function {
            nullability,
            type_parameters,
            required_parameter_count,
            positional,
            named,
            return_type,
        })
    }
}
