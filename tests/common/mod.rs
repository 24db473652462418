//! Shared test support: a minimal reference encoder for kernel components.
//!
//! The production crate only decodes; integration tests need well-formed
//! component bytes to feed it, so this module implements just enough of the
//! symmetric writer to cover the shapes the tests exercise. Field orders
//! mirror the entity readers exactly.

#![allow(dead_code)]

/// Little write buffer with the primitive encodings of the format.
#[derive(Default)]
pub struct Writer {
    pub buf: Vec<u8>,
}

impl Writer {
    pub fn byte(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn bytes(&mut self, value: &[u8]) {
        self.buf.extend_from_slice(value);
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn uint30(&mut self, value: u32) {
        assert!(value < 0x4000_0000, "uint30 overflow: {value}");
        if value < 0x80 {
            self.buf.push(value as u8);
        } else if value < 0x4000 {
            self.buf.push(0x80 | (value >> 8) as u8);
            self.buf.push(value as u8);
        } else {
            self.buf.push(0xC0 | (value >> 24) as u8);
            self.buf.push((value >> 16) as u8);
            self.buf.push((value >> 8) as u8);
            self.buf.push(value as u8);
        }
    }

    pub fn double(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_ne_bytes());
    }

    /// `uint30` length prefix + raw UTF-8 bytes.
    pub fn string_literal(&mut self, value: &str) {
        self.uint30(value.len() as u32);
        self.bytes(value.as_bytes());
    }

    pub fn pos(&self) -> u32 {
        self.buf.len() as u32
    }
}

// ---------------------------------------------------------------------------
// Position-independent node encodings (no sub-file-relative offsets inside)
// ---------------------------------------------------------------------------

pub fn nothing() -> Vec<u8> {
    vec![0]
}

pub fn something(mut inner: Vec<u8>) -> Vec<u8> {
    let mut out = vec![1];
    out.append(&mut inner);
    out
}

pub fn ty_dynamic() -> Vec<u8> {
    vec![91]
}

pub fn ty_void() -> Vec<u8> {
    vec![92]
}

/// `SimpleInterfaceType`: non-nullable reference with no type arguments.
pub fn ty_simple_interface(biased_reference: u32) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(96);
    w.byte(1); // non-nullable
    w.uint30(biased_reference);
    w.buf
}

pub fn expr_null() -> Vec<u8> {
    vec![43]
}

pub fn expr_bool(value: bool) -> Vec<u8> {
    vec![if value { 41 } else { 42 }]
}

/// Integer literal: specialized single-byte form when it fits, the
/// positive/negative `uint30` forms otherwise.
pub fn expr_int(value: i64) -> Vec<u8> {
    if (-3..=4).contains(&value) {
        return vec![144 + (value + 3) as u8];
    }
    let mut w = Writer::default();
    if value >= 0 {
        w.byte(55);
        w.uint30(value as u32);
    } else {
        w.byte(56);
        w.uint30((-value) as u32);
    }
    w.buf
}

pub fn expr_string(string_index: u32) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(39);
    w.uint30(string_index);
    w.buf
}

/// General-form variable get.
pub fn expr_variable_get(file_offset: u32, stack_index: u32) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(20);
    w.uint30(file_offset);
    w.uint30(stack_index);
    w.buf
}

/// Specialized single-byte variable get for stack slots 0..8.
pub fn expr_specialized_variable_get(file_offset: u32, slot: u8) -> Vec<u8> {
    assert!(slot < 8);
    let mut w = Writer::default();
    w.byte(128 + slot);
    w.uint30(file_offset);
    w.buf
}

pub fn expr_constant(pool_offset: u32) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(60);
    w.uint30(pool_offset);
    w.buf
}

pub fn expr_not(mut operand: Vec<u8>) -> Vec<u8> {
    let mut out = vec![33];
    out.append(&mut operand);
    out
}

pub fn stmt_return(expression: Option<Vec<u8>>) -> Vec<u8> {
    let mut out = vec![73];
    match expression {
        Some(expression) => out.append(&mut something(expression)),
        None => out.push(0),
    }
    out
}

pub fn stmt_expression(mut expression: Vec<u8>) -> Vec<u8> {
    let mut out = vec![61];
    out.append(&mut expression);
    out
}

pub fn stmt_block(statements: Vec<Vec<u8>>) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(62);
    w.uint30(statements.len() as u32);
    for statement in statements {
        w.bytes(&statement);
    }
    w.buf
}

pub fn stmt_empty() -> Vec<u8> {
    vec![63]
}

pub fn stmt_labeled(mut body: Vec<u8>) -> Vec<u8> {
    let mut out = vec![65];
    out.append(&mut body);
    out
}

pub fn stmt_break(label_index: u32) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(66);
    w.uint30(label_index);
    w.buf
}

/// Variable declaration with no annotations and default flags.
pub fn var_decl(name_index: u32, declared_type: Vec<u8>, initializer: Option<Vec<u8>>) -> Vec<u8> {
    let mut w = Writer::default();
    w.uint30(0); // file offset
    w.byte(0); // flags
    w.uint30(name_index);
    w.uint30(0); // annotations
    w.bytes(&declared_type);
    match initializer {
        Some(initializer) => w.bytes(&something(initializer)),
        None => w.byte(0),
    }
    w.buf
}

pub fn stmt_variable_declaration(declaration: Vec<u8>) -> Vec<u8> {
    let mut out = vec![78];
    out.extend_from_slice(&declaration);
    out
}

pub fn initializer_field(biased_field_reference: u32, value: Vec<u8>) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(8); // FieldInitializer
    w.byte(0); // not synthetic
    w.uint30(biased_field_reference);
    w.bytes(&value);
    w.buf
}

// Constant encodings (pool entries).

pub fn const_int(value: i64) -> Vec<u8> {
    let mut out = vec![2];
    out.extend_from_slice(&value.to_be_bytes());
    out
}

pub fn const_string(string_index: u32) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(4);
    w.uint30(string_index);
    w.buf
}

pub fn const_list(type_argument: Vec<u8>, entry_offsets: &[u32]) -> Vec<u8> {
    let mut w = Writer::default();
    w.byte(7);
    w.bytes(&type_argument);
    w.uint30(entry_offsets.len() as u32);
    for offset in entry_offsets {
        w.uint30(*offset);
    }
    w.buf
}

// ---------------------------------------------------------------------------
// Declaration specs assembled by the encoder
// ---------------------------------------------------------------------------

pub struct FunctionSpec {
    pub async_marker: u8,
    pub required_parameter_count: u32,
    pub positional_parameters: Vec<Vec<u8>>,
    pub named_parameters: Vec<Vec<u8>>,
    pub return_type: Vec<u8>,
    pub body: Option<Vec<u8>>,
}

impl FunctionSpec {
    pub fn returning(body: Vec<u8>) -> FunctionSpec {
        FunctionSpec {
            async_marker: 0,
            required_parameter_count: 0,
            positional_parameters: Vec::new(),
            named_parameters: Vec::new(),
            return_type: ty_dynamic(),
            body: Some(body),
        }
    }

    fn encode(&self, w: &mut Writer) {
        w.byte(3); // FunctionNode tag
        w.uint30(0); // file offset
        w.uint30(0); // end offset
        w.byte(self.async_marker);
        w.uint30(0); // type parameters
        w.uint30(self.required_parameter_count);
        w.uint30(self.positional_parameters.len() as u32);
        for parameter in &self.positional_parameters {
            w.bytes(parameter);
        }
        w.uint30(self.named_parameters.len() as u32);
        for parameter in &self.named_parameters {
            w.bytes(parameter);
        }
        w.bytes(&self.return_type);
        match &self.body {
            Some(body) => {
                w.byte(1);
                w.bytes(body);
            }
            None => w.byte(0),
        }
    }
}

pub struct FieldSpec {
    pub reference: u32,
    pub name_index: u32,
    pub flags: u8,
    pub declared_type: Vec<u8>,
    pub initializer: Option<Vec<u8>>,
}

impl FieldSpec {
    fn encode(&self, w: &mut Writer) {
        w.byte(4); // Field tag
        w.uint30(self.reference);
        w.uint30(0); // file uri
        w.uint30(0); // file offset
        w.byte(self.flags);
        w.uint30(self.name_index);
        w.uint30(0); // annotations
        w.bytes(&self.declared_type);
        match &self.initializer {
            Some(initializer) => {
                w.byte(1);
                w.bytes(initializer);
            }
            None => w.byte(0),
        }
    }
}

pub struct ConstructorSpec {
    pub reference: u32,
    pub name_index: u32,
    pub flags: u8,
    pub function: FunctionSpec,
    pub initializers: Vec<Vec<u8>>,
}

impl ConstructorSpec {
    fn encode(&self, w: &mut Writer) {
        w.byte(5); // Constructor tag
        w.uint30(self.reference);
        w.uint30(0); // file uri
        w.uint30(0); // file offset
        w.byte(self.flags);
        w.uint30(self.name_index);
        w.uint30(0); // annotations
        self.function.encode(w);
        w.uint30(self.initializers.len() as u32);
        for initializer in &self.initializers {
            w.bytes(initializer);
        }
    }
}

pub struct ProcedureSpec {
    pub reference: u32,
    pub name_index: u32,
    pub kind: u8,
    pub flags: u8,
    pub function: FunctionSpec,
}

impl ProcedureSpec {
    fn encode(&self, w: &mut Writer) {
        w.byte(6); // Procedure tag
        w.uint30(self.reference);
        w.uint30(0); // file uri
        w.uint30(0); // file offset
        w.byte(self.kind);
        w.byte(self.flags);
        w.uint30(self.name_index);
        w.uint30(0); // annotations
        self.function.encode(w);
    }
}

pub struct ClassSpec {
    pub reference: u32,
    pub name_index: u32,
    pub flags: u8,
    pub supertype: Option<u32>,
    pub fields: Vec<FieldSpec>,
    pub constructors: Vec<ConstructorSpec>,
    pub procedures: Vec<ProcedureSpec>,
}

impl ClassSpec {
    fn encode(&self, w: &mut Writer) {
        w.byte(2); // Class tag
        w.uint30(self.reference);
        w.uint30(0); // file uri
        w.uint30(0); // file offset
        w.uint30(0); // end offset
        w.byte(self.flags);
        w.uint30(self.name_index);
        w.uint30(0); // annotations
        w.uint30(0); // type parameters
        match self.supertype {
            Some(reference) => {
                w.byte(1);
                w.uint30(reference);
                w.uint30(0); // type arguments
            }
            None => w.byte(0),
        }
        w.byte(0); // no mixed-in type
        w.uint30(0); // implemented types
        w.uint30(self.fields.len() as u32);
        for field in &self.fields {
            field.encode(w);
        }
        w.uint30(self.constructors.len() as u32);
        for constructor in &self.constructors {
            constructor.encode(w);
        }

        let mut procedure_offsets = Vec::with_capacity(self.procedures.len() + 1);
        for procedure in &self.procedures {
            procedure_offsets.push(w.pos());
            procedure.encode(w);
        }
        procedure_offsets.push(w.pos());

        for offset in &procedure_offsets {
            w.u32(*offset);
        }
        w.u32(self.procedures.len() as u32);
    }
}

pub struct LibrarySpec {
    pub reference: u32,
    pub name_index: u32,
    pub file_uri: u32,
    pub classes: Vec<ClassSpec>,
    pub fields: Vec<FieldSpec>,
    pub procedures: Vec<ProcedureSpec>,
}

impl LibrarySpec {
    fn encode(&self, w: &mut Writer) {
        w.byte(0); // flags
        w.uint30(2); // language version major
        w.uint30(19); // language version minor
        w.uint30(self.reference);
        w.uint30(self.name_index);
        w.uint30(self.file_uri);
        w.uint30(0); // annotations
        w.uint30(0); // dependencies
        w.uint30(0); // additional exports
        w.uint30(0); // typedefs

        let mut class_offsets = Vec::with_capacity(self.classes.len() + 1);
        for class in &self.classes {
            class_offsets.push(w.pos());
            class.encode(w);
        }
        class_offsets.push(w.pos());

        w.uint30(0); // extensions
        w.uint30(self.fields.len() as u32);
        for field in &self.fields {
            field.encode(w);
        }

        let mut procedure_offsets = Vec::with_capacity(self.procedures.len() + 1);
        for procedure in &self.procedures {
            procedure_offsets.push(w.pos());
            procedure.encode(w);
        }
        procedure_offsets.push(w.pos());

        for offset in &class_offsets {
            w.u32(*offset);
        }
        for offset in &procedure_offsets {
            w.u32(*offset);
        }
        w.u32(self.classes.len() as u32);
        w.u32(self.procedures.len() as u32);
    }
}

pub struct SourceSpec {
    pub uri: String,
    pub text: Vec<u8>,
    pub line_starts: Vec<u32>,
    pub import_uri: String,
    pub coverage_references: Vec<u32>,
}

impl SourceSpec {
    pub fn of(uri: &str, text: &[u8]) -> SourceSpec {
        SourceSpec {
            uri: uri.to_string(),
            text: text.to_vec(),
            line_starts: if text.is_empty() { Vec::new() } else { vec![0] },
            import_uri: String::new(),
            coverage_references: Vec::new(),
        }
    }
}

struct MetadataSpec {
    tag_index: u32,
    /// (node offset, payload offset relative to the payload region)
    pairs: Vec<(u32, u32)>,
}

/// Builder for one encoded sub-file. Several outputs can be concatenated to
/// form a multi-component buffer.
pub struct ComponentEncoder {
    sdk_hash: [u8; 10],
    compilation_mode: u32,
    main_method: u32,
    problems: Vec<String>,
    strings: Vec<String>,
    names: Vec<(u32, u32)>,
    sources: Vec<SourceSpec>,
    libraries: Vec<LibrarySpec>,
    constant_buf: Writer,
    constant_count: u32,
    metadata_payloads: Vec<u8>,
    metadata: Vec<MetadataSpec>,
}

impl ComponentEncoder {
    pub fn new() -> ComponentEncoder {
        ComponentEncoder {
            sdk_hash: *b"0000000000",
            compilation_mode: 1, // Strong
            main_method: 0,
            problems: Vec::new(),
            strings: vec![String::new()],
            names: Vec::new(),
            sources: Vec::new(),
            libraries: Vec::new(),
            constant_buf: Writer::default(),
            constant_count: 0,
            metadata_payloads: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn set_sdk_hash(&mut self, hash: &str) {
        assert_eq!(hash.len(), 10);
        self.sdk_hash.copy_from_slice(hash.as_bytes());
    }

    pub fn set_compilation_mode(&mut self, mode: u32) {
        self.compilation_mode = mode;
    }

    /// Record the entry point as a biased canonical-name index.
    pub fn set_main_method(&mut self, biased_reference: u32) {
        self.main_method = biased_reference;
    }

    pub fn add_problem(&mut self, problem: &str) {
        self.problems.push(problem.to_string());
    }

    /// Intern a string, returning its table index.
    pub fn intern(&mut self, value: &str) -> u32 {
        if let Some(found) = self.strings.iter().position(|s| s == value) {
            return found as u32;
        }
        self.strings.push(value.to_string());
        (self.strings.len() - 1) as u32
    }

    /// Append a canonical-name entry, returning its *biased* index (usable
    /// directly as a reference field).
    pub fn name(&mut self, biased_parent: u32, text: &str) -> u32 {
        let string_index = self.intern(text);
        self.names.push((biased_parent, string_index));
        self.names.len() as u32
    }

    /// Append a source entry, returning its *biased* index (usable directly
    /// as a file-URI field).
    pub fn add_source(&mut self, source: SourceSpec) -> u32 {
        self.sources.push(source);
        self.sources.len() as u32
    }

    /// Append a constant entry, returning its pool-relative offset.
    pub fn add_constant(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.constant_buf.pos();
        self.constant_buf.bytes(bytes);
        self.constant_count += 1;
        offset
    }

    /// Register a metadata mapping. Payload offsets in `pairs` are relative to
    /// `payloads` as passed here; the encoder rebases them at assembly time.
    pub fn add_metadata(&mut self, tag: &str, pairs: Vec<(u32, u32)>, payloads: &[u8]) {
        let tag_index = self.intern(tag);
        let base = self.metadata_payloads.len() as u32;
        self.metadata_payloads.extend_from_slice(payloads);
        self.metadata.push(MetadataSpec {
            tag_index,
            pairs: pairs
                .into_iter()
                .map(|(node, payload)| (node, payload + base))
                .collect(),
        });
    }

    pub fn add_library(&mut self, library: LibrarySpec) {
        self.libraries.push(library);
    }

    /// Assemble the sub-file bytes.
    pub fn finish(self) -> Vec<u8> {
        let mut w = Writer::default();

        // Header
        w.u32(0x90AB_CDEF);
        w.u32(42);
        w.bytes(&self.sdk_hash);

        // Diagnostics
        w.uint30(self.problems.len() as u32);
        for problem in &self.problems {
            w.string_literal(problem);
        }

        // Libraries
        let mut library_offsets = Vec::with_capacity(self.libraries.len() + 1);
        for library in &self.libraries {
            library_offsets.push(w.pos());
            library.encode(&mut w);
        }
        library_offsets.push(w.pos());

        // Source table
        let source_table_offset = w.pos();
        w.uint30(self.sources.len() as u32);
        for source in &self.sources {
            w.string_literal(&source.uri);
            w.uint30(source.text.len() as u32);
            w.bytes(&source.text);
            w.uint30(source.line_starts.len() as u32);
            let mut previous = 0u32;
            for line_start in &source.line_starts {
                w.uint30(line_start - previous);
                previous = *line_start;
            }
            w.string_literal(&source.import_uri);
            w.uint30(source.coverage_references.len() as u32);
            for reference in &source.coverage_references {
                w.uint30(*reference);
            }
        }

        // Canonical names
        let canonical_names_offset = w.pos();
        w.uint30(self.names.len() as u32);
        for (biased_parent, string_index) in &self.names {
            w.uint30(*biased_parent);
            w.uint30(*string_index);
        }

        // Metadata payloads
        let metadata_payloads_offset = w.pos();
        w.bytes(&self.metadata_payloads);

        // Metadata mappings
        let metadata_mappings_offset = w.pos();
        w.uint30(self.metadata.len() as u32);
        for mapping in &self.metadata {
            w.uint30(mapping.tag_index);
            w.uint30(mapping.pairs.len() as u32);
            for (node_offset, payload_offset) in &mapping.pairs {
                w.u32(*node_offset);
                w.u32(payload_offset + metadata_payloads_offset);
            }
        }

        // String table
        let string_table_offset = w.pos();
        w.uint30(self.strings.len() as u32);
        let mut end = 0u32;
        for string in &self.strings {
            end += string.len() as u32;
            w.uint30(end);
        }
        for string in &self.strings {
            w.bytes(string.as_bytes());
        }

        // Constant pool
        let constant_table_offset = w.pos();
        w.uint30(self.constant_count);
        w.bytes(&self.constant_buf.buf);

        // Component index
        let index_bytes = (8 + library_offsets.len() + 2) as u32 * 4;
        let total_size = w.pos() + index_bytes;

        w.u32(source_table_offset);
        w.u32(canonical_names_offset);
        w.u32(metadata_payloads_offset);
        w.u32(metadata_mappings_offset);
        w.u32(string_table_offset);
        w.u32(constant_table_offset);
        w.u32(self.main_method);
        w.u32(self.compilation_mode);
        for offset in &library_offsets {
            w.u32(*offset);
        }
        w.u32(self.libraries.len() as u32);
        w.u32(total_size);

        assert_eq!(w.pos(), total_size);
        w.buf
    }
}
