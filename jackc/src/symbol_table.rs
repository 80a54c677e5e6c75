//! Variable bindings for one class compilation.
//!
//! A single ordered list partitioned by segment. Class-level bindings
//! (`static`, `field`) persist for the whole compilation; subroutine-level
//! bindings (`argument`, `local`) are appended at subroutine entry and
//! dropped at the next one. Lookup is first match from the head; ambiguity
//! is not resolved.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarSegment {
    Static,
    Field,
    Argument,
    Local,
}

impl VarSegment {
    /// The VM memory segment this binding is addressed through.
    #[must_use]
    pub fn vm_segment(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Field => "this",
            Self::Argument => "argument",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub segment: VarSegment,
    pub typ: String,
    pub name: String,
    /// Zero-based position within the binding's segment.
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    bindings: Vec<Binding>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bindings in one segment. Doubles as the next free index.
    #[must_use]
    pub fn count(&self, segment: VarSegment) -> usize {
        self.bindings
            .iter()
            .filter(|b| b.segment == segment)
            .count()
    }

    /// Appends a binding at the next free index of its segment.
    pub fn add(&mut self, segment: VarSegment, typ: &str, name: &str) {
        let index = self.count(segment);
        self.bindings.push(Binding {
            segment,
            typ: typ.to_string(),
            name: name.to_string(),
            index,
        });
    }

    /// First binding with the given name, scanning from the head.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Drops `argument` and `local` bindings, keeping class scope intact.
    pub fn clear_subroutine(&mut self) {
        self.bindings
            .retain(|b| !matches!(b.segment, VarSegment::Argument | VarSegment::Local));
    }
}
