//! Header descriptors: what the scan needs to know about one protocol.

use super::binding::BindingRule;
use super::id::ProtocolId;
use crate::packet::HeaderFlags;
use crate::subheader::SubHeaderContainer;

/// Computes a byte count for the header starting at `offset`.
///
/// Returns `None` when `data` does not hold enough bytes to decide.
pub type LengthFn = fn(data: &[u8], offset: usize) -> Option<usize>;

/// Derives data-quality flags once a header is known to be complete.
pub type FlagsFn = fn(header: &[u8]) -> HeaderFlags;

/// Indexes optional sub-headers inside one header's bytes.
pub type SubHeaderFn = fn(header: &[u8], container: &mut SubHeaderContainer);

/// Length of the header proper.
#[derive(Debug, Clone, Copy)]
pub enum HeaderLength {
    Fixed(usize),
    Computed(LengthFn),
}

impl HeaderLength {
    pub fn evaluate(&self, data: &[u8], offset: usize) -> Option<usize> {
        match self {
            HeaderLength::Fixed(len) => Some(*len),
            HeaderLength::Computed(f) => f(data, offset),
        }
    }
}

/// Named slot for a sub-header a descriptor may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubHeaderSlot {
    pub id: u8,
    pub name: &'static str,
}

impl SubHeaderSlot {
    pub const fn new(id: u8, name: &'static str) -> Self {
        Self { id, name }
    }
}

/// Everything the registry and scanner need for one protocol.
#[derive(Debug, Clone, Copy)]
pub struct HeaderDescriptor {
    id: Option<ProtocolId>,
    name: &'static str,
    display_name: &'static str,
    length: HeaderLength,
    prefix: Option<LengthFn>,
    gap: Option<LengthFn>,
    postfix: Option<LengthFn>,
    classify: Option<FlagsFn>,
    bindings: &'static [BindingRule],
    heuristics: &'static [BindingRule],
    sub_headers: Option<SubHeaderFn>,
    slots: &'static [SubHeaderSlot],
}

impl HeaderDescriptor {
    /// Descriptor with a fixed id.
    pub const fn new(id: ProtocolId, name: &'static str, length: HeaderLength) -> Self {
        Self {
            id: Some(id),
            name,
            display_name: name,
            length,
            prefix: None,
            gap: None,
            postfix: None,
            classify: None,
            bindings: &[],
            heuristics: &[],
            sub_headers: None,
            slots: &[],
        }
    }

    /// Descriptor whose id is picked by the registry.
    pub const fn unassigned(name: &'static str, length: HeaderLength) -> Self {
        let mut descriptor = Self::new(ProtocolId::from_raw(0), name, length);
        descriptor.id = None;
        descriptor
    }

    pub const fn display_name(mut self, display_name: &'static str) -> Self {
        self.display_name = display_name;
        self
    }

    pub const fn prefix(mut self, f: LengthFn) -> Self {
        self.prefix = Some(f);
        self
    }

    pub const fn gap(mut self, f: LengthFn) -> Self {
        self.gap = Some(f);
        self
    }

    /// Trailer at the end of the region this header encloses.
    ///
    /// Evaluated against the bytes up to the current effective end; the
    /// result shrinks that end for every header that follows.
    pub const fn postfix(mut self, f: LengthFn) -> Self {
        self.postfix = Some(f);
        self
    }

    pub const fn classify(mut self, f: FlagsFn) -> Self {
        self.classify = Some(f);
        self
    }

    /// Forward bindings: parents this protocol may follow.
    pub const fn bindings(mut self, rules: &'static [BindingRule]) -> Self {
        self.bindings = rules;
        self
    }

    /// Reverse bindings, only consulted when heuristics are enabled.
    pub const fn heuristics(mut self, rules: &'static [BindingRule]) -> Self {
        self.heuristics = rules;
        self
    }

    pub const fn sub_headers(
        mut self,
        dissector: SubHeaderFn,
        slots: &'static [SubHeaderSlot],
    ) -> Self {
        self.sub_headers = Some(dissector);
        self.slots = slots;
        self
    }

    pub(crate) fn with_id(mut self, id: ProtocolId) -> Self {
        self.id = Some(id);
        self
    }

    /// Id, or `None` until the registry assigns one.
    pub fn id(&self) -> Option<ProtocolId> {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn title(&self) -> &'static str {
        self.display_name
    }

    pub fn header_length(&self, data: &[u8], offset: usize) -> Option<usize> {
        self.length.evaluate(data, offset)
    }

    pub fn prefix_length(&self, data: &[u8], offset: usize) -> Option<usize> {
        self.prefix.map_or(Some(0), |f| f(data, offset))
    }

    pub fn gap_length(&self, data: &[u8], offset: usize) -> usize {
        self.gap.and_then(|f| f(data, offset)).unwrap_or(0)
    }

    pub fn postfix_length(&self, data: &[u8], offset: usize) -> usize {
        self.postfix.and_then(|f| f(data, offset)).unwrap_or(0)
    }

    pub fn flags(&self, header: &[u8]) -> HeaderFlags {
        self.classify.map_or(HeaderFlags::empty(), |f| f(header))
    }

    pub fn forward_bindings(&self) -> &'static [BindingRule] {
        self.bindings
    }

    pub fn heuristic_bindings(&self) -> &'static [BindingRule] {
        self.heuristics
    }

    pub fn sub_header_dissector(&self) -> Option<SubHeaderFn> {
        self.sub_headers
    }

    pub fn sub_header_slots(&self) -> &'static [SubHeaderSlot] {
        self.slots
    }

    /// Name of a declared sub-header slot.
    pub fn sub_header_name(&self, id: u8) -> Option<&'static str> {
        self.slots.iter().find(|s| s.id == id).map(|s| s.name)
    }
}
