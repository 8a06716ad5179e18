//! Declarative binding rules.
//!
//! A binding says "protocol B may follow protocol A when this holds". Rules
//! are plain data: the common case of comparing a header field against a
//! constant is expressed with [`FieldMatch`], and anything else falls back to
//! a function pointer taking a [`BindContext`].

use super::id::ProtocolId;

/// Function form of a binding predicate.
pub type PredicateFn = fn(&BindContext<'_>) -> bool;

/// Which parent a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Only after this parent id
    Id(ProtocolId),
    /// After any parent
    Any,
}

impl Parent {
    pub fn matches(self, parent: ProtocolId) -> bool {
        match self {
            Parent::Id(id) => id == parent,
            Parent::Any => true,
        }
    }
}

/// Position of a field relative to the headers being bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Bytes from the start of the parent header
    ParentStart(usize),
    /// Bytes back from the end of the parent header
    ParentEnd(usize),
    /// Bytes from the start of the candidate child
    Child(usize),
}

/// Big-endian width of a matched field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    U8,
    U16,
    U32,
}

impl FieldWidth {
    pub const fn bytes(self) -> usize {
        match self {
            FieldWidth::U8 => 1,
            FieldWidth::U16 => 2,
            FieldWidth::U32 => 4,
        }
    }
}

/// `(field & mask) == value` for a big-endian field.
///
/// A field that is not fully inside the captured bytes never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub anchor: Anchor,
    pub width: FieldWidth,
    pub mask: u32,
    pub value: u32,
}

impl FieldMatch {
    pub fn matches(&self, ctx: &BindContext<'_>) -> bool {
        let start = match self.anchor {
            Anchor::ParentStart(n) => ctx.parent_offset.checked_add(n),
            Anchor::ParentEnd(n) => ctx
                .parent_offset
                .checked_add(ctx.parent_length)
                .and_then(|end| end.checked_sub(n)),
            Anchor::Child(n) => ctx.offset.checked_add(n),
        };
        let Some(start) = start else {
            return false;
        };
        let Some(bytes) = start
            .checked_add(self.width.bytes())
            .and_then(|end| ctx.data.get(start..end))
        else {
            return false;
        };
        let field = bytes
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        field & self.mask == self.value
    }
}

/// Condition under which a binding applies.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    Always,
    Field(FieldMatch),
    Fn(PredicateFn),
}

impl Predicate {
    /// Byte at `offset` into the parent header equals `value`.
    pub const fn parent_u8(offset: usize, value: u8) -> Self {
        Predicate::Field(FieldMatch {
            anchor: Anchor::ParentStart(offset),
            width: FieldWidth::U8,
            mask: 0xFF,
            value: value as u32,
        })
    }

    /// 16-bit field at `offset` into the parent header equals `value`.
    pub const fn parent_u16(offset: usize, value: u16) -> Self {
        Predicate::Field(FieldMatch {
            anchor: Anchor::ParentStart(offset),
            width: FieldWidth::U16,
            mask: 0xFFFF,
            value: value as u32,
        })
    }

    /// Last two bytes of the parent header equal `value`.
    ///
    /// Ethernet, VLAN, SNAP and SLL all end with an ethertype.
    pub const fn ethertype(value: u16) -> Self {
        Predicate::Field(FieldMatch {
            anchor: Anchor::ParentEnd(2),
            width: FieldWidth::U16,
            mask: 0xFFFF,
            value: value as u32,
        })
    }

    /// Masked byte at `offset` into the candidate child equals `value`.
    pub const fn child_u8(offset: usize, mask: u8, value: u8) -> Self {
        Predicate::Field(FieldMatch {
            anchor: Anchor::Child(offset),
            width: FieldWidth::U8,
            mask: mask as u32,
            value: value as u32,
        })
    }

    pub fn evaluate(&self, ctx: &BindContext<'_>) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Field(field) => field.matches(ctx),
            Predicate::Fn(f) => f(ctx),
        }
    }
}

/// `(parent, predicate)` half of a binding; the child is whoever owns the rule.
#[derive(Debug, Clone, Copy)]
pub struct BindingRule {
    pub parent: Parent,
    pub predicate: Predicate,
}

impl BindingRule {
    pub const fn new(parent: ProtocolId, predicate: Predicate) -> Self {
        Self {
            parent: Parent::Id(parent),
            predicate,
        }
    }

    pub const fn any(predicate: Predicate) -> Self {
        Self {
            parent: Parent::Any,
            predicate,
        }
    }

    /// True if the rule's parent matches and its predicate holds.
    pub fn is_bound(&self, ctx: &BindContext<'_>) -> bool {
        self.parent.matches(ctx.parent) && self.predicate.evaluate(ctx)
    }
}

/// What a predicate can see while the scan decides the next header.
#[derive(Debug, Clone, Copy)]
pub struct BindContext<'a> {
    /// Captured bytes up to the current effective end
    pub data: &'a [u8],
    /// Header just appended
    pub parent: ProtocolId,
    pub parent_offset: usize,
    pub parent_length: usize,
    /// Where the candidate child would start
    pub offset: usize,
}

impl<'a> BindContext<'a> {
    /// Parent header bytes.
    pub fn parent_header(&self) -> &'a [u8] {
        let end = self
            .parent_offset
            .saturating_add(self.parent_length)
            .min(self.data.len());
        self.data.get(self.parent_offset..end).unwrap_or(&[])
    }

    /// Bytes from the candidate child's offset to the effective end.
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or(&[])
    }

    pub fn parent_u8(&self, at: usize) -> Option<u8> {
        self.parent_header().get(at).copied()
    }

    pub fn parent_u16(&self, at: usize) -> Option<u16> {
        read_u16(self.parent_header(), at)
    }

    pub fn child_u8(&self, at: usize) -> Option<u8> {
        self.remaining().get(at).copied()
    }

    pub fn child_u16(&self, at: usize) -> Option<u16> {
        read_u16(self.remaining(), at)
    }
}

/// Big-endian u16 at `at`, if fully present.
pub fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Big-endian u32 at `at`, if fully present.
pub fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at.checked_add(4)?)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
