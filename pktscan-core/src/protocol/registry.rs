//! Protocol registry: descriptors, bindings and link-type mapping.
//!
//! A registry is built once, then shared read-only between scanners. All
//! mutation goes through `&mut self`, so registering while scans are running
//! is rejected by the borrow checker; wrap the finished registry in an `Arc`
//! to hand it to several threads.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::debug;

use super::binding::{BindContext, BindingRule, Parent};
use super::builtin::{LAST_BUILTIN_ID, PAYLOAD};
use super::descriptor::HeaderDescriptor;
use super::id::{ProtocolId, MAX_ID_COUNT};
use super::payload;
use crate::error::{RegistryError, ScanError};
use crate::packet::HeaderRecord;
use crate::subheader::SubHeaderContainer;

/// A binding together with the child it selects and its registration order.
#[derive(Debug, Clone, Copy)]
struct RegisteredRule {
    seq: u32,
    child: ProtocolId,
    rule: BindingRule,
}

/// Registry of header descriptors and the bindings between them.
///
/// A fresh registry always contains the `payload` descriptor, which the scan
/// falls back to when no binding matches.
#[derive(Debug, Clone)]
pub struct ProtocolRegistry {
    slots: Vec<Option<HeaderDescriptor>>,
    order: Vec<ProtocolId>,
    names: HashMap<&'static str, ProtocolId>,
    /// Forward rules, indexed by parent id
    forward: Vec<SmallVec<[RegisteredRule; 4]>>,
    forward_any: Vec<RegisteredRule>,
    reverse: Vec<RegisteredRule>,
    dlt: HashMap<u32, ProtocolId>,
    next_seq: u32,
}

impl ProtocolRegistry {
    /// Create a registry holding only the `payload` descriptor.
    pub fn new() -> Self {
        let mut registry = Self {
            slots: Vec::new(),
            order: Vec::new(),
            names: HashMap::new(),
            forward: Vec::new(),
            forward_any: Vec::new(),
            reverse: Vec::new(),
            dlt: HashMap::new(),
            next_seq: 0,
        };
        registry.insert(PAYLOAD, payload::descriptor());
        registry
    }

    /// Register a descriptor and its declared bindings.
    ///
    /// A descriptor without an id gets the lowest free id at or above
    /// [`LAST_BUILTIN_ID`]. On error nothing is changed.
    pub fn register(&mut self, descriptor: HeaderDescriptor) -> Result<ProtocolId, RegistryError> {
        let id = match descriptor.id() {
            Some(id) => id,
            None => self.next_free_id()?,
        };
        if id.raw() >= MAX_ID_COUNT {
            return Err(RegistryError::RegistryFull {
                id: u32::from(id.raw()),
                max: MAX_ID_COUNT,
            });
        }
        if let Some(existing) = self.lookup(id) {
            return Err(RegistryError::DuplicateId {
                id: id.raw(),
                existing: existing.name(),
            });
        }
        if let Some(&existing) = self.names.get(descriptor.name()) {
            return Err(RegistryError::DuplicateName {
                name: descriptor.name(),
                existing: existing.raw(),
            });
        }
        for rule in descriptor
            .forward_bindings()
            .iter()
            .chain(descriptor.heuristic_bindings())
        {
            check_parent(rule)?;
        }

        self.insert(id, descriptor.with_id(id));
        for rule in descriptor.forward_bindings() {
            self.push_forward(id, *rule);
        }
        for rule in descriptor.heuristic_bindings() {
            self.push_reverse(id, *rule);
        }

        debug!(
            id = id.raw(),
            name = descriptor.name(),
            bindings = descriptor.forward_bindings().len(),
            heuristics = descriptor.heuristic_bindings().len(),
            "registered protocol"
        );
        Ok(id)
    }

    /// Add a forward binding: `child` may follow the rule's parent.
    pub fn add_binding(&mut self, child: ProtocolId, rule: BindingRule) -> Result<(), RegistryError> {
        self.check_child(child)?;
        check_parent(&rule)?;
        self.push_forward(child, rule);
        debug!(child = child.raw(), parent = ?rule.parent, "added binding");
        Ok(())
    }

    /// Add a reverse binding, consulted only after every forward binding failed.
    pub fn add_heuristic(&mut self, child: ProtocolId, rule: BindingRule) -> Result<(), RegistryError> {
        self.check_child(child)?;
        check_parent(&rule)?;
        self.push_reverse(child, rule);
        debug!(child = child.raw(), parent = ?rule.parent, "added heuristic binding");
        Ok(())
    }

    /// Map a data-link type to the id of its first header.
    ///
    /// Returns the id previously mapped to `dlt`, if any.
    pub fn register_dlt(&mut self, dlt: u32, id: ProtocolId) -> Result<Option<ProtocolId>, RegistryError> {
        self.check_child(id)?;
        debug!(dlt, id = id.raw(), "mapped link type");
        Ok(self.dlt.insert(dlt, id))
    }

    /// Start id for a data-link type; unknown link types start at `payload`.
    pub fn map_dlt(&self, dlt: u32) -> ProtocolId {
        self.lookup_dlt(dlt).unwrap_or(PAYLOAD)
    }

    pub fn lookup_dlt(&self, dlt: u32) -> Option<ProtocolId> {
        self.dlt.get(&dlt).copied()
    }

    /// Lowest data-link type mapped to `id`.
    pub fn dlt_of(&self, id: ProtocolId) -> Option<u32> {
        self.dlt
            .iter()
            .filter(|(_, &mapped)| mapped == id)
            .map(|(&dlt, _)| dlt)
            .min()
    }

    pub fn lookup(&self, id: ProtocolId) -> Option<&HeaderDescriptor> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn lookup_name(&self, name: &str) -> Option<&HeaderDescriptor> {
        self.id_of(name).and_then(|id| self.lookup(id))
    }

    pub fn id_of(&self, name: &str) -> Option<ProtocolId> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, id: ProtocolId) -> Option<&'static str> {
        self.lookup(id).map(HeaderDescriptor::name)
    }

    pub fn contains(&self, id: ProtocolId) -> bool {
        self.lookup(id).is_some()
    }

    /// Number of registered descriptors, `payload` included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderDescriptor> + '_ {
        self.order.iter().filter_map(|&id| self.lookup(id))
    }

    /// Pick the header that follows `ctx.parent` at `ctx.offset`.
    ///
    /// Forward rules for this parent and `Any`-parent rules are tried in
    /// registration order; reverse rules follow, also in registration order,
    /// when `heuristics` is set. The first rule that holds wins.
    pub fn resolve(&self, ctx: &BindContext<'_>, heuristics: bool) -> Option<ProtocolId> {
        let specific: &[RegisteredRule] = self
            .forward
            .get(ctx.parent.index())
            .map_or(&[][..], |rules| rules.as_slice());
        let mut specific = specific.iter().peekable();
        let mut any = self.forward_any.iter().peekable();

        loop {
            let take_specific = match (specific.peek(), any.peek()) {
                (Some(a), Some(b)) => a.seq < b.seq,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_specific {
                specific.next()
            } else {
                any.next()
            };
            if let Some(candidate) = next {
                if candidate.rule.is_bound(ctx) {
                    return Some(candidate.child);
                }
            }
        }

        if heuristics {
            return self
                .reverse
                .iter()
                .find(|candidate| candidate.rule.is_bound(ctx))
                .map(|candidate| candidate.child);
        }
        None
    }

    /// Index the sub-headers of one scanned record.
    ///
    /// `container` is reset to the record's id first. Returns how many
    /// sub-headers were found; descriptors without a dissector yield zero.
    pub fn dissect_sub_headers(
        &self,
        data: &[u8],
        record: &HeaderRecord,
        container: &mut SubHeaderContainer,
    ) -> Result<usize, ScanError> {
        let descriptor = self
            .lookup(record.id)
            .ok_or(ScanError::UnknownProtocol { id: record.id.raw() })?;
        container.reset(record.id);

        if let Some(dissect) = descriptor.sub_header_dissector() {
            let start = record.offset.min(data.len());
            let end = record.end().min(data.len());
            dissect(&data[start..end], container);
        }
        Ok(container.count())
    }

    fn insert(&mut self, id: ProtocolId, descriptor: HeaderDescriptor) {
        if self.slots.len() <= id.index() {
            self.slots.resize(id.index() + 1, None);
        }
        self.slots[id.index()] = Some(descriptor);
        self.names.insert(descriptor.name(), id);
        self.order.push(id);
    }

    fn push_forward(&mut self, child: ProtocolId, rule: BindingRule) {
        let entry = RegisteredRule {
            seq: self.bump_seq(),
            child,
            rule,
        };
        match rule.parent {
            Parent::Id(parent) => {
                if self.forward.len() <= parent.index() {
                    self.forward.resize_with(parent.index() + 1, SmallVec::new);
                }
                self.forward[parent.index()].push(entry);
            }
            Parent::Any => self.forward_any.push(entry),
        }
    }

    fn push_reverse(&mut self, child: ProtocolId, rule: BindingRule) {
        let entry = RegisteredRule {
            seq: self.bump_seq(),
            child,
            rule,
        };
        self.reverse.push(entry);
    }

    fn bump_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn next_free_id(&self) -> Result<ProtocolId, RegistryError> {
        (LAST_BUILTIN_ID..MAX_ID_COUNT)
            .map(ProtocolId::from_raw)
            .find(|&id| !self.contains(id))
            .ok_or(RegistryError::RegistryFull {
                id: u32::from(MAX_ID_COUNT),
                max: MAX_ID_COUNT,
            })
    }

    fn check_child(&self, child: ProtocolId) -> Result<(), RegistryError> {
        if self.contains(child) {
            Ok(())
        } else {
            Err(RegistryError::UnknownProtocol { id: child.raw() })
        }
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn check_parent(rule: &BindingRule) -> Result<(), RegistryError> {
    match rule.parent {
        Parent::Id(parent) if parent.raw() >= MAX_ID_COUNT => Err(RegistryError::IdOutOfRange {
            id: i64::from(parent.raw()),
            max: MAX_ID_COUNT,
        }),
        _ => Ok(()),
    }
}
