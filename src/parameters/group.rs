//! Ordered, keyed parameter collections with a packed uniform layout
//!
//! A group owns an insertion-ordered list of parameters plus a label lookup
//! map. Insertion order defines the packed memory layout and the textual
//! struct declaration. Layout values (size/stride/alignment) and the packed
//! scratch blob are cached lazily: list mutation invalidates everything and
//! forces a scratch reallocation, a value mutation only forces a rewrite.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::{Rc, Weak};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::parameters::encoding::{GroupRepr, ParamRepr};
use crate::parameters::layout::{ByteCursor, ByteReader};
use crate::parameters::parameter::{ParamRef, Parameter};
use crate::parameters::value::ParameterValue;

/// Notification hub shared between a group and its parameters.
///
/// Parameters hold a `Weak` handle; a live handle marks the packed data
/// dirty when a value changes and forwards the change to the group's
/// delegate. Dropping the group severs all links at once.
pub(crate) struct GroupHub {
    value_dirty: Cell<bool>,
    delegate: RefCell<Option<Weak<dyn ParameterGroupDelegate>>>,
}

impl GroupHub {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            value_dirty: Cell::new(true),
            delegate: RefCell::new(None),
        })
    }

    pub(crate) fn mark_value_dirty(&self) {
        self.value_dirty.set(true);
    }

    fn take_value_dirty(&self) -> bool {
        self.value_dirty.replace(false)
    }

    pub(crate) fn delegate(&self) -> Option<Rc<dyn ParameterGroupDelegate>> {
        self.delegate.borrow().as_ref().and_then(Weak::upgrade)
    }
}

/// Observer for group-level events. All methods default to no-ops.
///
/// `updated` fires for every value change on an owned parameter, no matter
/// which path mutated it (group lookup, shared handle, reconciliation or
/// load). It runs while the parameter is mutably borrowed, so it receives
/// the parameter itself rather than its shared handle.
pub trait ParameterGroupDelegate {
    fn added(&self, _parameter: &ParamRef, _group: &ParameterGroup) {}
    fn removed(&self, _parameter: &ParamRef, _group: &ParameterGroup) {}
    fn updated(&self, _parameter: &Parameter) {}
    fn cleared(&self, _group: &ParameterGroup) {}
    fn loaded(&self, _group: &ParameterGroup) {}
    fn saved(&self, _group: &ParameterGroup) {}
}

pub struct ParameterGroup {
    label: String,
    params: Vec<ParamRef>,
    map: HashMap<String, ParamRef>,
    hub: Rc<GroupHub>,
    size_cache: Cell<Option<usize>>,
    stride_cache: Cell<Option<usize>>,
    alignment_cache: Cell<Option<usize>>,
    scratch: Vec<u8>,
    reallocate_scratch: bool,
}

impl ParameterGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            params: Vec::new(),
            map: HashMap::new(),
            hub: GroupHub::new(),
            size_cache: Cell::new(None),
            stride_cache: Cell::new(None),
            alignment_cache: Cell::new(None),
            scratch: Vec::new(),
            reallocate_scratch: true,
        }
    }

    pub fn with_params(label: impl Into<String>, params: Vec<Parameter>) -> Self {
        let mut group = Self::new(label);
        for param in params {
            group.push(param);
        }
        group
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_delegate(&mut self, delegate: Weak<dyn ParameterGroupDelegate>) {
        *self.hub.delegate.borrow_mut() = Some(delegate);
    }

    pub fn clear_delegate(&mut self) {
        *self.hub.delegate.borrow_mut() = None;
    }

    fn delegate(&self) -> Option<Rc<dyn ParameterGroupDelegate>> {
        self.hub.delegate()
    }

    /// Parameters in insertion order. This order defines the packed layout.
    pub fn params(&self) -> &[ParamRef] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Wrap and append a parameter, returning its shared handle.
    pub fn push(&mut self, param: Parameter) -> ParamRef {
        let param = param.into_ref();
        self.append(Rc::clone(&param));
        param
    }

    /// Append a shared parameter.
    ///
    /// The group becomes the parameter's owner only if it has none. On a
    /// duplicate label the lookup map keeps the last appended parameter
    /// while the ordered list retains both.
    pub fn append(&mut self, param: ParamRef) {
        let label = {
            let mut p = param.borrow_mut();
            if !p.has_live_owner() {
                p.set_owner(Some(Rc::downgrade(&self.hub)));
            }
            p.label().to_string()
        };
        self.map.insert(label, Rc::clone(&param));
        self.params.push(Rc::clone(&param));
        self.mark_layout_dirty();
        if let Some(delegate) = self.delegate() {
            delegate.added(&param, self);
        }
    }

    /// Remove the first list entry matching the parameter's label and sever
    /// the owner link if this group holds it.
    pub fn remove(&mut self, param: &ParamRef) {
        let label = param.borrow().label().to_string();
        self.map.remove(&label);
        if let Some(pos) = self.params.iter().position(|p| p.borrow().label() == label) {
            let removed = self.params.remove(pos);
            {
                let mut p = removed.borrow_mut();
                if p.owner_is(&self.hub) {
                    p.set_owner(None);
                }
            }
            self.mark_layout_dirty();
            if let Some(delegate) = self.delegate() {
                delegate.removed(&removed, self);
            }
        }
    }

    /// Detach every parameter and empty the group.
    pub fn clear(&mut self) {
        for param in &self.params {
            let mut p = param.borrow_mut();
            if p.owner_is(&self.hub) {
                p.set_owner(None);
            }
        }
        self.params.clear();
        self.map.clear();
        self.mark_layout_dirty();
        if let Some(delegate) = self.delegate() {
            delegate.cleared(self);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamRef> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Set a parameter's value by label. Missing labels and kind mismatches
    /// are silent no-ops. A change notifies the delegate through the
    /// parameter's own hub link.
    pub fn set(&self, name: &str, value: impl Into<ParameterValue>) {
        if let Some(param) = self.map.get(name) {
            param.borrow_mut().set_value(value);
        }
    }

    fn mark_layout_dirty(&mut self) {
        self.size_cache.set(None);
        self.stride_cache.set(None);
        self.alignment_cache.set(None);
        self.reallocate_scratch = true;
        self.hub.mark_value_dirty();
    }

    /// Packed byte size: sequential C-struct walk, padding each member up
    /// to its alignment before adding its size.
    pub fn size(&self) -> usize {
        if let Some(size) = self.size_cache.get() {
            return size;
        }
        let mut result = 0usize;
        for param in &self.params {
            let p = param.borrow();
            let alignment = p.alignment();
            let rem = result % alignment;
            if rem > 0 {
                result += alignment - rem;
            }
            result += p.size();
        }
        self.size_cache.set(Some(result));
        result
    }

    /// Max member alignment. Zero for an empty group.
    pub fn alignment(&self) -> usize {
        if let Some(alignment) = self.alignment_cache.get() {
            return alignment;
        }
        let result = self
            .params
            .iter()
            .map(|p| p.borrow().alignment())
            .max()
            .unwrap_or(0);
        self.alignment_cache.set(Some(result));
        result
    }

    /// Size padded up to the group's own alignment.
    pub fn stride(&self) -> usize {
        if let Some(stride) = self.stride_cache.get() {
            return stride;
        }
        let mut result = self.size();
        let alignment = self.alignment();
        if alignment > 0 {
            let rem = result % alignment;
            if rem > 0 {
                result += alignment - rem;
            }
        }
        self.stride_cache.set(Some(result));
        result
    }

    /// Write every parameter, in order, into `out`. The offset arithmetic
    /// is identical to [`size`](Self::size).
    pub fn write_packed(&self, out: &mut [u8]) {
        let mut cursor = ByteCursor::new(out);
        for param in &self.params {
            param.borrow().write_data(&mut cursor);
        }
    }

    /// Read every parameter's value, in order, back out of `bytes`.
    pub fn read_packed(&self, bytes: &[u8]) {
        let mut reader = ByteReader::new(bytes);
        for param in &self.params {
            param.borrow_mut().read_data(&mut reader);
        }
    }

    /// Read-only view over the lazily packed scratch blob.
    ///
    /// Reallocated when the parameter list changed, rewritten when any
    /// value changed, otherwise returned as-is.
    pub fn data(&mut self) -> &[u8] {
        if self.reallocate_scratch {
            self.scratch = vec![0u8; self.size()];
            self.reallocate_scratch = false;
            self.hub.mark_value_dirty();
        }
        if self.hub.take_value_dirty() {
            let mut scratch = std::mem::take(&mut self.scratch);
            self.write_packed(&mut scratch);
            self.scratch = scratch;
        }
        &self.scratch
    }

    /// C-struct-like declaration for embedding into shader source. Field
    /// order matches the binary packing order exactly; the spacing (tab
    /// plus space, trailing blank line) is consumed verbatim by shader
    /// assembly and must not change.
    pub fn struct_string(&self) -> String {
        let mut source = String::from("typedef struct {\n");
        for param in &self.params {
            let p = param.borrow();
            source.push_str(&format!("\t {} {};\n", p.type_name(), camel_case(p.label())));
        }
        source.push_str(&format!("}} {};\n\n", pascal_case(&self.label)));
        source
    }

    /// Rebuild this group as independent deep copies of `source`'s
    /// parameters. Used for snapshotting a template without aliasing.
    pub fn copy_from(&mut self, source: &ParameterGroup) {
        self.clear();
        self.label = source.label.clone();
        for param in &source.params {
            self.push(param.borrow().duplicate());
        }
    }

    /// Value-equal independent copy of this group.
    pub fn clone_group(&self) -> ParameterGroup {
        let mut copy = ParameterGroup::new("");
        copy.copy_from(self);
        copy
    }

    /// Reconcile this group's keys against `source`.
    ///
    /// Three disjoint key-set operations so every key is visited exactly
    /// once: keys absent from source are removed, keys new in source are
    /// appended by reference, and common keys are updated in place (value
    /// and/or options, per flags) preserving parameter identity. Finally
    /// the list is reordered to match source's insertion order.
    pub fn set_from(&mut self, source: &ParameterGroup, set_values: bool, set_options: bool) {
        let order: Vec<String> = source
            .params
            .iter()
            .map(|p| p.borrow().label().to_string())
            .collect();

        let incoming: HashSet<String> = source.map.keys().cloned().collect();
        let existing: HashSet<String> = self.map.keys().cloned().collect();

        let removed: Vec<&String> = existing.difference(&incoming).collect();
        let added: Vec<&String> = incoming.difference(&existing).collect();
        let common: Vec<&String> = existing.intersection(&incoming).collect();

        for key in removed {
            if let Some(param) = self.map.get(key).cloned() {
                self.remove(&param);
            }
        }

        for key in added {
            if let Some(param) = source.map.get(key) {
                self.append(Rc::clone(param));
            }
        }

        for key in common {
            if let (Some(target), Some(incoming)) = (self.map.get(key), source.map.get(key)) {
                reconcile(target, incoming, set_values, set_options);
            }
        }

        let map = self.map.clone();
        self.clear();
        for key in &order {
            if let Some(param) = map.get(key) {
                self.append(Rc::clone(param));
            }
        }
    }

    /// Value-only sync restricted to keys common to both groups. Never
    /// adds or removes parameters.
    pub fn set_values_from(&mut self, source: &ParameterGroup) {
        let incoming: HashSet<&String> = source.map.keys().collect();
        for (key, target) in &self.map {
            if incoming.contains(key) {
                if let Some(incoming) = source.map.get(key) {
                    reconcile(target, incoming, true, false);
                }
            }
        }
    }

    fn set_parameter_from(&mut self, incoming: &ParamRef, set_value: bool, set_options: bool, append: bool) {
        let label = incoming.borrow().label().to_string();
        match self.map.get(&label) {
            None if append => self.append(Rc::clone(incoming)),
            None => {}
            Some(target) => reconcile(&Rc::clone(target), incoming, set_value, set_options),
        }
    }

    /// Encode to pretty JSON, written atomically (temp file + rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let payload = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &payload)?;
        fs::rename(&tmp, path)?;
        log::debug!("saved parameter group '{}' to {}", self.label, path.display());
        if let Some(delegate) = self.delegate() {
            delegate.saved(self);
        }
        Ok(())
    }

    /// Decode a persisted document and merge it into this group.
    ///
    /// The whole document is decoded into a temporary group first, so a
    /// malformed file leaves this group untouched. Values are applied to
    /// existing parameters in place (identity preserved); unknown labels
    /// are appended when `append` is set.
    pub fn load(&mut self, path: impl AsRef<Path>, append: bool) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut loaded: ParameterGroup = serde_json::from_slice(&bytes)?;
        let params: Vec<ParamRef> = loaded.params.clone();
        // Detach from the transient group so appended parameters report to
        // this group's hub instead of a dead one.
        loaded.clear();
        for param in &params {
            self.set_parameter_from(param, true, false, append);
        }
        log::debug!("loaded parameter group '{}' from {}", self.label, path.display());
        if let Some(delegate) = self.delegate() {
            delegate.loaded(self);
        }
        Ok(())
    }
}

/// Update `target` in place from `incoming` when their kinds match.
fn reconcile(target: &ParamRef, incoming: &ParamRef, set_value: bool, set_options: bool) {
    if Rc::ptr_eq(target, incoming) {
        return;
    }
    let src = incoming.borrow();
    let mut dst = target.borrow_mut();
    if dst.kind() != src.kind() {
        return;
    }
    if set_value {
        dst.set_value(src.value().clone());
    }
    if set_options {
        dst.set_bounds(src.min().cloned(), src.max().cloned());
        dst.set_control(src.control());
        dst.set_options(src.options().to_vec());
        dst.set_allowed_types(src.allowed_types().to_vec());
    }
}

/// Equality is label-only. Callers must not rely on this for content
/// comparison.
impl PartialEq for ParameterGroup {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl fmt::Debug for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterGroup")
            .field("label", &self.label)
            .field("len", &self.params.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ParameterGroup: {}", self.label)?;
        for param in &self.params {
            writeln!(f, "{}", param.borrow())?;
        }
        Ok(())
    }
}

impl Serialize for ParameterGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let repr = GroupRepr {
            label: self.label.clone(),
            params: self.params.iter().map(|p| ParamRepr::from(&*p.borrow())).collect(),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = GroupRepr::deserialize(deserializer)?;
        let mut group = ParameterGroup::new(repr.label);
        for param in repr.params {
            group.push(Parameter::from(param));
        }
        Ok(group)
    }
}

/// Convert a label to a camelCase identifier: "custom color" -> "customColor".
fn camel_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let words = label
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty());
    for (i, word) in words.enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Upper-first camelCase, used for struct type names.
fn pascal_case(label: &str) -> String {
    let camel = camel_case(label);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => camel,
    }
}
