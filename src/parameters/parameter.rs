//! A single named, typed, observable parameter
//!
//! Parameters are shared via `Rc<RefCell<_>>` so a group can hand out stable
//! references while reconciliation and loading mutate values in place. A
//! parameter notifies at most one owning group (through a weak hub handle)
//! plus any registered callback actions, and only when the value actually
//! changes.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::parameters::group::{GroupHub, ParameterGroupDelegate};
use crate::parameters::layout::{ByteCursor, ByteReader};
use crate::parameters::value::{ParameterKind, ParameterValue};

/// Shared handle to a parameter.
pub type ParamRef = Rc<RefCell<Parameter>>;

/// Callback invoked with the new value after a change.
pub type ParameterAction = Box<dyn Fn(&ParameterValue)>;

/// UI control hint. Advisory only; irrelevant to binary layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    None,
    #[default]
    Unknown,
    Slider,
    Multislider,
    XYPad,
    Toggle,
    Button,
    InputField,
    ColorPicker,
    ColorPalette,
    Dropdown,
    Label,
    FilePicker,
}

pub struct Parameter {
    label: String,
    value: ParameterValue,
    min: Option<ParameterValue>,
    max: Option<ParameterValue>,
    control: ControlType,
    /// Choices for string dropdowns.
    options: Vec<String>,
    /// Recently picked paths, file kind only.
    recents: Vec<String>,
    /// Allowed file extensions, file kind only.
    allowed_types: Vec<String>,
    owner: Option<Weak<GroupHub>>,
    actions: Vec<ParameterAction>,
}

impl Parameter {
    pub fn new(label: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            min: None,
            max: None,
            control: ControlType::Unknown,
            options: Vec::new(),
            recents: Vec::new(),
            allowed_types: Vec::new(),
            owner: None,
            actions: Vec::new(),
        }
    }

    pub fn bool(label: impl Into<String>, value: bool) -> Self {
        Self::new(label, value)
    }

    pub fn int(label: impl Into<String>, value: i32) -> Self {
        Self::new(label, value)
    }

    pub fn int2(label: impl Into<String>, value: IVec2) -> Self {
        Self::new(label, value)
    }

    pub fn int3(label: impl Into<String>, value: IVec3) -> Self {
        Self::new(label, value)
    }

    pub fn int4(label: impl Into<String>, value: IVec4) -> Self {
        Self::new(label, value)
    }

    pub fn uint32(label: impl Into<String>, value: u32) -> Self {
        Self::new(label, value)
    }

    pub fn float(label: impl Into<String>, value: f32) -> Self {
        Self::new(label, value)
    }

    pub fn float2(label: impl Into<String>, value: Vec2) -> Self {
        Self::new(label, value)
    }

    pub fn float3(label: impl Into<String>, value: Vec3) -> Self {
        Self::new(label, value)
    }

    pub fn float4(label: impl Into<String>, value: Vec4) -> Self {
        Self::new(label, value)
    }

    pub fn double(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, value)
    }

    pub fn packed_float3(label: impl Into<String>, value: Vec3) -> Self {
        Self::new(label, ParameterValue::PackedFloat3(value))
    }

    pub fn float2x2(label: impl Into<String>, value: Mat2) -> Self {
        Self::new(label, value)
    }

    pub fn float3x3(label: impl Into<String>, value: Mat3) -> Self {
        Self::new(label, value)
    }

    pub fn float4x4(label: impl Into<String>, value: Mat4) -> Self {
        Self::new(label, value)
    }

    pub fn string(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, ParameterValue::String(value.into()))
    }

    /// String parameter with a fixed choice list.
    pub fn dropdown(
        label: impl Into<String>,
        value: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        let mut param = Self::string(label, value);
        param.options = options;
        param.control = ControlType::Dropdown;
        param
    }

    /// File-path parameter. UI-only, never packed into GPU data.
    pub fn file(label: impl Into<String>, path: impl Into<String>) -> Self {
        let mut param = Self::new(label, ParameterValue::File(path.into()));
        param.control = ControlType::FilePicker;
        param
    }

    /// Attach min/max bounds. UI hints only; never enforced on assignment.
    /// Kind-mismatched bounds are dropped.
    pub fn with_range(
        mut self,
        min: impl Into<ParameterValue>,
        max: impl Into<ParameterValue>,
    ) -> Self {
        self.set_bounds(Some(min.into()), Some(max.into()));
        self
    }

    pub fn with_control(mut self, control: ControlType) -> Self {
        self.control = control;
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_allowed_types(mut self, allowed_types: Vec<String>) -> Self {
        self.allowed_types = allowed_types;
        self
    }

    pub fn with_action(mut self, action: impl Fn(&ParameterValue) + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn into_ref(self) -> ParamRef {
        Rc::new(RefCell::new(self))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    pub fn kind(&self) -> ParameterKind {
        self.value.kind()
    }

    pub fn min(&self) -> Option<&ParameterValue> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&ParameterValue> {
        self.max.as_ref()
    }

    pub fn control(&self) -> ControlType {
        self.control
    }

    pub fn set_control(&mut self, control: ControlType) {
        self.control = control;
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
    }

    pub fn recents(&self) -> &[String] {
        &self.recents
    }

    pub fn add_recent(&mut self, path: impl Into<String>) {
        self.recents.push(path.into());
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    pub fn set_allowed_types(&mut self, allowed_types: Vec<String>) {
        self.allowed_types = allowed_types;
    }

    /// Register a change callback. Actions fire in registration order.
    pub fn add_action(&mut self, action: impl Fn(&ParameterValue) + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Replace both bounds. Kind-mismatched bounds are dropped.
    pub fn set_bounds(&mut self, min: Option<ParameterValue>, max: Option<ParameterValue>) {
        let kind = self.value.kind();
        self.min = min.filter(|v| v.kind() == kind);
        self.max = max.filter(|v| v.kind() == kind);
    }

    /// Assign a new value.
    ///
    /// A kind mismatch is a silent no-op. Assigning the current value is
    /// also a no-op for notification purposes. Returns whether the value
    /// changed.
    pub fn set_value(&mut self, value: impl Into<ParameterValue>) -> bool {
        let value = value.into();
        if value.kind() != self.value.kind() {
            return false;
        }
        if value == self.value {
            return false;
        }
        self.value = value;
        self.notify();
        true
    }

    fn notify(&self) {
        if let Some(hub) = self.owner.as_ref().and_then(Weak::upgrade) {
            hub.mark_value_dirty();
            if let Some(delegate) = hub.delegate() {
                delegate.updated(self);
            }
        }
        for action in &self.actions {
            action(&self.value);
        }
    }

    pub fn size(&self) -> usize {
        self.kind().size()
    }

    pub fn stride(&self) -> usize {
        self.kind().stride()
    }

    pub fn alignment(&self) -> usize {
        self.kind().alignment()
    }

    pub fn count(&self) -> usize {
        self.value.count()
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Advance the cursor past any padding required by this parameter.
    pub fn align_data(&self, cursor: &mut ByteCursor<'_>) {
        cursor.align_to(self.alignment());
    }

    /// Align, then write this parameter's raw bytes.
    pub fn write_data(&self, cursor: &mut ByteCursor<'_>) {
        self.value.write(cursor);
    }

    /// Align, then read this parameter's value back from raw bytes.
    /// Routes through [`set_value`](Self::set_value), so notification and
    /// equality suppression apply.
    pub fn read_data(&mut self, reader: &mut ByteReader<'_>) {
        let next = self.value.read(reader);
        self.set_value(next);
    }

    pub(crate) fn has_live_owner(&self) -> bool {
        self.owner.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    pub(crate) fn set_owner(&mut self, owner: Option<Weak<GroupHub>>) {
        self.owner = owner;
    }

    pub(crate) fn owner_is(&self, hub: &Rc<GroupHub>) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|w| std::ptr::eq(w.as_ptr(), Rc::as_ptr(hub)))
    }

    /// Independent deep copy: value, bounds, control and UI options, but
    /// no owner link and no registered actions.
    pub(crate) fn duplicate(&self) -> Parameter {
        Parameter {
            label: self.label.clone(),
            value: self.value.clone(),
            min: self.min.clone(),
            max: self.max.clone(),
            control: self.control,
            options: self.options.clone(),
            recents: self.recents.clone(),
            allowed_types: self.allowed_types.clone(),
            owner: None,
            actions: Vec::new(),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("label", &self.label)
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("control", &self.control)
            .finish()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {:?}", self.label, self.type_name(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_equality_suppression() {
        let fired = Rc::new(Cell::new(0usize));
        let observed = Rc::clone(&fired);
        let mut param = Parameter::float("amount", 0.5).with_action(move |_| {
            observed.set(observed.get() + 1);
        });

        assert!(!param.set_value(0.5f32));
        assert_eq!(fired.get(), 0);

        assert!(param.set_value(0.75f32));
        assert_eq!(fired.get(), 1);

        assert!(!param.set_value(0.75f32));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_kind_mismatch_is_noop() {
        let mut param = Parameter::float("amount", 0.5);
        assert!(!param.set_value(true));
        assert_eq!(param.value(), &ParameterValue::Float(0.5));
    }

    #[test]
    fn test_actions_fire_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&order);
        let second = Rc::clone(&order);
        let mut param = Parameter::int("steps", 1)
            .with_action(move |_| first.borrow_mut().push("a"))
            .with_action(move |_| second.borrow_mut().push("b"));
        param.set_value(2);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_bounds_are_not_enforced() {
        let mut param = Parameter::float("amount", 0.5).with_range(0.0f32, 1.0f32);
        assert!(param.set_value(5.0f32));
        assert_eq!(param.value(), &ParameterValue::Float(5.0));
    }

    #[test]
    fn test_mismatched_range_is_dropped() {
        let param = Parameter::float("amount", 0.5).with_range(0, 1);
        assert_eq!(param.min(), None);
        assert_eq!(param.max(), None);

        let param = Parameter::float("amount", 0.5).with_range(0.0f32, 1.0f32);
        assert_eq!(param.min(), Some(&ParameterValue::Float(0.0)));
        assert_eq!(param.max(), Some(&ParameterValue::Float(1.0)));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let param = Parameter::float3("tint", Vec3::ONE).with_range(Vec3::ZERO, Vec3::ONE);
        let mut copy = param.duplicate();
        copy.set_value(Vec3::splat(0.5));
        assert_eq!(param.value(), &ParameterValue::Float3(Vec3::ONE));
        assert_eq!(copy.value(), &ParameterValue::Float3(Vec3::splat(0.5)));
        assert_eq!(copy.min(), param.min());
    }
}
