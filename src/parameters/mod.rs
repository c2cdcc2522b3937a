//! Typed shader parameters, groups, and their packed uniform layout

pub mod layout;
pub mod value;
pub mod parameter;
pub mod group;
pub(crate) mod encoding;

pub use layout::{ByteCursor, ByteReader};
pub use value::{ParameterKind, ParameterValue};
pub use parameter::{ControlType, ParamRef, Parameter, ParameterAction};
pub use group::{ParameterGroup, ParameterGroupDelegate};
