//! The ECC condition overlay/merge engine.
//!
//! Data flows one way: a user action updates one of the mutable stores ([`OverlayStore`],
//! [`CustomStore`], [`RemovedDefaults`], [`Annotations`]); [`merge`] recomputes the live list
//! over the immutable [`TemplateStore`]; [`label`] and [`serialize`] derive the display labels
//! and the report output from it. All of these are pure functions of their inputs.

pub mod custom;
pub mod labels;
pub mod merge;
pub mod overlay;
pub mod removal;
pub mod selection;
pub mod serializer;
pub mod template;

pub use custom::{CustomCondition, CustomStore};
pub use labels::{label, Label, LabelledItem};
pub use merge::{merge, MergedItem, Origin};
pub use overlay::{ConditionPatch, DescriptionsPatch, OverlayStore};
pub use removal::{is_orphaned_divider, RemovedDefaults};
pub use selection::Annotations;
pub use serializer::{serialize, OutputDocument, OutputRecord};
pub use template::{ConditionTemplate, Descriptions, Placement, TemplateStore};
