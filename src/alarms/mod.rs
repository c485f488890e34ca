//! Threshold alarms
//!
//! - [`threshold`] turns comparison strings like `"<1,>=0.5"` into rules
//! - [`reconciler`] derives alarm identities from configuration and diffs
//!   them against the alarms that already exist in a backend

pub mod reconciler;
pub mod threshold;

pub use reconciler::{
    AlarmDescriptor, AlarmPlan, AlarmReconciler, AlarmTemplate, alarm_name, is_own_alarm,
};
pub use threshold::{ComparisonOperator, ThresholdRule};
