pub mod diff_result;
pub mod error;
pub mod fragment;
pub mod ports;
pub mod report;
pub mod row;
pub mod value_objects;
