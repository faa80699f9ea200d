pub mod field_map;
pub mod granularity;
pub mod period;
pub mod station;
