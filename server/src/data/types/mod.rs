//! Shared data types
//!
//! Report parameters, result rows and dimension enums used by both the
//! repository layer and the API layer.

mod analytics;
mod enums;

pub use analytics::{
    GroupViewsRow, PerformanceBucketRow, PerformanceParams, ReportFilter, SeedParams,
    SeedSummary, TopRow, growth_percent,
};
pub use enums::{CompareUnit, ObjectType, RangeUnit, TopKind};
