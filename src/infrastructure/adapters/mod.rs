//! Infrastructure Adapters - 外部协作方适配器

pub mod providers;
pub mod speaker;
