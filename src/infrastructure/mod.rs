//! Infrastructure Layer - 适配器与对外接口

pub mod adapters;
pub mod cache;
pub mod http;
