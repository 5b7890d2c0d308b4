pub mod gateway;
pub mod lifecycle;
pub mod listing;
#[cfg(test)]
pub mod memory_gateway;
pub mod notification;
pub mod s3_gateway;
pub mod storage_service;
