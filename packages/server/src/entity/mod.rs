pub mod application;
pub mod resource_request;
