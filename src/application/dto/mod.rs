pub mod update_request;
pub mod update_response;

pub use update_request::UpdateRequest;
pub use update_response::UpdateResponse;
