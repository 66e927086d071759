pub mod category;
pub mod endpoint;
pub mod health_log;
pub mod mirror;
pub mod request_log;
pub mod source;

pub use category::CategoryRepository;
pub use endpoint::EndpointRepository;
pub use health_log::HealthLogRepository;
pub use mirror::MirrorRepository;
pub use request_log::{NewRequestObservation, RequestLogRepository};
pub use source::SourceRepository;
