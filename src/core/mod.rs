pub mod candidates;
pub mod classifier;
pub mod request;
pub mod scheduler;
pub mod template;

pub use crate::domain::model::{
    BodyTemplate, CandidateEvent, CheckOutcome, ConcreteRequest, HttpMethod, HttpResponse,
    RunReport, ServiceDescriptor, Template,
};
pub use crate::domain::ports::{Reporter, RequestExecutor, ResultSink};
pub use crate::utils::error::Result;
