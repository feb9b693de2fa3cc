// Adapters layer: concrete implementations of the domain ports (http, storage, reporting).

pub mod http;
pub mod reporter;
pub mod storage;
