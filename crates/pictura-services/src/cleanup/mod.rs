mod service;

pub use service::SweepService;
