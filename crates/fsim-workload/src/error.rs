use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("arrival rate must be positive, got {rate} req/min for '{request_type}'")]
    NonPositiveRate { request_type: String, rate: f64 },

    #[error("workload window must be positive, got {0} s")]
    NonPositiveWindow(f64),

    #[error("inter-arrival interval must be positive, got {0} s")]
    NonPositiveInterval(f64),
}

pub type WorkloadResult<T> = Result<T, WorkloadError>;
