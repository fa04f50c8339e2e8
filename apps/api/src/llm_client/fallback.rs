//! Ordered endpoint fallback: one attempt per endpoint, first success wins,
//! only the most recent failure is kept.

use std::fmt::Display;
use std::future::Future;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq)]
pub enum FallbackError<E> {
    #[error("no candidate endpoints configured")]
    NoEndpoints,

    #[error("all {attempts} endpoints failed; last error: {last}")]
    Exhausted { attempts: usize, last: E },
}

impl<E> FallbackError<E> {
    /// The error from the final endpoint tried, if any endpoint was tried.
    pub fn into_last(self) -> Option<E> {
        match self {
            FallbackError::NoEndpoints => None,
            FallbackError::Exhausted { last, .. } => Some(last),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EndpointFallback {
    endpoints: Vec<String>,
}

impl EndpointFallback {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Runs `attempt` against each endpoint in order until one returns `Ok`.
    /// Failures are logged and replaced by the next one; no backoff between attempts.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<T, FallbackError<E>>
    where
        F: FnMut(&str) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut last_error: Option<E> = None;

        for (index, endpoint) in self.endpoints.iter().enumerate() {
            match attempt(endpoint).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        endpoint = %endpoint,
                        attempt = index + 1,
                        total = self.endpoints.len(),
                        error = %e,
                        "LLM endpoint failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(FallbackError::Exhausted {
                attempts: self.endpoints.len(),
                last,
            }),
            None => Err(FallbackError::NoEndpoints),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn policy(endpoints: &[&str]) -> EndpointFallback {
        EndpointFallback::new(endpoints.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn test_second_endpoint_succeeds_after_first_fails() {
        let tried = Mutex::new(Vec::new());
        let result = policy(&["a", "b"])
            .run(|endpoint| {
                tried.lock().unwrap().push(endpoint.to_string());
                let endpoint = endpoint.to_string();
                async move {
                    if endpoint == "a" {
                        Err(format!("{endpoint} refused"))
                    } else {
                        Ok(format!("{endpoint} response"))
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("b response".to_string()));
        assert_eq!(*tried.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_all_fail_surfaces_last_error() {
        let result: Result<(), _> = policy(&["a", "b"])
            .run(|endpoint| {
                let endpoint = endpoint.to_string();
                async move { Err(format!("{endpoint} timed out")) }
            })
            .await;

        assert_eq!(
            result,
            Err(FallbackError::Exhausted {
                attempts: 2,
                last: "b timed out".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_first_success_stops_iteration() {
        let calls = Mutex::new(0);
        let result: Result<&str, FallbackError<String>> = policy(&["a", "b", "c"])
            .run(|_| {
                *calls.lock().unwrap() += 1;
                async { Ok("ok") }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_endpoint_list() {
        let result: Result<(), FallbackError<String>> =
            policy(&[]).run(|_| async { Ok(()) }).await;
        assert_eq!(result, Err(FallbackError::NoEndpoints));
    }

    #[test]
    fn test_into_last() {
        let exhausted = FallbackError::Exhausted {
            attempts: 3,
            last: "boom",
        };
        assert_eq!(exhausted.into_last(), Some("boom"));
        assert_eq!(FallbackError::<&str>::NoEndpoints.into_last(), None);
    }
}
