//! Background jobs spawned from `main`.
//!
//! Each job is a long-running async function that stops when its
//! [`CancellationToken`](tokio_util::sync::CancellationToken) is cancelled.

pub mod session_cleanup;
