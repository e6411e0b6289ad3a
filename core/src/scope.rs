//! # Scoped Lifecycle
//!
//! Brackets a block of experiment code with a service lifecycle:
//!
//! * on entry the service is (re)deployed with `force`;
//! * on exit it is backed up and then destroyed, whatever happened in between.
//!
//! The block only runs when the deploy could be dispatched. Cleanup runs in
//! every case, including a block that returned an error or panicked.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use anyhow::Context;
use futures::FutureExt;
use tracing::{info, warn};

use crate::service::Service;

/// Runs `body` inside the lifecycle of `service`.
///
/// Returns the first error in the order deploy, body, backup, destroy. The
/// other ones are logged. A panic in `body` is resumed once cleanup is done.
pub async fn scoped<S, F, T>(service: &S, body: F) -> anyhow::Result<T>
where
    S: Service + ?Sized,
    F: Future<Output = anyhow::Result<T>>,
{
    let mut first: Option<anyhow::Error> = None;
    let mut value: Option<T> = None;
    let mut panic = None;

    match service.deploy(true).await.context("deploy failed") {
        Ok(_) => match AssertUnwindSafe(body).catch_unwind().await {
            Ok(Ok(v)) => value = Some(v),
            Ok(Err(e)) => keep_first(&mut first, e),
            Err(payload) => {
                warn!("scope body panicked, cleaning up");
                panic = Some(payload);
            }
        },
        Err(e) => keep_first(&mut first, e),
    }

    info!("leaving scope: backup then destroy");
    if let Err(e) = service.backup().await.context("backup failed") {
        keep_first(&mut first, e);
    }
    if let Err(e) = service.destroy().await.context("destroy failed") {
        keep_first(&mut first, e);
    }

    if let Some(payload) = panic {
        if let Some(e) = first {
            warn!("{e:#}");
        }
        std::panic::resume_unwind(payload);
    }
    if let Some(e) = first {
        return Err(e);
    }
    value.context("scope body did not run")
}

fn keep_first(first: &mut Option<anyhow::Error>, err: anyhow::Error) {
    match first {
        None => *first = Some(err),
        Some(_) => warn!("{err:#}"),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
