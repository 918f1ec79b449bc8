//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from the load balancer. |
//!
//! Both are anonymous routes, registered by [`api::routes`](crate::api::routes).

use crate::api::AppState;
use crate::{Request, Response, Status};

/// Always `200 OK` with body `"ok"`. If the process can respond to HTTP at
/// all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` once the user store can be read; `503`
/// otherwise.
pub async fn readiness(req: Request) -> Response {
    let ready = req
        .state::<AppState>()
        .is_ok_and(|state| state.store.len().is_ok());

    if ready {
        Response::text("ready")
    } else {
        Response::builder().status(Status::ServiceUnavailable).text("not ready")
    }
}
