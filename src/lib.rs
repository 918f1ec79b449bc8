//! # user-registry
//!
//! An in-memory user registry over HTTP, behind a reverse proxy.
//!
//! Users are kept in process memory and managed through a small JSON API.
//! Every user route needs a bearer token obtained from the login endpoint.
//! Each request that reaches a handler is logged twice, with its body on the
//! way in and the response body on the way out, without the client seeing
//! any difference.
//!
//! ## Layout
//!
//! - [`Router`]: radix-tree routing via [`matchit`], with a per-route
//!   [`Access`] policy
//! - [`middleware`]: the [`Pipeline`] and its layers (error boundary, HTTPS
//!   redirect, authentication, authorization, logging)
//! - [`api`]: login, user CRUD and the OpenAPI document
//! - [`Server`]: hyper on tokio, with graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use user_registry::{Config, Server, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     Server::bind(config.addr).serve(app::build(&config)).await?;
//!     Ok(())
//! }
//! ```

mod body;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod app;
pub mod config;
pub mod health;
pub mod middleware;
pub mod store;
pub mod token;
pub mod validation;

pub use body::{Body, ResponseBody};
pub use config::Config;
pub use error::{ApiError, BoxError, Error, ErrorPayload, INTERNAL_ERROR_MESSAGE};
pub use handler::{BoxFuture, Handler, IntoOutcome, Outcome};
pub use method::Method;
pub use middleware::{Middleware, Next, Pipeline};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Access, Router};
pub use server::Server;
pub use status::Status;
