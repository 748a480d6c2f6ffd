/*
 * Responsibility
 * - middleware entry points
 * - http: request id / tracing / limits, auth: bearer token -> AuthCtx
 */
pub mod auth;
pub mod http;
