//! Typed request/response layer for the simulator bridge. Every endpoint has one
//! request type in [`http_request`] naming its path, method, body and the response
//! type in [`http_response`] it decodes into.

pub(crate) mod common;
pub(crate) mod http_client;
pub(crate) mod http_request;
pub(crate) mod http_response;
