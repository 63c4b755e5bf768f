//! Router tests driving handlers through `tower::ServiceExt::oneshot`.

mod router_tests;
mod support;
