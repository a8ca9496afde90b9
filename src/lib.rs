// Module layout (Clean Architecture style)
// - bootstrap: configuration, adapter wiring and startup
// - infrastructure: Postgres/in-process persistence, sessions, geocoding, image storage, crypto
// - presentation: HTTP handlers, session middleware and routing
// - application: use cases, ports, validation and authorization
// - domain: core models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
