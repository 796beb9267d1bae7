//! Workspace integration tests: HTTP routes through the router and live
//! WebSocket sessions against a bound server, all on in-memory stores.

mod auth_test;
mod helpers;
mod room_test;
mod ws_test;
