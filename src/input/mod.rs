//! Key-injection boundary towards the operating system.

pub mod injector;

pub use injector::{InjectorError, KeyInjector, XdotoolInjector};
