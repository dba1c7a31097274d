//! Authentication strategy resolution

mod strategy;

pub use strategy::{
    AuthRegistry, AuthStrategy, Credentials, PlainTextAuth, PLAIN_TEXT_AUTH_PROVIDER,
    PLAIN_TEXT_AUTH_PROVIDER_QUALIFIED,
};
