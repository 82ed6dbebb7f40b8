//! A small user registry served over HTTP.
//!
//! Users log in with a username and password and receive a sealed session
//! token. The token is stored on the user record, so each new login replaces
//! the previous session.

pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod routes;

pub mod crypto {
    pub mod aes;
}

pub mod token {
    pub mod maker;
    pub mod payload;
}

pub mod models {
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod users;
}

pub mod handlers {
    pub mod auth;
    pub mod health;
    pub mod users;
}

pub mod middleware_layer {
    pub mod admin;
    pub mod auth;
}

pub mod validation {
    pub mod extract;
    pub mod user;
}
