use once_cell::sync::Lazy;
use std::{env, env::VarError, net::IpAddr};

pub static HOST: Lazy<IpAddr> = Lazy::new(|| {
    env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".into())
        .parse()
        .expect("HOST must be an IP address")
});

pub static PORT: Lazy<u16> = Lazy::new(|| match env::var("PORT") {
    Ok(port) => port.parse().expect("Invalid PORT"),
    Err(VarError::NotPresent) => 5000,
    Err(err) => panic!("Failed to read PORT: {}", err),
});

pub static STATIC_DIR: Lazy<Box<str>> = Lazy::new(|| {
    env::var("STATIC_DIR")
        .unwrap_or_else(|_| "static".into())
        .into_boxed_str()
});

pub static LOG_FILTER: Lazy<Box<str>> = Lazy::new(|| {
    env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".into())
        .into_boxed_str()
});

pub fn validate() {
    // Trigger the lazy statics to force panics early
    let _ = *HOST;
    let _ = *PORT;
    let _ = &*STATIC_DIR;
    let _ = &*LOG_FILTER;
}
