//! Request fingerprinting

use std::net::IpAddr;

use actix_web::{http::header, HttpRequest};

use ks_core::domain::entities::DeviceContext;

/// User agent and client IP of a request
///
/// The client IP is the first `X-Forwarded-For` hop, else `X-Real-IP`, else
/// the peer address. Header values that do not parse as an IP address are
/// skipped.
pub fn device_context(req: &HttpRequest) -> DeviceContext {
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    DeviceContext::new(user_agent, client_ip(req))
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

fn client_ip(req: &HttpRequest) -> String {
    let forwarded = header_value(req, "x-forwarded-for")
        .and_then(|v| v.split(',').map(str::trim).find(|hop| !hop.is_empty()))
        .and_then(parse_ip);

    forwarded
        .or_else(|| header_value(req, "x-real-ip").and_then(parse_ip))
        .or_else(|| req.peer_addr().map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
        .unwrap_or_default()
}

/// Token from an `Authorization: Bearer` header
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
