// SPDX-License-Identifier: MIT

//! Response header middleware.
//!
//! Every response is a JSON snapshot of live workout state, so nothing may be
//! cached, framed or sniffed. The page that embeds the map is allowed to use
//! geolocation (it centers the map on the user); other sensors are not.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

const PERMISSIONS_POLICY: &str =
    "geolocation=(self), accelerometer=(), camera=(), gyroscope=(), magnetometer=(), microphone=(), payment=(), usb=()";

/// Add security and caching headers to all responses.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static(PERMISSIONS_POLICY),
    );

    response
}
