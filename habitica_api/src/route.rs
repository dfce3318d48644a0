//! Route classification and endpoint normalization.

/// Production Habitica origin.
pub const DEFAULT_ENDPOINT: &str = "https://habitica.com";

/// Value sent in the `x-client` header unless overridden.
pub const DEFAULT_PLATFORM: &str = "Habitica-Rust";

/// Path prefix for versioned API routes.
pub const API_PREFIX: &str = "/api/v3";

/// First path segments served outside the versioned API.
pub const TOP_LEVEL_ROUTES: &[&str] = &[
    "logout", "export", "email", "qr-code", "amazon", "iap", "paypal", "stripe",
];

/// Where a route lives on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Served at the origin root, e.g. `/logout`.
    TopLevel,
    /// Served under [`API_PREFIX`].
    Versioned,
}

impl RouteKind {
    /// Classifies a route by its leading path segment.
    ///
    /// The route must start with `/` followed by an allow-listed name; anything may
    /// follow the name. Matching is case-sensitive.
    pub fn classify(route: &str) -> Self {
        let Some(rest) = route.strip_prefix('/') else {
            return Self::Versioned;
        };
        if TOP_LEVEL_ROUTES.iter().any(|name| rest.starts_with(name)) {
            Self::TopLevel
        } else {
            Self::Versioned
        }
    }

    /// URL prefix inserted between the endpoint and the route.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::TopLevel => "",
            Self::Versioned => API_PREFIX,
        }
    }
}

/// Builds the full request URL for a route.
pub fn route_url(endpoint: &str, route: &str) -> String {
    format!("{}{}{}", endpoint, RouteKind::classify(route).prefix(), route)
}

/// Strips one trailing slash from an endpoint.
pub fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.strip_suffix('/').unwrap_or(endpoint).to_string()
}
