use crate::storage::AuthProvider;
use crate::transport::navigation::guard::{GuardDecision, NavigationGuard};
use crate::transport::navigation::routes::{normalize_path, Params, RouteDef, RouteTable};
use std::sync::Arc;
use tracing::debug;

/// Where a navigation attempt ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render {
        route: RouteDef,
        params: Params,
    },
    Redirect {
        /// Name of the route to show instead.
        to: &'static str,
        /// Path of that route.
        path: String,
        /// The path that was originally requested.
        redirect_from: String,
    },
    NotFound {
        path: String,
    },
}

/// Route table plus the authentication guard.
#[derive(Clone)]
pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    base_path: String,
}

impl Router {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self::with_table(RouteTable::default(), auth)
    }

    pub fn with_table(table: RouteTable, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            table,
            guard: NavigationGuard::new(auth),
            base_path: String::new(),
        }
    }

    /// Prefix removed from incoming paths before matching (e.g. `/app`).
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let base = base_path.into();
        self.base_path = base.trim_end_matches('/').to_string();
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base_path.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with(['/', '?', '#']) => rest,
            _ => path,
        }
    }

    /// Resolves `path` and runs the guard for protected routes.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let local = self.strip_base(path);
        let Some(matched) = self.table.resolve(local) else {
            debug!(path, "no route");
            return Navigation::NotFound {
                path: normalize_path(local),
            };
        };

        match self.guard.check(&matched.route).await {
            GuardDecision::Proceed => Navigation::Render {
                route: matched.route,
                params: matched.params,
            },
            GuardDecision::Redirect(to) => {
                let target = self
                    .table
                    .by_name(to)
                    .map(|r| r.path.to_string())
                    .unwrap_or_else(|| "/".to_string());
                Navigation::Redirect {
                    to,
                    path: format!("{}{}", self.base_path, target),
                    redirect_from: normalize_path(local),
                }
            }
        }
    }
}
