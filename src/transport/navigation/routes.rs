use std::collections::BTreeMap;

/// The page a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    CreateList,
    ViewList,
    MyLists,
    Login,
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub name: &'static str,
    /// Pattern; `:name` segments capture a parameter.
    pub path: &'static str,
    pub view: View,
    pub requires_auth: bool,
}

pub const HOME: &str = "home";
pub const CREATE_LIST: &str = "create-list";
pub const VIEW_LIST: &str = "view-list";
pub const MY_LISTS: &str = "my-lists";
pub const LOGIN: &str = "login";

pub const GROCERY_ROUTES: &[RouteDef] = &[
    RouteDef {
        name: HOME,
        path: "/",
        view: View::Home,
        requires_auth: false,
    },
    RouteDef {
        name: CREATE_LIST,
        path: "/create-list",
        view: View::CreateList,
        requires_auth: false,
    },
    RouteDef {
        name: VIEW_LIST,
        path: "/view-list/:id",
        view: View::ViewList,
        requires_auth: false,
    },
    RouteDef {
        name: MY_LISTS,
        path: "/my-lists",
        view: View::MyLists,
        requires_auth: true,
    },
    RouteDef {
        name: LOGIN,
        path: "/login",
        view: View::Login,
        requires_auth: false,
    },
];

pub type Params = BTreeMap<String, String>;

/// A resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: RouteDef,
    pub params: Params,
}

/// Drops query string and fragment, and any trailing slash except the root's.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Matches `path` against `pattern`, capturing `:param` segments.
pub fn match_path(pattern: &str, path: &str) -> Option<Params> {
    let pattern_segs = segments(pattern);
    let path_segs = segments(path);
    if pattern_segs.len() != path_segs.len() {
        return None;
    }
    let mut params = Params::new();
    for (pat, seg) in pattern_segs.iter().zip(path_segs.iter()) {
        match pat.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), seg.to_string());
            }
            None if pat == seg => {}
            None => return None,
        }
    }
    Some(params)
}

/// Static mapping from URL path to view.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn new(routes: &[RouteDef]) -> Self {
        Self {
            routes: routes.to_vec(),
        }
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// First route whose pattern matches `path`.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = normalize_path(path);
        self.routes.iter().find_map(|route| {
            match_path(route.path, &path).map(|params| RouteMatch {
                route: *route,
                params,
            })
        })
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Builds the path of a named route, filling its parameters.
    pub fn href(&self, name: &str, params: &Params) -> Option<String> {
        let route = self.by_name(name)?;
        let mut parts = Vec::new();
        for seg in segments(route.path) {
            match seg.strip_prefix(':') {
                Some(param) => parts.push(params.get(param)?.as_str()),
                None => parts.push(seg),
            }
        }
        Some(format!("/{}", parts.join("/")))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(GROCERY_ROUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_query_fragment_and_trailing_slash() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/my-lists/"), "/my-lists");
        assert_eq!(normalize_path("/view-list/abc?tab=items#top"), "/view-list/abc");
        assert_eq!(normalize_path("login"), "/login");
    }

    #[test]
    fn params_are_captured() {
        let params = match_path("/view-list/:id", "/view-list/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(match_path("/view-list/:id", "/view-list").is_none());
        assert!(match_path("/view-list/:id", "/edit-list/42").is_none());
    }

    #[test]
    fn table_resolves_every_route() {
        let table = RouteTable::default();
        assert_eq!(table.resolve("/").unwrap().route.view, View::Home);
        assert_eq!(table.resolve("/create-list").unwrap().route.name, CREATE_LIST);
        let m = table.resolve("/view-list/abc").unwrap();
        assert_eq!(m.route.view, View::ViewList);
        assert_eq!(m.params["id"], "abc");
        assert!(table.resolve("/my-lists").unwrap().route.requires_auth);
        assert!(table.resolve("/nowhere").is_none());
    }

    #[test]
    fn href_fills_params() {
        let table = RouteTable::default();
        let mut params = Params::new();
        params.insert("id".into(), "abc".into());
        assert_eq!(table.href(VIEW_LIST, &params).as_deref(), Some("/view-list/abc"));
        assert_eq!(table.href(HOME, &Params::new()).as_deref(), Some("/"));
        assert_eq!(table.href(VIEW_LIST, &Params::new()), None);
    }
}
