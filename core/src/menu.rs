//! Static route table and the menus derived from it.
//!
//! Routes are plain data; menus are lookups over that data. The public
//! navigation shows routes flagged `show_in_menu` ordered by `menu_index`,
//! the admin sidebar shows children of `/admin` flagged `show_in_sidebar`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub show_in_menu: bool,
    pub menu_index: Option<&'static str>,
    pub show_in_sidebar: bool,
    pub requires_auth: bool,
    pub guest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub meta: RouteMeta,
    pub children: &'static [Route],
}

const fn route(path: &'static str, name: &'static str, meta: RouteMeta) -> Route {
    Route {
        path,
        name: Some(name),
        meta,
        children: &[],
    }
}

const BLANK: RouteMeta = RouteMeta {
    title: None,
    icon: None,
    show_in_menu: false,
    menu_index: None,
    show_in_sidebar: false,
    requires_auth: false,
    guest: false,
};

const fn page(title: &'static str) -> RouteMeta {
    RouteMeta {
        title: Some(title),
        ..BLANK
    }
}

const fn menu(title: &'static str, index: &'static str) -> RouteMeta {
    RouteMeta {
        show_in_menu: true,
        menu_index: Some(index),
        ..page(title)
    }
}

const fn sidebar(title: &'static str, icon: &'static str) -> RouteMeta {
    RouteMeta {
        icon: Some(icon),
        show_in_sidebar: true,
        ..page(title)
    }
}

const ADMIN_CHILDREN: &[Route] = &[
    route("", "admin-dashboard", sidebar("仪表盘", "mdi:view-dashboard-outline")),
    route("categories", "admin-categories", sidebar("博客类型管理", "mdi:format-list-bulleted-type")),
    route("tags", "admin-tags", sidebar("博客标签管理", "mdi:tag")),
    route("posts", "admin-posts", sidebar("博客文章管理", "mdi:post-it-notes-outline")),
    route("diaryBook", "admin-diaryBook", sidebar("日记管理", "mdi:notebook-edit-outline")),
    route("photo", "admin-photo", sidebar("相册管理", "mdi:photo-library")),
    route("settings", "admin-settings", sidebar("系统设置", "mdi:cog-outline")),
];

pub const ROUTES: &[Route] = &[
    route("/", "home", page("首页")),
    route("/post/:postId", "postViews", page("文章")),
    route("/categories/:categoryId", "categoryViews", page("分类")),
    route("/categories/all", "allCategory", menu("分类", "1")),
    route("/tags/:tagId", "tagViews", page("标签")),
    route("/tags/all", "allTag", menu("标签", "2")),
    route("/archives", "blogArchives", menu("归档", "3")),
    route("/diary", "diaryBook", menu("日记", "4")),
    route("/photo", "photo", menu("相册", "5")),
    route("/recommendations", "personalRecommendations", menu("推荐", "6")),
    route("/login", "login", RouteMeta { guest: true, ..page("登录") }),
    Route {
        path: "/admin",
        name: None,
        meta: RouteMeta {
            requires_auth: true,
            ..BLANK
        },
        children: ADMIN_CHILDREN,
    },
    route("/:pathMatch(.*)*", "NotFound", page("404")),
];

/// Entry of the public navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub index: String,
    pub title: String,
    pub path: String,
}

/// Generic navigation node built from a route tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub path: String,
    pub label: String,
    pub icon: Option<String>,
    pub children: Vec<NavItem>,
}

/// Remove `:param` segments from a route path.
///
/// `/users/:id/profile` becomes `/users/profile`; an absolute path left with
/// nothing becomes `/`; relative paths just join what remains.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let cleaned: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.starts_with(':'))
        .collect();
    let joined = cleaned.join("/");
    if path.starts_with('/') && cleaned.iter().all(|segment| segment.is_empty()) {
        return "/".to_string();
    }
    joined
}

/// Join a child route path onto its parent's full path.
fn full_path(parent: &str, path: &str) -> String {
    if parent.is_empty() || path.starts_with('/') {
        return path.to_string();
    }
    if path.is_empty() {
        return parent.to_string();
    }
    let separator = if parent.ends_with('/') { "" } else { "/" };
    format!("{parent}{separator}{path}")
}

/// Convert a route tree into navigation items with cleaned paths.
pub fn generate_menu_items(routes: &[Route], parent_path: &str) -> Vec<NavItem> {
    routes
        .iter()
        .map(|route| {
            let full = full_path(parent_path, route.path);
            let label = route
                .meta
                .title
                .or(route.name)
                .unwrap_or(route.path)
                .to_string();
            NavItem {
                path: clean_path(&full),
                label,
                icon: route.meta.icon.map(str::to_string),
                children: generate_menu_items(route.children, &full),
            }
        })
        .collect()
}

/// Public navigation entries ordered by their menu index.
pub fn public_menu() -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = ROUTES
        .iter()
        .filter(|route| route.meta.show_in_menu)
        .map(|route| MenuItem {
            index: route.meta.menu_index.unwrap_or(route.path).to_string(),
            title: route.meta.title.unwrap_or("Unnamed Menu").to_string(),
            path: route.path.to_string(),
        })
        .collect();
    items.sort_by(|a, b| a.index.cmp(&b.index));
    items
}

/// Admin sidebar entries with full, parameter-free paths.
pub fn admin_sidebar() -> Vec<NavItem> {
    ROUTES
        .iter()
        .filter(|route| !route.children.is_empty())
        .flat_map(|parent| {
            let visible: Vec<Route> = parent
                .children
                .iter()
                .copied()
                .filter(|child| child.meta.show_in_sidebar)
                .collect();
            generate_menu_items(&visible, parent.path)
        })
        .collect()
}

/// Whether navigating to `path` needs a logged-in user.
pub fn requires_auth(path: &str) -> bool {
    ROUTES
        .iter()
        .filter(|route| route.meta.requires_auth)
        .any(|route| path == route.path || path.starts_with(&format!("{}/", route.path)))
}
