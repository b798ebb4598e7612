//! Client-facing routes and the access policy attached to each.

use core::fmt;

use libris_core::EbookId;

use crate::guard::Access;

/// Every page of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Profile,
    EbookDetail(EbookId),
    AdminDashboard,
    AdminEbooks,
    AdminEbookNew,
    AdminEbookEdit(EbookId),
}

impl Route {
    /// Path of this route, always starting with `/`.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Profile => "/profile".to_owned(),
            Self::EbookDetail(id) => format!("/ebook/{id}"),
            Self::AdminDashboard => "/admin/dashboard".to_owned(),
            Self::AdminEbooks => "/admin/ebooks".to_owned(),
            Self::AdminEbookNew => "/admin/ebooks/new".to_owned(),
            Self::AdminEbookEdit(id) => format!("/admin/ebooks/edit/{id}"),
        }
    }

    /// Match a path (without query string) to a route.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
        match segments.as_slice() {
            [] => Some(Self::Home),
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["profile"] => Some(Self::Profile),
            ["ebook", id] => id.parse().ok().map(Self::EbookDetail),
            ["admin", "dashboard"] => Some(Self::AdminDashboard),
            ["admin", "ebooks"] => Some(Self::AdminEbooks),
            ["admin", "ebooks", "new"] => Some(Self::AdminEbookNew),
            ["admin", "ebooks", "edit", id] => id.parse().ok().map(Self::AdminEbookEdit),
            _ => None,
        }
    }

    /// Access policy guarding this route.
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Home | Self::Login | Self::Register | Self::EbookDetail(_) => Access::Public,
            Self::Profile => Access::Authenticated,
            Self::AdminDashboard
            | Self::AdminEbooks
            | Self::AdminEbookNew
            | Self::AdminEbookEdit(_) => Access::Elevated,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Route; 9] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Profile,
        Route::EbookDetail(EbookId::new(4)),
        Route::AdminDashboard,
        Route::AdminEbooks,
        Route::AdminEbookNew,
        Route::AdminEbookEdit(EbookId::new(9)),
    ];

    #[test]
    fn test_paths_parse_back() {
        for route in ALL {
            assert_eq!(Route::parse(&route.path()), Some(route), "{route}");
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Route::parse("/ebook/abc"), None);
        assert_eq!(Route::parse("/admin"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_parse_tolerates_trailing_slash() {
        assert_eq!(Route::parse("/admin/ebooks/"), Some(Route::AdminEbooks));
        assert_eq!(Route::parse(""), Some(Route::Home));
    }

    #[test]
    fn test_access() {
        assert_eq!(Route::Home.access(), Access::Public);
        assert_eq!(Route::EbookDetail(EbookId::new(1)).access(), Access::Public);
        assert_eq!(Route::Profile.access(), Access::Authenticated);
        assert_eq!(Route::AdminEbookNew.access(), Access::Elevated);
    }
}
