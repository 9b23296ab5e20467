//! Role dashboards: which areas each role may open, and in what order.

use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::roles::{Role, SessionRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    CareerQuiz,
    Recommendations,
    Internships,
    Courses,
    InternshipPostings,
    Applicants,
    Users,
    Hosts,
    Reports,
}

impl Area {
    /// URL path segment; matches the serde name.
    pub fn slug(self) -> &'static str {
        match self {
            Area::CareerQuiz => "career-quiz",
            Area::Recommendations => "recommendations",
            Area::Internships => "internships",
            Area::Courses => "courses",
            Area::InternshipPostings => "internship-postings",
            Area::Applicants => "applicants",
            Area::Users => "users",
            Area::Hosts => "hosts",
            Area::Reports => "reports",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Area::CareerQuiz => "Career Quiz",
            Area::Recommendations => "My Recommendations",
            Area::Internships => "Browse Internships",
            Area::Courses => "Suggested Courses",
            Area::InternshipPostings => "Internship Postings",
            Area::Applicants => "Applicants",
            Area::Users => "Users",
            Area::Hosts => "Hosts",
            Area::Reports => "Reports",
        }
    }
}

const STUDENT_AREAS: &[Area] = &[
    Area::CareerQuiz,
    Area::Recommendations,
    Area::Internships,
    Area::Courses,
];
const HOST_AREAS: &[Area] = &[Area::InternshipPostings, Area::Applicants];
const ADMIN_AREAS: &[Area] = &[
    Area::Users,
    Area::Hosts,
    Area::InternshipPostings,
    Area::Reports,
];

impl Role {
    /// Areas in navigation order.
    pub fn areas(self) -> &'static [Area] {
        match self {
            Role::Student => STUDENT_AREAS,
            Role::Host => HOST_AREAS,
            Role::Admin => ADMIN_AREAS,
        }
    }

    pub fn can_access(self, area: Area) -> bool {
        self.areas().contains(&area)
    }

    fn dashboard_title(self) -> &'static str {
        match self {
            Role::Student => "Student Dashboard",
            Role::Host => "Host Dashboard",
            Role::Admin => "Admin Dashboard",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Host => "host",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSection {
    pub area: Area,
    pub label: &'static str,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub role: Role,
    pub title: &'static str,
    pub sections: Vec<DashboardSection>,
}

fn section(role: Role, area: Area) -> DashboardSection {
    DashboardSection {
        area,
        label: area.label(),
        path: format!("/dashboard/{}/{}", role.slug(), area.slug()),
    }
}

pub fn dashboard_for(role: Role) -> DashboardView {
    DashboardView {
        role,
        title: role.dashboard_title(),
        sections: role.areas().iter().map(|&area| section(role, area)).collect(),
    }
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(session: SessionRole) -> Json<DashboardView> {
    Json(dashboard_for(session.context.role()))
}

/// GET /api/v1/dashboard/:area
///
/// 403 when the session's current role may not open the area.
pub async fn handle_dashboard_area(
    session: SessionRole,
    Path(area): Path<Area>,
) -> Result<Json<DashboardSection>, AppError> {
    let role = session.context.role();
    if !role.can_access(area) {
        return Err(AppError::Forbidden(format!(
            "{} cannot open {}",
            role.dashboard_title(),
            area.label()
        )));
    }
    Ok(Json(section(role, area)))
}
