//! Server-rendered HTML.
//!
//! Every interpolated value passes through [`escape`]. Pages share one
//! layout carrying navigation for the current viewer and pending flashes.

use std::fmt::Write;

use axum::response::Html;
use chrono::NaiveDate;

use crate::config::APP_NAME;
use crate::models::enums::*;
use crate::models::{Allergy, Patient, User};
use crate::patients::PatientRecord;
use crate::session::Flash;

/// Per-request page chrome.
pub struct Page {
    pub viewer: Option<User>,
    pub flashes: Vec<Flash>,
}

impl Page {
    fn role(&self) -> Option<Role> {
        self.viewer.as_ref().map(|u| u.role)
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(page: &Page, title: &str, body: &str) -> Html<String> {
    let nav = match &page.viewer {
        Some(user) => {
            let mut links = String::from(r#"<a href="/patients">Patients</a>"#);
            if user.role == Role::Admin {
                links.push_str(r#" <a href="/admin/patients">Register patient</a>"#);
            }
            format!(
                r#"{links} <span class="who">{name} ({role})</span>
<form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>"#,
                name = escape(&user.full_name()),
                role = user.role,
            )
        }
        None => r#"<a href="/login">Log in</a> <a href="/register">Register</a>"#.to_string(),
    };

    let mut flashes = String::new();
    for flash in &page.flashes {
        let _ = write!(
            flashes,
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message)
        );
    }

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} | {APP_NAME}</title></head>
<body>
<nav><a href="/">{APP_NAME}</a> <a href="/about">About</a> {nav}</nav>
{flashes}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn options<T: Copy + PartialEq>(all: &[T], label: fn(&T) -> &'static str, selected: Option<T>) -> String {
    let mut out = String::new();
    for value in all {
        let mark = if Some(*value) == selected { " selected" } else { "" };
        let text = label(value);
        let _ = write!(out, r#"<option value="{v}"{mark}>{v}</option>"#, v = escape(text));
    }
    out
}

fn flag_options() -> &'static str {
    r#"<option value="0">0</option><option value="1">1</option>"#
}

// ═══════════════════════════════════════════════════════════
// Static pages
// ═══════════════════════════════════════════════════════════

pub fn home(page: &Page) -> Html<String> {
    let body = match page.role() {
        Some(Role::Admin) => r#"<p>Register new patients and review the patient list.</p>"#,
        Some(Role::Doctor) => r#"<p>Review patients, record allergies and stroke-risk assessments.</p>"#,
        None => r#"<p>Please <a href="/login">log in</a> to manage patient records.</p>"#,
    };
    layout(page, "Stroke risk records", body)
}

pub fn about(page: &Page) -> Html<String> {
    layout(
        page,
        "About",
        "<p>Administrators register patients. Doctors maintain allergies and record stroke-risk assessments.</p>",
    )
}

pub fn not_found(page: &Page) -> Html<String> {
    layout(page, "Page not found", r#"<p><a href="/">Return home</a></p>"#)
}

// ═══════════════════════════════════════════════════════════
// Accounts
// ═══════════════════════════════════════════════════════════

pub fn register(page: &Page) -> Html<String> {
    let roles = options(Role::ALL, Role::as_str, None);
    let body = format!(
        r#"<form method="post" action="/register">
<label>First name <input name="first_name"></label>
<label>Last name <input name="last_name"></label>
<label>Email <input name="email" type="email"></label>
<label>Password <input name="password" type="password"></label>
<label>Confirm password <input name="confirm_password" type="password"></label>
<label>Role <select name="role">{roles}</select></label>
<button type="submit">Register</button>
</form>"#
    );
    layout(page, "Register", &body)
}

pub fn login(page: &Page) -> Html<String> {
    let body = r#"<form method="post" action="/login">
<label>Email <input name="email" type="email"></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Log in</button>
</form>"#;
    layout(page, "Log in", body)
}

// ═══════════════════════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════════════════════

pub fn patient_list(page: &Page, patients: &[Patient], today: NaiveDate) -> Html<String> {
    if patients.is_empty() {
        return layout(page, "Patients", "<p>No patients registered.</p>");
    }
    let mut rows = String::new();
    for p in patients {
        let _ = write!(
            rows,
            r#"<tr><td><a href="/patients/{id}">{name}</a></td><td>{gender}</td><td>{age}</td><td>{email}</td></tr>"#,
            id = p.id,
            name = escape(&p.full_name()),
            gender = p.gender,
            age = p.age_on(today),
            email = escape(&p.email),
        );
    }
    let body = format!(
        "<table><thead><tr><th>Name</th><th>Gender</th><th>Age</th><th>Email</th></tr></thead><tbody>{rows}</tbody></table>"
    );
    layout(page, "Patients", &body)
}

pub fn patient_detail(page: &Page, record: &PatientRecord) -> Html<String> {
    let p = &record.patient;
    let is_doctor = page.role() == Some(Role::Doctor);
    let mut body = format!(
        r#"<dl>
<dt>Email</dt><dd>{email}</dd>
<dt>Gender</dt><dd>{gender}</dd>
<dt>Date of birth</dt><dd>{dob} (age {age})</dd>
</dl>"#,
        email = escape(&p.email),
        gender = p.gender,
        dob = p.date_of_birth,
        age = record.age,
    );

    if is_doctor {
        let _ = write!(
            body,
            r#"<p><a href="/patients/{id}/edit">Edit details</a> <a href="/patients/{id}/allergies">Add allergy</a> <a href="/patients/{id}/assessments">New assessment</a></p>"#,
            id = p.id
        );
    }
    if page.role() == Some(Role::Admin) {
        let _ = write!(
            body,
            r#"<form method="post" action="/patients/{id}/delete"><button type="submit">Delete patient</button></form>"#,
            id = p.id
        );
    }

    body.push_str("<h2>Allergies</h2>");
    if record.allergies.is_empty() {
        body.push_str("<p>No allergies recorded.</p>");
    } else {
        body.push_str("<ul>");
        for a in &record.allergies {
            let _ = write!(
                body,
                "<li>{allergen} ({severity}, added {date})",
                allergen = escape(&a.allergen),
                severity = a.severity,
                date = a.date_added,
            );
            if is_doctor {
                let _ = write!(
                    body,
                    r#" <a href="/patients/{pid}/allergies/{aid}/edit">Edit</a>
<form method="post" action="/patients/{pid}/allergies/{aid}/delete" class="inline"><button type="submit">Delete</button></form>"#,
                    pid = p.id,
                    aid = escape(&a.id),
                );
            }
            body.push_str("</li>");
        }
        body.push_str("</ul>");
    }

    body.push_str("<h2>Assessments</h2>");
    if record.assessments.is_empty() {
        body.push_str("<p>No assessments recorded.</p>");
    } else {
        body.push_str(
            "<table><thead><tr><th>Hypertension</th><th>Ever married</th><th>Work type</th><th>Residence</th>\
<th>Avg glucose</th><th>BMI</th><th>Smoking</th><th>Stroke</th></tr></thead><tbody>",
        );
        for a in &record.assessments {
            let d = &a.data;
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.1}</td><td>{}</td><td>{}</td></tr>",
                u8::from(d.hypertension),
                d.ever_married,
                d.work_type,
                d.residence_type,
                d.avg_glucose_level,
                d.bmi,
                d.smoking_status,
                u8::from(d.stroke),
            );
        }
        body.push_str("</tbody></table>");
    }

    layout(page, &p.full_name(), &body)
}

/// Registration form (no patient) or correction form (email fixed).
pub fn patient_form(page: &Page, existing: Option<&Patient>) -> Html<String> {
    let (title, action) = match existing {
        Some(p) => ("Edit patient".to_string(), format!("/patients/{}/edit", p.id)),
        None => ("Register patient".to_string(), "/admin/patients".to_string()),
    };
    let value = |f: fn(&Patient) -> String| existing.map(f).map(|v| escape(&v)).unwrap_or_default();
    let email = match existing {
        Some(p) => format!("<p>Email: {}</p>", escape(&p.email)),
        None => r#"<label>Email <input name="email" type="email"></label>"#.to_string(),
    };
    let genders = options(Gender::ALL, Gender::as_str, existing.map(|p| p.gender));

    let body = format!(
        r#"<form method="post" action="{action}">
<label>First name <input name="first_name" value="{first}"></label>
<label>Last name <input name="last_name" value="{last}"></label>
{email}
<label>Gender <select name="gender">{genders}</select></label>
<label>Date of birth <input name="date_of_birth" type="date" value="{dob}"></label>
<button type="submit">Save</button>
</form>"#,
        first = value(|p| p.first_name.clone()),
        last = value(|p| p.last_name.clone()),
        dob = value(|p| p.date_of_birth.to_string()),
    );
    layout(page, &title, &body)
}

// ═══════════════════════════════════════════════════════════
// Clinical documents
// ═══════════════════════════════════════════════════════════

pub fn allergy_form(page: &Page, patient: &Patient, existing: Option<&Allergy>, today: NaiveDate) -> Html<String> {
    let action = match existing {
        Some(a) => format!("/patients/{}/allergies/{}/edit", patient.id, escape(&a.id)),
        None => format!("/patients/{}/allergies", patient.id),
    };
    let severities = options(AllergySeverity::ALL, AllergySeverity::as_str, existing.map(|a| a.severity));
    let body = format!(
        r#"<form method="post" action="{action}">
<label>Allergen <input name="allergen" value="{allergen}"></label>
<label>Severity <select name="severity">{severities}</select></label>
<label>Date added <input name="date_added" type="date" value="{date}"></label>
<button type="submit">Save</button>
</form>
<p><a href="/patients/{pid}">Back to patient</a></p>"#,
        allergen = existing.map(|a| escape(&a.allergen)).unwrap_or_default(),
        date = existing.map(|a| a.date_added).unwrap_or(today),
        pid = patient.id,
    );
    let title = format!("Allergy for {}", patient.full_name());
    layout(page, &title, &body)
}

pub fn assessment_form(page: &Page, patient: &Patient) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/patients/{pid}/assessments">
<label>Hypertension <select name="hypertension">{flags}</select></label>
<label>Ever married <select name="ever_married">{married}</select></label>
<label>Work type <select name="work_type">{work}</select></label>
<label>Residence type <select name="residence_type">{residence}</select></label>
<label>Average glucose level <input name="avg_glucose_level" inputmode="decimal"></label>
<label>BMI <input name="bmi" inputmode="decimal"></label>
<label>Smoking status <select name="smoking_status">{smoking}</select></label>
<label>Stroke <select name="stroke">{flags}</select></label>
<button type="submit">Record assessment</button>
</form>
<p><a href="/patients/{pid}">Back to patient</a></p>"#,
        pid = patient.id,
        flags = flag_options(),
        married = options(EverMarried::ALL, EverMarried::as_str, None),
        work = options(WorkType::ALL, WorkType::as_str, None),
        residence = options(ResidenceType::ALL, ResidenceType::as_str, None),
        smoking = options(SmokingStatus::ALL, SmokingStatus::as_str, None),
    );
    let title = format!("Assessment for {}", patient.full_name());
    layout(page, &title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FlashLevel;

    fn anonymous() -> Page {
        Page { viewer: None, flashes: vec![] }
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape(r#"<b onclick="x">&'"#), "&lt;b onclick=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn flashes_are_rendered_escaped() {
        let page = Page {
            viewer: None,
            flashes: vec![Flash::new(FlashLevel::Danger, "<script>")],
        };
        let Html(html) = home(&page);
        assert!(html.contains(r#"class="flash flash-danger">&lt;script&gt;"#));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn anonymous_nav_offers_login() {
        let Html(html) = about(&anonymous());
        assert!(html.contains(r#"href="/login""#));
        assert!(!html.contains("/logout"));
    }

    #[test]
    fn admin_sees_registration_link() {
        let page = Page {
            viewer: Some(User {
                id: 1,
                first_name: "Ada".into(),
                last_name: "Admin".into(),
                email: "admin@example.com".into(),
                role: Role::Admin,
                password_hash: String::new(),
            }),
            flashes: vec![],
        };
        let Html(html) = home(&page);
        assert!(html.contains("/admin/patients"));
        assert!(html.contains("Ada Admin (admin)"));
    }

    #[test]
    fn edit_form_selects_current_gender() {
        let patient = Patient {
            id: 9,
            first_name: "Jo".into(),
            last_name: "Roe".into(),
            email: "jo@example.com".into(),
            gender: Gender::Female,
            date_of_birth: NaiveDate::from_ymd_opt(1980, 2, 3).unwrap(),
            created_by: 1,
        };
        let Html(html) = patient_form(&anonymous(), Some(&patient));
        assert!(html.contains(r#"<option value="Female" selected>"#));
        assert!(html.contains(r#"action="/patients/9/edit""#));
        assert!(html.contains("1980-02-03"));
        assert!(!html.contains(r#"name="email""#));
    }
}
