//! Full HTML pages around the dashboard fragments.

use crate::{
    core::auth::Identity,
    dashboard::Menu,
    render::format::escape_html,
};

const HEAD: &str = r#"<meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1">
<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet">
<link href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.2/css/all.min.css" rel="stylesheet">"#;

/// The login form, with the refusal message of a failed attempt.
#[must_use]
pub fn login(message: Option<&str>) -> String {
    let error = message.map_or_else(String::new, |m| {
        format!(
            r#"<div id="errorMsg" class="alert alert-danger">{}</div>"#,
            escape_html(m)
        )
    });

    format!(
        r#"<!DOCTYPE html>
<html><head>{HEAD}<title>School Desk - Login</title></head>
<body class="bg-light"><div id="loginSection" class="container" style="max-width: 420px; margin-top: 10vh;">
<div class="card"><div class="card-body">
<h4 class="card-title mb-3">School Desk</h4>
{error}
<form id="loginForm" method="post" action="/login">
<div class="mb-3"><label class="form-label">Email</label><input id="email" name="email" type="email" class="form-control" required></div>
<div class="mb-3"><label class="form-label">Password</label><input id="password" name="password" type="password" class="form-control" required></div>
<button id="loginbtn" class="btn btn-primary w-100">Login</button>
</form></div></div></div></body></html>"#
    )
}

/// The dashboard shell: navbar, side menu and the view region's content.
#[must_use]
pub fn shell(identity: &Identity, menu: &Menu, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head>{HEAD}<title>School Desk</title></head>
<body><div id="dashboardSection">
<nav class="navbar navbar-expand-lg navbar-dark bg-primary"><div class="container-fluid">
<a class="navbar-brand" href="/">School Desk</a>
<ul id="navMenu" class="navbar-nav d-lg-none">{nav}</ul>
<span id="userInfo" class="navbar-text text-white ms-auto me-3">{name} ({role})</span>
<form method="post" action="/logout"><button id="logoutBtn" class="btn btn-outline-light btn-sm">Logout</button></form>
</div></nav>
<div class="container-fluid"><div class="row">
<div class="col-lg-2 d-none d-lg-block p-0"><div id="sideMenu" class="list-group list-group-flush">{side}</div></div>
<main id="mainContent" class="col-lg-10 p-3">{content}</main>
</div></div></div></body></html>"#,
        nav = menu.nav_html(),
        side = menu.side_menu_html(),
        name = escape_html(&identity.name),
        role = identity.role,
    )
}

/// Several printable documents on one page, each in its own frame.
#[must_use]
pub fn document_bundle(title: &str, documents: &[String]) -> String {
    let mut frames = String::new();
    for document in documents {
        frames.push_str(&format!(
            r#"<iframe class="sheet" srcdoc="{}"></iframe>"#,
            escape_html(document)
        ));
    }
    if documents.is_empty() {
        frames.push_str(r#"<div class="alert alert-info">No active students.</div>"#);
    }

    format!(
        r#"<!DOCTYPE html>
<html><head>{HEAD}<title>{title}</title>
<style>.sheet {{ width: 100%; height: 95vh; border: 0; break-after: page; }}</style></head>
<body>{frames}</body></html>"#,
        title = escape_html(title),
    )
}
