use crate::models::User;
use axum::response::Html;

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, flash: Option<&str>, body: &str) -> Html<String> {
    let flash = flash
        .map(|message| format!(r#"<p class="flash">{}</p>"#, escape_html(message)))
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Golf Courses</title>
</head>
<body>
{flash}
{body}
</body>
</html>
"#,
        title = escape_html(title),
    ))
}

pub fn about(flash: Option<&str>) -> Html<String> {
    layout(
        "About",
        flash,
        r#"<h1>Golf Courses</h1>
<p>Keep track of courses, tees and holes.</p>
<p><a href="/login">Log in</a> or <a href="/signup">sign up</a>.</p>"#,
    )
}

pub fn home(user: &User, flash: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Welcome, {}</h1>
<p><a href="/logout">Log out</a></p>
<div id="course-list"></div>
<script src="/static/js/main.js"></script>"#,
        escape_html(&user.username)
    );
    layout("Home", flash, &body)
}

pub fn signup(flash: Option<&str>) -> Html<String> {
    layout(
        "Sign up",
        flash,
        r#"<h1>Sign up</h1>
<form method="post" action="/signup">
<label>Username <input name="username" required></label>
<label>Email <input name="email" type="email" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Sign up</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
    )
}

pub fn login(flash: Option<&str>) -> Html<String> {
    layout(
        "Log in",
        flash,
        r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/signup">Sign up</a></p>"#,
    )
}
